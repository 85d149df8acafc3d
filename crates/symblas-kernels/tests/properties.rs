//! Property tests: mirroring, negative increments, quick returns and batching.

use proptest::prelude::*;
use symblas_kernels::{symv, symv_strided_batched, syr, Fill, Handle};

/// `(n, lda, dense symmetric A, x, y)` with small integer-valued entries, so
/// every sum is exact regardless of reduction order.
fn arb_problem() -> impl Strategy<Value = (usize, usize, Vec<f64>, Vec<f64>, Vec<f64>)> {
    (1usize..40, 0usize..3).prop_flat_map(|(n, pad)| {
        let lda = n + pad;
        (
            Just(n),
            Just(lda),
            prop::collection::vec(-8i32..8, n * n),
            prop::collection::vec(-8i32..8, n),
            prop::collection::vec(-8i32..8, n),
        )
            .prop_map(|(n, lda, vals, x, y)| {
                let mut a = vec![0.0; lda * n];
                for col in 0..n {
                    for row in 0..n {
                        a[row + col * lda] = vals[row.max(col) + row.min(col) * n] as f64;
                    }
                }
                let to_f64 = |v: Vec<i32>| v.into_iter().map(f64::from).collect::<Vec<_>>();
                (n, lda, a, to_f64(x), to_f64(y))
            })
    })
}

fn arb_fill() -> impl Strategy<Value = Fill> {
    prop_oneof![Just(Fill::Lower), Just(Fill::Upper)]
}

fn poison_other_triangle(a: &[f64], n: usize, lda: usize, fill: Fill) -> Vec<f64> {
    let mut out = a.to_vec();
    for col in 0..n {
        for row in 0..n {
            if !fill.contains(row, col) {
                out[row + col * lda] = f64::NAN;
            }
        }
    }
    out
}

fn reversed(v: &[f64]) -> Vec<f64> {
    v.iter().rev().copied().collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Lower and upper storage of the same matrix give the same product.
    #[test]
    fn prop_symv_mirroring((n, lda, a, x, y0) in arb_problem(), alpha in -3i32..3, beta in -3i32..3) {
        let (alpha, beta) = (alpha as f64, beta as f64);
        let handle = Handle::new();
        let mut lower = y0.clone();
        let mut upper = y0.clone();
        let a_lower = poison_other_triangle(&a, n, lda, Fill::Lower);
        let a_upper = poison_other_triangle(&a, n, lda, Fill::Upper);
        symv(&handle, Fill::Lower, n as i64, &alpha, &a_lower, lda as i64, &x, 1, &beta, &mut lower, 1).unwrap();
        symv(&handle, Fill::Upper, n as i64, &alpha, &a_upper, lda as i64, &x, 1, &beta, &mut upper, 1).unwrap();
        prop_assert_eq!(lower, upper);
    }

    /// incx = incy = -1 over reversed buffers equals +1 over natural order.
    #[test]
    fn prop_symv_negative_increment((n, lda, a, x, y0) in arb_problem(), fill in arb_fill()) {
        let handle = Handle::new();
        let mut forward = y0.clone();
        symv(&handle, fill, n as i64, &1.0, &a, lda as i64, &x, 1, &2.0, &mut forward, 1).unwrap();

        let mut backward = reversed(&y0);
        symv(&handle, fill, n as i64, &1.0, &a, lda as i64, &reversed(&x), -1, &2.0, &mut backward, -1).unwrap();
        prop_assert_eq!(reversed(&backward), forward);
    }

    /// alpha = 0, beta = 1 leaves y bit-identical.
    #[test]
    fn prop_symv_identity((n, lda, a, x, y0) in arb_problem(), fill in arb_fill()) {
        let mut y = y0.clone();
        symv(&Handle::new(), fill, n as i64, &0.0, &a, lda as i64, &x, 1, &1.0, &mut y, 1).unwrap();
        let before: Vec<u64> = y0.iter().map(|v| v.to_bits()).collect();
        let after: Vec<u64> = y.iter().map(|v| v.to_bits()).collect();
        prop_assert_eq!(before, after);
    }

    /// alpha = 0 scales y by beta.
    #[test]
    fn prop_symv_alpha_zero_scales((n, lda, a, x, y0) in arb_problem(), beta in -4i32..4) {
        let beta = beta as f64;
        let mut y = y0.clone();
        symv(&Handle::new(), Fill::Lower, n as i64, &0.0, &a, lda as i64, &x, 1, &beta, &mut y, 1).unwrap();
        let expect: Vec<f64> = y0.iter().map(|v| if beta == 0.0 { 0.0 } else { beta * v }).collect();
        prop_assert_eq!(y, expect);
    }

    /// A strided batch equals one call per batch element, in parallel or not.
    #[test]
    fn prop_symv_batched_matches_single(
        (n, lda, a, x, y0) in arb_problem(),
        batch_count in 1usize..4,
        parallel in any::<bool>(),
    ) {
        let mut handle = Handle::new();
        handle.set_parallel_threshold(if parallel { 0 } else { usize::MAX });
        let stride_a = lda * n;
        let a_all: Vec<f64> = (0..batch_count).flat_map(|b| a.iter().map(move |v| v + b as f64)).collect();
        let x_all: Vec<f64> = (0..batch_count).flat_map(|_| x.iter().copied()).collect();
        let mut y_all: Vec<f64> = (0..batch_count).flat_map(|_| y0.iter().copied()).collect();

        symv_strided_batched(
            &handle, Fill::Upper, n as i64, &1.0, &a_all, lda as i64, stride_a as i64, &x_all, 1, n as i64,
            &-1.0, &mut y_all, 1, n as i64, batch_count as i64,
        ).unwrap();

        for b in 0..batch_count {
            let mut y = y0.clone();
            let a_b = &a_all[b * stride_a..(b + 1) * stride_a];
            symv(&Handle::new(), Fill::Upper, n as i64, &1.0, a_b, lda as i64, &x, 1, &-1.0, &mut y, 1).unwrap();
            prop_assert_eq!(&y_all[b * n..(b + 1) * n], &y[..]);
        }
    }

    /// SYR with alpha = 0 leaves A bit-identical.
    #[test]
    fn prop_syr_alpha_zero((n, lda, a, x, _y) in arb_problem(), fill in arb_fill()) {
        let mut out = a.clone();
        syr(&Handle::new(), fill, n as i64, &0.0, &x, 1, &mut out, lda as i64).unwrap();
        let before: Vec<u64> = a.iter().map(|v| v.to_bits()).collect();
        let after: Vec<u64> = out.iter().map(|v| v.to_bits()).collect();
        prop_assert_eq!(before, after);
    }

    /// SYR writes exactly the stored triangle.
    #[test]
    fn prop_syr_triangle((n, lda, a, x, _y) in arb_problem(), fill in arb_fill(), alpha in -3i32..3) {
        let alpha = alpha as f64;
        let mut out = a.clone();
        syr(&Handle::new(), fill, n as i64, &alpha, &x, 1, &mut out, lda as i64).unwrap();
        for col in 0..n {
            for row in 0..lda {
                let idx = row + col * lda;
                let expect = if row < n && fill.contains(row, col) {
                    a[idx] + alpha * x[row] * x[col]
                } else {
                    a[idx]
                };
                prop_assert_eq!(out[idx], expect, "({}, {})", row, col);
            }
        }
    }

    /// SYR with incx = -1 over a reversed x equals incx = +1.
    #[test]
    fn prop_syr_negative_increment((n, lda, a, x, _y) in arb_problem(), fill in arb_fill()) {
        let mut forward = a.clone();
        let mut backward = a.clone();
        syr(&Handle::new(), fill, n as i64, &1.5, &x, 1, &mut forward, lda as i64).unwrap();
        syr(&Handle::new(), fill, n as i64, &1.5, &reversed(&x), -1, &mut backward, lda as i64).unwrap();
        prop_assert_eq!(forward, backward);
    }
}
