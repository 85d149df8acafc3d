//! SYR integration tests.

use num_complex::Complex32;
use symblas_kernels::{
    syr, syr_ex, Batch, BatchMut, CheckNumerics, Fill, Handle, MatrixMut, PointerMode, ScalarRef, Status,
    VectorRef,
};

fn bits(a: &[f64]) -> Vec<u64> {
    a.iter().map(|v| v.to_bits()).collect()
}

#[test]
fn test_lower_two_by_two() {
    // A[0,1] is outside the lower triangle and must keep its sentinel.
    let x = [1.0f64, 2.0];
    let mut a = [0.0, 0.0, -5.0, 0.0];
    syr(&Handle::new(), Fill::Lower, 2, &1.0, &x, 1, &mut a, 2).unwrap();
    assert_eq!(a, [1.0, 2.0, -5.0, 4.0]);
}

#[test]
fn test_other_triangle_bit_identical() {
    let n = 20;
    let x: Vec<f64> = (0..n).map(|i| i as f64 * 0.3 - 2.0).collect();
    let a0: Vec<f64> = (0..n * n)
        .map(|i| if i % 3 == 0 { f64::NAN } else { -(i as f64) })
        .collect();

    for fill in [Fill::Upper, Fill::Lower] {
        let mut a = a0.clone();
        syr(&Handle::new(), fill, n as i64, &0.75, &x, 1, &mut a, n as i64).unwrap();
        for col in 0..n {
            for row in 0..n {
                let idx = row + col * n;
                if fill.contains(row, col) {
                    let expect = a0[idx] + 0.75 * x[row] * x[col];
                    assert!(
                        a[idx].to_bits() == expect.to_bits(),
                        "({row}, {col}): {} vs {expect}",
                        a[idx]
                    );
                } else {
                    assert_eq!(a[idx].to_bits(), a0[idx].to_bits(), "({row}, {col}) touched");
                }
            }
        }
    }
}

#[test]
fn test_alpha_zero_leaves_a_unchanged() {
    let x = [1.0f64, f64::NAN, 3.0];
    let a0 = [1.0, f64::NAN, -0.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0];
    let mut a = a0;
    syr(&Handle::new(), Fill::Upper, 3, &0.0, &x, 1, &mut a, 3).unwrap();
    assert_eq!(bits(&a), bits(&a0));

    let mut handle = Handle::new();
    handle.set_pointer_mode(PointerMode::Device);
    syr(&handle, Fill::Lower, 3, &0.0, &x, 1, &mut a, 3).unwrap();
    assert_eq!(bits(&a), bits(&a0));
}

#[test]
fn test_negative_increment() {
    let x = [1.0f64, -2.0, 0.5];
    let x_rev = [0.5f64, -2.0, 1.0];
    let mut forward = [0.0f64; 9];
    let mut backward = [0.0f64; 9];
    let h = Handle::new();
    syr(&h, Fill::Lower, 3, &2.0, &x, 1, &mut forward, 3).unwrap();
    syr(&h, Fill::Lower, 3, &2.0, &x_rev, -1, &mut backward, 3).unwrap();
    assert_eq!(forward, backward);
}

#[test]
fn test_degenerate_sizes_accept_null() {
    for (n, batch_count) in [(0, 3), (3, 0)] {
        let r = syr_ex::<f64>(
            &Handle::new(),
            Fill::Lower,
            n,
            ScalarRef::null(),
            VectorRef::null(1),
            MatrixMut::null(3),
            batch_count,
        );
        assert_eq!(Status::from(r), Status::Success);
    }
}

#[test]
fn test_host_alpha_stride_ignored() {
    let x = [1.0f64, 1.0];
    let mut a = [0.0f64; 4];
    let alpha = [2.0, 100.0];
    syr_ex(
        &Handle::new(),
        Fill::Upper,
        2,
        ScalarRef::device(&alpha, 1),
        VectorRef::new(Batch::Single(&x), 1),
        MatrixMut::new(BatchMut::Single(&mut a), 2),
        1,
    )
    .unwrap();
    assert_eq!(a, [2.0, 0.0, 2.0, 2.0]);
}

#[test]
fn test_invalid_arguments_leave_a_untouched() {
    let x = [1.0f64, 1.0];
    let mut a = [0.0f64; 4];
    let h = Handle::new();
    assert_eq!(Status::from(syr(&h, Fill::Full, 2, &1.0, &x, 1, &mut a, 2)), Status::InvalidValue);
    assert_eq!(Status::from(syr(&h, Fill::Lower, -1, &1.0, &x, 1, &mut a, 2)), Status::InvalidSize);
    assert_eq!(Status::from(syr(&h, Fill::Lower, 2, &1.0, &x, 0, &mut a, 2)), Status::InvalidSize);
    assert_eq!(Status::from(syr(&h, Fill::Lower, 2, &1.0, &x, 1, &mut a, 1)), Status::InvalidSize);
    assert_eq!(a, [0.0; 4]);
}

#[test]
fn test_numerics_fail_on_input() {
    let x = [1.0f64, f64::NAN];
    let mut a = [0.0f64; 4];
    let mut h = Handle::new();
    h.set_check_numerics(CheckNumerics::FAIL);
    let r = syr(&h, Fill::Lower, 2, &1.0, &x, 1, &mut a, 2);
    assert_eq!(Status::from(r), Status::InvalidValue);
    assert_eq!(a, [0.0; 4]);
}

#[test]
fn test_complex_no_conjugation() {
    let i = Complex32::new(0.0, 1.0);
    let zero = Complex32::new(0.0, 0.0);
    let one = Complex32::new(1.0, 0.0);
    let x = [one, i];
    let mut a = [zero; 4];
    syr(&Handle::new(), Fill::Lower, 2, &one, &x, 1, &mut a, 2).unwrap();
    // x x^T = [[1, i], [i, -1]]
    assert_eq!(a, [one, i, zero, Complex32::new(-1.0, 0.0)]);
}
