//! Symmetric matrix-vector multiply: `y := alpha * A * x + beta * y`.
//!
//! Only the `fill` triangle of A is read; the other half is recovered by
//! mirroring, so upper and lower storage of the same matrix give the same
//! product. Each work-group owns [`SYMV_DIM_X`] consecutive rows of y. Its
//! `SYMV_DIM_X x SYMV_DIM_Y` workers accumulate partial dot products over
//! interleaved columns into shared scratch, pass one barrier, and the first
//! `SYMV_DIM_X` workers reduce their column of partials and write y.

use symblas_core::{
    to_isize, to_usize, vector_origin, Batch, BatchMut, BlasError, Element, Fill, Handle, MatrixRef, MatrixView,
    Result, ScalarRef, ScalarSource, Span, VectorMut, VectorRef, VectorView, VectorViewMut,
};

use crate::launch::{for_each_batch, for_each_part, grid_1d_batched, Dim3, WorkGroup};
use crate::numerics::check_numerics_vector;
use crate::validate::{symv_arg_check, ArgCheck};

/// Output rows per work-group.
pub const SYMV_DIM_X: usize = 64;
/// Column lanes per work-group; also the width of the reduction.
pub const SYMV_DIM_Y: usize = 16;

// ============================================================================
// Work-group kernels
// ============================================================================

/// Pairwise sum of `scratch[col + k * stride]` for `k < lanes`.
///
/// Lanes are folded in halves: lane `k` absorbs lane `k + half` until one
/// remains, so the summation order is fixed for a given lane count.
fn tree_reduce<T: Element>(scratch: &mut [T], col: usize, stride: usize, lanes: usize) -> T {
    let mut live = lanes;
    while live > 1 {
        let half = (live + 1) / 2;
        for k in 0..live - half {
            let rhs = scratch[col + (k + half) * stride];
            scratch[col + k * stride] += rhs;
        }
        live = half;
    }
    scratch[col]
}

/// `alpha == 0`: `y := beta * y` on one tile, A and x untouched.
fn symv_scale_group<T: Element>(group: &mut WorkGroup<T>, beta: T, y: &mut VectorViewMut<'_, T>) {
    let rows = y.len();
    group.for_each_worker(|w, _| {
        if w.linear < rows {
            let value = if beta.is_zero() { T::zero() } else { beta * y.get(w.linear) };
            y.set(w.linear, value);
        }
    });
}

fn symv_group<T: Element>(
    group: &mut WorkGroup<T>,
    fill: Fill,
    alpha: T,
    a: MatrixView<'_, T>,
    x: VectorView<'_, T>,
    beta: T,
    y: &mut VectorViewMut<'_, T>,
) {
    let block = group.block();
    let row0 = group.id().x * block.x;
    let n = a.n();

    group.for_each_worker(|w, scratch| {
        let row = row0 + w.x;
        let mut acc = T::zero();
        if row < n {
            for col in (w.y..n).step_by(block.y) {
                acc += a.symmetric(fill, row, col) * x.get(col);
            }
        }
        scratch[w.linear] = acc;
    });

    group.barrier();

    let rows = y.len();
    group.for_each_worker(|w, scratch| {
        if w.linear >= block.x || w.linear >= rows {
            return;
        }
        let sum = alpha * tree_reduce(scratch, w.linear, block.x, block.y);
        // beta == 0 never reads y.
        let value = if beta.is_zero() { sum } else { sum + beta * y.get(w.linear) };
        y.set(w.linear, value);
    });
}

// ============================================================================
// Launch
// ============================================================================

#[allow(clippy::too_many_arguments)]
fn symv_launch<T: Element>(
    handle: &Handle,
    fill: Fill,
    n: usize,
    alpha: &ScalarRef<'_, T>,
    a: &MatrixRef<'_, T>,
    x: &VectorRef<'_, T>,
    beta: &ScalarRef<'_, T>,
    y: &mut VectorMut<'_, T>,
    batch_count: usize,
) -> Result<()> {
    let mode = handle.pointer_mode();
    let alpha_src = ScalarSource::new(
        "alpha",
        alpha.values.ok_or(BlasError::InvalidPointer("alpha"))?,
        to_isize("stride_alpha", alpha.stride)?,
        mode,
    )?;
    let beta_src = ScalarSource::new(
        "beta",
        beta.values.ok_or(BlasError::InvalidPointer("beta"))?,
        to_isize("stride_beta", beta.stride)?,
        mode,
    )?;

    if let (Some(alpha), Some(beta)) = (alpha_src.host_value(), beta_src.host_value()) {
        if alpha.is_zero() && beta.is_one() {
            tracing::debug!(n, batch_count, "symv quick return: alpha = 0, beta = 1");
            return Ok(());
        }
    }

    let a_data = a.data.ok_or(BlasError::InvalidPointer("A"))?;
    let x_data = x.data.ok_or(BlasError::InvalidPointer("x"))?;
    let (incx, incy, lda) = (to_isize("incx", x.inc)?, to_isize("incy", y.inc)?, to_usize("lda", a.lda)?);
    let stride_a = to_isize("stride_a", a.stride)?;
    let stride_x = to_isize("stride_x", x.stride)?;
    let stride_y = to_isize("stride_y", y.stride)?;
    let a_span = Span::matrix(n, to_isize("offset_a", a.offset)?, lda)?;
    let x_span = Span::vector(n, vector_origin(to_isize("offset_x", x.offset)?, incx, n)?, incx)?;
    let y_span = Span::vector(n, vector_origin(to_isize("offset_y", y.offset)?, incy, n)?, incy)?;
    let y_data = y.data.as_mut().ok_or(BlasError::InvalidPointer("y"))?;

    // Inputs of every batch element resolve before the first write to y.
    for batch in 0..batch_count {
        let alpha = alpha_src.load(batch)?;
        beta_src.load(batch)?;
        if !alpha.is_zero() {
            a_data.region("A", batch, a_span, stride_a)?;
            x_data.region("x", batch, x_span, stride_x)?;
        }
    }

    let config = grid_1d_batched(n, SYMV_DIM_X, SYMV_DIM_Y, batch_count, SYMV_DIM_X * SYMV_DIM_Y);
    let parallel = handle.is_parallel(n.saturating_mul(n).saturating_mul(batch_count));
    tracing::debug!(grid = ?config.grid, block = ?config.block, parallel, "symv launch");

    handle.install(|| {
        for_each_batch(y_data, "y", batch_count, y_span, stride_y, parallel, |batch, region| {
            let alpha = alpha_src.load(batch)?;
            let beta = beta_src.load(batch)?;
            if alpha.is_zero() && beta.is_one() {
                return Ok(());
            }
            let tiles = VectorViewMut::from_span(region, incy, n).into_tiles(config.block.x);

            if alpha.is_zero() {
                for_each_part(tiles, parallel, |tile_idx, mut tile| {
                    let mut group = WorkGroup::new(Dim3::new(tile_idx, batch, 0), config.block, 0);
                    symv_scale_group(&mut group, beta, &mut tile);
                });
                return Ok(());
            }

            let a = MatrixView::new(a_data.region("A", batch, a_span, stride_a)?, lda, n);
            let x = VectorView::from_span(x_data.region("x", batch, x_span, stride_x)?, incx, n);
            for_each_part(tiles, parallel, |tile_idx, mut tile| {
                let mut group = WorkGroup::new(Dim3::new(tile_idx, batch, 0), config.block, config.shared_elems);
                symv_group(&mut group, fill, alpha, a, x, beta, &mut tile);
            });
            Ok(())
        })
    })
}

// ============================================================================
// Numerics bridge
// ============================================================================

/// Scan SYMV's vector operands: x, then y.
pub fn symv_check_numerics<T: Element>(
    function: &str,
    handle: &Handle,
    n: i64,
    x: &VectorRef<'_, T>,
    y: &VectorMut<'_, T>,
    batch_count: i64,
    is_input: bool,
) -> Result<()> {
    let mode = handle.check_numerics();
    check_numerics_vector(function, "x", n, x.data.as_ref(), x.offset, x.inc, x.stride, batch_count, mode, is_input)?;
    check_numerics_vector(function, "y", n, y.data.as_ref(), y.offset, y.inc, y.stride, batch_count, mode, is_input)
}

// ============================================================================
// Entry points
// ============================================================================

#[allow(clippy::too_many_arguments)]
fn symv_impl<T: Element>(
    function: &'static str,
    handle: &Handle,
    fill: Fill,
    n: i64,
    alpha: ScalarRef<'_, T>,
    a: MatrixRef<'_, T>,
    x: VectorRef<'_, T>,
    beta: ScalarRef<'_, T>,
    y: &mut VectorMut<'_, T>,
    batch_count: i64,
) -> Result<()> {
    tracing::debug!(
        routine = %T::DTYPE.routine(function),
        dtype = %T::DTYPE,
        %fill,
        n,
        lda = a.lda,
        incx = x.inc,
        incy = y.inc,
        batch_count,
        pointer_mode = %handle.pointer_mode(),
        "symv"
    );
    let mode = handle.pointer_mode();
    if symv_arg_check(mode, fill, n, &alpha, &a, &x, &beta, y, batch_count)? == ArgCheck::Success {
        return Ok(());
    }

    let check = handle.check_numerics().is_enabled();
    if check {
        symv_check_numerics(function, handle, n, &x, y, batch_count, true)?;
    }
    let (rows, batches) = (to_usize("n", n)?, to_usize("batch_count", batch_count)?);
    symv_launch(handle, fill, rows, &alpha, &a, &x, &beta, y, batches)?;
    if check {
        symv_check_numerics(function, handle, n, &x, y, batch_count, false)?;
    }
    Ok(())
}

/// General SYMV over operand descriptors.
///
/// Every operand may use its own batch topology, offset and batch stride.
/// In device pointer mode alpha and beta are read per batch element at
/// `values[b * stride]`; in host mode `values[0]` is shared and the strides
/// must be zero.
#[allow(clippy::too_many_arguments)]
pub fn symv_ex<T: Element>(
    handle: &Handle,
    fill: Fill,
    n: i64,
    alpha: ScalarRef<'_, T>,
    a: MatrixRef<'_, T>,
    x: VectorRef<'_, T>,
    beta: ScalarRef<'_, T>,
    mut y: VectorMut<'_, T>,
    batch_count: i64,
) -> Result<()> {
    symv_impl("symv_ex", handle, fill, n, alpha, a, x, beta, &mut y, batch_count)
}

/// `y := alpha * A * x + beta * y` for one problem.
#[allow(clippy::too_many_arguments)]
pub fn symv<T: Element>(
    handle: &Handle,
    fill: Fill,
    n: i64,
    alpha: &T,
    a: &[T],
    lda: i64,
    x: &[T],
    incx: i64,
    beta: &T,
    y: &mut [T],
    incy: i64,
) -> Result<()> {
    symv_impl(
        "symv",
        handle,
        fill,
        n,
        ScalarRef::host(alpha),
        MatrixRef::new(Batch::Single(a), lda),
        VectorRef::new(Batch::Single(x), incx),
        ScalarRef::host(beta),
        &mut VectorMut::new(BatchMut::Single(y), incy),
        1,
    )
}

/// SYMV over arrays of per-problem buffers.
#[allow(clippy::too_many_arguments)]
pub fn symv_batched<T: Element>(
    handle: &Handle,
    fill: Fill,
    n: i64,
    alpha: &T,
    a: &[&[T]],
    lda: i64,
    x: &[&[T]],
    incx: i64,
    beta: &T,
    y: &mut [&mut [T]],
    incy: i64,
    batch_count: i64,
) -> Result<()> {
    let y = y.iter_mut().map(|buf| &mut **buf).collect();
    symv_impl(
        "symv_batched",
        handle,
        fill,
        n,
        ScalarRef::host(alpha),
        MatrixRef::new(Batch::PointerArray(a), lda),
        VectorRef::new(Batch::PointerArray(x), incx),
        ScalarRef::host(beta),
        &mut VectorMut::new(BatchMut::PointerArray(y), incy),
        batch_count,
    )
}

/// SYMV over flat buffers holding problem `b` at `b * stride`.
#[allow(clippy::too_many_arguments)]
pub fn symv_strided_batched<T: Element>(
    handle: &Handle,
    fill: Fill,
    n: i64,
    alpha: &T,
    a: &[T],
    lda: i64,
    stride_a: i64,
    x: &[T],
    incx: i64,
    stride_x: i64,
    beta: &T,
    y: &mut [T],
    incy: i64,
    stride_y: i64,
    batch_count: i64,
) -> Result<()> {
    symv_impl(
        "symv_strided_batched",
        handle,
        fill,
        n,
        ScalarRef::host(alpha),
        MatrixRef::new(Batch::Strided(a), lda).with_stride(stride_a),
        VectorRef::new(Batch::Strided(x), incx).with_stride(stride_x),
        ScalarRef::host(beta),
        &mut VectorMut::new(BatchMut::Strided(y), incy).with_stride(stride_y),
        batch_count,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn naive_symv(fill: Fill, n: usize, alpha: f64, a: &[f64], lda: usize, x: &[f64], beta: f64, y: &mut [f64]) {
        let view = MatrixView::new(a, lda, n);
        for row in 0..n {
            let dot: f64 = (0..n).map(|col| view.symmetric(fill, row, col) * x[col]).sum();
            y[row] = alpha * dot + beta * y[row];
        }
    }

    fn assert_close(a: &[f64], b: &[f64], tol: f64) {
        assert_eq!(a.len(), b.len());
        for (i, (x, y)) in a.iter().zip(b).enumerate() {
            assert!((x - y).abs() <= tol * (1.0 + y.abs()), "index {i}: {x} vs {y}");
        }
    }

    #[test]
    fn test_tree_reduce() {
        for lanes in 1..=17 {
            let mut scratch: Vec<f64> = (0..lanes * 3).map(|i| i as f64).collect();
            let expect: f64 = (0..lanes).map(|k| (1 + k * 3) as f64).sum();
            assert_eq!(tree_reduce(&mut scratch, 1, 3, lanes), expect, "lanes = {lanes}");
        }
    }

    #[test]
    fn test_symv_group_single_barrier() {
        let n = 5;
        let a: Vec<f64> = (0..n * n).map(|i| (i % 7) as f64 - 2.0).collect();
        let x: Vec<f64> = (0..n).map(|i| i as f64 * 0.5 - 1.0).collect();
        let mut y = vec![1.0; n];
        let mut expect = y.clone();
        naive_symv(Fill::Upper, n, 2.0, &a, n, &x, -1.0, &mut expect);

        let config = grid_1d_batched(n, SYMV_DIM_X, SYMV_DIM_Y, 1, SYMV_DIM_X * SYMV_DIM_Y);
        let mut group = WorkGroup::new(Dim3::new(0, 0, 0), config.block, config.shared_elems);
        let mut tile = VectorViewMut::from_span(&mut y[..], 1, n);
        symv_group(
            &mut group,
            Fill::Upper,
            2.0,
            MatrixView::new(&a, n, n),
            VectorView::from_span(&x, 1, n),
            -1.0,
            &mut tile,
        );
        assert_eq!(group.barriers(), 1);
        assert_close(&y, &expect, 1e-12);
    }

    #[test]
    fn test_scale_group_has_no_barrier() {
        let mut y = vec![1.0f32, f32::NAN, 3.0];
        let mut group = WorkGroup::new(Dim3::new(0, 0, 0), Dim3::new(SYMV_DIM_X, SYMV_DIM_Y, 1), 0);
        symv_scale_group(&mut group, 0.0, &mut VectorViewMut::from_span(&mut y[..], 1, 3));
        assert_eq!(group.barriers(), 0);
        assert_eq!(y, vec![0.0, 0.0, 0.0]);

        let mut group = WorkGroup::new(Dim3::new(0, 0, 0), Dim3::new(SYMV_DIM_X, SYMV_DIM_Y, 1), 0);
        let mut y = vec![1.0f32, 2.0];
        symv_scale_group(&mut group, 3.0, &mut VectorViewMut::from_span(&mut y[..], 1, 2));
        assert_eq!(y, vec![3.0, 6.0]);
    }

    #[test]
    fn test_multi_tile_parallel_matches_naive() {
        let n = 150;
        let lda = 153;
        let a: Vec<f64> = (0..lda * n).map(|i| ((i * 31) % 17) as f64 * 0.25 - 2.0).collect();
        let x: Vec<f64> = (0..n).map(|i| ((i * 7) % 5) as f64 - 2.0).collect();
        let y0: Vec<f64> = (0..n).map(|i| i as f64 * 0.1).collect();

        for fill in [Fill::Lower, Fill::Upper] {
            let mut expect = y0.clone();
            naive_symv(fill, n, 0.5, &a, lda, &x, 2.0, &mut expect);
            for threshold in [0, usize::MAX] {
                let mut handle = Handle::new();
                handle.set_parallel_threshold(threshold);
                let mut y = y0.clone();
                symv(&handle, fill, n as i64, &0.5, &a, lda as i64, &x, 1, &2.0, &mut y, 1).unwrap();
                assert_close(&y, &expect, 1e-10);
            }
        }
    }

    #[test]
    fn test_beta_zero_ignores_nan_in_y() {
        let a = [2.0f64, 1.0, 0.0, 3.0];
        let x = [1.0, 1.0];
        let mut y = [f64::NAN, f64::NAN];
        symv(&Handle::new(), Fill::Lower, 2, &1.0, &a, 2, &x, 1, &0.0, &mut y, 1).unwrap();
        assert_eq!(y, [3.0, 4.0]);
    }
}
