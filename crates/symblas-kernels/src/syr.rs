//! Symmetric rank-1 update: `A := A + alpha * x * x^T`.
//!
//! Only the `fill` triangle of A is written; the other triangle is left
//! bit-for-bit untouched. Every matrix coordinate belongs to exactly one
//! worker, so there is no scratch and no barrier.

use symblas_core::{
    to_isize, to_usize, vector_origin, Batch, BatchMut, BlasError, Element, Fill, Handle, MatrixMut,
    MatrixViewMut, Result, ScalarRef, ScalarSource, Span, VectorRef, VectorView,
};

use crate::launch::{for_each_batch, for_each_part, grid_2d_batched, Dim3, WorkGroup};
use crate::numerics::check_numerics_vector;
use crate::validate::{syr_arg_check, ArgCheck};

/// Rows per work-group.
pub const SYR_DIM_X: usize = 128;
/// Columns per work-group.
pub const SYR_DIM_Y: usize = 8;

fn syr_group<T: Element>(
    group: &mut WorkGroup<T>,
    fill: Fill,
    alpha: T,
    x: VectorView<'_, T>,
    a: &mut MatrixViewMut<'_, T>,
) {
    let block = group.block();
    let id = group.id();
    let n = a.n();
    group.for_each_worker(|w, _| {
        let row = id.x * block.x + w.x;
        let col = id.y * block.y + w.y;
        if row < n && col < n && fill.contains(row, col) {
            *a.get_mut(row, col) += alpha * x.get(row) * x.get(col);
        }
    });
}

fn syr_launch<T: Element>(
    handle: &Handle,
    fill: Fill,
    n: usize,
    alpha: &ScalarRef<'_, T>,
    x: &VectorRef<'_, T>,
    a: &mut MatrixMut<'_, T>,
    batch_count: usize,
) -> Result<()> {
    let alpha_src = ScalarSource::new(
        "alpha",
        alpha.values.ok_or(BlasError::InvalidPointer("alpha"))?,
        to_isize("stride_alpha", alpha.stride)?,
        handle.pointer_mode(),
    )?;
    if alpha_src.host_value().is_some_and(|alpha| alpha.is_zero()) {
        tracing::debug!(n, batch_count, "syr quick return: alpha = 0");
        return Ok(());
    }

    let x_data = x.data.ok_or(BlasError::InvalidPointer("x"))?;
    let (incx, lda) = (to_isize("incx", x.inc)?, to_usize("lda", a.lda)?);
    let (stride_x, stride_a) = (to_isize("stride_x", x.stride)?, to_isize("stride_a", a.stride)?);
    let x_span = Span::vector(n, vector_origin(to_isize("offset_x", x.offset)?, incx, n)?, incx)?;
    let a_span = Span::matrix(n, to_isize("offset_a", a.offset)?, lda)?;
    let a_data = a.data.as_mut().ok_or(BlasError::InvalidPointer("A"))?;

    // Inputs of every batch element resolve before the first write to A.
    for batch in 0..batch_count {
        if !alpha_src.load(batch)?.is_zero() {
            x_data.region("x", batch, x_span, stride_x)?;
        }
    }

    let config = grid_2d_batched(n, n, SYR_DIM_X, SYR_DIM_Y, batch_count);
    let parallel = handle.is_parallel(n.saturating_mul(n).saturating_mul(batch_count));
    tracing::debug!(grid = ?config.grid, block = ?config.block, parallel, "syr launch");

    handle.install(|| {
        for_each_batch(a_data, "A", batch_count, a_span, stride_a, parallel, |batch, region| {
            let alpha = alpha_src.load(batch)?;
            if alpha.is_zero() {
                return Ok(());
            }
            let x = VectorView::from_span(x_data.region("x", batch, x_span, stride_x)?, incx, n);
            let blocks = MatrixViewMut::new(region, lda, n).into_column_blocks(config.block.y);
            // Groups sharing a column block write the same columns; they run in order.
            for_each_part(blocks, parallel, |block_y, mut cols| {
                for block_x in 0..config.grid.x {
                    let mut group = WorkGroup::new(Dim3::new(block_x, block_y, batch), config.block, 0);
                    syr_group(&mut group, fill, alpha, x, &mut cols);
                }
            });
            Ok(())
        })
    })
}

/// Scan SYR's vector operand x.
pub fn syr_check_numerics<T: Element>(
    function: &str,
    handle: &Handle,
    n: i64,
    x: &VectorRef<'_, T>,
    batch_count: i64,
    is_input: bool,
) -> Result<()> {
    check_numerics_vector(
        function,
        "x",
        n,
        x.data.as_ref(),
        x.offset,
        x.inc,
        x.stride,
        batch_count,
        handle.check_numerics(),
        is_input,
    )
}

#[allow(clippy::too_many_arguments)]
fn syr_impl<T: Element>(
    function: &'static str,
    handle: &Handle,
    fill: Fill,
    n: i64,
    alpha: ScalarRef<'_, T>,
    x: VectorRef<'_, T>,
    a: &mut MatrixMut<'_, T>,
    batch_count: i64,
) -> Result<()> {
    tracing::debug!(
        routine = %T::DTYPE.routine(function),
        dtype = %T::DTYPE,
        %fill,
        n,
        incx = x.inc,
        lda = a.lda,
        batch_count,
        pointer_mode = %handle.pointer_mode(),
        "syr"
    );
    if syr_arg_check(fill, n, &alpha, &x, a, batch_count)? == ArgCheck::Success {
        return Ok(());
    }

    let check = handle.check_numerics().is_enabled();
    if check {
        syr_check_numerics(function, handle, n, &x, batch_count, true)?;
    }
    let (rows, batches) = (to_usize("n", n)?, to_usize("batch_count", batch_count)?);
    syr_launch(handle, fill, rows, &alpha, &x, a, batches)?;
    if check {
        syr_check_numerics(function, handle, n, &x, batch_count, false)?;
    }
    Ok(())
}

/// General SYR over operand descriptors.
///
/// In device pointer mode alpha is read per batch element at
/// `values[b * stride]`. In host mode `values[0]` is shared and the stride is
/// ignored.
pub fn syr_ex<T: Element>(
    handle: &Handle,
    fill: Fill,
    n: i64,
    alpha: ScalarRef<'_, T>,
    x: VectorRef<'_, T>,
    mut a: MatrixMut<'_, T>,
    batch_count: i64,
) -> Result<()> {
    syr_impl("syr_ex", handle, fill, n, alpha, x, &mut a, batch_count)
}

/// `A := A + alpha * x * x^T` for one problem.
#[allow(clippy::too_many_arguments)]
pub fn syr<T: Element>(
    handle: &Handle,
    fill: Fill,
    n: i64,
    alpha: &T,
    x: &[T],
    incx: i64,
    a: &mut [T],
    lda: i64,
) -> Result<()> {
    syr_impl(
        "syr",
        handle,
        fill,
        n,
        ScalarRef::host(alpha),
        VectorRef::new(Batch::Single(x), incx),
        &mut MatrixMut::new(BatchMut::Single(a), lda),
        1,
    )
}

#[allow(clippy::too_many_arguments)]
pub fn syr_batched<T: Element>(
    handle: &Handle,
    fill: Fill,
    n: i64,
    alpha: &T,
    x: &[&[T]],
    incx: i64,
    a: &mut [&mut [T]],
    lda: i64,
    batch_count: i64,
) -> Result<()> {
    let a = a.iter_mut().map(|buf| &mut **buf).collect();
    syr_impl(
        "syr_batched",
        handle,
        fill,
        n,
        ScalarRef::host(alpha),
        VectorRef::new(Batch::PointerArray(x), incx),
        &mut MatrixMut::new(BatchMut::PointerArray(a), lda),
        batch_count,
    )
}

#[allow(clippy::too_many_arguments)]
pub fn syr_strided_batched<T: Element>(
    handle: &Handle,
    fill: Fill,
    n: i64,
    alpha: &T,
    x: &[T],
    incx: i64,
    stride_x: i64,
    a: &mut [T],
    lda: i64,
    stride_a: i64,
    batch_count: i64,
) -> Result<()> {
    syr_impl(
        "syr_strided_batched",
        handle,
        fill,
        n,
        ScalarRef::host(alpha),
        VectorRef::new(Batch::Strided(x), incx).with_stride(stride_x),
        &mut MatrixMut::new(BatchMut::Strided(a), lda).with_stride(stride_a),
        batch_count,
    )
}
