//! Pre-dispatch argument checks.
//!
//! Rules are applied in a fixed precedence and the first failing rule wins:
//! fill, scalar-stride support, sizes, degenerate sizes, then null operands.
//! Degenerate sizes return before the null checks, so zero-size calls may pass
//! null buffers.

use symblas_core::{
    BlasError, Fill, MatrixMut, MatrixRef, PointerMode, Result, ScalarRef, VectorMut, VectorRef,
};

/// Outcome of a successful check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ArgCheck {
    /// Nothing to compute; report success.
    Success,
    /// Arguments are legal and non-degenerate; dispatch.
    Continue,
}

fn check_fill(fill: Fill) -> Result<()> {
    if fill.is_triangular() {
        Ok(())
    } else {
        Err(BlasError::InvalidValue(format!("fill must be upper or lower, got {fill}")))
    }
}

fn check_sizes(n: i64, lda: i64, incs: &[(&str, i64)], batch_count: i64) -> Result<()> {
    if n < 0 {
        return Err(BlasError::InvalidSize(format!("n = {n} is negative")));
    }
    if let Some((name, _)) = incs.iter().find(|(_, inc)| *inc == 0) {
        return Err(BlasError::InvalidSize(format!("{name} is zero")));
    }
    if lda < n || lda < 1 {
        return Err(BlasError::InvalidSize(format!("lda = {lda} is less than max(1, n = {n})")));
    }
    if batch_count < 0 {
        return Err(BlasError::InvalidSize(format!("batch_count = {batch_count} is negative")));
    }
    Ok(())
}

fn require(present: bool, operand: &'static str) -> Result<()> {
    if present {
        Ok(())
    } else {
        Err(BlasError::InvalidPointer(operand))
    }
}

#[allow(clippy::too_many_arguments)]
pub(crate) fn symv_arg_check<T>(
    mode: PointerMode,
    fill: Fill,
    n: i64,
    alpha: &ScalarRef<'_, T>,
    a: &MatrixRef<'_, T>,
    x: &VectorRef<'_, T>,
    beta: &ScalarRef<'_, T>,
    y: &VectorMut<'_, T>,
    batch_count: i64,
) -> Result<ArgCheck> {
    check_fill(fill)?;
    if mode.is_host() && (alpha.stride != 0 || beta.stride != 0) {
        return Err(BlasError::NotImplemented(format!(
            "host pointer mode with scalar strides (alpha {}, beta {})",
            alpha.stride, beta.stride
        )));
    }
    check_sizes(n, a.lda, &[("incx", x.inc), ("incy", y.inc)], batch_count)?;
    if n == 0 || batch_count == 0 {
        return Ok(ArgCheck::Success);
    }
    require(a.data.is_some(), "A")?;
    require(x.data.is_some(), "x")?;
    require(y.data.is_some(), "y")?;
    require(alpha.values.is_some(), "alpha")?;
    require(beta.values.is_some(), "beta")?;
    Ok(ArgCheck::Continue)
}

/// SYR has no host-mode stride rule: a host alpha ignores its stride.
pub(crate) fn syr_arg_check<T>(
    fill: Fill,
    n: i64,
    alpha: &ScalarRef<'_, T>,
    x: &VectorRef<'_, T>,
    a: &MatrixMut<'_, T>,
    batch_count: i64,
) -> Result<ArgCheck> {
    check_fill(fill)?;
    check_sizes(n, a.lda, &[("incx", x.inc)], batch_count)?;
    if n == 0 || batch_count == 0 {
        return Ok(ArgCheck::Success);
    }
    require(alpha.values.is_some(), "alpha")?;
    require(x.data.is_some(), "x")?;
    require(a.data.is_some(), "A")?;
    Ok(ArgCheck::Continue)
}
