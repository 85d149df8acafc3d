//! NaN / Inf scanning of vector operands.
//!
//! The scan walks every logical element of a (possibly batched, possibly
//! negatively strided) vector, classifies it and reports according to the
//! handle's [`CheckNumerics`] level: `INFO` logs the summary, `WARN` logs a
//! warning on non-finite values and `FAIL` turns them into
//! [`BlasError::InvalidValue`].

use symblas_core::{
    to_isize, to_usize, vector_origin, BatchRead, BlasError, CheckNumerics, Element, Result, Span, ValueClass,
    VectorView,
};

/// What a scan found.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NumericsSummary {
    pub has_nan: bool,
    pub has_inf: bool,
    pub has_zero: bool,
}

impl NumericsSummary {
    pub fn scan<T: Element>(values: impl IntoIterator<Item = T>) -> Self {
        values.into_iter().fold(Self::default(), |mut acc, v| {
            match v.classify() {
                ValueClass::Nan => acc.has_nan = true,
                ValueClass::Inf => acc.has_inf = true,
                ValueClass::Zero => acc.has_zero = true,
                ValueClass::Normal => {}
            }
            acc
        })
    }

    pub fn merge(self, other: Self) -> Self {
        Self {
            has_nan: self.has_nan || other.has_nan,
            has_inf: self.has_inf || other.has_inf,
            has_zero: self.has_zero || other.has_zero,
        }
    }

    pub fn is_finite(&self) -> bool {
        !self.has_nan && !self.has_inf
    }
}

/// Scan one vector operand over `batch_count` batch elements.
///
/// `data: None` is only an error when there is something to scan.
#[allow(clippy::too_many_arguments)]
pub fn check_numerics_vector<T, B>(
    function: &str,
    operand: &'static str,
    n: i64,
    data: Option<&B>,
    offset: i64,
    inc: i64,
    stride: i64,
    batch_count: i64,
    mode: CheckNumerics,
    is_input: bool,
) -> Result<()>
where
    T: Element,
    B: BatchRead<T> + ?Sized,
{
    if !mode.is_enabled() || n <= 0 || batch_count <= 0 {
        return Ok(());
    }
    let data = data.ok_or(BlasError::InvalidPointer(operand))?;
    let n = to_usize("n", n)?;
    let inc = to_isize("inc", inc)?;
    let stride = to_isize("stride", stride)?;
    let span = Span::vector(n, vector_origin(to_isize("offset", offset)?, inc, n)?, inc)?;

    let mut summary = NumericsSummary::default();
    for batch in 0..to_usize("batch_count", batch_count)? {
        let region = data.read_region(operand, batch, span, stride)?;
        summary = summary.merge(NumericsSummary::scan(VectorView::from_span(region, inc, n).iter()));
    }

    let stage = if is_input { "input" } else { "output" };
    if mode.contains(CheckNumerics::INFO) {
        tracing::info!(
            function,
            operand,
            stage,
            dtype = %T::DTYPE,
            has_nan = summary.has_nan,
            has_inf = summary.has_inf,
            has_zero = summary.has_zero,
            "numerics check"
        );
    }
    if summary.is_finite() {
        return Ok(());
    }
    if mode.contains(CheckNumerics::WARN) {
        tracing::warn!(
            function,
            operand,
            stage,
            has_nan = summary.has_nan,
            has_inf = summary.has_inf,
            "non-finite values in vector operand"
        );
    }
    if mode.contains(CheckNumerics::FAIL) {
        return Err(BlasError::InvalidValue(format!(
            "{function}: {stage} vector '{operand}' contains NaN or Inf"
        )));
    }
    Ok(())
}
