//! Scalar resolution for alpha / beta.

use crate::{BlasError, Element, PointerMode, Result};

#[derive(Debug, Clone, Copy)]
enum Source<'a, T> {
    Host(T),
    Device { values: &'a [T], stride: isize },
}

/// A scalar operand resolved for one invocation.
///
/// In host mode the value is read once, here, and shared by every batch
/// element. In device mode nothing is read until [`load`](Self::load) is
/// called by the launch for a specific batch element.
#[derive(Debug, Clone, Copy)]
pub struct ScalarSource<'a, T> {
    name: &'static str,
    source: Source<'a, T>,
}

impl<'a, T: Element> ScalarSource<'a, T> {
    pub fn new(name: &'static str, values: &'a [T], stride: isize, mode: PointerMode) -> Result<Self> {
        let source = match mode {
            PointerMode::Host => Source::Host(*values.first().ok_or(BlasError::InvalidPointer(name))?),
            PointerMode::Device => Source::Device { values, stride },
        };
        Ok(Self { name, source })
    }

    /// Value for batch element `batch`.
    #[inline]
    pub fn load(&self, batch: usize) -> Result<T> {
        match self.source {
            Source::Host(value) => Ok(value),
            Source::Device { values, stride } => {
                let idx = isize::try_from(batch).ok().and_then(|b| b.checked_mul(stride));
                idx.and_then(|i| usize::try_from(i).ok())
                    .and_then(|i| values.get(i).copied())
                    .ok_or_else(|| {
                        let idx = idx.unwrap_or(isize::MAX);
                        BlasError::OutOfBounds {
                            operand: self.name,
                            batch,
                            lo: idx,
                            hi: idx,
                            len: values.len(),
                        }
                    })
            }
        }
    }

    /// The shared value, when known before launch (host mode).
    pub fn host_value(&self) -> Option<T> {
        match self.source {
            Source::Host(value) => Some(value),
            Source::Device { .. } => None,
        }
    }
}
