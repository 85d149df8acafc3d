//! Scalar element trait shared by every kernel.

use std::fmt::Debug;
use std::ops::{Add, AddAssign, Mul};

use num_complex::Complex;

use crate::DType;

/// Coarse classification of one value, as reported by the numerics scanner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueClass {
    Zero,
    Normal,
    Nan,
    Inf,
}

/// A matrix/vector element the kernels can compute with.
///
/// Complex elements use plain (non-conjugating) arithmetic, so SYMV and SYR
/// stay symmetric rather than Hermitian.
pub trait Element:
    Copy
    + Debug
    + PartialEq
    + Send
    + Sync
    + Add<Output = Self>
    + Mul<Output = Self>
    + AddAssign
    + 'static
{
    const DTYPE: DType;

    fn zero() -> Self;

    fn one() -> Self;

    fn classify(self) -> ValueClass;

    /// Exact comparison against zero; `-0.0` counts as zero, NaN does not.
    #[inline]
    fn is_zero(self) -> bool {
        self == Self::zero()
    }

    #[inline]
    fn is_one(self) -> bool {
        self == Self::one()
    }
}

macro_rules! impl_real {
    ($t:ty, $dtype:expr) => {
        impl Element for $t {
            const DTYPE: DType = $dtype;

            #[inline]
            fn zero() -> Self {
                0.0
            }

            #[inline]
            fn one() -> Self {
                1.0
            }

            #[inline]
            fn classify(self) -> ValueClass {
                if self.is_nan() {
                    ValueClass::Nan
                } else if self.is_infinite() {
                    ValueClass::Inf
                } else if self == 0.0 {
                    ValueClass::Zero
                } else {
                    ValueClass::Normal
                }
            }
        }
    };
}

macro_rules! impl_complex {
    ($t:ty, $dtype:expr) => {
        impl Element for Complex<$t> {
            const DTYPE: DType = $dtype;

            #[inline]
            fn zero() -> Self {
                Complex::new(0.0, 0.0)
            }

            #[inline]
            fn one() -> Self {
                Complex::new(1.0, 0.0)
            }

            #[inline]
            fn classify(self) -> ValueClass {
                if self.re.is_nan() || self.im.is_nan() {
                    ValueClass::Nan
                } else if self.re.is_infinite() || self.im.is_infinite() {
                    ValueClass::Inf
                } else if self.re == 0.0 && self.im == 0.0 {
                    ValueClass::Zero
                } else {
                    ValueClass::Normal
                }
            }
        }
    };
}

impl_real!(f32, DType::F32);
impl_real!(f64, DType::F64);
impl_complex!(f32, DType::C32);
impl_complex!(f64, DType::C64);
