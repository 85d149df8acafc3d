use std::fmt;

use serde::{Deserialize, Serialize};

use crate::BlasError;

/// Which triangle of a symmetric matrix is physically stored.
///
/// Discriminants follow the BLAS enumeration codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u32)]
pub enum Fill {
    Upper = 121,
    Lower = 122,
    /// Both triangles. Not accepted by the symmetric kernels.
    Full = 123,
}

impl Fill {
    /// Decode a raw BLAS fill code.
    pub fn from_raw(code: u32) -> Option<Self> {
        match code {
            121 => Some(Fill::Upper),
            122 => Some(Fill::Lower),
            123 => Some(Fill::Full),
            _ => None,
        }
    }

    pub fn is_triangular(&self) -> bool {
        matches!(self, Fill::Upper | Fill::Lower)
    }

    /// Whether element (row, col) lies inside the stored triangle.
    #[inline]
    pub fn contains(&self, row: usize, col: usize) -> bool {
        match self {
            Fill::Upper => row <= col,
            Fill::Lower => row >= col,
            Fill::Full => true,
        }
    }
}

impl TryFrom<u32> for Fill {
    type Error = BlasError;

    fn try_from(code: u32) -> Result<Self, Self::Error> {
        Fill::from_raw(code).ok_or_else(|| BlasError::InvalidValue(format!("unknown fill code {code}")))
    }
}

impl fmt::Display for Fill {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Fill::Upper => write!(f, "upper"),
            Fill::Lower => write!(f, "lower"),
            Fill::Full => write!(f, "full"),
        }
    }
}
