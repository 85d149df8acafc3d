use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::BlasError;

/// Where scalar operands (alpha, beta) live.
///
/// Host scalars are read once per call and shared by every batch element.
/// Device scalars are read inside the launch, once per batch element, and may
/// be strided.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointerMode {
    #[default]
    Host,
    Device,
}

impl PointerMode {
    pub fn is_host(&self) -> bool {
        matches!(self, PointerMode::Host)
    }

    pub fn is_device(&self) -> bool {
        matches!(self, PointerMode::Device)
    }
}

impl fmt::Display for PointerMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PointerMode::Host => write!(f, "host"),
            PointerMode::Device => write!(f, "device"),
        }
    }
}

impl FromStr for PointerMode {
    type Err = BlasError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "host" => Ok(PointerMode::Host),
            "device" => Ok(PointerMode::Device),
            other => Err(BlasError::Config(format!("unknown pointer mode '{other}'"))),
        }
    }
}

/// Bitmask selecting what the numerics scanner does with its findings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CheckNumerics(u32);

impl CheckNumerics {
    pub const NONE: Self = Self(0);
    /// Log a summary of every scanned operand.
    pub const INFO: Self = Self(1);
    /// Log a warning when NaN or Inf is found.
    pub const WARN: Self = Self(2);
    /// Fail the call with `invalid_value` when NaN or Inf is found.
    pub const FAIL: Self = Self(4);

    pub const fn from_bits(bits: u32) -> Self {
        Self(bits & 0b111)
    }

    pub const fn bits(&self) -> u32 {
        self.0
    }

    pub const fn contains(&self, other: Self) -> bool {
        self.0 & other.0 == other.0 && other.0 != 0
    }

    pub const fn is_enabled(&self) -> bool {
        self.0 != 0
    }

    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }
}

impl std::ops::BitOr for CheckNumerics {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.union(rhs)
    }
}

impl FromStr for CheckNumerics {
    type Err = BlasError;

    /// Accepts an integer bitmask or names joined by `|` or `,`
    /// (e.g. `"warn|fail"`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Ok(bits) = s.parse::<u32>() {
            return Ok(Self::from_bits(bits));
        }
        let mut mode = Self::NONE;
        for part in s.split(['|', ',']).map(str::trim).filter(|p| !p.is_empty()) {
            mode = mode
                | match part.to_ascii_lowercase().as_str() {
                    "none" | "off" => Self::NONE,
                    "info" => Self::INFO,
                    "warn" => Self::WARN,
                    "fail" => Self::FAIL,
                    other => {
                        return Err(BlasError::Config(format!(
                            "unknown numerics check level '{other}'"
                        )))
                    }
                };
        }
        Ok(mode)
    }
}
