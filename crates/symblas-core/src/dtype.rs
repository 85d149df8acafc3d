use std::fmt;

/// Element precisions supported by the symblas kernels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DType {
    /// 32-bit IEEE 754 single-precision float
    F32,
    /// 64-bit IEEE 754 double-precision float
    F64,
    /// Complex number with f32 real and imaginary parts
    C32,
    /// Complex number with f64 real and imaginary parts
    C64,
}

impl DType {
    /// BLAS precision prefix (`s`, `d`, `c`, `z`).
    pub fn blas_prefix(&self) -> char {
        match self {
            DType::F32 => 's',
            DType::F64 => 'd',
            DType::C32 => 'c',
            DType::C64 => 'z',
        }
    }

    /// Conventional BLAS routine name, e.g. `dsymv` for `("symv", F64)`.
    pub fn routine(&self, base: &str) -> String {
        format!("{}{base}", self.blas_prefix())
    }
}

impl fmt::Display for DType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DType::F32 => write!(f, "f32"),
            DType::F64 => write!(f, "f64"),
            DType::C32 => write!(f, "c32"),
            DType::C64 => write!(f, "c64"),
        }
    }
}
