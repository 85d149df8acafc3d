//! # symblas-kernels
//!
//! Batched symmetric level-2 kernels on the CPU.
//!
//! Provides:
//! - SYMV: `y := alpha * A * x + beta * y` with only one triangle of A stored
//! - SYR: `A := A + alpha * x * x^T` restricted to the stored triangle
//! - Single, pointer-array batched, strided batched and descriptor (`_ex`)
//!   entry points for each
//! - Optional NaN/Inf scanning of vector operands around each call
//!
//! Work is laid out as a grid of work-groups ([`launch`]). Batch elements and
//! output tiles are written through disjoint slices, so independent parts run
//! on rayon without locks.

pub mod launch;
pub mod numerics;
pub mod symv;
pub mod syr;
mod validate;

pub use numerics::{check_numerics_vector, NumericsSummary};
pub use symv::{
    symv, symv_batched, symv_check_numerics, symv_ex, symv_strided_batched, SYMV_DIM_X, SYMV_DIM_Y,
};
pub use syr::{syr, syr_batched, syr_check_numerics, syr_ex, syr_strided_batched, SYR_DIM_X, SYR_DIM_Y};

pub use symblas_core::{
    Batch, BatchMut, BlasError, CheckNumerics, Element, Fill, Handle, HandleConfig, MatrixMut,
    MatrixRef, PointerMode, Result, ScalarRef, Status, VectorMut, VectorRef,
};
