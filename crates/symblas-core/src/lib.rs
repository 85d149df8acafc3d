//! # symblas-core
//!
//! Operand model for the symblas symmetric level-2 kernels.
//!
//! Provides:
//! - Element types (f32, f64 and their complex counterparts)
//! - Fill, pointer-mode and numerics-check enumerations
//! - Batch addressing over single, pointer-array and strided-flat storage
//! - Strided vector / column-major matrix views
//! - Host or device scalar resolution
//! - The `Handle` execution context and its configuration

pub mod dtype;
pub mod element;
pub mod error;
pub mod fill;
pub mod mode;
pub mod batch;
pub mod view;
pub mod scalar;
pub mod operand;
pub mod handle;

pub use dtype::DType;
pub use element::{Element, ValueClass};
pub use error::{BlasError, Status};
pub use fill::Fill;
pub use mode::{CheckNumerics, PointerMode};
pub use batch::{to_isize, to_usize, vector_origin, Batch, BatchMut, BatchRead, Span, Topology};
pub use view::{MatrixView, MatrixViewMut, VectorView, VectorViewMut};
pub use scalar::ScalarSource;
pub use operand::{MatrixMut, MatrixRef, ScalarRef, VectorMut, VectorRef};
pub use handle::{Handle, HandleConfig};

pub type Result<T> = std::result::Result<T, BlasError>;
