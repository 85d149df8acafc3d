//! Operand descriptors for the symmetric level-2 entry points.
//!
//! A descriptor pairs batched storage with the logical addressing parameters
//! (offset, increment or leading dimension, batch stride). `data: None` models
//! a null operand. Integer parameters are signed so that invalid sizes can be
//! expressed and rejected by validation.

use crate::{Batch, BatchMut};

/// Alpha / beta operand. Host mode reads `values[0]`; device mode reads
/// `values[b * stride]` for batch element `b`.
#[derive(Debug)]
pub struct ScalarRef<'a, T> {
    pub values: Option<&'a [T]>,
    pub stride: i64,
}

impl<T> Clone for ScalarRef<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for ScalarRef<'_, T> {}

impl<'a, T> ScalarRef<'a, T> {
    /// A single value shared by every batch element.
    pub fn host(value: &'a T) -> Self {
        Self { values: Some(std::slice::from_ref(value)), stride: 0 }
    }

    /// Per-batch values `values[b * stride]`.
    pub fn device(values: &'a [T], stride: i64) -> Self {
        Self { values: Some(values), stride }
    }

    pub fn null() -> Self {
        Self { values: None, stride: 0 }
    }
}

/// Read-only vector operand.
#[derive(Debug)]
pub struct VectorRef<'a, T> {
    pub data: Option<Batch<'a, T>>,
    pub offset: i64,
    pub inc: i64,
    pub stride: i64,
}

impl<T> Clone for VectorRef<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for VectorRef<'_, T> {}

impl<'a, T> VectorRef<'a, T> {
    pub fn new(data: Batch<'a, T>, inc: i64) -> Self {
        Self { data: Some(data), offset: 0, inc, stride: 0 }
    }

    pub fn null(inc: i64) -> Self {
        Self { data: None, offset: 0, inc, stride: 0 }
    }

    pub fn with_offset(mut self, offset: i64) -> Self {
        self.offset = offset;
        self
    }

    pub fn with_stride(mut self, stride: i64) -> Self {
        self.stride = stride;
        self
    }
}

/// Mutable vector operand.
#[derive(Debug)]
pub struct VectorMut<'a, T> {
    pub data: Option<BatchMut<'a, T>>,
    pub offset: i64,
    pub inc: i64,
    pub stride: i64,
}

impl<'a, T> VectorMut<'a, T> {
    pub fn new(data: BatchMut<'a, T>, inc: i64) -> Self {
        Self { data: Some(data), offset: 0, inc, stride: 0 }
    }

    pub fn null(inc: i64) -> Self {
        Self { data: None, offset: 0, inc, stride: 0 }
    }

    pub fn with_offset(mut self, offset: i64) -> Self {
        self.offset = offset;
        self
    }

    pub fn with_stride(mut self, stride: i64) -> Self {
        self.stride = stride;
        self
    }
}

/// Read-only column-major matrix operand.
#[derive(Debug)]
pub struct MatrixRef<'a, T> {
    pub data: Option<Batch<'a, T>>,
    pub offset: i64,
    pub lda: i64,
    pub stride: i64,
}

impl<T> Clone for MatrixRef<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for MatrixRef<'_, T> {}

impl<'a, T> MatrixRef<'a, T> {
    pub fn new(data: Batch<'a, T>, lda: i64) -> Self {
        Self { data: Some(data), offset: 0, lda, stride: 0 }
    }

    pub fn null(lda: i64) -> Self {
        Self { data: None, offset: 0, lda, stride: 0 }
    }

    pub fn with_offset(mut self, offset: i64) -> Self {
        self.offset = offset;
        self
    }

    pub fn with_stride(mut self, stride: i64) -> Self {
        self.stride = stride;
        self
    }
}

/// Mutable column-major matrix operand.
#[derive(Debug)]
pub struct MatrixMut<'a, T> {
    pub data: Option<BatchMut<'a, T>>,
    pub offset: i64,
    pub lda: i64,
    pub stride: i64,
}

impl<'a, T> MatrixMut<'a, T> {
    pub fn new(data: BatchMut<'a, T>, lda: i64) -> Self {
        Self { data: Some(data), offset: 0, lda, stride: 0 }
    }

    pub fn null(lda: i64) -> Self {
        Self { data: None, offset: 0, lda, stride: 0 }
    }

    pub fn with_offset(mut self, offset: i64) -> Self {
        self.offset = offset;
        self
    }

    pub fn with_stride(mut self, stride: i64) -> Self {
        self.stride = stride;
        self
    }
}
