//! Strided vector and column-major matrix views over a trimmed region.
//!
//! A view is built on the exact slice returned by the batch addressing layer
//! (see [`Span`](crate::Span)), so every logical index it accepts is in bounds.

use crate::Fill;

#[inline]
fn strided_index(origin: usize, inc: isize, i: usize) -> usize {
    (origin as isize + i as isize * inc) as usize
}

/// Read-only strided vector of logical length `len`.
#[derive(Debug)]
pub struct VectorView<'a, T> {
    data: &'a [T],
    origin: usize,
    inc: isize,
    len: usize,
}

impl<T> Clone for VectorView<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for VectorView<'_, T> {}

impl<'a, T: Copy> VectorView<'a, T> {
    /// `origin` is the index of logical element 0 inside `data`.
    pub fn new(data: &'a [T], origin: usize, inc: isize, len: usize) -> Self {
        debug_assert!(len == 0 || strided_index(origin, inc, len - 1) < data.len());
        Self { data, origin, inc, len }
    }

    /// View over a region trimmed to exactly the vector's span.
    pub fn from_span(data: &'a [T], inc: isize, len: usize) -> Self {
        let origin = if inc < 0 { data.len().saturating_sub(1) } else { 0 };
        Self::new(data, origin, inc, len)
    }

    #[inline]
    pub fn get(&self, i: usize) -> T {
        self.data[strided_index(self.origin, self.inc, i)]
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn inc(&self) -> isize {
        self.inc
    }

    /// Logical elements in index order.
    pub fn iter(&self) -> impl Iterator<Item = T> + '_ {
        (0..self.len).map(move |i| self.get(i))
    }
}

/// Mutable strided vector of logical length `len`.
#[derive(Debug)]
pub struct VectorViewMut<'a, T> {
    data: &'a mut [T],
    origin: usize,
    inc: isize,
    len: usize,
}

impl<'a, T: Copy> VectorViewMut<'a, T> {
    pub fn new(data: &'a mut [T], origin: usize, inc: isize, len: usize) -> Self {
        debug_assert!(len == 0 || strided_index(origin, inc, len - 1) < data.len());
        Self { data, origin, inc, len }
    }

    /// View over a region trimmed to exactly the vector's span.
    pub fn from_span(data: &'a mut [T], inc: isize, len: usize) -> Self {
        let origin = if inc < 0 { data.len().saturating_sub(1) } else { 0 };
        Self::new(data, origin, inc, len)
    }

    #[inline]
    pub fn get(&self, i: usize) -> T {
        self.data[strided_index(self.origin, self.inc, i)]
    }

    #[inline]
    pub fn set(&mut self, i: usize, value: T) {
        self.data[strided_index(self.origin, self.inc, i)] = value;
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Split into consecutive tiles of `tile` logical elements each (the last
    /// one may be shorter). Tiles own disjoint memory, so they can be written
    /// from different workers.
    ///
    /// Requires a view built with [`from_span`](Self::from_span).
    pub fn into_tiles(self, tile: usize) -> Vec<VectorViewMut<'a, T>> {
        let VectorViewMut { data, inc, len, .. } = self;
        if len == 0 {
            return Vec::new();
        }
        let step = tile.saturating_mul(inc.unsigned_abs());
        let count = |t: usize| tile.min(len - t * tile);
        if inc > 0 {
            data.chunks_mut(step)
                .enumerate()
                .map(|(t, chunk)| VectorViewMut { data: chunk, origin: 0, inc, len: count(t) })
                .collect()
        } else {
            // Logical element 0 sits at the high end, so tiles are cut from the back.
            data.rchunks_mut(step)
                .enumerate()
                .map(|(t, chunk)| {
                    let origin = chunk.len() - 1;
                    VectorViewMut { data: chunk, origin, inc, len: count(t) }
                })
                .collect()
        }
    }
}

/// Read-only `n x n` column-major matrix: element (row, col) at `row + col * lda`.
#[derive(Debug)]
pub struct MatrixView<'a, T> {
    data: &'a [T],
    lda: usize,
    n: usize,
}

impl<T> Clone for MatrixView<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for MatrixView<'_, T> {}

impl<'a, T: Copy> MatrixView<'a, T> {
    pub fn new(data: &'a [T], lda: usize, n: usize) -> Self {
        debug_assert!(n == 0 || lda * (n - 1) + n <= data.len());
        Self { data, lda, n }
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> T {
        self.data[row + col * self.lda]
    }

    /// Element (row, col) of the symmetric matrix whose `fill` triangle is
    /// stored; positions outside the triangle read their mirror.
    #[inline]
    pub fn symmetric(&self, fill: Fill, row: usize, col: usize) -> T {
        if fill.contains(row, col) {
            self.get(row, col)
        } else {
            self.get(col, row)
        }
    }

    pub fn n(&self) -> usize {
        self.n
    }

    pub fn lda(&self) -> usize {
        self.lda
    }
}

/// Mutable block of consecutive columns of an `n x n` column-major matrix.
#[derive(Debug)]
pub struct MatrixViewMut<'a, T> {
    data: &'a mut [T],
    lda: usize,
    n: usize,
    col_start: usize,
    cols: usize,
}

impl<'a, T: Copy> MatrixViewMut<'a, T> {
    /// Whole-matrix view over a region trimmed to the matrix span.
    pub fn new(data: &'a mut [T], lda: usize, n: usize) -> Self {
        debug_assert!(n == 0 || lda * (n - 1) + n <= data.len());
        Self { data, lda, n, col_start: 0, cols: n }
    }

    /// Columns covered by this view, as global column indices.
    pub fn columns(&self) -> std::ops::Range<usize> {
        self.col_start..self.col_start + self.cols
    }

    pub fn n(&self) -> usize {
        self.n
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> T {
        self.data[row + (col - self.col_start) * self.lda]
    }

    /// Mutable element at global (row, col); `col` must lie in [`columns`](Self::columns).
    #[inline]
    pub fn get_mut(&mut self, row: usize, col: usize) -> &mut T {
        &mut self.data[row + (col - self.col_start) * self.lda]
    }

    /// Split into blocks of `block` consecutive columns owning disjoint memory.
    pub fn into_column_blocks(self, block: usize) -> Vec<MatrixViewMut<'a, T>> {
        let MatrixViewMut { data, lda, n, col_start, cols } = self;
        if cols == 0 {
            return Vec::new();
        }
        data.chunks_mut(lda.saturating_mul(block))
            .enumerate()
            .map(|(b, chunk)| MatrixViewMut {
                data: chunk,
                lda,
                n,
                col_start: col_start + b * block,
                cols: block.min(cols - b * block),
            })
            .collect()
    }
}
