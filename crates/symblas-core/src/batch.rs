//! Batch addressing.
//!
//! Every operand of a batched call is stored in one of three topologies:
//! a single buffer reused by every batch element, an array of per-element
//! buffers, or one flat buffer where element `b` starts `b * stride` elements
//! after the base. Kernels never match on the topology themselves; they ask
//! for the region of a batch element and get back a bounds-checked slice.

use crate::{BlasError, Result};

/// Storage topology of a batched operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topology {
    Single,
    PointerArray,
    Strided,
}

/// Elements touched by one batch element, relative to that element's base.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    /// First touched element, measured from the batch element's base.
    pub lo: isize,
    pub len: usize,
}

impl Span {
    /// Span of a length-`n` vector whose logical element 0 sits at `origin`.
    ///
    /// For negative `inc` the origin is the highest touched element. Fails with
    /// `InvalidSize` when the extent does not fit in `isize`.
    pub fn vector(n: usize, origin: isize, inc: isize) -> Result<Self> {
        if n == 0 {
            return Ok(Span { lo: origin, len: 0 });
        }
        let reach = isize::try_from(n - 1)
            .ok()
            .and_then(|steps| steps.checked_mul(inc))
            .ok_or_else(|| overflow("vector extent"))?;
        let lo = origin.checked_add(reach.min(0)).ok_or_else(|| overflow("vector extent"))?;
        origin.checked_add(reach.max(0)).ok_or_else(|| overflow("vector extent"))?;
        let len = reach.unsigned_abs().checked_add(1).ok_or_else(|| overflow("vector extent"))?;
        Ok(Span { lo, len })
    }

    /// Span of an `n x n` column-major matrix with leading dimension `lda`.
    pub fn matrix(n: usize, origin: isize, lda: usize) -> Result<Self> {
        if n == 0 {
            return Ok(Span { lo: origin, len: 0 });
        }
        let len = lda
            .checked_mul(n - 1)
            .and_then(|cols| cols.checked_add(n))
            .ok_or_else(|| overflow("matrix extent"))?;
        Ok(Span { lo: origin, len })
    }

    /// Last touched element, saturating at `isize::MAX`.
    pub fn hi(&self) -> isize {
        isize::try_from(self.len)
            .ok()
            .and_then(|len| self.lo.checked_add(len))
            .map_or(isize::MAX, |end| end.saturating_sub(1))
    }
}

fn overflow(what: &str) -> BlasError {
    BlasError::InvalidSize(format!("{what} overflows the address space"))
}

/// Caller-supplied offset, increment or stride as an `isize`.
pub fn to_isize(name: &str, value: i64) -> Result<isize> {
    isize::try_from(value).map_err(|_| BlasError::InvalidSize(format!("{name} = {value} does not fit in isize")))
}

/// Caller-supplied non-negative size as a `usize`.
pub fn to_usize(name: &str, value: i64) -> Result<usize> {
    usize::try_from(value).map_err(|_| BlasError::InvalidSize(format!("{name} = {value} does not fit in usize")))
}

/// Element index of logical element 0 of a length-`n` vector stored from `offset`.
///
/// With a negative increment logical element 0 is the last one in memory, so
/// the origin sits `-inc * (n - 1)` past `offset`. Depends only on the
/// increment and length, never on the batch element.
pub fn vector_origin(offset: isize, inc: isize, n: usize) -> Result<isize> {
    if inc >= 0 || n == 0 {
        return Ok(offset);
    }
    isize::try_from(n - 1)
        .ok()
        .and_then(|steps| inc.checked_mul(steps))
        .and_then(|back| offset.checked_sub(back))
        .ok_or_else(|| overflow("vector origin"))
}

/// `batch * stride + lo`, or `None` on overflow.
#[inline]
fn strided_start(batch: usize, stride: isize, lo: isize) -> Option<isize> {
    isize::try_from(batch).ok()?.checked_mul(stride)?.checked_add(lo)
}

fn element_start(
    topology: Topology,
    operand: &'static str,
    batch: usize,
    lo: isize,
    stride: isize,
) -> Result<isize> {
    match topology {
        Topology::Strided => strided_start(batch, stride, lo).ok_or_else(|| {
            BlasError::InvalidSize(format!("operand '{operand}': address of batch {batch} overflows"))
        }),
        Topology::Single | Topology::PointerArray => Ok(lo),
    }
}

fn out_of_bounds(operand: &'static str, batch: usize, start: isize, len: usize, buf_len: usize) -> BlasError {
    BlasError::OutOfBounds {
        operand,
        batch,
        lo: start,
        hi: Span { lo: start, len }.hi(),
        len: buf_len,
    }
}

fn fits(start: isize, len: usize, buf_len: usize) -> Option<usize> {
    let s = usize::try_from(start).ok()?;
    (s.checked_add(len)? <= buf_len).then_some(s)
}

fn window<'b, T>(buf: &'b [T], operand: &'static str, batch: usize, start: isize, len: usize) -> Result<&'b [T]> {
    match fits(start, len, buf.len()) {
        Some(s) => Ok(&buf[s..s + len]),
        None => Err(out_of_bounds(operand, batch, start, len, buf.len())),
    }
}

fn window_mut<'b, T>(
    buf: &'b mut [T],
    operand: &'static str,
    batch: usize,
    start: isize,
    len: usize,
) -> Result<&'b mut [T]> {
    let buf_len = buf.len();
    match fits(start, len, buf_len) {
        Some(s) => Ok(&mut buf[s..s + len]),
        None => Err(out_of_bounds(operand, batch, start, len, buf_len)),
    }
}

/// Read-only batched operand.
#[derive(Debug)]
pub enum Batch<'a, T> {
    /// One buffer shared by every batch element.
    Single(&'a [T]),
    /// One buffer per batch element.
    PointerArray(&'a [&'a [T]]),
    /// One flat buffer; element `b` is based at `b * stride`.
    Strided(&'a [T]),
}

impl<T> Clone for Batch<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Batch<'_, T> {}

impl<'a, T> Batch<'a, T> {
    pub fn topology(&self) -> Topology {
        match self {
            Batch::Single(_) => Topology::Single,
            Batch::PointerArray(_) => Topology::PointerArray,
            Batch::Strided(_) => Topology::Strided,
        }
    }

    /// Address of `offset` within batch element `batch`: the buffer it lives in
    /// and its element index there.
    pub fn resolve(
        &self,
        operand: &'static str,
        batch: usize,
        offset: isize,
        stride: isize,
    ) -> Result<(&'a [T], isize)> {
        let start = element_start(self.topology(), operand, batch, offset, stride)?;
        match *self {
            Batch::Single(buf) | Batch::Strided(buf) => Ok((buf, start)),
            Batch::PointerArray(ptrs) => ptrs
                .get(batch)
                .map(|buf| (*buf, start))
                .ok_or(BlasError::MissingBatchPointer { operand, batch }),
        }
    }

    /// Bounds-checked slice covering `span` of batch element `batch`.
    pub fn region(&self, operand: &'static str, batch: usize, span: Span, stride: isize) -> Result<&'a [T]> {
        let (buf, start) = self.resolve(operand, batch, span.lo, stride)?;
        window(buf, operand, batch, start, span.len)
    }
}

/// Mutable batched operand.
#[derive(Debug)]
pub enum BatchMut<'a, T> {
    Single(&'a mut [T]),
    PointerArray(Vec<&'a mut [T]>),
    Strided(&'a mut [T]),
}

impl<'a, T> BatchMut<'a, T> {
    pub fn topology(&self) -> Topology {
        match self {
            BatchMut::Single(_) => Topology::Single,
            BatchMut::PointerArray(_) => Topology::PointerArray,
            BatchMut::Strided(_) => Topology::Strided,
        }
    }

    fn buffer(&self, batch: usize) -> Option<&[T]> {
        match self {
            BatchMut::Single(buf) | BatchMut::Strided(buf) => Some(&**buf),
            BatchMut::PointerArray(ptrs) => ptrs.get(batch).map(|buf| &**buf),
        }
    }

    /// Bounds-checked shared view of `span` for batch element `batch`.
    pub fn region(&self, operand: &'static str, batch: usize, span: Span, stride: isize) -> Result<&[T]> {
        let buf = self
            .buffer(batch)
            .ok_or(BlasError::MissingBatchPointer { operand, batch })?;
        let start = element_start(self.topology(), operand, batch, span.lo, stride)?;
        window(buf, operand, batch, start, span.len)
    }

    /// Bounds-checked mutable view of `span` for batch element `batch`.
    pub fn region_mut(
        &mut self,
        operand: &'static str,
        batch: usize,
        span: Span,
        stride: isize,
    ) -> Result<&mut [T]> {
        let topology = self.topology();
        let buf: &mut [T] = match self {
            BatchMut::Single(buf) | BatchMut::Strided(buf) => &mut **buf,
            BatchMut::PointerArray(ptrs) => match ptrs.get_mut(batch) {
                Some(buf) => &mut **buf,
                None => return Err(BlasError::MissingBatchPointer { operand, batch }),
            },
        };
        let start = element_start(topology, operand, batch, span.lo, stride)?;
        window_mut(buf, operand, batch, start, span.len)
    }

    /// Whether the `span` regions of all `batch_count` elements are pairwise
    /// disjoint, so they can be handed out as independent `&mut` slices.
    pub fn is_disjoint(&self, batch_count: usize, span: Span, stride: isize) -> bool {
        if batch_count <= 1 {
            return true;
        }
        match self {
            BatchMut::PointerArray(_) => true,
            BatchMut::Single(_) => false,
            BatchMut::Strided(_) => stride > 0 && stride as usize >= span.len,
        }
    }

    /// Split into one mutable region per batch element. `None` unless
    /// [`is_disjoint`](Self::is_disjoint) holds. Entries that fall outside
    /// their buffer are reported individually.
    pub fn split_regions(
        &mut self,
        operand: &'static str,
        batch_count: usize,
        span: Span,
        stride: isize,
    ) -> Option<Vec<Result<&mut [T]>>> {
        if !self.is_disjoint(batch_count, span, stride) {
            return None;
        }
        if batch_count == 1 {
            return Some(vec![self.region_mut(operand, 0, span, stride)]);
        }
        match self {
            BatchMut::PointerArray(ptrs) => {
                let mut out: Vec<Result<&mut [T]>> = ptrs
                    .iter_mut()
                    .take(batch_count)
                    .enumerate()
                    .map(|(batch, buf)| window_mut(&mut **buf, operand, batch, span.lo, span.len))
                    .collect();
                let have = out.len();
                out.extend(
                    (have..batch_count).map(|batch| Err(BlasError::MissingBatchPointer { operand, batch })),
                );
                Some(out)
            }
            BatchMut::Strided(buf) => Some(split_strided(&mut **buf, operand, batch_count, span, stride)),
            BatchMut::Single(_) => None,
        }
    }
}

fn split_strided<'b, T>(
    buf: &'b mut [T],
    operand: &'static str,
    batch_count: usize,
    span: Span,
    stride: isize,
) -> Vec<Result<&'b mut [T]>> {
    let buf_len = buf.len();
    let step = stride.unsigned_abs();
    let oob = |batch: usize| {
        let start = strided_start(batch, stride, span.lo).unwrap_or(isize::MAX);
        out_of_bounds(operand, batch, start, span.len, buf_len)
    };

    let tail = match usize::try_from(span.lo).ok().and_then(|lo| buf.get_mut(lo..)) {
        Some(tail) => tail,
        None => return (0..batch_count).map(|batch| Err(oob(batch))).collect(),
    };
    let mut chunks = tail.chunks_mut(step);
    (0..batch_count)
        .map(|batch| match chunks.next() {
            Some(chunk) if chunk.len() >= span.len => Ok(&mut chunk[..span.len]),
            _ => Err(oob(batch)),
        })
        .collect()
}

/// Shared read access to a batched operand, mutable or not.
pub trait BatchRead<T> {
    fn topology(&self) -> Topology;

    fn read_region(&self, operand: &'static str, batch: usize, span: Span, stride: isize) -> Result<&[T]>;
}

impl<T> BatchRead<T> for Batch<'_, T> {
    fn topology(&self) -> Topology {
        Batch::topology(self)
    }

    fn read_region(&self, operand: &'static str, batch: usize, span: Span, stride: isize) -> Result<&[T]> {
        self.region(operand, batch, span, stride)
    }
}

impl<T> BatchRead<T> for BatchMut<'_, T> {
    fn topology(&self) -> Topology {
        BatchMut::topology(self)
    }

    fn read_region(&self, operand: &'static str, batch: usize, span: Span, stride: isize) -> Result<&[T]> {
        self.region(operand, batch, span, stride)
    }
}
