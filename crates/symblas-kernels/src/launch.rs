//! Work-group launch model.
//!
//! A launch is a grid of work-groups. Each group is a block of workers that
//! share a scratch buffer and advance in lock-step phases: every worker
//! finishes phase `k` before any worker starts phase `k + 1`, and a
//! [`WorkGroup::barrier`] marks each phase boundary. Groups never observe each
//! other, so the executor is free to run them in any order or in parallel.

use rayon::prelude::*;
use symblas_core::{BatchMut, Element, Result, Span};

/// Three-dimensional extent or index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Dim3 {
    pub x: usize,
    pub y: usize,
    pub z: usize,
}

impl Dim3 {
    pub const fn new(x: usize, y: usize, z: usize) -> Self {
        Self { x, y, z }
    }

    /// Number of points in the extent.
    pub fn volume(&self) -> usize {
        self.x * self.y * self.z
    }
}

/// Grid and block shape of one launch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LaunchConfig {
    pub grid: Dim3,
    pub block: Dim3,
    /// Scratch elements allocated per work-group.
    pub shared_elems: usize,
}

/// Grid tiling `n` rows in blocks of `block_x`, one grid row per batch element.
pub fn grid_1d_batched(
    n: usize,
    block_x: usize,
    block_y: usize,
    batch_count: usize,
    shared_elems: usize,
) -> LaunchConfig {
    let blocks = n.div_ceil(block_x);
    LaunchConfig {
        grid: Dim3::new(blocks, batch_count, 1),
        block: Dim3::new(block_x, block_y, 1),
        shared_elems,
    }
}

/// Grid tiling a `rows x cols` index space, one grid layer per batch element.
pub fn grid_2d_batched(
    rows: usize,
    cols: usize,
    block_x: usize,
    block_y: usize,
    batch_count: usize,
) -> LaunchConfig {
    LaunchConfig {
        grid: Dim3::new(rows.div_ceil(block_x), cols.div_ceil(block_y), batch_count),
        block: Dim3::new(block_x, block_y, 1),
        shared_elems: 0,
    }
}

/// A worker's position inside its group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Worker {
    pub x: usize,
    pub y: usize,
    /// `x + y * block.x`
    pub linear: usize,
}

/// One work-group: its grid index, block shape and shared scratch.
#[derive(Debug)]
pub struct WorkGroup<T> {
    id: Dim3,
    block: Dim3,
    scratch: Vec<T>,
    phases: usize,
    barriers: usize,
}

impl<T: Element> WorkGroup<T> {
    pub fn new(id: Dim3, block: Dim3, shared_elems: usize) -> Self {
        Self {
            id,
            block,
            scratch: vec![T::zero(); shared_elems],
            phases: 0,
            barriers: 0,
        }
    }

    pub fn id(&self) -> Dim3 {
        self.id
    }

    pub fn block(&self) -> Dim3 {
        self.block
    }

    /// Run one phase: `f` is called once per worker with the group scratch.
    ///
    /// A phase after the first must be preceded by a [`barrier`](Self::barrier).
    pub fn for_each_worker(&mut self, mut f: impl FnMut(Worker, &mut [T])) {
        debug_assert!(
            self.phases <= self.barriers,
            "work-group phase {} started without a barrier",
            self.phases
        );
        self.phases += 1;
        for y in 0..self.block.y {
            for x in 0..self.block.x {
                let linear = x + y * self.block.x;
                f(Worker { x, y, linear }, &mut self.scratch);
            }
        }
    }

    /// Group-wide barrier: all scratch writes of the previous phase are
    /// visible to every worker of the next one.
    pub fn barrier(&mut self) {
        self.barriers += 1;
    }

    /// Barriers executed so far.
    pub fn barriers(&self) -> usize {
        self.barriers
    }
}

/// Run `f(index, part)` for every part, on the current pool when `parallel`.
pub(crate) fn for_each_part<P, F>(parts: Vec<P>, parallel: bool, f: F)
where
    P: Send,
    F: Fn(usize, P) + Send + Sync,
{
    if parallel {
        parts.into_par_iter().enumerate().for_each(|(i, p)| f(i, p));
    } else {
        parts.into_iter().enumerate().for_each(|(i, p)| f(i, p));
    }
}

/// Run `kernel` once per batch element with that element's output region.
///
/// Every region is resolved before the first kernel runs, so an addressing
/// error leaves the output untouched. When the regions are pairwise disjoint
/// they are split up front and the batch elements may run in parallel.
/// Otherwise (a shared single buffer, or strides shorter than the span) they
/// run in batch order.
pub(crate) fn for_each_batch<T, F>(
    out: &mut BatchMut<'_, T>,
    operand: &'static str,
    batch_count: usize,
    span: Span,
    stride: isize,
    parallel: bool,
    kernel: F,
) -> Result<()>
where
    T: Element,
    F: Fn(usize, &mut [T]) -> Result<()> + Send + Sync,
{
    if let Some(regions) = out.split_regions(operand, batch_count, span, stride) {
        let regions = regions.into_iter().collect::<Result<Vec<_>>>()?;
        return if parallel {
            regions
                .into_par_iter()
                .enumerate()
                .try_for_each(|(batch, region)| kernel(batch, region))
        } else {
            regions
                .into_iter()
                .enumerate()
                .try_for_each(|(batch, region)| kernel(batch, region))
        };
    }

    tracing::debug!(operand, batch_count, stride, "output regions overlap, running batch elements in order");
    for batch in 0..batch_count {
        out.region(operand, batch, span, stride)?;
    }
    for batch in 0..batch_count {
        kernel(batch, out.region_mut(operand, batch, span, stride)?)?;
    }
    Ok(())
}
