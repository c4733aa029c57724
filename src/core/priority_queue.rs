//! Growable binary min-heap ordered by a caller-supplied comparator.
//!
//! Storage is split into fixed-size chunks (about one megabyte of elements
//! each). While the heap fits a single chunk the backing buffer doubles in
//! place; past that point the number of chunks doubles instead, so already
//! filled chunks are never moved and no single allocation grows without bound.

use log::error;
use std::collections::TryReserveError;

/// Initial number of element slots
const MIN_ALLOC: usize = 8;

/// Upper bound on the bytes held by one chunk
pub const MAX_CHUNK_BYTES: usize = 0x100000;

/// Comparator used when no closure is supplied: `true` when `left` ranks after `right`
pub type GreaterThan<T> = fn(&T, &T) -> bool;

fn ord_greater_than<T: Ord>(left: &T, right: &T) -> bool {
    left > right
}

/// Growth is required to keep the heap contract; there is no way to continue without it.
fn growth_failed(err: TryReserveError) -> ! {
    error!("out of memory while growing priority queue: {}", err);
    std::process::abort()
}

pub struct PriorityQueue<T, F = GreaterThan<T>> {
    chunks: Vec<Vec<T>>,
    greater_than: F,
    /// Element slots currently reserved across all chunks
    allocated_elements: usize,
    elements_per_chunk: usize,
    len: usize,
}

impl<T: Ord> PriorityQueue<T> {
    /// Heap ordered by `T`'s natural ordering
    pub fn ordered() -> Self {
        Self::new(ord_greater_than::<T>)
    }
}

impl<T, F> PriorityQueue<T, F>
where
    F: Fn(&T, &T) -> bool,
{
    /// Create an empty heap; `greater_than(a, b)` must return true when `a` ranks after `b`
    pub fn new(greater_than: F) -> Self {
        Self::with_chunk_bytes(greater_than, MAX_CHUNK_BYTES)
    }

    /// Create an empty heap with a custom chunk size bound
    pub fn with_chunk_bytes(greater_than: F, chunk_bytes: usize) -> Self {
        let element_size = std::mem::size_of::<T>().max(1);
        let elements_per_chunk = (chunk_bytes / element_size).max(1);
        let allocated_elements = MIN_ALLOC.min(elements_per_chunk);

        let mut first = Vec::new();
        first
            .try_reserve_exact(allocated_elements)
            .unwrap_or_else(|e| growth_failed(e));

        Self {
            chunks: vec![first],
            greater_than,
            allocated_elements,
            elements_per_chunk,
            len: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Element slots reserved so far
    pub fn capacity(&self) -> usize {
        self.allocated_elements
    }

    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    pub fn elements_per_chunk(&self) -> usize {
        self.elements_per_chunk
    }

    /// The element the comparator ranks smallest, without removing it
    pub fn minimum(&self) -> Option<&T> {
        if self.len == 0 {
            None
        } else {
            Some(self.at(0))
        }
    }

    pub fn insert(&mut self, element: T) {
        if self.len >= self.allocated_elements {
            self.grow();
        }

        let index = self.len;
        self.chunks[index / self.elements_per_chunk].push(element);
        self.len += 1;

        self.bubble_up(index);
    }

    /// Remove and return the minimum element
    pub fn delete_minimum(&mut self) -> Option<T> {
        if self.len == 0 {
            return None;
        }

        let last = self.len - 1;
        self.swap(0, last);
        let minimum = self.chunks[last / self.elements_per_chunk].pop();
        self.len -= 1;

        self.bubble_down(0);
        minimum
    }

    fn at(&self, index: usize) -> &T {
        &self.chunks[index / self.elements_per_chunk][index % self.elements_per_chunk]
    }

    fn swap(&mut self, a: usize, b: usize) {
        let per = self.elements_per_chunk;
        let (chunk_a, offset_a) = (a / per, a % per);
        let (chunk_b, offset_b) = (b / per, b % per);

        if chunk_a == chunk_b {
            self.chunks[chunk_a].swap(offset_a, offset_b);
        } else if chunk_a < chunk_b {
            let (left, right) = self.chunks.split_at_mut(chunk_b);
            std::mem::swap(&mut left[chunk_a][offset_a], &mut right[0][offset_b]);
        } else {
            let (left, right) = self.chunks.split_at_mut(chunk_a);
            std::mem::swap(&mut right[0][offset_a], &mut left[chunk_b][offset_b]);
        }
    }

    fn bubble_up(&mut self, mut index: usize) {
        while index > 0 {
            let parent = (index - 1) / 2;
            if (self.greater_than)(self.at(parent), self.at(index)) {
                self.swap(index, parent);
                index = parent;
            } else {
                break;
            }
        }
    }

    fn bubble_down(&mut self, mut index: usize) {
        loop {
            let left = 2 * index + 1;
            if left >= self.len {
                return; // leaf
            }

            let mut min_index = index;
            if (self.greater_than)(self.at(index), self.at(left)) {
                min_index = left;
            }

            let right = left + 1;
            if right < self.len && (self.greater_than)(self.at(min_index), self.at(right)) {
                min_index = right;
            }

            if min_index == index {
                return;
            }
            self.swap(index, min_index);
            index = min_index;
        }
    }

    fn grow(&mut self) {
        let per = self.elements_per_chunk;
        self.allocated_elements *= 2;

        if self.allocated_elements > per {
            // Chunked regime: double the chunk count, keep filled chunks in place
            let old_count = self.chunks.len();
            let new_count = old_count * 2;
            self.allocated_elements = new_count * per;

            if old_count == 1 {
                let first = &mut self.chunks[0];
                let additional = per.saturating_sub(first.len());
                first
                    .try_reserve_exact(additional)
                    .unwrap_or_else(|e| growth_failed(e));
            }

            self.chunks
                .try_reserve_exact(new_count - old_count)
                .unwrap_or_else(|e| growth_failed(e));
            for _ in old_count..new_count {
                let mut chunk = Vec::new();
                chunk
                    .try_reserve_exact(per)
                    .unwrap_or_else(|e| growth_failed(e));
                self.chunks.push(chunk);
            }
        } else {
            let first = &mut self.chunks[0];
            let additional = self.allocated_elements - first.len();
            first
                .try_reserve_exact(additional)
                .unwrap_or_else(|e| growth_failed(e));
        }
    }
}

impl<T: std::fmt::Debug, F> std::fmt::Debug for PriorityQueue<T, F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PriorityQueue")
            .field("len", &self.len)
            .field("allocated_elements", &self.allocated_elements)
            .field("chunks", &self.chunks.len())
            .finish()
    }
}
