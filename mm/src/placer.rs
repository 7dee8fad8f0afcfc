//! Best-fit approximation and splitting.

use crate::block::{Block, MIN_BLOCK_SIZE};
use crate::constants::FIND_FIT_MAX_CANDIDATES;
use crate::freelist::{self, NUM_CLASSES};
use crate::heap::Heap;
use crate::provider::HeapProvider;

impl<P: HeapProvider> Heap<P> {
    /// Starting at `class_of(asize)`, walk classes low to high. Within the
    /// first class that has any block of size `>= asize`, examine up to
    /// `FIND_FIT_MAX_CANDIDATES` qualifying candidates and return the
    /// smallest. Never mixes candidates across classes.
    pub(crate) fn find_fit(&self, asize: usize) -> Option<Block> {
        for class in freelist::class_of(asize)..NUM_CLASSES {
            let mut best: Option<Block> = None;
            let mut examined = 0usize;
            let mut cursor = self.free_lists.head(class);
            while let Some(node) = cursor {
                let size = unsafe { node.size() };
                if size >= asize {
                    best = match best {
                        Some(b) if unsafe { b.size() } <= size => Some(b),
                        _ => Some(node),
                    };
                    examined += 1;
                    if examined >= FIND_FIT_MAX_CANDIDATES {
                        break;
                    }
                }
                cursor = unsafe { node.free_next() };
            }
            if best.is_some() {
                return best;
            }
        }
        None
    }

    /// # Safety
    /// `b` must be free, linked into the free-list class matching its
    /// current size, and `b.size() >= asize`.
    pub(crate) unsafe fn place(&mut self, b: Block, asize: usize) {
        let size = unsafe { b.size() };
        let class = freelist::class_of(size);
        unsafe { self.free_lists.remove(class, b) };

        let prev_alloc = unsafe { b.prev_allocated() };
        let prev_mini = unsafe { b.prev_mini() };

        if size - asize >= MIN_BLOCK_SIZE {
            unsafe { b.write(asize, true, prev_alloc, prev_mini) };

            let remainder = unsafe { b.next_in_heap() };
            let remainder_size = size - asize;
            unsafe {
                remainder.write(remainder_size, false, true, asize == MIN_BLOCK_SIZE);
                if remainder_size != MIN_BLOCK_SIZE {
                    remainder.write_footer_matching_header();
                }
                self.free_lists.insert_for_size(remainder, remainder_size);
            }

            let after = unsafe { remainder.next_in_heap() };
            self.fixup_prev_flags(after, false, remainder_size == MIN_BLOCK_SIZE);
        } else {
            unsafe { b.write(size, true, prev_alloc, prev_mini) };
            let after = unsafe { b.next_in_heap() };
            self.fixup_prev_flags(after, true, size == MIN_BLOCK_SIZE);
        }
    }

    /// Rewrite `block`'s header, keeping its own size/allocated bit but
    /// setting prev-allocated/prev-mini to describe its new left neighbour.
    fn fixup_prev_flags(&mut self, block: Block, prev_alloc: bool, prev_mini: bool) {
        let size = unsafe { block.size() };
        let alloc = unsafe { block.is_allocated() };
        unsafe { block.write(size, alloc, prev_alloc, prev_mini) };
    }
}
