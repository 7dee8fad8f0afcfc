//! Immediate coalescing: merge a newly-free block with any free neighbours
//! and fix up the surviving region's bookkeeping.

use crate::block::{Block, MIN_BLOCK_SIZE};
use crate::freelist;
use crate::heap::Heap;
use crate::provider::HeapProvider;

impl<P: HeapProvider> Heap<P> {
    /// # Safety
    /// `b`'s header must already be written as free (correct size, alloc
    /// bit clear) and, if non-mini, its footer must match. `b` must not yet
    /// be linked into any free list.
    pub(crate) unsafe fn coalesce(&mut self, b: Block) -> Block {
        let prev_free = !unsafe { b.prev_allocated() };
        let next = unsafe { b.next_in_heap() };
        let next_free = !unsafe { next.is_allocated() };

        let merged = match (prev_free, next_free) {
            (false, false) => {
                let class = freelist::class_of(unsafe { b.size() });
                unsafe { self.free_lists.insert(class, b) };
                b
            }
            (false, true) => {
                let next_size = unsafe { next.size() };
                unsafe { self.free_lists.remove_for_size(next, next_size) };
                self.merge_into(b, unsafe { b.size() } + next_size)
            }
            (true, false) => {
                let prev = unsafe { b.prev_in_heap() };
                let prev_size = unsafe { prev.size() };
                unsafe { self.free_lists.remove_for_size(prev, prev_size) };
                self.merge_into(prev, prev_size + unsafe { b.size() })
            }
            (true, true) => {
                let prev = unsafe { b.prev_in_heap() };
                let prev_size = unsafe { prev.size() };
                let next_size = unsafe { next.size() };
                unsafe {
                    self.free_lists.remove_for_size(prev, prev_size);
                    self.free_lists.remove_for_size(next, next_size);
                }
                self.merge_into(prev, prev_size + unsafe { b.size() } + next_size)
            }
        };

        let after = unsafe { merged.next_in_heap() };
        let after_size = unsafe { after.size() };
        let after_alloc = unsafe { after.is_allocated() };
        let merged_size = unsafe { merged.size() };
        unsafe {
            after.write(
                after_size,
                after_alloc,
                false,
                merged_size == MIN_BLOCK_SIZE,
            )
        };

        merged
    }

    /// Rewrite `survivor`'s header+footer to `new_size` (preserving its own
    /// prev-* flags) and reinsert it into the free-list index.
    fn merge_into(&mut self, survivor: Block, new_size: usize) -> Block {
        let prev_alloc = unsafe { survivor.prev_allocated() };
        let prev_mini = unsafe { survivor.prev_mini() };
        unsafe {
            survivor.write(new_size, false, prev_alloc, prev_mini);
            survivor.write_footer_matching_header();
            self.free_lists.insert_for_size(survivor, new_size);
        }
        survivor
    }
}
