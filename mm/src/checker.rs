//! Full-heap consistency checker. Debug-only in the sense that nothing in
//! this crate's control flow depends on its result beyond the caller
//! choosing to assert on it.

use tidepool_lib::klog_error;

use crate::block::{Block, MIN_BLOCK_SIZE, WORD_SIZE};
use crate::constants::ALIGNMENT;
use crate::error::{HeapError, HeapResult};
use crate::freelist::{self, NUM_CLASSES};
use crate::heap::Heap;
use crate::provider::HeapProvider;

impl<P: HeapProvider> Heap<P> {
    /// Walk the heap twice: once linearly via `next_in_heap`, once per free
    /// list, and assert the two free-block tallies agree. Returns `false`
    /// (logging the call site) on any violated invariant.
    pub fn check_heap(&self, line: u32) -> bool {
        match self.check_heap_inner() {
            Ok(()) => true,
            Err(e) => {
                klog_error!("check_heap (line {}): {}", line, e);
                false
            }
        }
    }

    fn check_heap_inner(&self) -> HeapResult<()> {
        if !self.initialized {
            return Err(HeapError::NotInitialized);
        }

        let (walk_count, walk_size) = self.walk_implicit_list()?;
        let (list_count, list_size) = self.walk_free_lists()?;

        // Flag corruption if either tally disagrees, not only both: `&&`
        // here would let a mismatch slip through whenever just one of the
        // two still happens to agree (see DESIGN.md).
        if walk_count != list_count || walk_size != list_size {
            return Err(HeapError::Corrupt);
        }
        Ok(())
    }

    fn walk_implicit_list(&self) -> HeapResult<(usize, usize)> {
        let prologue = unsafe { Block::at(self.prologue) };
        if unsafe { prologue.size() } != 0 || !unsafe { prologue.is_allocated() } {
            return Err(HeapError::Corrupt);
        }

        let mut free_count = 0usize;
        let mut free_size = 0usize;
        let mut prev = prologue;
        // The prologue is a size-0 sentinel, so `next_in_heap` (which steps
        // by the current block's size) would leave `cursor` sitting on the
        // prologue forever. The first real block header is one word past
        // the prologue, not `prologue.size()` bytes past it.
        let mut cursor = unsafe { Block::at(self.prologue.add(WORD_SIZE)) };

        loop {
            let addr = cursor.as_ptr() as usize;
            if addr < self.prologue as usize || addr > self.epilogue as usize {
                return Err(HeapError::Corrupt);
            }
            if addr == self.epilogue as usize {
                if unsafe { cursor.size() } != 0 || !unsafe { cursor.is_allocated() } {
                    return Err(HeapError::Corrupt);
                }
                break;
            }

            let size = unsafe { cursor.size() };
            if size == 0 || size % ALIGNMENT != 0 || size < MIN_BLOCK_SIZE {
                return Err(HeapError::Corrupt);
            }

            let left_allocated = unsafe { prev.is_allocated() };
            let left_is_mini = unsafe { prev.size() } == MIN_BLOCK_SIZE;
            if unsafe { cursor.prev_allocated() } != left_allocated
                || unsafe { cursor.prev_mini() } != left_is_mini
            {
                return Err(HeapError::Corrupt);
            }

            let allocated = unsafe { cursor.is_allocated() };
            if !allocated {
                if !left_allocated {
                    return Err(HeapError::Corrupt);
                }
                if size != MIN_BLOCK_SIZE && unsafe { cursor.footer() } != unsafe { cursor.header() }
                {
                    return Err(HeapError::Corrupt);
                }
                free_count += 1;
                free_size += size;
            }

            prev = cursor;
            cursor = unsafe { cursor.next_in_heap() };
        }

        Ok((free_count, free_size))
    }

    fn walk_free_lists(&self) -> HeapResult<(usize, usize)> {
        let mut count = 0usize;
        let mut size_sum = 0usize;

        for class in 0..NUM_CLASSES {
            let mut prev_node: Option<Block> = None;
            let mut node = self.free_lists.head(class);
            while let Some(b) = node {
                let addr = b.as_ptr() as usize;
                if addr < self.prologue as usize || addr >= self.epilogue as usize {
                    return Err(HeapError::Corrupt);
                }
                if unsafe { b.is_allocated() } {
                    return Err(HeapError::Corrupt);
                }
                let size = unsafe { b.size() };
                if freelist::class_of(size) != class {
                    return Err(HeapError::Corrupt);
                }
                if class != 0 && unsafe { b.free_prev() } != prev_node {
                    return Err(HeapError::Corrupt);
                }

                count += 1;
                size_sum += size;
                prev_node = Some(b);
                node = unsafe { b.free_next() };
            }
        }

        Ok((count, size_sum))
    }
}
