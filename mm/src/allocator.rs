//! The public allocate/free/reallocate/zeroed_allocate surface, operating
//! on a single `Heap<P>` instance. The process-wide singleton in
//! `lib.rs` is a thin wrapper around these methods.

use tidepool_lib::align_up;

use crate::block::{Block, WORD_SIZE};
use crate::constants::{ALIGNMENT, CHUNKSIZE, MIN_BLOCK_SIZE};
use crate::heap::Heap;
use crate::provider::HeapProvider;

impl<P: HeapProvider> Heap<P> {
    pub fn allocate(&mut self, size: usize) -> Option<*mut u8> {
        if size == 0 || !self.initialized {
            return None;
        }

        let asize = align_up(size.saturating_add(WORD_SIZE), ALIGNMENT).max(MIN_BLOCK_SIZE);

        let b = match self.find_fit(asize) {
            Some(b) => b,
            None => self.grow(asize.max(CHUNKSIZE)).ok()?,
        };

        unsafe { self.place(b, asize) };
        Some(unsafe { b.payload() })
    }

    pub fn free(&mut self, p: *mut u8) {
        if p.is_null() || !self.initialized {
            return;
        }

        let b = unsafe { Block::from_payload(p) };
        let size = unsafe { b.size() };
        let prev_alloc = unsafe { b.prev_allocated() };
        let prev_mini = unsafe { b.prev_mini() };

        unsafe {
            b.write(size, false, prev_alloc, prev_mini);
            if size != MIN_BLOCK_SIZE {
                b.write_footer_matching_header();
            }
            self.coalesce(b);
        }
    }

    pub fn reallocate(&mut self, p: *mut u8, size: usize) -> Option<*mut u8> {
        if p.is_null() {
            return self.allocate(size);
        }
        if size == 0 {
            self.free(p);
            return None;
        }

        let old_block = unsafe { Block::from_payload(p) };
        let old_payload_size = unsafe { old_block.size() } - WORD_SIZE;

        let new_p = self.allocate(size)?;
        let copy_len = core::cmp::min(old_payload_size, size);
        unsafe { self.provider.copy(new_p, p, copy_len) };
        self.free(p);
        Some(new_p)
    }

    pub fn zeroed_allocate(&mut self, count: usize, size: usize) -> Option<*mut u8> {
        let total = count.checked_mul(size)?;
        let p = self.allocate(total)?;
        unsafe { self.provider.fill(p, 0, total) };
        Some(p)
    }
}
