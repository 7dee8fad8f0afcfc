//! The allocator's process-wide state: the provider it grows against, the
//! free-list index, and the two sentinel addresses that bound the managed
//! region.

use tidepool_lib::align_up;

use crate::block::{Block, WORD_SIZE};
use crate::constants::{ALIGNMENT, CHUNKSIZE};
use crate::error::{HeapError, HeapResult};
use crate::freelist::FreeListIndex;
use crate::provider::HeapProvider;

pub struct Heap<P: HeapProvider> {
    pub(crate) provider: P,
    pub(crate) free_lists: FreeListIndex,
    pub(crate) prologue: *mut u8,
    pub(crate) epilogue: *mut u8,
    pub(crate) initialized: bool,
}

// The provider and the two raw sentinel pointers are only ever touched
// behind the `spin::Mutex` the process-wide singleton wraps this in.
unsafe impl<P: HeapProvider> Send for Heap<P> {}

impl<P: HeapProvider> Heap<P> {
    pub const fn new(provider: P) -> Self {
        Self {
            provider,
            free_lists: FreeListIndex::new(),
            prologue: core::ptr::null_mut(),
            epilogue: core::ptr::null_mut(),
            initialized: false,
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Request 16 bytes for prologue+epilogue, clear the free-list index,
    /// then grow by one `CHUNKSIZE`.
    pub fn initialize(&mut self) -> HeapResult<()> {
        let base = self
            .provider
            .extend(2 * WORD_SIZE)
            .ok_or(HeapError::OutOfMemory)?;

        let prologue = unsafe { Block::at(base) };
        unsafe { prologue.write(0, true, true, false) };

        let epilogue_ptr = unsafe { base.add(WORD_SIZE) };
        let epilogue = unsafe { Block::at(epilogue_ptr) };
        unsafe { epilogue.write(0, true, true, false) };

        self.prologue = base;
        self.epilogue = epilogue_ptr;
        self.free_lists = FreeListIndex::new();
        self.initialized = true;

        self.grow(CHUNKSIZE)?;
        Ok(())
    }

    pub(crate) fn round_grow_amount(n: usize) -> usize {
        align_up(n, ALIGNMENT)
    }
}
