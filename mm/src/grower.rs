//! Grows the managed region and installs a fresh epilogue.

use tidepool_lib::klog_warn;

use crate::block::Block;
use crate::error::{HeapError, HeapResult};
use crate::heap::Heap;
use crate::provider::HeapProvider;

impl<P: HeapProvider> Heap<P> {
    /// Ask the provider for `n` more bytes (rounded up to 16), install the
    /// new block's header in place of the old epilogue, write a fresh
    /// epilogue, and coalesce. Returns the surviving (possibly merged)
    /// block.
    pub(crate) fn grow(&mut self, n: usize) -> HeapResult<Block> {
        let n = Self::round_grow_amount(n);
        let _new_base = self.provider.extend(n).ok_or_else(|| {
            klog_warn!("heap grow: provider refused to extend by {} bytes", n);
            HeapError::OutOfMemory
        })?;

        // The provider hands back the first newly-extended byte, but the
        // new block's header is installed one word *before* that: the old
        // epilogue word, which already sits there and whose
        // prev-allocated/prev-mini bits already describe the block to its
        // left. Reusing it (rather than the fresh byte after it) keeps the
        // new block's header 16-aligned with everything before it.
        let old_epilogue = self.epilogue;
        let new_block = unsafe { Block::at(old_epilogue) };
        let prev_alloc = unsafe { new_block.prev_allocated() };
        let prev_mini = unsafe { new_block.prev_mini() };
        unsafe { new_block.write(n, false, prev_alloc, prev_mini) };
        if !unsafe { new_block.is_mini() } {
            unsafe { new_block.write_footer_matching_header() };
        }

        let new_epilogue_ptr = unsafe { old_epilogue.add(n) };
        let new_epilogue = unsafe { Block::at(new_epilogue_ptr) };
        unsafe { new_epilogue.write(0, true, true, false) };
        self.epilogue = new_epilogue_ptr;

        Ok(unsafe { self.coalesce(new_block) })
    }
}
