//! The heap provider abstraction. The allocator never touches memory outside
//! what a provider has handed it via `extend`; everything else about *where*
//! the bytes live is the provider's business.

pub trait HeapProvider {
    /// Grow the managed region by `delta` bytes. Returns the address of the
    /// first new byte, or `None` if the provider refuses (out of memory).
    fn extend(&mut self, delta: usize) -> Option<*mut u8>;

    /// Inclusive lower bound of the currently-extended region.
    fn low(&self) -> *mut u8;

    /// Inclusive upper bound (last valid byte) of the currently-extended
    /// region.
    fn high(&self) -> *mut u8;

    /// # Safety
    /// `dst..dst + n` must lie within the provider's currently-extended
    /// region.
    unsafe fn fill(&mut self, dst: *mut u8, byte: u8, n: usize);

    /// # Safety
    /// `dst..dst + n` and `src..src + n` must lie within the provider's
    /// currently-extended region.
    unsafe fn copy(&mut self, dst: *mut u8, src: *const u8, n: usize);
}

/// Default provider for a freestanding target with no page allocator of its
/// own: a single statically-sized, 16-aligned arena, grown by bumping a
/// watermark. Mirrors the `#[repr(C, align(16))] struct AlignedHeap([u8; N])`
/// pattern used for early kernel heap storage elsewhere in this tree — same
/// alignment rationale (unaligned storage breaks 16-byte-aligned payload
/// addresses), minus the `GlobalAlloc` plumbing this crate doesn't need.
pub const STATIC_HEAP_CAPACITY: usize = 2 * 1024 * 1024;

#[repr(C, align(16))]
struct HeapArena([u8; STATIC_HEAP_CAPACITY]);

pub struct StaticHeapProvider {
    arena: HeapArena,
    used: usize,
}

impl StaticHeapProvider {
    pub const fn new() -> Self {
        Self {
            arena: HeapArena([0; STATIC_HEAP_CAPACITY]),
            used: 0,
        }
    }
}

impl Default for StaticHeapProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl HeapProvider for StaticHeapProvider {
    fn extend(&mut self, delta: usize) -> Option<*mut u8> {
        let new_used = self.used.checked_add(delta)?;
        if new_used > STATIC_HEAP_CAPACITY {
            return None;
        }
        let ptr = unsafe { self.arena.0.as_mut_ptr().add(self.used) };
        self.used = new_used;
        Some(ptr)
    }

    fn low(&self) -> *mut u8 {
        self.arena.0.as_ptr() as *mut u8
    }

    fn high(&self) -> *mut u8 {
        unsafe { self.arena.0.as_ptr().add(self.used.saturating_sub(1)) as *mut u8 }
    }

    unsafe fn fill(&mut self, dst: *mut u8, byte: u8, n: usize) {
        unsafe { core::ptr::write_bytes(dst, byte, n) };
    }

    unsafe fn copy(&mut self, dst: *mut u8, src: *const u8, n: usize) {
        unsafe { core::ptr::copy(src, dst, n) };
    }
}
