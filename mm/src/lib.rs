#![cfg_attr(not(test), no_std)]
#![allow(unsafe_op_in_unsafe_fn)]

//! A general-purpose dynamic memory allocator over a single contiguous
//! byte region: boundary-tag block headers, a segregated free-list index,
//! immediate coalescing, and best-fit-approximating placement.
//!
//! The bulk of the implementation lives on `Heap<P>` ([`heap::Heap`]),
//! generic over a [`provider::HeapProvider`]. The free functions below wrap
//! a single process-wide instance backed by [`provider::StaticHeapProvider`]
//! — the shape most callers in a freestanding target want — but nothing
//! stops another crate from instantiating its own `Heap` over a different
//! provider.

pub mod allocator;
pub mod block;
pub mod checker;
pub mod coalesce;
pub mod constants;
pub mod error;
pub mod freelist;
pub mod grower;
#[cfg(all(test, feature = "itests"))]
mod harness;
pub mod heap;
pub mod placer;
pub mod provider;
#[cfg(all(test, feature = "itests"))]
mod scenarios;
pub mod word;

use tidepool_lib::{klog_info, klog_warn};

use heap::Heap;
use provider::StaticHeapProvider;

static HEAP: spin::Mutex<Heap<StaticHeapProvider>> =
    spin::Mutex::new(Heap::new(StaticHeapProvider::new()));

/// Initialize the process-wide heap. Safe to call at most once
/// per process; see `Heap::initialize`.
pub fn initialize() -> bool {
    match HEAP.lock().initialize() {
        Ok(()) => {
            klog_info!("allocator: heap initialized");
            true
        }
        Err(e) => {
            klog_warn!("allocator: initialize failed: {}", e);
            false
        }
    }
}

/// Allocate `size` bytes. Returns null on `size == 0` or out-of-memory.
pub fn allocate(size: usize) -> *mut u8 {
    HEAP.lock().allocate(size).unwrap_or(core::ptr::null_mut())
}

/// Free a pointer previously returned by `allocate`/`reallocate`/
/// `zeroed_allocate`. A null pointer is a no-op.
pub fn free(p: *mut u8) {
    HEAP.lock().free(p);
}

/// Resize an allocation, preserving the leading `min(old, new)` bytes.
/// `p == null` behaves like `allocate`; `size == 0` behaves like `free`
/// followed by returning null.
pub fn reallocate(p: *mut u8, size: usize) -> *mut u8 {
    HEAP.lock()
        .reallocate(p, size)
        .unwrap_or(core::ptr::null_mut())
}

/// Allocate `count * size` bytes, zeroed. Returns null on overflow,
/// `count * size == 0`, or out-of-memory.
pub fn zeroed_allocate(count: usize, size: usize) -> *mut u8 {
    HEAP.lock()
        .zeroed_allocate(count, size)
        .unwrap_or(core::ptr::null_mut())
}

/// Debug-only heap consistency check. `line` is the caller's source
/// line, logged on failure.
pub fn check_heap(line: u32) -> bool {
    HEAP.lock().check_heap(line)
}
