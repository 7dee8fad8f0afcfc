//! Segregated free-list index: one list head per size class.
//!
//! Class 0 (the mini class, exactly 16 bytes) is singly linked — mini
//! blocks are too small to carry a `prev` pointer. Every other class is
//! doubly linked for O(1) removal.

use crate::block::{Block, MIN_BLOCK_SIZE};

pub const NUM_CLASSES: usize = 15;

/// Boundaries, inclusive lower bound per class; `BOUNDARIES[i]` is the
/// lower bound of class `i`, `BOUNDARIES[i + 1]` its exclusive upper bound.
/// The final class has no upper bound. Fixed and empirical; changing the
/// cutoffs changes sizing behavior for every workload trace.
const BOUNDARIES: [usize; NUM_CLASSES] = [
    MIN_BLOCK_SIZE,
    32,
    48,
    64,
    80,
    112,
    160,
    208,
    272,
    480,
    800,
    1728,
    3232,
    5536,
    18736,
];

/// Map a block size to its size class.
pub fn class_of(size: usize) -> usize {
    for i in 0..NUM_CLASSES - 1 {
        if size < BOUNDARIES[i + 1] {
            return i;
        }
    }
    NUM_CLASSES - 1
}

pub struct FreeListIndex {
    heads: [Option<Block>; NUM_CLASSES],
}

impl FreeListIndex {
    pub const fn new() -> Self {
        Self {
            heads: [None; NUM_CLASSES],
        }
    }

    pub fn head(&self, class: usize) -> Option<Block> {
        self.heads[class]
    }

    /// Insert `b` at the head of its class's list.
    ///
    /// # Safety
    /// `b` must be free, sized for `class`, and not already linked.
    pub unsafe fn insert(&mut self, class: usize, b: Block) {
        let old_head = self.heads[class];
        unsafe {
            b.set_free_next(old_head);
            if class != 0 {
                b.set_free_prev(None);
                if let Some(head) = old_head {
                    head.set_free_prev(Some(b));
                }
            }
        }
        self.heads[class] = Some(b);
    }

    pub unsafe fn insert_for_size(&mut self, b: Block, size: usize) {
        let class = class_of(size);
        unsafe { self.insert(class, b) };
    }

    /// Remove `b` from its class's list.
    ///
    /// # Safety
    /// `b` must currently be linked into `class`.
    pub unsafe fn remove(&mut self, class: usize, b: Block) {
        if class == 0 {
            unsafe { self.remove_mini(b) };
            return;
        }
        unsafe {
            let prev = b.free_prev();
            let next = b.free_next();
            match prev {
                Some(p) => p.set_free_next(next),
                None => self.heads[class] = next,
            }
            if let Some(n) = next {
                n.set_free_prev(prev);
            }
        }
    }

    /// Mini class removal is O(n): no back-reference exists, so we walk
    /// from the head looking for the predecessor.
    unsafe fn remove_mini(&mut self, b: Block) {
        unsafe {
            if self.heads[0] == Some(b) {
                self.heads[0] = b.free_next();
                return;
            }
            let mut cursor = self.heads[0];
            while let Some(node) = cursor {
                if node.free_next() == Some(b) {
                    node.set_free_next(b.free_next());
                    return;
                }
                cursor = node.free_next();
            }
        }
    }

    pub unsafe fn remove_for_size(&mut self, b: Block, size: usize) {
        let class = class_of(size);
        unsafe { self.remove(class, b) };
    }
}

impl Default for FreeListIndex {
    fn default() -> Self {
        Self::new()
    }
}
