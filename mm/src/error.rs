//! Internal error type for the allocator's fallible plumbing.
//!
//! The public API only ever surfaces a null pointer or a `bool`; this
//! enum exists so `initialize`, `grow`, and the checker can use `?` instead
//! of threading sentinel values by hand.

use core::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeapError {
    NotInitialized,
    OutOfMemory,
    Overflow,
    Corrupt,
}

impl fmt::Display for HeapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotInitialized => write!(f, "heap used before initialize()"),
            Self::OutOfMemory => write!(f, "heap provider refused to extend"),
            Self::Overflow => write!(f, "size computation overflowed"),
            Self::Corrupt => write!(f, "heap consistency check failed"),
        }
    }
}

pub type HeapResult<T = ()> = Result<T, HeapError>;
