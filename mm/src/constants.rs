//! Compile-time tunables. No environment or runtime configuration exists
//! for this crate: everything here is a `pub const` rather than a
//! value read from outside the process.

pub use crate::block::MIN_BLOCK_SIZE;

/// Every payload address is a multiple of this.
pub const ALIGNMENT: usize = 16;

/// Minimum amount requested from the heap provider on a grow.
pub const CHUNKSIZE: usize = 1 << 6;

/// Best-fit search gives up after this many qualifying candidates within
/// a size class. Preserved verbatim.
pub const FIND_FIT_MAX_CANDIDATES: usize = 6;
