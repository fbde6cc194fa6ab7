//! The fixed shared-segment layout.
//!
//! One `SegmentBlock` occupies the whole shared-memory segment. The
//! server creates and initializes it (magic included); the client only
//! ever attaches. Field ownership is the entire locking discipline:
//!
//! | region | written by | read by |
//! |---|---|---|
//! | `magic` | server (once) | client |
//! | `command`, `upload`, `submitted_commands`, `processed_statuses` | client | server |
//! | `status`, `download`, `submitted_statuses`, `processed_commands` | server | client |
//!
//! The submitted/processed counter pairs are the only synchronization
//! primitive: a slot's payload is trustworthy only once the counter
//! comparison shows a complete, settled entry, so counters must always be
//! checked (Acquire) before any payload byte is read.

use std::alloc::{Layout, alloc_zeroed, handle_alloc_error};
use std::sync::atomic::AtomicU32;

use static_assertions::{const_assert, const_assert_eq};

use super::command::CommandSlot;
use super::status::StatusSlot;
use crate::consts::{CACHE_LINE_SIZE, SEGMENT_MAGIC, STREAM_CAPACITY};

/// Total size of the shared segment in bytes.
pub const SEGMENT_SIZE: usize = core::mem::size_of::<SegmentBlock>();

/// The shared segment, header first, cache-line aligned.
#[repr(C, align(64))]
pub struct SegmentBlock {
    /// Magic/version tag: must equal [`SEGMENT_MAGIC`]. Written by the
    /// server when it creates the segment.
    pub magic: u64,

    /// Commands submitted by the client. Client increments after writing
    /// the command slot.
    pub submitted_commands: AtomicU32,
    /// Commands consumed by the server.
    pub processed_commands: AtomicU32,
    /// Statuses published by the server. Server increments after writing
    /// the status slot.
    pub submitted_statuses: AtomicU32,
    /// Statuses consumed by the client. Client increments after handling.
    pub processed_statuses: AtomicU32,

    /// Padding to keep the slots off the header cache line.
    _reserved: [u8; 40],

    /// The single client→server command slot.
    pub command: CommandSlot,
    /// The single server→client status slot.
    pub status: StatusSlot,

    /// Bulk transfer region, client→server.
    pub upload: [u8; STREAM_CAPACITY],
    /// Bulk transfer region, server→client.
    pub download: [u8; STREAM_CAPACITY],
}

const_assert_eq!(core::mem::align_of::<SegmentBlock>(), CACHE_LINE_SIZE);
const_assert!(core::mem::size_of::<SegmentBlock>() % CACHE_LINE_SIZE == 0);
// Header (magic + counters + padding) fills exactly one cache line, so the
// command slot starts at offset 64.
const_assert_eq!(
    core::mem::size_of::<u64>() + 4 * core::mem::size_of::<AtomicU32>() + 40,
    CACHE_LINE_SIZE
);

impl SegmentBlock {
    /// Allocate a zeroed block on the heap and stamp the magic, as the
    /// server does when it creates the segment. Clients never call this
    /// against real shared memory; it exists for loopback test doubles
    /// and server implementations.
    pub fn new_boxed() -> Box<Self> {
        let layout = Layout::new::<Self>();
        // The block is several hundred KiB; construct it directly in the
        // heap to avoid deep stack usage.
        // SAFETY: all fields are numeric primitives, atomics, or byte
        // arrays; the all-zero bit pattern is valid for every field, and
        // `alloc_zeroed` honors the type's alignment via `layout`.
        let mut block = unsafe {
            let ptr = alloc_zeroed(layout) as *mut Self;
            if ptr.is_null() {
                handle_alloc_error(layout);
            }
            Box::from_raw(ptr)
        };
        block.magic = SEGMENT_MAGIC;
        block
    }

    /// Validate the magic/version tag.
    #[inline]
    pub const fn is_magic_valid(&self) -> bool {
        self.magic == SEGMENT_MAGIC
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::Ordering;

    #[test]
    fn block_size_and_alignment() {
        assert_eq!(core::mem::align_of::<SegmentBlock>(), 64);
        assert_eq!(SEGMENT_SIZE % 64, 0);
        assert!(SEGMENT_SIZE > 2 * STREAM_CAPACITY);
    }

    #[test]
    fn new_boxed_initializes_like_the_server() {
        let block = SegmentBlock::new_boxed();
        assert!(block.is_magic_valid());
        assert_eq!(block.submitted_commands.load(Ordering::Relaxed), 0);
        assert_eq!(block.processed_commands.load(Ordering::Relaxed), 0);
        assert_eq!(block.submitted_statuses.load(Ordering::Relaxed), 0);
        assert_eq!(block.processed_statuses.load(Ordering::Relaxed), 0);
        assert_eq!(block.command.kind, 0);
        assert_eq!(block.status.kind, 0);
        assert_eq!(block.upload[0], 0);
        assert_eq!(block.download[STREAM_CAPACITY - 1], 0);
    }

    #[test]
    fn magic_mismatch_detected() {
        let mut block = SegmentBlock::new_boxed();
        block.magic ^= 1;
        assert!(!block.is_magic_valid());
    }
}
