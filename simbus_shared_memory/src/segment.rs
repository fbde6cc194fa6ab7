//! Segment access traits and the POSIX provider.
//!
//! [`SegmentMemory`] and [`SegmentProvider`] are the seams between the
//! protocol client and the operating system: production code attaches real
//! POSIX objects through [`PosixShm`], test suites substitute heap-backed
//! fakes.

use memmap2::MmapMut;
use tracing::debug;

use crate::error::{ShmError, ShmResult};
use crate::platform::linux::attach_segment_mmap;
use simbus::consts::CACHE_LINE_SIZE;

/// Raw byte access to one mapped shared segment.
///
/// The mapping stays valid for the lifetime of the implementor; release
/// happens on drop.
pub trait SegmentMemory {
    /// Mapped length in bytes.
    fn len(&self) -> usize;

    /// Whether the mapping is empty (degenerate; a real segment never is).
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Base address for reads.
    fn as_ptr(&self) -> *const u8;

    /// Base address for writes.
    fn as_mut_ptr(&mut self) -> *mut u8;
}

/// Attaches shared segments by key.
///
/// The provider never creates a segment; absence is an error the caller
/// reports as "server not started".
pub trait SegmentProvider {
    /// Mapping type produced by a successful attach.
    type Memory: SegmentMemory;

    /// Attach to the segment for `key`, requiring at least `size` mapped
    /// bytes.
    fn attach(&mut self, key: u32, size: usize) -> ShmResult<Self::Memory>;
}

/// A mapped POSIX shared memory object.
pub struct PosixSegment {
    key: u32,
    mmap: MmapMut,
}

impl PosixSegment {
    /// Attach to the existing POSIX object for `key`.
    ///
    /// # Errors
    /// - [`ShmError::NotFound`] if the server has not created the object.
    /// - [`ShmError::SegmentTooSmall`] if the mapped object is shorter
    ///   than `size`.
    /// - [`ShmError::AlignmentError`] if the mapping is not cache-line
    ///   aligned (page-aligned mappings always are).
    pub fn attach(key: u32, size: usize) -> ShmResult<Self> {
        let mmap = attach_segment_mmap(key)?;

        if mmap.len() < size {
            return Err(ShmError::SegmentTooSmall {
                key,
                expected: size,
                actual: mmap.len(),
            });
        }
        validate_memory_alignment(mmap.as_ptr() as usize)?;

        debug!("attached shared segment key={key:#010x} ({} bytes)", mmap.len());
        Ok(Self { key, mmap })
    }

    /// The key this segment was attached under.
    pub fn key(&self) -> u32 {
        self.key
    }
}

impl SegmentMemory for PosixSegment {
    fn len(&self) -> usize {
        self.mmap.len()
    }

    fn as_ptr(&self) -> *const u8 {
        self.mmap.as_ptr()
    }

    fn as_mut_ptr(&mut self) -> *mut u8 {
        self.mmap.as_mut_ptr()
    }
}

impl Drop for PosixSegment {
    fn drop(&mut self) {
        // Unmapping happens with the MmapMut; the object itself belongs to
        // the server and is left alone.
        debug!("released shared segment mapping key={:#010x}", self.key);
    }
}

/// The production segment provider: POSIX `shm_open` + `mmap`.
#[derive(Debug, Default, Clone, Copy)]
pub struct PosixShm;

impl SegmentProvider for PosixShm {
    type Memory = PosixSegment;

    fn attach(&mut self, key: u32, size: usize) -> ShmResult<Self::Memory> {
        PosixSegment::attach(key, size)
    }
}

/// Validate memory alignment
pub fn validate_memory_alignment(address: usize) -> ShmResult<()> {
    if address % CACHE_LINE_SIZE != 0 {
        return Err(ShmError::AlignmentError {
            address,
            alignment: CACHE_LINE_SIZE,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::linux::segment_object_name;
    use nix::fcntl::OFlag;
    use nix::sys::mman::{shm_open, shm_unlink};
    use nix::sys::stat::Mode;
    use nix::unistd::ftruncate;

    /// Create a segment object the way the server would, sized and with a
    /// leading pattern written.
    fn create_server_object(key: u32, size: usize, lead: &[u8]) {
        let name = segment_object_name(key);
        let fd = shm_open(
            name.as_str(),
            OFlag::O_CREAT | OFlag::O_EXCL | OFlag::O_RDWR,
            Mode::from_bits_truncate(0o600),
        )
        .expect("test object create failed");
        ftruncate(&fd, size as i64).expect("test object resize failed");

        let file = std::fs::File::from(fd);
        let mut mmap = unsafe { memmap2::MmapOptions::new().map_mut(&file).unwrap() };
        mmap[..lead.len()].copy_from_slice(lead);
    }

    fn remove_server_object(key: u32) {
        let _ = shm_unlink(segment_object_name(key).as_str());
    }

    /// Per-process unique keys to avoid collisions with parallel tests.
    fn test_key(suffix: u32) -> u32 {
        std::process::id().wrapping_shl(8) ^ 0xA000_0000 ^ suffix
    }

    #[test]
    fn attach_roundtrip() {
        let key = test_key(1);
        create_server_object(key, 8192, &[0xAB, 0xCD, 0xEF]);

        let segment = PosixSegment::attach(key, 8192).unwrap();
        assert_eq!(segment.key(), key);
        assert_eq!(segment.len(), 8192);
        let lead = unsafe { std::slice::from_raw_parts(segment.as_ptr(), 3) };
        assert_eq!(lead, &[0xAB, 0xCD, 0xEF]);

        drop(segment);
        remove_server_object(key);
    }

    #[test]
    fn attach_missing_reports_not_found() {
        let key = test_key(2);
        let result = PosixSegment::attach(key, 4096);
        assert!(matches!(result, Err(ShmError::NotFound { .. })));
    }

    #[test]
    fn attach_too_small_rejected() {
        let key = test_key(3);
        create_server_object(key, 4096, &[]);

        let result = PosixSegment::attach(key, 8192);
        assert!(matches!(
            result,
            Err(ShmError::SegmentTooSmall {
                expected: 8192,
                actual: 4096,
                ..
            })
        ));

        remove_server_object(key);
    }

    #[test]
    fn provider_delegates_to_posix_attach() {
        let key = test_key(4);
        create_server_object(key, 4096, &[0x11]);

        let mut provider = PosixShm;
        let segment = provider.attach(key, 4096).unwrap();
        assert_eq!(segment.len(), 4096);

        drop(segment);
        remove_server_object(key);
    }

    #[test]
    fn alignment_validation() {
        assert!(validate_memory_alignment(0).is_ok());
        assert!(validate_memory_alignment(64).is_ok());
        assert!(validate_memory_alignment(4096).is_ok());
        assert!(matches!(
            validate_memory_alignment(63),
            Err(ShmError::AlignmentError { .. })
        ));
    }
}
