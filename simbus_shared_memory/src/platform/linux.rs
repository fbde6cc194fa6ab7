//! Linux-specific shared memory operations

use crate::error::{ShmError, ShmResult};
use memmap2::{MmapMut, MmapOptions};
use nix::errno::Errno;
use nix::fcntl::OFlag;
use nix::sys::mman::shm_open;
use nix::sys::stat::Mode;
use std::fs::File;

/// POSIX shared memory object name for a segment key.
///
/// The server publishes its segment under this name; both sides derive it
/// from the same integer key.
pub fn segment_object_name(key: u32) -> String {
    format!("/simbus_{key:08x}")
}

/// Attach to an existing POSIX shared memory object by key.
///
/// `O_CREAT` is deliberately absent: segment creation and initialization
/// are the server's exclusive responsibility, so an absent object maps to
/// [`ShmError::NotFound`] ("server not started").
pub fn attach_segment_mmap(key: u32) -> ShmResult<MmapMut> {
    let name = segment_object_name(key);
    let fd = shm_open(name.as_str(), OFlag::O_RDWR, Mode::empty()).map_err(|e| match e {
        Errno::ENOENT => ShmError::NotFound { key },
        Errno::EACCES => ShmError::PermissionDenied { key },
        other => ShmError::Sys { source: other },
    })?;

    let file = File::from(fd);
    // SAFETY: the mapping aliases memory the server process mutates
    // concurrently; all cross-process synchronization fields are accessed
    // through atomics by the layers above.
    let mmap = unsafe { MmapOptions::new().map_mut(&file)? };
    Ok(mmap)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn object_name_is_key_stable() {
        assert_eq!(segment_object_name(0x1234), "/simbus_00001234");
        assert_eq!(segment_object_name(u32::MAX), "/simbus_ffffffff");
    }

    #[test]
    fn attach_missing_object_reports_not_found() {
        // Key chosen so no server would plausibly publish it.
        let result = attach_segment_mmap(0xdead_0000 | (std::process::id() & 0xffff));
        assert!(matches!(result, Err(ShmError::NotFound { .. })));
    }
}
