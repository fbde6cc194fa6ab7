//! Error types for shared memory operations

use thiserror::Error;

/// Errors that can occur during shared memory operations
#[derive(Error, Debug)]
pub enum ShmError {
    /// Segment not found; the server has not created it (yet)
    #[error("Segment not found for key {key:#010x}")]
    NotFound {
        /// Segment key
        key: u32,
    },

    /// Segment exists but is smaller than the expected layout
    #[error("Segment for key {key:#010x} too small: {actual} bytes, expected {expected}")]
    SegmentTooSmall {
        /// Segment key
        key: u32,
        /// Required size in bytes
        expected: usize,
        /// Mapped size in bytes
        actual: usize,
    },

    /// Permission denied
    #[error("Permission denied accessing segment for key {key:#010x}")]
    PermissionDenied {
        /// Segment key
        key: u32,
    },

    /// Memory alignment error
    #[error("Memory alignment error: address {address:#x} not aligned to {alignment}")]
    AlignmentError {
        /// Memory address
        address: usize,
        /// Required alignment
        alignment: usize,
    },

    /// IO error
    #[error("IO error: {source}")]
    Io {
        /// Source IO error
        #[from]
        source: std::io::Error,
    },

    /// Nix system call error
    #[error("System call error: {source}")]
    Sys {
        /// Source nix error
        #[from]
        source: nix::Error,
    },
}

/// Result type for shared memory operations
pub type ShmResult<T> = Result<T, ShmError>;
