//! Platform-specific shared memory operations.
//!
//! Currently Linux/POSIX only, matching the deployment targets of the
//! simulation server.

pub mod linux;

pub use linux::{attach_segment_mmap, segment_object_name};
