//! # SIMBUS Shared Memory Attach Lifecycle
//!
//! Client-side half of the shared memory lifecycle: finding and mapping a
//! segment that the simulation server already created. Creation,
//! initialization, and destruction of the segment are the server's
//! exclusive responsibility. This crate never creates a segment, and an
//! absent segment is reported as [`ShmError::NotFound`] so callers can
//! surface "server not started".
//!
//! ## Seams
//!
//! - [`SegmentMemory`]: raw byte access to one mapped segment.
//! - [`SegmentProvider`]: `attach(key, size)`; release happens on drop.
//! - [`PosixShm`]: the production provider (`shm_open` + `mmap`).
//!
//! Test suites substitute a heap-backed provider to exercise the protocol
//! client without a running server.
//!
//! ## Error Handling
//!
//! All operations return `Result<T, ShmError>`:
//!
//! ```rust,no_run
//! use simbus_shared_memory::{PosixSegment, ShmError};
//!
//! match PosixSegment::attach(24601, 4096) {
//!     Ok(segment) => { /* use segment */ }
//!     Err(ShmError::NotFound { key }) => {
//!         eprintln!("no segment for key {key} - check the server is running");
//!     }
//!     Err(e) => eprintln!("Unexpected error: {}", e),
//! }
//! ```

#![deny(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod platform;
pub mod segment;

pub use error::{ShmError, ShmResult};
pub use segment::{PosixSegment, PosixShm, SegmentMemory, SegmentProvider};
