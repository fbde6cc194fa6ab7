//! Client error taxonomy.
//!
//! Connection errors are recoverable by retrying or aborting startup.
//! Protocol errors mean a desynchronized client/server pair: the session
//! is faulted and must be torn down, not silently continued. Payload
//! decode failures and overflow are *not* errors; they surface as state
//! queryable after the fact (`scene_load_ok`, cleared line buffers).

use simbus_shared_memory::ShmError;
use thiserror::Error;

/// Failure to establish a session with the simulation server.
#[derive(Debug, Error)]
pub enum ConnectError {
    /// No segment exists for the key: the server is not running.
    #[error("no simulation segment for key {key:#010x} (is the server running?)")]
    NotFound {
        /// Configured segment key.
        key: u32,
    },

    /// A segment exists but carries the wrong magic/version tag.
    #[error(
        "segment magic mismatch: found {found:#018x}, expected {expected:#018x} \
         (server not started or incompatible version)"
    )]
    ProtocolMismatch {
        /// Tag read from the attached segment.
        found: u64,
        /// Tag this client speaks.
        expected: u64,
    },

    /// Any other attach failure (size, permissions, system call).
    #[error("shared memory attach failed: {0}")]
    Shm(#[from] ShmError),
}

/// A violation of the request/response protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ProtocolError {
    /// Operation requires a connected session.
    #[error("not connected to a simulation server")]
    NotConnected,

    /// `submit` while a command is already awaiting its status.
    /// Caller misuse, refused without touching the command slot.
    #[error("a command is already outstanding")]
    CommandOutstanding,

    /// The server ran more than one status ahead of the client.
    #[error("status counters out of step: submitted {submitted}, processed {processed}")]
    CounterSkew {
        /// Server's submitted-status count.
        submitted: u32,
        /// Client's processed-status count.
        processed: u32,
    },

    /// The server published a status kind this client does not know.
    #[error("unrecognized status kind {kind} (client/server protocol drift)")]
    UnknownStatusKind {
        /// Raw kind tag from the slot.
        kind: u32,
    },

    /// A debug-line continuation request could not be submitted.
    #[error("debug-line continuation could not be submitted")]
    ContinuationRejected,

    /// The session was faulted by a prior protocol violation.
    #[error("session faulted by a prior protocol violation")]
    SessionFaulted,
}
