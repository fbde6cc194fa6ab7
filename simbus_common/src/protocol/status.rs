//! Server→client statuses and the fixed status slot.
//!
//! The server answers every submitted command with exactly one status
//! (debug line transfers answer each page request individually). The
//! client copies the slot out, interprets it once, then advances its
//! processed counter.

use static_assertions::const_assert;

use super::{WireArgs, impl_default_zeroed, read_args, write_args};
use crate::consts::{MAX_GENERALIZED_COORDS, MAX_GENERALIZED_VELOCITIES, STATUS_PAYLOAD_BYTES};

// ─── Status Kind ────────────────────────────────────────────────────

/// Wire tag of a server status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum StatusKind {
    /// Generic command completion with no payload.
    Completed = 1,
    /// Model load finished; a scene description stream may follow.
    SceneLoaded = 2,
    /// Model load failed on the server.
    SceneLoadFailed = 3,
    /// The desired state was received.
    DesiredStateReceived = 4,
    /// One simulation step finished.
    StepCompleted = 5,
    /// The uploaded bulk data stream was accepted.
    DataStreamReceived = 6,
    /// The uploaded bulk data stream was rejected.
    DataStreamFailed = 7,
    /// Actual generalized state report.
    ActualState = 8,
    /// Simulation reset finished.
    ResetCompleted = 9,
    /// One page of the debug line array.
    DebugLines = 10,
    /// The debug line array did not fit the stream region.
    DebugLinesOverflow = 11,
}

impl StatusKind {
    /// Convert from raw `u32` value. Returns `None` for invalid values.
    #[inline]
    pub const fn from_u32(value: u32) -> Option<Self> {
        match value {
            1 => Some(Self::Completed),
            2 => Some(Self::SceneLoaded),
            3 => Some(Self::SceneLoadFailed),
            4 => Some(Self::DesiredStateReceived),
            5 => Some(Self::StepCompleted),
            6 => Some(Self::DataStreamReceived),
            7 => Some(Self::DataStreamFailed),
            8 => Some(Self::ActualState),
            9 => Some(Self::ResetCompleted),
            10 => Some(Self::DebugLines),
            11 => Some(Self::DebugLinesOverflow),
            _ => None,
        }
    }
}

// ─── Argument Structs ───────────────────────────────────────────────

/// Arguments for [`StatusKind::SceneLoaded`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(C)]
pub struct SceneStreamArgs {
    /// Valid byte count of the scene description in the download region.
    /// Zero means the load produced no stream.
    pub stream_length: u32,
}

/// Arguments for [`StatusKind::ActualState`].
#[derive(Debug, Clone, Copy, PartialEq)]
#[repr(C)]
pub struct ActualStateArgs {
    /// Number of valid entries in `q`.
    pub num_q: u32,
    /// Number of valid entries in `qdot`.
    pub num_u: u32,
    /// Actual generalized positions.
    pub q: [f64; MAX_GENERALIZED_COORDS],
    /// Actual generalized velocities.
    pub qdot: [f64; MAX_GENERALIZED_VELOCITIES],
}

/// Arguments for [`StatusKind::DebugLines`].
///
/// The page's line data sits at the start of the download region as three
/// back-to-back arrays of 3×f32 triples: from-points, to-points, colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(C)]
pub struct SendDebugLinesArgs {
    /// Lines carried by this page.
    pub line_count: u32,
    /// Global index of this page's first line.
    pub starting_index: u32,
    /// Lines the server still holds after this page.
    pub remaining: u32,
}

impl_default_zeroed!(SceneStreamArgs, ActualStateArgs, SendDebugLinesArgs);

impl WireArgs for SceneStreamArgs {}
impl WireArgs for ActualStateArgs {}
impl WireArgs for SendDebugLinesArgs {}

const_assert!(core::mem::size_of::<SceneStreamArgs>() <= STATUS_PAYLOAD_BYTES);
const_assert!(core::mem::size_of::<ActualStateArgs>() <= STATUS_PAYLOAD_BYTES);
const_assert!(core::mem::size_of::<SendDebugLinesArgs>() <= STATUS_PAYLOAD_BYTES);

// ─── Status Slot ────────────────────────────────────────────────────

/// The single server status slot inside the shared segment.
#[derive(Clone, Copy)]
#[repr(C)]
pub struct StatusSlot {
    /// Status kind discriminant (see [`StatusKind`]).
    pub kind: u32,
    /// Kind-specific argument bytes.
    pub payload: [u8; STATUS_PAYLOAD_BYTES],
}

const_assert!(core::mem::size_of::<StatusSlot>() == 4 + STATUS_PAYLOAD_BYTES);

// ─── Status Sum Type ────────────────────────────────────────────────

/// A server status, one variant per wire kind.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Status {
    /// Generic command completion.
    Completed,
    /// Model load finished, scene stream length attached.
    SceneLoaded(SceneStreamArgs),
    /// Model load failed.
    SceneLoadFailed,
    /// Desired state received.
    DesiredStateReceived,
    /// Simulation step finished.
    StepCompleted,
    /// Bulk data stream accepted.
    DataStreamReceived,
    /// Bulk data stream rejected.
    DataStreamFailed,
    /// Actual generalized state report.
    ActualState(ActualStateArgs),
    /// Simulation reset finished.
    ResetCompleted,
    /// One debug line page.
    DebugLines(SendDebugLinesArgs),
    /// Debug line array overflowed the stream region.
    DebugLinesOverflow,
}

impl Status {
    /// Wire tag of this status.
    pub const fn kind(&self) -> StatusKind {
        match self {
            Self::Completed => StatusKind::Completed,
            Self::SceneLoaded(_) => StatusKind::SceneLoaded,
            Self::SceneLoadFailed => StatusKind::SceneLoadFailed,
            Self::DesiredStateReceived => StatusKind::DesiredStateReceived,
            Self::StepCompleted => StatusKind::StepCompleted,
            Self::DataStreamReceived => StatusKind::DataStreamReceived,
            Self::DataStreamFailed => StatusKind::DataStreamFailed,
            Self::ActualState(_) => StatusKind::ActualState,
            Self::ResetCompleted => StatusKind::ResetCompleted,
            Self::DebugLines(_) => StatusKind::DebugLines,
            Self::DebugLinesOverflow => StatusKind::DebugLinesOverflow,
        }
    }

    /// Encode into the status slot.
    ///
    /// The client never does this in production; the server owns the
    /// status slot. The encoder exists for loopback test doubles and
    /// server implementations sharing this crate.
    pub fn encode(&self, slot: &mut StatusSlot) {
        match self {
            Self::SceneLoaded(args) => write_args(args, &mut slot.payload),
            Self::ActualState(args) => write_args(args, &mut slot.payload),
            Self::DebugLines(args) => write_args(args, &mut slot.payload),
            _ => slot.payload.fill(0),
        }
        slot.kind = self.kind() as u32;
    }

    /// Decode from the status slot.
    ///
    /// Returns the raw kind tag as the error for unrecognized statuses;
    /// the caller treats that as a protocol violation, not a value.
    pub fn decode(slot: &StatusSlot) -> Result<Self, u32> {
        let kind = StatusKind::from_u32(slot.kind).ok_or(slot.kind)?;
        Ok(match kind {
            StatusKind::Completed => Self::Completed,
            StatusKind::SceneLoaded => Self::SceneLoaded(read_args(&slot.payload)),
            StatusKind::SceneLoadFailed => Self::SceneLoadFailed,
            StatusKind::DesiredStateReceived => Self::DesiredStateReceived,
            StatusKind::StepCompleted => Self::StepCompleted,
            StatusKind::DataStreamReceived => Self::DataStreamReceived,
            StatusKind::DataStreamFailed => Self::DataStreamFailed,
            StatusKind::ActualState => Self::ActualState(read_args(&slot.payload)),
            StatusKind::ResetCompleted => Self::ResetCompleted,
            StatusKind::DebugLines => Self::DebugLines(read_args(&slot.payload)),
            StatusKind::DebugLinesOverflow => Self::DebugLinesOverflow,
        })
    }
}

// ═══════════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════════
