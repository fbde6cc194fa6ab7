//! Client→server commands and the fixed command slot.
//!
//! At most one command is outstanding at any time: the client writes the
//! slot, increments its submitted counter, and waits for a matching
//! status before writing the slot again.

use static_assertions::const_assert;

use super::{WireArgs, impl_default_zeroed, read_args, write_args};
use crate::consts::{
    COMMAND_PAYLOAD_BYTES, MAX_GENERALIZED_COORDS, MAX_GENERALIZED_VELOCITIES, MODEL_PATH_BYTES,
};

// ─── Command Kind ───────────────────────────────────────────────────

/// Wire tag of a client command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum CommandKind {
    /// Load a multibody model description on the server.
    LoadModel = 1,
    /// Transfer a desired generalized state to the simulation.
    SendDesiredState = 2,
    /// Ask the server to report the actual generalized state.
    RequestActualState = 3,
    /// Advance the simulation by one step.
    StepSimulation = 4,
    /// Announce a bulk data stream previously copied into the upload region.
    SendDataStream = 5,
    /// Reset the simulation to its initial, empty world.
    ResetSimulation = 6,
    /// Request one page of the debug line array.
    RequestDebugLines = 7,
}

impl CommandKind {
    /// Convert from raw `u32` value. Returns `None` for invalid values.
    #[inline]
    pub const fn from_u32(value: u32) -> Option<Self> {
        match value {
            1 => Some(Self::LoadModel),
            2 => Some(Self::SendDesiredState),
            3 => Some(Self::RequestActualState),
            4 => Some(Self::StepSimulation),
            5 => Some(Self::SendDataStream),
            6 => Some(Self::ResetSimulation),
            7 => Some(Self::RequestDebugLines),
            _ => None,
        }
    }
}

// ─── Argument Structs ───────────────────────────────────────────────

/// Control mode selector for [`DesiredStateArgs`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum ControlMode {
    /// Track the desired generalized positions.
    Position = 0,
    /// Track the desired generalized velocities.
    Velocity = 1,
    /// Apply the desired values as generalized forces.
    Torque = 2,
}

impl ControlMode {
    #[inline]
    pub const fn from_u32(value: u32) -> Option<Self> {
        match value {
            0 => Some(Self::Position),
            1 => Some(Self::Velocity),
            2 => Some(Self::Torque),
            _ => None,
        }
    }
}

/// Arguments for [`CommandKind::LoadModel`].
///
/// The path is NUL-terminated inside a fixed buffer; the base pose places
/// the model's floating base in world coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
#[repr(C)]
pub struct LoadModelArgs {
    /// Model file path, NUL-terminated, server-side resolution.
    pub path: [u8; MODEL_PATH_BYTES],
    /// Initial base position (x, y, z).
    pub base_position: [f64; 3],
    /// Initial base orientation quaternion (x, y, z, w).
    pub base_orientation: [f64; 4],
    /// Load as an articulated multibody (1) or a rigid compound (0).
    pub use_multibody: u8,
    /// Pin the base to the world (1) instead of floating (0).
    pub use_fixed_base: u8,
    /// Reserved.
    pub _pad: [u8; 6],
}

impl LoadModelArgs {
    /// Build arguments for `path` with an identity base pose.
    ///
    /// Paths longer than the wire buffer are truncated; the NUL terminator
    /// is always preserved.
    pub fn new(path: &str) -> Self {
        let mut args = Self::default();
        let bytes = path.as_bytes();
        let len = bytes.len().min(MODEL_PATH_BYTES - 1);
        args.path[..len].copy_from_slice(&bytes[..len]);
        args.base_orientation = [0.0, 0.0, 0.0, 1.0];
        args.use_multibody = 1;
        args
    }

    /// The path up to (excluding) the NUL terminator.
    pub fn path(&self) -> &str {
        let end = self
            .path
            .iter()
            .position(|&b| b == 0)
            .unwrap_or(MODEL_PATH_BYTES);
        core::str::from_utf8(&self.path[..end]).unwrap_or("")
    }
}

/// Arguments for [`CommandKind::SendDesiredState`].
#[derive(Debug, Clone, Copy, PartialEq)]
#[repr(C)]
pub struct DesiredStateArgs {
    /// Control mode discriminant (see [`ControlMode`]).
    pub control_mode: u32,
    /// Number of valid entries in `q`.
    pub num_q: u32,
    /// Number of valid entries in `qdot`.
    pub num_u: u32,
    /// Reserved.
    pub _pad: u32,
    /// Desired generalized positions.
    pub q: [f64; MAX_GENERALIZED_COORDS],
    /// Desired generalized velocities.
    pub qdot: [f64; MAX_GENERALIZED_VELOCITIES],
}

/// Arguments for [`CommandKind::SendDataStream`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(C)]
pub struct DataStreamArgs {
    /// Valid byte count in the client→server upload region.
    pub stream_length: u32,
}

/// Arguments for [`CommandKind::RequestDebugLines`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(C)]
pub struct RequestDebugLinesArgs {
    /// Server-side filter for which line categories to report.
    pub debug_mode: u32,
    /// Global index of the first line the server should send.
    pub starting_index: u32,
}

impl_default_zeroed!(
    LoadModelArgs,
    DesiredStateArgs,
    DataStreamArgs,
    RequestDebugLinesArgs,
);

impl WireArgs for LoadModelArgs {}
impl WireArgs for DesiredStateArgs {}
impl WireArgs for DataStreamArgs {}
impl WireArgs for RequestDebugLinesArgs {}

// Every argument struct must fit the slot's argument area.
const_assert!(core::mem::size_of::<LoadModelArgs>() <= COMMAND_PAYLOAD_BYTES);
const_assert!(core::mem::size_of::<DesiredStateArgs>() <= COMMAND_PAYLOAD_BYTES);
const_assert!(core::mem::size_of::<DataStreamArgs>() <= COMMAND_PAYLOAD_BYTES);
const_assert!(core::mem::size_of::<RequestDebugLinesArgs>() <= COMMAND_PAYLOAD_BYTES);

// ─── Command Slot ───────────────────────────────────────────────────

/// The single client command slot inside the shared segment.
#[derive(Clone, Copy)]
#[repr(C)]
pub struct CommandSlot {
    /// Command kind discriminant (see [`CommandKind`]).
    pub kind: u32,
    /// Kind-specific argument bytes.
    pub payload: [u8; COMMAND_PAYLOAD_BYTES],
}

const_assert!(core::mem::size_of::<CommandSlot>() == 4 + COMMAND_PAYLOAD_BYTES);

// ─── Command Sum Type ───────────────────────────────────────────────

/// A client command, one variant per wire kind.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    /// Load a multibody model description.
    LoadModel(LoadModelArgs),
    /// Transfer a desired generalized state.
    SendDesiredState(DesiredStateArgs),
    /// Request the actual generalized state.
    RequestActualState,
    /// Advance the simulation by one step.
    StepSimulation,
    /// Announce an uploaded bulk data stream.
    SendDataStream(DataStreamArgs),
    /// Reset the simulation.
    ResetSimulation,
    /// Request one page of the debug line array.
    RequestDebugLines(RequestDebugLinesArgs),
}

impl Command {
    /// Wire tag of this command.
    pub const fn kind(&self) -> CommandKind {
        match self {
            Self::LoadModel(_) => CommandKind::LoadModel,
            Self::SendDesiredState(_) => CommandKind::SendDesiredState,
            Self::RequestActualState => CommandKind::RequestActualState,
            Self::StepSimulation => CommandKind::StepSimulation,
            Self::SendDataStream(_) => CommandKind::SendDataStream,
            Self::ResetSimulation => CommandKind::ResetSimulation,
            Self::RequestDebugLines(_) => CommandKind::RequestDebugLines,
        }
    }

    /// Encode into the command slot. The slot's byte image is a pure
    /// function of `self`: the argument area is zeroed first.
    pub fn encode(&self, slot: &mut CommandSlot) {
        match self {
            Self::LoadModel(args) => write_args(args, &mut slot.payload),
            Self::SendDesiredState(args) => write_args(args, &mut slot.payload),
            Self::SendDataStream(args) => write_args(args, &mut slot.payload),
            Self::RequestDebugLines(args) => write_args(args, &mut slot.payload),
            Self::RequestActualState | Self::StepSimulation | Self::ResetSimulation => {
                slot.payload.fill(0);
            }
        }
        slot.kind = self.kind() as u32;
    }

    /// Decode from the command slot. Returns `None` for an unknown kind.
    ///
    /// The server side of the exchange lives elsewhere; this decoder
    /// exists for loopback test doubles and protocol tooling.
    pub fn decode(slot: &CommandSlot) -> Option<Self> {
        Some(match CommandKind::from_u32(slot.kind)? {
            CommandKind::LoadModel => Self::LoadModel(read_args(&slot.payload)),
            CommandKind::SendDesiredState => Self::SendDesiredState(read_args(&slot.payload)),
            CommandKind::RequestActualState => Self::RequestActualState,
            CommandKind::StepSimulation => Self::StepSimulation,
            CommandKind::SendDataStream => Self::SendDataStream(read_args(&slot.payload)),
            CommandKind::ResetSimulation => Self::ResetSimulation,
            CommandKind::RequestDebugLines => Self::RequestDebugLines(read_args(&slot.payload)),
        })
    }
}

// ═══════════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    fn zeroed_slot() -> CommandSlot {
        // SAFETY: kind + byte array, zero is valid.
        unsafe { core::mem::zeroed() }
    }

    #[test]
    fn kind_roundtrip() {
        for v in 1..=7u32 {
            let kind = CommandKind::from_u32(v).unwrap();
            assert_eq!(kind as u32, v);
        }
        assert!(CommandKind::from_u32(0).is_none());
        assert!(CommandKind::from_u32(8).is_none());
        assert!(CommandKind::from_u32(u32::MAX).is_none());
    }

    #[test]
    fn control_mode_roundtrip() {
        for v in 0..=2u32 {
            assert_eq!(ControlMode::from_u32(v).unwrap() as u32, v);
        }
        assert!(ControlMode::from_u32(3).is_none());
    }

    #[test]
    fn load_model_path_roundtrip() {
        let args = LoadModelArgs::new("models/arm.sdf");
        assert_eq!(args.path(), "models/arm.sdf");
        assert_eq!(args.base_orientation, [0.0, 0.0, 0.0, 1.0]);
        assert_eq!(args.use_multibody, 1);
        assert_eq!(args.use_fixed_base, 0);
    }

    #[test]
    fn load_model_path_truncated() {
        let long = "x".repeat(2 * MODEL_PATH_BYTES);
        let args = LoadModelArgs::new(&long);
        assert_eq!(args.path().len(), MODEL_PATH_BYTES - 1);
        // Terminator preserved.
        assert_eq!(args.path[MODEL_PATH_BYTES - 1], 0);
    }

    #[test]
    fn encode_decode_roundtrip() {
        let mut slot = zeroed_slot();

        let commands = [
            Command::LoadModel(LoadModelArgs::new("a/b.sdf")),
            Command::RequestActualState,
            Command::StepSimulation,
            Command::SendDataStream(DataStreamArgs { stream_length: 512 }),
            Command::ResetSimulation,
            Command::RequestDebugLines(RequestDebugLinesArgs {
                debug_mode: 1,
                starting_index: 200,
            }),
        ];
        for cmd in commands {
            cmd.encode(&mut slot);
            assert_eq!(Command::decode(&slot), Some(cmd));
        }
    }

    #[test]
    fn encode_is_deterministic() {
        let mut a = zeroed_slot();
        let mut b = zeroed_slot();
        // Dirty slot `b` with a large command first.
        Command::LoadModel(LoadModelArgs::new("leftover/garbage.sdf")).encode(&mut b);

        let cmd = Command::SendDataStream(DataStreamArgs { stream_length: 7 });
        cmd.encode(&mut a);
        cmd.encode(&mut b);

        assert_eq!(a.kind, b.kind);
        assert_eq!(a.payload, b.payload);
    }

    #[test]
    fn decode_unknown_kind() {
        let mut slot = zeroed_slot();
        slot.kind = 999;
        assert!(Command::decode(&slot).is_none());
    }

    #[test]
    fn desired_state_encode_roundtrip() {
        let mut args = DesiredStateArgs::default();
        args.control_mode = ControlMode::Velocity as u32;
        args.num_q = 2;
        args.num_u = 2;
        args.q[0] = 1.5;
        args.q[1] = -2.5;
        args.qdot[0] = 0.25;
        args.qdot[1] = 0.5;

        let mut slot = zeroed_slot();
        Command::SendDesiredState(args).encode(&mut slot);
        let decoded = Command::decode(&slot).unwrap();
        assert_eq!(decoded, Command::SendDesiredState(args));
    }
}
