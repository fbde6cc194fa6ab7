//! Scene description model and the parser seam.
//!
//! The embedded scene-description binary format is decoded by an external
//! collaborator behind the [`SceneParser`] trait; this module only defines
//! the typed output that collaborator produces and the flat joint records
//! the client derives from it.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ─── Joint Model ────────────────────────────────────────────────────

/// Joint type tag of a multibody link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum JointType {
    /// Rotational joint, one angular DOF.
    Revolute = 0,
    /// Translational joint, one linear DOF.
    Prismatic = 1,
    /// Any other joint (fixed, spherical, planar, ...).
    Other = 2,
}

impl JointType {
    /// Convert from raw `u8` value. Returns `None` for invalid values.
    #[inline]
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Revolute),
            1 => Some(Self::Prismatic),
            2 => Some(Self::Other),
            _ => None,
        }
    }

    /// Whether a joint of this type can carry motor power.
    #[inline]
    pub const fn is_motorized(&self) -> bool {
        matches!(self, Self::Revolute | Self::Prismatic)
    }
}

impl Default for JointType {
    fn default() -> Self {
        Self::Other
    }
}

bitflags! {
    /// Per-joint capability flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct JointFlags: u32 {
        /// The joint can be driven by a motor (revolute or prismatic).
        const MOTORIZED = 1 << 0;
    }
}

/// One row of the client's flat joint table.
///
/// `q_index`/`u_index` locate the joint's generalized position and
/// velocity coordinates inside the multibody's state vectors; `-1` means
/// the joint contributes none (e.g. a fixed joint).
#[derive(Debug, Clone, PartialEq)]
pub struct JointInfo {
    /// Link index within its multibody.
    pub joint_index: i32,
    /// Offset into the generalized position vector, or `-1`.
    pub q_index: i32,
    /// Offset into the generalized velocity vector, or `-1`.
    pub u_index: i32,
    /// Link name, when the description carries one.
    pub link_name: Option<String>,
    /// Joint name, when the description carries one.
    pub joint_name: Option<String>,
    /// Joint type tag.
    pub joint_type: JointType,
    /// Capability flags.
    pub flags: JointFlags,
}

// ─── Parsed Scene Model ─────────────────────────────────────────────

/// Floating point width of a parsed description stream.
///
/// The two layouts are structurally parallel; extraction logic is
/// identical for both, so this is carried as metadata only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum Precision {
    /// 32-bit floating point scalars.
    Single = 0,
    /// 64-bit floating point scalars.
    Double = 1,
}

impl Precision {
    #[inline]
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Single),
            1 => Some(Self::Double),
            _ => None,
        }
    }
}

impl Default for Precision {
    fn default() -> Self {
        Self::Double
    }
}

/// One link of a parsed multibody.
///
/// Name strings are owned copies made by the parser at ingestion time;
/// nothing borrows into the raw stream buffer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LinkDescriptor {
    /// Generalized position coordinates this link's joint contributes.
    pub position_var_count: u32,
    /// Generalized velocity coordinates (DOFs) this link's joint contributes.
    pub dof_count: u32,
    /// Link name, if present in the description.
    pub link_name: Option<String>,
    /// Joint name, if present in the description.
    pub joint_name: Option<String>,
    /// Joint type tag.
    pub joint_type: JointType,
}

/// One parsed multibody from a scene description stream.
///
/// Descriptors are retained by the session for its lifetime and only
/// dropped en masse when the simulation resets.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SceneDescriptor {
    /// Scalar width of the source stream.
    pub precision: Precision,
    /// Base (root link) name, if present.
    pub base_name: Option<String>,
    /// Links in description order.
    pub links: Vec<LinkDescriptor>,
}

// ─── Parser Seam ────────────────────────────────────────────────────

/// Failure of the external scene-description decoder.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SceneParseError {
    /// The stream does not follow the description grammar.
    #[error("malformed scene stream: {reason}")]
    Malformed {
        /// Decoder diagnostic.
        reason: String,
    },

    /// The stream ended before a complete description.
    #[error("scene stream truncated: needed {expected} bytes, have {actual}")]
    Truncated {
        /// Bytes the decoder needed.
        expected: usize,
        /// Bytes available.
        actual: usize,
    },
}

/// Black-box decoder for the embedded scene-description binary format.
///
/// The decoder consumes the raw stream bytes and produces the typed
/// multibody graph. Its internal grammar is not this crate's concern; a
/// malformed stream is an ordinary error, never a panic.
pub trait SceneParser {
    /// Parse one description stream into its multibody descriptors.
    fn parse(&mut self, stream: &[u8]) -> Result<Vec<SceneDescriptor>, SceneParseError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joint_type_roundtrip() {
        for v in 0..=2u8 {
            let jt = JointType::from_u8(v).unwrap();
            assert_eq!(jt as u8, v);
        }
        assert!(JointType::from_u8(3).is_none());
        assert!(JointType::from_u8(255).is_none());
    }

    #[test]
    fn motorized_types() {
        assert!(JointType::Revolute.is_motorized());
        assert!(JointType::Prismatic.is_motorized());
        assert!(!JointType::Other.is_motorized());
    }

    #[test]
    fn precision_roundtrip() {
        assert_eq!(Precision::from_u8(0), Some(Precision::Single));
        assert_eq!(Precision::from_u8(1), Some(Precision::Double));
        assert!(Precision::from_u8(2).is_none());
        assert_eq!(Precision::default(), Precision::Double);
    }

    #[test]
    fn joint_flags_default_empty() {
        assert!(JointFlags::default().is_empty());
        assert!(JointFlags::MOTORIZED.contains(JointFlags::MOTORIZED));
    }
}
