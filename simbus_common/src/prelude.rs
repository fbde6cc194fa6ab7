//! Prelude module for common re-exports.
//!
//! This module provides convenient re-exports of commonly used types
//! so that consumers can do `use simbus_common::prelude::*;` and get
//! the most important types without listing individual paths.
//!
//! # Usage
//!
//! ```rust
//! use simbus_common::prelude::*;
//! ```

// ─── Logging / Configuration ────────────────────────────────────────
pub use crate::config::{ConfigError, ConfigLoader, LogLevel, SharedConfig};

// ─── System Constants ───────────────────────────────────────────────
pub use crate::consts::{DEFAULT_SEGMENT_KEY, SEGMENT_MAGIC, STREAM_CAPACITY};

// ─── Wire Protocol ──────────────────────────────────────────────────
pub use crate::protocol::{
    Command, CommandKind, SEGMENT_SIZE, SegmentBlock, Status, StatusKind,
};

// ─── Scene Model ────────────────────────────────────────────────────
pub use crate::scene::{
    JointFlags, JointInfo, JointType, SceneDescriptor, SceneParseError, SceneParser,
};
