//! SIMBUS Common Library
//!
//! This crate provides the shared constants, wire layout, and protocol
//! types for all SIMBUS workspace crates.
//!
//! # Module Structure
//!
//! - [`consts`] - Numeric limits and the versioned segment magic
//! - [`protocol`] - Segment block layout, command and status types
//! - [`scene`] - Scene description model and the parser seam
//! - [`config`] - Configuration loading traits and types
//! - [`prelude`] - Common re-exports for convenience
//!
//! # Usage
//!
//! Add to your `Cargo.toml` with alias for shorter imports:
//! ```toml
//! [dependencies]
//! simbus = { package = "simbus_common", path = "../simbus_common" }
//! ```
//!
//! Then import:
//! ```rust
//! use simbus_common::consts::*;
//! use simbus_common::protocol::{Command, Status};
//! ```

pub mod config;
pub mod consts;
pub mod prelude;
pub mod protocol;
pub mod scene;
