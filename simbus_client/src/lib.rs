//! # SIMBUS Client
//!
//! Client side of the shared-memory request/response protocol spoken with
//! the simulation server. The client submits at most one command at a
//! time, polls for the server's status, decodes the embedded scene
//! description and paginated debug-line streams, and exposes the results
//! through [`Session`].
//!
//! ## Protocol shape
//!
//! ```text
//! caller ──submit──► command slot ──► [server] ──► status slot ──poll──► caller
//!                     (one in flight)                (consumed once)
//! ```
//!
//! The caller drives an explicit poll loop: `poll_status` never blocks,
//! and retry cadence plus give-up policy are caller decisions (see the
//! `simbus_client` binary for a bounded loop).
//!
//! ## Example
//!
//! ```rust,no_run
//! use simbus_client::Session;
//! use simbus_common::protocol::Command;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut session = Session::new(simbus_common::consts::DEFAULT_SEGMENT_KEY);
//! session.connect()?;
//!
//! session.submit(&Command::StepSimulation)?;
//! loop {
//!     if let Some(summary) = session.poll_status()? {
//!         println!("server answered: {summary:?}");
//!         break;
//!     }
//!     std::thread::sleep(std::time::Duration::from_micros(250));
//! }
//! session.disconnect();
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod debug_lines;
pub mod error;
pub mod poll;
pub mod scene;
pub mod session;

pub use config::ClientConfig;
pub use debug_lines::DebugLineSet;
pub use error::{ConnectError, ProtocolError};
pub use poll::StatusSummary;
pub use session::{ConnectionState, ExchangeState, Session};
