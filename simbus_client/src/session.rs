//! Session/connection management and command submission.
//!
//! One `Session` per client process. The session owns the attached
//! segment, the explicit connection/exchange state machines, and every
//! decoded result buffer (joint table, retained scene descriptors, debug
//! line set). All mutation happens on the caller's polling thread;
//! nothing here spawns threads.

use std::sync::atomic::{Ordering, fence};

use tracing::{debug, info, warn};

use simbus_common::consts::{SEGMENT_MAGIC, STREAM_CAPACITY};
use simbus_common::protocol::{Command, SEGMENT_SIZE, SegmentBlock};
use simbus_common::scene::{JointInfo, SceneDescriptor, SceneParser};
use simbus_shared_memory::{PosixShm, SegmentMemory, SegmentProvider, ShmError};

use crate::debug_lines::DebugLineSet;
use crate::error::{ConnectError, ProtocolError};

// ─── State Machines ─────────────────────────────────────────────────

/// Connection lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// No segment attached.
    Disconnected,
    /// Attached to a magic-validated segment.
    Connected,
    /// Invalidated by a protocol violation. Terminal until `disconnect`.
    Faulted,
}

/// Request/response exchange state. At most one command is ever
/// unacknowledged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExchangeState {
    /// No command outstanding; submission is admissible.
    Idle,
    /// A command was submitted and its status has not been fully consumed.
    AwaitingResponse,
}

// ─── Session ────────────────────────────────────────────────────────

/// Client session over one shared simulation segment.
pub struct Session<P: SegmentProvider = PosixShm> {
    provider: P,
    key: u32,
    pub(crate) memory: Option<P::Memory>,
    pub(crate) connection: ConnectionState,
    pub(crate) exchange: ExchangeState,
    pub(crate) scene_parser: Option<Box<dyn SceneParser>>,
    pub(crate) scene_load_ok: bool,
    pub(crate) joints: Vec<JointInfo>,
    pub(crate) descriptors: Vec<SceneDescriptor>,
    pub(crate) debug_lines: DebugLineSet,
    /// Debug-mode selector of the in-flight line request, reused by
    /// auto-continuation pages.
    pub(crate) debug_lines_mode: u32,
}

impl Session<PosixShm> {
    /// Session over the production POSIX provider.
    pub fn new(key: u32) -> Self {
        Self::with_provider(PosixShm, key)
    }
}

impl<P: SegmentProvider> Session<P> {
    /// Session over a custom segment provider (test doubles, embeddings).
    pub fn with_provider(provider: P, key: u32) -> Self {
        Self {
            provider,
            key,
            memory: None,
            connection: ConnectionState::Disconnected,
            exchange: ExchangeState::Idle,
            scene_parser: None,
            scene_load_ok: false,
            joints: Vec::new(),
            descriptors: Vec::new(),
            debug_lines: DebugLineSet::default(),
            debug_lines_mode: 0,
        }
    }

    /// Wire the external scene-description decoder. Without one, scene
    /// streams are reported as failed loads.
    pub fn with_scene_parser(mut self, parser: Box<dyn SceneParser>) -> Self {
        self.scene_parser = Some(parser);
        self
    }

    /// The segment key this session targets.
    pub fn key(&self) -> u32 {
        self.key
    }

    // ─── Connection Lifecycle ───────────────────────────────────────

    /// Attach to the server's segment and validate its magic/version tag.
    ///
    /// The segment must already exist: the server creates it, never the
    /// client. A present-but-foreign segment is released again before the
    /// mismatch is reported.
    pub fn connect(&mut self) -> Result<(), ConnectError> {
        if self.connection == ConnectionState::Connected {
            debug!("connect() on an already connected session");
            return Ok(());
        }
        if self.connection == ConnectionState::Faulted {
            // Reconnecting after a violation implies a full teardown.
            self.disconnect();
        }

        let memory = self
            .provider
            .attach(self.key, SEGMENT_SIZE)
            .map_err(|e| match e {
                ShmError::NotFound { key } => ConnectError::NotFound { key },
                other => ConnectError::Shm(other),
            })?;

        let magic = {
            // SAFETY: attach guarantees at least SEGMENT_SIZE mapped bytes
            // and cache-line alignment; SegmentBlock is repr(C, align(64)).
            let block = unsafe { &*(memory.as_ptr() as *const SegmentBlock) };
            block.magic
        };
        if magic != SEGMENT_MAGIC {
            // Release before reporting: an incompatible segment is not ours
            // to hold.
            drop(memory);
            warn!(
                "segment for key {:#010x} carries magic {magic:#018x}; start the server before the client",
                self.key
            );
            return Err(ConnectError::ProtocolMismatch {
                found: magic,
                expected: SEGMENT_MAGIC,
            });
        }

        self.memory = Some(memory);
        self.connection = ConnectionState::Connected;
        self.exchange = ExchangeState::Idle;
        info!("connected to simulation segment key={:#010x}", self.key);
        Ok(())
    }

    /// Release the segment mapping. Idempotent; decoded results stay
    /// readable after disconnecting.
    pub fn disconnect(&mut self) {
        if self.memory.take().is_some() {
            info!("disconnected from simulation segment key={:#010x}", self.key);
        }
        self.connection = ConnectionState::Disconnected;
        self.exchange = ExchangeState::Idle;
    }

    /// Whether a validated segment is currently attached.
    pub fn is_connected(&self) -> bool {
        self.connection == ConnectionState::Connected
    }

    /// Current connection lifecycle state.
    pub fn connection_state(&self) -> ConnectionState {
        self.connection
    }

    /// Current exchange state.
    pub fn exchange_state(&self) -> ExchangeState {
        self.exchange
    }

    /// The sole admission check for issuing commands: connected and no
    /// command outstanding.
    pub fn can_submit(&self) -> bool {
        self.connection == ConnectionState::Connected && self.exchange == ExchangeState::Idle
    }

    // ─── Command Submission ─────────────────────────────────────────

    /// Encode `command` into the shared command slot and publish it.
    ///
    /// Submitting while a command is outstanding is caller misuse and is
    /// refused without touching the slot.
    pub fn submit(&mut self, command: &Command) -> Result<(), ProtocolError> {
        match self.connection {
            ConnectionState::Disconnected => return Err(ProtocolError::NotConnected),
            ConnectionState::Faulted => return Err(ProtocolError::SessionFaulted),
            ConnectionState::Connected => {}
        }
        if self.exchange == ExchangeState::AwaitingResponse {
            tracing::error!("submit while a command is outstanding (caller misuse)");
            return Err(ProtocolError::CommandOutstanding);
        }
        let Some(memory) = self.memory.as_mut() else {
            return Err(ProtocolError::NotConnected);
        };

        // SAFETY: size and alignment validated at attach; the command slot
        // and client counters are client-owned per the field partition.
        let block = unsafe { &mut *(memory.as_mut_ptr() as *mut SegmentBlock) };
        command.encode(&mut block.command);
        // The counter increment publishes the slot; the fence orders the
        // slot bytes before the Release store.
        fence(Ordering::Release);
        block.submitted_commands.fetch_add(1, Ordering::Release);

        if let Command::RequestDebugLines(args) = command {
            self.debug_lines_mode = args.debug_mode;
        }
        self.exchange = ExchangeState::AwaitingResponse;
        debug!("submitted command {:?}", command.kind());
        Ok(())
    }

    /// Copy `data` into the client→server bulk region.
    ///
    /// Oversized data is rejected with a warning and nothing is copied;
    /// there is no partial upload. Returns whether the copy happened.
    pub fn upload_bulk(&mut self, data: &[u8]) -> bool {
        let Some(memory) = self.memory.as_mut() else {
            warn!("bulk upload rejected: not connected");
            return false;
        };
        if data.len() > STREAM_CAPACITY {
            warn!(
                "bulk upload of {} bytes exceeds stream capacity {STREAM_CAPACITY}; nothing uploaded",
                data.len()
            );
            return false;
        }
        // SAFETY: as in `submit`; the upload region is client-owned.
        let block = unsafe { &mut *(memory.as_mut_ptr() as *mut SegmentBlock) };
        block.upload[..data.len()].copy_from_slice(data);
        true
    }

    // ─── Decoded Results ────────────────────────────────────────────

    /// Rows in the joint table.
    pub fn joint_count(&self) -> usize {
        self.joints.len()
    }

    /// One joint record by table index.
    pub fn joint_info(&self, index: usize) -> Option<&JointInfo> {
        self.joints.get(index)
    }

    /// The whole joint table.
    pub fn joints(&self) -> &[JointInfo] {
        &self.joints
    }

    /// Whether the most recent model load succeeded end to end
    /// (server-side load and client-side stream decode).
    pub fn scene_load_ok(&self) -> bool {
        self.scene_load_ok
    }

    /// Every scene descriptor retained since the last reset.
    pub fn scene_descriptors(&self) -> &[SceneDescriptor] {
        &self.descriptors
    }

    /// Debug lines currently held.
    pub fn debug_line_count(&self) -> usize {
        self.debug_lines.len()
    }

    /// Debug line start points.
    pub fn debug_lines_from(&self) -> &[[f32; 3]] {
        self.debug_lines.from_points()
    }

    /// Debug line end points.
    pub fn debug_lines_to(&self) -> &[[f32; 3]] {
        self.debug_lines.to_points()
    }

    /// Debug line colors.
    pub fn debug_lines_color(&self) -> &[[f32; 3]] {
        self.debug_lines.colors()
    }

    // ─── Internal ───────────────────────────────────────────────────

    /// Shared view of the segment block.
    pub(crate) fn block_ref(&self) -> Result<&SegmentBlock, ProtocolError> {
        let memory = self.memory.as_ref().ok_or(ProtocolError::NotConnected)?;
        // SAFETY: size and alignment validated at attach; all fields both
        // processes touch concurrently are atomics.
        Ok(unsafe { &*(memory.as_ptr() as *const SegmentBlock) })
    }
}
