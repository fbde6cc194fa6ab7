//! Status polling and dispatch.
//!
//! `poll_status` is non-blocking: the caller owns the retry cadence and
//! any give-up policy. The submitted/processed status counters are the
//! sole synchronization with the server; they are always compared
//! (Acquire) before a single payload byte is trusted, and the slot is
//! copied out before interpretation.

use std::sync::atomic::{Ordering, fence};

use tracing::{debug, warn};

use simbus_common::consts::{DEBUG_LINE_BYTES, DEBUG_LINES_PER_PAGE, STREAM_CAPACITY};
use simbus_common::protocol::{Command, RequestDebugLinesArgs, SegmentBlock, Status, StatusSlot};
use simbus_shared_memory::{SegmentMemory, SegmentProvider};

use crate::error::ProtocolError;
use crate::scene::append_joint_records;
use crate::session::{ConnectionState, ExchangeState, Session};

/// Decoded result of one fully consumed exchange, handed to the caller.
#[derive(Debug, Clone, PartialEq)]
pub enum StatusSummary {
    /// Generic command completion.
    Completed,
    /// Model load finished; `ok` covers server load and client decode.
    SceneLoaded {
        /// Whether load and decode both succeeded.
        ok: bool,
        /// Joint table size after ingestion.
        joint_count: usize,
    },
    /// Model load failed on the server.
    SceneLoadFailed,
    /// The desired state was received.
    DesiredStateReceived,
    /// One simulation step finished.
    StepCompleted,
    /// The uploaded bulk stream was accepted.
    DataStreamReceived,
    /// The uploaded bulk stream was rejected.
    DataStreamFailed,
    /// Actual generalized state report.
    ActualState {
        /// Generalized positions.
        q: Vec<f64>,
        /// Generalized velocities.
        qdot: Vec<f64>,
    },
    /// Simulation reset finished; scene results were cleared.
    ResetCompleted,
    /// The debug line array arrived completely.
    DebugLinesReady {
        /// Total lines now held.
        line_count: usize,
    },
    /// The debug line transfer failed; all line buffers were cleared.
    DebugLinesFailed,
}

/// What dispatch decided beyond updating session state.
enum DispatchOutcome {
    /// Exchange finished; hand the summary to the caller.
    Summary(StatusSummary),
    /// Page consumed but more lines pend; the poll loop submits the
    /// continuation itself.
    ContinueDebugLines {
        /// Global index of the next page's first line.
        next_start: u32,
    },
}

impl<P: SegmentProvider> Session<P> {
    /// Check for a new server status and consume it.
    ///
    /// Returns `Ok(None)` when disconnected, when nothing is outstanding,
    /// when no status has arrived yet, or when a debug-line page was
    /// consumed and its continuation was auto-submitted. Never blocks.
    pub fn poll_status(&mut self) -> Result<Option<StatusSummary>, ProtocolError> {
        match self.connection {
            ConnectionState::Disconnected => return Ok(None),
            ConnectionState::Faulted => return Err(ProtocolError::SessionFaulted),
            ConnectionState::Connected => {}
        }
        if self.exchange != ExchangeState::AwaitingResponse {
            // Nothing was submitted; a stray status (if any) stays queued.
            return Ok(None);
        }

        let (submitted, processed) = {
            let block = self.block_ref()?;
            (
                block.submitted_statuses.load(Ordering::Acquire),
                block.processed_statuses.load(Ordering::Acquire),
            )
        };
        if submitted == processed {
            return Ok(None);
        }
        if submitted.wrapping_sub(processed) > 1 {
            // More than one outstanding status breaks the protocol's core
            // invariant: the pair is desynchronized.
            self.connection = ConnectionState::Faulted;
            return Err(ProtocolError::CounterSkew {
                submitted,
                processed,
            });
        }

        // Only now are the slot bytes trustworthy: a settled status is in
        // place. Copy it out before interpreting anything.
        fence(Ordering::Acquire);
        let raw: StatusSlot = self.block_ref()?.status;
        let status = match Status::decode(&raw) {
            Ok(status) => status,
            Err(kind) => {
                self.connection = ConnectionState::Faulted;
                return Err(ProtocolError::UnknownStatusKind { kind });
            }
        };
        debug!("received status {:?}", status.kind());

        let outcome = self.dispatch(&status);

        {
            let block = self.block_ref()?;
            block.processed_statuses.fetch_add(1, Ordering::Release);
            // The equality re-check is the desynchronization guard: only a
            // fully drained exchange releases the awaiting flag.
            let submitted = block.submitted_statuses.load(Ordering::Acquire);
            let processed = block.processed_statuses.load(Ordering::Acquire);
            self.exchange = if submitted == processed {
                ExchangeState::Idle
            } else {
                ExchangeState::AwaitingResponse
            };
        }

        match outcome {
            DispatchOutcome::Summary(summary) => Ok(Some(summary)),
            DispatchOutcome::ContinueDebugLines { next_start } => {
                // Pagination stays hidden from the caller, but a refused
                // continuation must not masquerade as "still waiting".
                let command = Command::RequestDebugLines(RequestDebugLinesArgs {
                    debug_mode: self.debug_lines_mode,
                    starting_index: next_start,
                });
                self.submit(&command)
                    .map_err(|_| ProtocolError::ContinuationRejected)?;
                Ok(None)
            }
        }
    }

    /// Interpret one decoded status. Mutates session buffers only; the
    /// counter advance and any continuation submit happen in the caller.
    fn dispatch(&mut self, status: &Status) -> DispatchOutcome {
        match status {
            Status::Completed => DispatchOutcome::Summary(StatusSummary::Completed),

            Status::SceneLoaded(args) => {
                self.scene_load_ok = true;
                if args.stream_length > 0 {
                    let length = (args.stream_length as usize).min(STREAM_CAPACITY);
                    if let Some(memory) = self.memory.as_ref() {
                        // SAFETY: size and alignment validated at attach;
                        // the download region is server-owned and settled
                        // while this status is outstanding.
                        let block = unsafe { &*(memory.as_ptr() as *const SegmentBlock) };
                        let stream = &block.download[..length];
                        match self.scene_parser.as_mut() {
                            None => {
                                warn!("scene stream received but no scene parser is wired");
                                self.scene_load_ok = false;
                            }
                            Some(parser) => match parser.parse(stream) {
                                Ok(parsed) => {
                                    for descriptor in &parsed {
                                        append_joint_records(&mut self.joints, descriptor);
                                    }
                                    debug!(
                                        "scene stream added {} multibodies ({} joints total)",
                                        parsed.len(),
                                        self.joints.len()
                                    );
                                    self.descriptors.extend(parsed);
                                }
                                Err(e) => {
                                    warn!("scene stream parse failed: {e}");
                                    self.scene_load_ok = false;
                                }
                            },
                        }
                    }
                }
                DispatchOutcome::Summary(StatusSummary::SceneLoaded {
                    ok: self.scene_load_ok,
                    joint_count: self.joints.len(),
                })
            }

            Status::SceneLoadFailed => {
                self.scene_load_ok = false;
                DispatchOutcome::Summary(StatusSummary::SceneLoadFailed)
            }

            Status::DesiredStateReceived => {
                DispatchOutcome::Summary(StatusSummary::DesiredStateReceived)
            }
            Status::StepCompleted => DispatchOutcome::Summary(StatusSummary::StepCompleted),
            Status::DataStreamReceived => {
                DispatchOutcome::Summary(StatusSummary::DataStreamReceived)
            }
            Status::DataStreamFailed => DispatchOutcome::Summary(StatusSummary::DataStreamFailed),

            Status::ActualState(args) => {
                let num_q = (args.num_q as usize).min(args.q.len());
                let num_u = (args.num_u as usize).min(args.qdot.len());
                DispatchOutcome::Summary(StatusSummary::ActualState {
                    q: args.q[..num_q].to_vec(),
                    qdot: args.qdot[..num_u].to_vec(),
                })
            }

            Status::ResetCompleted => {
                // Wholesale: the joint table and every retained descriptor.
                self.joints.clear();
                self.descriptors.clear();
                debug!("reset completed; joint table and scene descriptors cleared");
                DispatchOutcome::Summary(StatusSummary::ResetCompleted)
            }

            Status::DebugLines(args) => {
                let line_count = args.line_count as usize;
                let starting_index = args.starting_index as usize;
                if line_count > DEBUG_LINES_PER_PAGE {
                    warn!(
                        "debug line page of {line_count} lines exceeds the stream region; dropping all lines"
                    );
                    self.debug_lines.clear_all();
                    return DispatchOutcome::Summary(StatusSummary::DebugLinesFailed);
                }
                if let Some(memory) = self.memory.as_ref() {
                    // SAFETY: as for the scene stream above.
                    let block = unsafe { &*(memory.as_ptr() as *const SegmentBlock) };
                    let bytes = &block.download[..line_count * DEBUG_LINE_BYTES];
                    self.debug_lines.apply_page(bytes, starting_index, line_count);
                }
                if args.remaining > 0 {
                    DispatchOutcome::ContinueDebugLines {
                        next_start: (starting_index + line_count) as u32,
                    }
                } else {
                    DispatchOutcome::Summary(StatusSummary::DebugLinesReady {
                        line_count: self.debug_lines.len(),
                    })
                }
            }

            Status::DebugLinesOverflow => {
                warn!("debug line transfer overflowed the stream region; dropping all lines");
                self.debug_lines.clear_all();
                DispatchOutcome::Summary(StatusSummary::DebugLinesFailed)
            }
        }
    }
}
