//! Consumer-side pipeline: channel receive → frame assembly → dispatch.
//!
//! One instance runs in the protocol task. It blocks only at the channel
//! receive and at the transmit gate; once a byte is dequeued, processing
//! through a possible dispatch is atomic with respect to other consumer
//! work (nothing else touches the assembler). Exactly one frame is in
//! flight: a completed frame is dispatched before the next byte is read.
//!
//! Diagnostics are rendered into a [`MsgBuffer`] first and shipped through
//! the gate with a single acquisition per line, so they never interleave
//! with other producers' output.

use core::fmt::Write;

use crate::channel::{ByteChannel, Recv};
use crate::command::{dispatch, DispatchCtx};
use crate::config::{PipelineConfig, TimeoutPolicy, FRAME_CAPACITY, RX_QUEUE_CAPACITY};
use crate::frame::{Feed, FrameAssembler};
use crate::state::{AppState, LinkStats, StatsSnapshot};
use crate::tx_gate::{ByteSink, MsgBuffer, TxGate};

/// What one [`CommandPipeline::service`] call did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PipelineEvent {
    /// Receive timed out; no byte consumed.
    Idle,
    /// One byte absorbed into the assembler.
    Byte,
    /// A frame completed and its command was applied.
    Frame,
    /// A frame completed but the dispatcher rejected it.
    CommandError,
    /// The assembler abandoned an overfull frame.
    Overflow,
}

/// The protocol task's working set.
///
/// Borrows the shared structures (channel, gate, state, stats) and owns the
/// frame assembler exclusively, sized at the project [`FRAME_CAPACITY`].
pub struct CommandPipeline<'a, S, const N: usize = RX_QUEUE_CAPACITY>
where
    S: ByteSink,
{
    rx: &'a ByteChannel<N>,
    gate: &'a TxGate<S>,
    state: &'a AppState,
    stats: &'a LinkStats,
    assembler: FrameAssembler<FRAME_CAPACITY>,
    config: PipelineConfig,
}

impl<'a, S, const N: usize> CommandPipeline<'a, S, N>
where
    S: ByteSink,
{
    /// Create a pipeline with the default configuration.
    pub fn new(
        rx: &'a ByteChannel<N>,
        gate: &'a TxGate<S>,
        state: &'a AppState,
        stats: &'a LinkStats,
    ) -> Self {
        Self::with_config(rx, gate, state, stats, PipelineConfig::default())
    }

    /// Create a pipeline with an explicit configuration.
    pub fn with_config(
        rx: &'a ByteChannel<N>,
        gate: &'a TxGate<S>,
        state: &'a AppState,
        stats: &'a LinkStats,
        config: PipelineConfig,
    ) -> Self {
        Self {
            rx,
            gate,
            state,
            stats,
            assembler: FrameAssembler::with_policy(config.start_byte_policy),
            config,
        }
    }

    /// One iteration of the consumer loop.
    ///
    /// Blocks at the channel receive for the configured timeout. A timeout
    /// is routine: it counts, applies the timeout policy to any partial
    /// frame, and reports `Idle`.
    pub fn service(&mut self) -> PipelineEvent {
        let byte = match self.rx.recv(self.config.recv_timeout) {
            Recv::TimedOut => {
                self.stats.note_timeout();
                if self.config.timeout_policy == TimeoutPolicy::AbandonPartial {
                    self.assembler.abandon();
                }
                return PipelineEvent::Idle;
            }
            Recv::Byte(b) => b,
        };

        match self.assembler.feed(byte) {
            Feed::Pending => PipelineEvent::Byte,
            Feed::Overflow => {
                self.stats.note_overflow();
                self.report(format_args!(
                    "frame dropped: payload exceeds {} bytes",
                    FRAME_CAPACITY - 1
                ));
                PipelineEvent::Overflow
            }
            Feed::Frame(payload) => {
                let cx = DispatchCtx {
                    state: self.state,
                    stats: self.stats,
                };
                let mut msg = MsgBuffer::new();
                match dispatch(payload, &cx, &mut msg) {
                    Ok(()) => {
                        self.stats.note_frame();
                        self.ship(&msg);
                        PipelineEvent::Frame
                    }
                    Err(err) => {
                        self.stats.note_cmd_error();
                        msg.clear();
                        let _ = write!(msg, "{}", err);
                        self.ship(&msg);
                        PipelineEvent::CommandError
                    }
                }
            }
        }
    }

    /// The protocol task body: service forever.
    pub fn run(&mut self) -> ! {
        loop {
            self.service();
        }
    }

    /// Counter snapshot, for tests and status display.
    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    /// The active configuration.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    fn report(&self, args: core::fmt::Arguments<'_>) {
        let mut msg = MsgBuffer::new();
        let _ = msg.write_fmt(args);
        self.ship(&msg);
    }

    /// Ship one rendered line through the gate under a single acquisition.
    fn ship(&self, msg: &MsgBuffer) {
        if msg.is_empty() {
            return;
        }
        let mut guard = self.gate.lock();
        for &byte in msg.as_bytes() {
            guard.send_byte(byte);
        }
        guard.send_byte(b'\r');
        guard.send_byte(b'\n');
    }
}
