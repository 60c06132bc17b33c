//! # RustCmdPipeline
//!
//! Framed serial command pipeline: reassembles `[...]` delimited frames
//! from an interrupt-fed byte stream and dispatches validated commands to
//! shared application state.
//!
//! ## Architecture
//!
//! ```text
//! RX interrupt ──try_send──▶ ByteChannel ──recv──▶ FrameAssembler ──▶ dispatch
//!                            (lock-free)           ([...] frames)       │
//!                                                                       ▼
//!              TxGate ◀── confirmations / diagnostics ──┐          AppState
//!              (serialized UART writes)                 └──────── (atomics)
//! ```
//!
//! Components are isolated:
//! - The interrupt side only ever appends to the channel (non-blocking,
//!   drop-on-full, loss counted)
//! - The consumer task owns the frame assembler exclusively
//! - Every outbound byte passes through the transmit gate, one message per
//!   acquisition
//! - Shared state is independent atomic scalars; no lock is held across a
//!   dispatch

#![cfg_attr(not(test), no_std)]

pub mod channel;
pub mod command;
pub mod config;
pub mod debounce;
pub mod frame;
pub mod pipeline;
pub mod port;
pub mod state;
pub mod tx_gate;

pub use channel::{ByteChannel, Recv, RecvTimeout, SendResult};
pub use command::{dispatch, DispatchCtx, DispatchError, Tokens, VERSION};
pub use config::{PipelineConfig, TimeoutPolicy, FRAME_CAPACITY, RX_QUEUE_CAPACITY};
pub use debounce::{DebounceGate, Key, LineSampler, Lines, ScanMode};
pub use frame::{Feed, FrameAssembler, StartBytePolicy};
pub use pipeline::{CommandPipeline, PipelineEvent};
pub use state::{AppState, LinkStats, StatsSnapshot};
pub use tx_gate::{ByteSink, MsgBuffer, TxGate, TxGuard};
