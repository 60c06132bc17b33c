//! Compile-time tunables and the pipeline policy knobs.
//!
//! Everything here is const-initialized; there is no fallible
//! resource-creation path at boot.

use crate::channel::RecvTimeout;
use crate::frame::StartBytePolicy;

/// RX byte channel capacity. Power of two.
pub const RX_QUEUE_CAPACITY: usize = 256;

/// Frame assembler buffer size; payloads are bounded at one byte less.
pub const FRAME_CAPACITY: usize = 64;

/// Debounce settling delay for the key scan, in milliseconds.
pub const DEBOUNCE_SETTLE_MS: u32 = 10;

/// What a receive timeout does to an in-progress frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum TimeoutPolicy {
    /// Keep the partial frame; a slow sender may still finish it.
    #[default]
    HoldPartial,
    /// Abandon the partial frame and resynchronize.
    AbandonPartial,
}

/// Per-pipeline policy bundle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Channel receive timeout per service iteration.
    pub recv_timeout: RecvTimeout,
    /// Timeout handling for partial frames.
    pub timeout_policy: TimeoutPolicy,
    /// Handling of `'['` inside an in-progress payload.
    pub start_byte_policy: StartBytePolicy,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            recv_timeout: RecvTimeout::Ticks(100),
            timeout_policy: TimeoutPolicy::HoldPartial,
            start_byte_policy: StartBytePolicy::Data,
        }
    }
}
