//! Shared application state and link counters.
//!
//! The dispatcher's action hooks are the only writers of [`AppState`];
//! unrelated tasks (display refresh, status reporting) are readers. All
//! fields are independent atomic scalars — each load is torn-free, and the
//! protocol never requires a multi-field snapshot, so no lock is held on
//! either side.
//!
//! [`LinkStats`] follows the same discipline for the pipeline's loss and
//! error accounting: each side increments its own counters, anyone may read.

use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};

/// Application state mutated by dispatched commands.
///
/// Gains are stored as the bit pattern of an `f32` so a single atomic store
/// updates each field. The three gain stores in [`set_gains`] are adjacent
/// with no suspension point between them.
///
/// [`set_gains`]: AppState::set_gains
pub struct AppState {
    kp: AtomicU32,
    ki: AtomicU32,
    kd: AtomicU32,
    led: AtomicBool,
}

impl AppState {
    /// Create state with all gains 0.0 and the LED inactive.
    pub const fn new() -> Self {
        Self {
            kp: AtomicU32::new(0),
            ki: AtomicU32::new(0),
            kd: AtomicU32::new(0),
            led: AtomicBool::new(false),
        }
    }

    /// Store all three PID gains.
    #[inline]
    pub fn set_gains(&self, p: f32, i: f32, d: f32) {
        self.kp.store(p.to_bits(), Ordering::Release);
        self.ki.store(i.to_bits(), Ordering::Release);
        self.kd.store(d.to_bits(), Ordering::Release);
    }

    /// Load the current gains as `(p, i, d)`.
    #[inline]
    pub fn gains(&self) -> (f32, f32, f32) {
        (
            f32::from_bits(self.kp.load(Ordering::Acquire)),
            f32::from_bits(self.ki.load(Ordering::Acquire)),
            f32::from_bits(self.kd.load(Ordering::Acquire)),
        )
    }

    /// Set the LED output.
    #[inline]
    pub fn set_led(&self, on: bool) {
        self.led.store(on, Ordering::Release);
    }

    /// Read the LED output.
    #[inline]
    pub fn led(&self) -> bool {
        self.led.load(Ordering::Acquire)
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

/// Loss and error counters for the ingestion pipeline.
///
/// Every event here is recoverable and observable — counted, reported by
/// `STATUS`, never fatal. Counters are never cleared at runtime so the
/// history survives for diagnostics.
pub struct LinkStats {
    /// Bytes discarded because the RX channel was full.
    rx_dropped: AtomicU32,

    /// Frames abandoned because the payload outgrew the assembler buffer.
    frame_overflows: AtomicU32,

    /// Frames that reached dispatch and applied an action.
    frames_ok: AtomicU32,

    /// Frames rejected by the dispatcher (unknown keyword, bad arity, ...).
    cmd_errors: AtomicU32,

    /// Channel receive timeouts (routine, not errors).
    recv_timeouts: AtomicU32,
}

impl LinkStats {
    /// Create zeroed counters.
    pub const fn new() -> Self {
        Self {
            rx_dropped: AtomicU32::new(0),
            frame_overflows: AtomicU32::new(0),
            frames_ok: AtomicU32::new(0),
            cmd_errors: AtomicU32::new(0),
            recv_timeouts: AtomicU32::new(0),
        }
    }

    /// Count a byte lost at the channel producer. Interrupt-safe.
    #[inline]
    pub fn note_rx_dropped(&self) {
        self.rx_dropped.fetch_add(1, Ordering::Relaxed);
    }

    /// Count an assembler buffer overflow.
    #[inline]
    pub fn note_overflow(&self) {
        self.frame_overflows.fetch_add(1, Ordering::Relaxed);
    }

    /// Count a successfully dispatched frame.
    #[inline]
    pub fn note_frame(&self) {
        self.frames_ok.fetch_add(1, Ordering::Relaxed);
    }

    /// Count a frame the dispatcher rejected.
    #[inline]
    pub fn note_cmd_error(&self) {
        self.cmd_errors.fetch_add(1, Ordering::Relaxed);
    }

    /// Count a receive timeout.
    #[inline]
    pub fn note_timeout(&self) {
        self.recv_timeouts.fetch_add(1, Ordering::Relaxed);
    }

    /// Get a point-in-time copy of all counters.
    #[inline]
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            rx_dropped: self.rx_dropped.load(Ordering::Relaxed),
            frame_overflows: self.frame_overflows.load(Ordering::Relaxed),
            frames_ok: self.frames_ok.load(Ordering::Relaxed),
            cmd_errors: self.cmd_errors.load(Ordering::Relaxed),
            recv_timeouts: self.recv_timeouts.load(Ordering::Relaxed),
        }
    }
}

impl Default for LinkStats {
    fn default() -> Self {
        Self::new()
    }
}

/// Counter values at a point in time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub rx_dropped: u32,
    pub frame_overflows: u32,
    pub frames_ok: u32,
    pub cmd_errors: u32,
    pub recv_timeouts: u32,
}
