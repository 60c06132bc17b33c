//! Debounce gate for the board's digital inputs.
//!
//! Pure logic over a [`LineSampler`] seam: the target implementation reads
//! the key GPIOs and sleeps one settling interval, tests inject scripted
//! samplers. One sticky "armed" flag covers all monitored lines, so a
//! single physical press yields exactly one logical event in single-shot
//! mode.

/// Monitored input lines, in scan priority order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Key {
    Key0,
    Key1,
    Key2,
    WakeUp,
}

impl Key {
    const ALL: [Key; 4] = [Key::Key0, Key::Key1, Key::Key2, Key::WakeUp];

    const fn bit(self) -> u8 {
        match self {
            Key::Key0 => 1 << 0,
            Key::Key1 => 1 << 1,
            Key::Key2 => 1 << 2,
            Key::WakeUp => 1 << 3,
        }
    }
}

/// Snapshot of which lines read active.
///
/// Active means "pressed" after the platform has normalized polarity
/// (the board mixes active-low keys with an active-high wake line).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Lines(u8);

impl Lines {
    /// No line active.
    pub const NONE: Lines = Lines(0);

    /// Mark a line active.
    pub const fn with(self, key: Key) -> Lines {
        Lines(self.0 | key.bit())
    }

    /// Check one line.
    pub const fn is_active(self, key: Key) -> bool {
        self.0 & key.bit() != 0
    }

    /// Check for any active line.
    pub const fn any(self) -> bool {
        self.0 != 0
    }

    /// Highest-priority active line.
    pub fn first(self) -> Option<Key> {
        Key::ALL.into_iter().find(|&k| self.is_active(k))
    }
}

/// Source of line samples plus the settling delay.
pub trait LineSampler {
    /// Read the current line levels.
    fn sample(&mut self) -> Lines;

    /// Wait out contact bounce. Task-context sleep, not a busy-wait.
    fn settle(&mut self);
}

/// Scan mode.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScanMode {
    /// One event per physical press; the line set must fully release
    /// before the next event.
    SingleShot,
    /// Re-arm on every call: a held line produces an event per scan.
    Continuous,
}

/// Sticky-flag debounce state.
pub struct DebounceGate {
    armed: bool,
}

impl DebounceGate {
    /// Create an armed gate.
    pub const fn new() -> Self {
        Self { armed: true }
    }

    /// Sample the lines and report at most one edge.
    ///
    /// While armed, any active line triggers the settle delay, a re-sample
    /// to identify the specific line, and disarming. A press that vanishes
    /// during settling still consumes the arm. The gate re-arms only when
    /// every monitored line reads inactive at once.
    pub fn scan<S: LineSampler>(&mut self, mode: ScanMode, lines: &mut S) -> Option<Key> {
        if mode == ScanMode::Continuous {
            self.armed = true;
        }

        let now = lines.sample();
        if self.armed && now.any() {
            lines.settle();
            self.armed = false;
            return lines.sample().first();
        }
        if !now.any() {
            self.armed = true;
        }
        None
    }
}

impl Default for DebounceGate {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Replays a fixed level per call; counts settle invocations.
    struct ScriptedLines {
        script: Vec<Lines>,
        pos: usize,
        settles: usize,
    }

    impl ScriptedLines {
        fn new(script: Vec<Lines>) -> Self {
            Self { script, pos: 0, settles: 0 }
        }
    }

    impl LineSampler for ScriptedLines {
        fn sample(&mut self) -> Lines {
            let lines = self.script[self.pos.min(self.script.len() - 1)];
            self.pos += 1;
            lines
        }

        fn settle(&mut self) {
            self.settles += 1;
        }
    }

    const K0: Lines = Lines::NONE.with(Key::Key0);

    #[test]
    fn test_single_shot_reports_once_while_held() {
        // Held active for many samples
        let mut sampler = ScriptedLines::new(vec![K0; 10]);
        let mut gate = DebounceGate::new();

        assert_eq!(gate.scan(ScanMode::SingleShot, &mut sampler), Some(Key::Key0));
        for _ in 0..3 {
            assert_eq!(gate.scan(ScanMode::SingleShot, &mut sampler), None);
        }
        assert_eq!(sampler.settles, 1);
    }

    #[test]
    fn test_single_shot_rearms_after_release() {
        let mut sampler = ScriptedLines::new(vec![
            K0,
            K0, // re-sample after settle
            K0, // still held
            Lines::NONE,
            K0,
            K0, // re-sample after settle
        ]);
        let mut gate = DebounceGate::new();

        assert_eq!(gate.scan(ScanMode::SingleShot, &mut sampler), Some(Key::Key0));
        assert_eq!(gate.scan(ScanMode::SingleShot, &mut sampler), None);
        assert_eq!(gate.scan(ScanMode::SingleShot, &mut sampler), None); // release re-arms
        assert_eq!(gate.scan(ScanMode::SingleShot, &mut sampler), Some(Key::Key0));
        assert_eq!(sampler.settles, 2);
    }

    #[test]
    fn test_continuous_repeats_while_held() {
        let mut sampler = ScriptedLines::new(vec![K0; 12]);
        let mut gate = DebounceGate::new();

        for _ in 0..4 {
            assert_eq!(gate.scan(ScanMode::Continuous, &mut sampler), Some(Key::Key0));
        }
    }

    #[test]
    fn test_glitch_during_settle_consumes_arm() {
        let mut sampler = ScriptedLines::new(vec![
            K0,          // trigger
            Lines::NONE, // gone by the post-settle sample
            Lines::NONE,
        ]);
        let mut gate = DebounceGate::new();

        assert_eq!(gate.scan(ScanMode::SingleShot, &mut sampler), None);
        assert_eq!(sampler.settles, 1);
        // All-released sample re-arms on the next scan
        assert_eq!(gate.scan(ScanMode::SingleShot, &mut sampler), None);
    }

    #[test]
    fn test_priority_order() {
        let both = Lines::NONE.with(Key::Key2).with(Key::WakeUp);
        let mut sampler = ScriptedLines::new(vec![both; 3]);
        let mut gate = DebounceGate::new();

        assert_eq!(gate.scan(ScanMode::SingleShot, &mut sampler), Some(Key::Key2));
    }
}
