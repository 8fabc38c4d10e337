//! Knob-controlled tempo clock
//!
//! Tempo in whole BPM from a knob, optionally smoothed with a running
//! average to hide ADC jitter. Freezing the clock (edit mode off) keeps the
//! last tempo while the knob is used for something else.

use ostinato_core::traits::KnobValue;

/// Slowest knob tempo
pub const MIN_BPM: u32 = 20;

/// Fastest knob tempo in normal mode
pub const MAX_BPM: u32 = 280;

/// Fastest knob tempo in turbo mode (audio rate)
pub const TURBO_BPM: u32 = 10_000;

/// Longest running average
pub const MAX_AVERAGE: usize = 8;

/// Tempo before the first knob reading
const INITIAL_BPM: u32 = 120;

/// Tempo source for the clocked programs
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TempoClock {
    min_bpm: u32,
    max_bpm: u32,
    edit: bool,
    run: [u32; MAX_AVERAGE],
    run_len: usize,
    next: usize,
}

impl Default for TempoClock {
    fn default() -> Self {
        Self::new()
    }
}

impl TempoClock {
    /// Create a clock spanning `MIN_BPM..=MAX_BPM` with no smoothing
    pub fn new() -> Self {
        Self::with_average(1)
    }

    /// Create a clock averaging the last `run_len` readings (1..=8)
    pub fn with_average(run_len: usize) -> Self {
        Self {
            min_bpm: MIN_BPM,
            max_bpm: MAX_BPM,
            edit: true,
            run: [INITIAL_BPM; MAX_AVERAGE],
            run_len: run_len.clamp(1, MAX_AVERAGE),
            next: 0,
        }
    }

    /// Take a knob reading; returns the current tempo
    ///
    /// Ignored while edit mode is off.
    pub fn update(&mut self, knob: KnobValue) -> u32 {
        if self.edit {
            self.run[self.next] = knob.scale(self.min_bpm, self.max_bpm);
            self.next = (self.next + 1) % self.run_len;
        }
        self.tempo()
    }

    /// Current tempo (BPM)
    pub fn tempo(&self) -> u32 {
        let sum: u32 = self.run[..self.run_len].iter().sum();
        (sum + self.run_len as u32 / 2) / self.run_len as u32
    }

    /// Sixteenth-note duration at the current tempo (quarter note = beat / 4)
    pub fn wait_ms(&self) -> u32 {
        (15_000 / self.tempo().max(1)).max(1)
    }

    /// Whole-note duration
    pub fn whole_note_ms(&self) -> u32 {
        self.wait_ms() * 4
    }

    /// Check if knob readings change the tempo
    pub fn is_editing(&self) -> bool {
        self.edit
    }

    /// Enable or disable tempo changes
    pub fn set_edit(&mut self, enabled: bool) {
        self.edit = enabled;
    }

    /// Flip edit mode
    pub fn toggle_edit(&mut self) {
        self.edit = !self.edit;
    }

    /// Fastest knob tempo
    pub fn max_bpm(&self) -> u32 {
        self.max_bpm
    }

    /// Switch between the normal and the audio-rate tempo range
    pub fn toggle_turbo(&mut self) {
        self.max_bpm ^= MAX_BPM ^ TURBO_BPM;
    }

    /// Check if the audio-rate range is active
    pub fn is_turbo(&self) -> bool {
        self.max_bpm == TURBO_BPM
    }
}
