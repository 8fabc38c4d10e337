//! Panel driver trait for the module's knobs, CV outputs and gates

use crate::registry::DisplayCode;

/// Front panel knob
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Knob {
    One,
    Two,
}

/// Control voltage output channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CvChannel {
    Cv1,
    Cv2,
    Cv3,
    Cv4,
}

/// Gate/trigger output channel
///
/// The four gate outputs double as the indicator LEDs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum GateChannel {
    Gate1,
    Gate2,
    Gate3,
    Gate4,
}

/// All CV channels in jack order
pub const CV_CHANNELS: [CvChannel; 4] = [
    CvChannel::Cv1,
    CvChannel::Cv2,
    CvChannel::Cv3,
    CvChannel::Cv4,
];

/// All gate channels in jack order
pub const GATE_CHANNELS: [GateChannel; 4] = [
    GateChannel::Gate1,
    GateChannel::Gate2,
    GateChannel::Gate3,
    GateChannel::Gate4,
];

impl Knob {
    /// Zero-based knob index
    pub fn index(self) -> usize {
        self as usize
    }
}

impl CvChannel {
    /// Zero-based jack index
    pub fn index(self) -> usize {
        self as usize
    }
}

impl GateChannel {
    /// Zero-based jack index
    pub fn index(self) -> usize {
        self as usize
    }
}

/// Normalized knob reading, full scale `0..=u16::MAX`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct KnobValue(pub u16);

impl KnobValue {
    /// Fully counter-clockwise
    pub const MIN: Self = Self(0);
    /// Fully clockwise
    pub const MAX: Self = Self(u16::MAX);

    /// Raw 16-bit position
    pub fn raw(self) -> u16 {
        self.0
    }

    /// Position in per-mille (0-1000)
    pub fn permille(self) -> u16 {
        ((self.0 as u32 * 1000) / u16::MAX as u32) as u16
    }

    /// Pick one of `options` evenly spaced zones by knob position
    ///
    /// Always returns a value in `0..options` (0 when `options` is 0).
    pub fn choice(self, options: usize) -> usize {
        if options == 0 {
            return 0;
        }
        let zone = (self.0 as u64 * options as u64) >> 16;
        (zone as usize).min(options - 1)
    }

    /// Linear map onto `min..=max`
    pub fn scale(self, min: u32, max: u32) -> u32 {
        min + ((self.0 as u64 * (max.saturating_sub(min)) as u64) / u16::MAX as u64) as u32
    }
}

/// Hardware panel collaborator
///
/// Implemented by the board crate. All calls must return promptly; they are
/// made from inside program ticks and from the menu.
pub trait PanelDriver {
    /// Read a knob position
    fn read_knob(&mut self, knob: Knob) -> KnobValue;

    /// Set a CV output to a 16-bit duty value
    fn write_cv(&mut self, channel: CvChannel, value: u16);

    /// Drive a gate output high or low
    fn write_gate(&mut self, channel: GateChannel, high: bool);

    /// Show a 4-bit pattern on the indicator LEDs
    fn set_indicator(&mut self, pattern: DisplayCode);

    /// Drive every gate low and every CV to zero
    fn quiet(&mut self) {
        for gate in GATE_CHANNELS {
            self.write_gate(gate, false);
        }
        for cv in CV_CHANNELS {
            self.write_cv(cv, 0);
        }
    }
}
