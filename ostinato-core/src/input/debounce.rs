//! Debouncing for button levels and knob positions

/// Digital level debouncer
///
/// A level change is reported only after it has persisted for
/// `threshold` consecutive samples. Reported edges strictly alternate.
#[derive(Debug, Clone, Copy)]
pub struct Debouncer {
    stable: bool,
    count: u8,
    threshold: u8,
}

impl Debouncer {
    /// Create a debouncer with an initial released (low) state
    pub fn new(threshold: u8) -> Self {
        Self {
            stable: false,
            count: 0,
            threshold: threshold.max(1),
        }
    }

    /// Current debounced level
    pub fn is_active(&self) -> bool {
        self.stable
    }

    /// Feed one sample
    ///
    /// Returns the new level when a change is confirmed.
    pub fn sample(&mut self, level: bool) -> Option<bool> {
        if level == self.stable {
            self.count = 0;
            return None;
        }

        self.count = self.count.saturating_add(1);
        if self.count >= self.threshold {
            self.stable = level;
            self.count = 0;
            Some(level)
        } else {
            None
        }
    }
}

/// Knob position tracker with hysteresis
///
/// Reports a new position once the reading has stayed more than
/// `hysteresis` away from the last reported position for `threshold`
/// consecutive samples. ADC noise around a resting knob is never reported.
#[derive(Debug, Clone, Copy)]
pub struct KnobTracker {
    reported: Option<u16>,
    count: u8,
    threshold: u8,
    hysteresis: u16,
}

impl KnobTracker {
    /// Create a tracker
    pub fn new(threshold: u8, hysteresis: u16) -> Self {
        Self {
            reported: None,
            count: 0,
            threshold: threshold.max(1),
            hysteresis,
        }
    }

    /// Last reported position, if a baseline exists
    pub fn position(&self) -> Option<u16> {
        self.reported
    }

    /// Feed one reading
    ///
    /// The first reading only establishes the baseline.
    pub fn sample(&mut self, reading: u16) -> Option<u16> {
        let Some(reported) = self.reported else {
            self.reported = Some(reading);
            return None;
        };

        if reading.abs_diff(reported) <= self.hysteresis {
            self.count = 0;
            return None;
        }

        self.count = self.count.saturating_add(1);
        if self.count >= self.threshold {
            self.reported = Some(reading);
            self.count = 0;
            Some(reading)
        } else {
            None
        }
    }
}
