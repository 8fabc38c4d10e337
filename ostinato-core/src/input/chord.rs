//! Two-button long-press chord detection

use crate::time;

/// Detects both buttons held together past the long-press threshold
///
/// Works on debounced levels. Once the chord fires, the detector stays
/// latched until both buttons are released; while latched the input layer
/// suppresses the individual button edges.
#[derive(Debug, Clone, Copy)]
pub struct ChordDetector {
    threshold_ms: u32,
    /// Time both buttons were first seen held together
    since: Option<u32>,
    latched: bool,
}

impl ChordDetector {
    /// Create a detector
    pub fn new(threshold_ms: u32) -> Self {
        Self {
            threshold_ms,
            since: None,
            latched: false,
        }
    }

    /// Check if the chord has fired and is waiting for both releases
    pub fn is_latched(&self) -> bool {
        self.latched
    }

    /// Check if both buttons are held but the threshold has not passed yet
    pub fn is_pending(&self) -> bool {
        self.since.is_some()
    }

    /// Update with the current debounced levels
    ///
    /// Returns `true` exactly once per chord, when the threshold is reached.
    pub fn update(&mut self, a: bool, b: bool, now_ms: u32) -> bool {
        if self.latched {
            if !a && !b {
                self.latched = false;
            }
            return false;
        }

        if !(a && b) {
            // One button let go early: cancel the pending chord
            self.since = None;
            return false;
        }

        let since = *self.since.get_or_insert(now_ms);
        if time::elapsed(now_ms, since) >= self.threshold_ms {
            self.since = None;
            self.latched = true;
            return true;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fires_once_after_threshold() {
        let mut chord = ChordDetector::new(1000);
        assert!(!chord.update(true, true, 0));
        assert!(chord.is_pending());
        assert!(!chord.update(true, true, 999));
        assert!(chord.update(true, true, 1000));
        assert!(chord.is_latched());

        // Holding longer does not fire again
        assert!(!chord.update(true, true, 5000));
    }

    #[test]
    fn test_early_release_cancels() {
        let mut chord = ChordDetector::new(1000);
        chord.update(true, true, 0);
        chord.update(true, false, 500);
        assert!(!chord.is_pending());

        // Re-pressing restarts the measurement
        assert!(!chord.update(true, true, 600));
        assert!(!chord.update(true, true, 1500));
        assert!(chord.update(true, true, 1600));
    }

    #[test]
    fn test_latch_clears_only_when_both_released() {
        let mut chord = ChordDetector::new(10);
        chord.update(true, true, 0);
        assert!(chord.update(true, true, 10));

        chord.update(false, true, 20);
        assert!(chord.is_latched());
        chord.update(true, true, 30);
        assert!(chord.is_latched());
        chord.update(false, false, 40);
        assert!(!chord.is_latched());
    }

    #[test]
    fn test_single_button_never_fires() {
        let mut chord = ChordDetector::new(10);
        for t in 0..100 {
            assert!(!chord.update(true, false, t));
        }
    }
}
