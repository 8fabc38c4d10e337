//! Single-button long-press detection

use crate::time;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HoldState {
    Idle,
    Timing { since: u32 },
    Fired,
    /// The other button joined in; dead until this button is released
    Cancelled,
}

/// Detects one button held alone past the long-press threshold
///
/// The hold only counts while the other button stays up. As soon as the
/// other button goes down the hold is cancelled for the rest of the press,
/// so a two-button chord never produces a single-button long press.
#[derive(Debug, Clone, Copy)]
pub struct HoldDetector {
    threshold_ms: u32,
    state: HoldState,
}

impl HoldDetector {
    /// Create a detector
    pub fn new(threshold_ms: u32) -> Self {
        Self {
            threshold_ms,
            state: HoldState::Idle,
        }
    }

    /// Check if the long press fired during the current press
    ///
    /// Stays set until the button's level is seen released by `update`.
    pub fn is_fired(&self) -> bool {
        self.state == HoldState::Fired
    }

    /// Update with the debounced levels of this button and the other one
    ///
    /// Returns `true` exactly once per press, when the threshold is reached.
    pub fn update(&mut self, own: bool, other: bool, now_ms: u32) -> bool {
        if !own {
            self.state = HoldState::Idle;
            return false;
        }

        match self.state {
            HoldState::Idle | HoldState::Timing { .. } if other => {
                self.state = HoldState::Cancelled;
                false
            }
            HoldState::Idle => {
                self.state = HoldState::Timing { since: now_ms };
                false
            }
            HoldState::Timing { since } => {
                if time::elapsed(now_ms, since) >= self.threshold_ms {
                    self.state = HoldState::Fired;
                    true
                } else {
                    false
                }
            }
            HoldState::Fired | HoldState::Cancelled => false,
        }
    }
}
