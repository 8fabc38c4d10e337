//! Timed gate outputs
//!
//! Tracks when each gate must fall so programs can fire fixed-length
//! triggers or longer gates and fold the turn-off times into their sleep.

use ostinato_core::time::{earliest, reached};
use ostinato_core::traits::{GateChannel, PanelDriver, GATE_CHANNELS};

/// Standard trigger length
pub const TRIGGER_MS: u32 = 10;

/// Pending turn-off times for the four gate outputs
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct GatePulses {
    off_at: [Option<u32>; 4],
}

impl GatePulses {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raise a gate for `duration_ms`
    ///
    /// Retriggering a high gate extends it.
    pub fn trigger(
        &mut self,
        io: &mut dyn PanelDriver,
        gate: GateChannel,
        now_ms: u32,
        duration_ms: u32,
    ) {
        io.write_gate(gate, true);
        self.off_at[gate.index()] = Some(now_ms.wrapping_add(duration_ms.max(1)));
    }

    /// Raise a gate with no scheduled end
    pub fn hold(&mut self, io: &mut dyn PanelDriver, gate: GateChannel) {
        io.write_gate(gate, true);
        self.off_at[gate.index()] = None;
    }

    /// Drop a gate now
    pub fn release(&mut self, io: &mut dyn PanelDriver, gate: GateChannel) {
        io.write_gate(gate, false);
        self.off_at[gate.index()] = None;
    }

    /// Drop every gate whose time is up
    pub fn service(&mut self, io: &mut dyn PanelDriver, now_ms: u32) {
        for gate in GATE_CHANNELS {
            if let Some(off) = self.off_at[gate.index()] {
                if reached(now_ms, off) {
                    io.write_gate(gate, false);
                    self.off_at[gate.index()] = None;
                }
            }
        }
    }

    /// Earliest pending turn-off
    pub fn next_deadline(&self, now_ms: u32) -> Option<u32> {
        self.off_at
            .iter()
            .fold(None, |acc, off| earliest(acc, *off, now_ms))
    }

    /// Check if a gate has a pending turn-off
    pub fn is_high(&self, gate: GateChannel) -> bool {
        self.off_at[gate.index()].is_some()
    }

    /// Forget every pending turn-off and drive all gates low
    pub fn clear(&mut self, io: &mut dyn PanelDriver) {
        for gate in GATE_CHANNELS {
            io.write_gate(gate, false);
        }
        self.off_at = [None; 4];
    }
}
