//! Smooth random voltages
//!
//! Every whole note CV1 gets a new random target and gate 1 fires. CV1
//! then slews toward the target by `1 << choice(knob 2, 14)` duty units per
//! millisecond; gate 2 stays high while it moves. Knob 1 sets the tempo.

use alloc::boxed::Box;

use ostinato_core::program::{Program, ProgramError, Suspend, TickContext};
use ostinato_core::time::reached;
use ostinato_core::traits::{CvChannel, GateChannel, Knob};

use super::{boxed, sleep_until, BASE_SEED};
use crate::clock::TempoClock;
use crate::gates::{GatePulses, TRIGGER_MS};
use crate::rng::Rng;

/// Number of slew rates on knob 2 (powers of two)
const SLEW_CHOICES: usize = 14;

/// Slew update period
const SLEW_PERIOD_MS: u32 = 1;

pub struct SmoothRandomVoltages {
    clock: TempoClock,
    gates: GatePulses,
    rng: Rng,
    voltage: u16,
    target: u16,
    deadline: u32,
}

impl SmoothRandomVoltages {
    pub fn new() -> Self {
        Self {
            clock: TempoClock::new(),
            gates: GatePulses::new(),
            rng: Rng::new(BASE_SEED),
            voltage: 0,
            target: 0,
            deadline: 0,
        }
    }

    pub fn factory() -> Result<Box<dyn Program>, ProgramError> {
        boxed(Self::new())
    }

    /// Move one step toward the target; returns whether the voltage moved
    fn slew(&mut self, rate: u16) -> bool {
        if self.voltage < self.target {
            self.voltage = self.voltage.saturating_add(rate).min(self.target);
            true
        } else if self.voltage > self.target {
            self.voltage = self.voltage.saturating_sub(rate).max(self.target);
            true
        } else {
            false
        }
    }
}

impl Default for SmoothRandomVoltages {
    fn default() -> Self {
        Self::new()
    }
}

impl Program for SmoothRandomVoltages {
    fn run_tick(&mut self, ctx: &mut TickContext<'_>) -> Result<Suspend, ProgramError> {
        let now = ctx.now_ms();
        if ctx.is_first_tick() {
            self.rng.mix(now as u64);
            self.deadline = now;
        }

        let io = ctx.io();
        self.gates.service(io, now);

        if reached(now, self.deadline) {
            self.clock.update(io.read_knob(Knob::One));
            self.target = self.rng.next_u16();
            self.deadline = now.wrapping_add(self.clock.whole_note_ms());
            self.gates.trigger(io, GateChannel::Gate1, now, TRIGGER_MS);
        }

        let rate = 1u16 << io.read_knob(Knob::Two).choice(SLEW_CHOICES);
        if self.slew(rate) {
            io.write_cv(CvChannel::Cv1, self.voltage);
            io.write_gate(GateChannel::Gate2, true);
            return Ok(Suspend::Sleep { ms: SLEW_PERIOD_MS });
        }

        io.write_gate(GateChannel::Gate2, false);
        Ok(sleep_until(now, self.deadline, &self.gates))
    }
}
