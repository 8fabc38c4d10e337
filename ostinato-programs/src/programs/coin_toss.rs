//! Coin toss
//!
//! Two pairs of clocked probability gates. Every toss draws a random value
//! and compares it against the knob 2 threshold: the first gate of a pair
//! wins above it, the second below. Gates 1/2 toss once per whole note,
//! gates 3/4 on every clock step.
//!
//! ButtonA toggles turbo (audio-rate tempo range). ButtonB switches between
//! gate mode, where the winner is held until the next toss, and trigger
//! mode, where only the winner fires a short trigger.

use alloc::boxed::Box;

use ostinato_core::input::InputSource;
use ostinato_core::program::{Program, ProgramError, Suspend, TickContext};
use ostinato_core::time::reached;
use ostinato_core::traits::{GateChannel, Knob, PanelDriver};

use super::{bind_buttons, boxed, next_click, sleep_until, BASE_SEED};
use crate::clock::TempoClock;
use crate::gates::{GatePulses, TRIGGER_MS};
use crate::rng::Rng;

pub struct CoinToss {
    clock: TempoClock,
    gates: GatePulses,
    rng: Rng,
    gate_mode: bool,
    whole_note: u32,
    next_step: u32,
}

impl CoinToss {
    pub fn new() -> Self {
        Self {
            clock: TempoClock::new(),
            gates: GatePulses::new(),
            rng: Rng::new(BASE_SEED),
            gate_mode: true,
            whole_note: 0,
            next_step: 0,
        }
    }

    pub fn factory() -> Result<Box<dyn Program>, ProgramError> {
        boxed(Self::new())
    }

    fn toss(&mut self, io: &mut dyn PanelDriver, a: GateChannel, b: GateChannel, now: u32) -> u16 {
        let coin = self.rng.next_u16();
        let threshold = io.read_knob(Knob::Two).raw();
        if self.gate_mode {
            self.set_level(io, a, coin > threshold);
            self.set_level(io, b, coin < threshold);
        } else {
            let winner = if coin > threshold { a } else { b };
            self.gates.trigger(io, winner, now, TRIGGER_MS);
        }
        coin
    }

    fn set_level(&mut self, io: &mut dyn PanelDriver, gate: GateChannel, high: bool) {
        if high {
            self.gates.hold(io, gate);
        } else {
            self.gates.release(io, gate);
        }
    }

    fn toggle_mode(&mut self, io: &mut dyn PanelDriver) {
        self.gate_mode = !self.gate_mode;
        self.gates.clear(io);
    }

    fn on_step(&mut self, ctx: &mut TickContext<'_>) {
        let now = ctx.now_ms();
        let io = ctx.io();
        self.clock.update(io.read_knob(Knob::One));

        if reached(now, self.whole_note) {
            self.whole_note = now.wrapping_add(self.clock.whole_note_ms());
            self.toss(io, GateChannel::Gate1, GateChannel::Gate2, now);
        }
        self.toss(io, GateChannel::Gate3, GateChannel::Gate4, now);
    }
}

impl Default for CoinToss {
    fn default() -> Self {
        Self::new()
    }
}

impl Program for CoinToss {
    fn run_tick(&mut self, ctx: &mut TickContext<'_>) -> Result<Suspend, ProgramError> {
        let now = ctx.now_ms();
        if ctx.is_first_tick() {
            bind_buttons(ctx)?;
            self.rng.mix(now as u64);
            self.whole_note = now;
            self.next_step = now;
        }

        while let Some(source) = next_click(ctx) {
            match source {
                InputSource::ButtonA => self.clock.toggle_turbo(),
                InputSource::ButtonB => self.toggle_mode(ctx.io()),
                _ => {}
            }
        }

        self.gates.service(ctx.io(), now);
        if reached(now, self.next_step) {
            self.on_step(ctx);
            self.next_step = now.wrapping_add(self.clock.wait_ms());
        }

        Ok(sleep_until(now, self.next_step, &self.gates))
    }
}
