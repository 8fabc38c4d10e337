//! Euclidean rhythms
//!
//! Four Euclidean patterns, one per gate, clocked by the master tempo.
//!
//! ButtonA toggles between tempo edit (knob 1 sets the tempo) and pattern
//! edit, where the tempo is frozen, knob 1 sets the selected pattern's step
//! count (1 to 16) and knob 2 its pulse count (0 to steps). ButtonB cycles
//! the pattern being edited.

use alloc::boxed::Box;

use ostinato_core::input::InputSource;
use ostinato_core::program::{Program, ProgramError, Suspend, TickContext};
use ostinato_core::time::reached;
use ostinato_core::traits::{Knob, KnobValue, GATE_CHANNELS};

use super::{bind_buttons, boxed, next_click, sleep_until};
use crate::clock::TempoClock;
use crate::euclid::{EuclidError, EuclideanPattern};
use crate::gates::{GatePulses, TRIGGER_MS};

/// Longest pattern reachable from the knob
pub const MAX_KNOB_STEPS: usize = 16;

pub struct EuclideanRhythm {
    clock: TempoClock,
    gates: GatePulses,
    patterns: [EuclideanPattern; 4],
    selected: usize,
    pattern_mode: bool,
    next_step: u32,
}

impl EuclideanRhythm {
    pub fn new() -> Result<Self, EuclidError> {
        Ok(Self {
            clock: TempoClock::new(),
            gates: GatePulses::new(),
            patterns: [
                EuclideanPattern::new(5, 8)?,
                EuclideanPattern::new(0, 1)?,
                EuclideanPattern::new(0, 1)?,
                EuclideanPattern::new(0, 1)?,
            ],
            selected: 0,
            pattern_mode: false,
            next_step: 0,
        })
    }

    pub fn factory() -> Result<Box<dyn Program>, ProgramError> {
        boxed(Self::new()?)
    }

    fn toggle_mode(&mut self) {
        self.clock.toggle_edit();
        self.pattern_mode = !self.pattern_mode;
    }

    fn select_next(&mut self) {
        self.selected = (self.selected + 1) % self.patterns.len();
    }

    /// Rebuild the selected pattern if the knobs ask for different
    /// parameters; returns whether it was rebuilt
    fn edit_pattern(&mut self, knob_1: KnobValue, knob_2: KnobValue) -> Result<bool, EuclidError> {
        let steps = knob_1.choice(MAX_KNOB_STEPS) + 1;
        let pulses = knob_2.choice(steps + 1);
        let pattern = &mut self.patterns[self.selected];
        if pattern.matches(pulses, steps) {
            return Ok(false);
        }
        *pattern = EuclideanPattern::new(pulses, steps)?;
        Ok(true)
    }

    fn on_step(&mut self, ctx: &mut TickContext<'_>) -> Result<(), ProgramError> {
        let now = ctx.now_ms();
        let io = ctx.io();
        let knob_1 = io.read_knob(Knob::One);
        self.clock.update(knob_1);

        if self.pattern_mode {
            self.edit_pattern(knob_1, io.read_knob(Knob::Two))?;
        }

        for (gate, pattern) in GATE_CHANNELS.iter().zip(self.patterns.iter_mut()) {
            if pattern.advance() {
                self.gates.trigger(io, *gate, now, TRIGGER_MS);
            }
        }
        Ok(())
    }
}

impl Program for EuclideanRhythm {
    fn run_tick(&mut self, ctx: &mut TickContext<'_>) -> Result<Suspend, ProgramError> {
        let now = ctx.now_ms();
        if ctx.is_first_tick() {
            bind_buttons(ctx)?;
            self.next_step = now;
        }

        while let Some(source) = next_click(ctx) {
            match source {
                InputSource::ButtonA => self.toggle_mode(),
                InputSource::ButtonB => self.select_next(),
                _ => {}
            }
        }

        self.gates.service(ctx.io(), now);
        if reached(now, self.next_step) {
            self.on_step(ctx)?;
            self.next_step = now.wrapping_add(self.clock.wait_ms());
        }

        Ok(sleep_until(now, self.next_step, &self.gates))
    }
}
