//! Arpeggiator
//!
//! Knob 1 sets the tempo, knob 2 the octave range (1 to 3). Each CV output
//! walks the selected scale in its own order:
//!
//! - CV1 ascending, CV2 descending
//! - CV3 ping-pong (ascending, then descending on the next cycle)
//! - CV4 random notes from the same range
//!
//! Gate 1 fires every step, gate 2 at the start of a cycle, gates 3 and 4
//! on every third and fourth step. ButtonA switches to the next scale and
//! restarts from the first note.

use alloc::boxed::Box;

use ostinato_core::input::InputSource;
use ostinato_core::program::{Program, ProgramError, Suspend, TickContext};
use ostinato_core::time::reached;
use ostinato_core::traits::{CvChannel, GateChannel, Knob};

use super::{bind_buttons, boxed, next_click, sleep_until, BASE_SEED};
use crate::clock::TempoClock;
use crate::gates::{GatePulses, TRIGGER_MS};
use crate::rng::Rng;
use crate::scales::{ScaleNotes, OCTAVE_RANGE, SCALES};

pub struct Arpeggiator {
    clock: TempoClock,
    gates: GatePulses,
    rng: Rng,
    scale: usize,
    notes: ScaleNotes,
    octave_range: usize,
    step: usize,
    forward: bool,
    next_step: u32,
}

impl Arpeggiator {
    pub fn new() -> Self {
        Self {
            clock: TempoClock::new(),
            gates: GatePulses::new(),
            rng: Rng::new(BASE_SEED),
            scale: 0,
            notes: SCALES[0].notes(),
            octave_range: 1,
            step: 0,
            forward: true,
            next_step: 0,
        }
    }

    pub fn factory() -> Result<Box<dyn Program>, ProgramError> {
        boxed(Self::new())
    }

    fn scale_len(&self) -> usize {
        self.notes.step_count(self.octave_range).max(1)
    }

    fn restart(&mut self, octave_range: usize) {
        self.octave_range = octave_range;
        self.step = 0;
        self.forward = true;
    }

    fn next_scale(&mut self) {
        self.scale = (self.scale + 1) % SCALES.len();
        self.notes = SCALES[self.scale].notes();
        self.restart(self.octave_range);
    }

    /// Notes for the current step: ascending, descending, ping-pong, random
    fn play(&mut self) -> [u16; 4] {
        let len = self.scale_len();
        let step = self.step.min(len - 1);
        let fwd = self.notes.quantize(step, len);
        let bwd = self.notes.quantize(len - 1 - step, len);
        let bi = if self.forward { fwd } else { bwd };
        let rnd = self.notes.quantize(self.rng.gen_range(0, len as u32) as usize, len);
        [fwd, bwd, bi, rnd]
    }

    fn advance(&mut self) {
        if self.step + 1 >= self.scale_len() {
            self.step = 0;
            self.forward = !self.forward;
        } else {
            self.step += 1;
        }
    }

    fn on_step(&mut self, ctx: &mut TickContext<'_>) {
        let now = ctx.now_ms();
        let io = ctx.io();
        self.clock.update(io.read_knob(Knob::One));

        let octave_range = io.read_knob(Knob::Two).choice(OCTAVE_RANGE) + 1;
        if octave_range != self.octave_range {
            self.restart(octave_range);
        }

        let [fwd, bwd, bi, rnd] = self.play();
        io.write_cv(CvChannel::Cv1, fwd);
        io.write_cv(CvChannel::Cv2, bwd);
        io.write_cv(CvChannel::Cv3, bi);
        io.write_cv(CvChannel::Cv4, rnd);

        self.gates.trigger(io, GateChannel::Gate1, now, TRIGGER_MS);
        if self.step == 0 {
            self.gates.trigger(io, GateChannel::Gate2, now, TRIGGER_MS);
        }
        if self.step % 3 == 0 {
            self.gates.trigger(io, GateChannel::Gate3, now, TRIGGER_MS);
        }
        if self.step % 4 == 0 {
            self.gates.trigger(io, GateChannel::Gate4, now, TRIGGER_MS);
        }

        self.advance();
    }
}

impl Default for Arpeggiator {
    fn default() -> Self {
        Self::new()
    }
}

impl Program for Arpeggiator {
    fn run_tick(&mut self, ctx: &mut TickContext<'_>) -> Result<Suspend, ProgramError> {
        let now = ctx.now_ms();
        if ctx.is_first_tick() {
            bind_buttons(ctx)?;
            self.rng.mix(now as u64);
            self.next_step = now;
        }

        while let Some(source) = next_click(ctx) {
            if source == InputSource::ButtonA {
                self.next_scale();
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
