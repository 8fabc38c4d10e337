//! Turing machine
//!
//! An 8-bit probabilistic shift register drives two quantized pitch CVs.
//! Knob 2 sets the chance that a step mutates the looping bit pattern:
//! fully counter-clockwise the 8-step loop repeats forever, fully clockwise
//! every step is new.
//!
//! | Output | Signal |
//! |--------|--------|
//! | CV1 | pitch from the whole register (major scale, 3 octaves) |
//! | CV2 | pitch from the low nibble |
//! | CV3, CV4 | random voltages |
//! | Gate 1 | trigger every step |
//! | Gate 2 | gate for the length of the step |
//! | Gate 3 | trigger when the step mutated |
//! | Gate 4 | trigger at the start of the loop |
//!
//! ButtonA forces a mutation on the next step. ButtonB locks the loop.

use alloc::boxed::Box;

use ostinato_core::input::InputSource;
use ostinato_core::program::{Program, ProgramError, Suspend, TickContext};
use ostinato_core::time::reached;
use ostinato_core::traits::{CvChannel, GateChannel, Knob};

use super::{bind_buttons, boxed, next_click, sleep_until, BASE_SEED};
use crate::clock::TempoClock;
use crate::gates::{GatePulses, TRIGGER_MS};
use crate::rng::{Probability, Rng};
use crate::scales::{ScaleNotes, SCALES};
use crate::shift_register::ShiftRegister;

/// Register width, also the loop length
const WIDTH: u8 = 8;

pub struct TuringMachine {
    clock: TempoClock,
    gates: GatePulses,
    rng: Rng,
    register: ShiftRegister,
    notes: ScaleNotes,
    step: u8,
    locked: bool,
    force_mutation: bool,
    next_step: u32,
}

impl TuringMachine {
    pub fn new() -> Result<Self, ProgramError> {
        let mut rng = Rng::new(BASE_SEED);
        let register = ShiftRegister::random(WIDTH, &mut rng).ok_or(ProgramError::InvalidParameters)?;
        Ok(Self {
            clock: TempoClock::new(),
            gates: GatePulses::new(),
            rng,
            register,
            notes: SCALES[0].notes(),
            step: 0,
            locked: false,
            force_mutation: false,
            next_step: 0,
        })
    }

    pub fn factory() -> Result<Box<dyn Program>, ProgramError> {
        boxed(Self::new()?)
    }

    /// Quantized pitches for the current register contents
    fn pitches(&self) -> (u16, u16) {
        let len = self.notes.len();
        let value = self.register.value() as usize;
        let low = self.register.low_bits(4) as usize;
        (
            self.notes.quantize(value * len / 256, len),
            self.notes.quantize(low * len / 16, len),
        )
    }

    fn clock_register(&mut self, p: Probability) -> bool {
        if core::mem::take(&mut self.force_mutation) {
            self.register.step_flip();
            true
        } else {
            self.register.step(p, &mut self.rng)
        }
    }

    fn on_step(&mut self, ctx: &mut TickContext<'_>) {
        let now = ctx.now_ms();
        let io = ctx.io();
        self.clock.update(io.read_knob(Knob::One));

        let p = if self.locked {
            Probability::ZERO
        } else {
            Probability::from_knob(io.read_knob(Knob::Two))
        };
        let mutated = self.clock_register(p);

        let (pitch_1, pitch_2) = self.pitches();
        io.write_cv(CvChannel::Cv1, pitch_1);
        io.write_cv(CvChannel::Cv2, pitch_2);
        io.write_cv(CvChannel::Cv3, self.rng.next_u16());
        io.write_cv(CvChannel::Cv4, self.rng.next_u16());

        let wait = self.clock.wait_ms();
        self.gates.trigger(io, GateChannel::Gate1, now, TRIGGER_MS);
        self.gates
            .trigger(io, GateChannel::Gate2, now, wait.saturating_sub(TRIGGER_MS));
        if mutated {
            self.gates.trigger(io, GateChannel::Gate3, now, TRIGGER_MS);
        }
        if self.step == 0 {
            self.gates.trigger(io, GateChannel::Gate4, now, TRIGGER_MS);
        }
        self.step = (self.step + 1) % WIDTH;
    }
}

impl Program for TuringMachine {
    fn run_tick(&mut self, ctx: &mut TickContext<'_>) -> Result<Suspend, ProgramError> {
        let now = ctx.now_ms();
        if ctx.is_first_tick() {
            bind_buttons(ctx)?;
            self.rng.mix(now as u64);
            self.next_step = now;
        }

        while let Some(source) = next_click(ctx) {
            match source {
                InputSource::ButtonA => self.force_mutation = true,
                InputSource::ButtonB => self.locked = !self.locked,
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
