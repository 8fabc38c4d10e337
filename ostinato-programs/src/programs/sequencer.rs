//! Step sequencer
//!
//! Four channels of eight quantized pitch steps, arranged as two rows of
//! two channels. Starts in edit mode on the top row.
//!
//! | Control | Edit mode | Play mode |
//! |---------|-----------|-----------|
//! | Knob 1 | pitch of the current step, left channel of the row | tempo |
//! | Knob 2 | pitch of the current step, right channel of the row | - |
//! | ButtonA | play the current step | play / pause |
//! | ButtonA long | switch row | - |
//! | ButtonB | next step | - |
//! | ButtonB long | enter play mode | enter edit mode |
//!
//! CV1/CV2 carry the top row, CV3/CV4 the bottom row. Gate 1 triggers on
//! every played step. In edit mode gate 2 blinks on each step change (long
//! on the first step) and gates 3/4 show the selected row.

use alloc::boxed::Box;

use ostinato_core::input::{InputEvent, InputKind, InputSource};
use ostinato_core::program::{Program, ProgramError, Suspend, TickContext};
use ostinato_core::time::{reached, remaining};
use ostinato_core::traits::{CvChannel, GateChannel, Knob, KnobValue, PanelDriver};

use super::{bind_buttons, boxed, next_input, sleep_until};
use crate::clock::TempoClock;
use crate::gates::{GatePulses, TRIGGER_MS};
use crate::scales::{ScaleNotes, SCALES};

/// Steps per channel
pub const STEPS: usize = 8;

/// Index of the chromatic scale in `SCALES`
const CHROMATIC: usize = 6;

/// Gate 2 blink marking the first step while editing
const PATTERN_START_MS: u32 = 500;

/// Sleep while paused or editing; input wakes the program earlier
const IDLE_SLEEP_MS: u32 = 1000;

pub struct Sequencer {
    clock: TempoClock,
    gates: GatePulses,
    notes: ScaleNotes,
    /// Channels in row order: top-left, bottom-left, top-right, bottom-right
    pitch: [[u16; STEPS]; 4],
    step: usize,
    row: usize,
    edit: bool,
    running: bool,
    next_step: u32,
}

impl Sequencer {
    pub fn new() -> Self {
        Self {
            clock: TempoClock::new(),
            gates: GatePulses::new(),
            notes: SCALES[CHROMATIC].notes(),
            pitch: [[0; STEPS]; 4],
            step: 0,
            row: 0,
            edit: true,
            running: false,
            next_step: 0,
        }
    }

    pub fn factory() -> Result<Box<dyn Program>, ProgramError> {
        boxed(Self::new())
    }

    fn note_at(&self, position: u16) -> u16 {
        let index = KnobValue(position).choice(self.notes.len());
        self.notes.get(index).unwrap_or(0)
    }

    fn show_row(&mut self, io: &mut dyn PanelDriver) {
        let (on, off) = if self.row == 0 {
            (GateChannel::Gate3, GateChannel::Gate4)
        } else {
            (GateChannel::Gate4, GateChannel::Gate3)
        };
        self.gates.hold(io, on);
        self.gates.release(io, off);
    }

    fn toggle_edit(&mut self, io: &mut dyn PanelDriver, now: u32) {
        if self.edit {
            self.edit = false;
            self.running = true;
            self.next_step = now;
            for gate in [GateChannel::Gate2, GateChannel::Gate3, GateChannel::Gate4] {
                self.gates.release(io, gate);
            }
        } else {
            self.edit = true;
            self.running = false;
            self.step = 0;
            self.show_row(io);
        }
    }

    fn toggle_run(&mut self, now: u32) {
        self.running = !self.running;
        if self.running {
            self.next_step = now;
        }
    }

    fn play_step(&mut self, io: &mut dyn PanelDriver, now: u32) {
        let step = self.step;
        io.write_cv(CvChannel::Cv1, self.pitch[0][step]);
        io.write_cv(CvChannel::Cv2, self.pitch[2][step]);
        io.write_cv(CvChannel::Cv3, self.pitch[1][step]);
        io.write_cv(CvChannel::Cv4, self.pitch[3][step]);
        self.gates.trigger(io, GateChannel::Gate1, now, TRIGGER_MS);
    }

    fn advance(&mut self, io: &mut dyn PanelDriver, now: u32) {
        self.step = (self.step + 1) % STEPS;
        if self.edit {
            let blink = if self.step == 0 {
                PATTERN_START_MS
            } else {
                TRIGGER_MS
            };
            self.gates.trigger(io, GateChannel::Gate2, now, blink);
        }
    }

    fn on_input(&mut self, event: InputEvent, io: &mut dyn PanelDriver, now: u32) {
        match (event.source, event.kind) {
            (InputSource::ButtonA, InputKind::Released) => {
                if self.edit {
                    self.play_step(io, now);
                } else {
                    self.toggle_run(now);
                }
            }
            (InputSource::ButtonA, InputKind::LongPress) if self.edit => {
                self.row = (self.row + 1) % 2;
                self.show_row(io);
            }
            (InputSource::ButtonB, InputKind::Released) if self.edit => self.advance(io, now),
            (InputSource::ButtonB, InputKind::LongPress) => self.toggle_edit(io, now),
            (InputSource::Knob1, InputKind::Moved { position }) if self.edit => {
                self.pitch[self.row][self.step] = self.note_at(position);
            }
            (InputSource::Knob2, InputKind::Moved { position }) if self.edit => {
                self.pitch[self.row + 2][self.step] = self.note_at(position);
            }
            _ => {}
        }
    }
}

impl Default for Sequencer {
    fn default() -> Self {
        Self::new()
    }
}

impl Program for Sequencer {
    fn run_tick(&mut self, ctx: &mut TickContext<'_>) -> Result<Suspend, ProgramError> {
        let now = ctx.now_ms();
        if ctx.is_first_tick() {
            bind_buttons(ctx)?;
            ctx.bind_input(InputSource::ButtonA, InputKind::LongPress)?;
            ctx.bind_input(InputSource::ButtonB, InputKind::LongPress)?;
            ctx.bind_input(InputSource::Knob1, InputKind::Moved { position: 0 })?;
            ctx.bind_input(InputSource::Knob2, InputKind::Moved { position: 0 })?;
            self.show_row(ctx.io());
        }

        while let Some(event) = next_input(ctx) {
            self.on_input(event, ctx.io(), now);
        }

        self.gates.service(ctx.io(), now);
        if !self.running {
            let ms = self
                .gates
                .next_deadline(now)
                .map_or(IDLE_SLEEP_MS, |off| remaining(now, off));
            return Ok(Suspend::Sleep { ms });
        }

        if reached(now, self.next_step) {
            let io = ctx.io();
            self.clock.update(io.read_knob(Knob::One));
            self.play_step(io, now);
            self.advance(io, now);
            self.next_step = now.wrapping_add(self.clock.wait_ms());
        }

        Ok(sleep_until(now, self.next_step, &self.gates))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::programs::harness::Rig;
    use crate::scales::chromatic_duty;

    /// Rig with the sequencer's bindings installed
    fn rig() -> Rig {
        let mut rig = Rig::new(Sequencer::factory);
        rig.run_until(1);
        rig
    }

    fn settle(rig: &mut Rig) {
        let end = rig.now + 1;
        rig.run_until(end);
    }

    #[test]
    fn test_chromatic_table() {
        assert_eq!(SCALES[CHROMATIC].name, "chromatic");
        assert_eq!(Sequencer::new().notes.len(), 37);
    }

    #[test]
    fn test_starts_editing_top_row() {
        let rig = rig();
        assert!(rig.io.gates[2]);
        assert!(!rig.io.gates[3]);
        assert_eq!(rig.io.rises[0], 0);
    }

    #[test]
    fn test_knobs_set_current_step() {
        let mut rig = rig();
        rig.turn(InputSource::Knob1, KnobValue::MAX);
        rig.turn(InputSource::Knob2, KnobValue(40_000));
        rig.click(InputSource::ButtonA);
        settle(&mut rig);

        assert_eq!(rig.io.cv[0], chromatic_duty(36));
        // 40000 * 37 >> 16 = 22
        assert_eq!(rig.io.cv[1], chromatic_duty(22));
        assert_eq!(rig.io.cv[2], 0);
        assert_eq!(rig.io.rises[0], 1);
    }

    #[test]
    fn test_long_press_a_switches_row() {
        let mut rig = rig();
        rig.long_press(InputSource::ButtonA);
        rig.turn(InputSource::Knob1, KnobValue::MAX);
        rig.click(InputSource::ButtonA);
        settle(&mut rig);

        assert!(!rig.io.gates[2]);
        assert!(rig.io.gates[3]);
        assert_eq!(rig.io.cv[0], 0);
        assert_eq!(rig.io.cv[2], chromatic_duty(36));
    }

    #[test]
    fn test_step_blink() {
        let mut rig = rig();
        rig.click(InputSource::ButtonB);
        settle(&mut rig);
        assert!(rig.io.gates[1]);
        let end = rig.now + 20;
        rig.run_until(end);
        assert!(!rig.io.gates[1]);

        // Seven more steps wrap to the first one, which blinks long
        for _ in 0..7 {
            rig.click(InputSource::ButtonB);
            let end = rig.now + 20;
            rig.run_until(end);
        }
        let end = rig.now + 100;
        rig.run_until(end);
        assert!(rig.io.gates[1]);
        assert_eq!(rig.io.rises[1], 8);
    }

    #[test]
    fn test_play_mode_loops_pattern() {
        let mut rig = rig();
        rig.turn(InputSource::Knob1, KnobValue::MAX);
        rig.click(InputSource::ButtonB);
        rig.turn(InputSource::Knob1, KnobValue(30_000));
        settle(&mut rig);

        // Back to the slowest tempo without editing a step
        rig.io.knobs[0] = KnobValue::MIN;
        rig.io.reset_counts();
        rig.long_press(InputSource::ButtonB);
        let end = rig.now + 16 * 750;
        rig.run_until(end);

        let log = &rig.io.cv1_log;
        assert_eq!(log.len(), 16);
        assert_eq!(&log[..8], &log[8..]);
        assert!(log.contains(&chromatic_duty(36)));
        assert_eq!(rig.io.rises[0], 16);
        // Row display is off while playing
        assert!(!rig.io.gates[2]);
        assert!(!rig.io.gates[3]);
    }

    #[test]
    fn test_button_a_pauses_play() {
        let mut rig = rig();
        rig.long_press(InputSource::ButtonB);
        let end = rig.now + 4 * 750;
        rig.run_until(end);
        assert_eq!(rig.io.rises[0], 4);

        rig.click(InputSource::ButtonA);
        let end = rig.now + 4 * 750;
        rig.run_until(end);
        assert_eq!(rig.io.rises[0], 4);

        rig.click(InputSource::ButtonA);
        let end = rig.now + 1;
        rig.run_until(end);
        assert_eq!(rig.io.rises[0], 5);
    }

    #[test]
    fn test_long_press_b_returns_to_edit() {
        let mut rig = rig();
        rig.long_press(InputSource::ButtonB);
        let end = rig.now + 3 * 750;
        rig.run_until(end);
        rig.long_press(InputSource::ButtonB);
        settle(&mut rig);
        assert!(rig.io.gates[2]);

        // Stopped: no further steps
        let before = rig.io.rises[0];
        let end = rig.now + 4 * 750;
        rig.run_until(end);
        assert_eq!(rig.io.rises[0], before);
    }
}
