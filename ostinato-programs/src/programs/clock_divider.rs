//! Clock divider
//!
//! Four divisions of the knob 1 master clock, one per gate. ButtonB walks
//! through the gates; knob 2 then picks the selected gate's division.

use alloc::boxed::Box;

use ostinato_core::input::InputSource;
use ostinato_core::program::{Program, ProgramError, Suspend, TickContext};
use ostinato_core::time::reached;
use ostinato_core::traits::{Knob, GATE_CHANNELS};

use super::{bind_buttons, boxed, next_click, sleep_until};
use crate::clock::TempoClock;
use crate::gates::{GatePulses, TRIGGER_MS};

/// Divisions knob 2 chooses from
pub const DIVISION_CHOICES: [u32; 10] = [1, 2, 3, 4, 5, 6, 7, 8, 12, 16];

/// Counter period, divisible by every choice
const COUNTER_WRAP: u32 = 1680;

const DEFAULT_DIVISIONS: [u32; 4] = [1, 2, 4, 8];

pub struct ClockDivider {
    clock: TempoClock,
    gates: GatePulses,
    divisions: [u32; 4],
    selected: Option<usize>,
    previous_choice: usize,
    counter: u32,
    next_step: u32,
}

impl ClockDivider {
    pub fn new() -> Self {
        Self {
            clock: TempoClock::new(),
            gates: GatePulses::new(),
            divisions: DEFAULT_DIVISIONS,
            selected: None,
            previous_choice: 0,
            counter: 1,
            next_step: 0,
        }
    }

    pub fn factory() -> Result<Box<dyn Program>, ProgramError> {
        boxed(Self::new())
    }

    /// Current division of every gate
    pub fn divisions(&self) -> [u32; 4] {
        self.divisions
    }

    fn select_next(&mut self) {
        self.selected = Some(self.selected.map_or(0, |i| (i + 1) % self.divisions.len()));
    }

    fn on_step(&mut self, ctx: &mut TickContext<'_>) {
        let now = ctx.now_ms();
        let io = ctx.io();
        self.clock.update(io.read_knob(Knob::One));

        for (gate, division) in GATE_CHANNELS.iter().zip(self.divisions) {
            if self.counter % division == 0 {
                self.gates.trigger(io, *gate, now, TRIGGER_MS);
            }
        }

        let choice = io.read_knob(Knob::Two).choice(DIVISION_CHOICES.len());
        if let Some(selected) = self.selected {
            if choice != self.previous_choice {
                self.divisions[selected] = DIVISION_CHOICES[choice];
                self.previous_choice = choice;
            }
        }

        self.counter = (self.counter + 1) % COUNTER_WRAP;
    }
}

impl Default for ClockDivider {
    fn default() -> Self {
        Self::new()
    }
}

impl Program for ClockDivider {
    fn run_tick(&mut self, ctx: &mut TickContext<'_>) -> Result<Suspend, ProgramError> {
        let now = ctx.now_ms();
        if ctx.is_first_tick() {
            bind_buttons(ctx)?;
            self.previous_choice = ctx.io().read_knob(Knob::Two).choice(DIVISION_CHOICES.len());
            self.next_step = now;
        }

        while let Some(source) = next_click(ctx) {
            if source == InputSource::ButtonB {
                self.select_next();
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::programs::harness::Rig;
    use ostinato_core::traits::KnobValue;

    #[test]
    fn test_default_divisions() {
        let mut rig = Rig::new(ClockDivider::factory);
        rig.run_until(8 * 750);
        assert_eq!(rig.io.rises, [8, 4, 2, 1]);
    }

    #[test]
    fn test_counter_wrap_divides_every_choice() {
        assert!(DIVISION_CHOICES.iter().all(|d| COUNTER_WRAP % d == 0));
    }

    #[test]
    fn test_knob_ignored_until_output_selected() {
        let mut rig = Rig::new(ClockDivider::factory);
        rig.run_until(750);
        rig.io.knobs[1] = KnobValue::MAX;
        rig.run_until(3 * 750);
        rig.io.reset_counts();
        rig.run_until(11 * 750);
        assert_eq!(rig.io.rises, [8, 4, 2, 1]);
    }

    #[test]
    fn test_button_b_selects_and_knob_sets_division() {
        let mut div = ClockDivider::new();
        div.select_next();
        assert_eq!(div.selected, Some(0));
        div.select_next();
        div.select_next();
        div.select_next();
        assert_eq!(div.selected, Some(3));
        div.select_next();
        assert_eq!(div.selected, Some(0));

        let mut rig = Rig::new(ClockDivider::factory);
        rig.run_until(750);
        rig.click(InputSource::ButtonB);
        rig.io.knobs[1] = KnobValue::MAX;
        // Division 16 applies from the next step on
        rig.run_until(2 * 750);
        rig.io.reset_counts();
        rig.run_until(18 * 750);
        assert_eq!(rig.io.rises[0], 1);
    }
}
