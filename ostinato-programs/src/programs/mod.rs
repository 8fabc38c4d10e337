//! Concrete control programs
//!
//! Every program follows the same shape: on its first tick it installs
//! button bindings and seeds its RNG from the start time, then each tick
//! drains fired bindings, lowers expired gates and performs a clock step
//! when one is due. Between ticks it sleeps until the next step or gate
//! turn-off, whichever comes first.

mod arpeggiator;
mod clock_divider;
mod coin_toss;
mod euclidean;
mod sequencer;
mod smooth_random;
mod turing;

pub use arpeggiator::Arpeggiator;
pub use clock_divider::ClockDivider;
pub use coin_toss::CoinToss;
pub use euclidean::EuclideanRhythm;
pub use sequencer::Sequencer;
pub use smooth_random::SmoothRandomVoltages;
pub use turing::TuringMachine;

use alloc::boxed::Box;

use ostinato_core::bindings::Trigger;
use ostinato_core::input::{InputEvent, InputKind, InputSource};
use ostinato_core::program::{Program, ProgramError, ProgramFactory, Suspend, TickContext};
use ostinato_core::registry::{ConfigError, DisplayCode, ProgramDescriptor, ProgramRegistry};
use ostinato_core::time::{earliest, remaining};

use crate::gates::GatePulses;

/// Seed every program starts from before mixing in the start time
const BASE_SEED: u64 = 0x0571_4A70_2D3C_9B1F;

/// Menu entries in cycling order
const PROGRAMS: [(&str, ProgramFactory); 7] = [
    ("arpeggiator", Arpeggiator::factory),
    ("clock divider", ClockDivider::factory),
    ("coin toss", CoinToss::factory),
    ("euclidean rhythm", EuclideanRhythm::factory),
    ("sequencer", Sequencer::factory),
    ("smooth random voltages", SmoothRandomVoltages::factory),
    ("turing machine", TuringMachine::factory),
];

/// Build the registry with every bundled program
///
/// Display codes follow registration order, starting at 0.
pub fn default_registry() -> Result<ProgramRegistry, ConfigError> {
    let mut registry = ProgramRegistry::new();
    for (bits, (label, factory)) in PROGRAMS.iter().enumerate() {
        let code = DisplayCode::new(bits as u8).ok_or(ConfigError::Full)?;
        registry.register(ProgramDescriptor::new(code, *label, *factory))?;
    }
    Ok(registry)
}

fn boxed<P: Program + 'static>(program: P) -> Result<Box<dyn Program>, ProgramError> {
    Ok(Box::new(program))
}

/// Install short-press bindings on both buttons
fn bind_buttons(ctx: &mut TickContext<'_>) -> Result<(), ProgramError> {
    ctx.bind_input(InputSource::ButtonA, InputKind::Released)?;
    ctx.bind_input(InputSource::ButtonB, InputKind::Released)?;
    Ok(())
}

/// Take the next fired input binding, skipping timer triggers
fn next_input(ctx: &mut TickContext<'_>) -> Option<InputEvent> {
    while let Some(trigger) = ctx.next_trigger() {
        if let Trigger::Input { event, .. } = trigger {
            return Some(event);
        }
    }
    None
}

/// Take the next clicked button
fn next_click(ctx: &mut TickContext<'_>) -> Option<InputSource> {
    next_input(ctx).map(|event| event.source)
}

/// Sleep until `deadline` or the next gate turn-off
fn sleep_until(now_ms: u32, deadline: u32, gates: &GatePulses) -> Suspend {
    let wake = earliest(Some(deadline), gates.next_deadline(now_ms), now_ms).unwrap_or(deadline);
    Suspend::Sleep {
        ms: remaining(now_ms, wake),
    }
}

#[cfg(test)]
pub(crate) mod harness {
    //! Host-side doubles shared by the program tests

    use alloc::vec::Vec;

    use ostinato_core::config::SchedulerConfig;
    use ostinato_core::input::{InputEvent, InputKind, InputSource};
    use ostinato_core::program::ProgramFactory;
    use ostinato_core::registry::{DisplayCode, ProgramDescriptor, ProgramRegistry};
    use ostinato_core::scheduler::Scheduler;
    use ostinato_core::time::remaining;
    use ostinato_core::traits::{
        CvChannel, Diagnostics, GateChannel, Knob, KnobValue, PanelDriver,
    };
    use ostinato_core::RuntimeError;

    /// Recording panel
    #[derive(Debug, Default)]
    pub struct MockPanel {
        pub knobs: [KnobValue; 2],
        pub cv: [u16; 4],
        pub gates: [bool; 4],
        /// Low-to-high transitions per gate
        pub rises: [u32; 4],
        pub indicator: Option<DisplayCode>,
        pub cv1_log: Vec<u16>,
    }

    impl MockPanel {
        pub fn reset_counts(&mut self) {
            self.rises = [0; 4];
            self.cv1_log.clear();
        }
    }

    impl PanelDriver for MockPanel {
        fn read_knob(&mut self, knob: Knob) -> KnobValue {
            self.knobs[knob.index()]
        }

        fn write_cv(&mut self, channel: CvChannel, value: u16) {
            self.cv[channel.index()] = value;
            if channel == CvChannel::Cv1 {
                self.cv1_log.push(value);
            }
        }

        fn write_gate(&mut self, channel: GateChannel, high: bool) {
            let i = channel.index();
            if high && !self.gates[i] {
                self.rises[i] += 1;
            }
            self.gates[i] = high;
        }

        fn set_indicator(&mut self, pattern: DisplayCode) {
            self.indicator = Some(pattern);
        }
    }

    #[derive(Debug, Default)]
    pub struct Recorder {
        pub reports: Vec<RuntimeError>,
    }

    impl Diagnostics for Recorder {
        fn report(&mut self, error: RuntimeError) {
            self.reports.push(error);
        }
    }

    /// One program running under the real scheduler with a simulated clock
    pub struct Rig {
        pub scheduler: Scheduler,
        pub io: MockPanel,
        pub diag: Recorder,
        pub now: u32,
    }

    impl Rig {
        /// Start `factory` with both knobs fully counter-clockwise
        pub fn new(factory: ProgramFactory) -> Self {
            Self::with_knobs(factory, KnobValue::MIN, KnobValue::MIN)
        }

        pub fn with_knobs(factory: ProgramFactory, knob_1: KnobValue, knob_2: KnobValue) -> Self {
            let mut registry = ProgramRegistry::new();
            registry
                .register(ProgramDescriptor::new(DisplayCode::ZERO, "under test", factory))
                .unwrap();
            let mut scheduler = Scheduler::new(registry, SchedulerConfig::default()).unwrap();
            let mut io = MockPanel {
                knobs: [knob_1, knob_2],
                ..MockPanel::default()
            };
            let mut diag = Recorder::default();
            scheduler.boot(&mut io).unwrap();
            scheduler.confirm(&mut io, &mut diag);
            io.reset_counts();
            Self {
                scheduler,
                io,
                diag,
                now: 0,
            }
        }

        /// Tick whenever the scheduler asks to, up to (excluding) `end_ms`
        pub fn run_until(&mut self, end_ms: u32) {
            while self.now < end_ms {
                self.scheduler.tick(self.now, &mut self.io, &mut self.diag);
                let wake = self.scheduler.next_wake(self.now).unwrap_or(end_ms);
                self.now += remaining(self.now, wake).max(1);
            }
        }

        /// Short press of a button, delivered at the current time
        pub fn click(&mut self, source: InputSource) {
            for kind in [InputKind::Pressed, InputKind::Released] {
                let event = InputEvent::new(source, kind, self.now);
                self.scheduler.handle_input(event, &mut self.io, &mut self.diag);
            }
        }

        /// Button held alone past the threshold; the input layer swallows
        /// the release that follows
        pub fn long_press(&mut self, source: InputSource) {
            for kind in [InputKind::Pressed, InputKind::LongPress] {
                let event = InputEvent::new(source, kind, self.now);
                self.scheduler.handle_input(event, &mut self.io, &mut self.diag);
            }
        }

        /// Move a knob to `value` and report the move
        pub fn turn(&mut self, source: InputSource, value: KnobValue) {
            let index = if source == InputSource::Knob1 { 0 } else { 1 };
            self.io.knobs[index] = value;
            let event = InputEvent::new(source, InputKind::Moved { position: value.0 }, self.now);
            self.scheduler.handle_input(event, &mut self.io, &mut self.diag);
        }
    }
}
