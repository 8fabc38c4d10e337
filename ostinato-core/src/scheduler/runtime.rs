//! Scheduler runtime
//!
//! Owns the program registry, the selection menu, the binding registry and
//! the active program instance. The caller (the firmware runtime task or a
//! test) feeds it input events and calls [`Scheduler::tick`] whenever
//! [`Scheduler::next_wake`] falls due. Input is handled between ticks, so
//! the exit gesture is honoured within one tick.

use alloc::boxed::Box;

use super::phase::{LifecycleEvent, Phase};
use crate::bindings::{BindingRegistry, TriggerQueue};
use crate::config::SchedulerConfig;
use crate::error::RuntimeError;
use crate::input::InputEvent;
use crate::menu::{LedSweep, MenuAction, SelectionMenu};
use crate::program::{Program, Suspend, TickContext};
use crate::registry::{ConfigError, DisplayCode, OutOfRange, ProgramRegistry};
use crate::time;
use crate::traits::{Diagnostics, PanelDriver};

/// Externally visible runtime mode
///
/// Exactly one of these holds at any time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RuntimeMode {
    /// Selection menu shown
    Menu,
    /// A program is active
    Running {
        /// Menu index of the program
        index: usize,
        /// Display code of the program
        code: DisplayCode,
    },
}

/// Result of one scheduler tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TickOutcome {
    /// No program active
    Idle,
    /// Program is suspended and not yet due
    Waiting,
    /// Program ran one tick and asked for this suspension
    Ran(Suspend),
    /// Program faulted and the runtime returned to the menu
    Stopped,
}

struct ActiveProgram {
    index: usize,
    code: DisplayCode,
    label: &'static str,
    instance: Box<dyn Program>,
    ticks: u32,
    /// `None` means due at the next opportunity
    wake_at: Option<u32>,
}

/// Cooperative single-program scheduler
pub struct Scheduler {
    registry: ProgramRegistry,
    config: SchedulerConfig,
    menu: SelectionMenu,
    /// Plays before the menu code is shown
    sweep: Option<LedSweep>,
    phase: Phase,
    active: Option<ActiveProgram>,
    bindings: BindingRegistry,
    triggers: TriggerQueue,
    dropped_triggers: u32,
}

impl Scheduler {
    /// Take ownership of the registry and seal it
    pub fn new(mut registry: ProgramRegistry, config: SchedulerConfig) -> Result<Self, ConfigError> {
        if registry.is_empty() {
            return Err(ConfigError::Empty);
        }
        registry.seal();

        Ok(Self {
            menu: SelectionMenu::new(registry.len()),
            registry,
            config,
            sweep: None,
            phase: Phase::Menu,
            active: None,
            bindings: BindingRegistry::new(),
            triggers: TriggerQueue::new(),
            dropped_triggers: 0,
        })
    }

    /// Quiet the outputs and enter the menu
    ///
    /// The selected program's code appears once the LED sweep has played.
    pub fn boot(&mut self, io: &mut dyn PanelDriver) -> Result<(), RuntimeError> {
        self.registry.get(self.menu.index())?;
        io.quiet();
        self.sweep = Some(LedSweep::start(io));
        Ok(())
    }

    /// Consume one input event
    ///
    /// In the menu, events navigate. While running, the exit gesture stops
    /// the program immediately and anything else goes to matching input
    /// bindings.
    pub fn handle_input(
        &mut self,
        event: InputEvent,
        io: &mut dyn PanelDriver,
        diag: &mut dyn Diagnostics,
    ) {
        match self.phase {
            Phase::Menu => self.menu_input(event, io, diag),
            Phase::Running => {
                if event.is_exit_gesture() {
                    self.stop(LifecycleEvent::ExitGesture, io);
                    return;
                }

                let dropped = self.bindings.dispatch_input(event, &mut self.triggers);
                self.dropped_triggers = self.dropped_triggers.saturating_add(dropped);

                // A fired binding cuts the program's sleep short
                if !self.triggers.is_empty() {
                    if let Some(active) = self.active.as_mut() {
                        active.wake_at = None;
                    }
                }
            }
            Phase::Starting | Phase::Stopping => {}
        }
    }

    fn menu_input(&mut self, event: InputEvent, io: &mut dyn PanelDriver, diag: &mut dyn Diagnostics) {
        let action = MenuAction::from_event(&event);
        // Any menu action cuts the sweep short
        if action.is_some() && self.sweep.take().is_some() {
            self.render_menu(io, diag);
        }

        match action {
            Some(MenuAction::Advance) => {
                self.menu.advance();
                self.render_menu(io, diag);
            }
            Some(MenuAction::Knob(position)) => {
                let before = self.menu.index();
                if self.menu.select_by_knob(position) != before {
                    self.render_menu(io, diag);
                }
            }
            Some(MenuAction::Confirm) => self.confirm(io, diag),
            None => {}
        }
    }

    /// Select a program by menu index
    ///
    /// Ignored while a program is active.
    pub fn select(&mut self, index: usize, io: &mut dyn PanelDriver) -> Result<(), OutOfRange> {
        if !self.phase.is_menu() {
            return Ok(());
        }
        self.menu.select(index)?;
        self.sweep = None;
        self.menu.render(&self.registry, io)
    }

    /// Start the selected program
    ///
    /// A failing factory is reported and the runtime stays in the menu.
    pub fn confirm(&mut self, io: &mut dyn PanelDriver, diag: &mut dyn Diagnostics) {
        if !self.phase.is_menu() {
            return;
        }

        let index = self.menu.index();
        let descriptor = match self.registry.get(index) {
            Ok(descriptor) => *descriptor,
            Err(e) => {
                diag.report(e.into());
                return;
            }
        };

        self.phase = self.phase.transition(LifecycleEvent::Confirm);
        self.sweep = None;
        io.quiet();
        self.triggers.clear();
        self.bindings.arm();

        match (descriptor.factory)() {
            Ok(instance) => {
                self.active = Some(ActiveProgram {
                    index,
                    code: descriptor.code,
                    label: descriptor.label,
                    instance,
                    ticks: 0,
                    wake_at: None,
                });
                self.phase = self.phase.transition(LifecycleEvent::Instantiated);
            }
            Err(cause) => {
                diag.report(RuntimeError::InstantiationFailure {
                    code: descriptor.code,
                    cause,
                });
                self.stop(LifecycleEvent::InstantiationFailed, io);
            }
        }
    }

    /// Run the active program once if it is due
    ///
    /// In the menu this only steps the LED sweep.
    pub fn tick(
        &mut self,
        now_ms: u32,
        io: &mut dyn PanelDriver,
        diag: &mut dyn Diagnostics,
    ) -> TickOutcome {
        if self.phase != Phase::Running {
            self.step_sweep(now_ms, io, diag);
            return TickOutcome::Idle;
        }

        let dropped = self.bindings.dispatch_timers(now_ms, &mut self.triggers);
        self.dropped_triggers = self.dropped_triggers.saturating_add(dropped);
        if self.dropped_triggers > 0 {
            diag.report(RuntimeError::InputOverload {
                dropped: core::mem::take(&mut self.dropped_triggers),
            });
        }

        let Some(active) = self.active.as_mut() else {
            return TickOutcome::Idle;
        };

        let due = !self.triggers.is_empty()
            || active.wake_at.map_or(true, |at| time::reached(now_ms, at));
        if !due {
            return TickOutcome::Waiting;
        }

        active.ticks = active.ticks.wrapping_add(1);
        let result = {
            let mut ctx = TickContext::new(
                now_ms,
                active.ticks,
                io,
                &mut self.bindings,
                &mut self.triggers,
            );
            active.instance.run_tick(&mut ctx)
        };

        match result {
            Ok(suspend) => {
                active.wake_at = match suspend {
                    Suspend::Yield => None,
                    Suspend::Sleep { ms } => {
                        Some(now_ms.wrapping_add(ms.min(self.config.max_sleep_ms)))
                    }
                };
                TickOutcome::Ran(suspend)
            }
            Err(cause) => {
                diag.report(RuntimeError::FatalTickError {
                    code: active.code,
                    cause,
                });
                self.stop(LifecycleEvent::TickFault, io);
                TickOutcome::Stopped
            }
        }
    }

    /// Earliest time the scheduler must tick again
    ///
    /// In the menu this is the next sweep frame, `None` once only input
    /// matters.
    pub fn next_wake(&self, now_ms: u32) -> Option<u32> {
        if self.phase != Phase::Running {
            return self.sweep.as_ref().map(|sweep| sweep.deadline(now_ms));
        }
        let active = self.active.as_ref()?;
        if !self.triggers.is_empty() {
            return Some(now_ms);
        }
        time::earliest(
            Some(active.wake_at.unwrap_or(now_ms)),
            self.bindings.next_timer_deadline(now_ms),
            now_ms,
        )
    }

    /// Forward input layer overload to diagnostics
    pub fn report_overload(&mut self, dropped: u32, diag: &mut dyn Diagnostics) {
        if dropped > 0 {
            diag.report(RuntimeError::InputOverload { dropped });
        }
    }

    fn stop(&mut self, event: LifecycleEvent, io: &mut dyn PanelDriver) {
        self.phase = self.phase.transition(event);
        self.teardown(io);
    }

    /// Release everything the program held and return to the menu
    ///
    /// Unconditional: runs whether or not the program installed bindings.
    /// Every way out of a program ends here, so the panel looks the same
    /// after a fault as after the exit gesture.
    fn teardown(&mut self, io: &mut dyn PanelDriver) {
        self.triggers.clear();
        self.bindings.release_all();
        self.active = None;
        io.quiet();
        self.sweep = Some(LedSweep::start(io));
        self.phase = self.phase.transition(LifecycleEvent::TeardownComplete);
    }

    fn step_sweep(&mut self, now_ms: u32, io: &mut dyn PanelDriver, diag: &mut dyn Diagnostics) {
        let Some(sweep) = self.sweep.as_mut() else {
            return;
        };
        if !sweep.advance(now_ms, io) {
            self.sweep = None;
            self.render_menu(io, diag);
        }
    }

    fn render_menu(&self, io: &mut dyn PanelDriver, diag: &mut dyn Diagnostics) {
        if let Err(e) = self.menu.render(&self.registry, io) {
            diag.report(e.into());
        }
    }

    /// Current runtime mode
    pub fn mode(&self) -> RuntimeMode {
        match (&self.active, self.phase) {
            (Some(active), Phase::Running) => RuntimeMode::Running {
                index: active.index,
                code: active.code,
            },
            _ => RuntimeMode::Menu,
        }
    }

    /// Current lifecycle phase
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Check if the menu LED sweep is still playing
    pub fn is_sweeping(&self) -> bool {
        self.sweep.is_some()
    }

    /// Selected menu index
    pub fn selection(&self) -> usize {
        self.menu.index()
    }

    /// Bindings held by the active program
    pub fn bindings(&self) -> &BindingRegistry {
        &self.bindings
    }

    /// The sealed program registry
    pub fn registry(&self) -> &ProgramRegistry {
        &self.registry
    }

    /// Scheduler tuning
    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Label of the active program
    pub fn active_label(&self) -> Option<&'static str> {
        self.active.as_ref().map(|a| a.label)
    }

    /// Number of ticks the active program has run
    pub fn active_ticks(&self) -> Option<u32> {
        self.active.as_ref().map(|a| a.ticks)
    }

    /// Fired bindings not yet taken by the program
    pub fn pending_triggers(&self) -> usize {
        self.triggers.len()
    }
}
