//! Per-tick context handed to the running program

use crate::bindings::{BindingError, BindingHandle, BindingRegistry, Trigger, TriggerQueue};
use crate::input::{InputKind, InputSource};
use crate::traits::PanelDriver;

/// Everything a program may touch during one tick
pub struct TickContext<'a> {
    now_ms: u32,
    tick: u32,
    io: &'a mut dyn PanelDriver,
    bindings: &'a mut BindingRegistry,
    triggers: &'a mut TriggerQueue,
}

impl<'a> TickContext<'a> {
    pub(crate) fn new(
        now_ms: u32,
        tick: u32,
        io: &'a mut dyn PanelDriver,
        bindings: &'a mut BindingRegistry,
        triggers: &'a mut TriggerQueue,
    ) -> Self {
        Self {
            now_ms,
            tick,
            io,
            bindings,
            triggers,
        }
    }

    /// Current time (ms since boot, wrapping)
    pub fn now_ms(&self) -> u32 {
        self.now_ms
    }

    /// 1-based count of this program's ticks
    pub fn tick(&self) -> u32 {
        self.tick
    }

    /// Check if this is the program's first tick
    pub fn is_first_tick(&self) -> bool {
        self.tick == 1
    }

    /// Hardware panel
    pub fn io(&mut self) -> &mut dyn PanelDriver {
        &mut *self.io
    }

    /// Deliver matching input events to this program
    pub fn bind_input(
        &mut self,
        source: InputSource,
        kind: InputKind,
    ) -> Result<BindingHandle, BindingError> {
        self.bindings.bind_input(source, kind)
    }

    /// Fire every `period_ms`, starting one period from now
    pub fn bind_timer(&mut self, period_ms: u32) -> Result<BindingHandle, BindingError> {
        self.bindings.bind_timer(period_ms, self.now_ms)
    }

    /// Remove a binding installed earlier
    pub fn unbind(&mut self, handle: BindingHandle) -> bool {
        self.bindings.unbind(handle)
    }

    /// Take the oldest fired binding
    pub fn next_trigger(&mut self) -> Option<Trigger> {
        self.triggers.pop_front()
    }

    /// Number of fired bindings waiting
    pub fn pending_triggers(&self) -> usize {
        self.triggers.len()
    }
}
