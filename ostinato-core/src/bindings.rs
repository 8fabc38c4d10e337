//! Hardware binding registry
//!
//! Sole owner of the input callbacks and timers installed on behalf of the
//! running program. The scheduler arms the registry when a program starts
//! and releases everything when it stops, so no binding can outlive the
//! program that installed it.

use heapless::{Deque, Vec};

use crate::input::{InputEvent, InputKind, InputSource};
use crate::time;

/// Maximum bindings a program may hold at once
pub const MAX_BINDINGS: usize = 8;

/// Maximum fired bindings waiting for the next tick
pub const MAX_PENDING_TRIGGERS: usize = 16;

/// Opaque binding identifier, unique for the whole session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BindingHandle(u16);

/// What a binding is attached to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BindingKind {
    /// Fires when an input event with this source and kind arrives
    Interrupt {
        source: InputSource,
        kind: InputKind,
    },
    /// Fires every `period_ms`, measured from the bind time
    Timer { period_ms: u32 },
}

/// An installed binding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Binding {
    pub kind: BindingKind,
    pub handle: BindingHandle,
}

/// A fired binding, delivered to the program on its next tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Trigger {
    /// An input binding matched an event
    Input {
        handle: BindingHandle,
        event: InputEvent,
    },
    /// A timer binding elapsed
    Timer { handle: BindingHandle },
}

impl Trigger {
    /// Handle of the binding that fired
    pub fn handle(&self) -> BindingHandle {
        match self {
            Trigger::Input { handle, .. } | Trigger::Timer { handle } => *handle,
        }
    }
}

/// Queue of fired bindings
pub type TriggerQueue = Deque<Trigger, MAX_PENDING_TRIGGERS>;

/// Binding registry errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BindingError {
    /// No free binding slot
    Full,
    /// No program is running
    NotArmed,
    /// Timer period must be non-zero
    ZeroPeriod,
}

#[derive(Debug, Clone, Copy)]
struct Slot {
    binding: Binding,
    /// Next fire time for timers, unused for interrupts
    due_ms: u32,
}

/// Registry of bindings held by the running program
#[derive(Debug)]
pub struct BindingRegistry {
    slots: Vec<Slot, MAX_BINDINGS>,
    next_id: u16,
    armed: bool,
}

impl Default for BindingRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl BindingRegistry {
    /// Create an empty, disarmed registry
    pub const fn new() -> Self {
        Self {
            slots: Vec::new(),
            next_id: 0,
            armed: false,
        }
    }

    /// Allow bindings to be installed
    pub(crate) fn arm(&mut self) {
        self.armed = true;
    }

    /// Release every binding and disarm
    ///
    /// Idempotent and infallible. Returns the number of bindings released.
    pub(crate) fn release_all(&mut self) -> usize {
        let released = self.slots.len();
        self.slots.clear();
        self.armed = false;
        released
    }

    /// Check if bindings may currently be installed
    pub fn is_armed(&self) -> bool {
        self.armed
    }

    /// Number of installed bindings
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Check if no bindings are installed
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Iterate installed bindings
    pub fn iter(&self) -> impl Iterator<Item = &Binding> {
        self.slots.iter().map(|s| &s.binding)
    }

    /// Install an input binding
    pub fn bind_input(
        &mut self,
        source: InputSource,
        kind: InputKind,
    ) -> Result<BindingHandle, BindingError> {
        self.insert(BindingKind::Interrupt { source, kind }, 0)
    }

    /// Install a periodic timer binding
    pub fn bind_timer(&mut self, period_ms: u32, now_ms: u32) -> Result<BindingHandle, BindingError> {
        if period_ms == 0 {
            return Err(BindingError::ZeroPeriod);
        }
        self.insert(
            BindingKind::Timer { period_ms },
            now_ms.wrapping_add(period_ms),
        )
    }

    fn insert(&mut self, kind: BindingKind, due_ms: u32) -> Result<BindingHandle, BindingError> {
        if !self.armed {
            return Err(BindingError::NotArmed);
        }
        if self.slots.is_full() {
            return Err(BindingError::Full);
        }
        let handle = BindingHandle(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        let _ = self.slots.push(Slot {
            binding: Binding { kind, handle },
            due_ms,
        });
        Ok(handle)
    }

    /// Remove one binding
    ///
    /// Returns `false` if the handle was not installed (already released).
    pub fn unbind(&mut self, handle: BindingHandle) -> bool {
        match self.slots.iter().position(|s| s.binding.handle == handle) {
            Some(pos) => {
                self.slots.remove(pos);
                true
            }
            None => false,
        }
    }

    /// Queue a trigger for every input binding matching `event`
    ///
    /// Returns the number of triggers dropped because the queue was full.
    pub fn dispatch_input(&self, event: InputEvent, queue: &mut TriggerQueue) -> u32 {
        let mut dropped = 0;
        for slot in &self.slots {
            if let BindingKind::Interrupt { source, kind } = slot.binding.kind {
                if source == event.source && kind.matches(&event.kind) {
                    let trigger = Trigger::Input {
                        handle: slot.binding.handle,
                        event,
                    };
                    if queue.push_back(trigger).is_err() {
                        dropped += 1;
                    }
                }
            }
        }
        dropped
    }

    /// Queue a trigger for every timer that has fallen due
    ///
    /// A timer that fell behind by several periods fires once and is
    /// rescheduled from `now`. Returns the number of triggers dropped.
    pub fn dispatch_timers(&mut self, now_ms: u32, queue: &mut TriggerQueue) -> u32 {
        let mut dropped = 0;
        for slot in self.slots.iter_mut() {
            if let BindingKind::Timer { period_ms } = slot.binding.kind {
                if time::reached(now_ms, slot.due_ms) {
                    let next = slot.due_ms.wrapping_add(period_ms);
                    slot.due_ms = if time::reached(now_ms, next) {
                        now_ms.wrapping_add(period_ms)
                    } else {
                        next
                    };
                    let trigger = Trigger::Timer {
                        handle: slot.binding.handle,
                    };
                    if queue.push_back(trigger).is_err() {
                        dropped += 1;
                    }
                }
            }
        }
        dropped
    }

    /// Earliest pending timer deadline
    pub fn next_timer_deadline(&self, now_ms: u32) -> Option<u32> {
        self.slots
            .iter()
            .filter(|s| matches!(s.binding.kind, BindingKind::Timer { .. }))
            .map(|s| s.due_ms)
            .fold(None, |acc, due| time::earliest(acc, Some(due), now_ms))
    }
}
