//! Input events produced by the input layer

/// Physical origin of an input event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InputSource {
    /// Left push button
    ButtonA,
    /// Right push button
    ButtonB,
    /// Left knob
    Knob1,
    /// Right knob
    Knob2,
    /// Both buttons held together (the exit chord)
    BothButtons,
}

/// What happened at the source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InputKind {
    /// Debounced press edge
    Pressed,
    /// Debounced release edge (a short press, unless part of a chord or
    /// ending a long press)
    Released,
    /// Button or chord held past the long-press threshold
    LongPress,
    /// Knob settled at a new position
    Moved { position: u16 },
}

impl InputKind {
    /// Check if `other` satisfies a binding on this kind
    ///
    /// `Moved` bindings match any position.
    pub fn matches(&self, other: &InputKind) -> bool {
        match (self, other) {
            (InputKind::Moved { .. }, InputKind::Moved { .. }) => true,
            _ => self == other,
        }
    }
}

/// A single debounced input event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InputEvent {
    pub source: InputSource,
    pub kind: InputKind,
    /// Sample time the event was detected at (ms since boot)
    pub timestamp_ms: u32,
}

impl InputEvent {
    /// Create an event
    pub const fn new(source: InputSource, kind: InputKind, timestamp_ms: u32) -> Self {
        Self {
            source,
            kind,
            timestamp_ms,
        }
    }

    /// The universal "return to menu" gesture
    pub const fn exit_gesture(timestamp_ms: u32) -> Self {
        Self::new(InputSource::BothButtons, InputKind::LongPress, timestamp_ms)
    }

    /// Check if this is the exit gesture
    pub fn is_exit_gesture(&self) -> bool {
        self.source == InputSource::BothButtons && self.kind == InputKind::LongPress
    }

    /// Check if this is a short press (release) of the given button
    pub fn is_click(&self, source: InputSource) -> bool {
        self.source == source && self.kind == InputKind::Released
    }

    /// Check if this is a long press of a single button
    pub fn is_long_press(&self, source: InputSource) -> bool {
        self.source == source && self.kind == InputKind::LongPress
    }

    /// Knob position if this is a knob move
    pub fn knob_position(&self) -> Option<u16> {
        match self.kind {
            InputKind::Moved { position } => Some(position),
            _ => None,
        }
    }
}
