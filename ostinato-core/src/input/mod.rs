//! Input event layer
//!
//! Turns raw sampled button and knob levels into debounced input events.
//! Centralizes the two-button long-press chord so every program inherits
//! the same exit gesture without reimplementing it. Single-button long
//! presses are reported separately and never overlap the chord.

pub mod chord;
pub mod debounce;
pub mod events;
pub mod hold;
pub mod layer;

pub use chord::ChordDetector;
pub use debounce::{Debouncer, KnobTracker};
pub use events::{InputEvent, InputKind, InputSource};
pub use hold::HoldDetector;
pub use layer::{InputLayer, RawSample, EVENT_QUEUE_LEN};
