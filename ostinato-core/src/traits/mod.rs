//! Collaborator traits
//!
//! These traits define the interface between the runtime and the
//! board-specific implementations that drive the real peripherals.

pub mod diagnostics;
pub mod panel;

pub use diagnostics::{Diagnostics, NullDiagnostics};
pub use panel::{CvChannel, GateChannel, Knob, KnobValue, PanelDriver, CV_CHANNELS, GATE_CHANNELS};
