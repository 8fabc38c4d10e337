//! Cooperative scheduler / lifecycle manager
//!
//! Runs the selection menu while no program is active, starts the
//! confirmed program, ticks it, watches for the exit gesture between
//! ticks and tears everything down on the way back to the menu.

pub mod phase;
pub mod runtime;

pub use phase::{LifecycleEvent, Phase};
pub use runtime::{RuntimeMode, Scheduler, TickOutcome};
