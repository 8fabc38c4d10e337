//! Board-agnostic script lifecycle runtime for the Eurorack module
//!
//! This crate contains all runtime logic that does not depend on
//! specific hardware implementations:
//!
//! - Input event layer (debounce, knob tracking, two-button exit chord)
//! - Hardware binding registry scoped to the running program
//! - Program registry and the selection menu
//! - Cooperative scheduler / lifecycle state machine
//! - Collaborator traits (hardware panel, diagnostics)
//! - Runtime configuration and error taxonomy
//!
//! Exactly one program runs at a time. The scheduler owns the suspension
//! point between ticks, so the exit gesture is honoured within one tick no
//! matter what the active program does.

#![no_std]
#![deny(unsafe_code)]

extern crate alloc;

pub mod bindings;
pub mod config;
pub mod error;
pub mod input;
pub mod menu;
pub mod program;
pub mod registry;
pub mod scheduler;
pub mod time;
pub mod traits;

pub use error::RuntimeError;
