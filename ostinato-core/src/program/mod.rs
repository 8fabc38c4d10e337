//! Program authoring contract
//!
//! A program is a pluggable control algorithm. The scheduler calls
//! [`Program::run_tick`] repeatedly; each call performs one bounded unit of
//! work and returns how long the program wants to be suspended. A program
//! never blocks inside a tick, and holds hardware callbacks only through
//! the binding registry reachable from its [`TickContext`].

mod context;

pub use context::TickContext;

use alloc::boxed::Box;

use crate::bindings::BindingError;

/// How the program wants to be suspended after a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Suspend {
    /// Tick again as soon as the scheduler loops
    Yield,
    /// Tick again after `ms`, or earlier if a timer binding falls due
    Sleep { ms: u32 },
}

/// Program-level faults
///
/// Returned from a factory they revert the runtime to the menu; returned
/// from a tick they stop the program. Neither aborts the runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ProgramError {
    /// An algorithm was given parameters outside its domain
    InvalidParameters,
    /// Installing a binding failed
    Binding(BindingError),
    /// Program-specific unrecoverable fault
    Fault(&'static str),
}

impl From<BindingError> for ProgramError {
    fn from(e: BindingError) -> Self {
        ProgramError::Binding(e)
    }
}

/// A runnable program instance
pub trait Program {
    /// Perform one bounded unit of work
    fn run_tick(&mut self, ctx: &mut TickContext<'_>) -> Result<Suspend, ProgramError>;
}

/// Builds a fresh program instance each time the program is started
pub type ProgramFactory = fn() -> Result<Box<dyn Program>, ProgramError>;
