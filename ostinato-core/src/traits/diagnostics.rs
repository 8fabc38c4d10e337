//! Diagnostics collaborator

use crate::error::RuntimeError;

/// Sink for contained runtime faults
///
/// `report` is fire-and-forget: implementations must not block and must
/// not fail. The firmware forwards reports to the defmt log.
pub trait Diagnostics {
    /// Record a fault
    fn report(&mut self, error: RuntimeError);
}

/// Diagnostics sink that discards everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NullDiagnostics;

impl Diagnostics for NullDiagnostics {
    fn report(&mut self, _error: RuntimeError) {}
}
