//! defmt-backed diagnostics sink

use defmt::*;

use ostinato_core::traits::Diagnostics;
use ostinato_core::RuntimeError;

/// Forwards runtime faults to the defmt log
#[derive(Debug, Default, Clone, Copy)]
pub struct DefmtDiagnostics;

impl Diagnostics for DefmtDiagnostics {
    fn report(&mut self, error: RuntimeError) {
        match error {
            RuntimeError::InstantiationFailure { code, cause } => {
                error!("Program {} failed to start: {:?}", code.bits(), cause);
            }
            RuntimeError::FatalTickError { code, cause } => {
                error!("Program {} stopped: {:?}", code.bits(), cause);
            }
            RuntimeError::InputOverload { dropped } => {
                warn!("Input overload: {} samples/events dropped", dropped);
            }
            RuntimeError::Configuration(e) => error!("Configuration error: {:?}", e),
            RuntimeError::OutOfRange(e) => error!("Index {} out of range ({})", e.index, e.len),
        }
    }
}
