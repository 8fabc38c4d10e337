//! Runtime error taxonomy
//!
//! Only configuration and index-misuse errors may abort the runtime. Every
//! program-level fault is contained and degrades to "return to menu".

use crate::program::ProgramError;
use crate::registry::{ConfigError, DisplayCode, OutOfRange};

/// Errors surfaced by the runtime
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RuntimeError {
    /// Bad program registration (fatal at startup)
    Configuration(ConfigError),
    /// Menu or registry index misuse (programming error)
    OutOfRange(OutOfRange),
    /// A program factory failed; the runtime stayed in the menu
    InstantiationFailure {
        /// Display code of the program that failed
        code: DisplayCode,
        /// Error returned by the factory
        cause: ProgramError,
    },
    /// A running program faulted mid-tick; the runtime returned to the menu
    FatalTickError {
        /// Display code of the program that faulted
        code: DisplayCode,
        /// Error returned by the tick
        cause: ProgramError,
    },
    /// The input layer dropped samples or events under load
    InputOverload {
        /// Number of samples/events lost since the last report
        dropped: u32,
    },
}

impl RuntimeError {
    /// Check if this error may abort the whole runtime
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            RuntimeError::Configuration(_) | RuntimeError::OutOfRange(_)
        )
    }

    /// Check if this error came from a contained program fault
    pub fn is_program_fault(&self) -> bool {
        matches!(
            self,
            RuntimeError::InstantiationFailure { .. } | RuntimeError::FatalTickError { .. }
        )
    }
}

impl From<ConfigError> for RuntimeError {
    fn from(e: ConfigError) -> Self {
        RuntimeError::Configuration(e)
    }
}

impl From<OutOfRange> for RuntimeError {
    fn from(e: OutOfRange) -> Self {
        RuntimeError::OutOfRange(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatal_classification() {
        assert!(RuntimeError::from(ConfigError::Empty).is_fatal());
        assert!(RuntimeError::from(OutOfRange { index: 4, len: 3 }).is_fatal());
        assert!(!RuntimeError::InputOverload { dropped: 3 }.is_fatal());

        let fault = RuntimeError::FatalTickError {
            code: DisplayCode::ZERO,
            cause: ProgramError::Fault("boom"),
        };
        assert!(!fault.is_fatal());
        assert!(fault.is_program_fault());
    }
}
