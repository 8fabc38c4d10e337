//! Program registry
//!
//! Ordered, immutable list of the programs the menu can start. Programs are
//! registered once at startup; the scheduler seals the registry when it
//! takes ownership, after which registration is a programming error.

use core::fmt;

use heapless::Vec;

use crate::program::ProgramFactory;

/// Maximum number of programs (one per 4-bit indicator pattern)
pub const MAX_PROGRAMS: usize = 16;

/// 4-bit pattern shown on the indicator LEDs to identify a program
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DisplayCode(u8);

impl DisplayCode {
    /// All LEDs off
    pub const ZERO: Self = Self(0);

    /// Create a display code, `None` if the pattern does not fit in 4 bits
    pub const fn new(bits: u8) -> Option<Self> {
        if bits <= 0x0F {
            Some(Self(bits))
        } else {
            None
        }
    }

    /// Raw 4-bit pattern
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// State of one indicator LED, LED 0 being the most significant bit
    ///
    /// Matches the binary reading order of the four gate LEDs.
    pub const fn led(self, index: usize) -> bool {
        index < 4 && (self.0 >> (3 - index)) & 1 == 1
    }
}

/// Registration errors (fatal at startup)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Another program already uses this display code
    DuplicateCode(DisplayCode),
    /// Registry capacity exceeded
    Full,
    /// Registration attempted after the scheduler started
    Sealed,
    /// No programs registered
    Empty,
}

/// Index outside the registered range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct OutOfRange {
    /// Requested index
    pub index: usize,
    /// Number of registered programs
    pub len: usize,
}

/// Static description of a runnable program
#[derive(Clone, Copy)]
pub struct ProgramDescriptor {
    /// Indicator pattern shown while this program is selected
    pub code: DisplayCode,
    /// Human-readable name (for logs)
    pub label: &'static str,
    /// Builds a fresh instance each time the program is started
    pub factory: ProgramFactory,
}

impl ProgramDescriptor {
    /// Create a descriptor
    pub const fn new(code: DisplayCode, label: &'static str, factory: ProgramFactory) -> Self {
        Self {
            code,
            label,
            factory,
        }
    }
}

impl fmt::Debug for ProgramDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProgramDescriptor")
            .field("code", &self.code)
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}

/// Ordered program registry
///
/// Registration order defines the menu cycling order.
#[derive(Debug, Default)]
pub struct ProgramRegistry {
    programs: Vec<ProgramDescriptor, MAX_PROGRAMS>,
    sealed: bool,
}

impl ProgramRegistry {
    /// Create an empty registry
    pub const fn new() -> Self {
        Self {
            programs: Vec::new(),
            sealed: false,
        }
    }

    /// Register a program at the end of the menu order
    pub fn register(&mut self, descriptor: ProgramDescriptor) -> Result<(), ConfigError> {
        if self.sealed {
            return Err(ConfigError::Sealed);
        }
        if self.programs.iter().any(|p| p.code == descriptor.code) {
            return Err(ConfigError::DuplicateCode(descriptor.code));
        }
        self.programs
            .push(descriptor)
            .map_err(|_| ConfigError::Full)
    }

    /// Get a program by menu index
    pub fn get(&self, index: usize) -> Result<&ProgramDescriptor, OutOfRange> {
        self.programs.get(index).ok_or(OutOfRange {
            index,
            len: self.programs.len(),
        })
    }

    /// Number of registered programs
    pub fn len(&self) -> usize {
        self.programs.len()
    }

    /// Check if no programs are registered
    pub fn is_empty(&self) -> bool {
        self.programs.is_empty()
    }

    /// Iterate programs in menu order
    pub fn iter(&self) -> impl Iterator<Item = &ProgramDescriptor> {
        self.programs.iter()
    }

    /// Forbid further registration
    pub(crate) fn seal(&mut self) {
        self.sealed = true;
    }

    /// Check if registration has been closed
    pub fn is_sealed(&self) -> bool {
        self.sealed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::program::{Program, ProgramError, Suspend, TickContext};
    use alloc::boxed::Box;

    struct Idle;

    impl Program for Idle {
        fn run_tick(&mut self, _ctx: &mut TickContext<'_>) -> Result<Suspend, ProgramError> {
            Ok(Suspend::Yield)
        }
    }

    fn build() -> Result<Box<dyn Program>, ProgramError> {
        Ok(Box::new(Idle))
    }

    fn descriptor(bits: u8, label: &'static str) -> ProgramDescriptor {
        ProgramDescriptor::new(DisplayCode::new(bits).unwrap(), label, build)
    }

    #[test]
    fn test_display_code_range() {
        assert!(DisplayCode::new(15).is_some());
        assert!(DisplayCode::new(16).is_none());
        assert_eq!(DisplayCode::new(0b1010).unwrap().bits(), 10);
    }

    #[test]
    fn test_display_code_leds() {
        let code = DisplayCode::new(0b0110).unwrap();
        assert!(!code.led(0));
        assert!(code.led(1));
        assert!(code.led(2));
        assert!(!code.led(3));
        assert!(!code.led(4));
    }

    #[test]
    fn test_registration_order() {
        let mut registry = ProgramRegistry::new();
        registry.register(descriptor(1, "A")).unwrap();
        registry.register(descriptor(2, "B")).unwrap();
        registry.register(descriptor(3, "C")).unwrap();

        assert_eq!(registry.get(0).unwrap().label, "A");
        assert_eq!(registry.get(1).unwrap().label, "B");
        assert_eq!(registry.get(2).unwrap().label, "C");
        assert_eq!(registry.get(3).unwrap_err(), OutOfRange { index: 3, len: 3 });
    }

    #[test]
    fn test_duplicate_code() {
        let mut registry = ProgramRegistry::new();
        registry.register(descriptor(4, "A")).unwrap();
        let err = registry.register(descriptor(4, "B")).unwrap_err();
        assert_eq!(err, ConfigError::DuplicateCode(DisplayCode::new(4).unwrap()));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_full() {
        let mut registry = ProgramRegistry::new();
        for bits in 0..16 {
            registry.register(descriptor(bits, "P")).unwrap();
        }
        // Every 4-bit code is taken, so any further code is a duplicate
        assert!(matches!(
            registry.register(descriptor(0, "X")),
            Err(ConfigError::DuplicateCode(_))
        ));
        assert_eq!(registry.len(), MAX_PROGRAMS);
    }

    #[test]
    fn test_sealed() {
        let mut registry = ProgramRegistry::new();
        registry.register(descriptor(0, "A")).unwrap();
        registry.seal();
        assert!(registry.is_sealed());
        assert_eq!(registry.register(descriptor(1, "B")), Err(ConfigError::Sealed));
    }
}
