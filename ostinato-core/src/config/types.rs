//! Configuration type definitions
//!
//! These types hold the runtime tuning constants. With the `serde` feature
//! they deserialize from the same `module.toml` the firmware embeds, which
//! lets the firmware build script validate the file at compile time.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Input layer tuning
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default, deny_unknown_fields))]
pub struct InputConfig {
    /// Sampling period of buttons and knobs (ms)
    pub poll_period_ms: u32,
    /// Consecutive samples a change must persist before it is reported
    pub debounce_samples: u8,
    /// Hold time of the two-button exit chord and of a single-button long press (ms)
    pub long_press_ms: u32,
    /// Knob movement below this (16-bit scale) is treated as noise
    pub knob_hysteresis: u16,
    /// A sampling gap longer than this many poll periods counts as overload
    pub stale_factor: u32,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            poll_period_ms: 2,
            debounce_samples: 5,
            long_press_ms: 1000,
            knob_hysteresis: 1024,
            stale_factor: 4,
        }
    }
}

/// Scheduler tuning
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default, deny_unknown_fields))]
pub struct SchedulerConfig {
    /// Ticks running longer than this are logged as overruns (ms)
    pub tick_budget_ms: u32,
    /// Upper clamp for a program's requested sleep (ms)
    pub max_sleep_ms: u32,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            tick_budget_ms: 5,
            max_sleep_ms: 1000,
        }
    }
}

/// Complete runtime configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default, deny_unknown_fields))]
pub struct RuntimeConfig {
    pub input: InputConfig,
    pub scheduler: SchedulerConfig,
}

/// Semantic validation failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ValidationError {
    /// `poll_period_ms` must be at least 1
    ZeroPollPeriod,
    /// `debounce_samples` must be at least 1
    ZeroDebounce,
    /// `long_press_ms` must be at least one poll period
    LongPressTooShort,
    /// `stale_factor` must be at least 1
    ZeroStaleFactor,
    /// `max_sleep_ms` must be at least 1
    ZeroMaxSleep,
}

impl RuntimeConfig {
    /// Check value ranges
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.input.poll_period_ms == 0 {
            return Err(ValidationError::ZeroPollPeriod);
        }
        if self.input.debounce_samples == 0 {
            return Err(ValidationError::ZeroDebounce);
        }
        if self.input.long_press_ms < self.input.poll_period_ms {
            return Err(ValidationError::LongPressTooShort);
        }
        if self.input.stale_factor == 0 {
            return Err(ValidationError::ZeroStaleFactor);
        }
        if self.scheduler.max_sleep_ms == 0 {
            return Err(ValidationError::ZeroMaxSleep);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert_eq!(RuntimeConfig::default().validate(), Ok(()));
    }

    #[test]
    fn test_validation() {
        let mut config = RuntimeConfig::default();
        config.input.debounce_samples = 0;
        assert_eq!(config.validate(), Err(ValidationError::ZeroDebounce));

        let mut config = RuntimeConfig::default();
        config.input.long_press_ms = 1;
        assert_eq!(config.validate(), Err(ValidationError::LongPressTooShort));

        let mut config = RuntimeConfig::default();
        config.input.stale_factor = 0;
        assert_eq!(config.validate(), Err(ValidationError::ZeroStaleFactor));

        let mut config = RuntimeConfig::default();
        config.scheduler.max_sleep_ms = 0;
        assert_eq!(config.validate(), Err(ValidationError::ZeroMaxSleep));
    }
}
