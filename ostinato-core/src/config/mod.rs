//! Runtime configuration
//!
//! Tuning constants for the input layer and the scheduler, with defaults
//! chosen for a 2ms poll period, plus a minimal text parser for the
//! firmware's embedded `module.toml`.

pub mod parse;
pub mod types;

pub use parse::{parse_config, ParseError};
pub use types::*;
