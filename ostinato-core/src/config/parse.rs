//! Minimal TOML-subset parser for runtime configuration
//!
//! Handles only what `module.toml` needs:
//! - `[input]` and `[scheduler]` section headers
//! - `key = integer` pairs
//! - Comments (`# ...`, full line or trailing) and blank lines
//!
//! Keys that are absent keep their defaults.

use super::types::{RuntimeConfig, ValidationError};

/// Parse error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParseError {
    /// Unknown or malformed section header (1-based line number)
    InvalidSection { line: usize },
    /// Key not valid in the current section
    UnknownKey { line: usize },
    /// Line is not `key = value`
    Syntax { line: usize },
    /// Value is not an integer in range
    InvalidValue { line: usize },
    /// Values parsed but violate a range rule
    Invalid(ValidationError),
}

impl From<ValidationError> for ParseError {
    fn from(e: ValidationError) -> Self {
        ParseError::Invalid(e)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Root,
    Input,
    Scheduler,
}

/// Parse configuration text into a validated `RuntimeConfig`
pub fn parse_config(input: &str) -> Result<RuntimeConfig, ParseError> {
    let mut config = RuntimeConfig::default();
    let mut section = Section::Root;

    for (index, line) in input.lines().enumerate() {
        let line_no = index + 1;
        let line = strip_comment(line).trim();

        if line.is_empty() {
            continue;
        }

        if line.starts_with('[') && line.ends_with(']') {
            section = match line[1..line.len() - 1].trim() {
                "input" => Section::Input,
                "scheduler" => Section::Scheduler,
                _ => return Err(ParseError::InvalidSection { line: line_no }),
            };
            continue;
        }

        let (key, value) = parse_key_value(line).ok_or(ParseError::Syntax { line: line_no })?;
        apply_value(&mut config, section, key, value, line_no)?;
    }

    config.validate()?;
    Ok(config)
}

fn apply_value(
    config: &mut RuntimeConfig,
    section: Section,
    key: &str,
    value: &str,
    line: usize,
) -> Result<(), ParseError> {
    match (section, key) {
        (Section::Input, "poll_period_ms") => config.input.poll_period_ms = parse_int(value, line)?,
        (Section::Input, "debounce_samples") => {
            config.input.debounce_samples = parse_int(value, line)?
        }
        (Section::Input, "long_press_ms") => config.input.long_press_ms = parse_int(value, line)?,
        (Section::Input, "knob_hysteresis") => {
            config.input.knob_hysteresis = parse_int(value, line)?
        }
        (Section::Input, "stale_factor") => config.input.stale_factor = parse_int(value, line)?,
        (Section::Scheduler, "tick_budget_ms") => {
            config.scheduler.tick_budget_ms = parse_int(value, line)?
        }
        (Section::Scheduler, "max_sleep_ms") => {
            config.scheduler.max_sleep_ms = parse_int(value, line)?
        }
        _ => return Err(ParseError::UnknownKey { line }),
    }
    Ok(())
}

/// Drop a trailing `# comment`
fn strip_comment(line: &str) -> &str {
    match line.find('#') {
        Some(pos) => &line[..pos],
        None => line,
    }
}

/// Split `key = value`
fn parse_key_value(line: &str) -> Option<(&str, &str)> {
    let eq_pos = line.find('=')?;
    let key = line[..eq_pos].trim();
    let value = line[eq_pos + 1..].trim();

    if key.is_empty() || value.is_empty() {
        return None;
    }

    Some((key, value))
}

/// Parse an integer, allowing `_` digit separators
fn parse_int<T: core::str::FromStr>(value: &str, line: usize) -> Result<T, ParseError> {
    let mut digits = heapless::String::<16>::new();
    for c in value.chars().filter(|&c| c != '_') {
        digits
            .push(c)
            .map_err(|_| ParseError::InvalidValue { line })?;
    }
    digits
        .parse()
        .map_err(|_| ParseError::InvalidValue { line })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_is_default() {
        assert_eq!(parse_config(""), Ok(RuntimeConfig::default()));
        assert_eq!(
            parse_config("# nothing here\n\n"),
            Ok(RuntimeConfig::default())
        );
    }

    #[test]
    fn test_full_config() {
        let text = "\
# Panel tuning
[input]
poll_period_ms = 1
debounce_samples = 8   # noisy buttons
long_press_ms = 1_500
knob_hysteresis = 512
stale_factor = 10

[scheduler]
tick_budget_ms = 3
max_sleep_ms = 250
";
        let config = parse_config(text).unwrap();
        assert_eq!(config.input.poll_period_ms, 1);
        assert_eq!(config.input.debounce_samples, 8);
        assert_eq!(config.input.long_press_ms, 1500);
        assert_eq!(config.input.knob_hysteresis, 512);
        assert_eq!(config.input.stale_factor, 10);
        assert_eq!(config.scheduler.tick_budget_ms, 3);
        assert_eq!(config.scheduler.max_sleep_ms, 250);
    }

    #[test]
    fn test_missing_keys_keep_defaults() {
        let config = parse_config("[input]\nlong_press_ms = 800\n").unwrap();
        assert_eq!(config.input.long_press_ms, 800);
        assert_eq!(config.input.debounce_samples, 5);
        assert_eq!(config.scheduler, Default::default());
    }

    #[test]
    fn test_unknown_section() {
        assert_eq!(
            parse_config("[input]\n[display]\n"),
            Err(ParseError::InvalidSection { line: 2 })
        );
    }

    #[test]
    fn test_unknown_key() {
        assert_eq!(
            parse_config("[scheduler]\npoll_period_ms = 2\n"),
            Err(ParseError::UnknownKey { line: 2 })
        );
        // Keys outside any section
        assert_eq!(
            parse_config("tick_budget_ms = 2\n"),
            Err(ParseError::UnknownKey { line: 1 })
        );
    }

    #[test]
    fn test_bad_values() {
        assert_eq!(
            parse_config("[input]\ndebounce_samples = 300\n"),
            Err(ParseError::InvalidValue { line: 2 })
        );
        assert_eq!(
            parse_config("[input]\npoll_period_ms = fast\n"),
            Err(ParseError::InvalidValue { line: 2 })
        );
        assert_eq!(
            parse_config("[input]\npoll_period_ms\n"),
            Err(ParseError::Syntax { line: 2 })
        );
    }

    #[test]
    fn test_validation_applied() {
        assert_eq!(
            parse_config("[input]\ndebounce_samples = 0\n"),
            Err(ParseError::Invalid(ValidationError::ZeroDebounce))
        );
        assert_eq!(
            parse_config("[input]\npoll_period_ms = 2\nstale_factor = 0\n"),
            Err(ParseError::Invalid(ValidationError::ZeroStaleFactor))
        );
    }
}
