//! Minimal TOML reader for `jogwheel.toml`
//!
//! This handles only the subset the pendant configuration needs. It does
//! NOT support the full TOML spec.
//!
//! Supported features:
//! - `[section]` headers
//! - `key = value` pairs with unsigned integer values (`_` separators allowed)
//! - Comments (`# ...`), whole-line or trailing
//!
//! Keys that are not listed keep their default value.

use super::types::JogConfig;

/// Parse error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParseError {
    /// Unknown or malformed section header
    InvalidSection,
    /// Key not valid in its section (or outside any section)
    UnknownKey,
    /// Value is not an integer, out of range, or leaves the config unusable
    InvalidValue,
}

/// Current parsing context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Root,
    Input,
    Jog,
    Probe,
    Serial,
}

/// Parse TOML text into a [`JogConfig`]
pub fn parse_config(input: &str) -> Result<JogConfig, ParseError> {
    let mut config = JogConfig::default();
    let mut section = Section::Root;

    for line in input.lines() {
        let line = strip_comment(line).trim();

        if line.is_empty() {
            continue;
        }

        if let Some(header) = line.strip_prefix('[') {
            let name = header
                .strip_suffix(']')
                .ok_or(ParseError::InvalidSection)?;
            section = parse_section_header(name.trim())?;
            continue;
        }

        let (key, value) = line.split_once('=').ok_or(ParseError::InvalidValue)?;
        apply(&mut config, section, key.trim(), value.trim())?;
    }

    if !config.is_valid() {
        return Err(ParseError::InvalidValue);
    }
    Ok(config)
}

fn strip_comment(line: &str) -> &str {
    match line.find('#') {
        Some(pos) => &line[..pos],
        None => line,
    }
}

fn parse_section_header(name: &str) -> Result<Section, ParseError> {
    match name {
        "input" => Ok(Section::Input),
        "jog" => Ok(Section::Jog),
        "probe" => Ok(Section::Probe),
        "serial" => Ok(Section::Serial),
        _ => Err(ParseError::InvalidSection),
    }
}

fn apply(config: &mut JogConfig, section: Section, key: &str, value: &str) -> Result<(), ParseError> {
    match (section, key) {
        (Section::Input, "debounce_ms") => config.debounce_ms = parse_int(value)?,
        (Section::Input, "repeat_ms") => config.repeat_ms = parse_int(value)?,
        (Section::Input, "poll_interval_ms") => config.poll_interval_ms = parse_int(value)?,
        (Section::Input, "speed_sample_ms") => config.speed_sample_ms = parse_int(value)?,
        (Section::Input, "adc_max") => config.adc_max = parse_int(value)?,
        (Section::Input, "steps_per_detent") => config.steps_per_detent = parse_int(value)?,
        (Section::Jog, "step_um") => config.jog_step_um = parse_int(value)?,
        (Section::Jog, "xy_feed") => config.xy_feed = parse_int(value)?,
        (Section::Jog, "z_feed") => config.z_feed = parse_int(value)?,
        (Section::Probe, "feed") => config.probe_feed = parse_int(value)?,
        (Section::Probe, "travel_um") => config.probe_travel_um = parse_int(value)?,
        (Section::Serial, "response_timeout_ms") => {
            config.response_timeout_ms = parse_int(value)?
        }
        (Section::Serial, "motion_timeout_ms") => config.motion_timeout_ms = parse_int(value)?,
        _ => return Err(ParseError::UnknownKey),
    }
    Ok(())
}

/// Parse an unsigned decimal integer and narrow it to the field type
fn parse_int<T: TryFrom<u32>>(value: &str) -> Result<T, ParseError> {
    if value.is_empty() {
        return Err(ParseError::InvalidValue);
    }

    let mut result: u32 = 0;
    for c in value.chars() {
        if c == '_' {
            continue;
        }
        let digit = c.to_digit(10).ok_or(ParseError::InvalidValue)?;
        result = result
            .checked_mul(10)
            .and_then(|r| r.checked_add(digit))
            .ok_or(ParseError::InvalidValue)?;
    }

    T::try_from(result).map_err(|_| ParseError::InvalidValue)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input_gives_defaults() {
        assert_eq!(parse_config(""), Ok(JogConfig::default()));
    }

    #[test]
    fn test_full_file() {
        let text = r#"
# Pendant configuration
[input]
debounce_ms = 25
repeat_ms = 200      # slower autorepeat
poll_interval_ms = 5
speed_sample_ms = 100
adc_max = 4096
steps_per_detent = 2

[jog]
step_um = 5
xy_feed = 1500
z_feed = 400

[probe]
feed = 40
travel_um = 15_000

[serial]
response_timeout_ms = 5000
motion_timeout_ms = 90_000
"#;
        let config = parse_config(text).unwrap();
        assert_eq!(config.debounce_ms, 25);
        assert_eq!(config.repeat_ms, 200);
        assert_eq!(config.poll_interval_ms, 5);
        assert_eq!(config.steps_per_detent, 2);
        assert_eq!(config.jog_step_um, 5);
        assert_eq!(config.xy_feed, 1500);
        assert_eq!(config.z_feed, 400);
        assert_eq!(config.probe_feed, 40);
        assert_eq!(config.probe_travel_um, 15_000);
        assert_eq!(config.response_timeout_ms, 5000);
        assert_eq!(config.motion_timeout_ms, 90_000);
    }

    #[test]
    fn test_unknown_section() {
        assert_eq!(parse_config("[motors]\n"), Err(ParseError::InvalidSection));
        assert_eq!(parse_config("[input\n"), Err(ParseError::InvalidSection));
    }

    #[test]
    fn test_key_in_wrong_section() {
        assert_eq!(
            parse_config("[jog]\ndebounce_ms = 10\n"),
            Err(ParseError::UnknownKey)
        );
        assert_eq!(parse_config("xy_feed = 10\n"), Err(ParseError::UnknownKey));
    }

    #[test]
    fn test_invalid_values() {
        assert_eq!(
            parse_config("[input]\ndebounce_ms = fast\n"),
            Err(ParseError::InvalidValue)
        );
        assert_eq!(
            parse_config("[input]\ndebounce_ms = -5\n"),
            Err(ParseError::InvalidValue)
        );
        // Does not fit in u8
        assert_eq!(
            parse_config("[input]\nsteps_per_detent = 300\n"),
            Err(ParseError::InvalidValue)
        );
        assert_eq!(parse_config("[input]\nrepeat_ms\n"), Err(ParseError::InvalidValue));
    }

    #[test]
    fn test_zero_period_rejected() {
        assert_eq!(
            parse_config("[input]\npoll_interval_ms = 0\n"),
            Err(ParseError::InvalidValue)
        );
    }
}
