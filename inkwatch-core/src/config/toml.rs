//! Simple TOML parser for watch configuration
//!
//! This is a minimal TOML parser that handles only the subset needed for
//! the watch configuration. It does NOT support the full TOML spec.
//!
//! Supported features:
//! - Key = value pairs (string, integer)
//! - [section] and [section.subsection] headers
//! - Comments (# ...)
//!
//! Unknown keys and sections are ignored so newer files still load.

use super::types::{VibrationPattern, WatchConfig};

/// Parse error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParseError {
    /// Invalid section header
    InvalidSection,
    /// Line is neither a header nor `key = value`
    InvalidLine,
    /// Invalid value type or out of range
    InvalidValue,
    /// String longer than its fixed capacity
    TooLong,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Root,
    Device,
    Battery,
    Input,
    Power,
    Time,
    Vibration(Alert),
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Alert {
    Notification,
    Call,
    Find,
}

/// Parse TOML configuration into a [`WatchConfig`], starting from defaults
pub fn parse_config(input: &str) -> Result<WatchConfig, ParseError> {
    let mut config = WatchConfig::default();
    let mut section = Section::Root;

    for line in input.lines() {
        let line = line.trim();

        // Skip empty lines and comments
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if line.starts_with('[') {
            if !line.ends_with(']') {
                return Err(ParseError::InvalidSection);
            }
            section = parse_section_header(&line[1..line.len() - 1])?;
            continue;
        }

        let (key, value) = parse_key_value(line).ok_or(ParseError::InvalidLine)?;
        apply_value(&mut config, section, key, value)?;
    }

    Ok(config)
}

fn parse_section_header(header: &str) -> Result<Section, ParseError> {
    let header = header.trim();
    if header.is_empty() {
        return Err(ParseError::InvalidSection);
    }

    Ok(match header {
        "device" => Section::Device,
        "battery" => Section::Battery,
        "input" => Section::Input,
        "power" => Section::Power,
        "time" => Section::Time,
        "vibration.notification" => Section::Vibration(Alert::Notification),
        "vibration.call" => Section::Vibration(Alert::Call),
        "vibration.find" => Section::Vibration(Alert::Find),
        _ => Section::Unknown,
    })
}

fn parse_key_value(line: &str) -> Option<(&str, &str)> {
    let eq_pos = line.find('=')?;
    let key = line[..eq_pos].trim();
    let value = line[eq_pos + 1..].trim();

    // Remove inline comments that are not inside a string
    let value = value
        .match_indices('#')
        .find(|(pos, _)| value[..*pos].matches('"').count() % 2 == 0)
        .map_or(value, |(pos, _)| value[..pos].trim());

    if key.is_empty() || value.is_empty() {
        return None;
    }

    Some((key, value))
}

fn parse_string(value: &str) -> &str {
    if value.len() >= 2 && value.starts_with('"') && value.ends_with('"') {
        &value[1..value.len() - 1]
    } else {
        // Allow unquoted strings for simple values
        value
    }
}

fn parse_int<T: core::str::FromStr>(value: &str) -> Result<T, ParseError> {
    // Integer literals may use `_` separators (`4_200`)
    let mut digits = heapless::String::<16>::new();
    for c in value.chars().filter(|&c| c != '_') {
        digits.push(c).map_err(|_| ParseError::InvalidValue)?;
    }
    digits.parse().map_err(|_| ParseError::InvalidValue)
}

fn pattern_mut(config: &mut WatchConfig, alert: Alert) -> &mut VibrationPattern {
    match alert {
        Alert::Notification => &mut config.vibration.notification,
        Alert::Call => &mut config.vibration.call,
        Alert::Find => &mut config.vibration.find,
    }
}

fn apply_value(
    config: &mut WatchConfig,
    section: Section,
    key: &str,
    value: &str,
) -> Result<(), ParseError> {
    match (section, key) {
        (Section::Device, "name") => {
            config.device_name.clear();
            config
                .device_name
                .push_str(parse_string(value))
                .map_err(|_| ParseError::TooLong)?;
        }
        (Section::Battery, "empty_mv") => config.battery.empty_mv = parse_int(value)?,
        (Section::Battery, "full_mv") => config.battery.full_mv = parse_int(value)?,
        (Section::Input, "debounce_ms") => config.debounce_ms = parse_int(value)?,
        (Section::Power, "idle_timeout_s") => {
            config.idle_timeout_s = parse_int(value)?;
            if config.idle_timeout_s == 0 {
                return Err(ParseError::InvalidValue);
            }
        }
        (Section::Time, "timezone_offset_min") => config.timezone_offset_min = parse_int(value)?,
        (Section::Vibration(alert), "interval_ms") => {
            pattern_mut(config, alert).interval_ms = parse_int(value)?
        }
        (Section::Vibration(alert), "toggles") => {
            pattern_mut(config, alert).toggles = parse_int(value)?
        }
        _ => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
# Inkwatch configuration
[device]
name = "Wrist #1"   # advertised name

[battery]
empty_mv = 3_300
full_mv = 4150

[input]
debounce_ms = 32

[power]
idle_timeout_s = 30

[time]
timezone_offset_min = -120

[vibration.call]
interval_ms = 300
toggles = 10

[future]
shiny = true
"#;

    #[test]
    fn test_parse_sample() {
        let cfg = parse_config(SAMPLE).unwrap();
        assert_eq!(cfg.device_name.as_str(), "Wrist #1");
        assert_eq!(cfg.battery.empty_mv, 3300);
        assert_eq!(cfg.battery.full_mv, 4150);
        assert_eq!(cfg.debounce_ms, 32);
        assert_eq!(cfg.idle_timeout_s, 30);
        assert_eq!(cfg.timezone_offset_min, -120);
        assert_eq!(cfg.vibration.call, VibrationPattern::new(300, 10));
        // Untouched sections keep their defaults
        assert_eq!(cfg.vibration.find, WatchConfig::default().vibration.find);
        assert!(cfg.is_valid());
    }

    #[test]
    fn test_empty_input_gives_defaults() {
        assert_eq!(parse_config(""), Ok(WatchConfig::default()));
    }

    #[test]
    fn test_bad_value() {
        assert_eq!(
            parse_config("[battery]\nempty_mv = lots\n"),
            Err(ParseError::InvalidValue)
        );
        assert_eq!(
            parse_config("[power]\nidle_timeout_s = 0\n"),
            Err(ParseError::InvalidValue)
        );
    }

    #[test]
    fn test_bad_lines() {
        assert_eq!(parse_config("[battery\n"), Err(ParseError::InvalidSection));
        assert_eq!(parse_config("[]\n"), Err(ParseError::InvalidSection));
        assert_eq!(parse_config("just words\n"), Err(ParseError::InvalidLine));
    }

    #[test]
    fn test_name_too_long() {
        assert_eq!(
            parse_config("[device]\nname = \"a name far too long to fit\"\n"),
            Err(ParseError::TooLong)
        );
    }
}
