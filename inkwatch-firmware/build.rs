//! Build script for inkwatch-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates watch.toml at compile time

use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Longest advertised device name
const MAX_NAME_LEN: usize = 16;

fn main() {
    setup_linker();
    validate_config();
}

/// Set up linker search paths for memory.x
fn setup_linker() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    let memory_x = include_bytes!("memory.x");
    let mut f = File::create(out_dir.join("memory.x")).unwrap();
    f.write_all(memory_x).unwrap();

    println!("cargo:rustc-link-search={}", out_dir.display());

    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Validate watch.toml at compile time
fn validate_config() {
    println!("cargo:rerun-if-changed=watch.toml");

    let config_path = Path::new("watch.toml");

    if !config_path.exists() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: watch.toml not found!                                    ║\n\
            ║                                                                  ║\n\
            ║  The firmware embeds watch.toml as its default configuration.    ║\n\
            ║  Please create one in the inkwatch-firmware directory.           ║\n\
            ╚══════════════════════════════════════════════════════════════════╝\n"
        );
    }

    let config_content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => {
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Failed to read watch.toml                                ║\n\
                ║                                                                  ║\n\
                ║  Error: {:<56} ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                e
            );
        }
    };

    let config: toml::Value = match toml::from_str(&config_content) {
        Ok(value) => value,
        Err(e) => {
            let error_msg = e.to_string();
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Invalid TOML syntax in watch.toml                        ║\n\
                ╠══════════════════════════════════════════════════════════════════╣\n\
                ║                                                                  ║\n\
                {}\n\
                ║                                                                  ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                format_error_lines(&error_msg)
            );
        }
    };

    let mut errors = Vec::new();
    validate_device(&config, &mut errors);
    validate_battery(&config, &mut errors);
    validate_range(&config, "input", "debounce_ms", 1, 1000, &mut errors);
    validate_range(&config, "power", "idle_timeout_s", 1, 3600, &mut errors);
    validate_range(&config, "time", "timezone_offset_min", -720, 840, &mut errors);
    validate_vibration(&config, &mut errors);

    if !errors.is_empty() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: Invalid values in watch.toml                             ║\n\
            ╠══════════════════════════════════════════════════════════════════╣\n\
            {}\n\
            ╚══════════════════════════════════════════════════════════════════╝\n",
            errors
                .iter()
                .map(|e| format!("║  • {:<62} ║", e))
                .collect::<Vec<_>>()
                .join("\n")
        );
    }

    println!("cargo:warning=watch.toml validated successfully");
}

/// Format error message lines with box drawing
fn format_error_lines(msg: &str) -> String {
    msg.lines()
        .map(|line| {
            let truncated = if line.len() > 64 {
                format!("{}...", &line[..61])
            } else {
                line.to_string()
            };
            format!("║  {:<64} ║", truncated)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Integer at `section.key`, if present
fn int_value(config: &toml::Value, section: &str, key: &str) -> Option<Result<i64, String>> {
    let value = section
        .split('.')
        .try_fold(config, |table, name| table.get(name))?
        .get(key)?;
    Some(
        value
            .as_integer()
            .ok_or_else(|| format!("[{}] {} must be an integer", section, key)),
    )
}

fn validate_range(
    config: &toml::Value,
    section: &str,
    key: &str,
    min: i64,
    max: i64,
    errors: &mut Vec<String>,
) {
    match int_value(config, section, key) {
        Some(Ok(v)) if v < min || v > max => {
            errors.push(format!("[{}] {} = {} outside {}..={}", section, key, v, min, max));
        }
        Some(Err(e)) => errors.push(e),
        _ => {}
    }
}

fn validate_device(config: &toml::Value, errors: &mut Vec<String>) {
    let Some(name) = config.get("device").and_then(|d| d.get("name")) else {
        return;
    };
    match name.as_str() {
        Some(s) if s.is_empty() => errors.push("[device] name must not be empty".into()),
        Some(s) if s.len() > MAX_NAME_LEN => errors.push(format!(
            "[device] name '{}' longer than {} bytes",
            s, MAX_NAME_LEN
        )),
        Some(_) => {}
        None => errors.push("[device] name must be a string".into()),
    }
}

fn validate_battery(config: &toml::Value, errors: &mut Vec<String>) {
    validate_range(config, "battery", "empty_mv", 2500, 4500, errors);
    validate_range(config, "battery", "full_mv", 2500, 4500, errors);

    let empty = int_value(config, "battery", "empty_mv").and_then(Result::ok);
    let full = int_value(config, "battery", "full_mv").and_then(Result::ok);
    let (empty, full) = (empty.unwrap_or(3400), full.unwrap_or(4200));
    if full <= empty {
        errors.push(format!(
            "[battery] full_mv ({}) must be above empty_mv ({})",
            full, empty
        ));
    }
}

fn validate_vibration(config: &toml::Value, errors: &mut Vec<String>) {
    let Some(table) = config.get("vibration").and_then(|v| v.as_table()) else {
        return;
    };
    for (alert, _) in table {
        if !matches!(alert.as_str(), "notification" | "call" | "find") {
            errors.push(format!("[vibration.{}] unknown alert", alert));
            continue;
        }
        let section = format!("vibration.{}", alert);
        validate_range(config, &section, "interval_ms", 1, 2000, errors);
        validate_range(config, &section, "toggles", 0, 255, errors);
    }
}
