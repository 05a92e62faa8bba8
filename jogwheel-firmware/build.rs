//! Build script for jogwheel-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates jogwheel.toml at compile time

use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Known keys per section with their allowed (inclusive) range
const SCHEMA: &[(&str, &[(&str, i64, i64)])] = &[
    (
        "input",
        &[
            ("debounce_ms", 1, 1_000),
            ("repeat_ms", 1, 10_000),
            ("poll_interval_ms", 1, 1_000),
            ("speed_sample_ms", 1, 10_000),
            ("adc_max", 4, 65_535),
            ("steps_per_detent", 1, 255),
        ],
    ),
    (
        "jog",
        &[
            ("step_um", 1, 65_535),
            ("xy_feed", 1, 65_535),
            ("z_feed", 1, 65_535),
        ],
    ),
    (
        "probe",
        &[("feed", 1, 65_535), ("travel_um", 0, 1_000_000)],
    ),
    (
        "serial",
        &[
            ("response_timeout_ms", 1, 600_000),
            ("motion_timeout_ms", 1, 3_600_000),
        ],
    ),
];

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

/// Validate jogwheel.toml at compile time
fn validate_config() {
    println!("cargo:rerun-if-changed=jogwheel.toml");

    let config_path = Path::new("jogwheel.toml");

    if !config_path.exists() {
        fail(
            "jogwheel.toml not found",
            &["The firmware embeds jogwheel.toml; create one next to Cargo.toml.".to_string()],
        );
    }

    let content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => fail("Failed to read jogwheel.toml", &[e.to_string()]),
    };

    let config: toml::Value = match toml::from_str(&content) {
        Ok(value) => value,
        Err(e) => {
            let lines: Vec<String> = e.to_string().lines().map(str::to_string).collect();
            fail("Invalid TOML syntax in jogwheel.toml", &lines);
        }
    };

    let errors = check_schema(&config);
    if !errors.is_empty() {
        fail("Invalid settings in jogwheel.toml", &errors);
    }

    println!("cargo:warning=jogwheel.toml validated successfully");
}

/// Check sections, keys and value ranges
fn check_schema(config: &toml::Value) -> Vec<String> {
    let mut errors = Vec::new();

    let root = match config.as_table() {
        Some(t) => t,
        None => return vec!["top level must be a table".to_string()],
    };

    for (section, value) in root {
        let Some((_, keys)) = SCHEMA.iter().find(|(name, _)| *name == section.as_str()) else {
            errors.push(format!("unknown section [{}]", section));
            continue;
        };

        let table = match value.as_table() {
            Some(t) => t,
            None => {
                errors.push(format!("[{}] must be a table", section));
                continue;
            }
        };

        for (key, value) in table {
            let Some((_, min, max)) = keys.iter().find(|(name, _, _)| *name == key.as_str()) else {
                errors.push(format!("[{}] unknown key '{}'", section, key));
                continue;
            };

            match value.as_integer() {
                Some(v) if v >= *min && v <= *max => {}
                Some(_) => errors.push(format!("[{}] {} must be {}-{}", section, key, min, max)),
                None => errors.push(format!("[{}] {} must be an integer", section, key)),
            }
        }
    }

    errors
}

/// Abort the build with a boxed error message
fn fail(title: &str, lines: &[String]) -> ! {
    let body = lines
        .iter()
        .map(|line| {
            let truncated = if line.chars().count() > 62 {
                format!("{}...", line.chars().take(59).collect::<String>())
            } else {
                line.to_string()
            };
            format!("║  • {:<62} ║", truncated)
        })
        .collect::<Vec<_>>()
        .join("\n");

    panic!(
        "\n\
        ╔══════════════════════════════════════════════════════════════════╗\n\
        ║  ERROR: {:<56} ║\n\
        ╠══════════════════════════════════════════════════════════════════╣\n\
        {}\n\
        ╚══════════════════════════════════════════════════════════════════╝\n",
        title, body
    );
}
