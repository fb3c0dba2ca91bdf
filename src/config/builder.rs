//! Default configuration file generation.
//!
//! Writes a commented `lullaby.toml` on first run so the user has every key
//! in front of them with its default value and allowed range.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use crate::common::constants::*;
use crate::common::utils::{self, private_path};

/// Create a default config file at `path`, creating parent directories.
pub fn create_default_config(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("Failed to create config directory")?;
    }

    let time_zone = utils::detect_system_timezone()
        .map(|zone| zone.name().to_string())
        .unwrap_or_else(|| DEFAULT_TIME_ZONE.to_string());

    fs::write(path, default_config_content(&time_zone))
        .with_context(|| format!("Failed to write default config to {}", private_path(path)))?;

    log_block_start!("Created default configuration at {}", private_path(path));
    Ok(())
}

/// Render the default configuration for the given zone.
pub fn default_config_content(time_zone: &str) -> String {
    ConfigBuilder::new()
        .add_section("Schedule")
        .add_setting(
            "wake_time",
            &quoted(DEFAULT_WAKE_TIME),
            "Start the stream and ramp the volume up",
        )
        .add_setting(
            "work_time",
            &quoted(DEFAULT_WORK_TIME),
            "Stop playback (a click during wake keeps it playing)",
        )
        .add_setting(
            "bedtime",
            &quoted(DEFAULT_BEDTIME),
            "Start the stream at base volume",
        )
        .add_setting(
            "sleep_time",
            &quoted(DEFAULT_SLEEP_TIME),
            "Fade out, then stop",
        )
        .add_setting("time_zone", &quoted(time_zone), "IANA time zone name")
        .add_section("Volume")
        .add_setting(
            "base_volume",
            &DEFAULT_BASE_VOLUME.to_string(),
            &format!("Bedtime volume and wake ramp target ({MINIMUM_VOLUME}-{MAXIMUM_VOLUME})"),
        )
        .add_setting(
            "wake_volume",
            &DEFAULT_WAKE_VOLUME.to_string(),
            &format!("Volume when the wake stream starts ({MINIMUM_VOLUME}-{MAXIMUM_VOLUME})"),
        )
        .add_setting(
            "volume_up_amount",
            &DEFAULT_VOLUME_UP_AMOUNT.to_string(),
            &format!("Wake ramp step per tick ({MINIMUM_VOLUME_STEP}-{MAXIMUM_VOLUME_STEP})"),
        )
        .add_setting(
            "volume_down_amount",
            &DEFAULT_VOLUME_DOWN_AMOUNT.to_string(),
            &format!("Sleep fade step per tick ({MINIMUM_VOLUME_STEP}-{MAXIMUM_VOLUME_STEP})"),
        )
        .add_setting(
            "ticker_interval",
            &quoted(DEFAULT_TICKER_INTERVAL),
            "How often the schedule is evaluated (1s-1h)",
        )
        .add_section("Devices")
        .add_setting(
            "dial_file",
            &quoted(DEFAULT_DIAL_FILE),
            "Input device of the rotary dial",
        )
        .add_setting(
            "dial_mode",
            &quoted(DEFAULT_DIAL_MODE),
            "\"schedule\" (period-aware clicks) or \"basic\" (plain toggle)",
        )
        .add_setting("stream", &quoted(DEFAULT_STREAM), "Stream queued at wake and bedtime")
        .add_setting(
            "player_command",
            &quoted(DEFAULT_PLAYER_COMMAND),
            "MPD client used to drive playback",
        )
        .add_setting("debug", &DEFAULT_DEBUG.to_string(), "Log every player command")
        .build()
}

fn quoted(value: &str) -> String {
    format!("\"{value}\"")
}

struct ConfigBuilder {
    entries: Vec<Entry>,
}

enum Entry {
    Section(String),
    Setting { line: String, comment: String },
}

impl ConfigBuilder {
    fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    fn add_section(mut self, title: &str) -> Self {
        self.entries.push(Entry::Section(format!("#[{title}]")));
        self
    }

    fn add_setting(mut self, key: &str, value: &str, comment: &str) -> Self {
        self.entries.push(Entry::Setting {
            line: format!("{key} = {value}"),
            comment: format!("# {comment}"),
        });
        self
    }

    /// Render all entries with comments aligned in one column.
    fn build(self) -> String {
        let width = self
            .entries
            .iter()
            .filter_map(|entry| match entry {
                Entry::Setting { line, .. } => Some(line.len()),
                Entry::Section(_) => None,
            })
            .max()
            .unwrap_or(0)
            + 1;

        let mut lines = Vec::new();
        for entry in self.entries {
            match entry {
                Entry::Section(title) => {
                    if !lines.is_empty() {
                        lines.push(String::new());
                    }
                    lines.push(title);
                }
                Entry::Setting { line, comment } => {
                    lines.push(format!("{line:<width$}{comment}"));
                }
            }
        }

        let mut content = lines.join("\n");
        content.push('\n');
        content
    }
}
