//! Configuration system for lullaby.
//!
//! Settings live in a TOML file, by default `$XDG_CONFIG_HOME/lullaby/lullaby.toml`.
//! Every key is optional; missing keys fall back to the defaults in
//! [`crate::common::constants`].
//!
//! ```toml
//! #[Schedule]
//! wake_time = "06:00AM"     # Start the stream quietly and ramp up
//! work_time = "09:00AM"     # Stop playback unless a click during wake armed an override
//! bedtime = "09:00PM"       # Start the stream at base volume
//! sleep_time = "10:00PM"    # Fade out and stop
//! time_zone = "Europe/Berlin"
//!
//! #[Volume]
//! base_volume = 100         # Bedtime volume and wake ramp target (0-100)
//! wake_volume = 40          # Starting volume at wake time (0-100)
//! volume_up_amount = 2      # Wake ramp step per tick (1-100)
//! volume_down_amount = 2    # Sleep fade step per tick (1-100)
//! ticker_interval = "30s"   # How often the schedule is evaluated
//!
//! #[Devices]
//! dial_file = "/dev/input/event0"
//! dial_mode = "schedule"    # "schedule" or "basic"
//! stream = "http://live-aacplus-64.kexp.org/kexp64.aac"
//! player_command = "mpc"
//! player_host = "localhost"
//! debug = false
//! ```
//!
//! ## Validation and Error Handling
//!
//! [`validation::validate_config`] checks ranges, the ticker interval, the
//! dial mode and that the schedule resolves. Any failure is fatal at startup;
//! a failed reload keeps the running configuration.

pub mod builder;
pub mod loading;
pub mod validation;

#[cfg(test)]
mod tests;

use anyhow::Result;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

use crate::common::constants::*;
use crate::common::utils;
use crate::core::period::ScheduleConfig;

pub use builder::create_default_config;
pub use loading::{default_config_path, load, load_from_path};

/// Which dial responder handles clicks and turns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialMode {
    /// Click behaviour depends on the current period.
    Schedule,
    /// Click always toggles playback.
    Basic,
}

/// Configuration structure for lullaby settings.
///
/// Mirrors `lullaby.toml`. Fields stay optional so that an absent key and an
/// explicit value can be told apart; use the accessor methods to read values
/// with defaults applied.
#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Input device the dial reports on.
    pub dial_file: Option<PathBuf>,
    /// Track or stream URI queued at wake and bedtime.
    pub stream: Option<String>,

    pub wake_time: Option<String>,
    pub work_time: Option<String>,
    pub bedtime: Option<String>,
    pub sleep_time: Option<String>,
    /// IANA zone name the schedule is anchored in. Defaults to the system zone.
    pub time_zone: Option<String>,

    /// Volume set at bedtime and the ceiling of the wake ramp.
    pub base_volume: Option<u8>,
    /// Volume set when the wake sequence starts.
    pub wake_volume: Option<u8>,
    pub volume_up_amount: Option<u8>,
    pub volume_down_amount: Option<u8>,

    /// Policy evaluation interval as a duration string (`30s`, `1m`).
    pub ticker_interval: Option<String>,

    /// `"schedule"` or `"basic"`.
    pub dial_mode: Option<String>,

    pub player_command: Option<String>,
    /// MPD host passed to the player command as `--host`.
    pub player_host: Option<String>,

    pub debug: Option<bool>,
}

impl Config {
    pub fn dial_file(&self) -> PathBuf {
        self.dial_file
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DIAL_FILE))
    }

    pub fn stream(&self) -> &str {
        self.stream.as_deref().unwrap_or(DEFAULT_STREAM)
    }

    /// Zone name in effect: configured, else detected from the system, else UTC.
    pub fn time_zone(&self) -> String {
        match &self.time_zone {
            Some(zone) => zone.clone(),
            None => utils::detect_system_timezone()
                .map(|zone| zone.name().to_string())
                .unwrap_or_else(|| DEFAULT_TIME_ZONE.to_string()),
        }
    }

    /// The configured schedule, with defaults applied.
    pub fn schedule(&self) -> ScheduleConfig {
        ScheduleConfig {
            wake: self.wake_time.clone().unwrap_or_else(|| DEFAULT_WAKE_TIME.into()),
            work: self.work_time.clone().unwrap_or_else(|| DEFAULT_WORK_TIME.into()),
            bedtime: self.bedtime.clone().unwrap_or_else(|| DEFAULT_BEDTIME.into()),
            sleep: self.sleep_time.clone().unwrap_or_else(|| DEFAULT_SLEEP_TIME.into()),
            time_zone: self.time_zone(),
        }
    }

    pub fn base_volume(&self) -> u8 {
        self.base_volume.unwrap_or(DEFAULT_BASE_VOLUME)
    }

    pub fn wake_volume(&self) -> u8 {
        self.wake_volume.unwrap_or(DEFAULT_WAKE_VOLUME)
    }

    pub fn volume_up_amount(&self) -> u8 {
        self.volume_up_amount.unwrap_or(DEFAULT_VOLUME_UP_AMOUNT)
    }

    pub fn volume_down_amount(&self) -> u8 {
        self.volume_down_amount.unwrap_or(DEFAULT_VOLUME_DOWN_AMOUNT)
    }

    /// Parsed ticker interval. Fails on a malformed duration string.
    pub fn ticker_interval(&self) -> Result<Duration> {
        let text = self
            .ticker_interval
            .as_deref()
            .unwrap_or(DEFAULT_TICKER_INTERVAL);
        utils::parse_interval(text)
    }

    /// Dial mode in effect. Unknown values fall back to `Schedule`; validation
    /// rejects them before this matters.
    pub fn dial_mode(&self) -> DialMode {
        match self.dial_mode.as_deref().unwrap_or(DEFAULT_DIAL_MODE) {
            "basic" => DialMode::Basic,
            _ => DialMode::Schedule,
        }
    }

    pub fn player_command(&self) -> &str {
        self.player_command
            .as_deref()
            .unwrap_or(DEFAULT_PLAYER_COMMAND)
    }

    pub fn debug(&self) -> bool {
        self.debug.unwrap_or(DEFAULT_DEBUG)
    }

    /// Keys whose new value in `other` only takes effect after a restart.
    ///
    /// The dial device, the ticker and the player client are set up once at
    /// startup; everything else is applied by a reload.
    pub fn restart_required_changes(&self, other: &Config) -> Vec<&'static str> {
        let mut changed = Vec::new();
        if self.dial_file() != other.dial_file() {
            changed.push("dial_file");
        }
        if self.ticker_interval.as_deref().unwrap_or(DEFAULT_TICKER_INTERVAL)
            != other.ticker_interval.as_deref().unwrap_or(DEFAULT_TICKER_INTERVAL)
        {
            changed.push("ticker_interval");
        }
        if self.player_command() != other.player_command() {
            changed.push("player_command");
        }
        if self.player_host != other.player_host {
            changed.push("player_host");
        }
        changed
    }

    /// Log the effective configuration as an indented block.
    pub fn log_config(&self, path: &std::path::Path) {
        let schedule = self.schedule();
        log_block_start!("Loaded configuration from {}", utils::private_path(path));
        log_indented!(
            "Schedule: wake {} | work {} | bedtime {} | sleep {} ({})",
            schedule.wake,
            schedule.work,
            schedule.bedtime,
            schedule.sleep,
            schedule.time_zone
        );
        log_indented!(
            "Volume: base {}% | wake {}% | up {} | down {}",
            self.base_volume(),
            self.wake_volume(),
            self.volume_up_amount(),
            self.volume_down_amount()
        );
        log_indented!(
            "Ticker: {}",
            self.ticker_interval.as_deref().unwrap_or(DEFAULT_TICKER_INTERVAL)
        );
        log_indented!(
            "Dial: {} ({} mode)",
            self.dial_file().display(),
            self.dial_mode.as_deref().unwrap_or(DEFAULT_DIAL_MODE)
        );
        log_indented!("Stream: {}", self.stream());
    }
}
