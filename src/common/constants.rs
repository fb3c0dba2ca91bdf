//! Application-wide constants and configuration defaults.
//!
//! Defaults are applied when a key is absent from `lullaby.toml`; the
//! `MINIMUM_*`/`MAXIMUM_*` pairs bound what validation accepts.

use std::time::Duration;

// # Configuration defaults

pub const DEFAULT_DIAL_FILE: &str = "/dev/input/event0";
pub const DEFAULT_STREAM: &str = "http://live-aacplus-64.kexp.org/kexp64.aac";

pub const DEFAULT_WAKE_TIME: &str = "06:00AM";
pub const DEFAULT_WORK_TIME: &str = "09:00AM";
pub const DEFAULT_BEDTIME: &str = "09:00PM";
pub const DEFAULT_SLEEP_TIME: &str = "10:00PM";
pub const DEFAULT_TIME_ZONE: &str = "UTC";

pub const DEFAULT_BASE_VOLUME: u8 = 100;
pub const DEFAULT_WAKE_VOLUME: u8 = 40;
pub const DEFAULT_VOLUME_UP_AMOUNT: u8 = 2;
pub const DEFAULT_VOLUME_DOWN_AMOUNT: u8 = 2;

pub const DEFAULT_TICKER_INTERVAL: &str = "30s";
pub const DEFAULT_DIAL_MODE: &str = "schedule";
pub const DEFAULT_PLAYER_COMMAND: &str = "mpc";
pub const DEFAULT_DEBUG: bool = false;

// # Validation limits

pub const MINIMUM_VOLUME: u8 = 0;
pub const MAXIMUM_VOLUME: u8 = 100;

pub const MINIMUM_VOLUME_STEP: u8 = 1;
pub const MAXIMUM_VOLUME_STEP: u8 = 100;

pub const MINIMUM_TICKER_INTERVAL: Duration = Duration::from_secs(1);
pub const MAXIMUM_TICKER_INTERVAL: Duration = Duration::from_secs(3600);

pub const DIAL_MODES: [&str; 2] = ["schedule", "basic"];

// # Dial hardware record layout

/// Size of one input-event record on the dial's device stream.
pub const DIAL_RECORD_SIZE: usize = 16;

/// Event type for key/button reports.
pub const EV_KEY: u16 = 0x01;
/// Event type for relative-axis reports.
pub const EV_REL: u16 = 0x02;
/// Relative axis the dial reports rotation on.
pub const REL_DIAL: u16 = 0x07;
/// Button code of the dial's push switch.
pub const BTN_DIAL: u16 = 0x100;

// # Process

pub const LOCK_FILE_NAME: &str = "lullaby.lock";
pub const CONFIG_DIR_NAME: &str = "lullaby";
pub const CONFIG_FILE_NAME: &str = "lullaby.toml";

pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FAILURE: i32 = 1;
