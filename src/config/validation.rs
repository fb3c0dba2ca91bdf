//! Configuration validation functionality.
//!
//! Rejects values the controller cannot act on: volumes outside 0-100, zero
//! step sizes, unparseable or extreme ticker intervals, unknown dial modes and
//! schedules that do not resolve.

use anyhow::{Context, Result};

use super::Config;
use crate::common::constants::*;
use crate::core::period::schedule;

/// Validate every field of `config`, returning the first problem found.
pub fn validate_config(config: &Config) -> Result<()> {
    if let Some(volume) = config.base_volume {
        validate_volume(volume, "base_volume")?;
    }
    if let Some(volume) = config.wake_volume {
        validate_volume(volume, "wake_volume")?;
    }
    if let Some(step) = config.volume_up_amount {
        validate_step(step, "volume_up_amount")?;
    }
    if let Some(step) = config.volume_down_amount {
        validate_step(step, "volume_down_amount")?;
    }

    let interval = config
        .ticker_interval()
        .context("ticker_interval must be a duration such as \"30s\" or \"1m30s\"")?;
    if !(MINIMUM_TICKER_INTERVAL..=MAXIMUM_TICKER_INTERVAL).contains(&interval) {
        anyhow::bail!(
            "ticker_interval ({:?}) must be between {:?} and {:?}",
            interval,
            MINIMUM_TICKER_INTERVAL,
            MAXIMUM_TICKER_INTERVAL
        );
    }

    if let Some(mode) = config.dial_mode.as_deref()
        && !DIAL_MODES.contains(&mode)
    {
        anyhow::bail!(
            "dial_mode (\"{}\") must be one of: {}",
            mode,
            DIAL_MODES.join(", ")
        );
    }

    if let Some(stream) = config.stream.as_deref()
        && stream.trim().is_empty()
    {
        anyhow::bail!("stream must not be empty");
    }

    if let Some(command) = config.player_command.as_deref()
        && command.trim().is_empty()
    {
        anyhow::bail!("player_command must not be empty");
    }

    // Ordering and zone checks do not depend on the date; today is as good
    // as any reference.
    schedule::resolve(&config.schedule(), chrono::Utc::now()).context("Invalid schedule")?;

    Ok(())
}

fn validate_volume(volume: u8, name: &str) -> Result<()> {
    if !(MINIMUM_VOLUME..=MAXIMUM_VOLUME).contains(&volume) {
        anyhow::bail!(
            "{} ({}) must be between {} and {}",
            name,
            volume,
            MINIMUM_VOLUME,
            MAXIMUM_VOLUME
        );
    }
    Ok(())
}

fn validate_step(step: u8, name: &str) -> Result<()> {
    if !(MINIMUM_VOLUME_STEP..=MAXIMUM_VOLUME_STEP).contains(&step) {
        anyhow::bail!(
            "{} ({}) must be between {} and {}",
            name,
            step,
            MINIMUM_VOLUME_STEP,
            MAXIMUM_VOLUME_STEP
        );
    }
    Ok(())
}
