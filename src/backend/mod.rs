//! Player abstraction layer for the external media player.
//!
//! The controller drives playback through the [`PlayerBackend`] trait. Every
//! operation is synchronous and may fail with a [`PlayerError`]; the caller
//! decides how far an interrupted sequence gets. The only implementation
//! shipped is [`mpc::MpcBackend`], which shells out to `mpc` for an MPD server.
//!
//! ## Status Format
//!
//! Players answer a status query with a short text block, parsed by
//! [`parse_status`]:
//!
//! ```text
//! KEXP 90.3 FM - Where the Music Matters       <- title
//! [playing] #1/1   3:12/0:00 (0%)              <- playback state
//! volume: 52%   repeat: off   random: off      <- volume
//! ```
//!
//! A stopped player prints only the volume line.

pub mod mpc;
#[cfg(any(test, feature = "testing-support"))]
pub mod recording;

use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;
use thiserror::Error;

use crate::common::constants::MAXIMUM_VOLUME;
use crate::config::Config;

static VOLUME_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"volume:\s*(\d*)").expect("volume pattern is valid"));

/// Errors reported by a player backend.
#[derive(Debug, Error)]
pub enum PlayerError {
    #[error("failed to run '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("'{command}' failed ({status}): {output}")]
    CommandFailed {
        command: String,
        status: String,
        output: String,
    },

    #[error("failed to parse player status ({reason}): {raw:?}")]
    Parse { reason: &'static str, raw: String },
}

/// Snapshot of the player's state, fetched fresh before each decision.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlayerStatus {
    pub title: String,
    pub is_playing: bool,
    pub is_paused: bool,
    /// 0-100
    pub volume: u8,
}

impl fmt::Display for PlayerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = if self.is_playing {
            "playing"
        } else if self.is_paused {
            "paused"
        } else {
            "stopped"
        };
        if self.title.is_empty() {
            write!(f, "{state}, volume {}%", self.volume)
        } else {
            write!(f, "{state} '{}', volume {}%", self.title, self.volume)
        }
    }
}

/// Trait for media players the controller can drive.
///
/// This is the only channel through which the controller affects the outside
/// world. Implementations should be thin: issue the command, report failure,
/// and leave policy to the caller.
#[cfg_attr(test, mockall::automock)]
pub trait PlayerBackend: Send {
    fn play(&mut self) -> Result<(), PlayerError>;

    fn stop(&mut self) -> Result<(), PlayerError>;

    /// Toggle between playing and paused.
    fn toggle_playback(&mut self) -> Result<(), PlayerError>;

    /// Set the absolute volume (0-100).
    fn set_volume(&mut self, volume: u8) -> Result<(), PlayerError>;

    /// Change the volume by a signed amount. A zero delta issues nothing.
    fn adjust_volume(&mut self, delta: i32) -> Result<(), PlayerError>;

    fn clear_playlist(&mut self) -> Result<(), PlayerError>;

    /// Append a track or stream URI to the playlist.
    fn enqueue_track(&mut self, uri: &str) -> Result<(), PlayerError>;

    fn query_status(&mut self) -> Result<PlayerStatus, PlayerError>;

    /// Human-readable name for log output.
    fn backend_name(&self) -> &'static str;
}

/// Create the player backend described by the configuration.
pub fn create_backend(config: &Config) -> Box<dyn PlayerBackend> {
    Box::new(mpc::MpcBackend::new(
        config.player_command(),
        config.player_host.clone(),
    ))
}

/// Parse a status text block into a [`PlayerStatus`].
///
/// Trailing newlines are dropped first. The remaining block must have 1 line
/// (volume only) or 3 to 5 lines (title, playback state, volume, extras).
/// A line without a `volume:` label counts as volume 0; a label without a
/// number (`volume: n/a` when MPD has no mixer) is a parse error.
pub fn parse_status(raw: &str) -> Result<PlayerStatus, PlayerError> {
    let lines: Vec<&str> = raw.trim_end_matches(['\n', '\r']).split('\n').collect();

    let parse_error = |reason| PlayerError::Parse {
        reason,
        raw: raw.to_string(),
    };

    match lines.len() {
        1 => Ok(PlayerStatus {
            volume: parse_volume(lines[0]).ok_or_else(|| parse_error("invalid volume"))?,
            ..PlayerStatus::default()
        }),
        3..=5 => {
            let state = lines[1];
            Ok(PlayerStatus {
                title: lines[0].trim_end_matches('\r').to_string(),
                is_playing: state.contains("[playing]"),
                is_paused: state.contains("[paused]"),
                volume: parse_volume(lines[2]).ok_or_else(|| parse_error("invalid volume"))?,
            })
        }
        2 => Err(parse_error("only 2 lines")),
        _ => Err(parse_error("too many lines")),
    }
}

/// Volume from a `volume: N%` line; `None` when the label has no number.
fn parse_volume(line: &str) -> Option<u8> {
    let Some(captures) = VOLUME_PATTERN.captures(line) else {
        return Some(0);
    };
    let value: u64 = captures[1].parse().ok()?;
    Some(value.min(u64::from(MAXIMUM_VOLUME)) as u8)
}
