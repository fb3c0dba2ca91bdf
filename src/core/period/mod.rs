//! Daily period classification.
//!
//! The day is split into five mutually exclusive periods, ordered by time of
//! day. The current period is never stored: it is derived from a freshly
//! resolved [`ResolvedSchedule`] and the current instant on every evaluation.
//!
//! ## Key Functionality
//! - **Schedule Resolution**: parsing, validating and anchoring the configured
//!   times to today (see [`schedule`])
//! - **Period Detection**: picking the latest period whose start has passed
//! - **Hysteresis**: one-shot and override flags scoped to a period visit
//!   (see [`state`])

pub mod schedule;
pub mod state;

pub use schedule::{ResolvedSchedule, ScheduleConfig, ScheduleError, resolve};
pub use state::PeriodState;

use std::fmt;

/// One of the five daily windows, in time-of-day order.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Copy, Clone, Hash)]
pub enum Period {
    /// Before wake time; quiet, no player actions
    Night,

    /// From wake time; start the stream and ramp the volume up
    Wake,

    /// From work time; stop playback unless overridden
    Work,

    /// From bedtime; start the stream and keep it playing
    Bedtime,

    /// From sleep time; fade out and stop
    Sleep,
}

impl Period {
    /// All periods in time-of-day order.
    pub const ALL: [Period; 5] = [
        Period::Night,
        Period::Wake,
        Period::Work,
        Period::Bedtime,
        Period::Sleep,
    ];

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Night => "Night",
            Self::Wake => "Wake",
            Self::Work => "Work",
            Self::Bedtime => "Bedtime",
            Self::Sleep => "Sleep",
        }
    }

    /// Returns true for periods whose policy drives the player on every tick.
    pub fn is_active(&self) -> bool {
        !matches!(self, Self::Night)
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}
