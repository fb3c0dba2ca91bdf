//! Daily schedule resolution with full timezone context.
//!
//! A [`ScheduleConfig`] holds the four configured times of day as text. Each
//! evaluation calls [`resolve`], which parses them, checks their ordering and
//! anchors them to the calendar date of the reference instant in the
//! configured zone. The result is a [`ResolvedSchedule`] of absolute instants
//! that is only valid for that one day. It is recomputed on every evaluation
//! and never cached, so the schedule follows the date across midnight.

use chrono::{DateTime, Duration, LocalResult, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use std::fmt;
use thiserror::Error;

use super::Period;

/// Accepted time-of-day formats, tried in order.
const TIME_FORMATS: [&str; 4] = ["%H:%M:%S", "%H:%M", "%I:%M%p", "%I:%M %p"];

/// Errors produced while resolving a schedule.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScheduleError {
    #[error("invalid {label} '{value}': expected HH:MM[:SS] or h:MMAM/PM")]
    InvalidTime { label: &'static str, value: String },

    #[error("sleep time {sleep} cannot be before bedtime {bedtime}")]
    SleepBeforeBedtime { sleep: String, bedtime: String },

    #[error("wake time {wake} cannot be after bedtime {bedtime}")]
    WakeAfterBedtime { wake: String, bedtime: String },

    #[error("work time {work} cannot be before wake time {wake}")]
    WorkBeforeWake { work: String, wake: String },

    #[error("unknown time zone '{0}'")]
    UnknownTimeZone(String),

    #[error("{label} {time} does not exist on {date} in {zone}")]
    NonexistentTime {
        label: &'static str,
        time: NaiveTime,
        date: NaiveDate,
        zone: Tz,
    },
}

/// Configured schedule as it appears in the configuration file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleConfig {
    pub wake: String,
    pub work: String,
    pub bedtime: String,
    pub sleep: String,
    pub time_zone: String,
}

/// Schedule anchored to a single calendar day.
///
/// Boundaries are stored as `DateTime<Tz>` so comparisons against any instant
/// are exact regardless of the zone the instant was produced in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSchedule {
    pub zone: Tz,
    pub date: NaiveDate,
    pub wake: DateTime<Tz>,
    pub work: DateTime<Tz>,
    pub bedtime: DateTime<Tz>,
    pub sleep: DateTime<Tz>,
}

/// Parse, validate and anchor `config` to the day of `reference`.
pub fn resolve(
    config: &ScheduleConfig,
    reference: DateTime<Utc>,
) -> Result<ResolvedSchedule, ScheduleError> {
    let wake = parse_time_of_day("wake time", &config.wake)?;
    let work = parse_time_of_day("work time", &config.work)?;
    let bedtime = parse_time_of_day("bedtime", &config.bedtime)?;
    let sleep = parse_time_of_day("sleep time", &config.sleep)?;

    if sleep < bedtime {
        return Err(ScheduleError::SleepBeforeBedtime {
            sleep: config.sleep.clone(),
            bedtime: config.bedtime.clone(),
        });
    }
    if wake > bedtime {
        return Err(ScheduleError::WakeAfterBedtime {
            wake: config.wake.clone(),
            bedtime: config.bedtime.clone(),
        });
    }
    if work < wake {
        return Err(ScheduleError::WorkBeforeWake {
            work: config.work.clone(),
            wake: config.wake.clone(),
        });
    }

    let zone = parse_zone(&config.time_zone)?;
    let date = reference.with_timezone(&zone).date_naive();

    Ok(ResolvedSchedule {
        zone,
        date,
        wake: anchor(zone, date, wake, "wake time")?,
        work: anchor(zone, date, work, "work time")?,
        bedtime: anchor(zone, date, bedtime, "bedtime")?,
        sleep: anchor(zone, date, sleep, "sleep time")?,
    })
}

/// Parse a configured time of day in any accepted format.
pub fn parse_time_of_day(label: &'static str, value: &str) -> Result<NaiveTime, ScheduleError> {
    let text = value.trim();
    TIME_FORMATS
        .iter()
        .find_map(|format| NaiveTime::parse_from_str(text, format).ok())
        .ok_or_else(|| ScheduleError::InvalidTime {
            label,
            value: value.to_string(),
        })
}

pub fn parse_zone(name: &str) -> Result<Tz, ScheduleError> {
    name.trim()
        .parse::<Tz>()
        .map_err(|_| ScheduleError::UnknownTimeZone(name.to_string()))
}

/// Combine date and time in `zone`.
///
/// An ambiguous local time (clocks falling back) resolves to its earlier
/// instant. A local time inside a spring-forward gap moves to the first
/// instant after the gap.
fn anchor(
    zone: Tz,
    date: NaiveDate,
    time: NaiveTime,
    label: &'static str,
) -> Result<DateTime<Tz>, ScheduleError> {
    let local = date.and_time(time);
    match zone.from_local_datetime(&local) {
        LocalResult::Single(instant) | LocalResult::Ambiguous(instant, _) => Ok(instant),
        LocalResult::None => zone
            .from_local_datetime(&(local + Duration::hours(1)))
            .earliest()
            .ok_or(ScheduleError::NonexistentTime {
                label,
                time,
                date,
                zone,
            }),
    }
}

impl ResolvedSchedule {
    pub fn past_wake(&self, instant: DateTime<Utc>) -> bool {
        instant >= self.wake
    }

    pub fn past_work(&self, instant: DateTime<Utc>) -> bool {
        instant >= self.work
    }

    pub fn past_bedtime(&self, instant: DateTime<Utc>) -> bool {
        instant >= self.bedtime
    }

    pub fn past_sleep(&self, instant: DateTime<Utc>) -> bool {
        instant >= self.sleep
    }

    /// Classify `instant` into the latest period whose start has passed.
    ///
    /// Boundaries are checked from latest to earliest; an instant before the
    /// wake boundary is `Night`.
    pub fn classify(&self, instant: DateTime<Utc>) -> Period {
        if self.past_sleep(instant) {
            Period::Sleep
        } else if self.past_bedtime(instant) {
            Period::Bedtime
        } else if self.past_work(instant) {
            Period::Work
        } else if self.past_wake(instant) {
            Period::Wake
        } else {
            Period::Night
        }
    }
}

impl fmt::Display for ResolvedSchedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}): wake {} | work {} | bedtime {} | sleep {}",
            self.date,
            self.zone,
            self.wake.format("%H:%M:%S"),
            self.work.format("%H:%M:%S"),
            self.bedtime.format("%H:%M:%S"),
            self.sleep.format("%H:%M:%S"),
        )
    }
}
