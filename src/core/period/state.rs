//! Hysteresis flags scoped to the current period visit.

use super::Period;

/// One-shot markers and user overrides for the period currently being
/// visited.
///
/// Each flag is owned by one or more periods. [`PeriodState::entering`] is the
/// single place flags are cleared: evaluating a period keeps the flags it owns
/// and clears every other one, so nothing leaks from one visit into the next.
///
/// | flag                 | owned by       |
/// |----------------------|----------------|
/// | `bedtime_started`    | Bedtime        |
/// | `bedtime_override`   | Bedtime        |
/// | `waketime_started`   | Wake           |
/// | `worktime_override`  | Wake, Work     |
/// | `sleeptime_override` | Sleep          |
///
/// `worktime_override` is armed by a click during Wake and consumed by the
/// Work auto-stop, so it survives the Wake → Work transition and is cleared
/// once the day moves on to Bedtime.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PeriodState {
    pub bedtime_started: bool,
    pub bedtime_override: bool,
    pub waketime_started: bool,
    pub worktime_override: bool,
    /// Reserved; no policy reads or sets it yet.
    pub sleeptime_override: bool,
}

impl PeriodState {
    /// State after evaluating `period`: flags owned by `period` are kept,
    /// all others are cleared.
    #[must_use]
    pub fn entering(self, period: Period) -> Self {
        let in_bedtime = period == Period::Bedtime;
        let in_day = matches!(period, Period::Wake | Period::Work);

        Self {
            bedtime_started: self.bedtime_started && in_bedtime,
            bedtime_override: self.bedtime_override && in_bedtime,
            waketime_started: self.waketime_started && period == Period::Wake,
            worktime_override: self.worktime_override && in_day,
            sleeptime_override: self.sleeptime_override && period == Period::Sleep,
        }
    }
}
