//! Dial behaviour: what a click or a turn does.
//!
//! Two responders exist. [`BasicDialResponder`] ignores the schedule: a click
//! toggles playback and a turn nudges the volume. [`ScheduleAwareDialResponder`]
//! wraps a basic responder and adds period-specific click handling (bedtime
//! and work overrides), delegating everything else to it.

use crate::backend::{PlayerBackend, PlayerError};
use crate::config::DialMode;
use crate::core::period::{Period, PeriodState};

/// Everything a click handler may touch, borrowed from the controller for
/// the duration of one event.
pub struct DialContext<'a> {
    pub player: &'a mut dyn PlayerBackend,
    pub state: &'a mut PeriodState,
    /// Period the click was classified into.
    pub period: Period,
}

pub trait DialResponder: Send {
    fn name(&self) -> &'static str;

    fn click_up(&self, context: &mut DialContext<'_>) -> Result<(), PlayerError>;

    /// Nudge the volume one unit in the turn direction. The reported
    /// magnitude is dropped so every dial model feels the same.
    fn turn(
        &self,
        player: &mut dyn PlayerBackend,
        clockwise: bool,
        _magnitude: i32,
    ) -> Result<(), PlayerError> {
        player.adjust_volume(if clockwise { 1 } else { -1 })
    }
}

/// Build the responder selected by the configuration.
pub fn responder_for(mode: DialMode) -> Box<dyn DialResponder> {
    match mode {
        DialMode::Basic => Box::new(BasicDialResponder),
        DialMode::Schedule => Box::new(ScheduleAwareDialResponder::default()),
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct BasicDialResponder;

impl BasicDialResponder {
    /// Stop when playing, otherwise play. Decided from a fresh status query
    /// rather than the player's own toggle so an externally paused or
    /// stopped player ends up in the state the listener expects.
    fn hard_toggle(&self, player: &mut dyn PlayerBackend) -> Result<(), PlayerError> {
        let status = player.query_status()?;
        if status.is_playing {
            log_decorated!("Click: stopping playback");
            player.stop()
        } else {
            log_decorated!("Click: starting playback");
            player.play()
        }
    }
}

impl DialResponder for BasicDialResponder {
    fn name(&self) -> &'static str {
        "basic"
    }

    fn click_up(&self, context: &mut DialContext<'_>) -> Result<(), PlayerError> {
        self.hard_toggle(context.player)
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct ScheduleAwareDialResponder {
    basic: BasicDialResponder,
}

impl DialResponder for ScheduleAwareDialResponder {
    fn name(&self) -> &'static str {
        "schedule"
    }

    fn click_up(&self, context: &mut DialContext<'_>) -> Result<(), PlayerError> {
        match context.period {
            Period::Sleep => self.basic.hard_toggle(context.player),
            Period::Bedtime => {
                let status = context.player.query_status()?;
                // Stopping by hand holds off the auto-resume until bedtime ends
                if status.is_playing {
                    context.state.bedtime_override = true;
                    log_decorated!("Click: stopping bedtime stream, auto-resume held");
                    context.player.stop()
                } else {
                    context.state.bedtime_override = false;
                    log_decorated!("Click: starting bedtime stream, auto-resume restored");
                    context.player.play()
                }
            }
            Period::Wake => {
                context.state.worktime_override = !context.state.worktime_override;
                if context.state.worktime_override {
                    log_decorated!("Work auto-stop cancelled for today");
                } else {
                    log_decorated!("Work auto-stop restored");
                }
                self.basic.click_up(context)
            }
            Period::Work | Period::Night => self.basic.click_up(context),
        }
    }
}
