//! Core application logic: the schedule-driven controller.
//!
//! The [`Controller`] owns everything mutable: the player backend, the
//! period flags and the active settings. It never runs on a producer thread.
//! [`start`] moves it onto the event serializer's consumer thread and hands
//! back a [`ControllerHandle`] through which the ticker, the dial loop and the
//! signal loop submit work. Every tick, click, turn and reload is therefore
//! applied one at a time, in arrival order.
//!
//! Each evaluation re-resolves the schedule for "now", classifies the current
//! period and clears flags belonging to other periods before any policy runs.

pub mod period;
pub mod responder;
pub mod serializer;
pub mod ticker;

use std::io;
use std::sync::Arc;
use thiserror::Error;

use crate::{
    backend::{PlayerBackend, PlayerError},
    config::Config,
    core::{
        period::{Period, PeriodState, ScheduleConfig, ScheduleError, resolve},
        responder::{DialContext, DialResponder, responder_for},
        serializer::{EventSender, EventSerializer, QueueClosed},
    },
    io::dial::DialEvent,
    time::source::TimeSource,
};

#[derive(Debug, Error)]
pub enum ControllerError {
    #[error(transparent)]
    Schedule(#[from] ScheduleError),

    #[error(transparent)]
    Player(#[from] PlayerError),
}

/// Settings the policies read, taken from a validated [`Config`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicySettings {
    pub schedule: ScheduleConfig,
    pub stream: String,
    pub base_volume: u8,
    pub wake_volume: u8,
    pub volume_up_amount: u8,
    pub volume_down_amount: u8,
}

impl PolicySettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            schedule: config.schedule(),
            stream: config.stream().to_string(),
            base_volume: config.base_volume(),
            wake_volume: config.wake_volume(),
            volume_up_amount: config.volume_up_amount(),
            volume_down_amount: config.volume_down_amount(),
        }
    }
}

/// Schedule-driven state machine around a player.
pub struct Controller {
    player: Box<dyn PlayerBackend>,
    clock: Arc<dyn TimeSource>,
    responder: Box<dyn DialResponder>,
    settings: PolicySettings,
    state: PeriodState,
    // Last period written to the log; policy never reads it
    announced: Option<Period>,
}

impl Controller {
    pub fn new(
        player: Box<dyn PlayerBackend>,
        clock: Arc<dyn TimeSource>,
        config: &Config,
    ) -> Self {
        Self {
            player,
            clock,
            responder: responder_for(config.dial_mode()),
            settings: PolicySettings::from_config(config),
            state: PeriodState::default(),
            announced: None,
        }
    }

    pub fn state(&self) -> PeriodState {
        self.state
    }

    pub fn settings(&self) -> &PolicySettings {
        &self.settings
    }

    pub fn responder_name(&self) -> &'static str {
        self.responder.name()
    }

    /// Swap in reloaded settings. Period flags are kept, so a reload in the
    /// middle of bedtime does not restart the stream.
    pub fn apply_config(&mut self, config: &Config) {
        self.settings = PolicySettings::from_config(config);
        self.responder = responder_for(config.dial_mode());
        log_block_start!("Configuration reloaded");
        log_indented!("Schedule: {}", describe_schedule(&self.settings.schedule));
        log_indented!("Dial mode: {}", self.responder.name());
    }

    /// Classify "now" and clear flags of every other period.
    pub fn evaluate_period(&mut self) -> Result<Period, ControllerError> {
        let now = self.clock.now();
        let schedule = resolve(&self.settings.schedule, now)?;
        let period = schedule.classify(now);
        log_debug!("Resolved {schedule}");

        self.state = self.state.entering(period);

        if self.announced != Some(period) {
            log_block_start!("Entering {period} period");
            self.announced = Some(period);
        }
        Ok(period)
    }

    /// Run the policy of the current period once.
    pub fn handle_tick(&mut self) -> Result<Period, ControllerError> {
        let period = self.evaluate_period()?;
        if !period.is_active() {
            return Ok(period);
        }

        let status = self.player.query_status()?;
        log_debug!("Player status: {status}");

        match period {
            Period::Sleep => {
                if status.volume == 0 {
                    self.player.stop()?;
                } else if status.is_playing {
                    log_decorated!(
                        "Fading out: {}% -> {}%",
                        status.volume,
                        status.volume.saturating_sub(self.settings.volume_down_amount)
                    );
                    self.player
                        .adjust_volume(-i32::from(self.settings.volume_down_amount))?;
                }
            }
            Period::Bedtime => {
                if !self.state.bedtime_started {
                    log_decorated!(
                        "Starting bedtime stream at {}%",
                        self.settings.base_volume
                    );
                    self.start_stream(self.settings.base_volume)?;
                    self.state.bedtime_started = true;
                } else if status.is_paused && !self.state.bedtime_override {
                    log_decorated!("Resuming paused bedtime stream");
                    self.player.toggle_playback()?;
                }
            }
            Period::Work => {
                if status.is_playing && !self.state.worktime_override {
                    log_decorated!("Work time: stopping playback");
                    self.player.stop()?;
                }
            }
            Period::Wake => {
                if !self.state.waketime_started {
                    log_decorated!("Starting wake stream at {}%", self.settings.wake_volume);
                    self.start_stream(self.settings.wake_volume)?;
                    self.state.waketime_started = true;
                } else if status.volume <= self.settings.base_volume {
                    log_decorated!(
                        "Raising volume: {}% -> {}%",
                        status.volume,
                        status.volume.saturating_add(self.settings.volume_up_amount)
                    );
                    self.player
                        .adjust_volume(i32::from(self.settings.volume_up_amount))?;
                }
            }
            Period::Night => {}
        }

        Ok(period)
    }

    /// Stop whatever plays, queue the configured stream alone and start it at
    /// `volume`. An error leaves the sequence where it failed.
    fn start_stream(&mut self, volume: u8) -> Result<(), PlayerError> {
        self.player.stop()?;
        self.player.clear_playlist()?;
        self.player.enqueue_track(&self.settings.stream)?;
        self.player.set_volume(volume)?;
        self.player.play()
    }

    pub fn handle_dial_event(&mut self, event: DialEvent) -> Result<(), ControllerError> {
        match event {
            DialEvent::ClickDown => {
                log_debug!("Dial pressed");
                Ok(())
            }
            DialEvent::ClickUp => self.handle_click_up(),
            DialEvent::Turn {
                clockwise,
                magnitude,
            } => self.handle_turn(clockwise, magnitude),
        }
    }

    pub fn handle_click_up(&mut self) -> Result<(), ControllerError> {
        let period = self.evaluate_period()?;
        let mut context = DialContext {
            player: self.player.as_mut(),
            state: &mut self.state,
            period,
        };
        self.responder.click_up(&mut context)?;
        Ok(())
    }

    pub fn handle_turn(&mut self, clockwise: bool, magnitude: i32) -> Result<(), ControllerError> {
        log_debug!(
            "Dial turned {} ({magnitude})",
            if clockwise { "clockwise" } else { "counter-clockwise" }
        );
        self.responder
            .turn(self.player.as_mut(), clockwise, magnitude)?;
        Ok(())
    }

    /// Log the player's current status.
    pub fn log_player_status(&mut self) -> Result<(), ControllerError> {
        let status = self.player.query_status()?;
        log_decorated!("{} player: {status}", self.player.backend_name());
        Ok(())
    }
}

fn describe_schedule(schedule: &ScheduleConfig) -> String {
    format!(
        "wake {} | work {} | bedtime {} | sleep {} ({})",
        schedule.wake, schedule.work, schedule.bedtime, schedule.sleep, schedule.time_zone
    )
}

/// Producer-side handle on a running controller.
///
/// Each method wraps one occurrence into an action and blocks until the
/// consumer accepts it.
#[derive(Clone)]
pub struct ControllerHandle {
    sender: EventSender<Controller>,
}

impl ControllerHandle {
    pub fn tick(&self) -> Result<(), QueueClosed> {
        self.sender.submit("tick", |controller| {
            controller.handle_tick()?;
            Ok(())
        })
    }

    pub fn dial(&self, event: DialEvent) -> Result<(), QueueClosed> {
        self.sender.submit("dial event", move |controller| {
            controller.handle_dial_event(event)?;
            Ok(())
        })
    }

    pub fn reload(&self, config: Config) -> Result<(), QueueClosed> {
        self.sender.submit("reload", move |controller| {
            controller.apply_config(&config);
            Ok(())
        })
    }

    pub fn log_status(&self) -> Result<(), QueueClosed> {
        self.sender.submit("status", |controller| {
            controller.log_player_status()?;
            Ok(())
        })
    }
}

/// Move `controller` onto its own consumer thread.
pub fn start(
    controller: Controller,
) -> io::Result<(ControllerHandle, EventSerializer<Controller>)> {
    let (sender, serializer) = EventSerializer::spawn(controller)?;
    Ok((ControllerHandle { sender }, serializer))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::recording::{PlayerCommand, RecordingPlayer};
    use crate::backend::{MockPlayerBackend, PlayerStatus};
    use crate::time::source::ManualTimeSource;
    use chrono::{DateTime, TimeZone, Utc};
    use mockall::Sequence;

    const STREAM: &str = "http://radio.example/stream";

    fn test_config() -> Config {
        Config {
            wake_time: Some("06:00".to_string()),
            work_time: Some("09:00".to_string()),
            bedtime: Some("21:00".to_string()),
            sleep_time: Some("22:00".to_string()),
            time_zone: Some("UTC".to_string()),
            stream: Some(STREAM.to_string()),
            base_volume: Some(50),
            wake_volume: Some(40),
            volume_up_amount: Some(5),
            volume_down_amount: Some(10),
            ..Config::default()
        }
    }

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 14, hour, minute, 0).unwrap()
    }

    fn setup(
        start: DateTime<Utc>,
        status: PlayerStatus,
    ) -> (Controller, RecordingPlayer, Arc<ManualTimeSource>) {
        crate::common::logger::Log::set_enabled(false);
        let player = RecordingPlayer::new(status);
        let clock = Arc::new(ManualTimeSource::new(start));
        let controller = Controller::new(Box::new(player.clone()), clock.clone(), &test_config());
        (controller, player, clock)
    }

    fn playing(volume: u8) -> PlayerStatus {
        PlayerStatus {
            is_playing: true,
            volume,
            ..PlayerStatus::default()
        }
    }

    fn start_sequence(volume: u8) -> Vec<PlayerCommand> {
        vec![
            PlayerCommand::Stop,
            PlayerCommand::ClearPlaylist,
            PlayerCommand::EnqueueTrack(STREAM.to_string()),
            PlayerCommand::SetVolume(volume),
            PlayerCommand::Play,
        ]
    }

    fn player_failure() -> PlayerError {
        PlayerError::CommandFailed {
            command: "mpc add".into(),
            status: "exit status: 1".into(),
            output: "MPD error: connection refused".into(),
        }
    }

    #[test]
    fn test_night_issues_nothing() {
        let (mut controller, player, _) = setup(at(3, 0), playing(30));

        assert_eq!(controller.handle_tick().unwrap(), Period::Night);
        assert!(player.commands().is_empty());
        assert_eq!(player.status_queries(), 0);
    }

    #[test]
    fn test_bedtime_sequence_runs_once_per_visit() {
        let (mut controller, player, clock) = setup(at(21, 0), PlayerStatus::default());

        assert_eq!(controller.handle_tick().unwrap(), Period::Bedtime);
        assert_eq!(player.take_commands(), start_sequence(50));
        assert!(controller.state().bedtime_started);

        clock.set(at(21, 30));
        controller.handle_tick().unwrap();
        assert!(player.take_commands().is_empty());
    }

    #[test]
    fn test_bedtime_resumes_pause_unless_overridden() {
        let (mut controller, player, _) = setup(at(21, 5), PlayerStatus::default());
        controller.handle_tick().unwrap();
        player.take_commands();

        player.set_status(PlayerStatus {
            is_paused: true,
            volume: 50,
            ..PlayerStatus::default()
        });
        controller.handle_tick().unwrap();
        assert_eq!(player.take_commands(), vec![PlayerCommand::TogglePlayback]);

        // Click stops it and holds off the auto-resume
        controller.handle_click_up().unwrap();
        assert_eq!(player.take_commands(), vec![PlayerCommand::Stop]);
        assert!(controller.state().bedtime_override);

        player.set_status(PlayerStatus {
            is_paused: true,
            volume: 50,
            ..PlayerStatus::default()
        });
        controller.handle_tick().unwrap();
        assert!(player.take_commands().is_empty());
    }

    #[test]
    fn test_bedtime_failure_retries_full_sequence() {
        crate::common::logger::Log::set_enabled(false);
        let clock = Arc::new(ManualTimeSource::new(at(21, 0)));
        let mut mock = MockPlayerBackend::new();
        let mut seq = Sequence::new();

        // First tick fails at enqueue
        mock.expect_query_status()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|| Ok(PlayerStatus::default()));
        mock.expect_stop()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|| Ok(()));
        mock.expect_clear_playlist()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|| Ok(()));
        mock.expect_enqueue_track()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Err(player_failure()));

        // Second tick runs the whole sequence again
        mock.expect_query_status()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|| Ok(PlayerStatus::default()));
        mock.expect_stop()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|| Ok(()));
        mock.expect_clear_playlist()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|| Ok(()));
        mock.expect_enqueue_track()
            .withf(|uri| uri == STREAM)
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));
        mock.expect_set_volume()
            .withf(|volume| *volume == 50)
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));
        mock.expect_play()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|| Ok(()));

        let mut controller = Controller::new(Box::new(mock), clock, &test_config());

        assert!(matches!(
            controller.handle_tick(),
            Err(ControllerError::Player(PlayerError::CommandFailed { .. }))
        ));
        assert!(!controller.state().bedtime_started);

        controller.handle_tick().unwrap();
        assert!(controller.state().bedtime_started);
    }

    #[test]
    fn test_leaving_bedtime_clears_its_flags() {
        let (mut controller, player, clock) = setup(at(21, 0), PlayerStatus::default());
        controller.handle_tick().unwrap();
        controller.handle_click_up().unwrap();
        assert!(controller.state().bedtime_started);
        assert!(controller.state().bedtime_override);

        clock.set(at(22, 0));
        player.take_commands();
        assert_eq!(controller.handle_tick().unwrap(), Period::Sleep);
        assert!(!controller.state().bedtime_started);
        assert!(!controller.state().bedtime_override);
    }

    #[test]
    fn test_wake_ramps_until_past_base_volume() {
        let (mut controller, player, clock) = setup(at(6, 0), PlayerStatus::default());

        assert_eq!(controller.handle_tick().unwrap(), Period::Wake);
        assert_eq!(player.take_commands(), start_sequence(40));

        // 40 -> 45 -> 50 -> 55, then 55 > 50 stops the ramp
        let mut volumes = Vec::new();
        for minute in 1..=5 {
            clock.set(at(6, minute));
            controller.handle_tick().unwrap();
            volumes.push(player.status().volume);
        }
        assert_eq!(volumes, vec![45, 50, 55, 55, 55]);
        assert_eq!(
            player.take_commands(),
            vec![PlayerCommand::AdjustVolume(5); 3]
        );
    }

    #[test]
    fn test_work_stops_playback_without_override() {
        let (mut controller, player, _) = setup(at(9, 0), playing(50));

        assert_eq!(controller.handle_tick().unwrap(), Period::Work);
        assert_eq!(player.take_commands(), vec![PlayerCommand::Stop]);

        controller.handle_tick().unwrap();
        assert!(player.take_commands().is_empty());
    }

    #[test]
    fn test_click_during_wake_keeps_music_through_work() {
        let (mut controller, player, clock) = setup(at(6, 0), PlayerStatus::default());
        controller.handle_tick().unwrap();

        // The click stops the wake stream and arms the override
        controller.handle_click_up().unwrap();
        assert!(controller.state().worktime_override);
        assert!(!player.status().is_playing);

        // Music started again later from another client
        player.set_status(playing(60));
        player.take_commands();
        clock.set(at(9, 30));
        assert_eq!(controller.handle_tick().unwrap(), Period::Work);
        assert!(player.take_commands().is_empty());
        assert!(controller.state().worktime_override);

        clock.set(at(21, 0));
        controller.handle_tick().unwrap();
        assert!(!controller.state().worktime_override);
    }

    #[test]
    fn test_sleep_fades_then_stops() {
        let (mut controller, player, clock) = setup(at(22, 0), playing(20));

        for minute in 0..3 {
            clock.set(at(22, minute));
            assert_eq!(controller.handle_tick().unwrap(), Period::Sleep);
        }
        assert_eq!(
            player.take_commands(),
            vec![
                PlayerCommand::AdjustVolume(-10),
                PlayerCommand::AdjustVolume(-10),
                PlayerCommand::Stop,
            ]
        );
    }

    #[test]
    fn test_sleep_tick_with_unreadable_volume_leaves_player_alone() {
        crate::common::logger::Log::set_enabled(false);
        let clock = Arc::new(ManualTimeSource::new(at(22, 0)));
        let mut mock = MockPlayerBackend::new();
        // No other expectation: any stop or volume change fails the test
        mock.expect_query_status().times(1).returning(|| {
            crate::backend::parse_status(
                "KEXP\n[playing] #1/1   3:12/0:00 (0%)\nvolume: n/a   repeat: off\n",
            )
        });

        let mut controller = Controller::new(Box::new(mock), clock, &test_config());

        assert!(matches!(
            controller.handle_tick(),
            Err(ControllerError::Player(PlayerError::Parse { .. }))
        ));
    }

    #[test]
    fn test_sleep_click_toggles_without_override() {
        let (mut controller, player, _) = setup(at(23, 0), playing(20));

        controller.handle_click_up().unwrap();
        assert_eq!(player.take_commands(), vec![PlayerCommand::Stop]);
        controller.handle_click_up().unwrap();
        assert_eq!(player.take_commands(), vec![PlayerCommand::Play]);
        assert_eq!(controller.state(), PeriodState::default());
    }

    #[test]
    fn test_midnight_rollover_reanchors_schedule() {
        let (mut controller, player, clock) = setup(at(23, 59), playing(20));
        assert_eq!(controller.handle_tick().unwrap(), Period::Sleep);

        clock.set(Utc.with_ymd_and_hms(2024, 5, 15, 0, 0, 30).unwrap());
        assert_eq!(controller.handle_tick().unwrap(), Period::Night);

        player.set_status(PlayerStatus::default());
        player.take_commands();
        clock.set(Utc.with_ymd_and_hms(2024, 5, 15, 6, 0, 0).unwrap());
        assert_eq!(controller.handle_tick().unwrap(), Period::Wake);
        assert_eq!(player.take_commands(), start_sequence(40));
    }

    #[test]
    fn test_click_down_is_ignored_and_turn_steps_one() {
        let (mut controller, player, _) = setup(at(12, 0), playing(30));

        controller.handle_dial_event(DialEvent::ClickDown).unwrap();
        controller
            .handle_dial_event(DialEvent::Turn {
                clockwise: true,
                magnitude: 4,
            })
            .unwrap();
        controller
            .handle_dial_event(DialEvent::Turn {
                clockwise: false,
                magnitude: -2,
            })
            .unwrap();

        assert_eq!(
            player.commands(),
            vec![PlayerCommand::AdjustVolume(1), PlayerCommand::AdjustVolume(-1)]
        );
    }

    #[test]
    fn test_basic_mode_click_ignores_schedule() {
        crate::common::logger::Log::set_enabled(false);
        let player = RecordingPlayer::new(playing(50));
        let clock = Arc::new(ManualTimeSource::new(at(21, 30)));
        let config = Config {
            dial_mode: Some("basic".to_string()),
            ..test_config()
        };
        let mut controller = Controller::new(Box::new(player.clone()), clock, &config);
        assert_eq!(controller.responder_name(), "basic");

        controller.handle_click_up().unwrap();
        assert_eq!(player.commands(), vec![PlayerCommand::Stop]);
        assert!(!controller.state().bedtime_override);
    }

    #[test]
    fn test_reload_keeps_flags_and_applies_settings() {
        let (mut controller, player, _) = setup(at(21, 0), PlayerStatus::default());
        controller.handle_tick().unwrap();
        player.take_commands();

        let reloaded = Config {
            base_volume: Some(70),
            dial_mode: Some("basic".to_string()),
            ..test_config()
        };
        controller.apply_config(&reloaded);

        assert!(controller.state().bedtime_started);
        assert_eq!(controller.settings().base_volume, 70);
        assert_eq!(controller.responder_name(), "basic");
        controller.handle_tick().unwrap();
        assert!(player.take_commands().is_empty());
    }

    #[test]
    fn test_invalid_schedule_is_reported() {
        let (mut controller, player, _) = setup(at(12, 0), PlayerStatus::default());
        let broken = Config {
            sleep_time: Some("20:00".to_string()),
            ..test_config()
        };
        controller.apply_config(&broken);

        assert!(matches!(
            controller.handle_tick(),
            Err(ControllerError::Schedule(ScheduleError::SleepBeforeBedtime { .. }))
        ));
        assert!(player.commands().is_empty());
    }

    #[test]
    fn test_handle_serializes_producers() {
        let (controller, player, _) = setup(at(21, 0), PlayerStatus::default());
        let (handle, serializer) = start(controller).unwrap();

        handle.tick().unwrap();
        handle
            .dial(DialEvent::Turn {
                clockwise: true,
                magnitude: 1,
            })
            .unwrap();
        handle.tick().unwrap();
        drop(handle);

        let controller = serializer.join().unwrap();
        assert!(controller.state().bedtime_started);
        let mut expected = start_sequence(50);
        expected.push(PlayerCommand::AdjustVolume(1));
        assert_eq!(player.commands(), expected);
    }
}
