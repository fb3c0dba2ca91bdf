//! In-memory player for tests.
//!
//! Keeps a simulated [`PlayerStatus`] that reacts to commands the way MPD
//! does and records every mutating command. Clones share state, so a test
//! can hand one clone to the controller and inspect the other.

use std::sync::{Arc, Mutex, MutexGuard};

use super::{PlayerBackend, PlayerError, PlayerStatus};
use crate::common::constants::MAXIMUM_VOLUME;

/// A mutating command as issued by the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayerCommand {
    Play,
    Stop,
    TogglePlayback,
    SetVolume(u8),
    AdjustVolume(i32),
    ClearPlaylist,
    EnqueueTrack(String),
}

#[derive(Debug, Default)]
struct Recorder {
    status: PlayerStatus,
    playlist: Vec<String>,
    commands: Vec<PlayerCommand>,
    status_queries: usize,
}

#[derive(Debug, Clone, Default)]
pub struct RecordingPlayer {
    inner: Arc<Mutex<Recorder>>,
}

impl RecordingPlayer {
    pub fn new(status: PlayerStatus) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Recorder {
                status,
                ..Recorder::default()
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Recorder> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn status(&self) -> PlayerStatus {
        self.lock().status.clone()
    }

    /// Simulate an outside change, e.g. someone pausing from another client.
    pub fn set_status(&self, status: PlayerStatus) {
        self.lock().status = status;
    }

    pub fn commands(&self) -> Vec<PlayerCommand> {
        self.lock().commands.clone()
    }

    /// Return and forget the commands recorded so far.
    pub fn take_commands(&self) -> Vec<PlayerCommand> {
        std::mem::take(&mut self.lock().commands)
    }

    pub fn playlist(&self) -> Vec<String> {
        self.lock().playlist.clone()
    }

    pub fn status_queries(&self) -> usize {
        self.lock().status_queries
    }

    fn apply(&self, command: PlayerCommand) {
        let mut guard = self.lock();
        let recorder = &mut *guard;
        let status = &mut recorder.status;
        match &command {
            PlayerCommand::Play => {
                status.is_playing = true;
                status.is_paused = false;
            }
            PlayerCommand::Stop => {
                status.is_playing = false;
                status.is_paused = false;
            }
            PlayerCommand::TogglePlayback => {
                let was_playing = status.is_playing;
                status.is_playing = !was_playing;
                status.is_paused = was_playing;
            }
            PlayerCommand::SetVolume(volume) => status.volume = (*volume).min(MAXIMUM_VOLUME),
            PlayerCommand::AdjustVolume(delta) => {
                let volume = (i32::from(status.volume) + delta).clamp(0, i32::from(MAXIMUM_VOLUME));
                status.volume = volume as u8;
            }
            PlayerCommand::ClearPlaylist => {
                recorder.playlist.clear();
                status.title.clear();
            }
            PlayerCommand::EnqueueTrack(uri) => {
                if recorder.playlist.is_empty() {
                    status.title = uri.clone();
                }
                recorder.playlist.push(uri.clone());
            }
        }
        recorder.commands.push(command);
    }
}

impl PlayerBackend for RecordingPlayer {
    fn play(&mut self) -> Result<(), PlayerError> {
        self.apply(PlayerCommand::Play);
        Ok(())
    }

    fn stop(&mut self) -> Result<(), PlayerError> {
        self.apply(PlayerCommand::Stop);
        Ok(())
    }

    fn toggle_playback(&mut self) -> Result<(), PlayerError> {
        self.apply(PlayerCommand::TogglePlayback);
        Ok(())
    }

    fn set_volume(&mut self, volume: u8) -> Result<(), PlayerError> {
        self.apply(PlayerCommand::SetVolume(volume));
        Ok(())
    }

    fn adjust_volume(&mut self, delta: i32) -> Result<(), PlayerError> {
        if delta != 0 {
            self.apply(PlayerCommand::AdjustVolume(delta));
        }
        Ok(())
    }

    fn clear_playlist(&mut self) -> Result<(), PlayerError> {
        self.apply(PlayerCommand::ClearPlaylist);
        Ok(())
    }

    fn enqueue_track(&mut self, uri: &str) -> Result<(), PlayerError> {
        self.apply(PlayerCommand::EnqueueTrack(uri.to_string()));
        Ok(())
    }

    fn query_status(&mut self) -> Result<PlayerStatus, PlayerError> {
        let mut recorder = self.lock();
        recorder.status_queries += 1;
        Ok(recorder.status.clone())
    }

    fn backend_name(&self) -> &'static str {
        "recording"
    }
}
