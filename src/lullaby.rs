//! Application coordinator that manages the complete lifecycle of lullaby.
//!
//! This module handles resource acquisition and starts the threads around
//! the controller:
//! - Configuration loading
//! - Lock file management for single-instance enforcement
//! - Signal handler setup
//! - Controller, event serializer and player backend
//! - Dial reader thread and ticker thread
//!
//! The main thread then only waits for signals. Reload requests are read from
//! disk here and forwarded into the event queue; shutdown returns from
//! [`Lullaby::run`].

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;

use crate::{
    backend::create_backend,
    common::logger::Log,
    config::{self, Config},
    core::{Controller, ControllerHandle, ticker::spawn_ticker},
    io::dial::{DialError, run_dial_loop},
    io::lock::{LockFile, default_lock_path},
    io::signals::{SignalMessage, SignalState, setup_signal_handler},
    time::source::{RealTimeSource, TimeSource},
};

/// Builder for configuring and running the lullaby daemon.
///
/// ```no_run
/// use lullaby::Lullaby;
///
/// # fn main() -> anyhow::Result<()> {
/// // Normal startup with the default configuration file
/// Lullaby::new(None).run()?;
/// # Ok(())
/// # }
/// ```
pub struct Lullaby {
    config_path: Option<PathBuf>,
}

impl Lullaby {
    /// Create a runner. `config_path` overrides the default file location.
    pub fn new(config_path: Option<PathBuf>) -> Self {
        Self { config_path }
    }

    /// Run until a shutdown signal arrives.
    ///
    /// Configuration, lock and thread start-up failures are returned before
    /// the event loop begins. After that, nothing but a signal ends the run.
    pub fn run(self) -> Result<()> {
        log_version!();

        let (config, config_path) = config::load(self.config_path.as_deref())?;
        Log::set_debug(config.debug());
        if config.debug() {
            log_pipe!();
            log_debug!("Debug mode enabled - logging every player command");
        }
        config.log_config(&config_path);

        let interval = config
            .ticker_interval()
            .context("Invalid ticker interval")?;

        let _lock = LockFile::acquire(&default_lock_path())?;
        log_block_start!("Lock acquired, starting lullaby...");

        let signal_state = setup_signal_handler()?;
        let clock: Arc<dyn TimeSource> = Arc::new(RealTimeSource);

        let player = create_backend(&config);
        log_decorated!("Player backend: {}", player.backend_name());
        let controller = Controller::new(player, Arc::clone(&clock), &config);
        let (handle, _serializer) =
            crate::core::start(controller).context("failed to start the event serializer")?;

        spawn_dial_thread(config.dial_file(), handle.clone())?;

        let ticker_handle = handle.clone();
        spawn_ticker(
            interval,
            clock,
            Arc::clone(&signal_state.running),
            move || ticker_handle.tick().is_ok(),
        )
        .context("failed to spawn the ticker thread")?;

        wait_for_signals(&signal_state, &handle, &config_path, config);

        // The dial thread blocks on the device for the life of the process and
        // still holds a sender, so the serializer is left to die with it.
        log_block_start!("Shutting down");
        log_end!();
        Ok(())
    }
}

/// Start the thread that owns the dial device.
///
/// Opening happens on that thread; a missing device only disables dial
/// input, the schedule keeps running.
fn spawn_dial_thread(path: PathBuf, handle: ControllerHandle) -> Result<()> {
    thread::Builder::new()
        .name("dial".to_string())
        .spawn(move || {
            if handle.log_status().is_err() {
                return;
            }

            let result = run_dial_loop(&path, |event| {
                if handle.dial(event).is_err() {
                    log_debug!("Event queue closed, dropping dial event");
                }
            });

            match result {
                Err(error @ DialError::Open { .. }) => {
                    log_pipe!();
                    log_warning!("{error}");
                    log_indented!("Dial input disabled; the schedule keeps running");
                }
                Err(error) => {
                    log_pipe!();
                    log_error!("{error}");
                    log_indented!("Dial input disabled; the schedule keeps running");
                }
                Ok(()) => {}
            }
        })
        .context("failed to spawn the dial thread")?;
    Ok(())
}

/// Block on the signal channel until shutdown.
fn wait_for_signals(
    signal_state: &SignalState,
    handle: &ControllerHandle,
    config_path: &Path,
    mut current: Config,
) {
    while let Ok(message) = signal_state.signal_receiver.recv() {
        match message {
            SignalMessage::Shutdown => break,
            SignalMessage::Reload => match config::load_from_path(config_path) {
                Ok(reloaded) => {
                    for key in current.restart_required_changes(&reloaded) {
                        log_warning!("Change to '{key}' takes effect after a restart");
                    }
                    Log::set_debug(reloaded.debug());
                    if handle.reload(reloaded.clone()).is_err() {
                        log_error!("Event queue closed, stopping");
                        break;
                    }
                    current = reloaded;
                }
                Err(error) => {
                    log_error!("Reload failed, keeping the running configuration: {error:#}");
                }
            },
        }
    }
}
