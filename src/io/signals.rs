//! Unix signal handling.
//!
//! A dedicated thread iterates signal-hook's [`Signals`] and turns each
//! delivery into a [`SignalMessage`] on a channel. The main thread blocks on
//! that channel; it never runs controller logic itself, it only forwards
//! reload requests into the event queue and shuts down on termination.

use anyhow::{Context, Result};
use signal_hook::{
    consts::signal::{SIGHUP, SIGINT, SIGTERM, SIGUSR2},
    iterator::Signals,
};
use std::{
    sync::Arc,
    sync::atomic::{AtomicBool, Ordering},
    sync::mpsc::{Receiver, Sender, channel},
    thread,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalMessage {
    /// Re-read the configuration file (SIGUSR2)
    Reload,
    /// Stop the process (SIGTERM, SIGINT, SIGHUP)
    Shutdown,
}

/// Signal handling state shared between threads
pub struct SignalState {
    /// Cleared once a shutdown signal arrives; the ticker watches it
    pub running: Arc<AtomicBool>,
    pub signal_receiver: Receiver<SignalMessage>,
}

/// Map a raw signal number to the message it produces.
pub fn classify_signal(signal: i32) -> Option<SignalMessage> {
    match signal {
        SIGUSR2 => Some(SignalMessage::Reload),
        SIGINT | SIGTERM | SIGHUP => Some(SignalMessage::Shutdown),
        _ => None,
    }
}

/// Register handlers and start the signal thread.
pub fn setup_signal_handler() -> Result<SignalState> {
    let running = Arc::new(AtomicBool::new(true));
    let (signal_sender, signal_receiver) = channel::<SignalMessage>();

    let mut signals = Signals::new([SIGINT, SIGTERM, SIGHUP, SIGUSR2])
        .context("failed to register signal handlers")?;

    let running_clone = Arc::clone(&running);
    thread::Builder::new()
        .name("signals".to_string())
        .spawn(move || {
            for signal in signals.forever() {
                if !forward_signal(signal, &running_clone, &signal_sender) {
                    break;
                }
            }
        })
        .context("failed to spawn signal handler thread")?;

    Ok(SignalState {
        running,
        signal_receiver,
    })
}

/// Handle one delivery. Returns false once the listener should stop.
fn forward_signal(signal: i32, running: &AtomicBool, sender: &Sender<SignalMessage>) -> bool {
    let Some(message) = classify_signal(signal) else {
        return true;
    };

    match message {
        SignalMessage::Reload => {
            log_pipe!();
            log_info!("Received configuration reload request");
        }
        SignalMessage::Shutdown => {
            log_pipe!();
            log_info!("Received shutdown signal ({signal})");
            running.store(false, Ordering::SeqCst);
        }
    }

    sender.send(message).is_ok() && message != SignalMessage::Shutdown
}
