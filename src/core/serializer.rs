//! Single-consumer event queue.
//!
//! Producers (the ticker, the dial thread, the signal loop) never touch the
//! controller. They wrap each occurrence in an action closure and submit it
//! here. One consumer thread owns the state and runs the actions strictly in
//! arrival order, one at a time, so the state has a single writer without any
//! lock around it.
//!
//! The queue is a rendezvous channel: `submit` blocks until the consumer has
//! taken the event, so at most one action is in flight and producers are
//! throttled by a slow action instead of piling up stale work.

use std::io;
use std::sync::mpsc::{Receiver, SyncSender, sync_channel};
use std::thread::{self, JoinHandle};
use thiserror::Error;

/// Work submitted to the queue: runs once against the consumer-owned state.
pub type Action<S> = Box<dyn FnOnce(&mut S) -> anyhow::Result<()> + Send>;

struct Event<S> {
    label: &'static str,
    action: Action<S>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("event queue is closed")]
pub struct QueueClosed;

/// Producer handle. Cloned freely; the consumer stops once every clone is dropped.
pub struct EventSender<S> {
    tx: SyncSender<Event<S>>,
}

impl<S> Clone for EventSender<S> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
        }
    }
}

impl<S> EventSender<S> {
    /// Enqueue `action`, blocking until the consumer accepts it.
    pub fn submit<F>(&self, label: &'static str, action: F) -> Result<(), QueueClosed>
    where
        F: FnOnce(&mut S) -> anyhow::Result<()> + Send + 'static,
    {
        self.tx
            .send(Event {
                label,
                action: Box::new(action),
            })
            .map_err(|_| QueueClosed)
    }
}

/// Handle on the consumer thread.
pub struct EventSerializer<S> {
    handle: JoinHandle<S>,
}

impl<S: Send + 'static> EventSerializer<S> {
    /// Start the consumer thread owning `state`.
    pub fn spawn(state: S) -> io::Result<(EventSender<S>, Self)> {
        let (tx, rx) = sync_channel::<Event<S>>(0);
        let handle = thread::Builder::new()
            .name("event-serializer".to_string())
            .spawn(move || consume(rx, state))?;

        Ok((EventSender { tx }, Self { handle }))
    }

    /// Wait until every sender is dropped and the queue drains, then hand the
    /// state back. Fails only if an action panicked.
    pub fn join(self) -> thread::Result<S> {
        self.handle.join()
    }
}

fn consume<S>(rx: Receiver<Event<S>>, mut state: S) -> S {
    for event in rx {
        log_debug!("Handling event: {}", event.label);
        if let Err(error) = (event.action)(&mut state) {
            log_error!("{} failed: {error:#}", event.label);
        }
    }
    state
}
