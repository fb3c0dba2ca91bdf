//! Periodic tick producer.
//!
//! The first tick fires as soon as the thread starts so the player reaches
//! the right state at startup instead of one interval later. Sleeping goes
//! through the [`TimeSource`], which lets tests run many ticks instantly.

use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::time::source::TimeSource;

/// Start the ticker thread.
///
/// `on_tick` returns `false` when its consumer is gone; the thread then
/// exits. It also exits once `running` is cleared.
pub fn spawn_ticker<F>(
    interval: Duration,
    clock: Arc<dyn TimeSource>,
    running: Arc<AtomicBool>,
    on_tick: F,
) -> io::Result<JoinHandle<()>>
where
    F: FnMut() -> bool + Send + 'static,
{
    thread::Builder::new()
        .name("ticker".to_string())
        .spawn(move || run_ticker(interval, clock.as_ref(), &running, on_tick))
}

fn run_ticker(
    interval: Duration,
    clock: &dyn TimeSource,
    running: &AtomicBool,
    mut on_tick: impl FnMut() -> bool,
) {
    while running.load(Ordering::SeqCst) {
        if !on_tick() {
            log_debug!("Tick consumer gone, stopping ticker");
            break;
        }
        clock.sleep(interval);
    }
}
