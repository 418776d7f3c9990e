//! Heartbeat: Dedicated thread that paces the frame loop.
//!
//! The heartbeat keeps ticking while the overlay is paused so that
//! resuming takes effect on the very next tick. Because it survives
//! pause, it must be shut down explicitly; dropping the handle signals
//! shutdown as well.

use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::info;

/// A tick event sent at regular intervals.
#[derive(Debug, Clone, Copy)]
pub struct Tick {
    /// Frame number (monotonically increasing).
    pub frame: u64,
    /// Time elapsed since the heartbeat was started.
    pub elapsed: Duration,
}

/// Cancellable repeating tick source.
pub struct Heartbeat {
    /// Handle to the ticker thread.
    handle: Option<JoinHandle<()>>,
    /// Flag to signal shutdown.
    shutdown: Arc<AtomicBool>,
    /// Receiver for tick events.
    tick_rx: Receiver<Tick>,
}

impl Heartbeat {
    /// Spawn a heartbeat with the given interval.
    ///
    /// # Panics
    ///
    /// Panics if the OS fails to spawn the ticker thread.
    pub fn spawn(interval: Duration) -> Self {
        let shutdown = Arc::new(AtomicBool::new(false));
        let shutdown_clone = shutdown.clone();

        // Small buffer: ticks must not queue up behind a slow frame
        let (tick_tx, tick_rx) = bounded(2);

        let handle = thread::Builder::new()
            .name("danmaku-heartbeat".to_string())
            .spawn(move || {
                Self::run_loop(&tick_tx, &shutdown_clone, interval);
            })
            .expect("Failed to spawn heartbeat thread");

        info!(interval_ms = interval.as_millis() as u64, "heartbeat started");

        Self {
            handle: Some(handle),
            shutdown,
            tick_rx,
        }
    }

    /// Get a reference to the tick receiver.
    #[inline]
    pub const fn receiver(&self) -> &Receiver<Tick> {
        &self.tick_rx
    }

    /// Wait up to `timeout` for the next tick.
    ///
    /// Returns `None` on timeout or once the ticker thread has stopped.
    pub fn wait(&self, timeout: Duration) -> Option<Tick> {
        match self.tick_rx.recv_timeout(timeout) {
            Ok(tick) => Some(tick),
            Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => None,
        }
    }

    /// Check whether the ticker thread is still running.
    pub fn is_alive(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Signal the heartbeat to stop.
    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::Relaxed);
    }

    /// Stop the heartbeat and wait for its thread to finish.
    pub fn join(mut self) {
        self.shutdown();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
        info!("heartbeat stopped");
    }

    /// Pace ticks on the grid `start + k * interval` until shut down.
    ///
    /// A tick that finds the channel full is thrown away. When the loop
    /// wakes a whole interval or more past its deadline, no catch-up
    /// ticks are fired; the grid is re-anchored on the current instant.
    fn run_loop(tick_tx: &Sender<Tick>, shutdown: &AtomicBool, interval: Duration) {
        let start = Instant::now();
        let mut deadline = start + interval;
        let mut frame = 0u64;

        while !shutdown.load(Ordering::Relaxed) {
            let now = Instant::now();
            match deadline.checked_duration_since(now).filter(|d| !d.is_zero()) {
                Some(remaining) => thread::sleep(remaining.min(SHUTDOWN_POLL)),
                None => {
                    let _ = tick_tx.try_send(Tick {
                        frame,
                        elapsed: now - start,
                    });
                    frame += 1;
                    deadline = next_deadline(deadline, now, interval);
                }
            }
        }
    }
}

/// Longest single sleep, so shutdown is noticed promptly.
const SHUTDOWN_POLL: Duration = Duration::from_millis(1);

/// Deadline after a tick that fired at `now` for `deadline`.
fn next_deadline(deadline: Instant, now: Instant, interval: Duration) -> Instant {
    if now.saturating_duration_since(deadline) >= interval {
        now + interval
    } else {
        deadline + interval
    }
}

impl Drop for Heartbeat {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl std::fmt::Debug for Heartbeat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Heartbeat")
            .field("alive", &self.is_alive())
            .finish_non_exhaustive()
    }
}
