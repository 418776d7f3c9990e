//! Render scheduler: Running/Paused state plus the heartbeat it owns.

use super::heartbeat::{Heartbeat, Tick};
use std::time::Duration;
use tracing::debug;

/// Dispatch state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackState {
    /// Due comments are dispatched every tick.
    #[default]
    Running,
    /// Ticks keep arriving but nothing is dispatched.
    Paused,
}

/// Frame loop state machine.
///
/// `pause` stops dispatch, not ticking. Only [`RenderScheduler::destroy`]
/// stops the heartbeat.
#[derive(Debug)]
pub struct RenderScheduler {
    state: PlaybackState,
    interval: Duration,
    heartbeat: Option<Heartbeat>,
    frames: u64,
    destroyed: bool,
}

impl RenderScheduler {
    /// Create a scheduler in the `Running` state with no heartbeat yet.
    pub const fn new(interval: Duration) -> Self {
        Self {
            state: PlaybackState::Running,
            interval,
            heartbeat: None,
            frames: 0,
            destroyed: false,
        }
    }

    /// Current state.
    #[inline]
    pub const fn state(&self) -> PlaybackState {
        self.state
    }

    /// Whether dispatch is enabled.
    #[inline]
    pub const fn is_running(&self) -> bool {
        matches!(self.state, PlaybackState::Running) && !self.destroyed
    }

    /// Whether `destroy` has been called.
    #[inline]
    pub const fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    /// Whether a heartbeat thread is registered.
    #[inline]
    pub const fn is_ticking(&self) -> bool {
        self.heartbeat.is_some()
    }

    /// Frames run so far.
    #[inline]
    pub const fn frames(&self) -> u64 {
        self.frames
    }

    /// Enter `Running`.
    pub const fn play(&mut self) {
        self.state = PlaybackState::Running;
    }

    /// Enter `Paused`.
    pub const fn pause(&mut self) {
        self.state = PlaybackState::Paused;
    }

    /// Register the heartbeat. Idempotent; a no-op after `destroy`.
    pub fn start(&mut self) {
        if self.destroyed || self.heartbeat.is_some() {
            return;
        }
        self.heartbeat = Some(Heartbeat::spawn(self.interval));
    }

    /// Block until the next heartbeat tick or `timeout`.
    ///
    /// Returns `None` when no heartbeat is registered, on timeout, or
    /// after `destroy`.
    pub fn wait_tick(&self, timeout: Duration) -> Option<Tick> {
        self.heartbeat.as_ref()?.wait(timeout)
    }

    /// Count a completed frame.
    pub const fn record_frame(&mut self) {
        self.frames += 1;
    }

    /// Cancel the heartbeat and join its thread. Permanent.
    pub fn destroy(&mut self) {
        if let Some(heartbeat) = self.heartbeat.take() {
            heartbeat.join();
        }
        self.destroyed = true;
        debug!(frames = self.frames, "scheduler destroyed");
    }
}
