//! Overlay events and the sinks that receive them.
//!
//! Events are fire-and-forget notifications for the host (UI chrome,
//! persistence, analytics). A sink must never block the frame loop.

use crate::comment::Comment;
use crossbeam_channel::Sender;

/// Notifications emitted by the overlay.
#[derive(Debug, Clone, PartialEq)]
pub enum DanmakuEvent {
    /// A comment arrived through the live `send` path.
    CommentSent(Comment),

    /// Overlay opacity was changed.
    OpacityChanged(f32),

    /// All in-flight comments were removed.
    Cleared,

    /// The overlay was hidden.
    Hidden,

    /// The overlay was shown again.
    Shown,
}

impl DanmakuEvent {
    /// Stable event name.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::CommentSent(_) => "comment_sent",
            Self::OpacityChanged(_) => "opacity_changed",
            Self::Cleared => "cleared",
            Self::Hidden => "hidden",
            Self::Shown => "shown",
        }
    }
}

/// Receives overlay events.
pub trait EventSink {
    /// Deliver one event.
    fn emit(&mut self, event: DanmakuEvent);
}

/// Discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&mut self, _event: DanmakuEvent) {}
}

/// Forwards events over a crossbeam channel.
///
/// Uses `try_send`: if the channel is full or the receiver has gone away
/// the event is dropped rather than stalling the frame.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    sender: Sender<DanmakuEvent>,
}

impl ChannelSink {
    /// Wrap a sender.
    pub const fn new(sender: Sender<DanmakuEvent>) -> Self {
        Self { sender }
    }
}

impl EventSink for ChannelSink {
    fn emit(&mut self, event: DanmakuEvent) {
        let _ = self.sender.try_send(event);
    }
}

/// Keeps every event in memory, in order.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    events: std::rc::Rc<std::cell::RefCell<Vec<DanmakuEvent>>>,
}

impl RecordingSink {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the events received so far.
    pub fn events(&self) -> Vec<DanmakuEvent> {
        self.events.borrow().clone()
    }

    /// Names of the events received so far.
    pub fn names(&self) -> Vec<&'static str> {
        self.events.borrow().iter().map(DanmakuEvent::name).collect()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: DanmakuEvent) {
        self.events.borrow_mut().push(event);
    }
}
