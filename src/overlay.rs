//! Overlay: The live comment controller.
//!
//! The overlay is the entry point for hosts. It owns the feed, the lane
//! allocator, the lifecycle of in-flight comments and the frame
//! scheduler, and talks to the outside world through a
//! [`RenderSurface`], an [`EventSink`] and two clocks.
//!
//! All state is mutated from the host thread only: either directly
//! through the API below or from [`Overlay::frame`], which the host runs
//! once per heartbeat tick (see [`Overlay::pump`]).

use crate::comment::{sanitize, Comment};
use crate::config::{DanmakuConfig, ScrollSpeed};
use crate::error::ConfigError;
use crate::event::{DanmakuEvent, EventSink, NullSink};
use crate::feed::{FeedMode, TimelineFeed};
use crate::lane::{LaneAllocator, LaneSet};
use crate::layout::Geometry;
use crate::lifecycle::{CommentLifecycle, VisualItem};
use crate::measure::{ColumnMeasurer, TextMeasurer};
use crate::scheduler::{Clock, PlaybackClock, RenderScheduler, SystemClock};
use crate::surface::{ElementSpec, RenderSurface};
use std::time::Duration;
use tracing::{debug, trace, warn};

/// What a single frame did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameReport {
    /// Items whose display time ran out.
    pub retired: usize,
    /// Comments placed on the surface.
    pub dispatched: usize,
    /// Comments that found no lane.
    pub dropped: usize,
}

/// The live comment overlay.
pub struct Overlay<S: RenderSurface> {
    /// Configuration.
    config: DanmakuConfig,
    /// Comment sequence and cursor.
    feed: TimelineFeed,
    /// Lane occupancy and policy.
    allocator: LaneAllocator,
    /// In-flight items.
    lifecycle: CommentLifecycle,
    /// Running/paused state and heartbeat.
    scheduler: RenderScheduler,
    /// Text width source.
    measurer: Box<dyn TextMeasurer>,
    /// Where elements are drawn.
    surface: S,
    /// Event notifications.
    events: Box<dyn EventSink>,
    /// Stage clock (animation and expiry).
    clock: Box<dyn Clock>,
    /// Media playback clock (timestamped drain).
    playback: Box<dyn PlaybackClock>,
    /// Geometry snapshot from the last allocation or resize.
    geometry: Geometry,
    /// Whether the overlay is visible.
    showing: bool,
    /// Current opacity.
    opacity: f32,
}

impl<S: RenderSurface> Overlay<S> {
    /// Create an overlay drawing onto `surface`.
    ///
    /// Uses wall-clock time for both clocks, a column measurer and no
    /// event sink; replace them with the `with_*` builders.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration does not validate.
    pub fn new(config: DanmakuConfig, surface: S) -> Result<Self, ConfigError> {
        config.validate()?;

        let geometry = Geometry::new(surface.width(), surface.height(), config.item_height);
        Ok(Self {
            feed: TimelineFeed::new(config.mode),
            allocator: LaneAllocator::new(config.allocator_settings()),
            lifecycle: CommentLifecycle::new(),
            scheduler: RenderScheduler::new(config.frame_interval()),
            measurer: Box::new(ColumnMeasurer::default()),
            surface,
            events: Box::new(NullSink),
            clock: Box::new(SystemClock::new()),
            playback: Box::new(SystemClock::new()),
            geometry,
            showing: config.show,
            opacity: config.opacity,
            config,
        })
    }

    /// Builder: use `clock` as the stage clock.
    #[must_use]
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    /// Builder: use `playback` as the media clock for timestamped drain.
    #[must_use]
    pub fn with_playback(mut self, playback: impl PlaybackClock + 'static) -> Self {
        self.playback = Box::new(playback);
        self
    }

    /// Builder: use `measurer` for text widths.
    #[must_use]
    pub fn with_measurer(mut self, measurer: impl TextMeasurer + 'static) -> Self {
        self.measurer = Box::new(measurer);
        self
    }

    /// Builder: deliver events to `sink`.
    #[must_use]
    pub fn with_events(mut self, sink: impl EventSink + 'static) -> Self {
        self.events = Box::new(sink);
        self
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    /// The configuration the overlay was built with.
    pub const fn config(&self) -> &DanmakuConfig {
        &self.config
    }

    /// The comment feed.
    pub const fn feed(&self) -> &TimelineFeed {
        &self.feed
    }

    /// Lane occupancy.
    pub const fn lanes(&self) -> &LaneSet {
        self.allocator.lanes()
    }

    /// The rendering surface.
    pub const fn surface(&self) -> &S {
        &self.surface
    }

    /// Mutable access to the rendering surface (painting, resizing).
    pub const fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    /// Geometry snapshot in use.
    pub const fn geometry(&self) -> Geometry {
        self.geometry
    }

    /// Number of comments currently displayed.
    pub fn in_flight(&self) -> usize {
        self.lifecycle.len()
    }

    /// Comments currently displayed, in creation order.
    pub fn items(&self) -> impl Iterator<Item = &VisualItem> {
        self.lifecycle.iter()
    }

    /// Whether dispatch is paused.
    pub const fn is_paused(&self) -> bool {
        !self.scheduler.is_running()
    }

    /// Whether the overlay is visible.
    pub const fn is_showing(&self) -> bool {
        self.showing
    }

    /// Whether unlimited mode is on.
    pub const fn is_unlimited(&self) -> bool {
        self.allocator.settings().unlimited
    }

    /// Whether `destroy` has been called.
    pub const fn is_destroyed(&self) -> bool {
        self.scheduler.is_destroyed()
    }

    /// Whether the heartbeat thread is registered.
    pub const fn is_ticking(&self) -> bool {
        self.scheduler.is_ticking()
    }

    /// Frames run so far.
    pub const fn frames(&self) -> u64 {
        self.scheduler.frames()
    }

    /// Current stage time.
    pub fn now(&self) -> f64 {
        self.clock.now()
    }

    // ------------------------------------------------------------------
    // Ingestion
    // ------------------------------------------------------------------

    /// Show a comment immediately (live path).
    ///
    /// The comment is inserted at the feed cursor regardless of its
    /// timestamp, its text is sanitized, and it gets the configured
    /// border unless it carries one already. In a timestamped feed it is
    /// stamped with the current playback time. A `comment_sent` event with
    /// the comment as received follows.
    pub fn send(&mut self, comment: Comment) {
        if self.is_destroyed() {
            return;
        }

        let mut shown = comment.clone();
        shown.text = sanitize(&shown.text);
        if shown.border.is_none() {
            shown.border = Some(format!("2px solid {}", self.config.border_color));
        }
        if self.feed.mode() == FeedMode::Timestamped {
            shown.timestamp = self.playback.current_time();
        }

        self.feed.send(shown.clone());
        self.retire_expired();
        self.draw(vec![shown]);

        self.events.emit(DanmakuEvent::CommentSent(comment));
    }

    /// Replace the feed with a timestamped set of comments.
    ///
    /// Display state is cleared and the cursor is placed at the current
    /// playback time, so only comments from here on are dispatched.
    pub fn load(&mut self, comments: Vec<Comment>) {
        if self.is_destroyed() {
            return;
        }
        self.clear_display();
        self.feed.load(comments);
        self.feed.seek_to(self.playback.current_time());
        debug!(count = self.feed.len(), cursor = self.feed.cursor(), "feed loaded");
    }

    /// Empty the feed and all display state, ready for a new context.
    pub fn reload(&mut self) {
        if self.is_destroyed() {
            return;
        }
        self.feed.reset();
        self.clear();
        debug!("overlay reloaded");
    }

    // ------------------------------------------------------------------
    // Playback control
    // ------------------------------------------------------------------

    /// Resume dispatch.
    pub const fn play(&mut self) {
        if self.is_destroyed() {
            return;
        }
        self.scheduler.play();
    }

    /// Suspend dispatch. The heartbeat keeps ticking.
    pub const fn pause(&mut self) {
        if self.is_destroyed() {
            return;
        }
        self.scheduler.pause();
    }

    /// Drop everything on screen and reposition the cursor.
    ///
    /// Live feeds skip to the live edge: history is never replayed.
    /// Timestamped feeds move to the current playback time.
    pub fn seek(&mut self) {
        if self.is_destroyed() {
            return;
        }
        self.clear();
        match self.feed.mode() {
            FeedMode::Live => self.feed.skip_to_end(),
            FeedMode::Timestamped => self.feed.seek_to(self.playback.current_time()),
        }
        debug!(cursor = self.feed.cursor(), "seek");
    }

    /// Move the cursor back to the first comment (end-of-media loop).
    pub fn rewind(&mut self) {
        if self.is_destroyed() {
            return;
        }
        self.feed.rewind();
    }

    /// Remove every displayed comment and reset all lanes.
    ///
    /// The cursor is reset too: to the live edge for live feeds, to the
    /// start for timestamped feeds.
    pub fn clear(&mut self) {
        if self.is_destroyed() {
            return;
        }
        self.clear_display();
        match self.feed.mode() {
            FeedMode::Live => self.feed.skip_to_end(),
            FeedMode::Timestamped => self.feed.rewind(),
        }
        self.events.emit(DanmakuEvent::Cleared);
    }

    /// Re-read the surface size and update in-flight transforms.
    ///
    /// Expiry times are untouched; only where items are drawn changes.
    pub fn resize(&mut self) {
        if self.is_destroyed() {
            return;
        }
        let geometry = self.refresh_geometry();
        for item in self.lifecycle.iter() {
            self.surface.translate(item.element, geometry.width);
        }
        debug!(width = geometry.width, height = geometry.height, "resized");
    }

    /// Set the opacity (clamped to `0.0..=1.0`) if given; return the
    /// current value.
    pub fn opacity(&mut self, percentage: Option<f32>) -> f32 {
        if let Some(value) = percentage {
            if value.is_nan() || self.is_destroyed() {
                return self.opacity;
            }
            let value = value.clamp(0.0, 1.0);
            for item in self.lifecycle.iter() {
                self.surface.set_opacity(item.element, value);
            }
            self.opacity = value;
            self.events.emit(DanmakuEvent::OpacityChanged(value));
        }
        self.opacity
    }

    /// Toggle unlimited mode (no lane-count cap).
    pub const fn unlimit(&mut self, unlimited: bool) {
        if self.is_destroyed() {
            return;
        }
        self.allocator.set_unlimited(unlimited);
    }

    /// Change the scroll speed for comments placed from now on.
    pub fn set_speed(&mut self, speed: ScrollSpeed) {
        if self.is_destroyed() {
            return;
        }
        let value = speed.pixels_per_second();
        if !(value.is_finite() && value > 0.0) {
            warn!(speed = value, "ignoring invalid scroll speed");
            return;
        }
        self.config.speed = speed;
        self.allocator.set_speed(value);
    }

    /// Hide the overlay: stop dispatch and drop everything on screen.
    pub fn hide(&mut self) {
        if self.is_destroyed() {
            return;
        }
        self.showing = false;
        self.pause();
        self.clear();
        self.events.emit(DanmakuEvent::Hidden);
    }

    /// Show the overlay again, starting from the current position.
    pub fn show(&mut self) {
        if self.is_destroyed() {
            return;
        }
        self.seek();
        self.showing = true;
        self.play();
        self.events.emit(DanmakuEvent::Shown);
    }

    // ------------------------------------------------------------------
    // Frame loop
    // ------------------------------------------------------------------

    /// Register the heartbeat thread. Idempotent.
    pub fn start(&mut self) {
        self.scheduler.start();
    }

    /// Wait for the next heartbeat tick (up to `timeout`) and run a frame
    /// if one arrived.
    ///
    /// Returns `false` once the overlay is destroyed.
    pub fn pump(&mut self, timeout: Duration) -> bool {
        if self.is_destroyed() {
            return false;
        }
        if self.scheduler.wait_tick(timeout).is_some() {
            self.frame();
        }
        !self.is_destroyed()
    }

    /// Run one frame: retire expired items, then dispatch everything due
    /// if running and visible.
    pub fn frame(&mut self) -> FrameReport {
        if self.is_destroyed() {
            return FrameReport::default();
        }

        let mut report = FrameReport {
            retired: self.retire_expired(),
            ..FrameReport::default()
        };

        if self.scheduler.is_running() && self.showing && !self.feed.is_empty() {
            let batch = self.feed.drain_due(self.playback.current_time());
            if !batch.is_empty() {
                let (dispatched, dropped) = self.draw(batch);
                report.dispatched = dispatched;
                report.dropped = dropped;
            }
        }

        self.scheduler.record_frame();
        report
    }

    /// Stop the heartbeat and release everything. Permanent.
    pub fn destroy(&mut self) {
        if self.is_destroyed() {
            return;
        }
        self.clear_display();
        self.scheduler.destroy();
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn refresh_geometry(&mut self) -> Geometry {
        self.geometry = Geometry::new(
            self.surface.width(),
            self.surface.height(),
            self.config.item_height,
        );
        self.geometry
    }

    fn retire_expired(&mut self) -> usize {
        let now = self.clock.now();
        self.lifecycle
            .expire_due(now, &mut self.allocator, &mut self.surface)
    }

    fn clear_display(&mut self) {
        let removed = self.lifecycle.clear(&mut self.allocator, &mut self.surface);
        debug!(removed, "display cleared");
    }

    /// Place a batch in order. Returns `(dispatched, dropped)`.
    fn draw(&mut self, batch: Vec<Comment>) -> (usize, usize) {
        if !self.showing {
            return (0, 0);
        }

        let geometry = self.refresh_geometry();
        let now = self.clock.now();
        let mut dispatched = 0;
        let mut dropped = 0;

        for comment in batch {
            let width = self.measurer.measure(&comment.text);
            let id = self.lifecycle.reserve_id();
            let Some(assignment) = self
                .allocator
                .allocate(id, &comment.kind, width, &geometry, now)
            else {
                dropped += 1;
                continue;
            };

            let element = self.surface.create_element(&ElementSpec {
                text: comment.text.clone(),
                color: comment.rgb(),
                direction: assignment.direction,
                offset: geometry.lane_offset(assignment.row),
                width,
                duration: assignment.duration,
                created_at: now,
                opacity: self.opacity,
                border: comment.border.clone(),
                travel: geometry.width,
            });
            trace!(id = id.0, lane = assignment.lane, text = %comment.text, "dispatched");
            self.lifecycle
                .create_visual_item(id, comment, assignment, width, now, element);
            dispatched += 1;
        }

        (dispatched, dropped)
    }
}

impl<S: RenderSurface> Drop for Overlay<S> {
    fn drop(&mut self) {
        if !self.scheduler.is_destroyed() {
            self.scheduler.destroy();
        }
    }
}

impl<S: RenderSurface> std::fmt::Debug for Overlay<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Overlay")
            .field("mode", &self.feed.mode())
            .field("cursor", &self.feed.cursor())
            .field("feed_len", &self.feed.len())
            .field("in_flight", &self.lifecycle.len())
            .field("showing", &self.showing)
            .field("state", &self.scheduler.state())
            .field("geometry", &self.geometry)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::comment::CommentKind;
    use crate::event::RecordingSink;
    use crate::scheduler::ManualClock;
    use crate::surface::CanvasSurface;

    fn overlay(mode: FeedMode) -> (Overlay<CanvasSurface>, ManualClock, RecordingSink) {
        let clock = ManualClock::new(0.0);
        let events = RecordingSink::new();
        let config = DanmakuConfig {
            item_height: 1.0,
            speed: ScrollSpeed::Custom(10.0),
            lane_gap: 0.0,
            mode,
            ..DanmakuConfig::default()
        };
        let overlay = Overlay::new(config, CanvasSurface::new(40, 3))
            .unwrap()
            .with_clock(clock.clone())
            .with_playback(clock.clone())
            .with_events(events.clone());
        (overlay, clock, events)
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let config = DanmakuConfig {
            item_height: -1.0,
            ..DanmakuConfig::default()
        };
        assert!(Overlay::new(config, CanvasSurface::new(10, 10)).is_err());
    }

    #[test]
    fn test_send_sanitizes_and_borders() {
        let (mut overlay, _clock, events) = overlay(FeedMode::Live);
        overlay.send(Comment::new("hi\x1b[0m"));

        let item = overlay.items().next().unwrap();
        assert_eq!(item.comment.text, "hi\u{fffd}[0m");
        assert!(item.comment.border.as_deref().unwrap().starts_with("2px solid #"));

        // The event carries the comment as received.
        match &events.events()[0] {
            DanmakuEvent::CommentSent(c) => assert_eq!(c.text, "hi\x1b[0m"),
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[test]
    fn test_send_keeps_existing_border() {
        let (mut overlay, _clock, _events) = overlay(FeedMode::Live);
        overlay.send(Comment::new("x").with_border("1px dashed red"));
        assert_eq!(
            overlay.items().next().unwrap().comment.border.as_deref(),
            Some("1px dashed red")
        );
    }

    #[test]
    fn test_send_while_hidden_records_but_does_not_draw() {
        let (mut overlay, _clock, _events) = overlay(FeedMode::Live);
        overlay.hide();
        overlay.send(Comment::new("x"));
        assert_eq!(overlay.feed().len(), 1);
        assert_eq!(overlay.in_flight(), 0);
    }

    #[test]
    fn test_frame_retires_expired() {
        let (mut overlay, clock, _events) = overlay(FeedMode::Live);
        overlay.send(Comment::new("top").with_kind(CommentKind::Top));
        clock.set(3.9);
        assert_eq!(overlay.frame().retired, 0);
        clock.set(4.0);
        assert_eq!(overlay.frame().retired, 1);
        assert_eq!(overlay.in_flight(), 0);
        assert!(overlay.surface().is_empty());
    }

    #[test]
    fn test_timestamped_frame_dispatch() {
        let (mut overlay, clock, _events) = overlay(FeedMode::Timestamped);
        overlay.load(vec![
            Comment::new("a").at(1.0),
            Comment::new("b").at(2.0).with_kind(CommentKind::Top),
            Comment::new("c").at(5.0),
        ]);
        assert_eq!(overlay.frame().dispatched, 0);

        clock.set(2.0);
        let report = overlay.frame();
        assert_eq!(report.dispatched, 2);
        assert_eq!(overlay.feed().cursor(), 2);

        overlay.pause();
        clock.set(6.0);
        assert_eq!(overlay.frame().dispatched, 0);
        overlay.play();
        assert_eq!(overlay.frame().dispatched, 1);
    }

    #[test]
    fn test_load_positions_at_playback_time() {
        let (mut overlay, clock, _events) = overlay(FeedMode::Timestamped);
        clock.set(3.0);
        overlay.load(vec![Comment::new("old").at(1.0), Comment::new("new").at(3.0)]);
        assert_eq!(overlay.feed().cursor(), 1);
    }

    #[test]
    fn test_timestamped_seek_and_rewind() {
        let (mut overlay, clock, _events) = overlay(FeedMode::Timestamped);
        overlay.load(vec![
            Comment::new("a").at(1.0),
            Comment::new("b").at(2.0),
            Comment::new("c").at(3.0),
        ]);
        clock.set(2.5);
        overlay.seek();
        assert_eq!(overlay.feed().cursor(), 2);
        overlay.rewind();
        assert_eq!(overlay.feed().cursor(), 0);
    }

    #[test]
    fn test_opacity() {
        let (mut overlay, _clock, events) = overlay(FeedMode::Live);
        overlay.send(Comment::new("x"));
        assert!((overlay.opacity(None) - 0.7).abs() < f32::EPSILON);
        assert!((overlay.opacity(Some(0.25)) - 0.25).abs() < f32::EPSILON);
        assert!((overlay.opacity(Some(3.0)) - 1.0).abs() < f32::EPSILON);
        assert!((overlay.opacity(Some(f32::NAN)) - 1.0).abs() < f32::EPSILON);

        let (_, spec) = overlay.surface().elements().next().unwrap();
        assert!((spec.opacity - 1.0).abs() < f32::EPSILON);
        assert_eq!(
            events.names(),
            ["comment_sent", "opacity_changed", "opacity_changed"]
        );
    }

    #[test]
    fn test_set_speed_changes_future_durations() {
        let (mut overlay, _clock, _events) = overlay(FeedMode::Live);
        overlay.set_speed(ScrollSpeed::Custom(20.0));
        overlay.set_speed(ScrollSpeed::Custom(-1.0));
        overlay.send(Comment::new("abcd"));
        // (40 + 4) / 20
        let item = overlay.items().next().unwrap();
        assert!((item.assignment.duration - 2.2).abs() < 1e-9);
    }

    #[test]
    fn test_destroy_is_terminal() {
        let (mut overlay, _clock, events) = overlay(FeedMode::Live);
        overlay.start();
        overlay.send(Comment::new("x"));
        overlay.destroy();

        assert!(overlay.is_destroyed());
        assert!(!overlay.is_ticking());
        assert_eq!(overlay.in_flight(), 0);
        assert!(!overlay.pump(Duration::from_millis(5)));

        overlay.send(Comment::new("y"));
        assert_eq!(overlay.frame(), FrameReport::default());
        assert_eq!(overlay.feed().len(), 1);
        assert_eq!(events.names(), ["comment_sent"]);
    }

    #[test]
    fn test_settings_frozen_after_destroy() {
        let (mut overlay, _clock, _events) = overlay(FeedMode::Live);
        overlay.destroy();

        overlay.unlimit(true);
        assert!(!overlay.is_unlimited());
        overlay.set_speed(ScrollSpeed::Fast);
        assert_eq!(overlay.config().speed, ScrollSpeed::Custom(10.0));
        overlay.play();
        assert!(overlay.is_paused());
        overlay.pause();
        overlay.play();
        assert!(overlay.is_paused());
    }

    #[test]
    fn test_timestamped_send_uses_playback_time() {
        let (mut overlay, clock, _events) = overlay(FeedMode::Timestamped);
        overlay.load(vec![
            Comment::new("a").at(1.0).with_kind(CommentKind::Top),
            Comment::new("b").at(2.0).with_kind(CommentKind::Top),
        ]);
        clock.set(1.5);
        overlay.frame();
        overlay.send(Comment::new("now").at(100.0).with_kind(CommentKind::Top));

        let times: Vec<f64> = overlay.feed().items().iter().map(|c| c.timestamp).collect();
        assert_eq!(times, [1.0, 1.5, 2.0]);
        assert_eq!(overlay.feed().cursor(), 2);
    }
}
