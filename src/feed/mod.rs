//! Timeline feed: The ordered comment sequence and its read cursor.
//!
//! Everything before the cursor has been dispatched (or deliberately
//! skipped); everything from the cursor on is pending. The feed never
//! shrinks except through [`TimelineFeed::reset`] and
//! [`TimelineFeed::load`].

use crate::comment::Comment;
use serde::{Deserialize, Serialize};

/// Ingestion policy for the feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedMode {
    /// Comments are shown as they arrive; rewinding is not possible.
    #[default]
    Live,
    /// Comments are dispatched when the playback clock reaches their timestamp.
    Timestamped,
}

/// Comments in dispatch order plus a cursor.
///
/// Invariant: `0 <= cursor <= len`.
#[derive(Debug, Clone, Default)]
pub struct TimelineFeed {
    /// Ordered comments.
    items: Vec<Comment>,
    /// Index of the first pending comment.
    cursor: usize,
    /// Ingestion policy.
    mode: FeedMode,
}

impl TimelineFeed {
    /// Create an empty feed.
    pub const fn new(mode: FeedMode) -> Self {
        Self {
            items: Vec::new(),
            cursor: 0,
            mode,
        }
    }

    /// The ingestion policy.
    #[inline]
    pub const fn mode(&self) -> FeedMode {
        self.mode
    }

    /// Current cursor position.
    #[inline]
    pub const fn cursor(&self) -> usize {
        self.cursor
    }

    /// Number of comments held.
    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if the feed holds no comments.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// All comments, dispatched and pending.
    #[inline]
    pub fn items(&self) -> &[Comment] {
        &self.items
    }

    /// Comments not yet dispatched.
    #[inline]
    pub fn pending(&self) -> &[Comment] {
        &self.items[self.cursor..]
    }

    /// Insert a comment at the cursor and step past it.
    ///
    /// The position ignores the comment's timestamp: live comments are
    /// shown in arrival order. A timestamped feed must stay sorted, so
    /// there the timestamp is pulled into the range of its neighbours.
    pub fn send(&mut self, mut comment: Comment) {
        if self.mode == FeedMode::Timestamped {
            let before = self.cursor.checked_sub(1).map(|i| self.items[i].timestamp);
            let after = self.items.get(self.cursor).map(|c| c.timestamp);
            if let Some(floor) = before {
                comment.timestamp = comment.timestamp.max(floor);
            }
            if let Some(ceiling) = after {
                comment.timestamp = comment.timestamp.min(ceiling);
            }
        }
        self.items.insert(self.cursor, comment);
        self.cursor += 1;
    }

    /// Advance the cursor past every pending comment with
    /// `timestamp <= clock_time` and return them in order.
    pub fn drain_due(&mut self, clock_time: f64) -> Vec<Comment> {
        let start = self.cursor;
        let due = self.items[start..]
            .iter()
            .take_while(|c| c.timestamp <= clock_time)
            .count();
        self.cursor += due;
        self.items[start..self.cursor].to_vec()
    }

    /// Whether the next pending comment is due at `clock_time`.
    pub fn has_due(&self, clock_time: f64) -> bool {
        self.items
            .get(self.cursor)
            .is_some_and(|c| c.timestamp <= clock_time)
    }

    /// Skip to the live edge: nothing already held will be dispatched.
    pub fn skip_to_end(&mut self) {
        self.cursor = self.items.len();
    }

    /// Position the cursor at the first comment with `timestamp >= time`.
    pub fn seek_to(&mut self, time: f64) {
        self.cursor = self.items.partition_point(|c| c.timestamp < time);
    }

    /// Move the cursor back to the first comment.
    pub fn rewind(&mut self) {
        self.cursor = 0;
    }

    /// Replace the contents with `comments`, stably sorted by timestamp.
    pub fn load(&mut self, mut comments: Vec<Comment>) {
        comments.sort_by(|a, b| a.timestamp.total_cmp(&b.timestamp));
        self.items = comments;
        self.cursor = 0;
    }

    /// Drop every comment and reset the cursor.
    pub fn reset(&mut self) {
        self.items.clear();
        self.cursor = 0;
    }
}
