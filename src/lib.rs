//! # Danmaku
//!
//! A live comment ("danmaku") overlay scheduler.
//!
//! Comments arrive from a live feed or a timestamped list, get placed
//! into non-overlapping horizontal lanes, fly across (or sit at the top
//! or bottom of) a rendering surface, and are retired when their display
//! time runs out.
//!
//! ## Core Concepts
//!
//! - **Lanes**: Scrolling comments share a lane only when the newcomer can
//!   never catch up with the one ahead of it
//! - **Analytic motion**: Positions are computed from creation time and
//!   duration, never read back from the surface
//! - **Heartbeat**: A paced tick thread drives the frame loop; all state
//!   lives on the host thread
//! - **Surfaces**: Anything implementing [`RenderSurface`]; a cell canvas
//!   for terminals ships with the crate
//!
//! ## Example
//!
//! ```rust,ignore
//! use danmaku::{CanvasSurface, Comment, DanmakuConfig, Overlay};
//!
//! let mut overlay = Overlay::new(DanmakuConfig::default(), CanvasSurface::new(80, 24))?;
//! overlay.send(Comment::new("hello"));
//! overlay.frame();
//! ```

#![warn(missing_docs)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

pub mod canvas;
pub mod comment;
pub mod config;
pub mod error;
pub mod event;
pub mod feed;
pub mod lane;
pub mod layout;
pub mod lifecycle;
pub mod measure;
pub mod overlay;
pub mod scheduler;
pub mod surface;
pub mod terminal;

// Re-exports for convenience
pub use canvas::{Canvas, Cell, Modifiers, Rgb};
pub use comment::{Comment, CommentKind};
pub use config::{DanmakuConfig, ScrollSpeed};
pub use error::ConfigError;
pub use event::{ChannelSink, DanmakuEvent, EventSink, RecordingSink};
pub use feed::{FeedMode, TimelineFeed};
pub use lane::{Direction, LaneAllocator};
pub use layout::Geometry;
pub use measure::{ColumnMeasurer, TextMeasurer};
pub use overlay::{FrameReport, Overlay};
pub use scheduler::{Clock, ManualClock, PlaybackClock, SystemClock};
pub use surface::{CanvasSurface, RenderSurface};
pub use terminal::TerminalSession;
