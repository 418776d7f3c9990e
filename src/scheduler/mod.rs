//! Scheduling: Clocks, the heartbeat thread and the frame state machine.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐        Tick         ┌──────────────┐
//! │  Heartbeat   │ ─────────────────▶  │ Host thread  │
//! │   thread     │                     │  (Overlay)   │
//! └──────────────┘                     │              │
//!                                      │ frame():     │
//!        PlaybackClock ─────────────▶  │  expire      │
//!        Clock (stage) ─────────────▶  │  drain/draw  │
//!                                      └──────────────┘
//! ```
//!
//! The heartbeat only paces; all overlay state is touched from the host
//! thread, one frame at a time.

mod clock;
mod heartbeat;
#[allow(clippy::module_inception)]
mod scheduler;

pub use clock::{Clock, ManualClock, PlaybackClock, SystemClock};
pub use heartbeat::{Heartbeat, Tick};
pub use scheduler::{PlaybackState, RenderScheduler};
