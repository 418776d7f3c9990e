//! Lanes: Occupancy tracking and the allocation policy.
//!
//! A lane is identified by `(direction, index)` and stored densely per
//! direction. Each lane keeps the [`Flight`] of every item sharing it,
//! in assignment order, so that positions can be computed analytically
//! instead of being read back from a renderer.

mod allocator;
mod flight;
#[allow(clippy::module_inception)]
mod lane;

pub use allocator::{AllocatorSettings, Assignment, LaneAllocator};
pub use flight::{Flight, ItemId};
pub use lane::{Direction, Lane, LaneSet};
