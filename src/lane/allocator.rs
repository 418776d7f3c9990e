//! Lane allocator: Collision-avoiding lane choice for each new comment.
//!
//! # Policy
//!
//! - **Scrolling lanes** may be shared. A new item joins an occupied lane
//!   when the lane's last occupant has fully entered (plus a gap) and the
//!   new item cannot catch it before it leaves the surface. Only the last
//!   occupant is examined: earlier occupants are further ahead and, with
//!   the FIFO expiry order this produces, are not re-checked.
//! - **Fixed lanes** (top/bottom) are exclusive for the whole display
//!   duration of their occupant.
//! - When no lane accepts an item it is dropped. Drops are capacity
//!   shedding, not errors: nothing is retried or queued.

use super::flight::{Flight, ItemId};
use super::lane::{Direction, LaneSet};
use crate::comment::CommentKind;
use crate::layout::Geometry;
use tracing::{debug, trace, warn};

/// Where an item was placed and for how long.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Assignment {
    /// Lane family.
    pub direction: Direction,
    /// Lane index (may exceed the visible lane count in unlimited mode).
    pub lane: usize,
    /// Visible row: `lane % max_lanes`.
    pub row: usize,
    /// Travel (scrolling) or display (fixed) duration.
    pub duration: f64,
}

/// Tunables for the allocator.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct AllocatorSettings {
    /// Scroll speed in surface units per second.
    pub speed: f64,
    /// Display duration of fixed comments.
    pub fixed_duration: f64,
    /// Minimum space between a lane's last occupant and a new entrant.
    pub lane_gap: f64,
    /// Ignore the visible lane count when searching.
    pub unlimited: bool,
}

impl Default for AllocatorSettings {
    fn default() -> Self {
        Self {
            speed: crate::config::ScrollSpeed::Medium.pixels_per_second(),
            fixed_duration: 4.0,
            lane_gap: 10.0,
            unlimited: false,
        }
    }
}

/// Assigns lanes and owns lane occupancy.
#[derive(Clone, Debug)]
pub struct LaneAllocator {
    lanes: LaneSet,
    settings: AllocatorSettings,
}

impl LaneAllocator {
    /// Create an allocator with empty lanes.
    pub fn new(settings: AllocatorSettings) -> Self {
        Self {
            lanes: LaneSet::new(),
            settings,
        }
    }

    /// Current settings.
    #[inline]
    pub const fn settings(&self) -> &AllocatorSettings {
        &self.settings
    }

    /// Lane occupancy.
    #[inline]
    pub const fn lanes(&self) -> &LaneSet {
        &self.lanes
    }

    /// Toggle unlimited mode.
    pub const fn set_unlimited(&mut self, unlimited: bool) {
        self.settings.unlimited = unlimited;
    }

    /// Change the scroll speed for future assignments.
    pub const fn set_speed(&mut self, speed: f64) {
        self.settings.speed = speed;
    }

    /// Travel duration for a scrolling item of `width` on `geometry`.
    #[inline]
    pub fn travel_duration(&self, width: f64, geometry: &Geometry) -> f64 {
        (geometry.width + width) / self.settings.speed
    }

    /// Choose a lane for item `id` and occupy it.
    ///
    /// `width` is the measured text width; it only matters for scrolling
    /// kinds. Returns `None` when the item is dropped.
    pub fn allocate(
        &mut self,
        id: ItemId,
        kind: &CommentKind,
        width: f64,
        geometry: &Geometry,
        now: f64,
    ) -> Option<Assignment> {
        let Some(direction) = Direction::of(kind) else {
            warn!(kind = %kind, "can't handle comment kind, dropping");
            return None;
        };

        let max_lanes = geometry.max_lanes();
        let bound = if self.settings.unlimited {
            usize::MAX
        } else {
            max_lanes
        };

        let (lane, flight) = match direction {
            Direction::Right => {
                let duration = self.travel_duration(width, geometry);
                let flight = Flight::new(id, now, width, duration);
                (self.find_scroll_lane(&flight, geometry.width, bound, now), flight)
            }
            Direction::Top | Direction::Bottom => {
                let flight = Flight::new(id, now, 0.0, self.settings.fixed_duration);
                ((0..bound).find(|&i| self.lanes.is_free(direction, i)), flight)
            }
        };

        let Some(lane) = lane else {
            debug!(?direction, max_lanes, "no free lane, dropping comment");
            return None;
        };

        self.lanes.ensure(direction, lane).push(flight);
        let row = lane.checked_rem(max_lanes).unwrap_or(0);
        trace!(?direction, lane, row, duration = flight.duration, "lane assigned");

        Some(Assignment {
            direction,
            lane,
            row,
            duration: flight.duration,
        })
    }

    fn find_scroll_lane(&self, entrant: &Flight, surface_width: f64, bound: usize, now: f64) -> Option<usize> {
        (0..bound).find(|&i| match self.lanes.get(Direction::Right, i).and_then(|l| l.last()) {
            None => true,
            Some(prev) => self.can_follow(prev, entrant, surface_width, now),
        })
    }

    /// Whether `entrant`, starting now, stays clear of `prev` for as long
    /// as `prev` remains on the surface.
    fn can_follow(&self, prev: &Flight, entrant: &Flight, surface_width: f64, now: f64) -> bool {
        let trailing = prev.trailing_edge(now, surface_width);
        if trailing <= 0.0 {
            return true;
        }

        let offset = surface_width - trailing;
        if offset < self.settings.lane_gap {
            return false;
        }

        // Where the entrant's leading edge will be when prev's trailing edge
        // reaches the left boundary must not have passed it.
        let reach = surface_width * prev.velocity(surface_width) / entrant.velocity(surface_width);
        trailing + self.settings.lane_gap <= reach
    }

    /// Remove an item from its lane.
    pub fn release(&mut self, direction: Direction, lane: usize, id: ItemId) -> bool {
        self.lanes.release(direction, lane, id)
    }

    /// Empty every lane.
    pub fn clear(&mut self) {
        self.lanes.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn allocator(speed: f64, unlimited: bool) -> LaneAllocator {
        LaneAllocator::new(AllocatorSettings {
            speed,
            fixed_duration: 4.0,
            lane_gap: 0.0,
            unlimited,
        })
    }

    fn surface(lanes: usize) -> Geometry {
        Geometry::new(800.0, 30.0 * lanes as f64, 30.0)
    }

    #[test]
    fn test_travel_duration() {
        let alloc = allocator(5.0, false);
        assert!((alloc.travel_duration(100.0, &surface(1)) - 180.0).abs() < 1e-9);
    }

    #[test]
    fn test_first_scroll_item_takes_lane_zero() {
        let mut alloc = allocator(5.0, false);
        let a = alloc
            .allocate(ItemId(1), &CommentKind::ScrollRight, 100.0, &surface(1), 0.0)
            .unwrap();
        assert_eq!((a.direction, a.lane, a.row), (Direction::Right, 0, 0));
        assert!((a.duration - 180.0).abs() < 1e-9);
    }

    #[test]
    fn test_back_to_back_scroll_items_collide() {
        let mut alloc = allocator(5.0, false);
        let geo = surface(1);
        assert!(alloc.allocate(ItemId(1), &CommentKind::ScrollRight, 100.0, &geo, 0.0).is_some());
        assert!(alloc.allocate(ItemId(2), &CommentKind::ScrollRight, 100.0, &geo, 0.0).is_none());
        assert_eq!(alloc.lanes().occupancy(Direction::Right), 1);
    }

    #[test]
    fn test_scroll_lane_shared_once_prev_cleared() {
        let mut alloc = allocator(5.0, false);
        let geo = surface(1);
        alloc.allocate(ItemId(1), &CommentKind::ScrollRight, 100.0, &geo, 0.0);

        // Trailing edge enters after 100 / 5 = 20 time units.
        assert!(alloc.allocate(ItemId(2), &CommentKind::ScrollRight, 100.0, &geo, 19.0).is_none());
        let shared = alloc
            .allocate(ItemId(3), &CommentKind::ScrollRight, 100.0, &geo, 21.0)
            .unwrap();
        assert_eq!(shared.lane, 0);
        assert_eq!(alloc.lanes().get(Direction::Right, 0).unwrap().len(), 2);
    }

    #[test]
    fn test_scroll_spills_to_next_lane() {
        let mut alloc = allocator(5.0, false);
        let geo = surface(2);
        alloc.allocate(ItemId(1), &CommentKind::ScrollRight, 100.0, &geo, 0.0);
        let second = alloc
            .allocate(ItemId(2), &CommentKind::ScrollRight, 100.0, &geo, 0.0)
            .unwrap();
        assert_eq!(second.lane, 1);
    }

    #[test]
    fn test_gap_is_respected() {
        let mut alloc = LaneAllocator::new(AllocatorSettings {
            speed: 5.0,
            fixed_duration: 4.0,
            lane_gap: 10.0,
            unlimited: false,
        });
        let geo = surface(1);
        alloc.allocate(ItemId(1), &CommentKind::ScrollRight, 100.0, &geo, 0.0);
        // Offset at t=21 is 5 < gap.
        assert!(alloc.allocate(ItemId(2), &CommentKind::ScrollRight, 100.0, &geo, 21.0).is_none());
        // Offset at t=23 is 15 > gap.
        assert!(alloc.allocate(ItemId(3), &CommentKind::ScrollRight, 100.0, &geo, 23.0).is_some());
    }

    #[test]
    fn test_faster_entrant_must_not_catch_prev() {
        // Fixed-duration style: wide item is faster than narrow one.
        let mut alloc = allocator(5.0, false);
        let geo = surface(1);
        // prev: narrow, slow (duration 200 for 0 width => v = 4)
        alloc
            .lanes
            .ensure(Direction::Right, 0)
            .push(Flight::new(ItemId(1), 0.0, 0.0, 200.0));
        // At t=10 prev trailing = 760; entrant v = 5, reach = 800 * 4 / 5 = 640.
        assert!(alloc.allocate(ItemId(2), &CommentKind::ScrollRight, 0.0, &geo, 10.0).is_none());
        // At t=50 prev trailing = 600 <= 640.
        assert!(alloc.allocate(ItemId(3), &CommentKind::ScrollRight, 0.0, &geo, 50.0).is_some());
    }

    #[test]
    fn test_exited_prev_frees_lane() {
        let mut alloc = allocator(5.0, false);
        let geo = surface(1);
        alloc.allocate(ItemId(1), &CommentKind::ScrollRight, 100.0, &geo, 0.0);
        // Never released, but fully exited by t=180.
        assert!(alloc.allocate(ItemId(2), &CommentKind::ScrollRight, 2000.0, &geo, 180.0).is_some());
    }

    #[test]
    fn test_fixed_lanes_are_exclusive() {
        let mut alloc = allocator(5.0, false);
        let geo = surface(2);
        let a = alloc.allocate(ItemId(1), &CommentKind::Top, 0.0, &geo, 0.0).unwrap();
        let b = alloc.allocate(ItemId(2), &CommentKind::Top, 0.0, &geo, 100.0).unwrap();
        assert_eq!((a.lane, b.lane), (0, 1));
        assert!(alloc.allocate(ItemId(3), &CommentKind::Top, 0.0, &geo, 100.0).is_none());

        // Bottom lanes are independent of top lanes.
        assert_eq!(alloc.allocate(ItemId(4), &CommentKind::Bottom, 0.0, &geo, 0.0).unwrap().lane, 0);

        assert!(alloc.release(Direction::Top, 0, ItemId(1)));
        assert_eq!(alloc.allocate(ItemId(5), &CommentKind::Top, 0.0, &geo, 100.0).unwrap().lane, 0);
    }

    #[test]
    fn test_unlimited_never_drops() {
        let mut alloc = allocator(5.0, true);
        let geo = surface(3);
        for id in 0..20 {
            let a = alloc
                .allocate(ItemId(id), &CommentKind::ScrollRight, 100.0, &geo, 0.0)
                .unwrap();
            assert_eq!(a.lane, id as usize);
            assert_eq!(a.row, id as usize % 3);
        }
        assert!(alloc.allocate(ItemId(99), &CommentKind::Top, 0.0, &geo, 0.0).is_some());
    }

    #[test]
    fn test_unlimited_with_zero_visible_lanes() {
        let mut alloc = allocator(5.0, true);
        let geo = Geometry::new(800.0, 10.0, 30.0);
        let a = alloc
            .allocate(ItemId(1), &CommentKind::ScrollRight, 100.0, &geo, 0.0)
            .unwrap();
        assert_eq!(a.row, 0);
    }

    #[test]
    fn test_zero_visible_lanes_drops() {
        let mut alloc = allocator(5.0, false);
        let geo = Geometry::new(800.0, 10.0, 30.0);
        assert!(alloc.allocate(ItemId(1), &CommentKind::Top, 0.0, &geo, 0.0).is_none());
    }

    #[test]
    fn test_unrecognized_kind_dropped() {
        let mut alloc = allocator(5.0, true);
        let kind = CommentKind::Unrecognized("diagonal".into());
        assert!(alloc.allocate(ItemId(1), &kind, 10.0, &surface(3), 0.0).is_none());
        for direction in Direction::ALL {
            assert_eq!(alloc.lanes().occupancy(direction), 0);
        }
    }
}
