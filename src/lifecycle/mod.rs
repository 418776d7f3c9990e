//! Comment lifecycle: In-flight items and their expiry timers.
//!
//! Every placed comment becomes a [`VisualItem`] with an explicit expiry
//! time (`created_at + duration` on the stage clock). Expiry is checked
//! at frame boundaries; an expired item leaves its lane queue and its
//! rendered element is removed from the surface.

use crate::comment::Comment;
use crate::lane::{Assignment, ItemId, LaneAllocator};
use crate::surface::{ElementId, RenderSurface};
use std::cmp::{Ordering, Reverse};
use std::collections::{BTreeMap, BinaryHeap};
use tracing::trace;

/// A comment currently on the surface.
#[derive(Debug, Clone, PartialEq)]
pub struct VisualItem {
    /// Item identifier (also the lane queue key).
    pub id: ItemId,
    /// Handle of the rendered element.
    pub element: ElementId,
    /// The comment being displayed.
    pub comment: Comment,
    /// Lane placement and duration.
    pub assignment: Assignment,
    /// Measured width.
    pub width: f64,
    /// Stage time the item appeared.
    pub created_at: f64,
}

impl VisualItem {
    /// Stage time at which the item is retired.
    #[inline]
    pub fn expires_at(&self) -> f64 {
        self.created_at + self.assignment.duration
    }
}

/// A pending expiry timer.
#[derive(Debug, Clone, Copy)]
struct Expiry {
    at: f64,
    id: ItemId,
}

impl PartialEq for Expiry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Expiry {}

impl PartialOrd for Expiry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Expiry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.at.total_cmp(&other.at).then(self.id.cmp(&other.id))
    }
}

/// Tracks in-flight items and retires them when their time is up.
#[derive(Debug, Default)]
pub struct CommentLifecycle {
    items: BTreeMap<ItemId, VisualItem>,
    timers: BinaryHeap<Reverse<Expiry>>,
    next_id: u64,
}

impl CommentLifecycle {
    /// Create an empty lifecycle.
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a fresh item id. Ids are never reused, even across `clear`.
    pub const fn reserve_id(&mut self) -> ItemId {
        let id = ItemId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Start tracking a placed comment and arm its expiry timer.
    pub fn create_visual_item(
        &mut self,
        id: ItemId,
        comment: Comment,
        assignment: Assignment,
        width: f64,
        now: f64,
        element: ElementId,
    ) -> &VisualItem {
        let item = VisualItem {
            id,
            element,
            comment,
            assignment,
            width,
            created_at: now,
        };
        self.timers.push(Reverse(Expiry {
            at: item.expires_at(),
            id,
        }));
        self.items.entry(id).or_insert(item)
    }

    /// Retire every item whose expiry time is `<= now`.
    ///
    /// Returns the number of items retired.
    pub fn expire_due(
        &mut self,
        now: f64,
        allocator: &mut LaneAllocator,
        surface: &mut dyn RenderSurface,
    ) -> usize {
        let mut retired = 0;
        while let Some(Reverse(next)) = self.timers.peek() {
            if next.at > now {
                break;
            }
            let id = next.id;
            self.timers.pop();

            let Some(item) = self.items.remove(&id) else {
                continue;
            };
            allocator.release(item.assignment.direction, item.assignment.lane, id);
            surface.remove_element(item.element);
            trace!(id = id.0, lane = item.assignment.lane, "comment expired");
            retired += 1;
        }
        retired
    }

    /// Forcibly retire everything: lanes emptied, surface cleared.
    ///
    /// Returns the number of items that were in flight.
    pub fn clear(&mut self, allocator: &mut LaneAllocator, surface: &mut dyn RenderSurface) -> usize {
        let count = self.items.len();
        self.items.clear();
        self.timers.clear();
        allocator.clear();
        surface.clear();
        count
    }

    /// Number of in-flight items.
    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if nothing is in flight.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Look up an in-flight item.
    pub fn get(&self, id: ItemId) -> Option<&VisualItem> {
        self.items.get(&id)
    }

    /// In-flight items in creation order.
    pub fn iter(&self) -> impl Iterator<Item = &VisualItem> {
        self.items.values()
    }

    /// Earliest pending expiry time.
    pub fn next_expiry(&self) -> Option<f64> {
        self.timers.peek().map(|Reverse(expiry)| expiry.at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::comment::CommentKind;
    use crate::lane::{AllocatorSettings, Direction};
    use crate::layout::Geometry;
    use crate::surface::CanvasSurface;

    fn setup() -> (CommentLifecycle, LaneAllocator, CanvasSurface, Geometry) {
        let allocator = LaneAllocator::new(AllocatorSettings {
            speed: 5.0,
            fixed_duration: 4.0,
            lane_gap: 0.0,
            unlimited: false,
        });
        (
            CommentLifecycle::new(),
            allocator,
            CanvasSurface::new(80, 2),
            Geometry::new(800.0, 60.0, 30.0),
        )
    }

    fn place(
        lifecycle: &mut CommentLifecycle,
        allocator: &mut LaneAllocator,
        surface: &mut CanvasSurface,
        geometry: &Geometry,
        kind: CommentKind,
        now: f64,
    ) -> Option<ItemId> {
        let id = lifecycle.reserve_id();
        let assignment = allocator.allocate(id, &kind, 100.0, geometry, now)?;
        let element = surface.create_element(&crate::surface::ElementSpec {
            text: "x".into(),
            color: crate::canvas::Rgb::WHITE,
            direction: assignment.direction,
            offset: 0.0,
            width: 100.0,
            duration: assignment.duration,
            created_at: now,
            opacity: 1.0,
            border: None,
            travel: geometry.width,
        });
        lifecycle.create_visual_item(id, Comment::new("x").with_kind(kind), assignment, 100.0, now, element);
        Some(id)
    }

    #[test]
    fn test_expiry_frees_lane_and_element() {
        let (mut lifecycle, mut allocator, mut surface, geometry) = setup();
        let id = place(&mut lifecycle, &mut allocator, &mut surface, &geometry, CommentKind::Top, 0.0).unwrap();

        assert_eq!(lifecycle.len(), 1);
        assert!((lifecycle.get(id).unwrap().expires_at() - 4.0).abs() < 1e-9);
        assert_eq!(lifecycle.expire_due(3.9, &mut allocator, &mut surface), 0);
        assert_eq!(lifecycle.expire_due(4.0, &mut allocator, &mut surface), 1);

        assert!(lifecycle.is_empty());
        assert!(surface.is_empty());
        assert!(allocator.lanes().is_free(Direction::Top, 0));
    }

    #[test]
    fn test_expiry_is_fifo_per_lane() {
        let (mut lifecycle, mut allocator, mut surface, geometry) = setup();
        let first = place(&mut lifecycle, &mut allocator, &mut surface, &geometry, CommentKind::ScrollRight, 0.0).unwrap();
        let second = place(&mut lifecycle, &mut allocator, &mut surface, &geometry, CommentKind::ScrollRight, 25.0).unwrap();
        assert_eq!(lifecycle.get(second).unwrap().assignment.lane, 0);

        // First expires at 180, second at 205.
        assert_eq!(lifecycle.next_expiry(), Some(180.0));
        lifecycle.expire_due(180.0, &mut allocator, &mut surface);
        assert!(lifecycle.get(first).is_none());
        let lane = allocator.lanes().get(Direction::Right, 0).unwrap();
        assert_eq!(lane.occupants().map(|f| f.id).collect::<Vec<_>>(), [second]);
    }

    #[test]
    fn test_clear_retires_everything() {
        let (mut lifecycle, mut allocator, mut surface, geometry) = setup();
        place(&mut lifecycle, &mut allocator, &mut surface, &geometry, CommentKind::Top, 0.0);
        place(&mut lifecycle, &mut allocator, &mut surface, &geometry, CommentKind::Bottom, 0.0);

        assert_eq!(lifecycle.clear(&mut allocator, &mut surface), 2);
        assert!(lifecycle.is_empty());
        assert!(lifecycle.next_expiry().is_none());
        assert!(surface.is_empty());
        assert_eq!(allocator.lanes().occupancy(Direction::Top), 0);

        // Stale timers from before the clear must not touch new items.
        let fresh = place(&mut lifecycle, &mut allocator, &mut surface, &geometry, CommentKind::Top, 10.0).unwrap();
        assert_eq!(lifecycle.expire_due(4.0, &mut allocator, &mut surface), 0);
        assert!(lifecycle.get(fresh).is_some());
    }

    #[test]
    fn test_ids_are_unique() {
        let mut lifecycle = CommentLifecycle::new();
        let a = lifecycle.reserve_id();
        let b = lifecycle.reserve_id();
        assert_ne!(a, b);
    }
}
