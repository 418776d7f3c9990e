//! Lane storage: dense per-direction arrays of occupant queues.

use super::flight::{Flight, ItemId};
use crate::comment::CommentKind;
use std::collections::VecDeque;

/// Which family of lanes an item occupies.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Direction {
    /// Scrolling right-to-left lanes.
    Right,
    /// Fixed lanes counted from the top edge.
    Top,
    /// Fixed lanes counted from the bottom edge.
    Bottom,
}

impl Direction {
    /// All directions, in storage order.
    pub const ALL: [Self; 3] = [Self::Right, Self::Top, Self::Bottom];

    /// Direction for a comment kind; `None` for unrecognized kinds.
    pub const fn of(kind: &CommentKind) -> Option<Self> {
        match kind {
            CommentKind::ScrollRight => Some(Self::Right),
            CommentKind::Top => Some(Self::Top),
            CommentKind::Bottom => Some(Self::Bottom),
            CommentKind::Unrecognized(_) => None,
        }
    }

    const fn slot(self) -> usize {
        match self {
            Self::Right => 0,
            Self::Top => 1,
            Self::Bottom => 2,
        }
    }
}

/// One lane: the items currently sharing it, in assignment order.
#[derive(Clone, Debug)]
pub struct Lane {
    direction: Direction,
    index: usize,
    queue: VecDeque<Flight>,
}

impl Lane {
    /// Create an empty lane.
    pub const fn new(direction: Direction, index: usize) -> Self {
        Self {
            direction,
            index,
            queue: VecDeque::new(),
        }
    }

    /// The lane's direction.
    #[inline]
    pub const fn direction(&self) -> Direction {
        self.direction
    }

    /// The lane's index within its direction.
    #[inline]
    pub const fn index(&self) -> usize {
        self.index
    }

    /// Check if no item occupies the lane.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Number of items sharing the lane.
    #[inline]
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// The most recently assigned occupant.
    #[inline]
    pub fn last(&self) -> Option<&Flight> {
        self.queue.back()
    }

    /// Occupants in assignment order.
    pub fn occupants(&self) -> impl Iterator<Item = &Flight> {
        self.queue.iter()
    }

    /// Append an occupant.
    pub fn push(&mut self, flight: Flight) {
        self.queue.push_back(flight);
    }

    /// Remove the head-most occupant with the given id.
    ///
    /// Returns `false` if the id is not in the lane.
    pub fn release(&mut self, id: ItemId) -> bool {
        match self.queue.iter().position(|f| f.id == id) {
            Some(at) => {
                self.queue.remove(at);
                true
            }
            None => false,
        }
    }
}

/// All lanes, one dense array per direction, grown on demand.
#[derive(Clone, Debug, Default)]
pub struct LaneSet {
    lanes: [Vec<Lane>; 3],
}

impl LaneSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Lanes of one direction.
    #[inline]
    pub fn lanes(&self, direction: Direction) -> &[Lane] {
        &self.lanes[direction.slot()]
    }

    /// Get a lane, if it has ever been touched.
    #[inline]
    pub fn get(&self, direction: Direction, index: usize) -> Option<&Lane> {
        self.lanes[direction.slot()].get(index)
    }

    /// Check whether a lane has no occupants. Untouched lanes are empty.
    #[inline]
    pub fn is_free(&self, direction: Direction, index: usize) -> bool {
        self.get(direction, index).is_none_or(Lane::is_empty)
    }

    /// Get a lane, growing the array so that `index` exists.
    pub fn ensure(&mut self, direction: Direction, index: usize) -> &mut Lane {
        let lanes = &mut self.lanes[direction.slot()];
        while lanes.len() <= index {
            let next = lanes.len();
            lanes.push(Lane::new(direction, next));
        }
        &mut lanes[index]
    }

    /// Remove an item from a lane. Returns `false` if it was not there.
    pub fn release(&mut self, direction: Direction, index: usize, id: ItemId) -> bool {
        self.lanes[direction.slot()]
            .get_mut(index)
            .is_some_and(|lane| lane.release(id))
    }

    /// Number of items in all lanes of a direction.
    pub fn occupancy(&self, direction: Direction) -> usize {
        self.lanes(direction).iter().map(Lane::len).sum()
    }

    /// Empty every lane in every direction.
    pub fn clear(&mut self) {
        for lanes in &mut self.lanes {
            lanes.clear();
        }
    }
}
