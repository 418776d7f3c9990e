//! Flight: The analytic motion of one item in a lane.
//!
//! Positions are never read back from a renderer. A scrolling item
//! enters with its left edge on the right boundary and leaves once its
//! right edge passes the left boundary, moving linearly over its
//! duration, so every position is a function of the clock.

/// Identifier of an in-flight item, unique for the life of an overlay.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct ItemId(pub u64);

/// Motion record of one item in a lane.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Flight {
    /// The item this flight belongs to.
    pub id: ItemId,
    /// Stage time the item was assigned.
    pub assigned_at: f64,
    /// Measured width (zero for fixed items).
    pub width: f64,
    /// Travel or display duration.
    pub duration: f64,
}

impl Flight {
    /// Create a flight record.
    #[inline]
    pub const fn new(id: ItemId, assigned_at: f64, width: f64, duration: f64) -> Self {
        Self {
            id,
            assigned_at,
            width,
            duration,
        }
    }

    /// Stage time at which the item expires.
    #[inline]
    pub fn expires_at(&self) -> f64 {
        self.assigned_at + self.duration
    }

    /// Fraction of the duration elapsed at `now`, clamped to `[0, 1]`.
    #[inline]
    pub fn progress(&self, now: f64) -> f64 {
        if self.duration <= 0.0 {
            return 1.0;
        }
        ((now - self.assigned_at) / self.duration).clamp(0.0, 1.0)
    }

    /// Left edge position at `now` on a surface `surface_width` wide.
    ///
    /// Measured from the left boundary; negative once the item has begun
    /// to leave.
    #[inline]
    pub fn left_edge(&self, now: f64, surface_width: f64) -> f64 {
        let progress = self.progress(now);
        surface_width - progress * (surface_width + self.width)
    }

    /// Right (trailing) edge position at `now`, measured from the left
    /// boundary. Equals `(1 - progress) * (surface_width + width)`.
    #[inline]
    pub fn trailing_edge(&self, now: f64, surface_width: f64) -> f64 {
        (1.0 - self.progress(now)) * (surface_width + self.width)
    }

    /// Horizontal speed when crossing a surface `surface_width` wide.
    #[inline]
    pub fn velocity(&self, surface_width: f64) -> f64 {
        if self.duration <= 0.0 {
            return f64::INFINITY;
        }
        (surface_width + self.width) / self.duration
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_edges_over_time() {
        // 800 wide surface, 100 wide item, 180 time units.
        let flight = Flight::new(ItemId(1), 10.0, 100.0, 180.0);

        assert!(close(flight.left_edge(10.0, 800.0), 800.0));
        assert!(close(flight.trailing_edge(10.0, 800.0), 900.0));

        // Halfway: travelled 450.
        assert!(close(flight.left_edge(100.0, 800.0), 350.0));
        assert!(close(flight.trailing_edge(100.0, 800.0), 450.0));

        // Done: right edge on the left boundary.
        assert!(close(flight.left_edge(190.0, 800.0), -100.0));
        assert!(close(flight.trailing_edge(190.0, 800.0), 0.0));
        assert!(close(flight.expires_at(), 190.0));
    }

    #[test]
    fn test_progress_clamps() {
        let flight = Flight::new(ItemId(1), 10.0, 0.0, 4.0);
        assert!(close(flight.progress(0.0), 0.0));
        assert!(close(flight.progress(12.0), 0.5));
        assert!(close(flight.progress(99.0), 1.0));
    }

    #[test]
    fn test_velocity() {
        let flight = Flight::new(ItemId(1), 0.0, 100.0, 180.0);
        assert!(close(flight.velocity(800.0), 5.0));
        assert!(Flight::new(ItemId(2), 0.0, 0.0, 0.0).velocity(800.0).is_infinite());
    }
}
