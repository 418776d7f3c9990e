//! Geometry: Read-only snapshot of the surface the overlay draws onto.

/// Surface dimensions plus the height of one comment row.
///
/// Units are whatever the surface uses (pixels for a video element,
/// cells for a terminal). The allocator only ever compares values in the
/// same unit, so mixing is the caller's problem.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Geometry {
    /// Surface width.
    pub width: f64,
    /// Surface height.
    pub height: f64,
    /// Height of a single lane.
    pub item_height: f64,
}

impl Geometry {
    /// Create a new geometry snapshot.
    #[inline]
    pub const fn new(width: f64, height: f64, item_height: f64) -> Self {
        Self {
            width,
            height,
            item_height,
        }
    }

    /// Number of lanes that fit vertically: `floor(height / item_height)`.
    ///
    /// Degenerate inputs (non-positive or non-finite) yield zero lanes.
    #[inline]
    pub fn max_lanes(&self) -> usize {
        if self.item_height.is_nan() || self.item_height <= 0.0 || !self.height.is_finite() {
            return 0;
        }
        let lanes = (self.height / self.item_height).floor();
        if lanes.is_finite() {
            lanes as usize
        } else {
            0
        }
    }

    /// Vertical offset of a lane, measured from the edge it is anchored to.
    #[inline]
    pub fn lane_offset(&self, row: usize) -> f64 {
        self.item_height * row as f64
    }
}
