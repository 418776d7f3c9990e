//! Rendering surfaces: Where dispatched comments become visible.
//!
//! The scheduler never draws. It hands each placed comment to a
//! [`RenderSurface`] as an [`ElementSpec`] and later tells the surface to
//! remove it. [`CanvasSurface`] is the bundled implementation that
//! paints into a cell [`Canvas`](crate::canvas::Canvas) for terminal
//! presentation.

mod canvas_surface;

pub use canvas_surface::CanvasSurface;

use crate::canvas::Rgb;
use crate::lane::Direction;

/// Handle to an element owned by a surface.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct ElementId(pub u64);

/// Everything a surface needs to draw one comment.
#[derive(Debug, Clone, PartialEq)]
pub struct ElementSpec {
    /// Sanitized text.
    pub text: String,
    /// Text colour.
    pub color: Rgb,
    /// Lane family, which decides the anchor edge and motion.
    pub direction: Direction,
    /// Distance from the anchor edge (top for right/top, bottom for bottom).
    pub offset: f64,
    /// Measured width.
    pub width: f64,
    /// Travel or display duration.
    pub duration: f64,
    /// Stage time the element appeared.
    pub created_at: f64,
    /// Opacity, `0.0..=1.0`.
    pub opacity: f32,
    /// Optional border style.
    pub border: Option<String>,
    /// Horizontal travel distance for scrolling elements (the surface
    /// width when the transform was last set).
    pub travel: f64,
}

/// Capabilities the overlay needs from whatever draws comments.
pub trait RenderSurface {
    /// Current surface width.
    fn width(&self) -> f64;

    /// Current surface height.
    fn height(&self) -> f64;

    /// Create a rendered element and return its handle.
    fn create_element(&mut self, spec: &ElementSpec) -> ElementId;

    /// Remove a rendered element. Unknown handles are ignored.
    fn remove_element(&mut self, id: ElementId);

    /// Change the opacity of an element.
    fn set_opacity(&mut self, id: ElementId, opacity: f32);

    /// Reset the horizontal transform of an element after a resize.
    fn translate(&mut self, id: ElementId, travel: f64);

    /// Remove every element.
    fn clear(&mut self);
}
