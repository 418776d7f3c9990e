//! Canvas surface: Paints elements into a cell grid each frame.
//!
//! Positions are derived from the stage clock at paint time, so a frame
//! can be painted at any moment without the surface holding animation
//! state of its own.

use super::{ElementId, ElementSpec, RenderSurface};
use crate::canvas::{Canvas, Modifiers};
use crate::lane::Direction;
use std::collections::BTreeMap;

/// Elements painted below this opacity use the `DIM` modifier.
const DIM_THRESHOLD: f32 = 0.5;

/// A [`RenderSurface`] backed by a [`Canvas`].
///
/// One surface unit is one terminal cell, so the overlay should be
/// configured with an item height of 1.
#[derive(Debug)]
pub struct CanvasSurface {
    canvas: Canvas,
    elements: BTreeMap<ElementId, ElementSpec>,
    next_id: u64,
}

impl CanvasSurface {
    /// Create a surface of `width` x `height` cells.
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            canvas: Canvas::new(width, height),
            elements: BTreeMap::new(),
            next_id: 0,
        }
    }

    /// Resize the underlying canvas. Elements are kept; the overlay's
    /// `resize` updates their transforms.
    pub fn resize(&mut self, width: u16, height: u16) {
        self.canvas.resize(width, height);
    }

    /// The canvas as last painted.
    #[inline]
    pub const fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    /// Number of live elements.
    #[inline]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Check if the surface has no live elements.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Look up a live element.
    pub fn element(&self, id: ElementId) -> Option<&ElementSpec> {
        self.elements.get(&id)
    }

    /// Live elements in creation order.
    pub fn elements(&self) -> impl Iterator<Item = (ElementId, &ElementSpec)> {
        self.elements.iter().map(|(id, spec)| (*id, spec))
    }

    /// Horizontal position of an element's left edge at `now`.
    pub fn left_edge(spec: &ElementSpec, now: f64) -> f64 {
        match spec.direction {
            Direction::Right => {
                let progress = if spec.duration > 0.0 {
                    ((now - spec.created_at) / spec.duration).clamp(0.0, 1.0)
                } else {
                    1.0
                };
                spec.travel - progress * (spec.travel + spec.width)
            }
            // Centered.
            Direction::Top | Direction::Bottom => (spec.travel - spec.width) / 2.0,
        }
    }

    /// Repaint every live element for stage time `now`.
    pub fn paint(&mut self, now: f64) -> &Canvas {
        self.canvas.clear();
        let height = i64::from(self.canvas.height());

        for spec in self.elements.values() {
            let offset = spec.offset.floor() as i64;
            let y = match spec.direction {
                Direction::Right | Direction::Top => offset,
                Direction::Bottom => height - 1 - offset,
            };
            let Ok(y) = u16::try_from(y) else {
                continue;
            };

            let mut modifiers = Modifiers::empty();
            if spec.opacity < DIM_THRESHOLD {
                modifiers |= Modifiers::DIM;
            }
            if spec.border.is_some() {
                modifiers |= Modifiers::UNDERLINE;
            }

            let x = Self::left_edge(spec, now).round() as i32;
            self.canvas.paint_text(x, y, &spec.text, spec.color, modifiers);
        }

        &self.canvas
    }
}

impl RenderSurface for CanvasSurface {
    fn width(&self) -> f64 {
        f64::from(self.canvas.width())
    }

    fn height(&self) -> f64 {
        f64::from(self.canvas.height())
    }

    fn create_element(&mut self, spec: &ElementSpec) -> ElementId {
        let id = ElementId(self.next_id);
        self.next_id += 1;
        self.elements.insert(id, spec.clone());
        id
    }

    fn remove_element(&mut self, id: ElementId) {
        self.elements.remove(&id);
    }

    fn set_opacity(&mut self, id: ElementId, opacity: f32) {
        if let Some(spec) = self.elements.get_mut(&id) {
            spec.opacity = opacity;
        }
    }

    fn translate(&mut self, id: ElementId, travel: f64) {
        if let Some(spec) = self.elements.get_mut(&id) {
            spec.travel = travel;
        }
    }

    fn clear(&mut self) {
        self.elements.clear();
        self.canvas.clear();
    }
}
