//! Canvas: A grid of cells the overlay paints comments into.
//!
//! Cells are stored in row-major order in one contiguous `Vec`. Unlike a
//! full terminal buffer the canvas is mostly transparent: only cells that
//! carry a comment glyph are flagged as painted.

use super::cell::{Cell, Modifiers, Rgb};
use unicode_segmentation::UnicodeSegmentation;

/// A grid of cells representing the overlay area.
#[derive(Clone, PartialEq, Eq)]
pub struct Canvas {
    /// Contiguous cell storage (row-major order).
    cells: Vec<Cell>,
    /// Width in columns.
    width: u16,
    /// Height in rows.
    height: u16,
}

impl Canvas {
    /// Create a new transparent canvas with the given dimensions.
    ///
    /// Zero-sized canvases are allowed; painting into them is a no-op.
    pub fn new(width: u16, height: u16) -> Self {
        let size = (width as usize) * (height as usize);
        Self {
            cells: vec![Cell::EMPTY; size],
            width,
            height,
        }
    }

    /// Get the canvas width.
    #[inline]
    pub const fn width(&self) -> u16 {
        self.width
    }

    /// Get the canvas height.
    #[inline]
    pub const fn height(&self) -> u16 {
        self.height
    }

    /// Get a reference to the underlying cell slice.
    #[inline]
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Convert (x, y) coordinates to a linear index.
    ///
    /// Returns `None` if coordinates are out of bounds.
    #[inline]
    pub fn index_of(&self, x: u16, y: u16) -> Option<usize> {
        if x < self.width && y < self.height {
            Some((y as usize) * (self.width as usize) + (x as usize))
        } else {
            None
        }
    }

    /// Get a reference to a cell at (x, y).
    #[inline]
    pub fn get(&self, x: u16, y: u16) -> Option<&Cell> {
        self.index_of(x, y).map(|i| &self.cells[i])
    }

    /// Set a cell at (x, y).
    ///
    /// Returns `false` if coordinates are out of bounds.
    #[inline]
    pub fn set(&mut self, x: u16, y: u16, cell: Cell) -> bool {
        if let Some(idx) = self.index_of(x, y) {
            self.cells[idx] = cell;
            true
        } else {
            false
        }
    }

    /// Paint a run of text starting at column `x` on row `y`.
    ///
    /// `x` may be negative or past the right edge: scrolling comments slide
    /// in and out of view, so glyphs outside the canvas are clipped rather
    /// than shifted. A wide glyph that straddles an edge is dropped whole.
    ///
    /// Returns the number of columns actually painted.
    pub fn paint_text(&mut self, x: i32, y: u16, text: &str, fg: Rgb, modifiers: Modifiers) -> u16 {
        if y >= self.height {
            return 0;
        }

        let mut col = x;
        let mut painted = 0u16;
        for grapheme in text.graphemes(true) {
            let width = unicode_width::UnicodeWidthStr::width(grapheme) as i32;
            if width == 0 {
                continue;
            }
            if col >= i32::from(self.width) {
                break;
            }
            let fits = col >= 0 && col + width <= i32::from(self.width);
            if fits {
                let Some(symbol) = grapheme.chars().next() else {
                    continue;
                };
                let cell = Cell::from_char(symbol).with_fg(fg).with_modifiers(modifiers);
                let at = col as u16;
                self.set(at, y, cell);
                if width == 2 {
                    self.set(at + 1, y, Cell::wide_continuation().with_fg(fg));
                }
                painted += width as u16;
            }
            col += width;
        }
        painted
    }

    /// Clear the entire canvas back to transparent.
    pub fn clear(&mut self) {
        self.cells.fill(Cell::EMPTY);
    }

    /// Resize the canvas, discarding content.
    ///
    /// Overlay content is repainted every frame, so nothing is preserved.
    pub fn resize(&mut self, new_width: u16, new_height: u16) {
        if new_width == self.width && new_height == self.height {
            return;
        }
        self.cells = vec![Cell::EMPTY; (new_width as usize) * (new_height as usize)];
        self.width = new_width;
        self.height = new_height;
    }

    /// Get an iterator over rows.
    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> {
        self.cells.chunks(self.width.max(1) as usize)
    }

    /// Render one row as plain text, skipping wide-glyph continuations.
    ///
    /// Mostly useful for assertions and logging.
    pub fn row_text(&self, y: u16) -> String {
        let mut out = String::new();
        for x in 0..self.width {
            if let Some(cell) = self.get(x, y) {
                if !cell.is_wide_continuation() {
                    out.push(cell.symbol());
                }
            }
        }
        out
    }

    /// Count painted cells (including wide continuations).
    pub fn painted_cells(&self) -> usize {
        self.cells.iter().filter(|c| c.is_painted()).count()
    }
}

impl std::fmt::Debug for Canvas {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Canvas")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("painted", &self.painted_cells())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canvas_new() {
        let canvas = Canvas::new(80, 24);
        assert_eq!(canvas.width(), 80);
        assert_eq!(canvas.height(), 24);
        assert_eq!(canvas.cells().len(), 80 * 24);
        assert_eq!(canvas.painted_cells(), 0);
    }

    #[test]
    fn test_canvas_zero_sized() {
        let mut canvas = Canvas::new(0, 0);
        assert_eq!(canvas.paint_text(0, 0, "hi", Rgb::WHITE, Modifiers::empty()), 0);
    }

    #[test]
    fn test_paint_text_inside() {
        let mut canvas = Canvas::new(10, 2);
        let painted = canvas.paint_text(2, 1, "abc", Rgb::WHITE, Modifiers::empty());
        assert_eq!(painted, 3);
        assert_eq!(canvas.row_text(1), "  abc     ");
    }

    #[test]
    fn test_paint_text_clips_left() {
        let mut canvas = Canvas::new(5, 1);
        let painted = canvas.paint_text(-2, 0, "abcd", Rgb::WHITE, Modifiers::empty());
        assert_eq!(painted, 2);
        assert_eq!(canvas.row_text(0), "cd   ");
    }

    #[test]
    fn test_paint_text_clips_right() {
        let mut canvas = Canvas::new(5, 1);
        let painted = canvas.paint_text(3, 0, "abcd", Rgb::WHITE, Modifiers::empty());
        assert_eq!(painted, 2);
        assert_eq!(canvas.row_text(0), "   ab");
    }

    #[test]
    fn test_paint_wide_glyphs() {
        let mut canvas = Canvas::new(6, 1);
        let painted = canvas.paint_text(0, 0, "弹幕", Rgb::WHITE, Modifiers::empty());
        assert_eq!(painted, 4);
        assert!(canvas.get(1, 0).unwrap().is_wide_continuation());
        assert_eq!(canvas.row_text(0), "弹幕  ");
    }

    #[test]
    fn test_wide_glyph_straddling_edge_is_dropped() {
        let mut canvas = Canvas::new(3, 1);
        let painted = canvas.paint_text(-1, 0, "弹a", Rgb::WHITE, Modifiers::empty());
        assert_eq!(painted, 1);
        assert_eq!(canvas.row_text(0), " a ");
    }

    #[test]
    fn test_canvas_clear_and_resize() {
        let mut canvas = Canvas::new(4, 2);
        canvas.paint_text(0, 0, "x", Rgb::WHITE, Modifiers::empty());
        canvas.clear();
        assert_eq!(canvas.painted_cells(), 0);

        canvas.resize(8, 3);
        assert_eq!(canvas.width(), 8);
        assert_eq!(canvas.cells().len(), 24);
        assert!(canvas.get(7, 2).is_some());
    }
}
