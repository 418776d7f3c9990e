//! Text measurement: How wide a comment will be once painted.
//!
//! Scrolling comments need their rendered width before a lane can be
//! chosen, because the travel distance is `surface width + text width`.
//! Measurement goes through the [`TextMeasurer`] trait so that a pixel
//! based host can plug in its own font metrics.

use std::collections::HashMap;
use unicode_width::UnicodeWidthStr;

/// Measures the rendered width of a string.
pub trait TextMeasurer {
    /// Width of `text` in surface units.
    fn measure(&mut self, text: &str) -> f64;
}

impl<F> TextMeasurer for F
where
    F: FnMut(&str) -> f64,
{
    fn measure(&mut self, text: &str) -> f64 {
        self(text)
    }
}

/// Resolved text style used for measuring.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    /// Width of one terminal column in surface units.
    pub column_width: f64,
    /// Extra width added to every measurement (borders, padding).
    pub padding: f64,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            column_width: 1.0,
            padding: 0.0,
        }
    }
}

/// Entries kept before the memo table is flushed.
const MEMO_CAPACITY: usize = 4096;

/// Column-counting measurer backed by `unicode-width`.
///
/// The style is resolved lazily on the first call and then
/// reused for the rest of the session; results are memoized per text.
pub struct ColumnMeasurer {
    /// Source of the style, consulted once.
    resolver: Option<Box<dyn FnOnce() -> TextStyle + Send>>,
    /// Style in effect after the first measurement.
    style: Option<TextStyle>,
    /// Memoized widths keyed by text.
    memo: HashMap<String, f64>,
}

impl ColumnMeasurer {
    /// Create a measurer that resolves its style from `resolver` on first use.
    pub fn new(resolver: impl FnOnce() -> TextStyle + Send + 'static) -> Self {
        Self {
            resolver: Some(Box::new(resolver)),
            style: None,
            memo: HashMap::new(),
        }
    }

    /// Create a measurer with an already-known style.
    pub fn with_style(style: TextStyle) -> Self {
        Self {
            resolver: None,
            style: Some(style),
            memo: HashMap::new(),
        }
    }

    /// The resolved style, if measurement has happened (or it was given).
    pub const fn style(&self) -> Option<TextStyle> {
        self.style
    }

    /// Number of memoized entries.
    pub fn memoized(&self) -> usize {
        self.memo.len()
    }

    fn resolve_style(&mut self) -> TextStyle {
        if let Some(style) = self.style {
            return style;
        }
        let style = self.resolver.take().map_or_else(TextStyle::default, |resolver| resolver());
        self.style = Some(style);
        style
    }
}

impl Default for ColumnMeasurer {
    fn default() -> Self {
        Self::with_style(TextStyle::default())
    }
}

impl TextMeasurer for ColumnMeasurer {
    fn measure(&mut self, text: &str) -> f64 {
        let style = self.resolve_style();
        if let Some(width) = self.memo.get(text) {
            return *width;
        }
        let width = UnicodeWidthStr::width(text) as f64 * style.column_width + style.padding;
        if self.memo.len() >= MEMO_CAPACITY {
            self.memo.clear();
        }
        self.memo.insert(text.to_string(), width);
        width
    }
}

impl std::fmt::Debug for ColumnMeasurer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ColumnMeasurer")
            .field("style", &self.style)
            .field("memoized", &self.memo.len())
            .finish_non_exhaustive()
    }
}
