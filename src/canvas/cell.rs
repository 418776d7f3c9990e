//! Cell: The atomic unit of the overlay canvas.
//!
//! Comments are painted glyph by glyph into cells. A cell holds one
//! display character, its colour and style modifiers, and flags that mark
//! the trailing half of a double-width glyph.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

/// True-color RGB representation.
///
/// Comment colours travel as 24-bit integers (`0xRRGGBB`); this is the
/// unpacked form used for painting and for border styles.
#[repr(C)]
#[derive(Clone, Copy, PartialEq, Eq, Default, Hash, Serialize, Deserialize)]
#[serde(from = "u32", into = "u32")]
pub struct Rgb {
    /// Red channel (0-255)
    pub r: u8,
    /// Green channel (0-255)
    pub g: u8,
    /// Blue channel (0-255)
    pub b: u8,
}

impl Rgb {
    /// Create a new RGB color.
    #[inline]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Black (0, 0, 0)
    pub const BLACK: Self = Self::new(0, 0, 0);
    /// White (255, 255, 255)
    pub const WHITE: Self = Self::new(255, 255, 255);
    /// Default comment colour (opaque white).
    pub const DEFAULT_FG: Self = Self::WHITE;

    /// Create from a 24-bit hex color (e.g., 0xFF5500).
    ///
    /// Bits above the low 24 are ignored.
    #[inline]
    pub const fn from_u32(hex: u32) -> Self {
        Self::new(
            ((hex >> 16) & 0xFF) as u8,
            ((hex >> 8) & 0xFF) as u8,
            (hex & 0xFF) as u8,
        )
    }

    /// Pack back into a 24-bit integer.
    #[inline]
    pub const fn to_u32(self) -> u32 {
        ((self.r as u32) << 16) | ((self.g as u32) << 8) | self.b as u32
    }
}

impl std::fmt::Debug for Rgb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl std::fmt::Display for Rgb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl From<(u8, u8, u8)> for Rgb {
    #[inline]
    fn from((r, g, b): (u8, u8, u8)) -> Self {
        Self::new(r, g, b)
    }
}

impl From<u32> for Rgb {
    /// Convert from a 24-bit hex color (e.g., 0xFF5500)
    #[inline]
    fn from(hex: u32) -> Self {
        Self::from_u32(hex)
    }
}

impl From<Rgb> for u32 {
    #[inline]
    fn from(rgb: Rgb) -> Self {
        rgb.to_u32()
    }
}

bitflags! {
    /// Text style modifiers.
    ///
    /// These can be combined using bitwise OR.
    ///
    /// # Example
    /// ```
    /// use danmaku::Modifiers;
    /// let style = Modifiers::DIM | Modifiers::UNDERLINE;
    /// assert!(style.contains(Modifiers::DIM));
    /// ```
    #[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Modifiers: u8 {
        /// Bold text
        const BOLD = 0b0000_0001;
        /// Dim/faint text (low overlay opacity)
        const DIM = 0b0000_0010;
        /// Italic text
        const ITALIC = 0b0000_0100;
        /// Underlined text (bordered comments)
        const UNDERLINE = 0b0000_1000;
    }
}

impl std::fmt::Debug for Modifiers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        bitflags::parser::to_writer(self, f)
    }
}

bitflags! {
    /// Cell-level flags for special states.
    #[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct CellFlags: u8 {
        /// Cell carries a painted glyph (as opposed to transparent background)
        const PAINTED = 0b0000_0001;
        /// This cell is a continuation of a wide character
        const WIDE_CONTINUATION = 0b0000_0100;
    }
}

impl std::fmt::Debug for CellFlags {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        bitflags::parser::to_writer(self, f)
    }
}

/// A single canvas cell.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Cell {
    /// Display character.
    symbol: char,
    /// Display width (0 = continuation, 1 = normal, 2 = wide CJK).
    display_width: u8,
    /// Foreground color.
    fg: Rgb,
    /// Text modifiers.
    modifiers: Modifiers,
    /// Cell flags.
    flags: CellFlags,
}

impl Default for Cell {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl Cell {
    /// A transparent cell (nothing painted).
    pub const EMPTY: Self = Self {
        symbol: ' ',
        display_width: 1,
        fg: Rgb::DEFAULT_FG,
        modifiers: Modifiers::empty(),
        flags: CellFlags::empty(),
    };

    /// Create a painted cell from any character.
    #[inline]
    pub fn from_char(c: char) -> Self {
        let width = unicode_width::UnicodeWidthChar::width(c).unwrap_or(0);
        Self {
            symbol: c,
            display_width: u8::try_from(width).unwrap_or(1),
            fg: Rgb::DEFAULT_FG,
            modifiers: Modifiers::empty(),
            flags: CellFlags::PAINTED,
        }
    }

    /// Create a wide-character continuation cell.
    ///
    /// This is placed after a wide CJK character that takes 2 columns.
    #[inline]
    pub const fn wide_continuation() -> Self {
        Self {
            symbol: ' ',
            display_width: 0,
            fg: Rgb::DEFAULT_FG,
            modifiers: Modifiers::empty(),
            flags: CellFlags::PAINTED.union(CellFlags::WIDE_CONTINUATION),
        }
    }

    /// The display character.
    #[inline]
    pub const fn symbol(&self) -> char {
        self.symbol
    }

    /// Check if this is a wide character continuation.
    #[inline]
    pub const fn is_wide_continuation(&self) -> bool {
        self.flags.contains(CellFlags::WIDE_CONTINUATION)
    }

    /// Check if anything was painted into this cell.
    #[inline]
    pub const fn is_painted(&self) -> bool {
        self.flags.contains(CellFlags::PAINTED)
    }

    /// Get the display width.
    #[inline]
    pub const fn display_width(&self) -> u8 {
        self.display_width
    }

    /// Get the foreground color.
    #[inline]
    pub const fn fg(&self) -> Rgb {
        self.fg
    }

    /// Get the modifiers.
    #[inline]
    pub const fn modifiers(&self) -> Modifiers {
        self.modifiers
    }

    /// Builder: set foreground color.
    #[inline]
    #[must_use]
    pub const fn with_fg(mut self, fg: Rgb) -> Self {
        self.fg = fg;
        self
    }

    /// Builder: set modifiers.
    #[inline]
    #[must_use]
    pub const fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }
}

impl std::fmt::Debug for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cell")
            .field("symbol", &self.symbol)
            .field("width", &self.display_width)
            .field("fg", &self.fg)
            .field("modifiers", &self.modifiers)
            .field("flags", &self.flags)
            .finish()
    }
}
