//! Canvas module: The cell grid that comments are painted into.
//!
//! This module contains:
//! - [`Cell`]: One glyph with colour and style
//! - [`Canvas`]: A mostly-transparent grid of cells sized to the surface
//! - [`Rgb`]: True-color representation shared with comment colours
//! - [`Modifiers`]: Text style bitflags

mod cell;
#[allow(clippy::module_inception)]
mod canvas;

pub use canvas::Canvas;
pub use cell::{Cell, CellFlags, Modifiers, Rgb};
