//! Layout module: Surface geometry snapshots.
//!
//! Geometry is read at the start of every allocation decision and on
//! resize. There is no layout tree: a lane is just a row index times the
//! item height.

mod geometry;

pub use geometry::Geometry;
