//! Comment module: The data carried through the feed into lanes.

#[allow(clippy::module_inception)]
mod comment;

pub use comment::{sanitize, Comment, CommentKind, DEFAULT_COLOR};
