//! Comment: One timed text annotation and its visual kind.

use crate::canvas::Rgb;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Default comment colour, opaque white.
pub const DEFAULT_COLOR: u32 = 0x00FF_FFFF;

/// How a comment moves across the surface.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum CommentKind {
    /// Scrolls from the right edge to the left edge.
    #[default]
    ScrollRight,
    /// Pinned to a row counted from the top edge.
    Top,
    /// Pinned to a row counted from the bottom edge.
    Bottom,
    /// A kind tag that did not match any known kind.
    ///
    /// Kept so that the allocator can log and drop it instead of the
    /// ingestion path rejecting the whole comment.
    Unrecognized(String),
}

impl CommentKind {
    /// Map a numeric wire code (`0` right, `1` top, `2` bottom).
    pub fn from_code(code: u64) -> Self {
        match code {
            0 => Self::ScrollRight,
            1 => Self::Top,
            2 => Self::Bottom,
            other => Self::Unrecognized(other.to_string()),
        }
    }

    /// Map a kind name (`"right"`, `"top"`, `"bottom"`).
    pub fn from_name(name: &str) -> Self {
        match name {
            "right" => Self::ScrollRight,
            "top" => Self::Top,
            "bottom" => Self::Bottom,
            other => Self::Unrecognized(other.to_string()),
        }
    }

    /// The canonical name of this kind.
    pub fn name(&self) -> &str {
        match self {
            Self::ScrollRight => "right",
            Self::Top => "top",
            Self::Bottom => "bottom",
            Self::Unrecognized(raw) => raw,
        }
    }
}

impl fmt::Display for CommentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Serialize for CommentKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for CommentKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawKind {
            Code(u64),
            Name(String),
        }

        Ok(match RawKind::deserialize(deserializer)? {
            RawKind::Code(code) => Self::from_code(code),
            RawKind::Name(name) => Self::from_name(&name),
        })
    }
}

/// A timed text annotation.
///
/// Comments are immutable once built. Missing fields fall back to
/// defaults when deserialized, so a bare `{"text": "..."}` is valid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    /// Comment text.
    pub text: String,
    /// 24-bit colour, `0xRRGGBB`.
    #[serde(default = "default_color")]
    pub color: u32,
    /// Visual kind.
    #[serde(default, rename = "type")]
    pub kind: CommentKind,
    /// Playback time the comment is attached to, in seconds.
    #[serde(default, rename = "time")]
    pub timestamp: f64,
    /// Optional border style, e.g. `"2px solid #1e90ff"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub border: Option<String>,
}

const fn default_color() -> u32 {
    DEFAULT_COLOR
}

impl Comment {
    /// Create a white scrolling comment at time zero.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            color: DEFAULT_COLOR,
            kind: CommentKind::ScrollRight,
            timestamp: 0.0,
            border: None,
        }
    }

    /// Builder: set the kind.
    #[must_use]
    pub fn with_kind(mut self, kind: CommentKind) -> Self {
        self.kind = kind;
        self
    }

    /// Builder: set the colour.
    #[must_use]
    pub const fn with_color(mut self, color: u32) -> Self {
        self.color = color;
        self
    }

    /// Builder: set the timestamp.
    #[must_use]
    pub const fn at(mut self, timestamp: f64) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Builder: set the border style.
    #[must_use]
    pub fn with_border(mut self, border: impl Into<String>) -> Self {
        self.border = Some(border.into());
        self
    }

    /// The colour unpacked for painting.
    #[inline]
    pub const fn rgb(&self) -> Rgb {
        Rgb::from_u32(self.color)
    }
}

/// Make comment text safe to paint.
///
/// Newlines and tabs collapse to a single space; every other control
/// character (ESC in particular, which would smuggle terminal escape
/// sequences into the output) becomes U+FFFD.
pub fn sanitize(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '\n' | '\r' | '\t' => ' ',
            c if c.is_control() => char::REPLACEMENT_CHARACTER,
            c => c,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_codes() {
        assert_eq!(CommentKind::from_code(0), CommentKind::ScrollRight);
        assert_eq!(CommentKind::from_code(1), CommentKind::Top);
        assert_eq!(CommentKind::from_code(2), CommentKind::Bottom);
        assert_eq!(
            CommentKind::from_code(7),
            CommentKind::Unrecognized("7".to_string())
        );
    }

    #[test]
    fn test_deserialize_defaults() {
        let comment: Comment = serde_json::from_str(r#"{"text":"hello"}"#).unwrap();
        assert_eq!(comment.color, DEFAULT_COLOR);
        assert_eq!(comment.kind, CommentKind::ScrollRight);
        assert!(comment.timestamp.abs() < f64::EPSILON);
        assert!(comment.border.is_none());
    }

    #[test]
    fn test_deserialize_kind_by_code_and_name() {
        let by_code: Comment = serde_json::from_str(r#"{"text":"a","type":1}"#).unwrap();
        let by_name: Comment = serde_json::from_str(r#"{"text":"a","type":"bottom"}"#).unwrap();
        let unknown: Comment = serde_json::from_str(r#"{"text":"a","type":"sideways"}"#).unwrap();
        assert_eq!(by_code.kind, CommentKind::Top);
        assert_eq!(by_name.kind, CommentKind::Bottom);
        assert_eq!(unknown.kind, CommentKind::Unrecognized("sideways".to_string()));
    }

    #[test]
    fn test_deserialize_time_and_color() {
        let comment: Comment =
            serde_json::from_str(r#"{"text":"a","time":12.5,"color":16711680}"#).unwrap();
        assert!((comment.timestamp - 12.5).abs() < f64::EPSILON);
        assert_eq!(comment.rgb(), Rgb::new(255, 0, 0));
    }

    #[test]
    fn test_serialize_kind_as_name() {
        let comment = Comment::new("x").with_kind(CommentKind::Top);
        let json = serde_json::to_string(&comment).unwrap();
        assert!(json.contains(r#""type":"top""#));
    }

    #[test]
    fn test_sanitize_strips_escape_sequences() {
        assert_eq!(sanitize("a\x1b[2Jb"), "a\u{fffd}[2Jb");
        assert_eq!(sanitize("line\nbreak\ttab"), "line break tab");
        assert_eq!(sanitize("弹幕 ok"), "弹幕 ok");
    }
}
