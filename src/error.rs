//! Error types.
//!
//! Only construction can fail. Once an overlay exists every operation
//! absorbs bad input (defaults, drops) instead of returning an error.

use thiserror::Error;

/// Errors raised while building or loading a configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Lane height must be a positive, finite number.
    #[error("item height must be positive and finite, got {0}")]
    InvalidItemHeight(f64),

    /// Scroll speed must be a positive, finite number.
    #[error("scroll speed must be positive and finite, got {0}")]
    InvalidSpeed(f64),

    /// Fixed comment duration must be a positive, finite number.
    #[error("fixed duration must be positive and finite, got {0}")]
    InvalidFixedDuration(f64),

    /// Lane gap must be a non-negative, finite number.
    #[error("lane gap must be non-negative and finite, got {0}")]
    InvalidLaneGap(f64),

    /// Opacity must lie in `[0, 1]`.
    #[error("opacity must be within 0.0..=1.0, got {0}")]
    InvalidOpacity(f32),

    /// The heartbeat needs a non-zero interval.
    #[error("frame interval must be non-zero")]
    ZeroFrameInterval,

    /// The configuration document could not be parsed.
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),
}
