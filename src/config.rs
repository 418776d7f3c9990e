//! Configuration for the overlay.

use crate::canvas::Rgb;
use crate::error::ConfigError;
use crate::feed::FeedMode;
use crate::lane::AllocatorSettings;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Scroll speed presets.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScrollSpeed {
    /// 120 units per second.
    Slow,
    /// 180 units per second: a 100 px comment crosses an 800 px player in 5 s.
    #[default]
    Medium,
    /// 270 units per second.
    Fast,
    /// Explicit units per second.
    Custom(f64),
}

impl ScrollSpeed {
    /// Resolve to surface units per second.
    pub const fn pixels_per_second(self) -> f64 {
        match self {
            Self::Slow => 120.0,
            Self::Medium => 180.0,
            Self::Fast => 270.0,
            Self::Custom(speed) => speed,
        }
    }
}

/// Configuration for an [`Overlay`](crate::Overlay).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DanmakuConfig {
    /// Height of one lane in surface units.
    pub item_height: f64,
    /// Scroll speed.
    pub speed: ScrollSpeed,
    /// Display duration of top/bottom comments, in seconds.
    pub fixed_duration: f64,
    /// Minimum gap between consecutive comments in a scroll lane.
    pub lane_gap: f64,
    /// Start in unlimited mode.
    pub unlimited: bool,
    /// Start with the overlay visible.
    pub show: bool,
    /// Initial opacity, `0.0..=1.0`.
    pub opacity: f32,
    /// Border colour applied to comments sent through the live path.
    pub border_color: Rgb,
    /// Ingestion policy.
    pub mode: FeedMode,
    /// Heartbeat interval in milliseconds.
    pub frame_interval_ms: u64,
}

impl Default for DanmakuConfig {
    fn default() -> Self {
        Self {
            item_height: 30.0,
            speed: ScrollSpeed::Medium,
            fixed_duration: 4.0,
            lane_gap: 10.0,
            unlimited: false,
            show: true,
            opacity: 0.7,
            border_color: Rgb::new(0xb7, 0xda, 0xff),
            mode: FeedMode::Live,
            frame_interval_ms: 16,
        }
    }
}

impl DanmakuConfig {
    /// Parse a JSON document; absent keys take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check every field for values the scheduler cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.item_height.is_finite() && self.item_height > 0.0) {
            return Err(ConfigError::InvalidItemHeight(self.item_height));
        }
        let speed = self.speed.pixels_per_second();
        if !(speed.is_finite() && speed > 0.0) {
            return Err(ConfigError::InvalidSpeed(speed));
        }
        if !(self.fixed_duration.is_finite() && self.fixed_duration > 0.0) {
            return Err(ConfigError::InvalidFixedDuration(self.fixed_duration));
        }
        if !(self.lane_gap.is_finite() && self.lane_gap >= 0.0) {
            return Err(ConfigError::InvalidLaneGap(self.lane_gap));
        }
        if !(0.0..=1.0).contains(&self.opacity) {
            return Err(ConfigError::InvalidOpacity(self.opacity));
        }
        if self.frame_interval_ms == 0 {
            return Err(ConfigError::ZeroFrameInterval);
        }
        Ok(())
    }

    /// Heartbeat interval.
    pub const fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_interval_ms)
    }

    /// Allocator settings derived from this configuration.
    pub const fn allocator_settings(&self) -> AllocatorSettings {
        AllocatorSettings {
            speed: self.speed.pixels_per_second(),
            fixed_duration: self.fixed_duration,
            lane_gap: self.lane_gap,
            unlimited: self.unlimited,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(DanmakuConfig::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_bad_values() {
        let bad_height = DanmakuConfig {
            item_height: 0.0,
            ..DanmakuConfig::default()
        };
        assert!(matches!(bad_height.validate(), Err(ConfigError::InvalidItemHeight(_))));

        let bad_speed = DanmakuConfig {
            speed: ScrollSpeed::Custom(f64::NAN),
            ..DanmakuConfig::default()
        };
        assert!(matches!(bad_speed.validate(), Err(ConfigError::InvalidSpeed(_))));

        let bad_gap = DanmakuConfig {
            lane_gap: -1.0,
            ..DanmakuConfig::default()
        };
        assert!(matches!(bad_gap.validate(), Err(ConfigError::InvalidLaneGap(_))));

        let bad_opacity = DanmakuConfig {
            opacity: 1.5,
            ..DanmakuConfig::default()
        };
        assert!(matches!(bad_opacity.validate(), Err(ConfigError::InvalidOpacity(_))));

        let bad_interval = DanmakuConfig {
            frame_interval_ms: 0,
            ..DanmakuConfig::default()
        };
        assert!(matches!(bad_interval.validate(), Err(ConfigError::ZeroFrameInterval)));
    }

    #[test]
    fn test_from_json_partial() {
        let config = DanmakuConfig::from_json_str(
            r#"{"item_height": 1, "speed": {"custom": 12.5}, "mode": "timestamped", "unlimited": true}"#,
        )
        .unwrap();
        assert!((config.item_height - 1.0).abs() < f64::EPSILON);
        assert!((config.speed.pixels_per_second() - 12.5).abs() < f64::EPSILON);
        assert_eq!(config.mode, FeedMode::Timestamped);
        assert!(config.unlimited);
        assert!((config.opacity - 0.7).abs() < f32::EPSILON);
    }

    #[test]
    fn test_from_json_rejects_garbage() {
        assert!(matches!(
            DanmakuConfig::from_json_str("{not json"),
            Err(ConfigError::Parse(_))
        ));
        assert!(matches!(
            DanmakuConfig::from_json_str(r#"{"opacity": 2.0}"#),
            Err(ConfigError::InvalidOpacity(_))
        ));
    }

    #[test]
    fn test_presets() {
        assert!(ScrollSpeed::Slow.pixels_per_second() < ScrollSpeed::Medium.pixels_per_second());
        assert!(ScrollSpeed::Fast.pixels_per_second() > ScrollSpeed::Medium.pixels_per_second());
    }
}
