//! Tunables for the story and its charts.
//!
//! Everything has a default, so a config file only needs the keys it
//! changes. Geometry is validated once here; the views trust it.

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::scroll::{FadeEnvelope, ScrollError};
use crate::timeline::{LabelLayout, LineBounds, TimelineError};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Scroll(#[from] ScrollError),
    #[error(transparent)]
    Timeline(#[from] TimelineError),
    #[error("{0} must be positive")]
    NonPositive(&'static str),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TimelineConfig {
    pub width: f64,
    pub height: f64,
    /// x of the vertical line.
    pub line_x: f64,
    /// Inset of the line from the top and bottom edges.
    pub inset: f64,
    pub description_x: f64,
    pub minimum_gap: f64,
    pub dot_radius: f64,
    pub font_size: f64,
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self {
            width: 625.0,
            height: 400.0,
            line_x: 40.0,
            inset: 10.0,
            description_x: 110.0,
            minimum_gap: 20.0,
            dot_radius: 6.0,
            font_size: 14.0,
        }
    }
}

impl TimelineConfig {
    pub fn layout(&self) -> Result<LabelLayout, TimelineError> {
        let bounds = LineBounds::new(self.inset, self.height - self.inset)?;
        LabelLayout::new(bounds, self.minimum_gap)
    }
}

/// Outer size and margins of a histogram.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ChartConfig {
    pub width: f64,
    pub height: f64,
    pub margin_top: f64,
    pub margin_right: f64,
    pub margin_bottom: f64,
    pub margin_left: f64,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            width: 450.0,
            height: 200.0,
            margin_top: 20.0,
            margin_right: 50.0,
            margin_bottom: 50.0,
            margin_left: 56.0,
        }
    }
}

impl ChartConfig {
    pub fn inner_width(&self) -> f64 {
        (self.width - self.margin_left - self.margin_right).max(0.0)
    }

    pub fn inner_height(&self) -> f64 {
        (self.height - self.margin_top - self.margin_bottom).max(0.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HexbinConfig {
    /// Radius of the collection-spot bins on the story map.
    pub spot_radius: f64,
    /// Radius of the labelled heatmap bins.
    pub heatmap_radius: f64,
}

impl Default for HexbinConfig {
    fn default() -> Self {
        Self {
            spot_radius: 3.0,
            heatmap_radius: 25.0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StoryConfig {
    pub fade: FadeEnvelope,
    pub timeline: TimelineConfig,
    pub hexbin: HexbinConfig,
    pub histogram: ChartConfig,
}

impl StoryConfig {
    pub fn from_json(data: &[u8]) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_slice(data)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let data = std::fs::read(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let config = Self::from_json(&data)?;
        tracing::debug!(path = %path.display(), "loaded story config");
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.timeline.layout()?;
        let positive = [
            ("hexbin.spot_radius", self.hexbin.spot_radius),
            ("hexbin.heatmap_radius", self.hexbin.heatmap_radius),
            ("histogram.width", self.histogram.inner_width()),
            ("histogram.height", self.histogram.inner_height()),
        ];
        for (name, value) in positive {
            if value.is_nan() || value <= 0.0 {
                return Err(ConfigError::NonPositive(name));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_gives_defaults() {
        let config = StoryConfig::from_json(b"{}").unwrap();
        assert_eq!(config, StoryConfig::default());
        assert_eq!(config.fade.threshold(), 0.25);
        let layout = config.timeline.layout().unwrap();
        assert_eq!(layout.bounds.start, 10.0);
        assert_eq!(layout.bounds.end, 390.0);
    }

    #[test]
    fn partial_overrides() {
        let config = StoryConfig::from_json(
            br#"{"fade":{"threshold":0.1},"timeline":{"height":600},"hexbin":{"heatmap_radius":20}}"#,
        )
        .unwrap();
        assert_eq!(config.fade.threshold(), 0.1);
        assert_eq!(config.timeline.height, 600.0);
        assert_eq!(config.timeline.line_x, 40.0);
        assert_eq!(config.hexbin.heatmap_radius, 20.0);
        assert_eq!(config.hexbin.spot_radius, 3.0);
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(StoryConfig::from_json(br#"{"fade":{"threshold":0.75}}"#).is_err());
        assert!(matches!(
            StoryConfig::from_json(br#"{"timeline":{"minimum_gap":0}}"#),
            Err(ConfigError::Timeline(_))
        ));
        assert!(matches!(
            StoryConfig::from_json(br#"{"hexbin":{"spot_radius":-1}}"#),
            Err(ConfigError::NonPositive("hexbin.spot_radius"))
        ));
        assert!(StoryConfig::from_json(br#"{"unknown":1}"#).is_err());
    }
}
