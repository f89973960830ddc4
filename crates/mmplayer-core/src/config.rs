//! Widget configuration

use crate::captions::DEFAULT_CAPTION_CLASS;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Media widget configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WidgetConfig {
    /// Fraction of the duration skipped by rewind/fast-forward
    pub seek_step_ratio: f64,
    /// Volume change per up/down key press
    pub volume_step: f64,
    /// Timeout for external caption requests in milliseconds
    pub fetch_timeout_ms: u64,
    /// Strip img/object/embed tags from fetched caption documents
    pub strip_embedded_media: bool,
    /// Class marking inline caption elements
    pub caption_class: String,
    /// Prefix for generated widget ids
    pub id_prefix: String,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            seek_step_ratio: 0.05,
            volume_step: 0.1,
            fetch_timeout_ms: 10_000,
            strip_embedded_media: true,
            caption_class: DEFAULT_CAPTION_CLASS.to_string(),
            id_prefix: "wb-mediaplayer-".to_string(),
        }
    }
}

impl WidgetConfig {
    /// Load from JSON; missing fields keep their defaults
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| Error::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges
    pub fn validate(&self) -> Result<()> {
        if !(self.seek_step_ratio > 0.0 && self.seek_step_ratio <= 1.0) {
            return Err(Error::InvalidConfig(format!(
                "seek_step_ratio must be in (0, 1], got {}",
                self.seek_step_ratio
            )));
        }
        if !(self.volume_step > 0.0 && self.volume_step <= 1.0) {
            return Err(Error::InvalidConfig(format!(
                "volume_step must be in (0, 1], got {}",
                self.volume_step
            )));
        }
        if self.fetch_timeout_ms == 0 {
            return Err(Error::InvalidConfig("fetch_timeout_ms must be positive".into()));
        }
        if self.caption_class.trim().is_empty() {
            return Err(Error::InvalidConfig("caption_class must not be empty".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = WidgetConfig::default();
        assert_eq!(config.seek_step_ratio, 0.05);
        assert_eq!(config.volume_step, 0.1);
        assert_eq!(config.caption_class, "wb-tmtxt");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json() {
        let config = WidgetConfig::from_json(r#"{"volume_step": 0.25}"#).unwrap();
        assert_eq!(config.volume_step, 0.25);
        assert_eq!(config.fetch_timeout_ms, 10_000);
    }

    #[test]
    fn test_invalid_json_values() {
        assert!(WidgetConfig::from_json(r#"{"seek_step_ratio": 0}"#).is_err());
        assert!(WidgetConfig::from_json(r#"{"caption_class": " "}"#).is_err());
        assert!(WidgetConfig::from_json("not json").is_err());
    }
}
