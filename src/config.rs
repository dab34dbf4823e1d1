//! Configuration for view frames, the find engine and the feature map.
//!
//! All structs carry sensible defaults and round-trip through JSON so a host
//! can persist them next to its other settings.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{NavError, Result};

/// Master configuration for a `ViewFrame`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameConfig {
    /// Explicit view type order; empty means registry priority order
    pub view_type_priority: Vec<String>,
    /// Prefer graph renderings for function navigation
    pub graph_view_preferred: bool,
    /// Passed to view type factories when building surfaces
    pub create_dynamic_widgets: bool,
    /// Maximum depth of the back stack (0 = unbounded)
    pub max_history: usize,
    /// Find engine configuration
    pub find: FindConfig,
    /// Feature map configuration
    pub feature_map: FeatureMapConfig,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            view_type_priority: Vec::new(),
            graph_view_preferred: false,
            create_dynamic_widgets: false,
            max_history: 0,
            find: FindConfig::default(),
            feature_map: FeatureMapConfig::default(),
        }
    }
}

impl FrameConfig {
    /// Check that every value is usable.
    pub fn validate(&self) -> Result<()> {
        self.find.validate()?;
        self.feature_map.validate()
    }

    /// Serialize to JSON string.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Deserialize from JSON string; missing fields take their defaults.
    pub fn from_json(json_str: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json_str)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a JSON configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }
}

/// Find engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FindConfig {
    /// Bytes scanned between progress callbacks during data search
    pub chunk_size: usize,
    /// Disassembly lines rendered between progress callbacks
    pub progress_interval_lines: usize,
    /// Longest instruction/data line considered when rendering text
    pub max_line_bytes: usize,
}

impl Default for FindConfig {
    fn default() -> Self {
        Self {
            chunk_size: 64 * 1024,
            progress_interval_lines: 256,
            max_line_bytes: 16,
        }
    }
}

impl FindConfig {
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(NavError::Config("find.chunk_size must be > 0".into()));
        }
        if self.progress_interval_lines == 0 {
            return Err(NavError::Config(
                "find.progress_interval_lines must be > 0".into(),
            ));
        }
        if self.max_line_bytes == 0 {
            return Err(NavError::Config("find.max_line_bytes must be > 0".into()));
        }
        Ok(())
    }
}

/// Feature map (overlay) configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureMapConfig {
    /// Number of bins the document range is split into
    pub bins: usize,
    /// Entropy (bits per byte) at or above which a bin is flagged
    pub high_entropy: f64,
}

impl Default for FeatureMapConfig {
    fn default() -> Self {
        Self {
            bins: 256,
            high_entropy: 7.2,
        }
    }
}

impl FeatureMapConfig {
    pub fn validate(&self) -> Result<()> {
        if self.bins == 0 {
            return Err(NavError::Config("feature_map.bins must be > 0".into()));
        }
        if !(0.0..=8.0).contains(&self.high_entropy) {
            return Err(NavError::Config(
                "feature_map.high_entropy must be within [0, 8]".into(),
            ));
        }
        Ok(())
    }
}
