//! Retrieval configuration loaded from JSON.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{CoreError, CoreResult};

/// How descriptors are filtered by confidence before quantization.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfidencePolicy {
    /// Keep the `top_n` most confident descriptors of the whole file.
    #[default]
    Global,
    /// Keep the `top_n` most confident descriptors of each (sigma, tau) stratum.
    PerStratum,
}

impl std::str::FromStr for ConfidencePolicy {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "global" => Ok(ConfidencePolicy::Global),
            "per_stratum" => Ok(ConfidencePolicy::PerStratum),
            _ => Err(CoreError::Config(format!(
                "unknown confidence policy '{}' (expected global or per_stratum)",
                s
            ))),
        }
    }
}

/// Tunables for signature extraction. Every field has a default, so an empty
/// JSON object is a valid configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RetrievalConfig {
    pub confidence_policy: ConfidencePolicy,
    pub top_n: usize,
    /// Field offset of the detector confidence in descriptor rows.
    pub confidence_column: usize,
    pub grid_size: usize,
    pub color_bins: usize,
    pub hog_codebook: Option<PathBuf>,
    pub hof_codebook: Option<PathBuf>,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            confidence_policy: ConfidencePolicy::Global,
            top_n: 400,
            confidence_column: 6,
            grid_size: 4,
            color_bins: 12,
            hog_codebook: None,
            hof_codebook: None,
        }
    }
}

impl RetrievalConfig {
    /// Reads and validates a configuration file.
    pub fn load(path: &Path) -> CoreResult<Self> {
        let text = fs::read_to_string(path)
            .map_err(|e| CoreError::parse(path, format!("cannot read config: {}", e)))?;
        let config: RetrievalConfig = serde_json::from_str(&text)
            .map_err(|e| CoreError::parse(path, e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> CoreResult<()> {
        if self.top_n == 0 {
            return Err(CoreError::Config("top_n must be at least 1".to_string()));
        }
        if self.grid_size == 0 {
            return Err(CoreError::Config("grid_size must be at least 1".to_string()));
        }
        if self.color_bins == 0 || self.color_bins > 256 {
            return Err(CoreError::Config(
                "color_bins must be between 1 and 256".to_string(),
            ));
        }
        Ok(())
    }

    /// Length of a color-grid signature under this configuration.
    pub fn color_signature_len(&self) -> usize {
        3 * self.grid_size * self.grid_size * 3 * self.color_bins
    }
}
