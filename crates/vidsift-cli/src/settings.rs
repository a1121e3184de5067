//! Configuration resolution: config file first, then command-line overrides.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use vidsift_core::RetrievalConfig;

/// Flags shared by every command that extracts signatures.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommonOptions {
    /// Path to a JSON configuration file.
    pub config: Option<String>,
    /// HOG codebook table, overriding the config file.
    pub hog_codebook: Option<String>,
    /// HOF codebook table, overriding the config file.
    pub hof_codebook: Option<String>,
}

impl CommonOptions {
    /// Builds the effective configuration.
    pub fn resolve(&self) -> Result<RetrievalConfig> {
        let mut config = match &self.config {
            Some(path) => RetrievalConfig::load(Path::new(path))
                .with_context(|| format!("Failed to load config: {}", path))?,
            None => RetrievalConfig::default(),
        };

        if let Some(hog) = &self.hog_codebook {
            config.hog_codebook = Some(PathBuf::from(hog));
        }
        if let Some(hof) = &self.hof_codebook {
            config.hof_codebook = Some(PathBuf::from(hof));
        }

        config.validate()?;
        tracing::debug!(?config, "resolved configuration");
        Ok(config)
    }
}
