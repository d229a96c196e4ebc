//! Signing configuration
//!
//! Values come from TOML, then environment overrides. The resulting
//! `SigningConfig` is passed explicitly into every signing call.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use shared_pdf::OverlayOptions;
use std::fs;
use std::path::Path;

pub const ENV_MAX_DOCUMENT_BYTES: &str = "DOCSIGN_MAX_DOCUMENT_BYTES";
pub const ENV_MAX_IMAGE_BYTES: &str = "DOCSIGN_MAX_IMAGE_BYTES";
pub const ENV_COMPRESS_STREAMS: &str = "DOCSIGN_COMPRESS_STREAMS";

/// Limits and output options for the signing pipeline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SigningConfig {
    /// Largest PDF accepted, in bytes (default: 64 MiB)
    #[serde(default = "default_max_document_bytes")]
    pub max_document_bytes: usize,
    /// Largest signature image accepted, in bytes (default: 8 MiB)
    #[serde(default = "default_max_image_bytes")]
    pub max_image_bytes: usize,
    /// Flate-compress embedded images and drawing streams (default: true)
    #[serde(default = "default_compress_streams")]
    pub compress_streams: bool,
}

fn default_max_document_bytes() -> usize {
    64 * 1024 * 1024
}

fn default_max_image_bytes() -> usize {
    8 * 1024 * 1024
}

fn default_compress_streams() -> bool {
    true
}

impl Default for SigningConfig {
    fn default() -> Self {
        Self {
            max_document_bytes: default_max_document_bytes(),
            max_image_bytes: default_max_image_bytes(),
            compress_streams: default_compress_streams(),
        }
    }
}

impl SigningConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string; missing keys take defaults
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Override fields from `DOCSIGN_*` environment variables
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        self.apply_vars(|var| std::env::var(var).ok())
    }

    /// Override fields from any variable source
    pub fn apply_vars<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup(ENV_MAX_DOCUMENT_BYTES) {
            self.max_document_bytes = parse_size(ENV_MAX_DOCUMENT_BYTES, value)?;
        }
        if let Some(value) = lookup(ENV_MAX_IMAGE_BYTES) {
            self.max_image_bytes = parse_size(ENV_MAX_IMAGE_BYTES, value)?;
        }
        if let Some(value) = lookup(ENV_COMPRESS_STREAMS) {
            self.compress_streams = parse_flag(ENV_COMPRESS_STREAMS, value)?;
        }
        self.validate()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_document_bytes == 0 {
            return Err(ConfigError::Invalid(
                "max_document_bytes must be greater than zero".to_string(),
            ));
        }
        if self.max_image_bytes == 0 {
            return Err(ConfigError::Invalid(
                "max_image_bytes must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    pub fn overlay_options(&self) -> OverlayOptions {
        OverlayOptions {
            compress: self.compress_streams,
        }
    }
}

fn parse_size(var: &'static str, value: String) -> Result<usize, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::Env { var, value })
}

fn parse_flag(var: &'static str, value: String) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::Env { var, value }),
    }
}
