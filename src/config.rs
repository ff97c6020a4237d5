//! Inspector configuration (`memscope.toml`)
//!
//! Every key is optional; a missing file section or key falls back to the
//! defaults below. The configuration is read once at startup and handed to
//! the inspector and table by reference.

use crate::error::ConfigError;
use serde::Deserialize;
use std::path::Path;

/// Limits and layout constants for the inspector and table views
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct InspectorConfig {
    /// Maximum nesting depth of one render call (default: 32)
    pub max_depth: usize,
    /// Arrays with more elements than this render through a scroll window (default: 64)
    pub array_virtualize_threshold: usize,
    /// Elements shown at once in a virtualized array (default: 32)
    pub array_window: usize,
    /// Longest text read from a string-like handle, in bytes (default: 256)
    pub max_text_len: usize,
    /// Bytes per line in raw hex dumps (default: 16)
    pub hex_bytes_per_line: usize,
    /// Height of one table row in terminal lines (default: 1)
    pub row_height: u16,
}

impl Default for InspectorConfig {
    fn default() -> Self {
        InspectorConfig {
            max_depth: 32,
            array_virtualize_threshold: 64,
            array_window: 32,
            max_text_len: 256,
            hex_bytes_per_line: 16,
            row_height: 1,
        }
    }
}

impl InspectorConfig {
    /// Parse a configuration from TOML text
    pub fn from_toml_str(text: &str, origin: &Path) -> Result<Self, ConfigError> {
        let config: InspectorConfig = toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: origin.to_path_buf(),
            source,
        })?;
        Ok(config.sanitized())
    }

    /// Load a configuration file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&text, path)?;
        tracing::info!(path = %path.display(), "loaded inspector config");
        Ok(config)
    }

    /// Clamp values that would make a view unusable
    fn sanitized(mut self) -> Self {
        self.array_window = self.array_window.max(1);
        self.hex_bytes_per_line = self.hex_bytes_per_line.clamp(1, 64);
        self.row_height = self.row_height.max(1);
        self
    }
}
