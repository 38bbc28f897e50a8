//! TOML-based configuration.
//!
//! Supports a config file with a `[metadata]` table:
//! ```toml
//! [metadata]
//! prefetch_rows = 100
//! fetch_position = "end"
//! update_dynamically = true
//! use_global_complex_type_names = false
//! create_dynamic_types_for_complex_types = true
//! ```
//! Every field is optional; omitted fields take their defaults.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::store::ScanOrder;

/// Error type for settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),
}

/// Which end of a collection's natural order is sampled when the sample size
/// is bounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FetchPosition {
    #[default]
    Start,
    End,
}

impl FetchPosition {
    pub fn scan_order(self) -> ScanOrder {
        match self {
            FetchPosition::Start => ScanOrder::Ascending,
            FetchPosition::End => ScanOrder::Descending,
        }
    }
}

/// Options driving the schema builder and the typed access path.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct MetadataConfig {
    /// Documents inspected per collection: -1 scans the entire collection,
    /// 0 builds a schema with only the surrogate key, N > 0 samples at most
    /// N documents.
    pub prefetch_rows: i64,

    /// End of the collection the bounded sample is taken from.
    pub fetch_position: FetchPosition,

    /// Register fields not seen during the initial sample incrementally, as
    /// live documents flow through the converter.
    pub update_dynamically: bool,

    /// Name nested complex types by their bare field name instead of the
    /// owner-qualified path. Cross-collection collisions become possible.
    pub use_global_complex_type_names: bool,

    /// Materialize concrete shapes for nested object types on the typed query
    /// path; when disabled, object-kinded fields stay opaque.
    pub create_dynamic_types_for_complex_types: bool,
}

impl Default for MetadataConfig {
    fn default() -> Self {
        Self {
            prefetch_rows: -1,
            fetch_position: FetchPosition::Start,
            update_dynamically: false,
            use_global_complex_type_names: false,
            create_dynamic_types_for_complex_types: true,
        }
    }
}

impl MetadataConfig {
    pub fn with_prefetch_rows(mut self, rows: i64) -> Self {
        self.prefetch_rows = rows;
        self
    }

    pub fn with_fetch_position(mut self, position: FetchPosition) -> Self {
        self.fetch_position = position;
        self
    }

    pub fn with_dynamic_updates(mut self, enabled: bool) -> Self {
        self.update_dynamically = enabled;
        self
    }

    pub fn with_global_complex_type_names(mut self, enabled: bool) -> Self {
        self.use_global_complex_type_names = enabled;
        self
    }
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    /// Schema-engine configuration.
    pub metadata: MetadataConfig,
}

impl Settings {
    /// Load settings from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Settings, SettingsError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(SettingsError::FileNotFound(path.to_path_buf()));
        }
        let contents = fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }

    /// Parse settings from a TOML string.
    pub fn parse(contents: &str) -> Result<Settings, SettingsError> {
        Ok(toml::from_str(contents)?)
    }
}
