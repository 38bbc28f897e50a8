//! Configuration module.
//!
//! Holds the sampling/naming options recognized by the schema engine and a
//! TOML-backed settings loader.

mod settings;

pub use settings::{FetchPosition, MetadataConfig, Settings, SettingsError};
