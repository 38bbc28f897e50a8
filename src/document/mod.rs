//! Raw document representation.
//!
//! Documents arrive from the store as schema-less JSON-like data. This module
//! defines the closed value union the rest of the crate operates on, produced
//! once at the parsing boundary. Downstream code (resolver, sampler, converter)
//! never touches `serde_json::Value` directly.

mod value;

pub use value::{Document, DocumentValue};
