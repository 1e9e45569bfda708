//! Export module for m-track
//!
//! Machine-readable JSON export of the full dataset.

pub mod json;

pub use json::{export_json, export_to_file, restrict_to_range, JsonExport, EXPORT_SCHEMA_VERSION};
