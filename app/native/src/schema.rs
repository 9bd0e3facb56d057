//! JSON Schema export.
//!
//! Schemas are generated from the Rust types with `schemars`, so they always
//! match what the crate reads and writes.

use clap::ValueEnum;
use schemars::schema_for;

use crate::config::DraftboardConfig;
use crate::layout::{LayoutRequest, LayoutState};

/// Which document to describe.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum SchemaTarget {
    /// The per-project layout record.
    #[default]
    Record,
    /// The configuration file.
    Config,
    /// Requests accepted by `serve`.
    Requests,
}

/// Returns the pretty-printed schema of `target`.
#[must_use]
pub fn print_schema(target: SchemaTarget) -> String {
    let schema = match target {
        SchemaTarget::Record => schema_for!(LayoutState),
        SchemaTarget::Config => schema_for!(DraftboardConfig),
        SchemaTarget::Requests => schema_for!(LayoutRequest),
    };
    serde_json::to_string_pretty(&schema).unwrap_or_else(|_| "{}".to_string())
}

#[cfg(test)]
mod tests {
    use serde_json::Value;

    use super::*;

    fn schema(target: SchemaTarget) -> Value {
        serde_json::from_str(&print_schema(target)).unwrap()
    }

    #[test]
    fn test_record_schema_lists_fields() {
        let schema = schema(SchemaTarget::Record);
        let properties = &schema["properties"];

        assert!(properties.get("schemaVersion").is_some());
        assert!(properties.get("layout").is_some());
        assert!(properties.get("floatingPanes").is_some());
    }

    #[test]
    fn test_config_schema_lists_fields() {
        let schema = schema(SchemaTarget::Config);
        assert!(schema["properties"].get("storageDir").is_some());
        assert!(schema["properties"].get("knownPanes").is_some());
    }

    #[test]
    fn test_requests_schema_is_object() {
        let schema = schema(SchemaTarget::Requests);
        assert!(schema.is_object());
        assert!(print_schema(SchemaTarget::Requests).contains("openFloating"));
    }
}
