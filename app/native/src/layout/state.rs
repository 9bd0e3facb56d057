//! Persisted layout records and schema migration.
//!
//! One record is stored per project:
//!
//! ```json
//! {
//!   "schemaVersion": 2,
//!   "layout": { "direction": "row", "first": "wizard", "second": "draft-board" },
//!   "floatingPanes": [{ "id": "history", "bounds": { "x": 100, "y": 50, "width": 480, "height": 360 }, "displayId": 2 }]
//! }
//! ```
//!
//! Reading is deliberately forgiving. Records from any earlier schema version
//! are upgraded by filling in missing fields, unreadable floating entries are
//! skipped, and a record that is not JSON at all reads as "never saved". The
//! tree itself stays untyped here; it is validated later by
//! [`super::tree::sanitize_layout`].

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::floating::FloatingPaneDescriptor;
use super::tree::LayoutNode;
use crate::constants::layout::{CURRENT_SCHEMA_VERSION, LEGACY_SCHEMA_VERSION};

/// The record written for a project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct LayoutState {
    /// Version of the record format.
    pub schema_version: u32,
    /// Project the record belongs to. Informational only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_path: Option<String>,
    /// Docked pane tree.
    pub layout: LayoutNode,
    /// Panes detached into their own windows.
    #[serde(default)]
    pub floating_panes: Vec<FloatingPaneDescriptor>,
}

impl LayoutState {
    /// Creates a record in the current schema version.
    #[must_use]
    pub fn current(
        project_path: &str,
        layout: LayoutNode,
        floating_panes: Vec<FloatingPaneDescriptor>,
    ) -> Self {
        Self {
            schema_version: CURRENT_SCHEMA_VERSION,
            project_path: Some(project_path.to_string()),
            layout,
            floating_panes,
        }
    }

    /// Encodes the record for storage.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_bytes(&self) -> serde_json::Result<Vec<u8>> { serde_json::to_vec_pretty(self) }
}

/// What a load returns to the GUI.
#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct LayoutSnapshot {
    /// Sanitized docked tree.
    pub layout: LayoutNode,
    /// Floating panes reconciled against the current displays.
    pub floating_panes: Vec<FloatingPaneDescriptor>,
    /// Schema version of the returned state, always current.
    pub schema_version: u32,
}

/// A stored record after migration, before validation.
#[derive(Debug, Clone, PartialEq)]
pub struct RawLayoutState {
    /// Version the record was written with.
    pub stored_version: u32,
    /// Untrusted tree, `Null` when absent.
    pub layout: Value,
    /// Floating entries that could be decoded.
    pub floating_panes: Vec<FloatingPaneDescriptor>,
}

impl RawLayoutState {
    /// State of a project that was never saved.
    #[must_use]
    pub const fn absent() -> Self {
        Self {
            stored_version: CURRENT_SCHEMA_VERSION,
            layout: Value::Null,
            floating_panes: Vec::new(),
        }
    }

    /// Decodes stored bytes, upgrading older schema versions.
    ///
    /// Never fails: corrupt input reads as [`Self::absent`].
    #[must_use]
    pub fn decode(bytes: &[u8]) -> Self {
        let record: Value = match serde_json::from_slice(bytes) {
            Ok(record) => record,
            Err(err) => {
                tracing::warn!(error = %err, "layout: stored layout is not valid JSON, ignored");
                return Self::absent();
            }
        };

        let Value::Object(mut fields) = record else {
            tracing::warn!("layout: stored layout is not an object, ignoring it");
            return Self::absent();
        };

        let stored_version = fields
            .get("schemaVersion")
            .and_then(Value::as_u64)
            .and_then(|v| u32::try_from(v).ok())
            .unwrap_or(LEGACY_SCHEMA_VERSION);

        if stored_version > CURRENT_SCHEMA_VERSION {
            tracing::warn!(
                stored_version,
                current = CURRENT_SCHEMA_VERSION,
                "layout: stored layout comes from a newer version, reading best-effort"
            );
        } else if stored_version < CURRENT_SCHEMA_VERSION {
            tracing::debug!(stored_version, "layout: migrating stored layout");
        }

        let layout = fields.remove("layout").unwrap_or(Value::Null);

        // Version 1 records predate floating panes; the field is simply absent.
        let floating_panes = match fields.remove("floatingPanes") {
            Some(Value::Array(entries)) => decode_floating(entries),
            Some(Value::Null) | None => Vec::new(),
            Some(_) => {
                tracing::warn!("layout: stored floatingPanes is not a list, ignoring it");
                Vec::new()
            }
        };

        Self {
            stored_version,
            layout,
            floating_panes,
        }
    }
}

fn decode_floating(entries: Vec<Value>) -> Vec<FloatingPaneDescriptor> {
    entries
        .into_iter()
        .filter_map(|entry| match serde_json::from_value::<FloatingPaneDescriptor>(entry) {
            Ok(mut descriptor) => {
                if descriptor.bounds.is_some_and(|b| !b.is_finite()) {
                    descriptor.bounds = None;
                }
                Some(descriptor)
            }
            Err(err) => {
                tracing::debug!(error = %err, "layout: skipping unreadable floating pane entry");
                None
            }
        })
        .collect()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::layout::geometry::Rect;
    use crate::layout::tree::default_layout;

    fn bytes(value: &Value) -> Vec<u8> { serde_json::to_vec(value).unwrap() }

    #[test]
    fn test_decode_current_record() {
        let raw = RawLayoutState::decode(&bytes(&json!({
            "schemaVersion": 2,
            "layout": "history",
            "floatingPanes": [
                { "id": "critique", "bounds": { "x": 100, "y": 50, "width": 480, "height": 360 }, "displayId": 2 }
            ]
        })));

        assert_eq!(raw.stored_version, 2);
        assert_eq!(raw.layout, json!("history"));
        assert_eq!(raw.floating_panes, vec![
            FloatingPaneDescriptor::new("critique")
                .with_bounds(Rect::new(100.0, 50.0, 480.0, 360.0), Some(2))
        ]);
    }

    #[test]
    fn test_decode_version_one_defaults_floating() {
        let raw = RawLayoutState::decode(&bytes(&json!({
            "schemaVersion": 1,
            "layout": { "direction": "row", "first": "wizard", "second": "history" }
        })));

        assert_eq!(raw.stored_version, 1);
        assert!(raw.floating_panes.is_empty());
        assert!(raw.layout.is_object());
    }

    #[test]
    fn test_decode_untagged_record_is_legacy() {
        let raw = RawLayoutState::decode(&bytes(&json!({ "layout": "wizard" })));
        assert_eq!(raw.stored_version, LEGACY_SCHEMA_VERSION);
    }

    #[test]
    fn test_decode_corrupt_bytes_reads_absent() {
        assert_eq!(RawLayoutState::decode(b"{ not json"), RawLayoutState::absent());
        assert_eq!(RawLayoutState::decode(b"[1, 2, 3]"), RawLayoutState::absent());
        assert_eq!(RawLayoutState::decode(b""), RawLayoutState::absent());
    }

    #[test]
    fn test_decode_skips_bad_floating_entries() {
        let raw = RawLayoutState::decode(&bytes(&json!({
            "schemaVersion": 2,
            "layout": "wizard",
            "floatingPanes": [
                42,
                { "bounds": { "x": 0, "y": 0, "width": 10, "height": 10 } },
                { "id": "history", "bounds": "somewhere" },
                { "id": "analytics" }
            ]
        })));

        assert_eq!(raw.floating_panes, vec![FloatingPaneDescriptor::new("analytics")]);
    }

    #[test]
    fn test_decode_newer_version_best_effort() {
        let raw = RawLayoutState::decode(&bytes(&json!({
            "schemaVersion": 7,
            "layout": "wizard",
            "floatingPanes": [{ "id": "history", "opacity": 0.5 }]
        })));

        assert_eq!(raw.stored_version, 7);
        assert_eq!(raw.floating_panes.len(), 1);
    }

    #[test]
    fn test_state_encodes_current_version() {
        let state = LayoutState::current("/projects/novel", default_layout(), vec![]);
        let value: Value = serde_json::from_slice(&state.to_bytes().unwrap()).unwrap();

        assert_eq!(value["schemaVersion"], CURRENT_SCHEMA_VERSION);
        assert_eq!(value["projectPath"], "/projects/novel");
        assert_eq!(value["floatingPanes"], json!([]));
        assert_eq!(value["layout"]["first"], "wizard");
    }
}
