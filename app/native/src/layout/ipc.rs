//! Request/response contract used by the GUI.
//!
//! Requests are JSON objects tagged by `command`:
//!
//! ```json
//! { "command": "openFloating", "projectPath": "/projects/novel", "paneId": "history" }
//! ```
//!
//! [`LayoutIpc::dispatch`] is transport independent. [`LayoutIpc::handle_line`]
//! wraps it for line-oriented transports, replying with
//! `{"ok": true, "data": ...}` or `{"ok": false, "error": {"kind", "message"}}`.

use std::sync::Arc;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::error::{LayoutError, LayoutResult};
use super::floating::{FloatingPaneDescriptor, MoveOutcome, OpenOutcome};
use super::geometry::Rect;
use super::service::LayoutService;
use super::state::LayoutSnapshot;
use super::store::LayoutStore;
use super::tree::{KnownPanes, PaneId};
use crate::error::DraftboardError;

// ============================================================================
// Requests
// ============================================================================

/// A request naming only a project.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProjectRequest {
    /// Project the request applies to.
    pub project_path: String,
}

/// Loads a project's layout.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoadRequest {
    /// Project to load.
    pub project_path: String,
    /// Pane ids the GUI currently knows. Defaults to the configured set.
    #[serde(default)]
    pub known_pane_ids: Option<Vec<PaneId>>,
}

/// Stores a project's layout.
#[derive(Debug, Clone, PartialEq, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SaveRequest {
    /// Project to save.
    pub project_path: String,
    /// Docked tree, validated before it is written.
    #[serde(default)]
    pub layout: Value,
    /// Floating panes. When absent the registry's current list is written.
    #[serde(default)]
    pub floating_panes: Option<Vec<FloatingPaneDescriptor>>,
    /// Version the GUI believes it is writing. The current version is always written.
    #[serde(default)]
    pub schema_version: Option<u32>,
    /// Pane ids the GUI currently knows. Defaults to the configured set.
    #[serde(default)]
    pub known_pane_ids: Option<Vec<PaneId>>,
}

/// Detaches a pane.
#[derive(Debug, Clone, PartialEq, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct OpenFloatingRequest {
    /// Project the pane belongs to.
    pub project_path: String,
    /// Pane to detach.
    pub pane_id: PaneId,
    /// Requested window frame.
    #[serde(default)]
    pub bounds: Option<Rect>,
    /// Requested display.
    #[serde(default)]
    pub display_id: Option<u32>,
}

/// Names one pane of a project.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaneRequest {
    /// Project the pane belongs to.
    pub project_path: String,
    /// The pane.
    pub pane_id: PaneId,
}

/// Reports a floating window's new frame.
#[derive(Debug, Clone, PartialEq, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct MoveFloatingRequest {
    /// Project the pane belongs to.
    pub project_path: String,
    /// The floating pane.
    pub pane_id: PaneId,
    /// Frame after the move or resize.
    pub bounds: Rect,
    /// Display the window is on, if the GUI knows.
    #[serde(default)]
    pub display_id: Option<u32>,
}

/// Every request the façade accepts.
#[derive(Debug, Clone, PartialEq, Deserialize, JsonSchema)]
#[serde(tag = "command", rename_all = "camelCase")]
pub enum LayoutRequest {
    /// Read and reconcile a layout.
    Load(LoadRequest),
    /// Validate and store a layout.
    Save(SaveRequest),
    /// Replace a layout with the default.
    Reset(ProjectRequest),
    /// Detach a pane into its own window.
    OpenFloating(OpenFloatingRequest),
    /// Re-dock a floating pane.
    CloseFloating(PaneRequest),
    /// List floating panes.
    ListFloating(ProjectRequest),
    /// Record a floating window's new frame.
    MoveFloating(MoveFloatingRequest),
}

impl LayoutRequest {
    /// Project the request applies to.
    #[must_use]
    pub fn project_path(&self) -> &str {
        match self {
            Self::Load(req) => &req.project_path,
            Self::Save(req) => &req.project_path,
            Self::Reset(req) | Self::ListFloating(req) => &req.project_path,
            Self::OpenFloating(req) => &req.project_path,
            Self::CloseFloating(req) => &req.project_path,
            Self::MoveFloating(req) => &req.project_path,
        }
    }

    /// Command name as it appears on the wire.
    #[must_use]
    pub const fn command(&self) -> &'static str {
        match self {
            Self::Load(_) => "load",
            Self::Save(_) => "save",
            Self::Reset(_) => "reset",
            Self::OpenFloating(_) => "openFloating",
            Self::CloseFloating(_) => "closeFloating",
            Self::ListFloating(_) => "listFloating",
            Self::MoveFloating(_) => "moveFloating",
        }
    }
}

// ============================================================================
// Responses
// ============================================================================

/// Result of a successful request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum LayoutResponse {
    /// Reply to `load`.
    Layout(LayoutSnapshot),
    /// Reply to `openFloating`.
    Opened(OpenOutcome),
    /// Reply to `moveFloating`.
    Moved(MoveOutcome),
    /// Reply to `listFloating`.
    Floating(Vec<FloatingPaneDescriptor>),
    /// Reply to `save`, `reset` and `closeFloating`. Serializes as `null`.
    Ack,
}

/// Envelope written by line-oriented transports.
#[derive(Debug, Serialize)]
pub struct Reply {
    /// Whether the request succeeded.
    pub ok: bool,
    /// Response payload on success.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<LayoutResponse>,
    /// Failure description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<DraftboardError>,
}

impl Reply {
    /// Wraps the outcome of [`LayoutIpc::dispatch`].
    #[must_use]
    pub fn from_result(result: LayoutResult<LayoutResponse>) -> Self {
        match result {
            Ok(data) => Self { ok: true, data: Some(data), error: None },
            Err(err) => Self {
                ok: false,
                data: None,
                error: Some(err.into()),
            },
        }
    }

    /// Encodes the reply as a single line of JSON.
    #[must_use]
    pub fn to_line(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|err| {
            tracing::error!(error = %err, "layout: failed to encode ipc reply");
            r#"{"ok":false,"error":{"kind":"EncodeError","message":"reply could not be encoded"}}"#
                .to_string()
        })
    }
}

// ============================================================================
// Dispatcher
// ============================================================================

fn known_panes(ids: Option<Vec<PaneId>>) -> Option<KnownPanes> {
    ids.filter(|ids| !ids.is_empty()).map(KnownPanes::new)
}

/// Routes requests to a [`LayoutService`].
pub struct LayoutIpc<S> {
    service: Arc<LayoutService<S>>,
}

impl<S> Clone for LayoutIpc<S> {
    fn clone(&self) -> Self { Self { service: Arc::clone(&self.service) } }
}

impl<S: LayoutStore> LayoutIpc<S> {
    /// Creates a dispatcher over `service`.
    #[must_use]
    pub const fn new(service: Arc<LayoutService<S>>) -> Self { Self { service } }

    /// The service requests are routed to.
    #[must_use]
    pub const fn service(&self) -> &Arc<LayoutService<S>> { &self.service }

    /// Executes one request.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::InvalidRequest`] for an empty project path and
    /// [`LayoutError::Storage`] when the store fails.
    pub async fn dispatch(&self, request: LayoutRequest) -> LayoutResult<LayoutResponse> {
        if request.project_path().trim().is_empty() {
            return Err(LayoutError::InvalidRequest(format!(
                "{}: projectPath must not be empty",
                request.command()
            )));
        }

        tracing::trace!(
            command = request.command(),
            project = request.project_path(),
            "layout: ipc request"
        );

        let service = &self.service;
        let response = match request {
            LayoutRequest::Load(req) => {
                let known = known_panes(req.known_pane_ids);
                LayoutResponse::Layout(service.load(&req.project_path, known.as_ref()).await?)
            }
            LayoutRequest::Save(req) => {
                let known = known_panes(req.known_pane_ids);
                service
                    .save(
                        &req.project_path,
                        &req.layout,
                        req.floating_panes,
                        req.schema_version,
                        known.as_ref(),
                    )
                    .await?;
                LayoutResponse::Ack
            }
            LayoutRequest::Reset(req) => {
                service.reset(&req.project_path).await?;
                LayoutResponse::Ack
            }
            LayoutRequest::OpenFloating(req) => LayoutResponse::Opened(service.open_floating(
                &req.project_path,
                req.pane_id.as_str(),
                req.bounds,
                req.display_id,
            )),
            LayoutRequest::CloseFloating(req) => {
                service.close_floating(&req.project_path, req.pane_id.as_str());
                LayoutResponse::Ack
            }
            LayoutRequest::ListFloating(req) => {
                LayoutResponse::Floating(service.list_floating(&req.project_path))
            }
            LayoutRequest::MoveFloating(req) => LayoutResponse::Moved(service.move_floating(
                &req.project_path,
                req.pane_id.as_str(),
                req.bounds,
                req.display_id,
            )),
        };

        Ok(response)
    }

    /// Decodes a JSON request and executes it.
    pub async fn handle_value(&self, value: Value) -> Reply {
        let result = match serde_json::from_value::<LayoutRequest>(value) {
            Ok(request) => self.dispatch(request).await,
            Err(err) => Err(LayoutError::InvalidRequest(err.to_string())),
        };
        Reply::from_result(result)
    }

    /// Handles one line of a JSON-lines transport, returning the reply line.
    pub async fn handle_line(&self, line: &str) -> String {
        let reply = match serde_json::from_str::<Value>(line) {
            Ok(value) => self.handle_value(value).await,
            Err(err) => {
                tracing::debug!(error = %err, "layout: ipc line is not JSON");
                Reply::from_result(Err(LayoutError::InvalidRequest(err.to_string())))
            }
        };

        if let Some(error) = &reply.error {
            tracing::debug!(%error, "layout: ipc request failed");
        }

        reply.to_line()
    }
}

// ============================================================================
// Tests
// ============================================================================
