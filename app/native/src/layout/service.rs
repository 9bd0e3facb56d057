//! Load, save and reset of per-project layouts.
//!
//! The service composes the tree validator, the floating registry and the
//! display resolver over a [`LayoutStore`]. It keeps no notion of a current
//! project: every call names the project it acts on.
//!
//! Writes for one project are serialized through a per-project async mutex.
//! Tokio's mutex is fair, so saves are applied in the order they were issued
//! and a slow write can never land after a newer one. A project's mutex is
//! dropped from the table once nobody holds or waits on it.

use std::collections::HashSet;
use std::sync::Arc;

use dashmap::DashMap;
use serde_json::Value;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use super::error::{LayoutError, LayoutResult};
use super::floating::{FloatingPaneDescriptor, FloatingRegistry, MoveOutcome, OpenOutcome};
use super::geometry::{
    ClampResult, DisplayProvider, PaneSizing, Rect, StaticDisplays, clamp_bounds_to_area_with_min,
    resolve_display,
};
use super::state::{LayoutSnapshot, LayoutState, RawLayoutState};
use super::store::LayoutStore;
use super::tree::{KnownPanes, LayoutNode, PaneId, default_layout_for, sanitize_layout};
use crate::constants::layout::CURRENT_SCHEMA_VERSION;

/// Policy the service validates against.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayoutSettings {
    /// Panes this version knows about. Requests may override it.
    pub known_panes: KnownPanes,
    /// Minimum and default floating sizes.
    pub sizing: PaneSizing,
}

/// Per-project layout persistence.
pub struct LayoutService<S> {
    store: S,
    displays: Arc<dyn DisplayProvider>,
    settings: LayoutSettings,
    registry: FloatingRegistry,
    write_locks: DashMap<String, Arc<AsyncMutex<()>>>,
}

impl<S: LayoutStore> LayoutService<S> {
    /// Creates a service over `store`, querying `displays` on every operation.
    pub fn new(store: S, displays: Arc<dyn DisplayProvider>, settings: LayoutSettings) -> Self {
        Self {
            store,
            displays,
            settings,
            registry: FloatingRegistry::new(),
            write_locks: DashMap::new(),
        }
    }

    /// The backing store.
    #[must_use]
    pub const fn store(&self) -> &S { &self.store }

    /// The configured policy.
    #[must_use]
    pub const fn settings(&self) -> &LayoutSettings { &self.settings }

    /// The in-memory floating registry.
    #[must_use]
    pub const fn registry(&self) -> &FloatingRegistry { &self.registry }

    async fn lock_project<'a>(&'a self, project: &'a str) -> ProjectGuard<'a> {
        let lock = Arc::clone(&self.write_locks.entry(project.to_string()).or_default());
        ProjectGuard {
            locks: &self.write_locks,
            project,
            guard: Some(lock.lock_owned().await),
        }
    }

    // ========================================================================
    // Persistence
    // ========================================================================

    /// Reads and reconciles the layout of `project`.
    ///
    /// The stored tree is validated against `known` (the configured set when
    /// `None`). Floating panes that are unknown, docked or repeated are
    /// dropped, and the rest are clamped onto the displays connected right now.
    /// The registry of `project` is replaced with the result.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::Storage`] if the record cannot be read.
    pub async fn load(
        &self,
        project: &str,
        known: Option<&KnownPanes>,
    ) -> LayoutResult<LayoutSnapshot> {
        let known = known.unwrap_or(&self.settings.known_panes);
        let _guard = self.lock_project(project).await;

        let bytes = self.store.read(project).await.map_err(|err| {
            tracing::error!(project, error = %err, "layout: failed to read layout");
            LayoutError::storage(project, err)
        })?;

        let raw = bytes.map_or_else(RawLayoutState::absent, |bytes| RawLayoutState::decode(&bytes));
        let layout = sanitize_layout(&raw.layout, known);
        let floating_panes = self.reconcile(project, &layout, raw.floating_panes, known);

        self.registry.replace(project, floating_panes.clone());

        tracing::debug!(
            project,
            stored_version = raw.stored_version,
            floating = floating_panes.len(),
            "layout: loaded"
        );

        Ok(LayoutSnapshot {
            layout,
            floating_panes,
            schema_version: CURRENT_SCHEMA_VERSION,
        })
    }

    /// Validates and stores the layout of `project`.
    ///
    /// The tree is sanitized before writing. Floating panes are written as
    /// given, or taken from the registry when `floating_panes` is `None`. The
    /// registry is updated even if the write then fails, so the session keeps
    /// working from memory.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::Storage`] if the record cannot be written.
    pub async fn save(
        &self,
        project: &str,
        layout: &Value,
        floating_panes: Option<Vec<FloatingPaneDescriptor>>,
        schema_version: Option<u32>,
        known: Option<&KnownPanes>,
    ) -> LayoutResult<()> {
        let known = known.unwrap_or(&self.settings.known_panes);

        if let Some(version) = schema_version
            && version != CURRENT_SCHEMA_VERSION
        {
            tracing::debug!(
                project,
                version,
                "layout: caller sent another schema version, writing current"
            );
        }

        let layout = sanitize_layout(layout, known);
        let _guard = self.lock_project(project).await;

        let floating_panes = floating_panes.unwrap_or_else(|| self.registry.list(project));
        self.registry.replace(project, floating_panes.clone());

        self.write_state(project, &LayoutState::current(project, layout, floating_panes))
            .await
    }

    /// Replaces the layout of `project` with the default arrangement.
    ///
    /// Returns the panes that were floating so the caller can close their
    /// windows.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::Storage`] if the record cannot be written.
    pub async fn reset(&self, project: &str) -> LayoutResult<Vec<FloatingPaneDescriptor>> {
        let _guard = self.lock_project(project).await;

        let closed = self.registry.clear(project);
        let layout = default_layout_for(&self.settings.known_panes);
        self.write_state(project, &LayoutState::current(project, layout, Vec::new())).await?;

        tracing::info!(project, closed = closed.len(), "layout: reset to default");
        Ok(closed)
    }

    async fn write_state(&self, project: &str, state: &LayoutState) -> LayoutResult<()> {
        let bytes = state.to_bytes()?;
        self.store.write(project, bytes).await.map_err(|err| {
            tracing::error!(project, error = %err, "layout: failed to write layout");
            LayoutError::storage(project, err)
        })
    }

    /// Filters stored floating panes and clamps them onto current displays.
    fn reconcile(
        &self,
        project: &str,
        layout: &LayoutNode,
        stored: Vec<FloatingPaneDescriptor>,
        known: &KnownPanes,
    ) -> Vec<FloatingPaneDescriptor> {
        let displays = StaticDisplays::snapshot(self.displays.as_ref());
        let mut seen = HashSet::new();

        stored
            .into_iter()
            .filter(|pane| {
                if !known.contains(pane.id.as_str()) {
                    tracing::debug!(
                        project,
                        pane = %pane.id,
                        "layout: dropping unknown floating pane"
                    );
                    return false;
                }
                if layout.contains(pane.id.as_str()) {
                    tracing::warn!(
                        project,
                        pane = %pane.id,
                        "layout: pane is both docked and floating, keeping it docked"
                    );
                    return false;
                }
                seen.insert(pane.id.clone())
            })
            .map(|pane| self.restore_bounds(project, pane, &displays))
            .collect()
    }

    fn restore_bounds(
        &self,
        project: &str,
        mut pane: FloatingPaneDescriptor,
        displays: &StaticDisplays,
    ) -> FloatingPaneDescriptor {
        let Some(bounds) = pane.bounds else {
            return pane;
        };
        // Stored frames without a display belong to the primary.
        let Some(display) = resolve_display(displays, pane.display_id) else {
            return pane;
        };

        let minimum = self.settings.sizing.minimum;
        let clamped = clamp_bounds_to_area_with_min(&bounds, &display.work_area, minimum);
        let clamp = ClampResult::between(bounds, clamped, pane.display_id, Some(display.id));

        if let Some(clamp) = &clamp {
            let applied_display_id = display.id;
            tracing::debug!(
                project,
                pane = %pane.id,
                requested_display = ?clamp.requested_display_id,
                applied_display = applied_display_id,
                "layout: floating pane clamped onto current display"
            );
        }

        pane.bounds = Some(clamped);
        pane.display_id = pane.display_id.map(|_| display.id);
        pane
    }

    // ========================================================================
    // Floating panes
    // ========================================================================

    /// Floating panes of `project`.
    #[must_use]
    pub fn list_floating(&self, project: &str) -> Vec<FloatingPaneDescriptor> {
        self.registry.list(project)
    }

    /// Detaches `pane` into its own window.
    ///
    /// The GUI owns the pane set, so any id may float. A pane already floating
    /// is refused with `opened: false`. Ids the next load does not know are
    /// dropped there.
    pub fn open_floating(
        &self,
        project: &str,
        pane: &str,
        bounds: Option<Rect>,
        display_id: Option<u32>,
    ) -> OpenOutcome {
        self.registry.open(
            project,
            PaneId::new(pane),
            bounds,
            display_id,
            self.displays.as_ref(),
            &self.settings.sizing,
        )
    }

    /// Records a new frame for a floating pane.
    pub fn move_floating(
        &self,
        project: &str,
        pane: &str,
        bounds: Rect,
        display_id: Option<u32>,
    ) -> MoveOutcome {
        self.registry.move_pane(
            project,
            pane,
            bounds,
            display_id,
            self.displays.as_ref(),
            &self.settings.sizing,
        )
    }

    /// Re-docks `pane`. Closing a pane that is not floating does nothing.
    pub fn close_floating(&self, project: &str, pane: &str) -> bool {
        let closed = self.registry.close(project, pane);
        if closed {
            tracing::debug!(project, pane, "layout: floating pane closed");
        }
        closed
    }
}

/// Holds a project's write lock and prunes the table entry on release.
struct ProjectGuard<'a> {
    locks: &'a DashMap<String, Arc<AsyncMutex<()>>>,
    project: &'a str,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for ProjectGuard<'_> {
    fn drop(&mut self) {
        // Releases the guard's own reference before counting.
        drop(self.guard.take());
        self.locks.remove_if(self.project, |_, lock| Arc::strong_count(lock) == 1);
    }
}

// ============================================================================
// Tests
// ============================================================================
