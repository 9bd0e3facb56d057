//! Registry of panes detached into their own windows.
//!
//! The registry is an in-memory table keyed by project path. It knows nothing
//! about the docked tree; keeping docked and floating ids disjoint is the
//! service's job when state is loaded.

use std::collections::HashMap;

use parking_lot::RwLock;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::geometry::{
    ClampResult, Display, DisplayProvider, PaneSizing, Rect, clamp_bounds_to_area_with_min,
    resolve_display,
};
use super::tree::PaneId;

// ============================================================================
// Descriptor
// ============================================================================

/// A pane living in its own top-level window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct FloatingPaneDescriptor {
    /// The detached pane.
    pub id: PaneId,
    /// Last known window frame.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounds: Option<Rect>,
    /// Display the window was last placed on.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_id: Option<u32>,
}

impl FloatingPaneDescriptor {
    /// Creates a descriptor without geometry.
    #[must_use]
    pub fn new(id: impl Into<PaneId>) -> Self {
        Self {
            id: id.into(),
            bounds: None,
            display_id: None,
        }
    }

    /// Sets the window frame and display.
    #[must_use]
    pub fn with_bounds(mut self, bounds: Rect, display_id: Option<u32>) -> Self {
        self.bounds = Some(bounds);
        self.display_id = display_id;
        self
    }
}

// ============================================================================
// Placement
// ============================================================================

/// Where a floating window ends up after clamping.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    /// Clamped frame.
    pub bounds: Rect,
    /// Display whose work area was used.
    pub display_id: u32,
    /// Present when the frame had to move or shrink.
    pub clamp: Option<ClampResult>,
}

/// Computes the frame of a window about to open or move.
///
/// With an explicit `display_id` the named display is used (primary if it is
/// gone). Without one, the display overlapping `bounds` the most is used.
/// Missing bounds produce a default-sized window centred on the display.
///
/// Returns `None` if no display is known.
#[must_use]
pub fn place_floating(
    bounds: Option<Rect>,
    display_id: Option<u32>,
    displays: &dyn DisplayProvider,
    sizing: &PaneSizing,
) -> Option<Placement> {
    let display: Display = match (display_id, bounds.as_ref()) {
        (None, Some(rect)) => displays.display_matching(rect)?,
        _ => resolve_display(displays, display_id)?,
    };

    let requested = bounds
        .unwrap_or_else(|| Rect::centered_in(&display.work_area, sizing.default_floating));
    let clamped = clamp_bounds_to_area_with_min(&requested, &display.work_area, sizing.minimum);

    // Generated frames have no "before" worth showing to the user.
    let clamp = ClampResult::between(requested, clamped, display_id, Some(display.id))
        .map(|clamp| ClampResult { before: bounds.and(clamp.before), ..clamp });

    Some(Placement {
        bounds: clamped,
        display_id: display.id,
        clamp,
    })
}

// ============================================================================
// Registry
// ============================================================================

/// Outcome of an open request.
#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct OpenOutcome {
    /// `false` when the pane was already floating.
    pub opened: bool,
    /// Set when the requested frame had to be adjusted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clamp: Option<ClampResult>,
}

impl OpenOutcome {
    const fn rejected() -> Self { Self { opened: false, clamp: None } }
}

/// Outcome of a move or resize report.
#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct MoveOutcome {
    /// `false` when the pane is not floating.
    pub updated: bool,
    /// Set when the reported frame had to be adjusted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clamp: Option<ClampResult>,
}

/// Per-project table of floating panes.
///
/// Entries keep insertion order so windows are restored in the order they were
/// detached.
#[derive(Debug, Default)]
pub struct FloatingRegistry {
    projects: RwLock<HashMap<String, Vec<FloatingPaneDescriptor>>>,
}

impl FloatingRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Floating panes of `project`, empty if none.
    #[must_use]
    pub fn list(&self, project: &str) -> Vec<FloatingPaneDescriptor> {
        self.projects.read().get(project).cloned().unwrap_or_default()
    }

    /// Returns whether `pane` is floating in `project`.
    #[must_use]
    pub fn is_floating(&self, project: &str, pane: &str) -> bool {
        self.projects
            .read()
            .get(project)
            .is_some_and(|panes| panes.iter().any(|p| p.id.as_str() == pane))
    }

    /// Detaches `pane`, clamping its frame onto a live display.
    ///
    /// A pane that is already floating is left alone and `opened` is `false`.
    pub fn open(
        &self,
        project: &str,
        pane: PaneId,
        bounds: Option<Rect>,
        display_id: Option<u32>,
        displays: &dyn DisplayProvider,
        sizing: &PaneSizing,
    ) -> OpenOutcome {
        let mut projects = self.projects.write();
        let panes = projects.entry(project.to_string()).or_default();

        if panes.iter().any(|p| p.id == pane) {
            tracing::debug!(project, pane = %pane, "layout: pane already floating");
            return OpenOutcome::rejected();
        }

        let Some(placement) = place_floating(bounds, display_id, displays, sizing) else {
            tracing::warn!(
                project,
                pane = %pane,
                "layout: no displays available, floating pane left unplaced"
            );
            panes.push(FloatingPaneDescriptor { id: pane, bounds, display_id });
            return OpenOutcome { opened: true, clamp: None };
        };

        tracing::debug!(
            project,
            pane = %pane,
            display_id = placement.display_id,
            "layout: pane detached"
        );
        panes.push(
            FloatingPaneDescriptor::new(pane)
                .with_bounds(placement.bounds, Some(placement.display_id)),
        );

        OpenOutcome { opened: true, clamp: placement.clamp }
    }

    /// Records a new frame for a floating pane.
    pub fn move_pane(
        &self,
        project: &str,
        pane: &str,
        bounds: Rect,
        display_id: Option<u32>,
        displays: &dyn DisplayProvider,
        sizing: &PaneSizing,
    ) -> MoveOutcome {
        let mut projects = self.projects.write();
        let Some(entry) = projects
            .get_mut(project)
            .and_then(|panes| panes.iter_mut().find(|p| p.id.as_str() == pane))
        else {
            return MoveOutcome { updated: false, clamp: None };
        };

        let clamp = match place_floating(Some(bounds), display_id, displays, sizing) {
            Some(placement) => {
                entry.bounds = Some(placement.bounds);
                entry.display_id = Some(placement.display_id);
                placement.clamp
            }
            None => {
                entry.bounds = Some(bounds);
                entry.display_id = display_id;
                None
            }
        };

        MoveOutcome { updated: true, clamp }
    }

    /// Removes `pane` from `project`. Returns whether it was floating.
    pub fn close(&self, project: &str, pane: &str) -> bool {
        let mut projects = self.projects.write();
        let Some(panes) = projects.get_mut(project) else {
            return false;
        };

        let before = panes.len();
        panes.retain(|p| p.id.as_str() != pane);
        let removed = panes.len() != before;

        if panes.is_empty() {
            projects.remove(project);
        }

        removed
    }

    /// Replaces the whole table of `project`.
    pub fn replace(&self, project: &str, panes: Vec<FloatingPaneDescriptor>) {
        let mut projects = self.projects.write();
        if panes.is_empty() {
            projects.remove(project);
        } else {
            projects.insert(project.to_string(), panes);
        }
    }

    /// Drops every floating pane of `project`, returning what was removed.
    pub fn clear(&self, project: &str) -> Vec<FloatingPaneDescriptor> {
        self.projects.write().remove(project).unwrap_or_default()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::geometry::StaticDisplays;

    const PROJECT: &str = "/projects/novel";

    fn displays() -> StaticDisplays {
        StaticDisplays::new(vec![
            Display::new(1, Rect::new(0.0, 0.0, 1920.0, 1080.0)),
            Display::new(2, Rect::new(1920.0, 0.0, 1920.0, 1080.0)),
        ])
    }

    fn open(
        registry: &FloatingRegistry,
        pane: &str,
        bounds: Option<Rect>,
        display: Option<u32>,
    ) -> OpenOutcome {
        registry.open(PROJECT, pane.into(), bounds, display, &displays(), &PaneSizing::default())
    }

    #[test]
    fn test_list_empty_project() {
        let registry = FloatingRegistry::new();
        assert!(registry.list(PROJECT).is_empty());
    }

    #[test]
    fn test_open_in_bounds_has_no_clamp() {
        let registry = FloatingRegistry::new();
        let bounds = Rect::new(100.0, 50.0, 480.0, 360.0);

        let outcome = open(&registry, "history", Some(bounds), Some(1));

        assert!(outcome.opened);
        assert!(outcome.clamp.is_none());
        assert_eq!(registry.list(PROJECT), vec![
            FloatingPaneDescriptor::new("history").with_bounds(bounds, Some(1))
        ]);
    }

    #[test]
    fn test_open_twice_is_noop() {
        let registry = FloatingRegistry::new();

        assert!(open(&registry, "history", None, None).opened);
        let second = open(&registry, "history", Some(Rect::new(0.0, 0.0, 500.0, 500.0)), Some(2));

        assert!(!second.opened);
        assert_eq!(registry.list(PROJECT).len(), 1);
        assert_eq!(registry.list(PROJECT)[0].display_id, Some(1));
    }

    #[test]
    fn test_open_reports_clamp() {
        let registry = FloatingRegistry::new();
        let bounds = Rect::new(2000.0, 50.0, 3000.0, 2000.0);

        let outcome = open(&registry, "critique", Some(bounds), Some(2));

        let clamp = outcome.clamp.expect("clamp expected");
        assert_eq!(clamp.before, Some(bounds));
        assert_eq!(clamp.after, Rect::new(1920.0, 0.0, 1920.0, 1080.0));
        assert_eq!(clamp.requested_display_id, Some(2));
        assert_eq!(clamp.applied_display_id, Some(2));
    }

    #[test]
    fn test_open_unknown_display_falls_back_to_primary() {
        let registry = FloatingRegistry::new();
        let bounds = Rect::new(2500.0, 10.0, 400.0, 300.0);
        let outcome = open(&registry, "critique", Some(bounds), Some(42));

        let clamp = outcome.clamp.expect("clamp expected");
        assert_eq!(clamp.applied_display_id, Some(1));
        assert_eq!(clamp.after, Rect::new(1520.0, 10.0, 400.0, 300.0));
        assert_eq!(registry.list(PROJECT)[0].display_id, Some(1));
    }

    #[test]
    fn test_open_without_display_uses_matching_display() {
        let registry = FloatingRegistry::new();
        let bounds = Rect::new(2100.0, 100.0, 600.0, 400.0);

        let outcome = open(&registry, "analytics", Some(bounds), None);

        assert!(outcome.clamp.is_none());
        assert_eq!(registry.list(PROJECT)[0].display_id, Some(2));
    }

    #[test]
    fn test_open_without_bounds_centres_default_size() {
        let registry = FloatingRegistry::new();

        let outcome = open(&registry, "wizard", None, Some(2));

        assert!(outcome.clamp.is_none());
        let descriptor = &registry.list(PROJECT)[0];
        assert_eq!(descriptor.bounds, Some(Rect::new(2640.0, 360.0, 480.0, 360.0)));
        assert_eq!(descriptor.display_id, Some(2));
    }

    #[test]
    fn test_close_is_idempotent() {
        let registry = FloatingRegistry::new();
        open(&registry, "history", None, None);

        assert!(registry.close(PROJECT, "history"));
        assert!(!registry.close(PROJECT, "history"));
        assert!(!registry.close("/elsewhere", "history"));
        assert!(registry.list(PROJECT).is_empty());
    }

    #[test]
    fn test_projects_are_isolated() {
        let registry = FloatingRegistry::new();
        open(&registry, "history", None, None);

        assert!(registry.is_floating(PROJECT, "history"));
        assert!(!registry.is_floating("/projects/other", "history"));
        assert!(registry.list("/projects/other").is_empty());
    }

    #[test]
    fn test_move_pane_clamps_and_updates() {
        let registry = FloatingRegistry::new();
        open(&registry, "history", None, Some(1));

        let outcome = registry.move_pane(
            PROJECT,
            "history",
            Rect::new(-300.0, 900.0, 480.0, 360.0),
            Some(1),
            &displays(),
            &PaneSizing::default(),
        );

        assert!(outcome.updated);
        assert!(outcome.clamp.is_some());
        assert_eq!(
            registry.list(PROJECT)[0].bounds,
            Some(Rect::new(0.0, 720.0, 480.0, 360.0))
        );
    }

    #[test]
    fn test_move_unknown_pane_not_updated() {
        let registry = FloatingRegistry::new();
        let outcome = registry.move_pane(
            PROJECT,
            "history",
            Rect::new(0.0, 0.0, 480.0, 360.0),
            None,
            &displays(),
            &PaneSizing::default(),
        );

        assert!(!outcome.updated);
    }

    #[test]
    fn test_open_without_displays_keeps_request() {
        let registry = FloatingRegistry::new();
        let bounds = Rect::new(-50.0, -50.0, 10.0, 10.0);

        let outcome = registry.open(
            PROJECT,
            "history".into(),
            Some(bounds),
            Some(3),
            &StaticDisplays::default(),
            &PaneSizing::default(),
        );

        assert!(outcome.opened);
        assert_eq!(registry.list(PROJECT)[0].bounds, Some(bounds));
    }

    #[test]
    fn test_replace_and_clear() {
        let registry = FloatingRegistry::new();
        registry.replace(PROJECT, vec![
            FloatingPaneDescriptor::new("history"),
            FloatingPaneDescriptor::new("analytics"),
        ]);

        let cleared = registry.clear(PROJECT);

        assert_eq!(cleared.len(), 2);
        assert!(registry.list(PROJECT).is_empty());
    }

    #[test]
    fn test_descriptor_serialization_skips_empty_fields() {
        let json = serde_json::to_value(FloatingPaneDescriptor::new("history")).unwrap();
        assert_eq!(json, serde_json::json!({ "id": "history" }));
    }
}
