//! Display geometry for floating panes.
//!
//! Floating panes remember absolute desktop coordinates. Those coordinates go
//! stale whenever the monitor arrangement changes, so every rectangle that is
//! about to become a window is first clamped into the work area of exactly one
//! live display.
//!
//! All functions here are pure: the display list is passed in by the caller
//! and never cached between calls.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::constants::layout::{
    DEFAULT_FLOATING_HEIGHT, DEFAULT_FLOATING_WIDTH, MIN_PANE_HEIGHT, MIN_PANE_WIDTH,
};

// ============================================================================
// Geometric Types
// ============================================================================

/// A rectangle in virtual-desktop coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Rect {
    /// X coordinate of the origin (top-left corner).
    pub x: f64,
    /// Y coordinate of the origin (top-left corner).
    pub y: f64,
    /// Width of the rectangle.
    pub width: f64,
    /// Height of the rectangle.
    pub height: f64,
}

impl Rect {
    /// Creates a new rectangle.
    #[must_use]
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    /// Right edge (exclusive).
    #[must_use]
    pub fn right(&self) -> f64 { self.x + self.width }

    /// Bottom edge (exclusive).
    #[must_use]
    pub fn bottom(&self) -> f64 { self.y + self.height }

    /// Returns whether every component is a finite number.
    #[must_use]
    pub const fn is_finite(&self) -> bool {
        self.x.is_finite()
            && self.y.is_finite()
            && self.width.is_finite()
            && self.height.is_finite()
    }

    /// Returns whether `other` lies entirely inside this rectangle.
    #[must_use]
    pub fn contains_rect(&self, other: &Self) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }

    /// Area shared by both rectangles, zero when they do not overlap.
    #[must_use]
    pub fn intersection_area(&self, other: &Self) -> f64 {
        let width = self.right().min(other.right()) - self.x.max(other.x);
        let height = self.bottom().min(other.bottom()) - self.y.max(other.y);

        if width <= 0.0 || height <= 0.0 {
            0.0
        } else {
            width * height
        }
    }

    /// A rectangle of the given size centred inside `area`.
    #[must_use]
    pub fn centered_in(area: &Self, size: PaneSize) -> Self {
        Self::new(
            area.x + (area.width - size.width) / 2.0,
            area.y + (area.height - size.height) / 2.0,
            size.width,
            size.height,
        )
    }
}

/// Width and height pair used for size floors and defaults.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PaneSize {
    /// Width in pixels.
    pub width: f64,
    /// Height in pixels.
    pub height: f64,
}

impl PaneSize {
    /// Creates a new size.
    #[must_use]
    pub const fn new(width: f64, height: f64) -> Self { Self { width, height } }

    /// The smallest size a floating pane may shrink to.
    #[must_use]
    pub const fn minimum() -> Self { Self::new(MIN_PANE_WIDTH, MIN_PANE_HEIGHT) }

    /// The size of a floating pane opened without explicit bounds.
    #[must_use]
    pub const fn default_floating() -> Self {
        Self::new(DEFAULT_FLOATING_WIDTH, DEFAULT_FLOATING_HEIGHT)
    }
}

/// Size policy applied to floating panes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PaneSizing {
    /// Size floor enforced by every clamp.
    pub minimum: PaneSize,
    /// Size used when a pane is opened without bounds.
    pub default_floating: PaneSize,
}

impl Default for PaneSizing {
    fn default() -> Self {
        Self {
            minimum: PaneSize::minimum(),
            default_floating: PaneSize::default_floating(),
        }
    }
}

// ============================================================================
// Displays
// ============================================================================

/// A connected monitor and the part of it windows may occupy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Display {
    /// Identifier assigned by the window system.
    pub id: u32,
    /// Usable frame, excluding task bars and menu bars.
    pub work_area: Rect,
}

impl Display {
    /// Creates a new display.
    #[must_use]
    pub const fn new(id: u32, work_area: Rect) -> Self { Self { id, work_area } }
}

/// Live source of display information.
///
/// Implementations are queried on every operation and must not cache across
/// calls, since monitors can be attached or removed at any time.
pub trait DisplayProvider: Send + Sync {
    /// Every display currently connected.
    fn all_displays(&self) -> Vec<Display>;

    /// The display holding the menu bar or task bar, if any display exists.
    fn primary_display(&self) -> Option<Display>;

    /// The display that overlaps `rect` the most.
    ///
    /// Falls back to the primary display when `rect` touches no display.
    fn display_matching(&self, rect: &Rect) -> Option<Display> {
        let best = self
            .all_displays()
            .into_iter()
            .map(|display| (display.work_area.intersection_area(rect), display))
            .filter(|(overlap, _)| *overlap > 0.0)
            .fold(None::<(f64, Display)>, |best, candidate| match best {
                Some((area, _)) if area >= candidate.0 => best,
                _ => Some(candidate),
            });

        best.map(|(_, display)| display).or_else(|| self.primary_display())
    }
}

/// A fixed display table.
///
/// Used by the CLI, by tests, and as a per-operation snapshot of a live
/// provider so one load sees a single consistent monitor arrangement.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StaticDisplays {
    displays: Vec<Display>,
    primary_id: Option<u32>,
}

impl StaticDisplays {
    /// Creates a table whose first entry is the primary display.
    #[must_use]
    pub fn new(displays: Vec<Display>) -> Self {
        let primary_id = displays.first().map(|d| d.id);
        Self { displays, primary_id }
    }

    /// Marks the display with `id` as primary.
    ///
    /// Ignored when no display has that id.
    #[must_use]
    pub fn with_primary(mut self, id: u32) -> Self {
        if self.displays.iter().any(|d| d.id == id) {
            self.primary_id = Some(id);
        }
        self
    }

    /// Captures the current state of another provider.
    #[must_use]
    pub fn snapshot(provider: &dyn DisplayProvider) -> Self {
        let displays = provider.all_displays();
        let primary_id = provider
            .primary_display()
            .map(|d| d.id)
            .or_else(|| displays.first().map(|d| d.id));
        Self { displays, primary_id }
    }

    /// Returns whether no display is known.
    #[must_use]
    pub const fn is_empty(&self) -> bool { self.displays.is_empty() }

    /// Looks up a display by id.
    #[must_use]
    pub fn get(&self, id: u32) -> Option<Display> {
        self.displays.iter().copied().find(|d| d.id == id)
    }
}

impl DisplayProvider for StaticDisplays {
    fn all_displays(&self) -> Vec<Display> { self.displays.clone() }

    fn primary_display(&self) -> Option<Display> {
        self.primary_id.and_then(|id| self.get(id)).or_else(|| self.displays.first().copied())
    }
}

// ============================================================================
// Clamping
// ============================================================================

/// Why a rectangle was adjusted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum ClampReason {
    /// The rectangle was partly or fully outside the target work area.
    OffScreenClamp,
}

/// Diagnostic describing a clamp that actually moved or resized a pane.
///
/// Returned to the GUI so it can tell the user a window was repositioned.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClampResult {
    /// Rectangle before clamping. Absent when default bounds were generated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub before: Option<Rect>,
    /// Rectangle after clamping.
    pub after: Rect,
    /// Why the rectangle changed.
    pub reason: ClampReason,
    /// Display the caller asked for.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requested_display_id: Option<u32>,
    /// Display whose work area was used.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub applied_display_id: Option<u32>,
}

impl ClampResult {
    /// Builds a diagnostic when `after` differs from `before`.
    ///
    /// Returns `None` if clamping was a no-op.
    #[must_use]
    pub fn between(
        before: Rect,
        after: Rect,
        requested_display_id: Option<u32>,
        applied_display_id: Option<u32>,
    ) -> Option<Self> {
        (before != after).then_some(Self {
            before: Some(before),
            after,
            reason: ClampReason::OffScreenClamp,
            requested_display_id,
            applied_display_id,
        })
    }
}

/// Clamps `bounds` into `work_area` with the default size floor.
#[must_use]
pub fn clamp_bounds_to_area(bounds: &Rect, work_area: &Rect) -> Rect {
    clamp_bounds_to_area_with_min(bounds, work_area, PaneSize::minimum())
}

/// Clamps `bounds` into `work_area`.
///
/// Width and height are first held to `[minimum, work area dimension]`, then
/// the origin is held so the whole rectangle stays inside the work area. A
/// work area smaller than `minimum` wins over the floor.
#[must_use]
pub fn clamp_bounds_to_area_with_min(bounds: &Rect, work_area: &Rect, minimum: PaneSize) -> Rect {
    let width = bounds.width.max(minimum.width).min(work_area.width);
    let height = bounds.height.max(minimum.height).min(work_area.height);

    let x = bounds.x.max(work_area.x).min(work_area.right() - width);
    let y = bounds.y.max(work_area.y).min(work_area.bottom() - height);

    Rect::new(x, y, width, height)
}

/// Picks the display a pane should land on.
///
/// Uses `display_id` when it names a live display, otherwise the primary.
#[must_use]
pub fn resolve_display(displays: &dyn DisplayProvider, display_id: Option<u32>) -> Option<Display> {
    let requested =
        display_id.and_then(|id| displays.all_displays().into_iter().find(|d| d.id == id));

    if requested.is_none()
        && let Some(id) = display_id
    {
        tracing::debug!(display_id = id, "layout: requested display not connected, using primary");
    }

    requested.or_else(|| displays.primary_display())
}

/// Clamps `bounds` onto the display named by `display_id`.
///
/// Returns `None` when `bounds` is `None`. When no display is known at all the
/// bounds are returned untouched.
#[must_use]
pub fn clamp_bounds_to_display(
    bounds: Option<&Rect>,
    display_id: Option<u32>,
    displays: &dyn DisplayProvider,
) -> Option<Rect> {
    clamp_bounds_to_display_with_min(bounds, display_id, displays, PaneSize::minimum())
}

/// [`clamp_bounds_to_display`] with an explicit size floor.
#[must_use]
pub fn clamp_bounds_to_display_with_min(
    bounds: Option<&Rect>,
    display_id: Option<u32>,
    displays: &dyn DisplayProvider,
    minimum: PaneSize,
) -> Option<Rect> {
    let bounds = bounds?;

    let Some(display) = resolve_display(displays, display_id) else {
        tracing::warn!("layout: no displays available, bounds left unclamped");
        return Some(*bounds);
    };

    Some(clamp_bounds_to_area_with_min(bounds, &display.work_area, minimum))
}

// ============================================================================
// Tests
// ============================================================================
