//! Layout persistence and floating window geometry.
//!
//! - [`geometry`] - Rectangles, displays and clamping
//! - [`tree`] - The docked pane tree and its validation
//! - [`floating`] - Registry of panes detached into their own windows
//! - [`state`] - Stored records and schema migration
//! - [`store`] - Per-project storage backends
//! - [`service`] - Load, save and reset
//! - [`ipc`] - Request/response contract for the GUI
//! - [`debouncer`] - Coalescing of rapid saves

pub mod debouncer;
pub mod error;
pub mod floating;
pub mod geometry;
pub mod ipc;
pub mod service;
pub mod state;
pub mod store;
pub mod tree;

pub use debouncer::SaveDebouncer;
pub use error::{LayoutError, LayoutResult};
pub use floating::{FloatingPaneDescriptor, FloatingRegistry, MoveOutcome, OpenOutcome};
pub use geometry::{
    ClampReason, ClampResult, Display, DisplayProvider, PaneSize, PaneSizing, Rect,
    StaticDisplays, clamp_bounds_to_area, clamp_bounds_to_display,
};
pub use ipc::{LayoutIpc, LayoutRequest, LayoutResponse, Reply};
pub use service::{LayoutService, LayoutSettings};
pub use state::{LayoutSnapshot, LayoutState};
pub use store::{FileLayoutStore, LayoutStore, MemoryLayoutStore};
pub use tree::{KnownPanes, LayoutNode, PaneId, SplitDirection, default_layout, sanitize_layout};
