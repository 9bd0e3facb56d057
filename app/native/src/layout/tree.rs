//! The docked pane tree.
//!
//! The main window arranges panes as a binary split tree. A leaf names a pane;
//! an internal node splits its area into two children along a row or a column.
//!
//! Trees arrive from disk and from the GUI as untyped JSON and are never
//! trusted: [`sanitize_layout`] parses them with a strict recursive descent
//! against the pane ids the running version knows about. Any unknown id or
//! malformed node rejects the whole tree in favour of the default layout.
//! Duplicate leaves are the one defect that is repaired in place: the first
//! occurrence (depth first, `first` before `second`) is kept and later copies
//! are elided, collapsing their parent split into the surviving sibling.

use std::borrow::Borrow;
use std::collections::{BTreeSet, HashSet};
use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use smallvec::SmallVec;

use crate::constants::layout::{BUILTIN_PANES, MAX_TREE_DEPTH};

// ============================================================================
// Pane Ids
// ============================================================================

/// Identifier of a logical workspace pane, e.g. `draft-board`.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
#[serde(transparent)]
pub struct PaneId(String);

impl PaneId {
    /// Creates a pane id.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self { Self(id.into()) }

    /// Returns the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for PaneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

impl Borrow<str> for PaneId {
    fn borrow(&self) -> &str { &self.0 }
}

impl From<&str> for PaneId {
    fn from(id: &str) -> Self { Self::new(id) }
}

impl From<String> for PaneId {
    fn from(id: String) -> Self { Self(id) }
}

/// The closed set of pane ids the running GUI can render.
///
/// Owned by the GUI and versioned with it; persisted data is validated
/// against it on every load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KnownPanes(BTreeSet<PaneId>);

impl KnownPanes {
    /// Builds a set from any list of ids.
    pub fn new<I, P>(ids: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PaneId>,
    {
        Self(ids.into_iter().map(Into::into).collect())
    }

    /// The panes shipped with this version.
    #[must_use]
    pub fn builtin() -> Self { Self::new(BUILTIN_PANES) }

    /// Returns whether `id` is known.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool { self.0.contains(id) }

    /// Returns whether the set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool { self.0.is_empty() }

    /// Iterates ids in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &PaneId> { self.0.iter() }
}

impl Default for KnownPanes {
    fn default() -> Self { Self::builtin() }
}

// ============================================================================
// Tree
// ============================================================================

/// Axis along which a split divides its area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum SplitDirection {
    /// Children side by side.
    Row,
    /// Children stacked vertically.
    Column,
}

impl SplitDirection {
    fn parse(value: &str) -> Option<Self> {
        match value {
            "row" => Some(Self::Row),
            "column" => Some(Self::Column),
            _ => None,
        }
    }
}

/// A node of the docked layout tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum LayoutNode {
    /// A single pane.
    Pane(PaneId),
    /// Two subtrees sharing an area.
    Split(Box<LayoutSplit>),
}

/// Internal node of the layout tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct LayoutSplit {
    /// Axis of the split.
    pub direction: SplitDirection,
    /// Left or top child.
    pub first: LayoutNode,
    /// Right or bottom child.
    pub second: LayoutNode,
    /// Share of the area given to `first`, from 0 to 100.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub split_percentage: Option<f64>,
}

/// Pane ids collected from a tree, inline for typical workspace sizes.
pub type PaneList<'a> = SmallVec<[&'a PaneId; 8]>;

impl LayoutNode {
    /// Creates a leaf.
    #[must_use]
    pub fn pane(id: impl Into<PaneId>) -> Self { Self::Pane(id.into()) }

    /// Creates a split.
    #[must_use]
    pub fn split(
        direction: SplitDirection,
        first: Self,
        second: Self,
        split_percentage: Option<f64>,
    ) -> Self {
        Self::Split(Box::new(LayoutSplit {
            direction,
            first,
            second,
            split_percentage,
        }))
    }

    /// Leaves in depth-first order, `first` before `second`.
    #[must_use]
    pub fn panes(&self) -> PaneList<'_> {
        let mut out = PaneList::new();
        self.collect_panes(&mut out);
        out
    }

    fn collect_panes<'a>(&'a self, out: &mut PaneList<'a>) {
        match self {
            Self::Pane(id) => out.push(id),
            Self::Split(split) => {
                split.first.collect_panes(out);
                split.second.collect_panes(out);
            }
        }
    }

    /// Returns whether `id` is docked somewhere in the tree.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        match self {
            Self::Pane(pane) => pane.as_str() == id,
            Self::Split(split) => split.first.contains(id) || split.second.contains(id),
        }
    }

    /// Number of split levels above the deepest leaf.
    #[must_use]
    pub fn depth(&self) -> usize {
        match self {
            Self::Pane(_) => 0,
            Self::Split(split) => 1 + split.first.depth().max(split.second.depth()),
        }
    }

    /// Removes every leaf rejected by `keep`.
    ///
    /// A split that loses one child is replaced by the other; a split that
    /// loses both disappears. Returns `None` if nothing survives.
    fn retain<F>(self, keep: &mut F) -> Option<Self>
    where F: FnMut(&PaneId) -> bool {
        match self {
            Self::Pane(id) => keep(&id).then_some(Self::Pane(id)),
            Self::Split(split) => {
                let LayoutSplit {
                    direction,
                    first,
                    second,
                    split_percentage,
                } = *split;

                match (first.retain(keep), second.retain(keep)) {
                    (Some(first), Some(second)) => {
                        Some(Self::split(direction, first, second, split_percentage))
                    }
                    (Some(only), None) | (None, Some(only)) => Some(only),
                    (None, None) => None,
                }
            }
        }
    }
}

// ============================================================================
// Default Layout
// ============================================================================

/// The built-in arrangement used when no valid tree exists.
///
/// Wizard on the left, the draft board in the centre, and critique, history
/// and analytics stacked on the right.
#[must_use]
pub fn default_layout() -> LayoutNode {
    use SplitDirection::{Column, Row};

    LayoutNode::split(
        Row,
        LayoutNode::pane("wizard"),
        LayoutNode::split(
            Row,
            LayoutNode::pane("draft-board"),
            LayoutNode::split(
                Column,
                LayoutNode::pane("critique"),
                LayoutNode::split(
                    Column,
                    LayoutNode::pane("history"),
                    LayoutNode::pane("analytics"),
                    Some(50.0),
                ),
                Some(40.0),
            ),
            Some(65.0),
        ),
        Some(25.0),
    )
}

/// The default arrangement restricted to `known`.
///
/// Panes missing from `known` are pruned out of the built-in tree. If none of
/// the built-in panes survive, the first known pane fills the window on its
/// own. An empty set yields the built-in tree unchanged.
#[must_use]
pub fn default_layout_for(known: &KnownPanes) -> LayoutNode {
    if let Some(tree) = default_layout().retain(&mut |id| known.contains(id.as_str())) {
        return tree;
    }

    known.iter().next().cloned().map_or_else(
        || {
            tracing::warn!("layout: known pane set is empty, using built-in default layout");
            default_layout()
        },
        LayoutNode::Pane,
    )
}

// ============================================================================
// Sanitization
// ============================================================================

/// Why a candidate tree was rejected.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InvalidLayout {
    /// A leaf references a pane this version does not know.
    #[error("unknown pane id '{0}'")]
    UnknownPane(String),
    /// A node is neither a pane id string nor a split object.
    #[error("malformed node: {0}")]
    Malformed(&'static str),
    /// The tree nests deeper than any real workspace could.
    #[error("tree deeper than {} levels", MAX_TREE_DEPTH)]
    TooDeep,
}

/// Validates an untrusted tree, returning the default layout on rejection.
///
/// Every leaf of the result is in `known` (unless `known` is empty) and no
/// pane appears twice.
#[must_use]
pub fn sanitize_layout(candidate: &Value, known: &KnownPanes) -> LayoutNode {
    match parse_layout(candidate, known) {
        Ok(tree) => tree,
        Err(reason) => {
            if !candidate.is_null() {
                tracing::warn!(%reason, "layout: rejected layout tree, using default");
            }
            default_layout_for(known)
        }
    }
}

/// Strictly parses a tree and elides duplicate leaves.
///
/// # Errors
///
/// Returns the first defect found when the tree cannot be trusted.
pub fn parse_layout(candidate: &Value, known: &KnownPanes) -> Result<LayoutNode, InvalidLayout> {
    let tree = parse_node(candidate, known, 0)?;
    let leaves = tree.panes().len();

    let mut seen = HashSet::new();
    let deduped = tree.retain(&mut |id| seen.insert(id.clone()));

    // The first leaf always survives, so a parsed tree never empties out.
    let deduped = deduped.ok_or(InvalidLayout::Malformed("empty tree"))?;

    let dropped = leaves - deduped.panes().len();
    if dropped > 0 {
        tracing::debug!(dropped, "layout: elided duplicate panes from layout tree");
    }

    Ok(deduped)
}

fn parse_node(
    value: &Value,
    known: &KnownPanes,
    depth: usize,
) -> Result<LayoutNode, InvalidLayout> {
    if depth > MAX_TREE_DEPTH {
        return Err(InvalidLayout::TooDeep);
    }

    match value {
        Value::String(id) if known.contains(id) => Ok(LayoutNode::pane(id.as_str())),
        Value::String(id) => Err(InvalidLayout::UnknownPane(id.clone())),
        Value::Object(fields) => parse_split(fields, known, depth),
        Value::Null => Err(InvalidLayout::Malformed("missing node")),
        _ => Err(InvalidLayout::Malformed("expected pane id or split")),
    }
}

fn parse_split(
    fields: &Map<String, Value>,
    known: &KnownPanes,
    depth: usize,
) -> Result<LayoutNode, InvalidLayout> {
    let direction = fields
        .get("direction")
        .and_then(Value::as_str)
        .and_then(SplitDirection::parse)
        .ok_or(InvalidLayout::Malformed("split direction must be 'row' or 'column'"))?;

    let first = fields.get("first").ok_or(InvalidLayout::Malformed("split without 'first'"))?;
    let second = fields.get("second").ok_or(InvalidLayout::Malformed("split without 'second'"))?;

    let split_percentage = match fields.get("splitPercentage") {
        None | Some(Value::Null) => None,
        Some(value) => {
            let pct = value
                .as_f64()
                .filter(|pct| pct.is_finite())
                .ok_or(InvalidLayout::Malformed("splitPercentage must be a number"))?;
            Some(pct.clamp(0.0, 100.0))
        }
    };

    Ok(LayoutNode::split(
        direction,
        parse_node(first, known, depth + 1)?,
        parse_node(second, known, depth + 1)?,
        split_percentage,
    ))
}

// ============================================================================
// Tests
// ============================================================================
