//! FILENAME: core/matrix-engine/src/definition.rs
//! Matrix Payload - The serializable input delivered by the host.
//!
//! This module contains the types needed to DESCRIBE one data delivery:
//! - Two hierarchy trees (rows, columns) with per-depth level descriptors
//! - Sparse per-row intersection values keyed by column leaf index
//! - The value-source list used for formatting and sort targeting
//!
//! These are wire-shaped: optional fields stay optional here and are
//! defaulted exactly once when a hierarchy is flattened into a snapshot.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::MatrixError;

/// Stable identity of a hierarchy node (e.g. a serialized scope key).
/// Absent for purely structural nodes such as measure headers.
pub type NodeIdentity = String;

// ============================================================================
// VALUES
// ============================================================================

/// A scalar value bound to a header node or stored at an intersection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MatrixValue {
    Null,
    Boolean(bool),
    Number(f64),
    Text(String),
}

impl MatrixValue {
    pub fn text(s: impl Into<String>) -> Self {
        MatrixValue::Text(s.into())
    }

    /// Unformatted textual rendering, used when no format string applies.
    pub fn to_plain_text(&self, blank_label: &str) -> String {
        match self {
            MatrixValue::Null => blank_label.to_string(),
            MatrixValue::Boolean(b) => if *b { "TRUE" } else { "FALSE" }.to_string(),
            MatrixValue::Number(n) => format!("{}", n),
            MatrixValue::Text(s) => s.clone(),
        }
    }
}

impl From<f64> for MatrixValue {
    fn from(value: f64) -> Self {
        MatrixValue::Number(value)
    }
}

impl From<&str> for MatrixValue {
    fn from(value: &str) -> Self {
        MatrixValue::Text(value.to_string())
    }
}

/// Keeps a present-but-null field distinct from a missing one:
/// missing stays `None` via `#[serde(default)]`, `null` becomes `Some(Null)`.
fn present_value<'de, D>(deserializer: D) -> Result<Option<MatrixValue>, D::Error>
where
    D: Deserializer<'de>,
{
    MatrixValue::deserialize(deserializer).map(Some)
}

// ============================================================================
// VALUE SOURCES & LEVELS
// ============================================================================

/// Sort direction requested for a value source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn flipped(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }
}

/// Maps formatted values of a KPI-style source to icon names.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StatusGraphicMapping {
    /// Name of the graphic set (e.g. "Traffic Light").
    pub graphic: String,

    /// Formatted value -> icon name.
    #[serde(default)]
    pub icons: BTreeMap<String, String>,
}

/// Describes one field/measure that can produce header nodes or
/// intersection values.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ValueSource {
    /// Identifier the host uses to address this source in queries.
    pub query_name: String,

    /// Human-readable name (e.g. "Sum of Sales").
    pub display_name: String,

    /// Format string handed to the formatting collaborator.
    #[serde(default)]
    pub format_string: Option<String>,

    /// Present for sources rendered as status graphics instead of text.
    #[serde(default)]
    pub status_graphic: Option<StatusGraphicMapping>,

    /// Whether this source is a measure (as opposed to a grouping field).
    #[serde(default)]
    pub is_measure: bool,

    /// The sort currently applied to this source by the host, if any.
    #[serde(default)]
    pub sort: Option<SortDirection>,
}

impl ValueSource {
    pub fn new(query_name: impl Into<String>, display_name: impl Into<String>) -> Self {
        ValueSource {
            query_name: query_name.into(),
            display_name: display_name.into(),
            ..ValueSource::default()
        }
    }

    pub fn measure(query_name: impl Into<String>, display_name: impl Into<String>) -> Self {
        ValueSource {
            is_measure: true,
            ..ValueSource::new(query_name, display_name)
        }
    }

    pub fn with_format(mut self, format_string: impl Into<String>) -> Self {
        self.format_string = Some(format_string.into());
        self
    }
}

/// Metadata shared by every node at one depth of a hierarchy.
/// A level defined by several fields (e.g. a multi-measure band) lists
/// all of them; nodes pick one through their level source index.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LevelDescriptor {
    pub sources: Vec<ValueSource>,
}

impl LevelDescriptor {
    pub fn new(sources: Vec<ValueSource>) -> Self {
        LevelDescriptor { sources }
    }

    pub fn single(source: ValueSource) -> Self {
        LevelDescriptor { sources: vec![source] }
    }
}

// ============================================================================
// HIERARCHY NODES
// ============================================================================

/// A value stored at (row, column leaf) as delivered by the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireIntersection {
    pub value: MatrixValue,

    /// Index into the payload's value sources; missing means 0.
    #[serde(default)]
    pub value_source_index: Option<usize>,
}

impl WireIntersection {
    pub fn new(value: impl Into<MatrixValue>) -> Self {
        WireIntersection {
            value: value.into(),
            value_source_index: None,
        }
    }

    pub fn with_source(value: impl Into<MatrixValue>, value_source_index: usize) -> Self {
        WireIntersection {
            value: value.into(),
            value_source_index: Some(value_source_index),
        }
    }
}

/// A node of a row or column hierarchy in wire form.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct HierarchyNode {
    /// Declared depth of this node.
    #[serde(default)]
    pub level: Option<usize>,

    /// Bound value. `None` means "not yet resolved"; `Some(Null)` is an
    /// explicit null.
    #[serde(default, deserialize_with = "present_value", skip_serializing_if = "Option::is_none")]
    pub value: Option<MatrixValue>,

    #[serde(default)]
    pub identity: Option<NodeIdentity>,

    /// Marks subtotal and grand-total nodes.
    #[serde(default)]
    pub is_subtotal: bool,

    /// Which source of this node's level produced it; missing means 0.
    #[serde(default)]
    pub level_source_index: Option<usize>,

    /// Ordered children. Empty or missing makes this node a leaf.
    #[serde(default)]
    pub children: Option<Vec<HierarchyNode>>,

    /// Row nodes only: stored values keyed by column leaf index.
    /// Missing means the row's values have not been loaded yet.
    #[serde(default)]
    pub values: Option<BTreeMap<usize, WireIntersection>>,
}

impl HierarchyNode {
    /// An invisible root holding the top-level nodes.
    pub fn root(children: Vec<HierarchyNode>) -> Self {
        HierarchyNode {
            children: Some(children),
            ..HierarchyNode::default()
        }
    }

    /// A data node at `level` bound to `value`, identified by its text.
    pub fn item(level: usize, value: impl Into<MatrixValue>) -> Self {
        let value = value.into();
        HierarchyNode {
            level: Some(level),
            identity: Some(value.to_plain_text("")),
            value: Some(value),
            ..HierarchyNode::default()
        }
    }

    /// A structural node at `level` with neither identity nor value.
    pub fn structural(level: usize) -> Self {
        HierarchyNode {
            level: Some(level),
            ..HierarchyNode::default()
        }
    }

    /// A subtotal node at `level` with no identity or value.
    pub fn subtotal(level: usize) -> Self {
        HierarchyNode {
            level: Some(level),
            is_subtotal: true,
            ..HierarchyNode::default()
        }
    }

    pub fn with_identity(mut self, identity: impl Into<NodeIdentity>) -> Self {
        self.identity = Some(identity.into());
        self
    }

    pub fn with_children(mut self, children: Vec<HierarchyNode>) -> Self {
        self.children = Some(children);
        self
    }

    pub fn with_level_source(mut self, index: usize) -> Self {
        self.level_source_index = Some(index);
        self
    }

    pub fn with_values(mut self, values: impl IntoIterator<Item = (usize, WireIntersection)>) -> Self {
        self.values = Some(values.into_iter().collect());
        self
    }

    pub fn has_children(&self) -> bool {
        self.children.as_ref().map_or(false, |c| !c.is_empty())
    }
}

// ============================================================================
// PAYLOAD
// ============================================================================

/// One axis as delivered: root node plus level descriptors.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Hierarchy {
    pub root: HierarchyNode,

    #[serde(default)]
    pub levels: Vec<LevelDescriptor>,
}

impl Hierarchy {
    pub fn new(root: HierarchyNode, levels: Vec<LevelDescriptor>) -> Self {
        Hierarchy { root, levels }
    }
}

/// A complete data delivery from the host.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MatrixPayload {
    pub rows: Hierarchy,
    pub columns: Hierarchy,

    /// Sources whose values populate intersections.
    #[serde(default)]
    pub value_sources: Vec<ValueSource>,
}

impl MatrixPayload {
    pub fn new(rows: Hierarchy, columns: Hierarchy, value_sources: Vec<ValueSource>) -> Self {
        MatrixPayload {
            rows,
            columns,
            value_sources,
        }
    }

    /// Parses a payload from its JSON form.
    pub fn from_json(json: &str) -> Result<Self, MatrixError> {
        Ok(serde_json::from_str(json)?)
    }
}
