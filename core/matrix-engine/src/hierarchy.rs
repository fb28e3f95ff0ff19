//! FILENAME: core/matrix-engine/src/hierarchy.rs
//! Hierarchy Flattener - Turns a wire hierarchy into an immutable snapshot.
//!
//! A snapshot is an arena of `FlatNode`s in depth-first order. Every node
//! knows its parent (a back-reference for lookup only), its index among its
//! siblings, its resolved level, label and query name. Leaves additionally
//! carry a dense leaf index that addresses intersection data.
//!
//! Snapshots are built once per axis per update and never edited afterwards.

use std::ops::Range;

use log::{trace, warn};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::definition::{
    Hierarchy, HierarchyNode, LevelDescriptor, MatrixValue, NodeIdentity, ValueSource,
};
use crate::error::MatrixError;
use crate::format::ValueFormatter;
use crate::options::MatrixOptions;

// ============================================================================
// NODE TYPES
// ============================================================================

/// Which axis a hierarchy belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    Rows,
    Columns,
}

/// Position of a node in its snapshot's arena.
/// Only meaningful for the snapshot that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Leaf-vs-branch, decided once while flattening.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum NodeKind {
    Leaf { leaf_index: usize },
    Branch { children: SmallVec<[NodeId; 4]> },
}

/// A header node's bound value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum NodeValue {
    /// The host has not delivered a value for this node.
    Unresolved,
    /// A delivered value, possibly `MatrixValue::Null`.
    Bound(MatrixValue),
}

/// A value stored at (row, column leaf), with its source index defaulted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IntersectionValue {
    pub value: MatrixValue,
    pub value_source_index: usize,
}

/// Stored values of one row, keyed by column leaf index.
pub type RowValues = FxHashMap<usize, IntersectionValue>;

/// One node of a flattened hierarchy.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlatNode {
    /// Parent node, `None` for top-level nodes.
    pub parent: Option<NodeId>,

    /// Resolved depth.
    pub level: usize,

    /// Position among immediate siblings.
    pub index: usize,

    pub kind: NodeKind,

    pub value: NodeValue,

    pub identity: Option<NodeIdentity>,

    /// Subtotal or grand-total node.
    pub is_subtotal: bool,

    /// Which source of the level produced this node.
    pub level_source_index: usize,

    /// Display label, when one could be resolved.
    pub label: Option<String>,

    /// Query identifier of the producing source.
    pub query_name: Option<String>,

    /// Row axis only. `None` means the row's values are not loaded yet.
    pub row_values: Option<RowValues>,
}

impl FlatNode {
    pub fn is_leaf(&self) -> bool {
        matches!(self.kind, NodeKind::Leaf { .. })
    }

    pub fn leaf_index(&self) -> Option<usize> {
        match self.kind {
            NodeKind::Leaf { leaf_index } => Some(leaf_index),
            NodeKind::Branch { .. } => None,
        }
    }

    pub fn children(&self) -> &[NodeId] {
        match &self.kind {
            NodeKind::Leaf { .. } => &[],
            NodeKind::Branch { children } => children,
        }
    }

    pub fn is_static(&self) -> bool {
        self.identity.is_none() && self.value == NodeValue::Unresolved
    }
}

/// Compares two header nodes, possibly from different snapshots.
/// Identity-bearing nodes compare by identity; structural ones by shape.
pub fn headers_equal(a: &FlatNode, b: &FlatNode) -> bool {
    match (&a.identity, &b.identity) {
        (Some(x), Some(y)) => x == y && a.level_source_index == b.level_source_index,
        (None, None) => {
            a.level == b.level
                && a.index == b.index
                && a.is_subtotal == b.is_subtotal
                && a.level_source_index == b.level_source_index
                && a.label == b.label
        }
        _ => false,
    }
}

// ============================================================================
// SNAPSHOT
// ============================================================================

/// Immutable flattened view of one axis.
#[derive(Debug, Clone, Serialize)]
pub struct HierarchySnapshot {
    axis: Axis,
    root_identity: Option<NodeIdentity>,
    levels: Vec<LevelDescriptor>,
    nodes: Vec<FlatNode>,
    top_level: Vec<NodeId>,
    leaves: Vec<NodeId>,
    #[serde(skip)]
    by_identity: FxHashMap<NodeIdentity, NodeId>,
}

impl HierarchySnapshot {
    pub fn axis(&self) -> Axis {
        self.axis
    }

    /// Identity of the (invisible) root this snapshot was built from.
    pub fn root_identity(&self) -> Option<&str> {
        self.root_identity.as_deref()
    }

    pub fn levels(&self) -> &[LevelDescriptor] {
        &self.levels
    }

    /// Number of declared levels.
    pub fn level_count(&self) -> usize {
        self.levels.len()
    }

    /// Declared level count, but never less than one.
    pub fn depth(&self) -> usize {
        self.levels.len().max(1)
    }

    pub fn last_level(&self) -> Option<usize> {
        self.levels.len().checked_sub(1)
    }

    /// First source of `level`, if the level exists and has one.
    pub fn first_source(&self, level: usize) -> Option<&ValueSource> {
        self.levels.get(level).and_then(|l| l.sources.first())
    }

    /// # Panics
    /// If `id` does not belong to this snapshot.
    pub fn node(&self, id: NodeId) -> &FlatNode {
        &self.nodes[id.index()]
    }

    /// All nodes in depth-first order with their ids.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &FlatNode)> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .map(|(i, node)| (NodeId(i), node))
    }

    pub fn top_level(&self) -> &[NodeId] {
        &self.top_level
    }

    pub fn leaves(&self) -> &[NodeId] {
        &self.leaves
    }

    pub fn leaf_count(&self) -> usize {
        self.leaves.len()
    }

    pub fn leaf_at(&self, leaf_index: usize) -> Option<NodeId> {
        self.leaves.get(leaf_index).copied()
    }

    /// Leaves whose leaf index falls in `range`, clamped to the leaf count.
    pub fn leaf_window(&self, range: Range<usize>) -> &[NodeId] {
        let end = range.end.min(self.leaves.len());
        let start = range.start.min(end);
        &self.leaves[start..end]
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.node(id).children()
    }

    /// `id` and its siblings, in order.
    pub fn siblings(&self, id: NodeId) -> &[NodeId] {
        match self.node(id).parent {
            Some(parent) => self.children(parent),
            None => &self.top_level,
        }
    }

    pub fn is_leaf(&self, id: NodeId) -> bool {
        self.node(id).is_leaf()
    }

    pub fn is_first_item(&self, id: NodeId) -> bool {
        self.node(id).index == 0
    }

    pub fn is_last_item(&self, id: NodeId) -> bool {
        self.node(id).index + 1 == self.siblings(id).len()
    }

    /// Ancestors of `id`, nearest first.
    pub fn ancestors(&self, id: NodeId) -> SmallVec<[NodeId; 8]> {
        let mut out = SmallVec::new();
        let mut current = self.node(id).parent;
        while let Some(parent) = current {
            out.push(parent);
            current = self.node(parent).parent;
        }
        out
    }

    pub fn are_all_parents_first(&self, id: NodeId) -> bool {
        self.ancestors(id).iter().all(|&a| self.is_first_item(a))
    }

    pub fn are_all_parents_last(&self, id: NodeId) -> bool {
        self.ancestors(id).iter().all(|&a| self.is_last_item(a))
    }

    /// How many levels separate `id` from its children (usually 1).
    pub fn children_level_difference(&self, id: NodeId) -> Option<usize> {
        let node = self.node(id);
        node.children()
            .first()
            .map(|&child| self.node(child).level.saturating_sub(node.level))
    }

    pub fn find_by_identity(&self, identity: &str) -> Option<NodeId> {
        self.by_identity.get(identity).copied()
    }
}

// ============================================================================
// FLATTENING
// ============================================================================

/// Flattens one axis of a payload into a snapshot.
///
/// Traversal is depth-first in wire order. Leaf indices are assigned in
/// visit order, so they are dense and stable for an unchanged tree.
pub fn flatten(
    axis: Axis,
    hierarchy: &Hierarchy,
    options: &MatrixOptions,
    formatter: &dyn ValueFormatter,
) -> Result<HierarchySnapshot, MatrixError> {
    let mut flattener = Flattener {
        axis,
        levels: &hierarchy.levels,
        options,
        formatter,
        nodes: Vec::new(),
        leaves: Vec::new(),
        by_identity: FxHashMap::default(),
    };

    let top_level = match &hierarchy.root.children {
        Some(children) => flattener.flatten_children(children, None, 0)?,
        None => SmallVec::new(),
    };

    if axis == Axis::Columns {
        flattener.backfill_static_labels();
    }

    trace!(
        "flattened {:?}: {} nodes, {} leaves",
        axis,
        flattener.nodes.len(),
        flattener.leaves.len()
    );

    Ok(HierarchySnapshot {
        axis,
        root_identity: hierarchy.root.identity.clone(),
        levels: hierarchy.levels.clone(),
        nodes: flattener.nodes,
        top_level: top_level.into_vec(),
        leaves: flattener.leaves,
        by_identity: flattener.by_identity,
    })
}

struct Flattener<'a> {
    axis: Axis,
    levels: &'a [LevelDescriptor],
    options: &'a MatrixOptions,
    formatter: &'a dyn ValueFormatter,
    nodes: Vec<FlatNode>,
    leaves: Vec<NodeId>,
    by_identity: FxHashMap<NodeIdentity, NodeId>,
}

impl<'a> Flattener<'a> {
    /// Flattens one sibling group. All siblings share one level: the first
    /// declared level in the group fixes it for the rest of the frame.
    fn flatten_children(
        &mut self,
        children: &[HierarchyNode],
        parent: Option<NodeId>,
        depth: usize,
    ) -> Result<SmallVec<[NodeId; 4]>, MatrixError> {
        let mut frame_level: Option<usize> = None;
        let mut ids = SmallVec::with_capacity(children.len());

        for (index, wire) in children.iter().enumerate() {
            let level = match (wire.level, frame_level) {
                (Some(found), Some(expected)) if found != expected => {
                    return Err(MatrixError::MixedSiblingLevels {
                        axis: self.axis,
                        depth,
                        expected,
                        found,
                    });
                }
                (Some(found), _) => {
                    frame_level = Some(found);
                    found
                }
                (None, Some(expected)) => expected,
                (None, None) => depth,
            };

            ids.push(self.flatten_node(wire, parent, level, index, depth)?);
        }

        Ok(ids)
    }

    fn flatten_node(
        &mut self,
        wire: &HierarchyNode,
        parent: Option<NodeId>,
        level: usize,
        index: usize,
        depth: usize,
    ) -> Result<NodeId, MatrixError> {
        let id = NodeId(self.nodes.len());
        let level_source_index = wire.level_source_index.unwrap_or(0);
        let source = self.source_for(level, level_source_index);

        let value = match &wire.value {
            Some(v) => NodeValue::Bound(v.clone()),
            None => NodeValue::Unresolved,
        };
        let label = self.resolve_label(&value, source);

        let row_values = match (self.axis, &wire.values) {
            (Axis::Rows, Some(values)) => Some(
                values
                    .iter()
                    .map(|(&leaf_index, stored)| {
                        let value = IntersectionValue {
                            value: stored.value.clone(),
                            value_source_index: stored.value_source_index.unwrap_or(0),
                        };
                        (leaf_index, value)
                    })
                    .collect(),
            ),
            _ => None,
        };

        if let Some(identity) = &wire.identity {
            self.by_identity.entry(identity.clone()).or_insert(id);
        }

        let has_children = wire.has_children();
        self.nodes.push(FlatNode {
            parent,
            level,
            index,
            kind: if has_children {
                NodeKind::Branch { children: SmallVec::new() }
            } else {
                NodeKind::Leaf { leaf_index: self.leaves.len() }
            },
            value,
            identity: wire.identity.clone(),
            is_subtotal: wire.is_subtotal,
            level_source_index,
            label,
            query_name: source.map(|s| s.query_name.clone()),
            row_values,
        });

        match &wire.children {
            Some(children) if has_children => {
                let child_ids = self.flatten_children(children, Some(id), depth + 1)?;
                self.nodes[id.index()].kind = NodeKind::Branch { children: child_ids };
            }
            _ => self.leaves.push(id),
        }

        Ok(id)
    }

    fn source_for(&self, level: usize, source_index: usize) -> Option<&'a ValueSource> {
        let source = self
            .levels
            .get(level)
            .and_then(|l| l.sources.get(source_index));
        if source.is_none() && !self.levels.is_empty() {
            warn!(
                "{:?} hierarchy: no source {} at level {} ({} levels declared)",
                self.axis,
                source_index,
                level,
                self.levels.len()
            );
        }
        source
    }

    fn resolve_label(&self, value: &NodeValue, source: Option<&ValueSource>) -> Option<String> {
        let NodeValue::Bound(value) = value else {
            return None;
        };
        match source {
            Some(source) if source.format_string.is_some() => Some(self.formatter.format(
                value,
                source,
                &self.options.format_string_property,
            )),
            _ => Some(value.to_plain_text(&self.options.blank_label)),
        }
    }

    /// Column leaves with neither identity nor value (e.g. a bare measure
    /// header or "Total") take their label from the level source name.
    fn backfill_static_labels(&mut self) {
        for &leaf in &self.leaves {
            let node = &mut self.nodes[leaf.index()];
            if !node.is_static() {
                continue;
            }
            if let Some(source) = self
                .levels
                .get(node.level)
                .and_then(|l| l.sources.get(node.level_source_index))
            {
                node.label = Some(source.display_name.clone());
            }
        }
    }
}
