//! FILENAME: tests/common/mod.rs
//! Test harness and fixtures for matrix engine integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use matrix_engine::{
    Hierarchy, HierarchyNode, LevelDescriptor, MatrixEngine, MatrixPayload, MatrixView, NodeId,
    ValueSource, WireIntersection,
};

/// Row identity shared by every payload of one query.
pub const ROWS_ROOT: &str = "rows:sales-by-region";

/// Test harness wrapping an engine with a sample payload installed.
pub struct TestHarness {
    pub engine: MatrixEngine,
}

impl TestHarness {
    pub fn new() -> Self {
        TestHarness {
            engine: MatrixEngine::new(),
        }
    }

    /// Region x Year matrix with the given regions loaded.
    pub fn with_regions(regions: &[&str]) -> Self {
        let mut harness = Self::new();
        harness
            .engine
            .update(region_by_year(regions), true)
            .expect("sample payload flattens");
        harness
    }

    pub fn view(&self) -> Arc<MatrixView> {
        self.engine.view().expect("engine is populated")
    }
}

/// Finds a leaf by its label on one axis.
pub fn leaf_labelled(view: &MatrixView, rows: bool, label: &str) -> NodeId {
    let snapshot = if rows { view.rows() } else { view.columns() };
    snapshot
        .leaves()
        .iter()
        .copied()
        .find(|&id| snapshot.node(id).label.as_deref() == Some(label))
        .unwrap_or_else(|| panic!("no leaf labelled {}", label))
}

/// Rows: `[Region]`. Columns: `[Year]` with 2023, 2024 and a single
/// measure. Each region stores `region_no * 100 + column_leaf_index`.
pub fn region_by_year(regions: &[&str]) -> MatrixPayload {
    let row_nodes = regions
        .iter()
        .enumerate()
        .map(|(i, region)| {
            let base = ((i + 1) * 100) as f64;
            HierarchyNode::item(0, *region).with_values(vec![
                (0, WireIntersection::new(base)),
                (1, WireIntersection::new(base + 1.0)),
            ])
        })
        .collect();

    let rows = Hierarchy::new(
        HierarchyNode::root(row_nodes).with_identity(ROWS_ROOT),
        vec![LevelDescriptor::single(ValueSource::new("Sales.Region", "Region"))],
    );
    let columns = Hierarchy::new(
        HierarchyNode::root(vec![HierarchyNode::item(0, 2023.0), HierarchyNode::item(0, 2024.0)]),
        vec![LevelDescriptor::single(ValueSource::new("Sales.Year", "Year"))],
    );

    MatrixPayload::new(rows, columns, vec![ValueSource::measure("Sum(Sales.Amount)", "Amount")])
}
