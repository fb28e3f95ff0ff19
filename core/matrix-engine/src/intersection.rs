//! FILENAME: core/matrix-engine/src/intersection.rs
//! Cell Intersection Resolver - Body cell content at (row, column leaf).
//!
//! Missing data is an expected state with partial loading, so every lookup
//! degrades to a well-defined empty cell instead of failing:
//! - row without a values map   -> `BodyValue::Pending` (not loaded yet)
//! - nothing at the leaf index  -> `BodyValue::Absent`  (known absent)

use std::ops::Range;

use log::warn;
use serde::Serialize;

use crate::format::StatusGraphicToken;
use crate::hierarchy::{IntersectionValue, NodeId};
use crate::view::MatrixView;

// ============================================================================
// CELL TYPES
// ============================================================================

/// What is known about the value at an intersection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum BodyValue {
    /// The row's values have not been delivered.
    Pending,
    /// The row is loaded but stores nothing for this column leaf.
    Absent,
    Present(IntersectionValue),
}

/// What rendering should draw.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum CellDisplay {
    Empty,
    Text(String),
    StatusGraphic(StatusGraphicToken),
}

/// A body cell.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BodyCell {
    pub value: BodyValue,
    pub display: CellDisplay,
    /// Either the row or the column is a subtotal.
    pub is_subtotal: bool,
    /// The column is the first among its siblings.
    pub is_leftmost: bool,
}

impl BodyCell {
    pub fn is_present(&self) -> bool {
        matches!(self.value, BodyValue::Present(_))
    }
}

// ============================================================================
// RESOLUTION
// ============================================================================

impl MatrixView {
    /// Resolves the body cell where `row` meets `column`.
    ///
    /// # Panics
    /// If either id does not belong to this view's snapshots.
    pub fn intersect(&self, row: NodeId, column: NodeId) -> BodyCell {
        let row_node = self.rows().node(row);
        let column_node = self.columns().node(column);

        let is_subtotal = row_node.is_subtotal || column_node.is_subtotal;
        let is_leftmost = column_node.index == 0;

        let Some(row_values) = &row_node.row_values else {
            return self.empty_cell(BodyValue::Pending, is_subtotal, is_leftmost);
        };

        let stored = column_node
            .leaf_index()
            .and_then(|leaf_index| row_values.get(&leaf_index));
        let Some(stored) = stored else {
            return self.empty_cell(BodyValue::Absent, is_subtotal, is_leftmost);
        };

        BodyCell {
            display: self.display_for(stored),
            value: BodyValue::Present(stored.clone()),
            is_subtotal,
            is_leftmost,
        }
    }

    /// Cells of `row` for the column leaves in `columns` (clamped).
    pub fn body_row(&self, row: NodeId, columns: Range<usize>) -> Vec<BodyCell> {
        self.columns()
            .leaf_window(columns)
            .iter()
            .map(|&column| self.intersect(row, column))
            .collect()
    }

    fn empty_cell(&self, value: BodyValue, is_subtotal: bool, is_leftmost: bool) -> BodyCell {
        let display = match &self.options().empty_cell_text {
            Some(text) => CellDisplay::Text(text.clone()),
            None => CellDisplay::Empty,
        };
        BodyCell {
            value,
            display,
            is_subtotal,
            is_leftmost,
        }
    }

    fn display_for(&self, stored: &IntersectionValue) -> CellDisplay {
        let Some(source) = self.value_source(stored.value_source_index) else {
            warn!(
                "intersection refers to value source {} of {}",
                stored.value_source_index,
                self.value_sources().len()
            );
            return CellDisplay::Text(stored.value.to_plain_text(""));
        };

        let formatted = self.formatter().format(
            &stored.value,
            source,
            &self.options().format_string_property,
        );

        if let Some(mapping) = &source.status_graphic {
            if let Some(token) = self.status_graphics().resolve(mapping, &formatted) {
                return CellDisplay::StatusGraphic(token);
            }
        }

        CellDisplay::Text(formatted)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::definition::{
        Hierarchy, HierarchyNode, LevelDescriptor, MatrixValue, StatusGraphicMapping,
        ValueSource, WireIntersection,
    };
    use crate::format::PlainFormatter;
    use crate::hierarchy::{flatten, Axis};
    use crate::options::MatrixOptions;
    use crate::view::Collaborators;

    fn create_test_view(options: MatrixOptions) -> MatrixView {
        let rows = Hierarchy::new(
            HierarchyNode::root(vec![
                HierarchyNode::item(0, "East").with_values(vec![
                    (0, WireIntersection::new(10.0)),
                    (2, WireIntersection::with_source(1.0, 1)),
                    (3, WireIntersection::with_source(5.0, 7)),
                ]),
                HierarchyNode::item(0, "West"),
                HierarchyNode::subtotal(0).with_values(Vec::new()),
            ]),
            vec![LevelDescriptor::single(ValueSource::new("Region", "Region"))],
        );
        let columns = Hierarchy::new(
            HierarchyNode::root(vec![
                HierarchyNode::item(0, 2023.0).with_children(vec![
                    HierarchyNode::structural(1),
                    HierarchyNode::structural(1).with_level_source(1),
                ]),
                HierarchyNode::subtotal(0).with_children(vec![
                    HierarchyNode::subtotal(1),
                    HierarchyNode::subtotal(1).with_level_source(1),
                ]),
            ]),
            vec![
                LevelDescriptor::single(ValueSource::new("Year", "Year")),
                LevelDescriptor::new(vec![
                    ValueSource::measure("Sales", "Sales"),
                    ValueSource::measure("Status", "Status"),
                ]),
            ],
        );
        let mut status = ValueSource::measure("Status", "Status");
        status.status_graphic = Some(StatusGraphicMapping {
            graphic: "Traffic Light".to_string(),
            icons: [("1".to_string(), "green".to_string())].into_iter().collect(),
        });

        let rows = flatten(Axis::Rows, &rows, &options, &PlainFormatter).unwrap();
        let columns = flatten(Axis::Columns, &columns, &options, &PlainFormatter).unwrap();
        MatrixView::new(
            Arc::new(rows),
            Arc::new(columns),
            vec![ValueSource::measure("Sales", "Sales"), status],
            Collaborators {
                options: Arc::new(options),
                ..Collaborators::default()
            },
        )
    }

    #[test]
    fn test_present_value() {
        let view = create_test_view(MatrixOptions::default());
        let east = view.rows().leaf_at(0).unwrap();
        let cell = view.intersect(east, view.columns().leaf_at(0).unwrap());

        assert_eq!(
            cell.value,
            BodyValue::Present(IntersectionValue {
                value: MatrixValue::Number(10.0),
                value_source_index: 0
            })
        );
        assert_eq!(cell.display, CellDisplay::Text("10".to_string()));
        assert!(cell.is_leftmost);
        assert!(!cell.is_subtotal);
    }

    #[test]
    fn test_pending_row() {
        let view = create_test_view(MatrixOptions::default());
        let west = view.rows().leaf_at(1).unwrap();
        let cell = view.intersect(west, view.columns().leaf_at(1).unwrap());

        assert_eq!(cell.value, BodyValue::Pending);
        assert_eq!(cell.display, CellDisplay::Empty);
        assert!(!cell.is_leftmost);
    }

    #[test]
    fn test_absent_value_and_empty_text() {
        let options = MatrixOptions {
            empty_cell_text: Some("-".to_string()),
            ..MatrixOptions::default()
        };
        let view = create_test_view(options);
        let east = view.rows().leaf_at(0).unwrap();
        let cell = view.intersect(east, view.columns().leaf_at(1).unwrap());

        assert_eq!(cell.value, BodyValue::Absent);
        assert_eq!(cell.display, CellDisplay::Text("-".to_string()));
    }

    #[test]
    fn test_subtotal_flags() {
        let view = create_test_view(MatrixOptions::default());
        let total_row = view.rows().leaf_at(2).unwrap();
        let east = view.rows().leaf_at(0).unwrap();

        let cell = view.intersect(total_row, view.columns().leaf_at(0).unwrap());
        assert!(cell.is_subtotal);
        assert_eq!(cell.value, BodyValue::Absent);

        let cell = view.intersect(east, view.columns().leaf_at(2).unwrap());
        assert!(cell.is_subtotal);
        assert!(cell.is_leftmost);
    }

    #[test]
    fn test_status_graphic_token() {
        let view = create_test_view(MatrixOptions::default());
        let east = view.rows().leaf_at(0).unwrap();
        let cell = view.intersect(east, view.columns().leaf_at(2).unwrap());

        match cell.display {
            CellDisplay::StatusGraphic(token) => assert_eq!(token.icon, "green"),
            other => panic!("expected status graphic, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_value_source_falls_back_to_text() {
        let view = create_test_view(MatrixOptions::default());
        let east = view.rows().leaf_at(0).unwrap();
        let cell = view.intersect(east, view.columns().leaf_at(3).unwrap());

        assert!(cell.is_present());
        assert_eq!(cell.display, CellDisplay::Text("5".to_string()));
    }

    #[test]
    fn test_branch_column_is_absent() {
        let view = create_test_view(MatrixOptions::default());
        let east = view.rows().leaf_at(0).unwrap();
        let year = view.columns().top_level()[0];

        assert_eq!(view.intersect(east, year).value, BodyValue::Absent);
    }

    #[test]
    fn test_body_row_window() {
        let view = create_test_view(MatrixOptions::default());
        let east = view.rows().leaf_at(0).unwrap();
        let cells = view.body_row(east, 1..10);

        assert_eq!(cells.len(), 3);
        assert_eq!(cells[0].value, BodyValue::Absent);
        assert!(cells[1].is_present());
    }
}
