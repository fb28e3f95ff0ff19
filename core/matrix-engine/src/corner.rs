//! FILENAME: core/matrix-engine/src/corner.rs
//! Corner Cell Resolver - Ownership of the header overlap region.
//!
//! The corner spans (row level x column level). Its bottom band belongs to
//! the row hierarchy; the column hierarchy owns the rightmost column above
//! it. Interior positions with deep grouping on both axes belong to nobody.

use serde::Serialize;

use crate::definition::ValueSource;
use crate::hierarchy::Axis;
use crate::view::MatrixView;

/// A corner cell.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct CornerCell {
    /// Hierarchy that owns this cell, if any.
    pub owner: Option<Axis>,

    /// First source of the owning level.
    pub metadata: Option<ValueSource>,

    /// Cell sits on the column hierarchy's leaf boundary.
    pub is_column_leaf: bool,

    /// Cell sits on the row hierarchy's innermost level.
    pub is_row_leaf: bool,
}

impl MatrixView {
    /// Resolves the corner cell at (`row_level`, `column_level`).
    /// Rules are checked in order; the first match wins.
    pub fn corner(&self, row_level: usize, column_level: usize) -> CornerCell {
        let rows = self.rows();
        let columns = self.columns();
        let row_is_last = Some(row_level) == rows.last_level();

        if columns.level_count() == 0 || Some(column_level) == columns.last_level() {
            return CornerCell {
                owner: Some(Axis::Rows),
                metadata: rows.first_source(row_level).cloned(),
                is_column_leaf: true,
                is_row_leaf: row_is_last,
            };
        }

        if row_is_last {
            return CornerCell {
                owner: Some(Axis::Columns),
                metadata: columns.first_source(column_level).cloned(),
                is_column_leaf: false,
                is_row_leaf: true,
            };
        }

        CornerCell::default()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::definition::{Hierarchy, HierarchyNode, LevelDescriptor};
    use crate::format::PlainFormatter;
    use crate::hierarchy::flatten;
    use crate::options::MatrixOptions;
    use crate::view::Collaborators;

    fn levels(names: &[&str]) -> Vec<LevelDescriptor> {
        names
            .iter()
            .map(|name| LevelDescriptor::single(ValueSource::new(*name, *name)))
            .collect()
    }

    fn create_view(row_levels: &[&str], column_levels: &[&str]) -> MatrixView {
        let options = MatrixOptions::default();
        let rows = Hierarchy::new(HierarchyNode::root(Vec::new()), levels(row_levels));
        let columns = Hierarchy::new(HierarchyNode::root(Vec::new()), levels(column_levels));
        MatrixView::new(
            Arc::new(flatten(Axis::Rows, &rows, &options, &PlainFormatter).unwrap()),
            Arc::new(flatten(Axis::Columns, &columns, &options, &PlainFormatter).unwrap()),
            Vec::new(),
            Collaborators::default(),
        )
    }

    #[test]
    fn test_bottom_band_owned_by_rows() {
        let view = create_view(&["Region", "City"], &["Year", "Measures"]);

        let cell = view.corner(1, 1);
        assert_eq!(cell.owner, Some(Axis::Rows));
        assert_eq!(cell.metadata.unwrap().query_name, "City");
        assert!(cell.is_column_leaf);
        assert!(cell.is_row_leaf);

        let cell = view.corner(0, 1);
        assert_eq!(cell.metadata.unwrap().query_name, "Region");
        assert!(!cell.is_row_leaf);
    }

    #[test]
    fn test_rightmost_column_owned_by_columns() {
        let view = create_view(&["Region", "City"], &["Year", "Measures"]);

        let cell = view.corner(1, 0);
        assert_eq!(cell.owner, Some(Axis::Columns));
        assert_eq!(cell.metadata.unwrap().query_name, "Year");
        assert!(!cell.is_column_leaf);
        assert!(cell.is_row_leaf);
    }

    #[test]
    fn test_interior_corner_is_empty() {
        let view = create_view(&["Region", "City"], &["Year", "Quarter", "Measures"]);
        assert_eq!(view.corner(0, 0), CornerCell::default());
        assert_eq!(view.corner(0, 1), CornerCell::default());
    }

    #[test]
    fn test_no_column_levels_gives_rows_ownership() {
        let view = create_view(&["Region"], &[]);

        let cell = view.corner(0, 0);
        assert_eq!(cell.owner, Some(Axis::Rows));
        assert!(cell.is_column_leaf);
        assert!(cell.is_row_leaf);
    }

    #[test]
    fn test_out_of_range_levels_are_safe() {
        let view = create_view(&["Region"], &["Year", "Measures"]);

        let cell = view.corner(5, 1);
        assert_eq!(cell.owner, Some(Axis::Rows));
        assert_eq!(cell.metadata, None);
        assert!(!cell.is_row_leaf);

        assert_eq!(view.corner(5, 7), CornerCell::default());
    }

    #[test]
    fn test_rules_are_mutually_exclusive() {
        let view = create_view(&["A", "B", "C"], &["X", "Y", "Z"]);
        for row_level in 0..4 {
            for column_level in 0..4 {
                let cell = view.corner(row_level, column_level);
                let from_column_rule = cell.owner == Some(Axis::Columns);
                assert!(!(cell.is_column_leaf && from_column_rule));
            }
        }
    }
}
