//! FILENAME: core/matrix-engine/src/sort.rs
//! Sort Target Resolver - Which value source a header click sorts by.
//!
//! Sorting only makes sense with at least one row grouping level. The
//! innermost column level is always the measures band, so column grouping
//! is `column level count - 1`:
//! - exactly one column level: every column leaf sorts by its own source
//! - otherwise (including no levels at all): only the column grand total
//!   is sortable
//!
//! Everything here is a pure function of the current view.

use serde::{Deserialize, Serialize};

use crate::corner::CornerCell;
use crate::definition::{SortDirection, ValueSource};
use crate::hierarchy::NodeId;
use crate::view::MatrixView;

/// A sort request for the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortRequest {
    pub query_name: String,
    pub direction: SortDirection,
}

impl SortRequest {
    /// Requests the next direction for `source`: an active sort is flipped,
    /// otherwise measures start descending and grouping fields ascending.
    pub fn toggle(source: &ValueSource) -> Self {
        let direction = match source.sort {
            Some(current) => current.flipped(),
            None if source.is_measure => SortDirection::Descending,
            None => SortDirection::Ascending,
        };
        SortRequest {
            query_name: source.query_name.clone(),
            direction,
        }
    }
}

impl MatrixView {
    /// Number of column grouping levels, excluding the measures band.
    /// `None` when the column hierarchy declares no levels at all.
    pub fn column_group_count(&self) -> Option<usize> {
        self.columns().level_count().checked_sub(1)
    }

    fn has_row_grouping(&self) -> bool {
        self.rows().level_count() > 0
    }

    /// The value source a click on column header `node` sorts by, if any.
    ///
    /// # Panics
    /// If `node` does not belong to this view's column snapshot.
    pub fn sort_target_for_column_header(&self, node: NodeId) -> Option<&ValueSource> {
        if !self.has_row_grouping() {
            return None;
        }

        let columns = self.columns();
        let header = columns.node(node);
        if !header.is_leaf() {
            return None;
        }

        let target = self.value_source(header.level_source_index);
        if self.column_group_count() == Some(0) {
            return target;
        }

        if !header.is_subtotal {
            return None;
        }

        // With several measures the grand total's measure leaves hang
        // below a level-0 subtotal; with one measure the leaf is level 0.
        let is_grand_total = if self.value_sources().len() > 1 {
            header
                .parent
                .map_or(false, |parent| columns.node(parent).level == 0)
        } else {
            header.level == 0
        };

        if is_grand_total {
            target
        } else {
            None
        }
    }

    /// The value source a click on `corner` sorts by, if any.
    pub fn sort_target_for_corner<'a>(&self, corner: &'a CornerCell) -> Option<&'a ValueSource> {
        if !self.has_row_grouping() || !corner.is_column_leaf {
            return None;
        }
        corner.metadata.as_ref()
    }

    pub fn column_sort_request(&self, node: NodeId) -> Option<SortRequest> {
        self.sort_target_for_column_header(node).map(SortRequest::toggle)
    }

    pub fn corner_sort_request(&self, corner: &CornerCell) -> Option<SortRequest> {
        self.sort_target_for_corner(corner).map(SortRequest::toggle)
    }
}
