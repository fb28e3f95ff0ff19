//! FILENAME: core/matrix-engine/src/view.rs
//! Matrix View - The published pairing of row and column snapshots.
//!
//! A view is what rendering reads from: both axis snapshots, the value
//! sources of the delivery they came from, and the host collaborators used
//! to format body cells. Views are immutable and handed out as `Arc`s, so a
//! reader holding one keeps a consistent picture across later updates.

use std::fmt;
use std::sync::Arc;

use crate::definition::ValueSource;
use crate::format::{MappedStatusGraphics, PlainFormatter, StatusGraphicResolver, ValueFormatter};
use crate::hierarchy::HierarchySnapshot;
use crate::options::MatrixOptions;

/// Host-supplied configuration and collaborators shared by every view.
#[derive(Clone)]
pub struct Collaborators {
    pub options: Arc<MatrixOptions>,
    pub formatter: Arc<dyn ValueFormatter>,
    pub status_graphics: Arc<dyn StatusGraphicResolver>,
}

impl Default for Collaborators {
    fn default() -> Self {
        Collaborators {
            options: Arc::new(MatrixOptions::default()),
            formatter: Arc::new(PlainFormatter),
            status_graphics: Arc::new(MappedStatusGraphics),
        }
    }
}

impl fmt::Debug for Collaborators {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Collaborators")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

/// Row snapshot + column snapshot + value sources, as of one update.
pub struct MatrixView {
    rows: Arc<HierarchySnapshot>,
    columns: Arc<HierarchySnapshot>,
    value_sources: Vec<ValueSource>,
    collaborators: Collaborators,
}

impl MatrixView {
    pub fn new(
        rows: Arc<HierarchySnapshot>,
        columns: Arc<HierarchySnapshot>,
        value_sources: Vec<ValueSource>,
        collaborators: Collaborators,
    ) -> Self {
        MatrixView {
            rows,
            columns,
            value_sources,
            collaborators,
        }
    }

    pub fn rows(&self) -> &HierarchySnapshot {
        &self.rows
    }

    pub fn columns(&self) -> &HierarchySnapshot {
        &self.columns
    }

    /// Shared handle to the row snapshot.
    pub fn rows_handle(&self) -> &Arc<HierarchySnapshot> {
        &self.rows
    }

    /// Shared handle to the column snapshot.
    pub fn columns_handle(&self) -> &Arc<HierarchySnapshot> {
        &self.columns
    }

    pub fn value_sources(&self) -> &[ValueSource] {
        &self.value_sources
    }

    pub fn value_source(&self, index: usize) -> Option<&ValueSource> {
        self.value_sources.get(index)
    }

    pub fn options(&self) -> &MatrixOptions {
        &self.collaborators.options
    }

    pub(crate) fn formatter(&self) -> &dyn ValueFormatter {
        self.collaborators.formatter.as_ref()
    }

    pub(crate) fn status_graphics(&self) -> &dyn StatusGraphicResolver {
        self.collaborators.status_graphics.as_ref()
    }
}

impl fmt::Debug for MatrixView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MatrixView")
            .field("row_leaves", &self.rows.leaf_count())
            .field("column_leaves", &self.columns.leaf_count())
            .field("value_sources", &self.value_sources.len())
            .finish()
    }
}
