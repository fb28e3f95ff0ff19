//! FILENAME: core/matrix-engine/src/engine.rs
//! Matrix Engine - Decides how much to rebuild on each data delivery.
//!
//! The engine is `Empty` until the first payload and `Populated` after.
//! Every update publishes a brand-new `MatrixView`:
//! 1. First payload, column-affecting change, or a new row root: flatten
//!    both axes and ask rendering to drop cached measurements.
//! 2. Incremental append: flatten rows only, reuse the column snapshot as
//!    is, and let rendering keep its scroll position.
//!
//! Updates are synchronous; a newer payload simply replaces the view.

use std::sync::Arc;

use log::debug;
use serde::Serialize;

use crate::definition::MatrixPayload;
use crate::error::MatrixError;
use crate::format::{StatusGraphicResolver, ValueFormatter};
use crate::hierarchy::{flatten, Axis};
use crate::options::MatrixOptions;
use crate::view::{Collaborators, MatrixView};

/// How much of the view an update rebuilt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum UpdateScope {
    /// Both axes were flattened from scratch.
    Full,
    /// Only the row axis was flattened; the column snapshot was reused.
    RowsOnly,
}

/// What rendering should do after an update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct UpdateOutcome {
    pub scope: UpdateScope,
    /// Discard cached measurements (column widths, row heights).
    pub reset_measurements: bool,
    /// Keep the current scroll position.
    pub preserve_scroll: bool,
}

impl UpdateOutcome {
    fn for_scope(scope: UpdateScope) -> Self {
        match scope {
            UpdateScope::Full => UpdateOutcome {
                scope,
                reset_measurements: true,
                preserve_scroll: false,
            },
            UpdateScope::RowsOnly => UpdateOutcome {
                scope,
                reset_measurements: false,
                preserve_scroll: true,
            },
        }
    }
}

/// Owns the current view and the host collaborators.
#[derive(Debug, Default)]
pub struct MatrixEngine {
    collaborators: Collaborators,
    view: Option<Arc<MatrixView>>,
}

impl MatrixEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: MatrixOptions) -> Self {
        MatrixEngine {
            collaborators: Collaborators {
                options: Arc::new(options),
                ..Collaborators::default()
            },
            view: None,
        }
    }

    pub fn with_formatter(mut self, formatter: impl ValueFormatter + 'static) -> Self {
        self.collaborators.formatter = Arc::new(formatter);
        self
    }

    pub fn with_status_graphics(mut self, resolver: impl StatusGraphicResolver + 'static) -> Self {
        self.collaborators.status_graphics = Arc::new(resolver);
        self
    }

    pub fn options(&self) -> &MatrixOptions {
        &self.collaborators.options
    }

    /// Whether a payload has been installed.
    pub fn is_populated(&self) -> bool {
        self.view.is_some()
    }

    /// The view installed by the most recent successful update.
    pub fn view(&self) -> Option<Arc<MatrixView>> {
        self.view.clone()
    }

    /// Installs a new payload. `column_axis_affected` is false for an
    /// incremental append of rows to an unchanged query shape.
    ///
    /// On error the previously installed view stays current.
    pub fn update(
        &mut self,
        payload: MatrixPayload,
        column_axis_affected: bool,
    ) -> Result<UpdateOutcome, MatrixError> {
        let scope = self.decide_scope(&payload, column_axis_affected);
        let collaborators = &self.collaborators;
        let options = collaborators.options.as_ref();
        let formatter = collaborators.formatter.as_ref();

        let rows = Arc::new(flatten(Axis::Rows, &payload.rows, options, formatter)?);
        let columns = match (&self.view, scope) {
            (Some(previous), UpdateScope::RowsOnly) => Arc::clone(previous.columns_handle()),
            _ => Arc::new(flatten(Axis::Columns, &payload.columns, options, formatter)?),
        };

        debug!(
            "matrix update {:?}: {} row leaves, {} column leaves",
            scope,
            rows.leaf_count(),
            columns.leaf_count()
        );

        let view = MatrixView::new(rows, columns, payload.value_sources, collaborators.clone());
        self.view = Some(Arc::new(view));
        Ok(UpdateOutcome::for_scope(scope))
    }

    fn decide_scope(&self, payload: &MatrixPayload, column_axis_affected: bool) -> UpdateScope {
        let Some(previous) = &self.view else {
            debug!("first payload, full rebuild");
            return UpdateScope::Full;
        };

        let new_root = payload.rows.root.identity.as_deref();
        if previous.rows().root_identity() != new_root {
            debug!(
                "row root changed ({:?} -> {:?}), full rebuild",
                previous.rows().root_identity(),
                new_root
            );
            return UpdateScope::Full;
        }

        if column_axis_affected {
            return UpdateScope::Full;
        }

        if new_root.is_none() {
            debug!("row roots carry no identity, cannot detect a reordered query; treating as append");
        }
        UpdateScope::RowsOnly
    }
}
