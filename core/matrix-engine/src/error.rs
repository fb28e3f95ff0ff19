//! FILENAME: core/matrix-engine/src/error.rs

use thiserror::Error;

use crate::hierarchy::Axis;

#[derive(Error, Debug)]
pub enum MatrixError {
    #[error("{axis:?} hierarchy: sibling declares level {found}, expected level {expected} (depth {depth})")]
    MixedSiblingLevels {
        axis: Axis,
        depth: usize,
        expected: usize,
        found: usize,
    },

    #[error("Invalid payload JSON: {0}")]
    Json(#[from] serde_json::Error),
}
