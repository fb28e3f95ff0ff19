//! FILENAME: core/matrix-engine/src/lib.rs
//! Matrix hierarchy indexing engine.
//!
//! Takes a row hierarchy, a column hierarchy and sparse per-row values, and
//! answers what a matrix (pivot grid) renderer needs to paint:
//! flattened leaf sequences, body cells, corner cells and sort targets.
//!
//! Layers:
//! - `definition`: Serializable payload (what the host delivers)
//! - `hierarchy`: Flattening into immutable axis snapshots
//! - `view`: The published row/column pairing rendering reads from
//! - `intersection`, `corner`, `sort`: Per-cell and per-header resolvers
//! - `engine`: Update controller (WHEN we rebuild, and how much)

pub mod corner;
pub mod definition;
pub mod engine;
pub mod error;
pub mod format;
pub mod hierarchy;
pub mod intersection;
pub mod options;
pub mod sort;
pub mod view;

pub use corner::CornerCell;
pub use definition::*;
pub use engine::{MatrixEngine, UpdateOutcome, UpdateScope};
pub use error::MatrixError;
pub use format::{
    MappedStatusGraphics, PlainFormatter, StatusGraphicResolver, StatusGraphicToken, ValueFormatter,
};
pub use hierarchy::{
    flatten, headers_equal, Axis, FlatNode, HierarchySnapshot, IntersectionValue, NodeId,
    NodeKind, NodeValue, RowValues,
};
pub use intersection::{BodyCell, BodyValue, CellDisplay};
pub use options::MatrixOptions;
pub use sort::SortRequest;
pub use view::{Collaborators, MatrixView};
