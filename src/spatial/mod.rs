//! Spatial core: grid snapping, polygon geometry, indexing and validation

pub mod geometry;
pub mod grid;
pub mod index;
pub mod validation;

pub use grid::{snap_layout, snap_to_grid};
pub use index::BoxIndex;
pub use validation::{validate_layout, validate_layout_with, ConstraintResult, ConstraintViolation};
