//! Floorplan layout generation with spatial constraint validation
//!
//! A generative provider proposes interior layouts for a fixed perimeter.
//! Every proposal is snapped to the construction grid and checked against
//! the spatial rules; failures are fed back until a layout passes or the
//! iteration budget runs out.

pub mod core;
pub mod generation;
pub mod layout;
pub mod llm;
pub mod spatial;

pub use crate::core::{ConstraintConfig, GenerationConfig, LayoutError, Result};
pub use generation::{generate_validated_layout, GenerationResult};
pub use layout::{GeneratedLayout, PerimeterGraph};
pub use llm::{LayoutProvider, ProposalRequest, ProviderError};
pub use spatial::{snap_layout, validate_layout, validate_layout_with, ConstraintResult};
