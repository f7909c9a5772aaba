pub mod config;
pub mod error;

pub use config::{ConstraintConfig, GenerationConfig};
pub use error::{LayoutError, Result};
