use thiserror::Error;

use crate::llm::provider::ProviderError;

#[derive(Error, Debug)]
pub enum LayoutError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("Layout provider unavailable for all {iterations} iterations: {last_error}")]
    ProviderUnavailable {
        iterations: u32,
        last_error: ProviderError,
    },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),

    #[error("Config parse error: {0}")]
    TomlError(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, LayoutError>;
