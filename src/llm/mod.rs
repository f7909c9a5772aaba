//! Layout proposals from a generative model

pub mod client;
pub mod parser;
pub mod prompt;
pub mod provider;

pub use client::{ApiFormat, LlmClient};
pub use provider::{LayoutProvider, LlmLayoutProvider, ProposalRequest, ProviderError};
