//! The layout proposal capability
//!
//! A provider is an untrusted oracle: given a prompt and the perimeter it
//! either returns a decoded layout or a classified failure. Nothing it
//! returns is trusted until it has been snapped and validated.

use async_trait::async_trait;
use thiserror::Error;

use crate::layout::perimeter::PerimeterGraph;
use crate::layout::schema::GeneratedLayout;
use crate::llm::client::LlmClient;
use crate::llm::parser::parse_layout;
use crate::llm::prompt::{build_generation_prompt, LAYOUT_SYSTEM_PROMPT};

/// Classified failure of a single provider call
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProviderError {
    // === TRANSIENT ===
    #[error("Provider call timed out after {seconds}s")]
    Timeout { seconds: f64 },

    #[error("Rate limited: {0}")]
    RateLimited(String),

    #[error("Server error {status}: {message}")]
    Server { status: u16, message: String },

    #[error("Transport error: {0}")]
    Transport(String),

    // === PERMANENT ===
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Provider misconfigured: {0}")]
    Configuration(String),
}

impl ProviderError {
    /// Whether retrying the same call may succeed
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            ProviderError::Timeout { .. }
                | ProviderError::RateLimited(_)
                | ProviderError::Server { .. }
                | ProviderError::Transport(_)
        )
    }

    /// Classify a non-success HTTP status
    pub fn from_status(status: u16, message: String) -> Self {
        match status {
            408 => ProviderError::Timeout { seconds: 0.0 },
            429 => ProviderError::RateLimited(message),
            401 | 403 => ProviderError::Unauthorized(message),
            500..=599 => ProviderError::Server { status, message },
            _ => ProviderError::BadRequest(format!("HTTP {}: {}", status, message)),
        }
    }
}

/// Everything a provider needs for one proposal
#[derive(Debug, Clone)]
pub struct ProposalRequest {
    /// Full prompt text, including feedback and variation hints
    pub prompt: String,
    pub perimeter: PerimeterGraph,
}

#[async_trait]
pub trait LayoutProvider: Send + Sync {
    /// Propose one layout; no retries or timeouts here
    async fn propose(&self, request: &ProposalRequest) -> Result<GeneratedLayout, ProviderError>;
}

/// Provider backed by an LLM completion endpoint
pub struct LlmLayoutProvider {
    client: LlmClient,
}

impl LlmLayoutProvider {
    pub fn new(client: LlmClient) -> Self {
        Self { client }
    }

    pub fn from_env() -> Result<Self, ProviderError> {
        Ok(Self::new(LlmClient::from_env()?))
    }
}

#[async_trait]
impl LayoutProvider for LlmLayoutProvider {
    async fn propose(&self, request: &ProposalRequest) -> Result<GeneratedLayout, ProviderError> {
        let user_prompt = build_generation_prompt(&request.perimeter, &request.prompt)
            .map_err(|e| ProviderError::BadRequest(e.to_string()))?;
        let response = self.client.complete(LAYOUT_SYSTEM_PROMPT, &user_prompt).await?;
        parse_layout(&response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification() {
        assert!(ProviderError::Timeout { seconds: 1.0 }.is_transient());
        assert!(ProviderError::RateLimited("slow down".into()).is_transient());
        assert!(ProviderError::Transport("reset".into()).is_transient());
        assert!(!ProviderError::MalformedResponse("{".into()).is_transient());
        assert!(!ProviderError::Unauthorized("key".into()).is_transient());
        assert!(!ProviderError::Configuration("LLM_API_KEY not set".into()).is_transient());
    }

    #[test]
    fn test_status_mapping() {
        assert!(ProviderError::from_status(408, String::new()).is_transient());
        assert!(ProviderError::from_status(429, String::new()).is_transient());
        assert!(ProviderError::from_status(503, String::new()).is_transient());
        assert_eq!(
            ProviderError::from_status(401, "nope".into()),
            ProviderError::Unauthorized("nope".into())
        );
        assert!(matches!(
            ProviderError::from_status(422, "bad schema".into()),
            ProviderError::BadRequest(_)
        ));
    }
}
