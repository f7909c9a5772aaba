//! HTTP completion client behind the LLM layout provider
//!
//! Speaks the Anthropic messages API or any OpenAI-compatible chat
//! endpoint, picked from the URL. Every failure comes back as a classified
//! `ProviderError` so the resilience wrapper can decide whether to retry.

use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::llm::provider::ProviderError;

const DEFAULT_API_URL: &str = "https://api.anthropic.com/v1/messages";
const DEFAULT_MODEL: &str = "claude-3-haiku-20240307";

/// Layout JSON for a large floor fits comfortably in this
const MAX_TOKENS: u32 = 8192;

/// Low temperature keeps coordinates stable between correction rounds
const TEMPERATURE: f32 = 0.2;

#[derive(Debug, Clone, PartialEq)]
pub enum ApiFormat {
    Anthropic,
    OpenAI,
}

impl ApiFormat {
    fn detect(url: &str) -> Self {
        if url.contains("anthropic.com") {
            ApiFormat::Anthropic
        } else {
            ApiFormat::OpenAI
        }
    }
}

pub struct LlmClient {
    client: Client,
    api_key: String,
    api_url: String,
    model: String,
    api_format: ApiFormat,
}

impl LlmClient {
    pub fn new(api_key: String, api_url: String, model: String) -> Self {
        Self {
            client: Client::new(),
            api_format: ApiFormat::detect(&api_url),
            api_key,
            api_url,
            model,
        }
    }

    /// `LLM_API_KEY` is required; `LLM_API_URL` and `LLM_MODEL` have defaults
    pub fn from_env() -> Result<Self, ProviderError> {
        let api_key = std::env::var("LLM_API_KEY")
            .map_err(|_| ProviderError::Configuration("LLM_API_KEY not set".into()))?;
        let api_url = std::env::var("LLM_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.into());
        let model = std::env::var("LLM_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.into());
        Ok(Self::new(api_key, api_url, model))
    }

    pub fn api_format(&self) -> &ApiFormat {
        &self.api_format
    }

    /// One completion: system instructions plus a single user message
    pub async fn complete(&self, system: &str, user: &str) -> Result<String, ProviderError> {
        let text = match self.api_format {
            ApiFormat::Anthropic => {
                let request = self
                    .client
                    .post(&self.api_url)
                    .header("x-api-key", &self.api_key)
                    .header("anthropic-version", "2023-06-01")
                    .json(&AnthropicRequest {
                        model: &self.model,
                        max_tokens: MAX_TOKENS,
                        temperature: TEMPERATURE,
                        system,
                        messages: vec![Message { role: "user", content: user }],
                    });
                let reply: AnthropicResponse = send(request).await?;
                reply.content.into_iter().next().map(|block| block.text)
            }
            ApiFormat::OpenAI => {
                let request = self.client.post(&self.api_url).bearer_auth(&self.api_key).json(
                    &OpenAIRequest {
                        model: &self.model,
                        max_tokens: MAX_TOKENS,
                        temperature: TEMPERATURE,
                        messages: vec![
                            Message { role: "system", content: system },
                            Message { role: "user", content: user },
                        ],
                    },
                );
                let reply: OpenAIResponse = send(request).await?;
                reply.choices.into_iter().next().map(|choice| choice.message.content)
            }
        };
        text.ok_or_else(|| ProviderError::MalformedResponse("Empty response".into()))
    }
}

/// Send, classify the status, decode the body
async fn send<T: DeserializeOwned>(request: RequestBuilder) -> Result<T, ProviderError> {
    let response = request.send().await.map_err(transport_error)?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(ProviderError::from_status(status.as_u16(), body));
    }

    response
        .json()
        .await
        .map_err(|e| ProviderError::MalformedResponse(e.to_string()))
}

/// Connect, reset and client-side timeouts are all worth another try
fn transport_error(e: reqwest::Error) -> ProviderError {
    if e.is_builder() {
        ProviderError::Configuration(e.to_string())
    } else {
        ProviderError::Transport(e.to_string())
    }
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct AnthropicRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    system: &'a str,
    messages: Vec<Message<'a>>,
}

#[derive(Deserialize)]
struct AnthropicResponse {
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    text: String,
}

#[derive(Serialize)]
struct OpenAIRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    messages: Vec<Message<'a>>,
}

#[derive(Deserialize)]
struct OpenAIResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: String,
}
