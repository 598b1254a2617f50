//! OpenAI-compatible chat-completions client.
//!
//! Works with any endpoint speaking the `/chat/completions` dialect
//! (OpenAI, OpenRouter, local gateways). Used as an alternative primary
//! provider behind the same key pool.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use super::traits::GenerateProvider;
use super::{DEFAULT_HTTP_TIMEOUT, build_http, check_status};
use crate::Result;

/// Default base URL (OpenAI)
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Default model
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

#[derive(Clone)]
pub struct OpenAiCompatClient {
    http: Client,
    base_url: String,
    model: String,
}

impl OpenAiCompatClient {
    pub fn new(model: impl Into<String>) -> Result<Self> {
        Self::with_base_url(model, DEFAULT_BASE_URL)
    }

    /// Create a client with a custom base URL (for testing with wiremock).
    pub fn with_base_url(model: impl Into<String>, base_url: impl Into<String>) -> Result<Self> {
        Ok(Self::with_http_client(
            model,
            base_url,
            build_http(DEFAULT_HTTP_TIMEOUT)?,
        ))
    }

    pub fn with_http_client(
        model: impl Into<String>,
        base_url: impl Into<String>,
        http: Client,
    ) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl GenerateProvider for OpenAiCompatClient {
    fn name(&self) -> &str {
        "openai"
    }

    #[instrument(name = "openai.generate", skip_all, fields(model = %self.model))]
    async fn generate(&self, prompt: &str, api_key: &str) -> Result<String> {
        let url = format!("{}/chat/completions", self.base_url);

        let response = self
            .http
            .post(&url)
            .bearer_auth(api_key)
            .json(&ChatRequest {
                model: &self.model,
                messages: vec![ChatMessage {
                    role: "user",
                    content: prompt,
                }],
            })
            .send()
            .await?;

        let response = check_status(response).await?;
        let body: ChatResponse = response.json().await?;

        Ok(body
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default())
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}
