//! HTTP completion services.
//!
//! - [`EndpointService`] talks to a completion endpoint that accepts
//!   `{ "prompt": ... }` and answers `{ content, usage, timestamp }` or
//!   `{ error }`.
//! - [`OpenAiService`] calls the OpenAI chat completions API directly and
//!   shapes the answer the same way.

use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{RunnerError, RunnerResult};
use crate::service::CompletionService;
use crate::types::{CompletionResponse, TokenUsage};

/// Default model for direct OpenAI completions.
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";

/// Default completion length cap.
pub const DEFAULT_MAX_TOKENS: u32 = 2000;

/// Default OpenAI API base URL.
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// Completion service backed by a `{ prompt }` endpoint.
pub struct EndpointService {
    url: String,
    client: reqwest::Client,
}

impl EndpointService {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            client: reqwest::Client::new(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[derive(Debug, Serialize)]
struct EndpointRequest<'a> {
    prompt: &'a str,
}

#[async_trait]
impl CompletionService for EndpointService {
    fn name(&self) -> &str {
        "endpoint"
    }

    async fn complete(&self, prompt: &str) -> RunnerResult<CompletionResponse> {
        let response = self
            .client
            .post(&self.url)
            .header("Content-Type", "application/json")
            .json(&EndpointRequest { prompt })
            .send()
            .await?;

        let status = response.status().as_u16();
        let body = response.text().await?;
        debug!("Endpoint {} answered {}", self.url, status);

        interpret_endpoint_response(status, &body)
    }
}

/// Interpret an endpoint answer.
///
/// A 2xx status is not enough: a body carrying a truthy `error` field is a
/// failure too.
pub fn interpret_endpoint_response(status: u16, body: &str) -> RunnerResult<CompletionResponse> {
    if !(200..300).contains(&status) {
        return Err(RunnerError::Status {
            status,
            body: body.to_string(),
        });
    }

    let value: serde_json::Value = serde_json::from_str(body)?;
    if let Some(error) = value.get("error").filter(|e| is_truthy(e)) {
        let message = match error {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        return Err(RunnerError::Application(message));
    }

    Ok(serde_json::from_value(value)?)
}

fn is_truthy(value: &serde_json::Value) -> bool {
    use serde_json::Value;

    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::String(s) => !s.is_empty(),
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Completion service calling the OpenAI chat completions API.
pub struct OpenAiService {
    api_key: String,
    model: String,
    max_tokens: u32,
    base_url: String,
    client: reqwest::Client,
}

impl OpenAiService {
    /// Create a service; `model` defaults to [`DEFAULT_OPENAI_MODEL`].
    pub fn new(api_key: impl Into<String>, model: Option<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: model.unwrap_or_else(|| DEFAULT_OPENAI_MODEL.to_string()),
            max_tokens: DEFAULT_MAX_TOKENS,
            base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
            client: reqwest::Client::new(),
        }
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Point at an OpenAI-compatible server.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn max_tokens(&self) -> u32 {
        self.max_tokens
    }

    fn build_request<'a>(&'a self, prompt: &'a str) -> OpenAIRequest<'a> {
        OpenAIRequest {
            model: &self.model,
            messages: vec![OpenAIMessage {
                role: "user",
                content: prompt,
            }],
            max_tokens: self.max_tokens,
        }
    }
}

#[async_trait]
impl CompletionService for OpenAiService {
    fn name(&self) -> &str {
        "openai"
    }

    async fn complete(&self, prompt: &str) -> RunnerResult<CompletionResponse> {
        if prompt.is_empty() {
            return Err(RunnerError::Application("Prompt is required".to_string()));
        }

        let url = format!("{}/chat/completions", self.base_url);
        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&self.build_request(prompt))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(RunnerError::Application(format!(
                "OpenAI API error {}: {}",
                status.as_u16(),
                openai_error_message(&body)
            )));
        }

        parse_openai_response(&body)
    }
}

/// Shape an OpenAI chat completion body into a [`CompletionResponse`].
pub fn parse_openai_response(body: &str) -> RunnerResult<CompletionResponse> {
    let result: OpenAIResponse = serde_json::from_str(body)?;
    let choice = result
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| RunnerError::InvalidResponse("No response from OpenAI".to_string()))?;

    Ok(CompletionResponse {
        content: choice.message.content,
        usage: result.usage,
        timestamp: Some(Utc::now()),
    })
}

fn openai_error_message(body: &str) -> String {
    serde_json::from_str::<OpenAIErrorBody>(body)
        .map(|e| e.error.message)
        .unwrap_or_else(|_| body.to_string())
}

// OpenAI API types
#[derive(Debug, Serialize)]
struct OpenAIRequest<'a> {
    model: &'a str,
    messages: Vec<OpenAIMessage<'a>>,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct OpenAIMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct OpenAIResponse {
    choices: Vec<OpenAIChoice>,
    usage: Option<TokenUsage>,
}

#[derive(Debug, Deserialize)]
struct OpenAIChoice {
    message: OpenAIResponseMessage,
}

#[derive(Debug, Deserialize)]
struct OpenAIResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAIErrorBody {
    error: OpenAIErrorDetail,
}

#[derive(Debug, Deserialize)]
struct OpenAIErrorDetail {
    message: String,
}
