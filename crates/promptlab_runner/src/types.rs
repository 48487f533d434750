//! Completion request, result and batch types.

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use promptlab_templates::RenderOutcome;
use serde::{Deserialize, Deserializer, Serialize};

/// One rendered prompt to send for completion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionRequest {
    pub prompt: String,
    pub set_name: String,
}

impl CompletionRequest {
    pub fn new(prompt: impl Into<String>, set_name: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            set_name: set_name.into(),
        }
    }

    /// Requests for every runnable preview, in preview order.
    pub fn from_previews(outcomes: &[RenderOutcome]) -> Vec<Self> {
        outcomes
            .iter()
            .filter(|o| o.is_runnable())
            .map(|o| Self::new(o.preview(), o.set_name()))
            .collect()
    }
}

/// Token accounting as reported by the completion service.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    pub total_tokens: u64,
}

/// Successful response body of a completion service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionResponse {
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub usage: Option<TokenUsage>,
    /// Missing or unreadable timestamps fall back to the receive time.
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub timestamp: Option<DateTime<Utc>>,
}

fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(raw
        .as_ref()
        .and_then(serde_json::Value::as_str)
        .and_then(parse_timestamp))
}

/// Parse an ISO-8601 timestamp. A timestamp without offset is taken as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .map(|naive| Utc.from_utc_datetime(&naive))
}

impl CompletionResponse {
    pub fn new(content: impl Into<String>, usage: Option<TokenUsage>) -> Self {
        Self {
            content: Some(content.into()),
            usage,
            timestamp: Some(Utc::now()),
        }
    }
}

/// Outcome of one completion request.
///
/// Produced exactly once per request: failures carry `error = true` and an
/// `Error: ` prefixed message in `content`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionResult {
    pub id: String,
    pub prompt_id: String,
    pub prompt: String,
    pub content: String,
    pub usage: Option<TokenUsage>,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub error: bool,
    pub set_name: String,
}

impl CompletionResult {
    pub fn success(
        prompt_id: impl Into<String>,
        request: CompletionRequest,
        response: CompletionResponse,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            prompt_id: prompt_id.into(),
            prompt: request.prompt,
            content: response.content.unwrap_or_default(),
            usage: response.usage,
            timestamp: response.timestamp.unwrap_or_else(Utc::now),
            error: false,
            set_name: request.set_name,
        }
    }

    pub fn failure(
        prompt_id: impl Into<String>,
        request: CompletionRequest,
        message: impl std::fmt::Display,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            prompt_id: prompt_id.into(),
            prompt: request.prompt,
            content: format!("Error: {}", message),
            usage: None,
            timestamp: Utc::now(),
            error: true,
            set_name: request.set_name,
        }
    }
}

/// All results of one run, in request order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchResult {
    pub id: String,
    pub prompt_id: String,
    pub outputs: Vec<CompletionResult>,
}

impl BatchResult {
    pub fn new(prompt_id: impl Into<String>, outputs: Vec<CompletionResult>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            prompt_id: prompt_id.into(),
            outputs,
        }
    }

    pub fn failed_count(&self) -> usize {
        self.outputs.iter().filter(|o| o.error).count()
    }

    pub fn succeeded_count(&self) -> usize {
        self.outputs.len() - self.failed_count()
    }

    /// Sum of reported total tokens across successful outputs.
    pub fn total_tokens(&self) -> u64 {
        self.outputs
            .iter()
            .filter_map(|o| o.usage.map(|u| u.total_tokens))
            .sum()
    }
}
