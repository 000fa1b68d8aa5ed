//! HTTP client for the clustering model endpoint.
//!
//! Speaks the OpenAI-compatible chat-completions protocol. Every call has a
//! bounded timeout, and upstream failures map to distinct error kinds so
//! the facilitator gets an actionable message: rate limits mean "wait",
//! quota exhaustion means "contact your admin", everything else means
//! "try again".

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::reconcile::{assign_notes, CategoryBucket, NoteSnapshot};
use crate::{prompt, MAX_CATEGORIES, MAX_CATEGORY_LENGTH, MAX_NOTES, MIN_CATEGORIES};

/// Errors from the clustering adapter.
#[derive(Debug, thiserror::Error)]
pub enum ClusterError {
    /// Invalid input before any network call (category/note bounds).
    #[error("Invalid clustering input: {0}")]
    InvalidInput(String),

    /// The upstream call exceeded the configured timeout.
    #[error("Clustering request timed out")]
    Timeout,

    /// Upstream returned 429 — retry after waiting.
    #[error("Clustering service is rate limited, try again shortly")]
    RateLimited,

    /// Upstream returned 402/403 — the API quota or plan is exhausted.
    #[error("Clustering quota exhausted, contact your administrator")]
    QuotaExhausted,

    /// Any other transport or non-2xx failure.
    #[error("Clustering service error: {0}")]
    Http(String),

    /// The model replied, but not in the contracted JSON shape.
    #[error("Malformed model output: {0}")]
    Malformed(String),
}

/// Connection settings for the model endpoint.
#[derive(Debug, Clone)]
pub struct ClusterSettings {
    /// Base URL, e.g. `https://api.openai.com/v1`.
    pub base_url: String,
    pub api_key: String,
    pub model: String,
    pub timeout_secs: u64,
}

/// A clustering request: a snapshot of notes plus the facilitator's
/// canonical categories and optional free-text context.
#[derive(Debug, Clone)]
pub struct ClusterRequest {
    pub notes: Vec<NoteSnapshot>,
    pub categories: Vec<String>,
    pub context: Option<String>,
}

// --- Wire types for the chat-completions protocol ---

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatReplyMessage,
}

#[derive(Deserialize)]
struct ChatReplyMessage {
    content: String,
}

/// Client for the clustering model endpoint.
pub struct ClusterClient {
    http: reqwest::Client,
    settings: ClusterSettings,
}

impl ClusterClient {
    /// Build a client; the timeout applies to the whole request.
    ///
    /// Panics if the TLS backend cannot initialize, which only happens at
    /// startup and should fail fast.
    pub fn new(settings: ClusterSettings) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .expect("Failed to build HTTP client");
        Self { http, settings }
    }

    /// Cluster the given notes under the given categories.
    ///
    /// On success every input note appears in exactly one returned bucket
    /// (see [`assign_notes`]). On any failure nothing is applied — the
    /// caller persists results only after this returns `Ok`.
    pub async fn cluster(&self, request: &ClusterRequest) -> Result<Vec<CategoryBucket>, ClusterError> {
        validate(request)?;

        let body = ChatRequest {
            model: &self.settings.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: prompt::system_prompt(),
                },
                ChatMessage {
                    role: "user",
                    content: prompt::user_prompt(
                        &request.notes,
                        &request.categories,
                        request.context.as_deref(),
                    ),
                },
            ],
            temperature: 0.2,
        };

        let url = format!("{}/chat/completions", self.settings.base_url.trim_end_matches('/'));
        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.settings.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ClusterError::Timeout
                } else {
                    ClusterError::Http(format!("Request failed: {e}"))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(match status.as_u16() {
                429 => ClusterError::RateLimited,
                402 | 403 => ClusterError::QuotaExhausted,
                code => {
                    let detail = response.text().await.unwrap_or_default();
                    tracing::warn!(code, detail = %detail, "Clustering upstream error");
                    ClusterError::Http(format!("Upstream returned status {code}"))
                }
            });
        }

        let reply: ChatResponse = response
            .json()
            .await
            .map_err(|e| ClusterError::Malformed(format!("Unexpected response envelope: {e}")))?;

        let content = reply
            .choices
            .first()
            .map(|c| c.message.content.as_str())
            .ok_or_else(|| ClusterError::Malformed("Response contained no choices".into()))?;

        let raw = prompt::parse_reply(content)?;
        Ok(assign_notes(&raw, &request.categories, &request.notes))
    }
}

/// Check the input bounds before spending a model call.
fn validate(request: &ClusterRequest) -> Result<(), ClusterError> {
    let n = request.categories.len();
    if !(MIN_CATEGORIES..=MAX_CATEGORIES).contains(&n) {
        return Err(ClusterError::InvalidInput(format!(
            "Expected between {MIN_CATEGORIES} and {MAX_CATEGORIES} categories, got {n}"
        )));
    }
    if let Some(bad) = request
        .categories
        .iter()
        .find(|c| c.trim().is_empty() || c.chars().count() > MAX_CATEGORY_LENGTH)
    {
        return Err(ClusterError::InvalidInput(format!(
            "Category label out of bounds: {bad:?}"
        )));
    }
    if request.notes.is_empty() {
        return Err(ClusterError::InvalidInput("No notes to cluster".into()));
    }
    if request.notes.len() > MAX_NOTES {
        return Err(ClusterError::InvalidInput(format!(
            "At most {MAX_NOTES} notes can be clustered at once"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(categories: &[&str], note_count: usize) -> ClusterRequest {
        ClusterRequest {
            notes: (0..note_count as i64)
                .map(|id| NoteSnapshot {
                    id,
                    content: format!("note {id}"),
                })
                .collect(),
            categories: categories.iter().map(|s| s.to_string()).collect(),
            context: None,
        }
    }

    #[test]
    fn validate_rejects_too_few_categories() {
        assert!(matches!(
            validate(&request(&["Only"], 3)),
            Err(ClusterError::InvalidInput(_))
        ));
    }

    #[test]
    fn validate_rejects_empty_label() {
        assert!(matches!(
            validate(&request(&["A", "  "], 3)),
            Err(ClusterError::InvalidInput(_))
        ));
    }

    #[test]
    fn validate_rejects_empty_note_set() {
        assert!(matches!(
            validate(&request(&["A", "B"], 0)),
            Err(ClusterError::InvalidInput(_))
        ));
    }

    #[test]
    fn validate_accepts_reasonable_input() {
        assert!(validate(&request(&["A", "B"], 10)).is_ok());
    }
}
