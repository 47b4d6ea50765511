//! Answer service client
//!
//! This module implements HTTP access to the remote question-answering
//! service. The [`AnswerService`] trait is the seam between the
//! conversation store and the network; [`HttpAnswerService`] is the live
//! implementation. Failures are classified into the distinct kinds the
//! store's fallback policy depends on: network unreachability, a
//! non-success status (with the server's message when present), and a
//! response body that does not match the expected shape.

use crate::config::ApiConfig;
use crate::conversation::{Message, SourceCitation};
use crate::error::{Result, UniqaError};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Answer returned by the live service or synthesized locally
#[derive(Debug, Clone, PartialEq)]
pub struct Answer {
    /// The answer text
    pub text: String,
    /// Supporting citations; may be empty
    pub sources: Vec<SourceCitation>,
    /// Self-reported confidence in `[0, 1]`, when the service provides one
    pub confidence_score: Option<f64>,
    /// Reported processing time in seconds, when the service provides one
    pub processing_time: Option<f64>,
    /// Identifier assigned to this exchange by the answering side
    pub conversation_id: String,
}

/// Client interface for answering questions
///
/// The conversation store depends on this trait rather than on a concrete
/// HTTP client, so tests can drive the store with scripted doubles.
#[async_trait]
pub trait AnswerService: Send + Sync {
    /// Ask a single question, given the prior turns of the conversation
    ///
    /// Issues exactly one request per call; retry policy, if any, belongs
    /// to the caller.
    ///
    /// # Arguments
    ///
    /// * `question` - Non-empty question text
    /// * `history` - Prior turns of the conversation, oldest first; may be empty
    ///
    /// # Returns
    ///
    /// Returns the answer with its citations, confidence, and timing
    ///
    /// # Errors
    ///
    /// Returns `UniqaError::Network` when the service is unreachable or the
    /// request times out, `UniqaError::Service` for a non-success status,
    /// and `UniqaError::MalformedResponse` when the body cannot be parsed.
    async fn ask(&self, question: &str, history: &[Message]) -> Result<Answer>;
}

/// Request body for the chat endpoint
#[derive(Debug, Serialize)]
struct ChatRequest {
    query: String,
    history: Vec<String>,
}

/// Response body from the chat endpoint
#[derive(Debug, Deserialize)]
struct ChatResponse {
    conversation_id: String,
    answer: String,
    #[serde(default)]
    sources: Vec<SourceCitation>,
    #[serde(default)]
    confidence_score: Option<f64>,
    #[serde(default)]
    processing_time: Option<f64>,
}

/// HTTP client for the question-answering service
///
/// # Examples
///
/// ```no_run
/// use uniqa::config::ApiConfig;
/// use uniqa::service::{AnswerService, HttpAnswerService};
///
/// # async fn example() -> uniqa::error::Result<()> {
/// let config = ApiConfig {
///     base_url: "http://localhost:8000/api/v1".to_string(),
///     timeout_seconds: 30,
/// };
/// let service = HttpAnswerService::new(&config)?;
/// let answer = service.ask("What is the tuition fee?", &[]).await?;
/// println!("{}", answer.text);
/// # Ok(())
/// # }
/// ```
pub struct HttpAnswerService {
    client: Client,
    base_url: String,
    bearer_token: Option<String>,
}

impl HttpAnswerService {
    /// Create a new client for the configured service
    ///
    /// # Arguments
    ///
    /// * `config` - API configuration containing the base URL and timeout
    ///
    /// # Errors
    ///
    /// Returns error if HTTP client initialization fails
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent("uniqa/0.1.0")
            .build()
            .map_err(|e| UniqaError::Network(format!("Failed to create HTTP client: {}", e)))?;

        tracing::info!("Initialized answer service client: base_url={}", config.base_url);

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            bearer_token: None,
        })
    }

    /// Attach a bearer token to every request issued by this client
    pub fn with_bearer_token(mut self, token: impl Into<String>) -> Self {
        self.bearer_token = Some(token.into());
        self
    }
}

#[async_trait]
impl AnswerService for HttpAnswerService {
    async fn ask(&self, question: &str, history: &[Message]) -> Result<Answer> {
        let url = format!("{}/chat/", self.base_url);
        let request = ChatRequest {
            query: question.to_string(),
            history: history.iter().map(|m| m.content.clone()).collect(),
        };

        tracing::debug!("Sending chat request to {}", url);

        let mut builder = self.client.post(&url).json(&request);
        if let Some(token) = &self.bearer_token {
            builder = builder.bearer_auth(token);
        }

        let response = builder.send().await.map_err(|e| {
            tracing::error!("Failed to reach answer service: {}", e);
            if e.is_timeout() {
                UniqaError::Network(format!("Request to answer service timed out: {}", e))
            } else {
                UniqaError::Network(format!("Failed to reach answer service: {}", e))
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = match extract_detail(&body) {
                Some(detail) => detail,
                None if body.trim().is_empty() => "Failed to send message".to_string(),
                None => body,
            };
            tracing::error!("Answer service returned {}: {}", status, message);
            return Err(UniqaError::Service {
                status: status.as_u16(),
                message,
            }
            .into());
        }

        let body: ChatResponse = response.json().await.map_err(|e| {
            tracing::error!("Failed to parse answer service response: {}", e);
            UniqaError::MalformedResponse(format!("Failed to parse response body: {}", e))
        })?;

        tracing::debug!(
            conversation_id = %body.conversation_id,
            sources = body.sources.len(),
            "Received answer"
        );

        Ok(Answer {
            text: body.answer,
            sources: body.sources,
            confidence_score: body.confidence_score,
            processing_time: body.processing_time,
            conversation_id: body.conversation_id,
        })
    }
}

/// Request body for the feedback endpoint
#[derive(Debug, Serialize)]
struct FeedbackRequest {
    chat_id: String,
    rating: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    comment: Option<String>,
}

/// HTTP client for submitting answer feedback
///
/// Feedback is advisory: callers are expected to report errors to the
/// user without treating them as fatal to the session.
pub struct FeedbackClient {
    client: Client,
    base_url: String,
    bearer_token: Option<String>,
}

impl FeedbackClient {
    /// Create a new feedback client for the configured service
    ///
    /// # Errors
    ///
    /// Returns error if HTTP client initialization fails
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent("uniqa/0.1.0")
            .build()
            .map_err(|e| UniqaError::Network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            bearer_token: None,
        })
    }

    /// Attach a bearer token to every request issued by this client
    pub fn with_bearer_token(mut self, token: impl Into<String>) -> Self {
        self.bearer_token = Some(token.into());
        self
    }

    /// Submit a rating (1-5) and optional comment for an assistant answer
    ///
    /// # Errors
    ///
    /// Returns `UniqaError::Network` when the endpoint is unreachable and
    /// `UniqaError::Service` when the submission is rejected.
    pub async fn submit(&self, chat_id: &str, rating: u8, comment: Option<&str>) -> Result<()> {
        let url = format!("{}/feedback/", self.base_url);
        let request = FeedbackRequest {
            chat_id: chat_id.to_string(),
            rating,
            comment: comment.map(|c| c.to_string()),
        };

        tracing::debug!(chat_id = %chat_id, rating, "Submitting feedback");

        let mut builder = self.client.post(&url).json(&request);
        if let Some(token) = &self.bearer_token {
            builder = builder.bearer_auth(token);
        }

        let response = builder.send().await.map_err(|e| {
            tracing::error!("Failed to reach feedback endpoint: {}", e);
            UniqaError::Network(format!("Failed to reach feedback endpoint: {}", e))
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = match extract_detail(&body) {
                Some(detail) => detail,
                None if body.trim().is_empty() => "Feedback was rejected".to_string(),
                None => body,
            };
            tracing::error!("Feedback endpoint returned {}: {}", status, message);
            return Err(UniqaError::Service {
                status: status.as_u16(),
                message,
            }
            .into());
        }

        Ok(())
    }
}

/// Extract the `detail` field from a JSON error body, if present
///
/// The service reports errors as `{"detail": "..."}`; anything else (or a
/// non-string detail) yields `None` and the caller falls back to the raw
/// body.
pub(crate) fn extract_detail(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    value.get("detail")?.as_str().map(|s| s.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn test_config() -> ApiConfig {
        ApiConfig {
            base_url: "http://localhost:8000/api/v1".to_string(),
            timeout_seconds: 30,
        }
    }

    #[test]
    fn test_new_succeeds_with_valid_config() {
        let service = HttpAnswerService::new(&test_config());
        assert!(service.is_ok());
    }

    #[test]
    fn test_new_trims_trailing_slash_from_base_url() {
        let config = ApiConfig {
            base_url: "http://localhost:8000/api/v1/".to_string(),
            timeout_seconds: 30,
        };
        let service = HttpAnswerService::new(&config).expect("client build failed");
        assert_eq!(service.base_url, "http://localhost:8000/api/v1");
    }

    #[test]
    fn test_chat_request_serializes_expected_shape() {
        let request = ChatRequest {
            query: "What is the fee?".to_string(),
            history: vec!["earlier question".to_string()],
        };
        let value = serde_json::to_value(&request).expect("serialize failed");
        assert_eq!(
            value,
            json!({
                "query": "What is the fee?",
                "history": ["earlier question"],
            })
        );
    }

    #[test]
    fn test_chat_response_parses_full_body() {
        let body = json!({
            "conversation_id": "abc-123",
            "answer": "Hello there",
            "sources": [
                {"source": "handbook.pdf", "score": 0.87, "content": "Excerpt"}
            ],
            "confidence_score": 0.91,
            "processing_time": 0.33,
        });
        let parsed: ChatResponse = serde_json::from_value(body).expect("parse failed");
        assert_eq!(parsed.conversation_id, "abc-123");
        assert_eq!(parsed.answer, "Hello there");
        assert_eq!(parsed.sources.len(), 1);
        assert_eq!(parsed.sources[0].source, "handbook.pdf");
        assert_eq!(parsed.confidence_score, Some(0.91));
        assert_eq!(parsed.processing_time, Some(0.33));
    }

    #[test]
    fn test_chat_response_defaults_optional_fields() {
        let body = json!({
            "conversation_id": "abc-123",
            "answer": "Hello there",
        });
        let parsed: ChatResponse = serde_json::from_value(body).expect("parse failed");
        assert!(parsed.sources.is_empty());
        assert!(parsed.confidence_score.is_none());
        assert!(parsed.processing_time.is_none());
    }

    #[test]
    fn test_feedback_request_omits_absent_comment() {
        let request = FeedbackRequest {
            chat_id: "abc".to_string(),
            rating: 4,
            comment: None,
        };
        let value = serde_json::to_value(&request).expect("serialize failed");
        assert_eq!(value, json!({"chat_id": "abc", "rating": 4}));
    }

    #[test]
    fn test_extract_detail_reads_service_error_shape() {
        let detail = extract_detail(r#"{"detail": "Service is down"}"#);
        assert_eq!(detail, Some("Service is down".to_string()));
    }

    #[test]
    fn test_extract_detail_returns_none_for_plain_text() {
        assert!(extract_detail("internal server error").is_none());
    }

    #[test]
    fn test_extract_detail_returns_none_without_detail_field() {
        assert!(extract_detail(r#"{"error": "nope"}"#).is_none());
    }

    #[test]
    fn test_extract_detail_returns_none_for_non_string_detail() {
        // FastAPI validation errors carry a list in `detail`
        assert!(extract_detail(r#"{"detail": [{"msg": "field required"}]}"#).is_none());
    }
}
