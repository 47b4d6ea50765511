//! Conversation state and message model
//!
//! This module owns the ordered message history of a chat session and the
//! state machine that drives it: [`ConversationStore::send`] appends the
//! user's question, calls the answer service, and appends the resulting
//! assistant turn (live or synthesized). The store is the only mutator of
//! its state; observers receive cloned snapshots.

use crate::config::FallbackConfig;
use crate::error::{Result, UniqaError};
use crate::fallback;
use crate::service::{Answer, AnswerService};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::sync::Mutex;
use uuid::Uuid;

/// Role of a conversation turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// A question submitted by the user
    User,
    /// An answer produced by the service or the fallback synthesizer
    Assistant,
}

/// Supporting material cited by an assistant answer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceCitation {
    /// Identifier of the cited document or passage
    pub source: String,
    /// Relevance score reported by the retrieval layer
    pub score: f64,
    /// Excerpt of the cited content
    pub content: String,
}

/// One turn in a conversation
///
/// User turns carry only the question text. Assistant turns additionally
/// carry source citations, an optional confidence score in `[0, 1]`, and
/// the reported processing time in seconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Unique identifier: client-generated for user turns, taken from the
    /// service's conversation id (or the synthesizer) for assistant turns
    pub id: String,
    /// Role of this turn, immutable after creation
    pub role: Role,
    /// Display text of the turn
    pub content: String,
    /// Source citations; present only on assistant turns, may be empty
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sources: Option<Vec<SourceCitation>>,
    /// Self-reported answer confidence in `[0, 1]`; assistant turns only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence_score: Option<f64>,
    /// Reported processing time in seconds; assistant turns only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processing_time: Option<f64>,
    /// Timestamp assigned when the turn is appended
    pub created_at: DateTime<Utc>,
}

impl Message {
    /// Create a user message with a freshly generated id
    ///
    /// # Examples
    ///
    /// ```
    /// use uniqa::conversation::{Message, Role};
    ///
    /// let message = Message::user("What is the tuition fee?");
    /// assert_eq!(message.role, Role::User);
    /// assert_eq!(message.content, "What is the tuition fee?");
    /// assert!(message.sources.is_none());
    /// ```
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role: Role::User,
            content: content.into(),
            sources: None,
            confidence_score: None,
            processing_time: None,
            created_at: Utc::now(),
        }
    }

    /// Create an assistant message with the given id and no annotations
    pub fn assistant(id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            role: Role::Assistant,
            content: content.into(),
            sources: Some(Vec::new()),
            confidence_score: None,
            processing_time: None,
            created_at: Utc::now(),
        }
    }

    /// Build the assistant turn for a live or synthesized answer
    pub fn from_answer(answer: Answer) -> Self {
        Self {
            id: answer.conversation_id,
            role: Role::Assistant,
            content: answer.text,
            sources: Some(answer.sources),
            confidence_score: answer.confidence_score,
            processing_time: answer.processing_time,
            created_at: Utc::now(),
        }
    }

    /// Citations attached to this turn; empty for user turns
    ///
    /// # Examples
    ///
    /// ```
    /// use uniqa::conversation::Message;
    ///
    /// let message = Message::user("hello");
    /// assert!(message.sources().is_empty());
    /// ```
    pub fn sources(&self) -> &[SourceCitation] {
        self.sources.as_deref().unwrap_or(&[])
    }
}

/// Mutable state guarded by the store's lock
#[derive(Debug, Default)]
struct StoreState {
    messages: Vec<Message>,
    is_loading: bool,
    last_error: Option<String>,
    generation: u64,
}

/// Owns a conversation and orchestrates sends against the answer service
///
/// The store enforces single-flight sends: a second [`send`](Self::send)
/// while one is outstanding fails with [`UniqaError::Busy`] and leaves all
/// state untouched. When the service fails and fallback mode is enabled,
/// the store waits the configured simulated latency and appends a locally
/// synthesized answer instead; the caller observes a successful turn.
///
/// Clearing the history while a send is in flight bumps an internal
/// generation counter, so the late response is discarded instead of
/// reappearing in the emptied conversation.
pub struct ConversationStore {
    state: Mutex<StoreState>,
    service: Box<dyn AnswerService>,
    fallback: FallbackConfig,
}

impl ConversationStore {
    /// Create a store backed by the given answer service
    ///
    /// # Arguments
    ///
    /// * `service` - Client used to answer questions
    /// * `fallback` - Fallback behavior applied when the service fails
    pub fn new(service: Box<dyn AnswerService>, fallback: FallbackConfig) -> Self {
        Self {
            state: Mutex::new(StoreState::default()),
            service,
            fallback,
        }
    }

    /// Send a question and append the resulting assistant turn
    ///
    /// Appends the user turn, marks the store loading, and clears the last
    /// error before any I/O. On success the assistant turn built from the
    /// response is appended. On failure with fallback disabled, the error is
    /// recorded in `last_error` and propagated; no assistant turn is
    /// appended. On failure with fallback enabled, a synthesized answer is
    /// appended after the configured simulated latency and the call
    /// succeeds from the caller's perspective.
    ///
    /// The caller is expected to pass a non-empty, trimmed question.
    ///
    /// # Errors
    ///
    /// Returns `UniqaError::Busy` if another send is outstanding, or the
    /// service failure when fallback mode is disabled.
    pub async fn send(&self, question: &str) -> Result<()> {
        let (generation, history) = {
            let mut state = self.state.lock().await;
            if state.is_loading {
                return Err(UniqaError::Busy.into());
            }
            let history = state.messages.clone();
            state.last_error = None;
            state.is_loading = true;
            Self::append(&mut state, Message::user(question));
            (state.generation, history)
        };

        tracing::debug!(history_len = history.len(), "Sending question to answer service");

        match self.service.ask(question, &history).await {
            Ok(answer) => {
                let mut state = self.state.lock().await;
                state.is_loading = false;
                if state.generation != generation {
                    tracing::debug!("Conversation cleared while awaiting answer, discarding it");
                    return Ok(());
                }
                Self::append(&mut state, Message::from_answer(answer));
                Ok(())
            }
            Err(e) if self.fallback.enabled => {
                tracing::warn!("Answer service failed, synthesizing a fallback answer: {}", e);
                tokio::time::sleep(Duration::from_millis(self.fallback.simulated_latency_ms)).await;
                let answer = fallback::synthesize(question);
                let mut state = self.state.lock().await;
                state.is_loading = false;
                if state.generation != generation {
                    tracing::debug!("Conversation cleared while synthesizing, discarding answer");
                    return Ok(());
                }
                Self::append(&mut state, Message::from_answer(answer));
                Ok(())
            }
            Err(e) => {
                let mut state = self.state.lock().await;
                state.is_loading = false;
                state.last_error = Some(e.to_string());
                Err(e)
            }
        }
    }

    /// Reset the message history to empty
    ///
    /// Callable at any time, including while a send is outstanding. The
    /// outstanding send is not cancelled; its eventual response is
    /// discarded rather than appended to the cleared history.
    pub async fn clear(&self) {
        let mut state = self.state.lock().await;
        state.messages.clear();
        state.generation = state.generation.wrapping_add(1);
        tracing::debug!("Conversation cleared");
    }

    /// Snapshot of the message history in insertion order
    pub async fn messages(&self) -> Vec<Message> {
        self.state.lock().await.messages.clone()
    }

    /// Whether a send is currently outstanding
    pub async fn is_loading(&self) -> bool {
        self.state.lock().await.is_loading
    }

    /// Human-readable description of the most recent hard failure, if any
    pub async fn last_error(&self) -> Option<String> {
        self.state.lock().await.last_error.clone()
    }

    /// Number of messages in the conversation
    pub async fn len(&self) -> usize {
        self.state.lock().await.messages.len()
    }

    /// Whether the conversation is empty
    pub async fn is_empty(&self) -> bool {
        self.state.lock().await.messages.is_empty()
    }

    /// Most recent assistant turn, if any
    pub async fn latest_assistant(&self) -> Option<Message> {
        let state = self.state.lock().await;
        state
            .messages
            .iter()
            .rev()
            .find(|m| m.role == Role::Assistant)
            .cloned()
    }

    /// Append a message, keeping timestamps non-decreasing across the sequence
    fn append(state: &mut StoreState, mut message: Message) {
        if let Some(last) = state.messages.last() {
            if message.created_at < last.created_at {
                message.created_at = last.created_at;
            }
        }
        state.messages.push(message);
    }
}
