//! Uniqa - University assistant chat CLI library
//!
//! This library provides the client-side machinery for talking to a
//! university question-answering service: the conversation state machine,
//! the HTTP answer client, the offline fallback synthesizer, and session
//! handling.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - `conversation`: Message model and the conversation store that drives sends
//! - `service`: HTTP answer service client and feedback submission
//! - `fallback`: Local answer synthesizer used when the service fails
//! - `session`: Authentication, roles, and on-disk session persistence
//! - `config`: Configuration management and validation
//! - `error`: Error types and result aliases
//! - `cli`: Command-line interface definition
//! - `commands`: Handlers behind each CLI subcommand
//!
//! # Example
//!
//! ```no_run
//! use uniqa::service::HttpAnswerService;
//! use uniqa::{Config, ConversationStore};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load(None, &Default::default())?;
//!     config.validate()?;
//!
//!     let service = HttpAnswerService::new(&config.api)?;
//!     let store = ConversationStore::new(Box::new(service), config.fallback.clone());
//!
//!     store.send("What is the tuition fee?").await?;
//!     for message in store.messages().await {
//!         println!("{:?}: {}", message.role, message.content);
//!     }
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod commands;
pub mod config;
pub mod conversation;
pub mod error;
pub mod fallback;
pub mod service;
pub mod session;

// Re-export commonly used types
pub use config::Config;
pub use conversation::{ConversationStore, Message, Role, SourceCitation};
pub use error::{Result, UniqaError};
pub use fallback::synthesize;
pub use service::{Answer, AnswerService, HttpAnswerService};
