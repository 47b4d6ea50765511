/*!
Command handlers for the CLI

This module provides command handlers invoked by the CLI entrypoint.

It exposes three top-level command modules:

- `chat` — Interactive chat session
- `ask`  — Ask a single question and print the answer
- `auth` — Login, registration, and session inspection

These handlers are intentionally small and use the library components:
the conversation store, the answer service client, and the session store.
*/

use crate::commands::special_commands::{parse_special_command, print_help, SpecialCommand};
use crate::config::Config;
use crate::conversation::{ConversationStore, Message};
use crate::error::{Result, UniqaError};
use crate::service::{FeedbackClient, HttpAnswerService};
use crate::session::{Session, SessionStore};
use colored::Colorize;
use prettytable::{row, Table};

// Special commands parser for chat sessions
pub mod special_commands;

// Chat command handler
pub mod chat {
    //! Interactive chat session handler.
    //!
    //! Builds the answer service client from configuration and the stored
    //! session, then runs a readline-based loop that sends questions
    //! through the conversation store and renders the answers.

    use super::*;
    use rustyline::error::ReadlineError;
    use rustyline::DefaultEditor;

    /// Start an interactive chat session
    ///
    /// # Arguments
    ///
    /// * `config` - Global configuration
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client or the terminal cannot be set
    /// up. Per-question failures are reported inline and keep the
    /// session alive.
    pub async fn run_chat(config: &Config) -> Result<()> {
        tracing::info!("Starting interactive chat session");

        let session = SessionStore::new()?.load()?;

        let mut service = HttpAnswerService::new(&config.api)?;
        let mut feedback = FeedbackClient::new(&config.api)?;
        if let Some(session) = &session {
            service = service.with_bearer_token(&session.access_token);
            feedback = feedback.with_bearer_token(&session.access_token);
        }

        let store = ConversationStore::new(Box::new(service), config.fallback.clone());

        // Create readline instance
        let mut rl = DefaultEditor::new()?;

        print_welcome_banner(config, session.as_ref());

        let prompt = format!("{} >> ", "uniqa".cyan());
        loop {
            match rl.readline(&prompt) {
                Ok(line) => {
                    let trimmed = line.trim();
                    if trimmed.is_empty() {
                        continue;
                    }

                    // Check for special commands first
                    match parse_special_command(trimmed) {
                        Ok(SpecialCommand::Help) => {
                            print_help();
                            continue;
                        }
                        Ok(SpecialCommand::Clear) => {
                            store.clear().await;
                            println!("Conversation cleared.\n");
                            continue;
                        }
                        Ok(SpecialCommand::Sources) => {
                            let latest = store.latest_assistant().await;
                            show_sources(latest.as_ref());
                            continue;
                        }
                        Ok(SpecialCommand::Status) => {
                            show_status(&store, session.as_ref()).await;
                            continue;
                        }
                        Ok(SpecialCommand::Feedback { rating, comment }) => {
                            let latest = store.latest_assistant().await;
                            submit_feedback(&feedback, latest.as_ref(), rating, comment.as_deref())
                                .await;
                            continue;
                        }
                        Ok(SpecialCommand::Exit) => break,
                        Ok(SpecialCommand::None) => {
                            // Regular question
                        }
                        Err(e) => {
                            eprintln!("{}\n", e);
                            continue;
                        }
                    }

                    // Add to history
                    rl.add_history_entry(trimmed)?;

                    match store.send(trimmed).await {
                        Ok(()) => {
                            if let Some(answer) = store.latest_assistant().await {
                                render_answer(&answer, true);
                            }
                        }
                        Err(e) => {
                            eprintln!("{}\n", format!("Error: {}", e).red());
                        }
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    println!("CTRL-C");
                    break;
                }
                Err(ReadlineError::Eof) => {
                    println!("CTRL-D");
                    break;
                }
                Err(err) => {
                    tracing::error!("Readline error: {:?}", err);
                    break;
                }
            }
        }

        println!("Goodbye!");
        Ok(())
    }
}

// One-shot question handler
pub mod ask {
    //! One-shot question handler.
    //!
    //! Sends a single question through the conversation store and prints
    //! the answer with its citations.

    use super::*;

    /// Ask a single question and print the answer
    ///
    /// # Arguments
    ///
    /// * `config` - Global configuration
    /// * `question` - Question text; must not be blank
    ///
    /// # Errors
    ///
    /// Returns error if the question is blank, or if the send fails and
    /// fallback answering is disabled.
    pub async fn run_ask(config: &Config, question: &str) -> Result<()> {
        let question = question.trim();
        if question.is_empty() {
            return Err(UniqaError::Config("Question cannot be empty".to_string()).into());
        }

        tracing::info!("Asking one-shot question");

        let session = SessionStore::new()?.load()?;

        let mut service = HttpAnswerService::new(&config.api)?;
        if let Some(session) = &session {
            service = service.with_bearer_token(&session.access_token);
        }

        let store = ConversationStore::new(Box::new(service), config.fallback.clone());
        store.send(question).await?;

        if let Some(answer) = store.latest_assistant().await {
            render_answer(&answer, false);
            if !answer.sources().is_empty() {
                show_sources(Some(&answer));
            }
        }

        Ok(())
    }
}

// Account management handlers
pub mod auth {
    use super::*;
    use crate::session::{AuthClient, UserRole};

    /// Log in and persist the session for later commands
    ///
    /// # Arguments
    ///
    /// * `config` - Global configuration
    /// * `email` - Account email address
    /// * `password` - Account password
    pub async fn login(config: &Config, email: &str, password: &str) -> Result<()> {
        let client = AuthClient::new(&config.api)?;
        let session = client.login(email, password).await?;

        SessionStore::new()?.save(&session)?;

        println!("Logged in as {} ({})", session.email, session.role);
        Ok(())
    }

    /// Register a new account, then log in and persist the session
    ///
    /// # Arguments
    ///
    /// * `config` - Global configuration
    /// * `email` - Account email address
    /// * `password` - Account password
    /// * `role` - Requested role name ("student" or "admin")
    pub async fn register(config: &Config, email: &str, password: &str, role: &str) -> Result<()> {
        let role = UserRole::parse_str(role)?;
        let client = AuthClient::new(&config.api)?;
        let session = client.register(email, password, role).await?;

        SessionStore::new()?.save(&session)?;

        println!(
            "Registered and logged in as {} ({})",
            session.email, session.role
        );
        Ok(())
    }

    /// Remove the stored session
    pub fn logout() -> Result<()> {
        SessionStore::new()?.delete()?;
        println!("Logged out.");
        Ok(())
    }

    /// Show the signed-in account
    pub fn whoami() -> Result<()> {
        match SessionStore::new()?.load()? {
            Some(session) => {
                println!("{} ({})", session.email, session.role);
                if let Some(at) = session.expires_at {
                    println!("Session expires at {}", at.format("%Y-%m-%d %H:%M UTC"));
                }
            }
            None => println!("Not signed in."),
        }
        Ok(())
    }
}

/// Display the chat welcome banner with service and account details
fn print_welcome_banner(config: &Config, session: Option<&Session>) {
    println!("\n╔══════════════════════════════════════════════════════════════╗");
    println!("║            Uniqa University Assistant - Welcome!             ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");
    println!("Service:  {}", config.api.base_url);
    println!(
        "Fallback: {}",
        if config.fallback.enabled {
            "enabled (canned answers when the service is unreachable)"
        } else {
            "disabled"
        }
    );
    match session {
        Some(session) => println!("Account:  {} ({})\n", session.email, session.role),
        None => println!("Account:  not signed in\n"),
    }
    println!("Type '/help' for available commands, 'exit' to quit\n");
}

/// Format a confidence score as the percentage label shown to users
fn confidence_label(score: f64) -> String {
    format!("{}% confident", (score * 100.0).round() as i64)
}

/// Print an assistant answer with its confidence and timing annotations
///
/// High-confidence answers (above 0.7) are annotated in green, the rest
/// in yellow. When `show_sources_hint` is set, citations are summarized
/// with a pointer to `/sources` instead of printed in full.
fn render_answer(message: &Message, show_sources_hint: bool) {
    println!("\n{}\n", message.content);

    let mut annotations: Vec<String> = Vec::new();

    if let Some(score) = message.confidence_score {
        let label = confidence_label(score);
        let colored = if score > 0.7 {
            label.green()
        } else {
            label.yellow()
        };
        annotations.push(colored.to_string());
    }

    if let Some(seconds) = message.processing_time {
        annotations.push(format!("{:.2}s", seconds));
    }

    if show_sources_hint && !message.sources().is_empty() {
        annotations.push(format!(
            "{} source(s), type /sources to view",
            message.sources().len()
        ));
    }

    if !annotations.is_empty() {
        println!("{}\n", annotations.join("  "));
    }
}

/// Print the source citations for the latest answer as a table
fn show_sources(latest: Option<&Message>) {
    let message = match latest {
        Some(message) => message,
        None => {
            println!("No answers yet - ask a question first.\n");
            return;
        }
    };

    let sources = message.sources();
    if sources.is_empty() {
        println!("The latest answer has no source citations.\n");
        return;
    }

    let mut table = Table::new();
    table.add_row(row!["Source", "Score", "Excerpt"]);
    for citation in sources {
        table.add_row(row![
            citation.source,
            format!("{:.3}", citation.score),
            truncate(&citation.content, 60),
        ]);
    }
    table.printstd();
    println!();
}

/// Display conversation and session status
async fn show_status(store: &ConversationStore, session: Option<&Session>) {
    println!("\n╔══════════════════════════════════════════════════════════════╗");
    println!("║                     Uniqa Session Status                     ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");
    println!("Messages:    {}", store.len().await);
    println!(
        "In flight:   {}",
        if store.is_loading().await { "yes" } else { "no" }
    );
    match store.last_error().await {
        Some(error) => println!("Last error:  {}", error),
        None => println!("Last error:  none"),
    }
    match session {
        Some(session) => println!("Signed in:   {} ({})", session.email, session.role),
        None => println!("Signed in:   no"),
    }
    println!();
}

/// Submit a rating for the latest answer
///
/// Feedback problems are reported to the user but never end the session.
async fn submit_feedback(
    feedback: &FeedbackClient,
    latest: Option<&Message>,
    rating: u8,
    comment: Option<&str>,
) {
    let message = match latest {
        Some(message) => message,
        None => {
            println!("No answers to rate yet - ask a question first.\n");
            return;
        }
    };

    match feedback.submit(&message.id, rating, comment).await {
        Ok(()) => println!("{}\n", "Thanks for the feedback!".green()),
        Err(e) => eprintln!("{}\n", format!("Could not submit feedback: {}", e).red()),
    }
}

/// Truncate a string for table display, respecting char boundaries
fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let prefix: String = text.chars().take(max_chars).collect();
    format!("{}...", prefix)
}
