//! Special commands parser for interactive chat mode
//!
//! This module parses and handles special commands that can be entered during
//! interactive chat sessions. Special commands allow users to:
//! - Clear the conversation and start fresh
//! - View citations for the latest answer
//! - Rate answers and check session status
//! - Display help information
//! - Exit the session
//!
//! Commands are prefixed with `/` and are case-insensitive.

use thiserror::Error;

/// Errors that can occur when parsing special commands
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// Unknown command was entered
    #[error("Unknown command: {0}\n\nType '/help' to see available commands")]
    UnknownCommand(String),

    /// Command was given an unsupported argument
    #[error("Unsupported argument for {command}: {arg}\n\nType '/help' to see valid usage")]
    UnsupportedArgument { command: String, arg: String },

    /// Command requires an argument but none was provided
    #[error("Command {command} requires an argument\n\nUsage: {usage}")]
    MissingArgument { command: String, usage: String },
}

/// Special commands that can be executed during interactive chat
///
/// These commands act on the session state or display information,
/// rather than being sent to the assistant as questions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpecialCommand {
    /// Display help information
    ///
    /// Shows all available special commands and their usage.
    Help,

    /// Clear the conversation
    ///
    /// Removes every message from the current conversation. An answer
    /// still on its way back will be discarded when it arrives.
    Clear,

    /// Show citations for the latest answer
    ///
    /// Displays the source documents the assistant drew on, with their
    /// relevance scores.
    Sources,

    /// Display conversation and session status
    ///
    /// Shows the message count, whether a question is in flight, the
    /// last error, and the signed-in account.
    Status,

    /// Rate the latest answer
    ///
    /// Sends a 1-5 rating with an optional free-text comment to the
    /// service.
    Feedback { rating: u8, comment: Option<String> },

    /// Exit the interactive session
    ///
    /// Gracefully closes the chat session.
    Exit,

    /// Not a special command
    ///
    /// The input should be sent to the assistant as a question.
    None,
}

/// Parse a user input string into a special command
///
/// Checks if the input matches any special command pattern.
/// Commands are case-insensitive; feedback comments keep their
/// original casing.
///
/// # Arguments
///
/// * `input` - The user input string to parse
///
/// # Returns
///
/// Returns Ok(SpecialCommand) for valid commands or SpecialCommand::None for non-commands.
/// Returns Err(CommandError) for invalid commands or invalid arguments.
///
/// # Errors
///
/// Returns CommandError::UnknownCommand if input starts with "/" but is not a valid command.
/// Returns CommandError::UnsupportedArgument if a command receives an invalid argument.
/// Returns CommandError::MissingArgument if a command requires an argument but none was provided.
///
/// # Examples
///
/// ```
/// use uniqa::commands::special_commands::{parse_special_command, SpecialCommand};
///
/// let cmd = parse_special_command("/clear").unwrap();
/// assert_eq!(cmd, SpecialCommand::Clear);
///
/// let cmd = parse_special_command("How much is the tuition fee?").unwrap();
/// assert_eq!(cmd, SpecialCommand::None);
///
/// // Invalid command returns error
/// assert!(parse_special_command("/foo").is_err());
/// ```
pub fn parse_special_command(input: &str) -> Result<SpecialCommand, CommandError> {
    let trimmed = input.trim();
    let lower = trimmed.to_lowercase();

    // If input doesn't start with "/", it's not a command (except exit/quit)
    if !trimmed.starts_with('/') && lower != "exit" && lower != "quit" {
        return Ok(SpecialCommand::None);
    }

    match lower.as_str() {
        // Conversation commands
        "/clear" => Ok(SpecialCommand::Clear),
        "/sources" => Ok(SpecialCommand::Sources),
        "/status" => Ok(SpecialCommand::Status),

        // Help
        "/help" | "/?" => Ok(SpecialCommand::Help),

        // Handle /feedback with no argument
        "/feedback" => Err(CommandError::MissingArgument {
            command: "/feedback".to_string(),
            usage: "/feedback <rating 1-5> [comment]".to_string(),
        }),
        input if input.starts_with("/feedback ") => {
            // Slice the original input so the comment keeps its casing
            let rest = trimmed.get(10..).map(str::trim).unwrap_or("");
            if rest.is_empty() {
                return Err(CommandError::MissingArgument {
                    command: "/feedback".to_string(),
                    usage: "/feedback <rating 1-5> [comment]".to_string(),
                });
            }

            let mut parts = rest.splitn(2, char::is_whitespace);
            let rating_str = parts.next().unwrap_or("");
            let comment = parts
                .next()
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .map(|c| c.to_string());

            match rating_str.parse::<u8>() {
                Ok(rating) if (1..=5).contains(&rating) => {
                    Ok(SpecialCommand::Feedback { rating, comment })
                }
                _ => Err(CommandError::UnsupportedArgument {
                    command: "/feedback".to_string(),
                    arg: rating_str.to_string(),
                }),
            }
        }

        // Exit commands
        "exit" | "quit" | "/exit" | "/quit" => Ok(SpecialCommand::Exit),

        // Unknown command starting with "/"
        input if input.starts_with('/') => {
            let cmd = input.split_whitespace().next().unwrap_or(input);
            Err(CommandError::UnknownCommand(cmd.to_string()))
        }

        // Not a special command
        _ => Ok(SpecialCommand::None),
    }
}

/// Display help text for special commands
///
/// Shows all available special commands with their descriptions
/// and usage examples.
///
/// # Examples
///
/// ```
/// use uniqa::commands::special_commands::print_help;
///
/// print_help();
/// ```
pub fn print_help() {
    println!(
        r#"
Special Commands for Interactive Chat
=====================================

CONVERSATION:
  /clear          - Clear the conversation and start fresh
  /sources        - Show citations for the latest answer
  /feedback <rating 1-5> [comment]
                  - Rate the latest answer, e.g. /feedback 4 very helpful
  /status         - Show conversation and session status

SESSION INFORMATION:
  /help           - Show this help message
  /?              - Same as /help

SESSION CONTROL:
  exit            - Exit the chat session
  quit            - Same as exit
  /exit, /quit    - Also exit the session

Anything else you type is sent to the university assistant as a
question.
"#
    );
}
