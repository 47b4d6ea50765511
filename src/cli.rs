//! Command-line interface definition for Uniqa
//!
//! This module defines the CLI structure using clap's derive API,
//! providing commands for chat, one-shot questions, and account
//! management.

use clap::{Parser, Subcommand};

/// Uniqa - University assistant chat CLI
///
/// Ask a university question-answering service about fees, hostels,
/// placements, and admissions from the terminal.
#[derive(Parser, Debug, Clone)]
#[command(name = "uniqa")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for Uniqa
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Start an interactive chat session
    Chat {
        /// Fail loudly instead of falling back to canned answers
        #[arg(long)]
        no_fallback: bool,
    },

    /// Ask a single question and print the answer
    Ask {
        /// Question to ask
        question: String,

        /// Fail loudly instead of falling back to canned answers
        #[arg(long)]
        no_fallback: bool,
    },

    /// Log in and store a session for later commands
    Login {
        /// Account email address
        #[arg(short, long)]
        email: String,

        /// Account password
        #[arg(short, long, env = "UNIQA_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Create an account, then log in with it
    Register {
        /// Account email address
        #[arg(short, long)]
        email: String,

        /// Account password
        #[arg(short, long, env = "UNIQA_PASSWORD", hide_env_values = true)]
        password: String,

        /// Role to request (student, admin)
        #[arg(short, long, default_value = "student")]
        role: String,
    },

    /// Remove the stored session
    Logout,

    /// Show the signed-in account
    Whoami,
}

impl Cli {
    /// Parse command line arguments
    ///
    /// # Returns
    ///
    /// Returns the parsed CLI structure
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

impl Default for Cli {
    fn default() -> Self {
        Self {
            config: None,
            verbose: false,
            command: Commands::Chat { no_fallback: false },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_default() {
        let cli = Cli::default();
        assert_eq!(cli.config, None);
        assert!(!cli.verbose);

        if let Commands::Chat { no_fallback } = cli.command {
            assert!(!no_fallback);
        } else {
            panic!("Expected default command to be Chat");
        }
    }

    #[test]
    fn test_cli_parse_chat_command() {
        let cli = Cli::try_parse_from(["uniqa", "chat"]);
        assert!(cli.is_ok());
        let cli = cli.unwrap();
        assert!(matches!(cli.command, Commands::Chat { .. }));
    }

    #[test]
    fn test_cli_parse_chat_with_no_fallback() {
        let cli = Cli::try_parse_from(["uniqa", "chat", "--no-fallback"]);
        assert!(cli.is_ok());
        let cli = cli.unwrap();
        if let Commands::Chat { no_fallback } = cli.command {
            assert!(no_fallback);
        } else {
            panic!("Expected Chat command");
        }
    }

    #[test]
    fn test_cli_parse_ask_command() {
        let cli = Cli::try_parse_from(["uniqa", "ask", "What is the tuition fee?"]);
        assert!(cli.is_ok());
        let cli = cli.unwrap();
        if let Commands::Ask {
            question,
            no_fallback,
        } = cli.command
        {
            assert_eq!(question, "What is the tuition fee?");
            assert!(!no_fallback);
        } else {
            panic!("Expected Ask command");
        }
    }

    #[test]
    fn test_cli_parse_ask_with_no_fallback() {
        let cli = Cli::try_parse_from(["uniqa", "ask", "--no-fallback", "Any hostels?"]);
        assert!(cli.is_ok());
        let cli = cli.unwrap();
        if let Commands::Ask {
            question,
            no_fallback,
        } = cli.command
        {
            assert_eq!(question, "Any hostels?");
            assert!(no_fallback);
        } else {
            panic!("Expected Ask command");
        }
    }

    #[test]
    fn test_cli_parse_ask_requires_question() {
        let cli = Cli::try_parse_from(["uniqa", "ask"]);
        assert!(cli.is_err());
    }

    #[test]
    fn test_cli_parse_login() {
        let cli = Cli::try_parse_from([
            "uniqa",
            "login",
            "--email",
            "student@uni.edu",
            "--password",
            "hunter2",
        ]);
        assert!(cli.is_ok());
        let cli = cli.unwrap();
        if let Commands::Login { email, password } = cli.command {
            assert_eq!(email, "student@uni.edu");
            assert_eq!(password, "hunter2");
        } else {
            panic!("Expected Login command");
        }
    }

    #[test]
    fn test_cli_parse_login_requires_email() {
        let cli = Cli::try_parse_from(["uniqa", "login", "--password", "hunter2"]);
        assert!(cli.is_err());
    }

    #[test]
    fn test_cli_parse_register_defaults_to_student_role() {
        let cli = Cli::try_parse_from([
            "uniqa",
            "register",
            "--email",
            "new@uni.edu",
            "--password",
            "hunter2",
        ]);
        assert!(cli.is_ok());
        let cli = cli.unwrap();
        if let Commands::Register {
            email,
            password: _,
            role,
        } = cli.command
        {
            assert_eq!(email, "new@uni.edu");
            assert_eq!(role, "student");
        } else {
            panic!("Expected Register command");
        }
    }

    #[test]
    fn test_cli_parse_register_with_role() {
        let cli = Cli::try_parse_from([
            "uniqa",
            "register",
            "--email",
            "ops@uni.edu",
            "--password",
            "hunter2",
            "--role",
            "admin",
        ]);
        assert!(cli.is_ok());
        let cli = cli.unwrap();
        if let Commands::Register { role, .. } = cli.command {
            assert_eq!(role, "admin");
        } else {
            panic!("Expected Register command");
        }
    }

    #[test]
    fn test_cli_parse_logout() {
        let cli = Cli::try_parse_from(["uniqa", "logout"]);
        assert!(cli.is_ok());
        assert!(matches!(cli.unwrap().command, Commands::Logout));
    }

    #[test]
    fn test_cli_parse_whoami() {
        let cli = Cli::try_parse_from(["uniqa", "whoami"]);
        assert!(cli.is_ok());
        assert!(matches!(cli.unwrap().command, Commands::Whoami));
    }

    #[test]
    fn test_cli_parse_with_config() {
        let cli = Cli::try_parse_from(["uniqa", "--config", "custom.yaml", "chat"]);
        assert!(cli.is_ok());
        let cli = cli.unwrap();
        assert_eq!(cli.config, Some("custom.yaml".to_string()));
    }

    #[test]
    fn test_cli_parse_with_verbose() {
        let cli = Cli::try_parse_from(["uniqa", "-v", "chat"]);
        assert!(cli.is_ok());
        assert!(cli.unwrap().verbose);
    }

    #[test]
    fn test_cli_parse_missing_command() {
        let cli = Cli::try_parse_from(["uniqa"]);
        assert!(cli.is_err());
    }

    #[test]
    fn test_cli_parse_invalid_command() {
        let cli = Cli::try_parse_from(["uniqa", "wander"]);
        assert!(cli.is_err());
    }
}
