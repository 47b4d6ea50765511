//! Uniqa - University assistant chat CLI
//!
#![doc = "Uniqa - University assistant chat CLI"]
#![doc = "Main entry point for the Uniqa client application."]

use anyhow::Result;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use uniqa::cli::{Cli, Commands};
use uniqa::commands;
use uniqa::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments first so --verbose can shape logging
    let cli = Cli::parse_args();

    // Initialize tracing
    init_tracing(cli.verbose);

    // Load configuration
    let config = Config::load(cli.config.as_deref(), &cli)?;

    // Validate configuration
    config.validate()?;

    // Execute command
    match cli.command {
        Commands::Chat { no_fallback } => {
            tracing::info!("Starting interactive chat session");
            if no_fallback {
                tracing::debug!("Fallback answers disabled");
            }

            commands::chat::run_chat(&config).await?;
            Ok(())
        }
        Commands::Ask {
            question,
            no_fallback,
        } => {
            tracing::info!("Asking a one-shot question");
            if no_fallback {
                tracing::debug!("Fallback answers disabled");
            }

            commands::ask::run_ask(&config, &question).await?;
            Ok(())
        }
        Commands::Login { email, password } => {
            tracing::info!("Logging in");
            commands::auth::login(&config, &email, &password).await?;
            Ok(())
        }
        Commands::Register {
            email,
            password,
            role,
        } => {
            tracing::info!("Registering a new account");
            commands::auth::register(&config, &email, &password, &role).await?;
            Ok(())
        }
        Commands::Logout => {
            tracing::info!("Logging out");
            commands::auth::logout()?;
            Ok(())
        }
        Commands::Whoami => {
            commands::auth::whoami()?;
            Ok(())
        }
    }
}

/// Initialize tracing subscriber with environment filter
///
/// `RUST_LOG` wins when set; otherwise `--verbose` selects debug-level
/// logging for this crate.
fn init_tracing(verbose: bool) {
    let default_directive = if verbose { "uniqa=debug" } else { "uniqa=info" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
