//! CLI commands implementation.
//!
//! This module contains the CLI parser and dispatches to command-specific modules.

mod auth;
mod config_cmd;
mod scan;
mod serve;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::{load_settings, LoadOptions};

#[derive(Parser)]
#[command(name = "eventreg")]
#[command(about = "Event registration and registration-form OCR intake")]
#[command(version)]
pub struct Cli {
    /// Config file path (overrides auto-discovery)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP API server
    Serve {
        /// Bind address: port, host, or host:port (default from config)
        #[arg(short, long)]
        bind: Option<String>,
    },

    /// Scan a registration-form image and print the extracted students
    Scan {
        /// Image file to scan
        image: PathBuf,
    },

    /// Account operations against the identity provider
    Auth {
        #[command(subcommand)]
        command: AuthCommands,
    },

    /// Show the resolved configuration (secrets redacted)
    Config,
}

#[derive(Subcommand)]
enum AuthCommands {
    /// Create an account
    SignUp {
        email: String,
        /// Display name for the new account
        #[arg(short, long)]
        name: Option<String>,
        /// Password (or set EVENTREG_PASSWORD)
        #[arg(long, env = "EVENTREG_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Sign in and print the account id
    SignIn {
        email: String,
        #[arg(long, env = "EVENTREG_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Send a password reset email
    ResetPassword { email: String },
}

/// Run the CLI.
pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let settings = load_settings(LoadOptions {
        config_path: cli.config,
    })
    .await?;

    match cli.command {
        Commands::Serve { bind } => {
            serve::cmd_serve(&settings, bind.as_deref().unwrap_or(&settings.bind)).await
        }
        Commands::Scan { image } => scan::cmd_scan(&settings, &image).await,
        Commands::Auth { command } => match command {
            AuthCommands::SignUp {
                email,
                name,
                password,
            } => auth::cmd_sign_up(&settings, &email, &password, name.as_deref()).await,
            AuthCommands::SignIn { email, password } => {
                auth::cmd_sign_in(&settings, &email, &password).await
            }
            AuthCommands::ResetPassword { email } => {
                auth::cmd_reset_password(&settings, &email).await
            }
        },
        Commands::Config => config_cmd::cmd_config_show(&settings),
    }
}
