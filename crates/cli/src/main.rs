//! Smart Pantry CLI - accounts and pantry items from the terminal.
//!
//! # Usage
//!
//! ```bash
//! # Create an account (a verification link is emailed)
//! PANTRY_PASSWORD='Kiler1!' pantry --email cook@example.com register --name Furkan
//!
//! # Add an item
//! pantry add --name Milk --expires 15/6/2025 --category dairy
//!
//! # Show items expiring first, filtered
//! pantry list --query mil --category "Süt Ürünleri"
//!
//! # Follow the list live until Ctrl+C
//! pantry watch
//! ```
//!
//! # Commands
//!
//! - `register` - Create an account
//! - `login` - Check credentials and print the greeting
//! - `resend-verification` - Send the verification email again
//! - `add` / `delete` - Create or remove an item
//! - `list` / `watch` - Ranked item list, once or live
//! - `check-password` - Run the password strength rules
//! - `categories` - Print the category labels
//!
//! Credentials come from `--email` / `PANTRY_EMAIL` and `PANTRY_PASSWORD`.
//! Firebase settings are read by `BackendConfig::from_env`.

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

use commands::Credentials;

#[derive(Parser)]
#[command(name = "pantry")]
#[command(author, version, about = "Smart Pantry: track what expires first")]
struct Cli {
    /// Account email address
    #[arg(short, long, env = "PANTRY_EMAIL", global = true)]
    email: Option<String>,

    /// Account password
    #[arg(long, env = "PANTRY_PASSWORD", hide_env_values = true, global = true)]
    password: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an account and send the verification email
    Register {
        /// Display name
        #[arg(short, long)]
        name: String,
    },
    /// Sign in and print the greeting
    Login,
    /// Send the verification email again
    ResendVerification,
    /// Add a pantry item
    Add {
        /// Item name
        #[arg(short, long)]
        name: String,

        /// Expiry date as D/M/Y or YYYY-MM-DD
        #[arg(short = 'x', long)]
        expires: String,

        /// Category label or alias (vegetable, fruit, legumes, dairy, meat,
        /// beverage, snack, other)
        #[arg(short, long, default_value = "vegetable")]
        category: String,
    },
    /// List items, soonest expiry first
    List {
        #[command(flatten)]
        filter: commands::FilterArgs,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Delete an item by ID
    Delete {
        /// Record ID as shown by `list`
        id: String,
    },
    /// Print the list on every change until Ctrl+C
    Watch {
        #[command(flatten)]
        filter: commands::FilterArgs,
    },
    /// Check PANTRY_PASSWORD against the password rules
    CheckPassword,
    /// Print the category labels
    Categories,
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry() -> Option<sentry::ClientInitGuard> {
    let dsn = smart_pantry_backend::config::sentry_dsn()?;

    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            attach_stacktrace: true,
            ..Default::default()
        },
    )))
}

/// Errors and warnings become Sentry events, info and debug become
/// breadcrumbs.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    let _sentry_guard = init_sentry();

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "pantry=info,smart_pantry_backend=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let credentials = Credentials {
        email: cli.email,
        password: cli.password,
    };

    match cli.command {
        Commands::Register { name } => commands::account::register(&credentials, name).await?,
        Commands::Login => commands::account::login(&credentials).await?,
        Commands::ResendVerification => {
            commands::account::resend_verification(&credentials).await?;
        }
        Commands::CheckPassword => commands::account::check_password(&credentials)?,
        Commands::Add {
            name,
            expires,
            category,
        } => commands::items::add(&credentials, name, &expires, &category).await?,
        Commands::List { filter, json } => {
            commands::items::list(&credentials, &filter, json).await?;
        }
        Commands::Delete { id } => commands::items::delete(&credentials, id).await?,
        Commands::Watch { filter } => commands::items::watch(&credentials, &filter).await?,
        Commands::Categories => commands::items::categories()?,
    }
    Ok(())
}
