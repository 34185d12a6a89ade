use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::info;

use nikah_match::config::AppConfig;
use nikah_match::logging::init_from_config;
use nikah_match::models::{MessageKind, Profile};
use nikah_match::{Database, MatchService, SqliteRepository};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Override the configured database URL (sqlite:PATH)
    #[arg(long, global = true)]
    database: Option<String>,

    /// Override the configured log level
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Import profiles from a JSON array
    Import {
        /// Path to the JSON file
        file: PathBuf,
    },
    /// Show one profile
    Profile {
        /// Wallet address
        #[arg(short, long)]
        key: String,
    },
    /// Rank potential matches for a profile
    Matches {
        /// Wallet address of the requester
        #[arg(short, long)]
        key: String,

        /// Number of matches to return
        #[arg(short, long)]
        limit: Option<usize>,
    },
    /// Record a message between two profiles
    Message {
        /// Sender wallet address
        #[arg(long)]
        from: String,

        /// Recipient wallet address
        #[arg(long)]
        to: String,

        /// Message kind (text, audio or video)
        #[arg(long, default_value = "text")]
        kind: String,

        /// Inline text content
        #[arg(long)]
        content: Option<String>,

        /// Media URL for audio/video messages
        #[arg(long)]
        url: Option<String>,
    },
    /// Record a profile view
    View {
        /// Viewer wallet address
        #[arg(long)]
        from: String,

        /// Viewed wallet address
        #[arg(long)]
        to: String,
    },
    /// List everyone who messaged a profile
    Inbox {
        /// Wallet address
        #[arg(short, long)]
        key: String,
    },
    /// List everyone a profile has messaged
    Outbox {
        /// Wallet address
        #[arg(short, long)]
        key: String,
    },
    /// Deactivate a profile
    Deactivate {
        /// Wallet address
        #[arg(short, long)]
        key: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let mut config = AppConfig::load()?;
    config.resolve_database_url(cli.database.clone())?;

    let level = cli.log_level.clone().unwrap_or_else(|| config.get_log_level());
    let _log_guard = init_from_config(&config.logging, Some(&level))?;

    info!("Starting nikah-match");

    let database = Database::with_config(&config.database)
        .with_context(|| format!("Failed to open database {}", config.database.url))?;
    let service = MatchService::with_store(Arc::new(SqliteRepository::new(database)), config.matching.clone());

    match cli.command {
        Commands::Import { file } => import_profiles(&service, &file).await?,
        Commands::Profile { key } => print_json(&service.get_profile(&key).await?)?,
        Commands::Matches { key, limit } => {
            let matches = service.get_potential_matches(&key, limit).await?;
            info!("Found {} potential matches", matches.len());
            print_json(&matches)?;
        },
        Commands::Message { from, to, kind, content, url } => {
            let kind: MessageKind = kind.parse()?;
            print_json(&service.record_message(&from, &to, kind, content, url).await?)?;
        },
        Commands::View { from, to } => print_json(&service.record_profile_view(&from, &to).await?)?,
        Commands::Inbox { key } => print_json(&service.get_users_who_messaged_me(&key).await?)?,
        Commands::Outbox { key } => print_json(&service.get_users_i_messaged(&key).await?)?,
        Commands::Deactivate { key } => print_json(&service.deactivate_profile(&key).await?)?,
    }

    Ok(())
}

/// Import profiles from a JSON file
async fn import_profiles(service: &MatchService, file: &Path) -> Result<()> {
    let raw = std::fs::read_to_string(file).with_context(|| format!("Failed to read {}", file.display()))?;
    let profiles: Vec<Profile> =
        serde_json::from_str(&raw).with_context(|| format!("Failed to parse profiles from {}", file.display()))?;

    let total = profiles.len();
    for profile in profiles {
        let key = profile.wallet_address.clone();
        service
            .save_profile(profile)
            .await
            .with_context(|| format!("Failed to import profile {key}"))?;
    }

    info!("Imported {} profiles", total);
    Ok(())
}

#[allow(clippy::print_stdout)]
fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
