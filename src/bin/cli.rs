//! stove-notify CLI
//!
//! Single-pass entry point meant to be started by cron or a systemd timer.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use stove_notify::{
    error::Result,
    logging,
    models::Config,
    pipeline,
    services::{StoveFetcher, WebhookSender},
    storage::{LocalSeenStore, SeenStore},
};

/// stove-notify - Free game notifier for the STOVE store
#[derive(Parser, Debug)]
#[command(name = "stove-notify", version, about = "Free game notifier for the STOVE store")]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "config.toml", global = true)]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch free games, record them and notify about new ones
    Scan,

    /// Validate the configuration file
    Validate,

    /// Show what the seen-games table currently holds
    Info,
}

async fn scan(config: &Config) -> Result<()> {
    let fetcher = StoveFetcher::new(config.api.clone())?;
    let store = LocalSeenStore::new(&config.storage.seen_games_file);
    let sender = WebhookSender::new(&config.notification)?;

    let report = pipeline::run_scan(config, &fetcher, &store, &sender).await?;

    log::info!(
        "Summary: {} fetched, {} new, {} updated, {} removed, {} flagged, {} tracked",
        report.fetched,
        report.new_count,
        report.updated_count,
        report.removed_count,
        report.flagged_count,
        report.tracked
    );

    Ok(())
}

fn validate(config: &Config) {
    println!("✓ Config OK");
    println!("    API endpoint: {}", config.api.base_url);
    println!(
        "    Seen-games table: {}",
        config.storage.seen_games_file.display()
    );
    println!(
        "    Disappeared games: {}",
        match (
            config.storage.remove_disappeared_games,
            config.storage.renotify_returned_games
        ) {
            (false, _) => "kept",
            (true, false) => "removed",
            (true, true) => "flagged",
        }
    );
    println!(
        "    Delay between notifications: {}s",
        config.notification.delay_between_sends
    );
}

async fn info(config: &Config) -> Result<()> {
    let store = LocalSeenStore::new(&config.storage.seen_games_file);
    let games = store.load().await?;

    println!("Seen-games table: {}", store.location());
    println!("    Tracked games: {}", games.len());
    println!(
        "    Ever removed: {}",
        games.values().filter(|r| r.ever_removed).count()
    );

    if let Some((id, record)) = games.iter().max_by_key(|(_, r)| r.first_seen) {
        let when = chrono::DateTime::from_timestamp(record.first_seen, 0)
            .map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
            .unwrap_or_else(|| record.first_seen.to_string());
        println!(
            "    Latest discovery: {} ({id}) at {when}",
            record.product_name
        );
    }

    Ok(())
}

/// Main entry point for the CLI application.
#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match Config::load(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
    };

    let result = match cli.command {
        Command::Scan => {
            logging::init(&config.logging, cli.verbose);
            scan(&config).await
        }
        Command::Validate => {
            validate(&config);
            Ok(())
        }
        Command::Info => info(&config).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
