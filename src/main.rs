//! Competitor-Scout main entry point
//!
//! This is the command-line interface for the Competitor-Scout discovery tool.

use clap::Parser;
use competitor_scout::config::{
    load_config_with_hash, resolve_api_key, Config, FIRECRAWL_API_KEY_ENV,
    GOOGLE_PLACES_API_KEY_ENV,
};
use competitor_scout::crawler::{CompetitorOrchestrator, DiscoveryOutcome};
use competitor_scout::output::{print_summary, write_report, ReportMeta};
use competitor_scout::places::GooglePlacesClient;
use competitor_scout::provider::{build_http_client, FirecrawlClient};
use competitor_scout::storage::{load_location, open_store, RunStatus, SqliteStore};
use competitor_scout::RateLimiter;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

/// Competitor-Scout: local competitor catalog discovery
///
/// Competitor-Scout finds the rental businesses operating in a location,
/// extracts the product catalogs from their websites, and stores the result
/// per location.
#[derive(Parser, Debug)]
#[command(name = "competitor-scout")]
#[command(version = "1.0.0")]
#[command(about = "Local competitor catalog discovery", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Location to search, e.g. "Austin, TX"
    #[arg(short, long, required_unless_present = "dry_run", value_parser = parse_location)]
    location: Option<String>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Print the discovery outcome as JSON instead of a summary
    #[arg(long)]
    json: bool,

    /// Do not write results or run records to the database
    #[arg(long)]
    no_persist: bool,

    /// Cancel the discovery after this many seconds, keeping partial results
    #[arg(long, value_name = "SECS")]
    timeout_secs: Option<u64>,

    /// Validate config and API keys without contacting any service
    #[arg(long, conflicts_with = "show_stored")]
    dry_run: bool,

    /// Print the stored result for the location and exit
    #[arg(long, conflicts_with = "dry_run")]
    show_stored: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = match load_config_with_hash(&cli.config) {
        Ok((cfg, hash)) => {
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            (cfg, hash)
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    if cli.dry_run {
        return handle_dry_run(&config);
    }

    let location = cli.location.clone().unwrap_or_default();
    if cli.show_stored {
        handle_show_stored(&config, &location, cli.json)
    } else {
        handle_discover(&cli, config, &config_hash, &location).await
    }
}

/// Trims the location and rejects blank values before any run is recorded
fn parse_location(raw: &str) -> Result<String, String> {
    let location = raw.trim();
    if location.is_empty() {
        return Err("location must not be empty".to_string());
    }
    Ok(location.to_string())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("competitor_scout=info,warn"),
            1 => EnvFilter::new("competitor_scout=debug,info"),
            2 => EnvFilter::new("competitor_scout=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Handles the --dry-run mode: validates config and API key availability
fn handle_dry_run(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Competitor-Scout Dry Run ===\n");

    let discovery = &config.discovery;
    println!("Discovery:");
    println!("  Search query: {}", discovery.search_query);
    println!(
        "  Max concurrent businesses: {}",
        discovery.max_concurrent_businesses
    );
    println!(
        "  Site map: limit {}, subdomains {}",
        discovery.map_limit, discovery.include_subdomains
    );
    println!(
        "  Crawl: limit {}, poll every {}ms, at most {} polls",
        discovery.crawl_limit, discovery.crawl_poll_interval_ms, discovery.crawl_max_polls
    );
    println!("  Max pages per site: {}", discovery.max_pages_per_site);
    println!("  Relevant keywords: {}", discovery.relevant_keywords.join(", "));

    println!("\nRate Limit:");
    println!(
        "  {} tokens, one every {}ms, wait up to {} intervals",
        config.rate_limit.capacity,
        config.rate_limit.refill_interval_ms,
        config.rate_limit.max_wait_attempts
    );

    println!("\nServices:");
    println!("  Crawl provider: {}", config.provider.base_url);
    println!("  Place search: {}", config.places.base_url);

    println!("\nOutput:");
    println!("  Database: {}", config.output.database_path);
    if let Some(report) = &config.output.report_path {
        println!("  Report: {}", report);
    }

    let keys = [
        (
            "Crawl provider",
            resolve_api_key(
                config.provider.api_key.as_deref(),
                "Firecrawl",
                FIRECRAWL_API_KEY_ENV,
            ),
        ),
        (
            "Place search",
            resolve_api_key(
                config.places.api_key.as_deref(),
                "Google Places",
                GOOGLE_PLACES_API_KEY_ENV,
            ),
        ),
    ];

    println!("\n✓ Configuration is valid");
    let mut missing = 0;
    for (service, key) in keys {
        match key {
            Ok(_) => println!("✓ {} API key found", service),
            Err(e) => {
                println!("✗ {}", e);
                missing += 1;
            }
        }
    }

    if missing > 0 {
        return Err(format!("{} API key(s) missing", missing).into());
    }
    Ok(())
}

/// Handles the --show-stored mode: prints the persisted result of a location
fn handle_show_stored(
    config: &Config,
    location: &str,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let store = open_store(Path::new(&config.output.database_path))?;
    let Some(stored) = load_location(&store, location)? else {
        println!("No stored result for {}", location);
        return Ok(());
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&stored)?);
        return Ok(());
    }

    println!("Database: {}\n", config.output.database_path);
    if let Some(run) = store.get_latest_run(location)? {
        println!(
            "Last run: {} ({}, started {})",
            run.id,
            run.status.to_db_string(),
            run.started_at
        );
    }
    let records = store.count_records(&format!("{}/", stored.name))?;
    println!(
        "{}: {} competitors ({} stored records)",
        stored.name,
        stored.competitors.len(),
        records
    );
    for competitor in &stored.competitors {
        println!(
            "  - {} ({} products) {}",
            competitor.name,
            competitor.products.len(),
            competitor.website
        );
    }

    Ok(())
}

/// Handles the main discovery operation
async fn handle_discover(
    cli: &Cli,
    config: Config,
    config_hash: &str,
    location: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let client = build_http_client(&config.user_agent)?;
    let provider = FirecrawlClient::from_config(&config.provider, client.clone())?;
    let places = GooglePlacesClient::from_config(&config.places, client)?;
    let limiter = Arc::new(RateLimiter::from_config(&config.rate_limit));

    let mut orchestrator =
        CompetitorOrchestrator::new(&config, Arc::new(places), Arc::new(provider), limiter);

    let store = if cli.no_persist {
        None
    } else {
        let store = Arc::new(open_store(Path::new(&config.output.database_path))?);
        orchestrator = orchestrator.with_store(store.clone());
        Some(store)
    };

    let run_id = match &store {
        Some(store) => Some(store.create_run(location, config_hash)?),
        None => None,
    };

    let cancel = CancellationToken::new();
    spawn_cancel_triggers(&cancel, cli.timeout_secs);

    let outcome = orchestrator.discover_detailed(location, cancel).await;

    if let (Some(store), Some(run_id)) = (&store, run_id) {
        record_run_end(store, run_id, &outcome);
    }

    let outcome = match outcome {
        Ok(outcome) => outcome,
        Err(e) => {
            tracing::error!("Discovery failed: {}", e);
            return Err(e.into());
        }
    };

    if let Some(path) = &config.output.report_path {
        let meta = ReportMeta::now(Some(config_hash.to_string()));
        match write_report(&outcome, &meta, Path::new(path)) {
            Ok(()) => tracing::info!("Report written to {}", path),
            Err(e) => tracing::warn!("Failed to write report to {}: {}", path, e),
        }
    }

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else if !cli.quiet {
        print_summary(&outcome);
    }

    Ok(())
}

/// Cancels the discovery on Ctrl-C or after the optional timeout
fn spawn_cancel_triggers(cancel: &CancellationToken, timeout_secs: Option<u64>) {
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, cancelling discovery");
            on_interrupt.cancel();
        }
    });

    if let Some(secs) = timeout_secs {
        let on_timeout = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(secs)).await;
            tracing::warn!("Timeout of {}s reached, cancelling discovery", secs);
            on_timeout.cancel();
        });
    }
}

fn record_run_end(
    store: &SqliteStore,
    run_id: i64,
    outcome: &Result<DiscoveryOutcome, competitor_scout::ScoutError>,
) {
    let (status, found) = match outcome {
        Ok(o) if o.cancelled => (RunStatus::Cancelled, Some(o.result.total_found)),
        Ok(o) => (RunStatus::Completed, Some(o.result.total_found)),
        Err(competitor_scout::ScoutError::Cancelled) => (RunStatus::Cancelled, None),
        Err(_) => (RunStatus::Failed, None),
    };

    if let Err(e) = store.finish_run(run_id, status, found) {
        tracing::warn!("Failed to record end of run {}: {}", run_id, e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_is_trimmed() {
        let cli =
            Cli::try_parse_from(["competitor-scout", "scout.toml", "-l", "  Austin, TX "]).unwrap();
        assert_eq!(cli.location.as_deref(), Some("Austin, TX"));
    }

    #[test]
    fn test_blank_location_is_rejected_before_any_run() {
        for blank in ["", "   "] {
            let result =
                Cli::try_parse_from(["competitor-scout", "scout.toml", "--location", blank]);
            assert!(result.is_err());
        }
    }

    #[test]
    fn test_location_required_unless_dry_run() {
        assert!(Cli::try_parse_from(["competitor-scout", "scout.toml"]).is_err());
        assert!(Cli::try_parse_from(["competitor-scout", "scout.toml", "--dry-run"]).is_ok());
    }
}
