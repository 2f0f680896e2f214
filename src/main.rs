//! Silene main entry point
//!
//! This is the command-line interface for the Silene crawler.

use anyhow::Context;
use clap::Parser;
use silene::config::{load_config_with_hash, Config};
use silene::{Crawler, HttpBrowser};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Silene: a browser-driven web crawler
///
/// Silene crawls the seed requests of a TOML configuration, probing every URL
/// with HEAD before fetching it with GET so redirects surface as their own
/// events, and filters duplicate and off-site requests.
#[derive(Parser, Debug)]
#[command(name = "silene")]
#[command(version)]
#[command(about = "A browser-driven web crawler", long_about = None)]
struct Cli {
    /// TOML file with the seeds, frontier filters and browser settings
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// More log output; repeat for debug and trace
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Print the validated configuration and seeds, then exit
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("Failed to load configuration {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", hash);

    if cli.dry_run {
        handle_dry_run(&config)
    } else {
        handle_crawl(&config).await
    }
}

/// Installs the tracing subscriber for the requested verbosity
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("silene=info,warn"),
            1 => EnvFilter::new("silene=debug,info"),
            2 => EnvFilter::new("silene=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Prints the crawl policy the configuration resolves to
fn handle_dry_run(config: &Config) -> anyhow::Result<()> {
    let configuration = config.crawler_configuration()?;

    println!("=== Silene Dry Run ===\n");

    println!("Frontier:");
    println!(
        "  Filter duplicate requests: {}",
        configuration.filter_duplicate_requests()
    );
    println!(
        "  Filter off-site requests: {}",
        configuration.filter_offsite_requests()
    );

    println!("\nAllowed Domains ({}):", configuration.allowed_domains().len());
    for domain in configuration.allowed_domains() {
        println!("  - {}", domain);
    }

    println!("\nBrowser:");
    println!("  User agent: {}", config.browser.user_agent);
    println!(
        "  Navigation timeout: {}ms",
        config.browser.navigation_timeout_ms
    );

    println!("\nSeeds ({}):", configuration.seed_requests().len());
    for seed in configuration.seed_requests() {
        println!("  - {}", seed);
    }

    println!("\nConfiguration OK");
    Ok(())
}

/// Crawls the configured seeds with the HTTP browser and logging hooks
async fn handle_crawl(config: &Config) -> anyhow::Result<()> {
    let configuration = config.crawler_configuration()?;
    tracing::info!(
        "Seed requests: {}, allowed domains: {}",
        configuration.seed_requests().len(),
        configuration.allowed_domains().len()
    );

    let browser = HttpBrowser::new(config.browser_settings());
    let mut crawler = Crawler::new(configuration, Box::new(browser));

    // Ctrl-C requests a stop; the fetch cycle in flight still completes
    let stop = crawler.stop_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, stopping after the current request");
            stop.stop();
        }
    });

    match crawler.start().await {
        Ok(()) => {
            tracing::info!(
                "Crawl completed, {} requests left in the frontier",
                crawler.frontier().len()
            );
            Ok(())
        }
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            Err(e.into())
        }
    }
}
