//! Sumi-Gather main entry point
//!
//! This is the command-line interface for the Sumi-Gather image harvester.

use anyhow::Context;
use clap::Parser;
use std::io::{BufRead, Write};
use std::path::PathBuf;
use sumi_gather::config::{load_config, parse_seed_url, validate, Config};
use sumi_gather::crawler::crawl;
use sumi_gather::output::print_summary;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

/// Sumi-Gather: a same-site image harvester
///
/// Sumi-Gather walks a website breadth-first from a seed URL, never leaving
/// the seed's host, and downloads every image the visited pages reference.
/// Images already present in the output folder are not fetched again.
#[derive(Parser, Debug)]
#[command(name = "sumi-gather")]
#[command(version)]
#[command(about = "A same-site image harvester", long_about = None)]
struct Cli {
    /// Seed URL to start from (prompted for when omitted)
    #[arg(value_name = "URL")]
    seed: Option<String>,

    /// Path to a TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Folder to save images into
    #[arg(short, long, value_name = "DIR")]
    output: Option<PathBuf>,

    /// Maximum number of pages to visit
    #[arg(long, value_name = "N")]
    max_pages: Option<usize>,

    /// Maximum number of concurrent image downloads
    #[arg(long, value_name = "N")]
    max_workers: Option<usize>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate settings and show what would be crawled without crawling
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let config = build_config(&cli)?;

    let seed_input = match &cli.seed {
        Some(seed) => seed.clone(),
        None => prompt_for_seed()?,
    };
    let seed = parse_seed_url(&seed_input)?;

    if cli.dry_run {
        handle_dry_run(&seed, &config);
        return Ok(());
    }

    let cancel = CancellationToken::new();
    spawn_interrupt_handler(cancel.clone());

    tracing::info!(
        "Saving images from {} into {}",
        seed,
        config.output.folder.display()
    );

    let summary = crawl(&seed, &config, cancel).await.map_err(|e| {
        tracing::error!("Crawl could not start: {}", e);
        e
    })?;

    print_summary(&summary);
    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("sumi_gather=info,warn"),
            1 => EnvFilter::new("sumi_gather=debug,info"),
            2 => EnvFilter::new("sumi_gather=trace,debug"),
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

/// Loads the config file if given, then applies command-line overrides
fn build_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            load_config(path)
                .with_context(|| format!("Failed to load configuration {}", path.display()))?
        }
        None => Config::default(),
    };

    if let Some(output) = &cli.output {
        config.output.folder = output.clone();
    }
    if let Some(max_pages) = cli.max_pages {
        config.crawler.max_pages = max_pages;
    }
    if let Some(max_workers) = cli.max_workers {
        config.crawler.max_workers = max_workers;
    }

    validate(&config).context("Invalid settings")?;
    Ok(config)
}

/// Asks the operator for the seed URL on stdin
fn prompt_for_seed() -> anyhow::Result<String> {
    print!("Enter website URL: ");
    std::io::stdout().flush()?;

    let mut line = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut line)
        .context("Failed to read seed URL")?;
    Ok(line.trim().to_string())
}

/// Cancels the crawl on Ctrl-C so in-flight downloads stop promptly
fn spawn_interrupt_handler(cancel: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, finishing up");
            cancel.cancel();
        }
    });
}

/// Handles the --dry-run mode: shows the effective settings
fn handle_dry_run(seed: &url::Url, config: &Config) {
    println!("=== Sumi-Gather Dry Run ===\n");

    println!("Seed: {}", seed);
    println!(
        "  Host scope: {}",
        sumi_gather::extract_host(seed).unwrap_or_default()
    );

    println!("\nCrawler Configuration:");
    println!("  Max pages: {}", config.crawler.max_pages);
    println!("  Max workers: {}", config.crawler.max_workers);

    println!("\nHTTP:");
    println!("  User agent: {}", config.http.user_agent);
    println!("  Page timeout: {}s", config.http.page_timeout_secs);
    println!("  Image timeout: {}s", config.http.image_timeout_secs);
    println!("  Connect timeout: {}s", config.http.connect_timeout_secs);

    println!("\nOutput:");
    println!("  Folder: {}", config.output.folder.display());

    println!("\n✓ Settings are valid");
}
