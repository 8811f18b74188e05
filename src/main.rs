//! Sumi-Harvest main entry point
//!
//! This is the command-line interface for the Sumi-Harvest article crawler.

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use sumi_harvest::config::{parse_config_with_hash, validate, Config};
use sumi_harvest::crawler::crawl;
use sumi_harvest::output::print_summary;
use tracing_subscriber::EnvFilter;

/// Sumi-Harvest: a single-site article harvester
///
/// Sumi-Harvest crawls one site breadth-first, keeping a fixed number of
/// requests in flight, and prints every article page it finds.
#[derive(Parser, Debug)]
#[command(name = "sumi-harvest")]
#[command(version)]
#[command(about = "A single-site article harvester", long_about = None)]
struct Cli {
    /// Number of parallel calls (default 1)
    #[arg(short = 'p', long = "parallel", value_name = "N")]
    parallel: Option<usize>,

    /// Max depth to crawl (default 1)
    #[arg(short = 'd', long = "depth", value_name = "N")]
    depth: Option<u32>,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Site root to crawl
    #[arg(long, value_name = "URL")]
    base_url: Option<String>,

    /// Server errors tolerated before aborting
    #[arg(long, value_name = "N")]
    max_errors: Option<u32>,

    /// Export articles to this SQLite database
    #[arg(long, value_name = "PATH")]
    database: Option<String>,

    /// Do not print articles, only the final count
    #[arg(long)]
    quiet_articles: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be crawled without crawling
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let config = match load_effective_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Failed to load configuration: {:#}", e);
            return ExitCode::FAILURE;
        }
    };

    if cli.dry_run {
        handle_dry_run(&config);
        return ExitCode::SUCCESS;
    }

    match crawl(config).await {
        Ok(summary) => {
            print_summary(&summary);
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!("Crawl aborted: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("sumi_harvest=info,warn"),
            1 => EnvFilter::new("sumi_harvest=debug,info"),
            2 => EnvFilter::new("sumi_harvest=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    // Logs go to stderr so stdout carries only articles and the summary
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Loads the config file (if any), applies CLI overrides and validates the result
fn load_effective_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = parse_config_with_hash(path)
                .with_context(|| format!("reading {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => Config::default(),
    };

    if let Some(parallel) = cli.parallel {
        config.crawler.max_calls = parallel;
    }
    if let Some(depth) = cli.depth {
        config.crawler.max_depth = depth;
    }
    if let Some(base_url) = &cli.base_url {
        config.crawler.base_url = base_url.clone();
    }
    if let Some(max_errors) = cli.max_errors {
        config.crawler.max_errors = max_errors;
    }
    if let Some(database) = &cli.database {
        config.output.database_path = Some(database.clone());
    }
    if cli.quiet_articles {
        config.output.print_articles = false;
    }

    validate(&config).context("invalid settings")?;
    Ok(config)
}

/// Handles the --dry-run mode: shows the effective configuration
fn handle_dry_run(config: &Config) {
    println!("=== Sumi-Harvest Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Base URL: {}", config.crawler.base_url);
    println!("  Parallel calls: {}", config.crawler.max_calls);
    println!("  Max depth: {}", config.crawler.max_depth);
    println!("  Max errors: {}", config.crawler.max_errors);
    match config.crawler.request_timeout_secs {
        Some(secs) => println!("  Request timeout: {}s", secs),
        None => println!("  Request timeout: none"),
    }

    println!("\nUser Agent:");
    println!(
        "  {}",
        sumi_harvest::crawler::user_agent_string(&config.user_agent)
    );

    println!("\nSelectors:");
    println!("  Article page: {}", config.selectors.article_page);
    println!("  Date: {}", config.selectors.date);
    println!("  Title: {}", config.selectors.title);
    println!("  Summary: {}", config.selectors.summary);
    println!("  Body: {}", config.selectors.body);

    println!("\nOutput:");
    println!("  Print articles: {}", config.output.print_articles);
    match &config.output.database_path {
        Some(path) => println!("  Database: {}", path),
        None => println!("  Database: none"),
    }

    println!("\n✓ Configuration is valid");
}
