//! Crawler module for bounded-concurrency site crawling
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching
//! - HTML parsing, link and article extraction
//! - Request scheduling with a cap on in-flight fetches
//! - Overall crawl coordination and error policy

mod coordinator;
mod fetcher;
mod parser;
mod scheduler;

pub use coordinator::{run_crawl, Coordinator, CrawlCounters};
pub use fetcher::{
    build_http_client, user_agent_string, Fetch, FetchError, FetchedPage, HttpFetcher,
};
pub use parser::{Page, PageParser};
pub use scheduler::{FetchRequest, FetchResult, Scheduler};

use crate::config::Config;
use crate::output::build_sinks;
use crate::output::CrawlSummary;
use crate::CrawlError;

/// Runs a complete crawl with the sinks described by the configuration
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Open the configured article sinks
/// 2. Build the HTTP client
/// 3. Seed the scheduler with the base URL
/// 4. Fetch, parse and follow links until the frontier drains
/// 5. Return the crawl summary
///
/// # Arguments
///
/// * `config` - The crawler configuration
///
/// # Returns
///
/// * `Ok(CrawlSummary)` - Crawl completed successfully
/// * `Err(CrawlError)` - Crawl aborted
pub async fn crawl(config: Config) -> Result<CrawlSummary, CrawlError> {
    let sinks = build_sinks(&config.output)?;
    run_crawl(config, sinks).await
}
