//! Output sink traits and types
//!
//! This module defines the trait interface for article sinks and the data
//! structures they receive.

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Fields extracted from a page classified as an article
///
/// Missing fields are empty strings, never absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Article {
    /// The page URL
    pub url: String,

    /// BFS depth the page was found at
    pub depth: u32,

    /// Publish date as printed on the page
    pub date: String,

    pub title: String,

    pub summary: String,

    /// Concatenated body paragraphs
    pub body: String,
}

/// Summary statistics for a finished crawl
#[derive(Debug, Clone)]
pub struct CrawlSummary {
    /// The site root the crawl started from
    pub base_url: String,

    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,

    /// Results received from the scheduler, retries included
    pub pages_fetched: u64,

    /// Pages classified as articles
    pub total_articles: u64,

    /// Non-200, non-4xx responses seen
    pub server_errors: u32,

    /// Requests re-enqueued after a server error
    pub retries: u32,

    /// Distinct URLs ever enqueued, seed included
    pub urls_discovered: usize,
}

impl CrawlSummary {
    /// Returns the wall-clock duration of the crawl in seconds
    pub fn duration_seconds(&self) -> i64 {
        (self.finished_at - self.started_at).num_seconds()
    }
}

/// Trait for article sinks
///
/// Sinks receive each article as soon as it is extracted, then one final
/// call with the crawl summary when the crawl drains normally.
pub trait ArticleSink: Send {
    /// Records one extracted article
    fn record_article(&mut self, article: &Article) -> OutputResult<()>;

    /// Called once after a successful crawl
    fn finish(&mut self, _summary: &CrawlSummary) -> OutputResult<()> {
        Ok(())
    }
}
