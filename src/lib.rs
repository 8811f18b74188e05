//! Sumi-Harvest: a single-site article harvester
//!
//! This crate crawls one web site breadth-first up to a configurable depth,
//! keeping at most a fixed number of HTTP fetches in flight, and extracts
//! article fields from the pages it visits.

pub mod config;
pub mod crawler;
pub mod output;
pub mod url;

use thiserror::Error;

/// Main error type for Sumi-Harvest operations
///
/// Every variant ends the crawl. Transient server errors never surface here
/// until the shared error budget is spent.
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Transport error for {url}: {message}")]
    Transport { url: String, message: String },

    #[error("Client error for {url}: HTTP {status}")]
    ClientError { url: String, status: u16 },

    #[error("Server returned too many errors ({errors}), last was HTTP {status} for {url}")]
    ErrorBudgetExhausted { url: String, status: u16, errors: u32 },

    #[error("Failed to parse response body for {url}: {message}")]
    Parse { url: String, message: String },

    #[error("Output error: {0}")]
    Output(#[from] output::OutputError),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),
}

impl CrawlError {
    /// Returns true if the error came from the crawl policy rather than setup
    pub fn is_crawl_abort(&self) -> bool {
        matches!(
            self,
            Self::Transport { .. }
                | Self::ClientError { .. }
                | Self::ErrorBudgetExhausted { .. }
                | Self::Parse { .. }
        )
    }
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid selector '{selector}': {message}")]
    InvalidSelector { selector: String, message: String },
}

/// Result type alias for Sumi-Harvest operations
pub type Result<T> = std::result::Result<T, CrawlError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{run_crawl, Coordinator, FetchRequest, FetchResult, Scheduler};
pub use output::{Article, CrawlSummary};
