//! HTTP fetcher implementation
//!
//! This module is the network side of an active job:
//! - Building the HTTP client with a proper user agent string
//! - GET requests returning the status code and body text
//! - Transport error reporting
//!
//! The fetcher performs no classification of status codes; a 503 is as much
//! a successful fetch as a 200. Deciding what a status means is the
//! coordinator's job.

use crate::config::UserAgentConfig;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use thiserror::Error;

/// A response that made it back from the server
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedPage {
    /// HTTP status code
    pub status: u16,

    /// Response body
    pub body: String,
}

/// Errors a fetch can produce before a usable response exists
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    /// Connection, DNS, TLS or timeout failure before any response
    #[error("{0}")]
    Transport(String),

    /// The response started but its body could not be read
    #[error("failed to read body: {0}")]
    Body(String),

    /// The fetch task panicked or was cancelled
    #[error("fetch task aborted: {0}")]
    Aborted(String),
}

/// Something that can retrieve a page
///
/// Implemented by [`HttpFetcher`] for real crawls and by in-memory fakes in tests.
#[async_trait]
pub trait Fetch: Send + Sync + 'static {
    async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError>;
}

/// Fetcher backed by a shared `reqwest` client
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Fetch for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::Transport(describe_transport_error(&e)))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| FetchError::Body(e.to_string()))?;

        Ok(FetchedPage { status, body })
    }
}

/// Formats the user agent string
///
/// Format: `CrawlerName/Version` or `CrawlerName/Version (+ContactURL)`
pub fn user_agent_string(config: &UserAgentConfig) -> String {
    match &config.contact_url {
        Some(contact_url) => format!(
            "{}/{} (+{})",
            config.crawler_name, config.crawler_version, contact_url
        ),
        None => format!("{}/{}", config.crawler_name, config.crawler_version),
    }
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The user agent configuration
/// * `timeout` - Optional whole-request timeout; `None` lets a hung request
///   hold its slot indefinitely
///
/// # Example
///
/// ```no_run
/// use sumi_harvest::config::UserAgentConfig;
/// use sumi_harvest::crawler::build_http_client;
///
/// let client = build_http_client(&UserAgentConfig::default(), None).unwrap();
/// ```
pub fn build_http_client(
    config: &UserAgentConfig,
    timeout: Option<Duration>,
) -> Result<Client, reqwest::Error> {
    let mut builder = Client::builder()
        .user_agent(user_agent_string(config))
        .gzip(true)
        .brotli(true);

    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }

    builder.build()
}

/// Produces a short description of a transport failure
fn describe_transport_error(error: &reqwest::Error) -> String {
    if error.is_timeout() {
        format!("Request timeout: {}", error)
    } else if error.is_connect() {
        format!("Connection failed: {}", error)
    } else {
        error.to_string()
    }
}
