//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the main crawl loop. The coordinator is both the
//! producer and the consumer of the scheduler:
//! - Seeding the scheduler with the base URL
//! - Draining completed fetches and classifying them
//! - Retrying server errors against a run-wide error budget
//! - Discovering, deduplicating and enqueueing site links
//! - Extracting articles and handing them to the sinks
//!
//! All crawl state lives in the coordinator and is only touched by the task
//! that runs [`Coordinator::run`].

use crate::config::Config;
use crate::crawler::fetcher::{build_http_client, Fetch, FetchError, FetchedPage, HttpFetcher};
use crate::crawler::parser::PageParser;
use crate::crawler::scheduler::{FetchRequest, FetchResult, Scheduler};
use crate::output::{Article, ArticleSink, CrawlSummary};
use crate::url::{parse_base_url, resolve_site_link};
use crate::CrawlError;
use chrono::Utc;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};
use url::Url;

/// Counters owned by the coordinator for one run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CrawlCounters {
    /// Pages classified as articles
    pub total_articles: u64,

    /// Non-200, non-4xx responses seen so far; never decreases
    pub current_errors: u32,

    /// Results received from the scheduler
    pub pages_fetched: u64,

    /// Requests re-enqueued after a server error
    pub retries: u32,
}

/// Main crawler coordinator structure
pub struct Coordinator {
    config: Config,
    base_url: Url,
    scheduler: Scheduler,
    parser: PageParser,
    sinks: Vec<Box<dyn ArticleSink>>,
    visited: HashSet<String>,
    counters: CrawlCounters,
}

impl Coordinator {
    /// Creates a coordinator that fetches over HTTP
    ///
    /// # Arguments
    ///
    /// * `config` - The crawler configuration
    /// * `sinks` - Receivers for extracted articles
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Successfully created coordinator
    /// * `Err(CrawlError)` - Bad base URL, selector, or HTTP client setup
    pub fn new(config: Config, sinks: Vec<Box<dyn ArticleSink>>) -> Result<Self, CrawlError> {
        let timeout = config.crawler.request_timeout_secs.map(Duration::from_secs);
        let client = build_http_client(&config.user_agent, timeout)?;
        Self::with_fetcher(config, Arc::new(HttpFetcher::new(client)), sinks)
    }

    /// Creates a coordinator with a custom fetcher
    pub fn with_fetcher(
        config: Config,
        fetcher: Arc<dyn Fetch>,
        sinks: Vec<Box<dyn ArticleSink>>,
    ) -> Result<Self, CrawlError> {
        let base_url = parse_base_url(&config.crawler.base_url)?;
        let parser = PageParser::new(&config.selectors)?;
        let scheduler = Scheduler::new(fetcher, config.crawler.max_calls);

        Ok(Self {
            config,
            base_url,
            scheduler,
            parser,
            sinks,
            visited: HashSet::new(),
            counters: CrawlCounters::default(),
        })
    }

    /// Runs the crawl until the scheduler drains or a fatal condition occurs
    ///
    /// On a fatal condition the error is returned immediately; jobs still in
    /// flight are abandoned when the coordinator is dropped.
    pub async fn run(&mut self) -> Result<CrawlSummary, CrawlError> {
        let started_at = Utc::now();
        let start_time = Instant::now();

        tracing::info!(
            "Starting crawl of {} (max calls: {}, max depth: {}, max errors: {})",
            self.base_url,
            self.config.crawler.max_calls,
            self.config.crawler.max_depth,
            self.config.crawler.max_errors
        );

        self.seed();

        while let Some(result) = self.scheduler.next().await {
            self.counters.pages_fetched += 1;
            self.handle_result(result)?;

            if self.counters.pages_fetched % 10 == 0 {
                let elapsed = start_time.elapsed();
                let rate = self.counters.pages_fetched as f64 / elapsed.as_secs_f64();
                tracing::info!(
                    "Progress: {} pages, {} articles, {} active, {} queued, {:.2} pages/sec",
                    self.counters.pages_fetched,
                    self.counters.total_articles,
                    self.scheduler.active_len(),
                    self.scheduler.pending_len(),
                    rate
                );
            }
        }

        let summary = CrawlSummary {
            base_url: self.base_url.to_string(),
            started_at,
            finished_at: Utc::now(),
            pages_fetched: self.counters.pages_fetched,
            total_articles: self.counters.total_articles,
            server_errors: self.counters.current_errors,
            retries: self.counters.retries,
            urls_discovered: self.visited.len(),
        };

        for sink in &mut self.sinks {
            sink.finish(&summary)?;
        }

        tracing::info!(
            "Crawl completed: {} articles from {} pages in {}s",
            summary.total_articles,
            summary.pages_fetched,
            summary.duration_seconds()
        );

        Ok(summary)
    }

    /// Enqueues the base URL at depth 0 and marks it visited
    fn seed(&mut self) {
        let seed = self.base_url.to_string();
        self.visited.insert(seed.clone());
        self.scheduler.enqueue(FetchRequest::new(seed, 0));
    }

    /// Classifies one completed fetch and acts on it
    ///
    /// The result, body included, is consumed here on every path.
    fn handle_result(&mut self, result: FetchResult) -> Result<(), CrawlError> {
        let FetchResult { request, outcome } = result;

        let page = match outcome {
            Ok(page) => page,
            Err(FetchError::Body(message)) => {
                return Err(CrawlError::Parse {
                    url: request.url,
                    message,
                });
            }
            Err(e) => {
                return Err(CrawlError::Transport {
                    url: request.url,
                    message: e.to_string(),
                });
            }
        };

        tracing::debug!(
            "HTTP {} for {} (depth {})",
            page.status,
            request.url,
            request.depth
        );

        match page.status {
            200 => self.process_page(&request, &page),
            400..=499 => Err(CrawlError::ClientError {
                url: request.url,
                status: page.status,
            }),
            status => self.retry(request, status),
        }
    }

    /// Charges a server error to the budget and re-enqueues the request
    ///
    /// The response is not parsed; only the retried fetch can contribute
    /// links or an article.
    fn retry(&mut self, request: FetchRequest, status: u16) -> Result<(), CrawlError> {
        self.counters.current_errors += 1;

        if self.counters.current_errors >= self.config.crawler.max_errors {
            return Err(CrawlError::ErrorBudgetExhausted {
                url: request.url,
                status,
                errors: self.counters.current_errors,
            });
        }

        tracing::warn!(
            "HTTP {} for {}, retrying ({}/{} errors)",
            status,
            request.url,
            self.counters.current_errors,
            self.config.crawler.max_errors
        );

        self.counters.retries += 1;
        self.scheduler.enqueue(request);
        Ok(())
    }

    /// Discovers links and extracts the article from a 200 response
    fn process_page(
        &mut self,
        request: &FetchRequest,
        page: &FetchedPage,
    ) -> Result<(), CrawlError> {
        let (links, article) = {
            let document = self.parser.parse(&page.body);

            let links = if request.depth < self.config.crawler.max_depth {
                document.find_links()
            } else {
                Vec::new()
            };

            let article = document.is_article_page().then(|| Article {
                url: request.url.clone(),
                depth: request.depth,
                date: document.date(),
                title: document.title(),
                summary: document.summary(),
                body: document.body_text(),
            });

            (links, article)
        };

        let discovered = self.discover_links(&links, request.depth + 1);
        if discovered > 0 {
            tracing::debug!("Discovered {} new links on {}", discovered, request.url);
        }

        if let Some(article) = article {
            self.emit_article(&article)?;
        }

        Ok(())
    }

    /// Enqueues every unseen site link at the given depth
    ///
    /// Returns the number of requests enqueued.
    fn discover_links(&mut self, links: &[String], depth: u32) -> usize {
        let mut enqueued = 0;

        for href in links {
            let Some(url) = resolve_site_link(&self.base_url, href) else {
                continue;
            };

            if !self.visited.insert(url.clone()) {
                continue;
            }

            self.scheduler.enqueue(FetchRequest::new(url, depth));
            enqueued += 1;
        }

        enqueued
    }

    /// Hands an article to every sink, then counts it
    ///
    /// A failing sink ends the crawl; the article is not counted.
    fn emit_article(&mut self, article: &Article) -> Result<(), CrawlError> {
        for sink in &mut self.sinks {
            sink.record_article(article)?;
        }

        self.counters.total_articles += 1;
        tracing::debug!(
            "[{}] Article {}",
            self.counters.total_articles,
            article.url
        );
        Ok(())
    }

    /// Returns the counters accumulated so far
    pub fn counters(&self) -> CrawlCounters {
        self.counters
    }

    /// Returns true if the URL has been enqueued during this run
    pub fn has_visited(&self, url: &str) -> bool {
        self.visited.contains(url)
    }

    /// Returns the number of distinct URLs enqueued during this run
    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }
}

/// Runs the main crawl operation with HTTP fetching
///
/// # Arguments
///
/// * `config` - The crawler configuration
/// * `sinks` - Receivers for extracted articles
///
/// # Returns
///
/// * `Ok(CrawlSummary)` - The crawl drained normally
/// * `Err(CrawlError)` - The crawl aborted; the error names the cause
///
/// # Example
///
/// ```no_run
/// use sumi_harvest::config::Config;
/// use sumi_harvest::crawler::run_crawl;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let summary = run_crawl(Config::default(), Vec::new()).await?;
/// println!("{} articles", summary.total_articles);
/// # Ok(())
/// # }
/// ```
pub async fn run_crawl(
    config: Config,
    sinks: Vec<Box<dyn ArticleSink>>,
) -> Result<CrawlSummary, CrawlError> {
    let mut coordinator = Coordinator::new(config, sinks)?;
    coordinator.run().await
}
