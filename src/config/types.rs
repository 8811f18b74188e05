use serde::Deserialize;

/// Main configuration structure for Sumi-Harvest
///
/// Every section and key has a default, so an empty file is a valid
/// configuration that crawls the default site with one fetch at a time.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent", default)]
    pub user_agent: UserAgentConfig,
    #[serde(default)]
    pub selectors: SelectorConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Site root; the seed URL and the base for every discovered link
    #[serde(rename = "base-url", default = "default_base_url")]
    pub base_url: String,

    /// Maximum number of fetches in flight at once
    #[serde(rename = "max-calls", default = "default_max_calls")]
    pub max_calls: usize,

    /// Maximum BFS depth; links are only followed from pages shallower than this
    #[serde(rename = "max-depth", default = "default_max_depth")]
    pub max_depth: u32,

    /// Number of non-200, non-4xx responses tolerated across the whole run
    #[serde(rename = "max-errors", default = "default_max_errors")]
    pub max_errors: u32,

    /// Per-request timeout in seconds; without it a hung fetch holds its slot
    #[serde(rename = "request-timeout-secs", default)]
    pub request_timeout_secs: Option<u64>,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            max_calls: default_max_calls(),
            max_depth: default_max_depth(),
            max_errors: default_max_errors(),
            request_timeout_secs: None,
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name", default = "default_crawler_name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version", default = "default_crawler_version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url", default)]
    pub contact_url: Option<String>,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: default_crawler_name(),
            crawler_version: default_crawler_version(),
            contact_url: None,
        }
    }
}

/// CSS selectors used to recognise article pages and pull their fields
#[derive(Debug, Clone, Deserialize)]
pub struct SelectorConfig {
    /// Matches only on pages that are articles
    #[serde(rename = "article-page", default = "default_article_page")]
    pub article_page: String,

    #[serde(default = "default_date")]
    pub date: String,

    #[serde(default = "default_title")]
    pub title: String,

    #[serde(default = "default_summary")]
    pub summary: String,

    /// Text of every match is concatenated
    #[serde(default = "default_body")]
    pub body: String,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            article_page: default_article_page(),
            date: default_date(),
            title: default_title(),
            summary: default_summary(),
            body: default_body(),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Optional SQLite file that receives every extracted article
    #[serde(rename = "database-path", default)]
    pub database_path: Option<String>,

    /// Print each article to stdout as it is found
    #[serde(rename = "print-articles", default = "default_print_articles")]
    pub print_articles: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            database_path: None,
            print_articles: default_print_articles(),
        }
    }
}

fn default_base_url() -> String {
    "https://www.breakit.se".to_string()
}

fn default_max_calls() -> usize {
    1
}

fn default_max_depth() -> u32 {
    1
}

fn default_max_errors() -> u32 {
    5
}

fn default_crawler_name() -> String {
    "SumiHarvest".to_string()
}

fn default_crawler_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

fn default_article_page() -> String {
    "html.articlePage".to_string()
}

fn default_date() -> String {
    ".article__date".to_string()
}

fn default_title() -> String {
    ".article__title".to_string()
}

fn default_summary() -> String {
    ".article__preamble".to_string()
}

fn default_body() -> String {
    ".article__body p".to_string()
}

fn default_print_articles() -> bool {
    true
}
