//! Output module for extracted articles and crawl summaries
//!
//! This module handles:
//! - Printing articles to the console as they are found
//! - Exporting articles to SQLite
//! - Printing the final crawl summary

mod console;
mod sqlite_output;
mod traits;

pub use console::{print_summary, write_article, write_summary, ConsoleSink};
pub use sqlite_output::SqliteArticleSink;
pub use traits::{Article, ArticleSink, CrawlSummary, OutputError, OutputResult};

use crate::config::OutputConfig;
use std::path::Path;

/// Builds the sinks described by the output configuration
///
/// # Returns
///
/// * `Ok(Vec<Box<dyn ArticleSink>>)` - Console sink (if enabled) followed by
///   the SQLite sink (if a database path is set)
/// * `Err(OutputError)` - The database could not be opened
pub fn build_sinks(config: &OutputConfig) -> OutputResult<Vec<Box<dyn ArticleSink>>> {
    let mut sinks: Vec<Box<dyn ArticleSink>> = Vec::new();

    if config.print_articles {
        sinks.push(Box::new(ConsoleSink::stdout()));
    }

    if let Some(path) = &config.database_path {
        tracing::info!("Exporting articles to {}", path);
        sinks.push(Box::new(SqliteArticleSink::new(Path::new(path))?));
    }

    Ok(sinks)
}
