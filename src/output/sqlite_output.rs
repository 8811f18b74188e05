//! SQLite-based article export
//!
//! Extracted articles are written to an `articles` table keyed by URL, and
//! each successful crawl adds one row to `crawl_runs`. Only results are
//! stored; the frontier and visited set are never persisted, so a crawl
//! always starts from scratch.

use crate::output::traits::{Article, ArticleSink, CrawlSummary, OutputResult};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

/// SQL schema for the article export
pub const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS articles (
    url TEXT PRIMARY KEY,
    depth INTEGER NOT NULL,
    published TEXT NOT NULL,
    title TEXT NOT NULL,
    summary TEXT NOT NULL,
    body TEXT NOT NULL,
    crawled_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS crawl_runs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    base_url TEXT NOT NULL,
    started_at TEXT NOT NULL,
    finished_at TEXT NOT NULL,
    pages_fetched INTEGER NOT NULL,
    total_articles INTEGER NOT NULL,
    server_errors INTEGER NOT NULL,
    retries INTEGER NOT NULL,
    urls_discovered INTEGER NOT NULL
);
"#;

/// Article sink backed by a SQLite database
pub struct SqliteArticleSink {
    conn: Connection,
}

impl SqliteArticleSink {
    /// Opens or creates the export database
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    pub fn new(path: &Path) -> OutputResult<Self> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
        ",
        )?;
        conn.execute_batch(SCHEMA_SQL)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database (for testing)
    #[cfg(test)]
    pub fn new_in_memory() -> OutputResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA_SQL)?;
        Ok(Self { conn })
    }

    /// Counts stored articles
    pub fn count_articles(&self) -> OutputResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM articles", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    /// Counts recorded crawl runs
    pub fn count_runs(&self) -> OutputResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM crawl_runs", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    /// Looks up a stored article by URL
    pub fn get_article(&self, url: &str) -> OutputResult<Option<Article>> {
        let article = self
            .conn
            .query_row(
                "SELECT url, depth, published, title, summary, body FROM articles WHERE url = ?1",
                params![url],
                |row| {
                    Ok(Article {
                        url: row.get(0)?,
                        depth: row.get(1)?,
                        date: row.get(2)?,
                        title: row.get(3)?,
                        summary: row.get(4)?,
                        body: row.get(5)?,
                    })
                },
            )
            .optional()?;
        Ok(article)
    }
}

impl ArticleSink for SqliteArticleSink {
    fn record_article(&mut self, article: &Article) -> OutputResult<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO articles
                (url, depth, published, title, summary, body, crawled_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                article.url,
                article.depth,
                article.date,
                article.title,
                article.summary,
                article.body,
                Utc::now().to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    fn finish(&mut self, summary: &CrawlSummary) -> OutputResult<()> {
        self.conn.execute(
            "INSERT INTO crawl_runs (base_url, started_at, finished_at, pages_fetched,
                total_articles, server_errors, retries, urls_discovered)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                summary.base_url,
                summary.started_at.to_rfc3339(),
                summary.finished_at.to_rfc3339(),
                summary.pages_fetched as i64,
                summary.total_articles as i64,
                summary.server_errors,
                summary.retries,
                summary.urls_discovered as i64,
            ],
        )?;
        tracing::debug!("Recorded crawl run for {}", summary.base_url);
        Ok(())
    }
}
