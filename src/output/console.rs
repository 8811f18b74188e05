//! Console output
//!
//! Prints each article as a block of labelled lines and the closing crawl
//! summary. The labels follow the page structure they came from: `H1` is the
//! title and `H4` the summary.

use crate::output::traits::{Article, ArticleSink, CrawlSummary, OutputResult};
use std::io::{self, Write};

/// Article sink that writes human-readable blocks
pub struct ConsoleSink {
    out: Box<dyn Write + Send>,
}

impl ConsoleSink {
    /// Creates a sink writing to the given writer
    pub fn new(out: Box<dyn Write + Send>) -> Self {
        Self { out }
    }

    /// Creates a sink writing to stdout
    pub fn stdout() -> Self {
        Self::new(Box::new(io::stdout()))
    }
}

impl ArticleSink for ConsoleSink {
    fn record_article(&mut self, article: &Article) -> OutputResult<()> {
        write_article(&mut self.out, article)?;
        self.out.flush()?;
        Ok(())
    }
}

/// Writes one article block
pub fn write_article<W: Write + ?Sized>(out: &mut W, article: &Article) -> io::Result<()> {
    writeln!(out, "URL: {}", article.url)?;
    writeln!(out, "Date: {}", article.date)?;
    writeln!(out, "H1: {}", article.title)?;
    writeln!(out, "H4: {}", article.summary)?;
    writeln!(out, "Paragraph: {}", article.body)?;
    Ok(())
}

/// Writes the closing line with the article count
pub fn write_summary<W: Write + ?Sized>(out: &mut W, summary: &CrawlSummary) -> io::Result<()> {
    writeln!(out)?;
    writeln!(
        out,
        "Done with crawling, crawled {} articles",
        summary.total_articles
    )?;
    Ok(())
}

/// Prints the crawl summary to stdout
pub fn print_summary(summary: &CrawlSummary) {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    if let Err(e) = write_summary(&mut handle, summary) {
        tracing::warn!("Failed to print summary: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

    impl Write for SharedBuffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl SharedBuffer {
        fn contents(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    #[test]
    fn test_console_sink_writes_article_block() {
        let buffer = SharedBuffer::default();
        let mut sink = ConsoleSink::new(Box::new(buffer.clone()));

        sink.record_article(&Article {
            url: "https://example.com/a".to_string(),
            depth: 1,
            date: "2019-03-01".to_string(),
            title: "Title".to_string(),
            summary: String::new(),
            body: "Body".to_string(),
        })
        .unwrap();

        assert_eq!(
            buffer.contents(),
            "URL: https://example.com/a\nDate: 2019-03-01\nH1: Title\nH4: \nParagraph: Body\n"
        );
    }

    #[test]
    fn test_write_summary() {
        let now = Utc::now();
        let summary = CrawlSummary {
            base_url: "https://example.com".to_string(),
            started_at: now,
            finished_at: now,
            pages_fetched: 4,
            total_articles: 2,
            server_errors: 0,
            retries: 0,
            urls_discovered: 4,
        };

        let mut out = Vec::new();
        write_summary(&mut out, &summary).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "\nDone with crawling, crawled 2 articles\n"
        );
    }
}
