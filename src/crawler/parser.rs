//! HTML parser for extracting links and article fields
//!
//! This module handles parsing HTML content to extract:
//! - Raw link targets (from `<a href>` tags), unresolved
//! - Whether the page is an article
//! - The article fields: publish date, title, summary and body text
//!
//! Which elements hold those fields is configured through CSS selectors.
//! Field extractors never fail; a missing element yields an empty string.

use crate::config::{compile_selector, SelectorConfig};
use crate::ConfigError;
use scraper::{Html, Selector};

/// Compiled selectors for one site layout
#[derive(Debug, Clone)]
pub struct PageParser {
    links: Selector,
    article_page: Selector,
    date: Selector,
    title: Selector,
    summary: Selector,
    body: Selector,
}

impl PageParser {
    /// Compiles the configured selectors
    ///
    /// # Returns
    ///
    /// * `Ok(PageParser)` - Every selector compiled
    /// * `Err(ConfigError)` - A selector is not valid CSS
    pub fn new(config: &SelectorConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            links: compile_selector("a[href]")?,
            article_page: compile_selector(&config.article_page)?,
            date: compile_selector(&config.date)?,
            title: compile_selector(&config.title)?,
            summary: compile_selector(&config.summary)?,
            body: compile_selector(&config.body)?,
        })
    }

    /// Parses a response body into a queryable page
    ///
    /// # Example
    ///
    /// ```
    /// use sumi_harvest::config::SelectorConfig;
    /// use sumi_harvest::crawler::PageParser;
    ///
    /// let parser = PageParser::new(&SelectorConfig::default()).unwrap();
    /// let page = parser.parse(r#"<html class="articlePage"><a href="/next">Next</a></html>"#);
    /// assert!(page.is_article_page());
    /// assert_eq!(page.find_links(), vec!["/next".to_string()]);
    /// ```
    pub fn parse(&self, body: &str) -> Page<'_> {
        Page {
            document: Html::parse_document(body),
            parser: self,
        }
    }
}

/// A parsed document together with the selectors to query it
pub struct Page<'a> {
    document: Html,
    parser: &'a PageParser,
}

impl Page<'_> {
    /// Returns every anchor target on the page, in document order
    pub fn find_links(&self) -> Vec<String> {
        self.document
            .select(&self.parser.links)
            .filter_map(|element| element.value().attr("href"))
            .map(ToString::to_string)
            .collect()
    }

    /// Returns true if the page matches the article-page selector
    pub fn is_article_page(&self) -> bool {
        self.document
            .select(&self.parser.article_page)
            .next()
            .is_some()
    }

    pub fn date(&self) -> String {
        self.select_text(&self.parser.date)
    }

    pub fn title(&self) -> String {
        self.select_text(&self.parser.title)
    }

    pub fn summary(&self) -> String {
        self.select_text(&self.parser.summary)
    }

    /// Concatenated text of every body match
    pub fn body_text(&self) -> String {
        self.select_text(&self.parser.body)
    }

    /// Joins the text of all matching elements and trims the result
    fn select_text(&self, selector: &Selector) -> String {
        self.document
            .select(selector)
            .flat_map(|element| element.text())
            .collect::<String>()
            .trim()
            .to_string()
    }
}
