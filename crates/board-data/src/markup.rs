//! Headline extraction from scraped HTML.

use std::sync::OnceLock;

use board_core::error::{BoardError, Result};
use scraper::{Html, Selector};
use tracing::debug;

/// Structural selector for headline links on the scraped page.
pub const HEADLINE_SELECTOR: &str = "span.titleline > a";

/// Number of headlines kept when no limit is configured.
pub const DEFAULT_LIMIT: usize = 5;

// ── HeadlineFilter ────────────────────────────────────────────────────────────

/// Keyword filter and size cap applied to extracted headlines.
///
/// The keyword is applied first, then the limit, so a limit always counts
/// matching headlines only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadlineFilter {
    keyword: Option<String>,
    limit: usize,
}

impl Default for HeadlineFilter {
    fn default() -> Self {
        Self {
            keyword: None,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl HeadlineFilter {
    /// An empty or blank keyword disables filtering.
    pub fn new(keyword: impl Into<String>, limit: usize) -> Self {
        let keyword = keyword.into();
        let keyword = if keyword.trim().is_empty() {
            None
        } else {
            Some(keyword)
        };
        Self { keyword, limit }
    }

    pub fn keyword(&self) -> Option<&str> {
        self.keyword.as_deref()
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Case-insensitive substring match against the keyword.
    pub fn matches(&self, headline: &str) -> bool {
        match &self.keyword {
            Some(keyword) => headline.to_lowercase().contains(&keyword.to_lowercase()),
            None => true,
        }
    }

    /// Filter by keyword, then keep at most `limit` items in original order.
    pub fn apply(&self, headlines: Vec<String>) -> Vec<String> {
        headlines
            .into_iter()
            .filter(|h| self.matches(h))
            .take(self.limit)
            .collect()
    }
}

// ── Extraction ────────────────────────────────────────────────────────────────

fn headline_selector() -> &'static Selector {
    static SELECTOR: OnceLock<Selector> = OnceLock::new();
    SELECTOR.get_or_init(|| Selector::parse(HEADLINE_SELECTOR).expect("selector is valid"))
}

/// Extract every headline text from an HTML document, in document order.
///
/// Fails with [`BoardError::MalformedInput`] when the bytes are not UTF-8
/// or no headline node is present.
pub fn extract_headlines(raw: &[u8]) -> Result<Vec<String>> {
    let text = std::str::from_utf8(raw)
        .map_err(|e| BoardError::MalformedInput(format!("markup is not UTF-8 text: {}", e)))?;

    let document = Html::parse_document(text);
    let mut matched = 0usize;
    let headlines: Vec<String> = document
        .select(headline_selector())
        .inspect(|_| matched += 1)
        .map(|node| node.text().collect::<String>().trim().to_string())
        .filter(|h| !h.is_empty())
        .collect();

    if matched == 0 {
        return Err(BoardError::MalformedInput(format!(
            "no nodes matched `{}`",
            HEADLINE_SELECTOR
        )));
    }

    debug!("Extracted {} headlines from {} nodes", headlines.len(), matched);
    Ok(headlines)
}

/// Extract headlines and apply `filter`.
pub fn parse_markup(raw: &[u8], filter: &HeadlineFilter) -> Result<Vec<String>> {
    let all = extract_headlines(raw)?;
    let kept = filter.apply(all);
    if let Some(keyword) = filter.keyword() {
        debug!("Keyword '{}' kept {} headlines", keyword, kept.len());
    }
    Ok(kept)
}
