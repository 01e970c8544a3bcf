//! Content extraction functionality for the fetcher module

use std::sync::OnceLock;

use chrono::Utc;
use regex::Regex;
use tracing::debug;

use crate::fetcher::config::ExtractorConfig;
use crate::fetcher::SourceDocument;

/// Elements whose entire body is boilerplate for our purposes
const BLOCK_ELEMENTS: [&str; 6] = ["script", "style", "nav", "header", "footer", "aside"];

fn block_patterns() -> &'static [Regex] {
    static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        BLOCK_ELEMENTS
            .iter()
            .map(|tag| {
                Regex::new(&format!(r"(?is)<{tag}\b[^>]*>.*?</{tag}\s*>"))
                    .expect("block element pattern must compile")
            })
            .collect()
    })
}

fn comment_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(?s)<!--.*?-->").expect("comment pattern must compile"))
}

fn tag_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"<[^>]+>").expect("tag pattern must compile"))
}

fn whitespace_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\s+").expect("whitespace pattern must compile"))
}

/// Strip markup from an HTML page, leaving collapsed plain text
///
/// This is substitution-based, not a parser. Unclosed blocks keep their
/// inner text; only their tags are dropped.
pub fn strip_html(html: &str) -> String {
    let mut text = comment_pattern().replace_all(html, " ").into_owned();
    for pattern in block_patterns() {
        text = pattern.replace_all(&text, " ").into_owned();
    }
    let text = tag_pattern().replace_all(&text, " ");
    let text = decode_entities(&text);
    whitespace_pattern().replace_all(&text, " ").trim().to_string()
}

/// Decode the handful of entities that routinely survive in news markup
fn decode_entities(text: &str) -> String {
    text.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

/// Cut `text` to at most `max_chars` characters
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}

/// Turns raw pages into bounded, relevance-checked source documents
#[derive(Debug, Clone)]
pub struct Extractor {
    config: ExtractorConfig,
    keywords: Vec<String>,
}

impl Extractor {
    pub fn new(config: ExtractorConfig) -> Self {
        let keywords = config
            .keywords
            .iter()
            .map(|k| k.trim().to_lowercase())
            .filter(|k| !k.is_empty())
            .collect();
        Self { config, keywords }
    }

    /// Whether the extracted text looks like a topical page
    pub fn is_relevant(&self, text: &str) -> bool {
        if text.chars().count() < self.config.min_length {
            return false;
        }
        if self.keywords.is_empty() {
            return true;
        }
        let lower = text.to_lowercase();
        self.keywords.iter().any(|keyword| lower.contains(keyword))
    }

    /// Extract a source document from a fetched page
    ///
    /// # Arguments
    ///
    /// * `html` - The fetched page, or `None` if the fetch failed
    /// * `source` - Identifier recorded on the document (usually the host)
    ///
    /// # Returns
    ///
    /// The document, or `None` when there was no page or it was judged irrelevant
    pub fn extract(&self, html: Option<&str>, source: &str) -> Option<SourceDocument> {
        let html = html?;
        let text = truncate_chars(&strip_html(html), self.config.max_chars);

        if !self.is_relevant(&text) {
            debug!("Discarding irrelevant page from {}", source);
            return None;
        }

        Some(SourceDocument {
            source: source.to_string(),
            content: text,
            captured_at: Utc::now(),
        })
    }
}
