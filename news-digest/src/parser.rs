use crate::types::{DigestError, Result};
use feed_rs::parser;
use tracing::debug;

#[derive(Debug)]
pub struct ParsedFeed {
    pub entries: Vec<ParsedEntry>,
}

/// One feed entry, still carrying raw (possibly HTML) summary text.
#[derive(Debug, Clone)]
pub struct ParsedEntry {
    pub title: String,
    /// Empty when the entry has no link.
    pub link: String,
    pub summary: String,
}

pub struct FeedParser;

impl FeedParser {
    /// Parse an RSS, Atom or JSON feed document. Entries keep feed order.
    pub fn parse_feed(content: &str) -> Result<ParsedFeed> {
        debug!("Parsing feed content ({} bytes)", content.len());

        let feed = parser::parse(content.as_bytes())
            .map_err(|e| DigestError::Parse(format!("Failed to parse feed: {}", e)))?;

        let entries: Vec<ParsedEntry> = feed.entries.into_iter().map(Self::parse_entry).collect();

        debug!("Parsed feed with {} entries", entries.len());
        Ok(ParsedFeed { entries })
    }

    fn parse_entry(entry: feed_rs::model::Entry) -> ParsedEntry {
        let title = entry
            .title
            .map(|t| t.content)
            .unwrap_or_else(|| "No Title".to_string());

        let link = entry
            .links
            .first()
            .map(|l| l.href.trim().to_string())
            .unwrap_or_default();

        // summary, then content body, then the title itself
        let summary = entry
            .summary
            .map(|s| s.content)
            .filter(|s| !s.trim().is_empty())
            .or_else(|| entry.content.and_then(|c| c.body))
            .unwrap_or_else(|| title.clone());

        ParsedEntry {
            title,
            link,
            summary,
        }
    }
}
