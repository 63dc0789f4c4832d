use crate::parser::FeedParser;
use crate::rss_utils::text;
use crate::sources::is_new_link;
use crate::traits::SourceAdapter;
use crate::types::{Item, Result, SourceKind};
use crate::Fetcher;
use async_trait::async_trait;
use std::collections::HashSet;
use tracing::info;

/// Generic syndicated feed source (RSS, Atom or JSON Feed)
pub struct FeedSource {
    pub name: String,
    pub url: String,
    pub limit: usize,
}

impl FeedSource {
    pub fn new(name: impl Into<String>, url: impl Into<String>, limit: usize) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            limit,
        }
    }
}

#[async_trait]
impl SourceAdapter for FeedSource {
    fn source_name(&self) -> String {
        self.name.clone()
    }

    fn kind(&self) -> SourceKind {
        SourceKind::Feed
    }

    fn limit(&self) -> usize {
        self.limit
    }

    async fn pull(&self, fetcher: &Fetcher, known: &HashSet<String>) -> Result<Vec<Item>> {
        info!("Retrieving news from feed: {} ({})", self.name, self.url);

        let content = fetcher.fetch_text(&self.url).await?;
        let parsed_feed = FeedParser::parse_feed(&content)?;

        let items: Vec<Item> = parsed_feed
            .entries
            .into_iter()
            .take(self.limit)
            .filter(|entry| is_new_link(&self.name, &entry.link, known))
            .map(|entry| {
                Item::new(
                    &self.name,
                    SourceKind::Feed,
                    &entry.title,
                    entry.link,
                    text::summarize(&entry.summary),
                )
            })
            .collect();

        info!("Pulled {} new items from {}", items.len(), self.name);
        Ok(items)
    }
}
