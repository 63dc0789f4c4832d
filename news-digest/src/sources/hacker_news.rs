use crate::rss_utils::text;
use crate::sources::is_new_link;
use crate::traits::SourceAdapter;
use crate::types::{Item, Result, SourceKind, DEFAULT_HACKER_NEWS_BASE};
use crate::Fetcher;
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashSet;
use tracing::{debug, info, warn};

const DISCUSSION_URL: &str = "https://news.ycombinator.com/item";
const NO_TITLE: &str = "No Title";
const DEFAULT_SUMMARY: &str = "Click to read more or join the discussion.";

/// Story detail as returned by the Hacker News item endpoint.
#[derive(Debug, Deserialize)]
pub struct StoryDetail {
    pub id: u64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
}

impl StoryDetail {
    /// The story's external link, or its discussion page when it has none.
    pub fn link(&self) -> String {
        self.url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| discussion_url(self.id))
    }
}

pub fn discussion_url(id: u64) -> String {
    format!("{}?id={}", DISCUSSION_URL, id)
}

/// Top stories from the Hacker News API
pub struct HackerNewsSource {
    pub name: String,
    pub limit: usize,
    base_url: String,
}

impl HackerNewsSource {
    pub fn new(name: impl Into<String>, limit: usize) -> Self {
        Self {
            name: name.into(),
            limit,
            base_url: DEFAULT_HACKER_NEWS_BASE.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn item_url(&self, id: u64) -> String {
        format!("{}/item/{}.json", self.base_url, id)
    }
}

#[async_trait]
impl SourceAdapter for HackerNewsSource {
    fn source_name(&self) -> String {
        self.name.clone()
    }

    fn kind(&self) -> SourceKind {
        SourceKind::Aggregator
    }

    fn limit(&self) -> usize {
        self.limit
    }

    async fn pull(&self, fetcher: &Fetcher, known: &HashSet<String>) -> Result<Vec<Item>> {
        info!("Retrieving news from {}", self.name);

        let top_stories_url = format!("{}/topstories.json", self.base_url);
        let story_ids: Vec<u64> = fetcher.fetch_json(&top_stories_url).await?;

        let mut items = Vec::new();
        for id in story_ids.into_iter().take(self.limit) {
            // A bad story is skipped; the rest of the list is still fetched.
            let story: Option<StoryDetail> = match fetcher.fetch_json(&self.item_url(id)).await {
                Ok(story) => story,
                Err(e) => {
                    warn!("Skipping {} story {}: {}", self.name, id, e);
                    continue;
                }
            };

            let Some(story) = story else {
                debug!("Story {} returned no data", id);
                continue;
            };
            let title = story
                .title
                .as_deref()
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .unwrap_or(NO_TITLE);

            let link = story.link();
            if !is_new_link(&self.name, &link, known) {
                continue;
            }

            let summary = story.text.as_deref().unwrap_or(DEFAULT_SUMMARY);
            items.push(Item::new(
                &self.name,
                SourceKind::Aggregator,
                title,
                link,
                text::summarize(summary),
            ));
        }

        info!("Pulled {} new items from {}", items.len(), self.name);
        Ok(items)
    }
}
