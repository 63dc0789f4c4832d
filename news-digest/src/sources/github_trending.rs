use crate::rss_utils::{text, url};
use crate::sources::is_new_link;
use crate::traits::SourceAdapter;
use crate::types::{DigestError, Item, Result, SourceKind, DEFAULT_TRENDING_BASE};
use crate::Fetcher;
use async_trait::async_trait;
use scraper::{Html, Selector};
use std::collections::HashSet;
use tracing::info;

pub const NO_DESCRIPTION: &str = "No description available.";

/// One repository row scraped from the trending page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrendingRepo {
    pub name: String,
    /// `None` when the row has no usable anchor.
    pub link: Option<String>,
    pub description: String,
}

/// GitHub trending page for one language or topic
pub struct TrendingSource {
    pub topic: String,
    pub limit: usize,
    base_url: String,
}

impl TrendingSource {
    pub fn new(topic: impl Into<String>, limit: usize) -> Self {
        Self {
            topic: topic.into(),
            limit,
            base_url: DEFAULT_TRENDING_BASE.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn page_url(&self) -> Result<String> {
        Ok(url::join_segment(&self.base_url, &["trending", &self.topic])?)
    }
}

#[async_trait]
impl SourceAdapter for TrendingSource {
    fn source_name(&self) -> String {
        format!("GitHub Trending ({})", self.topic)
    }

    fn kind(&self) -> SourceKind {
        SourceKind::Trending
    }

    fn limit(&self) -> usize {
        self.limit
    }

    async fn pull(&self, fetcher: &Fetcher, known: &HashSet<String>) -> Result<Vec<Item>> {
        let page_url = self.page_url()?;
        info!("Retrieving news from GitHub Trending: {} ({})", self.topic, page_url);

        let html = fetcher.fetch_text(&page_url).await?;
        let repos = parse_trending_page(&html, &self.base_url, self.limit)?;

        let source_name = self.source_name();
        let items: Vec<Item> = repos
            .into_iter()
            .filter_map(|repo| {
                let link = repo.link?;
                if !is_new_link(&source_name, &link, known) {
                    return None;
                }
                Some(Item::new(
                    &source_name,
                    SourceKind::Trending,
                    &repo.name,
                    link,
                    text::truncate_with_ellipsis(&repo.description, crate::rss_utils::MAX_SUMMARY_CHARS),
                ))
            })
            .collect();

        info!("Pulled {} new repositories from {}", items.len(), source_name);
        Ok(items)
    }
}

/// Extract up to `limit` repository rows from a trending page.
pub fn parse_trending_page(html: &str, base_url: &str, limit: usize) -> Result<Vec<TrendingRepo>> {
    let row_selector = selector("article.Box-row")?;
    let title_selector = selector("h2 a")?;
    let description_selector = selector("p.col-9")?;

    let document = Html::parse_document(html);
    let repos = document
        .select(&row_selector)
        .take(limit)
        .map(|row| {
            let anchor = row.select(&title_selector).next();

            let name = anchor
                .map(|a| a.text().collect::<String>().split_whitespace().collect::<String>())
                .filter(|name| !name.is_empty())
                .unwrap_or_else(|| "No Repository Name".to_string());

            let link = anchor
                .and_then(|a| a.value().attr("href"))
                .filter(|href| !href.is_empty())
                .map(|href| format!("{}{}", base_url.trim_end_matches('/'), href));

            let description = row
                .select(&description_selector)
                .next()
                .map(|p| p.text().collect::<String>().trim().to_string())
                .filter(|d| !d.is_empty())
                .unwrap_or_else(|| NO_DESCRIPTION.to_string());

            TrendingRepo {
                name,
                link,
                description,
            }
        })
        .collect();

    Ok(repos)
}

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| DigestError::Parse(format!("Invalid selector {}: {}", css, e)))
}
