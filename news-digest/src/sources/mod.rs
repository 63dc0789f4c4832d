pub mod github_trending;
pub mod hacker_news;
pub mod rss_feed;

pub use github_trending::TrendingSource;
pub use hacker_news::HackerNewsSource;
pub use rss_feed::FeedSource;

use crate::traits::SourceAdapter;
use crate::types::SourceConfig;
use std::collections::HashSet;
use tracing::debug;

/// Build the adapter described by one source configuration.
pub fn adapter_for(config: &SourceConfig) -> Box<dyn SourceAdapter> {
    match config {
        SourceConfig::Feed { name, url, limit } => Box::new(FeedSource::new(name, url, *limit)),
        SourceConfig::Trending {
            topic,
            limit,
            base_url,
        } => {
            let source = TrendingSource::new(topic, *limit);
            match base_url {
                Some(base) => Box::new(source.with_base_url(base)),
                None => Box::new(source),
            }
        }
        SourceConfig::Aggregator {
            name,
            limit,
            base_url,
        } => {
            let source = HackerNewsSource::new(name, *limit);
            match base_url {
                Some(base) => Box::new(source.with_base_url(base)),
                None => Box::new(source),
            }
        }
    }
}

/// True when `link` is non-empty and has not been delivered before.
pub(crate) fn is_new_link(source_name: &str, link: &str, known: &HashSet<String>) -> bool {
    if link.is_empty() {
        return false;
    }
    if known.contains(link) {
        debug!("Duplicate link from {} ignored: {}", source_name, link);
        return false;
    }
    true
}
