use crate::types::{Item, Result, SourceKind};
use crate::Fetcher;
use async_trait::async_trait;
use std::collections::HashSet;
use tracing::warn;

/// Trait for pulling candidate items from one configured source
/// (syndicated feed, trending page, aggregator API, ...)
#[async_trait]
pub trait SourceAdapter: Send + Sync {
    /// Human-readable name for this source, also used for emoji lookup
    fn source_name(&self) -> String;

    fn kind(&self) -> SourceKind;

    /// Maximum number of entries taken from the source per run
    fn limit(&self) -> usize;

    /// Fetch the first `limit()` entries and drop the ones whose link is
    /// empty or already in `known`.
    async fn pull(&self, fetcher: &Fetcher, known: &HashSet<String>) -> Result<Vec<Item>>;

    /// Like `pull`, but a failing source yields no items instead of an error.
    async fn fetch(&self, fetcher: &Fetcher, known: &HashSet<String>) -> Vec<Item> {
        match self.pull(fetcher, known).await {
            Ok(items) => items,
            Err(e) => {
                warn!("Error retrieving {}: {}", self.source_name(), e);
                Vec::new()
            }
        }
    }
}
