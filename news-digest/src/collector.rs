use crate::sources::adapter_for;
use crate::traits::SourceAdapter;
use crate::types::{Item, SourceConfig};
use crate::Fetcher;
use std::collections::{HashMap, HashSet};
use std::time::Duration;
use tracing::{info, warn};

pub const DEFAULT_ADAPTER_TIMEOUT: Duration = Duration::from_secs(120);

/// Runs every configured source one after another and merges their output.
pub struct Collector {
    fetcher: Fetcher,
    adapters: Vec<Box<dyn SourceAdapter>>,
    adapter_timeout: Duration,
}

impl Collector {
    pub fn new(fetcher: Fetcher) -> Self {
        Self {
            fetcher,
            adapters: Vec::new(),
            adapter_timeout: DEFAULT_ADAPTER_TIMEOUT,
        }
    }

    pub fn from_configs(fetcher: Fetcher, configs: &[SourceConfig]) -> Self {
        let mut collector = Self::new(fetcher);
        for config in configs {
            collector.add_source(adapter_for(config));
        }
        collector
    }

    pub fn with_adapter_timeout(mut self, timeout: Duration) -> Self {
        self.adapter_timeout = timeout;
        self
    }

    pub fn add_source(&mut self, adapter: Box<dyn SourceAdapter>) {
        self.adapters.push(adapter);
    }

    pub fn source_count(&self) -> usize {
        self.adapters.len()
    }

    /// Collect items from all sources, skipping links in `known`, and
    /// deduplicate across sources.
    ///
    /// A source that fails or exceeds the adapter timeout contributes nothing;
    /// the remaining sources still run.
    pub async fn collect(&self, known: &HashSet<String>) -> Vec<Item> {
        info!("Collecting news from {} sources", self.adapters.len());

        let mut all_items = Vec::new();
        let mut timed_out = 0;

        for adapter in &self.adapters {
            let source_name = adapter.source_name();
            match tokio::time::timeout(self.adapter_timeout, adapter.fetch(&self.fetcher, known)).await {
                Ok(items) => all_items.extend(items),
                Err(_) => {
                    timed_out += 1;
                    warn!(
                        "Source {} timed out after {:?}, continuing without it",
                        source_name, self.adapter_timeout
                    );
                }
            }
        }

        let total = all_items.len();
        let unique = dedup_last_wins(all_items);
        info!(
            "Total unique new items collected: {} ({} before dedup, {} sources timed out)",
            unique.len(),
            total,
            timed_out
        );
        unique
    }
}

/// Deduplicate by link. A repeated link replaces the earlier item's content
/// but keeps the position where the link was first seen.
pub fn dedup_last_wins(items: Vec<Item>) -> Vec<Item> {
    let mut positions: HashMap<String, usize> = HashMap::new();
    let mut unique: Vec<Item> = Vec::with_capacity(items.len());

    for item in items {
        match positions.get(&item.link) {
            Some(&index) => unique[index] = item,
            None => {
                positions.insert(item.link.clone(), unique.len());
                unique.push(item);
            }
        }
    }

    unique
}
