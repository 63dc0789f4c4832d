pub mod types;
pub mod config;
pub mod fetcher;
pub mod parser;
pub mod rss_utils;
pub mod traits;
pub mod sources;
pub mod collector;
pub mod scoring;
pub mod ledger;
pub mod digest;
pub mod publisher;
pub mod pipeline;

pub use types::*;
pub use config::{AppConfig, Cli};
pub use fetcher::Fetcher;
pub use parser::FeedParser;
pub use traits::SourceAdapter;
pub use sources::{FeedSource, HackerNewsSource, TrendingSource};
pub use collector::{dedup_last_wins, Collector};
pub use scoring::KeywordTable;
pub use ledger::Ledger;
pub use digest::DigestFormatter;
pub use publisher::{MessageTransport, Publisher, SendError, SendOptions, TelegramTransport};
pub use pipeline::{DigestPipeline, RunReport};
