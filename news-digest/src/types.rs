use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Kind of source an item came from. Attached to the source configuration so
/// categorization never has to guess from the source name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    Feed,
    Trending,
    Aggregator,
}

/// One candidate entry produced by a source adapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    /// Display title, prefixed with the source name (`"<source>: <title>"`).
    pub title: String,
    /// Canonical URL; the item's identity.
    pub link: String,
    /// Plain-text summary, at most `MAX_SUMMARY_CHARS` plus an ellipsis.
    pub summary: String,
    pub source_name: String,
    pub kind: SourceKind,
}

impl Item {
    pub fn new(source_name: &str, kind: SourceKind, title: &str, link: String, summary: String) -> Self {
        Self {
            title: format!("{}: {}", source_name, title),
            link,
            summary,
            source_name: source_name.to_string(),
            kind,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoredItem {
    pub item: Item,
    pub score: u32,
}

/// Display grouping, derived at format time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    BigRelease,
    TrendingRepo,
    FlashNews,
}

impl Category {
    /// Fixed display order of digest sections.
    pub const DISPLAY_ORDER: [Category; 3] = [
        Category::BigRelease,
        Category::TrendingRepo,
        Category::FlashNews,
    ];
}

pub const DEFAULT_TRENDING_BASE: &str = "https://github.com";
pub const DEFAULT_HACKER_NEWS_BASE: &str = "https://hacker-news.firebaseio.com/v0";
pub const DEFAULT_TELEGRAM_API_BASE: &str = "https://api.telegram.org";

fn default_limit() -> usize {
    10
}

fn default_aggregator_name() -> String {
    "Hacker News".to_string()
}

/// Configuration of one adapter instance. The `kind` tag picks the adapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SourceConfig {
    Feed {
        name: String,
        url: String,
        #[serde(default = "default_limit")]
        limit: usize,
    },
    Trending {
        topic: String,
        #[serde(default = "default_limit")]
        limit: usize,
        #[serde(default)]
        base_url: Option<String>,
    },
    Aggregator {
        #[serde(default = "default_aggregator_name")]
        name: String,
        #[serde(default = "default_limit")]
        limit: usize,
        #[serde(default)]
        base_url: Option<String>,
    },
}

impl SourceConfig {
    pub fn feed(name: &str, url: &str, limit: usize) -> Self {
        SourceConfig::Feed {
            name: name.to_string(),
            url: url.to_string(),
            limit,
        }
    }

    pub fn trending(topic: &str, limit: usize) -> Self {
        SourceConfig::Trending {
            topic: topic.to_string(),
            limit,
            base_url: None,
        }
    }

    pub fn hacker_news(limit: usize) -> Self {
        SourceConfig::Aggregator {
            name: default_aggregator_name(),
            limit,
            base_url: None,
        }
    }

    pub fn kind(&self) -> SourceKind {
        match self {
            SourceConfig::Feed { .. } => SourceKind::Feed,
            SourceConfig::Trending { .. } => SourceKind::Trending,
            SourceConfig::Aggregator { .. } => SourceKind::Aggregator,
        }
    }

    /// The source list the bot ships with.
    pub fn default_sources() -> Vec<SourceConfig> {
        let feeds = [
            ("Hugging Face Blog", "https://hf.co/blog/feed.xml", 10),
            ("Hugging Face Paper", "https://jamesg.blog/hf-papers.xml", 10),
            ("ML Reddit", "https://www.reddit.com/r/MachineLearning/.rss", 10),
            ("OpenAI Blog", "https://openai.com/blog/rss.xml", 10),
            ("The Gradient", "https://thegradient.pub/rss/", 10),
            ("Jay Alammar", "https://jalammar.github.io/feed.xml", 10),
            ("DeepMind Blog", "https://deepmind.google/blog/rss.xml", 10),
            ("AI From MIT News", "https://news.mit.edu/rss/topic/artificial-intelligence2", 10),
            ("General News From MIT News", "https://www.technologyreview.com/feed/", 10),
            ("Microsoft AI Blog", "https://blogs.microsoft.com/ai/feed/", 10),
            ("machinelearningmastery Blog", "https://machinelearningmastery.com/blog/feed/", 10),
            ("Nvidia AI Blog", "https://blogs.nvidia.com/blog/category/ai/feed/", 10),
            ("Towards Data Science", "https://towardsdatascience.com/feed/", 10),
            ("The Verge", "http://theverge.com/rss/index.xml", 20),
        ];
        let topics = [
            "python",
            "jupyter-notebook",
            "google colab",
            "Artificial Intelligence",
            "AI",
            "machine-learning",
            "deep-learning",
            "nlp",
            "Natural Language Processing",
            "CV",
            "Computer Vision",
            "Data Science",
            "Awesome Lists",
        ];

        let mut sources: Vec<SourceConfig> = feeds
            .iter()
            .map(|(name, url, limit)| SourceConfig::feed(name, url, *limit))
            .collect();
        sources.extend(topics.iter().map(|topic| SourceConfig::trending(topic, 10)));
        sources.push(SourceConfig::hacker_news(20));
        sources
    }
}

#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub user_agent: String,
    pub timeout_seconds: u64,
    pub max_retries: u32,
    pub retry_delay_ms: u64,
    /// Minimum spacing between two requests to the same host.
    pub min_request_interval_ms: u64,
    pub max_body_size_mb: usize,
    pub max_redirects: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36".to_string(),
            timeout_seconds: 30,
            max_retries: 2,
            retry_delay_ms: 1000,
            min_request_interval_ms: 1000,
            max_body_size_mb: 10,
            max_redirects: 5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoringConfig {
    pub min_score: u32,
    pub max_items: usize,
    /// Non-trending items at or above this score are listed as big releases.
    pub release_threshold: u32,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            min_score: 3,
            max_items: 30,
            release_threshold: 5,
        }
    }
}

#[derive(Debug, Clone)]
pub struct DigestConfig {
    /// Shown in the footer of every digest.
    pub channel_label: String,
    /// Maximum size of one message, in characters.
    pub transport_limit: usize,
    /// Room kept free in each part for the continuation header.
    pub reserved_margin: usize,
    pub release_threshold: u32,
}

impl Default for DigestConfig {
    fn default() -> Self {
        Self {
            channel_label: String::new(),
            transport_limit: 4096,
            reserved_margin: 50,
            release_threshold: ScoringConfig::default().release_threshold,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PublishConfig {
    pub channel_id: String,
    pub pause_between_parts: Duration,
    pub timeout_cooldown: Duration,
}

impl Default for PublishConfig {
    fn default() -> Self {
        Self {
            channel_id: String::new(),
            pause_between_parts: Duration::from_secs(3),
            timeout_cooldown: Duration::from_secs(5),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DigestError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status} from {url}")]
    Status { url: String, status: u16 },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Ledger storage error: {0}")]
    Storage(#[from] sqlx::Error),

    #[error("Publish failed at part {part}/{total}: {reason}")]
    Publish {
        part: usize,
        total: usize,
        reason: String,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, DigestError>;
