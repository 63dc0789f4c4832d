use crate::ledger::DEFAULT_LEDGER_FILE;
use crate::rss_utils::url::is_valid_http_url;
use crate::scoring::KeywordTable;
use crate::types::{
    DigestConfig, DigestError, FetchConfig, PublishConfig, Result, ScoringConfig, SourceConfig,
    DEFAULT_TELEGRAM_API_BASE,
};
use clap::Parser;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

/// Collect AI news from feeds, GitHub Trending and Hacker News, and post a
/// digest of the new items to a Telegram channel.
#[derive(Parser, Debug, Clone)]
#[command(name = "news-digest", version)]
pub struct Cli {
    /// Telegram bot token
    #[arg(long, env = "TELEGRAM_BOT_TOKEN", hide_env_values = true)]
    pub bot_token: Option<String>,

    /// Destination chat or channel (e.g. @my_channel)
    #[arg(long, env = "TELEGRAM_CHANNEL_ID")]
    pub channel_id: Option<String>,

    /// Ledger database file [default: $GITHUB_WORKSPACE/sent_links.db]
    #[arg(long, env = "LEDGER_PATH")]
    pub ledger: Option<PathBuf>,

    /// JSON file with the list of sources, replacing the built-in list
    #[arg(long)]
    pub sources: Option<PathBuf>,

    /// JSON object of keyword weights, replacing the built-in table
    #[arg(long)]
    pub keywords: Option<PathBuf>,

    #[arg(long, default_value_t = 3)]
    pub min_score: u32,

    #[arg(long, default_value_t = 30)]
    pub max_items: usize,

    /// Score from which a non-trending item is listed as a big release
    #[arg(long, default_value_t = 5)]
    pub release_threshold: u32,

    /// Minimum delay between two requests to the same host
    #[arg(long, default_value_t = 1000)]
    pub request_interval_ms: u64,

    /// Upper bound on the time one source may take
    #[arg(long, default_value_t = 120)]
    pub adapter_timeout_secs: u64,

    #[arg(long, env = "TELEGRAM_API_BASE", default_value = DEFAULT_TELEGRAM_API_BASE)]
    pub api_base: String,

    /// Send a "nothing new" digest when no item passes the filter
    #[arg(long)]
    pub send_empty: bool,

    /// Print the digest instead of sending it; the ledger is not written
    #[arg(long)]
    pub dry_run: bool,
}

/// Everything a run needs, built once at start-up.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bot_token: String,
    pub ledger_path: PathBuf,
    pub sources: Vec<SourceConfig>,
    pub keywords: KeywordTable,
    pub fetch: FetchConfig,
    pub scoring: ScoringConfig,
    pub digest: DigestConfig,
    pub publish: PublishConfig,
    pub adapter_timeout: Duration,
    pub telegram_api_base: String,
    pub send_empty: bool,
    pub dry_run: bool,
}

impl AppConfig {
    pub fn from_cli(cli: Cli) -> Result<Self> {
        let bot_token = cli.bot_token.filter(|t| !t.is_empty());
        let channel_id = cli.channel_id.filter(|c| !c.is_empty());

        let (bot_token, channel_id) = match (bot_token, channel_id) {
            (Some(token), Some(channel)) => (token, channel),
            (token, channel) if cli.dry_run => (
                token.unwrap_or_default(),
                channel.unwrap_or_else(|| "(dry run)".to_string()),
            ),
            (None, _) => return Err(DigestError::Config("TELEGRAM_BOT_TOKEN is not set".to_string())),
            (_, None) => return Err(DigestError::Config("TELEGRAM_CHANNEL_ID is not set".to_string())),
        };

        let sources = match &cli.sources {
            Some(path) => load_sources(path)?,
            None => SourceConfig::default_sources(),
        };

        let keywords = match &cli.keywords {
            Some(path) => KeywordTable::from_json_file(path)?,
            None => KeywordTable::default(),
        };

        let scoring = ScoringConfig {
            min_score: cli.min_score,
            max_items: cli.max_items,
            release_threshold: cli.release_threshold,
        };

        let fetch = FetchConfig {
            min_request_interval_ms: cli.request_interval_ms,
            ..FetchConfig::default()
        };

        let digest = DigestConfig {
            channel_label: channel_id.clone(),
            release_threshold: scoring.release_threshold,
            ..DigestConfig::default()
        };

        let publish = PublishConfig {
            channel_id,
            ..PublishConfig::default()
        };

        info!(
            "Configured {} sources, {} keywords, min score {}, max items {}",
            sources.len(),
            keywords.len(),
            scoring.min_score,
            scoring.max_items
        );

        Ok(Self {
            bot_token,
            ledger_path: cli.ledger.unwrap_or_else(default_ledger_path),
            sources,
            keywords,
            fetch,
            scoring,
            digest,
            publish,
            adapter_timeout: Duration::from_secs(cli.adapter_timeout_secs),
            telegram_api_base: cli.api_base,
            send_empty: cli.send_empty,
            dry_run: cli.dry_run,
        })
    }
}

/// `$GITHUB_WORKSPACE/sent_links.db`, or `./sent_links.db` outside CI.
pub fn default_ledger_path() -> PathBuf {
    let root = std::env::var("GITHUB_WORKSPACE").unwrap_or_else(|_| ".".to_string());
    Path::new(&root).join(DEFAULT_LEDGER_FILE)
}

/// Read a JSON array of source definitions.
pub fn load_sources(path: &Path) -> Result<Vec<SourceConfig>> {
    let content = std::fs::read_to_string(path)?;
    let sources: Vec<SourceConfig> = serde_json::from_str(&content)?;

    if sources.is_empty() {
        return Err(DigestError::Config(format!(
            "Source file {} lists no sources",
            path.display()
        )));
    }

    for source in &sources {
        match source {
            SourceConfig::Feed { name, url, .. } if !is_valid_http_url(url) => {
                return Err(DigestError::Config(format!(
                    "Feed {} has an invalid URL: {}",
                    name, url
                )));
            }
            SourceConfig::Trending { base_url: Some(base), .. }
            | SourceConfig::Aggregator { base_url: Some(base), .. }
                if !is_valid_http_url(base) =>
            {
                return Err(DigestError::Config(format!("Invalid base URL: {}", base)));
            }
            _ => {}
        }
    }

    Ok(sources)
}
