#![allow(dead_code)]

use async_trait::async_trait;
use news_digest::{FetchConfig, Item, MessageTransport, ScoredItem, SendError, SendOptions, SourceKind};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, Once};

static INIT: Once = Once::new();

pub fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_test_writer()
            .try_init()
            .ok();
    });
}

/// No politeness delay and no retries, so failures surface immediately.
pub fn test_fetch_config() -> FetchConfig {
    FetchConfig {
        user_agent: "news-digest-test/1.0".to_string(),
        timeout_seconds: 5,
        max_retries: 0,
        retry_delay_ms: 10,
        min_request_interval_ms: 0,
        max_body_size_mb: 10,
        max_redirects: 5,
    }
}

pub fn item(source: &str, kind: SourceKind, title: &str, link: &str) -> Item {
    Item {
        title: title.to_string(),
        link: link.to_string(),
        summary: String::new(),
        source_name: source.to_string(),
        kind,
    }
}

pub fn scored(source: &str, kind: SourceKind, title: &str, link: &str, score: u32) -> ScoredItem {
    ScoredItem {
        item: item(source, kind, title, link),
        score,
    }
}

/// RSS 2.0 document with one `<item>` per `(title, link, description)`.
pub fn rss_feed(entries: &[(&str, &str, &str)]) -> String {
    let items: String = entries
        .iter()
        .map(|(title, link, description)| {
            format!(
                "<item><title>{}</title><link>{}</link><description>{}</description></item>",
                title, link, description
            )
        })
        .collect();

    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>Test Feed</title>
    <link>https://example.com</link>
    <description>Feed used in tests</description>
    {}
  </channel>
</rss>"#,
        items
    )
}

/// Transport that replays a fixed list of outcomes and records every text it
/// was asked to send. Once the script runs out every send succeeds.
#[derive(Clone, Default)]
pub struct ScriptedTransport {
    script: Arc<Mutex<VecDeque<Result<(), SendError>>>>,
    sent: Arc<Mutex<Vec<String>>>,
}

impl ScriptedTransport {
    pub fn new(script: Vec<Result<(), SendError>>) -> Self {
        Self {
            script: Arc::new(Mutex::new(script.into())),
            sent: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Every attempted send, including failed ones.
    pub fn attempts(&self) -> Vec<String> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl MessageTransport for ScriptedTransport {
    async fn send_message(
        &self,
        _channel_id: &str,
        text: &str,
        _options: SendOptions,
    ) -> Result<(), SendError> {
        self.sent.lock().unwrap().push(text.to_string());
        self.script.lock().unwrap().pop_front().unwrap_or(Ok(()))
    }
}
