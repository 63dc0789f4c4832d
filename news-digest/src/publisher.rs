use crate::types::{DigestError, PublishConfig, Result, DEFAULT_TELEGRAM_API_BASE};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SendOptions {
    /// Send the text as HTML rather than plain text.
    pub html: bool,
    pub disable_link_preview: bool,
}

impl Default for SendOptions {
    fn default() -> Self {
        Self {
            html: true,
            disable_link_preview: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SendError {
    #[error("rate limited, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("request timed out")]
    Timeout,

    #[error("rejected: {0}")]
    Rejected(String),
}

/// Delivery of one message to a channel.
#[async_trait]
pub trait MessageTransport: Send + Sync {
    async fn send_message(
        &self,
        channel_id: &str,
        text: &str,
        options: SendOptions,
    ) -> std::result::Result<(), SendError>;
}

/// Telegram Bot API `sendMessage` transport.
pub struct TelegramTransport {
    client: Client,
    api_base: String,
    token: String,
    timeout: Duration,
}

impl TelegramTransport {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_base: DEFAULT_TELEGRAM_API_BASE.to_string(),
            token: token.into(),
            timeout: Duration::from_secs(30),
        }
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout = Duration::from_secs(secs);
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/bot{}/sendMessage", self.api_base, self.token)
    }
}

#[derive(Serialize)]
struct SendMessageRequest<'a> {
    chat_id: &'a str,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    parse_mode: Option<&'static str>,
    disable_web_page_preview: bool,
}

#[derive(Deserialize)]
struct ApiResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    parameters: Option<ResponseParameters>,
}

#[derive(Deserialize)]
struct ResponseParameters {
    #[serde(default)]
    retry_after: Option<u64>,
}

#[async_trait]
impl MessageTransport for TelegramTransport {
    async fn send_message(
        &self,
        channel_id: &str,
        text: &str,
        options: SendOptions,
    ) -> std::result::Result<(), SendError> {
        let payload = SendMessageRequest {
            chat_id: channel_id,
            text,
            parse_mode: options.html.then_some("HTML"),
            disable_web_page_preview: options.disable_link_preview,
        };

        let response = self
            .client
            .post(self.endpoint())
            .timeout(self.timeout)
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    SendError::Timeout
                } else {
                    // the URL embeds the bot token
                    SendError::Rejected(format!("request failed: {}", e.without_url()))
                }
            })?;

        let status = response.status();
        let body: Option<ApiResponse> = response.json().await.ok();

        let retry_after = body
            .as_ref()
            .and_then(|b| b.parameters.as_ref())
            .and_then(|p| p.retry_after);
        if status == StatusCode::TOO_MANY_REQUESTS || retry_after.is_some() {
            return Err(SendError::RateLimited {
                retry_after_secs: retry_after.unwrap_or(1),
            });
        }

        match body {
            Some(body) if status.is_success() && body.ok => Ok(()),
            Some(body) => Err(SendError::Rejected(format!(
                "HTTP {}: {}",
                status,
                body.description.unwrap_or_else(|| "no description".to_string())
            ))),
            None => Err(SendError::Rejected(format!("HTTP {}: unreadable response", status))),
        }
    }
}

/// Sends digest parts to the channel in order.
pub struct Publisher {
    transport: Box<dyn MessageTransport>,
    config: PublishConfig,
}

impl Publisher {
    pub fn new(transport: Box<dyn MessageTransport>, config: PublishConfig) -> Self {
        Self { transport, config }
    }

    /// Send every part. A rate-limited or timed-out part is retried once after
    /// the cooldown; any other failure, or a failed retry, stops the publish
    /// and leaves the remaining parts unsent.
    pub async fn publish(&self, parts: &[String]) -> Result<()> {
        let total = parts.len();
        info!("Sending digest: {} message(s)", total);

        for (index, part) in parts.iter().enumerate() {
            let number = index + 1;
            self.send_part(number, total, part).await?;
            info!("Digest part {}/{} sent", number, total);

            if number < total {
                tokio::time::sleep(self.config.pause_between_parts).await;
            }
        }

        Ok(())
    }

    async fn send_part(&self, number: usize, total: usize, text: &str) -> Result<()> {
        let options = SendOptions::default();
        let channel = self.config.channel_id.as_str();

        let cooldown = match self.transport.send_message(channel, text, options).await {
            Ok(()) => return Ok(()),
            Err(SendError::RateLimited { retry_after_secs }) => {
                let wait = Duration::from_secs(retry_after_secs.saturating_add(1));
                warn!("Flood control on part {}: waiting {:?}", number, wait);
                wait
            }
            Err(SendError::Timeout) => {
                warn!(
                    "Part {} timed out, retrying in {:?}",
                    number, self.config.timeout_cooldown
                );
                self.config.timeout_cooldown
            }
            Err(e) => return Err(publish_error(number, total, e)),
        };

        tokio::time::sleep(cooldown).await;

        match self.transport.send_message(channel, text, options).await {
            Ok(()) => {
                info!("Part {} sent after waiting", number);
                Ok(())
            }
            Err(e) => Err(publish_error(number, total, e)),
        }
    }
}

fn publish_error(part: usize, total: usize, e: SendError) -> DigestError {
    error!("Could not send digest part {}/{}: {}", part, total, e);
    DigestError::Publish {
        part,
        total,
        reason: e.to_string(),
    }
}
