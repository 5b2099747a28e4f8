// src/channel/telegram.rs

//! Telegram Bot API channel.
//!
//! Uses `sendMessage` for notifications and `getUpdates` with a short
//! server-side wait for replies.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::channel::{NotificationChannel, SentMessage, normalize_reply};
use crate::config::BotConfig;
use crate::errors::{NotifyError, Result};

/// Server-side wait passed to `getUpdates` on each tick.
const DEFAULT_LONG_POLL: Duration = Duration::from_secs(1);

/// Slack on top of the server-side wait before a request is abandoned.
const REQUEST_SLACK: Duration = Duration::from_secs(10);

#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MessageRef {
    message_id: i64,
}

#[derive(Debug, Deserialize)]
struct Update {
    update_id: i64,
    message: Option<InboundMessage>,
}

#[derive(Debug, Deserialize)]
struct InboundMessage {
    message_id: i64,
    chat: Chat,
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Chat {
    id: i64,
}

#[derive(Debug, Serialize)]
struct SendMessageBody<'a> {
    chat_id: &'a str,
    text: &'a str,
}

/// Channel bound to one bot token and one chat.
pub struct TelegramChannel {
    client: reqwest::Client,
    api_base: String,
    token: String,
    chat_id: String,
    /// Next `getUpdates` offset: one past the highest update id seen.
    offset: i64,
    long_poll: Duration,
}

impl fmt::Debug for TelegramChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TelegramChannel")
            .field("api_base", &self.api_base)
            .field("chat_id", &self.chat_id)
            .field("offset", &self.offset)
            .finish_non_exhaustive()
    }
}

impl TelegramChannel {
    pub fn new(config: &BotConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .use_rustls_tls()
            .connect_timeout(REQUEST_SLACK)
            .build()?;

        Ok(Self {
            client,
            api_base: config.api_base.clone(),
            token: config.token.clone(),
            chat_id: config.chat_id.clone(),
            offset: 0,
            long_poll: DEFAULT_LONG_POLL,
        })
    }

    /// Override the server-side wait used on each poll tick.
    pub fn with_long_poll(mut self, long_poll: Duration) -> Self {
        self.long_poll = long_poll;
        self
    }

    /// Current `getUpdates` offset.
    pub fn offset(&self) -> i64 {
        self.offset
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.api_base, self.token, method)
    }

    async fn send_message(&self, text: &str) -> Result<SentMessage> {
        let response = self
            .client
            .post(self.method_url("sendMessage"))
            .json(&SendMessageBody {
                chat_id: &self.chat_id,
                text,
            })
            .timeout(REQUEST_SLACK * 3)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        let parsed = serde_json::from_str::<ApiResponse<MessageRef>>(&body);

        match parsed {
            Ok(ApiResponse {
                ok: true,
                result: Some(message),
                ..
            }) if status.is_success() => {
                debug!(message_id = message.message_id, "message sent");
                Ok(SentMessage {
                    id: message.message_id,
                })
            }
            Ok(api) if !status.is_success() || !api.ok => Err(NotifyError::Channel {
                status: status.as_u16(),
                description: api
                    .description
                    .unwrap_or_else(|| status.canonical_reason().unwrap_or("unknown").to_string()),
            }),
            Ok(_) => Err(NotifyError::Channel {
                status: status.as_u16(),
                description: "response carried no message".to_string(),
            }),
            Err(_) if !status.is_success() => Err(NotifyError::Channel {
                status: status.as_u16(),
                description: body.trim().to_string(),
            }),
            Err(e) => Err(e.into()),
        }
    }

    async fn get_updates(&self, wait: Duration) -> Result<Vec<Update>> {
        let response = self
            .client
            .get(self.method_url("getUpdates"))
            .query(&[
                ("offset", self.offset.to_string()),
                ("timeout", wait.as_secs().to_string()),
            ])
            .timeout(wait + REQUEST_SLACK)
            .send()
            .await?;

        let status = response.status();
        let api: ApiResponse<Vec<Update>> = response.json().await?;

        if !status.is_success() || !api.ok {
            return Err(NotifyError::Channel {
                status: status.as_u16(),
                description: api.description.unwrap_or_default(),
            });
        }

        Ok(api.result.unwrap_or_default())
    }

    /// Advance the offset past every update and pick out the first reply.
    fn accept_updates(&mut self, updates: Vec<Update>, sent_message_id: i64) -> Option<String> {
        let mut reply = None;

        for update in updates {
            self.offset = self.offset.max(update.update_id + 1);

            if reply.is_some() {
                continue;
            }
            let Some(message) = update.message else {
                continue;
            };
            if message.chat.id.to_string() != self.chat_id {
                debug!(chat_id = message.chat.id, "skipping message from another chat");
                continue;
            }
            if message.message_id <= sent_message_id {
                debug!(message_id = message.message_id, "skipping stale message");
                continue;
            }
            let token = message.text.as_deref().map(normalize_reply).unwrap_or_default();
            if token.is_empty() {
                continue;
            }

            info!(message_id = message.message_id, reply = %token, "reply received");
            reply = Some(token);
        }

        reply
    }

    async fn poll(
        &mut self,
        sent_message_id: i64,
        interval: Duration,
        timeout: Duration,
    ) -> Option<String> {
        let deadline = Instant::now() + timeout;

        let polled = tokio::time::timeout_at(deadline, async {
            loop {
                let remaining = deadline.saturating_duration_since(Instant::now());
                let wait = self.long_poll.min(remaining);

                match self.get_updates(wait).await {
                    Ok(updates) => {
                        if let Some(reply) = self.accept_updates(updates, sent_message_id) {
                            return reply;
                        }
                    }
                    Err(e) => warn!(error = %e, "getUpdates failed; treating tick as empty"),
                }

                tokio::time::sleep(interval).await;
            }
        })
        .await;

        if polled.is_err() {
            info!(timeout_ms = timeout.as_millis() as u64, "no reply before deadline");
        }
        polled.ok()
    }
}

impl NotificationChannel for TelegramChannel {
    fn send<'a>(
        &'a mut self,
        text: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<SentMessage>> + Send + 'a>> {
        Box::pin(self.send_message(text))
    }

    fn poll_for_reply(
        &mut self,
        sent_message_id: i64,
        interval: Duration,
        timeout: Duration,
    ) -> Pin<Box<dyn Future<Output = Option<String>> + Send + '_>> {
        Box::pin(self.poll(sent_message_id, interval, timeout))
    }
}
