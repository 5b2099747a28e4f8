// src/channel/mod.rs

//! Notification channel abstraction.
//!
//! The session loop talks to a `NotificationChannel` instead of a concrete
//! HTTP client, so tests can swap in a scripted channel.
//!
//! - [`telegram`] is the production implementation on top of the Telegram Bot
//!   API.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use crate::errors::Result;

pub mod telegram;

pub use telegram::TelegramChannel;

/// Identifier of a message the channel delivered.
///
/// Only inbound messages with a larger identifier count as replies to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SentMessage {
    pub id: i64,
}

/// Trait abstracting how the operator is notified and how replies come back.
pub trait NotificationChannel: Send {
    /// Send `text` to the configured recipient.
    fn send<'a>(
        &'a mut self,
        text: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<SentMessage>> + Send + 'a>>;

    /// Wait for the recipient's first message newer than `sent_message_id`.
    ///
    /// Returns the normalized reply token, or `None` once `timeout` has
    /// elapsed. Individual query failures are not errors; polling continues
    /// until the deadline.
    fn poll_for_reply(
        &mut self,
        sent_message_id: i64,
        interval: Duration,
        timeout: Duration,
    ) -> Pin<Box<dyn Future<Output = Option<String>> + Send + '_>>;
}

/// Normalize an inbound message body into a reply token.
pub fn normalize_reply(text: &str) -> String {
    text.trim().to_lowercase()
}
