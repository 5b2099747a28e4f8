use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use notifybot::channel::{NotificationChannel, SentMessage, normalize_reply};
use notifybot::errors::{NotifyError, Result};

/// A fake channel that:
/// - records every text it was asked to send
/// - answers each poll with the next scripted reply (`None` = timeout)
/// - can be told to reject a given send.
pub struct FakeChannel {
    replies: VecDeque<Option<String>>,
    sent: Arc<Mutex<Vec<String>>>,
    polled_after: Arc<Mutex<Vec<i64>>>,
    next_id: i64,
    reject_send: Option<(usize, u16, String)>,
}

impl FakeChannel {
    pub fn new<S: Into<String>>(replies: impl IntoIterator<Item = Option<S>>) -> Self {
        Self {
            replies: replies.into_iter().map(|r| r.map(Into::into)).collect(),
            sent: Arc::new(Mutex::new(Vec::new())),
            polled_after: Arc::new(Mutex::new(Vec::new())),
            next_id: 100,
            reject_send: None,
        }
    }

    /// Make the `index`-th send (zero-based) fail with the given status.
    pub fn reject_send(mut self, index: usize, status: u16, description: &str) -> Self {
        self.reject_send = Some((index, status, description.to_string()));
        self
    }

    /// Shared log of sent texts; clone before moving the channel.
    pub fn sent(&self) -> Arc<Mutex<Vec<String>>> {
        Arc::clone(&self.sent)
    }

    /// Shared log of the low-water marks each poll was given.
    pub fn polled_after(&self) -> Arc<Mutex<Vec<i64>>> {
        Arc::clone(&self.polled_after)
    }
}

impl NotificationChannel for FakeChannel {
    fn send<'a>(
        &'a mut self,
        text: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<SentMessage>> + Send + 'a>> {
        Box::pin(async move {
            let index = self.sent.lock().unwrap().len();
            if let Some((reject_at, status, description)) = &self.reject_send {
                if *reject_at == index {
                    return Err(NotifyError::Channel {
                        status: *status,
                        description: description.clone(),
                    });
                }
            }

            self.sent.lock().unwrap().push(text.to_string());
            self.next_id += 1;
            Ok(SentMessage { id: self.next_id })
        })
    }

    fn poll_for_reply(
        &mut self,
        sent_message_id: i64,
        _interval: Duration,
        _timeout: Duration,
    ) -> Pin<Box<dyn Future<Output = Option<String>> + Send + '_>> {
        Box::pin(async move {
            self.polled_after.lock().unwrap().push(sent_message_id);
            self.replies
                .pop_front()
                .flatten()
                .map(|reply| normalize_reply(&reply))
        })
    }
}
