// src/engine/session.rs

use std::fmt;
use std::time::Duration;

use tokio::sync::watch;
use tracing::{debug, info};

use crate::channel::NotificationChannel;
use crate::engine::core::{ReplyStep, SessionEnd, SessionState, on_reply};
use crate::engine::report::{format_duration, status_label, summary_text};
use crate::errors::Result;
use crate::exec::{CancellationHandle, ExecutionResult, ProcessRunner};

/// Timing of the reply poll.
#[derive(Debug, Clone, Copy)]
pub struct SessionOptions {
    pub poll_interval: Duration,
    pub reply_timeout: Duration,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(2),
            reply_timeout: Duration::from_secs(120),
        }
    }
}

/// Summary of a finished session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionReport {
    /// How many times the command was executed.
    pub runs: u32,
    pub last_exit_code: i32,
    pub end: SessionEnd,
}

/// Drives run → notify → poll → act until the core reaches `Done`.
///
/// Each step is awaited to completion before the next begins, so a reply can
/// only ever apply to the most recent run.
pub struct Session<R: ProcessRunner, C: NotificationChannel> {
    command: String,
    runner: R,
    channel: C,
    options: SessionOptions,
    current_cancel: watch::Sender<Option<CancellationHandle>>,
}

impl<R: ProcessRunner, C: NotificationChannel> fmt::Debug for Session<R, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("command", &self.command)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl<R: ProcessRunner, C: NotificationChannel> Session<R, C> {
    pub fn new(command: impl Into<String>, runner: R, channel: C, options: SessionOptions) -> Self {
        let (current_cancel, _) = watch::channel(None);
        Self {
            command: command.into(),
            runner,
            channel,
            options,
            current_cancel,
        }
    }

    /// Observe the cancellation handle of the most recent execution.
    ///
    /// The session never cancels on its own; this lets the caller wire an
    /// external kill request (e.g. Ctrl-C) to whatever is running.
    pub fn cancel_handles(&self) -> watch::Receiver<Option<CancellationHandle>> {
        self.current_cancel.subscribe()
    }

    pub async fn run(mut self) -> Result<SessionReport> {
        let mut state = SessionState::Running;
        let mut runs = 0u32;
        let mut last_exit_code = 0;

        let end = loop {
            state = match state {
                SessionState::Running => {
                    runs += 1;
                    let result = self.execute().await?;
                    last_exit_code = result.exit_code;
                    SessionState::AwaitingReply(result)
                }
                SessionState::AwaitingReply(result) => self.notify_and_wait(result).await?,
                SessionState::Done(end) => break end,
            };
        };

        info!(runs, last_exit_code, end = ?end, "session finished");
        Ok(SessionReport {
            runs,
            last_exit_code,
            end,
        })
    }

    async fn execute(&mut self) -> Result<ExecutionResult> {
        let execution = self.runner.start(&self.command)?;
        self.current_cancel.send_replace(Some(execution.cancel_handle()));

        let result = execution.wait().await?;
        println!(
            "\n{} (exit {}, {}s)",
            status_label(&result),
            result.exit_code,
            format_duration(result.duration_ms)
        );
        Ok(result)
    }

    async fn notify_and_wait(&mut self, result: ExecutionResult) -> Result<SessionState> {
        println!("Sending Telegram notification...");
        let sent = self
            .channel
            .send(&summary_text(&self.command, &result))
            .await?;
        debug!(message_id = sent.id, "summary sent");

        println!(
            "Waiting for your Telegram reply ({}s timeout)...",
            self.options.reply_timeout.as_secs()
        );
        let reply = self
            .channel
            .poll_for_reply(
                sent.id,
                self.options.poll_interval,
                self.options.reply_timeout,
            )
            .await;

        match &reply {
            Some(token) => println!("Reply: \"{token}\""),
            None => println!("No reply received. Exiting."),
        }

        let ReplyStep { next, outbound } = on_reply(&result, reply.as_deref());

        if let Some(text) = outbound {
            self.channel.send(&text).await?;
            println!("Logs sent to Telegram.");
        }

        match &next {
            SessionState::Running => println!("Retrying...\n"),
            SessionState::Done(SessionEnd::Unrecognized(token)) => {
                info!(reply = %token, "unrecognized reply; ending session");
                println!("Unknown reply \"{token}\". Exiting.");
            }
            _ => {}
        }

        Ok(next)
    }
}
