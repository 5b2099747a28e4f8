// src/engine/core.rs

//! Pure session state machine.
//!
//! Turns the outcome of a reply poll into the next state plus the message
//! (if any) the IO shell should send. There are no channels, no Tokio types
//! and no IO in here, so the reply semantics can be unit tested directly.

use crate::engine::report::log_text;
use crate::exec::ExecutionResult;

/// Where the session loop is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// The command is (about to be) executing.
    Running,
    /// The run finished; its summary is sent and a reply is awaited.
    AwaitingReply(ExecutionResult),
    /// Terminal.
    Done(SessionEnd),
}

/// Why the session ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEnd {
    /// The poll deadline passed without a reply.
    NoReply,
    /// The operator asked for the log and it was sent.
    LogSent,
    /// Any reply other than `retry` or `log`.
    Unrecognized(String),
}

/// Interpretation of a reply token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplyCommand {
    Retry,
    Log,
    Other(String),
}

impl ReplyCommand {
    /// Case-insensitive exact match after trimming.
    pub fn parse(reply: &str) -> Self {
        let token = reply.trim().to_lowercase();
        match token.as_str() {
            "retry" => ReplyCommand::Retry,
            "log" => ReplyCommand::Log,
            _ => ReplyCommand::Other(token),
        }
    }
}

/// Result of feeding a reply into the core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplyStep {
    pub next: SessionState,
    /// Follow-up message to send before moving to `next`.
    pub outbound: Option<String>,
}

/// Decide what follows a reply poll for `result`.
///
/// `reply` is `None` when the poll timed out.
pub fn on_reply(result: &ExecutionResult, reply: Option<&str>) -> ReplyStep {
    let Some(reply) = reply else {
        return ReplyStep {
            next: SessionState::Done(SessionEnd::NoReply),
            outbound: None,
        };
    };

    match ReplyCommand::parse(reply) {
        ReplyCommand::Retry => ReplyStep {
            next: SessionState::Running,
            outbound: None,
        },
        ReplyCommand::Log => ReplyStep {
            next: SessionState::Done(SessionEnd::LogSent),
            outbound: Some(log_text(result)),
        },
        ReplyCommand::Other(token) => ReplyStep {
            next: SessionState::Done(SessionEnd::Unrecognized(token)),
            outbound: None,
        },
    }
}
