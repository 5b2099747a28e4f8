// src/errors.rs

//! Crate-wide error type and result alias.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum NotifyError {
    /// Missing or unusable configuration, raised before anything runs.
    #[error("{0}")]
    Config(String),

    #[error("Usage: notifybot <command>\nExample: notifybot npm run build")]
    Usage,

    /// The shell itself could not be started.
    #[error("failed to spawn `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// Waiting on a started command failed.
    #[error("failed to wait for `{command}`: {source}")]
    Wait {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// The messaging service rejected a request.
    #[error("Telegram API error {status}: {description}")]
    Channel { status: u16, description: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid JSON from Telegram API: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, NotifyError>;

impl NotifyError {
    /// Line printed to the operator when the program gives up.
    ///
    /// Usage errors are shown bare; wrapped errors include their whole cause
    /// chain.
    pub fn operator_message(&self) -> String {
        match self {
            NotifyError::Usage => self.to_string(),
            NotifyError::Other(inner) => format!("notifybot error: {inner:#}"),
            _ => format!("notifybot error: {self}"),
        }
    }
}
