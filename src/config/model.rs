// src/config/model.rs

use std::collections::HashMap;
use std::path::Path;

use crate::config::env_file::load_env_file;
use crate::errors::{NotifyError, Result};

pub const TOKEN_VAR: &str = "TELEGRAM_BOT_TOKEN";
pub const CHAT_ID_VAR: &str = "TELEGRAM_CHAT_ID";
pub const API_BASE_VAR: &str = "TELEGRAM_API_BASE";

pub const DEFAULT_API_BASE: &str = "https://api.telegram.org";

/// Resolved credentials for the notification channel.
#[derive(Clone, PartialEq, Eq)]
pub struct BotConfig {
    pub token: String,
    pub chat_id: String,
    pub api_base: String,
}

// Keep the token out of logs.
impl std::fmt::Debug for BotConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BotConfig")
            .field("token", &"<redacted>")
            .field("chat_id", &self.chat_id)
            .field("api_base", &self.api_base)
            .finish()
    }
}

impl BotConfig {
    /// Resolve the configuration from a key lookup.
    ///
    /// Empty values count as missing.
    pub fn resolve<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let token = get(TOKEN_VAR)
            .ok_or_else(|| NotifyError::Config(format!("Missing env var: {TOKEN_VAR}")))?;
        let chat_id = get(CHAT_ID_VAR)
            .ok_or_else(|| NotifyError::Config(format!("Missing env var: {CHAT_ID_VAR}")))?;
        let api_base = get(API_BASE_VAR).unwrap_or_else(|| DEFAULT_API_BASE.to_string());

        Ok(Self {
            token: token.trim().to_string(),
            chat_id: chat_id.trim().to_string(),
            api_base: api_base.trim().trim_end_matches('/').to_string(),
        })
    }

    /// Resolve with the process environment layered over `file` entries.
    pub fn from_layers(file: &HashMap<String, String>) -> Result<Self> {
        Self::layered(|key| std::env::var(key).ok(), file)
    }

    /// Resolve with `env` layered over `file` entries.
    ///
    /// A file entry only applies when `env` has no non-empty value for that
    /// key.
    pub fn layered<E>(env: E, file: &HashMap<String, String>) -> Result<Self>
    where
        E: Fn(&str) -> Option<String>,
    {
        Self::resolve(|key| {
            env(key)
                .filter(|v| !v.is_empty())
                .or_else(|| file.get(key).cloned())
        })
    }
}

/// Load the env file at `path` (if any) and resolve the configuration.
pub fn load_config(path: impl AsRef<Path>) -> Result<BotConfig> {
    let file = load_env_file(path)?;
    BotConfig::from_layers(&file)
}
