// src/config/mod.rs

//! Credential loading.
//!
//! - [`env_file`] reads `key=value` files.
//! - [`model`] resolves the bot credentials from the environment with the
//!   file merged underneath.

pub mod env_file;
pub mod model;

pub use env_file::{load_env_file, parse_env_file};
pub use model::{BotConfig, CHAT_ID_VAR, TOKEN_VAR, load_config};
