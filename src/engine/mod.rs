// src/engine/mod.rs

//! Orchestration engine for notifybot.
//!
//! The pure reply state machine lives in [`core`], the operator-facing text in
//! [`report`], and the async loop that runs the command, notifies and polls is
//! implemented in [`session`].

pub mod core;
pub mod report;
pub mod session;

pub use self::core::{ReplyCommand, ReplyStep, SessionEnd, SessionState, on_reply};
pub use self::session::{Session, SessionOptions, SessionReport};
