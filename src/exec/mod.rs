// src/exec/mod.rs

//! Process execution layer.
//!
//! This module is responsible for actually running the operator's command,
//! using `tokio::process::Command`, and handing the outcome back to the
//! session loop.
//!
//! - [`runner`] provides the `ProcessRunner` trait and the concrete
//!   `ShellRunner` used in production, which tests can replace with a fake.
//! - [`cancel`] holds the one-shot `CancellationHandle` bound to a single
//!   execution.
//! - [`shell`] contains the platform-specific shell invocation and
//!   termination.

pub mod cancel;
pub mod runner;
pub mod shell;

pub use cancel::CancellationHandle;
pub use runner::{Execution, ExecutionFuture, ExecutionResult, ProcessRunner, ShellRunner};
