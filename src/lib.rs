// src/lib.rs

pub mod channel;
pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod logging;

use std::time::Duration;

use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::channel::TelegramChannel;
use crate::cli::CliArgs;
use crate::config::load_config;
use crate::engine::{Session, SessionOptions, SessionReport};
use crate::errors::{NotifyError, Result};
use crate::exec::{CancellationHandle, ShellRunner};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading
/// - the shell runner and the Telegram channel
/// - the session loop
/// - Ctrl-C handling
pub async fn run(args: CliArgs) -> Result<SessionReport> {
    let command = args.command_line();
    if command.trim().is_empty() {
        return Err(NotifyError::Usage);
    }

    let config = load_config(&args.env_file)?;
    debug!(?config, "configuration resolved");

    let options = SessionOptions {
        poll_interval: Duration::from_secs(args.poll_interval),
        reply_timeout: Duration::from_secs(args.reply_timeout),
    };

    println!("Running: {command}");

    let channel = TelegramChannel::new(&config)?;
    let session = Session::new(command, ShellRunner::new(), channel, options);

    spawn_interrupt_handler(session.cancel_handles());

    let report = session.run().await?;
    info!(runs = report.runs, exit_code = report.last_exit_code, "done");
    Ok(report)
}

/// Ctrl-C → cancel the running command.
///
/// The session then reports the killed run like any other. An interrupt with
/// nothing left to cancel ends the program.
fn spawn_interrupt_handler(handles: watch::Receiver<Option<CancellationHandle>>) {
    tokio::spawn(async move {
        loop {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!(error = %e, "failed to listen for Ctrl+C");
                return;
            }

            let current = handles.borrow().clone();
            match current {
                Some(handle) if handle.cancel() => {
                    println!("\nInterrupted; stopping command...");
                }
                _ => {
                    eprintln!("\nInterrupted.");
                    std::process::exit(1);
                }
            }
        }
    });
}
