// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// Command-line arguments for `notifybot`.
///
/// Everything after the options is the command to run; it is joined with
/// single spaces and handed to the system shell unchanged.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "notifybot",
    version,
    about = "Run a command, report the result over Telegram and act on the reply.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to a `key=value` file merged under the process environment.
    #[arg(long, value_name = "PATH", default_value = ".env")]
    pub env_file: PathBuf,

    /// Seconds between two reply polls.
    #[arg(long, value_name = "SECS", default_value_t = 2)]
    pub poll_interval: u64,

    /// Seconds to wait for a reply before giving up.
    #[arg(long, value_name = "SECS", default_value_t = 120)]
    pub reply_timeout: u64,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `NOTIFYBOT_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// The command to run.
    #[arg(
        value_name = "COMMAND",
        trailing_var_arg = true,
        allow_hyphen_values = true
    )]
    pub command: Vec<String>,
}

impl CliArgs {
    /// The command line as the shell will see it.
    pub fn command_line(&self) -> String {
        self.command.join(" ")
    }
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Parse the process arguments without letting clap exit on its own.
pub fn try_parse() -> Result<CliArgs, clap::Error> {
    CliArgs::try_parse()
}

/// Exit status for a command line clap refused.
///
/// `--help` and `--version` end the program normally; every other rejection
/// is a startup failure.
pub fn rejection_exit_code(err: &clap::Error) -> i32 {
    if err.use_stderr() { 1 } else { 0 }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_arguments_are_joined_with_spaces() {
        let args = CliArgs::parse_from(["notifybot", "npm", "run", "build"]);
        assert_eq!(args.command_line(), "npm run build");
        assert_eq!(args.poll_interval, 2);
        assert_eq!(args.reply_timeout, 120);
    }

    #[test]
    fn hyphenated_command_arguments_are_not_treated_as_options() {
        let args = CliArgs::parse_from(["notifybot", "--reply-timeout", "5", "ls", "-la"]);
        assert_eq!(args.reply_timeout, 5);
        assert_eq!(args.command_line(), "ls -la");
    }

    #[test]
    fn malformed_option_value_is_a_startup_failure() {
        let err = CliArgs::try_parse_from(["notifybot", "--poll-interval", "abc", "ls"])
            .unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
        assert_eq!(rejection_exit_code(&err), 1);
    }

    #[test]
    fn unknown_option_is_a_startup_failure() {
        let err = CliArgs::try_parse_from(["notifybot", "--bogus", "ls"]).unwrap_err();
        assert_eq!(rejection_exit_code(&err), 1);
    }

    #[test]
    fn help_exits_cleanly() {
        let err = CliArgs::try_parse_from(["notifybot", "--help"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayHelp);
        assert_eq!(rejection_exit_code(&err), 0);
    }

    #[test]
    fn empty_command_parses_to_empty_line() {
        let args = CliArgs::parse_from(["notifybot"]);
        assert!(args.command_line().is_empty());
    }
}
