// src/exec/runner.rs

//! Shell process runner.

use std::borrow::Cow;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::process::Stdio;
use std::time::{Duration, Instant};

use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Child;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::errors::{NotifyError, Result};
use crate::exec::cancel::CancellationHandle;
use crate::exec::shell::{force_kill, request_termination, shell_command};

/// How long a cancelled command may take to exit before it is killed outright.
const TERMINATION_GRACE: Duration = Duration::from_secs(2);

/// How long output readers may keep draining after a cancelled process exits.
///
/// A descendant that moved to another process group can hold the pipes open;
/// past this grace period whatever was captured so far is kept.
const KILLED_OUTPUT_GRACE: Duration = Duration::from_millis(500);

/// Outcome of one command execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionResult {
    /// Exit status; `1` when the process reported none (e.g. killed by a
    /// signal).
    pub exit_code: i32,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
    pub duration_ms: u64,
    /// Termination was requested through the cancellation handle.
    pub killed: bool,
}

impl ExecutionResult {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    pub fn stdout_text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.stdout)
    }

    pub fn stderr_text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.stderr)
    }
}

/// Future resolving once the process has exited and its output is collected.
pub type ExecutionFuture = Pin<Box<dyn Future<Output = Result<ExecutionResult>> + Send>>;

/// A started execution: its cancellation capability plus the pending outcome.
pub struct Execution {
    handle: CancellationHandle,
    outcome: ExecutionFuture,
}

impl fmt::Debug for Execution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Execution")
            .field("handle", &self.handle)
            .finish_non_exhaustive()
    }
}

impl Execution {
    pub fn new(handle: CancellationHandle, outcome: ExecutionFuture) -> Self {
        Self { handle, outcome }
    }

    /// Handle that can terminate this execution until it finishes.
    pub fn cancel_handle(&self) -> CancellationHandle {
        self.handle.clone()
    }

    /// Wait for the process to exit.
    pub async fn wait(self) -> Result<ExecutionResult> {
        let Execution { handle, outcome } = self;
        let result = outcome.await;
        // The request channel must stay open while the process runs.
        drop(handle);
        result
    }
}

/// Trait abstracting how commands are executed.
///
/// Production code uses [`ShellRunner`]; tests can provide scripted
/// implementations that never spawn real processes.
pub trait ProcessRunner: Send {
    /// Start `command`. Fails only if the process cannot be spawned at all.
    fn start(&mut self, command: &str) -> Result<Execution>;
}

/// Runs commands through the system shell with inherited stdin and captured
/// stdout/stderr.
#[derive(Debug, Clone, Default)]
pub struct ShellRunner;

impl ShellRunner {
    pub fn new() -> Self {
        Self
    }
}

impl ProcessRunner for ShellRunner {
    fn start(&mut self, command: &str) -> Result<Execution> {
        info!(cmd = %command, "starting command");

        let mut cmd = shell_command(command);
        cmd.stdin(Stdio::inherit())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let started = Instant::now();
        let mut child = cmd.spawn().map_err(|source| NotifyError::Spawn {
            command: command.to_string(),
            source,
        })?;
        debug!(pid = ?child.id(), "command spawned");

        let stdout = child.stdout.take().map(OutputCapture::spawn);
        let stderr = child.stderr.take().map(OutputCapture::spawn);

        let (handle, cancel_rx) = CancellationHandle::new();
        let command = command.to_string();
        let outcome = Box::pin(async move {
            supervise(child, cancel_rx, stdout, stderr, started, command).await
        });

        Ok(Execution::new(handle, outcome))
    }
}

/// Wait for the child to exit (or for a cancellation request), then collect
/// its output.
async fn supervise(
    mut child: Child,
    mut cancel_rx: oneshot::Receiver<()>,
    stdout: Option<OutputCapture>,
    stderr: Option<OutputCapture>,
    started: Instant,
    command: String,
) -> Result<ExecutionResult> {
    let mut killed = false;

    // A dropped handle closes the channel with `Err`, which disables that
    // branch instead of counting as a cancellation.
    let status = tokio::select! {
        biased;

        status = child.wait() => status,

        Ok(()) = &mut cancel_rx => {
            killed = true;
            info!(cmd = %command, "cancellation requested; terminating command");
            request_termination(&mut child).await;
            match tokio::time::timeout(TERMINATION_GRACE, child.wait()).await {
                Ok(status) => status,
                Err(_) => {
                    warn!(cmd = %command, "command ignored termination request; killing");
                    force_kill(&mut child);
                    child.wait().await
                }
            }
        }
    };
    // Late requests must report `false` instead of reaching an exited child.
    drop(cancel_rx);

    let status = status.map_err(|source| NotifyError::Wait {
        command: command.clone(),
        source,
    })?;

    let duration_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
    let exit_code = status.code().unwrap_or(1);

    let grace = killed.then_some(KILLED_OUTPUT_GRACE);
    let stdout = match stdout {
        Some(capture) => capture.finish(grace).await,
        None => Vec::new(),
    };
    let stderr = match stderr {
        Some(capture) => capture.finish(grace).await,
        None => Vec::new(),
    };

    info!(
        cmd = %command,
        exit_code,
        duration_ms,
        killed,
        stdout_bytes = stdout.len(),
        stderr_bytes = stderr.len(),
        "command exited"
    );

    Ok(ExecutionResult {
        exit_code,
        stdout,
        stderr,
        duration_ms,
        killed,
    })
}

/// Background task draining one output pipe into a growable buffer.
struct OutputCapture {
    task: JoinHandle<Vec<u8>>,
    stop: oneshot::Sender<()>,
}

impl OutputCapture {
    fn spawn<R>(reader: R) -> Self
    where
        R: AsyncRead + Unpin + Send + 'static,
    {
        let (stop, stop_rx) = oneshot::channel();
        let task = tokio::spawn(drain(reader, stop_rx));
        Self { task, stop }
    }

    /// Collect the buffer. With a grace period, stop reading once it elapses
    /// even if the pipe is still open.
    async fn finish(self, grace: Option<Duration>) -> Vec<u8> {
        let OutputCapture { mut task, stop } = self;

        if let Some(grace) = grace {
            if let Ok(joined) = tokio::time::timeout(grace, &mut task).await {
                return joined_buffer(joined);
            }
            debug!("output pipe still open after grace period; keeping partial output");
            let _ = stop.send(());
        }

        joined_buffer(task.await)
    }
}

fn joined_buffer(joined: std::result::Result<Vec<u8>, tokio::task::JoinError>) -> Vec<u8> {
    joined.unwrap_or_else(|e| {
        warn!(error = %e, "output reader task failed");
        Vec::new()
    })
}

async fn drain<R>(mut reader: R, mut stop_rx: oneshot::Receiver<()>) -> Vec<u8>
where
    R: AsyncRead + Unpin,
{
    let mut buf = Vec::new();
    let mut chunk = [0u8; 8192];
    let mut stop_pending = true;

    loop {
        tokio::select! {
            read = reader.read(&mut chunk) => match read {
                Ok(0) => break,
                Ok(n) => buf.extend_from_slice(&chunk[..n]),
                Err(e) => {
                    warn!(error = %e, "error reading command output");
                    break;
                }
            },
            stop = &mut stop_rx, if stop_pending => match stop {
                Ok(()) => break,
                Err(_) => stop_pending = false,
            },
        }
    }

    buf
}
