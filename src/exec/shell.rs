// src/exec/shell.rs

//! Platform glue: building the shell invocation and terminating a child.

use tokio::process::{Child, Command};
use tracing::{debug, warn};

/// Build a shell command appropriate for the platform.
///
/// On Unix the shell leads a fresh process group, so a termination request
/// reaches everything it started.
pub fn shell_command(command: &str) -> Command {
    if cfg!(windows) {
        let mut c = Command::new("cmd");
        c.arg("/C").arg(command);
        c
    } else {
        let mut c = Command::new("sh");
        c.arg("-c").arg(command);
        #[cfg(unix)]
        c.process_group(0);
        c
    }
}

/// Ask the child and its descendants to stop.
///
/// Unix sends `SIGTERM` to the child's process group; Windows kills the whole
/// tree with `taskkill /T /F`. If the platform request cannot be delivered,
/// the direct child is force-killed instead.
pub async fn request_termination(child: &mut Child) {
    let Some(pid) = child.id() else {
        debug!("termination requested but child was already reaped");
        return;
    };

    if let Err(e) = terminate(pid).await {
        warn!(pid, error = %e, "termination request failed; force-killing child");
        force_kill(child);
    }
}

/// Kill the child and, on Unix, its process group without asking.
pub fn force_kill(child: &mut Child) {
    #[cfg(unix)]
    {
        use nix::sys::signal::{Signal, killpg};
        use nix::unistd::Pid;

        if let Some(raw) = child.id().and_then(|pid| i32::try_from(pid).ok()) {
            if let Err(e) = killpg(Pid::from_raw(raw), Signal::SIGKILL) {
                debug!(pgid = raw, error = %e, "SIGKILL to process group failed");
            }
        }
    }

    if let Err(e) = child.start_kill() {
        warn!(error = %e, "failed to kill child process");
    }
}

#[cfg(unix)]
async fn terminate(pid: u32) -> anyhow::Result<()> {
    use anyhow::Context;
    use nix::sys::signal::{Signal, killpg};
    use nix::unistd::Pid;

    let raw = i32::try_from(pid).context("pid out of range")?;
    killpg(Pid::from_raw(raw), Signal::SIGTERM).context("sending SIGTERM to process group")?;
    debug!(pgid = pid, "sent SIGTERM to process group");
    Ok(())
}

#[cfg(windows)]
async fn terminate(pid: u32) -> anyhow::Result<()> {
    use std::process::Stdio;

    use anyhow::Context;

    let status = Command::new("taskkill")
        .arg("/pid")
        .arg(pid.to_string())
        .arg("/T")
        .arg("/F")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .await
        .context("running taskkill")?;

    if !status.success() {
        anyhow::bail!("taskkill exited with {status}");
    }
    debug!(pid, "process tree terminated");
    Ok(())
}

#[cfg(not(any(unix, windows)))]
async fn terminate(_pid: u32) -> anyhow::Result<()> {
    anyhow::bail!("no termination request available on this platform")
}
