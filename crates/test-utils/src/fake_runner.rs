use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use notifybot::errors::{NotifyError, Result};
use notifybot::exec::{CancellationHandle, Execution, ExecutionResult, ProcessRunner};

/// What a scripted run does.
#[derive(Debug, Clone)]
pub enum FakeRun {
    /// Finish immediately with this result.
    Finish(ExecutionResult),
    /// Block until the cancellation handle fires, then report a killed run.
    UntilCancelled,
    /// Fail to spawn.
    SpawnFailure,
}

/// A fake runner that:
/// - records every command it was asked to start
/// - plays back scripted runs in order (the last one repeats).
pub struct FakeRunner {
    script: VecDeque<FakeRun>,
    last: Option<FakeRun>,
    started: Arc<Mutex<Vec<String>>>,
}

impl FakeRunner {
    pub fn new(script: impl IntoIterator<Item = FakeRun>) -> Self {
        Self {
            script: script.into_iter().collect(),
            last: None,
            started: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Shared log of started commands; clone before moving the runner.
    pub fn started(&self) -> Arc<Mutex<Vec<String>>> {
        Arc::clone(&self.started)
    }

    fn next_run(&mut self) -> FakeRun {
        if let Some(run) = self.script.pop_front() {
            self.last = Some(run.clone());
            return run;
        }
        self.last
            .clone()
            .unwrap_or_else(|| FakeRun::Finish(ExecutionResult {
                exit_code: 0,
                stdout: Vec::new(),
                stderr: Vec::new(),
                duration_ms: 0,
                killed: false,
            }))
    }
}

impl ProcessRunner for FakeRunner {
    fn start(&mut self, command: &str) -> Result<Execution> {
        self.started.lock().unwrap().push(command.to_string());

        let (handle, cancel_rx) = CancellationHandle::new();
        match self.next_run() {
            FakeRun::Finish(result) => Ok(Execution::new(
                handle,
                Box::pin(async move { Ok::<_, NotifyError>(result) }),
            )),
            FakeRun::UntilCancelled => Ok(Execution::new(
                handle,
                Box::pin(async move {
                    let killed = cancel_rx.await.is_ok();
                    Ok::<_, NotifyError>(ExecutionResult {
                        exit_code: 1,
                        stdout: Vec::new(),
                        stderr: Vec::new(),
                        duration_ms: 0,
                        killed,
                    })
                }),
            )),
            FakeRun::SpawnFailure => Err(NotifyError::Spawn {
                command: command.to_string(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "no shell"),
            }),
        }
    }
}
