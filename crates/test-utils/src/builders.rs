#![allow(dead_code)]

use notifybot::exec::ExecutionResult;

/// Builder for `ExecutionResult` to simplify test setup.
pub struct ExecutionResultBuilder {
    result: ExecutionResult,
}

impl ExecutionResultBuilder {
    /// A successful, silent run.
    pub fn new() -> Self {
        Self {
            result: ExecutionResult {
                exit_code: 0,
                stdout: Vec::new(),
                stderr: Vec::new(),
                duration_ms: 0,
                killed: false,
            },
        }
    }

    pub fn exit_code(mut self, code: i32) -> Self {
        self.result.exit_code = code;
        self
    }

    pub fn stdout(mut self, text: &str) -> Self {
        self.result.stdout = text.as_bytes().to_vec();
        self
    }

    pub fn stderr(mut self, text: &str) -> Self {
        self.result.stderr = text.as_bytes().to_vec();
        self
    }

    pub fn duration_ms(mut self, ms: u64) -> Self {
        self.result.duration_ms = ms;
        self
    }

    pub fn killed(mut self, val: bool) -> Self {
        self.result.killed = val;
        self
    }

    pub fn build(self) -> ExecutionResult {
        self.result
    }
}

impl Default for ExecutionResultBuilder {
    fn default() -> Self {
        Self::new()
    }
}
