//! Mock command runner for testing.
//!
//! Provides a configurable mock implementation of the CommandRunner trait
//! for use in unit tests without spawning real processes.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;

use crate::error::{RunnerError, RunnerResult};
use crate::runner::{CommandOutput, CommandRunner, CommandStatus};

/// Predefined mock response for a command execution.
#[derive(Debug, Clone)]
pub struct MockResponse {
    pub status: CommandStatus,
    pub stdout: String,
    pub stderr: String,
}

impl MockResponse {
    pub fn success(stdout: impl Into<String>) -> Self {
        Self {
            status: CommandStatus::Exited(0),
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    pub fn failure(exit_code: i32, stderr: impl Into<String>) -> Self {
        Self {
            status: CommandStatus::Exited(exit_code),
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }

    pub fn not_found() -> Self {
        Self {
            status: CommandStatus::NotFound,
            stdout: String::new(),
            stderr: String::new(),
        }
    }
}

/// Mock command runner for testing.
///
/// Captures every command and answers with a rule-matched response when one
/// of the command's arguments matches, or otherwise with the next response
/// from the queue.
#[derive(Clone, Default)]
pub struct MockRunner {
    /// Responses chosen by an argument the command must contain.
    rules: Arc<RwLock<Vec<(String, MockResponse)>>>,
    /// Responses handed out in order (cycling).
    responses: Arc<RwLock<Vec<MockResponse>>>,
    /// Index of next queued response.
    response_index: Arc<AtomicUsize>,
    /// Captured commands for verification.
    captured_calls: Arc<RwLock<Vec<Vec<String>>>>,
    /// Simulated failure to return.
    simulate_failure: Arc<RwLock<Option<String>>>,
}

impl MockRunner {
    /// Create a new mock runner.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a mock response for the next unmatched call.
    pub fn add_response(self, response: MockResponse) -> Self {
        self.responses.write().push(response);
        self
    }

    /// Answer every command containing `arg` with `response`.
    pub fn on(self, arg: impl Into<String>, response: MockResponse) -> Self {
        self.rules.write().push((arg.into(), response));
        self
    }

    /// Set a failure to simulate.
    pub fn simulate_failure(self, message: impl Into<String>) -> Self {
        *self.simulate_failure.write() = Some(message.into());
        self
    }

    /// Get all captured commands.
    pub fn get_calls(&self) -> Vec<Vec<String>> {
        self.captured_calls.read().clone()
    }

    /// Get the number of calls made.
    pub fn call_count(&self) -> usize {
        self.captured_calls.read().len()
    }

    /// Get the most recent command.
    pub fn last_call(&self) -> Option<Vec<String>> {
        self.captured_calls.read().last().cloned()
    }

    fn next_response(&self, command: &[String]) -> MockResponse {
        if let Some((_, response)) = self
            .rules
            .read()
            .iter()
            .find(|(arg, _)| command.iter().any(|c| c == arg))
        {
            return response.clone();
        }

        let responses = self.responses.read();
        if responses.is_empty() {
            return MockResponse::success("");
        }
        let index = self.response_index.fetch_add(1, Ordering::SeqCst);
        responses
            .get(index % responses.len())
            .cloned()
            .unwrap_or_else(|| MockResponse::success(""))
    }
}

#[async_trait]
impl CommandRunner for MockRunner {
    async fn run(&self, command: &[String]) -> RunnerResult<CommandOutput> {
        if command.is_empty() {
            return Err(RunnerError::InvalidCommand(
                "argument list cannot be empty".to_string(),
            ));
        }
        self.captured_calls.write().push(command.to_vec());

        if let Some(msg) = self.simulate_failure.read().clone() {
            return Err(RunnerError::ExecutionFailed(msg));
        }

        let response = self.next_response(command);
        let now = Utc::now();
        Ok(CommandOutput {
            command: command.to_vec(),
            status: response.status,
            stdout: response.stdout,
            stderr: response.stderr,
            started_at: now,
            finished_at: now,
            duration_ms: 0,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(args: &[&str]) -> Vec<String> {
        args.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_mock_runner_basic() {
        let runner = MockRunner::new().add_response(MockResponse::success("test output"));

        let result = runner.run(&argv(&["echo", "hello"])).await.unwrap();

        assert!(result.success());
        assert_eq!(result.stdout, "test output");
        assert_eq!(runner.call_count(), 1);
        assert_eq!(runner.last_call(), Some(argv(&["echo", "hello"])));
    }

    #[tokio::test]
    async fn test_mock_runner_rules_take_precedence() {
        let runner = MockRunner::new()
            .add_response(MockResponse::success("queued"))
            .on("describe-stacks", MockResponse::success("{}"));

        let matched = runner.run(&argv(&["aws", "describe-stacks"])).await.unwrap();
        assert_eq!(matched.stdout, "{}");

        let queued = runner.run(&argv(&["aws", "other"])).await.unwrap();
        assert_eq!(queued.stdout, "queued");
    }

    #[tokio::test]
    async fn test_mock_runner_failure_simulation() {
        let runner = MockRunner::new().simulate_failure("simulated error");
        let result = runner.run(&argv(&["aws"])).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_mock_runner_rejects_empty_command() {
        let runner = MockRunner::new();
        assert!(runner.run(&[]).await.is_err());
        assert_eq!(runner.call_count(), 0);
    }
}
