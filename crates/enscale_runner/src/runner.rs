//! Command runner trait and result types.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::RunnerResult;

/// How a command ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandStatus {
    /// Process exited with the given code.
    Exited(i32),
    /// Process was terminated by a signal.
    Terminated,
    /// The executable could not be found; nothing was run.
    NotFound,
}

/// Result of a command execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandOutput {
    /// The argument vector that was executed
    pub command: Vec<String>,
    /// How the process ended
    pub status: CommandStatus,
    /// Captured stdout
    pub stdout: String,
    /// Captured stderr
    pub stderr: String,
    /// Execution start time
    pub started_at: DateTime<Utc>,
    /// Execution end time
    pub finished_at: DateTime<Utc>,
    /// Duration in milliseconds
    pub duration_ms: u64,
}

impl CommandOutput {
    /// Output for a command whose executable was not found.
    pub fn not_found(command: &[String]) -> Self {
        let now = Utc::now();
        Self {
            command: command.to_vec(),
            status: CommandStatus::NotFound,
            stdout: String::new(),
            stderr: String::new(),
            started_at: now,
            finished_at: now,
            duration_ms: 0,
        }
    }

    /// Check if execution was successful (exit code 0).
    pub fn success(&self) -> bool {
        self.status == CommandStatus::Exited(0)
    }

    /// Exit code, when the process exited normally.
    pub fn exit_code(&self) -> Option<i32> {
        match self.status {
            CommandStatus::Exited(code) => Some(code),
            _ => None,
        }
    }

    /// Get combined output (stdout + stderr).
    pub fn combined_output(&self) -> String {
        if self.stdout.is_empty() {
            self.stderr.clone()
        } else if self.stderr.is_empty() {
            self.stdout.clone()
        } else {
            format!("{}\n{}", self.stdout, self.stderr)
        }
    }
}

/// Command runner trait.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run a command given as a non-empty argument vector and wait for it to finish.
    async fn run(&self, command: &[String]) -> RunnerResult<CommandOutput>;
}

/// Format a command line for logging, quoting arguments that need it.
pub fn format_command(command: &[String]) -> String {
    command
        .iter()
        .map(|arg| {
            if arg.is_empty() || arg.contains(' ') || arg.contains('"') || arg.contains('{') {
                format!("'{}'", arg)
            } else {
                arg.clone()
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
