//! Error types for remote stack access.

use enscale_runner::RunnerError;
use thiserror::Error;

/// Result type alias for stack operations.
pub type StackResult<T> = Result<T, StackError>;

/// Errors raised while talking to the orchestration service.
#[derive(Error, Debug)]
pub enum StackError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Stack not found: {0}")]
    StackNotFound(String),

    #[error("Resource {logical_id} not found in stack {stack}")]
    ResourceNotFound { stack: String, logical_id: String },

    #[error("Command `{command}` failed: {message}")]
    CommandFailed { command: String, message: String },

    #[error("aws executable not found")]
    CliNotFound,

    #[error("Timed out after {seconds}s waiting for stack {stack}")]
    Timeout { stack: String, seconds: u64 },

    #[error("Runner error: {0}")]
    Runner(#[from] RunnerError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
