//! Error types for the execution pipeline.

use enscale_runner::RunnerError;
use enscale_stack::StackError;
use enscale_template::TemplateError;
use thiserror::Error;

/// Result type alias for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur while executing a template run.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Invalid pipeline state: {0}")]
    InvalidState(String),

    #[error("Hook {stage} failed: {message}")]
    HookFailed { stage: String, message: String },

    #[error("Stack submission `{command}` failed with exit code {exit_code:?}: {message}")]
    SubmissionFailed {
        command: String,
        exit_code: Option<i32>,
        message: String,
    },

    #[error("Template error: {0}")]
    Template(#[from] TemplateError),

    #[error("Stack error: {0}")]
    Stack(#[from] StackError),

    #[error("Runner error: {0}")]
    Runner(#[from] RunnerError),

    #[error("Serialization error: {0}")]
    Serialization(String),
}
