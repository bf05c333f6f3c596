//! # enscale_runner
//!
//! External command execution for enscale.
//!
//! This crate spawns external tools (most notably the `aws` CLI), drains
//! their stdout and stderr concurrently line by line, and hands each line to
//! a caller-supplied handler tagged with the stream it came from.
//!
//! # Features
//!
//! - **Process Runner**: std process + one reader thread per stream
//! - **Tee Mode**: mirror child output onto the parent's stdout/stderr
//! - **Missing Executables**: reported and recovered as [`CommandStatus::NotFound`]
//! - **Mock Runner**: for testing without spawning processes
//!
//! # Example
//!
//! ```rust,no_run
//! use enscale_runner::{CommandRunner, ProcessRunner, ProcessRunnerOptions};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let runner = ProcessRunner::new(ProcessRunnerOptions::default());
//!     let command = vec!["aws".to_string(), "--version".to_string()];
//!
//!     let output = runner.run(&command).await?;
//!     println!("Status: {:?}", output.status);
//!
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod mock;
pub mod process;
pub mod runner;

pub use error::{RunnerError, RunnerResult};
pub use mock::{MockResponse, MockRunner};
pub use process::{LogHandler, LogLine, LogStream, ProcessRunner, ProcessRunnerOptions};
pub use runner::{format_command, CommandOutput, CommandRunner, CommandStatus};
