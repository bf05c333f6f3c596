//! # enscale_core
//!
//! Execution pipeline for enscale template runs.
//!
//! A [`Pipeline`] runs pre-run hooks, emits the template (printing it when
//! expanding, submitting it through the `aws` CLI otherwise) and runs post-run
//! hooks, then returns an [`ExecutionReport`] describing every stage.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use enscale_core::Pipeline;
//! use enscale_runner::{ProcessRunner, ProcessRunnerOptions};
//! use enscale_template::{StackOptions, Template};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let template = Template::new(StackOptions::new().with_stack_name("web").expand())?;
//!     let mut pipeline = Pipeline::new(Arc::new(ProcessRunner::new(ProcessRunnerOptions::default())));
//!
//!     let report = pipeline.exec(&template).await.into_result()?;
//!     println!("{:?}", report.state);
//!
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod pipeline;
pub mod submit;

pub use error::{CoreError, CoreResult};
pub use pipeline::{
    Emission, ExecutionReport, Hook, HookFuture, Pipeline, PipelineState, StageKind, StageOutcome,
    StageReport,
};
pub use submit::StackSubmission;
