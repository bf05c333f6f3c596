//! # enscale_stack
//!
//! Remote stack access for enscale.
//!
//! Reads stacks from the orchestration service, polls them until they leave
//! their in-progress state, and resolves resource ids and outputs for use as
//! inputs of dependent stacks.
//!
//! # Features
//!
//! - **Stack Service**: async trait over the remote service, with an `aws` CLI implementation
//! - **Waiter**: fixed-interval polling with an optional deadline
//! - **Resolution**: physical id lookup with fallback to stack outputs
//! - **Mock Service**: scripted stacks for testing
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use enscale_runner::{ProcessRunner, ProcessRunnerOptions};
//! use enscale_stack::{get_resource, AwsCliStackService, StackWaiter};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let runner = Arc::new(ProcessRunner::new(ProcessRunnerOptions::default().quiet()));
//!     let service = AwsCliStackService::new(runner, "us-east-1")?;
//!
//!     let stack = StackWaiter::new(&service).wait("vpc").await?;
//!     println!("{:?}", get_resource(&service, &stack, "VpcId").await?);
//!
//!     Ok(())
//! }
//! ```

pub mod cli_service;
pub mod error;
pub mod mock;
pub mod model;
pub mod resolve;
pub mod service;
pub mod waiter;

pub use cli_service::AwsCliStackService;
pub use error::{StackError, StackResult};
pub use mock::MockStackService;
pub use model::{ParameterValue, Stack, StackOutput, StackPhase, StackResource, StackStatus};
pub use resolve::{gen_ssh_key_name, generate_parameters, get_resource, get_resources};
pub use service::StackService;
pub use waiter::{StackWaiter, WaitOptions};
