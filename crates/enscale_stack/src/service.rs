//! Stack service trait.

use async_trait::async_trait;

use crate::error::StackResult;
use crate::model::{Stack, StackResource};

/// Read access to remote stacks.
#[async_trait]
pub trait StackService: Send + Sync {
    /// Fetch a stack by name.
    async fn describe_stack(&self, stack_name: &str) -> StackResult<Stack>;

    /// Fetch one realized resource of a stack by logical id.
    async fn describe_stack_resource(
        &self,
        stack_name: &str,
        logical_id: &str,
    ) -> StackResult<StackResource>;
}
