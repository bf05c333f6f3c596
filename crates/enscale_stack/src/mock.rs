//! Mock stack service for testing.
//!
//! Serves scripted stacks without calling the orchestration service.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::error::{StackError, StackResult};
use crate::model::{Stack, StackResource};
use crate::service::StackService;

#[derive(Debug, Clone, Default)]
struct MockStack {
    /// Statuses handed out in order; the last one repeats.
    statuses: Vec<String>,
    polls: usize,
    outputs: Vec<(String, String)>,
    resources: HashMap<String, String>,
    failing_lookups: Vec<String>,
}

/// Mock stack service for testing.
#[derive(Clone, Default)]
pub struct MockStackService {
    stacks: Arc<RwLock<HashMap<String, MockStack>>>,
    describe_calls: Arc<AtomicUsize>,
    resource_calls: Arc<AtomicUsize>,
}

impl MockStackService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script the statuses successive polls of `stack` return.
    pub fn with_statuses(self, stack: &str, statuses: &[&str]) -> Self {
        self.stacks.write().entry(stack.to_string()).or_default().statuses =
            statuses.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn with_output(self, stack: &str, key: &str, value: &str) -> Self {
        self.stacks
            .write()
            .entry(stack.to_string())
            .or_default()
            .outputs
            .push((key.to_string(), value.to_string()));
        self
    }

    /// Register a resource with its physical id.
    pub fn with_resource(self, stack: &str, logical_id: &str, physical_id: &str) -> Self {
        self.stacks
            .write()
            .entry(stack.to_string())
            .or_default()
            .resources
            .insert(logical_id.to_string(), physical_id.to_string());
        self
    }

    /// Make resource lookups of `logical_id` fail with a service error.
    pub fn with_failing_lookup(self, stack: &str, logical_id: &str) -> Self {
        self.stacks
            .write()
            .entry(stack.to_string())
            .or_default()
            .failing_lookups
            .push(logical_id.to_string());
        self
    }

    /// Number of `describe_stack` calls made.
    pub fn describe_count(&self) -> usize {
        self.describe_calls.load(Ordering::SeqCst)
    }

    /// Number of `describe_stack_resource` calls made.
    pub fn resource_count(&self) -> usize {
        self.resource_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl StackService for MockStackService {
    async fn describe_stack(&self, stack_name: &str) -> StackResult<Stack> {
        self.describe_calls.fetch_add(1, Ordering::SeqCst);
        let mut stacks = self.stacks.write();
        let mock = stacks
            .get_mut(stack_name)
            .ok_or_else(|| StackError::StackNotFound(stack_name.to_string()))?;

        let status = mock
            .statuses
            .get(mock.polls)
            .or_else(|| mock.statuses.last())
            .cloned()
            .unwrap_or_else(|| "CREATE_COMPLETE".to_string());
        mock.polls += 1;

        let mut stack = Stack::new(stack_name, status);
        for (key, value) in &mock.outputs {
            stack = stack.with_output(key.as_str(), value.as_str());
        }
        Ok(stack)
    }

    async fn describe_stack_resource(
        &self,
        stack_name: &str,
        logical_id: &str,
    ) -> StackResult<StackResource> {
        self.resource_calls.fetch_add(1, Ordering::SeqCst);
        let stacks = self.stacks.read();
        let mock = stacks
            .get(stack_name)
            .ok_or_else(|| StackError::StackNotFound(stack_name.to_string()))?;

        if mock.failing_lookups.iter().any(|k| k == logical_id) {
            return Err(StackError::CommandFailed {
                command: format!("describe-stack-resource {}", logical_id),
                message: "simulated lookup failure".to_string(),
            });
        }

        mock.resources
            .get(logical_id)
            .map(|physical_id| StackResource {
                logical_resource_id: logical_id.to_string(),
                physical_resource_id: Some(physical_id.clone()),
                resource_type: "AWS::CloudFormation::Mock".to_string(),
                resource_status: "CREATE_COMPLETE".to_string(),
            })
            .ok_or_else(|| StackError::ResourceNotFound {
                stack: stack_name.to_string(),
                logical_id: logical_id.to_string(),
            })
    }
}
