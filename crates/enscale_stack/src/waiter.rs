//! Poll a stack until it leaves its in-progress state.

use std::time::Duration;

use tokio::time::{sleep, Instant};
use tracing::info;

use crate::error::{StackError, StackResult};
use crate::model::Stack;
use crate::service::StackService;

/// Poll configuration.
#[derive(Debug, Clone)]
pub struct WaitOptions {
    /// Delay between polls
    pub interval: Duration,
    /// Give up after this long; waits forever when unset
    pub timeout: Option<Duration>,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(5),
            timeout: None,
        }
    }
}

impl WaitOptions {
    pub fn interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// Waits for stacks to converge.
pub struct StackWaiter<'a, S: StackService + ?Sized> {
    service: &'a S,
    options: WaitOptions,
}

impl<'a, S: StackService + ?Sized> StackWaiter<'a, S> {
    pub fn new(service: &'a S) -> Self {
        Self {
            service,
            options: WaitOptions::default(),
        }
    }

    pub fn with_options(mut self, options: WaitOptions) -> Self {
        self.options = options;
        self
    }

    /// Fetch the stack and keep polling while it is creating or updating.
    ///
    /// Returns the stack in the first status that is not in progress. Failure
    /// statuses are returned as well; callers inspect [`Stack::status`].
    pub async fn wait(&self, stack_name: &str) -> StackResult<Stack> {
        let deadline = self.options.timeout.map(|t| Instant::now() + t);
        let mut stack = self.service.describe_stack(stack_name).await?;

        while stack.status.is_in_progress() {
            info!("Waiting for stack {} [{}]", stack_name, stack.status);
            if let Some(deadline) = deadline {
                if Instant::now() + self.options.interval > deadline {
                    return Err(StackError::Timeout {
                        stack: stack_name.to_string(),
                        seconds: self.options.timeout.map(|t| t.as_secs()).unwrap_or_default(),
                    });
                }
            }
            sleep(self.options.interval).await;
            stack = self.service.describe_stack(stack_name).await?;
        }

        info!("Stack {} reached {}", stack_name, stack.status);
        Ok(stack)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockStackService;

    fn fast() -> WaitOptions {
        WaitOptions::default().interval(Duration::ZERO)
    }

    #[tokio::test]
    async fn test_polls_until_complete() {
        let service = MockStackService::new().with_statuses(
            "web",
            &["CREATE_IN_PROGRESS", "CREATE_IN_PROGRESS", "CREATE_COMPLETE"],
        );

        let stack = StackWaiter::new(&service).with_options(fast()).wait("web").await.unwrap();

        assert_eq!(stack.status.as_str(), "CREATE_COMPLETE");
        assert_eq!(service.describe_count(), 3);
    }

    #[tokio::test]
    async fn test_failure_status_is_returned() {
        let service = MockStackService::new()
            .with_statuses("web", &["UPDATE_IN_PROGRESS", "UPDATE_ROLLBACK_COMPLETE"]);

        let stack = StackWaiter::new(&service).with_options(fast()).wait("web").await.unwrap();
        assert_eq!(stack.status.as_str(), "UPDATE_ROLLBACK_COMPLETE");
        assert_eq!(service.describe_count(), 2);
    }

    #[tokio::test]
    async fn test_deadline() {
        let service = MockStackService::new().with_statuses("web", &["CREATE_IN_PROGRESS"]);
        let options = WaitOptions::default()
            .interval(Duration::from_millis(20))
            .timeout(Duration::from_millis(50));

        let err = StackWaiter::new(&service).with_options(options).wait("web").await.unwrap_err();
        assert!(matches!(err, StackError::Timeout { .. }));
    }

    #[tokio::test]
    async fn test_missing_stack_propagates() {
        let service = MockStackService::new();
        assert!(StackWaiter::new(&service).with_options(fast()).wait("web").await.is_err());
    }
}
