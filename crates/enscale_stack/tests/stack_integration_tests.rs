//! Integration tests for stack polling and resolution over the CLI service.

use std::sync::Arc;
use std::time::Duration;

use enscale_runner::{MockResponse, MockRunner};
use enscale_stack::{
    generate_parameters, get_resources, AwsCliStackService, StackPhase, StackWaiter, WaitOptions,
};

fn stack_json(status: &str) -> String {
    format!(
        r#"{{"Stacks": [{{"StackName": "vpc", "StackStatus": "{}", "Outputs": [{{"OutputKey": "PrivateSecurityGroup", "OutputValue": "sg-9"}}]}}]}}"#,
        status
    )
}

/// Test that the waiter polls the CLI until the stack completes
#[tokio::test]
async fn test_wait_over_cli_service() {
    let runner = MockRunner::new()
        .add_response(MockResponse::success(stack_json("CREATE_IN_PROGRESS")))
        .add_response(MockResponse::success(stack_json("CREATE_IN_PROGRESS")))
        .add_response(MockResponse::success(stack_json("CREATE_COMPLETE")));
    let service = AwsCliStackService::new(Arc::new(runner.clone()), "us-east-1").unwrap();

    let stack = StackWaiter::new(&service)
        .with_options(WaitOptions::default().interval(Duration::ZERO))
        .wait("vpc")
        .await
        .unwrap();

    assert_eq!(stack.status.phase(), StackPhase::Stable);
    assert_eq!(runner.call_count(), 3);
}

/// Test resolution when direct lookups fail and outputs provide the values
#[tokio::test]
async fn test_resolution_falls_back_to_outputs() {
    let runner = MockRunner::new()
        .on("describe-stacks", MockResponse::success(stack_json("CREATE_COMPLETE")))
        .on(
            "--logical-resource-id",
            MockResponse::failure(255, "Resource PrivateSecurityGroup does not exist"),
        );
    let service = AwsCliStackService::new(Arc::new(runner.clone()), "us-east-1").unwrap();
    let stack = StackWaiter::new(&service).wait("vpc").await.unwrap();

    let values = get_resources(&service, &stack, &["PrivateSecurityGroup", "Missing"])
        .await
        .unwrap();
    assert_eq!(values, vec!["sg-9"]);

    let params = generate_parameters(&service, &stack, &["PrivateSecurityGroup", "Missing"])
        .await
        .unwrap();
    assert_eq!(params[0].parameter_value.as_deref(), Some("sg-9"));
    assert_eq!(params[1].parameter_value, None);
}
