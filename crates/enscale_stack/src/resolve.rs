//! Resolve values out of a realized stack.
//!
//! A key is looked up as a logical resource id first (yielding the physical
//! id) and then as an output key. Misses are `None`, not errors, so that
//! parameters for dependent stacks can be generated on a best-effort basis.

use std::sync::OnceLock;

use regex::Regex;
use tracing::{debug, warn};

use crate::error::{StackError, StackResult};
use crate::model::{ParameterValue, Stack};
use crate::service::StackService;

/// Physical id of resource `key`, or else the value of output `key`.
pub async fn get_resource<S: StackService + ?Sized>(
    service: &S,
    stack: &Stack,
    key: &str,
) -> StackResult<Option<String>> {
    if key.is_empty() {
        return Err(StackError::InvalidArgument(
            "key must not be empty".to_string(),
        ));
    }

    match service.describe_stack_resource(&stack.stack_name, key).await {
        Ok(resource) => {
            if let Some(physical_id) = resource.physical_resource_id {
                return Ok(Some(physical_id));
            }
        }
        Err(e) => debug!("Resource lookup of {} failed, using outputs: {}", key, e),
    }

    Ok(stack.output(key).map(str::to_string))
}

/// Resolve every key, dropping the ones that resolve to nothing.
pub async fn get_resources<S: StackService + ?Sized>(
    service: &S,
    stack: &Stack,
    keys: &[&str],
) -> StackResult<Vec<String>> {
    if keys.is_empty() {
        return Err(StackError::InvalidArgument(
            "keys must not be empty".to_string(),
        ));
    }

    let mut values = Vec::with_capacity(keys.len());
    for key in keys {
        match get_resource(service, stack, key).await? {
            Some(value) => values.push(value),
            None => warn!("Nothing found for {} in stack {}, skipping", key, stack.stack_name),
        }
    }
    Ok(values)
}

/// One parameter entry per key, valued with whatever the key resolves to.
pub async fn generate_parameters<S: StackService + ?Sized>(
    service: &S,
    stack: &Stack,
    keys: &[&str],
) -> StackResult<Vec<ParameterValue>> {
    let mut parameters = Vec::with_capacity(keys.len());
    for key in keys {
        let value = get_resource(service, stack, key).await?;
        parameters.push(ParameterValue::new(*key, value));
    }
    Ok(parameters)
}

/// `BatchProcessing` becomes `batch_processing`, `africa-1` becomes `africa_1`.
fn underscore(word: &str) -> String {
    static ACRONYM: OnceLock<Regex> = OnceLock::new();
    static BOUNDARY: OnceLock<Regex> = OnceLock::new();
    let acronym = ACRONYM.get_or_init(|| Regex::new(r"([A-Z\d]+)([A-Z][a-z])").expect("static pattern is valid"));
    let boundary = BOUNDARY.get_or_init(|| Regex::new(r"([a-z\d])([A-Z])").expect("static pattern is valid"));

    let word = acronym.replace_all(word, "${1}_${2}");
    let word = boundary.replace_all(&word, "${1}_${2}");
    word.replace('-', "_").to_lowercase()
}

/// SSH key pair name for an application deployed in `region` by `stack_name`.
///
/// Each part is underscored, so the name only holds `[a-z0-9_]`.
pub fn gen_ssh_key_name(app_name: &str, region: &str, stack_name: &str) -> String {
    [app_name, region, stack_name]
        .iter()
        .map(|part| underscore(part))
        .collect::<Vec<_>>()
        .join("_")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockStackService;

    fn service() -> MockStackService {
        MockStackService::new()
            .with_statuses("vpc", &["CREATE_COMPLETE"])
            .with_resource("vpc", "Vpc", "vpc-123")
            .with_output("vpc", "Vpc", "vpc-from-output")
            .with_output("vpc", "SubnetA", "subnet-a")
            .with_failing_lookup("vpc", "SubnetA")
    }

    #[tokio::test]
    async fn test_resource_lookup_wins_over_outputs() {
        let service = service();
        let stack = service.describe_stack("vpc").await.unwrap();
        assert_eq!(
            get_resource(&service, &stack, "Vpc").await.unwrap(),
            Some("vpc-123".to_string())
        );
    }

    #[tokio::test]
    async fn test_failed_lookup_falls_back_to_outputs() {
        let service = service();
        let stack = service.describe_stack("vpc").await.unwrap();
        assert_eq!(
            get_resource(&service, &stack, "SubnetA").await.unwrap(),
            Some("subnet-a".to_string())
        );
    }

    #[tokio::test]
    async fn test_absent_key_is_none() {
        let service = service();
        let stack = service.describe_stack("vpc").await.unwrap();
        assert_eq!(get_resource(&service, &stack, "Nothing").await.unwrap(), None);
        assert!(get_resource(&service, &stack, "").await.is_err());
    }

    #[tokio::test]
    async fn test_get_resources_drops_misses() {
        let service = service();
        let stack = service.describe_stack("vpc").await.unwrap();
        let values = get_resources(&service, &stack, &["Vpc", "Nothing", "SubnetA"])
            .await
            .unwrap();
        assert_eq!(values, vec!["vpc-123", "subnet-a"]);
        assert!(get_resources(&service, &stack, &[]).await.is_err());
    }

    #[tokio::test]
    async fn test_generate_parameters_keeps_every_key() {
        let service = service();
        let stack = service.describe_stack("vpc").await.unwrap();
        let params = generate_parameters(&service, &stack, &["Vpc", "Nothing"]).await.unwrap();
        assert_eq!(
            params,
            vec![
                ParameterValue::new("Vpc", Some("vpc-123".to_string())),
                ParameterValue::new("Nothing", None)
            ]
        );
    }

    #[test]
    fn test_ssh_key_name() {
        let name = gen_ssh_key_name("TestBox", "africa-1", "BatchProcessing");
        assert_eq!(name, "test_box_africa_1_batch_processing");
        assert!(name.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_'));

        assert_eq!(gen_ssh_key_name("Web", "us-east-1", "Prod"), "web_us_east_1_prod");
        assert_eq!(gen_ssh_key_name("HTTPServer", "eu-west-1", "prod"), "http_server_eu_west_1_prod");
    }
}
