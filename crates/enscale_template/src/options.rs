//! Run options shared by templates and the execution pipeline.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{TemplateError, TemplateResult};

/// Options a template run is invoked with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StackOptions {
    /// Name of the stack to create or update
    pub stack_name: Option<String>,
    /// Target region
    pub region: Option<String>,
    /// Stack this one takes network resources from
    pub vpc_stack_name: Option<String>,
    /// Parameter overrides, `Key=Value` pairs separated by `;`
    pub parameters: Option<String>,
    /// DNS zone records are created in
    pub hosted_zone: Option<String>,
    /// `all` or a single availability zone suffix letter
    pub availability_zone: String,
    /// Print the template instead of submitting it
    pub expand: bool,
    /// Create the stack rather than update it
    pub create_stack: bool,
    /// Capabilities acknowledged on submission, e.g. `CAPABILITY_IAM`
    pub capabilities: Option<String>,
    /// Run pre-run hooks
    pub pre_run: bool,
    /// Run post-run hooks
    pub post_run: bool,
}

impl Default for StackOptions {
    fn default() -> Self {
        Self {
            stack_name: None,
            region: None,
            vpc_stack_name: None,
            parameters: None,
            hosted_zone: None,
            availability_zone: "all".to_string(),
            expand: false,
            create_stack: false,
            capabilities: None,
            pre_run: false,
            post_run: false,
        }
    }
}

impl StackOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_stack_name(mut self, name: impl Into<String>) -> Self {
        self.stack_name = Some(name.into());
        self
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    pub fn with_vpc_stack_name(mut self, name: impl Into<String>) -> Self {
        self.vpc_stack_name = Some(name.into());
        self
    }

    pub fn with_parameters(mut self, parameters: impl Into<String>) -> Self {
        self.parameters = Some(parameters.into());
        self
    }

    pub fn with_hosted_zone(mut self, zone: impl Into<String>) -> Self {
        self.hosted_zone = Some(zone.into());
        self
    }

    pub fn with_availability_zone(mut self, zone: impl Into<String>) -> Self {
        self.availability_zone = zone.into();
        self
    }

    pub fn with_capabilities(mut self, capabilities: impl Into<String>) -> Self {
        self.capabilities = Some(capabilities.into());
        self
    }

    pub fn expand(mut self) -> Self {
        self.expand = true;
        self
    }

    pub fn create(mut self) -> Self {
        self.create_stack = true;
        self
    }

    pub fn with_hooks(mut self, pre_run: bool, post_run: bool) -> Self {
        self.pre_run = pre_run;
        self.post_run = post_run;
        self
    }

    /// Load options from a YAML file.
    pub fn from_yaml_file(path: &Path) -> TemplateResult<Self> {
        let content = fs::read_to_string(path)?;
        Ok(serde_yaml::from_str(&content)?)
    }

    pub fn stack_name(&self) -> Option<&str> {
        self.stack_name.as_deref()
    }

    pub fn region(&self) -> Option<&str> {
        self.region.as_deref()
    }

    /// Name of the VPC stack; required by templates placing resources in it.
    pub fn vpc_stack_name(&self) -> TemplateResult<&str> {
        self.vpc_stack_name
            .as_deref()
            .ok_or_else(|| TemplateError::MissingOption("Requires vpc-stack-name".to_string()))
    }

    /// Parameter overrides as ordered key/value pairs.
    pub fn parameters(&self) -> TemplateResult<Vec<(String, String)>> {
        let raw = match &self.parameters {
            Some(raw) => raw,
            None => return Ok(Vec::new()),
        };

        raw.split(';')
            .filter(|pair| !pair.trim().is_empty())
            .map(|pair| {
                pair.split_once('=')
                    .map(|(k, v)| (k.trim().to_string(), v.to_string()))
                    .ok_or_else(|| {
                        TemplateError::InvalidOption(format!(
                            "parameter override `{}` is not in Key=Value form",
                            pair
                        ))
                    })
            })
            .collect()
    }

    /// Hosted zone, always ending with a `.`.
    pub fn hosted_zone(&self) -> TemplateResult<String> {
        let zone = self.hosted_zone.as_deref().ok_or_else(|| {
            TemplateError::MissingOption("Hosted zone has to be configured".to_string())
        })?;
        if zone.ends_with('.') {
            Ok(zone.to_string())
        } else {
            Ok(format!("{}.", zone))
        }
    }

    /// Select availability zones by suffix letter.
    ///
    /// `zones` are the available zone names of the region (e.g. `us-east-1a`).
    /// Returns every zone for `all`, otherwise only the matching one.
    pub fn select_availability_zones(
        &self,
        zones: &[String],
    ) -> TemplateResult<BTreeMap<char, String>> {
        let by_suffix: BTreeMap<char, String> = zones
            .iter()
            .filter_map(|name| name.chars().last().map(|c| (c, name.clone())))
            .collect();

        let requested = self.availability_zone.as_str();
        if requested == "all" {
            return Ok(by_suffix);
        }

        let mut chars = requested.chars();
        match (chars.next(), chars.next()) {
            (Some(suffix), None) if by_suffix.contains_key(&suffix) => Ok(by_suffix
                .into_iter()
                .filter(|(k, _)| *k == suffix)
                .collect()),
            _ => Err(TemplateError::UnsupportedAvailabilityZone {
                zone: format!("{} in {}", requested, self.region().unwrap_or("<unset>")),
                supported: by_suffix.keys().map(|c| c.to_string()).collect::<Vec<_>>().join(","),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn zones() -> Vec<String> {
        vec!["us-east-1a".to_string(), "us-east-1c".to_string(), "us-east-1d".to_string()]
    }

    #[test]
    fn test_parameters_are_parsed() {
        let options = StackOptions::new().with_parameters("Env=prod;Size=10;");
        assert_eq!(
            options.parameters().unwrap(),
            vec![
                ("Env".to_string(), "prod".to_string()),
                ("Size".to_string(), "10".to_string())
            ]
        );
    }

    #[test]
    fn test_malformed_parameters_fail() {
        let options = StackOptions::new().with_parameters("Env");
        assert!(options.parameters().is_err());
    }

    #[test]
    fn test_missing_vpc_stack_name() {
        let err = StackOptions::new().vpc_stack_name().unwrap_err();
        assert!(err.to_string().contains("vpc-stack-name"));
    }

    #[test]
    fn test_hosted_zone_gets_trailing_dot() {
        let options = StackOptions::new().with_hosted_zone("private.test");
        assert_eq!(options.hosted_zone().unwrap(), "private.test.");

        let options = StackOptions::new().with_hosted_zone("private.test.");
        assert_eq!(options.hosted_zone().unwrap(), "private.test.");

        assert!(StackOptions::new().hosted_zone().is_err());
    }

    #[test]
    fn test_select_all_zones() {
        let selected = StackOptions::new().select_availability_zones(&zones()).unwrap();
        assert_eq!(selected.len(), 3);
        assert_eq!(selected.get(&'c'), Some(&"us-east-1c".to_string()));
    }

    #[test]
    fn test_select_single_zone() {
        let options = StackOptions::new().with_availability_zone("d");
        let selected = options.select_availability_zones(&zones()).unwrap();
        assert_eq!(selected.len(), 1);
        assert_eq!(selected.get(&'d'), Some(&"us-east-1d".to_string()));
    }

    #[test]
    fn test_select_unknown_zone_fails() {
        let options = StackOptions::new()
            .with_region("us-east-1")
            .with_availability_zone("b");
        let err = options.select_availability_zones(&zones()).unwrap_err();
        assert!(err.to_string().contains("a,c,d"));
    }

    #[test]
    fn test_yaml_defaults() {
        let options: StackOptions = serde_yaml::from_str("stack_name: web\nexpand: true\n").unwrap();
        assert_eq!(options.stack_name(), Some("web"));
        assert!(options.expand);
        assert_eq!(options.availability_zone, "all");
    }
}
