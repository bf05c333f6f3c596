//! Remote stack model, as returned by the orchestration service.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

fn in_progress_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(CREATE|UPDATE)_IN_PROGRESS$").expect("static pattern is valid"))
}

/// Coarse lifecycle phase derived from a stack status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StackPhase {
    Creating,
    Updating,
    Stable,
    Failed,
}

/// Raw stack status string, e.g. `CREATE_COMPLETE`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StackStatus(String);

impl StackStatus {
    pub fn new(status: impl Into<String>) -> Self {
        Self(status.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the poll loop should keep waiting.
    pub fn is_in_progress(&self) -> bool {
        in_progress_pattern().is_match(&self.0)
    }

    pub fn phase(&self) -> StackPhase {
        if self.is_in_progress() {
            if self.0.starts_with("CREATE") {
                StackPhase::Creating
            } else {
                StackPhase::Updating
            }
        } else if self.0.contains("FAILED") || self.0.contains("ROLLBACK") {
            StackPhase::Failed
        } else {
            StackPhase::Stable
        }
    }
}

impl fmt::Display for StackStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Output of a realized stack.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct StackOutput {
    pub output_key: String,
    pub output_value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A realized resource of a stack.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct StackResource {
    pub logical_resource_id: String,
    #[serde(default)]
    pub physical_resource_id: Option<String>,
    pub resource_type: String,
    pub resource_status: String,
}

/// A remote stack.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Stack {
    pub stack_name: String,
    #[serde(default)]
    pub stack_id: String,
    #[serde(rename = "StackStatus")]
    pub status: StackStatus,
    #[serde(default)]
    pub outputs: Vec<StackOutput>,
}

impl Stack {
    pub fn new(name: impl Into<String>, status: impl Into<String>) -> Self {
        Self {
            stack_name: name.into(),
            stack_id: String::new(),
            status: StackStatus::new(status),
            outputs: Vec::new(),
        }
    }

    pub fn with_output(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.outputs.push(StackOutput {
            output_key: key.into(),
            output_value: value.into(),
            description: None,
        });
        self
    }

    /// Value of the first output named `key`.
    pub fn output(&self, key: &str) -> Option<&str> {
        self.outputs
            .iter()
            .find(|o| o.output_key == key)
            .map(|o| o.output_value.as_str())
    }
}

/// Parameter entry as submitted to the service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ParameterValue {
    pub parameter_key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameter_value: Option<String>,
}

impl ParameterValue {
    pub fn new(key: impl Into<String>, value: Option<String>) -> Self {
        Self {
            parameter_key: key.into(),
            parameter_value: value,
        }
    }
}
