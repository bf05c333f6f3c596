//! The template document.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{TemplateError, TemplateResult};

/// Limit on a template body sent inline to the orchestration service.
pub const TEMPLATE_BODY_LIMIT: usize = 51200;

/// Template format version emitted at the top of every document.
pub const FORMAT_VERSION: &str = "2010-09-09";

/// In-memory template document.
///
/// Sections keep insertion order; names are unique per section and a second
/// insert under the same name replaces the earlier entry.
#[derive(Debug, Clone, Serialize)]
pub struct Document {
    #[serde(rename = "AWSTemplateFormatVersion")]
    format_version: String,
    #[serde(rename = "Description", skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(rename = "Parameters", skip_serializing_if = "Map::is_empty")]
    parameters: Map<String, Value>,
    #[serde(rename = "Mappings", skip_serializing_if = "Map::is_empty")]
    mappings: Map<String, Value>,
    #[serde(rename = "Resources")]
    resources: Map<String, Value>,
    #[serde(rename = "Outputs", skip_serializing_if = "Map::is_empty")]
    outputs: Map<String, Value>,
}

impl Default for Document {
    fn default() -> Self {
        Self {
            format_version: FORMAT_VERSION.to_string(),
            description: None,
            parameters: Map::new(),
            mappings: Map::new(),
            resources: Map::new(),
            outputs: Map::new(),
        }
    }
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_description(&mut self, desc: impl Into<String>) {
        self.description = Some(desc.into());
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn insert_parameter(&mut self, name: impl Into<String>, value: Value) {
        self.parameters.insert(name.into(), value);
    }

    pub fn insert_mapping(&mut self, name: impl Into<String>, value: Value) {
        self.mappings.insert(name.into(), value);
    }

    pub fn insert_resource(&mut self, name: impl Into<String>, value: Value) {
        self.resources.insert(name.into(), value);
    }

    pub fn insert_output(&mut self, name: impl Into<String>, value: Value) {
        self.outputs.insert(name.into(), value);
    }

    pub fn parameters(&self) -> &Map<String, Value> {
        &self.parameters
    }

    pub fn mappings(&self) -> &Map<String, Value> {
        &self.mappings
    }

    pub fn resources(&self) -> &Map<String, Value> {
        &self.resources
    }

    pub fn outputs(&self) -> &Map<String, Value> {
        &self.outputs
    }

    pub fn parameter(&self, name: &str) -> Option<&Value> {
        self.parameters.get(name)
    }

    pub fn resource(&self, name: &str) -> Option<&Value> {
        self.resources.get(name)
    }

    pub fn output(&self, name: &str) -> Option<&Value> {
        self.outputs.get(name)
    }

    pub fn has_resource(&self, name: &str) -> bool {
        self.resources.contains_key(name)
    }

    /// Compact JSON.
    pub fn to_json(&self) -> TemplateResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Pretty-printed JSON, as shown in dry runs.
    pub fn to_json_pretty(&self) -> TemplateResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Compact JSON suitable for inline submission.
    ///
    /// Fails instead of truncating when the body reaches [`TEMPLATE_BODY_LIMIT`].
    pub fn to_template_body(&self) -> TemplateResult<String> {
        let body = self.to_json()?;
        check_body_size(&body)?;
        Ok(body)
    }
}

/// Reject template bodies the service will not accept inline.
pub fn check_body_size(body: &str) -> TemplateResult<()> {
    if body.len() >= TEMPLATE_BODY_LIMIT {
        return Err(TemplateError::TemplateTooLarge {
            size: body.len(),
            limit: TEMPLATE_BODY_LIMIT,
        });
    }
    Ok(())
}
