//! Template builder.
//!
//! A [`Template`] owns one [`Document`], the [`ParameterRegistry`] that
//! tracks parameters declared in it, and the [`StackOptions`] of the run.
//! Everything is built in a single pass and serialized once when emitted.

use std::sync::OnceLock;

use regex::Regex;
use serde_json::Value;
use tracing::debug;

use crate::document::Document;
use crate::error::{TemplateError, TemplateResult};
use crate::intrinsic::{get_att, Ref};
use crate::options::StackOptions;
use crate::parameter::{Parameter, ParameterRegistry};
use crate::resource::{Output, Resource};

fn logical_name_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[A-Za-z][A-Za-z0-9]*$").expect("static pattern is valid"))
}

/// Logical ids start with a letter and are alphanumeric.
fn check_logical_name(kind: &str, name: &str) -> TemplateResult<()> {
    if logical_name_pattern().is_match(name) {
        Ok(())
    } else {
        Err(TemplateError::InvalidName(format!(
            "{} `{}` must start with a letter and be alphanumeric",
            kind, name
        )))
    }
}

/// Template under construction.
#[derive(Debug, Clone)]
pub struct Template {
    options: StackOptions,
    document: Document,
    registry: ParameterRegistry,
}

impl Default for Template {
    fn default() -> Self {
        Self {
            options: StackOptions::default(),
            document: Document::new(),
            registry: ParameterRegistry::new(),
        }
    }
}

impl Template {
    /// Create a template for a run; parameter overrides are bound up front.
    pub fn new(options: StackOptions) -> TemplateResult<Self> {
        let registry = ParameterRegistry::with_overrides(options.parameters()?);
        Ok(Self {
            options,
            document: Document::new(),
            registry,
        })
    }

    pub fn options(&self) -> &StackOptions {
        &self.options
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn registry(&self) -> &ParameterRegistry {
        &self.registry
    }

    /// Template description.
    pub fn description(&mut self, desc: impl Into<String>) -> &mut Self {
        self.document.set_description(desc);
        self
    }

    /// Declare a parameter and return its reference token.
    pub fn parameter(&mut self, name: &str, parameter: Parameter) -> TemplateResult<Ref> {
        check_logical_name("parameter", name)?;
        let value = serde_json::to_value(&parameter)?;
        self.document.insert_parameter(name, value);
        self.registry.declare(name, &parameter);
        debug!("Declared parameter {}", name);
        Ok(Ref::new(name))
    }

    /// Declare a resource.
    ///
    /// Instances also get a `<name>PrivateIpAddress` output.
    pub fn resource(&mut self, name: &str, resource: Resource) -> TemplateResult<Ref> {
        check_logical_name("resource", name)?;
        let is_instance = resource.is_instance();
        let value = serde_json::to_value(&resource)?;
        self.document.insert_resource(name, value);
        debug!("Declared resource {} ({})", name, resource.resource_type);

        if is_instance {
            self.output(
                &format!("{}PrivateIpAddress", name),
                Output::new(
                    format!("{} Private IP Address", name),
                    get_att(name, "PrivateIp"),
                ),
            )?;
        }
        Ok(Ref::new(name))
    }

    /// Declare an output.
    pub fn output(&mut self, name: &str, output: Output) -> TemplateResult<()> {
        check_logical_name("output", name)?;
        let value = serde_json::to_value(&output)?;
        self.document.insert_output(name, value);
        Ok(())
    }

    /// Declare a mapping.
    pub fn mapping(&mut self, name: &str, mapping: Value) -> &mut Self {
        self.document.insert_mapping(name, mapping);
        self
    }

    /// Reference token for a declared parameter.
    pub fn param_ref(&self, name: &str) -> TemplateResult<Ref> {
        self.registry.reference(name)
    }

    /// Reference token for a declared resource.
    pub fn resource_ref(&self, name: &str) -> TemplateResult<Ref> {
        if self.document.has_resource(name) {
            Ok(Ref::new(name))
        } else {
            Err(TemplateError::UnknownResource(name.to_string()))
        }
    }

    /// Pretty-printed document.
    pub fn to_json_pretty(&self) -> TemplateResult<String> {
        self.document.to_json_pretty()
    }

    /// Compact document, rejected when too large for inline submission.
    pub fn template_body(&self) -> TemplateResult<String> {
        self.document.to_template_body()
    }
}
