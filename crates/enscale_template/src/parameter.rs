//! Stack parameters and the registry that tracks them.

use serde::{Serialize, Serializer};
use serde_json::Value;

use crate::error::{TemplateError, TemplateResult};
use crate::intrinsic::Ref;

/// Parameter type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParameterType {
    String,
    Number,
    NumberList,
    CommaDelimitedList,
    KeyPairName,
    /// Any other type identifier understood by the service.
    Custom(String),
}

impl Default for ParameterType {
    fn default() -> Self {
        Self::String
    }
}

impl ParameterType {
    pub fn as_str(&self) -> &str {
        match self {
            ParameterType::String => "String",
            ParameterType::Number => "Number",
            ParameterType::NumberList => "List<Number>",
            ParameterType::CommaDelimitedList => "CommaDelimitedList",
            ParameterType::KeyPairName => "AWS::EC2::KeyPair::KeyName",
            ParameterType::Custom(s) => s,
        }
    }
}

impl Serialize for ParameterType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// A declared input parameter.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Parameter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub no_echo: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "Type")]
    pub param_type: ParameterType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_length: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_value: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_value: Option<i64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub allowed_values: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allowed_pattern: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub constraint_description: Option<String>,
}

impl Parameter {
    pub fn new(param_type: ParameterType) -> Self {
        Self {
            param_type,
            ..Default::default()
        }
    }

    pub fn string() -> Self {
        Self::new(ParameterType::String)
    }

    pub fn number() -> Self {
        Self::new(ParameterType::Number)
    }

    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn description(mut self, desc: impl Into<String>) -> Self {
        self.description = Some(desc.into());
        self
    }

    /// Hide the value when the stack is described.
    pub fn no_echo(mut self) -> Self {
        self.no_echo = true;
        self
    }

    pub fn length(mut self, min: u32, max: u32) -> Self {
        self.min_length = Some(min);
        self.max_length = Some(max);
        self
    }

    pub fn value_range(mut self, min: i64, max: i64) -> Self {
        self.min_value = Some(min);
        self.max_value = Some(max);
        self
    }

    pub fn allowed_values<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_values = values.into_iter().map(Into::into).collect();
        self
    }

    pub fn allowed_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.allowed_pattern = Some(pattern.into());
        self
    }

    pub fn constraint_description(mut self, desc: impl Into<String>) -> Self {
        self.constraint_description = Some(desc.into());
        self
    }

    /// Default rendered as a parameter value string.
    pub fn default_as_string(&self) -> Option<String> {
        self.default.as_ref().map(value_to_string)
    }
}

fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Registry of declared parameter names and their currently bound values.
///
/// Overrides are bound first; declaring a parameter only binds its default
/// when nothing is bound under that name yet.
#[derive(Debug, Clone, Default)]
pub struct ParameterRegistry {
    declared: Vec<String>,
    bound: Vec<(String, String)>,
}

impl ParameterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with override values already bound.
    pub fn with_overrides(overrides: Vec<(String, String)>) -> Self {
        let mut registry = Self::new();
        for (key, value) in overrides {
            registry.bind(key, value);
        }
        registry
    }

    /// Record a declaration.
    pub fn declare(&mut self, name: &str, parameter: &Parameter) {
        if !self.is_declared(name) {
            self.declared.push(name.to_string());
        }
        if self.bound_value(name).is_none() {
            if let Some(default) = parameter.default_as_string() {
                self.bound.push((name.to_string(), default));
            }
        }
    }

    /// Bind a value, replacing any previous binding.
    pub fn bind(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.bound.iter_mut().find(|(k, _)| *k == name) {
            Some(entry) => entry.1 = value,
            None => self.bound.push((name, value)),
        }
    }

    pub fn is_declared(&self, name: &str) -> bool {
        self.declared.iter().any(|n| n == name)
    }

    /// Reference token for a declared parameter.
    pub fn reference(&self, name: &str) -> TemplateResult<Ref> {
        if self.is_declared(name) {
            Ok(Ref::new(name))
        } else {
            Err(TemplateError::UnknownParameter(name.to_string()))
        }
    }

    pub fn bound_value(&self, name: &str) -> Option<&str> {
        self.bound
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// All bound values in binding order.
    pub fn bound_values(&self) -> &[(String, String)] {
        &self.bound
    }

    /// Declared names in declaration order.
    pub fn names(&self) -> &[String] {
        &self.declared
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_number_parameter_serializes_native_numbers() {
        let param = Parameter::number()
            .default_value(5)
            .value_range(5, 1024)
            .description("size");

        let value = serde_json::to_value(&param).unwrap();
        assert_eq!(value["Type"], json!("Number"));
        assert_eq!(value["MinValue"], json!(5));
        assert_eq!(value["MaxValue"], json!(1024));
        assert_eq!(value["Default"], json!(5));
        assert!(value.get("NoEcho").is_none());
        assert!(value.get("AllowedValues").is_none());
    }

    #[test]
    fn test_override_wins_over_default() {
        let mut registry =
            ParameterRegistry::with_overrides(vec![("DbName".to_string(), "prod".to_string())]);
        registry.declare("DbName", &Parameter::string().default_value("dev"));
        registry.declare("DbUser", &Parameter::string().default_value("root"));

        assert_eq!(registry.bound_value("DbName"), Some("prod"));
        assert_eq!(registry.bound_value("DbUser"), Some("root"));
    }

    #[test]
    fn test_reference_requires_declaration() {
        let mut registry = ParameterRegistry::new();
        assert!(registry.reference("Missing").is_err());

        registry.declare("Present", &Parameter::string());
        assert_eq!(registry.reference("Present").unwrap(), Ref::new("Present"));
    }

    #[test]
    fn test_redeclaring_keeps_single_name() {
        let mut registry = ParameterRegistry::new();
        registry.declare("A", &Parameter::string());
        registry.declare("A", &Parameter::string());
        assert_eq!(registry.names(), &["A".to_string()]);
    }
}
