//! Typed parameter helpers.
//!
//! Each helper declares one parameter named `<instance_name><Suffix>` with a
//! documented default, a constraint set and a constraint message.

use tracing::warn;

use crate::error::{TemplateError, TemplateResult};
use crate::instance_type::InstanceTypeCatalog;
use crate::intrinsic::Ref;
use crate::parameter::{Parameter, ParameterType};
use crate::template::Template;

const ALPHANUMERIC_START_WITH_LETTER: &str = "[a-zA-Z][a-zA-Z0-9]*";
const ALPHANUMERIC_MESSAGE: &str = "must begin with a letter and contain only alphanumeric characters.";

impl Template {
    /// SSH key pair name parameter.
    pub fn parameter_key_name(&mut self, instance_name: &str) -> TemplateResult<Ref> {
        self.parameter(
            &format!("{}KeyName", instance_name),
            Parameter::string()
                .description(format!("Name of the {} ssh key pair", instance_name))
                .length(1, 64)
                .allowed_pattern("[a-zA-Z][-_a-zA-Z0-9]*")
                .constraint_description(
                    "can contain only alphanumeric characters, dashes and underscores.",
                ),
        )
    }

    /// Name parameter, defaulting to the instance name.
    pub fn parameter_name(
        &mut self,
        instance_name: &str,
        default: Option<&str>,
        min_length: u32,
        max_length: u32,
    ) -> TemplateResult<Ref> {
        self.parameter(
            &format!("{}Name", instance_name),
            Parameter::string()
                .default_value(default.unwrap_or(instance_name))
                .description(format!("{} name", instance_name))
                .length(min_length, max_length)
                .allowed_pattern(ALPHANUMERIC_START_WITH_LETTER)
                .constraint_description(ALPHANUMERIC_MESSAGE),
        )
    }

    /// Username parameter; not echoed.
    pub fn parameter_username(
        &mut self,
        instance_name: &str,
        default: &str,
        min_length: u32,
        max_length: u32,
    ) -> TemplateResult<Ref> {
        self.parameter(
            &format!("{}Username", instance_name),
            Parameter::string()
                .default_value(default)
                .no_echo()
                .description(format!("Username for {} access", instance_name))
                .length(min_length, max_length)
                .allowed_pattern(ALPHANUMERIC_START_WITH_LETTER)
                .constraint_description(ALPHANUMERIC_MESSAGE),
        )
    }

    /// Password parameter; not echoed.
    pub fn parameter_password(
        &mut self,
        instance_name: &str,
        default: &str,
        min_length: u32,
        max_length: u32,
    ) -> TemplateResult<Ref> {
        self.parameter(
            &format!("{}Password", instance_name),
            Parameter::string()
                .default_value(default)
                .no_echo()
                .description(format!("Password for {} access", instance_name))
                .length(min_length, max_length)
                .allowed_pattern("[a-zA-Z0-9]*")
                .constraint_description("must contain only alphanumeric characters."),
        )
    }

    /// Allocated storage parameter in Gb.
    pub fn parameter_allocated_storage(
        &mut self,
        instance_name: &str,
        default: i64,
        min: i64,
        max: i64,
    ) -> TemplateResult<Ref> {
        self.parameter(
            &format!("{}AllocatedStorage", instance_name),
            Parameter::new(ParameterType::Number)
                .default_value(default)
                .description(format!("The size of the {} (Gb)", instance_name))
                .value_range(min, max)
                .constraint_description(format!("must be between {} and {}Gb.", min, max)),
        )
    }

    /// Instance type parameter restricted to `allowed_values`.
    ///
    /// Fails right away when `instance_type` is not one of them.
    pub fn parameter_instance_type(
        &mut self,
        instance_name: &str,
        instance_type: &str,
        allowed_values: &[String],
    ) -> TemplateResult<Ref> {
        check_allowed(instance_type, allowed_values)?;
        self.parameter(
            &format!("{}InstanceType", instance_name),
            Parameter::string()
                .default_value(instance_type)
                .description(format!("The {} instance type", instance_name))
                .allowed_values(allowed_values.iter().cloned())
                .constraint_description("must be valid EC2 instance type."),
        )
    }

    /// Database instance class parameter restricted to `allowed_values`.
    pub fn parameter_instance_class(
        &mut self,
        instance_name: &str,
        instance_class: &str,
        allowed_values: &[String],
    ) -> TemplateResult<Ref> {
        check_allowed(instance_class, allowed_values)?;
        self.parameter(
            &format!("{}InstanceClass", instance_name),
            Parameter::string()
                .default_value(instance_class)
                .description(format!("The {} instance class", instance_name))
                .allowed_values(allowed_values.iter().cloned())
                .constraint_description("must be valid instance class."),
        )
    }

    /// EC2 instance type parameter checked against the EC2 catalog.
    pub fn parameter_ec2_instance_type(
        &mut self,
        instance_name: &str,
        instance_type: Option<&str>,
    ) -> TemplateResult<Ref> {
        let catalog = InstanceTypeCatalog::ec2();
        let instance_type = instance_type.unwrap_or_else(|| catalog.default_type());
        let allowed = checked_catalog_values(&catalog, instance_type)?;
        self.parameter_instance_type(instance_name, instance_type, &allowed)
    }

    /// RDS instance type parameter checked against the RDS catalog.
    pub fn parameter_rds_instance_type(
        &mut self,
        instance_name: &str,
        instance_type: Option<&str>,
    ) -> TemplateResult<Ref> {
        let catalog = InstanceTypeCatalog::rds();
        let instance_type = instance_type.unwrap_or_else(|| catalog.default_type());
        let allowed = checked_catalog_values(&catalog, instance_type)?;
        self.parameter_instance_type(instance_name, instance_type, &allowed)
    }
}

fn check_allowed(value: &str, allowed_values: &[String]) -> TemplateResult<()> {
    if allowed_values.iter().any(|v| v == value) {
        Ok(())
    } else {
        Err(TemplateError::InstanceTypeNotAllowed {
            instance_type: value.to_string(),
            allowed: allowed_values.to_vec(),
        })
    }
}

/// Allowed values for a catalog type; warns about obsolete types.
pub(crate) fn checked_catalog_values(
    catalog: &InstanceTypeCatalog,
    instance_type: &str,
) -> TemplateResult<Vec<String>> {
    if !catalog.supported(instance_type) {
        return Err(TemplateError::UnsupportedInstanceType(instance_type.to_string()));
    }
    if catalog.obsolete(instance_type) {
        warn!("Using obsolete instance type: {}", instance_type);
    }
    Ok(catalog.allowed_values(instance_type))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_username_and_password_are_no_echo() {
        let mut template = Template::default();
        template.parameter_username("Db", "root", 1, 16).unwrap();
        template.parameter_password("Db", "password", 8, 41).unwrap();

        let doc = template.document();
        assert_eq!(doc.parameter("DbUsername").unwrap()["NoEcho"], json!(true));
        assert_eq!(doc.parameter("DbPassword").unwrap()["NoEcho"], json!(true));
        assert_eq!(doc.parameter("DbPassword").unwrap()["MinLength"], json!(8));
    }

    #[test]
    fn test_name_defaults_to_instance_name() {
        let mut template = Template::default();
        template.parameter_name("Web", None, 1, 64).unwrap();

        let param = template.document().parameter("WebName").unwrap();
        assert_eq!(param["Default"], json!("Web"));
        assert_eq!(param["AllowedPattern"], json!("[a-zA-Z][a-zA-Z0-9]*"));
    }

    #[test]
    fn test_key_name_parameter() {
        let mut template = Template::default();
        let key = template.parameter_key_name("Web").unwrap();
        assert_eq!(key, Ref::new("WebKeyName"));
        assert!(template.document().parameter("WebKeyName").unwrap().get("Default").is_none());
    }

    #[test]
    fn test_instance_type_outside_allow_list_fails() {
        let mut template = Template::default();
        let allowed = vec!["t2.micro".to_string(), "t2.small".to_string()];

        let err = template
            .parameter_instance_type("Web", "m4.large", &allowed)
            .unwrap_err();
        assert!(err.to_string().contains("m4.large"));
        assert!(template.document().parameters().is_empty());

        assert!(template.parameter_instance_type("Web", "m4.large", &[]).is_err());
    }

    #[test]
    fn test_instance_type_in_allow_list() {
        let mut template = Template::default();
        let allowed = vec!["t2.micro".to_string(), "t2.small".to_string()];
        template.parameter_instance_type("Web", "t2.small", &allowed).unwrap();

        let param = template.document().parameter("WebInstanceType").unwrap();
        assert_eq!(param["Default"], json!("t2.small"));
        assert_eq!(param["AllowedValues"], json!(["t2.micro", "t2.small"]));
    }

    #[test]
    fn test_catalog_helpers() {
        let mut template = Template::default();
        template.parameter_ec2_instance_type("Web", None).unwrap();
        assert_eq!(
            template.document().parameter("WebInstanceType").unwrap()["Default"],
            json!("t2.micro")
        );

        assert!(matches!(
            template.parameter_rds_instance_type("Db", Some("db.z9.huge")),
            Err(TemplateError::UnsupportedInstanceType(_))
        ));
    }
}
