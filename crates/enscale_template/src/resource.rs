//! Resources, outputs and tags.

use serde::Serialize;
use serde_json::{Map, Value};

/// Resource type identifiers used by the builders and recipes.
pub mod types {
    pub const VPC: &str = "AWS::EC2::VPC";
    pub const SUBNET: &str = "AWS::EC2::Subnet";
    pub const SECURITY_GROUP: &str = "AWS::EC2::SecurityGroup";
    pub const INSTANCE: &str = "AWS::EC2::Instance";
    pub const IAM_ROLE: &str = "AWS::IAM::Role";
    pub const IAM_INSTANCE_PROFILE: &str = "AWS::IAM::InstanceProfile";
    pub const DB_INSTANCE: &str = "AWS::RDS::DBInstance";
    pub const DB_SUBNET_GROUP: &str = "AWS::RDS::DBSubnetGroup";
    pub const RECORD_SET: &str = "AWS::Route53::RecordSet";
    pub const HEALTH_CHECK: &str = "AWS::Route53::HealthCheck";
    pub const HOSTED_ZONE: &str = "AWS::Route53::HostedZone";
}

/// A declared resource.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Resource {
    #[serde(rename = "Type")]
    pub resource_type: String,
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub properties: Map<String, Value>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub depends_on: Vec<String>,
}

impl Resource {
    pub fn new(resource_type: impl Into<String>) -> Self {
        Self {
            resource_type: resource_type.into(),
            properties: Map::new(),
            depends_on: Vec::new(),
        }
    }

    pub fn property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    pub fn properties(mut self, properties: Map<String, Value>) -> Self {
        self.properties.extend(properties);
        self
    }

    pub fn depends_on<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.depends_on.extend(names.into_iter().map(Into::into));
        self
    }

    pub fn is_instance(&self) -> bool {
        self.resource_type == types::INSTANCE
    }
}

/// A stack output.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Output {
    pub description: String,
    pub value: Value,
}

impl Output {
    pub fn new(description: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            description: description.into(),
            value: value.into(),
        }
    }
}

/// A resource tag.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Tag {
    pub key: String,
    pub value: Value,
}

impl Tag {
    pub fn new(key: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Convert tags to their property form, a list of `{Key, Value}` objects.
pub fn tags_to_properties(tags: &[Tag]) -> Value {
    Value::Array(
        tags.iter()
            .map(|t| {
                let mut entry = Map::new();
                entry.insert("Key".to_string(), Value::from(t.key.clone()));
                entry.insert("Value".to_string(), t.value.clone());
                Value::Object(entry)
            })
            .collect(),
    )
}

/// Whether a tag list in property form already carries `key`.
pub fn has_tag(tags: &Value, key: &str) -> bool {
    tags.as_array()
        .map(|list| list.iter().any(|t| t.get("Key").and_then(Value::as_str) == Some(key)))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_resource_omits_empty_depends_on() {
        let resource = Resource::new(types::VPC).property("CidrBlock", "10.0.0.0/16");
        let value = serde_json::to_value(&resource).unwrap();

        assert_eq!(value["Type"], json!("AWS::EC2::VPC"));
        assert_eq!(value["Properties"]["CidrBlock"], json!("10.0.0.0/16"));
        assert!(value.get("DependsOn").is_none());
    }

    #[test]
    fn test_resource_depends_on() {
        let resource = Resource::new(types::SUBNET).depends_on(["Vpc"]);
        let value = serde_json::to_value(&resource).unwrap();
        assert_eq!(value["DependsOn"], json!(["Vpc"]));
    }

    #[test]
    fn test_tags_to_properties() {
        let tags = vec![Tag::new("Name", "web"), Tag::new("Env", "dev")];
        let value = tags_to_properties(&tags);

        assert_eq!(
            value,
            json!([{"Key": "Name", "Value": "web"}, {"Key": "Env", "Value": "dev"}])
        );
        assert!(has_tag(&value, "Env"));
        assert!(!has_tag(&value, "Owner"));
    }
}
