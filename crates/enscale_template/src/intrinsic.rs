//! Reference tokens and intrinsic functions.
//!
//! These are placeholders the orchestration service resolves when the stack
//! is realized; the template only carries their symbolic form.

use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::{json, Value};

/// Symbolic reference to a parameter or resource, `{"Ref": "<name>"}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Ref(String);

impl Ref {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Name of the referenced entity.
    pub fn name(&self) -> &str {
        &self.0
    }

    pub fn to_value(&self) -> Value {
        json!({ "Ref": self.0 })
    }
}

impl Serialize for Ref {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry("Ref", &self.0)?;
        map.end()
    }
}

impl From<Ref> for Value {
    fn from(r: Ref) -> Self {
        r.to_value()
    }
}

impl From<&Ref> for Value {
    fn from(r: &Ref) -> Self {
        r.to_value()
    }
}

impl std::fmt::Display for Ref {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Ref({})", self.0)
    }
}

/// `Fn::GetAtt` of an attribute on a resource.
pub fn get_att(resource: &str, attribute: &str) -> Value {
    json!({ "Fn::GetAtt": [resource, attribute] })
}

/// `Fn::Join` of parts with a separator.
pub fn join(separator: &str, parts: Vec<Value>) -> Value {
    json!({ "Fn::Join": [separator, parts] })
}

/// `Fn::Base64` of a value.
pub fn base64(value: impl Into<Value>) -> Value {
    json!({ "Fn::Base64": value.into() })
}

/// `Fn::FindInMap` lookup.
pub fn find_in_map(map: &str, top_key: impl Into<Value>, second_key: impl Into<Value>) -> Value {
    json!({ "Fn::FindInMap": [map, top_key.into(), second_key.into()] })
}

/// Pseudo parameter resolving to the name of the enclosing stack.
pub fn aws_stack_name() -> Ref {
    Ref::new("AWS::StackName")
}

/// Pseudo parameter resolving to the region of the enclosing stack.
pub fn aws_region() -> Ref {
    Ref::new("AWS::Region")
}

/// `<stack-name>-<local name>` as resolved by the orchestration service.
pub fn stack_scoped_name(local_name: &str) -> Value {
    join("-", vec![aws_stack_name().into(), Value::from(local_name)])
}
