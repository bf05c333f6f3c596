//! Convenience builders for common resource shapes.
//!
//! Each builder merges caller properties with the fields it owns, tags the
//! resource with `<stack-name>-<name>` unless a `Name` tag was supplied, and
//! refuses property sets that conflict with the fields it must set.

use serde_json::{json, Map, Value};

use crate::error::{TemplateError, TemplateResult};
use crate::intrinsic::{stack_scoped_name, Ref};
use crate::resource::{has_tag, tags_to_properties, types, Resource, Tag};
use crate::template::Template;

/// Options for [`Template::vpc`].
#[derive(Debug, Clone, Default)]
pub struct VpcOptions {
    pub enable_dns_support: Option<bool>,
    pub enable_dns_hostnames: Option<bool>,
    pub depends_on: Vec<String>,
    pub tags: Vec<Tag>,
}

/// Options for [`Template::subnet`].
#[derive(Debug, Clone, Default)]
pub struct SubnetOptions {
    pub availability_zone: Option<Value>,
    pub depends_on: Vec<String>,
    pub tags: Vec<Tag>,
}

/// Options for [`Template::security_group`] and [`Template::security_group_vpc`].
#[derive(Debug, Clone, Default)]
pub struct SecurityGroupOptions {
    pub ingress: Vec<Value>,
    pub egress: Vec<Value>,
    pub depends_on: Vec<String>,
    pub tags: Vec<Tag>,
}

/// Options for the instance builders.
#[derive(Debug, Clone, Default)]
pub struct InstanceOptions {
    pub depends_on: Vec<String>,
    /// Additional instance properties
    pub properties: Map<String, Value>,
}

impl InstanceOptions {
    pub fn property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }
}

/// Network interface entry with the given device index.
pub fn network_interface(device_index: impl Into<Value>, mut properties: Map<String, Value>) -> Value {
    properties.insert("DeviceIndex".to_string(), device_index.into());
    Value::Object(properties)
}

/// Tag list with a default `Name` appended when missing.
fn named_tags(tags: &[Tag], name: &str) -> Value {
    let mut tags = tags.to_vec();
    if !tags.iter().any(|t| t.key == "Name") {
        tags.push(Tag::new("Name", stack_scoped_name(name)));
    }
    tags_to_properties(&tags)
}

/// Ensure an instance property map carries a `Name` tag.
fn ensure_name_tag(properties: &mut Map<String, Value>, name: &str) -> TemplateResult<()> {
    let tags = properties
        .entry("Tags".to_string())
        .or_insert_with(|| Value::Array(Vec::new()));
    if has_tag(tags, "Name") {
        return Ok(());
    }
    match tags {
        Value::Array(list) => {
            list.push(json!({ "Key": "Name", "Value": stack_scoped_name(name) }));
            Ok(())
        }
        _ => Err(conflict(name, "Tags must be a list of Key/Value objects")),
    }
}

fn conflict(resource: &str, message: impl Into<String>) -> TemplateError {
    TemplateError::ConflictingProperties {
        resource: resource.to_string(),
        message: message.into(),
    }
}

impl Template {
    /// VPC resource.
    pub fn vpc(&mut self, name: &str, cidr: impl Into<Value>, options: VpcOptions) -> TemplateResult<Ref> {
        let mut resource = Resource::new(types::VPC).property("CidrBlock", cidr);
        if let Some(enabled) = options.enable_dns_support {
            resource = resource.property("EnableDnsSupport", enabled);
        }
        if let Some(enabled) = options.enable_dns_hostnames {
            resource = resource.property("EnableDnsHostnames", enabled);
        }
        let resource = resource
            .property("Tags", named_tags(&options.tags, name))
            .depends_on(options.depends_on);
        self.resource(name, resource)
    }

    /// Subnet resource.
    pub fn subnet(
        &mut self,
        name: &str,
        vpc: impl Into<Value>,
        cidr: impl Into<Value>,
        options: SubnetOptions,
    ) -> TemplateResult<Ref> {
        let mut resource = Resource::new(types::SUBNET)
            .property("VpcId", vpc)
            .property("CidrBlock", cidr);
        if let Some(zone) = options.availability_zone {
            resource = resource.property("AvailabilityZone", zone);
        }
        let resource = resource
            .property("Tags", named_tags(&options.tags, name))
            .depends_on(options.depends_on);
        self.resource(name, resource)
    }

    /// Security group.
    pub fn security_group(
        &mut self,
        name: &str,
        description: &str,
        options: SecurityGroupOptions,
    ) -> TemplateResult<Ref> {
        let resource = Resource::new(types::SECURITY_GROUP).property("GroupDescription", description);
        self.finish_security_group(name, resource, options)
    }

    /// Security group inside a VPC.
    pub fn security_group_vpc(
        &mut self,
        name: &str,
        description: &str,
        vpc: impl Into<Value>,
        options: SecurityGroupOptions,
    ) -> TemplateResult<Ref> {
        let resource = Resource::new(types::SECURITY_GROUP)
            .property("VpcId", vpc)
            .property("GroupDescription", description);
        self.finish_security_group(name, resource, options)
    }

    fn finish_security_group(
        &mut self,
        name: &str,
        mut resource: Resource,
        options: SecurityGroupOptions,
    ) -> TemplateResult<Ref> {
        if !options.ingress.is_empty() {
            resource = resource.property("SecurityGroupIngress", options.ingress);
        }
        if !options.egress.is_empty() {
            resource = resource.property("SecurityGroupEgress", options.egress);
        }
        let resource = resource
            .property("Tags", named_tags(&options.tags, name))
            .depends_on(options.depends_on);
        self.resource(name, resource)
    }

    /// Instance placed directly in a subnet with VPC security groups.
    pub fn instance_vpc(
        &mut self,
        name: &str,
        image_id: impl Into<Value>,
        subnet: impl Into<Value>,
        security_groups: impl Into<Value>,
        options: InstanceOptions,
    ) -> TemplateResult<Ref> {
        let mut properties = options.properties;
        if properties.contains_key("NetworkInterfaces") {
            return Err(conflict(
                name,
                "VPC instance can not contain NetworkInterfaces and subnet or security_groups",
            ));
        }
        if properties.contains_key("SecurityGroups") {
            return Err(conflict(name, "VPC instance can not contain non VPC SecurityGroups"));
        }

        properties.insert("ImageId".to_string(), image_id.into());
        properties.insert("SubnetId".to_string(), subnet.into());
        properties.insert("SecurityGroupIds".to_string(), security_groups.into());
        ensure_name_tag(&mut properties, name)?;

        let resource = Resource::new(types::INSTANCE)
            .properties(properties)
            .depends_on(options.depends_on);
        self.resource(name, resource)
    }

    /// Instance attached through explicit network interfaces.
    pub fn instance_with_network(
        &mut self,
        name: &str,
        image_id: impl Into<Value>,
        network_interfaces: Vec<Value>,
        options: InstanceOptions,
    ) -> TemplateResult<Ref> {
        let mut properties = options.properties;
        if ["SubnetId", "SecurityGroups", "SecurityGroupIds"]
            .iter()
            .any(|key| properties.contains_key(*key))
        {
            return Err(conflict(
                name,
                "Instance with NetworkInterfaces can not contain instance subnet or security_groups",
            ));
        }

        properties.insert("ImageId".to_string(), image_id.into());
        properties.insert("NetworkInterfaces".to_string(), Value::Array(network_interfaces));
        ensure_name_tag(&mut properties, name)?;

        let resource = Resource::new(types::INSTANCE)
            .properties(properties)
            .depends_on(options.depends_on);
        self.resource(name, resource)
    }

    /// IAM role with wildcard access to each service, wrapped in an instance profile.
    ///
    /// Creates `<role_name>Role` and `<role_name>InstanceProfile` and returns a
    /// reference to the profile.
    pub fn iam_instance_profile_with_full_access(
        &mut self,
        role_name: &str,
        services: &[&str],
    ) -> TemplateResult<Ref> {
        let statements: Vec<Value> = services
            .iter()
            .map(|s| json!({ "Effect": "Allow", "Action": format!("{}:*", s), "Resource": "*" }))
            .collect();

        let role_resource = format!("{}Role", role_name);
        let role = Resource::new(types::IAM_ROLE)
            .property(
                "AssumeRolePolicyDocument",
                json!({
                    "Statement": [{
                        "Effect": "Allow",
                        "Principal": { "Service": ["ec2.amazonaws.com"] },
                        "Action": ["sts:AssumeRole"]
                    }]
                }),
            )
            .property("Path", "/")
            .property(
                "Policies",
                json!([{
                    "PolicyName": format!("{}Policy", role_name),
                    "PolicyDocument": { "Statement": statements }
                }]),
            );
        let role_ref = self.resource(&role_resource, role)?;

        let profile = Resource::new(types::IAM_INSTANCE_PROFILE)
            .property("Path", "/")
            .property("Roles", json!([role_ref]));
        self.resource(&format!("{}InstanceProfile", role_name), profile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vpc_defaults_name_tag() {
        let mut template = Template::default();
        template.vpc("Vpc", "10.0.0.0/16", VpcOptions::default()).unwrap();

        let vpc = template.document().resource("Vpc").unwrap();
        assert_eq!(vpc["Type"], json!("AWS::EC2::VPC"));
        assert_eq!(
            vpc["Properties"]["Tags"],
            json!([{"Key": "Name", "Value": {"Fn::Join": ["-", [{"Ref": "AWS::StackName"}, "Vpc"]]}}])
        );
        assert!(vpc["Properties"].get("EnableDnsSupport").is_none());
    }

    #[test]
    fn test_caller_name_tag_is_kept() {
        let mut template = Template::default();
        let options = SubnetOptions {
            tags: vec![Tag::new("Name", "custom")],
            ..Default::default()
        };
        template.subnet("SubnetA", Ref::new("Vpc"), "10.0.1.0/24", options).unwrap();

        let subnet = template.document().resource("SubnetA").unwrap();
        assert_eq!(subnet["Properties"]["Tags"], json!([{"Key": "Name", "Value": "custom"}]));
        assert_eq!(subnet["Properties"]["VpcId"], json!({"Ref": "Vpc"}));
    }

    #[test]
    fn test_instance_tags_must_be_a_list() {
        let mut template = Template::default();
        let options = InstanceOptions::default().property("Tags", json!({"Name": "web"}));
        let err = template
            .instance_vpc("Web", "ami-1", "subnet-a", json!(["sg-1"]), options)
            .unwrap_err();

        assert!(matches!(err, TemplateError::ConflictingProperties { .. }));
        assert!(template.document().resources().is_empty());
        assert!(template.document().outputs().is_empty());
    }

    #[test]
    fn test_security_group_omits_empty_rules() {
        let mut template = Template::default();
        template
            .security_group("Sg", "web access", SecurityGroupOptions::default())
            .unwrap();

        let sg = template.document().resource("Sg").unwrap();
        assert!(sg["Properties"].get("SecurityGroupIngress").is_none());
        assert!(sg["Properties"].get("SecurityGroupEgress").is_none());
    }

    #[test]
    fn test_network_interface_sets_device_index() {
        let mut props = Map::new();
        props.insert("SubnetId".to_string(), json!("subnet-1"));
        let nic = network_interface("0", props);
        assert_eq!(nic["DeviceIndex"], json!("0"));
        assert_eq!(nic["SubnetId"], json!("subnet-1"));
    }

    #[test]
    fn test_instance_profile_composite() {
        let mut template = Template::default();
        let profile = template
            .iam_instance_profile_with_full_access("Worker", &["s3", "sqs"])
            .unwrap();

        assert_eq!(profile, Ref::new("WorkerInstanceProfile"));
        let role = template.document().resource("WorkerRole").unwrap();
        assert_eq!(
            role["Properties"]["Policies"][0]["PolicyDocument"]["Statement"][1]["Action"],
            json!("sqs:*")
        );
        let wrapper = template.document().resource("WorkerInstanceProfile").unwrap();
        assert_eq!(wrapper["Properties"]["Roles"], json!([{"Ref": "WorkerRole"}]));
    }
}
