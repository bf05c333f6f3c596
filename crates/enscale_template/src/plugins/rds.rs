//! MySQL RDS instance inside a VPC.

use serde_json::{json, Value};

use crate::error::TemplateResult;
use crate::instance_type::InstanceTypeCatalog;
use crate::intrinsic::{get_att, Ref};
use crate::parameter::Parameter;
use crate::params::checked_catalog_values;
use crate::resource::{types, Output, Resource};
use crate::template::Template;

/// Storage types accepted for RDS instances.
pub const STORAGE_TYPES: &[&str] = &["gp2", "standard", "io1"];

/// Options for [`Template::rds_init`].
#[derive(Debug, Clone)]
pub struct RdsOptions {
    /// Primary storage size in Gb
    pub allocated_storage: i64,
    pub storage_type: String,
    /// Defaults to the first general purpose RDS type
    pub instance_class: Option<String>,
}

impl Default for RdsOptions {
    fn default() -> Self {
        Self {
            allocated_storage: 5,
            storage_type: "gp2".to_string(),
            instance_class: None,
        }
    }
}

impl Template {
    /// Declare an RDS instance named `RDS<db_name>Instance`.
    ///
    /// Adds its parameters, a subnet group spanning `subnets`, and the
    /// `<db_name>EndpointAddress` output.
    pub fn rds_init(
        &mut self,
        db_name: &str,
        subnets: Vec<Value>,
        security_group: impl Into<Value>,
        options: RdsOptions,
    ) -> TemplateResult<Ref> {
        let prefix = format!("RDS{}", db_name);

        let catalog = InstanceTypeCatalog::rds();
        let instance_class = options
            .instance_class
            .as_deref()
            .unwrap_or_else(|| catalog.default_type());
        let allowed_classes = checked_catalog_values(&catalog, instance_class)?;

        let storage = self.parameter_allocated_storage(&prefix, options.allocated_storage, 5, 1024)?;
        let name = self.parameter_name(&prefix, None, 1, 64)?;
        let username = self.parameter_username(&prefix, "root", 1, 16)?;
        let password = self.parameter_password(&prefix, "password", 8, 41)?;
        let class = self.parameter_instance_class(&prefix, instance_class, &allowed_classes)?;
        let storage_type = self.parameter(
            &format!("{}StorageType", prefix),
            Parameter::string()
                .default_value(options.storage_type.as_str())
                .description("Storage type to be associated with the DB instance")
                .allowed_values(STORAGE_TYPES.iter().copied()),
        )?;

        let subnet_group_name = format!("{}SubnetGroup", prefix);
        let subnet_group = self.resource(
            &subnet_group_name,
            Resource::new(types::DB_SUBNET_GROUP)
                .property("DBSubnetGroupDescription", "Subnet group within VPC")
                .property("SubnetIds", subnets)
                .property("Tags", json!([{ "Key": "Name", "Value": subnet_group_name }])),
        )?;

        let instance_name = format!("{}Instance", prefix);
        let instance = self.resource(
            &instance_name,
            Resource::new(types::DB_INSTANCE)
                .property("Engine", "MySQL")
                .property("PubliclyAccessible", "false")
                .property("DBName", name)
                .property("MultiAZ", "false")
                .property("MasterUsername", username)
                .property("MasterUserPassword", password)
                .property("DBInstanceClass", class)
                .property("VPCSecurityGroups", json!([security_group.into()]))
                .property("DBSubnetGroupName", subnet_group)
                .property("AllocatedStorage", storage)
                .property("StorageType", storage_type)
                .property("Tags", json!([{ "Key": "Name", "Value": instance_name }])),
        )?;

        self.output(
            &format!("{}EndpointAddress", db_name),
            Output::new(
                format!("{} Endpoint Address", db_name),
                get_att(&instance_name, "Endpoint.Address"),
            ),
        )?;
        Ok(instance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TemplateError;

    fn subnets() -> Vec<Value> {
        vec![json!("subnet-a"), json!("subnet-c")]
    }

    #[test]
    fn test_rds_declares_parameters_and_output() {
        let mut template = Template::default();
        let instance = template
            .rds_init("Main", subnets(), "sg-1", RdsOptions::default())
            .unwrap();
        assert_eq!(instance, Ref::new("RDSMainInstance"));

        let doc = template.document();
        for param in [
            "RDSMainAllocatedStorage",
            "RDSMainName",
            "RDSMainUsername",
            "RDSMainPassword",
            "RDSMainInstanceClass",
            "RDSMainStorageType",
        ] {
            assert!(doc.parameter(param).is_some(), "missing {}", param);
        }
        assert_eq!(doc.parameter("RDSMainInstanceClass").unwrap()["Default"], json!("db.t2.micro"));

        let props = &doc.resource("RDSMainInstance").unwrap()["Properties"];
        assert_eq!(props["DBSubnetGroupName"], json!({"Ref": "RDSMainSubnetGroup"}));
        assert_eq!(props["VPCSecurityGroups"], json!(["sg-1"]));
        assert_eq!(
            doc.resource("RDSMainSubnetGroup").unwrap()["Properties"]["SubnetIds"],
            json!(["subnet-a", "subnet-c"])
        );
        assert_eq!(
            doc.output("MainEndpointAddress").unwrap()["Value"],
            json!({"Fn::GetAtt": ["RDSMainInstance", "Endpoint.Address"]})
        );
        assert!(doc.output("RDSMainInstancePrivateIpAddress").is_none());
    }

    #[test]
    fn test_rds_rejects_unknown_class() {
        let mut template = Template::default();
        let options = RdsOptions {
            instance_class: Some("db.z9.huge".to_string()),
            ..Default::default()
        };
        let err = template.rds_init("Main", subnets(), "sg-1", options).unwrap_err();
        assert!(matches!(err, TemplateError::UnsupportedInstanceType(_)));
        assert!(template.document().parameters().is_empty());
    }
}
