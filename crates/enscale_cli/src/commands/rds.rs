//! Rds command - MySQL instance placed in the subnets of a VPC stack.

use anyhow::{bail, Context, Result};
use clap::Args;
use serde_json::{json, Value};
use tracing::info;

use enscale_core::Pipeline;
use enscale_stack::{get_resource, get_resources};
use enscale_template::{RdsOptions, StackOptions, Template};

use super::{command_runner, run_pipeline, stack_service, wait_for_stack, StackArgs};

#[derive(Args)]
pub struct RdsArgs {
    #[command(flatten)]
    stack: StackArgs,

    /// Database name, used as the prefix of every generated name
    #[arg(long, default_value = "Main")]
    db_name: String,

    /// VPC stack keys of the subnets the database is placed in
    #[arg(long, value_delimiter = ',', default_value = "SubnetA,SubnetC")]
    subnets: Vec<String>,

    /// VPC stack key of the security group
    #[arg(long, default_value = "PrivateSecurityGroup")]
    security_group: String,

    /// Storage size in Gb
    #[arg(long, default_value_t = 5)]
    allocated_storage: i64,

    /// DB instance class, e.g. db.t2.small
    #[arg(long)]
    instance_class: Option<String>,

    /// gp2, standard or io1
    #[arg(long, default_value = "gp2")]
    storage_type: String,
}

/// Resources of the VPC stack the database depends on.
#[derive(Debug, Clone)]
pub struct VpcResources {
    pub subnets: Vec<String>,
    pub security_group: String,
}

/// Build the RDS template on top of resolved VPC resources.
pub fn build_template(
    options: StackOptions,
    db_name: &str,
    vpc: &VpcResources,
    rds: RdsOptions,
) -> Result<Template> {
    let mut template = Template::new(options)?;
    template.description(format!("{} MySQL database", db_name));

    let subnets: Vec<Value> = vpc.subnets.iter().map(|s| json!(s)).collect();
    template.rds_init(db_name, subnets, vpc.security_group.as_str(), rds)?;
    Ok(template)
}

pub async fn execute(args: RdsArgs) -> Result<()> {
    let options = args.stack.into_options()?;
    let vpc_stack_name = options.vpc_stack_name()?.to_string();
    let service = stack_service(&options)?;

    let vpc_stack = wait_for_stack(&service, &vpc_stack_name).await?;
    let keys: Vec<&str> = args.subnets.iter().map(String::as_str).collect();
    let subnets = get_resources(&service, &vpc_stack, &keys).await?;
    if subnets.len() != keys.len() {
        bail!(
            "Stack {} provides {} of the subnets {:?}",
            vpc_stack_name,
            subnets.len(),
            keys
        );
    }
    let security_group = get_resource(&service, &vpc_stack, &args.security_group)
        .await?
        .with_context(|| format!("Stack {} has no {}", vpc_stack_name, args.security_group))?;
    info!("Placing database in subnets {:?}", subnets);

    let rds = RdsOptions {
        allocated_storage: args.allocated_storage,
        storage_type: args.storage_type,
        instance_class: args.instance_class,
    };
    let vpc = VpcResources { subnets, security_group };
    let template = build_template(options.clone(), &args.db_name, &vpc, rds)?;

    let mut pipeline = Pipeline::new(command_runner());
    if options.post_run {
        let stack_name = options.stack_name().unwrap_or_default().to_string();
        let endpoint_key = format!("{}EndpointAddress", args.db_name);
        pipeline.post_run("report-endpoint", move || async move {
            let stack = wait_for_stack(&service, &stack_name).await?;
            match get_resource(&service, &stack, &endpoint_key).await? {
                Some(address) => println!("{} = {}", endpoint_key, address),
                None => bail!("Stack {} has no {}", stack_name, endpoint_key),
            }
            Ok::<(), anyhow::Error>(())
        });
    }

    run_pipeline(pipeline, &template).await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vpc() -> VpcResources {
        VpcResources {
            subnets: vec!["subnet-a".to_string(), "subnet-c".to_string()],
            security_group: "sg-1".to_string(),
        }
    }

    #[test]
    fn test_database_in_vpc_subnets() {
        let template = build_template(StackOptions::new(), "Main", &vpc(), RdsOptions::default()).unwrap();
        let doc = template.document();

        let group = doc.resource("RDSMainSubnetGroup").unwrap();
        assert_eq!(group["Properties"]["SubnetIds"], json!(["subnet-a", "subnet-c"]));

        let instance = doc.resource("RDSMainInstance").unwrap();
        assert_eq!(instance["Properties"]["VPCSecurityGroups"], json!(["sg-1"]));
        assert!(doc.output("MainEndpointAddress").is_some());
    }

    #[test]
    fn test_unsupported_instance_class() {
        let rds = RdsOptions {
            instance_class: Some("db.z9.huge".to_string()),
            ..Default::default()
        };
        assert!(build_template(StackOptions::new(), "Main", &vpc(), rds).is_err());
    }
}
