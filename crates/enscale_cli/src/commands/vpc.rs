//! Vpc command - VPC with one subnet per availability zone.

use anyhow::{bail, Result};
use clap::Args;
use serde_json::json;
use tracing::info;

use enscale_core::Pipeline;
use enscale_template::{
    Output, SecurityGroupOptions, StackOptions, SubnetOptions, Template, VpcOptions,
};

use super::{command_runner, run_pipeline, stack_service, wait_for_stack, StackArgs};

#[derive(Args)]
pub struct VpcArgs {
    #[command(flatten)]
    stack: StackArgs,

    /// First two octets of the VPC network; the VPC is <prefix>.0.0/16
    #[arg(long, default_value = "10.0")]
    cidr_prefix: String,

    /// Availability zones to use instead of asking the region
    #[arg(long, value_delimiter = ',')]
    zones: Vec<String>,
}

/// Logical name of the subnet in zone `suffix`.
pub fn subnet_name(suffix: char) -> String {
    format!("Subnet{}", suffix.to_ascii_uppercase())
}

/// Third octet of the subnet in zone `suffix`: `a` is 0, `b` is 1 and so on.
pub fn subnet_octet(suffix: char) -> Result<u8> {
    let suffix = suffix.to_ascii_lowercase();
    if !suffix.is_ascii_lowercase() {
        bail!("Availability zone suffix {:?} is not a letter", suffix);
    }
    Ok(suffix as u8 - b'a')
}

/// Build the VPC template for the given region zones.
pub fn build_template(options: StackOptions, cidr_prefix: &str, zones: &[String]) -> Result<Template> {
    let selected = options.select_availability_zones(zones)?;
    let mut template = Template::new(options)?;
    template.description("VPC with one subnet per availability zone");

    let vpc_cidr = format!("{}.0.0/16", cidr_prefix);
    let vpc = template.vpc(
        "Vpc",
        vpc_cidr.as_str(),
        VpcOptions {
            enable_dns_support: Some(true),
            enable_dns_hostnames: Some(true),
            ..Default::default()
        },
    )?;

    for (suffix, zone) in &selected {
        let name = subnet_name(*suffix);
        let subnet = template.subnet(
            &name,
            &vpc,
            format!("{}.{}.0/24", cidr_prefix, subnet_octet(*suffix)?),
            SubnetOptions {
                availability_zone: Some(json!(zone)),
                ..Default::default()
            },
        )?;
        template.output(&name, Output::new(format!("Subnet in {}", zone), subnet))?;
    }

    let security_group = template.security_group_vpc(
        "PrivateSecurityGroup",
        "Access from inside the VPC",
        &vpc,
        SecurityGroupOptions {
            ingress: vec![json!({
                "IpProtocol": "tcp",
                "FromPort": "0",
                "ToPort": "65535",
                "CidrIp": vpc_cidr
            })],
            ..Default::default()
        },
    )?;

    template.output("VpcId", Output::new("VPC", &vpc))?;
    template.output(
        "PrivateSecurityGroup",
        Output::new("Security group for resources inside the VPC", security_group),
    )?;
    Ok(template)
}

pub async fn execute(args: VpcArgs) -> Result<()> {
    let options = args.stack.into_options()?;

    let zones = if args.zones.is_empty() {
        stack_service(&options)?.availability_zones().await?
    } else {
        args.zones
    };
    info!("Using availability zones {:?}", zones);

    let template = build_template(options.clone(), &args.cidr_prefix, &zones)?;

    let mut pipeline = Pipeline::new(command_runner());
    if options.post_run {
        let service = stack_service(&options)?;
        let stack_name = options.stack_name().unwrap_or_default().to_string();
        pipeline.post_run("report-outputs", move || async move {
            let stack = wait_for_stack(&service, &stack_name).await?;
            for output in &stack.outputs {
                println!("{} = {}", output.output_key, output.output_value);
            }
            Ok::<(), anyhow::Error>(())
        });
    }

    run_pipeline(pipeline, &template).await
}
