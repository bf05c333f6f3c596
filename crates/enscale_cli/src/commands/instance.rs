//! Instance command - EC2 instance placed in a subnet of a VPC stack.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use serde_json::{json, Value};
use tracing::{debug, info};

use enscale_core::Pipeline;
use enscale_stack::{gen_ssh_key_name, get_resource};
use enscale_template::{
    get_att, DnsRecordOptions, InstanceOptions, StackOptions, Template, UserDataLoader,
    DEFAULT_USER_DATA_DIR,
};

use super::{command_runner, run_pipeline, stack_service, wait_for_stack, StackArgs};

#[derive(Args)]
pub struct InstanceArgs {
    #[command(flatten)]
    stack: StackArgs,

    /// Application name, used as the logical name of the instance
    #[arg(long, default_value = "Web")]
    app_name: String,

    /// AMI to boot
    #[arg(long)]
    image_id: String,

    /// EC2 instance type, e.g. t2.small
    #[arg(long)]
    instance_type: Option<String>,

    /// VPC stack key of the subnet the instance is placed in
    #[arg(long, default_value = "SubnetA")]
    subnet: String,

    /// VPC stack key of the security group
    #[arg(long, default_value = "PrivateSecurityGroup")]
    security_group: String,

    /// Directory holding one user data script per application
    #[arg(long, default_value = DEFAULT_USER_DATA_DIR)]
    user_data_dir: PathBuf,

    /// Directory the private key of a created key pair is written to
    #[arg(long, default_value = ".")]
    key_dir: PathBuf,
}

/// Everything the instance template is built from.
#[derive(Debug, Clone)]
pub struct InstanceSettings {
    pub app_name: String,
    pub image_id: String,
    pub instance_type: Option<String>,
    pub subnet: String,
    pub security_group: String,
    pub user_data: Option<Value>,
}

/// Add a `<app>KeyName=<key>` override unless one is already given.
///
/// Returns the options and the key pair name the stack will be bound to.
fn with_key_name(
    mut options: StackOptions,
    app_name: &str,
    key_name: &str,
) -> Result<(StackOptions, String)> {
    let param = format!("{}KeyName", app_name);
    if let Some((_, bound)) = options.parameters()?.into_iter().find(|(k, _)| *k == param) {
        return Ok((options, bound));
    }
    let pair = format!("{}={}", param, key_name);
    options.parameters = Some(match options.parameters.take() {
        Some(existing) if !existing.trim().is_empty() => format!("{};{}", existing, pair),
        _ => pair,
    });
    Ok((options, key_name.to_string()))
}

/// Build the instance template, with a DNS record when a hosted zone is set.
pub fn build_template(options: StackOptions, settings: &InstanceSettings) -> Result<Template> {
    let app = settings.app_name.as_str();
    let hosted_zone = options.hosted_zone.is_some().then(|| options.hosted_zone()).transpose()?;
    let stack_name = options.stack_name().unwrap_or_default().to_string();

    let mut template = Template::new(options)?;
    template.description(format!("{} instance", app));

    let key_name = template.parameter_key_name(app)?;
    let instance_type = template.parameter_ec2_instance_type(app, settings.instance_type.as_deref())?;

    let mut instance = InstanceOptions::default()
        .property("KeyName", &key_name)
        .property("InstanceType", &instance_type);
    if let Some(user_data) = &settings.user_data {
        instance = instance.property("UserData", user_data.clone());
    }
    template.instance_vpc(
        app,
        settings.image_id.as_str(),
        settings.subnet.as_str(),
        json!([settings.security_group]),
        instance,
    )?;

    if let Some(zone) = hosted_zone {
        let record = format!("{}.{}", app.to_lowercase(), zone);
        let records = DnsRecordOptions::default().resource_records(json!([get_att(app, "PrivateIp")]));
        template.create_single_dns_record(Some(app), &stack_name, &zone, &record, records)?;
    }
    Ok(template)
}

pub async fn execute(args: InstanceArgs) -> Result<()> {
    let options = args.stack.into_options()?;
    let vpc_stack_name = options.vpc_stack_name()?.to_string();
    let region = options
        .region()
        .context("Missing option: region is required (--region or AWS_REGION)")?
        .to_string();
    let stack_name = options
        .stack_name()
        .context("Missing option: stack-name is required")?
        .to_string();
    let service = stack_service(&options)?;

    let vpc_stack = wait_for_stack(&service, &vpc_stack_name).await?;
    let subnet = get_resource(&service, &vpc_stack, &args.subnet)
        .await?
        .with_context(|| format!("Stack {} has no {}", vpc_stack_name, args.subnet))?;
    let security_group = get_resource(&service, &vpc_stack, &args.security_group)
        .await?
        .with_context(|| format!("Stack {} has no {}", vpc_stack_name, args.security_group))?;

    let loader = UserDataLoader::new(&args.user_data_dir);
    let user_data = if loader.dir().join(&args.app_name).is_file() {
        Some(loader.load(&args.app_name)?)
    } else {
        debug!("No user data for {} in {}", args.app_name, loader.dir().display());
        None
    };

    let generated = gen_ssh_key_name(&args.app_name, &region, &stack_name);
    let (options, key_name) = with_key_name(options, &args.app_name, &generated)?;
    let settings = InstanceSettings {
        app_name: args.app_name.clone(),
        image_id: args.image_id,
        instance_type: args.instance_type,
        subnet,
        security_group,
        user_data,
    };
    let template = build_template(options.clone(), &settings)?;

    let mut pipeline = Pipeline::new(command_runner());
    if options.pre_run {
        let service = stack_service(&options)?;
        let key_dir = args.key_dir;
        pipeline.pre_run("ensure-key-pair", move || async move {
            if service.key_pair_exists(&key_name).await? {
                info!("Key pair {} already exists", key_name);
            } else {
                let path = service.create_key_pair(&key_name, &key_dir).await?;
                println!("🔑 Private key written to {}", path.display());
            }
            Ok::<(), anyhow::Error>(())
        });
    }
    if options.post_run {
        let ip_key = format!("{}PrivateIpAddress", args.app_name);
        pipeline.post_run("report-address", move || async move {
            let stack = wait_for_stack(&service, &stack_name).await?;
            let address = get_resource(&service, &stack, &ip_key)
                .await?
                .with_context(|| format!("Stack {} has no {}", stack_name, ip_key))?;
            println!("{} = {}", ip_key, address);
            Ok::<(), anyhow::Error>(())
        });
    }

    run_pipeline(pipeline, &template).await
}
