//! CLI command definitions.
//!
//! Each subcommand builds one template and runs it through the pipeline.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::info;

use enscale_core::{Emission, Pipeline};
use enscale_runner::{CommandRunner, ProcessRunner, ProcessRunnerOptions};
use enscale_stack::{AwsCliStackService, Stack, StackPhase, StackService, StackWaiter};
use enscale_template::{StackOptions, Template};

pub mod instance;
pub mod rds;
pub mod vpc;

/// enscale - CloudFormation templates as code
#[derive(Parser)]
#[command(name = "enscale")]
#[command(version, about = "enscale - CloudFormation templates as code")]
#[command(long_about = r#"
enscale builds CloudFormation templates from typed helpers and either prints
them (--expand) or submits them with the aws CLI.

TEMPLATES:
  vpc       → VPC with one public subnet per availability zone
  rds       → MySQL RDS instance inside an existing VPC stack
  instance  → EC2 instance inside an existing VPC stack

EXIT CODES:
  0 - Success
  1 - General error
  2 - Invalid arguments
  3 - Template construction error
  4 - Stack error
"#)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// VPC stack
    Vpc(vpc::VpcArgs),

    /// RDS stack placed in a VPC stack
    Rds(rds::RdsArgs),

    /// EC2 instance stack placed in a VPC stack
    Instance(instance::InstanceArgs),
}

/// Options shared by every template.
#[derive(Args, Debug, Default)]
pub struct StackArgs {
    /// YAML file with run options; flags take precedence
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Name of the stack to create or update
    #[arg(long)]
    pub stack_name: Option<String>,

    /// Target region
    #[arg(long, env = "AWS_REGION")]
    pub region: Option<String>,

    /// Stack providing the VPC
    #[arg(long)]
    pub vpc_stack_name: Option<String>,

    /// Parameter overrides, e.g. "Key1=Value1;Key2=Value2"
    #[arg(long)]
    pub parameters: Option<String>,

    /// Print the template instead of submitting it
    #[arg(long)]
    pub expand: bool,

    /// Create the stack instead of updating it
    #[arg(long)]
    pub create_stack: bool,

    /// Capabilities to acknowledge, e.g. CAPABILITY_IAM
    #[arg(long)]
    pub capabilities: Option<String>,

    /// "all" or a single availability zone suffix letter
    #[arg(long)]
    pub availability_zone: Option<String>,

    /// Hosted zone DNS records are created in
    #[arg(long)]
    pub hosted_zone: Option<String>,

    /// Run pre-run hooks
    #[arg(long)]
    pub pre_run: bool,

    /// Run post-run hooks
    #[arg(long)]
    pub post_run: bool,
}

impl StackArgs {
    /// Run options: the config file, if any, overlaid with the flags given.
    pub fn into_options(self) -> Result<StackOptions> {
        let mut options = match &self.config {
            Some(path) => StackOptions::from_yaml_file(path)
                .with_context(|| format!("Failed to read options from {}", path.display()))?,
            None => StackOptions::default(),
        };

        if let Some(v) = self.stack_name {
            options.stack_name = Some(v);
        }
        if let Some(v) = self.region {
            options.region = Some(v);
        }
        if let Some(v) = self.vpc_stack_name {
            options.vpc_stack_name = Some(v);
        }
        if let Some(v) = self.parameters {
            options.parameters = Some(v);
        }
        if let Some(v) = self.capabilities {
            options.capabilities = Some(v);
        }
        if let Some(v) = self.availability_zone {
            options.availability_zone = v;
        }
        if let Some(v) = self.hosted_zone {
            options.hosted_zone = Some(v);
        }
        options.expand |= self.expand;
        options.create_stack |= self.create_stack;
        options.pre_run |= self.pre_run;
        options.post_run |= self.post_run;
        Ok(options)
    }
}

/// Runner used for every external command.
pub fn command_runner() -> Arc<dyn CommandRunner> {
    Arc::new(ProcessRunner::new(ProcessRunnerOptions::default()))
}

/// Quiet runner for lookups whose JSON output is parsed rather than shown.
pub fn lookup_runner() -> Arc<dyn CommandRunner> {
    Arc::new(ProcessRunner::new(ProcessRunnerOptions::default().quiet()))
}

/// Stack service for the region of a run.
pub fn stack_service(options: &StackOptions) -> Result<AwsCliStackService> {
    let region = options
        .region()
        .context("Missing option: region is required (--region or AWS_REGION)")?;
    Ok(AwsCliStackService::new(lookup_runner(), region)?)
}

/// Wait for `stack_name` to settle and fail unless it settled cleanly.
pub async fn wait_for_stack<S: StackService + ?Sized>(service: &S, stack_name: &str) -> Result<Stack> {
    let stack = StackWaiter::new(service).wait(stack_name).await?;
    if stack.status.phase() == StackPhase::Failed {
        bail!("Stack {} settled in {}", stack_name, stack.status);
    }
    Ok(stack)
}

/// Run a built template through its pipeline and fail on any failed stage.
pub async fn run_pipeline(mut pipeline: Pipeline, template: &Template) -> Result<()> {
    let report = pipeline.exec(template).await.into_result()?;

    if let Some(Emission::Submitted(output)) = &report.emission {
        if output.success() {
            println!(
                "✅ Submitted stack {}",
                template.options().stack_name().unwrap_or("<unnamed>")
            );
        }
    }
    info!("{} stage(s) completed", report.stages.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_flags_without_config() {
        let args = StackArgs {
            stack_name: Some("web".to_string()),
            expand: true,
            ..Default::default()
        };
        let options = args.into_options().unwrap();
        assert_eq!(options.stack_name(), Some("web"));
        assert!(options.expand);
        assert_eq!(options.availability_zone, "all");
    }

    #[test]
    fn test_flags_override_config() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("options.yaml");
        fs::write(
            &path,
            "stack_name: from-file\nregion: eu-west-1\ncreate_stack: true\navailability_zone: a\n",
        )
        .unwrap();

        let args = StackArgs {
            config: Some(path),
            stack_name: Some("from-flag".to_string()),
            ..Default::default()
        };
        let options = args.into_options().unwrap();

        assert_eq!(options.stack_name(), Some("from-flag"));
        assert_eq!(options.region(), Some("eu-west-1"));
        assert!(options.create_stack);
        assert_eq!(options.availability_zone, "a");
    }

    #[test]
    fn test_missing_config_file() {
        let args = StackArgs {
            config: Some(PathBuf::from("/nonexistent/options.yaml")),
            ..Default::default()
        };
        assert!(args.into_options().is_err());
    }

    #[tokio::test]
    async fn test_wait_for_failed_stack() {
        let service = enscale_stack::MockStackService::new()
            .with_statuses("vpc", &["ROLLBACK_COMPLETE"])
            .with_statuses("db", &["UPDATE_COMPLETE"]);
        assert!(wait_for_stack(&service, "vpc").await.is_err());
        assert!(wait_for_stack(&service, "db").await.is_ok());
    }

    #[test]
    fn test_cli_parses() {
        let cli = Cli::try_parse_from([
            "enscale",
            "rds",
            "--stack-name",
            "db",
            "--vpc-stack-name",
            "vpc",
            "--region",
            "us-east-1",
            "--expand",
        ])
        .unwrap();
        assert!(matches!(cli.command, Commands::Rds(_)));
    }
}
