//! enscale CLI - Main entry point.
//!
//! Exit codes:
//! - 0: Success
//! - 1: General error
//! - 2: Invalid arguments
//! - 3: Template construction error
//! - 4: Stack error

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use enscale_core::CoreError;
use enscale_stack::StackError;
use enscale_template::TemplateError;

mod commands;

use commands::{Cli, Commands};

/// CI-friendly exit codes
pub struct ExitCodes;

impl ExitCodes {
    pub const SUCCESS: u8 = 0;
    pub const GENERAL_ERROR: u8 = 1;
    pub const INVALID_ARGS: u8 = 2;
    pub const TEMPLATE_ERROR: u8 = 3;
    pub const STACK_ERROR: u8 = 4;
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.verbose { "enscale=debug" } else { "enscale=info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{},warn", level)));
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .try_init();

    let result = match cli.command {
        Commands::Vpc(args) => commands::vpc::execute(args).await,
        Commands::Rds(args) => commands::rds::execute(args).await,
        Commands::Instance(args) => commands::instance::execute(args).await,
    };

    match result {
        Ok(()) => ExitCode::from(ExitCodes::SUCCESS),
        Err(e) => {
            let exit_code = categorize_error(&e);
            eprintln!("❌ Error: {:#}", e);
            ExitCode::from(exit_code)
        }
    }
}

fn categorize_template_error(e: &TemplateError) -> u8 {
    match e {
        TemplateError::MissingOption(_)
        | TemplateError::InvalidOption(_)
        | TemplateError::InvalidName(_) => ExitCodes::INVALID_ARGS,
        _ => ExitCodes::TEMPLATE_ERROR,
    }
}

fn categorize_stack_error(e: &StackError) -> u8 {
    match e {
        StackError::InvalidArgument(_) => ExitCodes::INVALID_ARGS,
        _ => ExitCodes::STACK_ERROR,
    }
}

/// Categorize error to determine exit code
fn categorize_error(e: &anyhow::Error) -> u8 {
    for cause in e.chain() {
        if let Some(e) = cause.downcast_ref::<TemplateError>() {
            return categorize_template_error(e);
        }
        if let Some(e) = cause.downcast_ref::<StackError>() {
            return categorize_stack_error(e);
        }
        if let Some(e) = cause.downcast_ref::<CoreError>() {
            return match e {
                CoreError::Template(e) => categorize_template_error(e),
                CoreError::Stack(e) => categorize_stack_error(e),
                CoreError::SubmissionFailed { .. } => ExitCodes::STACK_ERROR,
                _ => ExitCodes::GENERAL_ERROR,
            };
        }
    }

    if e.to_string().starts_with("Missing option") {
        ExitCodes::INVALID_ARGS
    } else {
        ExitCodes::GENERAL_ERROR
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn test_template_errors() {
        let e = anyhow::Error::new(TemplateError::MissingOption("Requires vpc-stack-name".into()));
        assert_eq!(categorize_error(&e), ExitCodes::INVALID_ARGS);

        let e = anyhow::Error::new(TemplateError::UnknownParameter("Env".into()));
        assert_eq!(categorize_error(&e), ExitCodes::TEMPLATE_ERROR);
    }

    #[test]
    fn test_wrapped_errors() {
        let e = anyhow::Error::new(CoreError::SubmissionFailed {
            command: "aws cloudformation update-stack".into(),
            exit_code: Some(255),
            message: "boom".into(),
        });
        assert_eq!(categorize_error(&e), ExitCodes::STACK_ERROR);

        let e = Err::<(), _>(StackError::StackNotFound("vpc".into()))
            .context("Resolving VPC")
            .unwrap_err();
        assert_eq!(categorize_error(&e), ExitCodes::STACK_ERROR);
    }

    #[test]
    fn test_plain_errors() {
        let e = anyhow::anyhow!("Missing option: region is required");
        assert_eq!(categorize_error(&e), ExitCodes::INVALID_ARGS);
        assert_eq!(categorize_error(&anyhow::anyhow!("boom")), ExitCodes::GENERAL_ERROR);
    }
}
