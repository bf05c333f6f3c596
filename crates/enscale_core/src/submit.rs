//! Stack create/update submission through the `aws` CLI.

use std::sync::Arc;

use enscale_runner::{format_command, CommandOutput, CommandRunner, CommandStatus};
use enscale_stack::ParameterValue;
use enscale_template::Template;
use tracing::{debug, info, warn};

use crate::error::{CoreError, CoreResult};

/// Submits a finished template as a stack create or update.
#[derive(Clone)]
pub struct StackSubmission {
    runner: Arc<dyn CommandRunner>,
}

impl StackSubmission {
    pub fn new(runner: Arc<dyn CommandRunner>) -> Self {
        Self { runner }
    }

    /// Parameter list submitted with the stack: every value bound in the
    /// template's registry, overrides first.
    pub fn parameters(template: &Template) -> Vec<ParameterValue> {
        template
            .registry()
            .bound_values()
            .iter()
            .map(|(k, v)| ParameterValue::new(k.as_str(), Some(v.clone())))
            .collect()
    }

    /// Command line for the submission.
    ///
    /// Fails when the template body is too large to be submitted inline.
    pub fn command(template: &Template) -> CoreResult<Vec<String>> {
        let body = template.template_body()?;
        let options = template.options();

        let mut command = vec![
            "aws".to_string(),
            "cloudformation".to_string(),
            if options.create_stack { "create-stack" } else { "update-stack" }.to_string(),
        ];
        if let Some(stack_name) = options.stack_name() {
            command.extend(["--stack-name".to_string(), stack_name.to_string()]);
        }
        if let Some(region) = options.region() {
            command.extend(["--region".to_string(), region.to_string()]);
        }
        if let Some(capabilities) = options.capabilities.as_deref() {
            command.extend(["--capabilities".to_string(), capabilities.to_string()]);
        }

        let parameters = Self::parameters(template);
        if !parameters.is_empty() {
            let json = serde_json::to_string(&parameters)
                .map_err(|e| CoreError::Serialization(e.to_string()))?;
            command.extend(["--parameters".to_string(), json]);
        }

        command.extend(["--template-body".to_string(), body]);
        Ok(command)
    }

    /// Run the submission.
    ///
    /// A missing `aws` executable is reported and returned as
    /// [`CommandStatus::NotFound`]; a non-zero exit is an error.
    pub async fn submit(&self, template: &Template) -> CoreResult<CommandOutput> {
        let command = Self::command(template)?;
        debug!("Submitting {}", format_command(&command[..3]));

        let output = self.runner.run(&command).await?;
        match output.status {
            CommandStatus::NotFound => {
                warn!("aws executable not found, stack was not submitted");
                Ok(output)
            }
            _ if output.success() => {
                info!(
                    "Submitted stack {} ({} ms)",
                    template.options().stack_name().unwrap_or("<unnamed>"),
                    output.duration_ms
                );
                Ok(output)
            }
            _ => Err(CoreError::SubmissionFailed {
                command: format_command(&command[..3]),
                exit_code: output.exit_code(),
                message: output.stderr.trim().to_string(),
            }),
        }
    }
}
