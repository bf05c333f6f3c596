//! Error types for template construction.

use thiserror::Error;

/// Result type alias for template operations.
pub type TemplateResult<T> = Result<T, TemplateError>;

/// Errors raised while building a template.
///
/// All of these are construction errors: they are raised immediately and
/// leave the document as it was before the failing call.
#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("Missing option: {0}")]
    MissingOption(String),

    #[error("Invalid option: {0}")]
    InvalidOption(String),

    #[error("Invalid logical name: {0}")]
    InvalidName(String),

    #[error("Resource {resource} has conflicting properties: {message}")]
    ConflictingProperties { resource: String, message: String },

    #[error("Unknown parameter: {0}")]
    UnknownParameter(String),

    #[error("Unknown resource: {0}")]
    UnknownResource(String),

    #[error("Instance type \"{instance_type}\" is not in allowed values: {}", allowed.join(" "))]
    InstanceTypeNotAllowed {
        instance_type: String,
        allowed: Vec<String>,
    },

    #[error("Not supported instance type: {0}")]
    UnsupportedInstanceType(String),

    #[error("Unable to deploy template exceeding {limit} limit: {size}")]
    TemplateTooLarge { size: usize, limit: usize },

    #[error("Unsupported DNS record type: {0:?}")]
    InvalidRecordType(String),

    #[error("Invalid health check: {0}")]
    InvalidHealthCheck(String),

    #[error("Invalid alias target: {0}")]
    InvalidAliasTarget(String),

    #[error("Requested zone {zone} is not supported, supported ones are {supported}")]
    UnsupportedAvailabilityZone { zone: String, supported: String },

    #[error("Not implemented: {0}")]
    NotImplemented(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}
