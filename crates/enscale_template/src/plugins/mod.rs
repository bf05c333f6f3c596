//! Recipes composing the template builders into common stacks.

pub mod rds;
pub mod route53;

pub use rds::RdsOptions;
pub use route53::{camelize, DnsRecordOptions, HealthCheckOptions};
