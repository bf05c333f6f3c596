//! # enscale_template
//!
//! CloudFormation template construction for enscale.
//!
//! A [`Template`] accumulates parameters, mappings, resources and outputs into
//! a single [`Document`] and hands back [`Ref`] tokens that later declarations
//! embed. Every declaration is validated immediately; a failing call leaves
//! the document untouched.
//!
//! # Features
//!
//! - **Builders**: VPC, subnet, security group, instance and IAM shapes
//! - **Parameter Registry**: typed parameter helpers with bound values for submission
//! - **Instance Type Catalog**: EC2 and RDS types, current and obsolete
//! - **Recipes**: Route53 records and health checks, RDS instances
//!
//! # Example
//!
//! ```rust
//! use enscale_template::{StackOptions, Template, VpcOptions};
//!
//! let mut template = Template::new(StackOptions::new().with_stack_name("web")).unwrap();
//! template.description("Web stack");
//! let vpc = template.vpc("Vpc", "10.0.0.0/16", VpcOptions::default()).unwrap();
//! assert_eq!(vpc.name(), "Vpc");
//! println!("{}", template.to_json_pretty().unwrap());
//! ```

pub mod builders;
pub mod document;
pub mod error;
pub mod instance_type;
pub mod intrinsic;
pub mod options;
pub mod parameter;
pub mod params;
pub mod plugins;
pub mod resource;
pub mod template;
pub mod user_data;

pub use builders::{network_interface, InstanceOptions, SecurityGroupOptions, SubnetOptions, VpcOptions};
pub use document::{check_body_size, Document, TEMPLATE_BODY_LIMIT};
pub use error::{TemplateError, TemplateResult};
pub use instance_type::{InstanceFamily, InstanceTypeCatalog};
pub use intrinsic::{aws_region, aws_stack_name, base64, find_in_map, get_att, join, Ref};
pub use options::StackOptions;
pub use parameter::{Parameter, ParameterRegistry, ParameterType};
pub use plugins::{DnsRecordOptions, HealthCheckOptions, RdsOptions};
pub use resource::{types, Output, Resource, Tag};
pub use template::Template;
pub use user_data::{UserDataLoader, DEFAULT_USER_DATA_DIR};
