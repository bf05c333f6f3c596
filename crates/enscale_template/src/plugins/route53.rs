//! Route53 DNS records and health checks.

use serde_json::{json, Map, Value};

use crate::error::{TemplateError, TemplateResult};
use crate::intrinsic::Ref;
use crate::resource::{types, Resource};
use crate::template::Template;

/// Record types accepted by [`Template::create_single_dns_record`].
pub const RECORD_TYPES: &[&str] = &[
    "A", "AAAA", "CNAME", "MX", "NS", "PTR", "SOA", "SPF", "SRV", "TXT",
];

/// Health check types accepted by [`Template::create_healthcheck`].
pub const HEALTH_CHECK_TYPES: &[&str] = &["HTTP", "HTTPS", "HTTP_STR_MATCH", "HTTPS_STR_MATCH", "TCP"];

/// Options for a single DNS record.
#[derive(Debug, Clone)]
pub struct DnsRecordOptions {
    pub record_type: String,
    pub ttl: u32,
    /// Defaults to a reference to `<app>PublicIpAddress`
    pub resource_records: Option<Value>,
    /// Reference to a health check resource
    pub healthcheck: Option<Value>,
    /// Object with `HostedZoneId` and `DNSName`
    pub alias_target: Option<Value>,
}

impl Default for DnsRecordOptions {
    fn default() -> Self {
        Self {
            record_type: "A".to_string(),
            ttl: 300,
            resource_records: None,
            healthcheck: None,
            alias_target: None,
        }
    }
}

impl DnsRecordOptions {
    pub fn record_type(mut self, record_type: impl Into<String>) -> Self {
        self.record_type = record_type.into();
        self
    }

    pub fn ttl(mut self, ttl: u32) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn resource_records(mut self, records: impl Into<Value>) -> Self {
        self.resource_records = Some(records.into());
        self
    }

    pub fn healthcheck(mut self, healthcheck: impl Into<Value>) -> Self {
        self.healthcheck = Some(healthcheck.into());
        self
    }

    pub fn alias_target(mut self, target: impl Into<Value>) -> Self {
        self.alias_target = Some(target.into());
        self
    }
}

/// Options for a health check.
#[derive(Debug, Clone)]
pub struct HealthCheckOptions {
    pub fqdn: Option<String>,
    pub ip_address: Option<String>,
    pub check_type: String,
    pub port: u16,
    pub resource_path: String,
    pub request_interval: u32,
    pub failure_threshold: u32,
    /// Required by the `*_STR_MATCH` types
    pub search_string: Option<String>,
}

impl Default for HealthCheckOptions {
    fn default() -> Self {
        Self {
            fqdn: None,
            ip_address: None,
            check_type: "HTTP".to_string(),
            port: 80,
            resource_path: "/".to_string(),
            request_interval: 30,
            failure_threshold: 3,
            search_string: None,
        }
    }
}

impl HealthCheckOptions {
    pub fn fqdn(fqdn: impl Into<String>) -> Self {
        Self {
            fqdn: Some(fqdn.into()),
            ..Default::default()
        }
    }

    pub fn ip_address(ip: impl Into<String>) -> Self {
        Self {
            ip_address: Some(ip.into()),
            ..Default::default()
        }
    }

    pub fn check_type(mut self, check_type: impl Into<String>) -> Self {
        self.check_type = check_type.into();
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn search_string(mut self, search: impl Into<String>) -> Self {
        self.search_string = Some(search.into());
        self
    }
}

/// `my_app-name` becomes `MyAppName`.
pub fn camelize(name: &str) -> String {
    name.split(|c: char| c == '_' || c == '-' || c.is_whitespace())
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect::<String>(),
                None => String::new(),
            }
        })
        .collect()
}

fn is_reference(value: &Value) -> bool {
    match value {
        Value::Object(map) => !map.is_empty(),
        Value::String(s) => !s.is_empty(),
        _ => false,
    }
}

fn check_alias_target(target: &Value) -> TemplateResult<()> {
    let map = target.as_object().ok_or_else(|| {
        TemplateError::InvalidAliasTarget("alias target must be an object".to_string())
    })?;
    for key in ["HostedZoneId", "DNSName"] {
        if !map.contains_key(key) {
            return Err(TemplateError::InvalidAliasTarget(format!(
                "alias target is missing {}",
                key
            )));
        }
    }
    Ok(())
}

impl Template {
    /// Single DNS record `<app>Hostname` in `zone_name`.
    ///
    /// Without an app name the camel-cased stack name is used instead.
    pub fn create_single_dns_record(
        &mut self,
        app_name: Option<&str>,
        stack_name: &str,
        zone_name: &str,
        record_name: &str,
        options: DnsRecordOptions,
    ) -> TemplateResult<Ref> {
        let app_name = app_name
            .map(str::to_string)
            .unwrap_or_else(|| camelize(stack_name));

        if !RECORD_TYPES.contains(&options.record_type.as_str()) {
            return Err(TemplateError::InvalidRecordType(options.record_type));
        }
        if let Some(healthcheck) = &options.healthcheck {
            if !is_reference(healthcheck) {
                return Err(TemplateError::InvalidHealthCheck(
                    "healthcheck must be a reference to a health check resource".to_string(),
                ));
            }
        }

        let mut properties = Map::new();
        properties.insert("Name".to_string(), json!(record_name));
        properties.insert("HostedZoneName".to_string(), json!(zone_name));
        properties.insert("Type".to_string(), json!(options.record_type));

        match options.alias_target {
            Some(target) => {
                check_alias_target(&target)?;
                properties.insert("AliasTarget".to_string(), target);
            }
            None => {
                properties.insert("TTL".to_string(), json!(options.ttl));
                let records = options
                    .resource_records
                    .unwrap_or_else(|| Ref::new(format!("{}PublicIpAddress", app_name)).to_value());
                properties.insert("ResourceRecords".to_string(), records);
            }
        }
        if let Some(healthcheck) = options.healthcheck {
            properties.insert("HealthCheckId".to_string(), healthcheck);
        }

        let resource = Resource::new(types::RECORD_SET).properties(properties);
        self.resource(&format!("{}Hostname", app_name), resource)
    }

    /// Health check `<app>Healthcheck` probing either an FQDN or an IP address.
    pub fn create_healthcheck(
        &mut self,
        app_name: &str,
        stack_name: &str,
        options: HealthCheckOptions,
    ) -> TemplateResult<Ref> {
        if !HEALTH_CHECK_TYPES.contains(&options.check_type.as_str()) {
            return Err(TemplateError::InvalidHealthCheck(format!(
                "type {} is not one of {}",
                options.check_type,
                HEALTH_CHECK_TYPES.join(", ")
            )));
        }
        if options.fqdn.is_none() && options.ip_address.is_none() {
            return Err(TemplateError::InvalidHealthCheck(
                "either fqdn or ip address is required".to_string(),
            ));
        }

        let mut config = Map::new();
        if let Some(ip) = options.ip_address {
            config.insert("IPAddress".to_string(), json!(ip));
        }
        if let Some(fqdn) = options.fqdn {
            config.insert("FullyQualifiedDomainName".to_string(), json!(fqdn));
        }
        config.insert("Port".to_string(), json!(options.port));
        config.insert("Type".to_string(), json!(options.check_type));
        if options.check_type != "TCP" {
            config.insert("ResourcePath".to_string(), json!(options.resource_path));
        }
        if options.check_type.ends_with("_STR_MATCH") {
            let search = options.search_string.ok_or_else(|| {
                TemplateError::InvalidHealthCheck(format!(
                    "type {} requires a search string",
                    options.check_type
                ))
            })?;
            config.insert("SearchString".to_string(), json!(search));
        }
        config.insert("RequestInterval".to_string(), json!(options.request_interval));
        config.insert("FailureThreshold".to_string(), json!(options.failure_threshold));

        let resource = Resource::new(types::HEALTH_CHECK)
            .property("HealthCheckConfig", Value::Object(config))
            .property(
                "HealthCheckTags",
                json!([
                    { "Key": "Application", "Value": app_name },
                    { "Key": "Stack", "Value": stack_name }
                ]),
            );
        self.resource(&format!("{}Healthcheck", app_name), resource)
    }

    pub fn create_hosted_zone(&mut self) -> TemplateResult<Ref> {
        Err(TemplateError::NotImplemented("create_hosted_zone".to_string()))
    }

    pub fn create_multiple_dns_records(&mut self) -> TemplateResult<Vec<Ref>> {
        Err(TemplateError::NotImplemented("create_multiple_dns_records".to_string()))
    }
}
