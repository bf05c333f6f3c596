//! Instance type catalogs for EC2 and RDS.

/// Instance family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstanceFamily {
    GeneralPurpose,
    ComputeOptimized,
    MemoryOptimized,
    StorageOptimized,
}

/// Catalog of instance types offered by one service.
#[derive(Debug, Clone, Copy)]
pub struct InstanceTypeCatalog {
    current: &'static [(InstanceFamily, &'static [&'static str])],
    obsolete: &'static [&'static str],
}

const EC2_CURRENT: &[(InstanceFamily, &[&str])] = &[
    (
        InstanceFamily::GeneralPurpose,
        &[
            "t2.micro", "t2.small", "t2.medium", "t2.large", "m4.large", "m4.xlarge",
            "m4.2xlarge", "m4.4xlarge", "m4.10xlarge", "m3.medium", "m3.large", "m3.xlarge",
            "m3.2xlarge",
        ],
    ),
    (
        InstanceFamily::ComputeOptimized,
        &[
            "c4.large", "c4.xlarge", "c4.2xlarge", "c4.4xlarge", "c4.8xlarge", "c3.large",
            "c3.xlarge", "c3.2xlarge", "c3.4xlarge", "c3.8xlarge",
        ],
    ),
    (
        InstanceFamily::MemoryOptimized,
        &["r3.large", "r3.xlarge", "r3.2xlarge", "r3.4xlarge", "r3.8xlarge"],
    ),
    (
        InstanceFamily::StorageOptimized,
        &[
            "i2.xlarge", "i2.2xlarge", "i2.4xlarge", "i2.8xlarge", "d2.xlarge", "d2.2xlarge",
            "d2.4xlarge", "d2.8xlarge",
        ],
    ),
];

const EC2_OBSOLETE: &[&str] = &[
    "t1.micro", "m1.small", "m1.medium", "m1.large", "m1.xlarge", "c1.medium", "c1.xlarge",
    "m2.xlarge", "m2.2xlarge", "m2.4xlarge", "cc2.8xlarge", "cr1.8xlarge", "hi1.4xlarge",
    "hs1.8xlarge",
];

const RDS_CURRENT: &[(InstanceFamily, &[&str])] = &[
    (
        InstanceFamily::GeneralPurpose,
        &[
            "db.t2.micro", "db.t2.small", "db.t2.medium", "db.t2.large", "db.m4.large",
            "db.m4.xlarge", "db.m4.2xlarge", "db.m4.4xlarge", "db.m4.10xlarge", "db.m3.medium",
            "db.m3.large", "db.m3.xlarge", "db.m3.2xlarge",
        ],
    ),
    (
        InstanceFamily::MemoryOptimized,
        &["db.r3.large", "db.r3.xlarge", "db.r3.2xlarge", "db.r3.4xlarge", "db.r3.8xlarge"],
    ),
];

const RDS_OBSOLETE: &[&str] = &[
    "db.t1.micro", "db.m1.small", "db.m1.medium", "db.m1.large", "db.m1.xlarge",
    "db.m2.xlarge", "db.m2.2xlarge", "db.m2.4xlarge", "db.cr1.8xlarge",
];

impl InstanceTypeCatalog {
    pub fn ec2() -> Self {
        Self {
            current: EC2_CURRENT,
            obsolete: EC2_OBSOLETE,
        }
    }

    pub fn rds() -> Self {
        Self {
            current: RDS_CURRENT,
            obsolete: RDS_OBSOLETE,
        }
    }

    /// Current generation types of a family.
    pub fn current_generation(&self, family: InstanceFamily) -> &'static [&'static str] {
        self.current
            .iter()
            .find(|(f, _)| *f == family)
            .map(|(_, types)| *types)
            .unwrap_or(&[])
    }

    /// First general purpose type.
    pub fn default_type(&self) -> &'static str {
        self.current_generation(InstanceFamily::GeneralPurpose)
            .first()
            .copied()
            .unwrap_or_default()
    }

    fn is_current(&self, instance_type: &str) -> bool {
        self.current
            .iter()
            .any(|(_, types)| types.contains(&instance_type))
    }

    pub fn obsolete(&self, instance_type: &str) -> bool {
        self.obsolete.contains(&instance_type)
    }

    pub fn supported(&self, instance_type: &str) -> bool {
        self.is_current(instance_type) || self.obsolete(instance_type)
    }

    /// Allowed values for a parameter defaulting to `instance_type`.
    ///
    /// All current types, plus the obsolete ones when the default itself is obsolete.
    pub fn allowed_values(&self, instance_type: &str) -> Vec<String> {
        let mut allowed: Vec<String> = self
            .current
            .iter()
            .flat_map(|(_, types)| types.iter().map(|t| t.to_string()))
            .collect();
        if self.obsolete(instance_type) {
            allowed.extend(self.obsolete.iter().map(|t| t.to_string()));
        }
        allowed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_types() {
        assert_eq!(InstanceTypeCatalog::ec2().default_type(), "t2.micro");
        assert_eq!(InstanceTypeCatalog::rds().default_type(), "db.t2.micro");
    }

    #[test]
    fn test_supported_and_obsolete() {
        let ec2 = InstanceTypeCatalog::ec2();
        assert!(ec2.supported("m4.large"));
        assert!(ec2.supported("m1.small"));
        assert!(ec2.obsolete("m1.small"));
        assert!(!ec2.obsolete("m4.large"));
        assert!(!ec2.supported("z9.huge"));
    }

    #[test]
    fn test_allowed_values_include_obsolete_only_when_needed() {
        let rds = InstanceTypeCatalog::rds();
        assert!(!rds.allowed_values("db.m3.large").contains(&"db.m1.small".to_string()));
        assert!(rds.allowed_values("db.m1.small").contains(&"db.m1.small".to_string()));
        assert!(rds.allowed_values("db.m1.small").contains(&"db.m3.large".to_string()));
    }
}
