//! Deployment environment for the stack catalogue
//!
//! Account identifiers, bucket names, and instance settings differ between
//! deployments, so the stacks read them from an [`Environment`] instead of
//! hard-coding them. An environment is loaded from a TOML file; every field
//! is optional and falls back to the built-in default.

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

/// Errors that can occur when loading an environment file
#[derive(Error, Debug)]
pub enum EnvironmentError {
    #[error("Failed to read environment file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse environment TOML: {0}")]
    ParseError(#[from] toml::de::Error),
}

/// Settings consumed by the stack builders
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Environment {
    pub aws: AwsSettings,
    pub compute: ComputeSettings,
    pub security: SecuritySettings,
    pub storage: StorageSettings,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AwsSettings {
    pub region: String,
    pub account_id: String,
    /// Zones used for the first and second subnet pair
    pub availability_zones: Vec<String>,
    /// Prefix of `Name` tags
    pub name_prefix: String,
}

impl Default for AwsSettings {
    fn default() -> Self {
        Self {
            region: "us-east-1".to_string(),
            account_id: "625730254292".to_string(),
            availability_zones: vec!["us-east-1a".to_string(), "us-east-1b".to_string()],
            name_prefix: "polystudent".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ComputeSettings {
    pub ami_id: String,
    pub instance_type: String,
    /// Existing IAM role attached to instances through an instance profile
    pub instance_role: String,
}

impl Default for ComputeSettings {
    fn default() -> Self {
        Self {
            ami_id: "ami-0c02fb55956c7d316".to_string(),
            instance_type: "t3.micro".to_string(),
            instance_role: "LabRole".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SecuritySettings {
    pub kms_key_arn: String,
    /// Role name S3 assumes for replication
    pub replication_role: String,
}

impl Default for SecuritySettings {
    fn default() -> Self {
        Self {
            kms_key_arn:
                "arn:aws:kms:us-east-1:081743453153:key/0bdfb016-9a1e-43fe-9b7c-d351fa52a535"
                    .to_string(),
            replication_role: "LabRole".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    pub secure_bucket: String,
    pub replication_source_bucket: String,
    pub replication_backup_bucket: String,
    pub trail_name: String,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            secure_bucket: "polystudent-q2-tp4".to_string(),
            replication_source_bucket: "polystudents-ing-groupe14-tp4-q3".to_string(),
            replication_backup_bucket: "polystudents-ing-groupe14-tp4-q3-backup".to_string(),
            trail_name: "groupe14-s3-trail-q3".to_string(),
        }
    }
}

impl Environment {
    /// Load an environment from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, EnvironmentError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Load an environment from a TOML string
    pub fn from_str(content: &str) -> Result<Self, EnvironmentError> {
        Ok(toml::from_str(content)?)
    }

    /// ARN of the role used for bucket replication
    pub fn replication_role_arn(&self) -> String {
        format!(
            "arn:aws:iam::{}:role/{}",
            self.aws.account_id, self.security.replication_role
        )
    }

    /// ARN of a bucket by name
    pub fn bucket_arn(&self, bucket: &str) -> String {
        format!("arn:aws:s3:::{}", bucket)
    }

    /// Availability zone for a subnet pair, cycling when fewer zones are configured
    pub fn availability_zone(&self, index: usize) -> String {
        let zones = &self.aws.availability_zones;
        if zones.is_empty() {
            return format!("{}{}", self.aws.region, (b'a' + (index % 26) as u8) as char);
        }
        zones[index % zones.len()].clone()
    }

    /// A `Name` tag value under the configured prefix
    pub fn tag_name(&self, suffix: &str) -> String {
        format!("{}-{}", self.aws.name_prefix, suffix)
    }
}
