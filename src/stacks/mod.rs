//! Catalogue of ready-made stacks
//!
//! Each stack is a plain builder function from an [`Environment`] to a
//! [`Template`]; [`Stack`] names them for the command line.

mod monitoring;
mod network;
mod storage;
pub mod types;

use std::fmt;
use std::str::FromStr;

use crate::environment::Environment;
use crate::error::Result;
use crate::renderer::Format;
use crate::template::{Template, Value};

pub use monitoring::vpc_monitoring;
pub use network::{vpc, vpc_flow_logs, Network, Zone};
pub use storage::{s3_replication, secure_bucket};

/// A `Tags` list holding a single `Name` tag
pub fn name_tag(value: impl Into<Value>) -> Value {
    Value::list([Value::object([("Key", Value::from("Name")), ("Value", value.into())])])
}

/// The stacks known to the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stack {
    Vpc,
    SecureBucket,
    VpcFlowLogs,
    VpcMonitoring,
    S3Replication,
}

impl Stack {
    pub const ALL: [Stack; 5] = [
        Stack::Vpc,
        Stack::SecureBucket,
        Stack::VpcFlowLogs,
        Stack::VpcMonitoring,
        Stack::S3Replication,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Stack::Vpc => "vpc",
            Stack::SecureBucket => "secure-bucket",
            Stack::VpcFlowLogs => "vpc-flow-logs",
            Stack::VpcMonitoring => "vpc-monitoring",
            Stack::S3Replication => "s3-replication",
        }
    }

    /// One-line summary for `--list`
    pub fn summary(&self) -> &'static str {
        match self {
            Stack::Vpc => "VPC, four subnets, internet and NAT gateways, security group",
            Stack::SecureBucket => "private S3 bucket with KMS encryption and versioning",
            Stack::VpcFlowLogs => "vpc plus flow logs of rejected traffic to the secure bucket",
            Stack::VpcMonitoring => "VPC with one instance per subnet and packet-rate alarms",
            Stack::S3Replication => "replicated S3 bucket pair with a CloudTrail trail",
        }
    }

    /// Format the stack is written in unless told otherwise
    pub fn default_format(&self) -> Format {
        match self {
            Stack::SecureBucket | Stack::S3Replication => Format::Json,
            Stack::Vpc | Stack::VpcFlowLogs | Stack::VpcMonitoring => Format::Yaml,
        }
    }

    /// Default output file name for a format
    pub fn default_output(&self, format: Format) -> String {
        format!("{}.{}", self.name(), format.extension())
    }

    /// Build the stack's template for an environment
    pub fn build(&self, env: &Environment) -> Result<Template> {
        match self {
            Stack::Vpc => vpc(env),
            Stack::SecureBucket => secure_bucket(env),
            Stack::VpcFlowLogs => vpc_flow_logs(env),
            Stack::VpcMonitoring => vpc_monitoring(env),
            Stack::S3Replication => s3_replication(env),
        }
    }
}

impl fmt::Display for Stack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Stack {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Stack::ALL
            .into_iter()
            .find(|stack| stack.name() == s)
            .ok_or_else(|| {
                let known: Vec<_> = Stack::ALL.iter().map(|s| s.name()).collect();
                format!("unknown stack '{}' (expected one of: {})", s, known.join(", "))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_round_trip() {
        for stack in Stack::ALL {
            assert_eq!(stack.name().parse::<Stack>().unwrap(), stack);
        }
        let err = "bucket".parse::<Stack>().unwrap_err();
        assert!(err.contains("secure-bucket"));
    }

    #[test]
    fn test_default_outputs() {
        assert_eq!(
            Stack::Vpc.default_output(Stack::Vpc.default_format()),
            "vpc.yaml"
        );
        assert_eq!(
            Stack::S3Replication.default_output(Stack::S3Replication.default_format()),
            "s3-replication.json"
        );
        assert_eq!(Stack::Vpc.default_output(Format::Json), "vpc.json");
    }

    #[test]
    fn test_every_stack_validates() {
        let env = Environment::default();
        for stack in Stack::ALL {
            let template = stack.build(&env).unwrap();
            template
                .validate()
                .unwrap_or_else(|e| panic!("{} failed to validate: {}", stack, e));
        }
    }

    #[test]
    fn test_name_tag_shape() {
        assert_eq!(
            name_tag("polystudent-vpc"),
            Value::list([Value::object([("Key", "Name"), ("Value", "polystudent-vpc")])])
        );
    }
}
