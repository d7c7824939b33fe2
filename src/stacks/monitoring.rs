//! VPC with monitored instances
//!
//! One instance per subnet, each attached to the shared security group and an
//! instance profile for the configured role, and one CloudWatch alarm per
//! instance on incoming packets.

use crate::environment::Environment;
use crate::error::Result;
use crate::template::{Resource, ResourceHandle, Template, Value};

use super::network::{add_network, add_network_outputs, add_security_group};
use super::types;

/// Average incoming packets per period above which an alarm fires
const PACKETS_IN_THRESHOLD: i64 = 1000;
const ALARM_PERIOD_SECONDS: i64 = 60;

fn add_alarm(template: &mut Template, instance: &ResourceHandle, label: &str) -> Result<()> {
    template.add_resource(
        Resource::new(format!("Alarm{}", label), types::ALARM)
            .with_property(
                "AlarmDescription",
                format!(
                    "Triggers when NetworkPacketsIn exceeds {} on {}",
                    PACKETS_IN_THRESHOLD, label
                ),
            )
            .with_property("Namespace", "AWS/EC2")
            .with_property("MetricName", "NetworkPacketsIn")
            .with_property("Statistic", "Average")
            .with_property("Period", ALARM_PERIOD_SECONDS)
            .with_property("EvaluationPeriods", 1)
            .with_property("Threshold", PACKETS_IN_THRESHOLD)
            .with_property("ComparisonOperator", "GreaterThanThreshold")
            .with_property(
                "Dimensions",
                Value::list([Value::object([
                    ("Name", Value::from("InstanceId")),
                    ("Value", instance.reference()),
                ])]),
            ),
    )?;
    Ok(())
}

/// `vpc-monitoring` stack
pub fn vpc_monitoring(env: &Environment) -> Result<Template> {
    let mut template = Template::new();
    template.set_description(
        "VPC with one instance per subnet, an instance role and packet-rate alarms",
    );

    let network = add_network(&mut template, env)?;
    let security_group = add_security_group(&mut template, env, &network.vpc)?;

    let profile = template.add_resource(
        Resource::new("InstanceProfile", types::INSTANCE_PROFILE)
            .with_property("Roles", Value::list([env.compute.instance_role.as_str()])),
    )?;

    let mut instances = Vec::new();
    let placements = network
        .zones
        .iter()
        .map(|z| (format!("Public{}", z.suffix), &z.public_subnet))
        .chain(
            network
                .zones
                .iter()
                .map(|z| (format!("Private{}", z.suffix), &z.private_subnet)),
        );
    for (label, subnet) in placements {
        let instance = template.add_resource(
            Resource::new(format!("{}Instance", label), types::INSTANCE)
                .with_property("ImageId", env.compute.ami_id.as_str())
                .with_property("InstanceType", env.compute.instance_type.as_str())
                .with_property("SubnetId", subnet)
                .with_property("SecurityGroupIds", Value::list([&security_group]))
                .with_property("IamInstanceProfile", &profile),
        )?;
        instances.push((label, instance));
    }

    for (label, instance) in &instances {
        add_alarm(&mut template, instance, label)?;
    }

    add_network_outputs(&mut template, &network)?;
    Ok(template)
}
