//! Integration tests for the ready-made stacks

use infra_template::{render_stack, Environment, Format, RenderConfig, Stack};
use pretty_assertions::assert_eq;

fn render(stack: Stack, format: Format) -> String {
    render_stack(
        stack,
        &Environment::default(),
        &RenderConfig::new().with_format(format),
    )
    .unwrap_or_else(|e| panic!("{} should render as {}: {}", stack, format, e))
}

#[test]
fn test_every_stack_renders_in_both_formats() {
    for stack in Stack::ALL {
        let yaml = render(stack, Format::Yaml);
        assert!(yaml.contains("Resources:"), "{} yaml", stack);
        let json = render(stack, Format::Json);
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert!(parsed["Resources"].is_object(), "{} json", stack);
    }
}

#[test]
fn test_vpc_resource_inventory() {
    let json = render(Stack::Vpc, Format::Json);
    let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
    let resources = parsed["Resources"].as_object().unwrap();

    let count = |kind: &str| {
        resources
            .values()
            .filter(|r| r["Type"] == kind)
            .count()
    };
    assert_eq!(count("AWS::EC2::VPC"), 1);
    assert_eq!(count("AWS::EC2::Subnet"), 4);
    assert_eq!(count("AWS::EC2::EIP"), 2);
    assert_eq!(count("AWS::EC2::NatGateway"), 2);
    assert_eq!(count("AWS::EC2::RouteTable"), 3);
    assert_eq!(count("AWS::EC2::Route"), 3);
    assert_eq!(count("AWS::EC2::SubnetRouteTableAssociation"), 4);
    assert_eq!(count("AWS::EC2::SecurityGroup"), 1);
    assert_eq!(parsed["Outputs"].as_object().unwrap().len(), 5);
}

#[test]
fn test_vpc_yaml_uses_short_forms() {
    let yaml = render(Stack::Vpc, Format::Yaml);
    assert!(yaml.contains("VpcId: !Ref Vpc"));
    assert!(yaml.contains("AllocationId: !GetAtt NatEipAZ1.AllocationId"));
    assert!(yaml.contains("AvailabilityZone: !Sub us-east-1a"));
    assert!(yaml.contains("DependsOn: InternetGatewayAttachment"));
}

#[test]
fn test_flow_logs_extend_vpc() {
    let vpc = Stack::Vpc.build(&Environment::default()).unwrap();
    let flow = Stack::VpcFlowLogs.build(&Environment::default()).unwrap();
    assert_eq!(flow.resource_count(), vpc.resource_count() + 1);

    let yaml = render(Stack::VpcFlowLogs, Format::Yaml);
    assert!(yaml.contains("TrafficType: REJECT"));
    assert!(yaml.contains("MaxAggregationInterval: 600"));
}

#[test]
fn test_secure_bucket_json_layout() {
    let json = render(Stack::SecureBucket, Format::Json);
    let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
    let bucket = &parsed["Resources"]["SecureBucket"];
    assert_eq!(bucket["Type"], "AWS::S3::Bucket");
    assert_eq!(bucket["Properties"]["BucketName"], "polystudent-q2-tp4");
    assert_eq!(
        bucket["Properties"]["PublicAccessBlockConfiguration"]["RestrictPublicBuckets"],
        true
    );
    assert_eq!(
        bucket["Properties"]["VersioningConfiguration"]["Status"],
        "Enabled"
    );
    assert!(json.starts_with("{\n    \"Description\""));
}

#[test]
fn test_environment_file_drives_identifiers() {
    let env = Environment::from_str(
        r#"
[aws]
region = "eu-west-3"
account_id = "111122223333"
availability_zones = ["eu-west-3a", "eu-west-3c"]
name_prefix = "acme"

[storage]
secure_bucket = "acme-secure"
replication_source_bucket = "acme-data"
replication_backup_bucket = "acme-data-backup"
"#,
    )
    .unwrap();

    let config = RenderConfig::new();
    let flow = render_stack(Stack::VpcFlowLogs, &env, &config).unwrap();
    assert!(flow.contains("AvailabilityZone: !Sub eu-west-3c"));
    assert!(flow.contains("Value: acme-vpc"));
    assert!(flow.contains("arn:aws:s3:::acme-secure"));

    let replication = render_stack(
        Stack::S3Replication,
        &env,
        &config.clone().with_format(Format::Json),
    )
    .unwrap();
    assert!(replication.contains("arn:aws:s3:::acme-data-backup/AWSLogs/111122223333/*"));
    assert!(replication.contains("arn:aws:s3:::acme-data/*"));
    assert!(!replication.contains("polystudents"));
}

#[test]
fn test_monitoring_alarm_settings() {
    let json = render(Stack::VpcMonitoring, Format::Json);
    let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
    let alarm = &parsed["Resources"]["AlarmPrivateAZ2"]["Properties"];
    assert_eq!(alarm["MetricName"], "NetworkPacketsIn");
    assert_eq!(alarm["Period"], 60);
    assert_eq!(alarm["EvaluationPeriods"], 1);
    assert_eq!(alarm["ComparisonOperator"], "GreaterThanThreshold");
    assert_eq!(
        alarm["Dimensions"][0]["Value"],
        serde_json::json!({"Ref": "PrivateAZ2Instance"})
    );
}
