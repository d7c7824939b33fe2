//! S3 bucket stacks

use crate::environment::Environment;
use crate::error::Result;
use crate::template::{Resource, Template, Value};

use super::types;

const CLOUDTRAIL_SERVICE: &str = "cloudtrail.amazonaws.com";

fn versioning_enabled() -> Value {
    Value::object([("Status", "Enabled")])
}

/// `secure-bucket` stack: a private, KMS-encrypted, versioned bucket
pub fn secure_bucket(env: &Environment) -> Result<Template> {
    let mut template = Template::new();
    template.set_description("Private S3 bucket with KMS encryption and versioning");

    template.add_resource(
        Resource::new("SecureBucket", types::BUCKET)
            .with_property("BucketName", env.storage.secure_bucket.as_str())
            .with_property("AccessControl", "Private")
            .with_property(
                "PublicAccessBlockConfiguration",
                Value::object([
                    ("BlockPublicAcls", true),
                    ("IgnorePublicAcls", true),
                    ("BlockPublicPolicy", true),
                    ("RestrictPublicBuckets", true),
                ]),
            )
            .with_property(
                "BucketEncryption",
                Value::object([(
                    "ServerSideEncryptionConfiguration",
                    Value::list([Value::object([(
                        "ServerSideEncryptionByDefault",
                        Value::object([
                            ("SSEAlgorithm", "aws:kms"),
                            ("KMSMasterKeyID", env.security.kms_key_arn.as_str()),
                        ]),
                    )])]),
                )]),
            )
            .with_property("VersioningConfiguration", versioning_enabled()),
    )?;

    Ok(template)
}

/// `s3-replication` stack: a source bucket replicated to a backup bucket,
/// with CloudTrail recording object activity on the source into the backup
pub fn s3_replication(env: &Environment) -> Result<Template> {
    let mut template = Template::new();
    template.set_description("S3 replication to a backup bucket with CloudTrail data events");

    let storage = &env.storage;
    let backup_arn = env.bucket_arn(&storage.replication_backup_bucket);

    template.add_resource(
        Resource::new("SourceBucket", types::BUCKET)
            .with_property("BucketName", storage.replication_source_bucket.as_str())
            .with_property("VersioningConfiguration", versioning_enabled())
            .with_property(
                "ReplicationConfiguration",
                Value::object([
                    ("Role", Value::from(env.replication_role_arn())),
                    (
                        "Rules",
                        Value::list([Value::object([
                            ("Id", Value::from("ReplicateToBackup")),
                            ("Status", Value::from("Enabled")),
                            ("Prefix", Value::from("")),
                            (
                                "Destination",
                                Value::object([("Bucket", backup_arn.as_str())]),
                            ),
                        ])]),
                    ),
                ]),
            ),
    )?;

    // Replication requires versioning on the destination too
    let backup = template.add_resource(
        Resource::new("BackupBucket", types::BUCKET)
            .with_property("BucketName", storage.replication_backup_bucket.as_str())
            .with_property("VersioningConfiguration", versioning_enabled()),
    )?;

    let principal = || Value::object([("Service", CLOUDTRAIL_SERVICE)]);
    let policy = template.add_resource(
        Resource::new("BackupBucketPolicy", types::BUCKET_POLICY)
            .with_property("Bucket", &backup)
            .with_property(
                "PolicyDocument",
                Value::object([
                    ("Version", Value::from("2012-10-17")),
                    (
                        "Statement",
                        Value::list([
                            Value::object([
                                ("Effect", Value::from("Allow")),
                                ("Principal", principal()),
                                ("Action", Value::from("s3:GetBucketAcl")),
                                ("Resource", Value::from(backup_arn.as_str())),
                            ]),
                            Value::object([
                                ("Effect", Value::from("Allow")),
                                ("Principal", principal()),
                                ("Action", Value::from("s3:PutObject")),
                                (
                                    "Resource",
                                    Value::from(format!(
                                        "{}/AWSLogs/{}/*",
                                        backup_arn, env.aws.account_id
                                    )),
                                ),
                                (
                                    "Condition",
                                    Value::object([(
                                        "StringEquals",
                                        Value::object([(
                                            "s3:x-amz-acl",
                                            "bucket-owner-full-control",
                                        )]),
                                    )]),
                                ),
                            ]),
                        ]),
                    ),
                ]),
            ),
    )?;

    // The trail can only deliver once the bucket policy is in place, which no
    // property reference expresses
    template.add_resource(
        Resource::new("Trail", types::TRAIL)
            .with_property("TrailName", storage.trail_name.as_str())
            .with_property("S3BucketName", storage.replication_backup_bucket.as_str())
            .with_property("IncludeGlobalServiceEvents", true)
            .with_property("IsLogging", true)
            .with_property(
                "EventSelectors",
                Value::list([Value::object([
                    ("ReadWriteType", Value::from("All")),
                    (
                        "DataResources",
                        Value::list([Value::object([
                            ("Type", Value::from("AWS::S3::Object")),
                            (
                                "Values",
                                Value::list([format!(
                                    "{}/*",
                                    env.bucket_arn(&storage.replication_source_bucket)
                                )]),
                            ),
                        ])]),
                    ),
                ])]),
            )
            .depends_on(backup.name())
            .depends_on(policy.name()),
    )?;

    Ok(template)
}
