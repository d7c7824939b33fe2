//! Resource type tags used by the stack catalogue

pub const VPC: &str = "AWS::EC2::VPC";
pub const SUBNET: &str = "AWS::EC2::Subnet";
pub const INTERNET_GATEWAY: &str = "AWS::EC2::InternetGateway";
pub const VPC_GATEWAY_ATTACHMENT: &str = "AWS::EC2::VPCGatewayAttachment";
pub const EIP: &str = "AWS::EC2::EIP";
pub const NAT_GATEWAY: &str = "AWS::EC2::NatGateway";
pub const ROUTE_TABLE: &str = "AWS::EC2::RouteTable";
pub const ROUTE: &str = "AWS::EC2::Route";
pub const SUBNET_ROUTE_TABLE_ASSOCIATION: &str = "AWS::EC2::SubnetRouteTableAssociation";
pub const SECURITY_GROUP: &str = "AWS::EC2::SecurityGroup";
pub const FLOW_LOG: &str = "AWS::EC2::FlowLog";
pub const INSTANCE: &str = "AWS::EC2::Instance";

pub const INSTANCE_PROFILE: &str = "AWS::IAM::InstanceProfile";

pub const ALARM: &str = "AWS::CloudWatch::Alarm";

pub const BUCKET: &str = "AWS::S3::Bucket";
pub const BUCKET_POLICY: &str = "AWS::S3::BucketPolicy";

pub const TRAIL: &str = "AWS::CloudTrail::Trail";
