//! VPC network stacks
//!
//! Two public and two private subnets spread over two availability zones,
//! an internet gateway for the public side, and one NAT gateway per zone for
//! the private side.

use crate::environment::Environment;
use crate::error::Result;
use crate::template::{Output, Resource, ResourceHandle, Template, Value};

use super::{name_tag, types};

/// Ingress rules of the shared security group: protocol, first port, last port
const INGRESS_RULES: &[(&str, u16, u16)] = &[
    ("tcp", 22, 22),
    ("tcp", 80, 80),
    ("tcp", 443, 443),
    ("udp", 53, 53),
    ("tcp", 53, 53),
    ("tcp", 1433, 1433),
    ("tcp", 5432, 5432),
    ("tcp", 3306, 3306),
    ("tcp", 3389, 3389),
    ("tcp", 1514, 1514),
    ("tcp", 9200, 9300),
];

const ANY_IPV4: &str = "0.0.0.0/0";

/// A subnet pair in one availability zone
#[derive(Debug, Clone)]
pub struct Zone {
    /// Suffix used in logical names, e.g. `AZ1`
    pub suffix: String,
    pub public_subnet: ResourceHandle,
    pub private_subnet: ResourceHandle,
}

/// Handles to the core network resources
#[derive(Debug, Clone)]
pub struct Network {
    pub vpc: ResourceHandle,
    pub zones: Vec<Zone>,
}

impl Network {
    pub fn public_subnets(&self) -> impl Iterator<Item = &ResourceHandle> {
        self.zones.iter().map(|z| &z.public_subnet)
    }

    pub fn private_subnets(&self) -> impl Iterator<Item = &ResourceHandle> {
        self.zones.iter().map(|z| &z.private_subnet)
    }
}

/// The VPC and its four subnets
pub fn add_network(template: &mut Template, env: &Environment) -> Result<Network> {
    let vpc = template.add_resource(
        Resource::new("Vpc", types::VPC)
            .with_property("CidrBlock", "10.0.0.0/16")
            .with_property("EnableDnsSupport", true)
            .with_property("EnableDnsHostnames", true)
            .with_property("Tags", name_tag(env.tag_name("vpc"))),
    )?;

    // Public subnets take 10.0.0.0/24 and 10.0.16.0/24, private ones the
    // matching blocks in the upper half of the VPC range
    let mut public = Vec::with_capacity(2);
    for index in 0..2 {
        public.push(template.add_resource(
            Resource::new(format!("PublicSubnetAZ{}", index + 1), types::SUBNET)
                .with_property("VpcId", &vpc)
                .with_property("CidrBlock", format!("10.0.{}.0/24", index * 16))
                .with_property("AvailabilityZone", Value::sub(env.availability_zone(index)))
                .with_property("MapPublicIpOnLaunch", true)
                .with_property("Tags", name_tag(format!("public-az{}", index + 1))),
        )?);
    }
    let mut private = Vec::with_capacity(2);
    for index in 0..2 {
        private.push(template.add_resource(
            Resource::new(format!("PrivateSubnetAZ{}", index + 1), types::SUBNET)
                .with_property("VpcId", &vpc)
                .with_property("CidrBlock", format!("10.0.{}.0/24", 128 + index * 16))
                .with_property("AvailabilityZone", Value::sub(env.availability_zone(index)))
                .with_property("MapPublicIpOnLaunch", false)
                .with_property("Tags", name_tag(format!("private-az{}", index + 1))),
        )?);
    }

    let zones = public
        .into_iter()
        .zip(private)
        .enumerate()
        .map(|(index, (public_subnet, private_subnet))| Zone {
            suffix: format!("AZ{}", index + 1),
            public_subnet,
            private_subnet,
        })
        .collect();

    Ok(Network { vpc, zones })
}

/// Internet gateway, per-zone NAT gateways and the route tables using them
pub fn add_routing(template: &mut Template, env: &Environment, network: &Network) -> Result<()> {
    let vpc = &network.vpc;

    let gateway = template.add_resource(
        Resource::new("InternetGateway", types::INTERNET_GATEWAY)
            .with_property("Tags", name_tag(env.tag_name("igw"))),
    )?;
    let attachment = template.add_resource(
        Resource::new("InternetGatewayAttachment", types::VPC_GATEWAY_ATTACHMENT)
            .with_property("VpcId", vpc)
            .with_property("InternetGatewayId", &gateway),
    )?;

    let mut nat_gateways = Vec::with_capacity(network.zones.len());
    for zone in &network.zones {
        // The address can only be allocated once the gateway is attached
        let eip = template.add_resource(
            Resource::new(format!("NatEip{}", zone.suffix), types::EIP)
                .with_property("Domain", "vpc")
                .depends_on(attachment.name()),
        )?;
        let nat = template.add_resource(
            Resource::new(format!("NatGateway{}", zone.suffix), types::NAT_GATEWAY)
                .with_property("AllocationId", eip.attribute("AllocationId"))
                .with_property("SubnetId", &zone.public_subnet),
        )?;
        nat_gateways.push(nat);
    }

    let public_table = template.add_resource(
        Resource::new("PublicRouteTable", types::ROUTE_TABLE).with_property("VpcId", vpc),
    )?;
    template.add_resource(
        Resource::new("PublicDefaultRoute", types::ROUTE)
            .with_property("RouteTableId", &public_table)
            .with_property("DestinationCidrBlock", ANY_IPV4)
            .with_property("GatewayId", &gateway),
    )?;
    for zone in &network.zones {
        template.add_resource(
            Resource::new(
                format!("PublicSubnet{}RouteTableAssociation", zone.suffix),
                types::SUBNET_ROUTE_TABLE_ASSOCIATION,
            )
            .with_property("SubnetId", &zone.public_subnet)
            .with_property("RouteTableId", &public_table),
        )?;
    }

    for (zone, nat) in network.zones.iter().zip(&nat_gateways) {
        let table = template.add_resource(
            Resource::new(format!("PrivateRouteTable{}", zone.suffix), types::ROUTE_TABLE)
                .with_property("VpcId", vpc),
        )?;
        template.add_resource(
            Resource::new(format!("PrivateDefaultRoute{}", zone.suffix), types::ROUTE)
                .with_property("RouteTableId", &table)
                .with_property("DestinationCidrBlock", ANY_IPV4)
                .with_property("NatGatewayId", nat),
        )?;
        template.add_resource(
            Resource::new(
                format!("PrivateSubnet{}RouteTableAssociation", zone.suffix),
                types::SUBNET_ROUTE_TABLE_ASSOCIATION,
            )
            .with_property("SubnetId", &zone.private_subnet)
            .with_property("RouteTableId", &table),
        )?;
    }

    Ok(())
}

/// Security group opening the service ports to any IPv4 address
pub fn add_security_group(
    template: &mut Template,
    env: &Environment,
    vpc: &ResourceHandle,
) -> Result<ResourceHandle> {
    let rules = INGRESS_RULES.iter().map(|&(protocol, from, to)| {
        Value::object([
            ("IpProtocol", Value::from(protocol)),
            ("FromPort", Value::from(from)),
            ("ToPort", Value::from(to)),
            ("CidrIp", Value::from(ANY_IPV4)),
        ])
    });

    template.add_resource(
        Resource::new("SecurityGroup", types::SECURITY_GROUP)
            .with_property("VpcId", vpc)
            .with_property(
                "GroupDescription",
                "Allows SSH, HTTP(S), DNS, database, RDP and log shipping traffic",
            )
            .with_property("SecurityGroupIngress", Value::list(rules))
            .with_property("Tags", name_tag(env.tag_name("sg"))),
    )
}

/// Outputs exposing the VPC and every subnet
pub fn add_network_outputs(template: &mut Template, network: &Network) -> Result<()> {
    template.add_output(
        Output::new("Vpc", &network.vpc).with_description("VPC identifier"),
    )?;
    for subnet in network.public_subnets().chain(network.private_subnets()) {
        template.add_output(Output::new(subnet.name(), subnet))?;
    }
    Ok(())
}

/// `vpc` stack
pub fn vpc(env: &Environment) -> Result<Template> {
    let mut template = Template::new();
    template.set_description("VPC with public and private subnets in two availability zones");

    let network = add_network(&mut template, env)?;
    add_routing(&mut template, env, &network)?;
    add_security_group(&mut template, env, &network.vpc)?;
    add_network_outputs(&mut template, &network)?;
    Ok(template)
}

/// `vpc-flow-logs` stack: the VPC stack plus rejected-traffic flow logs
pub fn vpc_flow_logs(env: &Environment) -> Result<Template> {
    let mut template = Template::new();
    template.set_description(
        "VPC with public and private subnets and flow logs of rejected traffic",
    );

    let network = add_network(&mut template, env)?;
    add_routing(&mut template, env, &network)?;
    add_security_group(&mut template, env, &network.vpc)?;
    template.add_resource(
        Resource::new("VpcFlowLog", types::FLOW_LOG)
            .with_property("ResourceId", &network.vpc)
            .with_property("ResourceType", "VPC")
            .with_property("TrafficType", "REJECT")
            .with_property("LogDestinationType", "s3")
            .with_property("LogDestination", env.bucket_arn(&env.storage.secure_bucket))
            .with_property("MaxAggregationInterval", 600),
    )?;
    add_network_outputs(&mut template, &network)?;
    Ok(template)
}
