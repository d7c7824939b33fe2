//! Template model: resources, outputs, parameters and the values they hold
//!
//! A [`Template`] is filled by a single linear build pass and then rendered:
//!
//! ```rust
//! use infra_template::template::{Output, Resource, Template};
//! use infra_template::Format;
//!
//! let mut template = Template::new();
//! let net = template
//!     .add_resource(Resource::new("Net", "AWS::EC2::VPC").with_property("CidrBlock", "10.0.0.0/16"))
//!     .unwrap();
//! template
//!     .add_resource(Resource::new("Sub", "AWS::EC2::Subnet").with_property("VpcId", &net))
//!     .unwrap();
//! template.add_output(Output::new("NetId", &net)).unwrap();
//!
//! let yaml = template.render(Format::Yaml).unwrap();
//! assert!(yaml.contains("VpcId: !Ref Net"));
//! ```

mod document;
pub mod resolver;
mod value;

pub use document::{
    DeletionPolicy, Output, Parameter, ParameterHandle, Resource, ResourceHandle, Template,
    DEFAULT_VERSION,
};
pub use resolver::{is_pseudo_parameter, DependencyGraph, PSEUDO_PARAMETERS};
pub use value::{Intrinsic, Properties, Value};
