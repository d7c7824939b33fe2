//! Infra Template - build infrastructure-as-code templates in typed Rust
//!
//! Resources, outputs and parameters are declared through a [`Template`]
//! builder. Cross-references are checked and the document is serialised to
//! CloudFormation-style YAML or JSON. A small catalogue of ready-made stacks
//! lives in [`stacks`].
//!
//! # Example
//!
//! ```rust
//! use infra_template::{render_stack, Environment, RenderConfig, Stack};
//!
//! let yaml = render_stack(Stack::Vpc, &Environment::default(), &RenderConfig::new()).unwrap();
//! assert!(yaml.contains("AWS::EC2::VPC"));
//! ```

pub mod environment;
pub mod error;
pub mod renderer;
pub mod stacks;
pub mod substitution;
pub mod template;

pub use environment::{Environment, EnvironmentError};
pub use error::{SubstitutionError, TemplateError};
pub use renderer::{Format, RenderConfig};
pub use stacks::Stack;
pub use template::{Output, Parameter, Resource, ResourceHandle, Template, Value};

use thiserror::Error;
use tracing::debug;

/// Errors that can occur while generating a stack
#[derive(Debug, Error)]
pub enum GenerateError {
    /// The environment file could not be loaded
    #[error("environment error: {0}")]
    Environment(#[from] EnvironmentError),

    /// The stack could not be built or rendered
    #[error(transparent)]
    Template(#[from] TemplateError),
}

/// Build a catalogue stack and render it
///
/// Nothing is written anywhere; the caller decides where the text goes.
pub fn render_stack(
    stack: Stack,
    env: &Environment,
    config: &RenderConfig,
) -> Result<String, TemplateError> {
    debug!(stack = %stack, format = %config.format, "building stack");
    let template = stack.build(env)?;
    template.render_with_config(config)
}
