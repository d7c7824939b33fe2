//! The template document and its entries

use std::fmt;

use indexmap::IndexMap;
use tracing::{debug, info};

use crate::error::{EntryKind, Result, TemplateError};
use crate::renderer::{self, Format, RenderConfig};
use crate::substitution;

use super::resolver;
use super::value::{Intrinsic, Properties, Value};

/// Format version emitted by `Template::set_version` when none is given
pub const DEFAULT_VERSION: &str = "2010-09-09";

/// Maximum length of a logical name
const MAX_NAME_LEN: usize = 255;

/// What happens to a resource when it is removed or replaced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeletionPolicy {
    Delete,
    Retain,
    Snapshot,
}

impl fmt::Display for DeletionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeletionPolicy::Delete => write!(f, "Delete"),
            DeletionPolicy::Retain => write!(f, "Retain"),
            DeletionPolicy::Snapshot => write!(f, "Snapshot"),
        }
    }
}

/// A declared infrastructure object
#[derive(Debug, Clone, PartialEq)]
pub struct Resource {
    pub name: String,
    /// Type tag, e.g. `AWS::EC2::VPC`
    pub resource_type: String,
    pub properties: Properties,
    /// Explicit dependencies by logical name
    pub depends_on: Vec<String>,
    pub deletion_policy: Option<DeletionPolicy>,
    pub update_replace_policy: Option<DeletionPolicy>,
}

impl Resource {
    pub fn new(name: impl Into<String>, resource_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            resource_type: resource_type.into(),
            properties: Properties::new(),
            depends_on: Vec::new(),
            deletion_policy: None,
            update_replace_policy: None,
        }
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(key, value);
        self
    }

    pub fn with_properties(mut self, properties: Properties) -> Self {
        for (key, value) in properties.into_inner() {
            self.properties.insert(key, value);
        }
        self
    }

    /// Declare an explicit dependency on another resource
    pub fn depends_on(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        if !self.depends_on.contains(&name) {
            self.depends_on.push(name);
        }
        self
    }

    pub fn with_deletion_policy(mut self, policy: DeletionPolicy) -> Self {
        self.deletion_policy = Some(policy);
        self
    }

    pub fn with_update_replace_policy(mut self, policy: DeletionPolicy) -> Self {
        self.update_replace_policy = Some(policy);
        self
    }
}

/// A named value exported after the document is applied
#[derive(Debug, Clone, PartialEq)]
pub struct Output {
    pub name: String,
    pub value: Value,
    pub description: Option<String>,
    pub export_name: Option<Value>,
}

impl Output {
    pub fn new(name: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            description: None,
            export_name: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_export_name(mut self, name: impl Into<Value>) -> Self {
        self.export_name = Some(name.into());
        self
    }
}

/// An input supplied when the document is applied
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub name: String,
    /// Parameter type, e.g. `String` or `AWS::EC2::KeyPair::KeyName`
    pub parameter_type: String,
    pub description: Option<String>,
    pub default: Option<Value>,
    pub allowed_values: Vec<Value>,
}

impl Parameter {
    pub fn new(name: impl Into<String>, parameter_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parameter_type: parameter_type.into(),
            description: None,
            default: None,
            allowed_values: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_default(mut self, default: impl Into<Value>) -> Self {
        self.default = Some(default.into());
        self
    }

    pub fn with_allowed_values<V: Into<Value>>(mut self, values: impl IntoIterator<Item = V>) -> Self {
        self.allowed_values = values.into_iter().map(Into::into).collect();
        self
    }
}

/// Handle to a declared resource, used to build references to it
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceHandle {
    name: String,
}

impl ResourceHandle {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// `Ref` to this resource
    pub fn reference(&self) -> Value {
        Value::reference(self.name.clone())
    }

    /// `Fn::GetAtt` on an attribute of this resource
    pub fn attribute(&self, attribute: impl Into<String>) -> Value {
        Value::get_att(self.name.clone(), attribute)
    }
}

impl From<&ResourceHandle> for Value {
    fn from(handle: &ResourceHandle) -> Self {
        handle.reference()
    }
}

/// Handle to a declared parameter
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ParameterHandle {
    name: String,
}

impl ParameterHandle {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn reference(&self) -> Value {
        Value::reference(self.name.clone())
    }
}

impl From<&ParameterHandle> for Value {
    fn from(handle: &ParameterHandle) -> Self {
        handle.reference()
    }
}

/// An ordered document of parameters, resources and outputs
///
/// A template is built by a single writer: add calls take `&mut self` and the
/// type provides no internal synchronisation. Rendering borrows immutably and
/// can be repeated any number of times.
#[derive(Debug, Clone, Default)]
pub struct Template {
    version: Option<String>,
    description: Option<String>,
    parameters: IndexMap<String, Parameter>,
    resources: IndexMap<String, Resource>,
    outputs: IndexMap<String, Output>,
}

impl Template {
    /// Create an empty template
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the free-text description, replacing any previous one
    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = Some(description.into());
    }

    /// Set the format version; `None` selects the default version
    pub fn set_version(&mut self, version: Option<&str>) {
        self.version = Some(version.unwrap_or(DEFAULT_VERSION).to_string());
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    /// Register a resource and return a handle for referencing it
    pub fn add_resource(&mut self, resource: Resource) -> Result<ResourceHandle> {
        validate_name(EntryKind::Resource, &resource.name)?;
        if self.resources.contains_key(&resource.name) {
            return Err(TemplateError::DuplicateName {
                kind: EntryKind::Resource,
                name: resource.name,
            });
        }
        if self.parameters.contains_key(&resource.name) {
            return Err(TemplateError::DuplicateName {
                kind: EntryKind::Parameter,
                name: resource.name,
            });
        }

        let location = format!("resource '{}'", resource.name);
        for (key, value) in resource.properties.iter() {
            if key.is_empty() {
                return Err(TemplateError::malformed(&location, "Properties", "empty key"));
            }
            check_property(&location, key, value)?;
        }

        debug!(
            name = %resource.name,
            resource_type = %resource.resource_type,
            "adding resource"
        );
        let handle = ResourceHandle {
            name: resource.name.clone(),
        };
        self.resources.insert(resource.name.clone(), resource);
        Ok(handle)
    }

    /// Register an output
    pub fn add_output(&mut self, output: Output) -> Result<()> {
        validate_name(EntryKind::Output, &output.name)?;
        if self.outputs.contains_key(&output.name) {
            return Err(TemplateError::DuplicateName {
                kind: EntryKind::Output,
                name: output.name,
            });
        }

        let location = format!("output '{}'", output.name);
        check_property(&location, "Value", &output.value)?;
        if let Some(export) = &output.export_name {
            check_property(&location, "Export.Name", export)?;
        }

        debug!(name = %output.name, "adding output");
        self.outputs.insert(output.name.clone(), output);
        Ok(())
    }

    /// Register a parameter and return a handle for referencing it
    pub fn add_parameter(&mut self, parameter: Parameter) -> Result<ParameterHandle> {
        validate_name(EntryKind::Parameter, &parameter.name)?;
        if self.parameters.contains_key(&parameter.name) {
            return Err(TemplateError::DuplicateName {
                kind: EntryKind::Parameter,
                name: parameter.name,
            });
        }
        if self.resources.contains_key(&parameter.name) {
            return Err(TemplateError::DuplicateName {
                kind: EntryKind::Resource,
                name: parameter.name,
            });
        }

        let location = format!("parameter '{}'", parameter.name);
        if let Some(default) = &parameter.default {
            check_property(&location, "Default", default)?;
        }
        for (i, value) in parameter.allowed_values.iter().enumerate() {
            check_property(&location, &format!("AllowedValues[{}]", i), value)?;
        }

        debug!(name = %parameter.name, "adding parameter");
        let handle = ParameterHandle {
            name: parameter.name.clone(),
        };
        self.parameters.insert(parameter.name.clone(), parameter);
        Ok(handle)
    }

    pub fn resource(&self, name: &str) -> Option<&Resource> {
        self.resources.get(name)
    }

    pub fn output(&self, name: &str) -> Option<&Output> {
        self.outputs.get(name)
    }

    pub fn parameter(&self, name: &str) -> Option<&Parameter> {
        self.parameters.get(name)
    }

    /// Resources in declaration order
    pub fn resources(&self) -> impl Iterator<Item = &Resource> {
        self.resources.values()
    }

    /// Outputs in declaration order
    pub fn outputs(&self) -> impl Iterator<Item = &Output> {
        self.outputs.values()
    }

    /// Parameters in declaration order
    pub fn parameters(&self) -> impl Iterator<Item = &Parameter> {
        self.parameters.values()
    }

    pub fn resource_count(&self) -> usize {
        self.resources.len()
    }

    pub fn output_count(&self) -> usize {
        self.outputs.len()
    }

    pub fn parameter_count(&self) -> usize {
        self.parameters.len()
    }

    /// Check that every reference resolves and the dependency graph is acyclic
    pub fn validate(&self) -> Result<()> {
        resolver::resolve(self).map(|_| ())
    }

    /// Resource names ordered so that each follows everything it depends on
    pub fn dependency_order(&self) -> Result<Vec<String>> {
        resolver::resolve(self)?.creation_order()
    }

    /// Render with the default configuration for `format`
    pub fn render(&self, format: Format) -> Result<String> {
        self.render_with_config(&RenderConfig::new().with_format(format))
    }

    /// Validate, then serialise the whole document
    pub fn render_with_config(&self, config: &RenderConfig) -> Result<String> {
        resolver::resolve(self)?;
        let rendered = renderer::render(self, config)?;
        info!(
            format = %config.format,
            resources = self.resources.len(),
            outputs = self.outputs.len(),
            "rendered template"
        );
        Ok(rendered)
    }

    pub fn to_yaml(&self) -> Result<String> {
        self.render(Format::Yaml)
    }

    pub fn to_json(&self) -> Result<String> {
        self.render(Format::Json)
    }
}

/// Check that a logical name is non-empty, alphanumeric and not too long
fn validate_name(kind: EntryKind, name: &str) -> Result<()> {
    if name.is_empty()
        || name.len() > MAX_NAME_LEN
        || !name.chars().all(|c| c.is_ascii_alphanumeric())
    {
        return Err(TemplateError::InvalidName {
            kind,
            name: name.to_string(),
        });
    }
    Ok(())
}

/// Structural checks on a property value: keys non-empty, floats finite,
/// substitution strings well formed
fn check_property(location: &str, path: &str, value: &Value) -> Result<()> {
    match value {
        Value::Float(f) if !f.is_finite() => Err(TemplateError::malformed(
            location,
            path,
            format!("float value {} is not finite", f),
        )),
        Value::List(items) => {
            for (i, item) in items.iter().enumerate() {
                check_property(location, &format!("{}[{}]", path, i), item)?;
            }
            Ok(())
        }
        Value::Map(map) => {
            for (key, item) in map {
                if key.is_empty() {
                    return Err(TemplateError::malformed(location, path, "empty key"));
                }
                check_property(location, &format!("{}.{}", path, key), item)?;
            }
            Ok(())
        }
        Value::Intrinsic(intrinsic) => check_intrinsic(location, path, intrinsic),
        _ => Ok(()),
    }
}

fn check_intrinsic(location: &str, path: &str, intrinsic: &Intrinsic) -> Result<()> {
    match intrinsic {
        Intrinsic::Ref(name) | Intrinsic::GetAtt { resource: name, .. } if name.is_empty() => Err(
            TemplateError::malformed(location, path, "reference to an empty name"),
        ),
        Intrinsic::GetAtt { attribute, .. } if attribute.is_empty() => Err(
            TemplateError::malformed(location, path, "attribute name is empty"),
        ),
        Intrinsic::Sub {
            template,
            variables,
        } => {
            substitution::parse(template)?;
            for (name, value) in variables {
                if name.is_empty() {
                    return Err(TemplateError::malformed(
                        location,
                        path,
                        "substitution variable name is empty",
                    ));
                }
                check_property(location, &format!("{}.{}", path, name), value)?;
            }
            Ok(())
        }
        Intrinsic::Join { values, .. } => {
            for (i, item) in values.iter().enumerate() {
                check_property(location, &format!("{}[{}]", path, i), item)?;
            }
            Ok(())
        }
        Intrinsic::Select { list, .. } => check_property(location, path, list),
        Intrinsic::Base64(inner) | Intrinsic::ImportValue(inner) => {
            check_property(location, path, inner)
        }
        _ => Ok(()),
    }
}
