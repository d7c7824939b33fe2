//! Renderers turning a template into YAML or JSON text
//!
//! The template is first assembled into a single document [`Value`] with a
//! fixed key order, then lowered into the target format's tree. Intrinsic
//! functions stay typed until that last step so each format can spell them in
//! its own syntax.

pub mod config;
pub mod json;
pub mod yaml;

pub use config::{Format, RenderConfig};
pub use json::render_json;
pub use yaml::render_yaml;

use indexmap::IndexMap;

use crate::error::Result;
use crate::template::{Template, Value};

/// Render a template that has already been resolved
pub fn render(template: &Template, config: &RenderConfig) -> Result<String> {
    let document = document(template);
    match config.format {
        Format::Yaml => render_yaml(&document, config),
        Format::Json => render_json(&document, config),
    }
}

/// Assemble the whole template into one ordered document value
pub fn document(template: &Template) -> Value {
    let mut root = IndexMap::new();

    if let Some(version) = template.version() {
        root.insert("AWSTemplateFormatVersion".to_string(), Value::from(version));
    }
    if let Some(description) = template.description() {
        root.insert("Description".to_string(), Value::from(description));
    }

    if template.parameter_count() > 0 {
        let parameters = template
            .parameters()
            .map(|p| {
                let mut entry = IndexMap::new();
                entry.insert("Type".to_string(), Value::from(p.parameter_type.as_str()));
                if let Some(description) = &p.description {
                    entry.insert("Description".to_string(), Value::from(description));
                }
                if let Some(default) = &p.default {
                    entry.insert("Default".to_string(), default.clone());
                }
                if !p.allowed_values.is_empty() {
                    entry.insert(
                        "AllowedValues".to_string(),
                        Value::List(p.allowed_values.clone()),
                    );
                }
                (p.name.clone(), Value::Map(entry))
            })
            .collect();
        root.insert("Parameters".to_string(), Value::Map(parameters));
    }

    let resources = template
        .resources()
        .map(|r| {
            let mut entry = IndexMap::new();
            entry.insert("Type".to_string(), Value::from(r.resource_type.as_str()));
            if !r.properties.is_empty() {
                entry.insert("Properties".to_string(), r.properties.clone().into());
            }
            match r.depends_on.as_slice() {
                [] => {}
                [single] => {
                    entry.insert("DependsOn".to_string(), Value::from(single));
                }
                many => {
                    entry.insert("DependsOn".to_string(), Value::list(many.iter()));
                }
            }
            if let Some(policy) = r.deletion_policy {
                entry.insert("DeletionPolicy".to_string(), Value::from(policy.to_string()));
            }
            if let Some(policy) = r.update_replace_policy {
                entry.insert(
                    "UpdateReplacePolicy".to_string(),
                    Value::from(policy.to_string()),
                );
            }
            (r.name.clone(), Value::Map(entry))
        })
        .collect();
    root.insert("Resources".to_string(), Value::Map(resources));

    if template.output_count() > 0 {
        let outputs = template
            .outputs()
            .map(|o| {
                let mut entry = IndexMap::new();
                if let Some(description) = &o.description {
                    entry.insert("Description".to_string(), Value::from(description));
                }
                entry.insert("Value".to_string(), o.value.clone());
                if let Some(name) = &o.export_name {
                    entry.insert(
                        "Export".to_string(),
                        Value::object([("Name", name.clone())]),
                    );
                }
                (o.name.clone(), Value::Map(entry))
            })
            .collect();
        root.insert("Outputs".to_string(), Value::Map(outputs));
    }

    Value::Map(root)
}
