//! YAML renderer
//!
//! Intrinsic functions use the short-form tags (`!Ref Net`,
//! `!GetAtt Eip.AllocationId`, `!Sub ...`). A YAML node carries a single tag,
//! so a function whose direct argument is itself a function falls back to the
//! long `Fn::` mapping form.

use serde_yaml::value::{Tag, TaggedValue};
use serde_yaml::{Mapping, Number, Value as YamlValue};

use crate::error::Result;
use crate::template::{Intrinsic, Value};

use super::config::RenderConfig;

/// Serialise a document value as YAML
pub fn render_yaml(document: &Value, config: &RenderConfig) -> Result<String> {
    let tree = to_yaml(document, config.long_form);
    Ok(serde_yaml::to_string(&tree)?)
}

/// Lower a value into a YAML tree
pub fn to_yaml(value: &Value, long_form: bool) -> YamlValue {
    match value {
        Value::Null => YamlValue::Null,
        Value::Bool(b) => YamlValue::Bool(*b),
        Value::Integer(n) => YamlValue::Number(Number::from(*n)),
        Value::Float(f) => YamlValue::Number(Number::from(*f)),
        Value::String(s) => YamlValue::String(s.clone()),
        Value::List(items) => {
            YamlValue::Sequence(items.iter().map(|v| to_yaml(v, long_form)).collect())
        }
        Value::Map(map) => {
            let mut mapping = Mapping::new();
            for (key, item) in map {
                mapping.insert(YamlValue::String(key.clone()), to_yaml(item, long_form));
            }
            YamlValue::Mapping(mapping)
        }
        Value::Intrinsic(intrinsic) => intrinsic_to_yaml(intrinsic, long_form),
    }
}

fn intrinsic_to_yaml(intrinsic: &Intrinsic, long_form: bool) -> YamlValue {
    let nested_tag = match intrinsic {
        Intrinsic::Base64(inner) | Intrinsic::ImportValue(inner) => inner.as_intrinsic().is_some(),
        _ => false,
    };

    if long_form || nested_tag {
        let mut mapping = Mapping::new();
        mapping.insert(
            YamlValue::String(intrinsic.function_name().to_string()),
            argument(intrinsic, true, long_form),
        );
        YamlValue::Mapping(mapping)
    } else {
        YamlValue::Tagged(Box::new(TaggedValue {
            tag: Tag::new(intrinsic.tag_name()),
            value: argument(intrinsic, false, long_form),
        }))
    }
}

/// The function argument; `mapping_form` selects the long-form `Fn::GetAtt` list
fn argument(intrinsic: &Intrinsic, mapping_form: bool, long_form: bool) -> YamlValue {
    match intrinsic {
        Intrinsic::Ref(name) => YamlValue::String(name.clone()),
        Intrinsic::GetAtt {
            resource,
            attribute,
        } => {
            if mapping_form {
                YamlValue::Sequence(vec![
                    YamlValue::String(resource.clone()),
                    YamlValue::String(attribute.clone()),
                ])
            } else {
                YamlValue::String(format!("{}.{}", resource, attribute))
            }
        }
        Intrinsic::Sub {
            template,
            variables,
        } => {
            if variables.is_empty() {
                YamlValue::String(template.clone())
            } else {
                let mut vars = Mapping::new();
                for (name, value) in variables {
                    vars.insert(YamlValue::String(name.clone()), to_yaml(value, long_form));
                }
                YamlValue::Sequence(vec![
                    YamlValue::String(template.clone()),
                    YamlValue::Mapping(vars),
                ])
            }
        }
        Intrinsic::Join { delimiter, values } => YamlValue::Sequence(vec![
            YamlValue::String(delimiter.clone()),
            YamlValue::Sequence(values.iter().map(|v| to_yaml(v, long_form)).collect()),
        ]),
        Intrinsic::Select { index, list } => YamlValue::Sequence(vec![
            YamlValue::Number(Number::from(*index)),
            to_yaml(list, long_form),
        ]),
        Intrinsic::GetAZs(region) => YamlValue::String(region.clone()),
        Intrinsic::Base64(inner) | Intrinsic::ImportValue(inner) => to_yaml(inner, long_form),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tag_of(value: &YamlValue) -> String {
        match value {
            YamlValue::Tagged(tagged) => tagged.tag.to_string(),
            other => panic!("expected tagged value, got {:?}", other),
        }
    }

    #[test]
    fn test_short_form_tags() {
        assert_eq!(tag_of(&to_yaml(&Value::reference("Net"), false)), "!Ref");
        assert_eq!(tag_of(&to_yaml(&Value::sub("us-east-1a"), false)), "!Sub");

        let att = to_yaml(&Value::get_att("Eip", "AllocationId"), false);
        match att {
            YamlValue::Tagged(tagged) => {
                assert_eq!(tagged.value, YamlValue::String("Eip.AllocationId".into()))
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_long_form_mapping() {
        let value = to_yaml(&Value::get_att("Eip", "AllocationId"), true);
        let YamlValue::Mapping(mapping) = value else {
            panic!("expected mapping");
        };
        let arg = mapping.get("Fn::GetAtt").unwrap();
        assert_eq!(
            arg,
            &YamlValue::Sequence(vec!["Eip".into(), "AllocationId".into()])
        );
    }

    #[test]
    fn test_nested_direct_intrinsic_uses_long_form() {
        let value = to_yaml(&Value::base64(Value::sub("echo ${AWS::Region}")), false);
        let YamlValue::Mapping(mapping) = value else {
            panic!("expected mapping");
        };
        assert_eq!(tag_of(mapping.get("Fn::Base64").unwrap()), "!Sub");
    }

    #[test]
    fn test_render_scalar_tag() {
        let doc = Value::object([("VpcId", Value::reference("Net"))]);
        let out = render_yaml(&doc, &RenderConfig::new()).unwrap();
        assert_eq!(out, "VpcId: !Ref Net\n");
    }

    #[test]
    fn test_render_plain_cidr() {
        let doc = Value::object([("CidrBlock", "10.0.0.0/16")]);
        let out = render_yaml(&doc, &RenderConfig::new()).unwrap();
        assert_eq!(out, "CidrBlock: 10.0.0.0/16\n");
    }
}
