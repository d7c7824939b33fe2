//! JSON renderer
//!
//! Intrinsic functions become single-key objects such as `{"Ref": "Net"}` or
//! `{"Fn::GetAtt": ["Eip", "AllocationId"]}`.

use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::{Map, Number, Value as JsonValue};

use crate::error::{Result, TemplateError};
use crate::template::{Intrinsic, Value};

use super::config::RenderConfig;

/// Serialise a document value as pretty-printed JSON
pub fn render_json(document: &Value, config: &RenderConfig) -> Result<String> {
    let tree = to_json(document)?;

    let indent = " ".repeat(config.json_indent);
    let mut buf = Vec::new();
    let mut serializer =
        serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(indent.as_bytes()));
    tree.serialize(&mut serializer)?;

    let mut out = String::from_utf8(buf)
        .map_err(|e| TemplateError::malformed("document", "", e.to_string()))?;
    out.push('\n');
    Ok(out)
}

/// Lower a value into a JSON tree
pub fn to_json(value: &Value) -> Result<JsonValue> {
    Ok(match value {
        Value::Null => JsonValue::Null,
        Value::Bool(b) => JsonValue::Bool(*b),
        Value::Integer(n) => JsonValue::Number((*n).into()),
        Value::Float(f) => JsonValue::Number(Number::from_f64(*f).ok_or_else(|| {
            TemplateError::malformed("document", "", format!("float value {} is not finite", f))
        })?),
        Value::String(s) => JsonValue::String(s.clone()),
        Value::List(items) => JsonValue::Array(items.iter().map(to_json).collect::<Result<_>>()?),
        Value::Map(map) => {
            let mut object = Map::new();
            for (key, item) in map {
                object.insert(key.clone(), to_json(item)?);
            }
            JsonValue::Object(object)
        }
        Value::Intrinsic(intrinsic) => intrinsic_to_json(intrinsic)?,
    })
}

fn intrinsic_to_json(intrinsic: &Intrinsic) -> Result<JsonValue> {
    let argument = match intrinsic {
        Intrinsic::Ref(name) => JsonValue::String(name.clone()),
        Intrinsic::GetAtt {
            resource,
            attribute,
        } => JsonValue::Array(vec![
            JsonValue::String(resource.clone()),
            JsonValue::String(attribute.clone()),
        ]),
        Intrinsic::Sub {
            template,
            variables,
        } => {
            if variables.is_empty() {
                JsonValue::String(template.clone())
            } else {
                let mut vars = Map::new();
                for (name, value) in variables {
                    vars.insert(name.clone(), to_json(value)?);
                }
                JsonValue::Array(vec![JsonValue::String(template.clone()), JsonValue::Object(vars)])
            }
        }
        Intrinsic::Join { delimiter, values } => JsonValue::Array(vec![
            JsonValue::String(delimiter.clone()),
            JsonValue::Array(values.iter().map(to_json).collect::<Result<_>>()?),
        ]),
        Intrinsic::Select { index, list } => JsonValue::Array(vec![
            JsonValue::Number((*index).into()),
            to_json(list)?,
        ]),
        Intrinsic::GetAZs(region) => JsonValue::String(region.clone()),
        Intrinsic::Base64(inner) | Intrinsic::ImportValue(inner) => to_json(inner)?,
    };

    let mut object = Map::new();
    object.insert(intrinsic.function_name().to_string(), argument);
    Ok(JsonValue::Object(object))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_ref_and_get_att() {
        assert_eq!(to_json(&Value::reference("Net")).unwrap(), json!({"Ref": "Net"}));
        assert_eq!(
            to_json(&Value::get_att("Eip", "AllocationId")).unwrap(),
            json!({"Fn::GetAtt": ["Eip", "AllocationId"]})
        );
    }

    #[test]
    fn test_sub_forms() {
        assert_eq!(
            to_json(&Value::sub("us-east-1a")).unwrap(),
            json!({"Fn::Sub": "us-east-1a"})
        );
        assert_eq!(
            to_json(&Value::sub_with("${A}-x", [("A", Value::reference("Net"))])).unwrap(),
            json!({"Fn::Sub": ["${A}-x", {"A": {"Ref": "Net"}}]})
        );
    }

    #[test]
    fn test_nested_intrinsics() {
        let value = Value::select(0, Value::get_azs(""));
        assert_eq!(
            to_json(&value).unwrap(),
            json!({"Fn::Select": [0, {"Fn::GetAZs": ""}]})
        );
        let joined = Value::join(",", [Value::from("a"), Value::reference("B")]);
        assert_eq!(
            to_json(&joined).unwrap(),
            json!({"Fn::Join": [",", ["a", {"Ref": "B"}]]})
        );
    }

    #[test]
    fn test_render_json_indent() {
        let doc = Value::object([("Resources", Value::object([("A", 1)]))]);
        let out = render_json(&doc, &RenderConfig::new()).unwrap();
        assert_eq!(out, "{\n    \"Resources\": {\n        \"A\": 1\n    }\n}\n");

        let out = render_json(&doc, &RenderConfig::new().with_json_indent(2)).unwrap();
        assert_eq!(out, "{\n  \"Resources\": {\n    \"A\": 1\n  }\n}\n");
    }

    #[test]
    fn test_key_order_preserved() {
        let doc = Value::object([("Zeta", 1), ("Alpha", 2)]);
        let out = render_json(&doc, &RenderConfig::new()).unwrap();
        assert!(out.find("Zeta").unwrap() < out.find("Alpha").unwrap());
    }
}
