//! YAML and JSON renderings of the same template describe the same document

use infra_template::template::{Output, Resource, Template, Value};
use infra_template::{Environment, Format, RenderConfig, Stack};
use pretty_assertions::assert_eq;
use serde_json::{json, Map, Value as JsonValue};
use serde_yaml::Value as YamlValue;

/// Convert a YAML tree to JSON, expanding `!Tag` short forms to `Fn::` objects
fn expand(value: &YamlValue) -> JsonValue {
    match value {
        YamlValue::Null => JsonValue::Null,
        YamlValue::Bool(b) => JsonValue::Bool(*b),
        YamlValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                json!(i)
            } else if let Some(u) = n.as_u64() {
                json!(u)
            } else {
                json!(n.as_f64().unwrap())
            }
        }
        YamlValue::String(s) => JsonValue::String(s.clone()),
        YamlValue::Sequence(items) => JsonValue::Array(items.iter().map(expand).collect()),
        YamlValue::Mapping(mapping) => {
            let mut object = Map::new();
            for (key, item) in mapping {
                let key = key.as_str().expect("keys are strings").to_string();
                object.insert(key, expand(item));
            }
            JsonValue::Object(object)
        }
        YamlValue::Tagged(tagged) => {
            let tag = tagged.tag.to_string();
            let name = tag.trim_start_matches('!');
            let argument = match (name, &tagged.value) {
                ("GetAtt", YamlValue::String(path)) => {
                    let (resource, attribute) = path.split_once('.').expect("dotted GetAtt");
                    json!([resource, attribute])
                }
                (_, inner) => expand(inner),
            };
            let key = if name == "Ref" {
                "Ref".to_string()
            } else {
                format!("Fn::{}", name)
            };
            let mut object = Map::new();
            object.insert(key, argument);
            JsonValue::Object(object)
        }
    }
}

fn assert_equivalent(template: &Template) {
    let json: JsonValue = serde_json::from_str(&template.to_json().unwrap()).unwrap();

    let short: YamlValue = serde_yaml::from_str(&template.to_yaml().unwrap()).unwrap();
    assert_eq!(expand(&short), json);

    let long_yaml = template
        .render_with_config(&RenderConfig::new().with_long_form(true))
        .unwrap();
    assert!(!long_yaml.contains(" !"), "long form must not use tags");
    let long: JsonValue = serde_yaml::from_str(&long_yaml).unwrap();
    assert_eq!(long, json);
}

fn all_intrinsics() -> Template {
    let mut template = Template::new();
    template.set_description("Every intrinsic function");
    let bucket = template
        .add_resource(Resource::new("Bucket", "AWS::S3::Bucket"))
        .unwrap();
    template
        .add_resource(
            Resource::new("Server", "AWS::EC2::Instance")
                .with_property("AvailabilityZone", Value::select(0, Value::get_azs("")))
                .with_property("UserData", Value::base64(Value::sub("#!/bin/sh\necho ${AWS::Region}")))
                .with_property(
                    "Tags",
                    Value::list([Value::object([
                        ("Key", Value::from("Bucket")),
                        (
                            "Value",
                            Value::join("/", [bucket.reference(), bucket.attribute("Arn")]),
                        ),
                    ])]),
                )
                .with_property(
                    "KeyName",
                    Value::sub_with("${Env}-key", [("Env", Value::import_value("SharedEnv"))]),
                )
                .with_property("EbsOptimized", false)
                .with_property("Count", 2),
        )
        .unwrap();
    template
        .add_output(
            Output::new("BucketArn", bucket.attribute("Arn"))
                .with_description("Bucket ARN")
                .with_export_name(Value::sub("${AWS::StackName}-BucketArn")),
        )
        .unwrap();
    template
}

#[test]
fn test_intrinsics_equivalent_across_formats() {
    assert_equivalent(&all_intrinsics());
}

#[test]
fn test_nested_intrinsic_falls_back_to_long_form() {
    let yaml = all_intrinsics().to_yaml().unwrap();
    assert!(yaml.contains("Fn::Base64: !Sub"));
    assert!(yaml.contains("!Select"));
    assert!(yaml.contains("!GetAZs"));
}

#[test]
fn test_catalogue_equivalent_across_formats() {
    let env = Environment::default();
    for stack in Stack::ALL {
        let template = stack.build(&env).unwrap();
        assert_equivalent(&template);
    }
}

#[test]
fn test_json_uses_object_form() {
    let json: JsonValue =
        serde_json::from_str(&all_intrinsics().render(Format::Json).unwrap()).unwrap();
    assert_eq!(
        json["Outputs"]["BucketArn"],
        json!({
            "Description": "Bucket ARN",
            "Value": {"Fn::GetAtt": ["Bucket", "Arn"]},
            "Export": {"Name": {"Fn::Sub": "${AWS::StackName}-BucketArn"}}
        })
    );
    assert_eq!(
        json["Resources"]["Server"]["Properties"]["AvailabilityZone"],
        json!({"Fn::Select": [0, {"Fn::GetAZs": ""}]})
    );
}
