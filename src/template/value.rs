//! Property values and intrinsic functions

use indexmap::IndexMap;

/// A property value: literal, nested record, sequence, or intrinsic function
///
/// Values are stored as given; nothing is checked against a provider schema.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
    List(Vec<Value>),
    Map(IndexMap<String, Value>),
    Intrinsic(Intrinsic),
}

/// Intrinsic functions resolved by the provisioning service
#[derive(Debug, Clone, PartialEq)]
pub enum Intrinsic {
    /// Identity of a resource or parameter, or a pseudo parameter
    Ref(String),
    /// Computed attribute of a resource
    GetAtt { resource: String, attribute: String },
    /// String interpolation with optional local variables
    Sub {
        template: String,
        variables: IndexMap<String, Value>,
    },
    Join { delimiter: String, values: Vec<Value> },
    Select { index: u32, list: Box<Value> },
    /// Availability zones of a region; an empty region means the stack's region
    GetAZs(String),
    Base64(Box<Value>),
    ImportValue(Box<Value>),
}

impl Intrinsic {
    /// The long-form function name
    pub fn function_name(&self) -> &'static str {
        match self {
            Intrinsic::Ref(_) => "Ref",
            Intrinsic::GetAtt { .. } => "Fn::GetAtt",
            Intrinsic::Sub { .. } => "Fn::Sub",
            Intrinsic::Join { .. } => "Fn::Join",
            Intrinsic::Select { .. } => "Fn::Select",
            Intrinsic::GetAZs(_) => "Fn::GetAZs",
            Intrinsic::Base64(_) => "Fn::Base64",
            Intrinsic::ImportValue(_) => "Fn::ImportValue",
        }
    }

    /// The short-form YAML tag name, without the leading `!`
    pub fn tag_name(&self) -> &'static str {
        let name = self.function_name();
        name.strip_prefix("Fn::").unwrap_or(name)
    }
}

impl Value {
    /// A `Ref` to a logical name or pseudo parameter
    pub fn reference(name: impl Into<String>) -> Self {
        Value::Intrinsic(Intrinsic::Ref(name.into()))
    }

    /// A `Fn::GetAtt` on a resource attribute
    pub fn get_att(resource: impl Into<String>, attribute: impl Into<String>) -> Self {
        Value::Intrinsic(Intrinsic::GetAtt {
            resource: resource.into(),
            attribute: attribute.into(),
        })
    }

    /// A `Fn::Sub` without local variables
    pub fn sub(template: impl Into<String>) -> Self {
        Value::Intrinsic(Intrinsic::Sub {
            template: template.into(),
            variables: IndexMap::new(),
        })
    }

    /// A `Fn::Sub` with local variables
    pub fn sub_with<K, V>(template: impl Into<String>, variables: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
    {
        Value::Intrinsic(Intrinsic::Sub {
            template: template.into(),
            variables: variables
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        })
    }

    pub fn join<V: Into<Value>>(delimiter: impl Into<String>, values: impl IntoIterator<Item = V>) -> Self {
        Value::Intrinsic(Intrinsic::Join {
            delimiter: delimiter.into(),
            values: values.into_iter().map(Into::into).collect(),
        })
    }

    pub fn select(index: u32, list: impl Into<Value>) -> Self {
        Value::Intrinsic(Intrinsic::Select {
            index,
            list: Box::new(list.into()),
        })
    }

    pub fn get_azs(region: impl Into<String>) -> Self {
        Value::Intrinsic(Intrinsic::GetAZs(region.into()))
    }

    pub fn base64(value: impl Into<Value>) -> Self {
        Value::Intrinsic(Intrinsic::Base64(Box::new(value.into())))
    }

    pub fn import_value(value: impl Into<Value>) -> Self {
        Value::Intrinsic(Intrinsic::ImportValue(Box::new(value.into())))
    }

    /// Build a nested record from key/value pairs, keeping their order
    pub fn object<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
    {
        Value::Map(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    pub fn list<V: Into<Value>>(items: impl IntoIterator<Item = V>) -> Self {
        Value::List(items.into_iter().map(Into::into).collect())
    }

    /// Get the intrinsic function if this value is one
    pub fn as_intrinsic(&self) -> Option<&Intrinsic> {
        match self {
            Value::Intrinsic(intrinsic) => Some(intrinsic),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<&String> for Value {
    fn from(s: &String) -> Self {
        Value::String(s.clone())
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Integer(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Integer(n.into())
    }
}

impl From<u16> for Value {
    fn from(n: u16) -> Self {
        Value::Integer(n.into())
    }
}

impl From<u32> for Value {
    fn from(n: u32) -> Self {
        Value::Integer(n.into())
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Float(n)
    }
}

impl From<Intrinsic> for Value {
    fn from(intrinsic: Intrinsic) -> Self {
        Value::Intrinsic(intrinsic)
    }
}

impl<V: Into<Value>> From<Vec<V>> for Value {
    fn from(items: Vec<V>) -> Self {
        Value::List(items.into_iter().map(Into::into).collect())
    }
}

impl From<IndexMap<String, Value>> for Value {
    fn from(map: IndexMap<String, Value>) -> Self {
        Value::Map(map)
    }
}

impl From<Properties> for Value {
    fn from(props: Properties) -> Self {
        Value::Map(props.into_inner())
    }
}

impl<V: Into<Value>> From<Option<V>> for Value {
    fn from(value: Option<V>) -> Self {
        value.map(Into::into).unwrap_or(Value::Null)
    }
}

/// Ordered property mapping of a resource or nested record
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Properties {
    entries: IndexMap<String, Value>,
}

impl Properties {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a property, keeping its first position
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.entries.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.entries.iter()
    }

    pub fn into_inner(self) -> IndexMap<String, Value> {
        self.entries
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Properties {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}
