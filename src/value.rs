//! Runtime values that templates render against
//!
//! A [`Value`] is built by the embedding application, or decoded from JSON,
//! YAML or TOML through its `serde::Deserialize` implementation. Host types
//! that should stay opaque implement [`Object`] and are wrapped as
//! [`Value::Custom`].

use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

use serde::de::{self, Deserialize, Deserializer, MapAccess, SeqAccess, Visitor};
use thiserror::Error;

/// Errors that can occur when decoding context data
#[derive(Error, Debug)]
pub enum DataError {
    #[error("failed to read context data: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid JSON context: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid YAML context: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid TOML context: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Serialization format of context data
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum DataFormat {
    Json,
    Yaml,
    Toml,
}

impl DataFormat {
    /// Guess the format from a file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()?.to_ascii_lowercase().as_str() {
            "json" => Some(DataFormat::Json),
            "yaml" | "yml" => Some(DataFormat::Yaml),
            "toml" => Some(DataFormat::Toml),
            _ => None,
        }
    }
}

/// Capabilities a host object exposes to templates
///
/// Every method has a default, so an implementation only provides what
/// its type supports.
pub trait Object: Send + Sync {
    /// Named-child lookup for map-like objects
    fn child(&self, _name: &str) -> Option<Value> {
        None
    }

    /// Named property of the object, consulted when `child` has no answer
    fn property(&self, _name: &str) -> Option<Value> {
        None
    }

    /// Text used when the object is interpolated
    fn render_text(&self) -> Option<String> {
        None
    }

    /// Objects reporting `true` are falsy in sections without being null
    fn is_null(&self) -> bool {
        false
    }

    /// Apply a named transform, `None` if unsupported
    fn transform(&self, _name: &str) -> Option<Value> {
        None
    }
}

impl fmt::Debug for dyn Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.render_text() {
            Some(text) => write!(f, "Object({text:?})"),
            None => f.write_str("Object"),
        }
    }
}

/// A closure invoked with the raw text of the section it decorates, or with
/// an empty string when used as a variable
#[derive(Clone)]
pub struct Lambda(Arc<dyn Fn(&str) -> Value + Send + Sync>);

impl Lambda {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&str) -> Value + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    pub fn call(&self, input: &str) -> Value {
        (self.0)(input)
    }
}

impl fmt::Debug for Lambda {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Lambda")
    }
}

/// A template value
#[derive(Debug, Clone, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Sequence(Vec<Value>),
    Map(HashMap<String, Value>),
    Lambda(Lambda),
    Custom(Arc<dyn Object>),
}

impl Value {
    pub fn lambda<F>(f: F) -> Self
    where
        F: Fn(&str) -> Value + Send + Sync + 'static,
    {
        Value::Lambda(Lambda::new(f))
    }

    pub fn custom(object: impl Object + 'static) -> Self {
        Value::Custom(Arc::new(object))
    }

    /// Look up a named child
    ///
    /// Maps answer from their entries, custom objects through [`Object::child`]
    /// then [`Object::property`]. A lambda is invoked with empty input and the
    /// lookup continues into its result.
    pub fn child(&self, name: &str) -> Option<Cow<'_, Value>> {
        match self {
            Value::Map(map) => map.get(name).map(Cow::Borrowed),
            Value::Custom(object) => object
                .child(name)
                .or_else(|| object.property(name))
                .map(Cow::Owned),
            Value::Lambda(lambda) => lambda
                .call("")
                .child(name)
                .map(|child| Cow::Owned(child.into_owned())),
            _ => None,
        }
    }

    /// Default stringification used for interpolation
    pub fn render_text(&self) -> String {
        match self {
            Value::Null | Value::Map(_) | Value::Lambda(_) => String::new(),
            Value::Bool(b) => b.to_string(),
            Value::Int(i) => i.to_string(),
            Value::Float(f) => f.to_string(),
            Value::String(s) => s.clone(),
            Value::Sequence(items) => items
                .iter()
                .map(Value::render_text)
                .collect::<Vec<_>>()
                .join(","),
            Value::Custom(object) => object.render_text().unwrap_or_default(),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Custom(object) => object.is_null(),
            _ => false,
        }
    }

    /// Decode context data in the given format
    pub fn from_str_as(text: &str, format: DataFormat) -> Result<Self, DataError> {
        match format {
            DataFormat::Json => Self::from_json_str(text),
            DataFormat::Yaml => Self::from_yaml_str(text),
            DataFormat::Toml => Self::from_toml_str(text),
        }
    }

    pub fn from_json_str(text: &str) -> Result<Self, DataError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn from_yaml_str(text: &str) -> Result<Self, DataError> {
        Ok(serde_yaml::from_str(text)?)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, DataError> {
        Ok(toml::from_str(text)?)
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Sequence(a), Value::Sequence(b)) => a == b,
            (Value::Map(a), Value::Map(b)) => a == b,
            (Value::Lambda(a), Value::Lambda(b)) => Arc::ptr_eq(&a.0, &b.0),
            (Value::Custom(a), Value::Custom(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i.into())
    }
}

impl From<u32> for Value {
    fn from(i: u32) -> Self {
        Value::Int(i.into())
    }
}

impl From<usize> for Value {
    fn from(i: usize) -> Self {
        i64::try_from(i).map_or(Value::Float(i as f64), Value::Int)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
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

impl From<Lambda> for Value {
    fn from(lambda: Lambda) -> Self {
        Value::Lambda(lambda)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::Sequence(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<HashMap<String, T>> for Value {
    fn from(map: HashMap<String, T>) -> Self {
        Value::Map(map.into_iter().map(|(k, v)| (k, v.into())).collect())
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Value {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Value::Map(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(ValueVisitor)
    }
}

struct ValueVisitor;

impl<'de> Visitor<'de> for ValueVisitor {
    type Value = Value;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a template context value")
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<Value, E> {
        Ok(Value::Bool(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Value, E> {
        Ok(Value::Int(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Value, E> {
        Ok(i64::try_from(v).map_or(Value::Float(v as f64), Value::Int))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Value, E> {
        Ok(Value::Float(v))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Value, E> {
        Ok(Value::String(v.to_string()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<Value, E> {
        Ok(Value::String(v))
    }

    fn visit_unit<E: de::Error>(self) -> Result<Value, E> {
        Ok(Value::Null)
    }

    fn visit_none<E: de::Error>(self) -> Result<Value, E> {
        Ok(Value::Null)
    }

    fn visit_some<D>(self, deserializer: D) -> Result<Value, D::Error>
    where
        D: Deserializer<'de>,
    {
        Value::deserialize(deserializer)
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<Value, A::Error>
    where
        A: SeqAccess<'de>,
    {
        let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(item) = seq.next_element()? {
            items.push(item);
        }
        Ok(Value::Sequence(items))
    }

    fn visit_map<A>(self, mut access: A) -> Result<Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut map = HashMap::with_capacity(access.size_hint().unwrap_or(0));
        while let Some((key, value)) = access.next_entry::<String, Value>()? {
            map.insert(key, value);
        }
        Ok(Value::Map(map))
    }
}
