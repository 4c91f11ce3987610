//! The closed set of value kinds a caller can store or read back.
//!
//! Internally every layer is a `toml::Table`; [`Value`] is the public face of
//! those entries. Conversions run both ways: into `toml::Value` on `set` and
//! `set_default`, and out of it for `get` and `all_settings`.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::coerce;

/// A configuration value.
///
/// Serializes untagged, so an `all_settings()` snapshot renders as plain
/// JSON/TOML/YAML.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    String(String),
    Int(i64),
    Bool(bool),
    Float(f64),
    StringList(Vec<String>),
    Map(BTreeMap<String, Value>),
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v.into())
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value::Int(v.into())
    }
}

impl From<u16> for Value {
    fn from(v: u16) -> Self {
        Value::Int(v.into())
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float(v.into())
    }
}

impl From<Vec<String>> for Value {
    fn from(v: Vec<String>) -> Self {
        Value::StringList(v)
    }
}

impl From<Vec<&str>> for Value {
    fn from(v: Vec<&str>) -> Self {
        Value::StringList(v.into_iter().map(str::to_string).collect())
    }
}

impl From<&[&str]> for Value {
    fn from(v: &[&str]) -> Self {
        Value::StringList(v.iter().map(|s| s.to_string()).collect())
    }
}

impl From<BTreeMap<String, Value>> for Value {
    fn from(v: BTreeMap<String, Value>) -> Self {
        Value::Map(v)
    }
}

/// Map keys are lowercased on the way in, like every other key in the store.
impl From<Value> for toml::Value {
    fn from(v: Value) -> Self {
        match v {
            Value::String(s) => toml::Value::String(s),
            Value::Int(i) => toml::Value::Integer(i),
            Value::Bool(b) => toml::Value::Boolean(b),
            Value::Float(f) => toml::Value::Float(f),
            Value::StringList(items) => {
                toml::Value::Array(items.into_iter().map(toml::Value::String).collect())
            }
            Value::Map(map) => toml::Value::Table(
                map.into_iter()
                    .map(|(k, v)| (k.to_lowercase(), toml::Value::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<&toml::Value> for Value {
    fn from(v: &toml::Value) -> Self {
        match v {
            toml::Value::String(s) => Value::String(s.clone()),
            toml::Value::Integer(i) => Value::Int(*i),
            toml::Value::Float(f) => Value::Float(*f),
            toml::Value::Boolean(b) => Value::Bool(*b),
            toml::Value::Datetime(d) => Value::String(d.to_string()),
            toml::Value::Array(_) => Value::StringList(coerce::to_string_slice(v)),
            toml::Value::Table(t) => Value::Map(table_to_map(t)),
        }
    }
}

pub(crate) fn table_to_map(table: &toml::Table) -> BTreeMap<String, Value> {
    table
        .iter()
        .map(|(k, v)| (k.clone(), Value::from(v)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_list_becomes_string_array() {
        let v = toml::Value::from(Value::from(vec!["a", "b"]));
        let arr = v.as_array().unwrap();
        assert_eq!(arr.len(), 2);
        assert_eq!(arr[1].as_str().unwrap(), "b");
    }

    #[test]
    fn map_keys_are_lowercased() {
        let mut map = BTreeMap::new();
        map.insert("Port".to_string(), Value::Int(8080));
        let v = toml::Value::from(Value::Map(map));
        assert_eq!(v["port"].as_integer().unwrap(), 8080);
    }

    #[test]
    fn mixed_array_reads_back_as_strings() {
        let v: toml::Value = toml::from_str::<toml::Table>("ports = [80, 443]")
            .unwrap()
            .remove("ports")
            .unwrap();
        assert_eq!(
            Value::from(&v),
            Value::StringList(vec!["80".into(), "443".into()])
        );
    }

    #[test]
    fn serializes_untagged() {
        let mut map = BTreeMap::new();
        map.insert("port".to_string(), Value::Int(8080));
        map.insert("hosts".to_string(), Value::from(vec!["a"]));
        let json = serde_json::to_string(&Value::Map(map)).unwrap();
        assert_eq!(json, r#"{"hosts":["a"],"port":8080}"#);
    }
}
