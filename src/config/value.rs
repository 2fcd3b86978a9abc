//! A small dynamically typed value used for rule options and for the
//! generic maps the migrator and config loader pass around, generalizing
//! the teacher's `toml::Value`-flavored options map to a format-neutral
//! shape (native config is YAML, foreign config may be JSON/JSONC/YAML).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    List(Vec<Value>),
    Table(BTreeMap<String, Value>),
}

impl Value {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            // Tolerate the natural wire-type promotion: integers can arrive
            // as floating-point from JSON/YAML.
            Value::Float(f) if f.fract() == 0.0 => Some(*f as i64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_string_list(&self) -> Option<Vec<String>> {
        match self {
            Value::List(items) => Some(
                items
                    .iter()
                    .filter_map(|v| match v {
                        Value::String(s) => Some(s.clone()),
                        Value::Int(i) => Some(i.to_string()),
                        Value::Float(f) => Some(f.to_string()),
                        Value::Bool(b) => Some(b.to_string()),
                        _ => None,
                    })
                    .collect(),
            ),
            _ => None,
        }
    }

    pub fn as_table(&self) -> Option<&BTreeMap<String, Value>> {
        match self {
            Value::Table(t) => Some(t),
            _ => None,
        }
    }

    pub fn is_truthy_scalar(&self) -> bool {
        !matches!(self, Value::Null | Value::Bool(false))
    }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::Int(i)
                } else {
                    Value::Float(n.as_f64().unwrap_or(0.0))
                }
            }
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => Value::List(items.into_iter().map(Value::from).collect()),
            serde_json::Value::Object(map) => {
                Value::Table(map.into_iter().map(|(k, v)| (k, Value::from(v))).collect())
            }
        }
    }
}

impl From<serde_yml::Value> for Value {
    fn from(v: serde_yml::Value) -> Self {
        match v {
            serde_yml::Value::Null => Value::Null,
            serde_yml::Value::Bool(b) => Value::Bool(b),
            serde_yml::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::Int(i)
                } else {
                    Value::Float(n.as_f64().unwrap_or(0.0))
                }
            }
            serde_yml::Value::String(s) => Value::String(s),
            serde_yml::Value::Sequence(items) => Value::List(items.into_iter().map(Value::from).collect()),
            serde_yml::Value::Mapping(map) => Value::Table(
                map.into_iter()
                    .filter_map(|(k, v)| k.as_str().map(|k| (k.to_string(), Value::from(v))))
                    .collect(),
            ),
            serde_yml::Value::Tagged(tagged) => Value::from(tagged.value),
        }
    }
}
