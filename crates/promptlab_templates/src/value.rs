//! Variable values.
//!
//! Variable sets store every value as a string. Before rendering, each string is
//! decoded as JSON when it parses, so a set can feed arrays to loops or booleans
//! to conditionals; anything that is not valid JSON stays a plain string.

use std::collections::BTreeMap;

use serde::Serialize;

/// A decoded variable value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum VariableValue {
    Null,
    Bool(bool),
    Number(serde_json::Number),
    String(String),
    List(Vec<VariableValue>),
    Map(BTreeMap<String, VariableValue>),
}

impl VariableValue {
    /// Decode a raw string, falling back to the string itself.
    pub fn parse(raw: &str) -> Self {
        match serde_json::from_str::<serde_json::Value>(raw) {
            Ok(value) => value.into(),
            Err(_) => Self::String(raw.to_string()),
        }
    }

    /// Name of the value kind, for diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "boolean",
            Self::Number(_) => "number",
            Self::String(_) => "string",
            Self::List(_) => "list",
            Self::Map(_) => "map",
        }
    }
}

impl From<serde_json::Value> for VariableValue {
    fn from(value: serde_json::Value) -> Self {
        use serde_json::Value;

        match value {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Bool(b),
            Value::Number(n) => Self::Number(n),
            Value::String(s) => Self::String(s),
            Value::Array(items) => Self::List(items.into_iter().map(Self::from).collect()),
            Value::Object(map) => {
                Self::Map(map.into_iter().map(|(k, v)| (k, Self::from(v))).collect())
            }
        }
    }
}

impl From<&str> for VariableValue {
    fn from(raw: &str) -> Self {
        Self::parse(raw)
    }
}

/// Decode every value of a raw variable mapping.
pub fn decode_variables<'a, I>(raw: I) -> BTreeMap<String, VariableValue>
where
    I: IntoIterator<Item = (&'a String, &'a String)>,
{
    raw.into_iter()
        .map(|(name, value)| (name.clone(), VariableValue::parse(value)))
        .collect()
}
