//! Request payloads.
//!
//! A payload maps parameter names to values. Optional parameters that
//! were not supplied are absent from the map, never `null`.

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::error::{Error, Result};

/// Named request parameters.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Payload(Map<String, Value>);

impl Payload {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a payload from a serializable request struct.
    ///
    /// The struct must serialize to an object; `null` members are dropped.
    pub fn from_request<T: Serialize>(request: &T) -> Result<Self> {
        match serde_json::to_value(request)? {
            Value::Object(map) => Ok(Self(
                map.into_iter().filter(|(_, v)| !v.is_null()).collect(),
            )),
            other => Err(Error::Config(format!(
                "request payload must be an object, got {}",
                other
            ))),
        }
    }

    /// Set a parameter.
    pub fn set(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        let value = value.into();
        if !value.is_null() {
            self.0.insert(key.into(), value);
        }
        self
    }

    /// Set a parameter only when a value is supplied.
    pub fn optional<V: Into<Value>>(self, key: impl Into<String>, value: Option<V>) -> Self {
        match value {
            Some(value) => self.set(key, value),
            None => self,
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Decode the payload back into a request struct.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_value(Value::Object(self.0.clone()))?)
    }

    /// Flatten into wire parameters.
    pub fn to_params(&self) -> Vec<(String, String)> {
        let mut params: Vec<(String, String)> = self
            .0
            .iter()
            .filter_map(|(k, v)| encode_value(v).map(|v| (k.clone(), v)))
            .collect();
        params.sort_by(|a, b| a.0.cmp(&b.0));
        params
    }
}

/// Encode one value the way the server reads form fields.
///
/// Booleans are flags (`1`/`0`); arrays and objects travel as compact JSON.
pub fn encode_value(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::Bool(b) => Some(if *b { "1" } else { "0" }.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) => Some(s.clone()),
        Value::Array(_) | Value::Object(_) => Some(value.to_string()),
    }
}
