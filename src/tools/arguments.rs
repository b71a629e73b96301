//! Typed access to tool call arguments.

use serde_json::{Map, Value};

use crate::error::SwitchyardError;

/// Wrapper around tool call arguments providing typed extraction.
#[derive(Debug, Clone, Default)]
pub struct ToolArguments {
    value: Map<String, Value>,
}

impl ToolArguments {
    pub fn new(value: Map<String, Value>) -> Self {
        Self { value }
    }

    /// Get the arguments as a JSON object.
    pub fn raw(&self) -> &Map<String, Value> {
        &self.value
    }

    pub fn contains(&self, key: &str) -> bool {
        self.value.contains_key(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.value.remove(key)
    }

    /// Get a string argument by key.
    pub fn get_str(&self, key: &str) -> Result<&str, SwitchyardError> {
        self.value
            .get(key)
            .and_then(|v| v.as_str())
            .ok_or_else(|| SwitchyardError::InvalidArgument(format!("Missing string argument: {key}")))
    }

    /// Get an optional string argument.
    pub fn get_str_opt(&self, key: &str) -> Option<&str> {
        self.value.get(key).and_then(|v| v.as_str())
    }

    /// Get an integer argument.
    pub fn get_i64(&self, key: &str) -> Result<i64, SwitchyardError> {
        self.value
            .get(key)
            .and_then(|v| v.as_i64())
            .ok_or_else(|| SwitchyardError::InvalidArgument(format!("Missing integer argument: {key}")))
    }

    /// Deserialize the entire arguments into a typed struct.
    pub fn deserialize<T: serde::de::DeserializeOwned>(&self) -> Result<T, SwitchyardError> {
        serde_json::from_value(Value::Object(self.value.clone())).map_err(|e| {
            SwitchyardError::InvalidArgument(format!("Failed to deserialize arguments: {e}"))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    fn args(value: Value) -> ToolArguments {
        match value {
            Value::Object(map) => ToolArguments::new(map),
            _ => ToolArguments::default(),
        }
    }

    #[test]
    fn typed_getters() {
        let args = args(json!({"query": "apples", "limit": 3}));
        assert_eq!(args.get_str("query").unwrap(), "apples");
        assert_eq!(args.get_i64("limit").unwrap(), 3);
        assert!(args.get_str_opt("missing").is_none());
        assert!(matches!(
            args.get_str("limit"),
            Err(SwitchyardError::InvalidArgument(_))
        ));
    }

    #[test]
    fn deserialize_into_struct() {
        #[derive(Deserialize)]
        struct Query {
            query: String,
        }
        let parsed: Query = args(json!({"query": "pears"})).deserialize().unwrap();
        assert_eq!(parsed.query, "pears");
        assert!(args(json!({})).deserialize::<Query>().is_err());
    }
}
