//! Non-failing JSON parsing used by the filter extractor and the normalizer.

use serde_json::{Map, Value};

/// Parse `text` as JSON, returning `None` instead of an error.
pub fn try_parse(text: &str) -> Option<Value> {
    serde_json::from_str(text).ok()
}

/// Parse `text` as a JSON object. Valid JSON of any other shape yields `None`.
pub fn try_parse_object(text: &str) -> Option<Map<String, Value>> {
    match try_parse(text)? {
        Value::Object(map) => Some(map),
        _ => None,
    }
}
