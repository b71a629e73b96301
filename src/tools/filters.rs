//! Filter extraction from tool-call arguments.
//!
//! Models pass retrieval filters either as a mapping or as a list of
//! `{"key": ..., "value": ...}` pairs:
//!
//! ```text
//! [{"key": "locations LIKE", "value": "Rohweder"}, {"key": "store", "value": 3}]
//!   => {"locations LIKE": "Rohweder", "store": 3}
//! ```
//!
//! [`extract_filters`] turns the last assistant message into a [`FilterPlan`]
//! that the tool node hands to each tool through its execution context.

use std::collections::{BTreeMap, HashMap};

use serde_json::{Map, Value};

use super::registry::ToolRegistry;
use crate::types::{try_parse_object, Message};

/// Argument key carrying filters.
pub const FILTERS_ARGUMENT: &str = "filters";

/// Filter key → value constraints for one tool call.
pub type FilterSet = BTreeMap<String, Value>;

/// Build a [`FilterSet`] from a tool call's parsed arguments.
///
/// A mapping is used as-is. A list is folded entry by entry; later keys
/// overwrite earlier ones and entries missing `key` or `value` are skipped.
/// Non-string scalar keys are used in their JSON text form. Anything else
/// yields an empty set.
pub fn parse_filter_set(arguments: &Map<String, Value>) -> FilterSet {
    match arguments.get(FILTERS_ARGUMENT) {
        Some(Value::Object(map)) => map.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
        Some(Value::Array(entries)) => {
            let mut filters = FilterSet::new();
            for entry in entries {
                let Some(obj) = entry.as_object() else {
                    continue;
                };
                if let (Some(key), Some(value)) = (obj.get("key").and_then(filter_key), obj.get("value")) {
                    filters.insert(key, value.clone());
                }
            }
            filters
        }
        _ => FilterSet::new(),
    }
}

fn filter_key(key: &Value) -> Option<String> {
    match key {
        Value::String(text) => Some(text.clone()),
        Value::Number(_) | Value::Bool(_) => Some(key.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Per-tool filter decisions for one invocation.
///
/// Only tools that exist and accept filters have an entry. `Some(set)`
/// applies `set`; `None` explicitly unsets filters (the relaxed retry).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterPlan {
    entries: HashMap<String, Option<FilterSet>>,
}

impl FilterPlan {
    /// Filters to pass to `tool_name`, if any are set.
    pub fn filters_for(&self, tool_name: &str) -> Option<&FilterSet> {
        self.entries.get(tool_name).and_then(Option::as_ref)
    }

    /// Whether the plan addresses `tool_name` at all.
    pub fn addresses(&self, tool_name: &str) -> bool {
        self.entries.contains_key(tool_name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Compute the filter plan for the tool calls on `last_message`.
///
/// With `apply_filters` each addressed, filter-capable tool gets the set parsed
/// from its call's raw arguments (empty when absent or malformed). Without it
/// each such tool is explicitly unset. Unknown tools and tools without filter
/// support are skipped. Never fails.
pub fn extract_filters(
    last_message: &Message,
    tools: &ToolRegistry,
    apply_filters: bool,
) -> FilterPlan {
    let mut plan = FilterPlan::default();
    for call in &last_message.tool_calls {
        let Some(tool) = tools.get(&call.name) else {
            tracing::trace!(tool = %call.name, "no such tool, skipping filters");
            continue;
        };
        if !tool.supports_filters() {
            continue;
        }
        let filters = apply_filters.then(|| {
            let arguments = try_parse_object(&call.raw_arguments).unwrap_or_default();
            parse_filter_set(&arguments)
        });
        plan.entries.insert(call.name.clone(), filters);
    }
    plan
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::{AgentTool, AgentToolParameters, Tool};
    use crate::types::ToolCall;
    use serde_json::json;
    use std::sync::Arc;

    fn args(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap_or_default()
    }

    fn registry() -> ToolRegistry {
        let filtered: Arc<dyn Tool> = Arc::new(
            AgentTool::new("products", "", AgentToolParameters::retriever(), |_, _| async {
                Ok(json!([]))
            })
            .with_filters(),
        );
        let plain: Arc<dyn Tool> = Arc::new(AgentTool::new(
            "weather",
            "",
            AgentToolParameters::empty(),
            |_, _| async { Ok(json!("sunny")) },
        ));
        ToolRegistry::new().with_tool(filtered).with_tool(plain)
    }

    fn call_message(name: &str, raw: &str) -> Message {
        Message::assistant_with_tool_calls("", vec![ToolCall::new("c1", name, raw)])
    }

    #[test]
    fn mapping_filters_are_used_directly() {
        let filters = parse_filter_set(&args(json!({"filters": {"store": "north", "aisle": 4}})));
        assert_eq!(filters.get("store"), Some(&json!("north")));
        assert_eq!(filters.get("aisle"), Some(&json!(4)));
    }

    #[test]
    fn pair_list_folds_with_later_duplicates_winning() {
        let filters = parse_filter_set(&args(json!({"filters": [
            {"key": "locations LIKE", "value": "Rohweder"},
            {"key": "store", "value": 1},
            {"key": "store", "value": 2},
        ]})));
        assert_eq!(filters.len(), 2);
        assert_eq!(filters["locations LIKE"], json!("Rohweder"));
        assert_eq!(filters["store"], json!(2));
    }

    #[test]
    fn malformed_pairs_are_skipped() {
        let filters = parse_filter_set(&args(json!({"filters": [
            {"key": "a"},
            {"value": 1},
            "loose",
            {"key": ["x"], "value": 1},
            {"key": "b", "value": null},
        ]})));
        assert_eq!(filters.len(), 1);
        assert_eq!(filters["b"], Value::Null);
    }

    #[test]
    fn scalar_keys_are_kept_as_text() {
        let filters = parse_filter_set(&args(json!({"filters": [
            {"key": 7, "value": 1},
            {"key": true, "value": "yes"},
            {"key": "a", "value": 2},
        ]})));
        assert_eq!(filters.len(), 3);
        assert_eq!(filters["7"], json!(1));
        assert_eq!(filters["true"], json!("yes"));
        assert_eq!(filters["a"], json!(2));
    }

    #[test]
    fn non_collection_filters_yield_empty_set() {
        assert!(parse_filter_set(&args(json!({"filters": "store=north"}))).is_empty());
        assert!(parse_filter_set(&args(json!({"query": "x"}))).is_empty());
    }

    #[test]
    fn malformed_arguments_give_empty_filters() {
        let plan = extract_filters(&call_message("products", "{oops"), &registry(), true);
        assert!(plan.addresses("products"));
        assert_eq!(plan.filters_for("products"), Some(&FilterSet::new()));
    }

    #[test]
    fn plan_applies_and_clears_only_filter_capable_tools() {
        let raw = r#"{"query": "milk", "filters": [{"key": "store", "value": "north"}]}"#;
        let registry = registry();

        let applied = extract_filters(&call_message("products", raw), &registry, true);
        assert_eq!(applied.filters_for("products").map(|f| f.len()), Some(1));

        let cleared = extract_filters(&call_message("products", raw), &registry, false);
        assert!(cleared.addresses("products"));
        assert_eq!(cleared.filters_for("products"), None);

        let plain = extract_filters(&call_message("weather", raw), &registry, true);
        assert!(plain.is_empty());

        let unknown = extract_filters(&call_message("nope", raw), &registry, true);
        assert!(unknown.is_empty());
    }
}
