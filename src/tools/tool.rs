//! Tool trait and closure-based tool wrapper.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use async_trait::async_trait;

use super::arguments::ToolArguments;
use super::filters::FilterSet;
use super::types::AgentToolParameters;
use crate::error::SwitchyardError;
use crate::provider::ToolDefinition;

/// Context available during one tool execution.
///
/// Filters travel with the request instead of living on the tool, so a tool
/// instance shared across concurrent turns never sees another turn's filters.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ToolExecutionContext {
    /// Id of the tool call being answered.
    pub tool_call_id: String,
    /// Filters for this call; `None` means unset.
    pub filters: Option<FilterSet>,
}

impl ToolExecutionContext {
    pub fn new(tool_call_id: impl Into<String>, filters: Option<FilterSet>) -> Self {
        Self {
            tool_call_id: tool_call_id.into(),
            filters,
        }
    }
}

/// Core tool trait. Implement to expose a capability to tool agents.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Tool name (must match what the model calls).
    fn name(&self) -> &str;

    /// Human-readable description.
    fn description(&self) -> &str;

    /// JSON Schema parameters.
    fn parameters(&self) -> &AgentToolParameters;

    /// Whether the tool accepts per-call filters.
    fn supports_filters(&self) -> bool {
        false
    }

    /// Execute the tool with parsed arguments.
    ///
    /// A returned string becomes text content; any other value becomes
    /// structured content. An empty array means "no documents".
    async fn execute(
        &self,
        args: &ToolArguments,
        ctx: &ToolExecutionContext,
    ) -> Result<serde_json::Value, SwitchyardError>;

    /// Definition bound to a model request.
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name().to_string(),
            description: self.description().to_string(),
            parameters: self.parameters().schema.clone(),
        }
    }
}

/// Type alias for the tool handler function.
type ToolHandler = dyn Fn(
        ToolArguments,
        ToolExecutionContext,
    ) -> Pin<Box<dyn Future<Output = Result<serde_json::Value, SwitchyardError>> + Send>>
    + Send
    + Sync;

/// Closure-based tool for quick tool creation.
pub struct AgentTool {
    name: String,
    description: String,
    parameters: AgentToolParameters,
    supports_filters: bool,
    handler: Arc<ToolHandler>,
}

impl AgentTool {
    /// Create a tool from a closure.
    pub fn new<F, Fut>(
        name: impl Into<String>,
        description: impl Into<String>,
        parameters: AgentToolParameters,
        handler: F,
    ) -> Self
    where
        F: Fn(ToolArguments, ToolExecutionContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<serde_json::Value, SwitchyardError>> + Send + 'static,
    {
        Self {
            name: name.into(),
            description: description.into(),
            parameters,
            supports_filters: false,
            handler: Arc::new(move |args, ctx| Box::pin(handler(args, ctx))),
        }
    }

    /// Builder: accept per-call filters.
    pub fn with_filters(mut self) -> Self {
        self.supports_filters = true;
        self
    }
}

#[async_trait]
impl Tool for AgentTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn parameters(&self) -> &AgentToolParameters {
        &self.parameters
    }

    fn supports_filters(&self) -> bool {
        self.supports_filters
    }

    async fn execute(
        &self,
        args: &ToolArguments,
        ctx: &ToolExecutionContext,
    ) -> Result<serde_json::Value, SwitchyardError> {
        (self.handler)(args.clone(), ctx.clone()).await
    }
}

impl std::fmt::Debug for AgentTool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentTool")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("supports_filters", &self.supports_filters)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn closure_tool_receives_context_filters() {
        let tool = AgentTool::new(
            "echo_filters",
            "Echo filters",
            AgentToolParameters::empty(),
            |_args, ctx| async move { Ok(json!(ctx.filters)) },
        )
        .with_filters();
        assert!(tool.supports_filters());

        let mut filters = FilterSet::new();
        filters.insert("store".into(), json!("north"));
        let out = tool
            .execute(
                &ToolArguments::default(),
                &ToolExecutionContext::new("c1", Some(filters)),
            )
            .await
            .unwrap();
        assert_eq!(out, json!({"store": "north"}));

        let definition = tool.definition();
        assert_eq!(definition.name, "echo_filters");
        assert_eq!(definition.parameters, AgentToolParameters::empty().schema);
    }
}
