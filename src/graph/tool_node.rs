//! Tool execution node with a single filter-relaxation retry.
//!
//! The node answers every tool call on the last assistant message. When the
//! first normalized result is the empty-result sentinel, the calls are issued
//! once more with filters unset in the execution context and the `filters`
//! argument stripped from the first call. The retried results replace the
//! first ones whatever they contain.

use async_trait::async_trait;

use super::GraphNode;
use crate::error::{Result, SwitchyardError};
use crate::normalize::{normalize_tool_messages, NormalizedMessages};
use crate::tools::{
    extract_filters, FilterPlan, ToolArguments, ToolExecutionContext, ToolRegistry,
    FILTERS_ARGUMENT,
};
use crate::types::{ConversationState, Message, MessageContent, StateUpdate, ToolCall};

/// Where the node is in its invoke/retry cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryPhase {
    FirstInvoke,
    Evaluate,
    RetryInvoke,
    Done,
}

/// One call ready to hand to a tool.
#[derive(Debug, Clone)]
pub struct ToolInvocation {
    pub id: String,
    pub name: String,
    pub args: ToolArguments,
}

impl From<&ToolCall> for ToolInvocation {
    fn from(call: &ToolCall) -> Self {
        Self {
            id: call.id.clone(),
            name: call.name.clone(),
            args: ToolArguments::new(call.parsed_arguments.clone()),
        }
    }
}

/// Graph node that executes requested tool calls.
#[derive(Debug, Clone)]
pub struct ToolExecutionNode {
    name: String,
    tools: ToolRegistry,
}

impl ToolExecutionNode {
    pub fn new(name: impl Into<String>, tools: ToolRegistry) -> Self {
        Self {
            name: name.into(),
            tools,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    /// Execute `invocations` in order and normalize their results.
    async fn invoke_all(
        &self,
        invocations: &[ToolInvocation],
        plan: &FilterPlan,
    ) -> Result<NormalizedMessages> {
        let mut results = Vec::with_capacity(invocations.len());
        for invocation in invocations {
            let tool = self.tools.get(&invocation.name).ok_or_else(|| {
                SwitchyardError::tool(&invocation.name, "tool is not available to this agent")
            })?;
            let ctx = ToolExecutionContext::new(
                invocation.id.clone(),
                plan.filters_for(&invocation.name).cloned(),
            );
            tracing::debug!(
                node = %self.name,
                tool = %invocation.name,
                call_id = %invocation.id,
                filtered = ctx.filters.is_some(),
                "invoking tool"
            );
            let output = tool
                .execute(&invocation.args, &ctx)
                .await
                .map_err(|err| match err {
                    err @ SwitchyardError::ToolExecution { .. } => err,
                    other => SwitchyardError::tool(&invocation.name, other.to_string()),
                })?;
            results.push(Message::tool_result(
                invocation.id.clone(),
                invocation.name.clone(),
                MessageContent::from_value(output),
            ));
        }
        Ok(normalize_tool_messages(results))
    }
}

#[async_trait]
impl GraphNode for ToolExecutionNode {
    async fn run(&self, state: &ConversationState) -> Result<StateUpdate> {
        let Some(last) = state.last_message().filter(|m| m.has_tool_calls()) else {
            return Ok(StateUpdate::empty());
        };

        let mut phase = RetryPhase::FirstInvoke;
        let mut result = NormalizedMessages::default();
        while phase != RetryPhase::Done {
            phase = match phase {
                RetryPhase::FirstInvoke => {
                    let plan = extract_filters(last, &self.tools, true);
                    let invocations: Vec<ToolInvocation> =
                        last.tool_calls.iter().map(ToolInvocation::from).collect();
                    result = self.invoke_all(&invocations, &plan).await?;
                    RetryPhase::Evaluate
                }
                RetryPhase::Evaluate if result.first_is_empty_result() => RetryPhase::RetryInvoke,
                RetryPhase::Evaluate => RetryPhase::Done,
                RetryPhase::RetryInvoke => {
                    tracing::info!(node = %self.name, "empty tool result, retrying without filters");
                    let plan = extract_filters(last, &self.tools, false);
                    let mut invocations: Vec<ToolInvocation> =
                        last.tool_calls.iter().map(ToolInvocation::from).collect();
                    if let Some(first) = invocations.first_mut() {
                        first.args.remove(FILTERS_ARGUMENT);
                    }
                    result = self.invoke_all(&invocations, &plan).await?;
                    RetryPhase::Done
                }
                RetryPhase::Done => RetryPhase::Done,
            };
        }

        Ok(StateUpdate {
            messages: result.messages,
            custom_outputs: result.custom_outputs,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::{AgentTool, AgentToolParameters, Tool};
    use crate::types::{Role, EMPTY_RESULT_SENTINEL};
    use serde_json::{json, Value};
    use std::sync::{Arc, Mutex};

    type Seen = Arc<Mutex<Vec<(Value, Option<Value>)>>>;

    /// Retriever that returns `[]` while any filter is applied.
    fn strict_retriever(seen: Seen) -> Arc<dyn Tool> {
        Arc::new(
            AgentTool::new(
                "products",
                "Product search",
                AgentToolParameters::retriever(),
                move |args, ctx| {
                    let seen = seen.clone();
                    async move {
                        let filters = ctx.filters.clone().map(|f| json!(f));
                        seen.lock().unwrap().push((Value::Object(args.raw().clone()), filters));
                        if ctx.filters.as_ref().is_some_and(|f| !f.is_empty()) {
                            Ok(json!([]))
                        } else {
                            Ok(json!("oat milk, aisle 4"))
                        }
                    }
                },
            )
            .with_filters(),
        )
    }

    fn state_with_call(raw_arguments: &str) -> ConversationState {
        ConversationState::new(vec![
            Message::user("do you have oat milk?"),
            Message::assistant_with_tool_calls(
                "",
                vec![ToolCall::new("call_1", "products", raw_arguments)],
            ),
        ])
    }

    #[tokio::test]
    async fn empty_first_result_triggers_one_unfiltered_retry() {
        let seen: Seen = Arc::default();
        let node = ToolExecutionNode::new(
            "grocer_tools",
            ToolRegistry::new().with_tool(strict_retriever(seen.clone())),
        );
        let state = state_with_call(
            r#"{"query": "oat milk", "filters": [{"key": "store", "value": "north"}]}"#,
        );

        let update = node.run(&state).await.unwrap();

        let calls = seen.lock().unwrap().clone();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].1, Some(json!({"store": "north"})));
        assert!(calls[0].0.get("filters").is_some());
        assert_eq!(calls[1].1, None);
        assert_eq!(calls[1].0, json!({"query": "oat milk"}));

        assert_eq!(update.messages.len(), 1);
        assert_eq!(update.messages[0].role, Role::Tool);
        assert_eq!(update.messages[0].tool_call_id.as_deref(), Some("call_1"));
        assert_eq!(update.messages[0].text(), "oat milk, aisle 4");
    }

    #[tokio::test]
    async fn non_empty_first_result_is_not_retried() {
        let seen: Seen = Arc::default();
        let node = ToolExecutionNode::new(
            "grocer_tools",
            ToolRegistry::new().with_tool(strict_retriever(seen.clone())),
        );
        // no filters in the call, so the first result already has documents
        let update = node.run(&state_with_call(r#"{"query": "oat milk"}"#)).await.unwrap();
        assert_eq!(seen.lock().unwrap().len(), 1);
        assert_eq!(update.messages[0].text(), "oat milk, aisle 4");
    }

    #[tokio::test]
    async fn retry_result_replaces_first_even_when_still_empty() {
        let calls = Arc::new(Mutex::new(0));
        let counter = calls.clone();
        let tool: Arc<dyn Tool> = Arc::new(AgentTool::new(
            "products",
            "",
            AgentToolParameters::retriever(),
            move |_, _| {
                let counter = counter.clone();
                async move {
                    *counter.lock().unwrap() += 1;
                    Ok(json!([]))
                }
            },
        ));
        let node = ToolExecutionNode::new("t", ToolRegistry::new().with_tool(tool));
        let update = node.run(&state_with_call("{}")).await.unwrap();
        assert_eq!(*calls.lock().unwrap(), 2);
        assert_eq!(update.messages.len(), 1);
        assert_eq!(update.messages[0].text(), EMPTY_RESULT_SENTINEL);
    }

    #[tokio::test]
    async fn unknown_tool_is_an_execution_error() {
        let node = ToolExecutionNode::new("t", ToolRegistry::new());
        let err = node.run(&state_with_call("{}")).await.unwrap_err();
        assert!(matches!(err, SwitchyardError::ToolExecution { ref tool_name, .. } if tool_name == "products"));
    }

    #[tokio::test]
    async fn tool_failures_propagate_without_retry() {
        let tool: Arc<dyn Tool> = Arc::new(AgentTool::new(
            "products",
            "",
            AgentToolParameters::retriever(),
            |_, _| async { Err(SwitchyardError::InvalidArgument("bad query".into())) },
        ));
        let node = ToolExecutionNode::new("t", ToolRegistry::new().with_tool(tool));
        let err = node.run(&state_with_call("{}")).await.unwrap_err();
        assert!(err.to_string().contains("bad query"), "{err}");
        assert!(matches!(err, SwitchyardError::ToolExecution { .. }));
    }

    #[tokio::test]
    async fn no_tool_calls_means_no_update() {
        let node = ToolExecutionNode::new("t", ToolRegistry::new());
        let state = ConversationState::new(vec![Message::assistant("nothing to do")]);
        assert_eq!(node.run(&state).await.unwrap(), StateUpdate::empty());
        assert_eq!(
            node.run(&ConversationState::default()).await.unwrap(),
            StateUpdate::empty()
        );
    }

    #[tokio::test]
    async fn custom_outputs_surface_in_the_update() {
        let tool: Arc<dyn Tool> = Arc::new(AgentTool::new(
            "products",
            "",
            AgentToolParameters::retriever(),
            |_, _| async {
                let envelope = json!({
                    "format": "json",
                    "value": "{\"custom_outputs\": {\"sql\": \"select 1\"}, \"attachments\": [1]}",
                    "truncated": false
                });
                Ok(Value::String(envelope.to_string()))
            },
        ));
        let node = ToolExecutionNode::new("t", ToolRegistry::new().with_tool(tool));
        let update = node.run(&state_with_call("{}")).await.unwrap();
        assert_eq!(update.custom_outputs, Some(json!({"sql": "select 1"})));
        assert_eq!(update.messages[0].attachments, Some(json!([1])));
    }
}
