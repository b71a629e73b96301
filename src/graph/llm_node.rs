//! Graph node that calls a language model.

use std::sync::Arc;

use async_trait::async_trait;

use super::GraphNode;
use crate::error::{Result, SwitchyardError};
use crate::provider::{LlmClient, LlmRequest, ToolDefinition};
use crate::types::{ConversationState, GenerationSettings, Message, StateUpdate};

/// Where the node's system prompt goes relative to the conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PromptPlacement {
    #[default]
    Prepend,
    Append,
}

/// Calls a model with the conversation plus a system prompt.
pub struct LlmNode {
    name: String,
    client: Arc<dyn LlmClient>,
    system_prompt: String,
    placement: PromptPlacement,
    settings: GenerationSettings,
    tools: Option<Vec<ToolDefinition>>,
    tool_call_limit: Option<usize>,
}

impl std::fmt::Debug for LlmNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmNode")
            .field("name", &self.name)
            .field("endpoint", &self.client.endpoint())
            .field("placement", &self.placement)
            .field("tools", &self.tools.as_ref().map(Vec::len))
            .field("tool_call_limit", &self.tool_call_limit)
            .finish()
    }
}

impl LlmNode {
    pub fn new(
        name: impl Into<String>,
        client: Arc<dyn LlmClient>,
        system_prompt: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            client,
            system_prompt: system_prompt.into(),
            placement: PromptPlacement::default(),
            settings: GenerationSettings::default(),
            tools: None,
            tool_call_limit: None,
        }
    }

    pub fn with_placement(mut self, placement: PromptPlacement) -> Self {
        self.placement = placement;
        self
    }

    pub fn with_settings(mut self, settings: GenerationSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Bind tools to every request this node makes.
    pub fn with_tools(mut self, tools: Vec<ToolDefinition>) -> Self {
        self.tools = Some(tools);
        self
    }

    /// Keep at most `limit` tool calls on the last returned message.
    pub fn with_tool_call_limit(mut self, limit: usize) -> Self {
        self.tool_call_limit = Some(limit);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn request(&self, state: &ConversationState) -> LlmRequest {
        let mut messages = Vec::with_capacity(state.messages.len() + 1);
        let system = (!self.system_prompt.is_empty()).then(|| Message::system(&self.system_prompt));
        match self.placement {
            PromptPlacement::Prepend => {
                messages.extend(system);
                messages.extend(state.messages.iter().cloned());
            }
            PromptPlacement::Append => {
                messages.extend(state.messages.iter().cloned());
                messages.extend(system);
            }
        }
        LlmRequest {
            messages,
            settings: self.settings.clone(),
            tools: self.tools.clone(),
        }
    }
}

#[async_trait]
impl GraphNode for LlmNode {
    async fn run(&self, state: &ConversationState) -> Result<StateUpdate> {
        let request = self.request(state);
        let endpoint = self.client.endpoint();
        tracing::debug!(
            node = %self.name,
            endpoint,
            messages = request.messages.len(),
            "invoking model"
        );
        let response = self.client.invoke(&request).await.map_err(|err| match err {
            err @ SwitchyardError::Llm { .. } => err,
            other => SwitchyardError::llm(endpoint, other.to_string()),
        })?;

        let mut messages = response.into_messages()?;
        if let (Some(limit), Some(last)) = (self.tool_call_limit, messages.last_mut()) {
            if last.tool_calls.len() > limit {
                tracing::debug!(
                    node = %self.name,
                    requested = last.tool_calls.len(),
                    kept = limit,
                    "discarding extra tool calls"
                );
                last.tool_calls.truncate(limit);
            }
        }
        for message in &mut messages {
            message.ensure_id();
        }
        Ok(StateUpdate::messages(messages))
    }
}
