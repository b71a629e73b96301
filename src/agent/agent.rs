//! Turn orchestration over a compiled agent graph.

use std::sync::Arc;

use futures::stream::BoxStream;
use serde_json::Value;

use super::arena::AgentArena;
use super::builder::AgentGraphBuilder;
use super::response::{select_response_messages, AgentChunk, AgentResponse};
use crate::config::{AgentConfig, AgentSettings};
use crate::error::Result;
use crate::graph::CompiledGraph;
use crate::provider::LlmFactory;
use crate::tools::ToolFactory;
use crate::types::{ConversationState, Message, Role};

/// A deployable agent: one compiled graph driven once per turn.
#[derive(Debug, Clone)]
pub struct Agent {
    name: String,
    graph: Arc<CompiledGraph>,
    settings: AgentSettings,
}

impl Agent {
    /// Wrap an already compiled graph.
    pub fn new(graph: Arc<CompiledGraph>) -> Self {
        Self {
            name: graph.name().to_string(),
            graph,
            settings: AgentSettings::default(),
        }
    }

    /// Build the agent described by `config`.
    ///
    /// Settings are read from the environment; override them with
    /// [`with_settings`](Self::with_settings).
    pub fn from_config(
        config: &AgentConfig,
        llms: Arc<dyn LlmFactory>,
        tools: Arc<dyn ToolFactory>,
    ) -> Result<Self> {
        let arena = AgentArena::from_config(config)?;
        let graph = AgentGraphBuilder::new(llms, tools).build(&arena)?;
        tracing::debug!(agent = %config.name, agents = arena.len(), "agent ready");
        Ok(Self::new(graph).with_settings(AgentSettings::from_env()))
    }

    pub fn with_settings(mut self, settings: AgentSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn graph(&self) -> &CompiledGraph {
        &self.graph
    }

    pub fn settings(&self) -> &AgentSettings {
        &self.settings
    }

    /// Trim history to the window, drop tool results, and assign missing ids.
    pub fn prepare_input(&self, messages: Vec<Message>) -> Vec<Message> {
        let skip = messages.len().saturating_sub(self.settings.max_history);
        messages
            .into_iter()
            .skip(skip)
            .filter(|m| m.role != Role::Tool)
            .map(|mut m| {
                m.ensure_id();
                m
            })
            .collect()
    }

    async fn run_turn(&self, messages: Vec<Message>) -> Result<ConversationState> {
        let input = self.prepare_input(messages);
        tracing::debug!(agent = %self.name, messages = input.len(), "starting turn");
        self.graph.invoke(ConversationState::new(input)).await
    }

    /// Run one turn and return the selected reply.
    pub async fn predict(&self, messages: Vec<Message>) -> Result<AgentResponse> {
        let state = self.run_turn(messages).await?;
        let messages = state.messages.into_iter().map(Message::with_fresh_id).collect();
        Ok(AgentResponse {
            messages: select_response_messages(messages),
            custom_outputs: state.custom_outputs,
        })
    }

    /// [`predict`](Self::predict) for mapping-shaped messages.
    pub async fn predict_values(&self, values: Vec<Value>) -> Result<AgentResponse> {
        let messages = values
            .into_iter()
            .map(Message::from_value)
            .collect::<Result<Vec<_>>>()?;
        self.predict(messages).await
    }

    /// Run one turn and stream every resulting message, unselected.
    pub fn predict_stream(&self, messages: Vec<Message>) -> BoxStream<'static, Result<AgentChunk>> {
        let agent = self.clone();
        let stream = async_stream::stream! {
            match agent.run_turn(messages).await {
                Ok(state) => {
                    for message in state.messages {
                        yield Ok(AgentChunk { delta: message.with_fresh_id() });
                    }
                }
                Err(err) => yield Err(err),
            }
        };
        Box::pin(stream)
    }
}
