//! Runs a compiled graph as a single node of an enclosing graph.

use std::sync::Arc;

use async_trait::async_trait;

use super::{CompiledGraph, GraphNode};
use crate::error::Result;
use crate::types::{ConversationState, StateUpdate};

/// Node that delegates to a sub-agent's graph.
///
/// The sub-graph sees the enclosing state as its input. Only the messages it
/// adds are handed back, along with its final custom outputs.
#[derive(Debug, Clone)]
pub struct SubgraphNode {
    graph: Arc<CompiledGraph>,
}

impl SubgraphNode {
    pub fn new(graph: Arc<CompiledGraph>) -> Self {
        Self { graph }
    }

    pub fn graph(&self) -> &CompiledGraph {
        &self.graph
    }
}

#[async_trait]
impl GraphNode for SubgraphNode {
    async fn run(&self, state: &ConversationState) -> Result<StateUpdate> {
        let before = state.messages.len();
        tracing::debug!(subgraph = %self.graph.name(), "entering sub-agent");
        let mut finished = self.graph.invoke(state.clone()).await?;
        let messages = finished.messages.split_off(before.min(finished.messages.len()));
        Ok(StateUpdate {
            messages,
            custom_outputs: finished.custom_outputs,
        })
    }
}
