//! Compiles agent definitions into executable graphs.
//!
//! Supervisor graph:
//!
//! ```text
//! <name> --(keyword in reply)--> <sub_agent> --> END
//!        \--(no keyword)------> END
//! ```
//!
//! Tool-agent graph:
//!
//! ```text
//! <name> --(tool calls)--> <name>_tools --> <name>_summary_agent --> END
//!        \--(no calls)---> END
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use super::arena::{AgentArena, AgentDefinition, AgentRole};
use super::routing::{KeywordRouter, ToolCallRouter, CALL_TOOLS};
use crate::config::{LlmConfig, ToolConfig, RETRIEVER_TOOL_TYPE};
use crate::error::{Result, SwitchyardError};
use crate::graph::{
    CompiledGraph, LlmNode, PromptPlacement, StateGraph, SubgraphNode, ToolExecutionNode, END,
};
use crate::provider::LlmFactory;
use crate::tools::{ToolFactory, ToolRegistry};

/// Suffix of a tool agent's tool execution node.
pub const TOOLS_NODE_SUFFIX: &str = "_tools";
/// Suffix of a tool agent's summary node.
pub const SUMMARY_NODE_SUFFIX: &str = "_summary_agent";

/// Tool calls a tool agent executes per model reply.
const TOOL_CALLS_PER_TURN: usize = 1;

/// Builds one compiled graph per agent, resolving models and tools through
/// the supplied factories.
#[derive(Clone)]
pub struct AgentGraphBuilder {
    llms: Arc<dyn LlmFactory>,
    tools: Arc<dyn ToolFactory>,
}

impl std::fmt::Debug for AgentGraphBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentGraphBuilder").finish_non_exhaustive()
    }
}

impl AgentGraphBuilder {
    pub fn new(llms: Arc<dyn LlmFactory>, tools: Arc<dyn ToolFactory>) -> Self {
        Self { llms, tools }
    }

    /// Build the root agent's graph, and every graph it depends on.
    pub fn build(&self, arena: &AgentArena) -> Result<Arc<CompiledGraph>> {
        let mut built = HashMap::new();
        self.build_agent(arena, arena.root(), &mut built)
    }

    fn build_agent(
        &self,
        arena: &AgentArena,
        definition: &AgentDefinition,
        built: &mut HashMap<String, Arc<CompiledGraph>>,
    ) -> Result<Arc<CompiledGraph>> {
        if let Some(graph) = built.get(&definition.name) {
            return Ok(graph.clone());
        }
        let graph = match &definition.role {
            AgentRole::Supervisor {
                decision_options, ..
            } => {
                let router = KeywordRouter::new(&definition.name, decision_options.clone());
                let mut children = Vec::new();
                for (agent, _) in router.labels() {
                    if agent == END {
                        continue;
                    }
                    let child = arena.get(&agent).ok_or_else(|| {
                        SwitchyardError::Configuration(format!("unknown agent '{agent}'"))
                    })?;
                    children.push((agent, self.build_agent(arena, child, built)?));
                }
                self.supervisor_graph(definition, router, children)?
            }
            AgentRole::Tool { tools, summary_llm } => {
                self.tool_agent_graph(definition, tools, summary_llm)?
            }
        };
        let graph = Arc::new(graph);
        built.insert(definition.name.clone(), graph.clone());
        Ok(graph)
    }

    fn supervisor_graph(
        &self,
        definition: &AgentDefinition,
        router: KeywordRouter,
        children: Vec<(String, Arc<CompiledGraph>)>,
    ) -> Result<CompiledGraph> {
        let name = &definition.name;
        let llm = self.llms.create(&definition.llm)?;
        let entry = LlmNode::new(name.clone(), llm, &definition.llm.system_prompt)
            .with_placement(PromptPlacement::Prepend)
            .with_settings(definition.llm.generation_settings());

        let mut graph = StateGraph::new(name.clone());
        graph.add_node(name.clone(), Arc::new(entry));
        graph.set_entry_point(name.clone());
        let labels = router.labels();
        graph.add_conditional_edges(name.clone(), Arc::new(router), labels);
        for (agent, child) in children {
            graph.add_node(agent.clone(), Arc::new(SubgraphNode::new(child)));
            graph.add_edge(agent, END);
        }
        tracing::debug!(agent = %name, "compiled supervisor graph");
        graph.compile()
    }

    fn tool_agent_graph(
        &self,
        definition: &AgentDefinition,
        tool_configs: &[ToolConfig],
        summary: &LlmConfig,
    ) -> Result<CompiledGraph> {
        let name = &definition.name;
        let llm = self.llms.create(&definition.llm)?;
        if !tool_configs.is_empty() && !llm.capabilities().supports_tools {
            return Err(SwitchyardError::Configuration(format!(
                "model endpoint '{}' of agent '{name}' does not support tool calling",
                definition.llm.endpoint_name
            )));
        }
        let registry = self.resolve_tools(name, tool_configs)?;
        let definitions = registry.tools().iter().map(|t| t.definition()).collect();

        let tools_node = format!("{name}{TOOLS_NODE_SUFFIX}");
        let summary_node = format!("{name}{SUMMARY_NODE_SUFFIX}");

        let entry = LlmNode::new(name.clone(), llm, &definition.llm.system_prompt)
            .with_placement(PromptPlacement::Append)
            .with_settings(definition.llm.generation_settings())
            .with_tools(definitions)
            .with_tool_call_limit(TOOL_CALLS_PER_TURN);
        let summarizer = LlmNode::new(
            summary_node.clone(),
            self.llms.create(summary)?,
            &summary.system_prompt,
        )
        .with_placement(PromptPlacement::Append)
        .with_settings(summary.generation_settings());

        let mut graph = StateGraph::new(name.clone());
        graph
            .add_node(name.clone(), Arc::new(entry))
            .add_node(
                tools_node.clone(),
                Arc::new(ToolExecutionNode::new(tools_node.clone(), registry)),
            )
            .add_node(summary_node.clone(), Arc::new(summarizer))
            .set_entry_point(name.clone())
            .add_conditional_edges(
                name.clone(),
                Arc::new(ToolCallRouter),
                [(CALL_TOOLS, tools_node.clone()), (END, END.to_string())],
            )
            .add_edge(tools_node, summary_node.clone())
            .add_edge(summary_node, END);
        tracing::debug!(agent = %name, "compiled tool agent graph");
        graph.compile()
    }

    fn resolve_tools(&self, agent: &str, configs: &[ToolConfig]) -> Result<ToolRegistry> {
        let mut registry = ToolRegistry::new();
        for config in configs {
            if config.kind != RETRIEVER_TOOL_TYPE {
                tracing::warn!(
                    agent,
                    tool = %config.name,
                    kind = %config.kind,
                    "unsupported tool type, skipping"
                );
                continue;
            }
            match self.tools.create(config)? {
                Some(tool) => registry.register(tool),
                None => tracing::warn!(agent, tool = %config.name, "no implementation for tool, skipping"),
            }
        }
        Ok(registry)
    }
}
