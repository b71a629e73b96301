//! Directed state graphs executed once per turn.
//!
//! A [`StateGraph`] is assembled from named nodes, fixed edges and
//! conditional edges, then validated by [`StateGraph::compile`]. Executing a
//! [`CompiledGraph`] starts at the entry node, applies each node's
//! [`StateUpdate`] to the shared [`ConversationState`], and follows edges
//! until one resolves to [`END`]. Compilation rejects cycles, so every
//! execution terminates.

pub mod llm_node;
pub mod subgraph;
pub mod tool_node;

pub use llm_node::{LlmNode, PromptPlacement};
pub use subgraph::SubgraphNode;
pub use tool_node::{RetryPhase, ToolExecutionNode};

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::{Result, SwitchyardError};
use crate::types::{ConversationState, StateUpdate};

/// Distinguished destination that terminates execution.
pub const END: &str = "__end__";

/// A unit of work in a graph.
#[async_trait]
pub trait GraphNode: Send + Sync {
    /// Run against the current state and return what to append.
    async fn run(&self, state: &ConversationState) -> Result<StateUpdate>;
}

/// Decision function attached to a conditional edge.
pub trait Router: Send + Sync {
    /// Return the decision label for `state`.
    fn route(&self, state: &ConversationState) -> String;
}

/// Where control goes after a node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EdgeTarget {
    Fixed(String),
    /// Decision label → destination, in insertion order.
    Conditional(Vec<(String, String)>),
}

impl EdgeTarget {
    fn destinations(&self) -> Vec<&str> {
        match self {
            Self::Fixed(to) => vec![to.as_str()],
            Self::Conditional(options) => options.iter().map(|(_, to)| to.as_str()).collect(),
        }
    }
}

enum Edge {
    Fixed(String),
    Conditional {
        router: Arc<dyn Router>,
        destinations: Vec<(String, String)>,
    },
}

impl Edge {
    fn target(&self) -> EdgeTarget {
        match self {
            Self::Fixed(to) => EdgeTarget::Fixed(to.clone()),
            Self::Conditional { destinations, .. } => EdgeTarget::Conditional(destinations.clone()),
        }
    }
}

/// Mutable graph under construction.
pub struct StateGraph {
    name: String,
    entry: Option<String>,
    order: Vec<String>,
    nodes: HashMap<String, Arc<dyn GraphNode>>,
    edges: HashMap<String, Edge>,
    problems: Vec<String>,
}

impl StateGraph {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entry: None,
            order: Vec::new(),
            nodes: HashMap::new(),
            edges: HashMap::new(),
            problems: Vec::new(),
        }
    }

    pub fn add_node(&mut self, name: impl Into<String>, node: Arc<dyn GraphNode>) -> &mut Self {
        let name = name.into();
        if name == END {
            self.problems.push(format!("'{END}' is reserved and cannot name a node"));
        } else if self.nodes.insert(name.clone(), node).is_some() {
            self.problems.push(format!("duplicate node '{name}'"));
        } else {
            self.order.push(name);
        }
        self
    }

    pub fn set_entry_point(&mut self, name: impl Into<String>) -> &mut Self {
        self.entry = Some(name.into());
        self
    }

    pub fn add_edge(&mut self, from: impl Into<String>, to: impl Into<String>) -> &mut Self {
        self.insert_edge(from.into(), Edge::Fixed(to.into()));
        self
    }

    pub fn add_conditional_edges<L, D>(
        &mut self,
        from: impl Into<String>,
        router: Arc<dyn Router>,
        destinations: impl IntoIterator<Item = (L, D)>,
    ) -> &mut Self
    where
        L: Into<String>,
        D: Into<String>,
    {
        let destinations = destinations
            .into_iter()
            .map(|(label, to)| (label.into(), to.into()))
            .collect();
        self.insert_edge(
            from.into(),
            Edge::Conditional {
                router,
                destinations,
            },
        );
        self
    }

    fn insert_edge(&mut self, from: String, edge: Edge) {
        if self.edges.contains_key(&from) {
            self.problems.push(format!("node '{from}' already has an outgoing edge"));
            return;
        }
        self.edges.insert(from, edge);
    }

    /// Validate and freeze the graph.
    pub fn compile(self) -> Result<CompiledGraph> {
        let fail = |detail: String| {
            Err(SwitchyardError::Graph(format!("graph '{}': {detail}", self.name)))
        };

        if let Some(problem) = self.problems.first() {
            return fail(problem.clone());
        }
        let Some(entry) = self.entry.clone() else {
            return fail("no entry point".into());
        };
        if !self.nodes.contains_key(&entry) {
            return fail(format!("entry point '{entry}' is not a node"));
        }

        for name in &self.order {
            let Some(edge) = self.edges.get(name) else {
                return fail(format!("node '{name}' has no outgoing edge"));
            };
            for to in edge.target().destinations() {
                if to != END && !self.nodes.contains_key(to) {
                    return fail(format!("edge '{name}' -> '{to}' targets an unknown node"));
                }
            }
        }
        if let Some(from) = self.edges.keys().find(|from| !self.nodes.contains_key(*from)) {
            return fail(format!("edge source '{from}' is not a node"));
        }
        if let Some(node) = self.find_cycle() {
            return fail(format!("cycle through node '{node}'"));
        }

        Ok(CompiledGraph {
            name: self.name,
            entry,
            order: self.order,
            nodes: self.nodes,
            edges: self.edges,
        })
    }

    fn find_cycle(&self) -> Option<String> {
        fn visit<'a>(
            node: &'a str,
            edges: &'a HashMap<String, Edge>,
            active: &mut HashSet<&'a str>,
            done: &mut HashSet<&'a str>,
        ) -> Option<String> {
            if done.contains(node) {
                return None;
            }
            if !active.insert(node) {
                return Some(node.to_string());
            }
            if let Some(edge) = edges.get(node) {
                let next: Vec<&'a str> = match edge {
                    Edge::Fixed(to) => vec![to.as_str()],
                    Edge::Conditional { destinations, .. } => {
                        destinations.iter().map(|(_, to)| to.as_str()).collect()
                    }
                };
                for to in next.into_iter().filter(|to| *to != END) {
                    if let Some(found) = visit(to, edges, active, done) {
                        return Some(found);
                    }
                }
            }
            active.remove(node);
            done.insert(node);
            None
        }

        let mut active = HashSet::new();
        let mut done = HashSet::new();
        self.order
            .iter()
            .find_map(|name| visit(name, &self.edges, &mut active, &mut done))
    }
}

/// A validated, immutable graph.
pub struct CompiledGraph {
    name: String,
    entry: String,
    order: Vec<String>,
    nodes: HashMap<String, Arc<dyn GraphNode>>,
    edges: HashMap<String, Edge>,
}

impl std::fmt::Debug for CompiledGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompiledGraph")
            .field("name", &self.name)
            .field("entry", &self.entry)
            .field("edges", &self.edges())
            .finish()
    }
}

impl CompiledGraph {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn entry(&self) -> &str {
        &self.entry
    }

    /// Node names in insertion order.
    pub fn node_names(&self) -> &[String] {
        &self.order
    }

    /// Outgoing edge of every node, in node insertion order.
    pub fn edges(&self) -> Vec<(String, EdgeTarget)> {
        self.order
            .iter()
            .filter_map(|name| self.edges.get(name).map(|e| (name.clone(), e.target())))
            .collect()
    }

    /// Run the graph once from the entry node.
    pub async fn invoke(&self, mut state: ConversationState) -> Result<ConversationState> {
        let mut current = self.entry.clone();
        loop {
            let node = self.nodes.get(&current).ok_or_else(|| {
                SwitchyardError::Graph(format!("graph '{}': unknown node '{current}'", self.name))
            })?;
            tracing::debug!(graph = %self.name, node = %current, "running node");
            let update = node.run(&state).await?;
            state.apply(update);

            let next = match self.edges.get(&current) {
                Some(Edge::Fixed(to)) => to.clone(),
                Some(Edge::Conditional {
                    router,
                    destinations,
                }) => {
                    let label = router.route(&state);
                    destinations
                        .iter()
                        .find(|(candidate, _)| *candidate == label)
                        .map(|(_, to)| to.clone())
                        .ok_or_else(|| {
                            SwitchyardError::Graph(format!(
                                "graph '{}': router on '{current}' chose unmapped label '{label}'",
                                self.name
                            ))
                        })?
                }
                None => END.to_string(),
            };
            tracing::debug!(graph = %self.name, from = %current, to = %next, "transition");
            if next == END {
                return Ok(state);
            }
            current = next;
        }
    }
}
