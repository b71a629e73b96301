//! Flattened, validated index of every agent in a configuration tree.
//!
//! Supervisors refer to their children by name, whether the child was
//! defined inline or referenced. Validation runs once, here, so graph
//! building can walk the arena without re-checking anything.

use std::collections::{HashMap, HashSet};

use crate::config::{AgentConfig, AgentKind, DecisionOption, LlmConfig, SubAgentEntry, ToolConfig};
use crate::error::{Result, SwitchyardError};

/// Type-specific part of an arena entry.
#[derive(Debug, Clone, PartialEq)]
pub enum AgentRole {
    Supervisor {
        decision_options: Vec<DecisionOption>,
        /// Child agent names, in configuration order.
        sub_agents: Vec<String>,
    },
    Tool {
        tools: Vec<ToolConfig>,
        summary_llm: LlmConfig,
    },
}

/// One agent definition with its children resolved to names.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentDefinition {
    pub name: String,
    pub llm: LlmConfig,
    pub role: AgentRole,
}

impl AgentDefinition {
    pub fn is_supervisor(&self) -> bool {
        matches!(self.role, AgentRole::Supervisor { .. })
    }

    /// Names of direct children; empty for tool agents.
    pub fn children(&self) -> &[String] {
        match &self.role {
            AgentRole::Supervisor { sub_agents, .. } => sub_agents,
            AgentRole::Tool { .. } => &[],
        }
    }
}

/// All agent definitions of one configuration, indexed by name.
#[derive(Debug, Clone)]
pub struct AgentArena {
    root: String,
    order: Vec<String>,
    agents: HashMap<String, AgentDefinition>,
}

impl AgentArena {
    /// Flatten and validate the tree rooted at `root`.
    pub fn from_config(root: &AgentConfig) -> Result<Self> {
        let mut arena = Self {
            root: root.name.clone(),
            order: Vec::new(),
            agents: HashMap::new(),
        };
        arena.insert(root)?;
        arena.check_references()?;
        arena.check_cycles()?;
        Ok(arena)
    }

    fn insert(&mut self, config: &AgentConfig) -> Result<()> {
        if config.name.trim().is_empty() {
            return Err(SwitchyardError::Configuration(
                "agent name must not be empty".into(),
            ));
        }
        if self.agents.contains_key(&config.name) {
            return Err(SwitchyardError::Configuration(format!(
                "agent '{}' is defined more than once",
                config.name
            )));
        }

        let role = match &config.kind {
            AgentKind::Supervisor {
                decision_options,
                sub_agents,
            } => AgentRole::Supervisor {
                decision_options: decision_options.clone(),
                sub_agents: sub_agents
                    .iter()
                    .map(|entry| entry.agent_name().to_string())
                    .collect(),
            },
            AgentKind::Tool { tools, summary_llm } => {
                let summary_llm = summary_llm.as_ref().ok_or_else(|| {
                    SwitchyardError::Configuration(format!(
                        "tool agent '{}' has no summary_llm",
                        config.name
                    ))
                })?;
                AgentRole::Tool {
                    tools: tools.clone(),
                    summary_llm: summary_llm.llm.clone(),
                }
            }
        };

        self.order.push(config.name.clone());
        self.agents.insert(
            config.name.clone(),
            AgentDefinition {
                name: config.name.clone(),
                llm: config.tool_llm.llm.clone(),
                role,
            },
        );

        if let AgentKind::Supervisor { sub_agents, .. } = &config.kind {
            for entry in sub_agents {
                if let SubAgentEntry::Inline(child) = entry {
                    self.insert(child)?;
                }
            }
        }
        Ok(())
    }

    fn check_references(&self) -> Result<()> {
        for definition in self.definitions() {
            let AgentRole::Supervisor {
                decision_options,
                sub_agents,
            } = &definition.role
            else {
                continue;
            };
            if let Some(missing) = sub_agents.iter().find(|name| !self.agents.contains_key(*name)) {
                return Err(SwitchyardError::Configuration(format!(
                    "supervisor '{}' refers to unknown agent '{missing}'",
                    definition.name
                )));
            }
            if let Some(option) = decision_options
                .iter()
                .find(|option| !sub_agents.contains(&option.agent))
            {
                return Err(SwitchyardError::Configuration(format!(
                    "decision option '{}' of supervisor '{}' names '{}', which is not one of its sub-agents",
                    option.keyword, definition.name, option.agent
                )));
            }
            for child in sub_agents {
                if !decision_options.iter().any(|option| option.agent == *child) {
                    tracing::warn!(
                        supervisor = %definition.name,
                        agent = %child,
                        "sub-agent has no decision option and can never be reached"
                    );
                }
            }
        }
        Ok(())
    }

    fn check_cycles(&self) -> Result<()> {
        fn visit<'a>(
            arena: &'a AgentArena,
            name: &'a str,
            path: &mut Vec<&'a str>,
            done: &mut HashSet<&'a str>,
        ) -> Result<()> {
            if done.contains(name) {
                return Ok(());
            }
            if let Some(start) = path.iter().position(|entry| *entry == name) {
                let mut cycle = path[start..].to_vec();
                cycle.push(name);
                return Err(SwitchyardError::Configuration(format!(
                    "agent references form a cycle: {}",
                    cycle.join(" -> ")
                )));
            }
            path.push(name);
            if let Some(definition) = arena.agents.get(name) {
                for child in definition.children() {
                    visit(arena, child, path, done)?;
                }
            }
            path.pop();
            done.insert(name);
            Ok(())
        }

        let mut done = HashSet::new();
        for name in &self.order {
            visit(self, name, &mut Vec::new(), &mut done)?;
        }
        Ok(())
    }

    pub fn root(&self) -> &AgentDefinition {
        &self.agents[&self.root]
    }

    pub fn get(&self, name: &str) -> Option<&AgentDefinition> {
        self.agents.get(name)
    }

    /// Definitions in depth-first configuration order, root first.
    pub fn definitions(&self) -> impl Iterator<Item = &AgentDefinition> {
        self.order.iter().filter_map(|name| self.agents.get(name))
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }
}
