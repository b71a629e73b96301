//! Name-indexed tool collection and the factory seam used by graph building.

use std::collections::HashMap;
use std::sync::Arc;

use super::tool::Tool;
use crate::config::ToolConfig;
use crate::error::Result;

/// Creates tool instances for tool configurations.
pub trait ToolFactory: Send + Sync {
    /// Return the tool for `config`, or `None` when it cannot be provided.
    fn create(&self, config: &ToolConfig) -> Result<Option<Arc<dyn Tool>>>;
}

/// Tools available to a tool agent, in binding order.
#[derive(Clone, Default)]
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
    by_name: HashMap<String, usize>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a tool. A tool with the same name replaces the earlier one.
    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        let name = tool.name().to_string();
        match self.by_name.get(&name) {
            Some(&idx) => self.tools[idx] = tool,
            None => {
                self.by_name.insert(name, self.tools.len());
                self.tools.push(tool);
            }
        }
    }

    /// Builder form of [`register`](Self::register).
    pub fn with_tool(mut self, tool: Arc<dyn Tool>) -> Self {
        self.register(tool);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.by_name.get(name).map(|&idx| &self.tools[idx])
    }

    pub fn tools(&self) -> &[Arc<dyn Tool>] {
        &self.tools
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.tools.iter().map(|t| t.name()))
            .finish()
    }
}

impl FromIterator<Arc<dyn Tool>> for ToolRegistry {
    fn from_iter<I: IntoIterator<Item = Arc<dyn Tool>>>(iter: I) -> Self {
        let mut registry = Self::new();
        for tool in iter {
            registry.register(tool);
        }
        registry
    }
}

/// A registry acts as a factory by resolving configured tools by name.
impl ToolFactory for ToolRegistry {
    fn create(&self, config: &ToolConfig) -> Result<Option<Arc<dyn Tool>>> {
        Ok(self.get(&config.name).cloned())
    }
}
