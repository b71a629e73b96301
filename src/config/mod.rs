//! Agent configuration tree and runtime settings.
//!
//! A configuration file describes one root agent. Supervisor agents carry
//! keyword decision options and a list of sub-agents; tool agents carry a
//! tool-calling LLM, the tools bound to it, and a summary LLM. Files may be
//! YAML, JSON or TOML, selected by extension.

pub mod settings;

pub use settings::{AgentSettings, DEFAULT_MAX_HISTORY, MAX_HISTORY_ENV};

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SwitchyardError};
use crate::types::{GenerationSettings, Message};

/// Tool type created by the default tool factory.
pub const RETRIEVER_TOOL_TYPE: &str = "retriever";

/// Settings for one model endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LlmConfig {
    pub endpoint_name: String,
    pub max_tokens: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(default)]
    pub system_prompt: String,
}

impl LlmConfig {
    pub fn generation_settings(&self) -> GenerationSettings {
        GenerationSettings::builder()
            .max_tokens(self.max_tokens)
            .maybe_temperature(self.temperature)
            .build()
    }
}

/// The `llm:` nesting level used by `tool_llm` and `summary_llm`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LlmSection {
    pub llm: LlmConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EmbeddingConfig {
    pub source_table: String,
    pub source_column: String,
    pub source_primary_key: String,
    pub vector_search_endpoint: String,
    pub endpoint_name: String,
    pub vs_index: String,
    pub columns_to_sync: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RetrievalConfig {
    pub retrieved_chunks: u32,
    pub similarity_search_query_type: String,
}

/// A tool bound to a tool agent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolConfig {
    #[serde(rename = "type")]
    pub kind: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedding: Option<EmbeddingConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retrieval: Option<RetrievalConfig>,
}

/// Supervisor routing rule: a keyword found in the supervisor's reply
/// dispatches the turn to `agent`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DecisionOption {
    pub keyword: String,
    pub agent: String,
}

impl DecisionOption {
    pub fn new(keyword: impl Into<String>, agent: impl Into<String>) -> Self {
        Self {
            keyword: keyword.into(),
            agent: agent.into(),
        }
    }
}

/// A sub-agent entry: an inline definition, or the name of an agent defined
/// elsewhere in the tree.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum SubAgentEntry {
    Reference(String),
    Inline(Box<AgentConfig>),
}

impl SubAgentEntry {
    /// Name of the agent this entry points at.
    pub fn agent_name(&self) -> &str {
        match self {
            Self::Reference(name) => name,
            Self::Inline(config) => &config.name,
        }
    }
}

/// Type-specific part of an agent definition, tagged by `agent_type`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "agent_type", rename_all = "snake_case")]
pub enum AgentKind {
    Supervisor {
        #[serde(default)]
        decision_options: Vec<DecisionOption>,
        #[serde(default)]
        sub_agents: Vec<SubAgentEntry>,
    },
    Tool {
        #[serde(default)]
        tools: Vec<ToolConfig>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        summary_llm: Option<LlmSection>,
    },
}

/// One agent definition.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AgentConfig {
    pub name: String,
    pub tool_llm: LlmSection,
    #[serde(flatten)]
    pub kind: AgentKind,
}

impl AgentConfig {
    pub fn supervisor(
        name: impl Into<String>,
        llm: LlmConfig,
        decision_options: Vec<DecisionOption>,
        sub_agents: Vec<SubAgentEntry>,
    ) -> Self {
        Self {
            name: name.into(),
            tool_llm: LlmSection { llm },
            kind: AgentKind::Supervisor {
                decision_options,
                sub_agents,
            },
        }
    }

    pub fn tool_agent(
        name: impl Into<String>,
        llm: LlmConfig,
        tools: Vec<ToolConfig>,
        summary_llm: LlmConfig,
    ) -> Self {
        Self {
            name: name.into(),
            tool_llm: LlmSection { llm },
            kind: AgentKind::Tool {
                tools,
                summary_llm: Some(LlmSection { llm: summary_llm }),
            },
        }
    }

    pub fn agent_type(&self) -> &'static str {
        match self.kind {
            AgentKind::Supervisor { .. } => "supervisor",
            AgentKind::Tool { .. } => "tool",
        }
    }

    pub fn from_yaml_str(text: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(text)?)
    }
}

/// Example request/response pair shipped alongside a deployed agent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExampleMessages {
    pub messages: Vec<Message>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExampleConfig {
    pub input_example: ExampleMessages,
    pub output_example: ExampleMessages,
}

/// Top-level configuration document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModelConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example_messages: Option<ExampleConfig>,
    pub agent: AgentConfig,
}

impl ModelConfig {
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(text)?)
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Load a configuration file, choosing the format from its extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);
        match extension.as_deref() {
            Some("yaml") | Some("yml") => Self::from_yaml_str(&text),
            Some("json") => Self::from_json_str(&text),
            Some("toml") => Self::from_toml_str(&text),
            _ => Err(SwitchyardError::Configuration(format!(
                "unsupported configuration format: {}",
                path.display()
            ))),
        }
    }
}
