//! Command-line inspection of agent configurations.
//!
//! Nothing here talks to a model. `check` builds every graph against
//! offline placeholder clients and tools, so it validates the whole
//! configuration tree and prints the resulting topology. `routes` shows
//! where a supervisor would send a given reply.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use clap::{Parser, Subcommand};
use serde_json::Value;

use crate::agent::{match_decision, AgentArena, AgentGraphBuilder, AgentRole};
use crate::config::{LlmConfig, ModelConfig, ToolConfig};
use crate::error::{Result, SwitchyardError};
use crate::graph::{EdgeTarget, END};
use crate::models::ModelCapabilities;
use crate::provider::{LlmClient, LlmFactory, LlmRequest, LlmResponse};
use crate::tools::{
    AgentTool, AgentToolParameters, Tool, ToolArguments, ToolExecutionContext, ToolFactory,
};

/// Switchyard agent configuration tool
#[derive(Parser, Debug)]
#[command(name = "switchyard", version, about = "Inspect switchyard agent configurations")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Validate a configuration and print its agent graphs
    Check(CheckArgs),
    /// Show which sub-agent a supervisor reply dispatches to
    Routes(RoutesArgs),
}

#[derive(Parser, Debug)]
pub struct CheckArgs {
    /// Configuration file (.yaml, .yml, .json or .toml)
    pub config: PathBuf,
}

#[derive(Parser, Debug)]
pub struct RoutesArgs {
    /// Configuration file (.yaml, .yml, .json or .toml)
    pub config: PathBuf,

    /// Supervisor reply to route
    pub reply: String,

    /// Supervisor to ask; defaults to the root agent
    #[arg(short, long)]
    pub agent: Option<String>,
}

/// Run a parsed command and return what to print.
pub fn run(command: &Commands) -> Result<String> {
    match command {
        Commands::Check(args) => check(&args.config),
        Commands::Routes(args) => routes(&args.config, &args.reply, args.agent.as_deref()),
    }
}

/// Validate the configuration at `path` and describe its agents and root graph.
pub fn check(path: &Path) -> Result<String> {
    let config = ModelConfig::from_path(path)?;
    let arena = AgentArena::from_config(&config.agent)?;
    let graph = AgentGraphBuilder::new(Arc::new(OfflineModels), Arc::new(OfflineTools))
        .build(&arena)?;

    let mut out = String::new();
    for definition in arena.definitions() {
        let _ = writeln!(
            out,
            "{} ({}, endpoint {})",
            definition.name,
            if definition.is_supervisor() { "supervisor" } else { "tool" },
            definition.llm.endpoint_name
        );
        match &definition.role {
            AgentRole::Supervisor {
                decision_options, ..
            } => {
                for option in decision_options {
                    let _ = writeln!(out, "  \"{}\" -> {}", option.keyword, option.agent);
                }
            }
            AgentRole::Tool { tools, summary_llm } => {
                for tool in tools {
                    let _ = writeln!(out, "  tool {} ({})", tool.name, tool.kind);
                }
                let _ = writeln!(out, "  summary endpoint {}", summary_llm.endpoint_name);
            }
        }
    }

    let _ = writeln!(out, "graph {} (entry {})", graph.name(), graph.entry());
    for (from, target) in graph.edges() {
        match target {
            EdgeTarget::Fixed(to) => {
                let _ = writeln!(out, "  {from} -> {}", display_node(&to));
            }
            EdgeTarget::Conditional(options) => {
                for (label, to) in options {
                    let _ = writeln!(out, "  {from} -[{}]-> {}", display_node(&label), display_node(&to));
                }
            }
        }
    }
    Ok(out)
}

/// Describe where `agent` (default: the root) would route `reply`.
pub fn routes(path: &Path, reply: &str, agent: Option<&str>) -> Result<String> {
    let config = ModelConfig::from_path(path)?;
    let arena = AgentArena::from_config(&config.agent)?;
    let definition = match agent {
        Some(name) => arena.get(name).ok_or_else(|| {
            SwitchyardError::Configuration(format!("no agent named '{name}'"))
        })?,
        None => arena.root(),
    };
    let AgentRole::Supervisor {
        decision_options, ..
    } = &definition.role
    else {
        return Err(SwitchyardError::Configuration(format!(
            "'{}' is a tool agent and does not route",
            definition.name
        )));
    };
    let target = match_decision(decision_options, reply).unwrap_or("END");
    Ok(format!("{} -> {target}\n", definition.name))
}

fn display_node(name: &str) -> &str {
    if name == END {
        "END"
    } else {
        name
    }
}

/// Model client used when no real endpoint is available.
struct OfflineClient {
    endpoint: String,
    capabilities: ModelCapabilities,
}

#[async_trait]
impl LlmClient for OfflineClient {
    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn capabilities(&self) -> &ModelCapabilities {
        &self.capabilities
    }

    async fn invoke(&self, _request: &LlmRequest) -> Result<LlmResponse> {
        Err(SwitchyardError::llm(&self.endpoint, "offline client cannot be invoked"))
    }
}

struct OfflineModels;

impl LlmFactory for OfflineModels {
    fn create(&self, config: &LlmConfig) -> Result<Arc<dyn LlmClient>> {
        Ok(Arc::new(OfflineClient {
            endpoint: config.endpoint_name.clone(),
            capabilities: ModelCapabilities::full(0),
        }))
    }
}

struct OfflineTools;

impl ToolFactory for OfflineTools {
    fn create(&self, config: &ToolConfig) -> Result<Option<Arc<dyn Tool>>> {
        let name = config.name.clone();
        let tool = AgentTool::new(
            config.name.clone(),
            config.description.clone(),
            AgentToolParameters::retriever(),
            move |_args: ToolArguments, _ctx: ToolExecutionContext| {
                let name = name.clone();
                async move {
                    Err::<Value, _>(SwitchyardError::tool(name, "offline tool cannot be executed"))
                }
            },
        )
        .with_filters();
        Ok(Some(Arc::new(tool)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const CONFIG: &str = r#"
agent:
  name: front_desk
  agent_type: supervisor
  tool_llm:
    llm:
      endpoint_name: router-model
      max_tokens: 200
      system_prompt: Answer with billing or tech.
  decision_options:
    - keyword: billing
      agent: billing_agent
  sub_agents:
    - name: billing_agent
      agent_type: tool
      tool_llm:
        llm:
          endpoint_name: tool-model
          max_tokens: 500
          system_prompt: Look up invoices.
      tools:
        - type: retriever
          name: invoices
          description: Invoice search
      summary_llm:
        llm:
          endpoint_name: summary-model
          max_tokens: 300
          system_prompt: Summarize.
"#;

    fn config_file() -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        file.write_all(CONFIG.as_bytes()).unwrap();
        file
    }

    #[test]
    fn parse_check() {
        let cli = Cli::try_parse_from(["switchyard", "check", "agents.yaml"]).unwrap();
        match cli.command {
            Commands::Check(args) => assert_eq!(args.config, PathBuf::from("agents.yaml")),
            other => panic!("expected Check, got {other:?}"),
        }
    }

    #[test]
    fn parse_routes_with_agent() {
        let cli = Cli::try_parse_from([
            "switchyard",
            "routes",
            "agents.yaml",
            "a billing issue",
            "--agent",
            "front_desk",
        ])
        .unwrap();
        match cli.command {
            Commands::Routes(args) => {
                assert_eq!(args.reply, "a billing issue");
                assert_eq!(args.agent.as_deref(), Some("front_desk"));
            }
            other => panic!("expected Routes, got {other:?}"),
        }
    }

    #[test]
    fn parse_missing_subcommand_is_error() {
        assert!(Cli::try_parse_from(["switchyard"]).is_err());
    }

    #[test]
    fn check_prints_agents_and_edges() {
        let file = config_file();
        let out = check(file.path()).unwrap();
        assert!(out.contains("front_desk (supervisor, endpoint router-model)"), "{out}");
        assert!(out.contains("tool invoices (retriever)"), "{out}");
        assert!(out.contains("front_desk -[billing_agent]-> billing_agent"), "{out}");
        assert!(out.contains("front_desk -[END]-> END"), "{out}");
        assert!(out.contains("billing_agent -> END"), "{out}");
    }

    #[test]
    fn routes_uses_keyword_matching() {
        let file = config_file();
        assert_eq!(
            routes(file.path(), "This is a BILLING matter", None).unwrap(),
            "front_desk -> billing_agent\n"
        );
        assert_eq!(
            routes(file.path(), "no idea", None).unwrap(),
            "front_desk -> END\n"
        );
        assert!(routes(file.path(), "x", Some("billing_agent")).is_err());
    }
}
