//! Switchyard: configuration-driven supervisor and tool agents.
//!
//! A configuration tree of agents is compiled into one directed graph per
//! agent. Supervisors route a turn to a sub-agent by keyword; tool agents
//! call a model with retrieval tools bound, execute the requested call
//! (retrying once without filters when nothing comes back), and summarize.
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use switchyard::prelude::*;
//!
//! # async fn example(client: Arc<dyn LlmClient>, tools: ToolRegistry) -> switchyard::error::Result<()> {
//! let config = ModelConfig::from_path("agents.yaml".as_ref())?;
//! let llms = StaticLlmFactory::new().with_client(client);
//! let agent = Agent::from_config(&config.agent, Arc::new(llms), Arc::new(tools))?;
//! let response = agent.predict(vec![Message::user("Where is my invoice?")]).await?;
//! println!("{:?}", response.messages);
//! # Ok(())
//! # }
//! ```

pub mod agent;
pub mod config;
pub mod error;
pub mod graph;
pub mod models;
pub mod normalize;
pub mod prelude;
pub mod provider;
pub mod tools;
pub mod types;

#[cfg(feature = "cli")]
pub mod cli;
