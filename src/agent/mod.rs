//! Agents: configuration arena, graph building, routing and turn orchestration.

pub mod agent;
pub mod arena;
pub mod builder;
pub mod response;
pub mod routing;

pub use agent::Agent;
pub use arena::{AgentArena, AgentDefinition, AgentRole};
pub use builder::{AgentGraphBuilder, SUMMARY_NODE_SUFFIX, TOOLS_NODE_SUFFIX};
pub use response::{select_response_messages, AgentChunk, AgentResponse};
pub use routing::{match_decision, KeywordRouter, ToolCallRouter, CALL_TOOLS};
