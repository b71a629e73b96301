//! Convenience re-exports for common use.

pub use crate::agent::{Agent, AgentChunk, AgentResponse};
pub use crate::config::{AgentConfig, AgentSettings, ModelConfig};
pub use crate::error::{Result, SwitchyardError};
pub use crate::models::ModelCapabilities;
pub use crate::provider::{LlmClient, LlmFactory, LlmRequest, LlmResponse, StaticLlmFactory};
pub use crate::tools::{
    AgentTool, AgentToolParameters, Tool, ToolArguments, ToolExecutionContext, ToolFactory,
    ToolRegistry,
};
pub use crate::types::{ConversationState, GenerationSettings, Message, MessageContent, Role, ToolCall};
