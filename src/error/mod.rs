//! Error types for switchyard.

pub mod unified;

pub use unified::{ErrorCategory, RecoverySuggestion};

use thiserror::Error;

/// Primary error type for every graph construction and turn operation.
///
/// Parse-level irregularities (malformed tool arguments, non-JSON tool
/// content) never surface here; they degrade to empty mappings or opaque
/// text at the call site.
#[derive(Error, Debug)]
pub enum SwitchyardError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Graph error: {0}")]
    Graph(String),

    #[error("Model error ({endpoint}): {message}")]
    Llm { endpoint: String, message: String },

    #[error("Tool execution error: {tool_name}: {message}")]
    ToolExecution { tool_name: String, message: String },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Message format error: {0}")]
    MessageFormat(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl SwitchyardError {
    /// Create a model invocation error.
    pub fn llm(endpoint: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Llm {
            endpoint: endpoint.into(),
            message: message.into(),
        }
    }

    /// Create a tool execution error.
    pub fn tool(tool_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ToolExecution {
            tool_name: tool_name.into(),
            message: message.into(),
        }
    }

    /// Classify this error into a category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Configuration(_) | Self::Yaml(_) | Self::Toml(_) => ErrorCategory::Configuration,
            Self::Graph(_) => ErrorCategory::Graph,
            Self::Llm { .. } => ErrorCategory::Model,
            Self::ToolExecution { .. } | Self::InvalidArgument(_) => ErrorCategory::ToolExecution,
            Self::MessageFormat(_) => ErrorCategory::MessageFormat,
            Self::Serialization(_) => ErrorCategory::Serialization,
            Self::Io(_) => ErrorCategory::Io,
        }
    }

    /// Whether the error was raised while building graphs rather than running a turn.
    pub fn is_construction_error(&self) -> bool {
        matches!(
            self.category(),
            ErrorCategory::Configuration | ErrorCategory::Graph
        )
    }

    /// Suggest recovery actions.
    pub fn recovery_suggestion(&self) -> RecoverySuggestion {
        match self.category() {
            ErrorCategory::Configuration | ErrorCategory::Graph => {
                RecoverySuggestion::CheckConfiguration
            }
            ErrorCategory::Model => RecoverySuggestion::CheckModelEndpoint,
            ErrorCategory::ToolExecution => RecoverySuggestion::CheckToolImplementation,
            ErrorCategory::MessageFormat => RecoverySuggestion::CheckMessageShape,
            _ => RecoverySuggestion::ContactSupport,
        }
    }
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, SwitchyardError>;
