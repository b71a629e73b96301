//! Error classification and recovery hints.

use serde::{Deserialize, Serialize};

/// Broad error category, used by callers to decide how a failed turn is reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    Configuration,
    Graph,
    Model,
    ToolExecution,
    MessageFormat,
    Serialization,
    Io,
}

/// Suggested recovery action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecoverySuggestion {
    CheckConfiguration,
    CheckModelEndpoint,
    CheckToolImplementation,
    CheckMessageShape,
    ContactSupport,
}
