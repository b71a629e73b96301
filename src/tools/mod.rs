//! Tool system: the tool trait, name-indexed registry, and filter extraction.

pub mod arguments;
pub mod filters;
pub mod registry;
pub mod tool;
pub mod types;

pub use arguments::ToolArguments;
pub use filters::{extract_filters, parse_filter_set, FilterPlan, FilterSet, FILTERS_ARGUMENT};
pub use registry::{ToolFactory, ToolRegistry};
pub use tool::{AgentTool, Tool, ToolExecutionContext};
pub use types::AgentToolParameters;
