//! Model capabilities descriptor.

use serde::{Deserialize, Serialize};

/// Describes what a model endpoint can do.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModelCapabilities {
    /// Whether tool definitions can be bound to requests.
    pub supports_tools: bool,
    pub context_length: usize,
}

impl Default for ModelCapabilities {
    fn default() -> Self {
        Self {
            supports_tools: false,
            context_length: 4096,
        }
    }
}

impl ModelCapabilities {
    /// Full-featured model capabilities.
    pub fn full(context_length: usize) -> Self {
        Self {
            supports_tools: true,
            context_length,
        }
    }

    /// A chat model that cannot bind tools.
    pub fn text_only(context_length: usize) -> Self {
        Self {
            supports_tools: false,
            context_length,
        }
    }
}
