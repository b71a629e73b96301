//! Per-turn conversation state threaded through a graph.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::message::Message;

/// Ordered messages for one turn plus the turn's out-of-band output.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ConversationState {
    pub messages: Vec<Message>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_outputs: Option<Value>,
}

impl ConversationState {
    pub fn new(messages: Vec<Message>) -> Self {
        Self {
            messages,
            custom_outputs: None,
        }
    }

    pub fn last_message(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// Append an update's messages; replace `custom_outputs` when the update carries one.
    pub fn apply(&mut self, update: StateUpdate) {
        self.messages.extend(update.messages);
        if update.custom_outputs.is_some() {
            self.custom_outputs = update.custom_outputs;
        }
    }
}

/// The delta a single graph node contributes to the state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StateUpdate {
    pub messages: Vec<Message>,
    pub custom_outputs: Option<Value>,
}

impl StateUpdate {
    pub fn messages(messages: Vec<Message>) -> Self {
        Self {
            messages,
            custom_outputs: None,
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }
}
