//! Turn results and response selection.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::{Message, Role};

/// Final reply of one turn.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AgentResponse {
    pub messages: Vec<Message>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_outputs: Option<Value>,
}

/// One streamed message.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AgentChunk {
    pub delta: Message,
}

/// Keep the most recent tool message and the most recent assistant message,
/// in chronological order.
///
/// ```text
/// [A1, T1, A2, T2] => [A2, T2]
/// ```
pub fn select_response_messages(messages: Vec<Message>) -> Vec<Message> {
    let mut selected = Vec::with_capacity(2);
    let mut tool_found = false;
    let mut assistant_found = false;
    for message in messages.into_iter().rev() {
        match message.role {
            Role::Tool if !tool_found => {
                tool_found = true;
                selected.push(message);
            }
            Role::Assistant if !assistant_found => {
                assistant_found = true;
                selected.push(message);
            }
            _ => {}
        }
        if tool_found && assistant_found {
            break;
        }
    }
    selected.reverse();
    selected
}
