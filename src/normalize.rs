//! Normalization of raw tool results into canonical messages.
//!
//! Tool output arrives as text that may or may not be JSON, sometimes wrapped
//! in a `{format, value, truncated}` envelope whose `value` is itself
//! JSON-encoded. Normalization unwraps that, surfaces `attachments` on the
//! message and `custom_outputs` for the turn, and substitutes the empty-result
//! sentinel for an empty sequence.

use serde_json::Value;

use crate::error::Result;
use crate::types::{try_parse, Message, MessageContent, EMPTY_RESULT_SENTINEL};

const ENVELOPE_KEYS: [&str; 3] = ["format", "value", "truncated"];

/// Canonical messages produced at a tool boundary.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizedMessages {
    pub messages: Vec<Message>,
    /// Custom outputs carried by the results; the last message carrying them wins.
    pub custom_outputs: Option<Value>,
}

impl NormalizedMessages {
    /// True when the first message is the empty-result sentinel.
    ///
    /// Only the first message is inspected, whatever the number of results.
    pub fn first_is_empty_result(&self) -> bool {
        self.messages
            .first()
            .is_some_and(|m| m.content.is_text(EMPTY_RESULT_SENTINEL))
    }
}

/// Normalize canonical tool-result messages.
pub fn normalize_tool_messages(raw: impl IntoIterator<Item = Message>) -> NormalizedMessages {
    let mut normalized = NormalizedMessages::default();
    for message in raw {
        let (message, custom_outputs) = normalize_message(message);
        if custom_outputs.is_some() {
            normalized.custom_outputs = custom_outputs;
        }
        normalized.messages.push(message);
    }
    normalized
}

/// Convert mapping-shaped results and normalize them.
pub fn normalize_values(raw: impl IntoIterator<Item = Value>) -> Result<NormalizedMessages> {
    let messages = raw
        .into_iter()
        .map(Message::from_value)
        .collect::<Result<Vec<_>>>()?;
    Ok(normalize_tool_messages(messages))
}

/// Normalize one message, returning it with any custom outputs it carried.
pub fn normalize_message(mut message: Message) -> (Message, Option<Value>) {
    if message.content.is_empty_sequence() {
        message.content = MessageContent::Text(EMPTY_RESULT_SENTINEL.to_string());
    }
    message.ensure_id();

    let parsed = match &message.content {
        MessageContent::Text(text) => try_parse(text),
        MessageContent::Structured(value) => Some(value.clone()),
    };
    let Some(parsed) = parsed else {
        return (message, None);
    };

    let Value::Object(effective) = unwrap_envelope(parsed) else {
        return (message, None);
    };
    if let Some(attachments) = effective.get("attachments") {
        message.attachments = Some(attachments.clone());
    }
    let custom_outputs = effective.get("custom_outputs").cloned();
    if custom_outputs.is_some() {
        message.custom_outputs = custom_outputs.clone();
    }
    (message, custom_outputs)
}

/// Replace an envelope with its decoded `value`, when that decodes.
fn unwrap_envelope(parsed: Value) -> Value {
    let is_envelope = parsed
        .as_object()
        .is_some_and(|obj| ENVELOPE_KEYS.iter().all(|key| obj.contains_key(*key)));
    if !is_envelope {
        return parsed;
    }
    let inner = match &parsed["value"] {
        Value::String(encoded) => try_parse(encoded),
        Value::Null => None,
        other => Some(other.clone()),
    };
    inner.unwrap_or(parsed)
}
