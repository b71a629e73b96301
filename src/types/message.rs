//! Canonical message and tool-call types.
//!
//! Every message that crosses a graph boundary is a [`Message`]. Loose,
//! mapping-shaped messages (OpenAI-style wire objects, model responses that
//! nest calls under `function`) are converted through [`Message::from_value`],
//! which is also the `Deserialize` path.

use std::borrow::Cow;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use strum::{Display, EnumString};
use uuid::Uuid;

use super::json::try_parse_object;
use crate::error::SwitchyardError;

/// Content substituted for a tool result that came back as an empty sequence.
pub const EMPTY_RESULT_SENTINEL: &str = "Empty query result, no document has been returned";

/// Generate a fresh message or tool-call identifier.
pub fn new_message_id() -> String {
    Uuid::new_v4().to_string()
}

/// Conversation role.
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Role {
    System,
    #[serde(alias = "human")]
    #[strum(to_string = "user", serialize = "human")]
    User,
    #[serde(alias = "ai")]
    #[strum(to_string = "assistant", serialize = "ai")]
    Assistant,
    Tool,
}

/// Message content: plain text or an already-structured payload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Structured(Value),
}

impl Default for MessageContent {
    fn default() -> Self {
        Self::Text(String::new())
    }
}

impl From<&str> for MessageContent {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for MessageContent {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl MessageContent {
    /// Build content from an arbitrary JSON value. Strings stay text, `null`
    /// becomes empty text, everything else is structured.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::String(text) => Self::Text(text),
            Value::Null => Self::Text(String::new()),
            other => Self::Structured(other),
        }
    }

    /// Text view of the content. Structured content is rendered as JSON.
    pub fn as_text(&self) -> Cow<'_, str> {
        match self {
            Self::Text(text) => Cow::Borrowed(text),
            Self::Structured(value) => Cow::Owned(value.to_string()),
        }
    }

    /// True for a structured empty sequence (`[]`).
    pub fn is_empty_sequence(&self) -> bool {
        matches!(self, Self::Structured(Value::Array(items)) if items.is_empty())
    }

    /// True when the content is text exactly equal to `expected`.
    pub fn is_text(&self, expected: &str) -> bool {
        matches!(self, Self::Text(text) if text == expected)
    }
}

/// A single tool invocation requested by the model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(try_from = "Value")]
pub struct ToolCall {
    pub id: String,
    pub name: String,
    /// Arguments exactly as the model serialized them.
    pub raw_arguments: String,
    /// Arguments as a mapping; empty when `raw_arguments` is not a JSON object.
    pub parsed_arguments: Map<String, Value>,
}

impl ToolCall {
    /// Create a tool call from serialized arguments.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        raw_arguments: impl Into<String>,
    ) -> Self {
        let raw_arguments = raw_arguments.into();
        let parsed_arguments = try_parse_object(&raw_arguments).unwrap_or_default();
        Self {
            id: id.into(),
            name: name.into(),
            raw_arguments,
            parsed_arguments,
        }
    }

    /// Create a tool call from structured arguments.
    pub fn with_arguments(id: impl Into<String>, name: impl Into<String>, arguments: Value) -> Self {
        let parsed_arguments = match &arguments {
            Value::Object(map) => map.clone(),
            _ => Map::new(),
        };
        Self {
            id: id.into(),
            name: name.into(),
            raw_arguments: arguments.to_string(),
            parsed_arguments,
        }
    }

    /// Convert a mapping-shaped tool call.
    ///
    /// Accepts the flat shape (`name` + `arguments`/`args`), the nested
    /// `function: {name, arguments}` shape, and the canonical serialized
    /// shape. Arguments may be a JSON string or a structured value.
    pub fn from_value(value: &Value) -> Result<Self, SwitchyardError> {
        let obj = value.as_object().ok_or_else(|| {
            SwitchyardError::MessageFormat(format!("tool call must be an object, got {value}"))
        })?;
        let function = obj.get("function").and_then(Value::as_object);

        let name = function
            .and_then(|f| f.get("name"))
            .or_else(|| obj.get("name"))
            .and_then(Value::as_str)
            .ok_or_else(|| SwitchyardError::MessageFormat("tool call is missing a name".into()))?;
        let id = obj
            .get("id")
            .and_then(Value::as_str)
            .filter(|id| !id.is_empty())
            .map(str::to_string)
            .unwrap_or_else(new_message_id);

        let arguments = function
            .and_then(|f| f.get("arguments"))
            .or_else(|| obj.get("raw_arguments"))
            .or_else(|| obj.get("arguments"))
            .or_else(|| obj.get("args"));

        Ok(match arguments {
            Some(Value::String(raw)) => Self::new(id, name, raw.clone()),
            Some(Value::Null) | None => Self::new(id, name, ""),
            Some(other) => Self::with_arguments(id, name, other.clone()),
        })
    }

    /// Parsed arguments as a JSON object value.
    pub fn arguments(&self) -> Value {
        Value::Object(self.parsed_arguments.clone())
    }
}

impl TryFrom<Value> for ToolCall {
    type Error = SwitchyardError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Self::from_value(&value)
    }
}

/// A message in a conversation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(try_from = "Value")]
pub struct Message {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub role: Role,
    pub content: MessageContent,
    /// Requested tool calls; only ever non-empty on assistant messages.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCall>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attachments: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_outputs: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

impl Message {
    fn with_role(role: Role, content: MessageContent) -> Self {
        Self {
            id: None,
            role,
            content,
            tool_calls: Vec::new(),
            tool_call_id: None,
            name: None,
            attachments: None,
            custom_outputs: None,
            timestamp: Some(Utc::now()),
        }
    }

    /// Create a system message.
    pub fn system(text: impl Into<String>) -> Self {
        Self::with_role(Role::System, MessageContent::Text(text.into()))
    }

    /// Create a user message.
    pub fn user(text: impl Into<String>) -> Self {
        Self::with_role(Role::User, MessageContent::Text(text.into()))
    }

    /// Create an assistant message.
    pub fn assistant(text: impl Into<String>) -> Self {
        Self::with_role(Role::Assistant, MessageContent::Text(text.into()))
    }

    /// Create an assistant message that requests tool calls.
    pub fn assistant_with_tool_calls(text: impl Into<String>, tool_calls: Vec<ToolCall>) -> Self {
        let mut message = Self::assistant(text);
        message.tool_calls = tool_calls;
        message
    }

    /// Create a tool result message answering `tool_call_id`.
    pub fn tool_result(
        tool_call_id: impl Into<String>,
        name: impl Into<String>,
        content: impl Into<MessageContent>,
    ) -> Self {
        let mut message = Self::with_role(Role::Tool, content.into());
        message.tool_call_id = Some(tool_call_id.into());
        message.name = Some(name.into());
        message
    }

    /// Builder: set an explicit id.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Builder: replace the id with a freshly generated one.
    pub fn with_fresh_id(mut self) -> Self {
        self.id = Some(new_message_id());
        self
    }

    /// Assign an id if the message has none (or an empty one).
    pub fn ensure_id(&mut self) -> &str {
        if self.id.as_deref().map_or(true, str::is_empty) {
            self.id = Some(new_message_id());
        }
        self.id.as_deref().unwrap_or_default()
    }

    /// Text view of the content.
    pub fn text(&self) -> Cow<'_, str> {
        self.content.as_text()
    }

    pub fn has_tool_calls(&self) -> bool {
        !self.tool_calls.is_empty()
    }

    /// Convert a mapping-shaped message into canonical form.
    ///
    /// The role is read from `role` (or `type`, accepting `human`/`ai`).
    /// Missing content becomes empty text. Tool calls on a non-assistant
    /// message are rejected rather than dropped.
    pub fn from_value(value: Value) -> Result<Self, SwitchyardError> {
        let Value::Object(mut obj) = value else {
            return Err(SwitchyardError::MessageFormat(format!(
                "message must be an object, got {value}"
            )));
        };

        let role_name = obj
            .get("role")
            .or_else(|| obj.get("type"))
            .and_then(Value::as_str)
            .ok_or_else(|| SwitchyardError::MessageFormat("message is missing a role".into()))?;
        let role = Role::from_str(role_name).map_err(|_| {
            SwitchyardError::MessageFormat(format!("unknown message role: {role_name}"))
        })?;

        let tool_calls = match obj.remove("tool_calls") {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(items)) => items
                .iter()
                .map(ToolCall::from_value)
                .collect::<Result<Vec<_>, _>>()?,
            Some(other) => {
                return Err(SwitchyardError::MessageFormat(format!(
                    "tool_calls must be an array, got {other}"
                )))
            }
        };
        if !tool_calls.is_empty() && role != Role::Assistant {
            return Err(SwitchyardError::MessageFormat(format!(
                "{role} message cannot carry tool calls"
            )));
        }

        let content = obj
            .remove("content")
            .map(MessageContent::from_value)
            .unwrap_or_default();
        let timestamp = obj
            .remove("timestamp")
            .and_then(|v| serde_json::from_value(v).ok());

        Ok(Self {
            id: take_string(&mut obj, "id").filter(|id| !id.is_empty()),
            role,
            content,
            tool_calls,
            tool_call_id: take_string(&mut obj, "tool_call_id"),
            name: take_string(&mut obj, "name"),
            attachments: take_non_null(&mut obj, "attachments"),
            custom_outputs: take_non_null(&mut obj, "custom_outputs"),
            timestamp,
        })
    }
}

impl TryFrom<Value> for Message {
    type Error = SwitchyardError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Self::from_value(value)
    }
}

fn take_string(obj: &mut Map<String, Value>, key: &str) -> Option<String> {
    match obj.remove(key)? {
        Value::String(s) => Some(s),
        _ => None,
    }
}

fn take_non_null(obj: &mut Map<String, Value>, key: &str) -> Option<Value> {
    obj.remove(key).filter(|v| !v.is_null())
}
