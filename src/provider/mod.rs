//! Model client trait consumed by LLM-call nodes.
//!
//! The engine never talks to a model API directly. Graph construction asks an
//! [`LlmFactory`] for one [`LlmClient`] per configured endpoint and nodes call
//! [`LlmClient::invoke`] with the conversation and any bound tools.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::config::LlmConfig;
use crate::error::{Result, SwitchyardError};
use crate::models::ModelCapabilities;
use crate::types::{GenerationSettings, Message};

/// A request sent to a model client.
#[derive(Debug, Clone, Default)]
pub struct LlmRequest {
    pub messages: Vec<Message>,
    pub settings: GenerationSettings,
    /// Tools bound to the model for this request.
    pub tools: Option<Vec<ToolDefinition>>,
}

/// Tool definition sent to the model.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

/// What a model client may hand back.
#[derive(Debug, Clone)]
pub enum LlmResponse {
    /// A single message.
    Message(Message),
    /// A list of message-like mappings.
    Messages(Vec<Value>),
    /// A wrapper mapping carrying a `messages` list.
    Wrapped(Value),
}

impl From<Message> for LlmResponse {
    fn from(message: Message) -> Self {
        Self::Message(message)
    }
}

impl LlmResponse {
    /// Normalize every response shape into a list of messages.
    pub fn into_messages(self) -> Result<Vec<Message>> {
        match self {
            Self::Message(message) => Ok(vec![message]),
            Self::Messages(values) => values.into_iter().map(Message::from_value).collect(),
            Self::Wrapped(value) => {
                let Value::Object(mut obj) = value else {
                    return Err(SwitchyardError::MessageFormat(format!(
                        "response wrapper must be an object, got {value}"
                    )));
                };
                match obj.remove("messages") {
                    Some(Value::Array(items)) => {
                        items.into_iter().map(Message::from_value).collect()
                    }
                    _ => Err(SwitchyardError::MessageFormat(
                        "response wrapper has no messages list".into(),
                    )),
                }
            }
        }
    }
}

/// Core trait implemented by model clients.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Endpoint this client serves.
    fn endpoint(&self) -> &str;

    /// Capabilities of the model.
    fn capabilities(&self) -> &ModelCapabilities;

    /// Invoke the model once.
    async fn invoke(&self, request: &LlmRequest) -> Result<LlmResponse>;
}

/// Resolves model clients for configured endpoints.
pub trait LlmFactory: Send + Sync {
    fn create(&self, config: &LlmConfig) -> Result<Arc<dyn LlmClient>>;
}

/// Factory backed by a fixed endpoint → client table.
#[derive(Default, Clone)]
pub struct StaticLlmFactory {
    clients: HashMap<String, Arc<dyn LlmClient>>,
}

impl std::fmt::Debug for StaticLlmFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut endpoints: Vec<_> = self.clients.keys().collect();
        endpoints.sort();
        f.debug_struct("StaticLlmFactory")
            .field("endpoints", &endpoints)
            .finish()
    }
}

impl StaticLlmFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `client` under its own endpoint name.
    pub fn with_client(mut self, client: Arc<dyn LlmClient>) -> Self {
        self.clients.insert(client.endpoint().to_string(), client);
        self
    }

    /// Register `client` under an explicit endpoint name.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>, client: Arc<dyn LlmClient>) -> Self {
        self.clients.insert(endpoint.into(), client);
        self
    }
}

impl LlmFactory for StaticLlmFactory {
    fn create(&self, config: &LlmConfig) -> Result<Arc<dyn LlmClient>> {
        self.clients
            .get(&config.endpoint_name)
            .cloned()
            .ok_or_else(|| {
                SwitchyardError::Configuration(format!(
                    "no model client registered for endpoint '{}'",
                    config.endpoint_name
                ))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Role;
    use serde_json::json;

    #[test]
    fn single_message_response() {
        let messages = LlmResponse::from(Message::assistant("hi")).into_messages().unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].role, Role::Assistant);
    }

    #[test]
    fn list_of_mappings_response() {
        let messages = LlmResponse::Messages(vec![
            json!({"role": "assistant", "content": "a"}),
            json!({"role": "assistant", "content": "b"}),
        ])
        .into_messages()
        .unwrap();
        assert_eq!(messages.iter().map(|m| m.text().into_owned()).collect::<Vec<_>>(), ["a", "b"]);
    }

    #[test]
    fn wrapped_response_requires_messages_key() {
        let messages = LlmResponse::Wrapped(json!({
            "messages": [{"role": "assistant", "content": "x"}]
        }))
        .into_messages()
        .unwrap();
        assert_eq!(messages.len(), 1);

        let err = LlmResponse::Wrapped(json!({"output": []}))
            .into_messages()
            .unwrap_err();
        assert!(matches!(err, SwitchyardError::MessageFormat(_)));
    }

    #[test]
    fn static_factory_misses_are_configuration_errors() {
        let factory = StaticLlmFactory::new();
        let config = LlmConfig {
            endpoint_name: "absent".into(),
            max_tokens: 1,
            temperature: None,
            system_prompt: String::new(),
        };
        let err = factory.create(&config).err().unwrap();
        assert!(matches!(err, SwitchyardError::Configuration(_)));
    }
}
