//! Shared test helpers: a scripted model client and retriever tools.
#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{json, Value};

use switchyard::config::{
    AgentConfig, DecisionOption, LlmConfig, SubAgentEntry, ToolConfig, RETRIEVER_TOOL_TYPE,
};
use switchyard::error::{Result, SwitchyardError};
use switchyard::models::ModelCapabilities;
use switchyard::provider::{LlmClient, LlmRequest, LlmResponse};
use switchyard::tools::{AgentTool, AgentToolParameters, Tool, ToolExecutionContext};
use switchyard::types::{Message, ToolCall};

/// A model client that replays queued responses in order and records every
/// request it receives.
pub struct MockLlm {
    endpoint: String,
    capabilities: ModelCapabilities,
    responses: Mutex<Vec<LlmResponse>>,
    requests: Mutex<Vec<LlmRequest>>,
}

impl MockLlm {
    pub fn new(endpoint: &str) -> Self {
        Self {
            endpoint: endpoint.to_string(),
            capabilities: ModelCapabilities::full(128_000),
            responses: Mutex::new(Vec::new()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn text_only(endpoint: &str) -> Self {
        Self {
            capabilities: ModelCapabilities::text_only(8_000),
            ..Self::new(endpoint)
        }
    }

    /// Queue a plain assistant reply.
    pub fn queue_text(&self, text: &str) {
        self.queue(LlmResponse::Message(Message::assistant(text)));
    }

    /// Queue an assistant reply requesting the given `(id, name, arguments)` calls.
    pub fn queue_tool_calls(&self, calls: &[(&str, &str, Value)]) {
        let calls = calls
            .iter()
            .map(|(id, name, args)| ToolCall::with_arguments(*id, *name, args.clone()))
            .collect();
        self.queue(LlmResponse::Message(Message::assistant_with_tool_calls("", calls)));
    }

    pub fn queue(&self, response: LlmResponse) {
        self.responses.lock().unwrap().push(response);
    }

    pub fn requests(&self) -> Vec<LlmRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmClient for MockLlm {
    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn capabilities(&self) -> &ModelCapabilities {
        &self.capabilities
    }

    async fn invoke(&self, request: &LlmRequest) -> Result<LlmResponse> {
        self.requests.lock().unwrap().push(request.clone());
        let mut responses = self.responses.lock().unwrap();
        if responses.is_empty() {
            return Err(SwitchyardError::llm(&self.endpoint, "no response queued"));
        }
        Ok(responses.remove(0))
    }
}

/// Arguments and filters seen by a tool, one entry per execution.
pub type ToolLog = Arc<Mutex<Vec<(Value, Option<Value>)>>>;

/// A filter-capable retriever. It returns `[]` whenever a non-empty filter
/// set is applied, and `documents` otherwise.
pub fn strict_retriever(name: &str, documents: Value, log: ToolLog) -> Arc<dyn Tool> {
    Arc::new(
        AgentTool::new(
            name,
            "Search the catalog",
            AgentToolParameters::retriever(),
            move |args, ctx: ToolExecutionContext| {
                let log = log.clone();
                let documents = documents.clone();
                async move {
                    let filters = ctx.filters.as_ref().map(|f| json!(f));
                    log.lock()
                        .unwrap()
                        .push((Value::Object(args.raw().clone()), filters));
                    if ctx.filters.as_ref().is_some_and(|f| !f.is_empty()) {
                        Ok(json!([]))
                    } else {
                        Ok(documents)
                    }
                }
            },
        )
        .with_filters(),
    )
}

pub fn llm(endpoint: &str, system_prompt: &str) -> LlmConfig {
    LlmConfig {
        endpoint_name: endpoint.to_string(),
        max_tokens: 512,
        temperature: Some(0.0),
        system_prompt: system_prompt.to_string(),
    }
}

pub fn retriever_config(name: &str) -> ToolConfig {
    ToolConfig {
        kind: RETRIEVER_TOOL_TYPE.to_string(),
        name: name.to_string(),
        description: format!("{name} search"),
        embedding: None,
        retrieval: None,
    }
}

/// A tool agent named `name` using endpoints `tool-model` and `summary-model`.
pub fn tool_agent(name: &str, tools: &[&str]) -> AgentConfig {
    AgentConfig::tool_agent(
        name,
        llm("tool-model", "Use the catalog tools."),
        tools.iter().map(|t| retriever_config(t)).collect(),
        llm("summary-model", "Summarize the results."),
    )
}

/// A supervisor on endpoint `router-model` with `(keyword, child)` options.
pub fn supervisor(name: &str, options: &[(&str, AgentConfig)]) -> AgentConfig {
    AgentConfig::supervisor(
        name,
        llm("router-model", "Decide who handles the request."),
        options
            .iter()
            .map(|(keyword, child)| DecisionOption::new(*keyword, child.name.clone()))
            .collect(),
        options
            .iter()
            .map(|(_, child)| SubAgentEntry::Inline(Box::new(child.clone())))
            .collect(),
    )
}

pub fn texts(messages: &[Message]) -> Vec<String> {
    messages.iter().map(|m| m.text().into_owned()).collect()
}
