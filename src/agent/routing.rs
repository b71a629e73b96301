//! Routers attached to agent graphs' conditional edges.

use crate::config::DecisionOption;
use crate::graph::{Router, END};
use crate::types::ConversationState;

/// Label chosen by [`ToolCallRouter`] when the model requested tools.
pub const CALL_TOOLS: &str = "call_tools";

/// Pick the sub-agent whose keyword appears in `reply`.
///
/// Matching is case-insensitive substring containment in option order; the
/// first hit wins. Empty keywords never match.
pub fn match_decision<'a>(options: &'a [DecisionOption], reply: &str) -> Option<&'a str> {
    let reply = reply.to_lowercase();
    options
        .iter()
        .find(|option| !option.keyword.is_empty() && reply.contains(&option.keyword.to_lowercase()))
        .map(|option| option.agent.as_str())
}

/// Routes a supervisor's reply to one of its sub-agents, or to [`END`].
#[derive(Debug, Clone)]
pub struct KeywordRouter {
    supervisor: String,
    options: Vec<DecisionOption>,
}

impl KeywordRouter {
    pub fn new(supervisor: impl Into<String>, options: Vec<DecisionOption>) -> Self {
        Self {
            supervisor: supervisor.into(),
            options,
        }
    }

    /// Every label this router can return, paired with itself.
    pub fn labels(&self) -> Vec<(String, String)> {
        let mut labels: Vec<(String, String)> = Vec::with_capacity(self.options.len() + 1);
        for option in &self.options {
            if !labels.iter().any(|(label, _)| *label == option.agent) {
                labels.push((option.agent.clone(), option.agent.clone()));
            }
        }
        labels.push((END.to_string(), END.to_string()));
        labels
    }
}

impl Router for KeywordRouter {
    fn route(&self, state: &ConversationState) -> String {
        let reply = state
            .last_message()
            .map(|m| m.text().into_owned())
            .unwrap_or_default();
        match match_decision(&self.options, &reply) {
            Some(agent) => {
                tracing::debug!(supervisor = %self.supervisor, agent, "dispatching to sub-agent");
                agent.to_string()
            }
            None => {
                tracing::debug!(supervisor = %self.supervisor, "no decision keyword, ending turn");
                END.to_string()
            }
        }
    }
}

/// Sends the turn to the tool node when the last message requests tools.
#[derive(Debug, Clone, Copy, Default)]
pub struct ToolCallRouter;

impl Router for ToolCallRouter {
    fn route(&self, state: &ConversationState) -> String {
        if state.last_message().is_some_and(|m| m.has_tool_calls()) {
            CALL_TOOLS.to_string()
        } else {
            END.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Message, ToolCall};

    fn options() -> Vec<DecisionOption> {
        vec![
            DecisionOption::new("billing", "billing_agent"),
            DecisionOption::new("tech", "tech_agent"),
        ]
    }

    fn state(last: Message) -> ConversationState {
        ConversationState::new(vec![Message::user("help"), last])
    }

    #[test]
    fn keyword_match_is_case_insensitive() {
        let router = KeywordRouter::new("sup", options());
        assert_eq!(
            router.route(&state(Message::assistant("I have a BILLING question"))),
            "billing_agent"
        );
    }

    #[test]
    fn first_matching_option_wins() {
        assert_eq!(
            match_decision(&options(), "tech support for billing"),
            Some("billing_agent")
        );
    }

    #[test]
    fn no_match_ends_the_turn() {
        let router = KeywordRouter::new("sup", options());
        assert_eq!(router.route(&state(Message::assistant("hello there"))), END);
        assert_eq!(router.route(&ConversationState::default()), END);
    }

    #[test]
    fn empty_keyword_never_matches() {
        let options = vec![DecisionOption::new("", "catch_all")];
        assert_eq!(match_decision(&options, "anything"), None);
    }

    #[test]
    fn labels_are_deduplicated_and_include_end() {
        let mut options = options();
        options.push(DecisionOption::new("invoice", "billing_agent"));
        let labels: Vec<String> = KeywordRouter::new("sup", options)
            .labels()
            .into_iter()
            .map(|(label, _)| label)
            .collect();
        assert_eq!(labels, ["billing_agent", "tech_agent", END]);
    }

    #[test]
    fn tool_call_router() {
        let with_calls = Message::assistant_with_tool_calls(
            "",
            vec![ToolCall::new("c1", "products", "{}")],
        );
        assert_eq!(ToolCallRouter.route(&state(with_calls)), CALL_TOOLS);
        assert_eq!(ToolCallRouter.route(&state(Message::assistant("done"))), END);
    }
}
