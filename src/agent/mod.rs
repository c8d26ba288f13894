//! Agent state machine: the mutable session owning the ordered conversation
//! history, the selected model, and token bookkeeping.
//!
//! The agent enforces no structural constraints on its history beyond turn
//! order. Deleting arbitrary positions may leave the conversation without a
//! leading system message; that is permitted, not repaired.

pub mod error;
pub mod message;
pub mod prompt;

use std::sync::LazyLock;

use regex::Regex;

pub use error::AgentError;
pub use message::{Message, Role};
pub use prompt::PromptDefinition;

/// Model selected when none is configured.
pub const DEFAULT_MODEL: &str = "mistral-small";

/// A conversational session: ordered message history plus model selection,
/// token accounting, and the API credential used for outbound calls.
#[derive(Clone, Debug)]
pub struct Agent {
    prompt: PromptDefinition,
    /// Ordered conversation history. Index 0 is conventionally the system
    /// message after a prompt-set operation.
    pub messages: Vec<Message>,
    /// Model identifier; drives endpoint resolution in the gateway.
    pub model: String,
    /// Model restored by [`reset`](Self::reset); set once from configuration.
    default_model: String,
    /// Total tokens reported by the most recent response. Overwritten, not
    /// accumulated, on each call.
    pub token_count: u32,
    api_key: String,
}

impl Agent {
    /// Create a session with the default model and prompt installed.
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        let mut agent = Self {
            prompt: PromptDefinition::default_prompt(),
            messages: Vec::new(),
            model: DEFAULT_MODEL.to_string(),
            default_model: DEFAULT_MODEL.to_string(),
            token_count: 0,
            api_key: api_key.into(),
        };
        agent.set_prompt(None);
        agent
    }

    /// Override the configured model at construction time. The override is
    /// the new default: [`reset`](Self::reset) restores it.
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self.default_model.clone_from(&self.model);
        self
    }

    /// The bearer credential for outbound model calls.
    #[must_use]
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Replace the entire conversation with a single system message and zero
    /// the token counter.
    ///
    /// `None` installs the default prompt text. This destroys all prior
    /// history; callers who care must save first.
    pub fn set_prompt(&mut self, text: Option<&str>) {
        self.messages.clear();
        let content = match text {
            Some(t) => t.to_string(),
            None => self.prompt.parameters.clone(),
        };
        self.messages.push(Message::new(Role::System, content));
        self.token_count = 0;
    }

    /// Append one turn to the conversation.
    pub fn append_message(&mut self, role: Role, content: impl Into<String>) {
        self.messages.push(Message::new(role, content));
    }

    /// Delete conversation lines named anywhere in `spec`.
    ///
    /// Every integer substring in `spec` is treated as a zero-based index
    /// into the history, so `"drop 0 and 2"` deletes indices 0 and 2.
    /// Indices are validated up front: if any is out of range the call fails
    /// and the conversation is left untouched. Valid indices are removed from
    /// highest to lowest so earlier removals do not shift later ones.
    pub fn delete_lines(&mut self, spec: &str) -> Result<(), AgentError> {
        // Digit runs only; a leading '-' is free text, so negative indices
        // can never be produced here.
        static INDEX_RE: LazyLock<Regex> =
            LazyLock::new(|| Regex::new("[0-9]+").expect("valid literal pattern"));
        let mut indices = Vec::new();
        for m in INDEX_RE.find_iter(spec) {
            let index: usize = m
                .as_str()
                .parse()
                .map_err(|_| AgentError::InvalidIndex(m.as_str().to_string()))?;
            indices.push(index);
        }

        indices.sort_unstable();
        indices.dedup();

        if let Some(&index) = indices.iter().find(|&&i| i >= self.messages.len()) {
            return Err(AgentError::IndexOutOfRange {
                index,
                len: self.messages.len(),
            });
        }

        tracing::debug!(?indices, "deleting conversation lines");
        for &index in indices.iter().rev() {
            self.messages.remove(index);
        }
        Ok(())
    }

    /// Reinitialize to the configured default model, default prompt, and
    /// zero tokens.
    ///
    /// Equivalent to constructing fresh with the same configuration; the API
    /// credential and the configured model survive.
    pub fn reset(&mut self) {
        let api_key = std::mem::take(&mut self.api_key);
        let default_model = std::mem::take(&mut self.default_model);
        *self = Self::new(api_key).with_model(default_model);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn agent() -> Agent {
        Agent::new("test-key")
    }

    #[test]
    fn new_agent_starts_with_default_prompt() {
        let agent = agent();
        assert_eq!(agent.messages.len(), 1);
        assert_eq!(agent.messages[0].role, Role::System);
        assert_eq!(agent.model, DEFAULT_MODEL);
        assert_eq!(agent.token_count, 0);
    }

    #[test]
    fn append_preserves_order_and_grows_by_one() {
        let mut agent = agent();
        let before = agent.messages.len();
        agent.append_message(Role::User, "first");
        agent.append_message(Role::Assistant, "second");
        assert_eq!(agent.messages.len(), before + 2);
        assert_eq!(agent.messages[before].content, "first");
        assert_eq!(agent.messages[before + 1].content, "second");
    }

    #[test]
    fn set_prompt_discards_history_and_tokens() {
        let mut agent = agent();
        agent.append_message(Role::User, "hello");
        agent.token_count = 42;
        agent.set_prompt(None);
        assert_eq!(agent.messages.len(), 1);
        assert_eq!(agent.messages[0].content, agent.prompt.parameters);
        assert_eq!(agent.token_count, 0);
    }

    #[test]
    fn set_prompt_with_text_installs_that_text() {
        let mut agent = agent();
        agent.set_prompt(Some("custom instructions"));
        assert_eq!(agent.messages.len(), 1);
        assert_eq!(agent.messages[0].content, "custom instructions");
    }

    #[test]
    fn delete_lines_picks_indices_out_of_free_text() {
        let mut agent = agent();
        agent.append_message(Role::User, "one");
        agent.append_message(Role::Assistant, "two");
        agent.delete_lines("please drop lines 0 and 2").unwrap();
        assert_eq!(agent.messages.len(), 1);
        assert_eq!(agent.messages[0].content, "one");
    }

    #[test]
    fn delete_lines_out_of_range_leaves_history_untouched() {
        let mut agent = agent();
        agent.append_message(Role::User, "keep me");
        let before = agent.messages.clone();
        let err = agent.delete_lines("0 and 9").unwrap_err();
        assert!(matches!(err, AgentError::IndexOutOfRange { index: 9, .. }));
        assert_eq!(agent.messages, before);
    }

    #[test]
    fn delete_lines_duplicate_indices_delete_once() {
        let mut agent = agent();
        agent.append_message(Role::User, "one");
        agent.delete_lines("1, 1, 1").unwrap();
        assert_eq!(agent.messages.len(), 1);
        assert_eq!(agent.messages[0].role, Role::System);
    }

    #[test]
    fn delete_lines_may_remove_the_system_message() {
        let mut agent = agent();
        agent.append_message(Role::User, "survivor");
        agent.delete_lines("0").unwrap();
        assert_eq!(agent.messages.len(), 1);
        assert_eq!(agent.messages[0].role, Role::User);
    }

    #[test]
    fn reset_restores_defaults_but_keeps_credential() {
        let mut agent = agent();
        agent.append_message(Role::User, "hello");
        agent.token_count = 99;
        agent.reset();
        assert_eq!(agent.model, DEFAULT_MODEL);
        assert_eq!(agent.messages.len(), 1);
        assert_eq!(agent.token_count, 0);
        assert_eq!(agent.api_key(), "test-key");
    }

    #[test]
    fn reset_restores_the_configured_model() {
        let mut agent = agent().with_model("gpt-4");
        agent.model = "mistral-large".to_string();
        agent.reset();
        assert_eq!(agent.model, "gpt-4");
    }
}
