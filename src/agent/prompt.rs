//! Prompt definitions used to seed a conversation's system message.

use chrono::Local;

/// A named, read-only system prompt template.
///
/// Swapping the active prompt re-initializes the conversation, discarding
/// prior history.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PromptDefinition {
    /// Short identifier for the prompt.
    pub name: String,
    /// Human-readable summary.
    pub description: String,
    /// The full system-message text installed at conversation start.
    pub parameters: String,
}

impl PromptDefinition {
    /// The stock assistant prompt, dated with today's local date.
    #[must_use]
    pub fn default_prompt() -> Self {
        let today = Local::now().format("%B %-d, %Y");
        Self {
            name: "Default".to_string(),
            description: "Default Prompt".to_string(),
            parameters: format!(
                "You are a helpful assistant. Please generate truthful, accurate, \
                 and honest responses while also keeping your answers succinct and \
                 to-the-point. Today's date is: {today}"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_prompt_carries_todays_date() {
        let prompt = PromptDefinition::default_prompt();
        assert_eq!(prompt.name, "Default");
        let year = Local::now().format("%Y").to_string();
        assert!(prompt.parameters.contains(&year));
    }
}
