//! Model-name to provider-endpoint resolution.

use super::GatewayError;

/// Built-in provider routes, matched by model-name prefix in order.
const DEFAULT_ROUTES: &[(&str, &str)] = &[
    ("mistral", "https://api.mistral.ai/v1/chat/completions"),
    ("gpt", "https://api.openai.com/v1/chat/completions"),
];

/// Ordered table mapping model-name prefixes to chat-completion URLs.
///
/// Lookup is first-match-wins, so more specific prefixes should be added
/// before general ones.
#[derive(Clone, Debug)]
pub struct EndpointTable {
    routes: Vec<(String, String)>,
}

impl Default for EndpointTable {
    fn default() -> Self {
        Self {
            routes: DEFAULT_ROUTES
                .iter()
                .map(|(p, u)| ((*p).to_string(), (*u).to_string()))
                .collect(),
        }
    }
}

impl EndpointTable {
    /// Add a route ahead of the built-in ones.
    #[must_use]
    pub fn with_route(mut self, prefix: impl Into<String>, url: impl Into<String>) -> Self {
        self.routes.insert(0, (prefix.into(), url.into()));
        self
    }

    /// Resolve the endpoint URL for `model`.
    ///
    /// # Errors
    /// Returns [`GatewayError::UnknownModel`] when no prefix matches.
    pub fn resolve(&self, model: &str) -> Result<&str, GatewayError> {
        self.routes
            .iter()
            .find(|(prefix, _)| model.starts_with(prefix.as_str()))
            .map(|(_, url)| url.as_str())
            .ok_or_else(|| GatewayError::UnknownModel(model.to_string()))
    }
}
