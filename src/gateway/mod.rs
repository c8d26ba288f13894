//! Model gateway: serializes the current conversation into the remote
//! chat-completion API's schema, issues the call, and validates the decoded
//! response.
//!
//! Delivery policy is a fixed single attempt: no retry, and no timeout unless
//! one is configured. On any failure the conversation is left exactly as it
//! was before the call.

pub mod endpoints;

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::agent::{Agent, Message};

pub use endpoints::EndpointTable;

/// Errors produced by a model call.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// No endpoint route matches the model name.
    #[error("no endpoint known for model '{0}'")]
    UnknownModel(String),

    /// The outgoing payload could not be serialized.
    #[error("failed to encode request body: {0}")]
    Encode(#[source] serde_json::Error),

    /// The HTTP exchange itself failed (DNS, refused connection, timeout).
    #[error("model request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The response body did not match the expected schema.
    #[error("failed to decode model response: {0}")]
    Decode(#[source] serde_json::Error),

    /// Decoding succeeded but the response carried no choices.
    #[error("model response contained no choices")]
    EmptyChoices,
}

/// Outgoing chat-completion payload.
#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
}

/// Decoded chat-completion response.
#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    /// Provider-assigned response ID.
    #[serde(default)]
    pub id: String,
    /// Response object type, e.g. `chat.completion`.
    #[serde(default)]
    pub object: String,
    /// Creation timestamp (unix seconds).
    #[serde(default)]
    pub created: i64,
    /// Model that produced the response.
    #[serde(default)]
    pub model: String,
    /// Candidate completions; the first is the canonical reply.
    pub choices: Vec<Choice>,
    /// Token accounting for the exchange.
    #[serde(default)]
    pub usage: Usage,
}

/// One candidate completion.
#[derive(Debug, Deserialize)]
pub struct Choice {
    /// Position within the choices array.
    #[serde(default)]
    pub index: u32,
    /// The assistant message for this choice.
    pub message: Message,
    /// Why generation stopped.
    #[serde(default)]
    pub finish_reason: String,
}

/// Token usage reported by the provider.
#[derive(Debug, Default, Deserialize)]
pub struct Usage {
    /// Tokens consumed by the prompt.
    #[serde(default)]
    pub prompt_tokens: u32,
    /// Tokens in the completion.
    #[serde(default)]
    pub completion_tokens: u32,
    /// Prompt plus completion.
    #[serde(default)]
    pub total_tokens: u32,
}

/// Client for the remote chat-completion endpoint.
#[derive(Clone, Debug)]
pub struct ModelGateway {
    client: Client,
    endpoints: EndpointTable,
}

impl ModelGateway {
    /// Build a gateway with the default endpoint table.
    ///
    /// `timeout` bounds each request; `None` means no timeout, which is the
    /// default delivery policy.
    ///
    /// # Errors
    /// Returns a [`GatewayError::Transport`] if the HTTP client cannot be
    /// constructed.
    pub fn new(timeout: Option<Duration>) -> Result<Self, GatewayError> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
            endpoints: EndpointTable::default(),
        })
    }

    /// Replace the endpoint table, e.g. to route a model prefix to a local
    /// provider.
    #[must_use]
    pub fn with_endpoints(mut self, endpoints: EndpointTable) -> Self {
        self.endpoints = endpoints;
        self
    }

    /// Send the agent's full conversation to its model's endpoint and return
    /// the assistant reply.
    ///
    /// On success the reply is appended to the agent's history and the
    /// agent's token count is overwritten with the response's total-token
    /// figure. On any error the agent is left unmodified.
    ///
    /// # Errors
    /// See [`GatewayError`] for the failure taxonomy.
    pub async fn send(&self, agent: &mut Agent) -> Result<Message, GatewayError> {
        let url = self.endpoints.resolve(&agent.model)?;

        let body = serde_json::to_vec(&ChatRequest {
            model: &agent.model,
            messages: &agent.messages,
        })
        .map_err(GatewayError::Encode)?;

        tracing::debug!(model = %agent.model, url, turns = agent.messages.len(), "sending chat request");

        let response = self
            .client
            .post(url)
            .header("Content-Type", "application/json")
            .header("Accept", "application/json")
            .bearer_auth(agent.api_key())
            .body(body)
            .send()
            .await?;

        let raw = response.text().await?;
        let decoded: ChatResponse = serde_json::from_str(&raw).map_err(GatewayError::Decode)?;

        let Some(choice) = decoded.choices.into_iter().next() else {
            return Err(GatewayError::EmptyChoices);
        };

        tracing::debug!(
            total_tokens = decoded.usage.total_tokens,
            finish_reason = %choice.finish_reason,
            "received chat response"
        );

        agent.token_count = decoded.usage.total_tokens;
        agent.messages.push(choice.message.clone());
        Ok(choice.message)
    }
}

#[cfg(test)]
mod tests {
    use std::net::SocketAddr;
    use std::sync::Arc;

    use axum::routing::post;
    use axum::{Json, Router};

    use crate::agent::Role;

    use super::*;

    /// Serve `payload` from an ephemeral local listener and return its URL.
    async fn serve_json(payload: serde_json::Value) -> String {
        let payload = Arc::new(payload);
        let app = Router::new().route(
            "/v1/chat/completions",
            post(move || {
                let payload = Arc::clone(&payload);
                async move { Json((*payload).clone()) }
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr: SocketAddr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}/v1/chat/completions")
    }

    fn test_agent(url: &str) -> (ModelGateway, Agent) {
        let gateway = ModelGateway::new(Some(Duration::from_secs(5)))
            .unwrap()
            .with_endpoints(EndpointTable::default().with_route("test", url));
        let agent = Agent::new("secret").with_model("test-model");
        (gateway, agent)
    }

    #[tokio::test]
    async fn success_appends_reply_and_overwrites_tokens() {
        let url = serve_json(serde_json::json!({
            "id": "cmpl-1",
            "object": "chat.completion",
            "created": 1_700_000_000,
            "model": "test-model",
            "choices": [{
                "index": 0,
                "message": {"role": "assistant", "content": "edited text"},
                "finish_reason": "stop"
            }],
            "usage": {"prompt_tokens": 10, "completion_tokens": 5, "total_tokens": 15}
        }))
        .await;

        let (gateway, mut agent) = test_agent(&url);
        agent.append_message(Role::User, "please edit");
        agent.token_count = 3;
        let len_before = agent.messages.len();

        let reply = gateway.send(&mut agent).await.unwrap();
        assert_eq!(reply.role, Role::Assistant);
        assert_eq!(reply.content, "edited text");
        assert_eq!(agent.messages.len(), len_before + 1);
        // Overwritten with the response figure, not accumulated.
        assert_eq!(agent.token_count, 15);
    }

    #[tokio::test]
    async fn empty_choices_leaves_conversation_unchanged() {
        let url = serve_json(serde_json::json!({
            "id": "cmpl-2",
            "choices": [],
            "usage": {"prompt_tokens": 1, "completion_tokens": 0, "total_tokens": 1}
        }))
        .await;

        let (gateway, mut agent) = test_agent(&url);
        agent.append_message(Role::User, "hello");
        let before = agent.messages.clone();
        let tokens_before = agent.token_count;

        let err = gateway.send(&mut agent).await.unwrap_err();
        assert!(matches!(err, GatewayError::EmptyChoices));
        assert_eq!(agent.messages, before);
        assert_eq!(agent.token_count, tokens_before);
    }

    #[tokio::test]
    async fn malformed_body_is_a_decode_error() {
        let url = serve_json(serde_json::json!({"unexpected": true})).await;
        let (gateway, mut agent) = test_agent(&url);
        let before = agent.messages.clone();

        let err = gateway.send(&mut agent).await.unwrap_err();
        assert!(matches!(err, GatewayError::Decode(_)));
        assert_eq!(agent.messages, before);
    }

    #[tokio::test]
    async fn unresolvable_model_fails_before_any_io() {
        let gateway = ModelGateway::new(None).unwrap();
        let mut agent = Agent::new("secret").with_model("unknown-model");
        let err = gateway.send(&mut agent).await.unwrap_err();
        assert!(matches!(err, GatewayError::UnknownModel(_)));
    }
}
