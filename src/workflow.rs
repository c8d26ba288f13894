//! Edit workflow: the composition root tying the agent, gateway, and diff
//! renderer together.

use crate::agent::{Agent, Role};
use crate::diff;
use crate::gateway::{GatewayError, ModelGateway};

/// Fixed system prompt for the text-editing role; the caller's instruction is
/// appended verbatim.
const EDITOR_PROMPT: &str = "You are an assistant that helps with editing text. \
You will follow requests exactly as asked. Your only job is to edit text to the \
specifications set: you have no role in judging the content or providing any \
feedback. Only output the edited text and nothing else - do not show the \
original text or add any extra comments. When presented with text, you will \
make the following changes:\n";

/// Result of one edit round: the model's output plus its rendered diff.
#[derive(Clone, Debug)]
pub struct EditOutcome {
    /// The AI-modified version of the input.
    pub edited: String,
    /// Inline HTML diff of input vs edited text.
    pub diff_html: String,
}

/// Run one edit: install the editor prompt with `instruction` appended, send
/// `input` as the user turn, and diff the reply against the input.
///
/// Replaces the agent's current conversation; the reply lands in the history
/// via the gateway on success.
///
/// # Errors
/// Propagates gateway failures; the conversation then holds only the prompt
/// and the user turn.
pub async fn run_edit(
    agent: &mut Agent,
    gateway: &ModelGateway,
    input: &str,
    instruction: &str,
) -> Result<EditOutcome, GatewayError> {
    agent.set_prompt(Some(&format!("{EDITOR_PROMPT}{instruction}")));
    agent.append_message(Role::User, input);

    let reply = gateway.send(agent).await?;
    let diff_html = diff::html_diff(input, &reply.content);

    Ok(EditOutcome {
        edited: reply.content,
        diff_html,
    })
}

#[cfg(test)]
mod tests {
    use std::net::SocketAddr;

    use axum::routing::post;
    use axum::{Json, Router};

    use crate::gateway::EndpointTable;

    use super::*;

    #[tokio::test]
    async fn edit_round_replaces_prompt_and_returns_diff() {
        let app = Router::new().route(
            "/v1/chat/completions",
            post(|| async {
                Json(serde_json::json!({
                    "choices": [{
                        "index": 0,
                        "message": {"role": "assistant", "content": "the slow fox"},
                        "finish_reason": "stop"
                    }],
                    "usage": {"prompt_tokens": 4, "completion_tokens": 3, "total_tokens": 7}
                }))
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr: SocketAddr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let gateway = ModelGateway::new(None).unwrap().with_endpoints(
            EndpointTable::default()
                .with_route("test", format!("http://{addr}/v1/chat/completions")),
        );
        let mut agent = Agent::new("key").with_model("test-model");
        agent.append_message(Role::User, "stale history");

        let outcome = run_edit(&mut agent, &gateway, "the quick fox", "make it slow")
            .await
            .unwrap();

        assert_eq!(outcome.edited, "the slow fox");
        assert!(outcome.diff_html.contains("<ins>slow</ins>"));
        // Prompt swap discarded the stale history: system, user, assistant.
        assert_eq!(agent.messages.len(), 3);
        assert!(agent.messages[0].content.ends_with("make it slow"));
        assert_eq!(agent.token_count, 7);
    }
}
