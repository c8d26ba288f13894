//! HTTP route handlers for the GUI surface.

use std::sync::Arc;

use axum::extract::{ConnectInfo, Form, State};
use axum::http::StatusCode;
use axum::middleware;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use serde::Deserialize;
use tower_http::services::ServeDir;

use crate::workflow;

use super::gate::{self, AUTH_PATH};
use super::pages;
use super::state::AppState;

/// Build the full router: gated application routes plus the always-open
/// `/auth/` and `/static/` surfaces.
pub fn create_router(state: Arc<AppState>) -> Router {
    let gated = Router::new()
        .route("/", get(index))
        .route("/delete/", get(clear).post(clear))
        .route("/aidiff/", post(aidiff))
        .layer(middleware::from_fn_with_state(
            Arc::clone(&state),
            gate::require_allowed,
        ));

    let open = Router::new()
        .route(AUTH_PATH, get(auth_challenge).post(auth_submit))
        .nest_service("/static", ServeDir::new("static"));

    gated.merge(open).with_state(state)
}

/// Render the index page.
async fn index() -> Html<&'static str> {
    Html(pages::INDEX_PAGE)
}

/// Clear the displayed content area.
async fn clear() -> Html<&'static str> {
    Html("")
}

/// Form fields for the edit workflow.
#[derive(Debug, Deserialize)]
struct AidiffForm {
    /// Text to edit.
    #[serde(default)]
    inputdata: String,
    /// Edit instruction appended to the editor prompt.
    #[serde(default)]
    prompttext: String,
}

/// Run the edit workflow and return the rendered diff followed by the
/// AI-modified version.
async fn aidiff(
    State(state): State<Arc<AppState>>,
    Form(form): Form<AidiffForm>,
) -> Response {
    let mut agent = state.agent.lock().await;
    match workflow::run_edit(&mut agent, &state.gateway, &form.inputdata, &form.prompttext).await {
        Ok(outcome) => Html(format!(
            "{}<p>AI-modified version:</p>{}",
            outcome.diff_html, outcome.edited
        ))
        .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "edit workflow failed");
            (StatusCode::BAD_GATEWAY, format!("model call failed: {e}")).into_response()
        }
    }
}

/// Serve the authentication challenge.
async fn auth_challenge() -> Html<&'static str> {
    Html(pages::AUTH_PAGE)
}

/// Secret submission form.
#[derive(Debug, Deserialize)]
struct AuthForm {
    #[serde(default)]
    auth: String,
}

/// Handle a secret submission.
///
/// Success or failure, the caller is redirected back to `/`; a wrong secret
/// simply leaves them unauthorized, so the gate re-prompts. No reason is
/// disclosed either way.
async fn auth_submit(
    State(state): State<Arc<AppState>>,
    ConnectInfo(peer): ConnectInfo<std::net::SocketAddr>,
    Form(form): Form<AuthForm>,
) -> Response {
    state.gate.try_authorize(peer.ip(), &form.auth);
    gate::redirect_to("/")
}
