//! HTTP server for GUI mode.
//!
//! All application routes pass through the access gate; `/auth/` and
//! `/static/` stay open so unauthenticated callers can reach the challenge.

pub mod gate;
pub mod pages;
pub mod routes;
pub mod state;

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tower_http::trace::TraceLayer;

pub use gate::AccessGate;
pub use routes::create_router;
pub use state::AppState;

/// Start the HTTP server on `0.0.0.0:<port>` and run until ctrl-c.
///
/// # Errors
/// Returns an error if the listener cannot bind or the server fails.
pub async fn run_server(
    state: Arc<AppState>,
    port: u16,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    run_server_with_shutdown(state, port, async {
        let _ = tokio::signal::ctrl_c().await;
    })
    .await
}

/// Start the HTTP server with a caller-supplied shutdown future.
///
/// # Errors
/// Returns an error if the listener cannot bind or the server fails.
pub async fn run_server_with_shutdown<F>(
    state: Arc<AppState>,
    port: u16,
    shutdown_signal: F,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>>
where
    F: Future<Output = ()> + Send + 'static,
{
    let app: Router = create_router(state).layer(TraceLayer::new_for_http());

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("GUI listening on http://127.0.0.1:{port} (ctrl-click link to open)");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal)
    .await?;

    Ok(())
}
