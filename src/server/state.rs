//! Application state shared across all request handlers.

use tokio::sync::Mutex;

use crate::agent::Agent;
use crate::gateway::ModelGateway;
use crate::store::FileStore;

use super::gate::AccessGate;

/// Shared application state.
///
/// The agent is a single shared session; the mutex serializes concurrent
/// handlers mutating its conversation, including across the outbound model
/// call so a failure never interleaves with another mutation.
pub struct AppState {
    /// The one agent session served by this process.
    pub agent: Mutex<Agent>,
    /// Client for the remote model endpoint.
    pub gateway: ModelGateway,
    /// Artifact store for chats, prompts, and functions.
    pub store: FileStore,
    /// Access control for gated routes.
    pub gate: AccessGate,
}

impl AppState {
    /// Assemble the state from already-constructed components.
    #[must_use]
    pub fn new(agent: Agent, gateway: ModelGateway, store: FileStore, gate: AccessGate) -> Self {
        Self {
            agent: Mutex::new(agent),
            gateway,
            store,
            gate,
        }
    }
}
