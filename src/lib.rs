//! Conversational proxy for chat-completion endpoints.
//!
//! Maintains a rolling message history for one agent session, forwards it to
//! a remote model endpoint, and returns the assistant's reply; conversations
//! can be persisted to and replayed from disk, and an IP-allowlist gate
//! guards the HTTP surface.

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]

pub mod agent;
pub mod config;
pub mod console;
pub mod diff;
pub mod gateway;
pub mod server;
pub mod store;
pub mod workflow;
