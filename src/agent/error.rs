//! Error types for agent state mutations.

use thiserror::Error;

/// Errors produced by conversation mutations.
#[derive(Debug, Error)]
pub enum AgentError {
    /// A delete index points past the end of the conversation.
    #[error("line index {index} out of range for conversation of length {len}")]
    IndexOutOfRange {
        /// The offending zero-based index.
        index: usize,
        /// Conversation length at the time of the call.
        len: usize,
    },

    /// A numeric segment could not be parsed as an index.
    #[error("invalid line index: {0}")]
    InvalidIndex(String),
}
