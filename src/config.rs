//! Command-line flags and the explicit application configuration built from
//! them.
//!
//! All runtime knobs live in [`AppConfig`] and are handed to constructors;
//! nothing is kept in package-level state.

use std::net::IpAddr;
use std::path::PathBuf;
use std::time::Duration;

use clap::{ArgMatches, Parser};
use thiserror::Error;

use crate::agent::Role;

/// Environment variable consulted when `--key` is absent.
pub const API_KEY_ENV: &str = "AGENTSMITH_API_KEY";

/// Default HTTP listen port for GUI mode.
pub const DEFAULT_PORT: u16 = 4177;

/// Directory name appended to the user's home directory for the artifact
/// store.
const APP_DIR: &str = "AgentSmith";

/// Configuration failures that abort startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No API credential was supplied.
    #[error("no API key: pass --key or set {API_KEY_ENV}")]
    MissingApiKey,
}

/// Conversational proxy for chat-completion endpoints, with a diff-edit GUI.
#[derive(Debug, Parser)]
#[command(name = "agentsmith", version, about)]
pub struct Cli {
    /// API credential for the model endpoint.
    #[arg(long)]
    pub key: Option<String>,

    /// Override the artifact store's base directory.
    #[arg(long)]
    pub home: Option<PathBuf>,

    /// Save the chat under this name after the run.
    #[arg(long, value_name = "NAME")]
    pub save: Option<String>,

    /// Load a saved chat by name at startup.
    #[arg(long, value_name = "NAME")]
    pub load: Option<String>,

    /// Override the default system prompt.
    #[arg(long, value_name = "TEXT")]
    pub prompt: Option<String>,

    /// Override the default model.
    #[arg(long, value_name = "NAME")]
    pub model: Option<String>,

    /// Token ceiling recorded in the configuration.
    #[arg(long, default_value_t = 2048)]
    pub max_tokens: u32,

    /// Seed a user turn (repeatable, applied in order).
    #[arg(long, value_name = "TEXT")]
    pub message: Vec<String>,

    /// Seed an assistant turn (repeatable, applied in order).
    #[arg(long, value_name = "TEXT")]
    pub message_assistant: Vec<String>,

    /// Run the HTTP server.
    #[arg(long)]
    pub gui: bool,

    /// Pre-authorize an address, or `all` for every caller (repeatable).
    #[arg(long, value_name = "ADDR|all")]
    pub ip: Vec<String>,

    /// Shared secret for the authentication gate.
    #[arg(long, value_name = "SECRET")]
    pub auth: Option<String>,

    /// HTTP listen port.
    #[arg(long, default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Run the interactive console.
    #[arg(long)]
    pub console: bool,

    /// Expire allowlist entries after this many seconds (default: never).
    #[arg(long, value_name = "SECS")]
    pub ip_ttl: Option<u64>,

    /// Bound each model request to this many seconds (default: no timeout).
    #[arg(long, value_name = "SECS")]
    pub request_timeout: Option<u64>,
}

/// Resolved application configuration.
#[derive(Clone, Debug)]
pub struct AppConfig {
    /// Bearer credential for outbound model calls.
    pub api_key: String,
    /// Base directory for the artifact store.
    pub base_dir: PathBuf,
    /// Model installed on fresh agents.
    pub model: Option<String>,
    /// Configured token ceiling (recorded, not enforced pre-call).
    pub max_tokens: u32,
    /// HTTP listen port.
    pub port: u16,
    /// Shared secret for the access gate, if configured.
    pub auth_secret: Option<String>,
    /// Bypass the allowlist entirely.
    pub allow_all_ips: bool,
    /// Addresses authorized before startup.
    pub allowed_ips: Vec<IpAddr>,
    /// Optional allowlist entry lifetime.
    pub ip_ttl: Option<Duration>,
    /// Optional per-request timeout for model calls.
    pub request_timeout: Option<Duration>,
}

impl AppConfig {
    /// Resolve the configuration from parsed flags and the environment.
    ///
    /// # Errors
    /// [`ConfigError::MissingApiKey`] when neither `--key` nor the
    /// environment provides a credential. This is the only fatal startup
    /// condition.
    pub fn from_cli(cli: &Cli) -> Result<Self, ConfigError> {
        let api_key = cli
            .key
            .clone()
            .or_else(|| std::env::var(API_KEY_ENV).ok())
            .filter(|k| !k.is_empty())
            .ok_or(ConfigError::MissingApiKey)?;

        let base_dir = cli.home.clone().unwrap_or_else(default_base_dir);

        let mut allow_all_ips = false;
        let mut allowed_ips = Vec::new();
        for entry in &cli.ip {
            if entry == "all" {
                tracing::warn!("allowing all incoming connections");
                allow_all_ips = true;
            } else if let Ok(addr) = entry.parse::<IpAddr>() {
                allowed_ips.push(addr);
            } else {
                tracing::warn!(entry = %entry, "ignoring unparseable --ip value");
            }
        }

        Ok(Self {
            api_key,
            base_dir,
            model: cli.model.clone(),
            max_tokens: cli.max_tokens,
            port: cli.port,
            auth_secret: cli.auth.clone(),
            allow_all_ips,
            allowed_ips,
            ip_ttl: cli.ip_ttl.map(Duration::from_secs),
            request_timeout: cli.request_timeout.map(Duration::from_secs),
        })
    }
}

/// Seed turns from `--message` and `--message-assistant`, interleaved in the
/// order the flags appeared on the command line.
///
/// A sequence like `--message a --message-assistant b --message c` seeds
/// a, b, c with their respective roles, so multi-turn histories can be
/// reconstructed flag by flag.
#[must_use]
pub fn seeded_turns(cli: &Cli, matches: &ArgMatches) -> Vec<(Role, String)> {
    let mut turns: Vec<(usize, Role, String)> = Vec::new();
    if let Some(indices) = matches.indices_of("message") {
        turns.extend(
            indices
                .zip(&cli.message)
                .map(|(i, text)| (i, Role::User, text.clone())),
        );
    }
    if let Some(indices) = matches.indices_of("message_assistant") {
        turns.extend(
            indices
                .zip(&cli.message_assistant)
                .map(|(i, text)| (i, Role::Assistant, text.clone())),
        );
    }
    turns.sort_by_key(|(i, _, _)| *i);
    turns.into_iter().map(|(_, role, text)| (role, text)).collect()
}

/// `<home>/AgentSmith`, falling back to the current directory when no home
/// directory can be determined.
fn default_base_dir() -> PathBuf {
    std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .map_or_else(|_| PathBuf::from("."), PathBuf::from)
        .join(APP_DIR)
}
