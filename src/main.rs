//! Binary entrypoint: resolve configuration, seed the agent, and dispatch to
//! GUI or console mode.

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::{CommandFactory, FromArgMatches};

use agentsmith::agent::{Agent, Role};
use agentsmith::config::{self, AppConfig, Cli};
use agentsmith::console;
use agentsmith::gateway::ModelGateway;
use agentsmith::server::{AccessGate, AppState, run_server};
use agentsmith::store::{Category, FileStore};

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let matches = Cli::command().get_matches();
    let cli = Cli::from_arg_matches(&matches).unwrap_or_else(|e| e.exit());
    let seeds = config::seeded_turns(&cli, &matches);
    let config = match AppConfig::from_cli(&cli) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("{e}");
            return ExitCode::from(1);
        }
    };

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            tracing::error!("failed to create runtime: {e}");
            return ExitCode::from(1);
        }
    };

    if let Err(e) = rt.block_on(run(cli, config, seeds)) {
        tracing::error!("{e:#}");
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

async fn run(cli: Cli, config: AppConfig, seeds: Vec<(Role, String)>) -> anyhow::Result<()> {
    let store = FileStore::new(&config.base_dir);
    let gateway =
        ModelGateway::new(config.request_timeout).context("failed to build model gateway")?;

    let mut agent = Agent::new(config.api_key.clone());
    if let Some(model) = &config.model {
        agent = agent.with_model(model);
    }

    // Startup actions: load a saved chat, override the prompt, then seed
    // turns in the order their flags appeared.
    if let Some(name) = &cli.load {
        let messages = store
            .load_chat(name)
            .with_context(|| format!("failed to load chat '{name}'"))?;
        agent.reset();
        agent.messages = messages;
    }
    if let Some(text) = &cli.prompt {
        agent.set_prompt(Some(text));
    }
    for (role, text) in seeds {
        agent.append_message(role, text);
    }

    if cli.gui {
        let gate = AccessGate::new(
            config.allow_all_ips,
            config.auth_secret.clone(),
            &config.allowed_ips,
            config.ip_ttl,
        );
        let state = Arc::new(AppState::new(agent, gateway, store, gate));
        run_server(state, config.port)
            .await
            .map_err(|e| anyhow::anyhow!("server error: {e}"))?;
        return Ok(());
    }

    if cli.console {
        console::run(&mut agent, &gateway, &store, cli.save.as_deref()).await?;
    } else if agent.messages.iter().any(|m| m.role == Role::User) {
        // One-shot: seeded turns, no interactive mode requested.
        let reply = gateway.send(&mut agent).await?;
        println!("{}", reply.content);
    } else {
        println!("Nothing to do: pass --gui, --console, or seed a --message.");
    }

    if let Some(name) = &cli.save {
        let path = store.save(Category::Chats, &agent.messages, Some(name))?;
        tracing::info!(path = %path.display(), "chat saved");
    }
    Ok(())
}
