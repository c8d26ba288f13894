//! Interactive console mode: a line-oriented chat REPL over stdin.
//!
//! Plain input is sent as a user turn; `/`-prefixed commands drive the store
//! and the agent's mutation operations. Errors are printed and the loop
//! continues.

use std::io::{self, BufRead, Write};

use crate::agent::{Agent, Role};
use crate::gateway::ModelGateway;
use crate::store::{Category, FileStore};

/// Run the console until EOF or `/quit`.
///
/// `save_default` is the `--save` flag's value, used when `/save` is given
/// without a name.
///
/// # Errors
/// Only stdin/stdout failures abort the loop; agent and model errors are
/// printed and swallowed.
pub async fn run(
    agent: &mut Agent,
    gateway: &ModelGateway,
    store: &FileStore,
    save_default: Option<&str>,
) -> io::Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    println!("agentsmith console - /help for commands, /quit to exit");
    loop {
        print!("> ");
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(command) = line.strip_prefix('/') {
            if !handle_command(agent, store, command, save_default) {
                break;
            }
            continue;
        }

        agent.append_message(Role::User, line);
        match gateway.send(agent).await {
            Ok(reply) => println!("{}", reply.content),
            Err(e) => {
                // The conversation still holds the user turn; drop it so a
                // failed call leaves no partial exchange behind.
                agent.messages.pop();
                eprintln!("error: {e}");
            }
        }
    }
    Ok(())
}

/// Dispatch one `/command`. Returns `false` to exit the loop.
fn handle_command(
    agent: &mut Agent,
    store: &FileStore,
    command: &str,
    save_default: Option<&str>,
) -> bool {
    let (verb, rest) = match command.split_once(' ') {
        Some((v, r)) => (v, r.trim()),
        None => (command, ""),
    };

    match verb {
        "quit" | "exit" => return false,
        "help" => {
            println!(
                "/save [name]  /load <name>  /list  /delete <name>\n\
                 /prompt <text>  /reset  /drop <indices>  /history  /quit"
            );
        }
        "save" => {
            let name = if rest.is_empty() { save_default } else { Some(rest) };
            match store.save(Category::Chats, &agent.messages, name) {
                Ok(path) => println!("saved {}", path.display()),
                Err(e) => eprintln!("error: {e}"),
            }
        }
        "load" => match store.load_chat(rest) {
            Ok(messages) => {
                // Loading always starts from a clean token/model state.
                agent.reset();
                agent.messages = messages;
                println!("loaded {} messages", agent.messages.len());
            }
            Err(e) => eprintln!("error: {e}"),
        },
        "list" => match store.list(Category::Chats) {
            Ok(names) => {
                println!("Files:");
                for name in names {
                    println!("{name}");
                }
            }
            Err(e) => eprintln!("error: {e}"),
        },
        "delete" => match store.delete(Category::Chats, rest) {
            Ok(()) => println!("deleted"),
            Err(e) => eprintln!("error: {e}"),
        },
        "prompt" => {
            agent.set_prompt(if rest.is_empty() { None } else { Some(rest) });
            println!("prompt set, history cleared");
        }
        "reset" => {
            agent.reset();
            println!("agent reset");
        }
        "drop" => match agent.delete_lines(rest) {
            Ok(()) => println!("{} messages remain", agent.messages.len()),
            Err(e) => eprintln!("error: {e}"),
        },
        "history" => {
            for (i, msg) in agent.messages.iter().enumerate() {
                println!("{i}: [{}] {}", msg.role, msg.content);
            }
            println!("tokens (last response): {}", agent.token_count);
        }
        other => eprintln!("unknown command: /{other}"),
    }
    true
}
