// SPDX-FileCopyrightText: 2026 Latchkey Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `latchkey shell` command implementation.
//!
//! Authenticates once, then reads commands with readline history until
//! `quit`. `lock` destroys the session key; `unlock` prompts again.

use std::path::PathBuf;

use colored::Colorize;
use latchkey_config::model::LatchkeyConfig;
use latchkey_core::{CredentialId, LatchkeyError};
use latchkey_vault::{get_vault_passphrase, Vault};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use secrecy::SecretString;

use crate::commands;
use crate::output::Printer;

/// One parsed shell line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    Add { site: String, username: String },
    List { reveal: bool },
    Get(CredentialId),
    Delete(CredentialId),
    Fill {
        id: CredentialId,
        page: PathBuf,
        out: Option<PathBuf>,
    },
    Status,
    Lock,
    Unlock,
    Help,
    Quit,
}

const HELP: &str = "\
commands:
  add <site> <username>          store a credential (secret is prompted)
  list [--reveal]                list credentials, newest first
  get <id>                       print a secret
  delete <id>                    delete a credential
  fill <id> <page.json> [out]    fill a page snapshot
  status                         vault status
  lock | unlock                  end or restart the session
  help | quit";

fn parse_id(arg: &str) -> Result<CredentialId, String> {
    arg.parse().map_err(|e: LatchkeyError| e.to_string())
}

/// Parse one non-empty shell line.
pub fn parse_line(line: &str) -> Result<ShellCommand, String> {
    let mut words = line.split_whitespace();
    let Some(verb) = words.next() else {
        return Err("empty command".to_string());
    };
    let args: Vec<&str> = words.collect();

    let command = match (verb, args.as_slice()) {
        ("add", [site, username]) => ShellCommand::Add {
            site: (*site).to_string(),
            username: (*username).to_string(),
        },
        ("add", _) => return Err("usage: add <site> <username>".to_string()),
        ("list" | "ls", []) => ShellCommand::List { reveal: false },
        ("list" | "ls", ["--reveal"]) => ShellCommand::List { reveal: true },
        ("get", [id]) => ShellCommand::Get(parse_id(id)?),
        ("delete" | "rm", [id]) => ShellCommand::Delete(parse_id(id)?),
        ("fill", [id, page, rest @ ..]) if rest.len() <= 1 => ShellCommand::Fill {
            id: parse_id(id)?,
            page: PathBuf::from(page),
            out: rest.first().map(PathBuf::from),
        },
        ("fill", _) => return Err("usage: fill <id> <page.json> [out.json]".to_string()),
        ("status", []) => ShellCommand::Status,
        ("lock", []) => ShellCommand::Lock,
        ("unlock", []) => ShellCommand::Unlock,
        ("help" | "?", _) => ShellCommand::Help,
        ("quit" | "exit" | "/quit" | "/exit", _) => ShellCommand::Quit,
        (other, _) => return Err(format!("unknown command `{other}` (try `help`)")),
    };
    Ok(command)
}

/// Runs the `latchkey shell` interactive REPL.
pub async fn run_shell(config: LatchkeyConfig, printer: Printer) -> Result<(), LatchkeyError> {
    let mut vault = commands::open_vault(&config).await?;
    let passphrase = get_vault_passphrase()?;
    commands::unlock(&mut vault, &passphrase).await?;
    drop(passphrase);

    let mut rl = DefaultEditor::new()
        .map_err(|e| LatchkeyError::Internal(format!("failed to initialize readline: {e}")))?;

    println!("{}", "latchkey shell".bold().green());
    println!("Type {} for commands, {} to exit.\n", "help".yellow(), "quit".yellow());

    loop {
        let prompt = if vault.is_unlocked() {
            format!("{}> ", "latchkey".green())
        } else {
            format!("{}> ", "latchkey (locked)".yellow())
        };
        match rl.readline(&prompt) {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(trimmed);

                let command = match parse_line(trimmed) {
                    Ok(command) => command,
                    Err(message) => {
                        eprintln!("{}: {message}", "error".red());
                        continue;
                    }
                };
                if command == ShellCommand::Quit {
                    break;
                }
                if let Err(e) = handle(&mut vault, &config, printer, command).await {
                    printer.error(&e);
                    if e.is_fatal() {
                        break;
                    }
                }
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(e) => {
                eprintln!("{}: {e}", "error".red());
                break;
            }
        }
    }

    vault.close().await?;
    println!("{}", "vault locked, goodbye".dimmed());
    Ok(())
}

async fn handle(
    vault: &mut Vault,
    config: &LatchkeyConfig,
    printer: Printer,
    command: ShellCommand,
) -> Result<(), LatchkeyError> {
    match command {
        ShellCommand::Add { site, username } => {
            let secret: SecretString = rpassword::prompt_password("Secret: ")
                .map_err(|e| LatchkeyError::Internal(format!("failed to read secret: {e}")))?
                .into();
            printer.emit(&commands::add(vault, &site, &username, &secret).await?);
        }
        ShellCommand::List { reveal } => {
            let (report, unreadable) = commands::list(vault, reveal).await?;
            commands::log_unreadable(&unreadable);
            for err in &unreadable {
                printer.warn(&err.to_string());
            }
            printer.emit(&report);
        }
        ShellCommand::Get(id) => printer.emit(&commands::get(vault, id).await?),
        ShellCommand::Delete(id) => printer.emit(&commands::delete(vault, id).await?),
        ShellCommand::Fill { id, page, out } => {
            let summary = commands::fill_file(vault, config, id, &page, out.as_deref()).await?;
            printer.emit(&summary);
        }
        ShellCommand::Status => printer.emit(&commands::status(config).await?),
        ShellCommand::Lock => {
            if vault.lock() {
                println!("{}", "locked".dimmed());
            }
        }
        ShellCommand::Unlock => {
            let passphrase = get_vault_passphrase()?;
            commands::unlock(vault, &passphrase).await?;
            println!("{}", "unlocked".green());
        }
        ShellCommand::Help => println!("{HELP}"),
        ShellCommand::Quit => {}
    }
    Ok(())
}
