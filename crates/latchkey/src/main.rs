// SPDX-FileCopyrightText: 2026 Latchkey Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Latchkey - a local, single-user secrets vault with form autofill.
//!
//! This is the binary entry point.

mod commands;
mod output;
mod shell;

use std::io::{BufReader, IsTerminal};
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use latchkey_config::model::LatchkeyConfig;
use latchkey_core::{CredentialId, LatchkeyError};
use latchkey_vault::{get_vault_passphrase, get_vault_passphrase_with_confirm, read_secret};

use crate::output::Printer;

/// Latchkey - a local, single-user secrets vault with form autofill.
#[derive(Parser, Debug)]
#[command(name = "latchkey", version, about, long_about = None)]
struct Cli {
    /// Load configuration from this file instead of the XDG hierarchy.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Emit machine-readable JSON.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Create the vault and register the master passphrase.
    Init,
    /// Store a credential.
    Add {
        #[arg(long)]
        site: String,
        #[arg(long)]
        username: String,
        /// Read the secret from the first line of stdin instead of prompting.
        #[arg(long)]
        secret_stdin: bool,
    },
    /// List credentials, newest first. Secrets are masked unless revealed.
    List {
        #[arg(long)]
        reveal: bool,
    },
    /// Print the secret of one credential.
    Get { id: CredentialId },
    /// Delete a credential.
    Delete { id: CredentialId },
    /// Fill every frame of a page snapshot with one credential.
    Fill {
        id: CredentialId,
        /// Page snapshot JSON to fill.
        #[arg(long, value_name = "PATH")]
        page: PathBuf,
        /// Write the filled page here.
        #[arg(long, value_name = "PATH")]
        out: Option<PathBuf>,
    },
    /// Show whether a vault exists, how many records it holds, and lockout state.
    Status,
    /// Launch an interactive session.
    Shell,
}

fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("latchkey={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: Option<&PathBuf>) -> Option<LatchkeyConfig> {
    let loaded = match path {
        Some(path) => latchkey_config::load_and_validate_path(path),
        None => latchkey_config::load_and_validate(),
    };
    match loaded {
        Ok(config) => Some(config),
        Err(errors) => {
            latchkey_config::render_errors(&errors);
            None
        }
    }
}

async fn run(command: Commands, config: LatchkeyConfig, printer: Printer) -> Result<(), LatchkeyError> {
    match command {
        Commands::Init => {
            let mut vault = commands::open_vault(&config).await?;
            let passphrase = if vault.exists().await? {
                get_vault_passphrase()?
            } else {
                get_vault_passphrase_with_confirm()?
            };
            printer.emit(&commands::init(&mut vault, &passphrase).await?);
            vault.close().await
        }
        Commands::Add {
            site,
            username,
            secret_stdin,
        } => {
            let mut vault = commands::open_vault(&config).await?;
            commands::unlock(&mut vault, &get_vault_passphrase()?).await?;
            let secret = read_secret(secret_stdin, BufReader::new(std::io::stdin()))?;
            printer.emit(&commands::add(&vault, &site, &username, &secret).await?);
            vault.close().await
        }
        Commands::List { reveal } => {
            let mut vault = commands::open_vault(&config).await?;
            commands::unlock(&mut vault, &get_vault_passphrase()?).await?;
            let (report, unreadable) = commands::list(&vault, reveal).await?;
            commands::log_unreadable(&unreadable);
            for err in &unreadable {
                printer.warn(&err.to_string());
            }
            printer.emit(&report);
            vault.close().await
        }
        Commands::Get { id } => {
            let mut vault = commands::open_vault(&config).await?;
            commands::unlock(&mut vault, &get_vault_passphrase()?).await?;
            printer.emit(&commands::get(&vault, id).await?);
            vault.close().await
        }
        Commands::Delete { id } => {
            let vault = commands::open_vault(&config).await?;
            printer.emit(&commands::delete(&vault, id).await?);
            vault.close().await
        }
        Commands::Fill { id, page, out } => {
            let mut vault = commands::open_vault(&config).await?;
            commands::unlock(&mut vault, &get_vault_passphrase()?).await?;
            let summary = commands::fill_file(&vault, &config, id, &page, out.as_deref()).await?;
            printer.emit(&summary);
            vault.close().await
        }
        Commands::Status => {
            printer.emit(&commands::status(&config).await?);
            Ok(())
        }
        Commands::Shell => {
            if !std::io::stdin().is_terminal() {
                return Err(LatchkeyError::Config(
                    "`latchkey shell` needs an interactive terminal".to_string(),
                ));
            }
            shell::run_shell(config, printer).await
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();
    let printer = Printer::new(cli.json);

    let Some(config) = load_config(cli.config.as_ref()) else {
        std::process::exit(2);
    };
    init_tracing(&config.general.log_level);

    if let Err(e) = run(cli.command, config, printer).await {
        printer.error(&e);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn global_flags_work_after_subcommand() {
        let cli = Cli::try_parse_from(["latchkey", "list", "--reveal", "--json"]).unwrap();
        assert!(cli.json);
        assert!(matches!(cli.command, Commands::List { reveal: true }));
    }

    #[test]
    fn ids_are_parsed_as_credential_ids() {
        let cli = Cli::try_parse_from(["latchkey", "get", "12"]).unwrap();
        assert!(matches!(cli.command, Commands::Get { id: CredentialId(12) }));
        assert!(Cli::try_parse_from(["latchkey", "get", "twelve"]).is_err());
    }

    #[test]
    fn add_requires_site_and_username() {
        assert!(Cli::try_parse_from(["latchkey", "add", "--site", "a.com"]).is_err());
        let cli = Cli::try_parse_from([
            "latchkey", "add", "--site", "a.com", "--username", "u", "--secret-stdin",
        ])
        .unwrap();
        assert!(matches!(cli.command, Commands::Add { secret_stdin: true, .. }));
    }
}
