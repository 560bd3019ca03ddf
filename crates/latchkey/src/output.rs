// SPDX-FileCopyrightText: 2026 Latchkey Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Command results and their two renderings: human text and `--json`.

use chrono::{DateTime, Utc};
use colored::Colorize;
use latchkey_core::{CredentialId, ErrorCode, LatchkeyError};
use serde::Serialize;

/// Human-readable rendering of a command result.
pub trait Render {
    fn human(&self) -> String;
}

#[derive(Debug, Clone, Copy)]
pub struct Printer {
    json: bool,
}

impl Printer {
    pub fn new(json: bool) -> Self {
        Self { json }
    }

    pub fn emit<T: Serialize + Render>(&self, report: &T) {
        if self.json {
            match serde_json::to_string(report) {
                Ok(line) => println!("{line}"),
                Err(e) => eprintln!("{}: failed to encode output: {e}", "error".red()),
            }
        } else {
            println!("{}", report.human());
        }
    }

    pub fn error(&self, err: &LatchkeyError) {
        if self.json {
            let report = ErrorReport::from(err);
            if let Ok(line) = serde_json::to_string(&report) {
                println!("{line}");
                return;
            }
        }
        eprintln!("{}: {err}", "error".red());
    }

    pub fn warn(&self, message: &str) {
        eprintln!("{}: {message}", "warning".yellow());
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorReport {
    pub error: ErrorCode,
    pub message: String,
}

impl From<&LatchkeyError> for ErrorReport {
    fn from(err: &LatchkeyError) -> Self {
        Self {
            error: err.code(),
            message: err.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct InitReport {
    pub ok: bool,
    pub created: bool,
}

impl Render for InitReport {
    fn human(&self) -> String {
        if self.created {
            format!("{} vault created", "ok:".green())
        } else {
            format!("{} vault already exists; passphrase verified", "ok:".green())
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AddReport {
    pub id: CredentialId,
}

impl Render for AddReport {
    fn human(&self) -> String {
        format!("{} added credential {}", "ok:".green(), self.id)
    }
}

#[derive(Debug, Serialize)]
pub struct ListEntry {
    pub id: CredentialId,
    pub site: String,
    pub username: String,
    pub secret: String,
    pub created: DateTime<Utc>,
}

/// Serialized as a bare array of entries.
#[derive(Debug, Serialize)]
#[serde(transparent)]
pub struct ListReport {
    pub entries: Vec<ListEntry>,
}

impl Render for ListReport {
    fn human(&self) -> String {
        if self.entries.is_empty() {
            return "no credentials stored".dimmed().to_string();
        }
        let site_width = self.entries.iter().map(|e| e.site.len()).max().unwrap_or(0);
        let user_width = self.entries.iter().map(|e| e.username.len()).max().unwrap_or(0);
        self.entries
            .iter()
            .map(|e| {
                format!(
                    "{:>4}  {:<site_width$}  {:<user_width$}  {}",
                    e.id.to_string().bold(),
                    e.site,
                    e.username,
                    e.secret
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[derive(Debug, Serialize)]
pub struct GetReport {
    pub id: CredentialId,
    pub site: String,
    pub username: String,
    pub secret: String,
}

impl Render for GetReport {
    /// Just the secret, so it can be piped.
    fn human(&self) -> String {
        self.secret.clone()
    }
}

#[derive(Debug, Serialize)]
pub struct DeleteReport {
    pub ok: bool,
    pub deleted: bool,
}

impl Render for DeleteReport {
    fn human(&self) -> String {
        if self.deleted {
            format!("{} credential deleted", "ok:".green())
        } else {
            format!("{} nothing to delete", "ok:".green())
        }
    }
}

#[derive(Debug, Serialize)]
pub struct FrameResult {
    pub context: String,
    pub hostname: String,
    pub identity_filled: bool,
    pub secret_filled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorReport>,
}

#[derive(Debug, Serialize)]
pub struct FillSummary {
    pub id: CredentialId,
    pub frames: Vec<FrameResult>,
    pub skipped: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub out: Option<String>,
}

fn mark(filled: bool) -> String {
    if filled {
        "filled".green().to_string()
    } else {
        "-".dimmed().to_string()
    }
}

impl Render for FillSummary {
    fn human(&self) -> String {
        let mut lines: Vec<String> = self
            .frames
            .iter()
            .map(|f| match &f.error {
                Some(err) => format!("{} ({}): {} {}", f.context, f.hostname, "failed".red(), err.message),
                None => format!(
                    "{} ({}): identity {}, secret {}",
                    f.context,
                    f.hostname,
                    mark(f.identity_filled),
                    mark(f.secret_filled)
                ),
            })
            .collect();
        for skipped in &self.skipped {
            lines.push(format!("{skipped}: {}", "skipped (cross-origin)".yellow()));
        }
        if let Some(out) = &self.out {
            lines.push(format!("filled page written to {out}"));
        }
        lines.join("\n")
    }
}

#[derive(Debug, Serialize)]
pub struct StatusReport {
    pub database: String,
    pub exists: bool,
    pub credentials: usize,
    pub failed_attempts: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locked_out_secs: Option<u64>,
}

impl Render for StatusReport {
    fn human(&self) -> String {
        if !self.exists {
            return format!(
                "{} no vault at {} (run `latchkey init`)",
                "status:".bold(),
                self.database
            );
        }
        let mut out = format!(
            "{} vault at {}\n  credentials: {}\n  failed attempts: {}",
            "status:".bold(),
            self.database,
            self.credentials,
            self.failed_attempts
        );
        if let Some(secs) = self.locked_out_secs {
            out.push_str(&format!("\n  {}", format!("locked out for {secs}s").red()));
        }
        out
    }
}
