// SPDX-FileCopyrightText: 2026 Latchkey Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Site-specific field selectors.
//!
//! An override names the exact identity and/or secret field for a host and
//! its subdomains. A selector that is present is authoritative for its half;
//! an absent one leaves that half to the heuristics.

use latchkey_config::model::AutofillConfig;
use latchkey_core::{FieldSelector, LatchkeyError};

/// Overrides compiled into the binary: `(host, identity element id, secret element id)`.
const BUILTIN_OVERRIDES: &[(&str, &str, &str)] = &[("codechef.com", "edit-name", "edit-pass")];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteOverride {
    pub host: String,
    pub identity: Option<FieldSelector>,
    pub secret: Option<FieldSelector>,
}

impl SiteOverride {
    /// Whether `hostname` is this host or one of its subdomains.
    pub fn matches_host(&self, hostname: &str) -> bool {
        let hostname = hostname.trim_end_matches('.').to_ascii_lowercase();
        hostname == self.host
            || hostname
                .strip_suffix(&self.host)
                .is_some_and(|prefix| prefix.ends_with('.'))
    }
}

/// User overrides plus built-ins. User entries always win.
#[derive(Debug, Clone, Default)]
pub struct OverrideSet {
    user: Vec<SiteOverride>,
    builtin: Vec<SiteOverride>,
}

impl OverrideSet {
    /// Overrides with no built-ins and no user entries.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn builtin() -> Self {
        Self {
            user: Vec::new(),
            builtin: builtin_overrides(),
        }
    }

    /// Compile `[autofill]` settings. Selectors are parsed here, so a bad
    /// selector fails at startup rather than at fill time.
    pub fn from_config(config: &AutofillConfig) -> Result<Self, LatchkeyError> {
        let user = config
            .overrides
            .iter()
            .map(|entry| {
                Ok(SiteOverride {
                    host: normalize_host(&entry.host),
                    identity: entry.identity.as_deref().map(str::parse).transpose()?,
                    secret: entry.secret.as_deref().map(str::parse).transpose()?,
                })
            })
            .collect::<Result<Vec<_>, LatchkeyError>>()?;

        let builtin = if config.builtin_overrides {
            builtin_overrides()
        } else {
            Vec::new()
        };
        Ok(Self { user, builtin })
    }

    /// The override for `hostname`: the most specific user entry if any
    /// matches, otherwise the most specific built-in.
    pub fn lookup(&self, hostname: &str) -> Option<&SiteOverride> {
        most_specific(&self.user, hostname).or_else(|| most_specific(&self.builtin, hostname))
    }

    pub fn len(&self) -> usize {
        self.user.len() + self.builtin.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn most_specific<'a>(entries: &'a [SiteOverride], hostname: &str) -> Option<&'a SiteOverride> {
    entries
        .iter()
        .filter(|o| o.matches_host(hostname))
        .max_by_key(|o| o.host.len())
}

fn normalize_host(host: &str) -> String {
    host.trim().trim_end_matches('.').to_ascii_lowercase()
}

fn builtin_overrides() -> Vec<SiteOverride> {
    BUILTIN_OVERRIDES
        .iter()
        .map(|(host, identity, secret)| SiteOverride {
            host: (*host).to_string(),
            identity: Some(FieldSelector::Id((*identity).to_string())),
            secret: Some(FieldSelector::Id((*secret).to_string())),
        })
        .collect()
}
