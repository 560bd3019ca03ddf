// SPDX-FileCopyrightText: 2026 Latchkey Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types shared by the vault, the autofill engine, and the host.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::error::LatchkeyError;

/// Immutable external handle of a stored credential.
///
/// Issued from a monotonic sequence and never reused, even after the
/// credential it named is deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CredentialId(pub u64);

impl fmt::Display for CredentialId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for CredentialId {
    type Err = LatchkeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u64>()
            .map(CredentialId)
            .map_err(|_| LatchkeyError::Config(format!("`{s}` is not a credential id")))
    }
}

/// Opaque reference to one input element inside a document context.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldHandle(pub usize);

/// What the targeting engine can observe about one input element.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    #[serde(default)]
    pub handle: FieldHandle,
    /// The `type` attribute as written in markup; `None` behaves as `text`.
    #[serde(default, rename = "type")]
    pub input_type: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub placeholder: Option<String>,
    /// Whether the element has a non-zero rendered box.
    #[serde(default = "default_true")]
    pub visible: bool,
    #[serde(default)]
    pub disabled: bool,
}

fn default_true() -> bool {
    true
}

impl FieldDescriptor {
    /// Effective input type, lowercased, defaulting to `text` as browsers do.
    pub fn effective_type(&self) -> String {
        self.input_type
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .unwrap_or("text")
            .to_ascii_lowercase()
    }

    /// Visible and not disabled.
    pub fn is_interactive(&self) -> bool {
        self.visible && !self.disabled
    }
}

/// Synthetic events dispatched after a value is committed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum DomEvent {
    Input,
    Change,
}

/// An exact field selector used by site overrides.
///
/// Accepted forms: `#element-id`, `name=field-name`, and
/// `[name="field-name"]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FieldSelector {
    Id(String),
    Name(String),
}

impl FieldSelector {
    /// Whether the selector addresses the given field.
    pub fn matches(&self, field: &FieldDescriptor) -> bool {
        match self {
            Self::Id(id) => field.id.as_deref() == Some(id.as_str()),
            Self::Name(name) => field.name.as_deref() == Some(name.as_str()),
        }
    }
}

impl FromStr for FieldSelector {
    type Err = LatchkeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let invalid = || {
            LatchkeyError::Config(format!(
                "invalid field selector `{s}` (expected `#id` or `name=value`)"
            ))
        };

        if let Some(id) = s.strip_prefix('#') {
            if id.is_empty() || id.contains(char::is_whitespace) {
                return Err(invalid());
            }
            return Ok(Self::Id(id.to_string()));
        }

        let body = s
            .strip_prefix('[')
            .and_then(|rest| rest.strip_suffix(']'))
            .unwrap_or(s);
        let value = body.strip_prefix("name=").ok_or_else(invalid)?;
        let value = value.trim_matches(|c| c == '"' || c == '\'');
        if value.is_empty() {
            return Err(invalid());
        }
        Ok(Self::Name(value.to_string()))
    }
}

impl fmt::Display for FieldSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(id) => write!(f, "#{id}"),
            Self::Name(name) => write!(f, "name={name}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn selector_parses_id_form() {
        assert_eq!(
            "#edit-name".parse::<FieldSelector>().unwrap(),
            FieldSelector::Id("edit-name".into())
        );
    }

    #[test]
    fn selector_parses_name_forms() {
        let expected = FieldSelector::Name("login".into());
        assert_eq!("name=login".parse::<FieldSelector>().unwrap(), expected);
        assert_eq!("[name=\"login\"]".parse::<FieldSelector>().unwrap(), expected);
        assert_eq!("[name='login']".parse::<FieldSelector>().unwrap(), expected);
    }

    #[test]
    fn selector_rejects_garbage() {
        for bad in ["", "#", "input.login", "name=", "# spaced id"] {
            assert!(bad.parse::<FieldSelector>().is_err(), "{bad:?} should fail");
        }
    }

    #[test]
    fn missing_type_behaves_as_text() {
        let field = FieldDescriptor::default();
        assert_eq!(field.effective_type(), "text");

        let field = FieldDescriptor {
            input_type: Some("EMAIL".into()),
            ..Default::default()
        };
        assert_eq!(field.effective_type(), "email");
    }

    #[test]
    fn descriptor_deserializes_with_defaults() {
        let field: FieldDescriptor =
            serde_json::from_str(r#"{"handle": 3, "type": "password"}"#).unwrap();
        assert_eq!(field.handle, FieldHandle(3));
        assert!(field.visible);
        assert!(!field.disabled);
        assert!(field.is_interactive());
    }

    #[test]
    fn dom_event_names_are_lowercase() {
        assert_eq!(DomEvent::Input.to_string(), "input");
        assert_eq!(DomEvent::Change.to_string(), "change");
    }

    proptest! {
        #[test]
        fn credential_id_display_parses_back(n in any::<u64>()) {
            let id = CredentialId(n);
            prop_assert_eq!(id.to_string().parse::<CredentialId>().unwrap(), id);
        }
    }
}
