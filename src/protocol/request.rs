//! Request definitions
//!
//! Represents requests from clients.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Requested action
///
/// Actions arrive as plain strings; anything unrecognized is kept verbatim
/// in [`Action::Unknown`] so the processor can report it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Action {
    Set,
    Get,
    List,
    ListKeys,
    Quit,
    Unknown(String),
}

impl Action {
    pub fn as_str(&self) -> &str {
        match self {
            Action::Set => "set",
            Action::Get => "get",
            Action::List => "list",
            Action::ListKeys => "listkeys",
            Action::Quit => "quit",
            Action::Unknown(name) => name.as_str(),
        }
    }
}

impl From<&str> for Action {
    fn from(name: &str) -> Self {
        match name {
            "set" => Action::Set,
            "get" => Action::Get,
            "list" => Action::List,
            "listkeys" => Action::ListKeys,
            "quit" => Action::Quit,
            other => Action::Unknown(other.to_string()),
        }
    }
}

impl From<String> for Action {
    fn from(name: String) -> Self {
        Action::from(name.as_str())
    }
}

impl From<Action> for String {
    fn from(action: Action) -> Self {
        action.as_str().to_string()
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A request for the serving loop
///
/// Fields an action does not use are left empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Request {
    #[serde(rename = "Action")]
    pub action: Action,

    #[serde(rename = "KeyFamily", default)]
    pub key_family: String,

    #[serde(rename = "Key", default)]
    pub key: String,

    #[serde(rename = "Value", default)]
    pub value: String,
}

impl Request {
    fn bare(action: Action) -> Self {
        Self {
            action,
            key_family: String::new(),
            key: String::new(),
            value: String::new(),
        }
    }

    /// Set `key` to `value` in `family`
    pub fn set(
        family: impl Into<String>,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            key_family: family.into(),
            key: key.into(),
            value: value.into(),
            ..Self::bare(Action::Set)
        }
    }

    /// Get `key` from `family`
    pub fn get(family: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            key_family: family.into(),
            key: key.into(),
            ..Self::bare(Action::Get)
        }
    }

    /// List all family names
    pub fn list() -> Self {
        Self::bare(Action::List)
    }

    /// List keys of `family`
    pub fn list_keys(family: impl Into<String>) -> Self {
        Self {
            key_family: family.into(),
            ..Self::bare(Action::ListKeys)
        }
    }

    /// Stop the serving loop
    pub fn quit() -> Self {
        Self::bare(Action::Quit)
    }

    /// A request with an arbitrary action string
    pub fn with_action(action: impl Into<String>) -> Self {
        Self::bare(Action::from(action.into()))
    }
}
