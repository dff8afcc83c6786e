//! Response definitions
//!
//! Represents responses to clients.

use serde::{Deserialize, Serialize};

/// A response from the serving loop
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    /// Whether the request succeeded
    #[serde(rename = "StatusOk")]
    pub status_ok: bool,

    /// Informational lines followed by the result (or error) line
    #[serde(rename = "Message")]
    pub message: Vec<String>,
}

impl Response {
    /// Create a successful response
    pub fn ok(message: Vec<String>) -> Self {
        Self {
            status_ok: true,
            message,
        }
    }

    /// Create a successful response with a single result line
    pub fn ok_line(line: impl Into<String>) -> Self {
        Self::ok(vec![line.into()])
    }

    /// Create a failed response: `lines` then the error text as last line
    pub fn error(mut lines: Vec<String>, error: impl ToString) -> Self {
        lines.push(error.to_string());
        Self {
            status_ok: false,
            message: lines,
        }
    }

    /// The result payload, or the error text of a failed response
    pub fn last_line(&self) -> Option<&str> {
        self.message.last().map(String::as_str)
    }

    /// All lines but the last
    pub fn info_lines(&self) -> &[String] {
        match self.message.split_last() {
            Some((_, rest)) => rest,
            None => &[],
        }
    }
}
