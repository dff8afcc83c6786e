//! Error types for jsonkv
//!
//! Provides a unified error type for all operations. The `Display` text of
//! an error is what a failed response carries as its last line.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias using JsonKvError
pub type Result<T> = std::result::Result<T, JsonKvError>;

/// Unified error type for jsonkv operations
#[derive(Debug, Error)]
pub enum JsonKvError {
    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("you must provide path to config with --cfg=[[/path/to/file.json]]")]
    MissingConfigArg,

    #[error("Configuration error: {0}")]
    Config(String),

    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{} is not a directory", .0.display())]
    NotADirectory(PathBuf),

    #[error("Invalid key family name: {0:?}")]
    InvalidFamily(String),

    // -------------------------------------------------------------------------
    // Serialization Errors
    // -------------------------------------------------------------------------
    #[error("Decode error in {}: {source}", .path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Encode error: {0}")]
    Encode(#[source] serde_json::Error),

    // -------------------------------------------------------------------------
    // Protocol Errors
    // -------------------------------------------------------------------------
    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("unknown action: {0}")]
    UnknownAction(String),

    /// A failed response, surfaced through the client helpers
    #[error("{0}")]
    Remote(String),

    // -------------------------------------------------------------------------
    // Channel Errors
    // -------------------------------------------------------------------------
    #[error("no response from jsonkv")]
    DeliveryTimeout,

    #[error("Channel disconnected: {0}")]
    Disconnected(String),
}
