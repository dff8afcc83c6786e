//! Configuration for jsonkv
//!
//! Centralized configuration with sensible defaults, plus the startup glue
//! that turns `--cfg=<path>` and a JSON config file into a [`Config`].
//!
//! ## Config File Format
//! ```text
//! {
//!     "JsonsPath": "/var/lib/jsonkv",
//!     "ReceivingResponseChannelTimeout": 5
//! }
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::{JsonKvError, Result};

/// Key that conventionally triggers the poison hook in tests
pub const POISON_KEY: &str = "ThisKeyWillTriggerTimeoutOnSet";

/// Command-line flag carrying the config file path
pub const CFG_FLAG: &str = "--cfg";

/// Main configuration for a jsonkv instance
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Storage Configuration
    // -------------------------------------------------------------------------
    /// Directory holding one `<family>.json` file per key family
    pub jsons_path: PathBuf,

    // -------------------------------------------------------------------------
    // Delivery Configuration
    // -------------------------------------------------------------------------
    /// How long the serving loop waits for a consumer to take a response
    /// before dropping it
    pub response_timeout: Duration,

    // -------------------------------------------------------------------------
    // Diagnostics
    // -------------------------------------------------------------------------
    /// Opt-in slow-processing hook, never set from a config file
    pub poison: Option<PoisonHook>,
}

/// Stalls processing of a `set` on a designated key
///
/// Only exists to exercise the delivery timeout path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoisonHook {
    pub key: String,
    pub delay: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            jsons_path: PathBuf::from("./jsonkv_data"),
            response_timeout: Duration::from_secs(5),
            poison: None,
        }
    }
}

/// On-disk shape of the config file
#[derive(Debug, Deserialize)]
struct ConfigFile {
    #[serde(rename = "JsonsPath")]
    jsons_path: String,

    #[serde(rename = "ReceivingResponseChannelTimeout")]
    receiving_response_channel_timeout: u64,
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Read a JSON config file
    ///
    /// Both `JsonsPath` and `ReceivingResponseChannelTimeout` are required;
    /// other fields are ignored.
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path).map_err(|e| {
            JsonKvError::Config(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_json(&raw)
            .map_err(|e| JsonKvError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Parse config from a JSON document
    pub fn from_json(raw: &str) -> std::result::Result<Self, serde_json::Error> {
        let file: ConfigFile = serde_json::from_str(raw)?;
        Ok(Self::builder()
            .jsons_path(file.jsons_path)
            .response_timeout(Duration::from_secs(file.receiving_response_channel_timeout))
            .build())
    }
}

/// Extract the config file path from `--cfg=<path>` style arguments
///
/// Arguments without `=` or with another flag name are ignored. The last
/// `--cfg=` wins.
pub fn config_path_from_args<I, S>(args: I) -> Result<PathBuf>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut found = None;
    for arg in args {
        if let Some((flag, value)) = arg.as_ref().split_once('=') {
            if flag == CFG_FLAG && !value.is_empty() {
                found = Some(PathBuf::from(value));
            }
        }
    }
    found.ok_or(JsonKvError::MissingConfigArg)
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the directory holding family files
    pub fn jsons_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.jsons_path = path.into();
        self
    }

    /// Set the response delivery timeout
    pub fn response_timeout(mut self, timeout: Duration) -> Self {
        self.config.response_timeout = timeout;
        self
    }

    /// Stall every `set` on `key` for `delay` before applying it
    pub fn poison_key(mut self, key: impl Into<String>, delay: Duration) -> Self {
        self.config.poison = Some(PoisonHook {
            key: key.into(),
            delay,
        });
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
