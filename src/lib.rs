//! # jsonkv
//!
//! An embedded key-value store run as a background worker:
//! - Data grouped into named key families
//! - One JSON file per family, rewritten atomically on every write
//! - A single worker thread owns all state; no locks
//! - Clients talk to it only through in-process channels
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    Clients (any thread)                      │
//! └──────────┬──────────────────▲──────────────────▲────────────┘
//!     requests│         responses│ (timeout, drop)  │ bootstrap (once)
//! ┌──────────▼──────────────────┴──────────────────┴────────────┐
//! │                      Serving Loop                            │
//! │                 (single owner, one thread)                   │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!                       ▼
//!                ┌─────────────┐
//!                │  Processor  │
//!                └──────┬──────┘
//!          ┌────────────┴────────────┐
//!          ▼                         ▼
//!   ┌─────────────┐          ┌──────────────┐
//!   │    Table    │          │ FamilyStore  │
//!   │ (in memory) │          │ (<fam>.json) │
//!   └─────────────┘          └──────────────┘
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use std::time::Duration;
//! use jsonkv::{Request, StoreHandle};
//!
//! let store = StoreHandle::spawn(["--cfg=/etc/jsonkv.json"])?;
//! store.bootstrap(Duration::from_secs(5))?;
//! store.request(Request::set("users", "alice", "admin"), Duration::from_secs(5))?;
//! let value = store.request(Request::get("users", "alice"), Duration::from_secs(5))?;
//! assert_eq!(value, vec!["\"admin\"".to_string()]);
//! store.request(Request::quit(), Duration::from_secs(5))?;
//! # Ok::<(), jsonkv::JsonKvError>(())
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod table;
pub mod storage;
pub mod protocol;
pub mod processor;
pub mod server;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{JsonKvError, Result};
pub use config::Config;
pub use processor::Processor;
pub use protocol::{Action, Request, Response};
pub use server::{handle_output, listen, serve, LoopExit, StoreHandle};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of jsonkv
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
