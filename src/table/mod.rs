//! Table Module
//!
//! In-memory state of every key family.
//!
//! ## Responsibilities
//! - Source of truth while the serving loop runs
//! - Rebuilt from family files at startup
//! - Owned by exactly one worker, so no interior locking
//!
//! ## Data Structure Choice
//! Nested BTreeMaps:
//! - Sorted keys give deterministic family files and listings
//! - Families are small, whole-family rewrites dominate cost anyway

mod map;

pub use map::Table;

/// One key family: key -> value
pub type Family = std::collections::BTreeMap<String, String>;

/// Family (and key) seeded into an otherwise empty table
pub const PLACEHOLDER_FAMILY: &str = "_jsonkvInitialKey";
