//! Storage Module
//!
//! Persistent storage layer: one JSON file per key family.
//!
//! ## Responsibilities
//! - Create the storage directory on first start
//! - Load every family file into a [`Table`](crate::table::Table)
//! - Rewrite a whole family file atomically after each mutation
//!
//! ## Directory Layout
//! ```text
//! {jsons_path}/
//!   ├── users.json        {"alice":"admin","bob":"guest"}
//!   ├── sessions.json     {"s1":"alice"}
//!   └── .tmpXXXXXX        (in-flight rewrite, ignored on load)
//! ```
//!
//! A crash mid-rewrite leaves the previous file intact: the new contents
//! only replace it through a rename.

mod family_store;

pub use family_store::{ensure_directory, validate_family_name, FamilyStore, FAMILY_EXTENSION};
