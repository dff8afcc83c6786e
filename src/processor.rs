//! Processor Module
//!
//! Applies one request to the table and persists what it changed.
//!
//! ## Responsibilities
//! - Dispatch on the request action
//! - Rewrite the affected family file after every `set`
//! - Turn every failure into a failed response, never into a panic or an
//!   early exit of the serving loop
//!
//! ## Actions
//! | Action   | Success payload                  |
//! |----------|----------------------------------|
//! | set      | `value set`                      |
//! | get      | value as a JSON string           |
//! | list     | JSON array of family names       |
//! | listkeys | JSON array of keys in the family |
//! | quit     | `BYE`                            |

use std::thread;

use serde::Serialize;

use crate::config::PoisonHook;
use crate::error::{JsonKvError, Result};
use crate::protocol::{Action, Request, Response};
use crate::storage::{validate_family_name, FamilyStore};
use crate::table::Table;

/// Success payload of `set`
pub const VALUE_SET: &str = "value set";

/// Success payload of `quit`
pub const BYE: &str = "BYE";

/// Owns the table and the store it is mirrored to
///
/// ## Ownership
/// Exactly one `Processor` exists per serving loop and it is never shared:
/// every method takes `&mut self` or `&self` on the loop's own thread.
pub struct Processor {
    /// Live data set
    table: Table,

    /// Where mutated families are written
    store: FamilyStore,

    /// Opt-in stall for `set` on one key
    poison: Option<PoisonHook>,
}

impl Processor {
    /// Create a processor over an already loaded table
    pub fn new(table: Table, store: FamilyStore) -> Self {
        Self {
            table,
            store,
            poison: None,
        }
    }

    /// Install the slow-processing hook
    pub fn with_poison(mut self, poison: Option<PoisonHook>) -> Self {
        self.poison = poison;
        self
    }

    /// Execute a request
    ///
    /// Routes requests to the matching handler. Runs to completion; there is
    /// no cancellation once a request has started.
    pub fn execute(&mut self, request: &Request) -> Response {
        tracing::trace!("Executing {:?}", request);

        let result = match &request.action {
            Action::Set => self
                .set(&request.key_family, &request.key, &request.value)
                .map(|()| VALUE_SET.to_string()),
            Action::Get => self.get(&request.key_family, &request.key),
            Action::List => self.list(),
            Action::ListKeys => self.list_keys(&request.key_family),
            Action::Quit => Ok(BYE.to_string()),
            Action::Unknown(name) => Err(JsonKvError::UnknownAction(name.clone())),
        };

        match result {
            Ok(line) => Response::ok_line(line),
            Err(e) => {
                tracing::debug!("{} failed: {}", request.action, e);
                Response::error(Vec::new(), e)
            }
        }
    }

    /// Insert or overwrite a key and rewrite its family file
    ///
    /// Steps:
    /// 1. Reject names that cannot become a file
    /// 2. Stall if the poison hook matches
    /// 3. Write to the table
    /// 4. Persist the whole family
    ///
    /// A failed save leaves the new value in the table: memory stays a
    /// superset of disk.
    pub fn set(&mut self, family: &str, key: &str, value: &str) -> Result<()> {
        // Step 1: Validate before touching anything
        validate_family_name(family)?;

        // Step 2: Test hook
        if let Some(poison) = &self.poison {
            if poison.key == key {
                tracing::warn!("Poison key hit, stalling for {:?}", poison.delay);
                thread::sleep(poison.delay);
            }
        }

        // Step 3: Write to table
        let entries = self.table.set(family, key, value);

        // Step 4: Persist
        self.store.save(family, entries)
    }

    /// Get a value as a JSON string; absent keys encode as `""`
    pub fn get(&self, family: &str, key: &str) -> Result<String> {
        encode(&self.table.get(family, key).unwrap_or_default())
    }

    /// JSON array of all family names
    pub fn list(&self) -> Result<String> {
        encode(&self.table.family_names())
    }

    /// JSON array of the keys in `family`; `[]` when it does not exist
    pub fn list_keys(&self, family: &str) -> Result<String> {
        encode(&self.table.keys(family))
    }

    // =========================================================================
    // Accessors (for testing and debugging)
    // =========================================================================

    /// Get the live table
    pub fn table(&self) -> &Table {
        &self.table
    }

    /// Get the backing store
    pub fn store(&self) -> &FamilyStore {
        &self.store
    }
}

fn encode<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    serde_json::to_string(value).map_err(JsonKvError::Encode)
}
