//! Protocol Module
//!
//! Messages exchanged with the serving loop over in-process queues.
//!
//! ## Request
//! ```text
//! { "Action": "set", "KeyFamily": "users", "Key": "alice", "Value": "admin" }
//! ```
//!
//! ### Actions
//! - set:      KeyFamily + Key + Value
//! - get:      KeyFamily + Key
//! - list:     no fields
//! - listkeys: KeyFamily
//! - quit:     no fields
//!
//! ## Response
//! ```text
//! { "StatusOk": true, "Message": ["\"admin\""] }
//! ```
//!
//! The last line of `Message` is the result payload, or the error text when
//! `StatusOk` is false. Earlier lines are informational.
//!
//! The JSON forms are only used when messages cross a process boundary
//! (see [`read_request`] and [`write_response`]); in-process queues carry
//! the structs.

mod request;
mod response;
mod codec;

pub use request::{Action, Request};
pub use response::Response;
pub use codec::{read_request, write_response};
