//! Server Module
//!
//! The serving loop and its client-side handle.
//!
//! ## Architecture
//! - One worker thread owns the [`Processor`](crate::processor::Processor)
//! - Clients talk to it only through three crossbeam channels:
//!   - requests   (client → loop, rendezvous, unbounded wait)
//!   - responses  (loop → client, rendezvous, bounded wait then drop)
//!   - bootstrap  (loop → client, exactly one message, then closed)
//!
//! ## Lifecycle
//! ```text
//! Initializing ──ok──▶ Ready ◀──▶ Processing ──quit──▶ Terminated
//!      │                                                  ▲
//!      └──────────────────error───────────────────────────┘
//! ```

mod listener;
mod handle;

pub use listener::{listen, serve, LoopExit};
pub use handle::{handle_output, StoreHandle};
