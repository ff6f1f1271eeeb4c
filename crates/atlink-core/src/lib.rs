//! atlink-core: Core traits, types, and error definitions for atlink.
//!
//! This crate defines the modem-agnostic abstractions that the rest of the
//! workspace builds on. Applications that only need the types (e.g. to
//! implement a custom transport) can depend on this crate without pulling
//! in the channel engine or any serial-port code.
//!
//! # Key types
//!
//! - [`Transport`] -- byte-level communication channel
//! - [`UrcEvent`] -- unsolicited result code notifications
//! - [`Error`] / [`Result`] -- error handling

pub mod error;
pub mod events;
pub mod transport;

// Re-export key types at crate root for ergonomic `use atlink_core::*`.
pub use error::{Error, Result};
pub use events::UrcEvent;
pub use transport::Transport;
