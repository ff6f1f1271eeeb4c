//! atlink-engine: AT response parsing and transaction coordination.
//!
//! Two layers:
//!
//! - [`parser`] -- an incremental, push-driven state machine that turns a
//!   byte stream into complete responses and unsolicited result codes,
//!   with raw and hex payload capture modes.
//! - [`channel`] -- a [`Channel`] wrapping a
//!   [`Transport`](atlink_core::Transport) in a single pump task that
//!   executes one command/response transaction at a time and broadcasts
//!   URCs.
//!
//! The parser is usable standalone (no async, no transport) for tests and
//! alternative executors; the channel is the intended production surface.

pub mod channel;
pub mod classify;
pub mod parser;

pub use channel::{Channel, ChannelConfig, CommandOpts};
pub use classify::{classify_line, LineClassifier, ResponseKind};
pub use parser::{ParserEvent, ResponseParser};
