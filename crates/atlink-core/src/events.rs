//! Unsolicited result code (URC) event types.
//!
//! URCs are emitted by the channel engine through a `tokio::sync::broadcast`
//! channel whenever the modem pushes a line that is not part of any in-flight
//! command's response (e.g. `RING`, `+CREG: 2`). Applications subscribe to
//! these events for incoming-call and network-state handling without polling.

/// An unsolicited result code pushed by the modem.
///
/// Subscribe via `Channel::subscribe()` in `atlink-engine`. Events are
/// delivered on a best-effort basis through a bounded broadcast channel;
/// slow consumers may miss events under heavy URC traffic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrcEvent {
    /// The complete URC line, without line terminators.
    ///
    /// Non-UTF-8 bytes (rare, but possible on a noisy line) are replaced
    /// with U+FFFD.
    pub line: String,
}
