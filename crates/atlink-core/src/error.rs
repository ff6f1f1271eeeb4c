//! Error types for atlink.
//!
//! All fallible operations across the library return [`Result<T>`], which
//! uses [`Error`] as the error type. Transport-layer, protocol-layer, and
//! channel-layer errors are all captured here.

/// The error type for all atlink operations.
///
/// Variants cover the failure modes encountered when talking AT over a
/// serial link: physical transport failures, timeouts, oversized command
/// text, and channel lifecycle errors.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A transport-level error (serial port, USB CDC-ACM).
    #[error("transport error: {0}")]
    Transport(String),

    /// A protocol-level error (unexpected bytes, mock expectation mismatch).
    #[error("protocol error: {0}")]
    Protocol(String),

    /// Timed out waiting for a final response from the modem.
    ///
    /// This typically indicates the modem is powered off, the baud rate is
    /// wrong, or the command needs a longer per-command timeout.
    #[error("timeout waiting for response")]
    Timeout,

    /// Command text exceeds the channel's configured limit.
    ///
    /// Oversized commands are rejected before any bytes are written, so a
    /// partial command is never transmitted.
    #[error("command too long: {len} bytes exceeds limit of {max}")]
    CommandTooLong {
        /// Length of the rejected command text.
        len: usize,
        /// The channel's configured maximum.
        max: usize,
    },

    /// No connection to the modem has been established, or the channel
    /// was closed while an operation was outstanding.
    #[error("not connected")]
    NotConnected,

    /// The connection to the modem was lost unexpectedly.
    #[error("connection lost")]
    ConnectionLost,

    /// An underlying I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A convenience `Result` alias using [`Error`] as the error type.
pub type Result<T> = std::result::Result<T, Error>;
