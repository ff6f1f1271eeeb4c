//! Transport trait for modem communication.
//!
//! The [`Transport`] trait abstracts over the physical link to a modem.
//! Implementations exist for serial ports (USB CDC-ACM, physical UARTs)
//! and mock transports for testing.
//!
//! The channel engine in `atlink-engine` operates on a `Transport` rather
//! than directly on a serial port, enabling both real hardware control and
//! deterministic unit testing with `MockTransport` from the
//! `atlink-test-harness` crate.

use async_trait::async_trait;
use std::time::Duration;

use crate::error::Result;

/// Asynchronous byte-level transport to a modem.
///
/// Implementations handle buffering and error recovery at the physical
/// layer. Protocol-level concerns (line framing, response classification)
/// are handled by the channel engine that consumes this trait.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send raw bytes to the modem.
    ///
    /// Implementations should block until all bytes have been written to
    /// the underlying transport. Partial-write recovery is a transport
    /// concern; callers assume the whole payload went out on `Ok`.
    async fn send(&mut self, data: &[u8]) -> Result<()>;

    /// Receive bytes from the modem into the provided buffer.
    ///
    /// Returns the number of bytes actually read. Will wait up to `timeout`
    /// for data to arrive; returns [`Error::Timeout`](crate::error::Error::Timeout)
    /// if no data is received within the deadline.
    async fn receive(&mut self, buf: &mut [u8], timeout: Duration) -> Result<usize>;

    /// Enable or disable the receive side of the transport.
    ///
    /// Most transports are always receiving and can use this default no-op;
    /// UART HALs with a separately gated RX path override it.
    async fn set_receive_enabled(&mut self, _enabled: bool) -> Result<()> {
        Ok(())
    }

    /// Close the transport connection.
    ///
    /// After calling `close()`, subsequent `send()` and `receive()` calls
    /// should return [`Error::NotConnected`](crate::error::Error::NotConnected).
    async fn close(&mut self) -> Result<()>;

    /// Check whether the transport is currently connected.
    fn is_connected(&self) -> bool;
}
