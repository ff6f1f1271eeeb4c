//! Mock transport for deterministic testing of the AT engine.
//!
//! [`MockTransport`] implements the [`Transport`] trait with pre-loaded
//! command/response exchanges. This lets you test command formatting,
//! response parsing, and unsolicited result code delivery without real
//! hardware.
//!
//! # Example
//!
//! ```
//! use atlink_test_harness::MockTransport;
//!
//! let mut mock = MockTransport::new();
//! // Pre-load: when the engine sends this command, feed back this response.
//! mock.expect(b"AT+CSQ\r", b"+CSQ: 23,0\r\nOK\r\n");
//! // Inject unsolicited bytes, deliverable without any send.
//! mock.push_incoming(b"RING\r\n");
//! ```

use async_trait::async_trait;
use std::collections::VecDeque;
use std::time::Duration;

use atlink_core::error::{Error, Result};
use atlink_core::transport::Transport;

/// A pre-loaded command/response exchange.
#[derive(Debug, Clone)]
struct Expectation {
    /// The exact bytes we expect to be sent.
    request: Vec<u8>,
    /// The bytes to queue as incoming when the matching request arrives.
    response: Vec<u8>,
}

/// A mock [`Transport`] for testing the engine without hardware.
///
/// Expectations are consumed in order: each `send()` is recorded and
/// matched against the next expectation, and the paired response bytes
/// are appended to a single incoming stream that `receive()` drains.
/// Unsolicited traffic is modeled by [`MockTransport::push_incoming`],
/// which appends to the same stream without requiring a send.
///
/// If a send does not match, or the expectation queue is exhausted, an
/// error is returned. A `receive()` with nothing pending waits out its
/// timeout like a quiet serial line would.
#[derive(Debug)]
pub struct MockTransport {
    /// Ordered queue of expected command/response exchanges.
    expectations: VecDeque<Expectation>,
    /// Incoming byte stream drained by `receive()`.
    incoming: VecDeque<u8>,
    /// Whether the transport is "connected".
    connected: bool,
    /// Log of all bytes sent through this transport.
    sent_log: Vec<Vec<u8>>,
}

impl MockTransport {
    /// Create a new mock transport in the connected state.
    pub fn new() -> Self {
        MockTransport {
            expectations: VecDeque::new(),
            incoming: VecDeque::new(),
            connected: true,
            sent_log: Vec::new(),
        }
    }

    /// Add an expected command/response exchange.
    ///
    /// When `send()` is called with data matching `request`, `response`
    /// is appended to the incoming stream. An empty response models a
    /// modem that stays silent.
    pub fn expect(&mut self, request: &[u8], response: &[u8]) {
        self.expectations.push_back(Expectation {
            request: request.to_vec(),
            response: response.to_vec(),
        });
    }

    /// Append bytes to the incoming stream without requiring a send.
    ///
    /// Models unsolicited modem traffic (URCs, boot banners).
    pub fn push_incoming(&mut self, data: &[u8]) {
        self.incoming.extend(data.iter().copied());
    }

    /// Return a reference to all data that has been sent through this
    /// transport. Each element is the byte slice from one `send()` call.
    pub fn sent_data(&self) -> &[Vec<u8>] {
        &self.sent_log
    }

    /// Return the number of expectations that have not yet been consumed.
    pub fn remaining_expectations(&self) -> usize {
        self.expectations.len()
    }

    /// Set the connected state of the mock transport.
    ///
    /// When set to `false`, subsequent `send()` and `receive()` calls
    /// will return [`Error::NotConnected`].
    pub fn set_connected(&mut self, connected: bool) {
        self.connected = connected;
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&mut self, data: &[u8]) -> Result<()> {
        if !self.connected {
            return Err(Error::NotConnected);
        }

        // Record what was sent.
        self.sent_log.push(data.to_vec());

        // Match against the next expectation.
        if let Some(expectation) = self.expectations.pop_front() {
            if data != expectation.request.as_slice() {
                return Err(Error::Protocol(format!(
                    "unexpected send data: expected {:02X?}, got {:02X?}",
                    expectation.request, data
                )));
            }
            self.incoming.extend(expectation.response.iter().copied());
            Ok(())
        } else {
            Err(Error::Protocol(
                "no more expectations in mock transport".into(),
            ))
        }
    }

    async fn receive(&mut self, buf: &mut [u8], timeout: Duration) -> Result<usize> {
        if !self.connected {
            return Err(Error::NotConnected);
        }

        if self.incoming.is_empty() {
            // A quiet line: wait out the timeout rather than spinning the
            // caller's read loop.
            tokio::time::sleep(timeout).await;
            return Err(Error::Timeout);
        }

        let n = self.incoming.len().min(buf.len());
        for slot in buf.iter_mut().take(n) {
            // Guarded by the length computation above.
            if let Some(byte) = self.incoming.pop_front() {
                *slot = byte;
            }
        }
        Ok(n)
    }

    async fn close(&mut self) -> Result<()> {
        self.connected = false;
        self.incoming.clear();
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use atlink_core::transport::Transport;

    #[tokio::test]
    async fn basic_send_receive() {
        let mut mock = MockTransport::new();
        mock.expect(b"AT\r", b"OK\r\n");

        mock.send(b"AT\r").await.unwrap();

        let mut buf = [0u8; 64];
        let n = mock
            .receive(&mut buf, Duration::from_millis(100))
            .await
            .unwrap();
        assert_eq!(&buf[..n], b"OK\r\n");
    }

    #[tokio::test]
    async fn tracks_sent_data() {
        let mut mock = MockTransport::new();
        mock.expect(b"AT\r", b"OK\r\n");
        mock.expect(b"ATE0\r", b"OK\r\n");

        mock.send(b"AT\r").await.unwrap();
        mock.send(b"ATE0\r").await.unwrap();

        assert_eq!(mock.sent_data().len(), 2);
        assert_eq!(mock.sent_data()[0], b"AT\r");
        assert_eq!(mock.sent_data()[1], b"ATE0\r");
    }

    #[tokio::test]
    async fn wrong_data_errors() {
        let mut mock = MockTransport::new();
        mock.expect(b"AT\r", b"OK\r\n");

        let result = mock.send(b"ATI\r").await;
        assert!(matches!(result.unwrap_err(), Error::Protocol(_)));
    }

    #[tokio::test]
    async fn no_expectations_errors() {
        let mut mock = MockTransport::new();

        let result = mock.send(b"AT\r").await;
        assert!(matches!(result.unwrap_err(), Error::Protocol(_)));
    }

    #[tokio::test]
    async fn receive_without_data_times_out() {
        let mut mock = MockTransport::new();
        let mut buf = [0u8; 64];

        let result = mock.receive(&mut buf, Duration::from_millis(10)).await;
        assert!(matches!(result.unwrap_err(), Error::Timeout));
    }

    #[tokio::test]
    async fn push_incoming_delivers_without_send() {
        let mut mock = MockTransport::new();
        mock.push_incoming(b"RING\r\n");

        let mut buf = [0u8; 64];
        let n = mock
            .receive(&mut buf, Duration::from_millis(100))
            .await
            .unwrap();
        assert_eq!(&buf[..n], b"RING\r\n");
    }

    #[tokio::test]
    async fn partial_receive() {
        let mut mock = MockTransport::new();
        mock.push_incoming(b"+CSQ: 23,0\r\n");

        // Read with a buffer smaller than the pending data.
        let mut buf = [0u8; 4];
        let n = mock
            .receive(&mut buf, Duration::from_millis(100))
            .await
            .unwrap();
        assert_eq!(&buf[..n], b"+CSQ");

        let n = mock
            .receive(&mut buf, Duration::from_millis(100))
            .await
            .unwrap();
        assert_eq!(&buf[..n], b": 23");
    }

    #[tokio::test]
    async fn responses_accumulate_in_order() {
        let mut mock = MockTransport::new();
        mock.expect(b"AT\r", b"OK\r\n");
        mock.push_incoming(b"RING\r\n");
        mock.send(b"AT\r").await.unwrap();

        // Unsolicited bytes were queued first, the response follows.
        let mut buf = [0u8; 64];
        let n = mock
            .receive(&mut buf, Duration::from_millis(100))
            .await
            .unwrap();
        assert_eq!(&buf[..n], b"RING\r\nOK\r\n");
    }

    #[tokio::test]
    async fn disconnect() {
        let mut mock = MockTransport::new();
        assert!(mock.is_connected());

        mock.close().await.unwrap();
        assert!(!mock.is_connected());

        let result = mock.send(b"AT\r").await;
        assert!(matches!(result.unwrap_err(), Error::NotConnected));
    }

    #[tokio::test]
    async fn set_connected() {
        let mut mock = MockTransport::new();
        mock.set_connected(false);

        let result = mock.send(b"AT\r").await;
        assert!(matches!(result.unwrap_err(), Error::NotConnected));

        let mut buf = [0u8; 8];
        let result = mock.receive(&mut buf, Duration::from_millis(10)).await;
        assert!(matches!(result.unwrap_err(), Error::NotConnected));
    }

    #[tokio::test]
    async fn remaining_expectations_counts_down() {
        let mut mock = MockTransport::new();
        mock.expect(b"AT\r", b"OK\r\n");
        mock.expect(b"ATI\r", b"OK\r\n");
        assert_eq!(mock.remaining_expectations(), 2);

        mock.send(b"AT\r").await.unwrap();
        assert_eq!(mock.remaining_expectations(), 1);
    }
}
