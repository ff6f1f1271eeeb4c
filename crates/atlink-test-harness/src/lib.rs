//! atlink-test-harness: Mock transports for testing atlink without a
//! modem.
//!
//! [`MockTransport`] provides deterministic scripted serial behavior:
//! pre-loaded command/response exchanges plus free-form unsolicited input
//! injection.

pub mod mock_serial;

pub use mock_serial::MockTransport;
