//! Transport implementations for atlink.
//!
//! This crate provides concrete implementations of the
//! [`Transport`](atlink_core::Transport) trait from `atlink-core`:
//!
//! - [`SerialTransport`]: UART connections to cellular modules and USB
//!   virtual COM ports exposed by modem dongles
//!
//! # Example
//!
//! ```no_run
//! use atlink_transport::SerialTransport;
//! use atlink_core::transport::Transport;
//! use std::time::Duration;
//!
//! # async fn example() -> atlink_core::Result<()> {
//! // Connect to a modem on its default AT port
//! let mut transport = SerialTransport::open("/dev/ttyUSB2", 115200).await?;
//!
//! // Send a command
//! transport.send(b"AT\r").await?;
//!
//! // Receive response
//! let mut buf = [0u8; 256];
//! let n = transport.receive(&mut buf, Duration::from_secs(1)).await?;
//! # Ok(())
//! # }
//! ```

pub mod serial;

pub use serial::{DataBits, FlowControl, Parity, SerialConfig, SerialTransport, StopBits};
