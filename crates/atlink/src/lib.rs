//! # atlink -- Asynchronous AT Command Channel
//!
//! `atlink` is an asynchronous Rust library for talking to AT-command
//! devices: cellular modules, GNSS receivers, Bluetooth bridges, and
//! anything else that speaks the Hayes command set over a serial line.
//! It handles the hard parts of the protocol so application code can
//! treat a modem as a request/response service:
//!
//! - incremental response parsing, including multi-line responses and
//!   binary raw/hex payload capture
//! - one-command-at-a-time transaction sequencing with deadlines
//! - unsolicited result code (URC) delivery through a broadcast channel,
//!   even while a command is in flight
//!
//! ## Quick Start
//!
//! Add `atlink` to your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! atlink = "0.1"
//! tokio = { version = "1", features = ["full"] }
//! ```
//!
//! Open a channel and query the modem:
//!
//! ```no_run
//! use atlink::{Channel, ChannelConfig, SerialTransport};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let transport = SerialTransport::open("/dev/ttyUSB2", 115200).await?;
//!     let channel = Channel::open(Box::new(transport), ChannelConfig::default()).await?;
//!
//!     let response = channel.command("AT+CSQ").await?;
//!     println!("Signal quality: {}", response);
//!
//!     channel.close().await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! The library is organized as a workspace of focused crates:
//!
//! | Crate                 | Purpose                                         |
//! |-----------------------|-------------------------------------------------|
//! | `atlink-core`         | [`Transport`] trait, [`UrcEvent`], errors       |
//! | `atlink-engine`       | Response parser and the [`Channel`] transaction pump |
//! | `atlink-transport`    | Serial port transport implementation            |
//! | `atlink-test-harness` | `MockTransport` for hardware-free testing       |
//! | **`atlink`**          | This facade crate -- re-exports everything      |
//!
//! The [`Channel`] owns its [`Transport`] through a single pump task;
//! applications never touch the serial port directly once the channel is
//! open.
//!
//! ## Unsolicited Result Codes
//!
//! Modems volunteer information at any time: incoming calls (`RING`),
//! SMS arrival, network registration changes. Subscribe to receive them
//! without polling:
//!
//! ```no_run
//! # async fn example(channel: &atlink::Channel) {
//! let mut urcs = channel.subscribe();
//! while let Ok(event) = urcs.recv().await {
//!     println!("URC: {}", event.line);
//! }
//! # }
//! ```
//!
//! Out of the box only `RING` is recognized as a URC; teach the channel
//! about device-specific codes with
//! [`ChannelConfig::default_classifier`], or per command with
//! [`CommandOpts::classifier`].
//!
//! ## Binary Payloads
//!
//! Some responses carry length-prefixed binary data (`+CIPRXGET`,
//! `+USORD`, ...). A classifier returning
//! [`ResponseKind::RawDataFollows`] or [`ResponseKind::HexDataFollows`]
//! switches the parser into payload capture for exactly that many bytes,
//! so line framing never corrupts the data.

pub use atlink_core::{Error, Result, Transport, UrcEvent};
pub use atlink_engine::{
    classify_line, Channel, ChannelConfig, CommandOpts, LineClassifier, ParserEvent, ResponseKind,
    ResponseParser,
};
pub use atlink_transport::{FlowControl, SerialConfig, SerialTransport};
