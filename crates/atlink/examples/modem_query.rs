//! Query basic modem identity and signal state.
//!
//! Demonstrates opening a channel over a serial port, issuing a handful
//! of read commands, and interpreting multi-line responses.
//!
//! # Requirements
//!
//! - A modem exposing an AT port
//! - Serial port path adjusted for your system
//!
//! # Usage
//!
//! ```sh
//! cargo run -p atlink --example modem_query
//! ```

use atlink::{Channel, ChannelConfig, SerialTransport};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let serial_port = "/dev/ttyUSB2";

    println!("Connecting to modem on {}...", serial_port);

    let transport = SerialTransport::open(serial_port, 115200).await?;
    let channel = Channel::open(Box::new(transport), ChannelConfig::default()).await?;

    // Probe and silence echo so responses parse cleanly.
    channel.command("AT").await?;
    channel.command("ATE0").await?;

    let manufacturer = channel.command("AT+CGMI").await?;
    let model = channel.command("AT+CGMM").await?;
    let revision = channel.command("AT+CGMR").await?;
    println!("Modem:    {} {} ({})", manufacturer, model, revision);

    let csq = channel.command("AT+CSQ").await?;
    println!("Signal:   {}", csq);

    let creg = channel.command("AT+CREG?").await?;
    println!("Network:  {}", creg);

    // Multi-line response: one line per PDP context.
    let contexts = channel.command("AT+CGDCONT?").await?;
    println!("Contexts:");
    for line in contexts.lines() {
        println!("  {}", line);
    }

    channel.close().await?;
    Ok(())
}
