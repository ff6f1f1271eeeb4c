//! Monitor unsolicited result codes.
//!
//! Demonstrates subscribing to the URC stream and printing everything
//! the modem volunteers: incoming calls, SMS notifications, network
//! registration changes. A channel-wide classifier teaches the engine
//! which device-specific lines are unsolicited.
//!
//! # Usage
//!
//! ```sh
//! cargo run -p atlink --example monitor_urcs
//! ```

use std::time::Duration;

use atlink::{Channel, ChannelConfig, ResponseKind, SerialTransport};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let serial_port = "/dev/ttyUSB2";

    println!("Connecting to modem on {}...", serial_port);

    let transport = SerialTransport::open(serial_port, 115200).await?;
    let config = ChannelConfig {
        // RING is built in; +CMTI and +CREG notifications are not.
        default_classifier: Some(Box::new(|line: &[u8]| {
            (line.starts_with(b"+CMTI:") || line.starts_with(b"+CREG:"))
                .then_some(ResponseKind::Urc)
        })),
        ..ChannelConfig::default()
    };
    let channel = Channel::open(Box::new(transport), config).await?;

    // Enable the notifications we want to watch.
    channel.command("ATE0").await?;
    channel.configure("CREG", "1", 3).await?;
    channel.configure("CNMI", "2,1", 3).await?;

    let mut urcs = channel.subscribe();
    println!("Monitoring URCs for 60 seconds...");
    println!("(Call or text the SIM to generate events)\n");

    let deadline = tokio::time::Instant::now() + Duration::from_secs(60);
    let start = tokio::time::Instant::now();

    loop {
        let remaining = deadline.saturating_duration_since(tokio::time::Instant::now());
        if remaining.is_zero() {
            break;
        }

        match tokio::time::timeout(remaining, urcs.recv()).await {
            Ok(Ok(event)) => {
                let elapsed = start.elapsed();
                println!(
                    "{:>6}.{:03}s  {}",
                    elapsed.as_secs(),
                    elapsed.subsec_millis(),
                    event.line
                );
            }
            Ok(Err(tokio::sync::broadcast::error::RecvError::Lagged(n))) => {
                println!("(missed {} events due to lag)", n);
            }
            Ok(Err(tokio::sync::broadcast::error::RecvError::Closed)) => {
                println!("Event channel closed.");
                break;
            }
            Err(_) => {
                // Timeout -- monitoring period elapsed.
                break;
            }
        }
    }

    println!("\nMonitoring complete.");
    channel.close().await?;
    Ok(())
}
