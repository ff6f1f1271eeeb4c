// atlink test application -- CLI tool for exercising the AT channel
// against a real modem or a mock transport.
//
// Usage:
//   atlink-test-app --port /dev/ttyUSB2 probe
//   atlink-test-app --port /dev/ttyUSB2 cmd "AT+CSQ"
//   atlink-test-app --port /dev/ttyUSB2 cmd "AT+COPS=?" --timeout 120
//   atlink-test-app --port /dev/ttyUSB2 send "+++"
//   atlink-test-app --port /dev/ttyUSB2 monitor --duration 60
//   atlink-test-app --port /dev/ttyUSB2 config CREG 1
//   atlink-test-app --port /dev/ttyUSB2 stress --count 100
//   atlink-test-app --mock cmd "AT"

use std::time::{Duration, Instant};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};

use atlink::{Channel, ChannelConfig, SerialTransport};
use atlink_test_harness::MockTransport;

// ---------------------------------------------------------------------------
// CLI argument definitions
// ---------------------------------------------------------------------------

/// atlink test application -- exercises the AT channel from the command line.
#[derive(Parser)]
#[command(name = "atlink-test-app", version, about)]
struct Cli {
    /// Serial port path (e.g. /dev/ttyUSB2, COM3).
    /// Required unless --mock is used.
    #[arg(long)]
    port: Option<String>,

    /// Baud rate for the serial port.
    #[arg(long, default_value_t = 115200)]
    baud: u32,

    /// Use a mock transport instead of a real serial port.
    /// The mock answers every command with OK; useful for verifying CLI
    /// parsing and channel wiring without hardware.
    #[arg(long)]
    mock: bool,

    /// Enable debug logging to stderr.
    #[arg(long, short)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Issue a single AT command and print the response body.
    Cmd {
        /// Command text without the trailing CR (e.g. "AT+CSQ").
        text: String,

        /// Per-command timeout in seconds.
        #[arg(long, default_value_t = 5)]
        timeout: u64,
    },

    /// Write text to the modem without waiting for a response.
    Send {
        /// Text to write verbatim (no CR appended; e.g. "+++").
        text: String,
    },

    /// Query modem identity, signal quality, and registration state.
    Probe,

    /// Subscribe to unsolicited result codes and print them in real time.
    Monitor {
        /// Duration in seconds (0 = run until Ctrl-C).
        #[arg(long, default_value_t = 0)]
        duration: u64,
    },

    /// Drive an AT+<option>=<value> setting until the readback matches.
    Config {
        /// Option name without the "+" (e.g. CREG).
        option: String,
        /// Desired value (e.g. 1).
        value: String,
        /// Number of set/verify rounds.
        #[arg(long, default_value_t = 3)]
        attempts: u32,
    },

    /// Stress test: rapid-fire AT probe cycles.
    Stress {
        /// Number of command cycles.
        #[arg(long, default_value_t = 100)]
        count: u32,
    },
}

// ---------------------------------------------------------------------------
// Channel construction
// ---------------------------------------------------------------------------

/// Open a channel from CLI arguments, over a real serial port or a mock.
async fn open_channel(cli: &Cli) -> Result<Channel> {
    if cli.mock {
        let mock = scripted_mock(cli);
        let channel = Channel::open(Box::new(mock), ChannelConfig::default())
            .await
            .context("failed to open channel over mock transport")?;
        println!("Connected (mock transport)");
        return Ok(channel);
    }

    let port = cli
        .port
        .as_deref()
        .context("--port is required when not using --mock")?;

    let transport = SerialTransport::open(port, cli.baud)
        .await
        .with_context(|| format!("failed to open serial port {port} at {} baud", cli.baud))?;

    let channel = Channel::open(Box::new(transport), ChannelConfig::default())
        .await
        .context("failed to open channel")?;

    println!("Connected to {port} at {} baud", cli.baud);
    Ok(channel)
}

/// Pre-load a mock transport so the requested command sequence succeeds.
fn scripted_mock(cli: &Cli) -> MockTransport {
    let mut mock = MockTransport::new();
    match &cli.command {
        Command::Cmd { text, .. } => {
            mock.expect(format!("{text}\r").as_bytes(), b"OK\r\n");
        }
        Command::Send { text } => {
            mock.expect(text.as_bytes(), b"");
        }
        Command::Probe => {
            mock.expect(b"AT\r", b"OK\r\n");
            mock.expect(b"AT+CGMI\r", b"Mock Industries\r\nOK\r\n");
            mock.expect(b"AT+CGMM\r", b"MOCK-9000\r\nOK\r\n");
            mock.expect(b"AT+CGMR\r", b"1.0.0\r\nOK\r\n");
            mock.expect(b"AT+CSQ\r", b"+CSQ: 23,0\r\nOK\r\n");
            mock.expect(b"AT+CREG?\r", b"+CREG: 0,1\r\nOK\r\n");
        }
        Command::Monitor { .. } => {
            mock.push_incoming(b"RING\r\n");
        }
        Command::Config { option, value, .. } => {
            mock.expect(format!("AT+{option}={value}\r").as_bytes(), b"OK\r\n");
            mock.expect(
                format!("AT+{option}?\r").as_bytes(),
                format!("+{option}: {value}\r\nOK\r\n").as_bytes(),
            );
            // The post-configure readback in cmd_config.
            mock.expect(
                format!("AT+{option}?\r").as_bytes(),
                format!("+{option}: {value}\r\nOK\r\n").as_bytes(),
            );
        }
        Command::Stress { count } => {
            for _ in 0..*count {
                mock.expect(b"AT\r", b"OK\r\n");
            }
        }
    }
    mock
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

async fn cmd_cmd(channel: &Channel, text: &str, timeout_secs: u64) -> Result<()> {
    let opts = atlink::CommandOpts::new(text).timeout(Duration::from_secs(timeout_secs));
    let response = channel.command_with(opts).await?;
    if response.is_empty() {
        println!("OK");
    } else {
        println!("{response}");
    }
    Ok(())
}

async fn cmd_send(channel: &Channel, text: &str) -> Result<()> {
    channel.send(text).await?;
    println!("Sent {} bytes.", text.len());
    Ok(())
}

async fn cmd_probe(channel: &Channel) -> Result<()> {
    channel.command("AT").await.context("modem not responding")?;

    let manufacturer = channel.command("AT+CGMI").await?;
    let model = channel.command("AT+CGMM").await?;
    let revision = channel.command("AT+CGMR").await?;
    let csq = channel.command("AT+CSQ").await?;
    let creg = channel.command("AT+CREG?").await?;

    println!("Modem Information");
    println!("  Manufacturer:  {manufacturer}");
    println!("  Model:         {model}");
    println!("  Revision:      {revision}");
    println!();
    println!("State");
    println!("  Signal:        {csq}");
    println!("  Registration:  {creg}");
    Ok(())
}

async fn cmd_monitor(channel: &Channel, duration_secs: u64) -> Result<()> {
    let mut urc_rx = channel.subscribe();

    println!("Monitoring unsolicited result codes (Ctrl-C to stop)...");

    let deadline = if duration_secs > 0 {
        Some(Instant::now() + Duration::from_secs(duration_secs))
    } else {
        None
    };
    let start = Instant::now();

    loop {
        let timeout = match deadline {
            Some(dl) => {
                let remaining = dl.saturating_duration_since(Instant::now());
                if remaining.is_zero() {
                    println!("Monitor duration elapsed.");
                    break;
                }
                remaining
            }
            None => Duration::from_secs(3600),
        };

        match tokio::time::timeout(timeout, urc_rx.recv()).await {
            Ok(Ok(event)) => {
                let elapsed = start.elapsed();
                println!(
                    "[{:>6}.{:03}s] {}",
                    elapsed.as_secs(),
                    elapsed.subsec_millis(),
                    event.line
                );
            }
            Ok(Err(tokio::sync::broadcast::error::RecvError::Lagged(n))) => {
                println!("[warning] missed {n} events (consumer too slow)");
            }
            Ok(Err(tokio::sync::broadcast::error::RecvError::Closed)) => {
                println!("Event channel closed.");
                break;
            }
            Err(_) => {
                // Timeout expired (either deadline or the 1-hour fallback).
                if deadline.is_some() {
                    println!("Monitor duration elapsed.");
                }
                break;
            }
        }
    }

    Ok(())
}

async fn cmd_config(channel: &Channel, option: &str, value: &str, attempts: u32) -> Result<()> {
    println!("Setting +{option} to {value} ({attempts} rounds max)...");
    channel.configure(option, value, attempts).await?;

    // configure() is best-effort; read back for a definitive answer.
    let readback = channel.command(&format!("AT+{option}?")).await?;
    let expected = format!("+{option}: {value}");
    if readback.starts_with(&expected) {
        println!("Converged: {readback}");
    } else {
        bail!("did not converge: modem reports '{readback}', wanted '{expected}'");
    }
    Ok(())
}

async fn cmd_stress(channel: &Channel, count: u32) -> Result<()> {
    println!("Stress test: {count} AT probe cycles");

    let mut success = 0u32;
    let mut failures = 0u32;
    let start = Instant::now();

    for i in 1..=count {
        match channel.command("AT").await {
            Ok(_) => success += 1,
            Err(e) => {
                eprintln!("[{i}/{count}] command failed: {e}");
                failures += 1;
            }
        }
    }

    let elapsed = start.elapsed();
    let rate = if elapsed.as_secs_f64() > 0.0 {
        count as f64 / elapsed.as_secs_f64()
    } else {
        0.0
    };

    println!();
    println!("Results:");
    println!("  Total cycles:   {count}");
    println!("  Successes:      {success}");
    println!("  Failures:       {failures}");
    println!("  Elapsed:        {:.3} s", elapsed.as_secs_f64());
    println!("  Rate:           {rate:.1} cycles/sec");

    if failures > 0 {
        bail!("{failures} out of {count} stress test cycles failed");
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.verbose {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "atlink=debug".into()),
            )
            .with_writer(std::io::stderr)
            .init();
    }

    let channel = open_channel(&cli).await?;

    let result = match &cli.command {
        Command::Cmd { text, timeout } => cmd_cmd(&channel, text, *timeout).await,
        Command::Send { text } => cmd_send(&channel, text).await,
        Command::Probe => cmd_probe(&channel).await,
        Command::Monitor { duration } => cmd_monitor(&channel, *duration).await,
        Command::Config {
            option,
            value,
            attempts,
        } => cmd_config(&channel, option, value, *attempts).await,
        Command::Stress { count } => cmd_stress(&channel, *count).await,
    };

    channel.close().await.ok();
    result
}
