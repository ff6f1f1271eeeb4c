//! The AT transaction channel.
//!
//! [`Channel`] implements the single-pump-task pattern: one tokio task owns
//! the transport exclusively, continuously reads bytes into the
//! [`ResponseParser`](crate::parser::ResponseParser), and executes
//! command/response transactions one at a time. Unsolicited result codes
//! are published through a [`tokio::sync::broadcast`] channel whether or
//! not a command is in flight.
//!
//! # Concurrency model
//!
//! Exactly two logical threads of control interact per channel: the pump
//! task, which is the only writer of parser state, and at most one caller
//! awaiting inside [`Channel::command`]. Multiple callers are serialized
//! FIFO through the request queue; the protocol itself supports only one
//! outstanding command at a time, so there is no pipelining.
//!
//! # Timeouts and closure
//!
//! A command's deadline is computed once when the transaction starts and
//! drives every transport read within it. On expiry the parser is forced
//! back to idle; late bytes belonging to the abandoned response will be
//! misread as unsolicited lines — a bounded inconsistency window that is
//! accepted rather than papered over. Closing the channel wakes any
//! in-flight caller with [`Error::NotConnected`].

use std::time::Duration;

use bytes::{BufMut, BytesMut};
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use atlink_core::error::{Error, Result};
use atlink_core::events::UrcEvent;
use atlink_core::transport::Transport;

use crate::classify::LineClassifier;
use crate::parser::{ParserEvent, ResponseParser};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Default deadline for one command/response transaction.
pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(5);

/// Default response accumulation buffer capacity.
pub const DEFAULT_RESPONSE_BUFFER: usize = 4096;

/// Default command text limit. Oversized command text is rejected before
/// any bytes are written.
pub const DEFAULT_MAX_COMMAND_LEN: usize = 80;

/// How long one idle transport read waits before the pump re-checks for
/// requests and cancellation.
const IDLE_READ_TIMEOUT: Duration = Duration::from_millis(100);

/// Pause between configure() rounds.
const CONFIGURE_RETRY_DELAY: Duration = Duration::from_secs(1);

/// Configuration for a [`Channel`].
pub struct ChannelConfig {
    /// Deadline for a single command/response transaction.
    pub command_timeout: Duration,
    /// Capacity of the parser's response accumulation buffer. Responses
    /// larger than this are silently truncated, never an error.
    pub response_buffer: usize,
    /// Maximum command text length accepted by [`Channel::command`] and
    /// [`Channel::send`]; also sets the `send_hex` chunk size.
    pub max_command_len: usize,
    /// Capacity of the URC broadcast channel.
    pub urc_capacity: usize,
    /// Channel-wide line classifier, consulted between the per-command
    /// classifier and the built-in tables (e.g. for modem-specific URCs).
    pub default_classifier: Option<Box<dyn LineClassifier>>,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        ChannelConfig {
            command_timeout: DEFAULT_COMMAND_TIMEOUT,
            response_buffer: DEFAULT_RESPONSE_BUFFER,
            max_command_len: DEFAULT_MAX_COMMAND_LEN,
            urc_capacity: 32,
            default_classifier: None,
        }
    }
}

/// Per-command options for [`Channel::command_with`].
///
/// ```no_run
/// use std::time::Duration;
/// use atlink_engine::channel::CommandOpts;
///
/// let opts = CommandOpts::new("AT+CMGS=\"+48123456789\"")
///     .dataprompt()
///     .timeout(Duration::from_secs(30));
/// ```
pub struct CommandOpts {
    text: String,
    dataprompt: bool,
    classifier: Option<Box<dyn LineClassifier>>,
    timeout: Option<Duration>,
}

impl CommandOpts {
    /// Command text, without the trailing `\r` (appended on send).
    pub fn new(text: impl Into<String>) -> Self {
        CommandOpts {
            text: text.into(),
            dataprompt: false,
            classifier: None,
            timeout: None,
        }
    }

    /// Expect the `"> "` data prompt instead of an ordinary response line
    /// (raw payload entry, e.g. `AT+CMGS`).
    pub fn dataprompt(mut self) -> Self {
        self.dataprompt = true;
        self
    }

    /// Attach a one-shot classifier consulted before the channel default
    /// and the built-in tables, for this command's response only.
    pub fn classifier(mut self, classifier: impl LineClassifier + 'static) -> Self {
        self.classifier = Some(Box::new(classifier));
        self
    }

    /// Override the channel's command timeout for this command.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

/// A request sent from channel methods to the pump task.
enum Request {
    /// A command expecting exactly one parsed response.
    Command {
        payload: Vec<u8>,
        dataprompt: bool,
        classifier: Option<Box<dyn LineClassifier>>,
        timeout: Duration,
        reply: oneshot::Sender<Result<Vec<u8>>>,
    },
    /// A fire-and-forget write.
    Send {
        payload: Vec<u8>,
        reply: oneshot::Sender<Result<()>>,
    },
    /// Pause the transport read arm without tearing the channel down.
    Suspend { reply: oneshot::Sender<()> },
    /// Resume after [`Request::Suspend`].
    Resume { reply: oneshot::Sender<()> },
}

// ---------------------------------------------------------------------------
// Channel handle
// ---------------------------------------------------------------------------

/// Handle to an open AT channel.
///
/// Cheap operations (`subscribe`) are synchronous; everything that touches
/// the transport goes through the pump task's request queue.
pub struct Channel {
    req_tx: mpsc::Sender<Request>,
    urc_tx: broadcast::Sender<UrcEvent>,
    cancel: CancellationToken,
    task: JoinHandle<()>,
    command_timeout: Duration,
    max_command_len: usize,
}

impl Channel {
    /// Open a channel over the given transport and spawn the pump task.
    ///
    /// Enables receive on the transport before the pump starts reading.
    pub async fn open(mut transport: Box<dyn Transport>, config: ChannelConfig) -> Result<Channel> {
        transport.set_receive_enabled(true).await?;

        let (req_tx, req_rx) = mpsc::channel::<Request>(16);
        let (urc_tx, _) = broadcast::channel(config.urc_capacity);
        let cancel = CancellationToken::new();

        let parser = ResponseParser::with_default_classifier(
            config.response_buffer,
            config.default_classifier,
        );

        let task = tokio::spawn(pump_loop(
            transport,
            parser,
            urc_tx.clone(),
            req_rx,
            cancel.clone(),
        ));

        Ok(Channel {
            req_tx,
            urc_tx,
            cancel,
            task,
            command_timeout: config.command_timeout,
            max_command_len: config.max_command_len,
        })
    }

    /// Subscribe to unsolicited result codes.
    ///
    /// Delivery is best-effort through a bounded broadcast channel; events
    /// published before the subscription are not replayed.
    pub fn subscribe(&self) -> broadcast::Receiver<UrcEvent> {
        self.urc_tx.subscribe()
    }

    /// Issue a command and await its response body.
    ///
    /// Appends the modem-style `\r` terminator. The returned string is the
    /// `\n`-joined intermediate lines of the response; a plain `OK` yields
    /// an empty string. Fails with [`Error::CommandTooLong`] before sending
    /// if the text exceeds the configured limit, [`Error::Timeout`] if no
    /// final response arrives in time, and [`Error::NotConnected`] if the
    /// channel closes while waiting.
    pub async fn command(&self, text: &str) -> Result<String> {
        self.command_with(CommandOpts::new(text)).await
    }

    /// Issue a command with per-command options (dataprompt arming, a
    /// one-shot classifier, a timeout override).
    pub async fn command_with(&self, opts: CommandOpts) -> Result<String> {
        if opts.text.len() >= self.max_command_len {
            return Err(Error::CommandTooLong {
                len: opts.text.len(),
                max: self.max_command_len,
            });
        }

        let mut payload = BytesMut::with_capacity(opts.text.len() + 1);
        payload.put_slice(opts.text.as_bytes());
        payload.put_u8(b'\r');

        let timeout = opts.timeout.unwrap_or(self.command_timeout);
        let body = self
            .transact(payload.to_vec(), opts.dataprompt, opts.classifier, timeout)
            .await?;
        Ok(String::from_utf8_lossy(&body).into_owned())
    }

    /// Issue a pre-formed command payload verbatim (no `\r` appended, no
    /// length check) and await the response body as raw bytes.
    ///
    /// This is the transaction primitive for binary payload phases, where
    /// the response may contain arbitrary bytes captured in raw-data mode.
    pub async fn command_raw(&self, payload: &[u8]) -> Result<Vec<u8>> {
        self.transact(payload.to_vec(), false, None, self.command_timeout)
            .await
    }

    /// Write command text without waiting for any response.
    ///
    /// No `\r` is appended; the caller controls the exact bytes. The
    /// length limit applies as for [`Channel::command`].
    pub async fn send(&self, text: &str) -> Result<()> {
        if text.len() >= self.max_command_len {
            return Err(Error::CommandTooLong {
                len: text.len(),
                max: self.max_command_len,
            });
        }
        self.send_bytes(text.as_bytes().to_vec()).await
    }

    /// Write raw bytes without waiting for any response.
    pub async fn send_raw(&self, data: &[u8]) -> Result<()> {
        self.send_bytes(data.to_vec()).await
    }

    /// Hex-encode and send a binary payload.
    ///
    /// The payload is split into chunks sized to the command-length limit
    /// (two hex characters per input byte, uppercase), each sent via the
    /// raw path. Aborts on the first failed send.
    pub async fn send_hex(&self, data: &[u8]) -> Result<()> {
        let chunk = (self.max_command_len / 2).max(1);
        for part in data.chunks(chunk) {
            self.send_raw(hex::encode_upper(part).as_bytes()).await?;
        }
        Ok(())
    }

    /// Best-effort convergence of a `+OPTION` setting.
    ///
    /// Each round blindly issues `AT+{option}={value}`, then queries
    /// `AT+{option}?` and checks the response against `+{option}: {value}`.
    /// Stops early on a match; a query timeout is an error. After all
    /// rounds the call returns `Ok` regardless — callers that need a hard
    /// guarantee must verify the setting themselves.
    pub async fn configure(&self, option: &str, value: &str, attempts: u32) -> Result<()> {
        let expected = format!("+{option}: {value}");
        for attempt in 0..attempts {
            if attempt > 0 {
                tokio::time::sleep(CONFIGURE_RETRY_DELAY).await;
            }

            // The set may fail transiently; the query decides convergence.
            let _ = self.command(&format!("AT+{option}={value}")).await;

            let response = self.command(&format!("AT+{option}?")).await?;
            if response.starts_with(&expected) {
                return Ok(());
            }
            debug!(option, value, attempt, "configure mismatch, retrying");
        }
        Ok(())
    }

    /// Pause the pump's transport reads. In-queue and future commands
    /// still execute; only idle reception stops.
    pub async fn suspend(&self) -> Result<()> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.req_tx
            .send(Request::Suspend { reply: reply_tx })
            .await
            .map_err(|_| Error::NotConnected)?;
        reply_rx.await.map_err(|_| Error::NotConnected)
    }

    /// Resume transport reads after [`Channel::suspend`].
    pub async fn resume(&self) -> Result<()> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.req_tx
            .send(Request::Resume { reply: reply_tx })
            .await
            .map_err(|_| Error::NotConnected)?;
        reply_rx.await.map_err(|_| Error::NotConnected)
    }

    /// `true` until the channel has been closed or the pump task exits.
    pub fn is_open(&self) -> bool {
        !self.req_tx.is_closed()
    }

    /// Close the channel: wake any in-flight caller with
    /// [`Error::NotConnected`], close the transport, and join the pump.
    pub async fn close(self) -> Result<()> {
        self.cancel.cancel();
        let _ = self.task.await;
        Ok(())
    }

    async fn transact(
        &self,
        payload: Vec<u8>,
        dataprompt: bool,
        classifier: Option<Box<dyn LineClassifier>>,
        timeout: Duration,
    ) -> Result<Vec<u8>> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.req_tx
            .send(Request::Command {
                payload,
                dataprompt,
                classifier,
                timeout,
                reply: reply_tx,
            })
            .await
            .map_err(|_| Error::NotConnected)?;

        // Slack on top of the pump-side deadline covers queueing behind an
        // earlier caller's transaction.
        match tokio::time::timeout(timeout + Duration::from_millis(500), reply_rx).await {
            Ok(Ok(result)) => result,
            Ok(Err(_)) => Err(Error::NotConnected),
            Err(_) => Err(Error::Timeout),
        }
    }

    async fn send_bytes(&self, payload: Vec<u8>) -> Result<()> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.req_tx
            .send(Request::Send {
                payload,
                reply: reply_tx,
            })
            .await
            .map_err(|_| Error::NotConnected)?;
        reply_rx.await.map_err(|_| Error::NotConnected)?
    }
}

// ---------------------------------------------------------------------------
// Pump loop
// ---------------------------------------------------------------------------

/// The pump task. Owns the transport and the parser for the channel's
/// whole lifetime; the only writer of parser state.
async fn pump_loop(
    mut transport: Box<dyn Transport>,
    mut parser: ResponseParser,
    urc_tx: broadcast::Sender<UrcEvent>,
    mut req_rx: mpsc::Receiver<Request>,
    cancel: CancellationToken,
) {
    let mut events = Vec::new();
    let mut suspended = false;

    loop {
        tokio::select! {
            biased;

            _ = cancel.cancelled() => {
                debug!("channel closed, shutting down pump");
                let _ = transport.close().await;
                break;
            }

            req = req_rx.recv() => match req {
                Some(Request::Command { payload, dataprompt, classifier, timeout, reply }) => {
                    let result = execute_command(
                        &mut *transport,
                        &mut parser,
                        &urc_tx,
                        &cancel,
                        &payload,
                        dataprompt,
                        classifier,
                        timeout,
                    )
                    .await;
                    let _ = reply.send(result);
                }
                Some(Request::Send { payload, reply }) => {
                    let _ = reply.send(transport.send(&payload).await);
                }
                Some(Request::Suspend { reply }) => {
                    suspended = true;
                    let _ = reply.send(());
                }
                Some(Request::Resume { reply }) => {
                    suspended = false;
                    let _ = reply.send(());
                }
                None => {
                    debug!("all channel handles dropped, exiting pump");
                    let _ = transport.close().await;
                    break;
                }
            },

            // Idle: keep feeding the parser so URCs arrive promptly.
            _ = idle_read(&mut *transport, &mut parser, &urc_tx, &mut events),
                if !suspended => {}
        }
    }
}

/// One idle read cycle: a single byte with a short timeout, fed to the
/// parser. While idle every completed line is unsolicited by definition.
async fn idle_read(
    transport: &mut dyn Transport,
    parser: &mut ResponseParser,
    urc_tx: &broadcast::Sender<UrcEvent>,
    events: &mut Vec<ParserEvent>,
) {
    let mut byte = [0u8; 1];
    match transport.receive(&mut byte, IDLE_READ_TIMEOUT).await {
        Ok(n) if n > 0 => {
            events.clear();
            parser.feed(&byte[..n], events);
            for event in events.drain(..) {
                match event {
                    ParserEvent::Urc(line) => publish_urc(urc_tx, line),
                    ParserEvent::Response(body) => {
                        // Stale final from an abandoned transaction; no
                        // issuer is waiting for it.
                        debug!(len = body.len(), "discarding response with no issuer");
                    }
                }
            }
        }
        _ => {
            // Timeout or transport error: yield briefly so the loop can
            // check for requests and cancellation.
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    }
}

/// Execute one command/response transaction on the pump task.
///
/// Arms the parser, writes the payload, then reads byte-by-byte against a
/// deadline fixed at the start. URCs recognized mid-transaction are
/// published as they occur.
#[allow(clippy::too_many_arguments)]
async fn execute_command(
    transport: &mut dyn Transport,
    parser: &mut ResponseParser,
    urc_tx: &broadcast::Sender<UrcEvent>,
    cancel: &CancellationToken,
    payload: &[u8],
    dataprompt: bool,
    classifier: Option<Box<dyn LineClassifier>>,
    timeout: Duration,
) -> Result<Vec<u8>> {
    parser.expect_response(dataprompt, classifier);

    if let Err(e) = transport.send(payload).await {
        parser.reset();
        return Err(e);
    }

    let deadline = tokio::time::Instant::now() + timeout;
    let mut byte = [0u8; 1];
    let mut events = Vec::new();

    loop {
        let now = tokio::time::Instant::now();
        if now >= deadline {
            debug!("command timed out, forcing parser to idle");
            parser.reset();
            return Err(Error::Timeout);
        }
        let remaining = deadline - now;

        tokio::select! {
            biased;

            _ = cancel.cancelled() => {
                parser.reset();
                return Err(Error::NotConnected);
            }

            result = transport.receive(&mut byte, remaining) => match result {
                Ok(n) if n > 0 => {
                    events.clear();
                    parser.feed(&byte[..n], &mut events);
                    for event in events.drain(..) {
                        match event {
                            ParserEvent::Response(body) => return Ok(body),
                            ParserEvent::Urc(line) => publish_urc(urc_tx, line),
                        }
                    }
                }
                Ok(_) => {}
                // Transport-level timeout: the deadline check at the top
                // of the loop decides whether the transaction is over.
                Err(Error::Timeout) => {}
                Err(e) => {
                    parser.reset();
                    return Err(e);
                }
            }
        }
    }
}

fn publish_urc(urc_tx: &broadcast::Sender<UrcEvent>, line: Vec<u8>) {
    let line = String::from_utf8_lossy(&line).into_owned();
    debug!(%line, "unsolicited result code");
    let _ = urc_tx.send(UrcEvent { line });
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
