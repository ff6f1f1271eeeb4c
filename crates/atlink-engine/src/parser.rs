//! Incremental AT response parser.
//!
//! [`ResponseParser`] is a byte-at-a-time state machine that reassembles
//! the modem's byte stream into classified lines, accumulates multi-line
//! responses, detects unsolicited result codes, and switches into binary
//! or hex payload capture when a classifier announces one.
//!
//! The parser owns a bounded accumulation buffer and never allocates per
//! byte. It has a single writer (the channel's pump task feeds it), so it
//! needs no internal locking. Completed responses and URCs are pushed as
//! [`ParserEvent`]s into a caller-supplied vector from [`ResponseParser::feed`].
//!
//! # Buffer layout
//!
//! The buffer holds the committed multi-line response in `[0, line_start)`
//! and the line currently being assembled in `[line_start, len)`. Committed
//! lines are joined with a single `\n`, inserted lazily when the first byte
//! of a new line arrives rather than when a terminator is seen, so the
//! joined form does not depend on which terminator sequence the modem uses.
//!
//! # Bounded-memory policy
//!
//! Appends beyond the configured capacity (minus one reserved slot) are
//! silently dropped. An oversized response is truncated, not an error:
//! the parser keeps framing correctly and the next transaction starts
//! clean. This mirrors the fixed-buffer behavior modem firmware was
//! designed against and keeps worst-case memory use constant.

use crate::classify::{classify_line, LineClassifier, ResponseKind};

/// Parser state. `Idle` means no command is outstanding; every complete
/// line seen while idle is dispatched as unsolicited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Idle,
    ReadLine,
    DataPrompt,
    RawData,
    HexData,
}

/// An event produced while feeding bytes to the parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParserEvent {
    /// A complete response body (final verdict seen). Lines are
    /// `\n`-joined; the terminating `OK` line, if any, is not included.
    Response(Vec<u8>),
    /// One unsolicited result code line.
    Urc(Vec<u8>),
}

/// Incremental response parser and classifier.
pub struct ResponseParser {
    state: State,
    /// Accumulation buffer; never grows past `capacity - 1`.
    buf: Vec<u8>,
    capacity: usize,
    /// Start offset of the line currently being assembled.
    line_start: usize,
    /// Remaining payload bytes expected in RawData/HexData mode.
    data_left: usize,
    /// Set when a `\r` completed the line that switched into a data mode;
    /// the `\n` of a CRLF pair then belongs to the framing, not the payload.
    swallow_lf: bool,
    /// High nibble of a half-decoded hex pair, HexData mode only.
    nibble: Option<u8>,
    /// One-shot classifier for the in-flight command; cleared on reset.
    command_classifier: Option<Box<dyn LineClassifier>>,
    /// Channel-wide classifier, fixed for the parser's lifetime.
    default_classifier: Option<Box<dyn LineClassifier>>,
}

/// Smallest usable buffer: one content byte plus the reserved slot.
const MIN_CAPACITY: usize = 2;

impl ResponseParser {
    /// Create a parser with the given buffer capacity and no default
    /// classifier.
    pub fn new(capacity: usize) -> Self {
        Self::with_default_classifier(capacity, None)
    }

    /// Create a parser with a channel-wide default classifier, consulted
    /// after the per-command classifier and before the built-in tables.
    pub fn with_default_classifier(
        capacity: usize,
        default_classifier: Option<Box<dyn LineClassifier>>,
    ) -> Self {
        let capacity = capacity.max(MIN_CAPACITY);
        ResponseParser {
            state: State::Idle,
            buf: Vec::with_capacity(capacity),
            capacity,
            line_start: 0,
            data_left: 0,
            swallow_lf: false,
            nibble: None,
            command_classifier: None,
            default_classifier,
        }
    }

    /// Return to `Idle` and clear all transaction state, including the
    /// per-command classifier. Called after every completed transaction
    /// and when a transaction is abandoned on timeout or closure.
    pub fn reset(&mut self) {
        self.state = State::Idle;
        self.buf.clear();
        self.line_start = 0;
        self.data_left = 0;
        self.swallow_lf = false;
        self.nibble = None;
        self.command_classifier = None;
    }

    /// Arm the parser for the response to a command about to be sent.
    ///
    /// With `dataprompt` set the parser additionally treats a bare `"> "`
    /// filling the whole buffer as an immediate line-complete trigger,
    /// which is how modems hand over to raw payload entry (`AT+CMGS`).
    pub fn expect_response(
        &mut self,
        dataprompt: bool,
        classifier: Option<Box<dyn LineClassifier>>,
    ) {
        self.command_classifier = classifier;
        self.state = if dataprompt {
            State::DataPrompt
        } else {
            State::ReadLine
        };
    }

    /// `true` if no command response is pending.
    pub fn is_idle(&self) -> bool {
        self.state == State::Idle
    }

    /// Feed bytes to the parser, pushing any completed responses or URCs
    /// into `events` in the order they were recognized.
    pub fn feed(&mut self, data: &[u8], events: &mut Vec<ParserEvent>) {
        for &byte in data {
            match self.state {
                State::Idle | State::ReadLine | State::DataPrompt => {
                    self.feed_line_byte(byte, events)
                }
                State::RawData => self.feed_raw_byte(byte),
                State::HexData => self.feed_hex_byte(byte),
            }
        }
    }

    fn feed_line_byte(&mut self, byte: u8, events: &mut Vec<ParserEvent>) {
        if byte == b'\r' || byte == b'\n' {
            // Terminators are never stored; a non-empty current line is
            // complete. Empty lines (e.g. the \n of \r\n) fall through
            // handle_line untouched.
            self.handle_line(events);
            if byte == b'\r' && matches!(self.state, State::RawData | State::HexData) {
                self.swallow_lf = true;
            }
            return;
        }

        // Lazy separator: the previous line was committed, so join with a
        // single \n before the new line's first byte.
        if !self.buf.is_empty() && self.line_start == self.buf.len() {
            self.append(b'\n');
            self.line_start = self.buf.len();
        }
        self.append(byte);

        // Dataprompt: a bare "> " as the entire buffer completes without
        // any terminator on the wire.
        if self.state == State::DataPrompt && self.buf.len() == 2 && self.buf == b"> " {
            self.handle_line(events);
        }
    }

    fn feed_raw_byte(&mut self, byte: u8) {
        if self.swallow_lf {
            self.swallow_lf = false;
            if byte == b'\n' {
                return;
            }
        }
        if self.data_left > 0 {
            // Verbatim: \r and \n are payload here, not terminators.
            self.append(byte);
            self.data_left -= 1;
        }
        if self.data_left == 0 {
            self.finish_data();
        }
    }

    fn feed_hex_byte(&mut self, byte: u8) {
        if self.swallow_lf {
            self.swallow_lf = false;
            if byte == b'\n' {
                return;
            }
        }
        if self.data_left > 0 {
            if let Some(value) = hex_digit(byte) {
                match self.nibble.take() {
                    None => self.nibble = Some(value),
                    Some(high) => {
                        self.append(high << 4 | value);
                        // data_left counts decoded bytes, not wire bytes.
                        self.data_left -= 1;
                    }
                }
            }
            // Non-hex bytes (stray whitespace, line noise) are skipped
            // without disturbing the nibble accumulator.
        }
        if self.data_left == 0 {
            self.finish_data();
        }
    }

    /// Bounded append: bytes beyond `capacity - 1` are silently dropped.
    fn append(&mut self, byte: u8) {
        if self.buf.len() < self.capacity - 1 {
            self.buf.push(byte);
        }
    }

    /// Payload capture finished: terminate the payload line, commit it,
    /// and resume ordinary line framing.
    fn finish_data(&mut self) {
        self.append(b'\n');
        self.line_start = self.buf.len();
        self.nibble = None;
        self.state = State::ReadLine;
    }

    /// Handle a completed line: classify it and act on the verdict.
    fn handle_line(&mut self, events: &mut Vec<ParserEvent>) {
        // Empty lines never reach the classifiers.
        if self.buf.len() == self.line_start {
            return;
        }

        let line = &self.buf[self.line_start..];

        // Classification chain: per-command, then channel default, then
        // the built-in tables (which always produce a concrete verdict).
        let kind = self
            .command_classifier
            .as_ref()
            .and_then(|c| c.classify(line))
            .or_else(|| {
                self.default_classifier
                    .as_ref()
                    .and_then(|c| c.classify(line))
            })
            .unwrap_or_else(|| classify_line(line));

        // Tagged URCs, and any line at all while idle, go out-of-band and
        // leave the committed response untouched.
        if kind == ResponseKind::Urc || self.state == State::Idle {
            events.push(ParserEvent::Urc(line.to_vec()));
            if self.line_start > 0 {
                // Eat the separator that was inserted ahead of this line.
                self.line_start -= 1;
            }
            self.buf.truncate(self.line_start);
            return;
        }

        if kind == ResponseKind::FinalOk {
            // The OK line itself is not part of the response body.
            if self.line_start > 0 {
                self.line_start -= 1;
            }
            self.buf.truncate(self.line_start);
        } else {
            // Commit the line into the response.
            self.line_start = self.buf.len();
        }

        match kind {
            ResponseKind::Final | ResponseKind::FinalOk => {
                events.push(ParserEvent::Response(self.buf.clone()));
                self.reset();
            }
            ResponseKind::RawDataFollows(n) => {
                self.data_left = n;
                self.state = State::RawData;
                if n == 0 {
                    self.finish_data();
                }
            }
            ResponseKind::HexDataFollows(n) => {
                self.data_left = n;
                self.nibble = None;
                self.state = State::HexData;
                if n == 0 {
                    self.finish_data();
                }
            }
            ResponseKind::Intermediate => {}
            // Urc was dispatched above.
            ResponseKind::Urc => unreachable!(),
        }
    }
}

impl std::fmt::Debug for ResponseParser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResponseParser")
            .field("state", &self.state)
            .field("buf_len", &self.buf.len())
            .field("line_start", &self.line_start)
            .field("data_left", &self.data_left)
            .finish_non_exhaustive()
    }
}

/// Decode one ASCII hex digit, case-insensitive.
fn hex_digit(byte: u8) -> Option<u8> {
    match byte {
        b'0'..=b'9' => Some(byte - b'0'),
        b'a'..=b'f' => Some(byte - b'a' + 10),
        b'A'..=b'F' => Some(byte - b'A' + 10),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn armed_parser() -> ResponseParser {
        let mut parser = ResponseParser::new(256);
        parser.expect_response(false, None);
        parser
    }

    fn feed(parser: &mut ResponseParser, data: &[u8]) -> Vec<ParserEvent> {
        let mut events = Vec::new();
        parser.feed(data, &mut events);
        events
    }

    // -------------------------------------------------------------------
    // Line reassembly and final verdicts
    // -------------------------------------------------------------------

    #[test]
    fn ok_alone_yields_empty_response() {
        let mut parser = armed_parser();
        let events = feed(&mut parser, b"OK\r\n");
        assert_eq!(events, vec![ParserEvent::Response(Vec::new())]);
        assert!(parser.is_idle());
    }

    #[test]
    fn single_line_response() {
        let mut parser = armed_parser();
        let events = feed(&mut parser, b"+CREG: 1\r\nOK\r\n");
        assert_eq!(events, vec![ParserEvent::Response(b"+CREG: 1".to_vec())]);
        assert!(parser.is_idle());
    }

    #[test]
    fn multi_line_response_newline_joined() {
        let mut parser = armed_parser();
        let events = feed(&mut parser, b"+CGDCONT: 1\r\n+CGDCONT: 2\r\nOK\r\n");
        assert_eq!(
            events,
            vec![ParserEvent::Response(b"+CGDCONT: 1\n+CGDCONT: 2".to_vec())]
        );
    }

    #[test]
    fn error_final_line_is_included_in_body() {
        let mut parser = armed_parser();
        let events = feed(&mut parser, b"+CME ERROR: 10\r\n");
        assert_eq!(
            events,
            vec![ParserEvent::Response(b"+CME ERROR: 10".to_vec())]
        );
        assert!(parser.is_idle());
    }

    #[test]
    fn split_delivery_across_feeds() {
        let mut parser = armed_parser();
        assert!(feed(&mut parser, b"+CS").is_empty());
        assert!(feed(&mut parser, b"Q: 21,0\r").is_empty());
        let events = feed(&mut parser, b"\nOK\r\n");
        assert_eq!(events, vec![ParserEvent::Response(b"+CSQ: 21,0".to_vec())]);
    }

    #[test]
    fn bare_cr_terminates_a_line() {
        // Some modems terminate with \r only; either terminator completes
        // a non-empty line.
        let mut parser = armed_parser();
        let events = feed(&mut parser, b"+CSQ: 4,0\rOK\r");
        assert_eq!(events, vec![ParserEvent::Response(b"+CSQ: 4,0".to_vec())]);
    }

    // -------------------------------------------------------------------
    // Empty-line suppression
    // -------------------------------------------------------------------

    #[test]
    fn consecutive_terminators_fire_nothing() {
        let mut parser = armed_parser();
        let events = feed(&mut parser, b"\r\n\r\n");
        assert!(events.is_empty());
        assert!(!parser.is_idle());
    }

    #[test]
    fn blank_lines_between_content_are_dropped() {
        let mut parser = armed_parser();
        let events = feed(&mut parser, b"\r\n+CREG: 1\r\n\r\nOK\r\n");
        assert_eq!(events, vec![ParserEvent::Response(b"+CREG: 1".to_vec())]);
    }

    // -------------------------------------------------------------------
    // Idempotent reset
    // -------------------------------------------------------------------

    #[test]
    fn reset_is_idempotent() {
        let mut parser = armed_parser();
        feed(&mut parser, b"+CREG: 1\r\npartial li");
        parser.reset();
        parser.reset();
        parser.expect_response(false, None);
        let events = feed(&mut parser, b"OK\r\n");
        assert_eq!(events, vec![ParserEvent::Response(Vec::new())]);
    }

    // -------------------------------------------------------------------
    // Unsolicited dispatch
    // -------------------------------------------------------------------

    #[test]
    fn urc_intercepted_while_busy() {
        let mut parser = armed_parser();
        let events = feed(&mut parser, b"RING\r\n+CREG: 1\r\nOK\r\n");
        assert_eq!(
            events,
            vec![
                ParserEvent::Urc(b"RING".to_vec()),
                ParserEvent::Response(b"+CREG: 1".to_vec()),
            ]
        );
    }

    #[test]
    fn urc_between_committed_lines_leaves_body_intact() {
        let mut parser = armed_parser();
        let events = feed(&mut parser, b"+CREG: 1\r\nRING\r\n+CREG: 2\r\nOK\r\n");
        assert_eq!(
            events,
            vec![
                ParserEvent::Urc(b"RING".to_vec()),
                ParserEvent::Response(b"+CREG: 1\n+CREG: 2".to_vec()),
            ]
        );
    }

    #[test]
    fn idle_lines_go_to_urc_path() {
        let mut parser = ResponseParser::new(256);
        let events = feed(&mut parser, b"+CMTI: \"SM\",3\r\n");
        assert_eq!(events, vec![ParserEvent::Urc(b"+CMTI: \"SM\",3".to_vec())]);
        assert!(parser.is_idle());
    }

    #[test]
    fn idle_ok_is_unsolicited_not_response() {
        // Stale bytes from an abandoned transaction: while idle even a
        // would-be final line is dispatched out-of-band.
        let mut parser = ResponseParser::new(256);
        let events = feed(&mut parser, b"OK\r\n");
        assert_eq!(events, vec![ParserEvent::Urc(b"OK".to_vec())]);
    }

    // -------------------------------------------------------------------
    // Per-command and default classifiers
    // -------------------------------------------------------------------

    #[test]
    fn per_command_classifier_wins() {
        let mut parser = ResponseParser::new(256);
        // Treat the CONNECT line as final for this command only.
        parser.expect_response(
            false,
            Some(Box::new(|line: &[u8]| {
                line.starts_with(b"CONNECT").then_some(ResponseKind::Final)
            })),
        );
        let events = feed(&mut parser, b"CONNECT 9600\r\n");
        assert_eq!(events, vec![ParserEvent::Response(b"CONNECT 9600".to_vec())]);
    }

    #[test]
    fn per_command_classifier_cleared_on_reset() {
        let mut parser = ResponseParser::new(256);
        parser.expect_response(
            false,
            Some(Box::new(|_: &[u8]| Some(ResponseKind::Final))),
        );
        feed(&mut parser, b"anything\r\n");
        assert!(parser.is_idle());

        // Re-armed without a classifier: built-in rules apply again.
        parser.expect_response(false, None);
        let events = feed(&mut parser, b"anything\r\nOK\r\n");
        assert_eq!(events, vec![ParserEvent::Response(b"anything".to_vec())]);
    }

    #[test]
    fn default_classifier_extends_urc_table() {
        let mut parser = ResponseParser::with_default_classifier(
            256,
            Some(Box::new(|line: &[u8]| {
                line.starts_with(b"+CMTI:").then_some(ResponseKind::Urc)
            })),
        );
        parser.expect_response(false, None);
        let events = feed(&mut parser, b"+CMTI: \"SM\",1\r\nOK\r\n");
        assert_eq!(
            events,
            vec![
                ParserEvent::Urc(b"+CMTI: \"SM\",1".to_vec()),
                ParserEvent::Response(Vec::new()),
            ]
        );
    }

    #[test]
    fn per_command_defers_to_default_with_none() {
        let mut parser = ResponseParser::with_default_classifier(
            256,
            Some(Box::new(|line: &[u8]| {
                (line == b"DONE").then_some(ResponseKind::Final)
            })),
        );
        // Per-command classifier has no opinion on anything.
        parser.expect_response(false, Some(Box::new(|_: &[u8]| None)));
        let events = feed(&mut parser, b"DONE\r\n");
        assert_eq!(events, vec![ParserEvent::Response(b"DONE".to_vec())]);
    }

    // -------------------------------------------------------------------
    // Dataprompt
    // -------------------------------------------------------------------

    #[test]
    fn dataprompt_completes_without_terminator() {
        let mut parser = ResponseParser::new(256);
        parser.expect_response(true, None);
        let events = feed(&mut parser, b"> ");
        // "> " is in the success table: empty response, ready for payload.
        assert_eq!(events, vec![ParserEvent::Response(Vec::new())]);
        assert!(parser.is_idle());
    }

    #[test]
    fn prompt_sequence_ignored_without_dataprompt_arming() {
        let mut parser = armed_parser();
        assert!(feed(&mut parser, b"> ").is_empty());
        // It still classifies as a success line once terminated.
        let events = feed(&mut parser, b"\r\n");
        assert_eq!(events, vec![ParserEvent::Response(Vec::new())]);
    }

    #[test]
    fn dataprompt_only_matches_whole_buffer() {
        let mut parser = ResponseParser::new(256);
        parser.expect_response(true, None);
        // "> " preceded by content is not the prompt.
        let events = feed(&mut parser, b"x> ");
        assert!(events.is_empty());
    }

    // -------------------------------------------------------------------
    // Raw data mode
    // -------------------------------------------------------------------

    fn rawdata_classifier(n: usize) -> Box<dyn LineClassifier> {
        Box::new(move |line: &[u8]| {
            line.starts_with(b"+RECEIVE:")
                .then_some(ResponseKind::RawDataFollows(n))
        })
    }

    #[test]
    fn raw_bytes_kept_verbatim_including_terminators() {
        let mut parser = ResponseParser::new(256);
        parser.expect_response(false, Some(rawdata_classifier(3)));
        let mut events = feed(&mut parser, b"+RECEIVE: 3\r\n");
        assert!(events.is_empty());

        // Payload contains both terminator characters.
        events = feed(&mut parser, b"\r\n\x00");
        assert!(events.is_empty());

        events = feed(&mut parser, b"OK\r\n");
        assert_eq!(
            events,
            vec![ParserEvent::Response(b"+RECEIVE: 3\r\n\x00\n".to_vec())]
        );
        assert!(parser.is_idle());
    }

    #[test]
    fn line_framing_resumes_after_raw_data() {
        let mut parser = ResponseParser::new(256);
        parser.expect_response(false, Some(rawdata_classifier(2)));
        let events = feed(&mut parser, b"+RECEIVE: 2\r\nab+TRAIL\r\nOK\r\n");
        // Payload line gets its synthetic terminator, then +TRAIL is framed
        // as an ordinary committed line.
        assert_eq!(
            events,
            vec![ParserEvent::Response(b"+RECEIVE: 2ab\n\n+TRAIL".to_vec())]
        );
    }

    #[test]
    fn zero_length_raw_data_returns_to_readline() {
        let mut parser = ResponseParser::new(256);
        parser.expect_response(false, Some(rawdata_classifier(0)));
        let events = feed(&mut parser, b"+RECEIVE: 0\r\nOK\r\n");
        assert_eq!(
            events,
            vec![ParserEvent::Response(b"+RECEIVE: 0\n".to_vec())]
        );
    }

    // -------------------------------------------------------------------
    // Hex data mode
    // -------------------------------------------------------------------

    fn hexdata_classifier(n: usize) -> Box<dyn LineClassifier> {
        Box::new(move |line: &[u8]| {
            line.starts_with(b"+HEXDATA:")
                .then_some(ResponseKind::HexDataFollows(n))
        })
    }

    #[test]
    fn hex_pairs_decode_to_raw_bytes() {
        let mut parser = ResponseParser::new(256);
        parser.expect_response(false, Some(hexdata_classifier(3)));
        let events = feed(&mut parser, b"+HEXDATA: 3\r\n41420d\r\nOK\r\n");
        assert_eq!(
            events,
            vec![ParserEvent::Response(b"+HEXDATA: 3AB\r\n".to_vec())]
        );
        assert!(parser.is_idle());
    }

    #[test]
    fn hex_decode_is_case_insensitive() {
        let mut parser = ResponseParser::new(256);
        parser.expect_response(false, Some(hexdata_classifier(2)));
        let events = feed(&mut parser, b"+HEXDATA: 2\r\naBCd\r\nOK\r\n");
        assert_eq!(
            events,
            vec![ParserEvent::Response(b"+HEXDATA: 2\xAB\xCD\n".to_vec())]
        );
    }

    #[test]
    fn hex_decode_skips_non_hex_noise() {
        let mut parser = ResponseParser::new(256);
        parser.expect_response(false, Some(hexdata_classifier(2)));
        // Spaces between pairs are tolerated.
        let events = feed(&mut parser, b"+HEXDATA: 2\r\n41 42\r\nOK\r\n");
        assert_eq!(
            events,
            vec![ParserEvent::Response(b"+HEXDATA: 2AB\n".to_vec())]
        );
    }

    #[test]
    fn hex_split_across_feeds_keeps_nibble_state() {
        let mut parser = ResponseParser::new(256);
        parser.expect_response(false, Some(hexdata_classifier(1)));
        assert!(feed(&mut parser, b"+HEXDATA: 1\r\n4").is_empty());
        let events = feed(&mut parser, b"1OK\r\n");
        assert_eq!(
            events,
            vec![ParserEvent::Response(b"+HEXDATA: 1A\n".to_vec())]
        );
    }

    // -------------------------------------------------------------------
    // Capacity bound
    // -------------------------------------------------------------------

    #[test]
    fn overlong_input_never_exceeds_capacity() {
        let mut parser = ResponseParser::new(16);
        parser.expect_response(false, None);
        // 64 bytes into a 16-byte buffer: 15 survive (one slot reserved),
        // the rest are dropped without error.
        let mut events = feed(&mut parser, &vec![b'x'; 64]);
        assert!(events.is_empty());
        // With the buffer saturated, the final OK can no longer accumulate
        // and the transaction would run to its timeout. No event fires and
        // nothing is corrupted.
        events = feed(&mut parser, b"\r\nOK\r\n");
        assert!(events.is_empty());
    }

    #[test]
    fn parsing_recovers_after_truncation() {
        let mut parser = ResponseParser::new(16);
        parser.expect_response(false, None);
        feed(&mut parser, &vec![b'x'; 64]);
        feed(&mut parser, b"\r\nOK\r\n");

        // The timeout path force-resets; a fresh transaction then starts
        // from a clean buffer.
        parser.reset();
        parser.expect_response(false, None);
        let events = feed(&mut parser, b"+CSQ: 9\r\nOK\r\n");
        assert_eq!(events, vec![ParserEvent::Response(b"+CSQ: 9".to_vec())]);
    }

    #[test]
    fn degenerate_capacity_does_not_panic() {
        let mut parser = ResponseParser::new(0);
        parser.expect_response(false, None);
        // Clamped to the minimum capacity: a single content byte fits, the
        // rest is dropped. "O" alone is not a final line.
        let events = feed(&mut parser, b"OK\r\n");
        assert!(events.is_empty());
        assert!(!parser.is_idle());
    }
}
