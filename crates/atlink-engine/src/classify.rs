//! Line classification for AT responses.
//!
//! Every complete line the modem sends is mapped to a [`ResponseKind`]
//! verdict: part of an ongoing response, a final success/failure, an
//! unsolicited result code, or an announcement that raw/hex payload bytes
//! follow. Classification runs through an ordered chain:
//!
//! 1. the per-command classifier supplied with the command (if any),
//! 2. the channel's default classifier (if any),
//! 3. the built-in prefix tables in [`classify_line`].
//!
//! The first classifier to return `Some` wins; the built-in classifier
//! always resolves to a concrete verdict, so the chain never falls through.

/// Verdict for one complete response line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseKind {
    /// Part of an ongoing response; more lines follow.
    Intermediate,
    /// A final line that ends the response with a failure
    /// (`ERROR`, `NO CARRIER`, `+CME ERROR:`, ...).
    Final,
    /// A final line that ends the response with success (`OK`, `"> "`).
    ///
    /// The line itself is not included in the delivered response body.
    FinalOk,
    /// An unsolicited result code, delivered out-of-band.
    Urc,
    /// The next `n` bytes of the stream are verbatim binary payload.
    RawDataFollows(usize),
    /// The next `n` bytes of payload arrive as ASCII hex digit pairs.
    HexDataFollows(usize),
}

/// A pluggable response-line classifier.
///
/// Returning `None` means "no opinion" and defers to the next classifier
/// in the chain. Implemented for plain closures, so ad-hoc per-command
/// classifiers can be written inline:
///
/// ```
/// use atlink_engine::classify::ResponseKind;
///
/// let sms_prompt = |line: &[u8]| {
///     line.starts_with(b"+CMGS:").then_some(ResponseKind::Intermediate)
/// };
/// ```
pub trait LineClassifier: Send {
    /// Classify one complete line (terminators stripped), or defer.
    fn classify(&self, line: &[u8]) -> Option<ResponseKind>;
}

impl<F> LineClassifier for F
where
    F: Fn(&[u8]) -> Option<ResponseKind> + Send,
{
    fn classify(&self, line: &[u8]) -> Option<ResponseKind> {
        self(line)
    }
}

/// Prefixes of unsolicited result codes the built-in classifier knows.
///
/// Deliberately minimal: module-specific URCs (`+CMTI:`, `+CIEV:`, ...)
/// belong in a channel-default or per-command classifier, not here.
pub const URC_PREFIXES: &[&str] = &["RING"];

/// Prefixes of final failure responses.
pub const FINAL_ERROR_PREFIXES: &[&str] = &["ERROR", "NO CARRIER", "+CME ERROR:", "+CMS ERROR:"];

/// Prefixes of final success responses.
pub const FINAL_OK_PREFIXES: &[&str] = &["OK", "> "];

/// Returns `true` if `line` starts with any prefix in `table`.
pub fn prefix_in_table(line: &[u8], table: &[&str]) -> bool {
    table.iter().any(|prefix| line.starts_with(prefix.as_bytes()))
}

/// The built-in line classifier.
///
/// Checks the URC table first, then error finals, then success finals;
/// anything unrecognized is an intermediate response line. Unlike the
/// pluggable classifiers this always returns a concrete verdict, which is
/// what terminates the classification chain.
pub fn classify_line(line: &[u8]) -> ResponseKind {
    if prefix_in_table(line, URC_PREFIXES) {
        ResponseKind::Urc
    } else if prefix_in_table(line, FINAL_ERROR_PREFIXES) {
        ResponseKind::Final
    } else if prefix_in_table(line, FINAL_OK_PREFIXES) {
        ResponseKind::FinalOk
    } else {
        ResponseKind::Intermediate
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_ok() {
        assert_eq!(classify_line(b"OK"), ResponseKind::FinalOk);
    }

    #[test]
    fn classify_dataprompt() {
        assert_eq!(classify_line(b"> "), ResponseKind::FinalOk);
    }

    #[test]
    fn classify_error_variants() {
        assert_eq!(classify_line(b"ERROR"), ResponseKind::Final);
        assert_eq!(classify_line(b"NO CARRIER"), ResponseKind::Final);
        assert_eq!(classify_line(b"+CME ERROR: 10"), ResponseKind::Final);
        assert_eq!(classify_line(b"+CMS ERROR: 304"), ResponseKind::Final);
    }

    #[test]
    fn classify_ring_urc() {
        assert_eq!(classify_line(b"RING"), ResponseKind::Urc);
    }

    #[test]
    fn classify_data_line_is_intermediate() {
        assert_eq!(classify_line(b"+CREG: 1"), ResponseKind::Intermediate);
        assert_eq!(classify_line(b"random noise"), ResponseKind::Intermediate);
    }

    #[test]
    fn classify_is_prefix_based() {
        // Prefix tables match on starts_with, not whole-line equality.
        assert_eq!(classify_line(b"OK FINE"), ResponseKind::FinalOk);
        assert_eq!(classify_line(b"ERROR: details"), ResponseKind::Final);
    }

    #[test]
    fn urc_table_checked_before_error_table() {
        // A custom table could overlap; the built-in order is URC first.
        assert_eq!(classify_line(b"RING"), ResponseKind::Urc);
    }

    #[test]
    fn closure_classifier_defers_with_none() {
        let classifier = |line: &[u8]| {
            line.starts_with(b"CONNECT")
                .then_some(ResponseKind::Final)
        };
        assert_eq!(classifier.classify(b"CONNECT 9600"), Some(ResponseKind::Final));
        assert_eq!(classifier.classify(b"OK"), None);
    }
}
