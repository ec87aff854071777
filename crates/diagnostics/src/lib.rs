//! Diagnostics for the AT parser toolkit.
//!
//! Provides [`Diagnostic`], [`Severity`], [`Span`], and [`LineIndex`] types
//! used to report parser errors and scan findings. Diagnostic codes are
//! defined in the [`codes`] module.

#![warn(missing_docs)]

/// Diagnostic ID constants generated from `spec/diagnostics.json`.
pub mod codes;

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::BTreeMap;

// ── LineIndex ────────────────────────────────────────────────────────────

/// Maps byte offsets in a source string to line and column positions.
///
/// Lines and columns are **0-indexed**. A line ends at `\n`, at `\r` not
/// followed by `\n`, or at `\r\n`, which is how modems terminate AT lines.
/// Lookups are O(log n) via binary search.
#[derive(Debug, Clone)]
pub struct LineIndex {
    /// Byte offset of the start of each line. `line_starts[0]` is always 0.
    line_starts: Vec<usize>,
}

impl LineIndex {
    /// Build a `LineIndex` from source text.
    pub fn new(text: &str) -> Self {
        let bytes = text.as_bytes();
        let mut line_starts = vec![0usize];
        let mut i = 0;
        while i < bytes.len() {
            match bytes[i] {
                b'\r' if bytes.get(i + 1) == Some(&b'\n') => {
                    line_starts.push(i + 2);
                    i += 2;
                }
                b'\r' | b'\n' => {
                    line_starts.push(i + 1);
                    i += 1;
                }
                _ => i += 1,
            }
        }
        Self { line_starts }
    }

    /// Convert a byte offset to a 0-indexed `(line, column)` pair.
    ///
    /// If `offset` is past the end of the source, the last line is returned
    /// with the column measured from its start.
    pub fn line_col(&self, offset: usize) -> (usize, usize) {
        let line = match self.line_starts.binary_search(&offset) {
            Ok(exact) => exact,
            Err(next) => next.saturating_sub(1),
        };
        (line, offset.saturating_sub(self.line_starts[line]))
    }

    /// Byte offset of the start of the given 0-indexed line.
    pub fn line_start(&self, line: usize) -> Option<usize> {
        self.line_starts.get(line).copied()
    }

    /// Total number of lines (at least 1, even for empty input).
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }
}

/// Severity level for a diagnostic message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[non_exhaustive]
pub enum Severity {
    /// Hard error: the input is invalid or the request cannot be served.
    Error,
    /// Warning: the input is valid but reports a failure or was cut short.
    Warn,
    /// Informational note.
    Info,
}

/// Byte span in the source input.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Span {
    /// Byte offset of the first character (0-based).
    pub start: usize,
    /// Byte offset one past the last character.
    pub end: usize,
}

impl Span {
    /// Create a span covering `[start, end)`.
    ///
    /// Panics if `end < start`.
    pub fn new(start: usize, end: usize) -> Self {
        assert!(end >= start, "Span end ({end}) < start ({start})");
        Self { start, end }
    }

    /// Create a zero-width span at the given position.
    pub fn empty(pos: usize) -> Self {
        Self {
            start: pos,
            end: pos,
        }
    }

    /// Length of the span in bytes.
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Whether the span is zero-width.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// A diagnostic message produced while scanning or querying AT text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Unique diagnostic code (e.g., `"AT1001"`).
    pub id: Cow<'static, str>,
    /// Severity level.
    pub severity: Severity,
    /// Human-readable diagnostic message.
    pub message: String,
    /// Optional byte span in the source input that this diagnostic relates to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub span: Option<Span>,
    /// Machine-readable context for tooling. Serialized only when present.
    ///
    /// `BTreeMap` keeps key order deterministic in serialized output.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<BTreeMap<String, String>>,
}

impl Diagnostic {
    /// Create a diagnostic with the given fields.
    pub fn new(
        id: impl Into<Cow<'static, str>>,
        severity: Severity,
        message: impl Into<String>,
        span: Option<Span>,
    ) -> Self {
        Self {
            id: id.into(),
            severity,
            message: message.into(),
            span,
            context: None,
        }
    }

    /// Create a diagnostic with the severity declared for `id` in the
    /// registry. Unknown IDs are reported as warnings.
    pub fn registered(id: &'static str, message: impl Into<String>, span: Option<Span>) -> Self {
        let severity = default_severity(id).unwrap_or(Severity::Warn);
        Self::new(id, severity, message, span)
    }

    /// Shorthand for an `Error` diagnostic.
    pub fn error(
        id: impl Into<Cow<'static, str>>,
        message: impl Into<String>,
        span: Option<Span>,
    ) -> Self {
        Self::new(id, Severity::Error, message, span)
    }

    /// Shorthand for a `Warn` diagnostic.
    pub fn warn(
        id: impl Into<Cow<'static, str>>,
        message: impl Into<String>,
        span: Option<Span>,
    ) -> Self {
        Self::new(id, Severity::Warn, message, span)
    }

    /// Shorthand for an `Info` diagnostic.
    pub fn info(
        id: impl Into<Cow<'static, str>>,
        message: impl Into<String>,
        span: Option<Span>,
    ) -> Self {
        Self::new(id, Severity::Info, message, span)
    }

    /// Attach machine-readable context metadata (builder pattern).
    pub fn with_context(mut self, ctx: BTreeMap<String, String>) -> Self {
        self.context = Some(ctx);
        self
    }

    /// Returns the human-readable explanation for this diagnostic's code, if available.
    pub fn explain(&self) -> Option<&'static str> {
        explain(&self.id)
    }

    /// Whether this diagnostic is an error.
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warn => write!(f, "warn"),
            Severity::Info => write!(f, "info"),
        }
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}[{}]: {}", self.severity, self.id, self.message)
    }
}

/// Returns the human-readable explanation for a diagnostic code, if known.
pub fn explain(id: &str) -> Option<&'static str> {
    include!(concat!(env!("OUT_DIR"), "/generated_explain.rs"))
}

/// Returns the default severity declared for a diagnostic code, if known.
pub fn default_severity(id: &str) -> Option<Severity> {
    include!(concat!(env!("OUT_DIR"), "/generated_severity.rs"))
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_CODES: [&str; 12] = [
        codes::MALFORMED,
        codes::UNSUPPORTED,
        codes::OUT_OF_RANGE,
        codes::NO_DATA,
        codes::BUFFER_TOO_SMALL,
        codes::NOT_INITIALIZED,
        codes::INVALID_ARGUMENT,
        codes::END_OF_INPUT,
        codes::NEXT_LINE,
        codes::FINAL_ERROR,
        codes::MISSING_FINAL_RESPONSE,
        codes::LINE_LIMIT,
    ];

    // ── LineIndex ────────────────────────────────────────────────────────

    #[test]
    fn line_index_single_line() {
        let idx = LineIndex::new("AT+CFUN?");
        assert_eq!(idx.line_count(), 1);
        assert_eq!(idx.line_col(0), (0, 0));
        assert_eq!(idx.line_col(7), (0, 7));
    }

    #[test]
    fn line_index_crlf_is_one_break() {
        let idx = LineIndex::new("+CFUN: 1\r\nOK\r\n");
        assert_eq!(idx.line_count(), 3);
        assert_eq!(idx.line_col(10), (1, 0)); // 'O'
        assert_eq!(idx.line_col(11), (1, 1)); // 'K'
        assert_eq!(idx.line_start(2), Some(14));
    }

    #[test]
    fn line_index_bare_cr_and_lf() {
        let idx = LineIndex::new("a\rb\nc");
        assert_eq!(idx.line_count(), 3);
        assert_eq!(idx.line_col(2), (1, 0));
        assert_eq!(idx.line_col(4), (2, 0));
    }

    #[test]
    fn line_index_empty_input() {
        let idx = LineIndex::new("");
        assert_eq!(idx.line_count(), 1);
        assert_eq!(idx.line_col(0), (0, 0));
    }

    #[test]
    fn line_index_offset_past_end() {
        let idx = LineIndex::new("hi");
        assert_eq!(idx.line_col(100), (0, 100));
        assert_eq!(idx.line_start(1), None);
    }

    // ── Span ────────────────────────────────────────────────────────────

    #[test]
    fn span_len_and_empty() {
        let s = Span::new(5, 10);
        assert_eq!(s.len(), 5);
        assert!(!s.is_empty());
        assert!(Span::empty(7).is_empty());
    }

    #[test]
    #[should_panic(expected = "Span end (3) < start (5)")]
    fn span_new_inverted_panics() {
        Span::new(5, 3);
    }

    // ── Diagnostic ──────────────────────────────────────────────────────

    #[test]
    fn diagnostic_display() {
        let d = Diagnostic::error(codes::MALFORMED, "missing separator", None);
        assert_eq!(format!("{d}"), "error[AT1001]: missing separator");
        assert!(d.is_error());
    }

    #[test]
    fn explain_known_and_unknown() {
        assert!(explain(codes::OUT_OF_RANGE).unwrap().contains("never truncated"));
        assert!(explain("AT9999").is_none());
    }

    #[test]
    fn all_codes_have_explanations_and_severity() {
        for code in ALL_CODES {
            assert!(explain(code).is_some(), "{code} has no explain() entry");
            assert!(default_severity(code).is_some(), "{code} has no severity");
        }
        assert_eq!(default_severity(codes::NEXT_LINE), Some(Severity::Info));
        assert_eq!(default_severity(codes::FINAL_ERROR), Some(Severity::Warn));
    }

    #[test]
    fn registered_takes_severity_from_registry() {
        assert!(Diagnostic::registered(codes::MALFORMED, "x", None).is_error());
        let d = Diagnostic::registered(codes::MISSING_FINAL_RESPONSE, "x", None);
        assert_eq!(d.severity, Severity::Info);
        let d = Diagnostic::registered("AT9999", "x", None);
        assert_eq!(d.severity, Severity::Warn);
    }

    #[test]
    fn diagnostic_serde_omits_none_fields() {
        let d = Diagnostic::info(codes::MISSING_FINAL_RESPONSE, "no final response", None);
        let json = serde_json::to_string(&d).unwrap();
        assert!(!json.contains("span"), "{json}");
        assert!(!json.contains("context"), "{json}");
        let back: Diagnostic = serde_json::from_str(&json).unwrap();
        assert_eq!(d, back);
    }

    #[test]
    fn diagnostic_context_deterministic_order() {
        let d = Diagnostic::warn(codes::FINAL_ERROR, "+CME ERROR", Some(Span::new(0, 14)))
            .with_context(BTreeMap::from([
                ("result".into(), "cme".into()),
                ("code".into(), "10".into()),
            ]));
        let json = serde_json::to_string(&d).unwrap();
        let code_pos = json.find("\"code\"").unwrap();
        let result_pos = json.find("\"result\"").unwrap();
        assert!(code_pos < result_pos, "{json}");
    }
}
