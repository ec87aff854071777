//! AT command parser core library.
//!
//! Tokenizes modem AT command and response strings into typed, indexable
//! subparameters. [`AtParser`] walks a response line by line without
//! allocating; [`scan_str`] tokenizes everything up front and reports
//! [`Diagnostic`]s.

#![warn(missing_docs)]

/// Error type shared by every accessor.
pub mod error;
/// AT grammar: matchers, cursor, final responses and the eager scanner.
pub mod grammar;

// ── Convenience re-exports ──────────────────────────────────────────────────
// Flat imports for the most common entry points. The full module paths
// remain available for less common types.

// Errors
pub use error::{AtParserError, Result};

// Cursor
pub use grammar::cursor::{AtCmdType, AtInt, AtParser, AtParserState};

// Tokens
pub use grammar::token::{Token, TokenKind, TokenVariant};

// Final responses
pub use grammar::response::{FinalResponse, find_final_response};

// Scanner
pub use grammar::scan::{AtLine, ScanConfig, ScanResult, TokenTable, scan_str, scan_with_config};

// Diagnostics (re-exported from the diagnostics crate)
pub use grammar::diag::{Diagnostic, LineIndex, Severity, Span, codes};

// Serialization helpers
pub use grammar::dump::to_pretty_json;
