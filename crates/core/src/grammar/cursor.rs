//! Indexed access to the subparameters of an AT string.
//!
//! [`AtParser`] walks one command line at a time. Tokens are fetched lazily:
//! asking for index `i` scans forward from the last fetched token, or rewinds
//! to the start of the line when `i` was already passed. Nothing is allocated
//! and the input is never copied.

use serde::Serialize;

use super::lexer::{self, is_end, is_line_break, is_line_end, skip_line_breaks, skip_spaces};
use super::response::FinalResponse;
use super::token::{Token, TokenKind, TokenVariant};
use crate::error::{AtParserError, Result};

// ── Command type ────────────────────────────────────────────────────────

/// Type of an AT command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AtCmdType {
    /// `AT+CMD=...`, `AT+CMD` or `AT`.
    Set,
    /// `AT+CMD?`
    Read,
    /// `AT+CMD=?`
    Test,
}

// ── Integer widths ──────────────────────────────────────────────────────

#[allow(unreachable_pub)]
mod sealed {
    pub trait Sealed {}
}

/// Integer types an [`AtParser`] can decode a subparameter into.
///
/// Implemented for `i16`, `u16`, `i32`, `u32`, `i64` and `u64`. Values that
/// do not fit are reported as [`AtParserError::OutOfRange`], never wrapped or
/// saturated.
pub trait AtInt: sealed::Sealed + Sized + Copy {
    /// Convert the decimal text of an integer token.
    fn from_decimal(text: &str) -> Result<Self>;
}

macro_rules! impl_at_int {
    ($($t:ty),* $(,)?) => {
        $(
            impl sealed::Sealed for $t {}

            impl AtInt for $t {
                fn from_decimal(text: &str) -> Result<Self> {
                    // i128 holds every supported width; a parse failure here
                    // means too many digits.
                    let wide: i128 = text.parse().map_err(|_| AtParserError::OutOfRange)?;
                    <$t>::try_from(wide).map_err(|_| AtParserError::OutOfRange)
                }
            }
        )*
    };
}

impl_at_int!(i16, u16, i32, u32, i64, u64);

// ── Parser state ────────────────────────────────────────────────────────

/// Snapshot of the traversal state, without the input.
///
/// Lets a caller that cannot hold a borrow (the C ABI) store the position
/// and rebuild the parser with [`AtParser::resume`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AtParserState {
    /// Byte offset of the start of the current line.
    pub line: usize,
    /// Byte offset where the next token fetch starts.
    pub cursor: usize,
    /// Tokens fetched on the current line.
    pub count: usize,
    /// A trailing comma was seen; the next fetch yields an empty token.
    pub is_next_empty: bool,
}

/// Cursor over an AT command string.
///
/// A `Default` parser is uninitialized: every accessor fails with
/// [`AtParserError::NotInitialized`] until [`init`](Self::init) is called.
///
/// Indices address tokens of the current line only, and index 0 is the
/// command or notification itself:
///
/// ```
/// use at_parser_core::AtParser;
///
/// let mut p = AtParser::new("+CEREG: 2,\"76C1\",\"0102DA04\", 7\r\nOK\r\n");
/// assert_eq!(p.get_str(0).unwrap(), "+CEREG");
/// assert_eq!(p.get_u16(1).unwrap(), 2);
/// assert_eq!(p.get_str(2).unwrap(), "76C1");
/// assert_eq!(p.subparameter_count().unwrap(), 5);
/// ```
#[derive(Debug, Clone, Default)]
pub struct AtParser<'a> {
    input: Option<&'a str>,
    state: AtParserState,
}

impl<'a> AtParser<'a> {
    // ── Construction ────────────────────────────────────────────────────

    /// Create a parser positioned at the start of `input`.
    pub fn new(input: &'a str) -> Self {
        Self {
            input: Some(input),
            state: AtParserState::default(),
        }
    }

    /// Reset the parser onto `input`, discarding all previous state.
    pub fn init(&mut self, input: &'a str) {
        *self = Self::new(input);
    }

    /// Reset the parser onto raw bytes.
    ///
    /// Fails with [`AtParserError::InvalidArgument`] if `input` is not UTF-8;
    /// the parser is left unchanged in that case.
    pub fn init_bytes(&mut self, input: &'a [u8]) -> Result<()> {
        let text = std::str::from_utf8(input).map_err(|_| AtParserError::InvalidArgument)?;
        self.init(text);
        Ok(())
    }

    /// Rebuild a parser from `input` and a previously saved state.
    ///
    /// Fails with [`AtParserError::InvalidArgument`] if the state does not
    /// describe valid positions in `input`.
    pub fn resume(input: &'a str, state: AtParserState) -> Result<Self> {
        let valid = |pos: usize| pos <= input.len() && input.is_char_boundary(pos);
        if !valid(state.line) || !valid(state.cursor) || state.cursor < state.line {
            return Err(AtParserError::InvalidArgument);
        }
        Ok(Self {
            input: Some(input),
            state,
        })
    }

    /// Current traversal state.
    pub fn state(&self) -> AtParserState {
        self.state
    }

    /// The input this parser walks, if initialized.
    pub fn input(&self) -> Option<&'a str> {
        self.input
    }

    /// Whether [`init`](Self::init) has been called.
    pub fn is_initialized(&self) -> bool {
        self.input.is_some()
    }

    /// Byte offset of the start of the current line.
    pub fn line_offset(&self) -> usize {
        self.state.line
    }

    // ── Line traversal ──────────────────────────────────────────────────

    /// Move to the next command line.
    ///
    /// Skips whatever is left of the current line. Fails with
    /// [`AtParserError::Unsupported`] if there is no further line, which
    /// includes the case where only a final response (`OK`, `ERROR`, ...)
    /// remains, and if the rest of the current line is malformed.
    pub fn next_command(&mut self) -> Result<()> {
        let input = self.require_input()?;
        loop {
            match self.next_token() {
                Ok(_) => {}
                Err(AtParserError::NextLine) => break,
                Err(AtParserError::EndOfInput | AtParserError::Malformed { .. }) => {
                    return Err(AtParserError::Unsupported);
                }
                Err(e) => return Err(e),
            }
        }
        let b = input.as_bytes();
        self.restart_at(skip_line_breaks(b, skip_spaces(b, self.state.cursor)));
        Ok(())
    }

    /// Type of the command on the current line.
    ///
    /// Notifications and plain text lines are not commands and fail with
    /// [`AtParserError::Unsupported`].
    pub fn command_type(&mut self) -> Result<AtCmdType> {
        self.require_input()?;
        self.rewind();
        match self.next_token()?.kind {
            TokenKind::CmdSet => Ok(AtCmdType::Set),
            TokenKind::CmdRead => Ok(AtCmdType::Read),
            TokenKind::CmdTest => Ok(AtCmdType::Test),
            _ => Err(AtParserError::Unsupported),
        }
    }

    /// Number of tokens on the current line, the command or notification
    /// included.
    ///
    /// Counting stops at the end of the line, at the end of input, and at the
    /// first malformed token; tokens before a malformed one are still counted.
    /// Use [`subparameter_count_strict`](Self::subparameter_count_strict) to
    /// have malformed input reported instead.
    pub fn subparameter_count(&mut self) -> Result<usize> {
        self.count_tokens(false)
    }

    /// Like [`subparameter_count`](Self::subparameter_count), but a malformed
    /// token fails with [`AtParserError::Malformed`].
    pub fn subparameter_count_strict(&mut self) -> Result<usize> {
        self.count_tokens(true)
    }

    fn count_tokens(&mut self, strict: bool) -> Result<usize> {
        self.require_input()?;
        loop {
            match self.next_token() {
                Ok(_) => {}
                Err(e) if e.is_termination() => return Ok(self.state.count),
                Err(AtParserError::Malformed { .. }) if !strict => return Ok(self.state.count),
                Err(e) => return Err(e),
            }
        }
    }

    // ── Typed access ────────────────────────────────────────────────────

    /// Token at `index` on the current line.
    ///
    /// Fails with [`AtParserError::NextLine`] or [`AtParserError::EndOfInput`]
    /// when the line has fewer tokens.
    pub fn get_token(&mut self, index: usize) -> Result<Token<'a>> {
        self.require_input()?;
        self.seek(index)
    }

    /// Integer subparameter at `index`, converted to `T`.
    ///
    /// Empty subparameters fail with [`AtParserError::NoData`], other
    /// non-integer tokens with [`AtParserError::Unsupported`].
    pub fn get_int<T: AtInt>(&mut self, index: usize) -> Result<T> {
        let token = self.get_token(index)?;
        match token.kind {
            TokenKind::Int => T::from_decimal(token.text),
            TokenKind::Empty => Err(AtParserError::NoData),
            _ => Err(AtParserError::Unsupported),
        }
    }

    /// `i16` subparameter at `index`.
    pub fn get_i16(&mut self, index: usize) -> Result<i16> {
        self.get_int(index)
    }

    /// `u16` subparameter at `index`.
    pub fn get_u16(&mut self, index: usize) -> Result<u16> {
        self.get_int(index)
    }

    /// `i32` subparameter at `index`.
    pub fn get_i32(&mut self, index: usize) -> Result<i32> {
        self.get_int(index)
    }

    /// `u32` subparameter at `index`.
    pub fn get_u32(&mut self, index: usize) -> Result<u32> {
        self.get_int(index)
    }

    /// `i64` subparameter at `index`.
    pub fn get_i64(&mut self, index: usize) -> Result<i64> {
        self.get_int(index)
    }

    /// `u64` subparameter at `index`.
    pub fn get_u64(&mut self, index: usize) -> Result<u64> {
        self.get_int(index)
    }

    /// String value at `index`, borrowed from the input.
    ///
    /// Commands and notifications give their name, quoted strings their
    /// content, arrays their raw text with parentheses. Integers fail with
    /// [`AtParserError::Unsupported`], empty subparameters with
    /// [`AtParserError::NoData`].
    pub fn get_str(&mut self, index: usize) -> Result<&'a str> {
        let token = self.get_token(index)?;
        match token.kind {
            TokenKind::Empty => Err(AtParserError::NoData),
            kind if kind.is_string_like() => Ok(token.text),
            _ => Err(AtParserError::Unsupported),
        }
    }

    /// Copy the string value at `index` into `buf` followed by a NUL byte.
    ///
    /// Returns the string length without the terminator. Fails with
    /// [`AtParserError::NoMemory`] if `buf` is shorter than the length plus
    /// one; `buf` is not touched then.
    pub fn get_string(&mut self, index: usize, buf: &mut [u8]) -> Result<usize> {
        let value = self.get_str(index)?;
        let needed = value.len() + 1;
        if buf.len() < needed {
            return Err(AtParserError::NoMemory {
                needed,
                available: buf.len(),
            });
        }
        buf[..value.len()].copy_from_slice(value.as_bytes());
        buf[value.len()] = 0;
        Ok(value.len())
    }

    // ── Fetching ────────────────────────────────────────────────────────

    fn require_input(&self) -> Result<&'a str> {
        self.input.ok_or(AtParserError::NotInitialized)
    }

    fn rewind(&mut self) {
        self.state.cursor = self.state.line;
        self.state.count = 0;
        self.state.is_next_empty = false;
    }

    fn seek(&mut self, index: usize) -> Result<Token<'a>> {
        if index < self.state.count {
            self.rewind();
        }
        loop {
            let token = self.next_token()?;
            if self.state.count - 1 == index {
                return Ok(token);
            }
        }
    }

    /// Drop the current line and continue from `pos` as if a new line began there.
    pub(crate) fn restart_at(&mut self, pos: usize) {
        self.state = AtParserState {
            line: pos,
            cursor: pos,
            count: 0,
            is_next_empty: false,
        };
    }

    /// Fetch the next token of the current line.
    pub(crate) fn next_token(&mut self) -> Result<Token<'a>> {
        let input = self.require_input()?;
        let b = input.as_bytes();
        let state = &mut self.state;

        if state.is_next_empty {
            state.is_next_empty = false;
            state.count += 1;
            return Ok(Token::empty(input, state.cursor));
        }

        if state.count == 0 {
            state.cursor = skip_line_breaks(b, state.cursor);
            state.line = state.cursor;
        }

        let pos = if state.count > 0 {
            skip_spaces(b, state.cursor)
        } else {
            state.cursor
        };

        if is_end(b, pos) {
            return Err(AtParserError::EndOfInput);
        }
        if is_line_break(b[pos]) {
            let next = skip_line_breaks(b, pos);
            if is_end(b, next) || FinalResponse::at(input, next).is_some() {
                return Err(AtParserError::EndOfInput);
            }
            return Err(AtParserError::NextLine);
        }
        if state.count == 0 && FinalResponse::at(input, pos).is_some() {
            return Err(AtParserError::EndOfInput);
        }

        let matched = if state.count == 0 {
            lexer::match_command(input, pos)
        } else {
            lexer::match_subparam(input, pos)
        }
        .or_else(|| lexer::match_bare_string(input, pos))
        .ok_or(AtParserError::Malformed { offset: pos })?;

        let mut rest = matched.rest;
        if state.count > 0 {
            let next = skip_spaces(b, rest);
            match matched.token.variant {
                TokenVariant::Comma => {
                    if is_line_end(b, next) {
                        state.is_next_empty = true;
                    }
                }
                TokenVariant::NoComma => {
                    if !is_line_end(b, next) {
                        return Err(AtParserError::Malformed { offset: next });
                    }
                    rest = next;
                }
            }
        }

        state.cursor = rest;
        state.count += 1;
        Ok(matched.token)
    }
}
