//! AT matchers. Each matcher classifies and bounds exactly one lexical unit
//! starting at a byte offset and reports where the unconsumed input begins.
//!
//! All matchers are pure: they never look at parser state, so the cursor can
//! re-run them as often as it needs to.
//!
//! # Byte-level scanning
//!
//! Every delimiter the grammar knows is ASCII. UTF-8 continuation bytes lie in
//! 0x80–0xBF and never compare equal to any of them, so slicing the input at
//! the offsets found here always lands on a `char` boundary.

use super::token::{Token, TokenKind, TokenVariant};

/// A successful match: the token plus the offset of the first byte after it
/// (and after its separating comma, if any).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Matched<'a> {
    /// The matched token.
    pub token: Token<'a>,
    /// Byte offset where matching should resume.
    pub rest: usize,
}

// ── Byte classes ────────────────────────────────────────────────────────

/// Whether `pos` is at the end of input. A NUL byte ends the input too.
pub fn is_end(b: &[u8], pos: usize) -> bool {
    pos >= b.len() || b[pos] == 0
}

/// Whether `c` is a line terminator character.
pub fn is_line_break(c: u8) -> bool {
    c == b'\r' || c == b'\n'
}

/// Whether `pos` is at a line terminator or at the end of input.
pub fn is_line_end(b: &[u8], pos: usize) -> bool {
    is_end(b, pos) || is_line_break(b[pos])
}

/// Skip spaces starting at `pos`.
pub fn skip_spaces(b: &[u8], mut pos: usize) -> usize {
    while pos < b.len() && b[pos] == b' ' {
        pos += 1;
    }
    pos
}

/// Skip every consecutive CR and LF starting at `pos`.
pub fn skip_line_breaks(b: &[u8], mut pos: usize) -> usize {
    while pos < b.len() && is_line_break(b[pos]) {
        pos += 1;
    }
    pos
}

/// Offset one past the end of the line starting at `pos`.
pub fn line_end(b: &[u8], mut pos: usize) -> usize {
    while !is_line_end(b, pos) {
        pos += 1;
    }
    pos
}

fn is_marker(c: u8) -> bool {
    matches!(c, b'+' | b'%' | b'#')
}

fn is_name_char(c: u8) -> bool {
    c.is_ascii_alphanumeric() || c == b'_'
}

fn scan_name(b: &[u8], mut pos: usize) -> usize {
    while pos < b.len() && is_name_char(b[pos]) {
        pos += 1;
    }
    pos
}

/// `-`? DIGIT+ starting at `pos`; returns the end offset.
fn scan_int(b: &[u8], pos: usize) -> Option<usize> {
    let mut i = pos;
    if i < b.len() && b[i] == b'-' {
        i += 1;
    }
    let digits = i;
    while i < b.len() && b[i].is_ascii_digit() {
        i += 1;
    }
    (i > digits).then_some(i)
}

/// Bytes that may follow an integer subparameter.
fn is_int_boundary(b: &[u8], pos: usize) -> bool {
    is_line_end(b, pos) || b[pos] == b',' || b[pos] == b' '
}

/// `(` integer (`,` integer)* `)` starting at `pos`; returns the end offset.
fn scan_array(b: &[u8], pos: usize) -> Option<usize> {
    if b.get(pos) != Some(&b'(') {
        return None;
    }
    let mut i = pos + 1;
    loop {
        i = skip_spaces(b, i);
        i = scan_int(b, i)?;
        i = skip_spaces(b, i);
        match b.get(i) {
            Some(b',') => i += 1,
            Some(b')') => return Some(i + 1),
            _ => return None,
        }
    }
}

// ── Public API ──────────────────────────────────────────────────────────

/// Match the command or notification that starts a line.
///
/// Recognized forms:
/// - `AT`, `AT+NAME`, `AT%NAME`, `AT#NAME`, followed by `=?` (test), `?`
///   (read), `=` (set, parameters follow) or nothing (set). Test and read
///   forms must end the line.
/// - `+NAME:`, `%NAME:`, `#NAME:` (notification).
///
/// The token text is the command or notification name without the suffix or
/// colon. Returns `None` when the line does not start with one of these.
pub fn match_command(input: &str, pos: usize) -> Option<Matched<'_>> {
    let b = input.as_bytes();
    let start = pos;

    if b[start..].starts_with(b"AT") {
        let mut i = start + 2;
        if i < b.len() && is_marker(b[i]) {
            let name = i + 1;
            i = scan_name(b, name);
            if i == name {
                return None;
            }
        }
        let name_end = i;
        let (kind, rest) = if b[i..].starts_with(b"=?") {
            (TokenKind::CmdTest, i + 2)
        } else if b.get(i) == Some(&b'?') {
            (TokenKind::CmdRead, i + 1)
        } else if b.get(i) == Some(&b'=') {
            (TokenKind::CmdSet, i + 1)
        } else if is_line_end(b, skip_spaces(b, i)) {
            (TokenKind::CmdSet, i)
        } else {
            return None;
        };
        if kind != TokenKind::CmdSet && !is_line_end(b, skip_spaces(b, rest)) {
            return None;
        }
        return Some(Matched {
            token: Token::new(input, kind, TokenVariant::NoComma, start, name_end),
            rest,
        });
    }

    if start < b.len() && is_marker(b[start]) {
        let name_end = scan_name(b, start + 1);
        if name_end == start + 1 || b.get(name_end) != Some(&b':') {
            return None;
        }
        return Some(Matched {
            token: Token::new(
                input,
                TokenKind::Notification,
                TokenVariant::NoComma,
                start,
                name_end,
            ),
            rest: name_end + 1,
        });
    }

    None
}

/// Match one subparameter.
///
/// Leading spaces are skipped. Alternatives are tried in order: integer,
/// quoted string, array, empty, unquoted string. An integer must be followed
/// by a comma, a space or a line end; otherwise the text is retried as an
/// unquoted string (`12ab`).
///
/// When a comma follows the token (spaces allowed before it) the variant is
/// [`TokenVariant::Comma`] and `rest` points past the comma.
pub fn match_subparam(input: &str, pos: usize) -> Option<Matched<'_>> {
    let b = input.as_bytes();
    let i = skip_spaces(b, pos);

    if let Some(end) = scan_int(b, i)
        && is_int_boundary(b, end)
    {
        return Some(with_separator(input, TokenKind::Int, i, end, end));
    }

    match b.get(i).copied() {
        Some(b'"') => {
            let content = i + 1;
            let mut j = content;
            while j < b.len() && b[j] != b'"' && b[j] != 0 {
                j += 1;
            }
            if b.get(j) != Some(&b'"') {
                return None;
            }
            Some(with_separator(input, TokenKind::QuotedString, content, j, j + 1))
        }
        Some(b'(') => {
            let end = scan_array(b, i)?;
            Some(with_separator(input, TokenKind::Array, i, end, end))
        }
        Some(b',') => Some(Matched {
            token: Token::new(input, TokenKind::Empty, TokenVariant::Comma, i, i),
            rest: i + 1,
        }),
        _ if is_line_end(b, i) => Some(Matched {
            token: Token::empty(input, i),
            rest: i,
        }),
        _ => {
            let mut j = i;
            while !is_line_end(b, j) && !matches!(b[j], b',' | b'"' | b'(' | b')') {
                j += 1;
            }
            let mut text_end = j;
            while text_end > i && b[text_end - 1] == b' ' {
                text_end -= 1;
            }
            (text_end > i).then(|| with_separator(input, TokenKind::String, i, text_end, j))
        }
    }
}

/// Match the rest of the line as one opaque string.
///
/// Used for replies that are not structured as subparameters, e.g. a
/// firmware version or a PDU line. Fails on empty lines, on lines containing
/// a double quote, on lines starting with a parenthesis, on lines starting
/// with a command marker (`+`, `%`, `#`) and on lines that open like a
/// command (`AT` then a marker, `=`, `?` or the line end), so a broken
/// structured line stays malformed instead of becoming text.
pub fn match_bare_string(input: &str, pos: usize) -> Option<Matched<'_>> {
    let b = input.as_bytes();
    let end = line_end(b, pos);
    if end == pos
        || matches!(b[pos], b'(' | b')')
        || is_marker(b[pos])
        || looks_like_command(b, pos)
        || b[pos..end].contains(&b'"')
    {
        return None;
    }
    Some(Matched {
        token: Token::new(input, TokenKind::String, TokenVariant::NoComma, pos, end),
        rest: end,
    })
}

fn looks_like_command(b: &[u8], pos: usize) -> bool {
    b[pos..].starts_with(b"AT")
        && (is_line_end(b, pos + 2) || matches!(b[pos + 2], b'+' | b'%' | b'#' | b'=' | b'?'))
}

/// Build a token spanning `start..end` and look for a comma after `after`.
fn with_separator(
    input: &str,
    kind: TokenKind,
    start: usize,
    end: usize,
    after: usize,
) -> Matched<'_> {
    let b = input.as_bytes();
    let next = skip_spaces(b, after);
    let (variant, rest) = if b.get(next) == Some(&b',') {
        (TokenVariant::Comma, next + 1)
    } else {
        (TokenVariant::NoComma, after)
    };
    Matched {
        token: Token::new(input, kind, variant, start, end),
        rest,
    }
}
