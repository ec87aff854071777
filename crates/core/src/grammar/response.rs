//! Final result codes that terminate an AT response.

use serde::Serialize;

use super::lexer::{is_line_end, skip_spaces};

/// A final response line: `OK`, `ERROR`, `+CME ERROR: <n>` or `+CMS ERROR: <n>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "result", content = "code", rename_all = "snake_case")]
pub enum FinalResponse {
    /// `OK`
    Ok,
    /// `ERROR`
    Error,
    /// `+CME ERROR:` with its numeric code, if one could be read.
    CmeError(Option<i32>),
    /// `+CMS ERROR:` with its numeric code, if one could be read.
    CmsError(Option<i32>),
}

const CME_PREFIX: &[u8] = b"+CME ERROR:";
const CMS_PREFIX: &[u8] = b"+CMS ERROR:";

impl FinalResponse {
    /// Detect a final response starting exactly at `pos`.
    ///
    /// `OK` and `ERROR` must be followed by a line end or the end of input;
    /// the extended error forms only need their prefix.
    pub fn at(input: &str, pos: usize) -> Option<Self> {
        let b = input.as_bytes();
        let rest = b.get(pos..)?;
        if rest.starts_with(b"OK") && is_line_end(b, pos + 2) {
            Some(Self::Ok)
        } else if rest.starts_with(b"ERROR") && is_line_end(b, pos + 5) {
            Some(Self::Error)
        } else if rest.starts_with(CME_PREFIX) {
            Some(Self::CmeError(read_code(b, pos + CME_PREFIX.len())))
        } else if rest.starts_with(CMS_PREFIX) {
            Some(Self::CmsError(read_code(b, pos + CMS_PREFIX.len())))
        } else {
            None
        }
    }

    /// Whether the modem reported failure.
    pub fn is_error(&self) -> bool {
        !matches!(self, Self::Ok)
    }
}

impl std::fmt::Display for FinalResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ok => write!(f, "OK"),
            Self::Error => write!(f, "ERROR"),
            Self::CmeError(Some(code)) => write!(f, "+CME ERROR: {code}"),
            Self::CmeError(None) => write!(f, "+CME ERROR"),
            Self::CmsError(Some(code)) => write!(f, "+CMS ERROR: {code}"),
            Self::CmsError(None) => write!(f, "+CMS ERROR"),
        }
    }
}

fn read_code(b: &[u8], pos: usize) -> Option<i32> {
    let start = skip_spaces(b, pos);
    let mut end = start;
    while end < b.len() && b[end].is_ascii_digit() {
        end += 1;
    }
    std::str::from_utf8(&b[start..end]).ok()?.parse().ok()
}

/// Locate the final response that completes a buffered modem reply.
///
/// Looks for `\r\nOK\r\n`, `\r\nERROR\r\n`, or `\r\n+CME ERROR:` /
/// `\r\n+CMS ERROR:` followed later by `\r\n`. Returns the response and the
/// number of bytes from the start of `buf` through its terminating CRLF, so
/// a receive buffer can drop that prefix and keep whatever follows. When
/// several responses are present the earliest one wins. Returns `None` while
/// the response is still incomplete.
pub fn find_final_response(buf: &str) -> Option<(FinalResponse, usize)> {
    let b = buf.as_bytes();
    let mut from = 0;
    while let Some(found) = find(&b[from..], b"\r\n") {
        let line = from + found + 2;
        let rest = &b[line..];
        if rest.starts_with(b"OK\r\n") {
            return Some((FinalResponse::Ok, line + 4));
        }
        if rest.starts_with(b"ERROR\r\n") {
            return Some((FinalResponse::Error, line + 7));
        }
        if rest.starts_with(CME_PREFIX) || rest.starts_with(CMS_PREFIX) {
            let body = line + CME_PREFIX.len();
            let end = find(&b[body..], b"\r\n")?;
            let response = FinalResponse::at(buf, line)?;
            return Some((response, body + end + 2));
        }
        from = line;
    }
    None
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}
