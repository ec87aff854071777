//! Eager tokenization of a whole AT response into a table of lines.
//!
//! The cursor re-scans a line every time an earlier index is requested. When
//! the same response is read many times, scanning it once with [`scan_str`]
//! and indexing the resulting [`AtLine`]s is cheaper: every lookup is O(1).

use std::collections::BTreeMap;
use std::num::NonZeroUsize;

use serde::Serialize;

use super::cursor::{AtCmdType, AtInt, AtParser};
use super::diag::{Diagnostic, LineIndex, Severity, Span, codes};
use super::lexer::{is_end, line_end, skip_line_breaks, skip_spaces};
use super::response::FinalResponse;
use super::token::{Token, TokenKind};
use crate::error::{AtParserError, Result};

// ── Configuration ───────────────────────────────────────────────────────

/// Configuration for [`scan_with_config`].
#[derive(Debug, Clone, Copy, Default)]
#[non_exhaustive]
pub struct ScanConfig {
    /// Report malformed lines with their registered severity (error)
    /// instead of downgrading them to warnings.
    pub strict: bool,
    /// Stop after this many command lines.
    pub max_lines: Option<NonZeroUsize>,
}

impl ScanConfig {
    /// Set [`strict`](Self::strict).
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Set [`max_lines`](Self::max_lines).
    pub fn with_max_lines(mut self, max_lines: Option<NonZeroUsize>) -> Self {
        self.max_lines = max_lines;
        self
    }
}

// ── Lines ───────────────────────────────────────────────────────────────

/// One command line and its tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AtLine<'a> {
    /// Byte offset of the first character of the line.
    pub start: usize,
    /// Byte offset one past the last scanned character of the line.
    pub end: usize,
    /// Tokens in order; index 0 is the command or notification.
    pub tokens: Vec<Token<'a>>,
    /// Offset of the first malformed byte, if the line stopped early.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub malformed_at: Option<usize>,
    /// Whether no further command line follows.
    #[serde(skip)]
    is_last: bool,
}

impl<'a> AtLine<'a> {
    /// Number of tokens on the line.
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Whether the line has no tokens.
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Kind of the token at `index`.
    pub fn kind(&self, index: usize) -> Option<TokenKind> {
        self.tokens.get(index).map(|t| t.kind)
    }

    /// Token at `index`.
    ///
    /// Out-of-range indices fail the way the cursor does: with the malformed
    /// offset if the line stopped early, otherwise with
    /// [`AtParserError::NextLine`] or [`AtParserError::EndOfInput`].
    pub fn token(&self, index: usize) -> Result<&Token<'a>> {
        self.tokens.get(index).ok_or(match self.malformed_at {
            Some(offset) => AtParserError::Malformed { offset },
            None if self.is_last => AtParserError::EndOfInput,
            None => AtParserError::NextLine,
        })
    }

    /// Integer subparameter at `index`.
    pub fn int<T: AtInt>(&self, index: usize) -> Result<T> {
        let token = self.token(index)?;
        match token.kind {
            TokenKind::Int => T::from_decimal(token.text),
            TokenKind::Empty => Err(AtParserError::NoData),
            _ => Err(AtParserError::Unsupported),
        }
    }

    /// String value at `index`, borrowed from the input.
    pub fn str(&self, index: usize) -> Result<&'a str> {
        let token = self.token(index)?;
        match token.kind {
            TokenKind::Empty => Err(AtParserError::NoData),
            kind if kind.is_string_like() => Ok(token.text),
            _ => Err(AtParserError::Unsupported),
        }
    }

    /// Command type of the line.
    pub fn command_type(&self) -> Result<AtCmdType> {
        match self.token(0)?.kind {
            TokenKind::CmdSet => Ok(AtCmdType::Set),
            TokenKind::CmdRead => Ok(AtCmdType::Read),
            TokenKind::CmdTest => Ok(AtCmdType::Test),
            _ => Err(AtParserError::Unsupported),
        }
    }
}

// ── Results ─────────────────────────────────────────────────────────────

/// The result of scanning an AT string.
#[derive(Debug, Clone, Serialize)]
pub struct ScanResult<'a> {
    /// Tokenized command lines, final response excluded.
    pub lines: Vec<AtLine<'a>>,
    /// The final response that ended the input, if any.
    pub final_response: Option<FinalResponse>,
    /// Diagnostics (malformed lines, error results, truncation).
    pub diagnostics: Vec<Diagnostic>,
}

impl ScanResult<'_> {
    /// Whether any diagnostic is an error.
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }
}

/// Every line of an AT string, tokenized; built only from well-formed input.
#[derive(Debug, Clone, Serialize)]
pub struct TokenTable<'a> {
    /// Tokenized command lines.
    pub lines: Vec<AtLine<'a>>,
    /// The final response that ended the input, if any.
    pub final_response: Option<FinalResponse>,
}

impl<'a> TokenTable<'a> {
    /// Tokenize all of `input`, failing on the first malformed line.
    pub fn build(input: &'a str) -> Result<Self> {
        let result = scan_with_config(input, &ScanConfig::default().with_strict(true));
        if let Some(offset) = result.lines.iter().find_map(|l| l.malformed_at) {
            return Err(AtParserError::Malformed { offset });
        }
        Ok(Self {
            lines: result.lines,
            final_response: result.final_response,
        })
    }

    /// Line at `index`.
    pub fn line(&self, index: usize) -> Option<&AtLine<'a>> {
        self.lines.get(index)
    }

    /// Number of lines.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Whether the table has no lines.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

// ── Public API ──────────────────────────────────────────────────────────

/// Scan an AT string with the default configuration.
pub fn scan_str(input: &str) -> ScanResult<'_> {
    scan_with_config(input, &ScanConfig::default())
}

/// Scan an AT string.
///
/// Malformed lines are kept with the tokens read before the fault and
/// scanning resumes on the following line.
pub fn scan_with_config<'a>(input: &'a str, config: &ScanConfig) -> ScanResult<'a> {
    let b = input.as_bytes();
    let mut parser = AtParser::new(input);
    let mut lines: Vec<AtLine<'a>> = Vec::new();
    let mut diagnostics = Vec::new();
    let mut index: Option<LineIndex> = None;

    loop {
        let mut tokens = Vec::new();
        let stop = loop {
            match parser.next_token() {
                Ok(token) => tokens.push(token),
                Err(e) => break e,
            }
        };
        let start = parser.line_offset();

        if tokens.is_empty() && stop == AtParserError::EndOfInput {
            break;
        }

        let mut line = AtLine {
            start,
            end: skip_spaces(b, parser.state().cursor),
            tokens,
            malformed_at: None,
            is_last: stop == AtParserError::EndOfInput,
        };

        let resume_at = match stop {
            AtParserError::NextLine => {
                Some(skip_line_breaks(b, skip_spaces(b, parser.state().cursor)))
            }
            AtParserError::Malformed { offset } => {
                let next = skip_line_breaks(b, line_end(b, offset));
                line.malformed_at = Some(offset);
                line.end = line_end(b, offset);
                line.is_last = is_end(b, next) || FinalResponse::at(input, next).is_some();
                let (row, col) = index
                    .get_or_insert_with(|| LineIndex::new(input))
                    .line_col(offset);
                let mut diag = Diagnostic::registered(
                    codes::MALFORMED,
                    format!("malformed AT line (token {})", line.tokens.len()),
                    Some(Span::new(offset, line.end)),
                )
                .with_context(BTreeMap::from([
                    ("line".to_string(), lines.len().to_string()),
                    ("token".to_string(), line.tokens.len().to_string()),
                    ("position".to_string(), format!("{}:{}", row + 1, col + 1)),
                ]));
                if !config.strict {
                    diag.severity = Severity::Warn;
                }
                diagnostics.push(diag);
                (!line.is_last).then_some(next)
            }
            _ => None,
        };
        lines.push(line);

        let Some(next) = resume_at else {
            break;
        };
        if let Some(max) = config.max_lines
            && lines.len() >= max.get()
        {
            diagnostics.push(Diagnostic::registered(
                codes::LINE_LIMIT,
                format!("scan stopped after {} lines", max.get()),
                Some(Span::empty(next)),
            ));
            break;
        }
        parser.restart_at(next);
    }

    let final_response = trailing_final_response(input, &lines);
    match final_response {
        Some(resp) if resp.is_error() => {
            let mut ctx = BTreeMap::from([("result".to_string(), result_name(resp).to_string())]);
            if let FinalResponse::CmeError(Some(code)) | FinalResponse::CmsError(Some(code)) = resp
            {
                ctx.insert("code".to_string(), code.to_string());
            }
            diagnostics.push(
                Diagnostic::registered(
                    codes::FINAL_ERROR,
                    format!("response ended with {resp}"),
                    None,
                )
                .with_context(ctx),
            );
        }
        Some(_) => {}
        None if !lines.is_empty() && !truncated(&diagnostics) => {
            diagnostics.push(Diagnostic::registered(
                codes::MISSING_FINAL_RESPONSE,
                "input ends without a final response",
                None,
            ));
        }
        None => {}
    }

    ScanResult {
        lines,
        final_response,
        diagnostics,
    }
}

/// Final response following the last scanned line, or at the very start.
fn trailing_final_response(input: &str, lines: &[AtLine<'_>]) -> Option<FinalResponse> {
    let b = input.as_bytes();
    let from = lines.last().map_or(0, |l| l.end);
    let pos = skip_line_breaks(b, skip_spaces(b, from));
    FinalResponse::at(input, pos)
}

fn truncated(diagnostics: &[Diagnostic]) -> bool {
    diagnostics.iter().any(|d| d.id == codes::LINE_LIMIT)
}

fn result_name(resp: FinalResponse) -> &'static str {
    match resp {
        FinalResponse::Ok => "ok",
        FinalResponse::Error => "error",
        FinalResponse::CmeError(_) => "cme_error",
        FinalResponse::CmsError(_) => "cms_error",
    }
}
