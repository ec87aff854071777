use serde::Serialize;

/// Classification of an AT token.
///
/// A failed match has no kind: matchers return `None` instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    /// `AT+CMD=?`
    CmdTest,
    /// `AT+CMD?`
    CmdRead,
    /// `AT+CMD=...`, `AT+CMD` or a lone `AT`.
    CmdSet,
    /// `+NAME:` response or unsolicited notification.
    Notification,
    /// Decimal integer literal, optionally negative.
    Int,
    /// Double-quoted string; the token text excludes the quotes.
    QuotedString,
    /// Parenthesized integer list; the token text includes the parentheses.
    Array,
    /// Empty subparameter (two adjacent commas or a trailing comma).
    Empty,
    /// Unquoted string, or a whole line of opaque text.
    String,
}

impl TokenKind {
    /// Whether this is one of the three command kinds.
    pub fn is_command(self) -> bool {
        matches!(self, Self::CmdTest | Self::CmdRead | Self::CmdSet)
    }

    /// The serialized name, e.g. `"quoted_string"`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::CmdTest => "cmd_test",
            Self::CmdRead => "cmd_read",
            Self::CmdSet => "cmd_set",
            Self::Notification => "notification",
            Self::Int => "int",
            Self::QuotedString => "quoted_string",
            Self::Array => "array",
            Self::Empty => "empty",
            Self::String => "string",
        }
    }

    /// Whether a string accessor can return this token's text.
    pub fn is_string_like(self) -> bool {
        matches!(
            self,
            Self::CmdTest
                | Self::CmdRead
                | Self::CmdSet
                | Self::Notification
                | Self::QuotedString
                | Self::Array
                | Self::String
        )
    }
}

/// Whether a separating comma followed the token.
///
/// A trailing `Comma` at the end of a line implies one more empty
/// subparameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenVariant {
    /// Nothing but spaces and a line end follow the token.
    #[default]
    NoComma,
    /// A comma followed the token.
    Comma,
}

/// A token that borrows its text directly from the parser input.
///
/// `text` is always exactly `&input[start..end]`, and is the token's value:
/// quotes, the `=`/`?` command suffix and the notification colon are not
/// part of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Token<'a> {
    /// The classification of this token.
    pub kind: TokenKind,
    /// Whether a comma followed this token.
    pub variant: TokenVariant,
    /// Borrowed slice of the input for this token.
    pub text: &'a str,
    /// Byte offset of the first character.
    pub start: usize,
    /// Byte offset one past the last character.
    pub end: usize,
}

impl<'a> Token<'a> {
    pub(crate) fn new(
        input: &'a str,
        kind: TokenKind,
        variant: TokenVariant,
        start: usize,
        end: usize,
    ) -> Self {
        Self {
            kind,
            variant,
            text: &input[start..end],
            start,
            end,
        }
    }

    /// Zero-length empty subparameter at `pos`.
    pub(crate) fn empty(input: &'a str, pos: usize) -> Self {
        Self::new(input, TokenKind::Empty, TokenVariant::NoComma, pos, pos)
    }

    /// Length of the token text in bytes.
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Whether the token text is empty.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}
