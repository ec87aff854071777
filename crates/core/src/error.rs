//! Typed error type for the AT parser.

use crate::grammar::diag::codes;

/// Result alias used throughout the parser API.
pub type Result<T> = std::result::Result<T, AtParserError>;

/// Failure and termination conditions reported by the parser.
///
/// Two variants are not failures in the usual sense: [`NextLine`] and
/// [`EndOfInput`] tell a caller walking the subparameters that the current
/// line (or the whole input) has no more tokens. Use
/// [`AtParserError::is_termination()`] to tell them apart from real errors.
///
/// [`NextLine`]: AtParserError::NextLine
/// [`EndOfInput`]: AtParserError::EndOfInput
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AtParserError {
    // -- Configuration --
    /// An argument was rejected before any work was done (non-UTF-8 input,
    /// null pointer at the C boundary).
    #[error("invalid argument")]
    InvalidArgument,

    /// The parser was used before `init`.
    #[error("parser is not initialized")]
    NotInitialized,

    // -- Access --
    /// The token at the requested index cannot be read that way, or there is
    /// no further command line.
    #[error("operation not supported for this token")]
    Unsupported,

    /// The integer does not fit the requested width.
    #[error("integer out of range for the requested type")]
    OutOfRange,

    /// The subparameter at the requested index is empty.
    #[error("subparameter is empty")]
    NoData,

    /// The destination buffer cannot hold the string and its terminator.
    #[error("buffer too small: need {needed} bytes, have {available}")]
    NoMemory {
        /// Bytes required, including the NUL terminator.
        needed: usize,
        /// Bytes available in the caller buffer.
        available: usize,
    },

    // -- Grammar --
    /// The input does not follow the AT grammar at `offset`.
    #[error("malformed AT string at byte {offset}")]
    Malformed {
        /// Byte offset of the first offending character.
        offset: usize,
    },

    // -- Termination --
    /// The current line is exhausted; more lines follow.
    #[error("no more subparameters on this line")]
    NextLine,

    /// The input is exhausted, or only a final response remains.
    #[error("end of input")]
    EndOfInput,
}

impl AtParserError {
    /// Negative POSIX error number (Linux numbering) for this condition.
    ///
    /// These are the values the C ABI returns.
    pub fn errno(&self) -> i32 {
        match self {
            Self::InvalidArgument => -22,
            Self::NotInitialized => -1,
            Self::Unsupported => -95,
            Self::OutOfRange => -34,
            Self::NoData => -61,
            Self::NoMemory { .. } => -12,
            Self::Malformed { .. } => -74,
            Self::NextLine => -11,
            Self::EndOfInput => -5,
        }
    }

    /// Whether this is a termination signal rather than a failure.
    pub fn is_termination(&self) -> bool {
        matches!(self, Self::NextLine | Self::EndOfInput)
    }

    /// Diagnostic code describing this condition.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidArgument => codes::INVALID_ARGUMENT,
            Self::NotInitialized => codes::NOT_INITIALIZED,
            Self::Unsupported => codes::UNSUPPORTED,
            Self::OutOfRange => codes::OUT_OF_RANGE,
            Self::NoData => codes::NO_DATA,
            Self::NoMemory { .. } => codes::BUFFER_TOO_SMALL,
            Self::Malformed { .. } => codes::MALFORMED,
            Self::NextLine => codes::NEXT_LINE,
            Self::EndOfInput => codes::END_OF_INPUT,
        }
    }
}
