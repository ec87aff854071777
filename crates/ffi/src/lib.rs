//! C ABI for the AT parser.
//!
//! Mirrors the `at_parser` C API: a caller-allocated `struct at_parser` is
//! initialized over a NUL-terminated string and every function returns 0 on
//! success or a negative POSIX error number (Linux numbering):
//!
//! | errno         | meaning                                             |
//! |---------------|-----------------------------------------------------|
//! | `-EINVAL`     | null pointer argument, non-UTF-8 input at init       |
//! | `-EPERM`      | parser not initialized                               |
//! | `-EOPNOTSUPP` | wrong token type, no next command line               |
//! | `-ERANGE`     | integer does not fit the requested width             |
//! | `-EBADMSG`    | malformed AT string                                  |
//! | `-ENODATA`    | empty subparameter                                   |
//! | `-ENOMEM`     | destination buffer too small                         |
//! | `-EAGAIN`     | no more subparameters on this line, more lines follow |
//! | `-EIO`        | no more subparameters or lines                       |
//!
//! The string passed to `at_parser_init` is borrowed, not copied: it must
//! stay valid and unchanged for as long as the parser is used.

#![allow(non_camel_case_types)]

use std::ffi::{CStr, c_char, c_int};
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::ptr;
use std::slice;

use at_parser_core::{AtCmdType, AtParser, AtParserError, AtParserState};

/// `"ATPS"`: marks a struct written by `at_parser_init`.
const INIT_SENTINEL: u32 = 0x4154_5053;

/// Returned if a call panics, which only a parser bug can cause.
const EFAULT: c_int = 14;

// ── Types ───────────────────────────────────────────────────────────────

/// Parser state. Allocate it anywhere and pass it to `at_parser_init`.
#[repr(C)]
#[derive(Debug)]
pub struct at_parser {
    /// The string being parsed.
    pub at: *const c_char,
    /// Byte offset of the current line.
    pub line: usize,
    /// Byte offset where the next token fetch starts.
    pub cursor: usize,
    /// Tokens fetched on the current line.
    pub count: usize,
    /// The next fetch yields an empty subparameter.
    pub is_next_empty: bool,
    /// Set by `at_parser_init`.
    pub init_sentinel: u32,
}

impl Default for at_parser {
    fn default() -> Self {
        Self {
            at: ptr::null(),
            line: 0,
            cursor: 0,
            count: 0,
            is_next_empty: false,
            init_sentinel: 0,
        }
    }
}

impl at_parser {
    fn state(&self) -> AtParserState {
        AtParserState {
            line: self.line,
            cursor: self.cursor,
            count: self.count,
            is_next_empty: self.is_next_empty,
        }
    }

    fn store(&mut self, state: AtParserState) {
        self.line = state.line;
        self.cursor = state.cursor;
        self.count = state.count;
        self.is_next_empty = state.is_next_empty;
    }
}

/// AT command type.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum at_parser_cmd_type {
    /// Not a command, or the type could not be determined.
    AT_PARSER_CMD_TYPE_UNKNOWN,
    /// `AT+CMD=...`, `AT+CMD`, `AT`
    AT_PARSER_CMD_TYPE_SET,
    /// `AT+CMD?`
    AT_PARSER_CMD_TYPE_READ,
    /// `AT+CMD=?`
    AT_PARSER_CMD_TYPE_TEST,
}

impl From<AtCmdType> for at_parser_cmd_type {
    fn from(t: AtCmdType) -> Self {
        match t {
            AtCmdType::Set => Self::AT_PARSER_CMD_TYPE_SET,
            AtCmdType::Read => Self::AT_PARSER_CMD_TYPE_READ,
            AtCmdType::Test => Self::AT_PARSER_CMD_TYPE_TEST,
        }
    }
}

// ── Helpers ─────────────────────────────────────────────────────────────

fn einval() -> c_int {
    AtParserError::InvalidArgument.errno()
}

/// Run an FFI entrypoint and convert panics into `-EFAULT`.
fn guard_ffi_errno<F>(f: F) -> c_int
where
    F: FnOnce() -> c_int,
{
    catch_unwind(AssertUnwindSafe(f)).unwrap_or(-EFAULT)
}

/// Rebuild the parser from `raw`, run `f`, and store the new position.
///
/// # Safety
///
/// `raw` must be null or point to a valid `at_parser`.
unsafe fn with_parser<F>(raw: *mut at_parser, f: F) -> c_int
where
    F: FnOnce(&mut AtParser<'_>) -> Result<(), AtParserError>,
{
    guard_ffi_errno(|| {
        let Some(raw) = (unsafe { raw.as_mut() }) else {
            return einval();
        };
        if raw.init_sentinel != INIT_SENTINEL || raw.at.is_null() {
            return AtParserError::NotInitialized.errno();
        }
        let Ok(input) = unsafe { CStr::from_ptr(raw.at) }.to_str() else {
            return AtParserError::Malformed { offset: 0 }.errno();
        };
        let mut parser = match AtParser::resume(input, raw.state()) {
            Ok(parser) => parser,
            Err(e) => return e.errno(),
        };
        let result = f(&mut parser);
        raw.store(parser.state());
        match result {
            Ok(()) => 0,
            Err(e) => e.errno(),
        }
    })
}

// ── Public API ──────────────────────────────────────────────────────────

/// Initialize `parser` over the NUL-terminated string `at`.
///
/// Returns `-EINVAL` if either pointer is null or `at` is not UTF-8.
///
/// # Safety
///
/// `parser` must be null or valid for writes. `at` must be null or a valid
/// NUL-terminated string that outlives every later use of `parser`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn at_parser_init(parser: *mut at_parser, at: *const c_char) -> c_int {
    guard_ffi_errno(|| {
        let Some(parser) = (unsafe { parser.as_mut() }) else {
            return einval();
        };
        if at.is_null() || unsafe { CStr::from_ptr(at) }.to_str().is_err() {
            return einval();
        }
        *parser = at_parser {
            at,
            init_sentinel: INIT_SENTINEL,
            ..at_parser::default()
        };
        0
    })
}

/// Move to the next command line.
///
/// # Safety
///
/// `parser` must be null or point to an `at_parser`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn at_parser_cmd_next(parser: *mut at_parser) -> c_int {
    unsafe { with_parser(parser, |p| p.next_command()) }
}

/// Get the type of the command on the current line.
///
/// `*type_out` is set to `AT_PARSER_CMD_TYPE_UNKNOWN` on failure.
///
/// # Safety
///
/// `parser` must be null or point to an `at_parser`; `type_out` must be null
/// or valid for writes.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn at_parser_cmd_type_get(
    parser: *mut at_parser,
    type_out: *mut at_parser_cmd_type,
) -> c_int {
    if type_out.is_null() {
        return einval();
    }
    unsafe { *type_out = at_parser_cmd_type::AT_PARSER_CMD_TYPE_UNKNOWN };
    unsafe {
        with_parser(parser, |p| {
            let t = p.command_type()?;
            *type_out = t.into();
            Ok(())
        })
    }
}

/// Get the number of tokens on the current line, command included.
///
/// # Safety
///
/// `parser` must be null or point to an `at_parser`; `count` must be null or
/// valid for writes.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn at_parser_cmd_count_get(parser: *mut at_parser, count: *mut usize) -> c_int {
    if count.is_null() {
        return einval();
    }
    unsafe {
        with_parser(parser, |p| {
            *count = p.subparameter_count()?;
            Ok(())
        })
    }
}

macro_rules! int_getter {
    ($(#[$doc:meta])* $name:ident, $t:ty) => {
        $(#[$doc])*
        ///
        /// # Safety
        ///
        /// `parser` must be null or point to an `at_parser`; `value` must be
        /// null or valid for writes.
        #[unsafe(no_mangle)]
        pub unsafe extern "C" fn $name(parser: *mut at_parser, index: usize, value: *mut $t) -> c_int {
            if value.is_null() {
                return einval();
            }
            unsafe {
                with_parser(parser, |p| {
                    *value = p.get_int::<$t>(index)?;
                    Ok(())
                })
            }
        }
    };
}

int_getter!(
    /// Get the `int16_t` subparameter at `index`.
    at_parser_int16_get, i16
);
int_getter!(
    /// Get the `uint16_t` subparameter at `index`.
    at_parser_uint16_get, u16
);
int_getter!(
    /// Get the `int32_t` subparameter at `index`.
    at_parser_int32_get, i32
);
int_getter!(
    /// Get the `uint32_t` subparameter at `index`.
    at_parser_uint32_get, u32
);
int_getter!(
    /// Get the `int64_t` subparameter at `index`.
    at_parser_int64_get, i64
);
int_getter!(
    /// Get the `uint64_t` subparameter at `index`.
    at_parser_uint64_get, u64
);

/// Copy the string at `index` into `str` and NUL-terminate it.
///
/// On entry `*len` is the size of `str`; on success it is the string length
/// without the terminator. Nothing is written to `str` on failure.
///
/// # Safety
///
/// `parser` must be null or point to an `at_parser`; `str` must be null or
/// valid for `*len` bytes of writes; `len` must be null or valid for reads and
/// writes.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn at_parser_string_get(
    parser: *mut at_parser,
    index: usize,
    str: *mut c_char,
    len: *mut usize,
) -> c_int {
    if str.is_null() || len.is_null() {
        return einval();
    }
    let capacity = unsafe { *len };
    unsafe {
        with_parser(parser, |p| {
            let buf = slice::from_raw_parts_mut(str.cast::<u8>(), capacity);
            *len = p.get_string(index, buf)?;
            Ok(())
        })
    }
}

/// Point `*str_ptr` at the string at `index` inside the parsed input.
///
/// The string is not NUL-terminated; `*len` receives its length.
///
/// # Safety
///
/// `parser` must be null or point to an `at_parser`; `str_ptr` and `len` must
/// be null or valid for writes.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn at_parser_string_ptr_get(
    parser: *mut at_parser,
    index: usize,
    str_ptr: *mut *const c_char,
    len: *mut usize,
) -> c_int {
    if str_ptr.is_null() || len.is_null() {
        return einval();
    }
    unsafe {
        with_parser(parser, |p| {
            let value = p.get_str(index)?;
            *str_ptr = value.as_ptr().cast::<c_char>();
            *len = value.len();
            Ok(())
        })
    }
}
