/// Parser cursor: indexed, lazy access to the tokens of one line.
pub mod cursor;
/// Re-exports from the diagnostics crate.
pub mod diag;
/// JSON serialization helpers.
pub mod dump;
/// AT matchers that classify and bound one lexical unit.
pub mod lexer;
/// Final response detection (`OK`, `ERROR`, `+CME ERROR`, `+CMS ERROR`).
pub mod response;
/// Eager tokenization of every line into a table.
pub mod scan;
/// Token types shared by the matchers, the cursor and the scanner.
pub mod token;
