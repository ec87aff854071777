pub use at_parser_diagnostics::*;
