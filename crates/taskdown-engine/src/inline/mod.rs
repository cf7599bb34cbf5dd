//! Inline markdown parsing for leaf text runs.
//!
//! Converts lightweight styling syntax (bold, italic, strikethrough,
//! inline code, links) embedded in a text run into styled text leaves.
//! The parser is total: unmatched or malformed delimiters are emitted
//! verbatim, and concatenating the output leaves always reproduces the
//! input with only the recognized delimiter markers removed.

pub mod cursor;
pub mod kinds;
pub mod parser;

pub use parser::parse_inline;
