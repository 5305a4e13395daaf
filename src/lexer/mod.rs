//! Lexical layer for the cflow front end
//!
//! Both textual languages are consumed through the same minimal abstraction:
//! a cursor over the remaining input that removes matching prefixes and skips
//! trailing whitespace.

mod cursor;

pub use cursor::Cursor;
