//! IR parser module
//!
//! Recursive descent over the IR grammar: structs, then functions, each
//! function a sequence of labeled blocks whose terminator labels are resolved
//! after the whole function has been read.

mod ir_parser;

pub use ir_parser::IrParser;
