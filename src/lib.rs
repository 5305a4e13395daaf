//! # cflow - Program-Analysis Front End
//!
//! The front end of an inclusion-based program-analysis toolchain. It defines
//! and parses two small textual languages and builds the in-memory graphs an
//! analysis engine consumes:
//!
//! - a **control-flow IR** with typed variables, struct layouts, basic
//!   blocks, and instructions, in a simplified SSA style;
//! - a **set-constraints language**: a term algebra of set variables,
//!   constructors, calls, and projections used to encode inclusion-based
//!   analyses such as points-to analysis.
//!
//! No solver or dataflow engine lives here; only the representations, the
//! parsers, and the canonical text each graph serializes back to.
//!
//! ## Quick Start
//!
//! Parse IR text into a resolved control-flow graph:
//!
//! ```rust
//! use cflow::IrParser;
//!
//! # fn main() -> Result<(), cflow::Error> {
//! let text = "function main() -> int {\nentry:\n  $jump done\ndone:\n  $ret 0\n}";
//! let program = IrParser::new(text).parse_program()?;
//!
//! let main = program.get_function("main").unwrap();
//! assert_eq!(main.blocks.len(), 2);
//!
//! // Forward jumps resolve to direct block references.
//! let entry = &main.blocks[main.entry.0];
//! assert_eq!(entry.successors(), vec![main.block_id("done").unwrap()]);
//!
//! // Any instruction is addressable by its program point.
//! assert_eq!(program.instruction_at("main.done.0")?.to_string(), "$ret 0");
//! # Ok(())
//! # }
//! ```
//!
//! Parse set constraints and render the canonical "carl" form:
//!
//! ```rust
//! use cflow::SetConstraints;
//!
//! # fn main() -> Result<(), cflow::Error> {
//! let sc = SetConstraints::parse(
//!     "def constructor c, arity 1, contravariant positions\ncall(c, x) <= y",
//! )?;
//! assert_eq!(sc.constructors.len(), 1);
//! assert_eq!(sc.variables.len(), 2); // x and y, created lazily
//! assert_eq!(sc.constraints.len(), 1);
//!
//! assert_eq!(
//!     sc.carl(),
//!     "def constructor c, arity 1, contravariant positions\ncall(c, x) <= y\n",
//! );
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! Two independent, structurally similar pipelines, each three layers deep:
//!
//! ```text
//! Source Text → Cursor → Recursive-Descent Parser → Resolved Graph → output()/carl()
//! ```
//!
//! ### Main Components
//!
//! - [`Cursor`] - consumable text view shared in spirit by both parsers
//! - [`IrParser`] - IR text to [`Program`], with deferred label resolution
//! - [`Program`] - structs and functions; blocks reference each other by
//!   [`BlockId`](ir::BlockId) index
//! - [`SetConstraints`] - owning registry of constructors, set variables,
//!   terms, and constraints, with bidirectional use indices
//!
//! ## Round-Trip Guarantees
//!
//! - `Program::output()` re-emits the IR grammar; reparsing it yields a
//!   structurally identical program (blocks are canonically sorted by label).
//! - `SetConstraints::carl()` is a normalized rendering (sorted constructor
//!   declarations, sorted de-duplicated constraints); reparsing it yields an
//!   equivalent system and rendering that again is a fixed point.
//!
//! ## Error Handling
//!
//! Every parse failure is a single descriptive [`Error`]; there is no
//! recovery or partial result. Grammar mismatches carry the failed pattern
//! and an excerpt of the remaining input:
//!
//! ```rust
//! use cflow::IrParser;
//!
//! let err = IrParser::new("function broken(").parse_program().unwrap_err();
//! assert!(err.to_string().contains("failed to consume"));
//! ```
//!
//! Parsing is synchronous and request-scoped: each call builds its own
//! isolated graph, and the only post-construction mutation is the one-time
//! label-resolution and address-taken pass at the end of the parse. The
//! recursive term parser is bounded by input nesting depth; pathologically
//! deep terms are limited only by the call stack.

/// Version of the cflow front end
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod constraints;
pub mod error;
pub mod ir;
pub mod lexer;
pub mod parser;

// Re-export main types
pub use constraints::{Constraint, Constructor, SetConstraints, SetVariable, Term};
pub use error::{Error, ErrorKind, Result};
pub use ir::{
    Aop, BasicBlock, Function, Instruction, Operand, Program, Rop, Struct, StructField, Type,
    Variable,
};
pub use lexer::Cursor;
pub use parser::IrParser;
