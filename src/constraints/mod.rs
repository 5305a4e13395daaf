//! # Set-constraints representation
//!
//! A term algebra for inclusion-based analyses: declared constructors, lazily
//! created set variables, and constraints `left <= right` between terms. The
//! [`SetConstraints`] registry owns every node; terms, constructors, and
//! variables cross-reference each other through index newtypes, which gives
//! the graph its sharing structure (every mention of a name is the same node)
//! without any aliasing tricks.
//!
//! ## Module Structure
//!
//! ```text
//! constraints/
//! ├── mod.rs      # This file - module definition and re-exports
//! ├── model.rs    # ids, SetVariable, Constructor, Term, Constraint, carl form
//! └── parser.rs   # line-oriented term-algebra parser
//! ```

mod model;
mod parser;

pub use model::{Constraint, Constructor, CtorId, SetConstraints, SetVariable, Term, TermId, VarId};
