//! # Control-flow intermediate representation
//!
//! The IR models a program as structs plus functions, where each function is
//! a set of labeled basic blocks ending in terminators. Blocks reference one
//! another through [`BlockId`] indices resolved after the whole function has
//! been parsed, so forward jumps need no deferred-initialization tricks.
//!
//! ## Module Structure
//!
//! ```text
//! ir/
//! ├── mod.rs          # This file - module definition and re-exports
//! ├── types.rs        # Type, StructField, Struct
//! ├── instruction.rs  # Variable, Operand, Aop/Rop, BlockId, Instruction
//! └── program.rs      # BasicBlock, Function, Program (CFG representation)
//! ```
//!
//! ## Key Types
//!
//! - [`Type`] - base name plus pointer indirection count
//! - [`Instruction`] - closed instruction set, terminators included
//! - [`Function`] - label-resolved control-flow graph with an `entry` block
//! - [`Program`] - structs and functions, addressable by program point

mod instruction;
mod program;
mod types;

pub use instruction::{Aop, BlockId, Instruction, Operand, Rop, Variable};
pub use program::{BasicBlock, Function, Program};
pub use types::{Struct, StructField, Type};
