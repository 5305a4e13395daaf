//! Basic blocks, functions, and whole-program CFG representation

use std::collections::HashMap;
use std::fmt::Write as _;

use super::instruction::{BlockId, Instruction, Variable};
use super::types::{Struct, Type};
use crate::error::{Error, Result};

/// A labeled straight-line instruction sequence ending in a terminator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BasicBlock {
    /// Label identifying this block within its function
    pub label: String,
    /// Instructions in this block; the last one is always a terminator
    pub body: Vec<Instruction>,
}

impl BasicBlock {
    /// Creates a basic block from its label and body
    ///
    /// The terminator invariant is checked when the owning [`Function`] is
    /// constructed, not here: the parser builds blocks before the function
    /// exists.
    pub fn new(label: impl Into<String>, body: Vec<Instruction>) -> Self {
        BasicBlock {
            label: label.into(),
            body,
        }
    }

    /// The block's terminator, if the body is non-empty
    pub fn terminator(&self) -> Option<&Instruction> {
        self.body.last()
    }

    /// Resolved successor blocks of this block's terminator
    pub fn successors(&self) -> Vec<BlockId> {
        self.terminator()
            .map(|inst| inst.successors())
            .unwrap_or_default()
    }

    fn render(&self, out: &mut String) {
        let _ = writeln!(out, "{}:", self.label);
        for inst in &self.body {
            let _ = writeln!(out, "  {}", inst);
        }
    }
}

/// A function: parameters, return type, and a label-resolved block set
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Function {
    /// The function name
    pub name: String,
    /// The declared return type
    pub return_type: Type,
    /// Parameters, in declaration order
    pub parameters: Vec<Variable>,
    /// Basic blocks, in parse order; labels are unique
    pub blocks: Vec<BasicBlock>,
    /// The block labeled `entry`
    pub entry: BlockId,
    /// The last block whose terminator is `$ret`, if any
    pub exit: Option<BlockId>,
    /// Synthesized function type `ret[param,...]`
    pub ty: Type,
    /// Set by the program builder when `@name` takes this function's address
    pub address_taken: bool,
}

impl Function {
    /// Builds a function and resolves every terminator label to a [`BlockId`]
    ///
    /// Fails on an empty or unterminated block, a duplicate label, a label
    /// with no matching block, or a missing `entry` block.
    pub fn new(
        name: impl Into<String>,
        return_type: Type,
        parameters: Vec<Variable>,
        mut blocks: Vec<BasicBlock>,
    ) -> Result<Self> {
        let name = name.into();

        let mut labels: HashMap<String, BlockId> = HashMap::new();
        for (index, block) in blocks.iter().enumerate() {
            match block.terminator() {
                Some(inst) if inst.is_terminator() => {}
                _ => {
                    return Err(Error::MissingTerminator {
                        block: format!("{}.{}", name, block.label),
                    })
                }
            }
            if labels
                .insert(block.label.clone(), BlockId(index))
                .is_some()
            {
                return Err(Error::DuplicateLabel {
                    function: name,
                    label: block.label.clone(),
                });
            }
        }

        let mut exit = None;
        for (index, block) in blocks.iter_mut().enumerate() {
            let resolve = |label: &str| -> Result<BlockId> {
                labels.get(label).copied().ok_or_else(|| Error::UnresolvedLabel {
                    function: name.clone(),
                    label: label.to_string(),
                })
            };
            // Checked above; blocks are never empty here.
            if let Some(terminator) = block.body.last_mut() {
                match terminator {
                    Instruction::Jump { label, target } => {
                        *target = Some(resolve(label)?);
                    }
                    Instruction::Branch {
                        label_true,
                        label_false,
                        target_true,
                        target_false,
                        ..
                    } => {
                        *target_true = Some(resolve(label_true)?);
                        *target_false = Some(resolve(label_false)?);
                    }
                    Instruction::Ret { .. } => {
                        exit = Some(BlockId(index));
                    }
                    _ => {}
                }
            }
        }

        let entry = labels
            .get("entry")
            .copied()
            .ok_or_else(|| Error::MissingEntryBlock {
                function: name.clone(),
            })?;

        let param_types: Vec<String> = parameters.iter().map(|p| p.ty.to_string()).collect();
        let ty = Type::new(
            format!("{}[{}]", return_type, param_types.join(",")),
            0,
        );

        Ok(Function {
            name,
            return_type,
            parameters,
            blocks,
            entry,
            exit,
            ty,
            address_taken: false,
        })
    }

    /// Looks up a block by label
    pub fn block(&self, label: &str) -> Option<&BasicBlock> {
        self.blocks.iter().find(|b| b.label == label)
    }

    /// Looks up a block id by label
    pub fn block_id(&self, label: &str) -> Option<BlockId> {
        self.blocks
            .iter()
            .position(|b| b.label == label)
            .map(BlockId)
    }

    /// The globally unique qualified name `<function>.<label>` of a block
    pub fn block_name(&self, id: BlockId) -> Option<String> {
        self.blocks
            .get(id.0)
            .map(|b| format!("{}.{}", self.name, b.label))
    }

    /// Canonical text of this function
    ///
    /// Blocks are emitted sorted by label so structurally identical functions
    /// serialize identically regardless of declaration order.
    pub fn output(&self) -> String {
        let mut out = String::new();
        let params: Vec<String> = self.parameters.iter().map(|p| p.to_string()).collect();
        let _ = writeln!(
            out,
            "function {}({}) -> {} {{",
            self.name,
            params.join(", "),
            self.return_type
        );
        let mut sorted: Vec<&BasicBlock> = self.blocks.iter().collect();
        sorted.sort_by(|a, b| a.label.cmp(&b.label));
        let mut rendered: Vec<String> = Vec::with_capacity(sorted.len());
        for block in sorted {
            let mut text = String::new();
            block.render(&mut text);
            rendered.push(text);
        }
        out.push_str(&rendered.join("\n"));
        out.push_str("}\n\n");
        out
    }
}

/// A whole program: struct layouts plus functions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Program {
    /// Struct layouts, in declaration order
    pub structs: Vec<Struct>,
    /// Functions, in declaration order
    pub functions: Vec<Function>,
}

impl Program {
    /// Builds a program, checking struct and function name uniqueness
    pub fn new(structs: Vec<Struct>, functions: Vec<Function>) -> Result<Self> {
        let mut seen: HashMap<&str, &'static str> = HashMap::new();
        for s in &structs {
            if seen.insert(s.name.as_str(), "struct").is_some() {
                return Err(Error::DuplicateDefinition {
                    kind: "struct",
                    name: s.name.clone(),
                });
            }
        }
        let mut seen: HashMap<&str, &'static str> = HashMap::new();
        for f in &functions {
            if seen.insert(f.name.as_str(), "function").is_some() {
                return Err(Error::DuplicateDefinition {
                    kind: "function",
                    name: f.name.clone(),
                });
            }
        }
        Ok(Program { structs, functions })
    }

    /// Looks up a function by name; absence is a queryable non-error
    pub fn get_function(&self, name: &str) -> Option<&Function> {
        self.functions.iter().find(|f| f.name == name)
    }

    /// Looks up a struct by name
    pub fn get_struct(&self, name: &str) -> Option<&Struct> {
        self.structs.iter().find(|s| s.name == name)
    }

    /// Resolves a program point `<function>.<block-label>.<index>` to its
    /// instruction
    ///
    /// Each component failure is a distinct error: malformed point, unknown
    /// function, unknown block, or out-of-range instruction index.
    pub fn instruction_at(&self, point: &str) -> Result<&Instruction> {
        let parts: Vec<&str> = point.split('.').collect();
        let &[func_name, block_label, index_text] = parts.as_slice() else {
            return Err(Error::MalformedProgramPoint {
                point: point.to_string(),
            });
        };
        let index: usize =
            index_text
                .parse()
                .map_err(|_| Error::MalformedProgramPoint {
                    point: point.to_string(),
                })?;
        let func = self
            .get_function(func_name)
            .ok_or_else(|| Error::UnknownFunction {
                point: point.to_string(),
                name: func_name.to_string(),
            })?;
        let block = func.block(block_label).ok_or_else(|| Error::UnknownBlock {
            point: point.to_string(),
            label: block_label.to_string(),
        })?;
        block
            .body
            .get(index)
            .ok_or_else(|| Error::InstructionIndexOutOfRange {
                point: point.to_string(),
                index,
            })
    }

    /// Canonical text of the whole program: structs in declaration order,
    /// then functions with their blocks sorted by label
    pub fn output(&self) -> String {
        let mut out = String::new();
        for s in &self.structs {
            let _ = writeln!(out, "struct {} {{", s.name);
            for field in &s.fields {
                let _ = writeln!(out, "  {}: {}", field.name, field.ty);
            }
            out.push_str("}\n\n");
        }
        for func in &self.functions {
            out.push_str(&func.output());
        }
        out
    }
}
