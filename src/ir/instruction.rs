//! IR instruction and operand definitions

use std::fmt;

use super::types::Type;

/// A typed name; identity is the name within its owning scope
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variable {
    /// The variable name
    pub name: String,
    /// The variable type
    pub ty: Type,
}

impl Variable {
    /// Creates a typed variable
    pub fn new(name: impl Into<String>, ty: Type) -> Self {
        Variable {
            name: name.into(),
            ty,
        }
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.name, self.ty)
    }
}

/// An instruction operand
///
/// Operands are values: they may reference a [`Variable`] but never own or
/// mutate one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operand {
    /// A typed variable reference, rendered `name:type`
    Var(Variable),
    /// A signed integer literal
    ConstInt(i64),
    /// A function constant, rendered `@name:type`; taking one marks the
    /// function address-taken
    ConstFunc {
        /// The referenced function name
        function: String,
        /// The function type annotation
        ty: Type,
    },
    /// The null pointer constant, rendered `@nullptr:type`
    ConstNullPtr {
        /// The pointer type annotation
        ty: Type,
    },
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Var(var) => write!(f, "{}", var),
            Operand::ConstInt(value) => write!(f, "{}", value),
            Operand::ConstFunc { function, ty } => write!(f, "@{}:{}", function, ty),
            Operand::ConstNullPtr { ty } => write!(f, "@nullptr:{}", ty),
        }
    }
}

/// Arithmetic operations for `$arith`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Aop {
    /// Addition
    Add,
    /// Subtraction
    Sub,
    /// Multiplication
    Mul,
    /// Division
    Div,
}

impl Aop {
    /// Parses an arithmetic mnemonic
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "add" => Some(Aop::Add),
            "sub" => Some(Aop::Sub),
            "mul" => Some(Aop::Mul),
            "div" => Some(Aop::Div),
            _ => None,
        }
    }

    /// The textual mnemonic
    pub fn as_str(&self) -> &'static str {
        match self {
            Aop::Add => "add",
            Aop::Sub => "sub",
            Aop::Mul => "mul",
            Aop::Div => "div",
        }
    }
}

/// Relational operations for `$cmp`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rop {
    /// Equal
    Eq,
    /// Not equal
    Neq,
    /// Less than
    Lt,
    /// Greater than
    Gt,
    /// Less than or equal
    Lte,
    /// Greater than or equal
    Gte,
}

impl Rop {
    /// Parses a relational mnemonic
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "eq" => Some(Rop::Eq),
            "neq" => Some(Rop::Neq),
            "lt" => Some(Rop::Lt),
            "gt" => Some(Rop::Gt),
            "lte" => Some(Rop::Lte),
            "gte" => Some(Rop::Gte),
            _ => None,
        }
    }

    /// The textual mnemonic
    pub fn as_str(&self) -> &'static str {
        match self {
            Rop::Eq => "eq",
            Rop::Neq => "neq",
            Rop::Lt => "lt",
            Rop::Gt => "gt",
            Rop::Lte => "lte",
            Rop::Gte => "gte",
        }
    }
}

/// Index of a basic block within its owning function
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlockId(pub usize);

/// An IR instruction
///
/// `Ret`, `Jump`, and `Branch` are terminators; a block's last instruction is
/// always one of them and no other position may hold one. `Jump` and `Branch`
/// keep their raw label strings from parse time; the resolved [`BlockId`]
/// targets are filled in once the owning function knows its full block set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Instruction {
    /// `lhs = $arith op left right`
    Arith {
        /// Destination variable
        lhs: Variable,
        /// Arithmetic operation
        op: Aop,
        /// Left operand
        left: Operand,
        /// Right operand
        right: Operand,
    },
    /// `lhs = $cmp op left right`
    Cmp {
        /// Destination variable
        lhs: Variable,
        /// Relational operation
        op: Rop,
        /// Left operand
        left: Operand,
        /// Right operand
        right: Operand,
    },
    /// `lhs = $phi(op, op, ...)`
    Phi {
        /// Destination variable
        lhs: Variable,
        /// Incoming operands, in textual order
        ops: Vec<Operand>,
    },
    /// `lhs = $copy rhs`
    Copy {
        /// Destination variable
        lhs: Variable,
        /// Source operand
        rhs: Operand,
    },
    /// `lhs = $alloc`
    Alloc {
        /// Destination pointer variable
        lhs: Variable,
    },
    /// `lhs = $addrof target`
    Addrof {
        /// Destination pointer variable
        lhs: Variable,
        /// Operand whose address is taken
        target: Operand,
    },
    /// `lhs = $load src_ptr`
    Load {
        /// Destination variable
        lhs: Variable,
        /// Pointer operand loaded from
        src_ptr: Operand,
    },
    /// `$store dest value`
    Store {
        /// Pointer operand stored through
        dest: Operand,
        /// Value operand stored
        value: Operand,
    },
    /// `lhs = $gep src_ptr array_index field_name?`
    Gep {
        /// Destination pointer variable
        lhs: Variable,
        /// Base pointer operand
        src_ptr: Operand,
        /// Array index operand
        array_index: Operand,
        /// Optional struct field selected after indexing
        field_name: Option<String>,
    },
    /// `lhs = $select condition true_op false_op`
    Select {
        /// Destination variable
        lhs: Variable,
        /// Condition operand
        condition: Operand,
        /// Operand chosen when the condition is non-zero
        true_op: Operand,
        /// Operand chosen when the condition is zero
        false_op: Operand,
    },
    /// Direct call `lhs = $call callee(args)`
    Call {
        /// Destination variable
        lhs: Variable,
        /// Callee function name
        callee: String,
        /// Argument operands
        args: Vec<Operand>,
    },
    /// Indirect call `lhs = $icall function(args)`
    ICall {
        /// Destination variable
        lhs: Variable,
        /// Function-pointer operand
        function: Operand,
        /// Argument operands
        args: Vec<Operand>,
    },
    /// Terminator `$ret value`
    Ret {
        /// Returned operand
        value: Operand,
    },
    /// Terminator `$jump label`
    Jump {
        /// Raw target label from parse time
        label: String,
        /// Resolved target block
        target: Option<BlockId>,
    },
    /// Terminator `$branch condition label_true label_false`
    Branch {
        /// Condition operand
        condition: Operand,
        /// Raw label taken when the condition is non-zero
        label_true: String,
        /// Raw label taken when the condition is zero
        label_false: String,
        /// Resolved true-edge block
        target_true: Option<BlockId>,
        /// Resolved false-edge block
        target_false: Option<BlockId>,
    },
}

impl Instruction {
    /// True for `Ret`, `Jump`, and `Branch`
    pub fn is_terminator(&self) -> bool {
        matches!(
            self,
            Instruction::Ret { .. } | Instruction::Jump { .. } | Instruction::Branch { .. }
        )
    }

    /// Resolved control-flow successors of a terminator
    ///
    /// Empty for `Ret`, for non-terminators, and for terminators whose labels
    /// have not been resolved yet.
    pub fn successors(&self) -> Vec<BlockId> {
        match self {
            Instruction::Jump { target, .. } => target.iter().copied().collect(),
            Instruction::Branch {
                target_true,
                target_false,
                ..
            } => target_true
                .iter()
                .chain(target_false.iter())
                .copied()
                .collect(),
            _ => Vec::new(),
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Instruction::Arith {
                lhs,
                op,
                left,
                right,
            } => write!(f, "{} = $arith {} {} {}", lhs, op.as_str(), left, right),
            Instruction::Cmp {
                lhs,
                op,
                left,
                right,
            } => write!(f, "{} = $cmp {} {} {}", lhs, op.as_str(), left, right),
            Instruction::Phi { lhs, ops } => {
                let rendered: Vec<String> = ops.iter().map(|op| op.to_string()).collect();
                write!(f, "{} = $phi({})", lhs, rendered.join(", "))
            }
            Instruction::Copy { lhs, rhs } => write!(f, "{} = $copy {}", lhs, rhs),
            Instruction::Alloc { lhs } => write!(f, "{} = $alloc", lhs),
            Instruction::Addrof { lhs, target } => write!(f, "{} = $addrof {}", lhs, target),
            Instruction::Load { lhs, src_ptr } => write!(f, "{} = $load {}", lhs, src_ptr),
            Instruction::Store { dest, value } => write!(f, "$store {} {}", dest, value),
            Instruction::Gep {
                lhs,
                src_ptr,
                array_index,
                field_name,
            } => match field_name {
                Some(field) => write!(f, "{} = $gep {} {} {}", lhs, src_ptr, array_index, field),
                None => write!(f, "{} = $gep {} {}", lhs, src_ptr, array_index),
            },
            Instruction::Select {
                lhs,
                condition,
                true_op,
                false_op,
            } => write!(f, "{} = $select {} {} {}", lhs, condition, true_op, false_op),
            Instruction::Call { lhs, callee, args } => {
                let rendered: Vec<String> = args.iter().map(|arg| arg.to_string()).collect();
                write!(f, "{} = $call {}({})", lhs, callee, rendered.join(", "))
            }
            Instruction::ICall {
                lhs,
                function,
                args,
            } => {
                let rendered: Vec<String> = args.iter().map(|arg| arg.to_string()).collect();
                write!(f, "{} = $icall {}({})", lhs, function, rendered.join(", "))
            }
            Instruction::Ret { value } => write!(f, "$ret {}", value),
            Instruction::Jump { label, .. } => write!(f, "$jump {}", label),
            Instruction::Branch {
                condition,
                label_true,
                label_false,
                ..
            } => write!(f, "$branch {} {} {}", condition, label_true, label_false),
        }
    }
}
