use std::collections::HashSet;

use lazy_static::lazy_static;
use regex::Regex;
use tracing::{debug, trace};

use crate::error::{snippet, Error, Result};
use crate::ir::{
    Aop, BasicBlock, Function, Instruction, Operand, Program, Rop, Struct, StructField, Type,
    Variable,
};
use crate::lexer::Cursor;

lazy_static! {
    /// Variable names, labels, callee names; dots allowed.
    static ref NAME_RE: Regex = Regex::new(r"^[\w.]+").unwrap();
    /// A type token plus one delimiter; a trailing `(`, `)` or `,` caught by
    /// the greedy class is pushed back by `parse_type`.
    static ref TYPE_RE: Regex = Regex::new(r"^[\w\[\]*,]+[\s(),]").unwrap();
    static ref INT_RE: Regex = Regex::new(r"^-?\d+").unwrap();
    static ref WORD_RE: Regex = Regex::new(r"^\w+").unwrap();
    /// A gep field name: a bare name with no `:type` annotation after it.
    static ref GEP_FIELD_RE: Regex = Regex::new(r"^[\w.]+\s").unwrap();
}

/// Recursive-descent parser for the IR textual grammar
///
/// One parser instance handles one source text. The set of functions whose
/// address is taken (`@name` operands) accumulates on the parser while
/// individual functions parse, and is applied to the program once all
/// functions are known.
pub struct IrParser<'a> {
    cursor: Cursor<'a>,
    address_taken: HashSet<String>,
}

impl<'a> IrParser<'a> {
    /// Creates a parser over the full source text
    pub fn new(source: &'a str) -> Self {
        IrParser {
            cursor: Cursor::new(source),
            address_taken: HashSet::new(),
        }
    }

    /// Parses the entire text into a resolved [`Program`]
    ///
    /// The whole input must be consumed; trailing text after the last
    /// function is a hard error.
    pub fn parse_program(&mut self) -> Result<Program> {
        let structs = self.parse_structs()?;
        let functions = self.parse_functions()?;
        if !self.cursor.at_end() {
            return Err(Error::TrailingInput {
                near: snippet(self.cursor.rest()),
            });
        }
        let mut program = Program::new(structs, functions)?;
        for func in &mut program.functions {
            if self.address_taken.contains(&func.name) {
                func.address_taken = true;
            }
        }
        debug!(
            structs = program.structs.len(),
            functions = program.functions.len(),
            "parsed IR program"
        );
        Ok(program)
    }

    fn parse_structs(&mut self) -> Result<Vec<Struct>> {
        let mut structs = Vec::new();
        while self.cursor.lookahead("struct") {
            structs.push(self.parse_struct()?);
        }
        Ok(structs)
    }

    fn parse_struct(&mut self) -> Result<Struct> {
        self.cursor.consume_str("struct")?;
        let name = self.parse_varname()?;
        self.cursor.consume_str("{")?;
        let mut fields = Vec::new();
        while !self.cursor.lookahead("}") {
            let field_name = self.parse_varname()?;
            self.cursor.consume_str(":")?;
            let field_type = self.parse_type()?;
            fields.push(StructField::new(field_name, field_type));
        }
        self.cursor.consume_str("}")?;
        Ok(Struct::new(name, fields))
    }

    fn parse_functions(&mut self) -> Result<Vec<Function>> {
        let mut functions = Vec::new();
        while self.cursor.lookahead("function") {
            functions.push(self.parse_function()?);
        }
        Ok(functions)
    }

    fn parse_function(&mut self) -> Result<Function> {
        self.cursor.consume_str("function")?;
        let name = self.parse_varname()?;
        self.cursor.consume_str("(")?;
        let mut params = Vec::new();
        while !self.cursor.lookahead(")") {
            let param_name = self.parse_varname()?;
            self.cursor.consume_str(":")?;
            let param_type = self.parse_type()?;
            params.push(Variable::new(param_name, param_type));
            if self.cursor.lookahead(",") {
                self.cursor.consume_str(",")?;
            }
        }
        self.cursor.consume_str(")")?;
        self.cursor.consume_str("->")?;
        let return_type = self.parse_type()?;
        self.cursor.consume_str("{")?;
        let mut blocks = Vec::new();
        while !self.cursor.lookahead("}") {
            blocks.push(self.parse_basic_block()?);
        }
        self.cursor.consume_str("}")?;
        trace!(function = %name, blocks = blocks.len(), "parsed function");
        Function::new(name, return_type, params, blocks)
    }

    fn parse_basic_block(&mut self) -> Result<BasicBlock> {
        let label = self.parse_label()?;
        self.cursor.consume_str(":")?;
        let mut body = Vec::new();
        loop {
            let inst = self.parse_instruction()?;
            let done = inst.is_terminator();
            body.push(inst);
            if done {
                break;
            }
        }
        Ok(BasicBlock::new(label, body))
    }

    fn parse_instruction(&mut self) -> Result<Instruction> {
        if self.cursor.lookahead("$") {
            let opcode = self.parse_opcode()?;
            return match opcode.as_str() {
                "store" => {
                    let dest = self.parse_operand()?;
                    let value = self.parse_operand()?;
                    Ok(Instruction::Store { dest, value })
                }
                "ret" => {
                    let value = self.parse_operand()?;
                    Ok(Instruction::Ret { value })
                }
                "jump" => {
                    let label = self.parse_label()?;
                    Ok(Instruction::Jump {
                        label,
                        target: None,
                    })
                }
                "branch" => {
                    let condition = self.parse_operand()?;
                    let label_true = self.parse_label()?;
                    let label_false = self.parse_label()?;
                    Ok(Instruction::Branch {
                        condition,
                        label_true,
                        label_false,
                        target_true: None,
                        target_false: None,
                    })
                }
                _ => Err(Error::UnknownInstruction { opcode }),
            };
        }

        let lhs = self.parse_variable()?;
        self.cursor.consume_str("=")?;
        let opcode = self.parse_opcode()?;
        match opcode.as_str() {
            "icall" => {
                let function = self.parse_operand()?;
                let args = self.parse_arg_list()?;
                Ok(Instruction::ICall {
                    lhs,
                    function,
                    args,
                })
            }
            "call" => {
                let callee = self.parse_varname()?;
                let args = self.parse_arg_list()?;
                Ok(Instruction::Call { lhs, callee, args })
            }
            "select" => {
                let condition = self.parse_operand()?;
                let true_op = self.parse_operand()?;
                let false_op = self.parse_operand()?;
                Ok(Instruction::Select {
                    lhs,
                    condition,
                    true_op,
                    false_op,
                })
            }
            "gep" => {
                let src_ptr = self.parse_operand()?;
                let array_index = self.parse_operand()?;
                // A bare name after the index (no `:type`) is a field name.
                let field_name = if self.cursor.lookahead_re(&GEP_FIELD_RE) {
                    Some(self.parse_varname()?)
                } else {
                    None
                };
                Ok(Instruction::Gep {
                    lhs,
                    src_ptr,
                    array_index,
                    field_name,
                })
            }
            "load" => {
                let src_ptr = self.parse_operand()?;
                Ok(Instruction::Load { lhs, src_ptr })
            }
            "addrof" => {
                let target = self.parse_operand()?;
                Ok(Instruction::Addrof { lhs, target })
            }
            "alloc" => Ok(Instruction::Alloc { lhs }),
            "copy" => {
                let rhs = self.parse_operand()?;
                Ok(Instruction::Copy { lhs, rhs })
            }
            "phi" => {
                let ops = self.parse_arg_list()?;
                Ok(Instruction::Phi { lhs, ops })
            }
            "cmp" => {
                let op = self.parse_rop()?;
                let left = self.parse_operand()?;
                let right = self.parse_operand()?;
                Ok(Instruction::Cmp {
                    lhs,
                    op,
                    left,
                    right,
                })
            }
            "arith" => {
                let op = self.parse_aop()?;
                let left = self.parse_operand()?;
                let right = self.parse_operand()?;
                Ok(Instruction::Arith {
                    lhs,
                    op,
                    left,
                    right,
                })
            }
            _ => Err(Error::UnknownInstruction { opcode }),
        }
    }

    /// A parenthesized, comma-separated operand list (`call` args, `phi` ops)
    fn parse_arg_list(&mut self) -> Result<Vec<Operand>> {
        self.cursor.consume_str("(")?;
        let mut args = Vec::new();
        while !self.cursor.lookahead(")") {
            args.push(self.parse_operand()?);
            if self.cursor.lookahead(",") {
                self.cursor.consume_str(",")?;
            }
        }
        self.cursor.consume_str(")")?;
        Ok(args)
    }

    fn parse_rop(&mut self) -> Result<Rop> {
        let mnemonic = self.cursor.consume(&WORD_RE)?;
        Rop::parse(mnemonic).ok_or_else(|| Error::UnknownOperation {
            mnemonic: mnemonic.to_string(),
        })
    }

    fn parse_aop(&mut self) -> Result<Aop> {
        let mnemonic = self.cursor.consume(&WORD_RE)?;
        Aop::parse(mnemonic).ok_or_else(|| Error::UnknownOperation {
            mnemonic: mnemonic.to_string(),
        })
    }

    /// Operand forms, tried in order: integer literal, `@nullptr:<type>`,
    /// `@<function>:<type>`, typed variable reference
    fn parse_operand(&mut self) -> Result<Operand> {
        if self.cursor.lookahead_re(&INT_RE) {
            return self.parse_const_int();
        }
        if self.cursor.lookahead("@nullptr") {
            return self.parse_const_nullptr();
        }
        if self.cursor.lookahead("@") {
            return self.parse_const_func();
        }
        Ok(Operand::Var(self.parse_variable()?))
    }

    fn parse_opcode(&mut self) -> Result<String> {
        self.cursor.consume_str("$")?;
        Ok(self.cursor.consume(&WORD_RE)?.to_string())
    }

    fn parse_varname(&mut self) -> Result<String> {
        Ok(self.cursor.consume(&NAME_RE)?.to_string())
    }

    fn parse_label(&mut self) -> Result<String> {
        Ok(self.cursor.consume(&NAME_RE)?.to_string())
    }

    /// A type token: `[\w\[\]*,]+` up to a delimiter, with trailing `*`s
    /// counted as indirection levels
    ///
    /// The greedy character class can swallow a `(`, `)` or `,` that belongs
    /// to the surrounding grammar; such a trailing delimiter is pushed back
    /// into the stream before the token is interpreted.
    fn parse_type(&mut self) -> Result<Type> {
        let matched = self
            .cursor
            .peek_match(&TYPE_RE)
            .ok_or_else(|| self.cursor.mismatch(TYPE_RE.as_str()))?;
        let trimmed = matched.trim_end();
        let token = match trimmed.chars().last() {
            Some('(') | Some(')') | Some(',') => {
                let token = &trimmed[..trimmed.len() - 1];
                self.cursor.advance(token.len());
                token
            }
            _ => {
                self.cursor.advance(matched.len());
                trimmed
            }
        };
        self.cursor.skip_whitespace();

        let mut base = token;
        let mut indirection = 0;
        while let Some(stripped) = base.strip_suffix('*') {
            base = stripped;
            indirection += 1;
        }
        Ok(Type::new(base, indirection))
    }

    fn parse_const_int(&mut self) -> Result<Operand> {
        let text = self.cursor.consume(&INT_RE)?;
        let value = text
            .parse::<i64>()
            .map_err(|_| Error::grammar("integer literal", text))?;
        Ok(Operand::ConstInt(value))
    }

    fn parse_const_nullptr(&mut self) -> Result<Operand> {
        self.cursor.consume_str("@nullptr")?;
        self.cursor.consume_str(":")?;
        let ty = self.parse_type()?;
        Ok(Operand::ConstNullPtr { ty })
    }

    fn parse_const_func(&mut self) -> Result<Operand> {
        self.cursor.consume_str("@")?;
        let function = self.parse_varname()?;
        self.cursor.consume_str(":")?;
        let ty = self.parse_type()?;
        self.address_taken.insert(function.clone());
        Ok(Operand::ConstFunc { function, ty })
    }

    fn parse_variable(&mut self) -> Result<Variable> {
        let name = self.parse_varname()?;
        self.cursor.consume_str(":")?;
        let ty = self.parse_type()?;
        Ok(Variable::new(name, ty))
    }
}
