//! Line-oriented parser for the set-constraints language
//!
//! Grammar:
//!
//! ```text
//! def constructor <name>, arity <int>, contravariant positions <int> <int> ...
//! def set variable <name>
//! <exp> <= <exp>
//! ```
//!
//! where `<exp>` is a set-variable name, `call(<ctor>, <exp>, ...)`, or
//! `proj(<ctor>, <var>, <int>)`. Constructors must be declared before use;
//! set variables are created lazily on first mention, so the explicit
//! `def set variable` form is accepted but never required.

use lazy_static::lazy_static;
use regex::Regex;
use tracing::debug;

use super::model::{CtorId, SetConstraints, TermId};
use crate::error::{Error, Result};

lazy_static! {
    static ref CONSTRUCTOR_DEF_RE: Regex =
        Regex::new(r"^def constructor (\w+), arity (\d+), contravariant positions ?(.*)$")
            .unwrap();
    static ref SET_VARIABLE_DEF_RE: Regex = Regex::new(r"^def set variable (\w+)$").unwrap();
    static ref CALL_RE: Regex = Regex::new(r"^call\((\w+)(?:,\s*(.*))?\)$").unwrap();
    static ref PROJ_RE: Regex = Regex::new(r"^proj\((\w+),\s*(\w+),\s*(\d+)\)$").unwrap();
    static ref NAME_RE: Regex = Regex::new(r"^\w+$").unwrap();
}

impl SetConstraints {
    /// Parses constraint text into a [`SetConstraints`] graph
    ///
    /// Blank lines are skipped; every other line is a declaration or one
    /// complete constraint. The first grammatically invalid line aborts the
    /// whole parse.
    pub fn parse(text: &str) -> Result<SetConstraints> {
        let mut graph = SetConstraints::new();
        for raw in text.lines() {
            let line = raw.trim();
            if line.is_empty() {
                continue;
            }
            if line.starts_with("def constructor ") {
                graph.add_parsed_constructor(line)?;
            } else if line.starts_with("def set variable ") {
                graph.add_parsed_set_variable(line)?;
            } else {
                graph.add_parsed_constraint(line)?;
            }
        }
        debug!(
            constructors = graph.constructors.len(),
            variables = graph.variables.len(),
            constraints = graph.constraints.len(),
            "parsed set constraints"
        );
        Ok(graph)
    }

    fn add_parsed_constructor(&mut self, line: &str) -> Result<()> {
        let caps = CONSTRUCTOR_DEF_RE
            .captures(line)
            .ok_or_else(|| Error::grammar("def constructor <name>, arity <int>, ...", line))?;
        let name = &caps[1];
        let arity: usize = caps[2]
            .parse()
            .map_err(|_| Error::grammar("arity integer", line))?;
        let mut positions = Vec::new();
        for word in caps[3].split_whitespace() {
            let position: usize = word
                .parse()
                .map_err(|_| Error::grammar("contravariant position integer", line))?;
            positions.push(position);
        }
        self.declare_constructor(name, arity, positions);
        Ok(())
    }

    fn add_parsed_set_variable(&mut self, line: &str) -> Result<()> {
        let caps = SET_VARIABLE_DEF_RE
            .captures(line)
            .ok_or_else(|| Error::grammar("def set variable <name>", line))?;
        self.intern_variable(&caps[1]);
        Ok(())
    }

    fn add_parsed_constraint(&mut self, line: &str) -> Result<()> {
        // Split on the last `<=`; terms themselves never contain one.
        let (left_text, right_text) = line
            .rsplit_once("<=")
            .ok_or_else(|| Error::grammar("<exp> <= <exp>", line))?;
        let left = self.parse_expression(left_text)?;
        let right = self.parse_expression(right_text)?;
        self.add_constraint(left, right);
        Ok(())
    }

    fn parse_expression(&mut self, text: &str) -> Result<TermId> {
        let text = text.trim();
        if text.starts_with("call(") {
            return self.parse_call(text);
        }
        if text.starts_with("proj(") {
            return self.parse_proj(text);
        }
        if text == "call" || text == "proj" {
            return Err(Error::grammar("set variable name", text));
        }
        if !NAME_RE.is_match(text) {
            return Err(Error::grammar("set variable name", text));
        }
        let var = self.intern_variable(text);
        Ok(self.var_term(var))
    }

    fn parse_call(&mut self, text: &str) -> Result<TermId> {
        let caps = CALL_RE
            .captures(text)
            .ok_or_else(|| Error::grammar("call(<ctor>, <exp>, ...)", text))?;
        let constructor = self.lookup_constructor(&caps[1])?;
        let mut args = Vec::new();
        if let Some(raw_args) = caps.get(2) {
            for piece in split_top_level(raw_args.as_str()) {
                args.push(self.parse_expression(piece)?);
            }
        }
        Ok(self.call_term(constructor, args))
    }

    fn parse_proj(&mut self, text: &str) -> Result<TermId> {
        let caps = PROJ_RE
            .captures(text)
            .ok_or_else(|| Error::grammar("proj(<ctor>, <var>, <int>)", text))?;
        let constructor = self.lookup_constructor(&caps[1])?;
        let var = self.intern_variable(&caps[2]);
        let index: usize = caps[3]
            .parse()
            .map_err(|_| Error::grammar("projection index integer", text))?;
        Ok(self.proj_term(constructor, var, index))
    }

    fn lookup_constructor(&self, name: &str) -> Result<CtorId> {
        self.constructor_id(name)
            .ok_or_else(|| Error::UndeclaredConstructor {
                name: name.to_string(),
            })
    }
}

/// Splits an argument list on commas at parenthesis depth zero
///
/// Arguments may themselves be nested `call(...)`/`proj(...)` terms
/// containing commas; a comma inside any nested `(...)` is never a separator
/// at this level.
fn split_top_level(raw_args: &str) -> Vec<&str> {
    let mut pieces = Vec::new();
    let mut depth = 0usize;
    let mut last = 0;
    for (i, c) in raw_args.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                pieces.push(&raw_args[last..i]);
                last = i + 1;
            }
            _ => {}
        }
    }
    pieces.push(&raw_args[last..]);
    pieces
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraints::Term;

    #[test]
    fn split_top_level_respects_depth() {
        assert_eq!(split_top_level("a, b, c"), vec!["a", " b", " c"]);
        assert_eq!(
            split_top_level("call(c, x), y"),
            vec!["call(c, x)", " y"]
        );
        assert_eq!(
            split_top_level("proj(c, v, 0), call(d, call(e), f)"),
            vec!["proj(c, v, 0)", " call(d, call(e), f)"]
        );
        assert_eq!(split_top_level("x"), vec!["x"]);
    }

    #[test]
    fn parses_the_minimal_example() {
        let sc = SetConstraints::parse(
            "def constructor c, arity 1, contravariant positions\ncall(c, x) <= y",
        )
        .unwrap();
        assert_eq!(sc.constructors.len(), 1);
        assert_eq!(sc.constructors[0].arity, 1);
        assert!(sc.constructors[0].contravariant_positions.is_empty());
        assert_eq!(sc.variables.len(), 2);
        assert_eq!(sc.constraints.len(), 1);

        let c = sc.constructor_id("c").unwrap();
        let x = sc.variable_id("x").unwrap();
        let y = sc.variable_id("y").unwrap();
        match sc.term(sc.constraints[0].left) {
            Term::Call { constructor, args } => {
                assert_eq!(*constructor, c);
                assert_eq!(args.len(), 1);
                assert_eq!(sc.term(args[0]), &Term::Var(x));
            }
            other => panic!("expected call term, got {:?}", other),
        }
        assert_eq!(sc.term(sc.constraints[0].right), &Term::Var(y));
    }

    #[test]
    fn nested_call_has_one_top_level_argument() {
        let sc = SetConstraints::parse(
            "def constructor c1, arity 2, contravariant positions\n\
             def constructor c2, arity 1, contravariant positions\n\
             def constructor c3, arity 0, contravariant positions\n\
             call(c2, call(c1, call(c3), call(c2, call(c3)))) <= out",
        )
        .unwrap();
        let outer = match sc.term(sc.constraints[0].left) {
            Term::Call { constructor, args } => {
                assert_eq!(*constructor, sc.constructor_id("c2").unwrap());
                assert_eq!(args.len(), 1);
                args[0]
            }
            other => panic!("expected call term, got {:?}", other),
        };
        match sc.term(outer) {
            Term::Call { constructor, args } => {
                assert_eq!(*constructor, sc.constructor_id("c1").unwrap());
                assert_eq!(args.len(), 2);
            }
            other => panic!("expected nested call, got {:?}", other),
        }
    }

    #[test]
    fn same_name_resolves_to_same_node() {
        let sc = SetConstraints::parse(
            "def constructor c, arity 1, contravariant positions\n\
             x <= call(c, x)\n\
             x <= proj(c, x, 0)",
        )
        .unwrap();
        assert_eq!(sc.variables.len(), 1);
        let x = sc.variable_id("x").unwrap();
        assert_eq!(sc.term(sc.constraints[0].left), &Term::Var(x));
        match sc.term(sc.constraints[1].right) {
            Term::Proj { var, .. } => assert_eq!(*var, x),
            other => panic!("expected proj term, got {:?}", other),
        }
        // Both back-indices landed on the one shared node.
        assert_eq!(sc.variable(x).projs.len(), 1);
        assert_eq!(sc.constructor(sc.constructor_id("c").unwrap()).calls.len(), 1);
    }

    #[test]
    fn undeclared_constructor_is_a_hard_error() {
        let err = SetConstraints::parse("call(ghost, x) <= y").unwrap_err();
        assert_eq!(
            err,
            Error::UndeclaredConstructor {
                name: "ghost".to_string()
            }
        );
    }

    #[test]
    fn explicit_set_variable_declarations_are_accepted() {
        let sc = SetConstraints::parse(
            "def set variable x\n\
             def set variable y\n\
             x <= y",
        )
        .unwrap();
        assert_eq!(sc.variables.len(), 2);
        assert_eq!(sc.constraints.len(), 1);
        // Carl keeps variables implicit.
        assert_eq!(sc.carl(), "x <= y\n");
    }

    #[test]
    fn reserved_words_are_rejected_as_variables() {
        assert!(SetConstraints::parse("call <= x").is_err());
        assert!(SetConstraints::parse("x <= proj").is_err());
    }

    #[test]
    fn malformed_lines_fail() {
        assert!(SetConstraints::parse("just some words").is_err());
        assert!(SetConstraints::parse("def constructor , arity 1").is_err());
        assert!(
            SetConstraints::parse(
                "def constructor c, arity 1, contravariant positions\ncall(c, ) <= y"
            )
            .is_err()
        );
    }

    #[test]
    fn zero_arity_call_parses() {
        let sc = SetConstraints::parse(
            "def constructor c, arity 0, contravariant positions\ncall(c) <= y",
        )
        .unwrap();
        match sc.term(sc.constraints[0].left) {
            Term::Call { args, .. } => assert!(args.is_empty()),
            other => panic!("expected call term, got {:?}", other),
        }
    }
}
