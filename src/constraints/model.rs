//! Set-constraint graph: nodes, back-indices, and the canonical "carl" form

use std::collections::BTreeSet;

/// Index of a set variable in its owning [`SetConstraints`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VarId(pub usize);

/// Index of a constructor in its owning [`SetConstraints`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CtorId(pub usize);

/// Index of a term in its owning [`SetConstraints`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TermId(pub usize);

/// A set variable, created lazily on first textual mention
#[derive(Debug, Clone)]
pub struct SetVariable {
    /// The variable name; name equality is the sole identity criterion
    pub name: String,
    /// Back-index: every `Proj` term whose `var` is this variable
    pub projs: Vec<TermId>,
}

/// A declared constructor: a named, fixed-arity term-building symbol
#[derive(Debug, Clone)]
pub struct Constructor {
    /// The constructor name
    pub name: String,
    /// Declared argument count
    pub arity: usize,
    /// Zero-based argument positions with contravariant variance
    pub contravariant_positions: Vec<usize>,
    /// Back-index: every `Call` term built with this constructor
    pub calls: Vec<TermId>,
}

impl Constructor {
    /// The declaration line for this constructor
    pub fn decl(&self) -> String {
        let positions: Vec<String> = self
            .contravariant_positions
            .iter()
            .map(|p| p.to_string())
            .collect();
        format!(
            "def constructor {}, arity {}, contravariant positions {}",
            self.name,
            self.arity,
            positions.join(" ")
        )
        .trim_end()
        .to_string()
    }
}

/// A term of the constraint algebra
///
/// Argument counts and projection indices are not validated against the
/// constructor's declared arity; that is an analysis-time precondition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Term {
    /// A set-variable mention
    Var(VarId),
    /// A constructed value `call(c, args...)`
    Call {
        /// The constructor being applied
        constructor: CtorId,
        /// Argument terms, in textual order
        args: Vec<TermId>,
    },
    /// A projection `proj(c, v, i)` extracting argument position `i` of
    /// calls to `c` flowing into `v`
    Proj {
        /// The constructor projected through
        constructor: CtorId,
        /// The set variable projected from
        var: VarId,
        /// The projected argument position
        index: usize,
    },
}

/// An inclusion constraint `left <= right`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Constraint {
    /// The smaller side
    pub left: TermId,
    /// The larger side
    pub right: TermId,
}

/// The owning registry of a parsed constraint system
///
/// Holds every constructor, set variable, term, and constraint; all
/// cross-references are indices into these lists.
#[derive(Debug, Default)]
pub struct SetConstraints {
    /// Constructors, in declaration order
    pub constructors: Vec<Constructor>,
    /// Set variables, in order of first mention
    pub variables: Vec<SetVariable>,
    /// Constraints, in textual order; duplicates are retained
    pub constraints: Vec<Constraint>,
    terms: Vec<Term>,
}

impl SetConstraints {
    /// Creates an empty constraint system
    pub fn new() -> Self {
        SetConstraints::default()
    }

    /// Looks up a constructor id by name
    pub fn constructor_id(&self, name: &str) -> Option<CtorId> {
        self.constructors
            .iter()
            .position(|c| c.name == name)
            .map(CtorId)
    }

    /// The constructor behind `id`
    pub fn constructor(&self, id: CtorId) -> &Constructor {
        &self.constructors[id.0]
    }

    /// Looks up a set-variable id by name
    pub fn variable_id(&self, name: &str) -> Option<VarId> {
        self.variables
            .iter()
            .position(|v| v.name == name)
            .map(VarId)
    }

    /// The set variable behind `id`
    pub fn variable(&self, id: VarId) -> &SetVariable {
        &self.variables[id.0]
    }

    /// The term behind `id`
    pub fn term(&self, id: TermId) -> &Term {
        &self.terms[id.0]
    }

    /// Declares a constructor
    pub fn declare_constructor(
        &mut self,
        name: impl Into<String>,
        arity: usize,
        contravariant_positions: Vec<usize>,
    ) -> CtorId {
        let id = CtorId(self.constructors.len());
        self.constructors.push(Constructor {
            name: name.into(),
            arity,
            contravariant_positions,
            calls: Vec::new(),
        });
        id
    }

    /// Get-or-create a set variable by name
    ///
    /// The first mention of a name allocates the node; every later mention
    /// resolves to the same id. This is what makes two textual occurrences of
    /// a name the same node.
    pub fn intern_variable(&mut self, name: &str) -> VarId {
        if let Some(id) = self.variable_id(name) {
            return id;
        }
        let id = VarId(self.variables.len());
        self.variables.push(SetVariable {
            name: name.to_string(),
            projs: Vec::new(),
        });
        id
    }

    /// Adds a variable-mention term
    pub fn var_term(&mut self, var: VarId) -> TermId {
        self.push_term(Term::Var(var))
    }

    /// Adds a `call` term and records it in the constructor's back-index
    pub fn call_term(&mut self, constructor: CtorId, args: Vec<TermId>) -> TermId {
        let id = self.push_term(Term::Call { constructor, args });
        self.constructors[constructor.0].calls.push(id);
        id
    }

    /// Adds a `proj` term and records it in the variable's back-index
    pub fn proj_term(&mut self, constructor: CtorId, var: VarId, index: usize) -> TermId {
        let id = self.push_term(Term::Proj {
            constructor,
            var,
            index,
        });
        self.variables[var.0].projs.push(id);
        id
    }

    /// Appends a constraint `left <= right`
    pub fn add_constraint(&mut self, left: TermId, right: TermId) {
        self.constraints.push(Constraint { left, right });
    }

    fn push_term(&mut self, term: Term) -> TermId {
        let id = TermId(self.terms.len());
        self.terms.push(term);
        id
    }

    /// Renders one term in source syntax
    pub fn render_term(&self, id: TermId) -> String {
        match self.term(id) {
            Term::Var(var) => self.variable(*var).name.clone(),
            Term::Call { constructor, args } => {
                if args.is_empty() {
                    format!("call({})", self.constructor(*constructor).name)
                } else {
                    let rendered: Vec<String> =
                        args.iter().map(|arg| self.render_term(*arg)).collect();
                    format!(
                        "call({}, {})",
                        self.constructor(*constructor).name,
                        rendered.join(", ")
                    )
                }
            }
            Term::Proj {
                constructor,
                var,
                index,
            } => format!(
                "proj({}, {}, {})",
                self.constructor(*constructor).name,
                self.variable(*var).name,
                index
            ),
        }
    }

    /// Renders one constraint in source syntax
    pub fn render_constraint(&self, constraint: &Constraint) -> String {
        format!(
            "{} <= {}",
            self.render_term(constraint.left),
            self.render_term(constraint.right)
        )
    }

    /// Canonical "carl" rendering of the system
    ///
    /// Constructor declarations sorted lexicographically, then the
    /// constraints as a sorted, de-duplicated set of their string forms. Set
    /// variables are implicit from use and never declared here. The result is
    /// a normalized equivalent of the input, not a byte-for-byte round trip.
    pub fn carl(&self) -> String {
        let mut decls: Vec<String> = self.constructors.iter().map(|c| c.decl()).collect();
        decls.sort();

        let rendered: BTreeSet<String> = self
            .constraints
            .iter()
            .map(|c| self.render_constraint(c))
            .collect();

        let mut out = String::new();
        for decl in decls {
            out.push_str(&decl);
            out.push('\n');
        }
        for line in rendered {
            out.push_str(&line);
            out.push('\n');
        }
        out
    }
}
