//! Error types for the cflow front end

use thiserror::Error;

/// Front-end errors raised while parsing IR text or set-constraint text,
/// or while resolving a program point against a parsed program.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    // Grammar errors
    /// The cursor could not match an expected pattern at the current position
    ///
    /// **Triggered by:** any token of the grammar missing from the input
    /// **Example:** `function f( -> int` (missing `)`)
    #[error("Syntax error: failed to consume '{expected}' near '{near}'")]
    GrammarMismatch {
        /// The pattern or literal that failed to match
        expected: String,
        /// A short excerpt of the remaining input
        near: String,
    },

    /// Unparsed text remained after the last top-level declaration
    #[error("Trailing input after program near '{near}'")]
    TrailingInput {
        /// A short excerpt of the leftover input
        near: String,
    },

    // Opcode errors
    /// A `$`-prefixed mnemonic that is not a known instruction
    #[error("Unknown instruction '{opcode}'")]
    UnknownInstruction {
        /// The unrecognized opcode
        opcode: String,
    },

    /// An arithmetic or comparison mnemonic that is not a known operation
    #[error("Unknown operation '{mnemonic}'")]
    UnknownOperation {
        /// The unrecognized mnemonic
        mnemonic: String,
    },

    // Symbol resolution errors
    /// A constraint referenced a constructor that was never declared
    #[error("Undeclared constructor '{name}'")]
    UndeclaredConstructor {
        /// The unresolved constructor name
        name: String,
    },

    /// A terminator referenced a label with no matching block
    #[error("Terminator references unknown label '{label}' in function '{function}'")]
    UnresolvedLabel {
        /// The enclosing function
        function: String,
        /// The label that could not be resolved
        label: String,
    },

    /// A program point string was not `<function>.<block>.<index>`
    #[error("Program point '{point}' is malformed")]
    MalformedProgramPoint {
        /// The offending program point
        point: String,
    },

    /// A program point named a function that does not exist
    #[error("Program point '{point}' has invalid function name '{name}'")]
    UnknownFunction {
        /// The offending program point
        point: String,
        /// The function component
        name: String,
    },

    /// A program point named a block that does not exist
    #[error("Program point '{point}' has invalid block label '{label}'")]
    UnknownBlock {
        /// The offending program point
        point: String,
        /// The block-label component
        label: String,
    },

    /// A program point indexed past the end of a block
    #[error("Program point '{point}' has invalid instruction index {index}")]
    InstructionIndexOutOfRange {
        /// The offending program point
        point: String,
        /// The out-of-range index
        index: usize,
    },

    // Structural invariant violations
    /// A function has no block labeled `entry`
    #[error("Function '{function}' has no entry block")]
    MissingEntryBlock {
        /// The function missing its entry
        function: String,
    },

    /// A block did not end in a `ret`, `jump`, or `branch`
    #[error("Block '{block}' does not end in a terminator")]
    MissingTerminator {
        /// The qualified block name
        block: String,
    },

    /// Two blocks in the same function share a label
    #[error("Duplicate block label '{label}' in function '{function}'")]
    DuplicateLabel {
        /// The enclosing function
        function: String,
        /// The repeated label
        label: String,
    },

    /// Two top-level declarations share a name
    #[error("Duplicate {kind} name '{name}'")]
    DuplicateDefinition {
        /// What was redefined ("struct" or "function")
        kind: &'static str,
        /// The repeated name
        name: String,
    },
}

/// Coarse classification of front-end failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// An expected pattern did not match the remaining input
    Grammar,
    /// A recognized instruction opening followed by an unknown mnemonic
    UnknownOpcode,
    /// A name or index lookup failed
    UnresolvedSymbol,
    /// A structural invariant of the graph was violated
    StructuralInvariant,
}

impl Error {
    /// Build a grammar mismatch from the failed pattern and the remaining input
    pub fn grammar(expected: impl Into<String>, remaining: &str) -> Self {
        Error::GrammarMismatch {
            expected: expected.into(),
            near: snippet(remaining),
        }
    }

    /// Classify this error into the front end's failure taxonomy
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::GrammarMismatch { .. } | Error::TrailingInput { .. } => ErrorKind::Grammar,

            Error::UnknownInstruction { .. } | Error::UnknownOperation { .. } => {
                ErrorKind::UnknownOpcode
            }

            Error::UndeclaredConstructor { .. }
            | Error::UnresolvedLabel { .. }
            | Error::MalformedProgramPoint { .. }
            | Error::UnknownFunction { .. }
            | Error::UnknownBlock { .. }
            | Error::InstructionIndexOutOfRange { .. } => ErrorKind::UnresolvedSymbol,

            Error::MissingEntryBlock { .. }
            | Error::MissingTerminator { .. }
            | Error::DuplicateLabel { .. }
            | Error::DuplicateDefinition { .. } => ErrorKind::StructuralInvariant,
        }
    }
}

/// Clip the remaining input to a short single-line excerpt for diagnostics
pub(crate) fn snippet(text: &str) -> String {
    if text.is_empty() {
        return "<end of input>".to_string();
    }
    let clipped: String = text.chars().take(40).collect();
    let clipped = clipped.replace('\n', "\\n");
    if text.chars().count() > 40 {
        format!("{}...", clipped)
    } else {
        clipped
    }
}

/// Result type for cflow operations
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grammar_mismatch_reports_pattern_and_excerpt() {
        let err = Error::grammar(r"\}", "garbage that does not close");
        assert_eq!(err.kind(), ErrorKind::Grammar);
        let msg = err.to_string();
        assert!(msg.contains(r"\}"));
        assert!(msg.contains("garbage"));
    }

    #[test]
    fn snippet_clips_and_escapes() {
        assert_eq!(snippet(""), "<end of input>");
        assert_eq!(snippet("a\nb"), "a\\nb");
        let long = "x".repeat(80);
        assert!(snippet(&long).ends_with("..."));
    }

    #[test]
    fn classification_covers_taxonomy() {
        let unknown = Error::UnknownInstruction {
            opcode: "frob".to_string(),
        };
        assert_eq!(unknown.kind(), ErrorKind::UnknownOpcode);

        let unresolved = Error::UnknownBlock {
            point: "f.missing.0".to_string(),
            label: "missing".to_string(),
        };
        assert_eq!(unresolved.kind(), ErrorKind::UnresolvedSymbol);

        let structural = Error::MissingEntryBlock {
            function: "f".to_string(),
        };
        assert_eq!(structural.kind(), ErrorKind::StructuralInvariant);
    }
}
