use regex::Regex;

use crate::error::{snippet, Error, Result};

/// Consumable view over the source text
///
/// `consume` removes and returns a matching prefix, then skips any whitespace
/// that follows it; the `lookahead` forms peek without consuming. Patterns
/// handed to the cursor must be anchored at the start (`^...`) so a match can
/// only ever cover a prefix of the remaining input.
#[derive(Debug, Clone)]
pub struct Cursor<'a> {
    rest: &'a str,
}

impl<'a> Cursor<'a> {
    /// Creates a cursor over `source`, with surrounding whitespace stripped
    pub fn new(source: &'a str) -> Self {
        Cursor {
            rest: source.trim(),
        }
    }

    /// True when the entire input has been consumed
    pub fn at_end(&self) -> bool {
        self.rest.is_empty()
    }

    /// The unconsumed remainder of the input
    pub fn rest(&self) -> &'a str {
        self.rest
    }

    /// Remove and return the prefix matching `pattern`, skipping trailing whitespace
    pub fn consume(&mut self, pattern: &Regex) -> Result<&'a str> {
        match pattern.find(self.rest) {
            Some(m) if m.start() == 0 => {
                let token = m.as_str();
                self.rest = self.rest[m.end()..].trim_start();
                Ok(token)
            }
            _ => Err(self.mismatch(pattern.as_str())),
        }
    }

    /// Remove the exact prefix `literal`, skipping trailing whitespace
    pub fn consume_str(&mut self, literal: &str) -> Result<()> {
        match self.rest.strip_prefix(literal) {
            Some(stripped) => {
                self.rest = stripped.trim_start();
                Ok(())
            }
            None => Err(self.mismatch(literal)),
        }
    }

    /// Peek the prefix matching `pattern` without consuming it
    pub fn peek_match(&self, pattern: &Regex) -> Option<&'a str> {
        pattern
            .find(self.rest)
            .filter(|m| m.start() == 0)
            .map(|m| m.as_str())
    }

    /// True if the remaining input starts with `prefix`
    pub fn lookahead(&self, prefix: &str) -> bool {
        self.rest.starts_with(prefix)
    }

    /// True if the remaining input starts with a match of `pattern`
    pub fn lookahead_re(&self, pattern: &Regex) -> bool {
        pattern.find(self.rest).is_some_and(|m| m.start() == 0)
    }

    /// Advance past `bytes` bytes of already-inspected input
    ///
    /// Used by callers that matched via `peek_match` and need to keep part of
    /// the match in the stream (type tokens push back a trailing delimiter).
    pub fn advance(&mut self, bytes: usize) {
        self.rest = &self.rest[bytes..];
    }

    /// Skip leading whitespace
    pub fn skip_whitespace(&mut self) {
        self.rest = self.rest.trim_start();
    }

    /// Build a grammar mismatch at the current position
    pub fn mismatch(&self, expected: &str) -> Error {
        Error::GrammarMismatch {
            expected: expected.to_string(),
            near: snippet(self.rest),
        }
    }
}
