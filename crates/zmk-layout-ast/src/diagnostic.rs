//! Source-tagged diagnostics.
//!
//! Errors in this pipeline are data, not signals: the accumulate-and-
//! continue surfaces return them in vectors, and every diagnostic carries a
//! human-readable message plus an optional source position and context
//! snippet.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Category of a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DiagnosticKind {
    /// Tokenizer failure (unterminated string, invalid escape, ...).
    Lex,
    /// Parser failure (unexpected token, nesting depth, ...).
    Parse,
    /// Extraction failure or per-behavior warning.
    Extract,
    /// Document invariant violation.
    Validate,
    /// Generation failure.
    Generate,
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            DiagnosticKind::Lex => "lex",
            DiagnosticKind::Parse => "parse",
            DiagnosticKind::Extract => "extract",
            DiagnosticKind::Validate => "validate",
            DiagnosticKind::Generate => "generate",
        };
        f.write_str(label)
    }
}

/// A diagnostic with optional source location and context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Diagnostic category.
    pub kind: DiagnosticKind,
    /// Human-readable message.
    pub message: String,
    /// 1-based source line, when the diagnostic is source-tagged.
    pub line: Option<u32>,
    /// 1-based source column, when the diagnostic is source-tagged.
    pub column: Option<u32>,
    /// Short snippet of the offending source with a caret at the column.
    pub context: Option<String>,
}

impl Diagnostic {
    /// Create a diagnostic without a source position.
    pub fn new(kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            line: None,
            column: None,
            context: None,
        }
    }

    /// Create a source-tagged diagnostic.
    pub fn at(kind: DiagnosticKind, message: impl Into<String>, line: u32, column: u32) -> Self {
        Self {
            kind,
            message: message.into(),
            line: Some(line),
            column: Some(column),
            context: None,
        }
    }

    /// Attach a context snippet.
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.line, self.column) {
            (Some(line), Some(column)) => {
                write!(
                    f,
                    "{} error at {}:{}: {}",
                    self.kind, line, column, self.message
                )
            }
            _ => write!(f, "{} error: {}", self.kind, self.message),
        }
    }
}

impl std::error::Error for Diagnostic {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_with_position() {
        let diag = Diagnostic::at(DiagnosticKind::Parse, "expected ';'", 3, 14);
        assert_eq!(diag.to_string(), "parse error at 3:14: expected ';'");
    }

    #[test]
    fn test_display_without_position() {
        let diag = Diagnostic::new(DiagnosticKind::Validate, "layer count mismatch");
        assert_eq!(diag.to_string(), "validate error: layer count mismatch");
    }

    #[test]
    fn test_with_context() {
        let diag = Diagnostic::at(DiagnosticKind::Lex, "unterminated string", 1, 5)
            .with_context("a = \"x\n    ^");
        assert!(diag.context.unwrap().contains('^'));
    }
}
