//! Lexer error type.

use std::fmt;
use zmk_layout_ast::{Diagnostic, DiagnosticKind};

/// Tokenizer failure with source position and context.
#[derive(Debug, Clone, PartialEq)]
pub struct LexError {
    /// Human-readable message.
    pub message: String,
    /// 1-based source line.
    pub line: u32,
    /// 1-based source column.
    pub column: u32,
    /// Snippet of the offending line with a caret at the column.
    pub context: Option<String>,
}

impl LexError {
    /// Create a new lex error.
    pub fn new(message: impl Into<String>, line: u32, column: u32) -> Self {
        Self {
            message: message.into(),
            line,
            column,
            context: None,
        }
    }

    /// Attach a context snippet.
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Convert to the shared diagnostic form.
    pub fn into_diagnostic(self) -> Diagnostic {
        let mut diag = Diagnostic::at(DiagnosticKind::Lex, self.message, self.line, self.column);
        diag.context = self.context;
        diag
    }
}

impl fmt::Display for LexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "lex error at {}:{}: {}",
            self.line, self.column, self.message
        )
    }
}

impl std::error::Error for LexError {}
