//! Parse error types.

use std::fmt;
use zmk_layout_ast::{Diagnostic, DiagnosticKind, SourceFile};
use zmk_layout_lexer::{Token, TokenKind};

/// Parse error with source location.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    /// Kind of parse error.
    pub kind: ParseErrorKind,
    /// Human-readable error message.
    pub message: String,
    /// 1-based source line.
    pub line: u32,
    /// 1-based source column.
    pub column: u32,
}

/// Category of parse error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// A specific token was expected but a different one was found.
    UnexpectedToken,
    /// Input ended while a construct was incomplete.
    UnexpectedEof,
    /// Tokens are present but violate the grammar.
    InvalidSyntax,
    /// Node nesting exceeded the fixed depth cap.
    DepthExceeded,
}

fn found_label(token: &Token) -> String {
    match token.kind {
        TokenKind::Identifier | TokenKind::Reference | TokenKind::Number(_) => {
            format!("{} '{}'", token.kind, token.lexeme)
        }
        _ => token.kind.to_string(),
    }
}

impl ParseError {
    /// Create an "expected X, found Y" error at the found token.
    pub fn expected(what: impl fmt::Display, found: &Token) -> Self {
        let kind = if found.kind == TokenKind::Eof {
            ParseErrorKind::UnexpectedEof
        } else {
            ParseErrorKind::UnexpectedToken
        };
        Self {
            kind,
            message: format!("expected {}, found {}", what, found_label(found)),
            line: found.line,
            column: found.column,
        }
    }

    /// Create an "unexpected token" error with surrounding context.
    pub fn unexpected(found: &Token, context: &str) -> Self {
        let kind = if found.kind == TokenKind::Eof {
            ParseErrorKind::UnexpectedEof
        } else {
            ParseErrorKind::UnexpectedToken
        };
        Self {
            kind,
            message: format!("unexpected {} {}", found_label(found), context),
            line: found.line,
            column: found.column,
        }
    }

    /// Create an "invalid syntax" error.
    pub fn invalid_syntax(message: impl Into<String>, line: u32, column: u32) -> Self {
        Self {
            kind: ParseErrorKind::InvalidSyntax,
            message: message.into(),
            line,
            column,
        }
    }

    /// Create a depth-cap error.
    pub fn depth_exceeded(limit: usize, line: u32, column: u32) -> Self {
        Self {
            kind: ParseErrorKind::DepthExceeded,
            message: format!("node nesting exceeds the depth limit of {limit}"),
            line,
            column,
        }
    }

    /// Convert to the shared diagnostic form, attaching a context snippet
    /// when the source file is available.
    pub fn into_diagnostic(self, source: Option<&SourceFile>) -> Diagnostic {
        let diag = Diagnostic::at(DiagnosticKind::Parse, self.message, self.line, self.column);
        match source {
            Some(file) => diag.with_context(file.context_snippet(self.line, self.column)),
            None => diag,
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "parse error at {}:{}: {}",
            self.line, self.column, self.message
        )
    }
}

impl std::error::Error for ParseError {}
