//! Token stream wrapper for the hand-written parser.

use crate::error::ParseError;
use zmk_layout_lexer::{Token, TokenKind};

/// Token stream with lookahead and error-recovery synchronization.
///
/// The stream is always terminated by an [`TokenKind::Eof`] token, so
/// `peek` never runs off the end. The cursor is strictly monotonic: every
/// consuming method advances it by at least one position.
pub struct TokenStream {
    tokens: Vec<Token>,
    pos: usize,
}

impl TokenStream {
    /// Create a stream, appending an EOF sentinel if the input lacks one.
    pub fn new(tokens: &[Token]) -> Self {
        let mut tokens = tokens.to_vec();
        match tokens.last() {
            Some(t) if t.kind == TokenKind::Eof => {}
            Some(t) => {
                let (line, column) = (t.line, t.column);
                tokens.push(Token::new(TokenKind::Eof, "", line, column));
            }
            None => tokens.push(Token::new(TokenKind::Eof, "", 1, 1)),
        }
        Self { tokens, pos: 0 }
    }

    /// Peek at the current token without consuming it.
    pub fn peek(&self) -> &Token {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    /// Peek at the nth token ahead without consuming.
    pub fn peek_nth(&self, n: usize) -> &Token {
        &self.tokens[(self.pos + n).min(self.tokens.len() - 1)]
    }

    /// Consume and return the current token.
    ///
    /// At EOF the sentinel is returned without advancing further.
    pub fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        token
    }

    /// Whether the current token matches the expected kind (payloads
    /// ignored).
    pub fn check(&self, expected: &TokenKind) -> bool {
        std::mem::discriminant(&self.peek().kind) == std::mem::discriminant(expected)
    }

    /// Consume a token of the expected kind or fail.
    pub fn expect(&mut self, expected: TokenKind) -> Result<Token, ParseError> {
        if self.check(&expected) {
            Ok(self.advance())
        } else {
            Err(ParseError::expected(expected, self.peek()))
        }
    }

    /// Whether the stream is exhausted.
    pub fn at_end(&self) -> bool {
        self.peek().kind == TokenKind::Eof
    }

    /// Current cursor position (for progress assertions).
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Synchronize after an error: consume the offending token, then skip
    /// to just past the next `;` or up to the next `}` or EOF.
    ///
    /// Always consumes at least one token unless already at EOF, so
    /// recovery makes progress.
    pub fn synchronize(&mut self) {
        if self.at_end() {
            return;
        }
        let first = self.advance();
        if matches!(first.kind, TokenKind::Semicolon | TokenKind::RBrace) {
            return;
        }
        loop {
            match self.peek().kind {
                TokenKind::Semicolon => {
                    self.advance();
                    return;
                }
                TokenKind::RBrace | TokenKind::Eof => return,
                _ => {
                    self.advance();
                }
            }
        }
    }
}
