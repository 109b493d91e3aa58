// Allow unwrap in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]

//! Lexical analysis for ZMK keymap devicetree source.
//!
//! Hand-written scanner producing position-tagged tokens. Unlike a
//! conventional lexer, comments and preprocessor lines are emitted as
//! tokens: the parser attaches comments to the following node or property
//! and records preprocessor lines without evaluating them.
//!
//! # `#` disambiguation
//!
//! Devicetree property names may begin with `#` (`#binding-cells`), while
//! `#define`/`#include`/... introduce preprocessor lines. A `#` starts a
//! [`TokenKind::Preprocessor`] token only when the following word is a
//! known directive; any other `#word` lexes as an identifier.
//!
//! # Termination
//!
//! Every scanner branch consumes at least one character before returning,
//! including the error paths, so both [`lex`] and [`lex_safe`] are linear
//! in the input length.

mod error;
mod token;

pub use error::LexError;
pub use token::{Token, TokenKind};

use zmk_layout_ast::SourceFile;

/// Preprocessor directive words recognized after `#`.
const DIRECTIVES: &[&str] = &[
    "define", "undef", "include", "if", "ifdef", "ifndef", "elif", "else", "endif", "error",
    "warning", "pragma",
];

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_ident_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-'
}

/// Tokenize source, failing on the first lexical error.
pub fn lex(source: &str) -> Result<Vec<Token>, LexError> {
    let mut lexer = Lexer::new(source);
    let mut tokens = Vec::new();
    loop {
        match lexer.next_token()? {
            Some(token) => tokens.push(token),
            None => break,
        }
    }
    tokens.push(lexer.eof_token());
    Ok(tokens)
}

/// Tokenize source, accumulating errors and continuing.
///
/// On an error the offending input has already been consumed, so the scan
/// always makes progress. The returned token stream is still terminated by
/// [`TokenKind::Eof`].
pub fn lex_safe(source: &str) -> (Vec<Token>, Vec<LexError>) {
    let mut lexer = Lexer::new(source);
    let mut tokens = Vec::new();
    let mut errors = Vec::new();
    loop {
        match lexer.next_token() {
            Ok(Some(token)) => tokens.push(token),
            Ok(None) => break,
            Err(err) => errors.push(err),
        }
    }
    tokens.push(lexer.eof_token());
    (tokens, errors)
}

/// Character scanner with incremental position tracking.
struct Lexer {
    chars: Vec<char>,
    pos: usize,
    line: u32,
    column: u32,
    file: SourceFile,
}

impl Lexer {
    fn new(source: &str) -> Self {
        Self {
            chars: source.chars().collect(),
            pos: 0,
            line: 1,
            column: 1,
            file: SourceFile::new(source),
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.chars.get(self.pos).copied()?;
        self.pos += 1;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn error(&self, message: impl Into<String>, line: u32, column: u32) -> LexError {
        LexError::new(message, line, column).with_context(self.file.context_snippet(line, column))
    }

    fn eof_token(&self) -> Token {
        Token::new(TokenKind::Eof, "", self.line, self.column)
    }

    /// Scan the next token, or `None` at end of input.
    fn next_token(&mut self) -> Result<Option<Token>, LexError> {
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.bump();
        }

        let (line, column) = (self.line, self.column);
        let c = match self.bump() {
            Some(c) => c,
            None => return Ok(None),
        };

        let token = match c {
            '{' => Token::new(TokenKind::LBrace, "{", line, column),
            '}' => Token::new(TokenKind::RBrace, "}", line, column),
            ';' => Token::new(TokenKind::Semicolon, ";", line, column),
            '=' => Token::new(TokenKind::Equals, "=", line, column),
            ',' => Token::new(TokenKind::Comma, ",", line, column),
            '<' => Token::new(TokenKind::AngleOpen, "<", line, column),
            '>' => Token::new(TokenKind::AngleClose, ">", line, column),
            '(' => Token::new(TokenKind::LParen, "(", line, column),
            ')' => Token::new(TokenKind::RParen, ")", line, column),
            ':' => Token::new(TokenKind::Colon, ":", line, column),
            '@' => Token::new(TokenKind::At, "@", line, column),
            '/' => match self.peek() {
                Some('/') => {
                    self.bump();
                    self.lex_line_comment(line, column)
                }
                Some('*') => {
                    self.bump();
                    self.lex_block_comment(line, column)?
                }
                _ => Token::new(TokenKind::Slash, "/", line, column),
            },
            '"' => self.lex_string(line, column)?,
            '&' => self.lex_reference(line, column)?,
            '#' => self.lex_hash(line, column)?,
            '-' if matches!(self.peek(), Some(d) if d.is_ascii_digit()) => {
                self.lex_number(c, line, column)?
            }
            c if c.is_ascii_digit() => self.lex_number(c, line, column)?,
            c if is_ident_start(c) => self.lex_identifier(c, line, column),
            other => {
                return Err(self.error(format!("unexpected character '{other}'"), line, column));
            }
        };
        Ok(Some(token))
    }

    fn lex_line_comment(&mut self, line: u32, column: u32) -> Token {
        let mut text = String::new();
        while matches!(self.peek(), Some(c) if c != '\n') {
            text.push(self.bump().expect("peeked"));
        }
        Token::new(TokenKind::LineComment, text.trim(), line, column)
    }

    fn lex_block_comment(&mut self, line: u32, column: u32) -> Result<Token, LexError> {
        let mut text = String::new();
        loop {
            match self.bump() {
                None => {
                    return Err(self.error("unterminated block comment", line, column));
                }
                Some('*') if self.peek() == Some('/') => {
                    self.bump();
                    break;
                }
                Some(c) => text.push(c),
            }
        }
        Ok(Token::new(TokenKind::BlockComment, text.trim(), line, column))
    }

    fn lex_string(&mut self, line: u32, column: u32) -> Result<Token, LexError> {
        let mut value = String::new();
        loop {
            match self.bump() {
                None | Some('\n') => {
                    return Err(self.error("unterminated string literal", line, column));
                }
                Some('"') => break,
                Some('\\') => {
                    let (esc_line, esc_col) = (self.line, self.column);
                    value.push(self.lex_escape(esc_line, esc_col)?);
                }
                Some(c) => value.push(c),
            }
        }
        Ok(Token::new(TokenKind::String, value, line, column))
    }

    /// Process one escape sequence after a consumed backslash.
    fn lex_escape(&mut self, line: u32, column: u32) -> Result<char, LexError> {
        let c = self
            .bump()
            .ok_or_else(|| self.error("unterminated string literal", line, column))?;
        match c {
            'n' => Ok('\n'),
            't' => Ok('\t'),
            'r' => Ok('\r'),
            '0' => Ok('\0'),
            '\\' => Ok('\\'),
            '"' => Ok('"'),
            '\'' => Ok('\''),
            'x' => {
                let mut digits = String::new();
                while digits.len() < 2
                    && matches!(self.peek(), Some(d) if d.is_ascii_hexdigit())
                {
                    digits.push(self.bump().expect("peeked"));
                }
                if digits.is_empty() {
                    return Err(self.error("invalid escape sequence '\\x'", line, column));
                }
                let code = u32::from_str_radix(&digits, 16).expect("hex digits");
                char::from_u32(code)
                    .ok_or_else(|| self.error("invalid escape sequence '\\x'", line, column))
            }
            d if d.is_digit(8) => {
                let mut digits = String::new();
                digits.push(d);
                while digits.len() < 3 && matches!(self.peek(), Some(o) if o.is_digit(8)) {
                    digits.push(self.bump().expect("peeked"));
                }
                let code = u32::from_str_radix(&digits, 8).expect("octal digits");
                char::from_u32(code)
                    .ok_or_else(|| self.error("invalid octal escape sequence", line, column))
            }
            other => Err(self.error(format!("invalid escape sequence '\\{other}'"), line, column)),
        }
    }

    fn lex_reference(&mut self, line: u32, column: u32) -> Result<Token, LexError> {
        if !matches!(self.peek(), Some(c) if is_ident_start(c)) {
            return Err(self.error("expected identifier after '&'", line, column));
        }
        let mut name = String::new();
        while matches!(self.peek(), Some(c) if is_ident_continue(c)) {
            name.push(self.bump().expect("peeked"));
        }
        Ok(Token::new(TokenKind::Reference, name, line, column))
    }

    /// Lex the token after a consumed `#`: a preprocessor line when the
    /// following word is a directive, a `#`-prefixed identifier otherwise.
    fn lex_hash(&mut self, line: u32, column: u32) -> Result<Token, LexError> {
        let mut word = String::new();
        while matches!(self.peek(), Some(c) if is_ident_continue(c)) {
            word.push(self.bump().expect("peeked"));
        }
        if word.is_empty() {
            return Err(self.error("expected directive or identifier after '#'", line, column));
        }
        if DIRECTIVES.contains(&word.as_str()) {
            let mut rest = String::new();
            while matches!(self.peek(), Some(c) if c != '\n') {
                rest.push(self.bump().expect("peeked"));
            }
            let lexeme = format!("#{word}{rest}");
            Ok(Token::new(
                TokenKind::Preprocessor,
                lexeme.trim_end(),
                line,
                column,
            ))
        } else {
            Ok(Token::new(
                TokenKind::Identifier,
                format!("#{word}"),
                line,
                column,
            ))
        }
    }

    fn lex_number(&mut self, first: char, line: u32, column: u32) -> Result<Token, LexError> {
        let mut raw = String::new();
        raw.push(first);
        if first == '-' {
            raw.push(self.bump().expect("caller checked digit"));
        }

        let is_hex = (raw == "0" || raw == "-0") && matches!(self.peek(), Some('x' | 'X'));
        if is_hex {
            raw.push(self.bump().expect("peeked"));
            while matches!(self.peek(), Some(c) if c.is_ascii_hexdigit()) {
                raw.push(self.bump().expect("peeked"));
            }
        } else {
            while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
                raw.push(self.bump().expect("peeked"));
            }
        }

        let value = if is_hex {
            let negative = raw.starts_with('-');
            let digits = raw.trim_start_matches('-').trim_start_matches("0x");
            let digits = digits.trim_start_matches("0X");
            i64::from_str_radix(digits, 16)
                .map(|v| if negative { -v } else { v })
                .map_err(|_| self.error(format!("invalid integer literal '{raw}'"), line, column))?
        } else {
            raw.parse::<i64>()
                .map_err(|_| self.error(format!("invalid integer literal '{raw}'"), line, column))?
        };

        Ok(Token::new(TokenKind::Number(value), raw, line, column))
    }

    fn lex_identifier(&mut self, first: char, line: u32, column: u32) -> Token {
        let mut name = String::new();
        name.push(first);
        while matches!(self.peek(), Some(c) if is_ident_continue(c)) {
            name.push(self.bump().expect("peeked"));
        }
        Token::new(TokenKind::Identifier, name, line, column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Test helper: lex and panic on error.
    fn lex_ok(source: &str) -> Vec<Token> {
        lex(source).expect("lexing should succeed")
    }

    /// Test helper: kinds without the trailing Eof.
    fn kinds(source: &str) -> Vec<TokenKind> {
        let mut tokens = lex_ok(source);
        assert_eq!(tokens.pop().map(|t| t.kind), Some(TokenKind::Eof));
        tokens.into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_punctuation() {
        assert_eq!(
            kinds("{ } ; = , < > ( ) : @ /"),
            vec![
                TokenKind::LBrace,
                TokenKind::RBrace,
                TokenKind::Semicolon,
                TokenKind::Equals,
                TokenKind::Comma,
                TokenKind::AngleOpen,
                TokenKind::AngleClose,
                TokenKind::LParen,
                TokenKind::RParen,
                TokenKind::Colon,
                TokenKind::At,
                TokenKind::Slash,
            ]
        );
    }

    #[test]
    fn test_identifiers_allow_hyphens() {
        let tokens = lex_ok("tapping-term-ms flavor _x");
        assert_eq!(tokens[0].lexeme, "tapping-term-ms");
        assert_eq!(tokens[1].lexeme, "flavor");
        assert_eq!(tokens[2].lexeme, "_x");
    }

    #[test]
    fn test_reference_strips_ampersand() {
        let tokens = lex_ok("&kp &mt");
        assert_eq!(tokens[0].kind, TokenKind::Reference);
        assert_eq!(tokens[0].lexeme, "kp");
        assert_eq!(tokens[1].lexeme, "mt");
    }

    #[test]
    fn test_numbers() {
        let tokens = lex_ok("200 0x1F -5 0");
        assert_eq!(tokens[0].kind, TokenKind::Number(200));
        assert_eq!(tokens[1].kind, TokenKind::Number(31));
        assert_eq!(tokens[2].kind, TokenKind::Number(-5));
        assert_eq!(tokens[3].kind, TokenKind::Number(0));
    }

    #[test]
    fn test_string_escapes() {
        let tokens = lex_ok(r#""a\nb\t\"c\\" "\x41" "\101""#);
        assert_eq!(tokens[0].kind, TokenKind::String);
        assert_eq!(tokens[0].lexeme, "a\nb\t\"c\\");
        assert_eq!(tokens[1].lexeme, "A");
        assert_eq!(tokens[2].lexeme, "A");
    }

    #[test]
    fn test_comments_are_tokens() {
        let tokens = lex_ok("a // trailing\n/* block */ b");
        assert_eq!(tokens[1].kind, TokenKind::LineComment);
        assert_eq!(tokens[1].lexeme, "trailing");
        assert_eq!(tokens[2].kind, TokenKind::BlockComment);
        assert_eq!(tokens[2].lexeme, "block");
        assert_eq!(tokens[3].lexeme, "b");
    }

    #[test]
    fn test_preprocessor_line_captured_verbatim() {
        let tokens = lex_ok("#define BASE 0\n#include <behaviors.dtsi>");
        assert_eq!(tokens[0].kind, TokenKind::Preprocessor);
        assert_eq!(tokens[0].lexeme, "#define BASE 0");
        assert_eq!(tokens[1].kind, TokenKind::Preprocessor);
        assert_eq!(tokens[1].lexeme, "#include <behaviors.dtsi>");
    }

    #[test]
    fn test_hash_property_name_is_identifier() {
        let tokens = lex_ok("#binding-cells = <2>;");
        assert_eq!(tokens[0].kind, TokenKind::Identifier);
        assert_eq!(tokens[0].lexeme, "#binding-cells");
        assert_eq!(tokens[1].kind, TokenKind::Equals);
    }

    #[test]
    fn test_positions_are_one_based() {
        let tokens = lex_ok("a b\n  c");
        assert_eq!((tokens[0].line, tokens[0].column), (1, 1));
        assert_eq!((tokens[1].line, tokens[1].column), (1, 3));
        assert_eq!((tokens[2].line, tokens[2].column), (2, 3));
        for token in &tokens {
            assert!(token.line >= 1 && token.column >= 1);
        }
    }

    #[test]
    fn test_empty_input_is_just_eof() {
        let tokens = lex_ok("");
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].kind, TokenKind::Eof);
    }

    #[test]
    fn test_unterminated_block_comment_single_error() {
        let (tokens, errors) = lex_safe("a /* never closed");
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("unterminated block comment"));
        assert_eq!(tokens.first().map(|t| t.lexeme.as_str()), Some("a"));
    }

    #[test]
    fn test_unterminated_string() {
        let err = lex("x = \"abc").unwrap_err();
        assert!(err.message.contains("unterminated string"));
        assert_eq!((err.line, err.column), (1, 5));
        assert!(err.context.as_deref().unwrap_or("").contains('^'));
    }

    #[test]
    fn test_invalid_escape() {
        let err = lex(r#""\q""#).unwrap_err();
        assert!(err.message.contains("invalid escape"));
    }

    #[test]
    fn test_lex_safe_recovers_past_bad_character() {
        let (tokens, errors) = lex_safe("a $ b");
        assert_eq!(errors.len(), 1);
        let idents: Vec<&str> = tokens
            .iter()
            .filter(|t| t.kind == TokenKind::Identifier)
            .map(|t| t.lexeme.as_str())
            .collect();
        assert_eq!(idents, vec!["a", "b"]);
    }

    #[test]
    fn test_keymap_fragment() {
        let source = r#"default_layer { bindings = <&kp A &mt LCTRL ESC>; };"#;
        let tokens = lex_ok(source);
        let kinds: Vec<&TokenKind> = tokens.iter().map(|t| &t.kind).collect();
        assert!(kinds.contains(&&TokenKind::Reference));
        assert!(kinds.contains(&&TokenKind::AngleOpen));
        assert_eq!(tokens.last().map(|t| t.kind.clone()), Some(TokenKind::Eof));
    }
}
