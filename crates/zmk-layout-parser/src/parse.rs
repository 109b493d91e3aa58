//! Recursive descent parsing of the devicetree grammar.
//!
//! The parser consumes the lexer's token stream and builds the
//! [`DtNode`] forest. Two surfaces are exposed: [`parse`] fails on the
//! first error, [`parse_safe`] accumulates errors and synchronizes at
//! `;`, `}` or EOF, always returning a (possibly partial) tree.
//!
//! Comments immediately preceding a node or property (within five source
//! lines, with only comments or preprocessor lines between) attach to that
//! item; a trailing same-line comment attaches to its property.
//! Preprocessor lines are recorded on the enclosing node without being
//! evaluated; file-scope directives ride on the next root node.

use crate::error::ParseError;
use crate::stream::TokenStream;
use zmk_layout_ast::{DtComment, DtConditional, DtNode, DtProperty, DtValue};
use zmk_layout_lexer::{Token, TokenKind};

/// Maximum node nesting depth.
pub const MAX_NESTING_DEPTH: usize = 256;

/// How many source lines above an item a comment may sit and still attach.
const COMMENT_ATTACH_WINDOW: u32 = 5;

/// Parse a token stream into root nodes, failing on the first error.
pub fn parse(tokens: &[Token]) -> Result<Vec<DtNode>, ParseError> {
    let mut parser = Parser::new(tokens, true);
    parser.parse_roots()
}

/// Parse a token stream into root nodes, accumulating errors.
///
/// Always returns the nodes that could be assembled alongside every error
/// encountered. Recovery synchronizes past the next `;` (or up to `}` /
/// EOF) and always makes progress.
pub fn parse_safe(tokens: &[Token]) -> (Vec<DtNode>, Vec<ParseError>) {
    let mut parser = Parser::new(tokens, false);
    let roots = parser.parse_roots().unwrap_or_default();
    (roots, parser.errors)
}

struct Parser {
    stream: TokenStream,
    errors: Vec<ParseError>,
    fail_fast: bool,
}

impl Parser {
    fn new(tokens: &[Token], fail_fast: bool) -> Self {
        Self {
            stream: TokenStream::new(tokens),
            errors: Vec::new(),
            fail_fast,
        }
    }

    /// Record an error and synchronize, or propagate it in fail-fast mode.
    fn recover(&mut self, error: ParseError) -> Result<(), ParseError> {
        if self.fail_fast {
            return Err(error);
        }
        self.errors.push(error);
        self.stream.synchronize();
        Ok(())
    }

    fn parse_roots(&mut self) -> Result<Vec<DtNode>, ParseError> {
        let mut roots: Vec<DtNode> = Vec::new();
        let mut pending_comments: Vec<DtComment> = Vec::new();
        let mut pending_conditionals: Vec<DtConditional> = Vec::new();

        while !self.stream.at_end() {
            let token = self.stream.peek().clone();
            match token.kind {
                TokenKind::LineComment | TokenKind::BlockComment => {
                    self.stream.advance();
                    pending_comments.push(comment_from(&token));
                }
                TokenKind::Preprocessor => {
                    self.stream.advance();
                    pending_conditionals.push(conditional_from(&token));
                }
                TokenKind::Identifier
                    if matches!(
                        self.stream.peek_nth(1).kind,
                        TokenKind::Equals | TokenKind::Semicolon
                    ) =>
                {
                    // legal at top level but has no owning node; parse and drop
                    match self.parse_property() {
                        Ok(mut property) => {
                            property.comments =
                                take_attachable(&mut pending_comments, property.line);
                            self.attach_trailing_comment(&mut property);
                        }
                        Err(error) => self.recover(error)?,
                    }
                }
                TokenKind::Identifier | TokenKind::Slash | TokenKind::Reference => {
                    match self.parse_node(0) {
                        Ok(mut node) => {
                            if !pending_conditionals.is_empty() {
                                let mut lifted = std::mem::take(&mut pending_conditionals);
                                lifted.append(&mut node.conditionals);
                                node.conditionals = lifted;
                            }
                            node.comments = take_attachable(&mut pending_comments, node.line);
                            roots.push(node);
                        }
                        Err(error) => self.recover(error)?,
                    }
                }
                _ => {
                    let error = ParseError::unexpected(&token, "at top level");
                    self.recover(error)?;
                }
            }
        }

        // Trailing file-scope directives have no following node; keep them
        // on the last root so define collection still sees them.
        if let Some(last) = roots.last_mut() {
            last.conditionals.append(&mut pending_conditionals);
        }
        Ok(roots)
    }

    fn parse_node(&mut self, depth: usize) -> Result<DtNode, ParseError> {
        if depth >= MAX_NESTING_DEPTH {
            let token = self.stream.peek();
            return Err(ParseError::depth_exceeded(
                MAX_NESTING_DEPTH,
                token.line,
                token.column,
            ));
        }

        let mut label = None;
        if self.stream.check(&TokenKind::Identifier)
            && self.stream.peek_nth(1).kind == TokenKind::Colon
        {
            label = Some(self.stream.advance().lexeme);
            self.stream.advance();
        }

        let name_token = self.stream.advance();
        let name = match name_token.kind {
            TokenKind::Identifier => name_token.lexeme.clone(),
            TokenKind::Slash => "/".to_string(),
            // `&label { ... };` override syntax keeps the reference marker
            TokenKind::Reference => format!("&{}", name_token.lexeme),
            _ => return Err(ParseError::expected("node name", &name_token)),
        };

        let mut node = DtNode::new(name, name_token.line, name_token.column);
        node.label = label;

        if self.stream.check(&TokenKind::At) {
            self.stream.advance();
            let unit = self.stream.advance();
            match unit.kind {
                TokenKind::Identifier | TokenKind::Number(_) => {
                    node.unit_address = Some(unit.lexeme);
                }
                _ => return Err(ParseError::expected("unit address", &unit)),
            }
        }

        self.stream.expect(TokenKind::LBrace)?;
        self.parse_node_body(&mut node, depth)?;
        self.stream.expect(TokenKind::RBrace)?;
        self.stream.expect(TokenKind::Semicolon)?;
        Ok(node)
    }

    fn parse_node_body(&mut self, node: &mut DtNode, depth: usize) -> Result<(), ParseError> {
        let mut pending_comments: Vec<DtComment> = Vec::new();
        loop {
            let token = self.stream.peek().clone();
            match token.kind {
                TokenKind::RBrace => break,
                TokenKind::Eof => {
                    return Err(ParseError::expected("'}'", &token));
                }
                TokenKind::LineComment | TokenKind::BlockComment => {
                    self.stream.advance();
                    pending_comments.push(comment_from(&token));
                }
                TokenKind::Preprocessor => {
                    self.stream.advance();
                    node.conditionals.push(conditional_from(&token));
                }
                TokenKind::Identifier
                    if matches!(
                        self.stream.peek_nth(1).kind,
                        TokenKind::Equals | TokenKind::Semicolon
                    ) =>
                {
                    match self.parse_property() {
                        Ok(mut property) => {
                            property.comments =
                                take_attachable(&mut pending_comments, property.line);
                            self.attach_trailing_comment(&mut property);
                            node.properties.push(property);
                        }
                        Err(error) => self.recover(error)?,
                    }
                }
                TokenKind::Identifier | TokenKind::Reference | TokenKind::Slash => {
                    match self.parse_node(depth + 1) {
                        Ok(mut child) => {
                            child.comments = take_attachable(&mut pending_comments, child.line);
                            node.children.push(child);
                        }
                        Err(error) => self.recover(error)?,
                    }
                }
                _ => {
                    let error = ParseError::unexpected(&token, "in node body");
                    self.recover(error)?;
                }
            }
        }
        Ok(())
    }

    /// Attach a `// ...` comment sitting on the same line as the property.
    fn attach_trailing_comment(&mut self, property: &mut DtProperty) {
        let token = self.stream.peek().clone();
        if token.kind == TokenKind::LineComment && token.line == property.line {
            self.stream.advance();
            property.comments.push(comment_from(&token));
        }
    }

    fn parse_property(&mut self) -> Result<DtProperty, ParseError> {
        let name_token = self.stream.advance();
        let mut property = DtProperty::new(
            name_token.lexeme,
            None,
            name_token.line,
            name_token.column,
        );

        if self.stream.check(&TokenKind::Semicolon) {
            self.stream.advance();
            return Ok(property);
        }

        self.stream.expect(TokenKind::Equals)?;
        let mut values = vec![self.parse_value()?];
        while self.stream.check(&TokenKind::Comma) {
            self.stream.advance();
            values.push(self.parse_value()?);
        }
        property.value = Some(if values.len() == 1 {
            values.into_iter().next().expect("one value")
        } else {
            DtValue::Array(values)
        });
        self.stream.expect(TokenKind::Semicolon)?;
        Ok(property)
    }

    fn parse_value(&mut self) -> Result<DtValue, ParseError> {
        let token = self.stream.peek().clone();
        match token.kind {
            TokenKind::String => {
                self.stream.advance();
                Ok(DtValue::String(token.lexeme))
            }
            TokenKind::Number(value) => {
                self.stream.advance();
                Ok(DtValue::Integer(value))
            }
            TokenKind::Reference => {
                self.stream.advance();
                Ok(DtValue::Reference(token.lexeme))
            }
            TokenKind::AngleOpen => self.parse_array(),
            TokenKind::Identifier => self.parse_identifier_value(),
            _ => Err(ParseError::expected("property value", &token)),
        }
    }

    fn parse_array(&mut self) -> Result<DtValue, ParseError> {
        self.stream.expect(TokenKind::AngleOpen)?;
        let mut items = Vec::new();
        loop {
            let token = self.stream.peek().clone();
            match token.kind {
                TokenKind::AngleClose => {
                    self.stream.advance();
                    break;
                }
                TokenKind::Eof => return Err(ParseError::expected("'>'", &token)),
                TokenKind::Number(value) => {
                    self.stream.advance();
                    items.push(DtValue::Integer(value));
                }
                TokenKind::Reference => {
                    self.stream.advance();
                    items.push(DtValue::Reference(token.lexeme));
                }
                TokenKind::Identifier => items.push(self.parse_identifier_value()?),
                _ => return Err(ParseError::unexpected(&token, "in array value")),
            }
        }
        Ok(DtValue::Array(items))
    }

    /// Parse a bare identifier cell or a call such as `LC(LS(TAB))`.
    fn parse_identifier_value(&mut self) -> Result<DtValue, ParseError> {
        let name_token = self.stream.advance();
        if !self.stream.check(&TokenKind::LParen) {
            return Ok(DtValue::Raw(name_token.lexeme));
        }
        self.stream.advance();
        let mut args = Vec::new();
        loop {
            let token = self.stream.peek().clone();
            match token.kind {
                TokenKind::RParen => {
                    self.stream.advance();
                    break;
                }
                TokenKind::Comma => {
                    self.stream.advance();
                }
                TokenKind::Eof => return Err(ParseError::expected("')'", &token)),
                TokenKind::Number(value) => {
                    self.stream.advance();
                    args.push(DtValue::Integer(value));
                }
                TokenKind::Reference => {
                    self.stream.advance();
                    args.push(DtValue::Reference(token.lexeme));
                }
                TokenKind::String => {
                    self.stream.advance();
                    args.push(DtValue::String(token.lexeme));
                }
                TokenKind::Identifier => args.push(self.parse_identifier_value()?),
                _ => return Err(ParseError::unexpected(&token, "in argument list")),
            }
        }
        Ok(DtValue::FunctionCall {
            name: name_token.lexeme,
            args,
        })
    }
}

fn comment_from(token: &Token) -> DtComment {
    DtComment {
        text: token.lexeme.clone(),
        is_block: token.kind == TokenKind::BlockComment,
        line: token.line,
        column: token.column,
    }
}

fn conditional_from(token: &Token) -> DtConditional {
    let text = token.lexeme.trim_start_matches('#');
    let (directive, condition) = match text.split_once(char::is_whitespace) {
        Some((directive, rest)) => (directive.to_string(), rest.trim().to_string()),
        None => (text.to_string(), String::new()),
    };
    DtConditional {
        directive,
        condition,
        line: token.line,
        column: token.column,
    }
}

/// Take the pending comments close enough to the item to attach; pending
/// comments outside the window are dropped.
fn take_attachable(pending: &mut Vec<DtComment>, item_line: u32) -> Vec<DtComment> {
    let attached = pending
        .iter()
        .filter(|c| item_line.saturating_sub(c.line) <= COMMENT_ATTACH_WINDOW)
        .cloned()
        .collect();
    pending.clear();
    attached
}
