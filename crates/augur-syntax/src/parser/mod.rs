//! Parsing (tokens to AST)
//!
//! The parser converts a stream of tokens into an Abstract Syntax Tree.
//! Uses Pratt parsing for expressions and recursive descent for statements.
//! Errors are collected rather than thrown; the parser synchronizes at the
//! next statement boundary and keeps going.

mod expr;
mod stmt;

use crate::ast::*;
use crate::error::SyntaxError;
use crate::span::Span;
use crate::token::{Token, TokenKind};

/// Parser state for building an AST from tokens
pub struct Parser {
    pub(super) tokens: Vec<Token>,
    pub(super) current: usize,
    pub(super) errors: Vec<SyntaxError>,
}

/// Operator precedence levels for Pratt parsing
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub(super) enum Precedence {
    Lowest,
    Or,         // or
    And,        // and
    Equality,   // == !=
    Comparison, // < <= > >= in
    Term,       // + -
    Factor,     // * / %
    Power,      // **
    Unary,      // not -
    Call,       // () [] .
}

impl Parser {
    /// Create a new parser for the given tokens
    pub fn new(mut tokens: Vec<Token>) -> Self {
        if tokens.is_empty() {
            tokens.push(Token::new(TokenKind::Eof, "", Span::dummy()));
        }
        Self {
            tokens,
            current: 0,
            errors: Vec::new(),
        }
    }

    /// Parse tokens into an AST
    pub fn parse(&mut self) -> (Program, Vec<SyntaxError>) {
        let mut statements = Vec::new();

        while !self.is_at_end() {
            if self.match_token(TokenKind::Newline) {
                continue;
            }
            if self.check(TokenKind::Indent) || self.check(TokenKind::Dedent) {
                self.error_at_peek("Unexpected indentation");
                self.advance();
                continue;
            }
            match self.parse_statement() {
                Ok(stmt) => statements.push(stmt),
                Err(()) => self.synchronize(),
            }
        }

        (Program { statements }, std::mem::take(&mut self.errors))
    }

    // === Declarations ===

    /// Parse a grimoire declaration, including the optional `arcane` modifier
    pub(super) fn parse_grimoire(&mut self) -> Result<GrimoireDef, ()> {
        let arcane = self.match_token(TokenKind::Arcane);
        let grim_span = self.consume(TokenKind::Grim, "Expected 'grim'")?.span;

        let name = self.consume_identifier("a grimoire name")?;

        let parent = if self.match_token(TokenKind::LeftParen) {
            let parent = self.consume_identifier("a parent grimoire name")?;
            self.consume(TokenKind::RightParen, "Expected ')' after parent name")?;
            Some(parent)
        } else {
            None
        };

        self.consume(TokenKind::Colon, "Expected ':' after grimoire name")?;
        self.consume(TokenKind::Newline, "Expected newline after ':'")?;
        self.consume(TokenKind::Indent, "Expected indented grimoire body")?;

        let mut doc = None;
        let mut init = None;
        let mut methods = Vec::new();
        let mut end_span = grim_span;

        // A leading string literal is the grimoire's docstring
        if self.check(TokenKind::Str) {
            doc = Some(self.advance().lexeme);
            self.end_simple_stmt();
        }

        while !self.check(TokenKind::Dedent) && !self.is_at_end() {
            if self.match_token(TokenKind::Newline) {
                continue;
            }
            match self.peek().kind {
                TokenKind::Init => match self.parse_init_method() {
                    Ok(method) => {
                        end_span = method.span;
                        init = Some(method);
                    }
                    Err(()) => self.synchronize(),
                },
                TokenKind::Spell | TokenKind::ArcaneSpell => match self.parse_spell_def() {
                    Ok(method) => {
                        end_span = method.span;
                        methods.push(method);
                    }
                    Err(()) => self.synchronize(),
                },
                TokenKind::Ignore => {
                    end_span = self.advance().span;
                    self.end_simple_stmt();
                }
                _ => {
                    self.error_at_peek("Expected a spell definition in grimoire body");
                    self.synchronize();
                }
            }
        }
        self.match_token(TokenKind::Dedent);

        Ok(GrimoireDef {
            name,
            parent,
            doc,
            init,
            methods,
            arcane,
            span: grim_span.merge(end_span),
        })
    }

    /// Parse a spell or arcanespell definition
    pub(super) fn parse_spell_def(&mut self) -> Result<SpellDef, ()> {
        let keyword = self.advance(); // spell | arcanespell
        debug_assert!(matches!(
            keyword.kind,
            TokenKind::Spell | TokenKind::ArcaneSpell
        ));

        let name = self.consume_identifier("a spell name")?;
        let params = self.parse_params()?;
        let (doc, body) = self.parse_body()?;

        Ok(SpellDef {
            name,
            params,
            doc,
            span: keyword.span.merge(body.span),
            body,
        })
    }

    /// Parse an `init` constructor; modeled as a spell named `init`
    fn parse_init_method(&mut self) -> Result<SpellDef, ()> {
        let init_token = self.consume(TokenKind::Init, "Expected 'init'")?;
        let name = Identifier {
            name: init_token.lexeme.clone(),
            span: init_token.span,
        };
        let params = self.parse_params()?;
        let (doc, body) = self.parse_body()?;

        Ok(SpellDef {
            name,
            params,
            doc,
            span: init_token.span.merge(body.span),
            body,
        })
    }

    /// Parse a parenthesized parameter list
    fn parse_params(&mut self) -> Result<Vec<Param>, ()> {
        self.consume(TokenKind::LeftParen, "Expected '(' after name")?;

        let mut params = Vec::new();
        if !self.check(TokenKind::RightParen) {
            loop {
                let name = self.consume_identifier("a parameter name")?;
                let mut span = name.span;

                let type_hint = if self.match_token(TokenKind::Colon) {
                    let hint = self.consume_identifier("a type label")?;
                    span = span.merge(hint.span);
                    Some(hint)
                } else {
                    None
                };

                let default = if self.match_token(TokenKind::Equal) {
                    let value = self.parse_expression()?;
                    span = span.merge(value.span());
                    Some(value)
                } else {
                    None
                };

                params.push(Param {
                    name,
                    type_hint,
                    default,
                    span,
                });

                if !self.match_token(TokenKind::Comma) {
                    break;
                }
            }
        }

        self.consume(TokenKind::RightParen, "Expected ')' after parameters")?;
        Ok(params)
    }

    /// Parse a callable body, splitting off a leading docstring
    fn parse_body(&mut self) -> Result<(Option<String>, Block), ()> {
        let mut block = self.parse_block()?;

        let doc = match block.statements.first() {
            Some(Stmt::Expr(ExprStmt {
                expr: Expr::Str(text, _),
                ..
            })) => {
                let text = text.clone();
                block.statements.remove(0);
                Some(text)
            }
            _ => None,
        };

        Ok((doc, block))
    }

    /// Parse an indented statement suite introduced by ':'
    pub(super) fn parse_block(&mut self) -> Result<Block, ()> {
        let colon_span = self.consume(TokenKind::Colon, "Expected ':' before block")?.span;
        self.consume(TokenKind::Newline, "Expected newline after ':'")?;
        self.consume(TokenKind::Indent, "Expected indented block")?;

        let mut statements = Vec::new();
        while !self.check(TokenKind::Dedent) && !self.is_at_end() {
            if self.match_token(TokenKind::Newline) {
                continue;
            }
            match self.parse_statement() {
                Ok(stmt) => statements.push(stmt),
                Err(()) => self.synchronize(),
            }
        }
        self.match_token(TokenKind::Dedent);

        let span = statements
            .iter()
            .fold(colon_span, |acc, stmt| acc.merge(stmt.span()));
        Ok(Block { statements, span })
    }

    // === Token helpers ===

    pub(super) fn peek(&self) -> &Token {
        &self.tokens[self.current.min(self.tokens.len() - 1)]
    }

    pub(super) fn is_at_end(&self) -> bool {
        self.peek().kind == TokenKind::Eof
    }

    pub(super) fn check(&self, kind: TokenKind) -> bool {
        self.peek().kind == kind
    }

    pub(super) fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if !self.is_at_end() {
            self.current += 1;
        }
        token
    }

    pub(super) fn match_token(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub(super) fn consume(&mut self, kind: TokenKind, message: &str) -> Result<Token, ()> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            self.error_at_peek(message);
            Err(())
        }
    }

    /// Consume an identifier-like token (identifiers and the `self`/`super`
    /// keywords are all valid names in parameter and member position)
    pub(super) fn consume_identifier(&mut self, what: &str) -> Result<Identifier, ()> {
        match self.peek().kind {
            TokenKind::Ident | TokenKind::SelfKw | TokenKind::Super | TokenKind::Init => {
                let token = self.advance();
                Ok(Identifier {
                    name: token.lexeme,
                    span: token.span,
                })
            }
            _ => {
                self.error_at_peek(&format!("Expected {what}"));
                Err(())
            }
        }
    }

    /// Require the end of a simple statement: a newline, or a block/file end
    pub(super) fn end_simple_stmt(&mut self) {
        if self.match_token(TokenKind::Newline)
            || self.check(TokenKind::Dedent)
            || self.is_at_end()
        {
            return;
        }
        self.error_at_peek("Expected newline after statement");
        self.synchronize();
    }

    pub(super) fn error_at_peek(&mut self, message: &str) {
        let span = self.peek().span;
        let message = if self.is_at_end() {
            format!("{message}, found end of file")
        } else if self.peek().kind == TokenKind::Newline {
            format!("{message}, found end of line")
        } else {
            format!("{message}, found '{}'", self.peek().lexeme)
        };
        self.errors
            .push(SyntaxError::new(message, span.start_line, span.start_column));
    }

    /// Skip to the next statement boundary after an error
    pub(super) fn synchronize(&mut self) {
        while !self.is_at_end() {
            if self.check(TokenKind::Dedent) {
                return;
            }
            if self.advance().kind == TokenKind::Newline {
                return;
            }
        }
    }
}
