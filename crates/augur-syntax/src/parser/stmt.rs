//! Statement parsing

use crate::ast::*;
use crate::parser::Parser;
use crate::token::TokenKind;

impl Parser {
    /// Parse a statement
    pub(super) fn parse_statement(&mut self) -> Result<Stmt, ()> {
        match self.peek().kind {
            TokenKind::Grim | TokenKind::Arcane => Ok(Stmt::Grimoire(self.parse_grimoire()?)),
            TokenKind::Spell => Ok(Stmt::Spell(self.parse_spell_def()?)),
            TokenKind::If => self.parse_if_stmt(),
            TokenKind::For => self.parse_for_stmt(),
            TokenKind::While => self.parse_while_stmt(),
            TokenKind::Match => self.parse_match_stmt(),
            TokenKind::Attempt => self.parse_attempt_stmt(),
            TokenKind::Return => self.parse_return_stmt(),
            TokenKind::Raise => self.parse_raise_stmt(),
            TokenKind::Import => self.parse_import_stmt(),
            TokenKind::Check => self.parse_check_stmt(),
            TokenKind::Skip => {
                let span = self.advance().span;
                self.end_simple_stmt();
                Ok(Stmt::Skip(span))
            }
            TokenKind::Stop => {
                let span = self.advance().span;
                self.end_simple_stmt();
                Ok(Stmt::Stop(span))
            }
            TokenKind::Ignore => {
                let span = self.advance().span;
                self.end_simple_stmt();
                Ok(Stmt::Ignore(span))
            }
            _ => self.parse_assign_or_expr_stmt(),
        }
    }

    /// Parse an if statement with `otherwise` chains and an optional `else`
    fn parse_if_stmt(&mut self) -> Result<Stmt, ()> {
        let if_span = self.consume(TokenKind::If, "Expected 'if'")?.span;
        let condition = self.parse_expression()?;
        let consequence = self.parse_block()?;
        let mut span = if_span.merge(consequence.span);

        let mut otherwise = Vec::new();
        while self.check(TokenKind::Otherwise) {
            let branch_span = self.advance().span;
            let branch_condition = self.parse_expression()?;
            let body = self.parse_block()?;
            span = span.merge(body.span);
            otherwise.push(OtherwiseBranch {
                condition: branch_condition,
                span: branch_span.merge(body.span),
                body,
            });
        }

        let alternative = if self.match_token(TokenKind::Else) {
            let body = self.parse_block()?;
            span = span.merge(body.span);
            Some(body)
        } else {
            None
        };

        Ok(Stmt::If(IfStmt {
            condition,
            consequence,
            otherwise,
            alternative,
            span,
        }))
    }

    /// Parse a for loop, including tuple-unpacking targets
    fn parse_for_stmt(&mut self) -> Result<Stmt, ()> {
        let for_span = self.consume(TokenKind::For, "Expected 'for'")?.span;

        let first = self.consume_identifier("a loop variable")?;
        let target = if self.check(TokenKind::Comma) {
            let mut names = vec![first];
            while self.match_token(TokenKind::Comma) {
                names.push(self.consume_identifier("a loop variable")?);
            }
            ForTarget::Tuple(names)
        } else {
            ForTarget::Name(first)
        };

        self.consume(TokenKind::In, "Expected 'in' after loop variable")?;
        let iterable = self.parse_expression()?;
        let body = self.parse_block()?;
        let mut span = for_span.merge(body.span);

        let alternative = if self.match_token(TokenKind::Else) {
            let else_body = self.parse_block()?;
            span = span.merge(else_body.span);
            Some(else_body)
        } else {
            None
        };

        Ok(Stmt::For(ForStmt {
            target,
            iterable,
            body,
            alternative,
            span,
        }))
    }

    fn parse_while_stmt(&mut self) -> Result<Stmt, ()> {
        let while_span = self.consume(TokenKind::While, "Expected 'while'")?.span;
        let condition = self.parse_expression()?;
        let body = self.parse_block()?;

        Ok(Stmt::While(WhileStmt {
            condition,
            span: while_span.merge(body.span),
            body,
        }))
    }

    /// Parse a match statement with its indented case arms
    fn parse_match_stmt(&mut self) -> Result<Stmt, ()> {
        let match_span = self.consume(TokenKind::Match, "Expected 'match'")?.span;
        let subject = self.parse_expression()?;

        self.consume(TokenKind::Colon, "Expected ':' after match subject")?;
        self.consume(TokenKind::Newline, "Expected newline after ':'")?;
        self.consume(TokenKind::Indent, "Expected indented case block")?;

        let mut arms = Vec::new();
        let mut span = match_span;
        while !self.check(TokenKind::Dedent) && !self.is_at_end() {
            if self.match_token(TokenKind::Newline) {
                continue;
            }
            match self.parse_case_arm() {
                Ok(arm) => {
                    span = span.merge(arm.span);
                    arms.push(arm);
                }
                Err(()) => self.synchronize(),
            }
        }
        self.match_token(TokenKind::Dedent);

        Ok(Stmt::Match(MatchStmt {
            subject,
            arms,
            span,
        }))
    }

    fn parse_case_arm(&mut self) -> Result<CaseArm, ()> {
        let case_span = self.consume(TokenKind::Case, "Expected 'case'")?.span;

        // `_` is the default arm
        let pattern = if self.check(TokenKind::Ident) && self.peek().lexeme == "_" {
            self.advance();
            None
        } else {
            Some(self.parse_expression()?)
        };

        let body = self.parse_block()?;
        Ok(CaseArm {
            pattern,
            span: case_span.merge(body.span),
            body,
        })
    }

    /// Parse attempt/ensnare/resolve exception handling
    fn parse_attempt_stmt(&mut self) -> Result<Stmt, ()> {
        let attempt_span = self.consume(TokenKind::Attempt, "Expected 'attempt'")?.span;
        let body = self.parse_block()?;
        let mut span = attempt_span.merge(body.span);

        let mut ensnares = Vec::new();
        while self.check(TokenKind::Ensnare) {
            let clause_span = self.advance().span;

            let error = if self.check(TokenKind::Ident) {
                Some(self.consume_identifier("an error name")?)
            } else {
                None
            };
            let alias = if self.match_token(TokenKind::As) {
                Some(self.consume_identifier("a binding name")?)
            } else {
                None
            };

            let clause_body = self.parse_block()?;
            span = span.merge(clause_body.span);
            ensnares.push(EnsnareClause {
                error,
                alias,
                span: clause_span.merge(clause_body.span),
                body: clause_body,
            });
        }

        let resolve = if self.match_token(TokenKind::Resolve) {
            let resolve_body = self.parse_block()?;
            span = span.merge(resolve_body.span);
            Some(resolve_body)
        } else {
            None
        };

        Ok(Stmt::Attempt(AttemptStmt {
            body,
            ensnares,
            resolve,
            span,
        }))
    }

    fn parse_return_stmt(&mut self) -> Result<Stmt, ()> {
        let return_span = self.consume(TokenKind::Return, "Expected 'return'")?.span;

        let value = if self.check(TokenKind::Newline)
            || self.check(TokenKind::Dedent)
            || self.is_at_end()
        {
            None
        } else {
            Some(self.parse_expression()?)
        };

        let span = value
            .as_ref()
            .map_or(return_span, |v| return_span.merge(v.span()));
        self.end_simple_stmt();
        Ok(Stmt::Return(ReturnStmt { value, span }))
    }

    fn parse_raise_stmt(&mut self) -> Result<Stmt, ()> {
        let raise_span = self.consume(TokenKind::Raise, "Expected 'raise'")?.span;
        let value = self.parse_expression()?;
        let span = raise_span.merge(value.span());
        self.end_simple_stmt();
        Ok(Stmt::Raise(RaiseStmt { value, span }))
    }

    /// Parse `import path [as alias]`; the path is a string literal or
    /// dotted identifiers
    fn parse_import_stmt(&mut self) -> Result<Stmt, ()> {
        let import_span = self.consume(TokenKind::Import, "Expected 'import'")?.span;

        let mut span = import_span;
        let path = if self.check(TokenKind::Str) {
            let token = self.advance();
            span = span.merge(token.span);
            token.lexeme
        } else {
            let first = self.consume_identifier("a module name")?;
            span = span.merge(first.span);
            let mut path = first.name;
            while self.match_token(TokenKind::Dot) {
                let part = self.consume_identifier("a module name")?;
                span = span.merge(part.span);
                path.push('.');
                path.push_str(&part.name);
            }
            path
        };

        let alias = if self.match_token(TokenKind::As) {
            let alias = self.consume_identifier("an import alias")?;
            span = span.merge(alias.span);
            Some(alias)
        } else {
            None
        };

        self.end_simple_stmt();
        Ok(Stmt::Import(ImportStmt { path, alias, span }))
    }

    fn parse_check_stmt(&mut self) -> Result<Stmt, ()> {
        let check_span = self.consume(TokenKind::Check, "Expected 'check'")?.span;
        let condition = self.parse_expression()?;
        let mut span = check_span.merge(condition.span());

        let message = if self.match_token(TokenKind::Comma) {
            let message = self.parse_expression()?;
            span = span.merge(message.span());
            Some(message)
        } else {
            None
        };

        self.end_simple_stmt();
        Ok(Stmt::Check(CheckStmt {
            condition,
            message,
            span,
        }))
    }

    /// Parse an assignment (plain, typed, member, index, or compound) or an
    /// expression statement
    fn parse_assign_or_expr_stmt(&mut self) -> Result<Stmt, ()> {
        let expr = self.parse_expression()?;
        let expr_span = expr.span();

        // Typed declaration: `name: hint = value`
        if self.check(TokenKind::Colon) {
            if let Expr::Ident(name) = expr {
                self.advance();
                let type_hint = self.consume_identifier("a type label")?;
                self.consume(TokenKind::Equal, "Expected '=' after type label")?;
                let value = self.parse_expression()?;
                let span = expr_span.merge(value.span());
                self.end_simple_stmt();
                return Ok(Stmt::Assign(AssignStmt {
                    target: AssignTarget::Name(name),
                    type_hint: Some(type_hint),
                    value,
                    span,
                }));
            }
            self.error_at_peek("Unexpected ':'");
            return Err(());
        }

        match self.peek().kind {
            TokenKind::Equal => {
                self.advance();
                let target = self.expr_to_assign_target(expr)?;
                let value = self.parse_expression()?;
                let span = expr_span.merge(value.span());
                self.end_simple_stmt();
                Ok(Stmt::Assign(AssignStmt {
                    target,
                    type_hint: None,
                    value,
                    span,
                }))
            }

            // Compound assignment desugars to `target = target op value`
            TokenKind::PlusEqual
            | TokenKind::MinusEqual
            | TokenKind::StarEqual
            | TokenKind::SlashEqual => {
                let op = match self.advance().kind {
                    TokenKind::PlusEqual => BinaryOp::Add,
                    TokenKind::MinusEqual => BinaryOp::Sub,
                    TokenKind::StarEqual => BinaryOp::Mul,
                    _ => BinaryOp::Div,
                };
                let target = self.expr_to_assign_target(expr.clone())?;
                let rhs = self.parse_expression()?;
                let span = expr_span.merge(rhs.span());
                self.end_simple_stmt();
                Ok(Stmt::Assign(AssignStmt {
                    target,
                    type_hint: None,
                    value: Expr::Binary {
                        op,
                        left: Box::new(expr),
                        right: Box::new(rhs),
                        span,
                    },
                    span,
                }))
            }

            _ => {
                self.end_simple_stmt();
                Ok(Stmt::Expr(ExprStmt {
                    expr,
                    span: expr_span,
                }))
            }
        }
    }

    /// Reinterpret an expression as an assignment target
    fn expr_to_assign_target(&mut self, expr: Expr) -> Result<AssignTarget, ()> {
        match expr {
            Expr::Ident(name) => Ok(AssignTarget::Name(name)),
            Expr::Member {
                object,
                property,
                span,
            } => Ok(AssignTarget::Member {
                object: *object,
                property,
                span,
            }),
            Expr::Index {
                object,
                index,
                span,
            } => Ok(AssignTarget::Index {
                object: *object,
                index: *index,
                span,
            }),
            other => {
                let span = other.span();
                self.errors.push(crate::error::SyntaxError::new(
                    "Invalid assignment target",
                    span.start_line,
                    span.start_column,
                ));
                Err(())
            }
        }
    }
}
