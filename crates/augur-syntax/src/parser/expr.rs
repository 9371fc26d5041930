//! Expression parsing (Pratt)

use crate::ast::*;
use crate::parser::{Parser, Precedence};
use crate::token::TokenKind;

impl Parser {
    /// Parse an expression
    pub(super) fn parse_expression(&mut self) -> Result<Expr, ()> {
        self.parse_precedence(Precedence::Lowest)
    }

    fn parse_precedence(&mut self, min_precedence: Precedence) -> Result<Expr, ()> {
        let mut left = self.parse_prefix()?;

        while precedence_of(self.peek().kind) > min_precedence {
            left = self.parse_infix(left)?;
        }

        Ok(left)
    }

    fn parse_prefix(&mut self) -> Result<Expr, ()> {
        match self.peek().kind {
            TokenKind::Int => {
                let token = self.advance();
                match token.lexeme.parse::<i64>() {
                    Ok(value) => Ok(Expr::Int(value, token.span)),
                    Err(_) => {
                        self.errors.push(crate::error::SyntaxError::new(
                            "Integer literal out of range",
                            token.span.start_line,
                            token.span.start_column,
                        ));
                        Err(())
                    }
                }
            }
            TokenKind::Float => {
                let token = self.advance();
                match token.lexeme.parse::<f64>() {
                    Ok(value) => Ok(Expr::Float(value, token.span)),
                    Err(_) => {
                        self.errors.push(crate::error::SyntaxError::new(
                            "Malformed float literal",
                            token.span.start_line,
                            token.span.start_column,
                        ));
                        Err(())
                    }
                }
            }
            TokenKind::Str => {
                let token = self.advance();
                Ok(Expr::Str(token.lexeme, token.span))
            }
            TokenKind::True => Ok(Expr::Bool(true, self.advance().span)),
            TokenKind::False => Ok(Expr::Bool(false, self.advance().span)),
            TokenKind::NoneKw => Ok(Expr::None(self.advance().span)),
            TokenKind::SelfKw => Ok(Expr::SelfRef(self.advance().span)),
            TokenKind::Super => Ok(Expr::Super(self.advance().span)),
            TokenKind::Ident => {
                let token = self.advance();
                Ok(Expr::Ident(Identifier {
                    name: token.lexeme,
                    span: token.span,
                }))
            }
            TokenKind::Minus => {
                let op_span = self.advance().span;
                let operand = self.parse_precedence(Precedence::Unary)?;
                let span = op_span.merge(operand.span());
                Ok(Expr::Unary {
                    op: UnaryOp::Neg,
                    operand: Box::new(operand),
                    span,
                })
            }
            TokenKind::Not => {
                let op_span = self.advance().span;
                let operand = self.parse_precedence(Precedence::Unary)?;
                let span = op_span.merge(operand.span());
                Ok(Expr::Unary {
                    op: UnaryOp::Not,
                    operand: Box::new(operand),
                    span,
                })
            }
            TokenKind::LeftParen => self.parse_group_or_tuple(),
            TokenKind::LeftBracket => self.parse_array(),
            TokenKind::LeftBrace => self.parse_hash(),
            _ => {
                self.error_at_peek("Expected an expression");
                Err(())
            }
        }
    }

    fn parse_infix(&mut self, left: Expr) -> Result<Expr, ()> {
        match self.peek().kind {
            TokenKind::LeftParen => self.parse_call(left),
            TokenKind::Dot => {
                self.advance();
                let property = self.consume_identifier("a member name")?;
                let span = left.span().merge(property.span);
                Ok(Expr::Member {
                    object: Box::new(left),
                    property,
                    span,
                })
            }
            TokenKind::LeftBracket => {
                self.advance();
                let index = self.parse_expression()?;
                let end = self
                    .consume(TokenKind::RightBracket, "Expected ']' after index")?
                    .span;
                let span = left.span().merge(end);
                Ok(Expr::Index {
                    object: Box::new(left),
                    index: Box::new(index),
                    span,
                })
            }
            kind => {
                let precedence = precedence_of(kind);
                let op = match kind {
                    TokenKind::Plus => BinaryOp::Add,
                    TokenKind::Minus => BinaryOp::Sub,
                    TokenKind::Star => BinaryOp::Mul,
                    TokenKind::Slash => BinaryOp::Div,
                    TokenKind::Percent => BinaryOp::Mod,
                    TokenKind::StarStar => BinaryOp::Pow,
                    TokenKind::EqualEqual => BinaryOp::Eq,
                    TokenKind::BangEqual => BinaryOp::NotEq,
                    TokenKind::Less => BinaryOp::Lt,
                    TokenKind::LessEqual => BinaryOp::LtEq,
                    TokenKind::Greater => BinaryOp::Gt,
                    TokenKind::GreaterEqual => BinaryOp::GtEq,
                    TokenKind::And => BinaryOp::And,
                    TokenKind::Or => BinaryOp::Or,
                    TokenKind::In => BinaryOp::In,
                    _ => {
                        self.error_at_peek("Expected an operator");
                        return Err(());
                    }
                };
                self.advance();
                let right = self.parse_precedence(precedence)?;
                let span = left.span().merge(right.span());
                Ok(Expr::Binary {
                    op,
                    left: Box::new(left),
                    right: Box::new(right),
                    span,
                })
            }
        }
    }

    fn parse_call(&mut self, callee: Expr) -> Result<Expr, ()> {
        self.consume(TokenKind::LeftParen, "Expected '('")?;

        let mut args = Vec::new();
        if !self.check(TokenKind::RightParen) {
            loop {
                args.push(self.parse_expression()?);
                if !self.match_token(TokenKind::Comma) {
                    break;
                }
            }
        }

        let end = self
            .consume(TokenKind::RightParen, "Expected ')' after arguments")?
            .span;
        let span = callee.span().merge(end);
        Ok(Expr::Call {
            callee: Box::new(callee),
            args,
            span,
        })
    }

    fn parse_group_or_tuple(&mut self) -> Result<Expr, ()> {
        let start = self.consume(TokenKind::LeftParen, "Expected '('")?.span;

        // Empty tuple: `()`
        if self.check(TokenKind::RightParen) {
            let end = self.advance().span;
            return Ok(Expr::Tuple(Vec::new(), start.merge(end)));
        }

        let first = self.parse_expression()?;
        if self.match_token(TokenKind::Comma) {
            let mut items = vec![first];
            if !self.check(TokenKind::RightParen) {
                loop {
                    items.push(self.parse_expression()?);
                    if !self.match_token(TokenKind::Comma) {
                        break;
                    }
                }
            }
            let end = self
                .consume(TokenKind::RightParen, "Expected ')' after tuple")?
                .span;
            Ok(Expr::Tuple(items, start.merge(end)))
        } else {
            self.consume(TokenKind::RightParen, "Expected ')' after expression")?;
            Ok(first)
        }
    }

    fn parse_array(&mut self) -> Result<Expr, ()> {
        let start = self.consume(TokenKind::LeftBracket, "Expected '['")?.span;

        let mut items = Vec::new();
        if !self.check(TokenKind::RightBracket) {
            loop {
                items.push(self.parse_expression()?);
                if !self.match_token(TokenKind::Comma) {
                    break;
                }
            }
        }

        let end = self
            .consume(TokenKind::RightBracket, "Expected ']' after array")?
            .span;
        Ok(Expr::Array(items, start.merge(end)))
    }

    fn parse_hash(&mut self) -> Result<Expr, ()> {
        let start = self.consume(TokenKind::LeftBrace, "Expected '{'")?.span;

        let mut pairs = Vec::new();
        if !self.check(TokenKind::RightBrace) {
            loop {
                let key = self.parse_expression()?;
                self.consume(TokenKind::Colon, "Expected ':' after hash key")?;
                let value = self.parse_expression()?;
                pairs.push((key, value));
                if !self.match_token(TokenKind::Comma) {
                    break;
                }
            }
        }

        let end = self
            .consume(TokenKind::RightBrace, "Expected '}' after hash")?
            .span;
        Ok(Expr::Hash(pairs, start.merge(end)))
    }
}

/// Infix precedence of a token; tokens that cannot continue an expression
/// get `Lowest` so the Pratt loop stops on them.
fn precedence_of(kind: TokenKind) -> Precedence {
    match kind {
        TokenKind::Or => Precedence::Or,
        TokenKind::And => Precedence::And,
        TokenKind::EqualEqual | TokenKind::BangEqual => Precedence::Equality,
        TokenKind::Less
        | TokenKind::LessEqual
        | TokenKind::Greater
        | TokenKind::GreaterEqual
        | TokenKind::In => Precedence::Comparison,
        TokenKind::Plus | TokenKind::Minus => Precedence::Term,
        TokenKind::Star | TokenKind::Slash | TokenKind::Percent => Precedence::Factor,
        TokenKind::StarStar => Precedence::Power,
        TokenKind::LeftParen | TokenKind::LeftBracket | TokenKind::Dot => Precedence::Call,
        _ => Precedence::Lowest,
    }
}

#[cfg(test)]
mod tests {
    use crate::ast::*;
    use crate::parse_source;

    fn parse_expr(source: &str) -> Expr {
        let (program, errors) = parse_source(source);
        assert!(errors.is_empty(), "unexpected parse errors: {errors:?}");
        match program.statements.into_iter().next() {
            Some(Stmt::Expr(stmt)) => stmt.expr,
            other => panic!("expected expression statement, got {other:?}"),
        }
    }

    #[test]
    fn test_precedence_mul_over_add() {
        let expr = parse_expr("1 + 2 * 3\n");
        assert_eq!(expr.to_string(), "1 + 2 * 3");
        match expr {
            Expr::Binary { op, right, .. } => {
                assert_eq!(op, BinaryOp::Add);
                assert!(matches!(
                    *right,
                    Expr::Binary {
                        op: BinaryOp::Mul,
                        ..
                    }
                ));
            }
            other => panic!("expected binary expression, got {other:?}"),
        }
    }

    #[test]
    fn test_member_call_chain() {
        let expr = parse_expr("self.items.append(x)\n");
        assert_eq!(expr.to_string(), "self.items.append(x)");
    }

    #[test]
    fn test_and_or_precedence() {
        let expr = parse_expr("a or b and c\n");
        match expr {
            Expr::Binary { op, .. } => assert_eq!(op, BinaryOp::Or),
            other => panic!("expected binary expression, got {other:?}"),
        }
    }

    #[test]
    fn test_array_and_hash_literals() {
        assert_eq!(parse_expr("[1, 2, 3]\n").to_string(), "[1, 2, 3]");
        assert_eq!(
            parse_expr("{\"a\": 1, \"b\": 2}\n").to_string(),
            "{\"a\": 1, \"b\": 2}"
        );
    }

    #[test]
    fn test_tuple_vs_group() {
        assert!(matches!(parse_expr("(1, 2)\n"), Expr::Tuple(..)));
        assert!(matches!(parse_expr("(1)\n"), Expr::Int(1, _)));
    }

    #[test]
    fn test_unary_not() {
        let expr = parse_expr("not done\n");
        assert!(matches!(
            expr,
            Expr::Unary {
                op: UnaryOp::Not,
                ..
            }
        ));
    }
}
