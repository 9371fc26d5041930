//! Lexical analysis (tokenization)
//!
//! The lexer converts Augur source code into a stream of tokens with span
//! information. Blocks are indentation-delimited: at the start of every
//! logical line the lexer measures leading whitespace against an indent
//! stack and emits `Indent`/`Dedent` tokens, Python-style. Layout is
//! suppressed inside brackets so call arguments and literals may wrap.

mod literals;

use crate::error::SyntaxError;
use crate::span::Span;
use crate::token::{keyword_kind, Token, TokenKind};

/// Tab stops every 8 columns when measuring indentation
const TAB_WIDTH: u32 = 8;

/// Lexer state for tokenizing source code
pub struct Lexer {
    /// Characters of source code
    chars: Vec<char>,
    /// Current position in chars
    current: usize,
    /// Current line number (1-indexed)
    line: u32,
    /// Current column number (1-indexed)
    column: u32,
    /// Start line of current token
    start_line: u32,
    /// Start column of current token
    start_column: u32,
    /// Stack of active indentation widths; the outermost level is 0
    indents: Vec<u32>,
    /// Open bracket depth; layout tokens are suppressed when > 0
    bracket_depth: u32,
    /// Whether the next character begins a logical line
    at_line_start: bool,
    /// Collected errors
    errors: Vec<SyntaxError>,
}

impl Lexer {
    /// Create a new lexer for the given source code
    pub fn new(source: impl AsRef<str>) -> Self {
        Self {
            chars: source.as_ref().chars().collect(),
            current: 0,
            line: 1,
            column: 1,
            start_line: 1,
            start_column: 1,
            indents: vec![0],
            bracket_depth: 0,
            at_line_start: true,
            errors: Vec::new(),
        }
    }

    /// Tokenize the source code, returning tokens and any errors
    pub fn tokenize(&mut self) -> (Vec<Token>, Vec<SyntaxError>) {
        let mut tokens = Vec::new();

        loop {
            if self.at_line_start && self.bracket_depth == 0 {
                self.handle_line_start(&mut tokens);
            }
            self.skip_spaces_and_comments();

            self.start_line = self.line;
            self.start_column = self.column;

            if self.is_at_end() {
                break;
            }

            let c = self.advance();
            match c {
                '\n' => {
                    if self.bracket_depth == 0 {
                        tokens.push(self.make_token(TokenKind::Newline, "\n"));
                        self.at_line_start = true;
                    }
                }
                '(' => {
                    self.bracket_depth += 1;
                    tokens.push(self.make_token(TokenKind::LeftParen, "("));
                }
                ')' => {
                    self.bracket_depth = self.bracket_depth.saturating_sub(1);
                    tokens.push(self.make_token(TokenKind::RightParen, ")"));
                }
                '[' => {
                    self.bracket_depth += 1;
                    tokens.push(self.make_token(TokenKind::LeftBracket, "["));
                }
                ']' => {
                    self.bracket_depth = self.bracket_depth.saturating_sub(1);
                    tokens.push(self.make_token(TokenKind::RightBracket, "]"));
                }
                '{' => {
                    self.bracket_depth += 1;
                    tokens.push(self.make_token(TokenKind::LeftBrace, "{"));
                }
                '}' => {
                    self.bracket_depth = self.bracket_depth.saturating_sub(1);
                    tokens.push(self.make_token(TokenKind::RightBrace, "}"));
                }
                ',' => tokens.push(self.make_token(TokenKind::Comma, ",")),
                ':' => tokens.push(self.make_token(TokenKind::Colon, ":")),
                '.' => tokens.push(self.make_token(TokenKind::Dot, ".")),
                '%' => tokens.push(self.make_token(TokenKind::Percent, "%")),
                '+' => {
                    let token = if self.match_char('=') {
                        self.make_token(TokenKind::PlusEqual, "+=")
                    } else {
                        self.make_token(TokenKind::Plus, "+")
                    };
                    tokens.push(token);
                }
                '-' => {
                    let token = if self.match_char('=') {
                        self.make_token(TokenKind::MinusEqual, "-=")
                    } else if self.match_char('>') {
                        self.make_token(TokenKind::Arrow, "->")
                    } else {
                        self.make_token(TokenKind::Minus, "-")
                    };
                    tokens.push(token);
                }
                '*' => {
                    let token = if self.match_char('=') {
                        self.make_token(TokenKind::StarEqual, "*=")
                    } else if self.match_char('*') {
                        self.make_token(TokenKind::StarStar, "**")
                    } else {
                        self.make_token(TokenKind::Star, "*")
                    };
                    tokens.push(token);
                }
                '/' => {
                    let token = if self.match_char('=') {
                        self.make_token(TokenKind::SlashEqual, "/=")
                    } else {
                        self.make_token(TokenKind::Slash, "/")
                    };
                    tokens.push(token);
                }
                '=' => {
                    let token = if self.match_char('=') {
                        self.make_token(TokenKind::EqualEqual, "==")
                    } else {
                        self.make_token(TokenKind::Equal, "=")
                    };
                    tokens.push(token);
                }
                '!' => {
                    if self.match_char('=') {
                        tokens.push(self.make_token(TokenKind::BangEqual, "!="));
                    } else {
                        self.error("Unexpected character '!'");
                    }
                }
                '<' => {
                    let token = if self.match_char('=') {
                        self.make_token(TokenKind::LessEqual, "<=")
                    } else {
                        self.make_token(TokenKind::Less, "<")
                    };
                    tokens.push(token);
                }
                '>' => {
                    let token = if self.match_char('=') {
                        self.make_token(TokenKind::GreaterEqual, ">=")
                    } else {
                        self.make_token(TokenKind::Greater, ">")
                    };
                    tokens.push(token);
                }
                '"' | '\'' => {
                    if let Some(token) = self.scan_string(c) {
                        tokens.push(token);
                    }
                }
                c if c.is_ascii_digit() => tokens.push(self.scan_number(c)),
                c if c.is_alphabetic() || c == '_' => tokens.push(self.scan_identifier(c)),
                c => self.error(format!("Unexpected character '{c}'")),
            }
        }

        // Close the final logical line and any open blocks
        match tokens.last().map(|t| t.kind) {
            None | Some(TokenKind::Newline) | Some(TokenKind::Dedent) => {}
            _ => tokens.push(self.make_token(TokenKind::Newline, "")),
        }
        while self.indents.len() > 1 {
            self.indents.pop();
            tokens.push(self.make_token(TokenKind::Dedent, ""));
        }
        tokens.push(self.make_token(TokenKind::Eof, ""));

        (tokens, std::mem::take(&mut self.errors))
    }

    /// Measure the indentation of the next non-blank line and emit
    /// `Indent`/`Dedent` tokens against the indent stack.
    fn handle_line_start(&mut self, tokens: &mut Vec<Token>) {
        loop {
            let mut width: u32 = 0;
            loop {
                match self.peek() {
                    Some(' ') => {
                        width += 1;
                        self.advance();
                    }
                    Some('\t') => {
                        width = (width / TAB_WIDTH + 1) * TAB_WIDTH;
                        self.advance();
                    }
                    _ => break,
                }
            }

            match self.peek() {
                // Blank line: indentation does not count
                Some('\n') => {
                    self.advance();
                    continue;
                }
                // Comment-only line: skip it entirely
                Some('#') => {
                    while let Some(c) = self.peek() {
                        if c == '\n' {
                            break;
                        }
                        self.advance();
                    }
                    if self.peek() == Some('\n') {
                        self.advance();
                        continue;
                    }
                    self.at_line_start = false;
                    return;
                }
                None => {
                    self.at_line_start = false;
                    return;
                }
                _ => {
                    self.apply_indentation(width, tokens);
                    self.at_line_start = false;
                    return;
                }
            }
        }
    }

    fn apply_indentation(&mut self, width: u32, tokens: &mut Vec<Token>) {
        self.start_line = self.line;
        self.start_column = 1;

        let current = *self.indents.last().unwrap_or(&0);
        if width > current {
            self.indents.push(width);
            tokens.push(self.make_token(TokenKind::Indent, ""));
        } else if width < current {
            while self.indents.last().is_some_and(|&top| top > width) {
                self.indents.pop();
                tokens.push(self.make_token(TokenKind::Dedent, ""));
            }
            if *self.indents.last().unwrap_or(&0) != width {
                self.error("Inconsistent indentation");
                // Recover by accepting the new width as a level
                self.indents.push(width);
            }
        }
    }

    fn skip_spaces_and_comments(&mut self) {
        while let Some(c) = self.peek() {
            match c {
                ' ' | '\t' | '\r' => {
                    self.advance();
                }
                '#' => {
                    while let Some(c) = self.peek() {
                        if c == '\n' {
                            break;
                        }
                        self.advance();
                    }
                }
                _ => break,
            }
        }
    }

    fn scan_identifier(&mut self, first: char) -> Token {
        let mut lexeme = String::new();
        lexeme.push(first);
        while let Some(c) = self.peek() {
            if c.is_alphanumeric() || c == '_' {
                lexeme.push(c);
                self.advance();
            } else {
                break;
            }
        }

        let kind = keyword_kind(&lexeme).unwrap_or(TokenKind::Ident);
        self.make_token(kind, lexeme)
    }

    // === Shared low-level helpers ===

    pub(super) fn is_at_end(&self) -> bool {
        self.current >= self.chars.len()
    }

    pub(super) fn peek(&self) -> Option<char> {
        self.chars.get(self.current).copied()
    }

    pub(super) fn peek_next(&self) -> Option<char> {
        self.chars.get(self.current + 1).copied()
    }

    pub(super) fn advance(&mut self) -> char {
        let c = self.chars[self.current];
        self.current += 1;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        c
    }

    pub(super) fn match_char(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub(super) fn make_token(&self, kind: TokenKind, lexeme: impl Into<String>) -> Token {
        Token::new(
            kind,
            lexeme,
            Span::new(self.start_line, self.start_column, self.line, self.column),
        )
    }

    pub(super) fn error(&mut self, message: impl Into<String>) {
        self.errors.push(SyntaxError::new(
            message,
            self.start_line,
            self.start_column,
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        let mut lexer = Lexer::new(source);
        let (tokens, errors) = lexer.tokenize();
        assert!(errors.is_empty(), "unexpected lex errors: {errors:?}");
        tokens.into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_simple_assignment() {
        assert_eq!(
            kinds("x = 1\n"),
            vec![
                TokenKind::Ident,
                TokenKind::Equal,
                TokenKind::Int,
                TokenKind::Newline,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_indent_dedent_pairing() {
        let source = "spell f():\n    return 1\nx = 2\n";
        assert_eq!(
            kinds(source),
            vec![
                TokenKind::Spell,
                TokenKind::Ident,
                TokenKind::LeftParen,
                TokenKind::RightParen,
                TokenKind::Colon,
                TokenKind::Newline,
                TokenKind::Indent,
                TokenKind::Return,
                TokenKind::Int,
                TokenKind::Newline,
                TokenKind::Dedent,
                TokenKind::Ident,
                TokenKind::Equal,
                TokenKind::Int,
                TokenKind::Newline,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_trailing_dedents_at_eof() {
        let source = "grim A:\n    spell m():\n        return 1\n";
        let tail: Vec<TokenKind> = kinds(source).into_iter().rev().take(3).collect();
        assert_eq!(
            tail,
            vec![TokenKind::Eof, TokenKind::Dedent, TokenKind::Dedent]
        );
    }

    #[test]
    fn test_blank_and_comment_lines_do_not_dedent() {
        let source = "spell f():\n    a = 1\n\n    # note\n    b = 2\n";
        let ks = kinds(source);
        let dedents = ks.iter().filter(|k| **k == TokenKind::Dedent).count();
        let indents = ks.iter().filter(|k| **k == TokenKind::Indent).count();
        assert_eq!(indents, 1);
        assert_eq!(dedents, 1);
    }

    #[test]
    fn test_layout_suppressed_inside_brackets() {
        let source = "x = f(1,\n      2)\n";
        let ks = kinds(source);
        assert!(!ks.contains(&TokenKind::Indent));
        assert_eq!(
            ks.iter().filter(|k| **k == TokenKind::Newline).count(),
            1,
            "only the final newline is significant"
        );
    }

    #[test]
    fn test_inconsistent_indentation_reported() {
        let mut lexer = Lexer::new("spell f():\n        a = 1\n    b = 2\n");
        let (_, errors) = lexer.tokenize();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("indentation"));
        assert_eq!(errors[0].line, 3);
    }

    #[test]
    fn test_operators() {
        assert_eq!(
            kinds("a <= b != c ** 2\n"),
            vec![
                TokenKind::Ident,
                TokenKind::LessEqual,
                TokenKind::Ident,
                TokenKind::BangEqual,
                TokenKind::Ident,
                TokenKind::StarStar,
                TokenKind::Int,
                TokenKind::Newline,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_keywords() {
        assert_eq!(
            kinds("grim spell attempt ensnare\n")[..4],
            [
                TokenKind::Grim,
                TokenKind::Spell,
                TokenKind::Attempt,
                TokenKind::Ensnare,
            ]
        );
    }

    #[test]
    fn test_missing_final_newline() {
        assert_eq!(
            kinds("x = 1"),
            vec![
                TokenKind::Ident,
                TokenKind::Equal,
                TokenKind::Int,
                TokenKind::Newline,
                TokenKind::Eof,
            ]
        );
    }
}
