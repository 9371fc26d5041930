//! Literal scanning (numbers and strings)

use super::Lexer;
use crate::token::{Token, TokenKind};

impl Lexer {
    /// Scan an integer or float literal
    pub(super) fn scan_number(&mut self, first: char) -> Token {
        let mut lexeme = String::new();
        lexeme.push(first);

        while let Some(c) = self.peek() {
            if c.is_ascii_digit() || c == '_' {
                if c != '_' {
                    lexeme.push(c);
                }
                self.advance();
            } else {
                break;
            }
        }

        // Fractional part: only when a digit follows the dot, so member
        // access on an integer result still lexes as `1 . method`
        let mut is_float = false;
        if self.peek() == Some('.') && self.peek_next().is_some_and(|c| c.is_ascii_digit()) {
            is_float = true;
            lexeme.push('.');
            self.advance();
            while let Some(c) = self.peek() {
                if c.is_ascii_digit() || c == '_' {
                    if c != '_' {
                        lexeme.push(c);
                    }
                    self.advance();
                } else {
                    break;
                }
            }
        }

        let kind = if is_float {
            TokenKind::Float
        } else {
            TokenKind::Int
        };
        self.make_token(kind, lexeme)
    }

    /// Scan a string literal; `quote` is the opening quote character.
    ///
    /// Supports `"..."`, `'...'`, and triple-quoted `"""..."""` strings
    /// (the docstring form, which may span lines). The token lexeme holds
    /// the decoded content, not the raw source.
    pub(super) fn scan_string(&mut self, quote: char) -> Option<Token> {
        // Detect the triple-quoted form: the opening quote is already
        // consumed, so two more of the same quote follow.
        if self.peek() == Some(quote) && self.peek_next() == Some(quote) {
            self.advance();
            self.advance();
            return self.scan_triple_string(quote);
        }
        // Empty string: `""`
        if self.peek() == Some(quote) {
            self.advance();
            return Some(self.make_token(TokenKind::Str, ""));
        }

        let mut content = String::new();
        loop {
            match self.peek() {
                None | Some('\n') => {
                    self.error("Unterminated string literal");
                    return None;
                }
                Some(c) if c == quote => {
                    self.advance();
                    return Some(self.make_token(TokenKind::Str, content));
                }
                Some('\\') => {
                    self.advance();
                    content.push(self.scan_escape());
                }
                Some(c) => {
                    content.push(c);
                    self.advance();
                }
            }
        }
    }

    fn scan_triple_string(&mut self, quote: char) -> Option<Token> {
        let mut content = String::new();
        loop {
            if self.is_at_end() {
                self.error("Unterminated string literal");
                return None;
            }
            if self.peek() == Some(quote)
                && self.peek_next() == Some(quote)
                && self.chars.get(self.current + 2).copied() == Some(quote)
            {
                self.advance();
                self.advance();
                self.advance();
                return Some(self.make_token(TokenKind::Str, content));
            }
            if self.peek() == Some('\\') {
                self.advance();
                content.push(self.scan_escape());
            } else {
                content.push(self.advance());
            }
        }
    }

    fn scan_escape(&mut self) -> char {
        match self.peek() {
            Some('n') => {
                self.advance();
                '\n'
            }
            Some('t') => {
                self.advance();
                '\t'
            }
            Some('r') => {
                self.advance();
                '\r'
            }
            Some('\\') => {
                self.advance();
                '\\'
            }
            Some('"') => {
                self.advance();
                '"'
            }
            Some('\'') => {
                self.advance();
                '\''
            }
            Some('0') => {
                self.advance();
                '\0'
            }
            Some(other) => {
                // Unknown escape: keep the character as written
                self.advance();
                other
            }
            None => '\\',
        }
    }
}
