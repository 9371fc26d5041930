//! Token types for lexical analysis
//!
//! Defines all token types recognized by the Augur lexer.

use crate::span::Span;
use serde::{Deserialize, Serialize};

/// Token produced by the lexer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    /// The kind of token
    pub kind: TokenKind,
    /// The source text of this token
    pub lexeme: String,
    /// Source location
    pub span: Span,
}

impl Token {
    /// Create a new token
    pub fn new(kind: TokenKind, lexeme: impl Into<String>, span: Span) -> Self {
        Self {
            kind,
            lexeme: lexeme.into(),
            span,
        }
    }
}

/// Classification of token types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenKind {
    // Literals
    /// Integer literal (42)
    Int,
    /// Float literal (3.14)
    Float,
    /// String literal ("hello", 'hello', """doc""")
    Str,
    /// `True` keyword
    True,
    /// `False` keyword
    False,
    /// `None` keyword
    NoneKw,
    /// Identifier
    Ident,

    // Keywords
    /// `grim` keyword (grimoire declaration)
    Grim,
    /// `spell` keyword (function declaration)
    Spell,
    /// `init` keyword (grimoire constructor)
    Init,
    /// `self` keyword (current instance)
    SelfKw,
    /// `if` keyword
    If,
    /// `otherwise` keyword (chained condition)
    Otherwise,
    /// `else` keyword
    Else,
    /// `for` keyword
    For,
    /// `in` keyword
    In,
    /// `while` keyword
    While,
    /// `stop` keyword (loop break)
    Stop,
    /// `skip` keyword (loop continue)
    Skip,
    /// `ignore` keyword (no-op statement)
    Ignore,
    /// `return` keyword
    Return,
    /// `import` keyword
    Import,
    /// `match` keyword
    Match,
    /// `case` keyword
    Case,
    /// `attempt` keyword (try block)
    Attempt,
    /// `ensnare` keyword (catch clause)
    Ensnare,
    /// `resolve` keyword (finally block)
    Resolve,
    /// `raise` keyword
    Raise,
    /// `as` keyword
    As,
    /// `arcane` keyword (abstract grimoire)
    Arcane,
    /// `arcanespell` keyword (abstract method)
    ArcaneSpell,
    /// `super` keyword
    Super,
    /// `check` keyword (assertion)
    Check,
    /// `and` operator keyword
    And,
    /// `or` operator keyword
    Or,
    /// `not` operator keyword
    Not,

    // Operators and punctuation
    /// `+`
    Plus,
    /// `-`
    Minus,
    /// `*`
    Star,
    /// `**`
    StarStar,
    /// `/`
    Slash,
    /// `%`
    Percent,
    /// `=`
    Equal,
    /// `==`
    EqualEqual,
    /// `!=`
    BangEqual,
    /// `<`
    Less,
    /// `<=`
    LessEqual,
    /// `>`
    Greater,
    /// `>=`
    GreaterEqual,
    /// `+=`
    PlusEqual,
    /// `-=`
    MinusEqual,
    /// `*=`
    StarEqual,
    /// `/=`
    SlashEqual,
    /// `.`
    Dot,
    /// `,`
    Comma,
    /// `:`
    Colon,
    /// `->`
    Arrow,
    /// `(`
    LeftParen,
    /// `)`
    RightParen,
    /// `[`
    LeftBracket,
    /// `]`
    RightBracket,
    /// `{`
    LeftBrace,
    /// `}`
    RightBrace,

    // Layout
    /// End of a logical line
    Newline,
    /// Increase in indentation depth
    Indent,
    /// Decrease in indentation depth
    Dedent,
    /// End of input
    Eof,
}

/// Map an identifier lexeme to its keyword kind, if it is one
pub fn keyword_kind(ident: &str) -> Option<TokenKind> {
    let kind = match ident {
        "grim" => TokenKind::Grim,
        "spell" => TokenKind::Spell,
        "init" => TokenKind::Init,
        "self" => TokenKind::SelfKw,
        "if" => TokenKind::If,
        "otherwise" => TokenKind::Otherwise,
        "else" => TokenKind::Else,
        "for" => TokenKind::For,
        "in" => TokenKind::In,
        "while" => TokenKind::While,
        "stop" => TokenKind::Stop,
        "skip" => TokenKind::Skip,
        "ignore" => TokenKind::Ignore,
        "return" => TokenKind::Return,
        "import" => TokenKind::Import,
        "match" => TokenKind::Match,
        "case" => TokenKind::Case,
        "attempt" => TokenKind::Attempt,
        "ensnare" => TokenKind::Ensnare,
        "resolve" => TokenKind::Resolve,
        "raise" => TokenKind::Raise,
        "as" => TokenKind::As,
        "arcane" => TokenKind::Arcane,
        "arcanespell" => TokenKind::ArcaneSpell,
        "super" => TokenKind::Super,
        "check" => TokenKind::Check,
        "and" => TokenKind::And,
        "or" => TokenKind::Or,
        "not" => TokenKind::Not,
        "True" => TokenKind::True,
        "False" => TokenKind::False,
        "None" => TokenKind::NoneKw,
        _ => return None,
    };
    Some(kind)
}
