//! Abstract Syntax Tree (AST) definitions
//!
//! Nodes carry the spans the language server needs for position queries;
//! docstrings are surfaced on the declarations they document.

use crate::span::Span;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Top-level program: the statements of one source file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Program {
    pub statements: Vec<Stmt>,
}

/// A named occurrence in source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Identifier {
    pub name: String,
    pub span: Span,
}

/// A declared parameter: `name`, `name: hint`, `name = default`, `name: hint = default`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Param {
    pub name: Identifier,
    /// Declared type label, if any
    pub type_hint: Option<Identifier>,
    /// Default value expression, if any
    pub default: Option<Expr>,
    pub span: Span,
}

/// An indented statement suite
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub statements: Vec<Stmt>,
    pub span: Span,
}

/// Statement forms
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Stmt {
    Grimoire(GrimoireDef),
    Spell(SpellDef),
    Assign(AssignStmt),
    If(IfStmt),
    For(ForStmt),
    While(WhileStmt),
    Match(MatchStmt),
    Attempt(AttemptStmt),
    Return(ReturnStmt),
    Raise(RaiseStmt),
    Import(ImportStmt),
    Check(CheckStmt),
    /// `skip` (continue)
    Skip(Span),
    /// `stop` (break)
    Stop(Span),
    /// `ignore` (no-op)
    Ignore(Span),
    Expr(ExprStmt),
}

impl Stmt {
    /// Source span of this statement
    pub fn span(&self) -> Span {
        match self {
            Stmt::Grimoire(g) => g.span,
            Stmt::Spell(s) => s.span,
            Stmt::Assign(a) => a.span,
            Stmt::If(i) => i.span,
            Stmt::For(f) => f.span,
            Stmt::While(w) => w.span,
            Stmt::Match(m) => m.span,
            Stmt::Attempt(a) => a.span,
            Stmt::Return(r) => r.span,
            Stmt::Raise(r) => r.span,
            Stmt::Import(i) => i.span,
            Stmt::Check(c) => c.span,
            Stmt::Skip(span) | Stmt::Stop(span) | Stmt::Ignore(span) => *span,
            Stmt::Expr(e) => e.span,
        }
    }
}

/// Grimoire (class-like) declaration
///
/// Syntax: `grim Name:` or `grim Name(Parent):`, optionally preceded by
/// `arcane`. The body holds an optional docstring, an optional `init`
/// constructor, and `spell`/`arcanespell` methods.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrimoireDef {
    pub name: Identifier,
    /// Single-inheritance parent, if declared
    pub parent: Option<Identifier>,
    /// Docstring (string-literal first statement of the body)
    pub doc: Option<String>,
    /// Constructor, modeled as a method named `init`
    pub init: Option<SpellDef>,
    pub methods: Vec<SpellDef>,
    /// Declared with the `arcane` modifier
    pub arcane: bool,
    pub span: Span,
}

/// Spell (function or method) declaration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpellDef {
    pub name: Identifier,
    pub params: Vec<Param>,
    /// Docstring (string-literal first statement of the body)
    pub doc: Option<String>,
    pub body: Block,
    pub span: Span,
}

/// Assignment statement, optionally carrying a declared type label
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssignStmt {
    pub target: AssignTarget,
    /// Type label from `name: hint = value` declarations
    pub type_hint: Option<Identifier>,
    pub value: Expr,
    pub span: Span,
}

/// The left-hand side of an assignment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AssignTarget {
    Name(Identifier),
    Member {
        object: Expr,
        property: Identifier,
        span: Span,
    },
    Index {
        object: Expr,
        index: Expr,
        span: Span,
    },
}

/// `if` / `otherwise` chain / `else`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IfStmt {
    pub condition: Expr,
    pub consequence: Block,
    pub otherwise: Vec<OtherwiseBranch>,
    pub alternative: Option<Block>,
    pub span: Span,
}

/// One `otherwise cond:` branch of an if-chain
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OtherwiseBranch {
    pub condition: Expr,
    pub body: Block,
    pub span: Span,
}

/// `for target in iterable:` with optional `else:`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForStmt {
    pub target: ForTarget,
    pub iterable: Expr,
    pub body: Block,
    pub alternative: Option<Block>,
    pub span: Span,
}

/// Loop binding: a single name or a tuple-unpacking list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ForTarget {
    Name(Identifier),
    Tuple(Vec<Identifier>),
}

/// `while cond:` loop
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WhileStmt {
    pub condition: Expr,
    pub body: Block,
    pub span: Span,
}

/// `match subject:` with `case` arms
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchStmt {
    pub subject: Expr,
    pub arms: Vec<CaseArm>,
    pub span: Span,
}

/// One `case pattern:` arm; `pattern` is `None` for the `_` default
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseArm {
    pub pattern: Option<Expr>,
    pub body: Block,
    pub span: Span,
}

/// `attempt:` / `ensnare:` / `resolve:` exception handling
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttemptStmt {
    pub body: Block,
    pub ensnares: Vec<EnsnareClause>,
    pub resolve: Option<Block>,
    pub span: Span,
}

/// One `ensnare [Error] [as alias]:` clause
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnsnareClause {
    /// The error grimoire being caught, if named
    pub error: Option<Identifier>,
    /// Binding for the caught value
    pub alias: Option<Identifier>,
    pub body: Block,
    pub span: Span,
}

/// `return [value]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReturnStmt {
    pub value: Option<Expr>,
    pub span: Span,
}

/// `raise value`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RaiseStmt {
    pub value: Expr,
    pub span: Span,
}

/// `import path [as alias]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportStmt {
    /// Module path: a string literal or joined dotted identifiers
    pub path: String,
    pub alias: Option<Identifier>,
    pub span: Span,
}

/// `check cond [, message]` assertion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckStmt {
    pub condition: Expr,
    pub message: Option<Expr>,
    pub span: Span,
}

/// Expression evaluated for effect
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExprStmt {
    pub expr: Expr,
    pub span: Span,
}

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnaryOp {
    Neg,
    Not,
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Pow,
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    And,
    Or,
    In,
}

impl BinaryOp {
    /// Source spelling of the operator
    pub fn as_str(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Mod => "%",
            BinaryOp::Pow => "**",
            BinaryOp::Eq => "==",
            BinaryOp::NotEq => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::LtEq => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::GtEq => ">=",
            BinaryOp::And => "and",
            BinaryOp::Or => "or",
            BinaryOp::In => "in",
        }
    }
}

/// Expression forms
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    Int(i64, Span),
    Float(f64, Span),
    Str(String, Span),
    Bool(bool, Span),
    None(Span),
    Ident(Identifier),
    /// The `self` instance reference
    SelfRef(Span),
    /// The `super` parent reference
    Super(Span),
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
        span: Span,
    },
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
        span: Span,
    },
    Call {
        callee: Box<Expr>,
        args: Vec<Expr>,
        span: Span,
    },
    Member {
        object: Box<Expr>,
        property: Identifier,
        span: Span,
    },
    Index {
        object: Box<Expr>,
        index: Box<Expr>,
        span: Span,
    },
    Array(Vec<Expr>, Span),
    Hash(Vec<(Expr, Expr)>, Span),
    Tuple(Vec<Expr>, Span),
}

impl Expr {
    /// Source span of this expression
    pub fn span(&self) -> Span {
        match self {
            Expr::Int(_, span)
            | Expr::Float(_, span)
            | Expr::Str(_, span)
            | Expr::Bool(_, span)
            | Expr::None(span)
            | Expr::SelfRef(span)
            | Expr::Super(span)
            | Expr::Array(_, span)
            | Expr::Hash(_, span)
            | Expr::Tuple(_, span) => *span,
            Expr::Ident(ident) => ident.span,
            Expr::Unary { span, .. }
            | Expr::Binary { span, .. }
            | Expr::Call { span, .. }
            | Expr::Member { span, .. }
            | Expr::Index { span, .. } => *span,
        }
    }
}

fn write_list(f: &mut fmt::Formatter<'_>, items: &[Expr]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

/// Compact source-like rendering, used for default-value labels and hovers.
impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Int(value, _) => write!(f, "{value}"),
            Expr::Float(value, _) => write!(f, "{value}"),
            Expr::Str(value, _) => write!(f, "\"{value}\""),
            Expr::Bool(true, _) => write!(f, "True"),
            Expr::Bool(false, _) => write!(f, "False"),
            Expr::None(_) => write!(f, "None"),
            Expr::Ident(ident) => write!(f, "{}", ident.name),
            Expr::SelfRef(_) => write!(f, "self"),
            Expr::Super(_) => write!(f, "super"),
            Expr::Unary { op, operand, .. } => match op {
                UnaryOp::Neg => write!(f, "-{operand}"),
                UnaryOp::Not => write!(f, "not {operand}"),
            },
            Expr::Binary {
                op, left, right, ..
            } => write!(f, "{left} {} {right}", op.as_str()),
            Expr::Call { callee, args, .. } => {
                write!(f, "{callee}(")?;
                write_list(f, args)?;
                write!(f, ")")
            }
            Expr::Member {
                object, property, ..
            } => write!(f, "{object}.{}", property.name),
            Expr::Index { object, index, .. } => write!(f, "{object}[{index}]"),
            Expr::Array(items, _) => {
                write!(f, "[")?;
                write_list(f, items)?;
                write!(f, "]")
            }
            Expr::Hash(pairs, _) => {
                write!(f, "{{")?;
                for (i, (key, value)) in pairs.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{key}: {value}")?;
                }
                write!(f, "}}")
            }
            Expr::Tuple(items, _) => {
                write!(f, "(")?;
                write_list(f, items)?;
                write!(f, ")")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ident(name: &str) -> Identifier {
        Identifier {
            name: name.to_string(),
            span: Span::dummy(),
        }
    }

    #[test]
    fn test_display_literal_defaults() {
        assert_eq!(Expr::Int(5, Span::dummy()).to_string(), "5");
        assert_eq!(
            Expr::Str("hi".to_string(), Span::dummy()).to_string(),
            "\"hi\""
        );
        assert_eq!(Expr::None(Span::dummy()).to_string(), "None");
    }

    #[test]
    fn test_display_call() {
        let call = Expr::Call {
            callee: Box::new(Expr::Ident(ident("make"))),
            args: vec![Expr::Int(1, Span::dummy()), Expr::Ident(ident("x"))],
            span: Span::dummy(),
        };
        assert_eq!(call.to_string(), "make(1, x)");
    }
}
