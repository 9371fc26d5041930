//! Analysis orchestration
//!
//! The single coordination point between the document store, the parser,
//! and the symbol table: every open/change runs the full text through the
//! parser, converts errors to diagnostics, and rebuilds the file's symbol
//! generation when the parse is clean. A failed parse leaves the previous
//! generation serving queries; diagnostics always reflect the newest parse.

use std::sync::Arc;

use augur_syntax::Program;
use once_cell::sync::Lazy;
use regex::Regex;
use tower_lsp::lsp_types::{Diagnostic, DiagnosticSeverity, Position, Range, Url};
use tracing::{debug, warn};

use crate::document::DocumentStore;
use crate::symbols::SymbolTable;

/// Source tag attached to every published diagnostic
pub const DIAGNOSTIC_SOURCE: &str = "augur-lsp";

/// Width of the estimated error range when the message carries no span
const ESTIMATED_ERROR_WIDTH: u32 = 10;

/// Parser errors embed their position as `"... at line L, column C"`
static POSITION_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)^(.*) at line (\d+), column (\d+)$").unwrap());

/// Orchestrates parsing, diagnostics, and symbol rebuilds
pub struct Analyzer {
    store: Arc<DocumentStore>,
    symbols: Arc<SymbolTable>,
}

impl Analyzer {
    /// Create an analyzer over the shared document store and symbol table
    pub fn new(store: Arc<DocumentStore>, symbols: Arc<SymbolTable>) -> Self {
        Self { store, symbols }
    }

    /// Analyze a document and return its diagnostics.
    ///
    /// An unknown URI yields an empty list (logged); an empty list also
    /// means "clear any previously published diagnostics" to the editor.
    pub fn analyze(&self, uri: &Url) -> Vec<Diagnostic> {
        let Some(doc) = self.store.get(uri) else {
            warn!(%uri, "cannot analyze unknown document");
            return Vec::new();
        };

        let (program, errors) = parse_document(&doc.text);
        let diagnostics: Vec<Diagnostic> = errors.iter().map(|e| diagnostic_from_error(e)).collect();

        if errors.is_empty() {
            self.symbols.rebuild(uri, &program);
            debug!(%uri, version = doc.version, "symbols rebuilt");
        } else {
            debug!(%uri, count = errors.len(), "parse errors; keeping previous symbols");
        }

        diagnostics
    }
}

/// The parse-adapter boundary: full text in, AST plus rendered error
/// strings out. Positions inside the strings are best-effort.
pub fn parse_document(text: &str) -> (Program, Vec<String>) {
    let (program, errors) = augur_syntax::parse_source(text);
    let rendered = errors.iter().map(ToString::to_string).collect();
    (program, rendered)
}

/// Derive an LSP diagnostic from a parser error string.
///
/// When the `" at line L, column C"` suffix is present the position is
/// taken from it (1-based in the message, 0-based on the wire) and stripped
/// from the displayed text. Otherwise the error lands at the start of the
/// document with an estimated width.
pub fn diagnostic_from_error(error: &str) -> Diagnostic {
    let (message, line, column) = match POSITION_PATTERN.captures(error) {
        Some(captures) => {
            let message = captures.get(1).map_or(error, |m| m.as_str()).to_string();
            let line: u32 = captures[2].parse().unwrap_or(1);
            let column: u32 = captures[3].parse().unwrap_or(1);
            (message, line.saturating_sub(1), column.saturating_sub(1))
        }
        None => (error.to_string(), 0, 0),
    };

    Diagnostic {
        range: Range {
            start: Position {
                line,
                character: column,
            },
            end: Position {
                line,
                character: column + ESTIMATED_ERROR_WIDTH,
            },
        },
        severity: Some(DiagnosticSeverity::ERROR),
        source: Some(DIAGNOSTIC_SOURCE.to_string()),
        message,
        ..Default::default()
    }
}
