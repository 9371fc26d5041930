//! Conversions between syntax-level and LSP wire types

use augur_syntax::Span;
use tower_lsp::lsp_types::{CompletionItemKind, Position, Range};

use crate::symbols::SymbolKind;

/// Convert a 1-based parser span to a 0-based LSP range
pub fn span_to_range(span: Span) -> Range {
    Range {
        start: Position {
            line: span.start_line.saturating_sub(1),
            character: span.start_column.saturating_sub(1),
        },
        end: Position {
            line: span.end_line.saturating_sub(1),
            character: span.end_column.saturating_sub(1),
        },
    }
}

/// Range of `width` characters starting at a 0-based line/column
pub fn range_at(line: u32, column: u32, width: u32) -> Range {
    Range {
        start: Position {
            line,
            character: column,
        },
        end: Position {
            line,
            character: column + width,
        },
    }
}

/// Map a symbol kind to the LSP completion item kind editors render
pub fn completion_kind(kind: SymbolKind) -> CompletionItemKind {
    match kind {
        SymbolKind::Grimoire => CompletionItemKind::CLASS,
        SymbolKind::Spell => CompletionItemKind::FUNCTION,
        SymbolKind::Method => CompletionItemKind::METHOD,
        SymbolKind::Field => CompletionItemKind::FIELD,
        SymbolKind::Variable | SymbolKind::Instance => CompletionItemKind::VARIABLE,
        SymbolKind::Parameter => CompletionItemKind::VARIABLE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_to_range_is_zero_based() {
        let range = span_to_range(Span::new(10, 5, 10, 11));
        assert_eq!(range.start, Position::new(9, 4));
        assert_eq!(range.end, Position::new(9, 10));
    }

    #[test]
    fn test_dummy_span_saturates() {
        let range = span_to_range(Span::dummy());
        assert_eq!(range.start, Position::new(0, 0));
    }
}
