//! Hover information
//!
//! Keywords get canned descriptions; everything else resolves through the
//! symbol table and renders a kind-specific one-line signature plus the
//! declaration's docstring. No resolution, no popup.

use tower_lsp::lsp_types::{Hover, HoverContents, MarkupContent, MarkupKind, Position, Range, Url};

use crate::builtins::keyword_doc;
use crate::convert::range_at;
use crate::symbols::{Parameter, Symbol, SymbolKind, SymbolTable};

/// The identifier under the cursor, with its 0-based column range
pub fn identifier_at(text: &str, position: Position) -> Option<(String, Range)> {
    let line = text.lines().nth(position.line as usize)?;
    let chars: Vec<char> = line.chars().collect();
    let col = position.character as usize;
    if col >= chars.len() {
        return None;
    }

    let is_word = |c: char| c.is_alphanumeric() || c == '_';

    let mut start = col;
    while start > 0 && is_word(chars[start - 1]) {
        start -= 1;
    }
    let mut end = col;
    while end < chars.len() && is_word(chars[end]) {
        end += 1;
    }
    if start >= end {
        return None;
    }

    let word: String = chars[start..end].iter().collect();
    let range = range_at(position.line, start as u32, (end - start) as u32);
    Some((word, range))
}

/// Hover response for the given position, if anything resolves
pub fn hover(symbols: &SymbolTable, text: &str, uri: &Url, position: Position) -> Option<Hover> {
    let (word, range) = identifier_at(text, position)?;

    if let Some(doc) = keyword_doc(&word) {
        return Some(markdown_hover(doc.to_string(), range));
    }

    let symbol = symbols.lookup_symbol_at(&word, uri, position.line)?;
    Some(markdown_hover(render_symbol(&symbol), range))
}

/// Render a parameter list the way it was declared
pub fn render_params(params: &[Parameter]) -> String {
    params
        .iter()
        .map(|p| {
            let mut rendered = p.name.clone();
            if let Some(hint) = &p.type_hint {
                rendered.push_str(": ");
                rendered.push_str(hint);
            }
            if let Some(default) = &p.default_value {
                rendered.push_str(" = ");
                rendered.push_str(default);
            }
            rendered
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// One-line, kind-specific signature plus documentation
fn render_symbol(symbol: &Symbol) -> String {
    let doc = symbol.documentation.as_deref().unwrap_or("");
    let header = match symbol.kind {
        SymbolKind::Grimoire => format!("**grimoire** {}", symbol.name),
        SymbolKind::Spell => {
            format!("**spell** {}({})", symbol.name, render_params(&symbol.params))
        }
        SymbolKind::Method => format!(
            "**method** {}.{}({})",
            symbol.owner.as_deref().unwrap_or("?"),
            symbol.name,
            render_params(&symbol.params)
        ),
        SymbolKind::Field => format!(
            "**field** {} of {}",
            symbol.name,
            symbol.owner.as_deref().unwrap_or("?")
        ),
        SymbolKind::Instance => format!(
            "**instance** {} of {}",
            symbol.name,
            symbol.owner.as_deref().unwrap_or("?")
        ),
        SymbolKind::Variable => match &symbol.value_type {
            Some(label) => format!("**variable** {}: {label}", symbol.name),
            None => format!("**variable** {}", symbol.name),
        },
        SymbolKind::Parameter => match &symbol.value_type {
            Some(label) => format!("**parameter** {}: {label}", symbol.name),
            None => format!("**parameter** {}", symbol.name),
        },
    };

    if doc.is_empty() {
        header
    } else {
        format!("{header}\n\n{doc}")
    }
}

fn markdown_hover(value: String, range: Range) -> Hover {
    Hover {
        contents: HoverContents::Markup(MarkupContent {
            kind: MarkupKind::Markdown,
            value,
        }),
        range: Some(range),
    }
}
