//! Signature help
//!
//! Scans left from the cursor for the enclosing unmatched `(`, takes the
//! identifier before it as the callee, and counts commas to find the
//! active parameter. Resolution tries the symbol table (spells and
//! methods), then the builtin signature table.

use tower_lsp::lsp_types::{
    ParameterInformation, ParameterLabel, Position, SignatureHelp, SignatureInformation, Url,
};

use crate::builtins::builtin_function;
use crate::hover::render_params;
use crate::symbols::{SymbolKind, SymbolTable};

/// The enclosing call at the cursor: callee name and 0-based active
/// parameter index
pub fn call_context(line: &str, character: u32) -> Option<(String, u32)> {
    let chars: Vec<char> = line.chars().collect();
    let cursor = (character as usize).min(chars.len());

    // Walk left to the unmatched opening parenthesis
    let mut depth = 0i32;
    let mut open = None;
    for i in (0..cursor).rev() {
        match chars[i] {
            ')' => depth += 1,
            '(' => {
                if depth == 0 {
                    open = Some(i);
                    break;
                }
                depth -= 1;
            }
            _ => {}
        }
    }
    let open = open?;

    // The callee identifier sits just before the parenthesis
    let mut end = open;
    while end > 0 && chars[end - 1] == ' ' {
        end -= 1;
    }
    let mut start = end;
    while start > 0 && (chars[start - 1].is_alphanumeric() || chars[start - 1] == '_') {
        start -= 1;
    }
    if start >= end {
        return None;
    }
    let callee: String = chars[start..end].iter().collect();

    // Commas between the parenthesis and the cursor give the index,
    // ignoring commas nested in inner calls or literals
    let mut index = 0u32;
    let mut nested = 0i32;
    for &c in &chars[open + 1..cursor] {
        match c {
            '(' | '[' | '{' => nested += 1,
            ')' | ']' | '}' => nested -= 1,
            ',' if nested == 0 => index += 1,
            _ => {}
        }
    }

    Some((callee, index))
}

/// Signature help for the given position, if the cursor is inside a call
/// to something resolvable
pub fn signature_help(
    symbols: &SymbolTable,
    text: &str,
    uri: &Url,
    position: Position,
) -> Option<SignatureHelp> {
    let line = text.lines().nth(position.line as usize)?;
    let (callee, index) = call_context(line, position.character)?;

    if let Some(symbol) = symbols.lookup_symbol_at(&callee, uri, position.line) {
        if matches!(symbol.kind, SymbolKind::Spell | SymbolKind::Method) {
            let rendered: Vec<String> = symbol
                .params
                .iter()
                .map(|p| {
                    render_params(std::slice::from_ref(p))
                })
                .collect();
            let label = format!("{}({})", symbol.name, rendered.join(", "));
            let parameters: Vec<ParameterInformation> = rendered
                .iter()
                .map(|p| ParameterInformation {
                    label: ParameterLabel::Simple(p.clone()),
                    documentation: None,
                })
                .collect();

            let active = clamp_index(index, parameters.len());
            return Some(SignatureHelp {
                signatures: vec![SignatureInformation {
                    label,
                    documentation: symbol
                        .documentation
                        .clone()
                        .map(tower_lsp::lsp_types::Documentation::String),
                    parameters: Some(parameters),
                    active_parameter: None,
                }],
                active_signature: Some(0),
                active_parameter: Some(active),
            });
        }
    }

    let builtin = builtin_function(&callee)?;
    let parameters: Vec<ParameterInformation> = builtin
        .params
        .iter()
        .map(|p| ParameterInformation {
            label: ParameterLabel::Simple((*p).to_string()),
            documentation: None,
        })
        .collect();
    let active = clamp_index(index, parameters.len());

    Some(SignatureHelp {
        signatures: vec![SignatureInformation {
            label: builtin.signature.to_string(),
            documentation: Some(tower_lsp::lsp_types::Documentation::String(
                builtin.doc.to_string(),
            )),
            parameters: Some(parameters),
            active_parameter: None,
        }],
        active_signature: Some(0),
        active_parameter: Some(active),
    })
}

/// Overflowing indices clamp to the last parameter
fn clamp_index(index: u32, param_count: usize) -> u32 {
    if param_count == 0 {
        return 0;
    }
    index.min(param_count as u32 - 1)
}
