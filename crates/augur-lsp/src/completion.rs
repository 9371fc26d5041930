//! Code completion
//!
//! Two contexts: after a dot (member completion) and free (statement
//! completion). Member completion resolves the object best-effort — `self`
//! through the enclosing grimoire, literals and labeled values through
//! fixed method tables, everything else through the symbol table. No
//! ordering or dedup guarantees; editors rank and filter.

use tower_lsp::lsp_types::{CompletionItem, CompletionItemKind, Documentation, Position, Url};

use crate::builtins::{
    builtin_namespace, methods_for_label, BuiltinMember, BUILTIN_FUNCTIONS, BUILTIN_NAMESPACES,
    KEYWORDS,
};
use crate::convert::completion_kind;
use crate::symbols::{GrimoireDecl, Symbol, SymbolKind, SymbolTable};

/// What the text immediately left of the dot looks like
#[derive(Debug, PartialEq, Eq)]
enum ObjectRef {
    /// A quoted literal: string-like
    StringLiteral,
    /// `]`: array-like (literal or index result)
    ArrayLiteral,
    /// `}`: hash-like
    HashLiteral,
    /// An identifier to resolve
    Named(String),
}

/// Completion items for the given cursor position
pub fn completions(
    symbols: &SymbolTable,
    text: &str,
    uri: &Url,
    position: Position,
) -> Vec<CompletionItem> {
    let Some(line) = text.lines().nth(position.line as usize) else {
        return Vec::new();
    };
    let before: String = line
        .chars()
        .take(position.character as usize)
        .collect();

    match dot_object(&before) {
        Some(object) => member_completions(symbols, uri, position.line, &object),
        None => free_completions(symbols, uri, position.line),
    }
}

/// Classify the object left of the last dot, if the cursor is in member
/// position at all
fn dot_object(before: &str) -> Option<ObjectRef> {
    let dot = before.rfind('.')?;
    let prefix = before[..dot].trim_end();

    match prefix.chars().last() {
        None => None,
        Some('"') | Some('\'') => Some(ObjectRef::StringLiteral),
        Some(']') => Some(ObjectRef::ArrayLiteral),
        Some('}') => Some(ObjectRef::HashLiteral),
        Some(c) if c.is_alphanumeric() || c == '_' => {
            let start = prefix
                .rfind(|c: char| !c.is_alphanumeric() && c != '_')
                .map(|i| i + 1)
                .unwrap_or(0);
            let name = &prefix[start..];
            if name.is_empty() {
                None
            } else {
                Some(ObjectRef::Named(name.to_string()))
            }
        }
        Some(_) => None,
    }
}

fn member_completions(
    symbols: &SymbolTable,
    uri: &Url,
    line: u32,
    object: &ObjectRef,
) -> Vec<CompletionItem> {
    match object {
        // Literal syntax is the strongest signal the classifier has
        ObjectRef::StringLiteral => member_items(crate::builtins::STRING_METHODS),
        ObjectRef::ArrayLiteral => member_items(crate::builtins::ARRAY_METHODS),
        ObjectRef::HashLiteral => member_items(crate::builtins::HASH_METHODS),

        ObjectRef::Named(name) if name == "self" => symbols
            .grimoire_containing_line(uri, line)
            .map(|decl| grimoire_member_items(&decl))
            .unwrap_or_default(),

        ObjectRef::Named(name) => {
            let symbol = symbols.lookup_symbol_at(name, uri, line);

            // A declared or inferred label naming a standard category
            // beats everything else.
            if let Some(table) = symbol
                .as_ref()
                .and_then(|s| s.value_type.as_deref())
                .and_then(methods_for_label)
            {
                return member_items(table);
            }

            // Builtin namespaces are matched by exact identifier.
            if let Some(namespace) = builtin_namespace(name) {
                return member_items(namespace.members);
            }

            // Instance bindings and grimoire names enumerate members.
            let class = symbol
                .as_ref()
                .and_then(|s| match s.kind {
                    SymbolKind::Grimoire => Some(s.name.clone()),
                    _ => s.owner.clone(),
                })
                .or_else(|| Some(name.clone()));
            class
                .and_then(|c| symbols.lookup_grimoire(&c))
                .map(|decl| grimoire_member_items(&decl))
                .unwrap_or_default()
        }
    }
}

fn free_completions(symbols: &SymbolTable, uri: &Url, line: u32) -> Vec<CompletionItem> {
    let mut items = Vec::new();

    for keyword in KEYWORDS {
        items.push(CompletionItem {
            label: (*keyword).to_string(),
            kind: Some(CompletionItemKind::KEYWORD),
            ..Default::default()
        });
    }

    for builtin in BUILTIN_FUNCTIONS {
        items.push(CompletionItem {
            label: builtin.name.to_string(),
            kind: Some(CompletionItemKind::FUNCTION),
            detail: Some(builtin.signature.to_string()),
            documentation: Some(Documentation::String(builtin.doc.to_string())),
            ..Default::default()
        });
    }

    for symbol in symbols.symbols_in_scope_at(uri, line) {
        items.push(symbol_item(&symbol));
    }

    for symbol in symbols.global_symbols() {
        items.push(symbol_item(&symbol));
    }

    for namespace in BUILTIN_NAMESPACES {
        items.push(CompletionItem {
            label: namespace.name.to_string(),
            kind: Some(CompletionItemKind::MODULE),
            detail: Some(namespace.doc.to_string()),
            ..Default::default()
        });
    }

    items
}

fn member_items(members: &[BuiltinMember]) -> Vec<CompletionItem> {
    members
        .iter()
        .map(|member| CompletionItem {
            label: member.name.to_string(),
            kind: Some(CompletionItemKind::METHOD),
            detail: Some(member.signature.to_string()),
            documentation: Some(Documentation::String(member.doc.to_string())),
            ..Default::default()
        })
        .collect()
}

fn grimoire_member_items(decl: &GrimoireDecl) -> Vec<CompletionItem> {
    let mut items = Vec::new();
    for method in &decl.methods {
        items.push(CompletionItem {
            label: method.name.clone(),
            kind: Some(CompletionItemKind::METHOD),
            detail: Some(format!("method of {}", decl.name)),
            documentation: method
                .documentation
                .clone()
                .map(Documentation::String),
            ..Default::default()
        });
    }
    for field in &decl.fields {
        items.push(CompletionItem {
            label: field.name.clone(),
            kind: Some(CompletionItemKind::FIELD),
            detail: Some(format!("field of {}", decl.name)),
            documentation: field.documentation.clone().map(Documentation::String),
            ..Default::default()
        });
    }
    items
}

fn symbol_item(symbol: &Symbol) -> CompletionItem {
    let kind_label = match symbol.kind {
        SymbolKind::Grimoire => "grimoire",
        SymbolKind::Spell => "spell",
        SymbolKind::Method => "method",
        SymbolKind::Field => "field",
        SymbolKind::Variable => "variable",
        SymbolKind::Parameter => "parameter",
        SymbolKind::Instance => "instance",
    };
    let detail = match &symbol.owner {
        Some(owner) => format!("{kind_label} of {owner}"),
        None => kind_label.to_string(),
    };

    CompletionItem {
        label: symbol.name.clone(),
        kind: Some(completion_kind(symbol.kind)),
        detail: Some(detail),
        documentation: symbol.documentation.clone().map(Documentation::String),
        ..Default::default()
    }
}
