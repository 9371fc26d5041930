//! Go-to-definition

use tower_lsp::lsp_types::{Location, Position, Url};

use crate::convert::range_at;
use crate::hover::identifier_at;
use crate::symbols::SymbolTable;

/// Definition location for the identifier under the cursor.
///
/// The returned range covers the defining occurrence of the name in the
/// file that declared it — which may be a different file for grimoires and
/// their members.
pub fn definition(
    symbols: &SymbolTable,
    text: &str,
    uri: &Url,
    position: Position,
) -> Option<Location> {
    let (word, _) = identifier_at(text, position)?;
    let symbol = symbols.lookup_symbol_at(&word, uri, position.line)?;

    Some(Location {
        uri: symbol.uri.clone(),
        range: range_at(symbol.line, symbol.column, word.chars().count() as u32),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use augur_syntax::parse_source;

    fn uri(path: &str) -> Url {
        Url::parse(&format!("file:///{path}")).unwrap()
    }

    fn table_with(uri: &Url, source: &str) -> SymbolTable {
        let table = SymbolTable::new();
        let (program, errors) = parse_source(source);
        assert!(errors.is_empty(), "unexpected parse errors: {errors:?}");
        table.rebuild(uri, &program);
        table
    }

    #[test]
    fn test_definition_of_grimoire_use() {
        // Dragon is declared on source line 10 (1-based).
        let mut source = String::new();
        for i in 1..=9 {
            source.push_str(&format!("x{i} = {i}\n"));
        }
        source.push_str("grim Dragon:\n    spell fly():\n        return 1\n\n");
        source.push_str("spell main():\n    pet = Dragon()\n");

        let file = uri("dragon.aug");
        let table = table_with(&file, &source);

        // The use site: `pet = Dragon()` (0-based line 14).
        let location = definition(&table, &source, &file, Position::new(14, 12)).unwrap();
        assert_eq!(location.uri, file);
        assert_eq!(location.range.start.line, 9);
    }

    #[test]
    fn test_definition_of_local_variable() {
        let source = "\
spell main():
    count = 0
    return count
";
        let file = uri("local.aug");
        let table = table_with(&file, source);

        let location = definition(&table, source, &file, Position::new(2, 13)).unwrap();
        assert_eq!(location.range.start.line, 1);
        assert_eq!(location.range.start.character, 4);
    }

    #[test]
    fn test_unknown_identifier_has_no_definition() {
        let file = uri("none.aug");
        let table = table_with(&file, "x = 1\n");
        assert!(definition(&table, "mystery\n", &file, Position::new(0, 2)).is_none());
    }
}
