//! Whole-document formatting
//!
//! A line-based normalizer: indentation is re-emitted in 4-space units via
//! an indent-width stack, trailing whitespace is stripped, and comma
//! spacing is normalized outside string literals. Documents that fail to
//! parse are refused — reshaping broken code helps nobody.

use tower_lsp::lsp_types::{Position, Range, TextEdit};
use tracing::debug;

use crate::analysis::parse_document;

/// Indentation unit in the formatted output
const INDENT: &str = "    ";

/// Formatting edits for a document: a single whole-document replacement,
/// or `None` when the text has parse errors or is already formatted.
pub fn format_edits(text: &str) -> Option<Vec<TextEdit>> {
    let (_, errors) = parse_document(text);
    if !errors.is_empty() {
        debug!(count = errors.len(), "refusing to format a broken document");
        return None;
    }

    let formatted = format_text(text);
    if formatted == text {
        return None;
    }

    Some(vec![TextEdit {
        range: Range {
            start: Position::new(0, 0),
            end: end_position(text),
        },
        new_text: formatted,
    }])
}

/// Position one past the last character of the document
fn end_position(text: &str) -> Position {
    let line_count = text.split('\n').count() as u32;
    let last_len = text.split('\n').next_back().map_or(0, |l| l.chars().count()) as u32;
    Position::new(line_count.saturating_sub(1), last_len)
}

/// Normalize a whole document
pub fn format_text(text: &str) -> String {
    let mut output = String::with_capacity(text.len());
    // Stack of original indent widths; index in the stack is the depth
    let mut widths: Vec<u32> = vec![0];

    for line in text.split('\n') {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            output.push('\n');
            continue;
        }

        let width = indent_width(line);
        let top = *widths.last().unwrap_or(&0);
        if width > top {
            widths.push(width);
        } else if width < top {
            while widths.last().is_some_and(|&w| w > width) {
                widths.pop();
            }
            // A width between two recorded levels maps to the level below
            if *widths.last().unwrap_or(&0) != width {
                widths.push(width);
            }
        }
        let depth = widths.len() - 1;

        for _ in 0..depth {
            output.push_str(INDENT);
        }
        output.push_str(&normalize_commas(trimmed));
        output.push('\n');
    }

    // Exactly one trailing newline
    while output.ends_with("\n\n") {
        output.pop();
    }
    if !output.ends_with('\n') {
        output.push('\n');
    }
    output
}

/// Leading whitespace width; tabs advance to the next multiple of 8
fn indent_width(line: &str) -> u32 {
    let mut width = 0u32;
    for c in line.chars() {
        match c {
            ' ' => width += 1,
            '\t' => width = (width / 8 + 1) * 8,
            _ => break,
        }
    }
    width
}

/// `a,b` → `a, b`, leaving string literals untouched
fn normalize_commas(line: &str) -> String {
    let mut output = String::with_capacity(line.len());
    let mut quote: Option<char> = None;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match quote {
            Some(q) => {
                output.push(c);
                if c == '\\' {
                    if let Some(escaped) = chars.next() {
                        output.push(escaped);
                    }
                } else if c == q {
                    quote = None;
                }
            }
            None => match c {
                '"' | '\'' => {
                    quote = Some(c);
                    output.push(c);
                }
                ',' => {
                    while output.ends_with(' ') {
                        output.pop();
                    }
                    output.push(',');
                    if chars.peek().is_some_and(|&next| next != ' ' && next != '\n') {
                        output.push(' ');
                    }
                }
                _ => output.push(c),
            },
        }
    }

    output.trim_end().to_string()
}
