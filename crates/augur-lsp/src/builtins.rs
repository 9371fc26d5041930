//! Fixed language tables
//!
//! Keywords, builtin function signatures, builtin namespaces, and the
//! method tables behind the best-effort member classifier. These are data,
//! not analysis: the completion/hover/signature services consult them when
//! the symbol table has nothing better to offer.

/// All Augur keywords, for free completion
pub const KEYWORDS: &[&str] = &[
    "grim",
    "spell",
    "init",
    "self",
    "if",
    "otherwise",
    "else",
    "for",
    "in",
    "while",
    "stop",
    "skip",
    "ignore",
    "return",
    "import",
    "match",
    "case",
    "attempt",
    "ensnare",
    "resolve",
    "raise",
    "as",
    "arcane",
    "arcanespell",
    "super",
    "check",
    "and",
    "or",
    "not",
    "True",
    "False",
    "None",
];

/// Hover text for a keyword
pub fn keyword_doc(word: &str) -> Option<&'static str> {
    let doc = match word {
        "grim" => "**grim** — declares a grimoire, Augur's class-like construct.",
        "spell" => "**spell** — declares a function or method.",
        "init" => "**init** — the constructor of a grimoire, run when an instance is created.",
        "self" => "**self** — the current instance, available inside grimoire methods.",
        "if" => "**if** — runs a block when its condition holds.",
        "otherwise" => "**otherwise** — a further condition in an if-chain.",
        "else" => "**else** — the fallback block of an if-chain or loop.",
        "for" => "**for** — iterates over a sequence, binding each element.",
        "in" => "**in** — names the sequence of a for loop, or tests membership.",
        "while" => "**while** — repeats a block while its condition holds.",
        "stop" => "**stop** — exits the enclosing loop.",
        "skip" => "**skip** — jumps to the next loop iteration.",
        "ignore" => "**ignore** — does nothing; a placeholder statement.",
        "return" => "**return** — leaves the enclosing spell with an optional value.",
        "import" => "**import** — brings another module's names into scope.",
        "match" => "**match** — selects a case arm by value.",
        "case" => "**case** — one arm of a match; `case _` catches everything.",
        "attempt" => "**attempt** — opens a block whose errors can be ensnared.",
        "ensnare" => "**ensnare** — catches an error raised in an attempt block.",
        "resolve" => "**resolve** — always runs after an attempt, error or not.",
        "raise" => "**raise** — throws an error value.",
        "as" => "**as** — names an import or a caught error.",
        "arcane" => "**arcane** — marks a grimoire abstract; it cannot be instantiated.",
        "arcanespell" => "**arcanespell** — declares an abstract method for heirs to define.",
        "super" => "**super** — the parent grimoire's implementation.",
        "check" => "**check** — asserts that a condition holds.",
        "and" => "**and** — logical conjunction.",
        "or" => "**or** — logical disjunction.",
        "not" => "**not** — logical negation.",
        "True" => "**True** — the boolean truth value.",
        "False" => "**False** — the boolean false value.",
        "None" => "**None** — the absence of a value.",
        _ => return None,
    };
    Some(doc)
}

/// A builtin function's signature for completion and signature help
#[derive(Debug, Clone, Copy)]
pub struct BuiltinFunction {
    pub name: &'static str,
    pub signature: &'static str,
    pub doc: &'static str,
    pub params: &'static [&'static str],
}

/// Builtin free functions
pub const BUILTIN_FUNCTIONS: &[BuiltinFunction] = &[
    BuiltinFunction {
        name: "print",
        signature: "print(...args)",
        doc: "Writes its arguments to standard output.",
        params: &["...args"],
    },
    BuiltinFunction {
        name: "len",
        signature: "len(object) -> int",
        doc: "Length of a string, array, tuple, or hash.",
        params: &["object"],
    },
    BuiltinFunction {
        name: "input",
        signature: "input(prompt?) -> string",
        doc: "Reads a line from standard input.",
        params: &["prompt?"],
    },
    BuiltinFunction {
        name: "int",
        signature: "int(value) -> int",
        doc: "Converts a value to an integer.",
        params: &["value"],
    },
    BuiltinFunction {
        name: "float",
        signature: "float(value) -> float",
        doc: "Converts a value to a float.",
        params: &["value"],
    },
    BuiltinFunction {
        name: "str",
        signature: "str(value) -> string",
        doc: "Converts a value to a string.",
        params: &["value"],
    },
    BuiltinFunction {
        name: "type",
        signature: "type(object) -> string",
        doc: "Name of a value's type.",
        params: &["object"],
    },
    BuiltinFunction {
        name: "range",
        signature: "range(start, end?, step?) -> array",
        doc: "Array of integers from start to end.",
        params: &["start", "end?", "step?"],
    },
    BuiltinFunction {
        name: "enumerate",
        signature: "enumerate(iterable) -> array",
        doc: "Array of [index, value] pairs.",
        params: &["iterable"],
    },
    BuiltinFunction {
        name: "help",
        signature: "help() -> string",
        doc: "Interpreter help text.",
        params: &[],
    },
    BuiltinFunction {
        name: "version",
        signature: "version() -> string",
        doc: "Interpreter version string.",
        params: &[],
    },
    BuiltinFunction {
        name: "modules",
        signature: "modules() -> string",
        doc: "Names of the available builtin modules.",
        params: &[],
    },
];

/// Look up a builtin function by name
pub fn builtin_function(name: &str) -> Option<&'static BuiltinFunction> {
    BUILTIN_FUNCTIONS.iter().find(|f| f.name == name)
}

/// A member of a builtin namespace or standard object category
#[derive(Debug, Clone, Copy)]
pub struct BuiltinMember {
    pub name: &'static str,
    pub signature: &'static str,
    pub doc: &'static str,
}

/// A module-like namespace addressed by exact identifier (`os.`, `file.`)
#[derive(Debug, Clone, Copy)]
pub struct BuiltinNamespace {
    pub name: &'static str,
    pub doc: &'static str,
    pub members: &'static [BuiltinMember],
}

/// Builtin namespaces
pub const BUILTIN_NAMESPACES: &[BuiltinNamespace] = &[
    BuiltinNamespace {
        name: "os",
        doc: "Operating system access.",
        members: &[
            BuiltinMember {
                name: "cwd",
                signature: "os.cwd() -> string",
                doc: "Current working directory.",
            },
            BuiltinMember {
                name: "env",
                signature: "os.env(name) -> string",
                doc: "Value of an environment variable.",
            },
            BuiltinMember {
                name: "run",
                signature: "os.run(command) -> string",
                doc: "Runs a shell command and returns its output.",
            },
            BuiltinMember {
                name: "sleep",
                signature: "os.sleep(seconds)",
                doc: "Pauses execution.",
            },
        ],
    },
    BuiltinNamespace {
        name: "file",
        doc: "File system access.",
        members: &[
            BuiltinMember {
                name: "read",
                signature: "file.read(path) -> string",
                doc: "Reads a whole file.",
            },
            BuiltinMember {
                name: "write",
                signature: "file.write(path, content)",
                doc: "Writes a whole file.",
            },
            BuiltinMember {
                name: "append",
                signature: "file.append(path, content)",
                doc: "Appends to a file.",
            },
            BuiltinMember {
                name: "exists",
                signature: "file.exists(path) -> bool",
                doc: "Whether a path exists.",
            },
        ],
    },
    BuiltinNamespace {
        name: "time",
        doc: "Clock and calendar access.",
        members: &[
            BuiltinMember {
                name: "now",
                signature: "time.now() -> int",
                doc: "Seconds since the epoch.",
            },
            BuiltinMember {
                name: "date",
                signature: "time.date(format?) -> string",
                doc: "Formatted current date.",
            },
            BuiltinMember {
                name: "sleep",
                signature: "time.sleep(seconds)",
                doc: "Pauses execution.",
            },
        ],
    },
];

/// Look up a builtin namespace by exact identifier
pub fn builtin_namespace(name: &str) -> Option<&'static BuiltinNamespace> {
    BUILTIN_NAMESPACES.iter().find(|n| n.name == name)
}

/// Methods on string-like values
pub const STRING_METHODS: &[BuiltinMember] = &[
    BuiltinMember {
        name: "length",
        signature: "length() -> int",
        doc: "Number of characters.",
    },
    BuiltinMember {
        name: "upper",
        signature: "upper() -> string",
        doc: "Uppercased copy.",
    },
    BuiltinMember {
        name: "lower",
        signature: "lower() -> string",
        doc: "Lowercased copy.",
    },
    BuiltinMember {
        name: "strip",
        signature: "strip() -> string",
        doc: "Copy without surrounding whitespace.",
    },
    BuiltinMember {
        name: "split",
        signature: "split(separator) -> array",
        doc: "Pieces between separators.",
    },
    BuiltinMember {
        name: "find",
        signature: "find(needle) -> int",
        doc: "Index of the first occurrence, or -1.",
    },
    BuiltinMember {
        name: "replace",
        signature: "replace(from, to) -> string",
        doc: "Copy with occurrences substituted.",
    },
    BuiltinMember {
        name: "contains",
        signature: "contains(needle) -> bool",
        doc: "Whether the needle occurs.",
    },
    BuiltinMember {
        name: "chars",
        signature: "chars() -> array",
        doc: "Characters as an array.",
    },
    BuiltinMember {
        name: "reverse",
        signature: "reverse() -> string",
        doc: "Reversed copy.",
    },
];

/// Methods on array-like values
pub const ARRAY_METHODS: &[BuiltinMember] = &[
    BuiltinMember {
        name: "length",
        signature: "length() -> int",
        doc: "Number of elements.",
    },
    BuiltinMember {
        name: "append",
        signature: "append(value)",
        doc: "Adds a value at the end.",
    },
    BuiltinMember {
        name: "pop",
        signature: "pop() -> value",
        doc: "Removes and returns the last element.",
    },
    BuiltinMember {
        name: "first",
        signature: "first() -> value",
        doc: "The first element.",
    },
    BuiltinMember {
        name: "last",
        signature: "last() -> value",
        doc: "The last element.",
    },
    BuiltinMember {
        name: "sort",
        signature: "sort() -> array",
        doc: "Sorted copy.",
    },
    BuiltinMember {
        name: "reverse",
        signature: "reverse() -> array",
        doc: "Reversed copy.",
    },
    BuiltinMember {
        name: "contains",
        signature: "contains(value) -> bool",
        doc: "Whether the value occurs.",
    },
];

/// Methods on hash-like values
pub const HASH_METHODS: &[BuiltinMember] = &[
    BuiltinMember {
        name: "keys",
        signature: "keys() -> array",
        doc: "All keys.",
    },
    BuiltinMember {
        name: "values",
        signature: "values() -> array",
        doc: "All values.",
    },
    BuiltinMember {
        name: "get",
        signature: "get(key, default?) -> value",
        doc: "Value for a key, or the default.",
    },
    BuiltinMember {
        name: "set",
        signature: "set(key, value)",
        doc: "Stores a value under a key.",
    },
    BuiltinMember {
        name: "remove",
        signature: "remove(key)",
        doc: "Drops a key.",
    },
    BuiltinMember {
        name: "contains",
        signature: "contains(key) -> bool",
        doc: "Whether the key is present.",
    },
];

/// Method table for a value-type label, when the label names one of the
/// standard object categories
pub fn methods_for_label(label: &str) -> Option<&'static [BuiltinMember]> {
    match label {
        "string" | "str" => Some(STRING_METHODS),
        "array" | "list" => Some(ARRAY_METHODS),
        "hash" | "map" | "dict" => Some(HASH_METHODS),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_doc_covers_all_keywords() {
        for keyword in KEYWORDS {
            assert!(
                keyword_doc(keyword).is_some(),
                "missing hover text for keyword {keyword}"
            );
        }
    }

    #[test]
    fn test_builtin_function_lookup() {
        assert!(builtin_function("len").is_some());
        assert!(builtin_function("nonesuch").is_none());
    }

    #[test]
    fn test_label_method_tables() {
        assert!(methods_for_label("string").is_some());
        assert!(methods_for_label("array").is_some());
        assert!(methods_for_label("hash").is_some());
        assert!(methods_for_label("Dragon").is_none());
    }
}
