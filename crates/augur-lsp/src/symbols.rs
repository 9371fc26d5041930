//! Symbol table and scope resolution
//!
//! The heart of the server: turns a parsed program into a scope-aware
//! symbol table answering position and name queries for every feature.
//!
//! Each file gets an immutable `FileIndex` generation: a scope arena plus
//! the file scope. Rebuilding a file constructs the next generation off to
//! the side and swaps the map entry, so concurrent readers observe either
//! the old or the new generation, never a half-built tree. Scopes reference
//! their parents by arena index; nothing in the tree owns anything else.
//!
//! Lines and columns are 0-based throughout this module, per LSP
//! convention. Parser spans are 1-based and converted on entry.

use std::collections::HashMap;
use std::sync::Arc;

use augur_syntax::ast::*;
use dashmap::DashMap;
use tower_lsp::lsp_types::Url;

/// A declared parameter of a spell or method
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    pub name: String,
    /// Declared type label, if any
    pub type_hint: Option<String>,
    /// Default value source text, if any
    pub default_value: Option<String>,
}

/// Symbol classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    /// Grimoire (class-like) declaration
    Grimoire,
    /// Free function
    Spell,
    /// Grimoire method (including `init`)
    Method,
    /// Grimoire field
    Field,
    /// Local or file-level variable
    Variable,
    /// Spell or method parameter
    Parameter,
    /// Variable known to hold an instance of a specific grimoire
    Instance,
}

/// A named, positioned declaration
#[derive(Debug, Clone)]
pub struct Symbol {
    pub name: String,
    pub kind: SymbolKind,
    /// Owning grimoire name, for members and instance bindings
    pub owner: Option<String>,
    /// Declared or inferred value-type label. Best-effort only; absence
    /// means nothing is known.
    pub value_type: Option<String>,
    /// Docstring text, if the declaration carried one
    pub documentation: Option<String>,
    /// Defining file
    pub uri: Url,
    /// Defining line (0-based)
    pub line: u32,
    /// Defining column (0-based)
    pub column: u32,
    /// Parameter list, for callables
    pub params: Vec<Parameter>,
    /// The scope this symbol opens, for grimoires/spells/methods
    pub scope: Option<ScopeId>,
}

/// A grimoire declaration in the global registry
#[derive(Debug, Clone)]
pub struct GrimoireDecl {
    pub name: String,
    /// Methods in declaration order, `init` included
    pub methods: Vec<Symbol>,
    /// Fields discovered from method-body assignments
    pub fields: Vec<Symbol>,
    /// Single-inheritance parent name, if declared
    pub parent: Option<String>,
    pub documentation: Option<String>,
    pub uri: Url,
    /// Declaration line (0-based)
    pub line: u32,
    /// Declaration column (0-based)
    pub column: u32,
}

/// Stable index of a scope within its file's arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScopeId(u32);

/// A lexical region owning a name → symbol mapping
#[derive(Debug)]
struct ScopeData {
    /// Parent scope, as an arena index; `None` only for the file scope
    parent: Option<ScopeId>,
    symbols: HashMap<String, Symbol>,
    /// First line of the region (0-based)
    start_line: u32,
    /// Last line of the region; `None` means unbounded
    end_line: Option<u32>,
    /// The grimoire this scope belongs to, for grimoire body scopes
    grimoire: Option<String>,
}

impl ScopeData {
    fn contains(&self, line: u32) -> bool {
        line >= self.start_line && self.end_line.map_or(true, |end| line <= end)
    }
}

/// One immutable symbol generation for a single file
#[derive(Debug)]
pub struct FileIndex {
    pub uri: Url,
    arena: Vec<ScopeData>,
    file_scope: ScopeId,
}

impl FileIndex {
    fn scope(&self, id: ScopeId) -> &ScopeData {
        &self.arena[id.0 as usize]
    }

    /// Innermost scope whose line range contains `line`; defaults to the
    /// file scope.
    fn scope_at(&self, line: u32) -> ScopeId {
        let mut best = self.file_scope;
        let mut best_start = 0;
        for (i, scope) in self.arena.iter().enumerate() {
            if ScopeId(i as u32) == self.file_scope {
                continue;
            }
            if scope.contains(line) && scope.start_line >= best_start {
                best = ScopeId(i as u32);
                best_start = scope.start_line;
            }
        }
        best
    }

    /// Depth-first search for `name` through a scope and everything below it
    fn find_in_tree(&self, name: &str, id: ScopeId) -> Option<&Symbol> {
        let scope = self.scope(id);
        if let Some(symbol) = scope.symbols.get(name) {
            return Some(symbol);
        }
        for symbol in scope.symbols.values() {
            if let Some(child) = symbol.scope {
                if let Some(found) = self.find_in_tree(name, child) {
                    return Some(found);
                }
            }
        }
        None
    }
}

/// Process-wide symbol state: one global scope, the grimoire registry,
/// and a generation per file.
///
/// The registry is keyed by name alone; redeclaring a grimoire name (even
/// from another file) overwrites the previous entry. Last write wins.
#[derive(Debug, Default)]
pub struct SymbolTable {
    /// Global scope contents. Present for lookup ordering; nothing in the
    /// baseline server populates it.
    globals: DashMap<String, Symbol>,
    /// name → grimoire declaration, across all files
    grimoires: DashMap<String, Arc<GrimoireDecl>>,
    /// uri → current generation
    files: DashMap<Url, Arc<FileIndex>>,
}

impl SymbolTable {
    /// Create an empty symbol table
    pub fn new() -> Self {
        Self::default()
    }

    /// Discard and rebuild the generation for `uri` from a parsed program.
    ///
    /// Best-effort and infallible: missing information yields symbols with
    /// empty fields. Callers only invoke this after a zero-error parse.
    pub fn rebuild(&self, uri: &Url, program: &Program) {
        let (index, decls) = IndexBuilder::new(uri.clone(), self).build(program);

        // Drop registry entries this file used to own and no longer
        // declares, then install the new declarations (overwriting any
        // same-named entry from another file: last write wins).
        let new_names: std::collections::HashSet<&str> =
            decls.iter().map(|d| d.name.as_str()).collect();
        self.grimoires
            .retain(|name, decl| decl.uri != *uri || new_names.contains(name.as_str()));
        for decl in decls {
            self.grimoires.insert(decl.name.clone(), Arc::new(decl));
        }

        self.files.insert(uri.clone(), Arc::new(index));
    }

    /// Drop all symbol state owned by `uri`
    pub fn evict(&self, uri: &Url) {
        self.files.remove(uri);
        self.grimoires.retain(|_, decl| decl.uri != *uri);
    }

    /// Current generation for a file, if one has been built
    pub fn file_index(&self, uri: &Url) -> Option<Arc<FileIndex>> {
        self.files.get(uri).map(|entry| entry.value().clone())
    }

    /// Flat name lookup: global scope, then the file's top level, then a
    /// depth-first search through every scope tree in the file.
    ///
    /// Not position-aware — when a name is bound in several functions this
    /// returns whichever the search reaches first. Use [`lookup_symbol_at`]
    /// when a cursor position is available.
    ///
    /// [`lookup_symbol_at`]: SymbolTable::lookup_symbol_at
    pub fn lookup_symbol(&self, name: &str, uri: &Url) -> Option<Symbol> {
        if let Some(symbol) = self.globals.get(name) {
            return Some(symbol.value().clone());
        }

        let index = self.file_index(uri)?;
        let file_scope = index.scope(index.file_scope);
        if let Some(symbol) = file_scope.symbols.get(name) {
            return Some(symbol.clone());
        }
        for symbol in file_scope.symbols.values() {
            if let Some(child) = symbol.scope {
                if let Some(found) = index.find_in_tree(name, child) {
                    return Some(found.clone());
                }
            }
        }
        None
    }

    /// Position-aware lookup: walk the scope chain from the scope
    /// containing `line` outward to the file scope, then the global scope,
    /// then fall back to the flat search.
    pub fn lookup_symbol_at(&self, name: &str, uri: &Url, line: u32) -> Option<Symbol> {
        if let Some(index) = self.file_index(uri) {
            let mut current = Some(index.scope_at(line));
            while let Some(id) = current {
                let scope = index.scope(id);
                if let Some(symbol) = scope.symbols.get(name) {
                    return Some(symbol.clone());
                }
                current = scope.parent;
            }
        }
        if let Some(symbol) = self.globals.get(name) {
            return Some(symbol.value().clone());
        }
        self.lookup_symbol(name, uri)
    }

    /// Registry lookup by name, independent of file
    pub fn lookup_grimoire(&self, name: &str) -> Option<Arc<GrimoireDecl>> {
        self.grimoires.get(name).map(|entry| entry.value().clone())
    }

    /// All symbols visible at `line`: the innermost containing scope plus
    /// every ancestor, global scope included. Shadowing is not resolved;
    /// the result may contain duplicate names.
    pub fn symbols_in_scope_at(&self, uri: &Url, line: u32) -> Vec<Symbol> {
        let mut symbols = Vec::new();
        if let Some(index) = self.file_index(uri) {
            let mut current = Some(index.scope_at(line));
            while let Some(id) = current {
                let scope = index.scope(id);
                symbols.extend(scope.symbols.values().cloned());
                current = scope.parent;
            }
        }
        for entry in self.globals.iter() {
            symbols.push(entry.value().clone());
        }
        symbols
    }

    /// The grimoire whose body contains `line`, if any.
    ///
    /// Bounded: a line past the end of a grimoire's scope (the next
    /// top-level declaration, or end of file for the last one) no longer
    /// resolves to it.
    pub fn grimoire_containing_line(&self, uri: &Url, line: u32) -> Option<Arc<GrimoireDecl>> {
        let index = self.file_index(uri)?;

        let mut best: Option<(&ScopeData, &str)> = None;
        for scope in &index.arena {
            let Some(name) = &scope.grimoire else {
                continue;
            };
            if scope.contains(line) && best.map_or(true, |(b, _)| scope.start_line > b.start_line)
            {
                best = Some((scope, name));
            }
        }

        best.and_then(|(_, name)| self.lookup_grimoire(name))
    }

    /// Every globally visible symbol: global scope contents, registered
    /// grimoires, and each grimoire's methods, flattened.
    pub fn global_symbols(&self) -> Vec<Symbol> {
        let mut symbols: Vec<Symbol> = self.globals.iter().map(|e| e.value().clone()).collect();

        for entry in self.grimoires.iter() {
            let decl = entry.value();
            symbols.push(Symbol {
                name: decl.name.clone(),
                kind: SymbolKind::Grimoire,
                owner: None,
                value_type: None,
                documentation: decl.documentation.clone(),
                uri: decl.uri.clone(),
                line: decl.line,
                column: decl.column,
                params: Vec::new(),
                scope: None,
            });
            symbols.extend(decl.methods.iter().cloned());
        }

        symbols
    }
}

// ============================================================================
// Index construction
// ============================================================================

/// Builds one `FileIndex` generation plus the file's grimoire declarations.
struct IndexBuilder<'t> {
    uri: Url,
    arena: Vec<ScopeData>,
    table: &'t SymbolTable,
    /// Grimoire names declared in this file, pre-scanned so constructor
    /// detection is independent of declaration order
    local_grimoires: std::collections::HashSet<String>,
    decls: Vec<GrimoireDecl>,
}

/// 1-based span line → 0-based
fn line0(span: augur_syntax::Span) -> u32 {
    span.start_line.saturating_sub(1)
}

/// 1-based span column → 0-based
fn column0(span: augur_syntax::Span) -> u32 {
    span.start_column.saturating_sub(1)
}

/// Best-effort value-type label for a literal right-hand side
fn literal_label(expr: &Expr) -> Option<&'static str> {
    match expr {
        Expr::Str(..) => Some("string"),
        Expr::Int(..) => Some("int"),
        Expr::Float(..) => Some("float"),
        Expr::Bool(..) => Some("bool"),
        Expr::Array(..) => Some("array"),
        Expr::Hash(..) => Some("hash"),
        Expr::Tuple(..) => Some("tuple"),
        _ => None,
    }
}

impl<'t> IndexBuilder<'t> {
    fn new(uri: Url, table: &'t SymbolTable) -> Self {
        Self {
            uri,
            arena: Vec::new(),
            table,
            local_grimoires: std::collections::HashSet::new(),
            decls: Vec::new(),
        }
    }

    fn build(mut self, program: &Program) -> (FileIndex, Vec<GrimoireDecl>) {
        let file_scope = self.push_scope(None, 0, None, None);

        for stmt in &program.statements {
            if let Stmt::Grimoire(def) = stmt {
                self.local_grimoires.insert(def.name.name.clone());
            }
        }

        // Scope end bounds come from the next top-level declaration; the
        // last declaration's scope stays open-ended.
        let decl_starts: Vec<u32> = program
            .statements
            .iter()
            .filter(|s| matches!(s, Stmt::Grimoire(_) | Stmt::Spell(_)))
            .map(|s| line0(s.span()))
            .collect();
        let bound_after = |start: u32| -> Option<u32> {
            decl_starts
                .iter()
                .copied()
                .filter(|&l| l > start)
                .min()
                .map(|next| next.saturating_sub(1))
        };

        // Declaration pass: grimoires (methods and fields included) and
        // top-level spell signatures.
        for stmt in &program.statements {
            match stmt {
                Stmt::Grimoire(def) => {
                    let bound = bound_after(line0(def.span));
                    self.declare_grimoire(def, file_scope, bound);
                }
                Stmt::Spell(def) => {
                    let bound = bound_after(line0(def.span));
                    self.declare_spell(def, file_scope, bound);
                }
                _ => {}
            }
        }

        // Body pass: spell bodies and top-level statements, now that every
        // grimoire is registered for constructor detection.
        for stmt in &program.statements {
            match stmt {
                Stmt::Spell(def) => {
                    let scope = self.arena[file_scope.0 as usize]
                        .symbols
                        .get(&def.name.name)
                        .and_then(|s| s.scope);
                    if let Some(scope) = scope {
                        self.collect_block(&def.body, scope, None);
                    }
                }
                Stmt::Grimoire(_) => {}
                other => self.collect_stmt(other, file_scope, None),
            }
        }

        let index = FileIndex {
            uri: self.uri,
            arena: self.arena,
            file_scope,
        };
        (index, self.decls)
    }

    fn push_scope(
        &mut self,
        parent: Option<ScopeId>,
        start_line: u32,
        end_line: Option<u32>,
        grimoire: Option<String>,
    ) -> ScopeId {
        let id = ScopeId(self.arena.len() as u32);
        self.arena.push(ScopeData {
            parent,
            symbols: HashMap::new(),
            start_line,
            end_line,
            grimoire,
        });
        id
    }

    fn insert(&mut self, scope: ScopeId, symbol: Symbol) {
        self.arena[scope.0 as usize]
            .symbols
            .insert(symbol.name.clone(), symbol);
    }

    fn params_of(&self, def: &SpellDef) -> Vec<Parameter> {
        def.params
            .iter()
            .map(|p| Parameter {
                name: p.name.name.clone(),
                type_hint: p.type_hint.as_ref().map(|h| h.name.clone()),
                default_value: p.default.as_ref().map(|d| d.to_string()),
            })
            .collect()
    }

    /// Register a grimoire: its symbol, scope, methods, and the fields
    /// discovered from method-body assignments.
    fn declare_grimoire(&mut self, def: &GrimoireDef, file_scope: ScopeId, bound: Option<u32>) {
        let name = def.name.name.clone();
        let line = line0(def.name.span);
        let column = column0(def.name.span);

        let grim_scope = self.push_scope(Some(file_scope), line0(def.span), bound, Some(name.clone()));

        self.decls.push(GrimoireDecl {
            name: name.clone(),
            methods: Vec::new(),
            fields: Vec::new(),
            parent: def.parent.as_ref().map(|p| p.name.clone()),
            documentation: def.doc.clone(),
            uri: self.uri.clone(),
            line,
            column,
        });
        let decl_idx = self.decls.len() - 1;

        // Methods in source order, constructor included, each bounded by
        // the next member's start line.
        let mut members: Vec<&SpellDef> = def.init.iter().chain(def.methods.iter()).collect();
        members.sort_by_key(|m| line0(m.span));
        let member_starts: Vec<u32> = members.iter().map(|m| line0(m.span)).collect();

        for (i, member) in members.iter().enumerate() {
            let member_bound = member_starts
                .get(i + 1)
                .map(|next| next.saturating_sub(1))
                .or(bound);
            let symbol = self.declare_method(member, grim_scope, decl_idx, member_bound);
            self.decls[decl_idx].methods.push(symbol.clone());
            self.insert(grim_scope, symbol);
        }

        let grim_symbol = Symbol {
            name: name.clone(),
            kind: SymbolKind::Grimoire,
            owner: None,
            value_type: None,
            documentation: def.doc.clone(),
            uri: self.uri.clone(),
            line,
            column,
            params: Vec::new(),
            scope: Some(grim_scope),
        };
        self.insert(file_scope, grim_symbol);
    }

    /// Register one method: parameters, `self`, body locals, and any
    /// fields its body assigns.
    fn declare_method(
        &mut self,
        def: &SpellDef,
        grim_scope: ScopeId,
        decl_idx: usize,
        bound: Option<u32>,
    ) -> Symbol {
        let owner = self.decls[decl_idx].name.clone();
        let line = line0(def.name.span);
        let column = column0(def.name.span);
        let params = self.params_of(def);

        let method_scope = self.push_scope(Some(grim_scope), line0(def.span), bound, None);

        self.insert(
            method_scope,
            Symbol {
                name: "self".to_string(),
                kind: SymbolKind::Parameter,
                owner: Some(owner.clone()),
                value_type: Some(owner.clone()),
                documentation: None,
                uri: self.uri.clone(),
                line,
                column,
                params: Vec::new(),
                scope: None,
            },
        );
        self.declare_params(def, method_scope);

        self.collect_block(&def.body, method_scope, Some((decl_idx, grim_scope)));

        Symbol {
            name: def.name.name.clone(),
            kind: SymbolKind::Method,
            owner: Some(owner),
            value_type: None,
            documentation: def.doc.clone(),
            uri: self.uri.clone(),
            line,
            column,
            params,
            scope: Some(method_scope),
        }
    }

    /// Register a top-level spell's symbol, scope, and parameters; the
    /// body is walked in the second pass.
    fn declare_spell(&mut self, def: &SpellDef, file_scope: ScopeId, bound: Option<u32>) {
        let line = line0(def.name.span);
        let column = column0(def.name.span);
        let params = self.params_of(def);

        let spell_scope = self.push_scope(Some(file_scope), line0(def.span), bound, None);
        self.declare_params(def, spell_scope);

        self.insert(
            file_scope,
            Symbol {
                name: def.name.name.clone(),
                kind: SymbolKind::Spell,
                owner: None,
                value_type: None,
                documentation: def.doc.clone(),
                uri: self.uri.clone(),
                line,
                column,
                params,
                scope: Some(spell_scope),
            },
        );
    }

    fn declare_params(&mut self, def: &SpellDef, scope: ScopeId) {
        for param in &def.params {
            self.insert(
                scope,
                Symbol {
                    name: param.name.name.clone(),
                    kind: SymbolKind::Parameter,
                    owner: None,
                    value_type: param.type_hint.as_ref().map(|h| h.name.clone()),
                    documentation: None,
                    uri: self.uri.clone(),
                    line: line0(param.name.span),
                    column: column0(param.name.span),
                    params: Vec::new(),
                    scope: None,
                },
            );
        }
    }

    /// RHS of the form `Name(...)` where `Name` is a known grimoire
    fn constructor_class(&self, expr: &Expr) -> Option<String> {
        if let Expr::Call { callee, .. } = expr {
            if let Expr::Ident(ident) = callee.as_ref() {
                if self.local_grimoires.contains(&ident.name)
                    || self.table.grimoires.contains_key(&ident.name)
                {
                    return Some(ident.name.clone());
                }
            }
        }
        None
    }

    fn collect_block(
        &mut self,
        block: &Block,
        scope: ScopeId,
        field_ctx: Option<(usize, ScopeId)>,
    ) {
        for stmt in &block.statements {
            self.collect_stmt(stmt, scope, field_ctx);
        }
    }

    /// Walk a statement collecting locals, loop bindings, exception
    /// aliases — and, inside method bodies, grimoire fields.
    ///
    /// Control-structure blocks flatten into the enclosing function scope;
    /// only nested spells introduce a deeper scope (and end field
    /// collection for their extent).
    fn collect_stmt(&mut self, stmt: &Stmt, scope: ScopeId, field_ctx: Option<(usize, ScopeId)>) {
        match stmt {
            Stmt::Assign(assign) => self.collect_assign(assign, scope, field_ctx),

            Stmt::If(stmt) => {
                self.collect_block(&stmt.consequence, scope, field_ctx);
                for branch in &stmt.otherwise {
                    self.collect_block(&branch.body, scope, field_ctx);
                }
                if let Some(alternative) = &stmt.alternative {
                    self.collect_block(alternative, scope, field_ctx);
                }
            }

            Stmt::For(stmt) => {
                let names: Vec<&Identifier> = match &stmt.target {
                    ForTarget::Name(name) => vec![name],
                    ForTarget::Tuple(names) => names.iter().collect(),
                };
                for name in names {
                    let symbol = Symbol {
                        name: name.name.clone(),
                        kind: SymbolKind::Variable,
                        owner: None,
                        value_type: None,
                        documentation: None,
                        uri: self.uri.clone(),
                        line: line0(name.span),
                        column: column0(name.span),
                        params: Vec::new(),
                        scope: None,
                    };
                    self.insert(scope, symbol);
                }
                self.collect_block(&stmt.body, scope, field_ctx);
                if let Some(alternative) = &stmt.alternative {
                    self.collect_block(alternative, scope, field_ctx);
                }
            }

            Stmt::While(stmt) => self.collect_block(&stmt.body, scope, field_ctx),

            Stmt::Match(stmt) => {
                for arm in &stmt.arms {
                    self.collect_block(&arm.body, scope, field_ctx);
                }
            }

            Stmt::Attempt(stmt) => {
                self.collect_block(&stmt.body, scope, field_ctx);
                for clause in &stmt.ensnares {
                    if let Some(alias) = &clause.alias {
                        let symbol = Symbol {
                            name: alias.name.clone(),
                            kind: SymbolKind::Variable,
                            owner: None,
                            value_type: clause.error.as_ref().map(|e| e.name.clone()),
                            documentation: None,
                            uri: self.uri.clone(),
                            line: line0(alias.span),
                            column: column0(alias.span),
                            params: Vec::new(),
                            scope: None,
                        };
                        self.insert(scope, symbol);
                    }
                    self.collect_block(&clause.body, scope, field_ctx);
                }
                if let Some(resolve) = &stmt.resolve {
                    self.collect_block(resolve, scope, field_ctx);
                }
            }

            // A nested spell opens its own scope and shields its body from
            // field discovery.
            Stmt::Spell(def) => {
                let line = line0(def.name.span);
                let column = column0(def.name.span);
                let params = self.params_of(def);
                let end = Some(def.span.end_line.saturating_sub(1));

                let nested_scope = self.push_scope(Some(scope), line0(def.span), end, None);
                self.declare_params(def, nested_scope);
                self.collect_block(&def.body, nested_scope, None);

                self.insert(
                    scope,
                    Symbol {
                        name: def.name.name.clone(),
                        kind: SymbolKind::Spell,
                        owner: None,
                        value_type: None,
                        documentation: def.doc.clone(),
                        uri: self.uri.clone(),
                        line,
                        column,
                        params,
                        scope: Some(nested_scope),
                    },
                );
            }

            // Nested grimoires are not part of the simplified model
            Stmt::Grimoire(_) => {}

            Stmt::Return(_)
            | Stmt::Raise(_)
            | Stmt::Import(_)
            | Stmt::Check(_)
            | Stmt::Skip(_)
            | Stmt::Stop(_)
            | Stmt::Ignore(_)
            | Stmt::Expr(_) => {}
        }
    }

    fn collect_assign(
        &mut self,
        assign: &AssignStmt,
        scope: ScopeId,
        field_ctx: Option<(usize, ScopeId)>,
    ) {
        let name = match &assign.target {
            AssignTarget::Name(name) => name,
            // `self.x = expr` inside a method also declares a field
            AssignTarget::Member {
                object: Expr::SelfRef(_),
                property,
                ..
            } if field_ctx.is_some() => property,
            // Other member and index assignments bind nothing new
            _ => return,
        };

        if let Some((decl_idx, grim_scope)) = field_ctx {
            // Inside a method body every simple `name = expr` assignment
            // declares a field of the owning grimoire.
            let owner = self.decls[decl_idx].name.clone();
            let value_type = assign
                .type_hint
                .as_ref()
                .map(|h| h.name.clone())
                .or_else(|| self.constructor_class(&assign.value))
                .or_else(|| literal_label(&assign.value).map(str::to_string));
            let symbol = Symbol {
                name: name.name.clone(),
                kind: SymbolKind::Field,
                owner: Some(owner),
                value_type,
                documentation: None,
                uri: self.uri.clone(),
                line: line0(name.span),
                column: column0(name.span),
                params: Vec::new(),
                scope: None,
            };

            let fields = &mut self.decls[decl_idx].fields;
            match fields.iter_mut().find(|f| f.name == symbol.name) {
                Some(existing) => *existing = symbol.clone(),
                None => fields.push(symbol.clone()),
            }
            self.insert(grim_scope, symbol);
            return;
        }

        let constructor = self.constructor_class(&assign.value);
        let kind = if constructor.is_some() {
            SymbolKind::Instance
        } else {
            SymbolKind::Variable
        };
        let value_type = assign
            .type_hint
            .as_ref()
            .map(|h| h.name.clone())
            .or_else(|| constructor.clone())
            .or_else(|| literal_label(&assign.value).map(str::to_string));

        self.insert(
            scope,
            Symbol {
                name: name.name.clone(),
                kind,
                owner: constructor,
                value_type,
                documentation: None,
                uri: self.uri.clone(),
                line: line0(name.span),
                column: column0(name.span),
                params: Vec::new(),
                scope: None,
            },
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use augur_syntax::parse_source;

    fn uri(path: &str) -> Url {
        Url::parse(&format!("file:///{path}")).unwrap()
    }

    fn build(table: &SymbolTable, uri: &Url, source: &str) {
        let (program, errors) = parse_source(source);
        assert!(errors.is_empty(), "unexpected parse errors: {errors:?}");
        table.rebuild(uri, &program);
    }

    const DRAGON: &str = "\
grim Dragon:
    \"\"\"A winged menace.\"\"\"
    init(name, health = 100):
        self.kind = \"dragon\"
        rage = 0

    spell roar(volume: int = 10):
        return volume

spell tame(dragon):
    leash = \"rope\"
    return dragon
";

    #[test]
    fn test_rebuild_registers_grimoire_with_members() {
        let table = SymbolTable::new();
        let file = uri("dragon.aug");
        build(&table, &file, DRAGON);

        let decl = table.lookup_grimoire("Dragon").expect("Dragon registered");
        let methods: Vec<&str> = decl.methods.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(methods, vec!["init", "roar"]);
        let fields: Vec<&str> = decl.fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(fields, vec!["kind", "rage"]);
        for member in decl.methods.iter().chain(decl.fields.iter()) {
            assert_eq!(member.owner.as_deref(), Some("Dragon"));
        }
    }

    #[test]
    fn test_method_parameter_defaults_round_trip() {
        let table = SymbolTable::new();
        let file = uri("foo.aug");
        build(
            &table,
            &file,
            "grim Foo:\n    spell bar(x, y=5):\n        return x\n",
        );

        let bar = table.lookup_symbol("bar", &file).expect("bar resolves");
        assert_eq!(bar.kind, SymbolKind::Method);
        assert_eq!(bar.params.len(), 2);
        assert_eq!(bar.params[0].name, "x");
        assert_eq!(bar.params[1].name, "y");
        assert_eq!(bar.params[1].default_value.as_deref(), Some("5"));
    }

    #[test]
    fn test_definition_line_is_zero_based() {
        // Dragon's declaration starts on source line 10 (1-based).
        let mut source = String::new();
        for i in 1..=9 {
            source.push_str(&format!("x{i} = {i}\n"));
        }
        source.push_str("grim Dragon:\n    spell fly():\n        return 1\n");

        let table = SymbolTable::new();
        let file = uri("pos.aug");
        build(&table, &file, &source);

        let dragon = table.lookup_symbol("Dragon", &file).expect("resolves");
        assert_eq!(dragon.line, 9);
    }

    #[test]
    fn test_symbols_before_declarations_see_only_file_scope() {
        let table = SymbolTable::new();
        let file = uri("lead.aug");
        let source = format!("seen = 1\n\n{DRAGON}");
        build(&table, &file, &source);

        // Line 0 precedes every declaration: no function locals may leak.
        let visible = table.symbols_in_scope_at(&file, 0);
        assert!(
            visible.iter().all(|s| !matches!(
                s.name.as_str(),
                "rage" | "leash" | "volume" | "name" | "health" | "self"
            )),
            "locals leaked into file scope: {visible:?}"
        );
        assert!(visible.iter().any(|s| s.name == "seen"));
        assert!(visible.iter().any(|s| s.name == "Dragon"));
        assert!(visible.iter().any(|s| s.name == "tame"));
    }

    #[test]
    fn test_locals_visible_inside_their_spell() {
        let table = SymbolTable::new();
        let file = uri("locals.aug");
        build(&table, &file, DRAGON);

        // Line 10 (0-based) is inside `tame`.
        let visible = table.symbols_in_scope_at(&file, 10);
        assert!(visible.iter().any(|s| s.name == "leash"));
        assert!(visible.iter().any(|s| s.name == "dragon"));
        // Ancestors are included too.
        assert!(visible.iter().any(|s| s.name == "Dragon"));
    }

    #[test]
    fn test_rebuild_is_idempotent() {
        let table = SymbolTable::new();
        let file = uri("idem.aug");
        let (program, errors) = parse_source(DRAGON);
        assert!(errors.is_empty());

        table.rebuild(&file, &program);
        let first: Vec<String> = {
            let mut names: Vec<String> = table
                .global_symbols()
                .iter()
                .map(|s| format!("{}:{:?}", s.name, s.kind))
                .collect();
            names.sort();
            names
        };
        let roar_before = table.lookup_symbol("roar", &file).unwrap();

        table.rebuild(&file, &program);
        let second: Vec<String> = {
            let mut names: Vec<String> = table
                .global_symbols()
                .iter()
                .map(|s| format!("{}:{:?}", s.name, s.kind))
                .collect();
            names.sort();
            names
        };
        let roar_after = table.lookup_symbol("roar", &file).unwrap();

        assert_eq!(first, second);
        assert_eq!(roar_before.line, roar_after.line);
        assert_eq!(roar_before.params.len(), roar_after.params.len());
    }

    #[test]
    fn test_global_symbols_scenario() {
        let table = SymbolTable::new();
        let file = uri("scenario.aug");
        build(
            &table,
            &file,
            "grim Foo:\n    spell bar(x):\n        return x\n",
        );

        let globals = table.global_symbols();
        let foo = globals
            .iter()
            .find(|s| s.name == "Foo")
            .expect("Foo in global symbols");
        assert_eq!(foo.kind, SymbolKind::Grimoire);

        let bar = globals
            .iter()
            .find(|s| s.name == "bar")
            .expect("bar in global symbols");
        assert_eq!(bar.kind, SymbolKind::Method);
        assert_eq!(bar.owner.as_deref(), Some("Foo"));
    }

    #[test]
    fn test_instance_binding_from_constructor_call() {
        let table = SymbolTable::new();
        let file = uri("inst.aug");
        build(
            &table,
            &file,
            "grim Dragon:\n    spell roar():\n        return 1\n\nspell main():\n    pet = Dragon()\n    n = 3\n",
        );

        let pet = table.lookup_symbol("pet", &file).expect("pet resolves");
        assert_eq!(pet.kind, SymbolKind::Instance);
        assert_eq!(pet.owner.as_deref(), Some("Dragon"));

        let n = table.lookup_symbol("n", &file).expect("n resolves");
        assert_eq!(n.kind, SymbolKind::Variable);
        assert_eq!(n.value_type.as_deref(), Some("int"));
    }

    #[test]
    fn test_instance_binding_before_declaration_order() {
        // The constructor pre-scan makes detection independent of
        // declaration order within the file.
        let table = SymbolTable::new();
        let file = uri("order.aug");
        build(
            &table,
            &file,
            "spell main():\n    pet = Wyrm()\n\ngrim Wyrm:\n    spell hiss():\n        return 1\n",
        );

        let pet = table.lookup_symbol("pet", &file).expect("pet resolves");
        assert_eq!(pet.kind, SymbolKind::Instance);
        assert_eq!(pet.owner.as_deref(), Some("Wyrm"));
    }

    #[test]
    fn test_lookup_symbol_at_resolves_shadowing() {
        let source = "\
spell first():
    shade = 1
    return shade

spell second():
    shade = 2
    return shade
";
        let table = SymbolTable::new();
        let file = uri("shadow.aug");
        build(&table, &file, source);

        // 0-based: line 1 is inside `first`, line 5 inside `second`.
        let in_first = table.lookup_symbol_at("shade", &file, 1).unwrap();
        assert_eq!(in_first.line, 1);
        let in_second = table.lookup_symbol_at("shade", &file, 5).unwrap();
        assert_eq!(in_second.line, 5);
    }

    #[test]
    fn test_grimoire_containing_line_is_bounded() {
        let source = "\
grim First:
    spell a():
        return 1

grim Second:
    spell b():
        return 2

spell trailing():
    return 3
";
        let table = SymbolTable::new();
        let file = uri("bounds.aug");
        build(&table, &file, source);

        // 0-based line 1 is inside First's body.
        let first = table.grimoire_containing_line(&file, 1).unwrap();
        assert_eq!(first.name, "First");

        // Line 5 is inside Second.
        let second = table.grimoire_containing_line(&file, 5).unwrap();
        assert_eq!(second.name, "Second");

        // Line 9 is inside the trailing spell, past Second's scope.
        assert!(table.grimoire_containing_line(&file, 9).is_none());
    }

    #[test]
    fn test_rebuild_does_not_disturb_other_files() {
        let table = SymbolTable::new();
        let a = uri("a.aug");
        let b = uri("b.aug");
        build(&table, &a, "grim Alpha:\n    spell x():\n        return 1\n");
        build(&table, &b, "grim Beta:\n    spell y():\n        return 2\n");

        let alpha_before = table.lookup_symbol("Alpha", &a).unwrap();

        // Rebuild B with different contents; A must be untouched.
        build(&table, &b, "grim Gamma:\n    spell z():\n        return 3\n");

        let alpha_after = table.lookup_symbol("Alpha", &a).unwrap();
        assert_eq!(alpha_before.line, alpha_after.line);
        assert!(table.lookup_grimoire("Alpha").is_some());
        assert!(table.lookup_grimoire("Gamma").is_some());
        assert!(
            table.lookup_grimoire("Beta").is_none(),
            "stale registry entry for b.aug should be replaced"
        );
    }

    #[test]
    fn test_registry_last_write_wins_across_files() {
        let table = SymbolTable::new();
        let a = uri("a.aug");
        let b = uri("b.aug");
        build(&table, &a, "grim Shared:\n    spell from_a():\n        return 1\n");
        build(&table, &b, "grim Shared:\n    spell from_b():\n        return 2\n");

        let shared = table.lookup_grimoire("Shared").unwrap();
        assert_eq!(shared.uri, b);
        assert_eq!(shared.methods[0].name, "from_b");
    }

    #[test]
    fn test_evict_drops_file_state() {
        let table = SymbolTable::new();
        let file = uri("gone.aug");
        build(&table, &file, DRAGON);
        assert!(table.lookup_grimoire("Dragon").is_some());

        table.evict(&file);
        assert!(table.lookup_symbol("Dragon", &file).is_none());
        assert!(table.lookup_grimoire("Dragon").is_none());
        assert!(table.file_index(&file).is_none());
    }

    #[test]
    fn test_field_from_typed_and_constructor_assignments() {
        let source = "\
grim Lair:
    spell fill():
        depth: int = 3
        guard = Dragon()

grim Dragon:
    spell roar():
        return 1
";
        let table = SymbolTable::new();
        let file = uri("fields.aug");
        build(&table, &file, source);

        let lair = table.lookup_grimoire("Lair").unwrap();
        let depth = lair.fields.iter().find(|f| f.name == "depth").unwrap();
        assert_eq!(depth.value_type.as_deref(), Some("int"));
        let guard = lair.fields.iter().find(|f| f.name == "guard").unwrap();
        assert_eq!(guard.value_type.as_deref(), Some("Dragon"));
    }

    #[test]
    fn test_loop_and_ensnare_bindings_collected() {
        let source = "\
spell sweep(rooms):
    for room, size in rooms:
        total = size
    attempt:
        open(rooms)
    ensnare Error as problem:
        total = 0
    return total
";
        let table = SymbolTable::new();
        let file = uri("loops.aug");
        build(&table, &file, source);

        for name in ["room", "size", "total", "problem"] {
            let symbol = table.lookup_symbol(name, &file).unwrap_or_else(|| {
                panic!("{name} should be collected");
            });
            assert_eq!(symbol.kind, SymbolKind::Variable, "{name}");
        }
    }

    #[test]
    fn test_stale_generation_served_until_next_rebuild() {
        let table = SymbolTable::new();
        let file = uri("stale.aug");
        build(&table, &file, "grim Keep:\n    spell hold():\n        return 1\n");

        // A failed parse never reaches rebuild; the old generation stays.
        assert!(table.lookup_symbol("Keep", &file).is_some());
    }
}
