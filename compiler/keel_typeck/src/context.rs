//! The typechecking context.
//!
//! One value owning every store of the compilation unit: the identifier
//! pool, the three slabs (nodes, symbols, types), the scope stack, the
//! diagnostic queue, the registered user converters and the generic
//! instantiation cache. Everything in this crate operates on `&mut
//! Context`, splitting borrows at field granularity.

use keel_diagnostic::{DiagKind, DiagnosticQueue};
use keel_ir::{
    FileTable, Interner, Loc, Name, Node, NodeArena, NodeId, NodeKind, NodePayload, SymArena,
    SymId, TypeId,
};
use keel_table::ScopeStack;
use keel_types::{TypeFormatter, TypePool};
use rustc_hash::FxHashMap;

/// Cache key for generic instantiation: the generic symbol plus its
/// normalised bindings (sorted by generic-parameter id).
pub(crate) type InstanceKey = (SymId, Vec<(u32, u32)>);

/// Everything semantic analysis reads and writes.
pub struct Context {
    pub interner: Interner,
    pub files: FileTable,
    pub nodes: NodeArena,
    pub syms: SymArena,
    pub types: TypePool,
    pub diags: DiagnosticQueue,
    pub scopes: ScopeStack,
    /// User converters in registration order.
    pub converters: Vec<SymId>,
    /// Instantiated generics, to prevent exponential re-instantiation.
    pub(crate) instances: FxHashMap<InstanceKey, SymId>,
}

impl Context {
    /// A fresh unit with the import and module scopes already open.
    pub fn new() -> Self {
        let mut ctx = Context {
            interner: Interner::new(),
            files: FileTable::new(),
            nodes: NodeArena::new(),
            syms: SymArena::new(),
            types: TypePool::new(),
            diags: DiagnosticQueue::new(),
            scopes: ScopeStack::new(),
            converters: Vec::new(),
            instances: FxHashMap::default(),
        };
        ctx.scopes.open_scope(); // imported symbols
        ctx.scopes.open_scope(); // module top level
        ctx
    }

    /// Declare a symbol in the topmost scope.
    pub fn declare(&mut self, sym: SymId) {
        let name = self.syms.get(sym).name;
        self.scopes.add(&self.interner, name, sym);
        if self.syms.get(sym).kind == keel_ir::SymKind::Converter {
            self.converters.push(sym);
        }
    }

    /// Look an identifier up, emitting `UndeclaredIdentifier` on a miss.
    pub fn lookup_or_undeclared(&mut self, name: Name, loc: Loc) -> Option<SymId> {
        match self.scopes.lookup(&self.interner, name) {
            Some(sym) => Some(sym),
            None => {
                self.diags.error(
                    DiagKind::UndeclaredIdentifier,
                    loc,
                    format!("undeclared identifier: '{}'", self.interner.lookup(name)),
                );
                None
            }
        }
    }

    /// A fresh `Sym` reference node.
    pub fn new_sym_node(&mut self, sym: SymId, loc: Loc) -> NodeId {
        let typ = self.syms.get(sym).typ;
        let mut node = Node::new(NodeKind::Sym, loc, NodePayload::Sym(sym));
        node.typ = typ;
        self.nodes.alloc(node)
    }

    /// A fresh typed node with children.
    pub fn new_tree(
        &mut self,
        kind: NodeKind,
        loc: Loc,
        typ: TypeId,
        sons: Vec<NodeId>,
    ) -> NodeId {
        let mut node = Node::new(kind, loc, NodePayload::Sons(sons));
        node.typ = typ;
        self.nodes.alloc(node)
    }

    /// Borrow bundle for type formatting in diagnostics.
    pub fn type_formatter(&self) -> TypeFormatter<'_> {
        TypeFormatter::new(&self.types, &self.syms, &self.nodes, &self.interner)
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}
