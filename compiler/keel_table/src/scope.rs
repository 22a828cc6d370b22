//! The lexical scope stack.
//!
//! An ordered sequence of symbol tables. Index 0 holds imported
//! symbols, index 1 the current module's top level, deeper indices
//! nested routines and blocks. Popping a scope does not destroy the
//! symbols; they may outlive it via references held by the AST.

use crate::SymTable;
use keel_ir::{Interner, Name, SymId};

/// Stack of open scopes.
pub struct ScopeStack {
    scopes: Vec<SymTable>,
}

impl ScopeStack {
    /// An empty stack; callers open the import and module scopes.
    pub fn new() -> Self {
        ScopeStack { scopes: Vec::new() }
    }

    /// Current depth.
    #[inline]
    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    /// Push an empty scope.
    pub fn open_scope(&mut self) {
        self.scopes.push(SymTable::new());
    }

    /// Pop the topmost scope. Closing at depth 0 is a usage error.
    pub fn close_scope(&mut self) {
        debug_assert!(!self.scopes.is_empty(), "close_scope at depth 0");
        self.scopes.pop();
    }

    /// The scope at `depth` (0 = imports).
    pub fn scope(&self, depth: usize) -> &SymTable {
        &self.scopes[depth]
    }

    /// Insert into the topmost scope; duplicates are kept (overloads).
    pub fn add(&mut self, interner: &Interner, name: Name, sym: SymId) {
        let hash = interner.hash(name);
        self.scopes
            .last_mut()
            .expect("add with no open scope")
            .insert(name, hash, sym);
    }

    /// Insert into the topmost scope, failing on a duplicate name there.
    pub fn add_unique(
        &mut self,
        interner: &Interner,
        name: Name,
        sym: SymId,
    ) -> Result<(), SymId> {
        let hash = interner.hash(name);
        self.scopes
            .last_mut()
            .expect("add_unique with no open scope")
            .insert_unique(name, hash, sym)
    }

    /// Search the topmost scope only.
    pub fn lookup_local(&self, interner: &Interner, name: Name) -> Option<SymId> {
        let hash = interner.hash(name);
        self.scopes.last().and_then(|s| s.get(name, hash))
    }

    /// Search from the topmost scope to the bottom; first hit wins.
    pub fn lookup(&self, interner: &Interner, name: Name) -> Option<SymId> {
        let hash = interner.hash(name);
        self.scopes.iter().rev().find_map(|s| s.get(name, hash))
    }

    /// Every visible symbol named `name`, innermost scope first,
    /// insertion order within each scope.
    ///
    /// This is the enumeration order of overload candidates; it must be
    /// deterministic because it decides the runner-up in ambiguity
    /// diagnostics.
    pub fn visible_iter<'a>(&'a self, name: Name) -> impl Iterator<Item = SymId> + 'a {
        self.scopes
            .iter()
            .rev()
            .flat_map(move |s| s.ident_iter(name))
    }
}

impl Default for ScopeStack {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sym(raw: u32) -> SymId {
        SymId::from_raw(raw)
    }

    // Property 2: a symbol added at depth d is visible iff the current
    // depth >= d and no closer scope shadows the identifier.
    #[test]
    fn lifo_visibility() {
        let mut interner = Interner::new();
        let mut stack = ScopeStack::new();
        let x = interner.intern("x");

        stack.open_scope(); // imports
        stack.open_scope(); // module
        stack.add(&interner, x, sym(1));
        assert_eq!(stack.lookup(&interner, x), Some(sym(1)));

        stack.open_scope(); // block
        assert_eq!(stack.lookup(&interner, x), Some(sym(1)));
        assert_eq!(stack.lookup_local(&interner, x), None);

        stack.add(&interner, x, sym(2)); // shadow
        assert_eq!(stack.lookup(&interner, x), Some(sym(2)));

        stack.close_scope();
        assert_eq!(stack.lookup(&interner, x), Some(sym(1)));
    }

    #[test]
    fn visible_iter_inner_scopes_first() {
        let mut interner = Interner::new();
        let mut stack = ScopeStack::new();
        let f = interner.intern("f");

        stack.open_scope();
        stack.add(&interner, f, sym(1));
        stack.open_scope();
        stack.add(&interner, f, sym(2));
        stack.add(&interner, f, sym(3));

        let seen: Vec<u32> = stack.visible_iter(f).map(|s| s.raw()).collect();
        assert_eq!(seen, vec![2, 3, 1]);
    }

    #[test]
    fn add_unique_detects_same_scope_duplicates_only() {
        let mut interner = Interner::new();
        let mut stack = ScopeStack::new();
        let v = interner.intern("v");

        stack.open_scope();
        stack.add(&interner, v, sym(1));
        stack.open_scope();
        // Shadowing an outer scope is fine.
        assert!(stack.add_unique(&interner, v, sym(2)).is_ok());
        // Rebinding in the same scope is not.
        assert_eq!(stack.add_unique(&interner, v, sym(3)), Err(sym(2)));
    }
}
