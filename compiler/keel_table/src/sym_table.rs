//! Open-addressed symbol table keyed by identifier.
//!
//! One scope's name-to-symbol mapping. Duplicate names are first-class:
//! an overload set is several entries under the same identifier, and
//! [`SymTable::ident_iter`] enumerates them in insertion order.

use crate::{must_rehash, next_try};
use keel_ir::{Name, SymId};

const START_SIZE: usize = 8;

#[derive(Copy, Clone)]
struct Slot {
    hash: u32,
    name: Name,
    sym: SymId,
}

const EMPTY: Slot = Slot {
    hash: 0,
    name: Name::NONE,
    sym: SymId::NONE,
};

/// Name-to-symbol open-addressed hash table.
pub struct SymTable {
    slots: Vec<Slot>,
    counter: usize,
    /// Insertion order, for deterministic per-name enumeration.
    order: Vec<(Name, SymId)>,
}

impl SymTable {
    pub fn new() -> Self {
        SymTable {
            slots: vec![EMPTY; START_SIZE],
            counter: 0,
            order: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.counter
    }

    pub fn is_empty(&self) -> bool {
        self.counter == 0
    }

    fn raw_insert(slots: &mut [Slot], slot: Slot) {
        let mask = slots.len() - 1;
        let mut h = slot.hash as usize & mask;
        while slots[h].name.is_some() {
            h = next_try(h, mask);
        }
        slots[h] = slot;
    }

    #[cold]
    #[inline(never)]
    fn grow(&mut self) {
        let mut slots = vec![EMPTY; self.slots.len() * 2];
        // Reinsert in insertion order so the probe layout stays a pure
        // function of the insertion sequence.
        for old in self.slots.iter().filter(|s| s.name.is_some()) {
            Self::raw_insert(&mut slots, *old);
        }
        self.slots = slots;
    }

    /// Insert a symbol under `name`; duplicates are kept.
    ///
    /// `hash` is the identifier's stored rolling hash.
    pub fn insert(&mut self, name: Name, hash: u32, sym: SymId) {
        if must_rehash(self.slots.len(), self.counter + 1) {
            self.grow();
        }
        Self::raw_insert(&mut self.slots, Slot { hash, name, sym });
        self.counter += 1;
        self.order.push((name, sym));
    }

    /// Insert, failing if `name` is already present.
    pub fn insert_unique(&mut self, name: Name, hash: u32, sym: SymId) -> Result<(), SymId> {
        if let Some(existing) = self.get(name, hash) {
            return Err(existing);
        }
        self.insert(name, hash, sym);
        Ok(())
    }

    /// First symbol bound to `name`, if any.
    pub fn get(&self, name: Name, hash: u32) -> Option<SymId> {
        let mask = self.slots.len() - 1;
        let mut h = hash as usize & mask;
        loop {
            let slot = &self.slots[h];
            if slot.name.is_none() {
                return None;
            }
            if slot.name == name {
                // The probe chain may hold several entries for this
                // name; the canonical "first" is insertion order.
                return self
                    .order
                    .iter()
                    .find(|(n, _)| *n == name)
                    .map(|&(_, sym)| sym);
            }
            h = next_try(h, mask);
        }
    }

    /// All symbols bound to `name`, in insertion order.
    pub fn ident_iter<'a>(&'a self, name: Name) -> impl Iterator<Item = SymId> + 'a {
        self.order
            .iter()
            .filter(move |(n, _)| *n == name)
            .map(|&(_, sym)| sym)
    }

    /// Every entry, in insertion order.
    pub fn iter<'a>(&'a self) -> impl Iterator<Item = (Name, SymId)> + 'a {
        self.order.iter().copied()
    }
}

impl Default for SymTable {
    fn default() -> Self {
        Self::new()
    }
}
