//! String interner for identifiers.
//!
//! Provides O(1) interning and lookup. Interned strings live for the
//! whole compilation unit, which lets the interner hand out `&'static`
//! references by leaking the storage.
//!
//! # Determinism
//!
//! Ids are assigned by a monotonically increasing counter, so the id of
//! an identifier depends only on the order of first-time interns. Two
//! identifiers with different bytes but an equal rolling hash are
//! allowed and distinguished by byte comparison on lookup.

use crate::Name;
use rustc_hash::FxHashMap;

/// Compute the bytewise rolling hash of an identifier.
///
/// This is the hash stored alongside every interned identifier; scope
/// tables reuse it instead of re-hashing the bytes.
#[inline]
pub(crate) fn rolling_hash(s: &str) -> u32 {
    let mut h = 0u32;
    for byte in s.bytes() {
        h = h.wrapping_mul(31).wrapping_add(u32::from(byte));
    }
    h
}

/// Identifier pool.
///
/// Interns identifier byte strings to compact [`Name`] ids with a
/// stored 32-bit hash. Single-threaded: semantic analysis mutates the
/// pool from one thread only (a parallel design would shard this the
/// way a concurrent interner shards its storage).
pub struct Interner {
    /// Map from string content to id.
    map: FxHashMap<&'static str, Name>,
    /// Storage for string contents, indexed by id.
    strings: Vec<&'static str>,
    /// Stored rolling hash for each id.
    hashes: Vec<u32>,
}

impl Interner {
    /// Create a new interner with the empty string pre-interned at id 0.
    pub fn new() -> Self {
        let mut interner = Interner {
            map: FxHashMap::default(),
            strings: Vec::with_capacity(256),
            hashes: Vec::with_capacity(256),
        };
        let empty = interner.intern("");
        debug_assert_eq!(empty, Name::EMPTY);
        interner
    }

    /// Intern a string, returning its canonical `Name`.
    pub fn intern(&mut self, s: &str) -> Name {
        if let Some(&name) = self.map.get(s) {
            return name;
        }
        let id = u32::try_from(self.strings.len())
            .unwrap_or_else(|_| panic!("interner exceeded {} identifiers", u32::MAX));
        // Leak for 'static lifetime; identifiers never die during a unit.
        let leaked: &'static str = Box::leak(s.to_owned().into_boxed_str());
        let name = Name::from_raw(id);
        self.strings.push(leaked);
        self.hashes.push(rolling_hash(leaked));
        self.map.insert(leaked, name);
        name
    }

    /// Look up the string for a `Name`.
    #[inline]
    pub fn lookup(&self, name: Name) -> &'static str {
        self.strings[name.raw() as usize]
    }

    /// Get the stored rolling hash for a `Name`.
    #[inline]
    pub fn hash(&self, name: Name) -> u32 {
        self.hashes[name.raw() as usize]
    }

    /// Number of interned identifiers.
    pub fn len(&self) -> usize {
        self.strings.len()
    }

    /// Check if the interner holds only the empty string.
    pub fn is_empty(&self) -> bool {
        self.strings.len() <= 1
    }
}

impl Default for Interner {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_intern_and_lookup() {
        let mut interner = Interner::new();

        let hello = interner.intern("hello");
        let world = interner.intern("world");
        let hello2 = interner.intern("hello");

        assert_eq!(hello, hello2);
        assert_ne!(hello, world);

        assert_eq!(interner.lookup(hello), "hello");
        assert_eq!(interner.lookup(world), "world");
    }

    #[test]
    fn test_ids_are_monotone() {
        let mut interner = Interner::new();
        let a = interner.intern("a");
        let b = interner.intern("b");
        let c = interner.intern("c");
        assert!(a.raw() < b.raw());
        assert!(b.raw() < c.raw());
    }

    #[test]
    fn test_hash_is_stored() {
        let mut interner = Interner::new();
        let x = interner.intern("abc");
        assert_eq!(interner.hash(x), rolling_hash("abc"));
    }

    #[test]
    fn test_empty_string() {
        let mut interner = Interner::new();
        assert_eq!(interner.intern(""), Name::EMPTY);
        assert_eq!(interner.lookup(Name::EMPTY), "");
    }

    proptest! {
        // Property 1: intern(s1).id == intern(s2).id iff s1 == s2.
        #[test]
        fn prop_intern_determinism(strings in proptest::collection::vec("[a-zA-Z_][a-zA-Z0-9_]{0,12}", 1..40)) {
            let mut interner = Interner::new();
            let names: Vec<_> = strings.iter().map(|s| interner.intern(s)).collect();
            for (i, a) in strings.iter().enumerate() {
                for (j, b) in strings.iter().enumerate() {
                    prop_assert_eq!(names[i] == names[j], a == b);
                }
            }
            for (i, s) in strings.iter().enumerate() {
                prop_assert_eq!(interner.lookup(names[i]), s.as_str());
            }
        }
    }
}
