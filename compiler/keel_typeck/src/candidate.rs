//! Overload candidates and generic bindings.

use crate::Rank;
use keel_ir::{NodeId, SymId, TypeId};
use keel_table::IdTable;
use std::cmp::Ordering;

/// Where a candidate stands after matching.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Default)]
pub enum MatchState {
    /// Matching has not run (or no candidate was seen at all).
    #[default]
    Empty,
    Match,
    NoMatch,
}

/// The mapping from generic-parameter type id to bound concrete type.
///
/// Per-candidate: failed candidates drop their bindings, so a failed
/// unification path never leaks partial bindings into another choice.
#[derive(Default)]
pub struct GenericBindings {
    table: IdTable<TypeId>,
}

impl GenericBindings {
    pub fn new() -> Self {
        Self::default()
    }

    /// The bound type for a generic parameter, if any.
    pub fn get(&self, param: TypeId) -> Option<TypeId> {
        self.table.get(param.raw()).filter(|t| t.is_some())
    }

    /// Bind a generic parameter. Rebinding is the caller's bug.
    pub fn bind(&mut self, param: TypeId, to: TypeId) {
        debug_assert!(self.get(param).is_none(), "rebinding {param:?}");
        self.table.insert(param.raw(), to);
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// All (parameter id, bound type) pairs, unsorted.
    pub fn iter(&self) -> impl Iterator<Item = (u32, TypeId)> + '_ {
        self.table.iter()
    }
}

/// One candidate procedure being scored against a call.
pub struct Candidate {
    /// The symbol under test.
    pub callee: SymId,
    /// Its procedure type.
    pub callee_type: TypeId,
    /// Tally of exact argument matches.
    pub exact: u32,
    /// Tally of subtype matches.
    pub subtype: u32,
    /// Tally of generic matches.
    pub generic: u32,
    /// Tally of conversion matches.
    pub conv: u32,
    pub state: MatchState,
    pub bindings: GenericBindings,
    /// Set by the relation when an actual matched the *element* type of
    /// an open-array/sequence formal; enables the implicit `[x, y, ...]`
    /// container for the trailing parameter.
    pub base_type_match: bool,
    /// The rewritten call under construction.
    pub call: NodeId,
}

impl Candidate {
    pub fn new(callee: SymId, callee_type: TypeId) -> Self {
        Candidate {
            callee,
            callee_type,
            exact: 0,
            subtype: 0,
            generic: 0,
            conv: 0,
            state: MatchState::Empty,
            bindings: GenericBindings::new(),
            base_type_match: false,
            call: NodeId::NONE,
        }
    }

    /// Record one argument's rank in the tallies.
    pub fn tally(&mut self, rank: Rank) {
        match rank {
            Rank::Equal => self.exact += 1,
            Rank::Generic => self.generic += 1,
            Rank::Subtype => self.subtype += 1,
            Rank::Convertible => self.conv += 1,
            Rank::None => {}
        }
    }
}

/// Lexicographic candidate precedence: `(exact, generic, subtype, conv)`,
/// higher is better at each tier.
pub fn cmp_candidates(a: &Candidate, b: &Candidate) -> Ordering {
    (a.exact, a.generic, a.subtype, a.conv).cmp(&(b.exact, b.generic, b.subtype, b.conv))
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn cand(exact: u32, generic: u32, subtype: u32, conv: u32) -> Candidate {
        let mut c = Candidate::new(SymId::NONE, TypeId::NONE);
        c.exact = exact;
        c.generic = generic;
        c.subtype = subtype;
        c.conv = conv;
        c
    }

    #[test_case((1, 0, 0, 0), (0, 1, 0, 0), Ordering::Greater; "exact beats generic")]
    #[test_case((0, 1, 0, 0), (0, 0, 1, 0), Ordering::Greater; "generic beats subtype")]
    #[test_case((0, 0, 1, 0), (0, 0, 0, 1), Ordering::Greater; "subtype beats conv")]
    #[test_case((1, 0, 0, 1), (1, 0, 0, 1), Ordering::Equal; "full tie")]
    #[test_case((1, 0, 0, 0), (1, 0, 1, 0), Ordering::Less; "tie falls through")]
    fn precedence(a: (u32, u32, u32, u32), b: (u32, u32, u32, u32), expected: Ordering) {
        let (ca, cb) = (cand(a.0, a.1, a.2, a.3), cand(b.0, b.1, b.2, b.3));
        assert_eq!(cmp_candidates(&ca, &cb), expected);
    }

    #[test]
    fn bindings_do_not_rebind() {
        let mut b = GenericBindings::new();
        let param = TypeId::from_raw(100);
        assert!(b.get(param).is_none());
        b.bind(param, TypeId::from_raw(3));
        assert_eq!(b.get(param), Some(TypeId::from_raw(3)));
    }
}
