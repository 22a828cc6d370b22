//! Keel overload resolution.
//!
//! The heart of the semantic layer: given a call node and the overload
//! set visible at the call site, score every candidate with the ranked
//! type-compatibility relation, pick a unique winner (or diagnose
//! ambiguity), and rewrite the call so that arguments sit in formal
//! order with defaults filled in and every implicit conversion made
//! explicit as a hidden-conversion node.
//!
//! Pipeline per call site:
//!
//! 1. [`resolve_call`] iterates candidates deterministically
//!    (innermost scope first, insertion order within a scope)
//! 2. [`match_call`] walks the actual arguments, binding named and
//!    positional parameters and running [`type_rel`] per argument
//! 3. the best/runner-up comparison picks the winner; generic winners
//!    are instantiated against their inferred bindings
//!
//! Matching failure is a candidate state, never an exception: the
//! resolver surfaces a diagnostic only after all candidates are scored
//! so the user sees the complete picture.

mod candidate;
mod context;
mod instantiate;
mod rank;
mod rel;
mod resolve;
mod sigmatch;

#[cfg(test)]
mod testutil;

pub use candidate::{cmp_candidates, Candidate, GenericBindings, MatchState};
pub use context::Context;
pub use instantiate::{instantiate_proc, substitute_type};
pub use rank::Rank;
pub use rel::{type_rel, TypeRel};
pub use resolve::resolve_call;
pub use sigmatch::match_call;
