//! Keel IR - the data structures shared by every compiler phase.
//!
//! This crate contains:
//! - `Name` and `Interner` for interned identifiers
//! - `FileId`, `Loc` and `FileTable` for source locations
//! - `NodeKind`, `Node` and `NodeArena` for the abstract syntax tree
//! - `SymKind`, `Symbol` and `SymArena` for named program entities
//! - The index newtypes (`NodeId`, `SymId`, `TypeId`) that tie the
//!   three slabs together
//!
//! # Design Philosophy
//!
//! - **Intern everything**: identifier strings become `Name(u32)`
//! - **Flatten everything**: no `Box<Node>`; children are `NodeId`
//!   indices into a per-compilation-unit arena
//! - **Closed enumerations**: node, symbol and type kinds are stable
//!   enums dispatched with exhaustive `match`, not trait objects
//!
//! Nodes, symbols and types form cyclic graphs (a symbol's type refers
//! back to the symbol, generic instances hold their template). Storing
//! them in three typed slabs and crossing the cycles with `u32` indices
//! makes the cycles harmless: equality short-circuits on ids.

/// Compile-time assertion that a type has a specific size.
///
/// Used to prevent accidental size regressions in frequently-allocated types.
#[macro_export]
macro_rules! static_assert_size {
    ($ty:ty, $size:expr) => {
        const _: [(); $size] = [(); ::std::mem::size_of::<$ty>()];
    };
}

mod arena;
mod ids;
mod interner;
mod loc;
mod name;
pub mod node;
pub mod sym;

pub use arena::NodeArena;
pub use ids::{NodeId, SymId, TypeId};
pub use interner::Interner;
pub use loc::{FileId, FileTable, Loc};
pub use name::Name;
pub use node::{Node, NodeFlags, NodeKind, NodePayload};
pub use sym::{Magic, SymArena, SymFlags, SymKind, Symbol};
