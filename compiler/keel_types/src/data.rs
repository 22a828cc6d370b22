//! The type descriptor stored in the pool.

use crate::{CallConv, TypeKind};
use bitflags::bitflags;
use keel_ir::{NodeId, SymId, TypeId};
use smallvec::SmallVec;

bitflags! {
    /// Type property flags.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
    pub struct TypeFlags: u8 {
        /// Proc type accepts a variadic tail.
        const VARARGS = 1 << 0;
        /// Object type cannot be inherited from.
        const FINAL = 1 << 1;
    }
}

/// A tagged structural type descriptor.
///
/// The meaning of `sons` and `n` depends on `kind`:
///
/// | kind | sons | n |
/// |---|---|---|
/// | `Array` | `[index, elem]` | — |
/// | `ArrayConstr` | `[index_range, elem]` | — |
/// | `OpenArray`/`Sequence`/`Set` | `[elem]` | — |
/// | `Ref`/`Ptr`/`Var`/`Distinct` | `[elem]` | — |
/// | `Range` | `[base]` | range literal node |
/// | `Tuple` | field types | — |
/// | `Record`/`RecordConstr`/`Object` | `[base or NONE, ...]` | field list |
/// | `Object` | `[base or NONE]` | field list |
/// | `Enum` | — | enum field list |
/// | `Proc` | `[ret or NONE, params...]` | formal-params node |
/// | `Generic` | formal params, last = body | — |
/// | `GenericParam` | constraints (may be empty) | — |
/// | `GenericInst` | `[template, args..., instantiated body]` | — |
#[derive(Clone, Debug)]
pub struct TypeData {
    pub kind: TypeKind,
    pub sons: SmallVec<[TypeId; 2]>,
    /// Associated AST node (field lists, formal params, range literals).
    pub n: NodeId,
    /// Declaring symbol, if any.
    pub sym: SymId,
    pub flags: TypeFlags,
    /// Links a generic instance back to its template; `u32::MAX` if none.
    pub container_id: u32,
    pub callconv: CallConv,
    /// Cached size in bytes; -1 unknown.
    pub size: i64,
    /// Cached alignment in bytes; -1 unknown.
    pub align: i16,
}

impl TypeData {
    /// A descriptor with no children and nothing cached.
    pub fn new(kind: TypeKind) -> Self {
        TypeData {
            kind,
            sons: SmallVec::new(),
            n: NodeId::NONE,
            sym: SymId::NONE,
            flags: TypeFlags::empty(),
            container_id: u32::MAX,
            callconv: CallConv::Default,
            size: kind.numeric_size(),
            align: -1,
        }
    }

    /// A descriptor with the given children.
    pub fn with_sons(kind: TypeKind, sons: impl IntoIterator<Item = TypeId>) -> Self {
        let mut data = TypeData::new(kind);
        data.sons = sons.into_iter().collect();
        data
    }

    /// First child, or `TypeId::NONE`.
    #[inline]
    pub fn base(&self) -> TypeId {
        self.sons.first().copied().unwrap_or(TypeId::NONE)
    }

    /// Last child, or `TypeId::NONE`.
    #[inline]
    pub fn last_son(&self) -> TypeId {
        self.sons.last().copied().unwrap_or(TypeId::NONE)
    }
}
