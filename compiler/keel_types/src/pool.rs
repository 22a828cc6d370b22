//! The type pool - single slab owning every type of a compilation unit.
//!
//! Primitives are pre-allocated at fixed indices for O(1) access; all
//! other types are appended by the constructors below. `TypeId`
//! equality is id equality, which is exactly the nominal equality of
//! objects, declared enums and distinct types.

use crate::{CallConv, TypeData, TypeFlags, TypeKind};
use keel_ir::{NodeArena, NodeId, TypeId};

/// Panic helper for capacity overflow (cold path, never inlined).
#[cold]
#[inline(never)]
fn panic_capacity_exceeded(len: usize) -> ! {
    panic!("type pool capacity exceeded: {len} types");
}

/// Slab of all types in a compilation unit.
pub struct TypePool {
    types: Vec<TypeData>,
}

impl TypePool {
    // Pre-interned primitives at fixed indices.
    pub const NONE_T: TypeId = TypeId::from_raw(0);
    pub const BOOL: TypeId = TypeId::from_raw(1);
    pub const CHAR: TypeId = TypeId::from_raw(2);
    pub const INT: TypeId = TypeId::from_raw(3);
    pub const INT8: TypeId = TypeId::from_raw(4);
    pub const INT16: TypeId = TypeId::from_raw(5);
    pub const INT32: TypeId = TypeId::from_raw(6);
    pub const INT64: TypeId = TypeId::from_raw(7);
    pub const FLOAT: TypeId = TypeId::from_raw(8);
    pub const FLOAT32: TypeId = TypeId::from_raw(9);
    pub const FLOAT64: TypeId = TypeId::from_raw(10);
    pub const FLOAT128: TypeId = TypeId::from_raw(11);
    pub const STRING: TypeId = TypeId::from_raw(12);
    pub const CSTRING: TypeId = TypeId::from_raw(13);
    pub const POINTER: TypeId = TypeId::from_raw(14);
    pub const ANY_ENUM: TypeId = TypeId::from_raw(15);
    pub const NIL: TypeId = TypeId::from_raw(16);
    pub const EMPTY_SET: TypeId = TypeId::from_raw(17);

    /// Create a pool with the primitives pre-allocated.
    pub fn new() -> Self {
        const PRIMS: &[TypeKind] = &[
            TypeKind::None,
            TypeKind::Bool,
            TypeKind::Char,
            TypeKind::Int,
            TypeKind::Int8,
            TypeKind::Int16,
            TypeKind::Int32,
            TypeKind::Int64,
            TypeKind::Float,
            TypeKind::Float32,
            TypeKind::Float64,
            TypeKind::Float128,
            TypeKind::String,
            TypeKind::CString,
            TypeKind::Pointer,
            TypeKind::AnyEnum,
            TypeKind::Nil,
            TypeKind::EmptySet,
        ];
        let mut pool = TypePool {
            types: Vec::with_capacity(64),
        };
        for &kind in PRIMS {
            pool.alloc(TypeData::new(kind));
        }
        debug_assert_eq!(pool.kind(Self::EMPTY_SET), TypeKind::EmptySet);
        pool
    }

    /// The pre-interned primitive for a kind, if it has one.
    pub fn primitive(&self, kind: TypeKind) -> Option<TypeId> {
        let id = match kind {
            TypeKind::None => Self::NONE_T,
            TypeKind::Bool => Self::BOOL,
            TypeKind::Char => Self::CHAR,
            TypeKind::Int => Self::INT,
            TypeKind::Int8 => Self::INT8,
            TypeKind::Int16 => Self::INT16,
            TypeKind::Int32 => Self::INT32,
            TypeKind::Int64 => Self::INT64,
            TypeKind::Float => Self::FLOAT,
            TypeKind::Float32 => Self::FLOAT32,
            TypeKind::Float64 => Self::FLOAT64,
            TypeKind::Float128 => Self::FLOAT128,
            TypeKind::String => Self::STRING,
            TypeKind::CString => Self::CSTRING,
            TypeKind::Pointer => Self::POINTER,
            TypeKind::AnyEnum => Self::ANY_ENUM,
            TypeKind::Nil => Self::NIL,
            TypeKind::EmptySet => Self::EMPTY_SET,
            _ => return None,
        };
        Some(id)
    }

    /// Allocate a descriptor, returning its id.
    pub fn alloc(&mut self, data: TypeData) -> TypeId {
        let len = self.types.len();
        if len >= u32::MAX as usize {
            panic_capacity_exceeded(len);
        }
        self.types.push(data);
        TypeId::from_raw(len as u32)
    }

    #[inline]
    pub fn get(&self, id: TypeId) -> &TypeData {
        &self.types[id.index()]
    }

    #[inline]
    pub fn get_mut(&mut self, id: TypeId) -> &mut TypeData {
        &mut self.types[id.index()]
    }

    /// Kind of a type; `TypeKind::None` for the NONE sentinel.
    #[inline]
    pub fn kind(&self, id: TypeId) -> TypeKind {
        if id.is_none() {
            TypeKind::None
        } else {
            self.get(id).kind
        }
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    // === Constructors ===

    /// `array[index, elem]`.
    pub fn array(&mut self, index: TypeId, elem: TypeId) -> TypeId {
        self.alloc(TypeData::with_sons(TypeKind::Array, [index, elem]))
    }

    /// The type of a bracket constructor `[a, b, c]`.
    pub fn array_constr(&mut self, index_range: TypeId, elem: TypeId) -> TypeId {
        self.alloc(TypeData::with_sons(
            TypeKind::ArrayConstr,
            [index_range, elem],
        ))
    }

    pub fn open_array(&mut self, elem: TypeId) -> TypeId {
        self.alloc(TypeData::with_sons(TypeKind::OpenArray, [elem]))
    }

    pub fn sequence(&mut self, elem: TypeId) -> TypeId {
        self.alloc(TypeData::with_sons(TypeKind::Sequence, [elem]))
    }

    pub fn set_of(&mut self, elem: TypeId) -> TypeId {
        self.alloc(TypeData::with_sons(TypeKind::Set, [elem]))
    }

    pub fn ref_to(&mut self, elem: TypeId) -> TypeId {
        self.alloc(TypeData::with_sons(TypeKind::Ref, [elem]))
    }

    pub fn ptr_to(&mut self, elem: TypeId) -> TypeId {
        self.alloc(TypeData::with_sons(TypeKind::Ptr, [elem]))
    }

    pub fn var_of(&mut self, elem: TypeId) -> TypeId {
        self.alloc(TypeData::with_sons(TypeKind::Var, [elem]))
    }

    pub fn distinct_of(&mut self, base: TypeId) -> TypeId {
        self.alloc(TypeData::with_sons(TypeKind::Distinct, [base]))
    }

    pub fn tuple_of(&mut self, fields: impl IntoIterator<Item = TypeId>) -> TypeId {
        self.alloc(TypeData::with_sons(TypeKind::Tuple, fields))
    }

    /// `range[base]` with the literal bounds node `n`.
    pub fn range_type(&mut self, base: TypeId, n: NodeId) -> TypeId {
        let mut data = TypeData::with_sons(TypeKind::Range, [base]);
        data.n = n;
        data.size = self.get(base).size;
        self.alloc(data)
    }

    /// A proc type; `ret` may be `TypeId::NONE` for no return value.
    pub fn proc_type(
        &mut self,
        ret: TypeId,
        params: impl IntoIterator<Item = TypeId>,
        callconv: CallConv,
        varargs: bool,
    ) -> TypeId {
        let mut sons = smallvec::SmallVec::from_iter([ret]);
        sons.extend(params);
        let mut data = TypeData::new(TypeKind::Proc);
        data.sons = sons;
        data.callconv = callconv;
        if varargs {
            data.flags |= TypeFlags::VARARGS;
        }
        data.size = 8;
        self.alloc(data)
    }

    /// An unconstrained or constrained generic parameter placeholder.
    pub fn generic_param(&mut self, constraints: impl IntoIterator<Item = TypeId>) -> TypeId {
        self.alloc(TypeData::with_sons(TypeKind::GenericParam, constraints))
    }

    // === Structure helpers ===

    /// First child (`base` of ranges/objects/distincts, return type of procs).
    #[inline]
    pub fn base(&self, id: TypeId) -> TypeId {
        self.get(id).base()
    }

    /// Element type: the last child.
    #[inline]
    pub fn elem(&self, id: TypeId) -> TypeId {
        self.get(id).last_son()
    }

    /// Last child (the body of generic instances).
    #[inline]
    pub fn last_son(&self, id: TypeId) -> TypeId {
        self.get(id).last_son()
    }

    /// Return type of a proc type (`TypeId::NONE` if none).
    #[inline]
    pub fn proc_ret(&self, id: TypeId) -> TypeId {
        self.get(id).base()
    }

    /// Number of parameters of a proc type.
    #[inline]
    pub fn proc_param_count(&self, id: TypeId) -> usize {
        self.get(id).sons.len().saturating_sub(1)
    }

    /// Parameter `i` (0-based) of a proc type.
    #[inline]
    pub fn proc_param(&self, id: TypeId, i: usize) -> TypeId {
        self.get(id).sons[i + 1]
    }

    /// Skip `Range` wrappers.
    pub fn skip_range(&self, mut t: TypeId) -> TypeId {
        while t.is_some() && self.kind(t) == TypeKind::Range {
            t = self.base(t);
        }
        t
    }

    /// Skip `Var` wrappers.
    pub fn skip_var(&self, mut t: TypeId) -> TypeId {
        while t.is_some() && self.kind(t) == TypeKind::Var {
            t = self.base(t);
        }
        t
    }

    /// Skip `GenericInst` wrappers down to the instantiated body.
    pub fn skip_generic_inst(&self, mut t: TypeId) -> TypeId {
        while t.is_some() && self.kind(t) == TypeKind::GenericInst {
            t = self.last_son(t);
        }
        t
    }

    /// The bounds of a range type, read from its literal node.
    pub fn range_bounds(&self, nodes: &NodeArena, t: TypeId) -> (i64, i64) {
        debug_assert_eq!(self.kind(t), TypeKind::Range);
        let n = self.get(t).n;
        if n.is_none() {
            return (0, -1);
        }
        let range = nodes.get(n);
        let lo = nodes.get(range.son(0)).int_val();
        let hi = nodes.get(range.son(1)).int_val();
        (lo, hi)
    }

    /// Whether an array/array-constructor index starts at zero.
    pub fn index_is_zero_based(&self, nodes: &NodeArena, index: TypeId) -> bool {
        match self.kind(index) {
            TypeKind::Range => self.range_bounds(nodes, index).0 == 0,
            k => k.is_signed_int(),
        }
    }

    /// Structural type equivalence with nominal id short-circuits.
    ///
    /// `nodes` is needed to compare range bounds.
    pub fn same_type(&self, nodes: &NodeArena, a: TypeId, b: TypeId) -> bool {
        if a == b {
            return true;
        }
        if a.is_none() || b.is_none() {
            return false;
        }
        let (ta, tb) = (self.get(a), self.get(b));
        if ta.kind != tb.kind {
            return false;
        }
        // Nominal kinds failed the id check above.
        if ta.kind.is_nominal() {
            return false;
        }
        match ta.kind {
            TypeKind::Range => {
                self.same_type(nodes, ta.base(), tb.base())
                    && self.range_bounds(nodes, a) == self.range_bounds(nodes, b)
            }
            TypeKind::Proc => {
                ta.callconv == tb.callconv
                    && ta.flags.contains(TypeFlags::VARARGS)
                        == tb.flags.contains(TypeFlags::VARARGS)
                    && self.same_sons(nodes, a, b)
            }
            _ => self.same_sons(nodes, a, b),
        }
    }

    fn same_sons(&self, nodes: &NodeArena, a: TypeId, b: TypeId) -> bool {
        let (ta, tb) = (self.get(a), self.get(b));
        ta.sons.len() == tb.sons.len()
            && ta
                .sons
                .iter()
                .zip(tb.sons.iter())
                .all(|(&x, &y)| (x.is_none() && y.is_none()) || self.same_type(nodes, x, y))
    }
}

impl Default for TypePool {
    fn default() -> Self {
        Self::new()
    }
}
