//! The ranked type-compatibility relation.
//!
//! `type_rel(bindings, F, A)` answers "how well does an actual of type
//! `A` fit a formal of type `F`" with a [`Rank`]. The relation is total
//! over every pair of type kinds and terminates: the structural
//! skeleton of a type is finite, and the nominal cycles (objects,
//! declared enums, generics) are cut by id-equality short-circuits.
//!
//! The relation is pure with respect to types but effectful on the
//! generic bindings: successfully unifying a generic parameter inserts
//! a binding. Failed candidates throw their whole binding table away,
//! so partial bindings never leak between overload choices.

use crate::{GenericBindings, Rank};
use keel_ir::{NodeArena, SymArena, TypeId};
use keel_table::IdSet;
use keel_types::{TypeData, TypeKind, TypePool};

/// Borrow bundle for running the relation.
///
/// The pool is mutable because binding a generic parameter may need to
/// concretise the actual (an array constructor binds as an open array).
pub struct TypeRel<'a> {
    pub pool: &'a mut TypePool,
    pub nodes: &'a NodeArena,
    pub syms: &'a SymArena,
}

/// Compute the rank of `A` against the formal `F`, binding generic
/// parameters in `bindings` as a side effect.
pub fn type_rel(
    pool: &mut TypePool,
    nodes: &NodeArena,
    syms: &SymArena,
    bindings: &mut GenericBindings,
    f: TypeId,
    a: TypeId,
) -> Rank {
    TypeRel { pool, nodes, syms }.rel(bindings, f, a)
}

impl TypeRel<'_> {
    /// Number of elements an array (or array constructor) index covers.
    fn index_len(&self, index: TypeId) -> i64 {
        match self.pool.kind(index) {
            TypeKind::Range => {
                let (lo, hi) = self.pool.range_bounds(self.nodes, index);
                hi - lo + 1
            }
            _ => -1,
        }
    }

    /// An empty bracket/constructor: its element slot carries no type.
    fn is_empty_constr(&self, a: TypeId) -> bool {
        self.pool.kind(self.pool.elem(a)) == TypeKind::None
    }

    /// Concretise an actual before binding it to a generic parameter.
    ///
    /// Array constructors concretise to open arrays and record
    /// constructors to records; empty-set and nil are not valid
    /// bindings.
    fn concretise(&mut self, a: TypeId) -> Option<TypeId> {
        match self.pool.kind(a) {
            TypeKind::ArrayConstr => {
                let elem = self.pool.elem(a);
                if self.pool.kind(elem) == TypeKind::None {
                    None
                } else {
                    Some(self.pool.open_array(elem))
                }
            }
            TypeKind::RecordConstr => {
                let data = self.pool.get(a);
                let mut record = TypeData::with_sons(TypeKind::Record, data.sons.clone());
                record.n = data.n;
                Some(self.pool.alloc(record))
            }
            TypeKind::EmptySet | TypeKind::Nil | TypeKind::None => None,
            _ => Some(a),
        }
    }

    /// Relation for the signed-integer formals.
    fn int_rel(&self, f: TypeId, a: TypeId) -> Rank {
        let fk = self.pool.kind(f);
        let ak = self.pool.kind(a);
        if ak == fk {
            return Rank::Equal;
        }
        let sk = self.pool.kind(self.pool.skip_range(a));
        if ak == TypeKind::Range && sk == fk {
            return Rank::Subtype;
        }
        if !sk.is_signed_int() {
            return Rank::None;
        }
        if fk == TypeKind::Int {
            // Other widths widen (or are checked) into the platform int.
            Rank::Convertible
        } else {
            // A sized formal takes any other family member as a
            // subtype; narrowing directions get a range check when the
            // conversion is materialised.
            Rank::Subtype
        }
    }

    /// Relation for the float formals.
    fn float_rel(&self, f: TypeId, a: TypeId) -> Rank {
        let fk = self.pool.kind(f);
        let ak = self.pool.kind(a);
        if ak == fk {
            return Rank::Equal;
        }
        let sk = self.pool.kind(self.pool.skip_range(a));
        if ak == TypeKind::Range && sk == fk {
            return Rank::Subtype;
        }
        if sk.is_signed_int() {
            // Integer actuals convert into every float formal.
            return Rank::Convertible;
        }
        if !sk.is_float() {
            return Rank::None;
        }
        if fk == TypeKind::Float {
            Rank::Convertible
        } else {
            Rank::Subtype
        }
    }

    /// Does the actual object chain to the formal through `base` links?
    fn object_chains_to(&self, f: TypeId, mut a: TypeId) -> bool {
        loop {
            a = self.pool.get(a).base();
            if a.is_none() {
                return false;
            }
            a = self.pool.skip_generic_inst(a);
            if matches!(self.pool.kind(a), TypeKind::Ref | TypeKind::Ptr) {
                a = self.pool.elem(a);
            }
            if a == f {
                return true;
            }
            if self.pool.kind(a) != TypeKind::Object {
                return false;
            }
        }
    }

    /// Record-constructor against a record formal.
    ///
    /// Every named constructor entry must land on a distinct formal
    /// field; every formal field without a default must be covered; any
    /// unvisited constructor entry rejects the whole match.
    fn record_constr_rel(&mut self, bindings: &mut GenericBindings, f: TypeId, a: TypeId) -> Rank {
        let f_fields = self.pool.get(f).n;
        let a_constr = self.pool.get(a).n;
        if f_fields.is_none() || a_constr.is_none() {
            return Rank::None;
        }
        let mut used = IdSet::new();
        let f_len = self.nodes.get(f_fields).len();
        let a_len = self.nodes.get(a_constr).len();
        for i in 0..f_len {
            let field = self.nodes.get(f_fields).son(i);
            let fsym = self.nodes.get(field).sym();
            let fname = self.syms.get(fsym).name;
            let ftype = self.syms.get(fsym).typ;
            let mut found = false;
            for j in 0..a_len {
                let entry = self.nodes.get(a_constr).son(j);
                let entry_name = self.nodes.get(self.nodes.get(entry).son(0)).ident();
                if entry_name != fname {
                    continue;
                }
                if !used.insert_new(j as i64) {
                    continue;
                }
                let value_type = self.nodes.get(self.nodes.get(entry).son(1)).typ;
                if !self.rel(bindings, ftype, value_type).is_match() {
                    return Rank::None;
                }
                found = true;
                break;
            }
            if !found && self.syms.get(fsym).ast.is_none() {
                return Rank::None;
            }
        }
        if (0..a_len).any(|j| !used.contains(j as i64)) {
            return Rank::None;
        }
        Rank::Subtype
    }

    /// Proc-to-proc relation: same calling convention and arity,
    /// limited parameter contravariance, return types unified last.
    fn proc_rel(&mut self, bindings: &mut GenericBindings, f: TypeId, a: TypeId) -> Rank {
        match self.pool.kind(a) {
            TypeKind::Nil => return Rank::Subtype,
            TypeKind::Proc => {}
            _ => return Rank::None,
        }
        if self.pool.get(f).callconv != self.pool.get(a).callconv {
            return Rank::None;
        }
        if self.pool.proc_param_count(f) != self.pool.proc_param_count(a) {
            return Rank::None;
        }
        let mut result = Rank::Equal;
        for i in 0..self.pool.proc_param_count(f) {
            let (fp, ap) = (self.pool.proc_param(f, i), self.pool.proc_param(a, i));
            match self.rel(bindings, fp, ap) {
                Rank::Equal | Rank::Generic => {}
                _ => {
                    // Forward unification failed; a formal that is a
                    // subtype of the actual is still callable through
                    // the formal's signature, at conversion strength.
                    if self.rel(bindings, ap, fp) == Rank::Subtype {
                        result = result.min(Rank::Convertible);
                    } else {
                        return Rank::None;
                    }
                }
            }
        }
        let (fr, ar) = (self.pool.proc_ret(f), self.pool.proc_ret(a));
        match (fr.is_some(), ar.is_some()) {
            (false, false) => {}
            (true, true) => match self.rel(bindings, fr, ar) {
                Rank::Equal | Rank::Generic => {}
                Rank::Subtype => result = result.min(Rank::Convertible),
                _ => return Rank::None,
            },
            // Presence of a return type must agree.
            _ => return Rank::None,
        }
        result
    }

    /// The relation proper. Total over every kind of `f`.
    pub fn rel(&mut self, bindings: &mut GenericBindings, f: TypeId, mut a: TypeId) -> Rank {
        if f.is_none() || a.is_none() {
            return Rank::None;
        }
        // A formal generic instance stands for its instantiated body.
        if self.pool.kind(f) == TypeKind::GenericInst {
            let body = self.pool.last_son(f);
            return self.rel(bindings, body, a);
        }
        // An actual generic instance unfolds unless the formal is the
        // declared generic itself.
        if self.pool.kind(a) == TypeKind::GenericInst && self.pool.kind(f) != TypeKind::Generic {
            a = self.pool.last_son(a);
        }
        // `var T` actuals degrade to `T` against non-var formals.
        if self.pool.kind(a) == TypeKind::Var && self.pool.kind(f) != TypeKind::Var {
            a = self.pool.base(a);
        }

        match self.pool.kind(f) {
            TypeKind::None => {
                if self.pool.kind(a) == TypeKind::None {
                    Rank::Equal
                } else {
                    Rank::None
                }
            }
            TypeKind::Bool | TypeKind::Char => {
                let fk = self.pool.kind(f);
                if self.pool.kind(a) == fk {
                    Rank::Equal
                } else if self.pool.kind(a) == TypeKind::Range
                    && self.pool.kind(self.pool.skip_range(a)) == fk
                {
                    Rank::Subtype
                } else {
                    Rank::None
                }
            }
            TypeKind::Enum => {
                if a == f {
                    Rank::Equal
                } else if self.pool.kind(a) == TypeKind::Range && self.pool.skip_range(a) == f {
                    Rank::Subtype
                } else {
                    Rank::None
                }
            }
            TypeKind::AnyEnum => match self.pool.kind(a) {
                TypeKind::AnyEnum => Rank::Equal,
                _ if self.pool.kind(self.pool.skip_range(a)) == TypeKind::Enum => Rank::Subtype,
                _ => Rank::None,
            },
            TypeKind::Int
            | TypeKind::Int8
            | TypeKind::Int16
            | TypeKind::Int32
            | TypeKind::Int64 => self.int_rel(f, a),
            TypeKind::Float
            | TypeKind::Float32
            | TypeKind::Float64
            | TypeKind::Float128 => self.float_rel(f, a),
            TypeKind::Range => {
                if self.pool.kind(a) == TypeKind::Range {
                    let r = self.rel(bindings, self.pool.base(f), self.pool.base(a));
                    if r < Rank::Generic {
                        Rank::None
                    } else {
                        Rank::Equal
                    }
                } else if self.pool.kind(a) == self.pool.kind(self.pool.skip_range(f)) {
                    Rank::Convertible
                } else {
                    Rank::None
                }
            }
            TypeKind::String => match self.pool.kind(a) {
                TypeKind::String => Rank::Equal,
                TypeKind::Nil => Rank::Subtype,
                TypeKind::CString => Rank::Convertible,
                _ => Rank::None,
            },
            TypeKind::CString => match self.pool.kind(a) {
                TypeKind::CString => Rank::Equal,
                TypeKind::Nil => Rank::Subtype,
                TypeKind::String => Rank::Convertible,
                TypeKind::Array => {
                    // A zero-based char array is NUL-compatible storage.
                    let index = self.pool.base(a);
                    if self.pool.kind(self.pool.elem(a)) == TypeKind::Char
                        && self.pool.index_is_zero_based(self.nodes, index)
                    {
                        Rank::Convertible
                    } else {
                        Rank::None
                    }
                }
                TypeKind::Ptr => {
                    if self.pool.kind(self.pool.elem(a)) == TypeKind::Char {
                        Rank::Convertible
                    } else {
                        Rank::None
                    }
                }
                _ => Rank::None,
            },
            TypeKind::Pointer => match self.pool.kind(a) {
                TypeKind::Pointer => Rank::Equal,
                TypeKind::Nil => Rank::Subtype,
                TypeKind::Ref | TypeKind::Ptr | TypeKind::CString | TypeKind::Proc => {
                    Rank::Convertible
                }
                _ => Rank::None,
            },
            TypeKind::Nil => {
                if self.pool.kind(a) == TypeKind::Nil {
                    Rank::Equal
                } else {
                    Rank::None
                }
            }
            TypeKind::EmptySet => {
                if self.pool.kind(a) == TypeKind::EmptySet {
                    Rank::Equal
                } else {
                    Rank::None
                }
            }
            TypeKind::Array => match self.pool.kind(a) {
                TypeKind::Array => {
                    let index_r = self.rel(bindings, self.pool.base(f), self.pool.base(a));
                    let elem_r = self.rel(bindings, self.pool.elem(f), self.pool.elem(a));
                    let r = index_r.min(elem_r);
                    if r < Rank::Generic {
                        Rank::None
                    } else {
                        r
                    }
                }
                TypeKind::ArrayConstr => {
                    let elem_r = self.rel(bindings, self.pool.elem(f), self.pool.elem(a));
                    if !elem_r.is_match() {
                        return Rank::None;
                    }
                    let f_len = self.index_len(self.pool.base(f));
                    let a_len = self.index_len(self.pool.base(a));
                    if f_len != a_len && elem_r != Rank::Generic {
                        return Rank::None;
                    }
                    elem_r
                }
                _ => Rank::None,
            },
            TypeKind::ArrayConstr => {
                if self.pool.kind(a) == TypeKind::ArrayConstr
                    && self
                        .pool
                        .same_type(self.nodes, self.pool.elem(f), self.pool.elem(a))
                {
                    Rank::Equal
                } else {
                    Rank::None
                }
            }
            TypeKind::OpenArray => match self.pool.kind(a) {
                TypeKind::OpenArray => {
                    let r = self.rel(bindings, self.pool.elem(f), self.pool.elem(a));
                    if r < Rank::Generic {
                        Rank::None
                    } else {
                        r
                    }
                }
                TypeKind::ArrayConstr => {
                    if self.is_empty_constr(a) {
                        Rank::Subtype
                    } else if self.rel(bindings, self.pool.elem(f), self.pool.elem(a))
                        >= Rank::Generic
                    {
                        Rank::Subtype
                    } else {
                        Rank::None
                    }
                }
                TypeKind::Array => {
                    if self.rel(bindings, self.pool.elem(f), self.pool.elem(a)) >= Rank::Generic {
                        Rank::Subtype
                    } else {
                        Rank::None
                    }
                }
                TypeKind::Sequence => {
                    if self.rel(bindings, self.pool.elem(f), self.pool.elem(a)) >= Rank::Generic {
                        Rank::Convertible
                    } else {
                        Rank::None
                    }
                }
                _ => Rank::None,
            },
            TypeKind::Sequence => match self.pool.kind(a) {
                TypeKind::Sequence => {
                    let r = self.rel(bindings, self.pool.elem(f), self.pool.elem(a));
                    if r < Rank::Generic {
                        Rank::None
                    } else {
                        r
                    }
                }
                TypeKind::Nil => Rank::Subtype,
                TypeKind::ArrayConstr if self.is_empty_constr(a) => Rank::Subtype,
                _ => Rank::None,
            },
            TypeKind::Set => match self.pool.kind(a) {
                TypeKind::Set => {
                    if self.rel(bindings, self.pool.elem(f), self.pool.elem(a))
                        >= Rank::Convertible
                    {
                        Rank::Equal
                    } else {
                        Rank::None
                    }
                }
                TypeKind::EmptySet => Rank::Subtype,
                _ => Rank::None,
            },
            TypeKind::Tuple => {
                if self.pool.kind(a) != TypeKind::Tuple {
                    return Rank::None;
                }
                let f_len = self.pool.get(f).sons.len();
                let a_len = self.pool.get(a).sons.len();
                if a_len < f_len {
                    return Rank::None;
                }
                let mut r = Rank::Equal;
                for i in 0..f_len {
                    let (fs, as_) = (self.pool.get(f).sons[i], self.pool.get(a).sons[i]);
                    let field_r = self.rel(bindings, fs, as_);
                    if !field_r.is_match() {
                        return Rank::None;
                    }
                    r = r.min(field_r);
                }
                if a_len > f_len {
                    // The actual carries extra trailing fields.
                    r = r.min(Rank::Subtype);
                }
                r
            }
            TypeKind::Record => match self.pool.kind(a) {
                TypeKind::Record => {
                    if self.pool.same_type(self.nodes, f, a) {
                        Rank::Equal
                    } else {
                        Rank::None
                    }
                }
                TypeKind::RecordConstr => self.record_constr_rel(bindings, f, a),
                _ => Rank::None,
            },
            TypeKind::RecordConstr => {
                if self.pool.kind(a) == TypeKind::RecordConstr
                    && self.pool.same_type(self.nodes, f, a)
                {
                    Rank::Equal
                } else {
                    Rank::None
                }
            }
            TypeKind::Object => {
                if a == f {
                    Rank::Equal
                } else if self.pool.kind(a) == TypeKind::Object && self.object_chains_to(f, a) {
                    Rank::Subtype
                } else {
                    Rank::None
                }
            }
            TypeKind::Distinct => {
                if a == f {
                    Rank::Equal
                } else {
                    Rank::None
                }
            }
            TypeKind::Ref | TypeKind::Ptr => {
                let fk = self.pool.kind(f);
                if self.pool.kind(a) == fk {
                    // Invariant on the element type.
                    let r = self.rel(bindings, self.pool.elem(f), self.pool.elem(a));
                    if r < Rank::Generic {
                        Rank::None
                    } else {
                        r
                    }
                } else if self.pool.kind(a) == TypeKind::Nil {
                    Rank::Subtype
                } else {
                    Rank::None
                }
            }
            TypeKind::Var => {
                let inner = self.pool.skip_var(a);
                self.rel(bindings, self.pool.base(f), inner)
            }
            TypeKind::Proc => self.proc_rel(bindings, f, a),
            TypeKind::GenericParam => {
                if let Some(bound) = bindings.get(f) {
                    return self.rel(bindings, bound, a);
                }
                let Some(concrete) = self.concretise(a) else {
                    return Rank::None;
                };
                let constraints: Vec<TypeId> = self.pool.get(f).sons.to_vec();
                if !constraints.is_empty() {
                    let satisfied = constraints
                        .iter()
                        .any(|&c| self.rel(bindings, c, a) >= Rank::Subtype);
                    if !satisfied {
                        return Rank::None;
                    }
                }
                bindings.bind(f, concrete);
                Rank::Generic
            }
            TypeKind::Generic => {
                if self.pool.kind(a) != TypeKind::GenericInst {
                    return Rank::None;
                }
                if self.pool.get(f).container_id != self.pool.get(a).container_id {
                    return Rank::None;
                }
                let f_arity = self.pool.get(f).sons.len().saturating_sub(1);
                let a_arity = self.pool.get(a).sons.len().saturating_sub(2);
                if f_arity != a_arity {
                    return Rank::None;
                }
                for i in 0..f_arity {
                    let (fp, ap) = (self.pool.get(f).sons[i], self.pool.get(a).sons[i + 1]);
                    if self.rel(bindings, fp, ap) < Rank::Generic {
                        return Rank::None;
                    }
                }
                Rank::Generic
            }
            TypeKind::GenericInst => {
                // Unfolded at entry; kept total.
                let body = self.pool.last_son(f);
                self.rel(bindings, body, a)
            }
            TypeKind::Forward => Rank::None,
        }
    }
}
