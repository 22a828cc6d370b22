//! Type-to-string rendering for diagnostics.
//!
//! Diagnostics print canonical type spellings (`seq[int]`,
//! `range 0..2(int)`, `proc (x: int): float`). The full source renderer
//! lives elsewhere; this module only needs to name types.

use crate::{TypeFlags, TypeKind, TypePool};
use keel_ir::{Interner, NodeArena, SymArena, TypeId};
use std::fmt::Write as _;

/// Borrow bundle for formatting types.
pub struct TypeFormatter<'a> {
    pub pool: &'a TypePool,
    pub syms: &'a SymArena,
    pub nodes: &'a NodeArena,
    pub interner: &'a Interner,
}

impl<'a> TypeFormatter<'a> {
    pub fn new(
        pool: &'a TypePool,
        syms: &'a SymArena,
        nodes: &'a NodeArena,
        interner: &'a Interner,
    ) -> Self {
        TypeFormatter {
            pool,
            syms,
            nodes,
            interner,
        }
    }

    /// Canonical spelling of a type.
    pub fn format(&self, t: TypeId) -> String {
        let mut out = String::new();
        let mut visiting = Vec::new();
        self.write(&mut out, t, &mut visiting);
        out
    }

    /// `proc name(x: int, y: float): ret` for overload listings.
    pub fn proc_header(&self, sym: keel_ir::SymId) -> String {
        let s = self.syms.get(sym);
        let mut out = String::new();
        let _ = write!(out, "proc {}", self.interner.lookup(s.name));
        let t = s.typ;
        if t.is_none() {
            return out;
        }
        out.push('(');
        let n = self.pool.get(t).n;
        for i in 0..self.pool.proc_param_count(t) {
            if i > 0 {
                out.push_str(", ");
            }
            // Prefer the parameter symbol's name when the formal-params
            // node is attached.
            if n.is_some() {
                let param_node = self.nodes.get(n).son(i + 1);
                if param_node.is_some() {
                    let psym = self.nodes.get(param_node).sym();
                    let _ = write!(out, "{}: ", self.interner.lookup(self.syms.get(psym).name));
                }
            }
            out.push_str(&self.format(self.pool.proc_param(t, i)));
        }
        out.push(')');
        let ret = self.pool.proc_ret(t);
        if ret.is_some() {
            let _ = write!(out, ": {}", self.format(ret));
        }
        out
    }

    fn write_named(&self, out: &mut String, t: TypeId, fallback: &str) {
        let sym = self.pool.get(t).sym;
        if sym.is_some() {
            out.push_str(self.interner.lookup(self.syms.get(sym).name));
        } else {
            out.push_str(fallback);
        }
    }

    fn write(&self, out: &mut String, t: TypeId, visiting: &mut Vec<TypeId>) {
        if t.is_none() {
            out.push_str("empty");
            return;
        }
        if visiting.contains(&t) {
            out.push_str("...");
            return;
        }
        visiting.push(t);
        self.write_inner(out, t, visiting);
        visiting.pop();
    }

    fn write_inner(&self, out: &mut String, t: TypeId, visiting: &mut Vec<TypeId>) {
        let data = self.pool.get(t);
        match data.kind {
            TypeKind::None => out.push_str("empty"),
            TypeKind::Bool => out.push_str("bool"),
            TypeKind::Char => out.push_str("char"),
            TypeKind::Int => out.push_str("int"),
            TypeKind::Int8 => out.push_str("int8"),
            TypeKind::Int16 => out.push_str("int16"),
            TypeKind::Int32 => out.push_str("int32"),
            TypeKind::Int64 => out.push_str("int64"),
            TypeKind::Float => out.push_str("float"),
            TypeKind::Float32 => out.push_str("float32"),
            TypeKind::Float64 => out.push_str("float64"),
            TypeKind::Float128 => out.push_str("float128"),
            TypeKind::String => out.push_str("string"),
            TypeKind::CString => out.push_str("cstring"),
            TypeKind::Pointer => out.push_str("pointer"),
            TypeKind::AnyEnum => out.push_str("enum"),
            TypeKind::Nil => out.push_str("nil"),
            TypeKind::EmptySet => out.push_str("set[]"),
            TypeKind::Forward => self.write_named(out, t, "forward"),
            TypeKind::Array => {
                out.push_str("array[");
                self.write(out, data.base(), visiting);
                out.push_str(", ");
                self.write(out, data.last_son(), visiting);
                out.push(']');
            }
            TypeKind::ArrayConstr => {
                out.push_str("array constructor[");
                self.write(out, data.base(), visiting);
                out.push_str(", ");
                self.write(out, data.last_son(), visiting);
                out.push(']');
            }
            TypeKind::OpenArray => {
                out.push_str("openarray[");
                self.write(out, data.last_son(), visiting);
                out.push(']');
            }
            TypeKind::Sequence => {
                out.push_str("seq[");
                self.write(out, data.last_son(), visiting);
                out.push(']');
            }
            TypeKind::Set => {
                out.push_str("set[");
                self.write(out, data.last_son(), visiting);
                out.push(']');
            }
            TypeKind::Tuple => {
                out.push_str("tuple[");
                for (i, &son) in data.sons.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    self.write(out, son, visiting);
                }
                out.push(']');
            }
            TypeKind::Ref => {
                out.push_str("ref ");
                self.write(out, data.last_son(), visiting);
            }
            TypeKind::Ptr => {
                out.push_str("ptr ");
                self.write(out, data.last_son(), visiting);
            }
            TypeKind::Var => {
                out.push_str("var ");
                self.write(out, data.last_son(), visiting);
            }
            TypeKind::Distinct => {
                if data.sym.is_some() {
                    self.write_named(out, t, "distinct");
                } else {
                    out.push_str("distinct ");
                    self.write(out, data.base(), visiting);
                }
            }
            TypeKind::Range => {
                let (lo, hi) = self.pool.range_bounds(self.nodes, t);
                let _ = write!(out, "range {lo}..{hi}(");
                self.write(out, data.base(), visiting);
                out.push(')');
            }
            TypeKind::Record => self.write_named(out, t, "record"),
            TypeKind::RecordConstr => out.push_str("record constructor"),
            TypeKind::Object => self.write_named(out, t, "object"),
            TypeKind::Enum => self.write_named(out, t, "enum"),
            TypeKind::Generic => self.write_named(out, t, "generic"),
            TypeKind::GenericParam => self.write_named(out, t, "T"),
            TypeKind::GenericInst => {
                // template[args]
                let template = data.base();
                self.write(out, template, visiting);
                out.push('[');
                if data.sons.len() > 2 {
                    for (i, &arg) in data.sons[1..data.sons.len() - 1].iter().enumerate() {
                        if i > 0 {
                            out.push_str(", ");
                        }
                        self.write(out, arg, visiting);
                    }
                }
                out.push(']');
            }
            TypeKind::Proc => {
                out.push_str("proc (");
                for i in 0..self.pool.proc_param_count(t) {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    self.write(out, self.pool.proc_param(t, i), visiting);
                }
                out.push(')');
                let ret = self.pool.proc_ret(t);
                if ret.is_some() {
                    out.push_str(": ");
                    self.write(out, ret, visiting);
                }
                if data.flags.contains(TypeFlags::VARARGS) {
                    out.push_str(" {.varargs.}");
                }
                if data.callconv != crate::CallConv::Default {
                    let _ = write!(out, " {{.{}.}}", data.callconv.name());
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CallConv;
    use keel_ir::{Loc, Node, NodeKind, NodePayload};

    #[test]
    fn primitive_and_compound_spellings() {
        let mut pool = TypePool::new();
        let syms = SymArena::new();
        let nodes = NodeArena::new();
        let interner = Interner::new();
        let fmt = TypeFormatter::new(&pool, &syms, &nodes, &interner);
        assert_eq!(fmt.format(TypePool::INT), "int");

        let seq = pool.sequence(TypePool::STRING);
        let fmt = TypeFormatter::new(&pool, &syms, &nodes, &interner);
        assert_eq!(fmt.format(seq), "seq[string]");
    }

    #[test]
    fn range_spelling_reads_bounds() {
        let mut pool = TypePool::new();
        let syms = SymArena::new();
        let mut nodes = NodeArena::new();
        let interner = Interner::new();

        let lo = nodes.alloc(Node::new(NodeKind::IntLit, Loc::UNKNOWN, NodePayload::Int(0)));
        let hi = nodes.alloc(Node::new(NodeKind::IntLit, Loc::UNKNOWN, NodePayload::Int(2)));
        let bounds = nodes.alloc_with(NodeKind::RangeExpr, Loc::UNKNOWN, vec![lo, hi]);
        let range = pool.range_type(TypePool::INT, bounds);
        let arr = pool.array(range, TypePool::INT);

        let fmt = TypeFormatter::new(&pool, &syms, &nodes, &interner);
        assert_eq!(fmt.format(arr), "array[range 0..2(int), int]");
    }

    #[test]
    fn proc_spelling() {
        let mut pool = TypePool::new();
        let syms = SymArena::new();
        let nodes = NodeArena::new();
        let interner = Interner::new();
        let p = pool.proc_type(
            TypePool::FLOAT,
            [TypePool::INT],
            CallConv::Default,
            false,
        );
        let fmt = TypeFormatter::new(&pool, &syms, &nodes, &interner);
        assert_eq!(fmt.format(p), "proc (int): float");
    }
}
