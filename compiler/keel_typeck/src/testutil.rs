//! Builders shared by the typeck tests.

use crate::Context;
use keel_ir::{Loc, Node, NodeId, NodeKind, NodePayload, SymId, SymKind, Symbol, TypeId};
use keel_types::CallConv;

/// Declare `proc name(params): ret` in the current scope and return its
/// symbol. `defaults` maps parameter positions to default-value nodes.
pub(crate) fn declare_proc_full(
    ctx: &mut Context,
    name: &str,
    params: &[(&str, TypeId)],
    defaults: &[(usize, NodeId)],
    ret: TypeId,
    varargs: bool,
) -> SymId {
    let mut param_nodes = vec![NodeId::NONE];
    for (i, &(pname, ptype)) in params.iter().enumerate() {
        let pname = ctx.interner.intern(pname);
        let mut psym = Symbol::new(SymKind::Param, pname, Loc::UNKNOWN);
        psym.typ = ptype;
        psym.position = i as i32;
        if let Some(&(_, default)) = defaults.iter().find(|&&(pos, _)| pos == i) {
            psym.ast = default;
        }
        let pid = ctx.syms.alloc(psym);
        param_nodes.push(ctx.new_sym_node(pid, Loc::UNKNOWN));
    }
    let formal = ctx
        .nodes
        .alloc_with(NodeKind::FormalParams, Loc::UNKNOWN, param_nodes);

    let typ = ctx.types.proc_type(
        ret,
        params.iter().map(|&(_, t)| t),
        CallConv::Default,
        varargs,
    );
    ctx.types.get_mut(typ).n = formal;

    let name = ctx.interner.intern(name);
    let mut sym = Symbol::new(SymKind::Proc, name, Loc::UNKNOWN);
    sym.typ = typ;
    let id = ctx.syms.alloc(sym);
    ctx.declare(id);
    id
}

pub(crate) fn declare_proc(
    ctx: &mut Context,
    name: &str,
    params: &[(&str, TypeId)],
    ret: TypeId,
) -> SymId {
    declare_proc_full(ctx, name, params, &[], ret, false)
}

/// Declare a converter `conv(domain): codomain`.
pub(crate) fn declare_converter(
    ctx: &mut Context,
    name: &str,
    domain: TypeId,
    codomain: TypeId,
) -> SymId {
    let typ = ctx
        .types
        .proc_type(codomain, [domain], CallConv::Default, false);
    let name = ctx.interner.intern(name);
    let mut sym = Symbol::new(SymKind::Converter, name, Loc::UNKNOWN);
    sym.typ = typ;
    let id = ctx.syms.alloc(sym);
    ctx.declare(id);
    id
}

pub(crate) fn int_lit(ctx: &mut Context, v: i64) -> NodeId {
    let id = ctx
        .nodes
        .alloc(Node::new(NodeKind::IntLit, Loc::UNKNOWN, NodePayload::Int(v)));
    ctx.nodes.get_mut(id).typ = keel_types::TypePool::INT;
    id
}

pub(crate) fn typed_int_lit(ctx: &mut Context, v: i64, typ: TypeId) -> NodeId {
    let id = int_lit(ctx, v);
    ctx.nodes.get_mut(id).typ = typ;
    id
}

pub(crate) fn float_lit(ctx: &mut Context, v: f64) -> NodeId {
    let id = ctx.nodes.alloc(Node::new(
        NodeKind::FloatLit,
        Loc::UNKNOWN,
        NodePayload::Float(v),
    ));
    ctx.nodes.get_mut(id).typ = keel_types::TypePool::FLOAT;
    id
}

pub(crate) fn str_lit(ctx: &mut Context, s: &str) -> NodeId {
    let id = ctx.nodes.alloc(Node::new(
        NodeKind::StrLit,
        Loc::UNKNOWN,
        NodePayload::Str(s.into()),
    ));
    ctx.nodes.get_mut(id).typ = keel_types::TypePool::STRING;
    id
}

/// A call node `name(args)` with an unresolved identifier callee.
pub(crate) fn call(ctx: &mut Context, name: &str, args: Vec<NodeId>) -> NodeId {
    let name = ctx.interner.intern(name);
    let ident = ctx
        .nodes
        .alloc(Node::new(NodeKind::Ident, Loc::UNKNOWN, NodePayload::Ident(name)));
    let mut sons = vec![ident];
    sons.extend(args);
    ctx.new_tree(NodeKind::Call, Loc::UNKNOWN, TypeId::NONE, sons)
}

/// A named argument `name = value`.
pub(crate) fn named_arg(ctx: &mut Context, name: &str, value: NodeId) -> NodeId {
    let name = ctx.interner.intern(name);
    let ident = ctx
        .nodes
        .alloc(Node::new(NodeKind::Ident, Loc::UNKNOWN, NodePayload::Ident(name)));
    ctx.new_tree(NodeKind::ExprEqExpr, Loc::UNKNOWN, TypeId::NONE, vec![ident, value])
}
