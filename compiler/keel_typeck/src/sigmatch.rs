//! Parameter matching: score one candidate against a call.
//!
//! Walks the actual arguments of a call node, binding named and
//! positional parameters, and builds the rewritten call as it goes:
//! arguments land at their formal's position, defaults are copied in,
//! and every non-exact match is made explicit with a hidden-conversion
//! node. A failed candidate is a `NoMatch` state, never an error
//! return; diagnostics for *shape* problems (bad named parameter,
//! duplicate binding) are emitted here because no candidate can accept
//! such a call.

use crate::candidate::{Candidate, MatchState};
use crate::instantiate::substitute_type;
use crate::rel::type_rel;
use crate::{Context, Rank};
use keel_diagnostic::DiagKind;
use keel_ir::{Name, NodeId, NodeKind, NodePayload, SymId, TypeId};
use keel_table::IdSet;
use keel_types::{TypeFlags, TypeKind, TypePool};

/// The parameter symbol at formal position `idx`, if the proc type has
/// its formal-params node attached.
fn formal_sym(ctx: &Context, typ: TypeId, idx: usize) -> Option<SymId> {
    let n = ctx.types.get(typ).n;
    if n.is_none() {
        return None;
    }
    let slot = ctx.nodes.get(n).son(idx + 1);
    if slot.is_none() {
        return None;
    }
    Some(ctx.nodes.get(slot).sym())
}

/// Formal position for a named argument.
fn formal_index_by_name(ctx: &Context, typ: TypeId, name: Name) -> Option<usize> {
    for i in 0..ctx.types.proc_param_count(typ) {
        let sym = formal_sym(ctx, typ, i)?;
        if ctx.syms.get(sym).name == name {
            return Some(i);
        }
    }
    None
}

/// Wrap `arg` (copied) in a conversion node of `kind` typed `typ`.
fn wrap(ctx: &mut Context, kind: NodeKind, typ: TypeId, arg: NodeId) -> NodeId {
    let loc = ctx.nodes.get(arg).loc;
    let copy = ctx.nodes.copy_tree(arg);
    ctx.new_tree(kind, loc, typ, vec![copy])
}

/// Lower one varargs-tail actual: strings go through the C string
/// bridge, everything else is appended verbatim.
fn varargs_arg(ctx: &mut Context, arg: NodeId) -> NodeId {
    let a_type = ctx.nodes.get(arg).typ;
    if ctx.types.kind(a_type) == TypeKind::String {
        wrap(ctx, NodeKind::StringToCString, TypePool::CSTRING, arg)
    } else {
        ctx.nodes.copy_tree(arg)
    }
}

/// Convert `arg` according to its computed rank against `formal`.
fn convert_by_rank(
    ctx: &mut Context,
    m: &mut Candidate,
    formal: TypeId,
    arg: NodeId,
    r: Rank,
    allow_base: bool,
) -> Option<NodeId> {
    match r {
        Rank::Equal => {
            m.tally(r);
            // An open-array formal still needs the wrapper: the callee
            // expects length-plus-pointer, not the raw value.
            if ctx.types.kind(ctx.types.skip_generic_inst(formal)) == TypeKind::OpenArray {
                Some(wrap(ctx, NodeKind::HiddenStdConv, formal, arg))
            } else {
                Some(ctx.nodes.copy_tree(arg))
            }
        }
        Rank::Subtype => {
            m.tally(r);
            let inst = substitute_type(&mut ctx.types, &m.bindings, formal);
            Some(wrap(ctx, NodeKind::HiddenSubConv, inst, arg))
        }
        Rank::Generic => {
            m.tally(r);
            let inst = substitute_type(&mut ctx.types, &m.bindings, formal);
            let copy = ctx.nodes.copy_tree(arg);
            ctx.nodes.get_mut(copy).typ = inst;
            Some(copy)
        }
        Rank::Convertible => {
            m.tally(r);
            let inst = substitute_type(&mut ctx.types, &m.bindings, formal);
            Some(wrap(ctx, NodeKind::HiddenStdConv, inst, arg))
        }
        Rank::None => {
            if allow_base {
                let skipped = ctx.types.skip_generic_inst(formal);
                if matches!(
                    ctx.types.kind(skipped),
                    TypeKind::OpenArray | TypeKind::Sequence
                ) {
                    // The actual may match the *element* type, enabling
                    // the implicit bracket container for the tail.
                    let elem = ctx.types.elem(skipped);
                    let a_type = ctx.nodes.get(arg).typ;
                    let r2 = type_rel(
                        &mut ctx.types,
                        &ctx.nodes,
                        &ctx.syms,
                        &mut m.bindings,
                        elem,
                        a_type,
                    );
                    if r2.is_match() {
                        m.base_type_match = true;
                        return convert_by_rank(ctx, m, elem, arg, r2, false);
                    }
                }
            }
            try_converters(ctx, m, formal, arg)
        }
    }
}

/// User converters: the last resort for a `None` rank. A converter
/// applies when its domain takes the actual exactly and its codomain is
/// exactly the formal.
fn try_converters(
    ctx: &mut Context,
    m: &mut Candidate,
    formal: TypeId,
    arg: NodeId,
) -> Option<NodeId> {
    let a_type = ctx.nodes.get(arg).typ;
    for i in 0..ctx.converters.len() {
        let conv = ctx.converters[i];
        let ct = ctx.syms.get(conv).typ;
        if ct.is_none()
            || ctx.types.kind(ct) != TypeKind::Proc
            || ctx.types.proc_param_count(ct) != 1
        {
            continue;
        }
        let domain = ctx.types.proc_param(ct, 0);
        let codomain = ctx.types.proc_ret(ct);
        if codomain.is_none() {
            continue;
        }
        let mut scratch = crate::GenericBindings::new();
        let dom_r = type_rel(
            &mut ctx.types,
            &ctx.nodes,
            &ctx.syms,
            &mut scratch,
            domain,
            a_type,
        );
        if dom_r != Rank::Equal {
            continue;
        }
        let mut scratch = crate::GenericBindings::new();
        let cod_r = type_rel(
            &mut ctx.types,
            &ctx.nodes,
            &ctx.syms,
            &mut scratch,
            formal,
            codomain,
        );
        if cod_r != Rank::Equal {
            continue;
        }
        let loc = ctx.nodes.get(arg).loc;
        let conv_sym = ctx.new_sym_node(conv, loc);
        let copy = ctx.nodes.copy_tree(arg);
        let node = ctx.new_tree(NodeKind::HiddenCallConv, loc, codomain, vec![conv_sym, copy]);
        m.tally(Rank::Convertible);
        return Some(node);
    }
    None
}

/// Run the relation for one argument and materialise its conversion.
fn param_types_match(
    ctx: &mut Context,
    m: &mut Candidate,
    formal: TypeId,
    arg: NodeId,
) -> Option<NodeId> {
    if arg.is_none() {
        return None;
    }
    let a_type = ctx.nodes.get(arg).typ;
    // An argument the typechecker already wrapped for this formal is
    // recognised and not re-wrapped.
    if ctx.nodes.get(arg).kind.is_hidden_conv() {
        let inst = substitute_type(&mut ctx.types, &m.bindings, formal);
        if ctx.types.same_type(&ctx.nodes, inst, a_type) {
            m.tally(Rank::Equal);
            return Some(ctx.nodes.copy_tree(arg));
        }
    }
    let r = type_rel(
        &mut ctx.types,
        &ctx.nodes,
        &ctx.syms,
        &mut m.bindings,
        formal,
        a_type,
    );
    convert_by_rank(ctx, m, formal, arg, r, true)
}

/// Build the bracket container's type once its length is known.
fn seal_container(ctx: &mut Context, container: NodeId, elem: TypeId) {
    let len = ctx.nodes.get(container).len() as i64;
    let loc = ctx.nodes.get(container).loc;
    let lo = ctx
        .nodes
        .alloc(keel_ir::Node::new(NodeKind::IntLit, loc, NodePayload::Int(0)));
    ctx.nodes.get_mut(lo).typ = TypePool::INT;
    let hi = ctx.nodes.alloc(keel_ir::Node::new(
        NodeKind::IntLit,
        loc,
        NodePayload::Int(len - 1),
    ));
    ctx.nodes.get_mut(hi).typ = TypePool::INT;
    let bounds = ctx.nodes.alloc_with(NodeKind::RangeExpr, loc, vec![lo, hi]);
    let index = ctx.types.range_type(TypePool::INT, bounds);
    let typ = ctx.types.array_constr(index, elem);
    ctx.nodes.get_mut(container).typ = typ;
}

/// Score `callee` against `call`, producing the candidate with its
/// tallies and rewritten call.
pub fn match_call(ctx: &mut Context, call: NodeId, callee: SymId) -> Candidate {
    let typ = ctx.syms.get(callee).typ;
    let mut m = Candidate::new(callee, typ);
    if typ.is_none() || ctx.types.kind(typ) != TypeKind::Proc {
        m.state = MatchState::NoMatch;
        return m;
    }

    let loc = ctx.nodes.get(call).loc;
    let formal_count = ctx.types.proc_param_count(typ);
    let varargs = ctx.types.get(typ).flags.contains(TypeFlags::VARARGS);

    let callee_node = ctx.new_sym_node(callee, loc);
    let mut sons = vec![NodeId::NONE; formal_count + 1];
    sons[0] = callee_node;
    m.call = ctx.new_tree(ctx.nodes.get(call).kind, loc, TypeId::NONE, sons);

    let mut marker = IdSet::new();
    let mut f = 0usize;
    let mut container: Option<(NodeId, TypeId)> = None;

    let n_args = ctx.nodes.get(call).len();
    for a_idx in 1..n_args {
        let arg = ctx.nodes.get(call).son(a_idx);
        let is_named = arg.is_some() && ctx.nodes.get(arg).kind == NodeKind::ExprEqExpr;
        if is_named {
            let name_node = ctx.nodes.get(arg).son(0);
            if ctx.nodes.get(name_node).kind != NodeKind::Ident {
                let nloc = ctx.nodes.get(name_node).loc;
                ctx.diags.error(
                    DiagKind::NamedParamHasToBeIdent,
                    nloc,
                    "named parameter has to be an identifier",
                );
                m.state = MatchState::NoMatch;
                return m;
            }
            let pname = ctx.nodes.get(name_node).ident();
            let Some(idx) = formal_index_by_name(ctx, typ, pname) else {
                ctx.diags.error(
                    DiagKind::Generated,
                    ctx.nodes.get(name_node).loc,
                    format!(
                        "unknown named parameter: '{}'",
                        ctx.interner.lookup(pname)
                    ),
                );
                m.state = MatchState::NoMatch;
                return m;
            };
            if !marker.insert_new(idx as i64) {
                ctx.diags.error(
                    DiagKind::CannotBindTwice,
                    ctx.nodes.get(name_node).loc,
                    format!("cannot bind '{}' twice", ctx.interner.lookup(pname)),
                );
                m.state = MatchState::NoMatch;
                return m;
            }
            let value = ctx.nodes.get(arg).son(1);
            let formal_t = ctx.types.proc_param(typ, idx);
            m.base_type_match = false;
            match param_types_match(ctx, &mut m, formal_t, value) {
                Some(conv) if !m.base_type_match => ctx.nodes.set_son(m.call, idx + 1, conv),
                // A container cannot be opened at a named position.
                _ => {
                    m.state = MatchState::NoMatch;
                    return m;
                }
            }
        } else if let Some((cont, elem)) = container {
            // Funnel trailing actuals into the open container.
            let a_type = ctx.nodes.get(arg).typ;
            let r = type_rel(
                &mut ctx.types,
                &ctx.nodes,
                &ctx.syms,
                &mut m.bindings,
                elem,
                a_type,
            );
            match convert_by_rank(ctx, &mut m, elem, arg, r, false) {
                Some(conv) => ctx.nodes.add_son(cont, conv),
                None => {
                    m.state = MatchState::NoMatch;
                    return m;
                }
            }
        } else {
            // Positional arguments bind to the next *unmatched* formal.
            while f < formal_count && marker.contains(f as i64) {
                f += 1;
            }
            if f >= formal_count {
                if !varargs {
                    m.state = MatchState::NoMatch;
                    return m;
                }
                let conv = varargs_arg(ctx, arg);
                ctx.nodes.add_son(m.call, conv);
                continue;
            }
            let formal_t = ctx.types.proc_param(typ, f);
            m.base_type_match = false;
            match param_types_match(ctx, &mut m, formal_t, arg) {
                Some(conv) => {
                    if m.base_type_match {
                        // Only the last parameter may collect a tail.
                        if f != formal_count - 1 {
                            m.state = MatchState::NoMatch;
                            return m;
                        }
                        let skipped = ctx.types.skip_generic_inst(formal_t);
                        let elem = ctx.types.elem(skipped);
                        let aloc = ctx.nodes.get(arg).loc;
                        let bracket =
                            ctx.new_tree(NodeKind::Bracket, aloc, TypeId::NONE, vec![conv]);
                        ctx.nodes.set_son(m.call, f + 1, bracket);
                        container = Some((bracket, elem));
                    } else {
                        ctx.nodes.set_son(m.call, f + 1, conv);
                    }
                    marker.insert(f as i64);
                    f += 1;
                }
                None => {
                    m.state = MatchState::NoMatch;
                    return m;
                }
            }
        }
    }

    // Fill defaults; a formal with neither an argument nor a default
    // rejects the candidate.
    for idx in 0..formal_count {
        if marker.contains(idx as i64) {
            continue;
        }
        let default = formal_sym(ctx, typ, idx)
            .map(|s| ctx.syms.get(s).ast)
            .unwrap_or(NodeId::NONE);
        if default.is_none() {
            m.state = MatchState::NoMatch;
            return m;
        }
        let copy = ctx.nodes.copy_tree(default);
        ctx.nodes.set_son(m.call, idx + 1, copy);
    }

    if let Some((cont, elem)) = container {
        seal_container(ctx, cont, elem);
    }

    m.state = MatchState::Match;
    m
}
