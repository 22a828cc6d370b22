//! Generic instantiation.
//!
//! Builds a concrete procedure from a generic template by substituting
//! the bound generic parameters wherever they appear in the template's
//! types and body. Instances are cached by (template, normalised
//! bindings) so repeated calls cannot re-instantiate exponentially.

use crate::{Context, GenericBindings};
use keel_ir::{NodeId, NodeKind, NodePayload, SymFlags, SymId, TypeId};
use keel_types::{TypeKind, TypePool};

/// Does `t` contain a generic parameter anywhere in its structural
/// skeleton? Nominal kinds stop the walk (their cycles are not part of
/// the skeleton).
pub(crate) fn contains_generic_param(pool: &TypePool, t: TypeId) -> bool {
    if t.is_none() {
        return false;
    }
    match pool.kind(t) {
        TypeKind::GenericParam => true,
        k if k.is_nominal() => false,
        _ => {
            let sons: Vec<TypeId> = pool.get(t).sons.to_vec();
            sons.iter().any(|&son| contains_generic_param(pool, son))
        }
    }
}

/// Substitute bound generic parameters through a type.
///
/// Unchanged subtrees are returned as-is; a fresh descriptor is only
/// allocated on the path from the root to a replaced parameter.
pub fn substitute_type(pool: &mut TypePool, bindings: &GenericBindings, t: TypeId) -> TypeId {
    if t.is_none() {
        return t;
    }
    match pool.kind(t) {
        TypeKind::GenericParam => bindings.get(t).unwrap_or(t),
        k if k.is_nominal() => t,
        _ => {
            let sons: Vec<TypeId> = pool.get(t).sons.to_vec();
            let new_sons: Vec<TypeId> = sons
                .iter()
                .map(|&son| substitute_type(pool, bindings, son))
                .collect();
            if new_sons == sons {
                return t;
            }
            let mut data = pool.get(t).clone();
            data.sons = new_sons.into_iter().collect();
            pool.alloc(data)
        }
    }
}

/// Instantiate a generic routine against inferred bindings.
///
/// Returns the cached instance when the same template was already
/// instantiated with the same (normalised) bindings.
#[tracing::instrument(level = "debug", skip(ctx, bindings))]
pub fn instantiate_proc(ctx: &mut Context, template: SymId, bindings: &GenericBindings) -> SymId {
    let mut key: Vec<(u32, u32)> = bindings.iter().map(|(k, v)| (k, v.raw())).collect();
    key.sort_unstable();
    if let Some(&instance) = ctx.instances.get(&(template, key.clone())) {
        tracing::debug!(?template, ?instance, "instantiation cache hit");
        return instance;
    }

    let old_type = ctx.syms.get(template).typ;
    let old_n = ctx.types.get(old_type).n;
    let param_count = ctx.types.proc_param_count(old_type);

    // Substituted signature.
    let new_ret = {
        let r = ctx.types.proc_ret(old_type);
        if r.is_some() {
            substitute_type(&mut ctx.types, bindings, r)
        } else {
            r
        }
    };
    let new_params: Vec<TypeId> = (0..param_count)
        .map(|i| {
            let p = ctx.types.proc_param(old_type, i);
            substitute_type(&mut ctx.types, bindings, p)
        })
        .collect();

    let old_data = ctx.types.get(old_type);
    let (callconv, varargs) = (
        old_data.callconv,
        old_data
            .flags
            .contains(keel_types::TypeFlags::VARARGS),
    );
    let new_type = ctx
        .types
        .proc_type(new_ret, new_params.iter().copied(), callconv, varargs);

    // The concrete symbol. The body is copied so later passes can
    // specialise it without touching the template.
    let mut inst_sym = ctx.syms.get(template).clone();
    inst_sym.typ = new_type;
    inst_sym.owner = template;
    inst_sym.flags |= SymFlags::USED;
    inst_sym.flags.remove(SymFlags::FORWARD);
    let body = inst_sym.ast;
    inst_sym.ast = ctx.nodes.copy_tree(body);
    let instance = ctx.syms.alloc(inst_sym);

    // Fresh formal-params node with fresh parameter symbols, so
    // defaults and names survive into the instance.
    if old_n.is_some() {
        let loc = ctx.nodes.get(old_n).loc;
        let mut sons = vec![NodeId::NONE];
        for (i, &ptype) in new_params.iter().enumerate() {
            let slot = ctx.nodes.get(old_n).son(i + 1);
            if slot.is_none() {
                sons.push(NodeId::NONE);
                continue;
            }
            let old_sym = ctx.nodes.get(slot).sym();
            let mut psym = ctx.syms.get(old_sym).clone();
            psym.typ = ptype;
            psym.owner = instance;
            let default = psym.ast;
            if default.is_some() {
                psym.ast = ctx.nodes.copy_tree(default);
            }
            let pid = ctx.syms.alloc(psym);
            let ploc = ctx.nodes.get(slot).loc;
            let mut node = keel_ir::Node::new(NodeKind::Sym, ploc, NodePayload::Sym(pid));
            node.typ = ptype;
            sons.push(ctx.nodes.alloc(node));
        }
        let n = ctx.nodes.alloc_with(NodeKind::FormalParams, loc, sons);
        ctx.types.get_mut(new_type).n = n;
    }

    ctx.instances.insert((template, key), instance);
    instance
}
