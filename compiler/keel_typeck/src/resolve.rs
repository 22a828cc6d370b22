//! Overload resolution: pick the unique best candidate for a call.

use crate::candidate::{cmp_candidates, Candidate, MatchState};
use crate::instantiate::{contains_generic_param, instantiate_proc};
use crate::sigmatch::match_call;
use crate::Context;
use keel_diagnostic::DiagKind;
use keel_ir::{NodeId, NodeKind, NodePayload, SymFlags, SymId};
use std::cmp::Ordering;

/// Is the candidate's signature generic (so the winner must be
/// instantiated before use)?
fn needs_instantiation(ctx: &Context, m: &Candidate) -> bool {
    if m.generic > 0 || !m.bindings.is_empty() {
        return true;
    }
    let typ = m.callee_type;
    (0..ctx.types.proc_param_count(typ))
        .any(|i| contains_generic_param(&ctx.types, ctx.types.proc_param(typ, i)))
}

/// The `got (...)` line of a type-mismatch diagnostic.
fn describe_args(ctx: &Context, call: NodeId) -> String {
    let fmt = ctx.type_formatter();
    let mut out = String::from("(");
    for (i, &arg) in ctx.nodes.get(call).sons().iter().skip(1).enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        if arg.is_none() {
            out.push('?');
            continue;
        }
        let node = ctx.nodes.get(arg);
        if node.kind == NodeKind::ExprEqExpr {
            let value = node.son(1);
            out.push_str(&fmt.format(ctx.nodes.get(value).typ));
        } else {
            out.push_str(&fmt.format(node.typ));
        }
    }
    out.push(')');
    out
}

/// Resolve the overload set at a call site and rewrite the call.
///
/// Returns the rewritten call (arguments in formal order, defaults
/// filled, hidden conversions applied), or `None` when no overload is
/// visible (the caller may still try a user-defined call operator) or
/// when no candidate matched (a `TypeMismatch` diagnostic has then been
/// emitted).
#[tracing::instrument(level = "debug", skip(ctx))]
pub fn resolve_call(ctx: &mut Context, call: NodeId) -> Option<NodeId> {
    let callee = ctx.nodes.get(call).son(0);
    let overloads: Vec<SymId> = match &ctx.nodes.get(callee).payload {
        NodePayload::Sym(sym) => vec![*sym],
        NodePayload::Ident(name) => ctx
            .scopes
            .visible_iter(*name)
            .filter(|&s| ctx.syms.get(s).kind.is_callable())
            .collect(),
        _ => Vec::new(),
    };
    if overloads.is_empty() {
        return None;
    }

    let mut best: Option<Candidate> = None;
    let mut alt: Option<Candidate> = None;
    for sym in &overloads {
        let z = match_call(ctx, call, *sym);
        tracing::debug!(
            candidate = ctx.interner.lookup(ctx.syms.get(*sym).name),
            state = ?z.state,
            exact = z.exact,
            generic = z.generic,
            subtype = z.subtype,
            conv = z.conv,
            "scored candidate"
        );
        // Transition rules: a match displaces an empty or failed best;
        // a strictly better match demotes the old best to runner-up; a
        // tie becomes the runner-up; anything worse is discarded.
        enum Step {
            Take,
            Promote,
            Tie,
            Discard,
        }
        let step = match &best {
            None => Step::Take,
            Some(_) if z.state != MatchState::Match => Step::Discard,
            Some(b) if b.state != MatchState::Match => Step::Take,
            Some(b) => match cmp_candidates(&z, b) {
                Ordering::Greater => Step::Promote,
                Ordering::Equal => Step::Tie,
                Ordering::Less => Step::Discard,
            },
        };
        match step {
            Step::Take => best = Some(z),
            Step::Promote => alt = best.replace(z),
            Step::Tie => alt = Some(z),
            Step::Discard => {}
        }
    }

    let best = best.expect("non-empty overload set always yields a candidate");
    let loc = ctx.nodes.get(call).loc;
    if best.state != MatchState::Match {
        let fmt = ctx.type_formatter();
        let headers: Vec<String> = overloads.iter().map(|&s| fmt.proc_header(s)).collect();
        let msg = format!(
            "type mismatch: got {}\nbut expected one of:\n{}",
            describe_args(ctx, call),
            headers.join("\n")
        );
        ctx.diags.error(DiagKind::TypeMismatch, loc, msg);
        return None;
    }

    if let Some(y) = &alt {
        if y.state == MatchState::Match && cmp_candidates(&best, y) == Ordering::Equal {
            let fmt = ctx.type_formatter();
            let msg = format!(
                "ambiguous call; both '{}' and '{}' match for: {}",
                fmt.proc_header(best.callee),
                fmt.proc_header(y.callee),
                describe_args(ctx, call)
            );
            ctx.diags.error(DiagKind::AmbiguousCall, loc, msg);
        }
    }

    // The winner is committed: mark it used, instantiate if generic,
    // and give the rewritten call its return type.
    let winner = if needs_instantiation(ctx, &best) {
        let instance = instantiate_proc(ctx, best.callee, &best.bindings);
        let callee_loc = ctx.nodes.get(ctx.nodes.get(best.call).son(0)).loc;
        let sym_node = ctx.new_sym_node(instance, callee_loc);
        ctx.nodes.set_son(best.call, 0, sym_node);
        instance
    } else {
        best.callee
    };
    ctx.syms.get_mut(winner).flags |= SymFlags::USED;
    let ret = ctx.types.proc_ret(ctx.syms.get(winner).typ);
    ctx.nodes.get_mut(best.call).typ = ret;
    tracing::debug!(
        winner = ctx.interner.lookup(ctx.syms.get(winner).name),
        "resolved call"
    );
    Some(best.call)
}
