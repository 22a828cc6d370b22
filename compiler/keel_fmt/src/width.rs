//! Subtree width estimation.
//!
//! `lsub` computes a cheap per-kind upper bound on the one-line width a
//! subtree would need. The sentinel [`ALWAYS_WRAP`] means "must wrap":
//! statement containers, multi-declarator sections and comment-bearing
//! nodes can never be laid out on one line. All arithmetic saturates so
//! the sentinel is absorbing.

use crate::{atoms, Sources, MAX_LINE_LEN};
use keel_ir::{NodeId, NodeKind};

/// Width meaning "does not fit on one line".
pub(crate) const ALWAYS_WRAP: usize = MAX_LINE_LEN + 1;

fn plus(a: usize, b: usize) -> usize {
    a.saturating_add(b)
}

/// Sum of widths of `sons[start..]` joined by ", ".
fn lcomma(src: &Sources<'_>, sons: &[NodeId], start: usize) -> usize {
    let mut total = 0usize;
    for (i, &son) in sons.iter().enumerate().skip(start) {
        if i > start {
            total = plus(total, 2);
        }
        total = plus(total, lsub(src, son));
    }
    total
}

/// One-line width upper bound for a subtree.
pub(crate) fn lsub(src: &Sources<'_>, id: NodeId) -> usize {
    if id.is_none() {
        return 0;
    }
    let node = src.nodes.get(id);
    if node.comment.is_some() {
        return ALWAYS_WRAP;
    }
    let sons = node.sons();
    match node.kind {
        NodeKind::Empty => 0,
        // === Atoms ===
        NodeKind::IntLit
        | NodeKind::Int8Lit
        | NodeKind::Int16Lit
        | NodeKind::Int32Lit
        | NodeKind::Int64Lit => atoms::int_atom(src, node).len(),
        NodeKind::FloatLit | NodeKind::Float32Lit | NodeKind::Float64Lit => {
            atoms::float_atom(src, node).len()
        }
        NodeKind::CharLit => atoms::char_atom(node.int_val()).len(),
        NodeKind::StrLit | NodeKind::RStrLit | NodeKind::TripleStrLit => {
            let frags = atoms::str_fragments(node);
            if frags.len() == 1 {
                frags[0].len()
            } else {
                ALWAYS_WRAP
            }
        }
        NodeKind::NilLit => 3,
        NodeKind::Ident => src.interner.lookup(node.ident()).len(),
        NodeKind::Sym => src
            .interner
            .lookup(src.syms.get(node.sym()).name)
            .len(),
        // === Expressions ===
        NodeKind::Call | NodeKind::BracketExpr => {
            plus(lsub(src, sons[0]), plus(lcomma(src, sons, 1), 2))
        }
        NodeKind::Command => plus(lsub(src, sons[0]), plus(lcomma(src, sons, 1), 1)),
        NodeKind::Infix => plus(
            plus(lsub(src, sons[1]), lsub(src, sons[2])),
            plus(lsub(src, sons[0]), 2),
        ),
        NodeKind::Prefix => plus(plus(lsub(src, sons[0]), lsub(src, sons[1])), 1),
        NodeKind::Postfix => plus(lsub(src, sons[0]), lsub(src, sons[1])),
        NodeKind::DotExpr => plus(plus(lsub(src, sons[0]), lsub(src, sons[1])), 1),
        NodeKind::RangeExpr => plus(plus(lsub(src, sons[0]), lsub(src, sons[1])), 2),
        NodeKind::AddrExpr => plus(lsub(src, sons[0]), 6),
        NodeKind::DerefExpr => plus(lsub(src, sons[0]), 2),
        NodeKind::TypeOfExpr => plus(lsub(src, sons[0]), 6),
        NodeKind::CastExpr => plus(plus(lsub(src, sons[0]), lsub(src, sons[1])), 7),
        NodeKind::Par | NodeKind::Bracket | NodeKind::Curly => plus(lcomma(src, sons, 0), 2),
        NodeKind::ExprColonExpr => plus(plus(lsub(src, sons[0]), lsub(src, sons[1])), 2),
        NodeKind::ExprEqExpr | NodeKind::Asgn => {
            plus(plus(lsub(src, sons[0]), lsub(src, sons[1])), 3)
        }
        // === Hidden conversions are invisible ===
        NodeKind::HiddenStdConv
        | NodeKind::HiddenSubConv
        | NodeKind::HiddenCallConv
        | NodeKind::StringToCString
        | NodeKind::CStringToString
        | NodeKind::ObjUpConv
        | NodeKind::ObjDownConv
        | NodeKind::PassAsOpenArray
        | NodeKind::ChckRange
        | NodeKind::ChckRange64
        | NodeKind::ChckRangeF => lsub(src, *sons.last().unwrap_or(&NodeId::NONE)),
        // === Simple statements ===
        NodeKind::ReturnStmt => plus(lsub(src, sons[0]), 7),
        NodeKind::DiscardStmt => plus(lsub(src, sons[0]), 8),
        NodeKind::BreakStmt => plus(lsub(src, sons[0]), 6),
        NodeKind::ContinueStmt => plus(lsub(src, sons[0]), 9),
        NodeKind::RaiseStmt => plus(lsub(src, sons[0]), 6),
        NodeKind::Pragma => plus(lcomma(src, sons, 0), 4),
        NodeKind::CommentStmt => ALWAYS_WRAP,
        NodeKind::StmtList => {
            if sons.len() == 1 {
                lsub(src, sons[0])
            } else {
                ALWAYS_WRAP
            }
        }
        // === Declarations ===
        NodeKind::IdentDefs | NodeKind::ConstDef => {
            let names = &sons[..sons.len() - 2];
            let mut w = lcomma(src, names, 0);
            let typ = sons[sons.len() - 2];
            let default = sons[sons.len() - 1];
            if typ.is_some() {
                w = plus(w, plus(lsub(src, typ), 2));
            }
            if default.is_some() {
                w = plus(w, plus(lsub(src, default), 3));
            }
            w
        }
        NodeKind::VarTuple => {
            let names = &sons[..sons.len() - 2];
            plus(plus(lcomma(src, names, 0), 2), plus(lsub(src, sons[sons.len() - 1]), 3))
        }
        NodeKind::FormalParams => {
            let mut w = plus(lcomma(src, sons, 1), 2);
            if sons[0].is_some() {
                w = plus(w, plus(lsub(src, sons[0]), 2));
            }
            w
        }
        NodeKind::GenericParams => plus(lcomma(src, sons, 0), 2),
        NodeKind::ProcDef
        | NodeKind::MethodDef
        | NodeKind::IteratorDef
        | NodeKind::MacroDef
        | NodeKind::TemplateDef
        | NodeKind::ConverterDef => {
            // A routine with a body always wraps.
            if sons[4].is_some() {
                ALWAYS_WRAP
            } else {
                let head: usize = sons[..4].iter().map(|&s| lsub(src, s)).sum();
                plus(head, 10)
            }
        }
        NodeKind::TypeDef => plus(
            plus(lsub(src, sons[0]), lsub(src, sons[1])),
            plus(lsub(src, sons[2]), 3),
        ),
        NodeKind::ObjectTy => {
            if sons[1].is_some() {
                ALWAYS_WRAP
            } else if sons[0].is_some() {
                plus(lsub(src, sons[0]), 7)
            } else {
                6
            }
        }
        NodeKind::TupleTy => plus(lcomma(src, sons, 0), 7),
        NodeKind::ProcTy => {
            let mut w = 5;
            for &son in sons {
                w = plus(w, lsub(src, son));
            }
            w
        }
        NodeKind::EnumTy => {
            if sons.is_empty() {
                4
            } else {
                ALWAYS_WRAP
            }
        }
        NodeKind::EnumFieldDef => plus(plus(lsub(src, sons[0]), lsub(src, sons[1])), 3),
        NodeKind::RefTy | NodeKind::PtrTy | NodeKind::VarTy | NodeKind::DistinctTy => {
            let kw = match node.kind {
                NodeKind::RefTy => 3,
                NodeKind::PtrTy => 3,
                NodeKind::VarTy => 3,
                _ => 8,
            };
            if sons.is_empty() || sons[0].is_none() {
                kw
            } else {
                plus(kw, plus(lsub(src, sons[0]), 1))
            }
        }
        NodeKind::OfInherit => plus(lsub(src, sons[0]), 3),
        // === Sections ===
        NodeKind::VarSection | NodeKind::ConstSection | NodeKind::TypeSection => {
            if sons.len() == 1 {
                let kw = match node.kind {
                    NodeKind::VarSection => 4,
                    NodeKind::ConstSection => 6,
                    _ => 5,
                };
                plus(kw, lsub(src, sons[0]))
            } else {
                // More than one declarator always wraps.
                ALWAYS_WRAP
            }
        }
        NodeKind::ImportStmt => plus(lcomma(src, sons, 0), 7),
        NodeKind::IncludeStmt => plus(lcomma(src, sons, 0), 8),
        NodeKind::FromStmt => plus(
            plus(lsub(src, sons[0]), 13),
            lcomma(src, sons, 1),
        ),
        // === Statement containers always wrap ===
        NodeKind::IfStmt
        | NodeKind::WhenStmt
        | NodeKind::CaseStmt
        | NodeKind::WhileStmt
        | NodeKind::ForStmt
        | NodeKind::TryStmt
        | NodeKind::BlockStmt
        | NodeKind::ElifBranch
        | NodeKind::ElseBranch
        | NodeKind::OfBranch
        | NodeKind::ExceptBranch
        | NodeKind::Finally
        | NodeKind::RecList
        | NodeKind::RecCase
        | NodeKind::RecWhen => ALWAYS_WRAP,
    }
}
