//! Renderer output tests: exact text for representative trees.

use crate::{render_tree, RenderFlags, Sources, MAX_LINE_LEN};
use keel_ir::{
    Interner, Loc, Node, NodeArena, NodeFlags, NodeId, NodeKind, NodePayload, SymArena, SymKind,
    Symbol,
};
use keel_types::TypePool;

struct Builder {
    nodes: NodeArena,
    syms: SymArena,
    types: TypePool,
    interner: Interner,
}

impl Builder {
    fn new() -> Self {
        Builder {
            nodes: NodeArena::new(),
            syms: SymArena::new(),
            types: TypePool::new(),
            interner: Interner::new(),
        }
    }

    fn ident(&mut self, s: &str) -> NodeId {
        let name = self.interner.intern(s);
        self.nodes
            .alloc(Node::new(NodeKind::Ident, Loc::UNKNOWN, NodePayload::Ident(name)))
    }

    fn sym(&mut self, s: &str) -> NodeId {
        let name = self.interner.intern(s);
        let sym = self
            .syms
            .alloc(Symbol::new(SymKind::Proc, name, Loc::UNKNOWN));
        self.nodes
            .alloc(Node::new(NodeKind::Sym, Loc::UNKNOWN, NodePayload::Sym(sym)))
    }

    fn int(&mut self, v: i64) -> NodeId {
        self.nodes
            .alloc(Node::new(NodeKind::IntLit, Loc::UNKNOWN, NodePayload::Int(v)))
    }

    fn float(&mut self, v: f64) -> NodeId {
        self.nodes.alloc(Node::new(
            NodeKind::FloatLit,
            Loc::UNKNOWN,
            NodePayload::Float(v),
        ))
    }

    fn tree(&mut self, kind: NodeKind, sons: Vec<NodeId>) -> NodeId {
        self.nodes.alloc_with(kind, Loc::UNKNOWN, sons)
    }

    fn ident_defs(&mut self, name: &str, typ: &str) -> NodeId {
        let n = self.ident(name);
        let t = self.ident(typ);
        self.tree(NodeKind::IdentDefs, vec![n, t, NodeId::NONE])
    }

    fn render(&self, root: NodeId, flags: RenderFlags) -> String {
        let src = Sources {
            nodes: &self.nodes,
            syms: &self.syms,
            types: &self.types,
            interner: &self.interner,
        };
        render_tree(src, root, flags).into_text()
    }

    fn render_with_tokens(&self, root: NodeId) -> (String, String) {
        let src = Sources {
            nodes: &self.nodes,
            syms: &self.syms,
            types: &self.types,
            interner: &self.interner,
        };
        let rendered = render_tree(src, root, RenderFlags::empty());
        let reassembled: String = rendered.tokens().map(|(_, lit)| lit).collect();
        (rendered.text().to_owned(), reassembled)
    }
}

fn discard_stmt(b: &mut Builder, v: i64) -> NodeId {
    let lit = b.int(v);
    b.tree(NodeKind::DiscardStmt, vec![lit])
}

#[test]
fn var_section_single_declarator_is_inline() {
    let mut b = Builder::new();
    let x = b.ident("x");
    let t = b.ident("int");
    let three = b.int(3);
    let defs = b.tree(NodeKind::IdentDefs, vec![x, t, three]);
    let section = b.tree(NodeKind::VarSection, vec![defs]);
    assert_eq!(b.render(section, RenderFlags::empty()), "var x: int = 3");
}

#[test]
fn var_section_many_declarators_wrap() {
    let mut b = Builder::new();
    let d1 = b.ident_defs("x", "int");
    let d2 = b.ident_defs("y", "float");
    let section = b.tree(NodeKind::VarSection, vec![d1, d2]);
    assert_eq!(
        b.render(section, RenderFlags::empty()),
        "var\n  x: int\n  y: float"
    );
}

#[test]
fn proc_def_with_body() {
    let mut b = Builder::new();
    let name = b.ident("f");
    let ret = b.ident("float");
    let param = b.ident_defs("x", "int");
    let params = b.tree(NodeKind::FormalParams, vec![ret, param]);
    let one_five = b.float(1.5);
    let ret_stmt = b.tree(NodeKind::ReturnStmt, vec![one_five]);
    let body = b.tree(NodeKind::StmtList, vec![ret_stmt]);
    let def = b.tree(
        NodeKind::ProcDef,
        vec![name, NodeId::NONE, params, NodeId::NONE, body],
    );
    assert_eq!(
        b.render(def, RenderFlags::empty()),
        "proc f(x: int): float =\n  return 1.5"
    );
    assert_eq!(
        b.render(def, RenderFlags::NO_BODY),
        "proc f(x: int): float"
    );
}

#[test]
fn if_else_fits_inline() {
    let mut b = Builder::new();
    let cond = b.ident("cond");
    let then_stmt = discard_stmt(&mut b, 1);
    let then_body = b.tree(NodeKind::StmtList, vec![then_stmt]);
    let elif = b.tree(NodeKind::ElifBranch, vec![cond, then_body]);
    let else_stmt = discard_stmt(&mut b, 2);
    let else_body = b.tree(NodeKind::StmtList, vec![else_stmt]);
    let els = b.tree(NodeKind::ElseBranch, vec![else_body]);
    let if_stmt = b.tree(NodeKind::IfStmt, vec![elif, els]);
    assert_eq!(
        b.render(if_stmt, RenderFlags::empty()),
        "if cond: discard 1\nelse: discard 2"
    );
}

#[test]
fn while_with_two_statements_goes_long() {
    let mut b = Builder::new();
    let cond = b.ident("running");
    let s1 = discard_stmt(&mut b, 1);
    let s2 = discard_stmt(&mut b, 2);
    let body = b.tree(NodeKind::StmtList, vec![s1, s2]);
    let w = b.tree(NodeKind::WhileStmt, vec![cond, body]);
    assert_eq!(
        b.render(w, RenderFlags::empty()),
        "while running:\n  discard 1\n  discard 2"
    );
}

#[test]
fn case_statement_layout() {
    let mut b = Builder::new();
    let sel = b.ident("x");
    let one = b.int(1);
    let two = b.int(2);
    let of_stmt = discard_stmt(&mut b, 1);
    let of_body = b.tree(NodeKind::StmtList, vec![of_stmt]);
    let of_branch = b.tree(NodeKind::OfBranch, vec![one, two, of_body]);
    let else_stmt = discard_stmt(&mut b, 2);
    let else_body = b.tree(NodeKind::StmtList, vec![else_stmt]);
    let els = b.tree(NodeKind::ElseBranch, vec![else_body]);
    let case = b.tree(NodeKind::CaseStmt, vec![sel, of_branch, els]);
    assert_eq!(
        b.render(case, RenderFlags::empty()),
        "case x\nof 1, 2: discard 1\nelse: discard 2"
    );
}

#[test]
fn object_type_section() {
    let mut b = Builder::new();
    let name = b.ident("Point");
    let f1 = b.ident_defs("x", "int");
    let f2 = b.ident_defs("y", "int");
    let fields = b.tree(NodeKind::RecList, vec![f1, f2]);
    let object = b.tree(NodeKind::ObjectTy, vec![NodeId::NONE, fields]);
    let def = b.tree(NodeKind::TypeDef, vec![name, NodeId::NONE, object]);
    let section = b.tree(NodeKind::TypeSection, vec![def]);
    assert_eq!(
        b.render(section, RenderFlags::empty()),
        "type\n  Point = object\n    x: int\n    y: int"
    );
}

#[test]
fn long_call_breaks_below_the_limit() {
    let mut b = Builder::new();
    let callee = b.ident("frobnicate");
    let mut sons = vec![callee];
    for i in 0..6 {
        sons.push(b.ident(&format!("quite_a_long_argument_name_{i}")));
    }
    let call = b.tree(NodeKind::Call, sons);
    let out = b.render(call, RenderFlags::empty());
    assert!(out.contains('\n'), "long call must wrap: {out}");
    for line in out.lines() {
        assert!(line.len() <= MAX_LINE_LEN, "line too long: {line}");
    }
    // Nothing lost in wrapping.
    for i in 0..6 {
        assert!(out.contains(&format!("quite_a_long_argument_name_{i}")));
    }
}

#[test]
fn trailing_comment_aligns_to_column() {
    let mut b = Builder::new();
    let stmt = discard_stmt(&mut b, 1);
    b.nodes.get_mut(stmt).comment = Some("# note".into());
    let list = b.tree(NodeKind::StmtList, vec![stmt]);
    let out = b.render(list, RenderFlags::empty());
    // "discard 1" is 9 columns; the comment starts at column 30.
    assert_eq!(out, format!("discard 1{}# note", " ".repeat(21)));
}

#[test]
fn comment_flags() {
    let mut b = Builder::new();
    let s1 = discard_stmt(&mut b, 1);
    b.nodes.get_mut(s1).comment = Some("# plain".into());
    let s2 = discard_stmt(&mut b, 2);
    b.nodes.get_mut(s2).comment = Some("## documented".into());
    let list = b.tree(NodeKind::StmtList, vec![s1, s2]);

    let none = b.render(list, RenderFlags::NO_COMMENTS);
    assert!(!none.contains('#'));

    let doc = b.render(list, RenderFlags::DOC_COMMENTS);
    assert!(doc.contains("## documented"));
    assert!(!doc.contains("# plain"));
}

#[test]
fn ids_flag_appends_symbol_ids() {
    let mut b = Builder::new();
    let sym = b.sym("helper");
    let raw = b.nodes.get(sym).sym().raw();
    let out = b.render(sym, RenderFlags::IDS);
    assert_eq!(out, format!("helper[{raw}]"));
    assert_eq!(b.render(sym, RenderFlags::empty()), "helper");
}

#[test]
fn hidden_conversions_are_invisible() {
    let mut b = Builder::new();
    let lit = b.int(3);
    let conv = b.tree(NodeKind::HiddenStdConv, vec![lit]);
    assert_eq!(b.render(conv, RenderFlags::empty()), "3");
}

#[test]
fn based_literal_through_renderer() {
    let mut b = Builder::new();
    let lit = b.nodes.alloc(Node::new(
        NodeKind::Int8Lit,
        Loc::UNKNOWN,
        NodePayload::Int(5),
    ));
    b.nodes.get_mut(lit).flags = NodeFlags::BASE16;
    assert_eq!(b.render(lit, RenderFlags::empty()), "0x05'i8");
}

#[test]
fn pragma_rendering_and_suppression() {
    let mut b = Builder::new();
    let inline = b.ident("inline");
    let pragma = b.tree(NodeKind::Pragma, vec![inline]);
    let name = b.ident("f");
    let def = b.tree(
        NodeKind::ProcDef,
        vec![name, NodeId::NONE, NodeId::NONE, pragma, NodeId::NONE],
    );
    assert_eq!(b.render(def, RenderFlags::empty()), "proc f() {.inline.}");
    assert_eq!(b.render(def, RenderFlags::NO_PRAGMAS), "proc f()");
}

#[test]
fn import_and_from() {
    let mut b = Builder::new();
    let m1 = b.ident("strutils");
    let m2 = b.ident("sequtils");
    let import = b.tree(NodeKind::ImportStmt, vec![m1, m2]);
    assert_eq!(
        b.render(import, RenderFlags::empty()),
        "import strutils, sequtils"
    );

    let m = b.ident("os");
    let a = b.ident("getEnv");
    let from = b.tree(NodeKind::FromStmt, vec![m, a]);
    assert_eq!(b.render(from, RenderFlags::empty()), "from os import getEnv");
}

#[test]
fn token_stream_reassembles_exactly() {
    let mut b = Builder::new();
    let name = b.ident("f");
    let ret = b.ident("float");
    let param = b.ident_defs("x", "int");
    let params = b.tree(NodeKind::FormalParams, vec![ret, param]);
    let one_five = b.float(1.5);
    let ret_stmt = b.tree(NodeKind::ReturnStmt, vec![one_five]);
    let body = b.tree(NodeKind::StmtList, vec![ret_stmt]);
    let def = b.tree(
        NodeKind::ProcDef,
        vec![name, NodeId::NONE, params, NodeId::NONE, body],
    );
    let (text, reassembled) = b.render_with_tokens(def);
    assert_eq!(text, reassembled);
}

#[test]
fn infix_and_brackets() {
    let mut b = Builder::new();
    let op = b.ident("+");
    let a = b.ident("a");
    let bid = b.ident("b");
    let sum = b.tree(NodeKind::Infix, vec![op, a, bid]);
    let xs = b.ident("xs");
    let index = b.tree(NodeKind::BracketExpr, vec![xs, sum]);
    let target = b.ident("r");
    let asgn = b.tree(NodeKind::Asgn, vec![target, index]);
    assert_eq!(b.render(asgn, RenderFlags::empty()), "r = xs[a + b]");
}
