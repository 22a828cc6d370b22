//! Emission: write tokens with indentation and soft line breaks.
//!
//! The renderer carries the current indent, the current line length, a
//! pending-newline marker observed by every emit operation, and the
//! token stream. Soft breaks fire when the width estimate of the next
//! piece no longer fits the line.

use crate::width::lsub;
use crate::{
    atoms, RenderFlags, Rendered, Sources, TokKind, Token, COMMENT_COL, INDENT_STEP, LONG_INDENT,
    MAX_LINE_LEN,
};
use keel_ir::{NodeId, NodeKind};

pub(crate) struct Renderer<'a> {
    src: Sources<'a>,
    flags: RenderFlags,
    indent: usize,
    line_len: usize,
    buf: String,
    tokens: Vec<Token>,
    /// Indent for the coming line; `None` when no newline is pending.
    pending_nl: Option<usize>,
}

impl<'a> Renderer<'a> {
    pub(crate) fn new(src: Sources<'a>, flags: RenderFlags) -> Self {
        Renderer {
            src,
            flags,
            indent: 0,
            line_len: 0,
            buf: String::new(),
            tokens: Vec::new(),
            pending_nl: None,
        }
    }

    pub(crate) fn finish(self) -> Rendered {
        Rendered {
            buf: self.buf,
            tokens: self.tokens,
        }
    }

    // === Low-level emission ===

    fn flush_pending(&mut self) {
        if let Some(ind) = self.pending_nl.take() {
            let start = self.buf.len();
            // No newline at the very start of the buffer.
            if start > 0 {
                self.buf.push('\n');
            }
            for _ in 0..ind {
                self.buf.push(' ');
            }
            if self.buf.len() > start {
                self.tokens.push(Token {
                    kind: TokKind::Ind,
                    len: (self.buf.len() - start) as u32,
                });
            }
            self.line_len = ind;
        }
    }

    fn put(&mut self, kind: TokKind, s: &str) {
        if s.is_empty() {
            return;
        }
        self.flush_pending();
        self.buf.push_str(s);
        self.tokens.push(Token {
            kind,
            len: s.len() as u32,
        });
        self.line_len += s.len();
    }

    fn put_kw(&mut self, kw: TokKind) {
        let text = kw.keyword().expect("keyword token");
        self.put(kw, text);
    }

    fn space(&mut self) {
        self.put(TokKind::Spaces, " ");
    }

    /// Request a fresh line at the current indent.
    fn opt_nl(&mut self) {
        self.pending_nl = Some(self.indent);
    }

    fn fits(&self, width: usize) -> bool {
        self.line_len.saturating_add(width) <= MAX_LINE_LEN
    }

    /// Indent for a soft break inside an argument list: long-indent
    /// when the current column is already deep.
    fn wrap_indent(&self) -> usize {
        if self.line_len > MAX_LINE_LEN / 2 {
            self.indent + LONG_INDENT
        } else {
            self.indent + INDENT_STEP
        }
    }

    // === Comments ===

    fn comment_visible(&self, text: &str) -> bool {
        if self.flags.contains(RenderFlags::NO_COMMENTS) {
            return false;
        }
        if self.flags.contains(RenderFlags::DOC_COMMENTS) {
            return text.starts_with("##");
        }
        true
    }

    /// Emit a node's attached comment: column-aligned trailing when it
    /// fits, wrapped own-line form when it does not.
    fn put_comment(&mut self, text: &str) {
        if !self.comment_visible(text) {
            return;
        }
        if self.pending_nl.is_none() && self.line_len + 1 + text.len() <= MAX_LINE_LEN {
            let col = if self.line_len < COMMENT_COL {
                COMMENT_COL - self.line_len
            } else {
                1
            };
            let pad: String = " ".repeat(col);
            self.put(TokKind::Spaces, &pad);
            self.put(TokKind::Comment, text);
            return;
        }
        // Own lines, wrapped at the line limit with `#` continuation.
        let budget = MAX_LINE_LEN.saturating_sub(self.indent + 2).max(8);
        let mut line = String::new();
        let mut emitted = false;
        for word in text.trim_start_matches('#').split_whitespace() {
            if !line.is_empty() && line.len() + 1 + word.len() > budget {
                self.opt_nl();
                let chunk = format!("# {line}");
                self.put(TokKind::Comment, &chunk);
                emitted = true;
                line.clear();
            }
            if !line.is_empty() {
                line.push(' ');
            }
            line.push_str(word);
        }
        if !line.is_empty() || !emitted {
            self.opt_nl();
            let chunk = format!("# {line}");
            self.put(TokKind::Comment, &chunk);
        }
    }

    fn put_node_comment(&mut self, id: NodeId) {
        if id.is_none() {
            return;
        }
        if let Some(comment) = self.src.nodes.get(id).comment.clone() {
            self.put_comment(&comment);
        }
    }

    // === Structure helpers ===

    /// `start..` children joined by ", ", soft-breaking when the next
    /// child no longer fits.
    fn gcomma(&mut self, id: NodeId, start: usize) {
        let len = self.src.nodes.get(id).len();
        for i in start..len {
            let son = self.src.nodes.get(id).son(i);
            if i > start {
                self.put(TokKind::Comma, ",");
                if self.fits(lsub(&self.src, son) + 1) {
                    self.space();
                } else {
                    self.pending_nl = Some(self.wrap_indent());
                }
            }
            self.gsub(son);
        }
    }

    /// Statements, one per line, comments attached.
    fn gstmts(&mut self, id: NodeId) {
        if id.is_none() {
            return;
        }
        if self.src.nodes.get(id).kind == NodeKind::StmtList {
            let len = self.src.nodes.get(id).len();
            for i in 0..len {
                let stmt = self.src.nodes.get(id).son(i);
                self.opt_nl();
                self.gsub(stmt);
                self.put_node_comment(stmt);
            }
        } else {
            self.opt_nl();
            self.gsub(id);
            self.put_node_comment(id);
        }
    }

    /// Does a statement container need multi-line form for its body?
    fn long_mode(&self, body: NodeId) -> bool {
        if body.is_none() {
            return false;
        }
        let node = self.src.nodes.get(body);
        if node.kind == NodeKind::StmtList {
            node.len() != 1
                || node
                    .sons()
                    .iter()
                    .any(|&s| lsub(&self.src, s) > MAX_LINE_LEN)
        } else {
            lsub(&self.src, body) > MAX_LINE_LEN
        }
    }

    /// `: body` - inline when short, indented lines otherwise.
    fn put_body(&mut self, body: NodeId, force_long: bool) {
        self.put(TokKind::Colon, ":");
        if body.is_none() {
            return;
        }
        let single = if self.src.nodes.get(body).kind == NodeKind::StmtList
            && self.src.nodes.get(body).len() == 1
        {
            self.src.nodes.get(body).son(0)
        } else {
            body
        };
        if !force_long
            && !self.long_mode(body)
            && self.fits(lsub(&self.src, single) + 1)
        {
            self.space();
            self.gsub(single);
            return;
        }
        self.indent += INDENT_STEP;
        self.gstmts(body);
        self.indent -= INDENT_STEP;
    }

    /// A section (`var`, `const`, `type`): inline for one short
    /// declarator, otherwise one per indented line.
    fn gsection(&mut self, id: NodeId, kw: TokKind) {
        let node = self.src.nodes.get(id);
        if node.len() == 1 && lsub(&self.src, id) <= MAX_LINE_LEN {
            self.put_kw(kw);
            self.space();
            let son = self.src.nodes.get(id).son(0);
            self.gsub(son);
            return;
        }
        self.put_kw(kw);
        self.indent += INDENT_STEP;
        let len = self.src.nodes.get(id).len();
        for i in 0..len {
            let son = self.src.nodes.get(id).son(i);
            self.opt_nl();
            self.gsub(son);
            self.put_node_comment(son);
        }
        self.indent -= INDENT_STEP;
    }

    /// `name, name2: type = default`.
    fn ident_defs(&mut self, id: NodeId) {
        let len = self.src.nodes.get(id).len();
        let (typ_i, def_i) = (len - 2, len - 1);
        for i in 0..typ_i {
            if i > 0 {
                self.put(TokKind::Comma, ",");
                self.space();
            }
            let son = self.src.nodes.get(id).son(i);
            self.gsub(son);
        }
        let typ = self.src.nodes.get(id).son(typ_i);
        if typ.is_some() {
            self.put(TokKind::Colon, ":");
            self.space();
            self.gsub(typ);
        }
        let default = self.src.nodes.get(id).son(def_i);
        if default.is_some() {
            self.space();
            self.put(TokKind::Equals, "=");
            self.space();
            self.gsub(default);
        }
    }

    /// `(a: int, b: float): ret`.
    fn formal_params(&mut self, id: NodeId) {
        self.put(TokKind::ParLe, "(");
        if id.is_some() {
            self.gcomma(id, 1);
        }
        self.put(TokKind::ParRi, ")");
        if id.is_some() {
            let ret = self.src.nodes.get(id).son(0);
            if ret.is_some() {
                self.put(TokKind::Colon, ":");
                self.space();
                self.gsub(ret);
            }
        }
    }

    fn routine(&mut self, id: NodeId, kw: TokKind) {
        self.put_kw(kw);
        self.space();
        let name = self.src.nodes.get(id).son(0);
        self.gsub(name);
        let generics = self.src.nodes.get(id).son(1);
        if generics.is_some() {
            self.gsub(generics);
        }
        let params = self.src.nodes.get(id).son(2);
        self.formal_params(params);
        let pragma = self.src.nodes.get(id).son(3);
        if pragma.is_some() && !self.flags.contains(RenderFlags::NO_PRAGMAS) {
            self.space();
            self.gsub(pragma);
        }
        let body = self.src.nodes.get(id).son(4);
        if body.is_some() && !self.flags.contains(RenderFlags::NO_BODY) {
            self.space();
            self.put(TokKind::Equals, "=");
            self.indent += INDENT_STEP;
            self.gstmts(body);
            self.indent -= INDENT_STEP;
        }
    }

    fn if_like(&mut self, id: NodeId, kw: TokKind) {
        let len = self.src.nodes.get(id).len();
        let force_long = (0..len).any(|i| {
            let branch = self.src.nodes.get(id).son(i);
            self.long_mode(self.src.nodes.get(branch).son(
                self.src.nodes.get(branch).len() - 1,
            ))
        });
        for i in 0..len {
            let branch = self.src.nodes.get(id).son(i);
            if i > 0 {
                self.opt_nl();
            }
            match self.src.nodes.get(branch).kind {
                NodeKind::ElifBranch => {
                    self.put_kw(if i == 0 { kw } else { TokKind::KwElif });
                    self.space();
                    let cond = self.src.nodes.get(branch).son(0);
                    self.gsub(cond);
                    let body = self.src.nodes.get(branch).son(1);
                    self.put_body(body, force_long);
                }
                _ => {
                    self.put_kw(TokKind::KwElse);
                    let body = self.src.nodes.get(branch).son(0);
                    self.put_body(body, force_long);
                }
            }
        }
    }

    fn unary_stmt(&mut self, id: NodeId, kw: TokKind) {
        self.put_kw(kw);
        let expr = self.src.nodes.get(id).son(0);
        if expr.is_some() {
            self.space();
            self.gsub(expr);
        }
    }

    fn prefix_ty(&mut self, id: NodeId, kw: TokKind) {
        self.put_kw(kw);
        let node = self.src.nodes.get(id);
        if !node.is_empty() && node.son(0).is_some() {
            self.space();
            let son = self.src.nodes.get(id).son(0);
            self.gsub(son);
        }
    }

    /// Is the operator of an `Infix`/`Prefix` a word (needs a space)?
    fn word_op(&self, op: NodeId) -> bool {
        let node = self.src.nodes.get(op);
        let text = match node.kind {
            NodeKind::Ident => self.src.interner.lookup(node.ident()),
            NodeKind::Sym => self.src.interner.lookup(self.src.syms.get(node.sym()).name),
            _ => return false,
        };
        text.chars().next().is_some_and(|c| c.is_alphabetic())
    }

    // === The dispatcher ===

    pub(crate) fn gsub(&mut self, id: NodeId) {
        if id.is_none() {
            return;
        }
        let node = self.src.nodes.get(id);
        let kind = node.kind;
        match kind {
            NodeKind::Empty => {}
            // === Atoms ===
            NodeKind::IntLit
            | NodeKind::Int8Lit
            | NodeKind::Int16Lit
            | NodeKind::Int32Lit
            | NodeKind::Int64Lit => {
                let text = atoms::int_atom(&self.src, node);
                self.put(TokKind::IntLit, &text);
            }
            NodeKind::FloatLit | NodeKind::Float32Lit | NodeKind::Float64Lit => {
                let text = atoms::float_atom(&self.src, node);
                self.put(TokKind::FloatLit, &text);
            }
            NodeKind::CharLit => {
                let text = atoms::char_atom(node.int_val());
                self.put(TokKind::CharLit, &text);
            }
            NodeKind::StrLit | NodeKind::RStrLit | NodeKind::TripleStrLit => {
                let frags = atoms::str_fragments(node);
                for (i, frag) in frags.iter().enumerate() {
                    if i > 0 {
                        self.pending_nl = Some(self.wrap_indent());
                    }
                    self.put(TokKind::StrLit, frag);
                }
            }
            NodeKind::NilLit => self.put_kw(TokKind::KwNil),
            NodeKind::Ident => {
                let text = self.src.interner.lookup(node.ident());
                self.put(TokKind::Ident, text);
            }
            NodeKind::Sym => {
                let sym = node.sym();
                let text = self.src.interner.lookup(self.src.syms.get(sym).name);
                self.put(TokKind::Symbol, text);
                if self.flags.contains(RenderFlags::IDS) {
                    self.put(TokKind::BracketLe, "[");
                    let id_text = sym.raw().to_string();
                    self.put(TokKind::IntLit, &id_text);
                    self.put(TokKind::BracketRi, "]");
                }
            }
            // === Expressions ===
            NodeKind::Call => {
                let callee = node.son(0);
                self.gsub(callee);
                self.put(TokKind::ParLe, "(");
                self.gcomma(id, 1);
                self.put(TokKind::ParRi, ")");
            }
            NodeKind::Command => {
                let callee = node.son(0);
                self.gsub(callee);
                self.space();
                self.gcomma(id, 1);
            }
            NodeKind::Infix => {
                let (op, left, right) = (node.son(0), node.son(1), node.son(2));
                self.gsub(left);
                self.space();
                self.gsub(op);
                if self.fits(lsub(&self.src, right) + 1) {
                    self.space();
                } else {
                    self.pending_nl = Some(self.wrap_indent());
                }
                self.gsub(right);
            }
            NodeKind::Prefix => {
                let (op, operand) = (node.son(0), node.son(1));
                let spaced = self.word_op(op);
                self.gsub(op);
                if spaced {
                    self.space();
                }
                self.gsub(operand);
            }
            NodeKind::Postfix => {
                let (op, operand) = (node.son(0), node.son(1));
                self.gsub(operand);
                self.gsub(op);
            }
            NodeKind::DotExpr => {
                let (a, b) = (node.son(0), node.son(1));
                self.gsub(a);
                self.put(TokKind::Dot, ".");
                self.gsub(b);
            }
            NodeKind::BracketExpr => {
                let a = node.son(0);
                self.gsub(a);
                self.put(TokKind::BracketLe, "[");
                self.gcomma(id, 1);
                self.put(TokKind::BracketRi, "]");
            }
            NodeKind::RangeExpr => {
                let (a, b) = (node.son(0), node.son(1));
                self.gsub(a);
                self.put(TokKind::DotDot, "..");
                self.gsub(b);
            }
            NodeKind::AddrExpr => {
                let a = node.son(0);
                self.put_kw(TokKind::KwAddr);
                self.put(TokKind::ParLe, "(");
                self.gsub(a);
                self.put(TokKind::ParRi, ")");
            }
            NodeKind::DerefExpr => {
                let a = node.son(0);
                self.gsub(a);
                self.put(TokKind::BracketLe, "[");
                self.put(TokKind::BracketRi, "]");
            }
            NodeKind::TypeOfExpr => {
                let a = node.son(0);
                self.put(TokKind::KwType, "type");
                self.put(TokKind::ParLe, "(");
                self.gsub(a);
                self.put(TokKind::ParRi, ")");
            }
            NodeKind::CastExpr => {
                let (t, e) = (node.son(0), node.son(1));
                self.put_kw(TokKind::KwCast);
                self.put(TokKind::BracketLe, "[");
                self.gsub(t);
                self.put(TokKind::BracketRi, "]");
                self.put(TokKind::ParLe, "(");
                self.gsub(e);
                self.put(TokKind::ParRi, ")");
            }
            NodeKind::Par => {
                self.put(TokKind::ParLe, "(");
                self.gcomma(id, 0);
                self.put(TokKind::ParRi, ")");
            }
            NodeKind::Bracket => {
                self.put(TokKind::BracketLe, "[");
                self.gcomma(id, 0);
                self.put(TokKind::BracketRi, "]");
            }
            NodeKind::Curly => {
                self.put(TokKind::CurlyLe, "{");
                self.gcomma(id, 0);
                self.put(TokKind::CurlyRi, "}");
            }
            NodeKind::ExprColonExpr => {
                let (a, b) = (node.son(0), node.son(1));
                self.gsub(a);
                self.put(TokKind::Colon, ":");
                self.space();
                self.gsub(b);
            }
            NodeKind::ExprEqExpr | NodeKind::Asgn => {
                let (a, b) = (node.son(0), node.son(1));
                self.gsub(a);
                self.space();
                self.put(TokKind::Equals, "=");
                self.space();
                self.gsub(b);
            }
            // === Hidden conversions render their payload ===
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
            | NodeKind::ChckRangeF => {
                let inner = *node.sons().last().unwrap_or(&NodeId::NONE);
                self.gsub(inner);
            }
            // === Statements ===
            NodeKind::StmtList => self.gstmts(id),
            NodeKind::IfStmt => self.if_like(id, TokKind::KwIf),
            NodeKind::WhenStmt => self.if_like(id, TokKind::KwWhen),
            NodeKind::WhileStmt => {
                self.put_kw(TokKind::KwWhile);
                self.space();
                let cond = node.son(0);
                let body = node.son(1);
                self.gsub(cond);
                self.put_body(body, false);
            }
            NodeKind::ForStmt => {
                self.put_kw(TokKind::KwFor);
                self.space();
                let len = node.len();
                for i in 0..len - 2 {
                    if i > 0 {
                        self.put(TokKind::Comma, ",");
                        self.space();
                    }
                    let v = self.src.nodes.get(id).son(i);
                    self.gsub(v);
                }
                self.space();
                self.put_kw(TokKind::KwIn);
                self.space();
                let iter = self.src.nodes.get(id).son(len - 2);
                self.gsub(iter);
                let body = self.src.nodes.get(id).son(len - 1);
                self.put_body(body, false);
            }
            NodeKind::CaseStmt => {
                self.put_kw(TokKind::KwCase);
                self.space();
                let selector = node.son(0);
                self.gsub(selector);
                let len = self.src.nodes.get(id).len();
                for i in 1..len {
                    let branch = self.src.nodes.get(id).son(i);
                    self.opt_nl();
                    self.gsub(branch);
                }
            }
            NodeKind::OfBranch => {
                self.put_kw(TokKind::KwOf);
                self.space();
                let len = node.len();
                for i in 0..len - 1 {
                    if i > 0 {
                        self.put(TokKind::Comma, ",");
                        self.space();
                    }
                    let v = self.src.nodes.get(id).son(i);
                    self.gsub(v);
                }
                let body = self.src.nodes.get(id).son(len - 1);
                self.put_body(body, false);
            }
            NodeKind::ElifBranch => {
                // Standalone (record-when branch).
                self.put_kw(TokKind::KwElif);
                self.space();
                let (cond, body) = (node.son(0), node.son(1));
                self.gsub(cond);
                self.put_body(body, false);
            }
            NodeKind::ElseBranch => {
                self.put_kw(TokKind::KwElse);
                let body = node.son(0);
                self.put_body(body, false);
            }
            NodeKind::TryStmt => {
                self.put_kw(TokKind::KwTry);
                let body = node.son(0);
                self.put_body(body, true);
                let len = self.src.nodes.get(id).len();
                for i in 1..len {
                    let branch = self.src.nodes.get(id).son(i);
                    self.opt_nl();
                    self.gsub(branch);
                }
            }
            NodeKind::ExceptBranch => {
                self.put_kw(TokKind::KwExcept);
                let len = node.len();
                if len > 1 {
                    self.space();
                    for i in 0..len - 1 {
                        if i > 0 {
                            self.put(TokKind::Comma, ",");
                            self.space();
                        }
                        let e = self.src.nodes.get(id).son(i);
                        self.gsub(e);
                    }
                }
                let body = self.src.nodes.get(id).son(len - 1);
                self.put_body(body, false);
            }
            NodeKind::Finally => {
                self.put_kw(TokKind::KwFinally);
                let body = node.son(0);
                self.put_body(body, false);
            }
            NodeKind::BlockStmt => {
                self.put_kw(TokKind::KwBlock);
                let (label, body) = (node.son(0), node.son(1));
                if label.is_some() {
                    self.space();
                    self.gsub(label);
                }
                self.put_body(body, false);
            }
            NodeKind::ReturnStmt => self.unary_stmt(id, TokKind::KwReturn),
            NodeKind::DiscardStmt => self.unary_stmt(id, TokKind::KwDiscard),
            NodeKind::BreakStmt => self.unary_stmt(id, TokKind::KwBreak),
            NodeKind::ContinueStmt => self.unary_stmt(id, TokKind::KwContinue),
            NodeKind::RaiseStmt => self.unary_stmt(id, TokKind::KwRaise),
            NodeKind::Pragma => {
                if self.flags.contains(RenderFlags::NO_PRAGMAS) {
                    return;
                }
                self.put(TokKind::CurlyDotLe, "{.");
                self.gcomma(id, 0);
                self.put(TokKind::CurlyDotRi, ".}");
            }
            NodeKind::CommentStmt => {
                let text = node.str_val().to_owned();
                if self.comment_visible(&text) {
                    self.put(TokKind::Comment, &text);
                }
            }
            // === Declarations ===
            NodeKind::ProcDef => self.routine(id, TokKind::KwProc),
            NodeKind::MethodDef => self.routine(id, TokKind::KwMethod),
            NodeKind::IteratorDef => self.routine(id, TokKind::KwIterator),
            NodeKind::MacroDef => self.routine(id, TokKind::KwMacro),
            NodeKind::TemplateDef => self.routine(id, TokKind::KwTemplate),
            NodeKind::ConverterDef => self.routine(id, TokKind::KwConverter),
            NodeKind::IdentDefs | NodeKind::ConstDef => self.ident_defs(id),
            NodeKind::VarTuple => {
                let len = node.len();
                self.put(TokKind::ParLe, "(");
                for i in 0..len - 2 {
                    if i > 0 {
                        self.put(TokKind::Comma, ",");
                        self.space();
                    }
                    let v = self.src.nodes.get(id).son(i);
                    self.gsub(v);
                }
                self.put(TokKind::ParRi, ")");
                self.space();
                self.put(TokKind::Equals, "=");
                self.space();
                let value = self.src.nodes.get(id).son(len - 1);
                self.gsub(value);
            }
            NodeKind::TypeDef => {
                let (name, generics, rhs) = (node.son(0), node.son(1), node.son(2));
                self.gsub(name);
                if generics.is_some() {
                    self.gsub(generics);
                }
                if rhs.is_some() {
                    self.space();
                    self.put(TokKind::Equals, "=");
                    self.space();
                    self.gsub(rhs);
                }
            }
            NodeKind::GenericParams => {
                self.put(TokKind::BracketLe, "[");
                self.gcomma(id, 0);
                self.put(TokKind::BracketRi, "]");
            }
            NodeKind::FormalParams => self.formal_params(id),
            NodeKind::ObjectTy => {
                self.put_kw(TokKind::KwObject);
                let (inherit, fields) = (node.son(0), node.son(1));
                if inherit.is_some() {
                    self.space();
                    self.gsub(inherit);
                }
                if fields.is_some() {
                    self.indent += INDENT_STEP;
                    self.gsub(fields);
                    self.indent -= INDENT_STEP;
                }
            }
            NodeKind::OfInherit => {
                self.put_kw(TokKind::KwOf);
                self.space();
                let base = node.son(0);
                self.gsub(base);
            }
            NodeKind::RecList => {
                let len = node.len();
                for i in 0..len {
                    let field = self.src.nodes.get(id).son(i);
                    self.opt_nl();
                    self.gsub(field);
                    self.put_node_comment(field);
                }
            }
            NodeKind::RecCase => {
                self.put_kw(TokKind::KwCase);
                self.space();
                let selector = node.son(0);
                self.gsub(selector);
                let len = self.src.nodes.get(id).len();
                for i in 1..len {
                    let branch = self.src.nodes.get(id).son(i);
                    self.opt_nl();
                    self.gsub(branch);
                }
            }
            NodeKind::RecWhen => {
                let len = node.len();
                for i in 0..len {
                    let branch = self.src.nodes.get(id).son(i);
                    if i > 0 {
                        self.opt_nl();
                    }
                    if i == 0 {
                        // First branch carries the `when` head.
                        self.put_kw(TokKind::KwWhen);
                        self.space();
                        let cond = self.src.nodes.get(branch).son(0);
                        self.gsub(cond);
                        let body = self.src.nodes.get(branch).son(1);
                        self.put_body(body, false);
                    } else {
                        self.gsub(branch);
                    }
                }
            }
            NodeKind::EnumTy => {
                self.put_kw(TokKind::KwEnum);
                self.indent += INDENT_STEP;
                let len = node.len();
                for i in 0..len {
                    let field = self.src.nodes.get(id).son(i);
                    self.opt_nl();
                    self.gsub(field);
                    self.put_node_comment(field);
                }
                self.indent -= INDENT_STEP;
            }
            NodeKind::EnumFieldDef => {
                let (name, value) = (node.son(0), node.son(1));
                self.gsub(name);
                self.space();
                self.put(TokKind::Equals, "=");
                self.space();
                self.gsub(value);
            }
            NodeKind::TupleTy => {
                self.put_kw(TokKind::KwTuple);
                self.put(TokKind::BracketLe, "[");
                self.gcomma(id, 0);
                self.put(TokKind::BracketRi, "]");
            }
            NodeKind::ProcTy => {
                self.put_kw(TokKind::KwProc);
                self.space();
                let params = node.son(0);
                self.formal_params(params);
                if node.len() > 1 {
                    let pragma = self.src.nodes.get(id).son(1);
                    if pragma.is_some() && !self.flags.contains(RenderFlags::NO_PRAGMAS) {
                        self.space();
                        self.gsub(pragma);
                    }
                }
            }
            NodeKind::RefTy => self.prefix_ty(id, TokKind::KwRef),
            NodeKind::PtrTy => self.prefix_ty(id, TokKind::KwPtr),
            NodeKind::VarTy => self.prefix_ty(id, TokKind::KwVar),
            NodeKind::DistinctTy => self.prefix_ty(id, TokKind::KwDistinct),
            // === Sections ===
            NodeKind::VarSection => self.gsection(id, TokKind::KwVar),
            NodeKind::ConstSection => self.gsection(id, TokKind::KwConst),
            NodeKind::TypeSection => self.gsection(id, TokKind::KwType),
            NodeKind::ImportStmt => {
                self.put_kw(TokKind::KwImport);
                self.space();
                self.gcomma(id, 0);
            }
            NodeKind::IncludeStmt => {
                self.put_kw(TokKind::KwInclude);
                self.space();
                self.gcomma(id, 0);
            }
            NodeKind::FromStmt => {
                self.put_kw(TokKind::KwFrom);
                self.space();
                let module = node.son(0);
                self.gsub(module);
                self.space();
                self.put_kw(TokKind::KwImport);
                self.space();
                self.gcomma(id, 1);
            }
        }
    }
}
