//! AST node representation.
//!
//! A node is one variant of a closed enumeration of kinds. Each node
//! carries its kind, source location, flags, an optional attached
//! comment, an optional type reference and exactly one payload class:
//! a signed 64-bit integer, a float, a string, an identifier, a symbol
//! reference, or an ordered sequence of children.
//!
//! Children may be `NodeId::NONE` placeholders, which is significant:
//! it means "this optional slot is absent" (a proc without a return
//! type, an if-branch without an else).

use crate::{Loc, Name, NodeId, SymId, TypeId};
use bitflags::bitflags;

/// The closed enumeration of node kinds.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
#[repr(u8)]
pub enum NodeKind {
    /// Absent syntax; renders as nothing.
    Empty,
    // === Literals ===
    CharLit,
    IntLit,
    Int8Lit,
    Int16Lit,
    Int32Lit,
    Int64Lit,
    FloatLit,
    Float32Lit,
    Float64Lit,
    StrLit,
    RStrLit,
    TripleStrLit,
    NilLit,
    // === Identifiers ===
    Ident,
    Sym,
    // === Calls and operators ===
    Call,
    Command,
    Infix,
    Prefix,
    Postfix,
    DotExpr,
    BracketExpr,
    RangeExpr,
    AddrExpr,
    DerefExpr,
    TypeOfExpr,
    CastExpr,
    // === Constructors and grouping ===
    Par,
    Bracket,
    Curly,
    ExprColonExpr,
    ExprEqExpr,
    Asgn,
    // === Control flow ===
    StmtList,
    IfStmt,
    WhenStmt,
    CaseStmt,
    WhileStmt,
    ForStmt,
    TryStmt,
    BlockStmt,
    ElifBranch,
    ElseBranch,
    OfBranch,
    ExceptBranch,
    Finally,
    ReturnStmt,
    DiscardStmt,
    BreakStmt,
    ContinueStmt,
    RaiseStmt,
    // === Declarations ===
    ProcDef,
    MethodDef,
    IteratorDef,
    MacroDef,
    TemplateDef,
    ConverterDef,
    ConstDef,
    IdentDefs,
    VarTuple,
    TypeDef,
    GenericParams,
    FormalParams,
    EnumTy,
    EnumFieldDef,
    ObjectTy,
    TupleTy,
    ProcTy,
    RefTy,
    PtrTy,
    VarTy,
    DistinctTy,
    OfInherit,
    RecList,
    RecCase,
    RecWhen,
    // === Sections ===
    TypeSection,
    ConstSection,
    VarSection,
    ImportStmt,
    FromStmt,
    IncludeStmt,
    // === Misc statements ===
    Pragma,
    CommentStmt,
    // === Hidden conversions inserted by the typechecker ===
    HiddenStdConv,
    HiddenSubConv,
    HiddenCallConv,
    StringToCString,
    CStringToString,
    ObjUpConv,
    ObjDownConv,
    PassAsOpenArray,
    ChckRange,
    ChckRange64,
    ChckRangeF,
}

/// The payload class a node kind stores.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum PayloadClass {
    None,
    Int,
    Float,
    Str,
    Ident,
    Sym,
    Sons,
}

impl NodeKind {
    /// Which payload class this kind carries.
    pub fn payload_class(self) -> PayloadClass {
        use NodeKind::*;
        match self {
            Empty | NilLit => PayloadClass::None,
            CharLit | IntLit | Int8Lit | Int16Lit | Int32Lit | Int64Lit => PayloadClass::Int,
            FloatLit | Float32Lit | Float64Lit => PayloadClass::Float,
            StrLit | RStrLit | TripleStrLit | CommentStmt => PayloadClass::Str,
            Ident => PayloadClass::Ident,
            Sym => PayloadClass::Sym,
            _ => PayloadClass::Sons,
        }
    }

    /// Integer literal kinds (every width).
    pub fn is_int_lit(self) -> bool {
        matches!(
            self,
            NodeKind::IntLit
                | NodeKind::Int8Lit
                | NodeKind::Int16Lit
                | NodeKind::Int32Lit
                | NodeKind::Int64Lit
        )
    }

    /// Float literal kinds (every width).
    pub fn is_float_lit(self) -> bool {
        matches!(
            self,
            NodeKind::FloatLit | NodeKind::Float32Lit | NodeKind::Float64Lit
        )
    }

    /// String literal kinds (plain, raw, triple).
    pub fn is_str_lit(self) -> bool {
        matches!(
            self,
            NodeKind::StrLit | NodeKind::RStrLit | NodeKind::TripleStrLit
        )
    }

    /// Routine declaration kinds.
    pub fn is_routine_def(self) -> bool {
        matches!(
            self,
            NodeKind::ProcDef
                | NodeKind::MethodDef
                | NodeKind::IteratorDef
                | NodeKind::MacroDef
                | NodeKind::TemplateDef
                | NodeKind::ConverterDef
        )
    }

    /// Conversion kinds the typechecker inserts; recognising them keeps
    /// re-analysis of an already-rewritten call a no-op.
    pub fn is_hidden_conv(self) -> bool {
        matches!(
            self,
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
                | NodeKind::ChckRangeF
        )
    }
}

bitflags! {
    /// Per-node flags.
    ///
    /// The base flags record how a numeric literal was written so the
    /// renderer can reproduce it.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
    pub struct NodeFlags: u8 {
        /// Literal was written in binary.
        const BASE2 = 1 << 0;
        /// Literal was written in octal.
        const BASE8 = 1 << 1;
        /// Literal was written in hexadecimal.
        const BASE16 = 1 << 2;
    }
}

/// Node payload: exactly one of the classes in [`PayloadClass`].
#[derive(Clone, Debug, Default)]
pub enum NodePayload {
    #[default]
    None,
    Int(i64),
    Float(f64),
    Str(Box<str>),
    Ident(Name),
    Sym(SymId),
    Sons(Vec<NodeId>),
}

impl NodePayload {
    fn class(&self) -> PayloadClass {
        match self {
            NodePayload::None => PayloadClass::None,
            NodePayload::Int(_) => PayloadClass::Int,
            NodePayload::Float(_) => PayloadClass::Float,
            NodePayload::Str(_) => PayloadClass::Str,
            NodePayload::Ident(_) => PayloadClass::Ident,
            NodePayload::Sym(_) => PayloadClass::Sym,
            NodePayload::Sons(_) => PayloadClass::Sons,
        }
    }
}

/// One AST node.
#[derive(Clone, Debug)]
pub struct Node {
    pub kind: NodeKind,
    pub flags: NodeFlags,
    pub loc: Loc,
    /// Type assigned by semantic analysis; `TypeId::NONE` before.
    pub typ: TypeId,
    /// Attached comment, if the parser kept one.
    pub comment: Option<Box<str>>,
    pub payload: NodePayload,
}

impl Node {
    /// Create a node, checking the payload class in debug builds.
    pub fn new(kind: NodeKind, loc: Loc, payload: NodePayload) -> Self {
        debug_assert_eq!(
            kind.payload_class(),
            payload.class(),
            "payload class mismatch for {kind:?}"
        );
        Node {
            kind,
            flags: NodeFlags::empty(),
            loc,
            typ: TypeId::NONE,
            comment: None,
            payload,
        }
    }

    /// The integer value; panics if the node is not an int literal.
    #[inline]
    pub fn int_val(&self) -> i64 {
        match self.payload {
            NodePayload::Int(v) => v,
            _ => panic!("int_val on {:?}", self.kind),
        }
    }

    /// The float value; panics if the node is not a float literal.
    #[inline]
    pub fn float_val(&self) -> f64 {
        match self.payload {
            NodePayload::Float(v) => v,
            _ => panic!("float_val on {:?}", self.kind),
        }
    }

    /// The string payload; panics on other payload classes.
    #[inline]
    pub fn str_val(&self) -> &str {
        match &self.payload {
            NodePayload::Str(s) => s,
            _ => panic!("str_val on {:?}", self.kind),
        }
    }

    /// The identifier payload; panics on other payload classes.
    #[inline]
    pub fn ident(&self) -> Name {
        match self.payload {
            NodePayload::Ident(name) => name,
            _ => panic!("ident on {:?}", self.kind),
        }
    }

    /// The symbol payload; panics on other payload classes.
    #[inline]
    pub fn sym(&self) -> SymId {
        match self.payload {
            NodePayload::Sym(sym) => sym,
            _ => panic!("sym on {:?}", self.kind),
        }
    }

    /// The children; empty slice for non-`Sons` payloads.
    #[inline]
    pub fn sons(&self) -> &[NodeId] {
        match &self.payload {
            NodePayload::Sons(sons) => sons,
            _ => &[],
        }
    }

    /// Child at position `i`; panics if out of range.
    #[inline]
    pub fn son(&self, i: usize) -> NodeId {
        self.sons()[i]
    }

    /// Number of children.
    #[inline]
    pub fn len(&self) -> usize {
        self.sons().len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.sons().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_classes() {
        assert_eq!(NodeKind::IntLit.payload_class(), PayloadClass::Int);
        assert_eq!(NodeKind::Ident.payload_class(), PayloadClass::Ident);
        assert_eq!(NodeKind::Call.payload_class(), PayloadClass::Sons);
        assert_eq!(NodeKind::NilLit.payload_class(), PayloadClass::None);
        assert_eq!(NodeKind::CommentStmt.payload_class(), PayloadClass::Str);
    }

    #[test]
    fn test_hidden_conv_recognition() {
        assert!(NodeKind::HiddenStdConv.is_hidden_conv());
        assert!(NodeKind::StringToCString.is_hidden_conv());
        assert!(!NodeKind::Call.is_hidden_conv());
    }

    #[test]
    #[should_panic(expected = "int_val")]
    fn test_wrong_accessor_panics() {
        let n = Node::new(NodeKind::NilLit, Loc::UNKNOWN, NodePayload::None);
        let _ = n.int_val();
    }
}
