//! Render tokens.
//!
//! Token kinds mirror the parser's token enumeration: one kind per
//! reserved keyword, plus identifiers, literals, comments, indentation
//! and punctuation. Tokens store only a byte length; their literal text
//! is a slice of the shared render buffer.

/// Token kinds produced by the renderer.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
#[repr(u8)]
pub enum TokKind {
    Invalid,
    Ident,
    /// A resolved symbol rendered by name.
    Symbol,
    IntLit,
    FloatLit,
    StrLit,
    CharLit,
    Comment,
    /// A newline plus the indentation of the next line.
    Ind,
    Spaces,
    Opr,
    // Punctuation
    ParLe,
    ParRi,
    BracketLe,
    BracketRi,
    CurlyLe,
    CurlyRi,
    CurlyDotLe,
    CurlyDotRi,
    Comma,
    Semicolon,
    Colon,
    Equals,
    Dot,
    DotDot,
    // Keywords
    KwAddr,
    KwBlock,
    KwBreak,
    KwCase,
    KwCast,
    KwConst,
    KwContinue,
    KwConverter,
    KwDiscard,
    KwDistinct,
    KwElif,
    KwElse,
    KwEnum,
    KwExcept,
    KwFinally,
    KwFor,
    KwFrom,
    KwIf,
    KwImport,
    KwIn,
    KwInclude,
    KwIterator,
    KwMacro,
    KwMethod,
    KwNil,
    KwObject,
    KwOf,
    KwProc,
    KwPtr,
    KwRaise,
    KwRef,
    KwReturn,
    KwTemplate,
    KwTry,
    KwTuple,
    KwType,
    KwVar,
    KwWhen,
    KwWhile,
}

impl TokKind {
    /// The keyword's spelling, for keyword kinds.
    pub fn keyword(self) -> Option<&'static str> {
        use TokKind::*;
        let s = match self {
            KwAddr => "addr",
            KwBlock => "block",
            KwBreak => "break",
            KwCase => "case",
            KwCast => "cast",
            KwConst => "const",
            KwContinue => "continue",
            KwConverter => "converter",
            KwDiscard => "discard",
            KwDistinct => "distinct",
            KwElif => "elif",
            KwElse => "else",
            KwEnum => "enum",
            KwExcept => "except",
            KwFinally => "finally",
            KwFor => "for",
            KwFrom => "from",
            KwIf => "if",
            KwImport => "import",
            KwIn => "in",
            KwInclude => "include",
            KwIterator => "iterator",
            KwMacro => "macro",
            KwMethod => "method",
            KwNil => "nil",
            KwObject => "object",
            KwOf => "of",
            KwProc => "proc",
            KwPtr => "ptr",
            KwRaise => "raise",
            KwRef => "ref",
            KwReturn => "return",
            KwTemplate => "template",
            KwTry => "try",
            KwTuple => "tuple",
            KwType => "type",
            KwVar => "var",
            KwWhen => "when",
            KwWhile => "while",
            _ => return None,
        };
        Some(s)
    }
}

/// One token: kind plus the byte length of its literal.
#[derive(Copy, Clone, Debug)]
pub struct Token {
    pub kind: TokKind,
    pub len: u32,
}

/// Iterator over `(kind, literal)` pairs of a rendered buffer.
pub struct TokenIter<'a> {
    buf: &'a str,
    tokens: &'a [Token],
    pos: usize,
    idx: usize,
}

impl<'a> TokenIter<'a> {
    pub(crate) fn new(buf: &'a str, tokens: &'a [Token]) -> Self {
        TokenIter {
            buf,
            tokens,
            pos: 0,
            idx: 0,
        }
    }
}

impl<'a> Iterator for TokenIter<'a> {
    type Item = (TokKind, &'a str);

    fn next(&mut self) -> Option<Self::Item> {
        let tok = self.tokens.get(self.idx)?;
        let end = self.pos + tok.len as usize;
        let lit = &self.buf[self.pos..end];
        self.pos = end;
        self.idx += 1;
        Some((tok.kind, lit))
    }
}
