//! Keel source renderer.
//!
//! Walks an AST and emits canonical source text. Two passes per
//! subtree: a cheap per-kind width estimate ([`width::lsub`]) decides
//! whether a construct fits its line, then emission writes tokens with
//! indentation, soft line breaks and comment placement.
//!
//! The renderer writes to an in-memory buffer only and records a token
//! stream alongside it; the byte concatenation of all token literals
//! equals the rendered text.

mod atoms;
mod options;
mod render;
mod token;
mod width;

#[cfg(test)]
mod tests;

pub use options::RenderFlags;
pub use token::{TokKind, Token, TokenIter};

use keel_ir::{Interner, NodeArena, NodeId, SymArena};
use keel_types::TypePool;

/// Maximum line width before breaking.
pub const MAX_LINE_LEN: usize = 80;
/// Spaces per indentation level.
pub const INDENT_STEP: usize = 2;
/// Indent for wrapped argument lists at deep columns.
pub const LONG_INDENT: usize = 4;
/// Column where trailing comments are aligned.
pub const COMMENT_COL: usize = 30;
/// String literals longer than this are split into fragments.
pub const STRING_SPLIT: usize = 64;

/// Borrow bundle over the compilation unit's slabs.
#[derive(Copy, Clone)]
pub struct Sources<'a> {
    pub nodes: &'a NodeArena,
    pub syms: &'a SymArena,
    pub types: &'a TypePool,
    pub interner: &'a Interner,
}

/// The rendered output: text plus its token stream.
pub struct Rendered {
    buf: String,
    tokens: Vec<Token>,
}

impl Rendered {
    /// The rendered source text.
    pub fn text(&self) -> &str {
        &self.buf
    }

    /// Consume into the text.
    pub fn into_text(self) -> String {
        self.buf
    }

    /// Iterate `(kind, literal)` pairs; concatenating the literals
    /// yields exactly [`Rendered::text`].
    pub fn tokens(&self) -> TokenIter<'_> {
        TokenIter::new(&self.buf, &self.tokens)
    }
}

/// Render a tree to canonical source text.
pub fn render_tree(src: Sources<'_>, root: NodeId, flags: RenderFlags) -> Rendered {
    let mut r = render::Renderer::new(src, flags);
    r.gsub(root);
    r.finish()
}
