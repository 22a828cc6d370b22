//! Renderer flags.

use bitflags::bitflags;

bitflags! {
    /// Options controlling what the renderer emits.
    #[derive(Copy, Clone, Eq, PartialEq, Debug, Default)]
    pub struct RenderFlags: u8 {
        /// Omit routine bodies (signature listings).
        const NO_BODY = 1 << 0;
        /// Drop all comments.
        const NO_COMMENTS = 1 << 1;
        /// Render only comments beginning with `##`.
        const DOC_COMMENTS = 1 << 2;
        /// Drop pragmas.
        const NO_PRAGMAS = 1 << 3;
        /// Append the symbol id in brackets after each symbol.
        const IDS = 1 << 4;
    }
}
