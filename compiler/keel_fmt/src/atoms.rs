//! Literal atom formatting.
//!
//! Numeric literals honour their base presentation flags with widths
//! proportional to the declared type size; non-default integer and
//! float kinds carry typed suffixes. Strings are escaped byte-wise and
//! long strings split into adjacent quoted fragments.

use crate::{Sources, STRING_SPLIT};
use keel_ir::{Node, NodeFlags, NodeKind};
use keel_types::TypeKind;
use std::fmt::Write as _;

/// Byte width of the literal's declared type.
fn lit_size(src: &Sources<'_>, node: &Node) -> i64 {
    // The node kind fixes a width for the sized literal kinds; an
    // assigned type refines the default kinds.
    let from_kind = match node.kind {
        NodeKind::Int8Lit => 1,
        NodeKind::Int16Lit => 2,
        NodeKind::Int32Lit | NodeKind::Float32Lit => 4,
        NodeKind::Int64Lit | NodeKind::Float64Lit => 8,
        NodeKind::CharLit => 1,
        _ => -1,
    };
    if from_kind > 0 {
        return from_kind;
    }
    if node.typ.is_some() {
        let k = src.types.kind(src.types.skip_range(node.typ));
        let s = k.numeric_size();
        if s > 0 {
            return s;
        }
        if k == TypeKind::Char {
            return 1;
        }
    }
    8
}

/// Typed suffix for non-default literal kinds.
fn suffix(kind: NodeKind) -> &'static str {
    match kind {
        NodeKind::Int8Lit => "'i8",
        NodeKind::Int16Lit => "'i16",
        NodeKind::Int32Lit => "'i32",
        NodeKind::Int64Lit => "'i64",
        NodeKind::Float32Lit => "'f32",
        NodeKind::Float64Lit => "'f64",
        _ => "",
    }
}

/// Emit `bits` in the flagged base with the width the size dictates.
fn based(out: &mut String, flags: NodeFlags, bits: u64, size: i64) {
    let size = size as usize;
    if flags.contains(NodeFlags::BASE16) {
        let _ = write!(out, "0x{:0width$X}", bits, width = size * 2);
    } else if flags.contains(NodeFlags::BASE8) {
        let _ = write!(out, "0o{:0width$o}", bits, width = size * 3);
    } else {
        let _ = write!(out, "0b{:0width$b}", bits, width = size * 8);
    }
}

fn has_base(flags: NodeFlags) -> bool {
    flags.intersects(NodeFlags::BASE2 | NodeFlags::BASE8 | NodeFlags::BASE16)
}

/// Mask a value down to `size` bytes for based display.
fn truncate(value: i64, size: i64) -> u64 {
    if size >= 8 {
        value as u64
    } else {
        (value as u64) & ((1u64 << (size * 8)) - 1)
    }
}

/// Integer literal atom.
pub(crate) fn int_atom(src: &Sources<'_>, node: &Node) -> String {
    let mut out = String::new();
    let value = node.int_val();
    if has_base(node.flags) {
        let size = lit_size(src, node);
        based(&mut out, node.flags, truncate(value, size), size);
    } else {
        let _ = write!(out, "{value}");
    }
    out.push_str(suffix(node.kind));
    out
}

/// Float literal atom. Under a base flag the value is bit-reinterpreted
/// to the same-width integer and emitted in that base.
pub(crate) fn float_atom(src: &Sources<'_>, node: &Node) -> String {
    let mut out = String::new();
    let value = node.float_val();
    if has_base(node.flags) {
        let size = lit_size(src, node);
        let bits = if size == 4 {
            u64::from((value as f32).to_bits())
        } else {
            value.to_bits()
        };
        based(&mut out, node.flags, bits, size);
    } else {
        let _ = write!(out, "{value:?}");
    }
    out.push_str(suffix(node.kind));
    out
}

/// Escape one byte into `out` following the string rules.
fn escape_byte(out: &mut String, b: u8) {
    match b {
        b'\\' => out.push_str("\\\\"),
        b'"' => out.push_str("\\\""),
        b'\'' => out.push_str("\\'"),
        0x20..=0x7E => out.push(b as char),
        _ => {
            let _ = write!(out, "\\x{b:02X}");
        }
    }
}

/// Escape a whole string payload (no quotes).
pub(crate) fn escape_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    for b in s.bytes() {
        escape_byte(&mut out, b);
    }
    out
}

/// Character literal atom, with quotes.
pub(crate) fn char_atom(value: i64) -> String {
    let mut out = String::from("'");
    escape_byte(&mut out, (value as u64 & 0xFF) as u8);
    out.push('\'');
    out
}

/// String literal atom(s), with quotes.
///
/// Plain strings longer than the split threshold come back as several
/// adjacent quoted fragments; the textual meaning is preserved but the
/// emitted source is a sequence of concatenated literals.
pub(crate) fn str_fragments(node: &Node) -> Vec<String> {
    let payload = node.str_val();
    match node.kind {
        NodeKind::RStrLit => {
            let mut out = String::from("r\"");
            for c in payload.chars() {
                out.push(c);
                if c == '"' {
                    out.push('"');
                }
            }
            out.push('"');
            vec![out]
        }
        NodeKind::TripleStrLit => vec![format!("\"\"\"{payload}\"\"\"")],
        _ => {
            let escaped = escape_string(payload);
            if escaped.len() <= STRING_SPLIT {
                return vec![format!("\"{escaped}\"")];
            }
            // Split at escape-sequence boundaries, never inside one.
            let mut fragments = Vec::new();
            let mut current = String::from("\"");
            let mut col = 0usize;
            let bytes = escaped.as_bytes();
            let mut i = 0;
            while i < bytes.len() {
                let step = if bytes[i] == b'\\' {
                    if i + 1 < bytes.len() && bytes[i + 1] == b'x' {
                        4
                    } else {
                        2
                    }
                } else {
                    1
                };
                current.push_str(&escaped[i..i + step]);
                col += step;
                i += step;
                if col >= STRING_SPLIT && i < bytes.len() {
                    current.push('"');
                    fragments.push(std::mem::replace(&mut current, String::from("\"")));
                    col = 0;
                }
            }
            current.push('"');
            fragments.push(current);
            fragments
        }
    }
}
