//! Index newtypes tying the three slabs together.
//!
//! Nodes, symbols and types live in three typed slabs (the node arena,
//! the symbol arena and the type pool). All cross-references between
//! them are 32-bit indices, so cyclic graphs cost nothing and equality
//! is O(1) id comparison. `u32::MAX` is the shared "absent" sentinel:
//! a `NodeId::NONE` child is a significant placeholder meaning "this
//! optional slot is empty".

use std::fmt;

macro_rules! define_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
        #[repr(transparent)]
        pub struct $name(u32);

        impl $name {
            /// Sentinel value meaning "no entry".
            pub const NONE: Self = Self(u32::MAX);

            /// Create an index from a raw u32 value.
            #[inline]
            pub const fn from_raw(raw: u32) -> Self {
                Self(raw)
            }

            /// Get the raw u32 value.
            #[inline]
            pub const fn raw(self) -> u32 {
                self.0
            }

            /// Get the raw value as a usize slab index.
            #[inline]
            pub const fn index(self) -> usize {
                self.0 as usize
            }

            /// Check if this is the NONE sentinel.
            #[inline]
            pub const fn is_none(self) -> bool {
                self.0 == u32::MAX
            }

            /// Check if this refers to a real entry.
            #[inline]
            pub const fn is_some(self) -> bool {
                self.0 != u32::MAX
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                if self.is_none() {
                    write!(f, concat!(stringify!($name), "::NONE"))
                } else {
                    write!(f, concat!(stringify!($name), "({})"), self.0)
                }
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::NONE
            }
        }

        crate::static_assert_size!($name, 4);
    };
}

define_id! {
    /// Index of a node in the node arena.
    NodeId
}

define_id! {
    /// Index of a symbol in the symbol arena.
    ///
    /// The index doubles as the symbol's globally unique id: symbols are
    /// never removed from the arena during a compilation unit.
    SymId
}

define_id! {
    /// Index of a type in the type pool.
    ///
    /// The index doubles as the type's id; nominal equality (objects,
    /// declared enums, distincts) is `TypeId` equality.
    TypeId
}
