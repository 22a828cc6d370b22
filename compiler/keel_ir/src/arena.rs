//! Arena allocation for the AST.
//!
//! All nodes of a compilation unit live in one flat slab and reference
//! each other by [`NodeId`]. Every node is owned by exactly one parent
//! slot; `copy_tree` produces fresh identities when argument lowering
//! needs a structural duplicate.

use crate::{Loc, Node, NodeId, NodeKind, NodePayload};

/// Panic helper for capacity overflow (cold path, never inlined).
#[cold]
#[inline(never)]
fn panic_capacity_exceeded(len: usize) -> ! {
    panic!(
        "node arena capacity exceeded: {len} nodes (0x{len:X}), max is {} (0x{:X})",
        u32::MAX - 1,
        u32::MAX - 1
    )
}

/// Contiguous storage for all nodes of a compilation unit.
#[derive(Default)]
pub struct NodeArena {
    nodes: Vec<Node>,
}

impl NodeArena {
    /// Create a new empty arena.
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a node, returning its id.
    pub fn alloc(&mut self, node: Node) -> NodeId {
        let len = self.nodes.len();
        // u32::MAX is the NONE sentinel and must never become a real id.
        if len >= u32::MAX as usize {
            panic_capacity_exceeded(len);
        }
        self.nodes.push(node);
        NodeId::from_raw(len as u32)
    }

    /// Allocate a node with children.
    pub fn alloc_with(&mut self, kind: NodeKind, loc: Loc, sons: Vec<NodeId>) -> NodeId {
        self.alloc(Node::new(kind, loc, NodePayload::Sons(sons)))
    }

    /// Get a node by id.
    #[inline]
    pub fn get(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    /// Get a mutable node by id.
    #[inline]
    pub fn get_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.index()]
    }

    /// Number of allocated nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Append a child to a `Sons` node.
    pub fn add_son(&mut self, parent: NodeId, child: NodeId) {
        match &mut self.get_mut(parent).payload {
            NodePayload::Sons(sons) => sons.push(child),
            other => panic!("add_son on payload {other:?}"),
        }
    }

    /// Replace the child at `i` of a `Sons` node.
    pub fn set_son(&mut self, parent: NodeId, i: usize, child: NodeId) {
        match &mut self.get_mut(parent).payload {
            NodePayload::Sons(sons) => sons[i] = child,
            other => panic!("set_son on payload {other:?}"),
        }
    }

    /// Deep structural copy with fresh identities.
    ///
    /// `NodeId::NONE` placeholders are preserved as placeholders.
    pub fn copy_tree(&mut self, id: NodeId) -> NodeId {
        if id.is_none() {
            return NodeId::NONE;
        }
        let template = self.get(id).clone();
        let payload = match template.payload {
            NodePayload::Sons(sons) => {
                let copied = sons.iter().map(|&son| self.copy_tree(son)).collect();
                NodePayload::Sons(copied)
            }
            other => other,
        };
        self.alloc(Node {
            kind: template.kind,
            flags: template.flags,
            loc: template.loc,
            typ: template.typ,
            comment: template.comment,
            payload,
        })
    }

    /// Structural equivalence: kind, payload and children.
    ///
    /// Locations, comments, flags and assigned types are ignored;
    /// symbol payloads compare by symbol id.
    pub fn structurally_equal(&self, a: NodeId, b: NodeId) -> bool {
        match (a.is_none(), b.is_none()) {
            (true, true) => return true,
            (true, false) | (false, true) => return false,
            _ => {}
        }
        let (na, nb) = (self.get(a), self.get(b));
        if na.kind != nb.kind {
            return false;
        }
        match (&na.payload, &nb.payload) {
            (NodePayload::None, NodePayload::None) => true,
            (NodePayload::Int(x), NodePayload::Int(y)) => x == y,
            (NodePayload::Float(x), NodePayload::Float(y)) => x.to_bits() == y.to_bits(),
            (NodePayload::Str(x), NodePayload::Str(y)) => x == y,
            (NodePayload::Ident(x), NodePayload::Ident(y)) => x == y,
            (NodePayload::Sym(x), NodePayload::Sym(y)) => x == y,
            (NodePayload::Sons(xs), NodePayload::Sons(ys)) => {
                xs.len() == ys.len()
                    && xs
                        .iter()
                        .zip(ys.iter())
                        .all(|(&x, &y)| self.structurally_equal(x, y))
            }
            _ => false,
        }
    }

    /// Visit every (present) child of a node, left to right.
    pub fn each_child(&self, id: NodeId, mut f: impl FnMut(NodeId)) {
        for &son in self.get(id).sons() {
            if son.is_some() {
                f(son);
            }
        }
    }
}
