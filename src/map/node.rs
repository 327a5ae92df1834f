//! Node storage for [`TetraMap`](super::TetraMap).
//!
//! Every node of a map lives in one [`Arena`], and nodes reference each
//! other through plain [`NodeId`] indices, the parent link included. The
//! arena is the sole owner of node memory: it grows in batches through the
//! backing vector and is released as a single unit on drop or
//! [`clear`](Arena::clear). Nodes are only ever allocated, never returned
//! one by one.

use std::ops::{Index, IndexMut};

use arrayvec::ArrayVec;

/// Most pairs a node can hold.
pub(crate) const NODE_PAIRS: usize = 3;

/// Index of a node within its [`Arena`].
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub(crate) struct NodeId(u32);

/// A 2-3-4 tree node: one to three pairs in ascending key order, and for
/// interior nodes exactly `pairs.len() + 1` children. Leaves have no
/// children at all.
#[derive(Clone)]
pub(crate) struct Node<K, V> {
    pub parent: Option<NodeId>,
    pub pairs: ArrayVec<(K, V), NODE_PAIRS>,
    pub kids: ArrayVec<NodeId, { NODE_PAIRS + 1 }>,
}

impl<K, V> Node<K, V> {
    pub fn empty(parent: Option<NodeId>) -> Self {
        Node {
            parent,
            pairs: ArrayVec::new(),
            kids: ArrayVec::new(),
        }
    }

    pub fn leaf(parent: Option<NodeId>, pair: (K, V)) -> Self {
        let mut node = Node::empty(parent);
        node.pairs.push(pair);
        node
    }
}

/// Position of a pair: a node plus the slot index within it.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub(crate) struct Pos {
    pub node: NodeId,
    pub slot: usize,
}

/// Node pool backing one map.
#[derive(Clone)]
pub(crate) struct Arena<K, V> {
    nodes: Vec<Node<K, V>>,
}

impl<K, V> Arena<K, V> {
    pub fn new() -> Self {
        Arena { nodes: Vec::new() }
    }

    pub fn with_node_capacity(nodes: usize) -> Self {
        Arena {
            nodes: Vec::with_capacity(nodes),
        }
    }

    pub fn alloc(&mut self, node: Node<K, V>) -> NodeId {
        let id = u32::try_from(self.nodes.len()).expect("node pool exhausted");
        self.nodes.push(node);
        NodeId(id)
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
    }

    #[cfg(test)]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Pair count over the whole pool. Every allocated node stays part of
    /// the tree topology, so this is the map size. O(nodes).
    pub fn pair_total(&self) -> usize {
        self.nodes.iter().map(|n| n.pairs.len()).sum()
    }

    /// Position of the least pair in the subtree rooted at `id`.
    pub fn first_below(&self, mut id: NodeId) -> Pos {
        while let Some(&kid) = self[id].kids.first() {
            id = kid;
        }
        Pos { node: id, slot: 0 }
    }

    /// Position of the greatest pair in the subtree rooted at `id`.
    pub fn last_below(&self, mut id: NodeId) -> Pos {
        while let Some(&kid) = self[id].kids.last() {
            id = kid;
        }
        Pos {
            node: id,
            slot: self[id].pairs.len() - 1,
        }
    }

    /// Which child slot of `parent` links to `kid`.
    pub fn kid_slot(&self, parent: NodeId, kid: NodeId) -> usize {
        self[parent]
            .kids
            .iter()
            .position(|&c| c == kid)
            .expect("parent link out of sync")
    }

    /// One step toward greater keys, or `None` from the maximum.
    ///
    /// The subtree right of the slot comes first, then the next in-node
    /// slot, and otherwise the walk climbs parent links until an ancestor
    /// has a pair right of the departed child. No allocation, no stack.
    pub fn ascend(&self, pos: Pos) -> Option<Pos> {
        let node = &self[pos.node];
        if let Some(&kid) = node.kids.get(pos.slot + 1) {
            return Some(self.first_below(kid));
        }
        if pos.slot + 1 < node.pairs.len() {
            return Some(Pos {
                node: pos.node,
                slot: pos.slot + 1,
            });
        }
        let mut id = pos.node;
        while let Some(up) = self[id].parent {
            let slot = self.kid_slot(up, id);
            if slot < self[up].pairs.len() {
                return Some(Pos { node: up, slot });
            }
            id = up;
        }
        None
    }

    /// One step toward lesser keys, or `None` from the minimum. Mirror of
    /// [`ascend`](Arena::ascend).
    pub fn descend(&self, pos: Pos) -> Option<Pos> {
        let node = &self[pos.node];
        if let Some(&kid) = node.kids.get(pos.slot) {
            return Some(self.last_below(kid));
        }
        if pos.slot > 0 {
            return Some(Pos {
                node: pos.node,
                slot: pos.slot - 1,
            });
        }
        let mut id = pos.node;
        while let Some(up) = self[id].parent {
            let slot = self.kid_slot(up, id);
            if slot > 0 {
                return Some(Pos {
                    node: up,
                    slot: slot - 1,
                });
            }
            id = up;
        }
        None
    }
}

impl<K, V> Default for Arena<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> Index<NodeId> for Arena<K, V> {
    type Output = Node<K, V>;

    fn index(&self, id: NodeId) -> &Node<K, V> {
        &self.nodes[id.0 as usize]
    }
}

impl<K, V> IndexMut<NodeId> for Arena<K, V> {
    fn index_mut(&mut self, id: NodeId) -> &mut Node<K, V> {
        &mut self.nodes[id.0 as usize]
    }
}
