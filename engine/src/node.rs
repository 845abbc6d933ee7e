//! Node definitions for the evolving binary tree
//!
//! Nodes live in a flat arena and refer to each other by `NodeId`. A parent
//! owns its (up to two) children through its slot array; the child's `parent`
//! field is a plain back-index used only to detach it during pruning.

use std::ops::{Index, IndexMut};

/// Node ID type (index into the arena)
pub type NodeId = u32;

/// One of the two child positions of a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Slot {
    /// Slot 0
    Zero,
    /// Slot 1
    One,
}

impl Slot {
    /// Both slots, in index order
    pub const ALL: [Slot; 2] = [Slot::Zero, Slot::One];

    /// Create a slot from its index (0 or 1)
    pub fn new(index: usize) -> Self {
        assert!(index < 2, "Slot index must be 0 or 1, got {index}");
        if index == 0 {
            Slot::Zero
        } else {
            Slot::One
        }
    }

    /// Get the raw slot index (0 or 1)
    pub fn index(self) -> usize {
        match self {
            Slot::Zero => 0,
            Slot::One => 1,
        }
    }
}

/// A single tree vertex
///
/// `height` is fixed at creation (parent height + 1, or 0 for the root).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    slot: Slot,
    height: u32,
    parent: Option<NodeId>,
    children: [Option<NodeId>; 2],
}

impl Node {
    /// Create a root node (height 0, no parent)
    pub fn root() -> Self {
        Node {
            slot: Slot::Zero,
            height: 0,
            parent: None,
            children: [None, None],
        }
    }

    fn child_of(parent: NodeId, parent_height: u32, slot: Slot) -> Self {
        Node {
            slot,
            height: parent_height + 1,
            parent: Some(parent),
            children: [None, None],
        }
    }

    /// Position of this node in its parent (meaningless for the root)
    pub fn slot(&self) -> Slot {
        self.slot
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// Child occupying `slot`, if any
    pub fn child(&self, slot: Slot) -> Option<NodeId> {
        self.children[slot.index()]
    }

    /// Slots that are currently unoccupied (0, 1 or 2 of them)
    pub fn growth_candidate_slots(&self) -> impl Iterator<Item = Slot> + '_ {
        Slot::ALL
            .into_iter()
            .filter(move |slot| self.children[slot.index()].is_none())
    }

    /// True iff both slots are unoccupied
    pub fn is_empty(&self) -> bool {
        self.children.iter().all(Option::is_none)
    }
}

/// Arena allocator for tree nodes
///
/// Freed entries are recycled through a free list, so a pruned node's id may
/// be handed out again by a later `grow`.
#[derive(Debug, Clone)]
pub struct NodeArena {
    nodes: Vec<Option<Node>>,
    free: Vec<NodeId>,
    live: usize,
}

impl NodeArena {
    pub fn new() -> Self {
        NodeArena {
            nodes: Vec::new(),
            free: Vec::new(),
            live: 0,
        }
    }

    /// Store a node and return its id
    pub fn alloc(&mut self, node: Node) -> NodeId {
        self.live += 1;
        match self.free.pop() {
            Some(id) => {
                self.nodes[id as usize] = Some(node);
                id
            }
            None => {
                let id = NodeId::try_from(self.nodes.len()).expect("node arena overflow");
                self.nodes.push(Some(node));
                id
            }
        }
    }

    /// Get a node by ID, or `None` if the id is out of range or was freed
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id as usize).and_then(Option::as_ref)
    }

    fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id as usize).and_then(Option::as_mut)
    }

    /// Whether `id` refers to a live node
    pub fn contains(&self, id: NodeId) -> bool {
        self.get(id).is_some()
    }

    /// Number of live nodes
    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Grow a new child of `parent` into `slot`.
    ///
    /// Returns the new child's id, or `None` (and changes nothing) if the slot
    /// is already occupied.
    pub fn grow(&mut self, parent: NodeId, slot: Slot) -> Option<NodeId> {
        let parent_height = {
            let node = &self[parent];
            if node.child(slot).is_some() {
                return None;
            }
            node.height
        };
        let child = self.alloc(Node::child_of(parent, parent_height, slot));
        self[parent].children[slot.index()] = Some(child);
        Some(child)
    }

    /// Remove an empty node from its parent and free it.
    ///
    /// Returns the parent, or `None` for the root (which is never removed).
    ///
    /// # Panics
    /// If the node still has children.
    pub fn detach_from_parent(&mut self, id: NodeId) -> Option<NodeId> {
        let (parent, slot) = {
            let node = &self[id];
            assert!(
                node.is_empty(),
                "detach_from_parent: node {id} still has children"
            );
            (node.parent?, node.slot)
        };
        let parent_node = &mut self[parent];
        debug_assert_eq!(parent_node.children[slot.index()], Some(id));
        parent_node.children[slot.index()] = None;
        self.nodes[id as usize] = None;
        self.free.push(id);
        self.live -= 1;
        Some(parent)
    }
}

impl Default for NodeArena {
    fn default() -> Self {
        Self::new()
    }
}

impl Index<NodeId> for NodeArena {
    type Output = Node;
    fn index(&self, id: NodeId) -> &Self::Output {
        self.get(id).expect("invalid node id")
    }
}

impl IndexMut<NodeId> for NodeArena {
    fn index_mut(&mut self, id: NodeId) -> &mut Self::Output {
        self.get_mut(id).expect("invalid node id")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn arena_with_root() -> (NodeArena, NodeId) {
        let mut arena = NodeArena::new();
        assert!(arena.is_empty());
        let root = arena.alloc(Node::root());
        (arena, root)
    }

    #[test]
    fn test_slot_index_round_trip() {
        assert_eq!(Slot::new(0), Slot::Zero);
        assert_eq!(Slot::new(1).index(), 1);
    }

    #[test]
    #[should_panic(expected = "Slot index must be 0 or 1")]
    fn test_slot_out_of_range_panics() {
        Slot::new(2);
    }

    #[test]
    fn test_grow_sets_height_parent_and_slot() {
        let (mut arena, root) = arena_with_root();
        let child = arena.grow(root, Slot::One).unwrap();
        let node = &arena[child];
        assert_eq!(node.height(), 1);
        assert_eq!(node.parent(), Some(root));
        assert_eq!(node.slot(), Slot::One);
        assert_eq!(arena[root].child(Slot::One), Some(child));
        assert!(arena[root].child(Slot::Zero).is_none());

        let grandchild = arena.grow(child, Slot::Zero).unwrap();
        assert_eq!(arena[grandchild].height(), 2);
    }

    #[test]
    fn test_grow_into_occupied_slot_is_noop() {
        let (mut arena, root) = arena_with_root();
        let first = arena.grow(root, Slot::Zero).unwrap();
        assert_eq!(arena.grow(root, Slot::Zero), None);
        assert_eq!(arena.len(), 2);
        assert_eq!(arena[root].child(Slot::Zero), Some(first));
    }

    #[test]
    fn test_growth_candidate_slots() {
        let (mut arena, root) = arena_with_root();
        let all: Vec<Slot> = arena[root].growth_candidate_slots().collect();
        assert_eq!(all, vec![Slot::Zero, Slot::One]);

        arena.grow(root, Slot::Zero).unwrap();
        let rest: Vec<Slot> = arena[root].growth_candidate_slots().collect();
        assert_eq!(rest, vec![Slot::One]);

        arena.grow(root, Slot::One).unwrap();
        assert_eq!(arena[root].growth_candidate_slots().count(), 0);
        assert!(!arena[root].is_empty());
    }

    #[test]
    fn test_detach_returns_parent_and_frees_node() {
        let (mut arena, root) = arena_with_root();
        let child = arena.grow(root, Slot::One).unwrap();
        assert_eq!(arena.detach_from_parent(child), Some(root));
        assert!(!arena.contains(child));
        assert!(!arena.is_empty());
        assert!(arena[root].is_empty());
        assert_eq!(arena.len(), 1);
    }

    #[test]
    fn test_detach_root_returns_none() {
        let (mut arena, root) = arena_with_root();
        assert_eq!(arena.detach_from_parent(root), None);
        assert!(arena.contains(root));
    }

    #[test]
    #[should_panic(expected = "still has children")]
    fn test_detach_non_empty_panics() {
        let (mut arena, root) = arena_with_root();
        let child = arena.grow(root, Slot::Zero).unwrap();
        arena.grow(child, Slot::Zero).unwrap();
        arena.detach_from_parent(child);
    }

    #[test]
    fn test_freed_ids_are_recycled() {
        let (mut arena, root) = arena_with_root();
        let child = arena.grow(root, Slot::Zero).unwrap();
        arena.detach_from_parent(child);
        let again = arena.grow(root, Slot::One).unwrap();
        assert_eq!(again, child);
        assert_eq!(arena[again].slot(), Slot::One);
    }
}
