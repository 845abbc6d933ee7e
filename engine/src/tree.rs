//! Evolving binary tree and its batch step
//!
//! `advance` is split into two phases. `plan_step` only reads the tree and
//! draws randomness, producing a `StepPlan` of pending grow/prune operations
//! for the whole frontier. `apply` then performs every mutation. No frontier
//! node ever observes a change made by another frontier node in the same step.

use std::collections::HashSet;

use rand::Rng;

use crate::error::SimulationError;
use crate::node::{Node, NodeArena, NodeId, Slot};

/// Independent per-slot growth probabilities `(p0, p1)`, each in [0, 1]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlotProbabilities([f64; 2]);

impl SlotProbabilities {
    /// Validate and build a probability pair. Values are never clamped.
    pub fn new(p0: f64, p1: f64) -> Result<Self, SimulationError> {
        for (slot, value) in [p0, p1].into_iter().enumerate() {
            if !(0.0..=1.0).contains(&value) {
                return Err(SimulationError::InvalidProbability { slot, value });
            }
        }
        Ok(SlotProbabilities([p0, p1]))
    }

    /// Same probability for both slots
    pub fn uniform(p: f64) -> Result<Self, SimulationError> {
        Self::new(p, p)
    }

    /// Growth probability of `slot`
    pub fn get(self, slot: Slot) -> f64 {
        self.0[slot.index()]
    }

    /// The pair with slot labels exchanged
    pub fn swapped(self) -> Self {
        SlotProbabilities([self.0[1], self.0[0]])
    }
}

impl Default for SlotProbabilities {
    /// The critical process: one expected child per node per step
    fn default() -> Self {
        SlotProbabilities([0.5, 0.5])
    }
}

/// Pending operations for one step, decided against a single snapshot
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StepPlan {
    grows: Vec<(NodeId, Slot)>,
    prunes: Vec<NodeId>,
}

impl StepPlan {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule growth of `node` into `slot`
    pub fn grow(&mut self, node: NodeId, slot: Slot) -> &mut Self {
        self.grows.push((node, slot));
        self
    }

    /// Schedule removal of the empty leaf `node`
    pub fn prune(&mut self, node: NodeId) -> &mut Self {
        self.prunes.push(node);
        self
    }

    pub fn grows(&self) -> &[(NodeId, Slot)] {
        &self.grows
    }

    pub fn prunes(&self) -> &[NodeId] {
        &self.prunes
    }

    pub fn is_empty(&self) -> bool {
        self.grows.is_empty() && self.prunes.is_empty()
    }
}

/// A birth-death process over a binary tree
///
/// Starts as a lone root (height 0, frontier = {root}). The root is never
/// pruned; the tree has "returned" whenever the root has no children.
#[derive(Debug, Clone)]
pub struct Tree {
    probabilities: SlotProbabilities,
    arena: NodeArena,
    root: NodeId,
    frontier: Vec<NodeId>,
    height: u32,
    peak_frontier_size: usize,
}

impl Tree {
    /// Create a single-root tree at height 0
    pub fn new(probabilities: SlotProbabilities) -> Self {
        let mut arena = NodeArena::new();
        let root = arena.alloc(Node::root());
        Tree {
            probabilities,
            arena,
            root,
            frontier: vec![root],
            height: 0,
            peak_frontier_size: 1,
        }
    }

    /// Run one batch step: decide against the current snapshot, then apply.
    pub fn advance<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let plan = self.plan_step(rng);
        self.apply(plan);
    }

    /// Decision phase: one uniform draw per empty slot of every frontier node.
    ///
    /// A non-root frontier node that is empty and schedules no growth is
    /// scheduled for pruning in the same step.
    pub fn plan_step<R: Rng + ?Sized>(&self, rng: &mut R) -> StepPlan {
        let mut plan = StepPlan {
            grows: Vec::with_capacity(self.frontier.len() * 2),
            prunes: Vec::new(),
        };
        for &id in &self.frontier {
            let node = &self.arena[id];
            let mut grows_here = false;
            for slot in node.growth_candidate_slots() {
                if rng.gen::<f64>() < self.probabilities.get(slot) {
                    plan.grow(id, slot);
                    grows_here = true;
                }
            }
            if !grows_here && node.is_empty() && !node.is_root() {
                plan.prune(id);
            }
        }
        plan
    }

    /// Application phase: all grows, then all prunes, then rebuild the frontier.
    ///
    /// New frontier = newly grown nodes followed by the parents of pruned
    /// nodes, each parent at most once.
    ///
    /// # Panics
    /// If a scheduled prune targets a node that has children once the grows
    /// have been applied, or any id in the plan is not a live node.
    pub fn apply(&mut self, plan: StepPlan) {
        let mut next = Vec::with_capacity(plan.grows.len() + plan.prunes.len());
        for (id, slot) in plan.grows {
            if let Some(child) = self.arena.grow(id, slot) {
                next.push(child);
            }
        }

        let mut promoted = HashSet::with_capacity(plan.prunes.len());
        for id in plan.prunes {
            if let Some(parent) = self.arena.detach_from_parent(id) {
                if promoted.insert(parent) {
                    next.push(parent);
                }
            }
        }
        // A hand-built plan may prune a parent right after its last child.
        next.retain(|&id| self.arena.contains(id));

        self.frontier = next;
        self.height = if self.arena[self.root].is_empty() {
            0
        } else {
            self.frontier
                .iter()
                .map(|&id| self.arena[id].height())
                .max()
                .unwrap_or(0)
        };
        self.peak_frontier_size = self.peak_frontier_size.max(self.frontier.len());
    }

    /// Max height over the frontier, or 0 once the root is empty again
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Largest frontier ever observed, including the initial `{root}`
    pub fn peak_frontier_size(&self) -> usize {
        self.peak_frontier_size
    }

    pub fn frontier_size(&self) -> usize {
        self.frontier.len()
    }

    /// Current frontier, in the order it will be processed next step
    pub fn frontier(&self) -> &[NodeId] {
        &self.frontier
    }

    pub fn is_at_root(&self) -> bool {
        self.height == 0
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn arena(&self) -> &NodeArena {
        &self.arena
    }

    /// Number of live nodes, root included
    pub fn node_count(&self) -> usize {
        self.arena.len()
    }
}
