//! Hand-built tree shapes for tests and benches
//!
//! Every fixture is reached from `Tree::new` by applying fixed `StepPlan`s, so
//! each one is a state the batch step can actually produce.
//!
//! Shapes (`*` marks frontier members):
//!   cherry:    root -> [A*, B*]
//!   spine(n):  root -> A -> ... -> leaf*   (n edges, all in slot 0)
//!   lopsided:  root* -> [A, -],  A -> [A0*, -]
//!   bushy(n):  complete tree of depth n, all 2^n leaves on the frontier

use crate::node::{NodeId, Slot};
use crate::tree::{SlotProbabilities, StepPlan, Tree};

fn grow_all(tree: &mut Tree, targets: &[(NodeId, Slot)]) {
    let mut plan = StepPlan::new();
    for &(id, slot) in targets {
        plan.grow(id, slot);
    }
    tree.apply(plan);
}

/// Root with two leaf children, both on the frontier.
pub fn build_cherry(probabilities: SlotProbabilities) -> Tree {
    let mut tree = Tree::new(probabilities);
    let root = tree.root();
    grow_all(&mut tree, &[(root, Slot::Zero), (root, Slot::One)]);
    tree
}

/// A single path of `depth` slot-0 edges; only the deepest node is on the frontier.
pub fn build_spine(probabilities: SlotProbabilities, depth: u32) -> Tree {
    let mut tree = Tree::new(probabilities);
    let mut tip = tree.root();
    for _ in 0..depth {
        grow_all(&mut tree, &[(tip, Slot::Zero)]);
        tip = tree.frontier()[0];
    }
    tree
}

/// Root holding one child after its other child was pruned.
///
/// The frontier is `[A0, root]`: the grandchild plus the promoted root.
pub fn build_lopsided(probabilities: SlotProbabilities) -> Tree {
    let mut tree = build_cherry(probabilities);
    let a = tree.frontier()[0];
    let b = tree.frontier()[1];
    let mut plan = StepPlan::new();
    plan.grow(a, Slot::Zero).prune(b);
    tree.apply(plan);
    tree
}

/// Complete binary tree of the given depth.
pub fn build_bushy(probabilities: SlotProbabilities, depth: u32) -> Tree {
    let mut tree = Tree::new(probabilities);
    for _ in 0..depth {
        let targets: Vec<(NodeId, Slot)> = tree
            .frontier()
            .iter()
            .flat_map(|&id| Slot::ALL.into_iter().map(move |slot| (id, slot)))
            .collect();
        grow_all(&mut tree, &targets);
    }
    tree
}
