//! Search-tree nodes.
//!
//! Nodes live in an arena and are addressed by [`NodeId`]. Each non-root
//! node carries at most one semi-assignment constraint, which is dropped
//! together with the node once its subtree is finished.

use serde::{Deserialize, Serialize};

use crate::propagation::SemiassignCons;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(usize);

impl NodeId {
    pub fn new(value: usize) -> Self {
        Self(value)
    }

    pub fn value(&self) -> usize {
        self.0
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Node creation as seen by a branching rule.
pub trait SearchTree {
    /// Node whose LP is being branched on.
    fn current(&self) -> NodeId;

    /// Create a child of the current node. `estimate` is a lower bound on
    /// the objective inside the child's subtree.
    fn create_child(&mut self, estimate: f64) -> NodeId;

    /// Attach a node-local constraint.
    fn add_cons_node(&mut self, node: NodeId, cons: SemiassignCons);
}

#[derive(Debug)]
pub struct Node {
    pub parent: Option<NodeId>,
    pub depth: usize,
    pub estimate: f64,
    pub cons: Option<SemiassignCons>,
}

/// Arena of all nodes created during a run.
#[derive(Debug)]
pub struct NodeArena {
    nodes: Vec<Node>,
    current: NodeId,
    fresh: Vec<NodeId>,
}

impl Default for NodeArena {
    fn default() -> Self {
        Self::new()
    }
}

impl NodeArena {
    /// Arena holding only the root.
    pub fn new() -> Self {
        Self {
            nodes: vec![Node {
                parent: None,
                depth: 0,
                estimate: f64::NEG_INFINITY,
                cons: None,
            }],
            current: NodeId(0),
            fresh: Vec::new(),
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }

    pub fn set_current(&mut self, id: NodeId) {
        self.current = id;
    }

    /// Children created since the last call, in creation order.
    pub fn take_fresh(&mut self) -> Vec<NodeId> {
        std::mem::take(&mut self.fresh)
    }

    /// Release the constraint of a finished node.
    pub fn discard(&mut self, id: NodeId) {
        self.nodes[id.0].cons = None;
    }
}

impl SearchTree for NodeArena {
    fn current(&self) -> NodeId {
        self.current
    }

    fn create_child(&mut self, estimate: f64) -> NodeId {
        let parent = self.current;
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            parent: Some(parent),
            depth: self.nodes[parent.0].depth + 1,
            estimate,
            cons: None,
        });
        self.fresh.push(id);
        id
    }

    fn add_cons_node(&mut self, node: NodeId, cons: SemiassignCons) {
        let slot = &mut self.nodes[node.0].cons;
        assert!(slot.is_none(), "node {node} already carries a constraint");
        *slot = Some(cons);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_children_hang_below_current() {
        let mut tree = NodeArena::new();
        let a = tree.create_child(1.0);
        let b = tree.create_child(1.0);
        assert_eq!(tree.take_fresh(), vec![a, b]);
        assert!(tree.take_fresh().is_empty());

        tree.set_current(b);
        let c = tree.create_child(2.5);
        assert_eq!(tree.node(c).parent, Some(b));
        assert_eq!(tree.node(c).depth, 2);
        assert_eq!(tree.node(c).estimate, 2.5);
    }

    #[test]
    fn test_constraint_attach_and_discard() {
        let mut tree = NodeArena::new();
        let child = tree.create_child(0.0);
        tree.add_cons_node(child, SemiassignCons::new(1, vec![true, false], child));
        assert!(tree.node(child).cons.is_some());
        tree.discard(child);
        assert!(tree.node(child).cons.is_none());
    }
}
