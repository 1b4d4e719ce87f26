//! Structural weight and depth annotations.
//!
//! An explicit pass over the arena producing a [`TreeMetrics`] table: per
//! node, an integer complexity weight and the subtree depth. The clone
//! finder consumes weights for filtering/scoring and depths for its
//! recursion gate; the hashing engine stamps depths onto statement
//! renderings.

use crate::core::tree::{FunctionUnit, NodeId, NodeKind};

/// Base weight of any construct without a cheaper entry in the table.
pub const DEFAULT_NODE_WEIGHT: u64 = 10;

/// Base weight of one construct kind, before children are added.
fn base_weight(kind: NodeKind) -> u64 {
    match kind {
        NodeKind::Attribute
        | NodeKind::Ident
        | NodeKind::Const
        | NodeKind::Num
        | NodeKind::Str => 1,
        NodeKind::Tuple => 5,
        NodeKind::Assign
        | NodeKind::AugAssign
        | NodeKind::BinaryOp
        | NodeKind::UnaryOp
        | NodeKind::Compare
        | NodeKind::If
        | NodeKind::Elif
        | NodeKind::Else
        | NodeKind::For
        | NodeKind::While
        | NodeKind::With
        | NodeKind::List
        | NodeKind::Return
        | NodeKind::Raise
        | NodeKind::Lambda
        | NodeKind::Call
        | NodeKind::Other => DEFAULT_NODE_WEIGHT,
    }
}

/// Weight and depth of one node's subtree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeMetrics {
    /// Structural complexity score of the subtree
    pub weight: u64,
    /// Longest path to a leaf; 1 for a leaf
    pub depth: u32,
}

/// Metrics for every node of one function, keyed by arena index.
#[derive(Debug, Clone)]
pub struct TreeMetrics {
    per_node: Vec<NodeMetrics>,
}

impl TreeMetrics {
    /// Metrics of one node.
    #[inline]
    pub fn get(&self, id: NodeId) -> NodeMetrics {
        self.per_node[id.index()]
    }

    /// Weight of one node's subtree.
    #[inline]
    pub fn weight(&self, id: NodeId) -> u64 {
        self.per_node[id.index()].weight
    }

    /// Depth of one node's subtree.
    #[inline]
    pub fn depth(&self, id: NodeId) -> u32 {
        self.per_node[id.index()].depth
    }
}

fn measure(unit: &FunctionUnit, id: NodeId, table: &mut Vec<NodeMetrics>) -> NodeMetrics {
    let node = unit.node(id);
    let mut weight = base_weight(node.kind);
    let mut max_child_depth = 0;

    for &(_, ref children) in &node.roles {
        for &child in children {
            let m = measure(unit, child, table);
            weight += m.weight;
            max_child_depth = max_child_depth.max(m.depth);
        }
    }
    // Positional children over the default weight contribute the excess
    // only, so deeply nested argument expressions do not out-credit
    // nested statement blocks.
    for &child in &node.args {
        let m = measure(unit, child, table);
        let adjusted = if m.weight > DEFAULT_NODE_WEIGHT {
            m.weight - DEFAULT_NODE_WEIGHT
        } else {
            m.weight
        };
        weight += adjusted;
        max_child_depth = max_child_depth.max(m.depth);
    }

    let metrics = NodeMetrics {
        weight,
        depth: 1 + max_child_depth,
    };
    table[id.index()] = metrics;
    metrics
}

/// Compute weight and depth for every node of a function.
pub fn weigh_tree(unit: &FunctionUnit) -> TreeMetrics {
    let mut per_node = vec![
        NodeMetrics {
            weight: 0,
            depth: 0
        };
        unit.node_count()
    ];
    for &root in unit.body() {
        measure(unit, root, &mut per_node);
    }
    TreeMetrics { per_node }
}
