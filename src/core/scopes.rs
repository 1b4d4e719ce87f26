//! Variable scope collection.
//!
//! Walks each function bottom-up and records, per node, the set of variable
//! names referenced anywhere in that node's subtree, in order of first
//! appearance and deduplicated by name (parent scopes absorb child scopes,
//! keeping the first-seen entry). The position of a name in its node's set
//! is the variable's block-local index, which the positional-index hash
//! substitutes for the spelling. Runs after canonicalization, so parameter
//! placeholders and the receiver participate like any other variable.

use std::collections::HashMap;

use crate::core::tree::{FunctionUnit, Node, NodeId};

/// Name under which a reference node resolves in scope sets: the owner
/// qualifier joined to the identifier when present, the identifier alone
/// otherwise.
pub fn reference_name(node: &Node) -> String {
    match &node.owner {
        Some(owner) => format!("{owner}.{}", node.identifier),
        None => node.identifier.clone(),
    }
}

/// Ordered, name-deduplicated variable set of one node's subtree.
#[derive(Debug, Clone, Default)]
pub struct ScopeSet {
    names: Vec<String>,
    index_by_name: HashMap<String, usize>,
}

impl ScopeSet {
    /// Add a name unless the set already holds it.
    fn add(&mut self, name: &str) {
        if !self.index_by_name.contains_key(name) {
            self.index_by_name
                .insert(name.to_string(), self.names.len());
            self.names.push(name.to_string());
        }
    }

    /// Absorb another set, keeping first-seen entries.
    fn absorb(&mut self, other: &ScopeSet) {
        for name in &other.names {
            self.add(name);
        }
    }

    /// Block-local index of a variable, if referenced in this subtree.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.index_by_name.get(name).copied()
    }

    /// Variable names in first-appearance order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Number of distinct variables in this subtree.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// True when the subtree references no variables.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Scope sets for every node of one function, keyed by arena index.
#[derive(Debug, Clone)]
pub struct ScopeTable {
    per_node: Vec<ScopeSet>,
}

impl ScopeTable {
    /// Scope set of one node.
    #[inline]
    pub fn scope(&self, id: NodeId) -> &ScopeSet {
        &self.per_node[id.index()]
    }
}

fn collect(unit: &FunctionUnit, id: NodeId, table: &mut Vec<ScopeSet>) -> ScopeSet {
    let node = unit.node(id);
    let mut set = ScopeSet::default();
    if node.kind.is_variable_reference() {
        set.add(&reference_name(node));
    }
    let children: Vec<NodeId> = node.children_in_order().collect();
    for child in children {
        let child_set = collect(unit, child, table);
        set.absorb(&child_set);
        table[child.index()] = child_set;
    }
    set
}

/// Collect per-node scope sets for a whole function.
pub fn collect_scopes(unit: &FunctionUnit) -> ScopeTable {
    let mut table = vec![ScopeSet::default(); unit.node_count()];
    for &root in unit.body() {
        let set = collect(unit, root, &mut table);
        table[root.index()] = set;
    }
    ScopeTable { per_node: table }
}
