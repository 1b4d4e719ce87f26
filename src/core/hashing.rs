//! Structural hashing engine.
//!
//! Computes three content hashes per node, in a fixed order because each
//! pass feeds the next:
//!
//! 1. **Literal**: bottom-up digest of each node's canonical rendering with
//!    identifiers as written (post-canonicalization), concatenated with its
//!    children's hashes.
//! 2. **Index**: same procedure, but identifier/named-constant references
//!    render as their block-local index within the scope of the node being
//!    hashed. Invariant to spelling, sensitive to first-use order.
//! 3. **Usage**: per variable, contributions `digest(index_hash ++
//!    local_index)` from every node whose subtree references it are folded
//!    pairwise in post-order; the resulting variable hashes feed a final
//!    content pass that renders references via their usage hash. The clone
//!    finder compares this hash, because it matches code that is identical
//!    modulo renaming anywhere.
//!
//! The rendering templates here are the single source of truth shared by
//! all three passes and the human-readable dump, so hash equality and
//! readable-diff equality never diverge.

use std::collections::HashMap;

use sha2::{Digest, Sha256};

use crate::core::errors::{DraupnirError, Result};
use crate::core::metrics::TreeMetrics;
use crate::core::scopes::{reference_name, ScopeTable};
use crate::core::tree::{FunctionUnit, Node, NodeId, NodeKind, Role};

/// How identifier and named-constant references render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashMode {
    /// Spelling as written (after parameter canonicalization)
    Literal,
    /// Block-local index within the hashed node's scope
    Index,
    /// The variable's aggregated usage hash
    Usage,
}

/// SHA-256 content digest, lowercase hex.
pub fn content_digest(text: &str) -> String {
    format!("{:x}", Sha256::digest(text.as_bytes()))
}

/// Symbol for a binary (or augmented-assignment) operator tag. `Pow` keeps
/// the historical `^` spelling, so `BitXor` gets `^^` to stay distinct.
fn binary_symbol(tag: &str) -> Option<&'static str> {
    Some(match tag {
        "Add" => "+",
        "Sub" => "-",
        "Mult" => "*",
        "Div" => "/",
        "FloorDiv" => "//",
        "Mod" => "%",
        "Pow" => "^",
        "MatMult" => "@",
        "BitOr" => "|",
        "BitAnd" => "&",
        "BitXor" => "^^",
        "LShift" => "<<",
        "RShift" => ">>",
        "And" => " and ",
        "Or" => " or ",
        _ => return None,
    })
}

/// Symbol for a unary operator tag.
fn unary_symbol(tag: &str) -> Option<&'static str> {
    Some(match tag {
        "USub" => "-",
        "UAdd" => "+",
        "Not" => "not ",
        "Invert" => "~",
        _ => return None,
    })
}

/// Symbol for a comparison operator tag.
fn compare_symbol(tag: &str) -> Option<&'static str> {
    Some(match tag {
        "Lt" => "<",
        "Gt" => ">",
        "LtE" => "<=",
        "GtE" => ">=",
        "Eq" => "==",
        "NotEq" => "!==",
        "In" => "in",
        "NotIn" => "not in",
        "Is" => "is",
        "IsNot" => "is not",
        _ => return None,
    })
}

/// All three hashes of every node in one function, plus the function-level
/// usage hash of every variable.
#[derive(Debug, Clone)]
pub struct TreeHashes {
    literal: Vec<String>,
    index: Vec<String>,
    usage: Vec<String>,
    variable_hashes: HashMap<String, String>,
}

impl TreeHashes {
    /// Hash of one node under one mode.
    pub fn get(&self, id: NodeId, mode: HashMode) -> &str {
        match mode {
            HashMode::Literal => &self.literal[id.index()],
            HashMode::Index => &self.index[id.index()],
            HashMode::Usage => &self.usage[id.index()],
        }
    }

    /// Literal-identifier hash of one node.
    #[inline]
    pub fn literal(&self, id: NodeId) -> &str {
        &self.literal[id.index()]
    }

    /// Positional-index hash of one node.
    #[inline]
    pub fn index(&self, id: NodeId) -> &str {
        &self.index[id.index()]
    }

    /// Usage hash of one node; the clone finder's equality predicate.
    #[inline]
    pub fn usage(&self, id: NodeId) -> &str {
        &self.usage[id.index()]
    }

    /// Aggregated usage hash of one variable, if the function references it.
    pub fn variable_usage(&self, name: &str) -> Option<&str> {
        self.variable_hashes.get(name).map(String::as_str)
    }
}

struct Renderer<'a> {
    unit: &'a FunctionUnit,
    scopes: &'a ScopeTable,
    mode: HashMode,
    variable_hashes: Option<&'a HashMap<String, String>>,
}

impl<'a> Renderer<'a> {
    /// Resolve a variable reference for the current mode, within the scope
    /// of `scope_root` (the node whose hash is being computed). Names the
    /// scope does not know fall back to their spelling.
    fn reference(&self, scope_root: NodeId, node: &Node) -> String {
        let name = reference_name(node);
        match self.mode {
            HashMode::Literal => name,
            HashMode::Index => match self.scopes.scope(scope_root).index_of(&name) {
                Some(index) => index.to_string(),
                None => name,
            },
            HashMode::Usage => match self.variable_hashes.and_then(|m| m.get(&name)) {
                Some(hash) => hash.clone(),
                None => name,
            },
        }
    }

    fn malformed(&self, message: impl Into<String>) -> DraupnirError {
        DraupnirError::malformed_tree(&self.unit.name, message)
    }

    fn require_role(&self, node: &Node, role: Role, what: &str) -> Result<NodeId> {
        node.role_head(role)
            .ok_or_else(|| self.malformed(format!("{} missing {what}", node.kind.label())))
    }

    fn require_arg(&self, node: &Node, index: usize, what: &str) -> Result<NodeId> {
        node.args
            .get(index)
            .copied()
            .ok_or_else(|| self.malformed(format!("{} missing {what}", node.kind.label())))
    }

    fn join(&self, scope_root: NodeId, ids: &[NodeId], sep: &str) -> Result<String> {
        let mut parts = Vec::with_capacity(ids.len());
        for &id in ids {
            parts.push(self.render(scope_root, id)?);
        }
        Ok(parts.join(sep))
    }

    /// Canonical textual rendering of one node, recursively through the
    /// template table. All variable references resolve against
    /// `scope_root`'s scope, which stays fixed for the whole recursion.
    fn render(&self, scope_root: NodeId, id: NodeId) -> Result<String> {
        let node = self.unit.node(id);
        let rendered = match node.kind {
            NodeKind::Ident | NodeKind::Const => self.reference(scope_root, node),
            NodeKind::Num => node.identifier.clone(),
            NodeKind::Str => format!("#str'{}'", node.identifier),
            NodeKind::Attribute => match (&node.owner, node.args.first()) {
                (Some(owner), _) => format!("{owner}.{}", node.identifier),
                (None, Some(&object)) => {
                    format!("{}.{}", self.render(scope_root, object)?, node.identifier)
                }
                (None, None) => node.identifier.clone(),
            },
            NodeKind::Assign => {
                let target = self.require_arg(node, 0, "target")?;
                let value = self.require_role(node, Role::Value, "value")?;
                format!(
                    "{}={}",
                    self.render(scope_root, target)?,
                    self.render(scope_root, value)?
                )
            }
            NodeKind::AugAssign => {
                let target = self.require_arg(node, 0, "target")?;
                let value = self.require_role(node, Role::Value, "value")?;
                let symbol = binary_symbol(&node.identifier).ok_or_else(|| {
                    self.malformed(format!("unknown augmented operator `{}`", node.identifier))
                })?;
                format!(
                    "{}{}={}",
                    self.render(scope_root, target)?,
                    symbol,
                    self.render(scope_root, value)?
                )
            }
            NodeKind::BinaryOp => {
                let left = self.require_role(node, Role::Left, "left operand")?;
                let right = self.require_role(node, Role::Right, "right operand")?;
                let symbol = binary_symbol(&node.identifier).ok_or_else(|| {
                    self.malformed(format!("unknown binary operator `{}`", node.identifier))
                })?;
                format!(
                    "{}{}{}",
                    self.render(scope_root, left)?,
                    symbol,
                    self.render(scope_root, right)?
                )
            }
            NodeKind::UnaryOp => {
                let operand = self.require_role(node, Role::Value, "operand")?;
                let symbol = unary_symbol(&node.identifier).ok_or_else(|| {
                    self.malformed(format!("unknown unary operator `{}`", node.identifier))
                })?;
                format!("{symbol}{}", self.render(scope_root, operand)?)
            }
            NodeKind::Compare => {
                let left = self.require_role(node, Role::Left, "left operand")?;
                let comparators = node.role(Role::Comparators).unwrap_or(&[]);
                if comparators.is_empty() {
                    return Err(self.malformed("Compare missing comparators"));
                }
                let mut symbols = Vec::new();
                for tag in node.identifier.split(", ") {
                    symbols.push(compare_symbol(tag).ok_or_else(|| {
                        self.malformed(format!("unknown comparison operator `{tag}`"))
                    })?);
                }
                format!(
                    "{} {} {}",
                    self.render(scope_root, left)?,
                    symbols.join(", "),
                    self.join(scope_root, comparators, ", ")?
                )
            }
            NodeKind::If | NodeKind::Elif | NodeKind::While => {
                let test = self.require_role(node, Role::Test, "test")?;
                format!("{} {}:", node.kind.label(), self.render(scope_root, test)?)
            }
            NodeKind::Else => node.kind.label().to_string(),
            NodeKind::For => {
                let target = self.require_arg(node, 0, "target")?;
                let iterable = self.require_arg(node, 1, "iterable")?;
                format!(
                    "For {} in {}:",
                    self.render(scope_root, target)?,
                    self.render(scope_root, iterable)?
                )
            }
            NodeKind::With => {
                let exprs = node.role(Role::WithExpr).unwrap_or(&[]);
                if exprs.is_empty() {
                    return Err(self.malformed("With missing context expression"));
                }
                let vars = node.role(Role::WithVars).unwrap_or(&[]);
                let as_part = if vars.is_empty() {
                    String::new()
                } else {
                    format!(" as {}", self.join(scope_root, vars, ", ")?)
                };
                format!("With {}{}:", self.join(scope_root, exprs, ", ")?, as_part)
            }
            NodeKind::Tuple => format!("Tuple{{{}}}", self.join(scope_root, &node.args, ", ")?),
            NodeKind::List => {
                let items = node.role(Role::Items).unwrap_or(&[]);
                format!("#List[{}]", self.join(scope_root, items, ", ")?)
            }
            NodeKind::Return => {
                let value = self.require_role(node, Role::Value, "value")?;
                format!("return {}", self.render(scope_root, value)?)
            }
            NodeKind::Raise => match node.role_head(Role::Value) {
                Some(value) => format!("raise {}", self.render(scope_root, value)?),
                None => "raise ".to_string(),
            },
            NodeKind::Lambda => format!("{} => {{}}", self.join(scope_root, &node.args, ", ")?),
            NodeKind::Call => {
                let args = self.join(scope_root, &node.args, ",")?;
                match &node.owner {
                    Some(owner) => format!("{owner}.{}({args})", node.identifier),
                    None => format!("{}({args})", node.identifier),
                }
            }
            NodeKind::Other => match &node.owner {
                Some(owner) => format!("{owner}.{}", node.identifier),
                None => node.identifier.clone(),
            },
        };
        Ok(rendered)
    }
}

/// Depth marker appended to hash-root renderings and dump lines. Depth is
/// a pure function of structure, so the marker never separates
/// structurally identical subtrees.
fn depth_marker(metrics: &TreeMetrics, id: NodeId) -> String {
    let depth = metrics.depth(id);
    if depth > 1 {
        format!(" [{depth}]")
    } else {
        String::new()
    }
}

fn hash_node(
    renderer: &Renderer<'_>,
    metrics: &TreeMetrics,
    id: NodeId,
    out: &mut Vec<String>,
) -> Result<()> {
    let node = renderer.unit.node(id);
    let mut source = renderer.render(id, id)?;
    source.push_str(&depth_marker(metrics, id));
    // Children contribute their own hashes: named groups in insertion
    // order, then positional children.
    let children: Vec<NodeId> = node.children_in_order().collect();
    for child in children {
        hash_node(renderer, metrics, child, out)?;
        source.push_str(&out[child.index()]);
    }
    out[id.index()] = content_digest(&source);
    Ok(())
}

fn content_pass(
    unit: &FunctionUnit,
    scopes: &ScopeTable,
    metrics: &TreeMetrics,
    mode: HashMode,
    variable_hashes: Option<&HashMap<String, String>>,
) -> Result<Vec<String>> {
    let renderer = Renderer {
        unit,
        scopes,
        mode,
        variable_hashes,
    };
    let mut out = vec![String::new(); unit.node_count()];
    for &root in unit.body() {
        hash_node(&renderer, metrics, root, &mut out)?;
    }
    Ok(out)
}

fn fold_node(
    unit: &FunctionUnit,
    scopes: &ScopeTable,
    index_hashes: &[String],
    id: NodeId,
    acc: &mut HashMap<String, String>,
) {
    let node = unit.node(id);
    let children: Vec<NodeId> = node.children_in_order().collect();
    for child in children {
        fold_node(unit, scopes, index_hashes, child, acc);
    }
    let index_hash = &index_hashes[id.index()];
    for (local_index, name) in scopes.scope(id).names().iter().enumerate() {
        let contribution = content_digest(&format!("{index_hash}{local_index}"));
        match acc.get_mut(name) {
            Some(existing) => {
                *existing = content_digest(&format!("{existing}{contribution}"));
            }
            None => {
                acc.insert(name.clone(), contribution);
            }
        }
    }
}

/// Fold per-variable usage contributions across every node that references
/// the variable, leaves to root, in the same traversal order as the index
/// pass. The fold order is fixed, which is what makes the result
/// deterministic; the combine step itself is not associative.
fn fold_variable_usage(
    unit: &FunctionUnit,
    scopes: &ScopeTable,
    index_hashes: &[String],
) -> HashMap<String, String> {
    let mut acc = HashMap::new();
    for &root in unit.body() {
        fold_node(unit, scopes, index_hashes, root, &mut acc);
    }
    acc
}

/// Run all three hash passes over one function.
pub fn hash_tree(
    unit: &FunctionUnit,
    scopes: &ScopeTable,
    metrics: &TreeMetrics,
) -> Result<TreeHashes> {
    let literal = content_pass(unit, scopes, metrics, HashMode::Literal, None)?;
    let index = content_pass(unit, scopes, metrics, HashMode::Index, None)?;
    let variable_hashes = fold_variable_usage(unit, scopes, &index);
    let usage = content_pass(unit, scopes, metrics, HashMode::Usage, Some(&variable_hashes))?;
    Ok(TreeHashes {
        literal,
        index,
        usage,
        variable_hashes,
    })
}

fn dump_node(
    renderer: &Renderer<'_>,
    metrics: &TreeMetrics,
    id: NodeId,
    indent: usize,
    out: &mut String,
) -> Result<()> {
    let node = renderer.unit.node(id);
    let line = renderer.render(id, id)?;
    out.push_str(&"    ".repeat(indent));
    out.push_str(&line);
    out.push_str(&depth_marker(metrics, id));
    out.push('\n');
    if let Some(block) = node.block() {
        for &child in block {
            dump_node(renderer, metrics, child, indent + 1, out)?;
        }
    }
    // elif/else arms align with their if; each arm indents its own block.
    if let Some(arms) = node.role(Role::OrElse) {
        for &arm in arms {
            dump_node(renderer, metrics, arm, indent, out)?;
        }
    }
    Ok(())
}

/// Human-readable canonical rendering of a whole function, one line per
/// statement, nested blocks indented. Uses the same template table as the
/// hash passes.
pub fn dump_function(
    unit: &FunctionUnit,
    scopes: &ScopeTable,
    metrics: &TreeMetrics,
    hashes: &TreeHashes,
    mode: HashMode,
) -> Result<String> {
    let renderer = Renderer {
        unit,
        scopes,
        mode,
        variable_hashes: match mode {
            HashMode::Usage => Some(&hashes.variable_hashes),
            _ => None,
        },
    };
    let mut out = String::new();
    for &root in unit.body() {
        dump_node(&renderer, metrics, root, 0, &mut out)?;
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::canonicalize::canonicalize_parameters;
    use crate::core::metrics::weigh_tree;
    use crate::core::scopes::collect_scopes;
    use crate::core::tree::{Node, SourceSpan};

    fn span() -> SourceSpan {
        SourceSpan::default()
    }

    fn ident(unit: &mut FunctionUnit, name: &str) -> NodeId {
        unit.add_node(Node::new(NodeKind::Ident, span()).with_identifier(name))
    }

    fn num(unit: &mut FunctionUnit, text: &str) -> NodeId {
        unit.add_node(Node::new(NodeKind::Num, span()).with_identifier(text))
    }

    /// `target = value` with the value under the Value role.
    fn assign(unit: &mut FunctionUnit, target: NodeId, value: NodeId) -> NodeId {
        let id = unit.add_node(
            Node::new(NodeKind::Assign, span())
                .with_role(Role::Value, vec![value])
                .with_arg(target),
        );
        unit.push_statement(id);
        id
    }

    fn prepared(unit: &mut FunctionUnit) -> (ScopeTable, TreeMetrics, TreeHashes) {
        canonicalize_parameters(unit);
        let scopes = collect_scopes(unit);
        let metrics = weigh_tree(unit);
        let hashes = hash_tree(unit, &scopes, &metrics).unwrap();
        (scopes, metrics, hashes)
    }

    #[test]
    fn literal_render_follows_the_templates() {
        let mut unit = FunctionUnit::new("f", "a.py", span());
        let target = ident(&mut unit, "y");
        let one = num(&mut unit, "1");
        let stmt = assign(&mut unit, target, one);
        let scopes = collect_scopes(&unit);
        let renderer = Renderer {
            unit: &unit,
            scopes: &scopes,
            mode: HashMode::Literal,
            variable_hashes: None,
        };
        assert_eq!(renderer.render(stmt, stmt).unwrap(), "y=1");
    }

    #[test]
    fn index_render_substitutes_block_local_ranks() {
        // `y = x + y` renders as `1=0+1`: x appears first (value side
        // ranks before the target), y second.
        let mut unit = FunctionUnit::new("f", "a.py", span());
        let x = ident(&mut unit, "x");
        let y_rhs = ident(&mut unit, "y");
        let op = unit.add_node(
            Node::new(NodeKind::BinaryOp, span())
                .with_identifier("Add")
                .with_role(Role::Left, vec![x])
                .with_role(Role::Right, vec![y_rhs]),
        );
        let y_lhs = ident(&mut unit, "y");
        let stmt = assign(&mut unit, y_lhs, op);
        let scopes = collect_scopes(&unit);
        let renderer = Renderer {
            unit: &unit,
            scopes: &scopes,
            mode: HashMode::Index,
            variable_hashes: None,
        };
        assert_eq!(renderer.render(stmt, stmt).unwrap(), "1=0+1");
    }

    #[test]
    fn chained_comparisons_map_each_operator() {
        let mut unit = FunctionUnit::new("f", "a.py", span());
        let a = ident(&mut unit, "a");
        let b = ident(&mut unit, "b");
        let c = ident(&mut unit, "c");
        let cmp = unit.add_node(
            Node::new(NodeKind::Compare, span())
                .with_identifier("Lt, LtE")
                .with_role(Role::Left, vec![a])
                .with_role(Role::Comparators, vec![b, c]),
        );
        unit.push_statement(cmp);
        let scopes = collect_scopes(&unit);
        let renderer = Renderer {
            unit: &unit,
            scopes: &scopes,
            mode: HashMode::Literal,
            variable_hashes: None,
        };
        assert_eq!(renderer.render(cmp, cmp).unwrap(), "a <, <= b, c");
    }

    #[test]
    fn missing_operand_is_a_malformed_tree() {
        let mut unit = FunctionUnit::new("broken", "a.py", span());
        let left = ident(&mut unit, "a");
        let op = unit.add_node(
            Node::new(NodeKind::BinaryOp, span())
                .with_identifier("Add")
                .with_role(Role::Left, vec![left]),
        );
        unit.push_statement(op);
        let scopes = collect_scopes(&unit);
        let metrics = weigh_tree(&unit);
        let err = hash_tree(&unit, &scopes, &metrics).unwrap_err();
        match err {
            DraupnirError::MalformedTree { function, message } => {
                assert_eq!(function, "broken");
                assert!(message.contains("right operand"));
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn unknown_operator_tag_is_rejected() {
        let mut unit = FunctionUnit::new("f", "a.py", span());
        let left = ident(&mut unit, "a");
        let right = ident(&mut unit, "b");
        let op = unit.add_node(
            Node::new(NodeKind::BinaryOp, span())
                .with_identifier("Wobble")
                .with_role(Role::Left, vec![left])
                .with_role(Role::Right, vec![right]),
        );
        unit.push_statement(op);
        let scopes = collect_scopes(&unit);
        let metrics = weigh_tree(&unit);
        assert!(hash_tree(&unit, &scopes, &metrics).is_err());
    }

    /// Build `lhs = rhs * factor` from names; exercises params and locals.
    fn product_unit(name: &str, params: &[&str], lhs: &str, rhs: &str, factor: &str) -> FunctionUnit {
        let mut unit = FunctionUnit::new(name, "a.py", span());
        for p in params {
            unit.add_param(*p);
        }
        let left = ident(&mut unit, rhs);
        let right = ident(&mut unit, factor);
        let op = unit.add_node(
            Node::new(NodeKind::BinaryOp, span())
                .with_identifier("Mult")
                .with_role(Role::Left, vec![left])
                .with_role(Role::Right, vec![right]),
        );
        let target = ident(&mut unit, lhs);
        assign(&mut unit, target, op);
        unit
    }

    #[test]
    fn renamed_locals_share_index_and_usage_hashes_but_not_literal() {
        let mut a = product_unit("fa", &["p"], "x", "p", "x");
        let mut b = product_unit("fb", &["q"], "z", "q", "z");
        let (_, _, ha) = prepared(&mut a);
        let (_, _, hb) = prepared(&mut b);
        let sa = a.body()[0];
        let sb = b.body()[0];
        assert_eq!(ha.index(sa), hb.index(sb));
        assert_eq!(ha.usage(sa), hb.usage(sb));
        assert_ne!(ha.literal(sa), hb.literal(sb));
    }

    #[test]
    fn corresponding_variables_get_equal_usage_hashes() {
        let mut a = product_unit("fa", &["p"], "x", "p", "x");
        let mut b = product_unit("fb", &["q"], "z", "q", "z");
        let (_, _, ha) = prepared(&mut a);
        let (_, _, hb) = prepared(&mut b);
        assert_eq!(ha.variable_usage("x"), hb.variable_usage("z"));
        assert_eq!(ha.variable_usage("#p0"), hb.variable_usage("#p0"));
        assert_ne!(ha.variable_usage("x"), None);
    }

    #[test]
    fn hashing_is_deterministic_across_runs() {
        let mut a = product_unit("fa", &["p"], "x", "p", "x");
        canonicalize_parameters(&mut a);
        let scopes = collect_scopes(&a);
        let metrics = weigh_tree(&a);
        let first = hash_tree(&a, &scopes, &metrics).unwrap();
        let second = hash_tree(&a, &scopes, &metrics).unwrap();
        for id in a.node_ids() {
            assert_eq!(first.literal(id), second.literal(id));
            assert_eq!(first.index(id), second.index(id));
            assert_eq!(first.usage(id), second.usage(id));
        }
    }

    #[test]
    fn dump_indents_nested_blocks_and_marks_depth() {
        let mut unit = FunctionUnit::new("f", "a.py", span());
        let target = ident(&mut unit, "s");
        let value = num(&mut unit, "1");
        let inner = unit.add_node(
            Node::new(NodeKind::Assign, span())
                .with_role(Role::Value, vec![value])
                .with_arg(target),
        );
        let test = ident(&mut unit, "cond");
        let while_loop = unit.add_node(
            Node::new(NodeKind::While, span())
                .with_role(Role::Test, vec![test])
                .with_role(Role::Block, vec![inner]),
        );
        unit.push_statement(while_loop);
        let (scopes, metrics, hashes) = prepared(&mut unit);
        let text = dump_function(&unit, &scopes, &metrics, &hashes, HashMode::Literal).unwrap();
        assert_eq!(text, "While cond: [3]\n    s=1 [2]\n");
    }
}
