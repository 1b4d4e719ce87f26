//! Canonical tree model for function bodies.
//!
//! Every language front-end reduces a function to this neutral representation:
//! a flat arena of [`Node`]s addressed by [`NodeId`], with children stored as
//! index lists. Statement/expression structure is captured by a closed
//! [`NodeKind`] enum plus two child collections per node: ordered positional
//! children (syntactic "arguments") and named role groups, where [`Role::Block`]
//! marks a nested statement block. Weights, depths, scopes and hashes are not
//! stored on nodes; the passes in [`crate::core`] produce them as separate
//! annotation tables keyed by arena index.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Index of a node within its owning [`FunctionUnit`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    /// Position in the arena's backing vector.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "n{}", self.0)
    }
}

/// Construct category of a node. Closed on purpose: rendering and child
/// bucketing match exhaustively over it, so an unhandled kind is a compile
/// error rather than a silent gap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// Bare identifier reference
    Ident,
    /// Named constant literal (`True`, `False`, `None`)
    Const,
    /// Numeric literal
    Num,
    /// String literal
    Str,
    /// Attribute access (`owner.name`)
    Attribute,
    /// Assignment statement
    Assign,
    /// Augmented assignment (`+=`, `-=`, ...)
    AugAssign,
    /// Binary operation; the operator tag lives in `identifier`
    BinaryOp,
    /// Unary operation; the operator tag lives in `identifier`
    UnaryOp,
    /// Comparison; chained operator tags live in `identifier`
    Compare,
    /// `if` statement head
    If,
    /// `elif` arm
    Elif,
    /// `else` arm
    Else,
    /// `for` loop
    For,
    /// `while` loop
    While,
    /// `with` block
    With,
    /// Tuple literal
    Tuple,
    /// List literal
    List,
    /// `return` statement
    Return,
    /// `raise` statement
    Raise,
    /// Lambda expression
    Lambda,
    /// Call expression
    Call,
    /// Any construct without a dedicated representation; the original
    /// spelling of the construct is kept in `identifier`
    Other,
}

impl NodeKind {
    /// Fixed textual label used by the rendering templates for statement
    /// heads (`If x:`, `While y:`, ...).
    pub fn label(self) -> &'static str {
        match self {
            NodeKind::Ident => "Name",
            NodeKind::Const => "NameConstant",
            NodeKind::Num => "Num",
            NodeKind::Str => "Str",
            NodeKind::Attribute => "Attribute",
            NodeKind::Assign => "Assign",
            NodeKind::AugAssign => "AugAssign",
            NodeKind::BinaryOp => "BinOp",
            NodeKind::UnaryOp => "UnaryOp",
            NodeKind::Compare => "Compare",
            NodeKind::If => "If",
            NodeKind::Elif => "Elif",
            NodeKind::Else => "Else",
            NodeKind::For => "For",
            NodeKind::While => "While",
            NodeKind::With => "With",
            NodeKind::Tuple => "Tuple",
            NodeKind::List => "List",
            NodeKind::Return => "Return",
            NodeKind::Raise => "Raise",
            NodeKind::Lambda => "Lambda",
            NodeKind::Call => "Call",
            NodeKind::Other => "Other",
        }
    }

    /// True for the two reference kinds whose spelling resolves through the
    /// variable machinery (scope collection, index/usage substitution).
    pub fn is_variable_reference(self) -> bool {
        matches!(self, NodeKind::Ident | NodeKind::Const)
    }
}

/// Semantic role of a named child group. The set is closed, so a node
/// claiming a role the renderer does not know is unrepresentable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    /// Nested statement block: the bodies of `if`/`elif`/`else`/`for`/
    /// `while`/`with`/`lambda`. The clone finder's recursion descends into
    /// exactly this role.
    Block,
    /// Single operand/value (assignment value, unary operand, return value)
    Value,
    /// Left operand of a binary operation or comparison
    Left,
    /// Right operand of a binary operation
    Right,
    /// Comparison right-hand operands (supports chained comparisons)
    Comparators,
    /// `elif`/`else` arms hanging off an `if`
    OrElse,
    /// List literal elements
    Items,
    /// Test expression of `if`/`elif`/`while`
    Test,
    /// Context-manager expression of `with`
    WithExpr,
    /// `as` bindings of `with`
    WithVars,
}

/// Source extent of a node, in byte offsets of the original file. Carried
/// for reporting only; no pass interprets it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct SourceSpan {
    /// Byte offset of the first character
    pub start: usize,
    /// Byte offset one past the last character
    pub end: usize,
}

impl SourceSpan {
    /// New span from byte offsets.
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Smallest span covering both inputs.
    pub fn widen(self, other: SourceSpan) -> Self {
        Self {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }
}

/// One syntax construct in the canonical tree.
#[derive(Debug, Clone)]
pub struct Node {
    /// Construct category
    pub kind: NodeKind,
    /// Own name: identifier spelling, callee name, operator tag, attribute
    /// name, literal text. Equal to the kind's label when none applies.
    pub identifier: String,
    /// Receiver of an attribute or method access, dotted chains collapsed
    pub owner: Option<String>,
    /// Positional children, in syntactic order
    pub args: Vec<NodeId>,
    /// Named child groups, in the fixed insertion order of the front-end's
    /// bucketing rules for this kind
    pub roles: Vec<(Role, Vec<NodeId>)>,
    /// Source extent for reporting
    pub span: SourceSpan,
}

impl Node {
    /// New node of a kind; the identifier defaults to the kind's label.
    pub fn new(kind: NodeKind, span: SourceSpan) -> Self {
        Self {
            kind,
            identifier: kind.label().to_string(),
            owner: None,
            args: Vec::new(),
            roles: Vec::new(),
            span,
        }
    }

    /// Set the identifier.
    pub fn with_identifier(mut self, identifier: impl Into<String>) -> Self {
        self.identifier = identifier.into();
        self
    }

    /// Set the owner qualifier.
    pub fn with_owner(mut self, owner: impl Into<String>) -> Self {
        self.owner = Some(owner.into());
        self
    }

    /// Append a positional child.
    pub fn with_arg(mut self, child: NodeId) -> Self {
        self.args.push(child);
        self
    }

    /// Append several positional children.
    pub fn with_args(mut self, children: impl IntoIterator<Item = NodeId>) -> Self {
        self.args.extend(children);
        self
    }

    /// Append a named child group. Groups render and hash in insertion
    /// order, so the front-end must bucket each kind the same way every
    /// time.
    pub fn with_role(mut self, role: Role, children: Vec<NodeId>) -> Self {
        self.roles.push((role, children));
        self
    }

    /// Children of one role, if the group is present.
    pub fn role(&self, role: Role) -> Option<&[NodeId]> {
        self.roles
            .iter()
            .find(|(r, _)| *r == role)
            .map(|(_, c)| c.as_slice())
    }

    /// First child of one role; `None` when absent or empty.
    pub fn role_head(&self, role: Role) -> Option<NodeId> {
        self.role(role).and_then(|c| c.first().copied())
    }

    /// Nested statement block, when this node owns a non-empty one.
    pub fn block(&self) -> Option<&[NodeId]> {
        self.role(Role::Block).filter(|c| !c.is_empty())
    }

    /// True when no child collection holds anything.
    pub fn is_leaf(&self) -> bool {
        self.args.is_empty() && self.roles.iter().all(|(_, c)| c.is_empty())
    }

    /// All children in canonical traversal order: named groups first (in
    /// insertion order), then positional children. Every pass that walks
    /// the tree iterates in exactly this order.
    pub fn children_in_order(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.roles
            .iter()
            .flat_map(|(_, c)| c.iter().copied())
            .chain(self.args.iter().copied())
    }
}

/// One parsed function or method, reduced to the canonical tree. Methods
/// collapse into the same shape as free functions; the enclosing class is
/// discarded. Immutable after canonicalization; the analysis passes return
/// annotation tables instead of mutating nodes.
#[derive(Debug, Clone)]
pub struct FunctionUnit {
    /// Function name as declared
    pub name: String,
    /// File the function came from
    pub file: String,
    /// Declared parameter names mapped to their 0-based ordinals, in
    /// declaration order
    pub params: IndexMap<String, usize>,
    /// Source extent of the whole definition
    pub span: SourceSpan,
    nodes: Vec<Node>,
    body: Vec<NodeId>,
}

impl FunctionUnit {
    /// New empty unit.
    pub fn new(name: impl Into<String>, file: impl Into<String>, span: SourceSpan) -> Self {
        Self {
            name: name.into(),
            file: file.into(),
            params: IndexMap::new(),
            span,
            nodes: Vec::new(),
            body: Vec::new(),
        }
    }

    /// Record a declared parameter; ordinals follow declaration order.
    pub fn add_param(&mut self, name: impl Into<String>) {
        let ordinal = self.params.len();
        self.params.insert(name.into(), ordinal);
    }

    /// Move a node into the arena, returning its id.
    pub fn add_node(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    /// Mark a node as a top-level statement of the function body.
    pub fn push_statement(&mut self, id: NodeId) {
        self.body.push(id);
    }

    /// Borrow a node.
    #[inline]
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    /// Mutably borrow a node. Only the canonicalizer uses this; every
    /// later pass reads the tree through annotation tables.
    #[inline]
    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.index()]
    }

    /// Top-level statements in source order.
    pub fn body(&self) -> &[NodeId] {
        &self.body
    }

    /// Number of nodes in the arena.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Iterate all node ids in arena order.
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> {
        (0..self.nodes.len() as u32).map(NodeId)
    }

    /// Qualified display name, `file::function`.
    pub fn qualified_name(&self) -> String {
        format!("{}::{}", self.file, self.name)
    }
}
