//! Syntax tree for parsed SCIM filters.
//!
//! Nodes live in an arena owned by [`Filter`]. Children are referenced by
//! [`NodeId`] and every node except the root stores the id of its parent, so
//! the tree can be walked in both directions without reference cycles. The
//! parent link is written once, by the [`FilterBuilder`] call that creates the
//! parent, and never changes afterwards.
//!
//! ```text
//! userName eq "bjensen" and not (emails[type eq "work"] pr)
//!
//! Conjunction
//! ├── Comparison(eq, "bjensen")
//! │   └── AttributePath(userName)
//! └── Negation
//!     └── Comparison(pr)
//!         └── AttributePath(emails)
//!             └── Comparison(eq, "work")
//!                 └── AttributePath(type)
//! ```

use std::{
    fmt, ptr,
    sync::atomic::{AtomicU64, Ordering},
};

use serde::{Serialize, Serializer, ser::SerializeMap};

use super::error::FilterError;

/// Index of a node inside its [`Filter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Variant tag of a node, used for kind-based ancestor queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum NodeKind {
    AttributePath,
    Comparison,
    Negation,
    Conjunction,
    Disjunction,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            NodeKind::AttributePath => "AttributePath",
            NodeKind::Comparison => "Comparison",
            NodeKind::Negation => "Negation",
            NodeKind::Conjunction => "Conjunction",
            NodeKind::Disjunction => "Disjunction",
        };
        write!(f, "{}", s)
    }
}

/// Comparison operators per RFC 7644.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Operator {
    /// Equal
    Eq,
    /// Not equal
    Ne,
    /// Contains
    Co,
    /// Starts with
    Sw,
    /// Ends with
    Ew,
    /// Greater than
    Gt,
    /// Greater than or equal
    Ge,
    /// Less than
    Lt,
    /// Less than or equal
    Le,
    /// Present (has value)
    Pr,
}

impl Operator {
    pub const ALL: [Operator; 10] = [
        Operator::Eq,
        Operator::Ne,
        Operator::Co,
        Operator::Sw,
        Operator::Ew,
        Operator::Gt,
        Operator::Ge,
        Operator::Lt,
        Operator::Le,
        Operator::Pr,
    ];

    /// Case-insensitive lookup of an operator keyword.
    pub fn from_keyword(s: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|op| op.as_str().eq_ignore_ascii_case(s))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::Eq => "eq",
            Operator::Ne => "ne",
            Operator::Co => "co",
            Operator::Sw => "sw",
            Operator::Ew => "ew",
            Operator::Gt => "gt",
            Operator::Ge => "ge",
            Operator::Lt => "lt",
            Operator::Le => "le",
            Operator::Pr => "pr",
        }
    }

    /// Whether the operator is followed by a literal. Only `pr` is not.
    pub fn takes_value(&self) -> bool {
        *self != Operator::Pr
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Right-hand literal of a comparison.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    String(String),
    Number(f64),
    Boolean(bool),
    Null,
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(s) => {
                let quoted = serde_json::to_string(s).map_err(|_| fmt::Error)?;
                write!(f, "{}", quoted)
            }
            Value::Number(n) => write!(f, "{}", n),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Null => write!(f, "null"),
        }
    }
}

/// An attribute reference such as `name.familyName`, optionally qualified by
/// a schema URI and narrowed by a value filter (`emails[type eq "work"]`).
#[derive(Debug, Clone, PartialEq)]
pub struct AttributePath {
    schema: Option<String>,
    segments: Vec<String>,
    sub_attribute: Option<String>,
    filter: Option<NodeId>,
}

impl AttributePath {
    /// Path made of dotted segments.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError::EmptyAttributePath`] if `segments` is empty or
    /// contains an empty name.
    pub fn new<I, S>(segments: I) -> Result<Self, FilterError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let segments: Vec<String> = segments.into_iter().map(Into::into).collect();
        if segments.is_empty() || segments.iter().any(String::is_empty) {
            return Err(FilterError::EmptyAttributePath);
        }
        Ok(Self {
            schema: None,
            segments,
            sub_attribute: None,
            filter: None,
        })
    }

    /// Qualify the path with a schema URI (without the trailing `:`).
    pub fn with_schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    /// Sub-attribute written after a value filter, as in `emails[...].value`.
    pub fn with_sub_attribute(mut self, sub_attribute: impl Into<String>) -> Self {
        self.sub_attribute = Some(sub_attribute.into());
        self
    }

    pub fn schema(&self) -> Option<&str> {
        self.schema.as_deref()
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn sub_attribute(&self) -> Option<&str> {
        self.sub_attribute.as_deref()
    }

    /// Value filter applied to a multi-valued attribute.
    pub fn filter(&self) -> Option<NodeId> {
        self.filter
    }
}

/// `path operator value`, or `path pr`.
#[derive(Debug, Clone, PartialEq)]
pub struct Comparison {
    path: NodeId,
    operator: Operator,
    value: Option<Value>,
}

impl Comparison {
    /// The left operand, always an [`AttributePath`] node.
    pub fn path(&self) -> NodeId {
        self.path
    }

    pub fn operator(&self) -> Operator {
        self.operator
    }

    /// `None` exactly when the operator is `pr`.
    pub fn value(&self) -> Option<&Value> {
        self.value.as_ref()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Negation {
    child: NodeId,
}

impl Negation {
    pub fn child(&self) -> NodeId {
        self.child
    }
}

/// Operands combined with `and`.
#[derive(Debug, Clone, PartialEq)]
pub struct Conjunction {
    children: Vec<NodeId>,
}

impl Conjunction {
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
}

/// Operands combined with `or`.
#[derive(Debug, Clone, PartialEq)]
pub struct Disjunction {
    children: Vec<NodeId>,
}

impl Disjunction {
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
}

/// A node of the filter tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    AttributePath(AttributePath),
    Comparison(Comparison),
    Negation(Negation),
    Conjunction(Conjunction),
    Disjunction(Disjunction),
}

impl Node {
    pub fn kind(&self) -> NodeKind {
        match self {
            Node::AttributePath(_) => NodeKind::AttributePath,
            Node::Comparison(_) => NodeKind::Comparison,
            Node::Negation(_) => NodeKind::Negation,
            Node::Conjunction(_) => NodeKind::Conjunction,
            Node::Disjunction(_) => NodeKind::Disjunction,
        }
    }

    fn child_ids(&self) -> Vec<NodeId> {
        match self {
            Node::AttributePath(path) => path.filter.into_iter().collect(),
            Node::Comparison(comparison) => vec![comparison.path],
            Node::Negation(negation) => vec![negation.child],
            Node::Conjunction(conjunction) => conjunction.children.clone(),
            Node::Disjunction(disjunction) => disjunction.children.clone(),
        }
    }
}

#[derive(Debug, Clone)]
struct Slot {
    node: Node,
    parent: Option<NodeId>,
}

/// An immutable, parsed filter tree.
#[derive(Debug, Clone)]
pub struct Filter {
    slots: Vec<Slot>,
    root: NodeId,
}

impl Filter {
    pub fn root(&self) -> NodeRef<'_> {
        NodeRef {
            filter: self,
            id: self.root,
        }
    }

    pub fn get(&self, id: NodeId) -> Option<NodeRef<'_>> {
        self.slots
            .get(id.0)
            .map(|_| NodeRef { filter: self, id })
    }

    /// Number of nodes in the arena.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// All nodes reachable from the root, parents before children.
    pub fn descendants(&self) -> Vec<NodeRef<'_>> {
        let mut out = Vec::with_capacity(self.slots.len());
        let mut stack = vec![self.root()];
        while let Some(node) = stack.pop() {
            let mut children = node.children();
            children.reverse();
            stack.extend(children);
            out.push(node);
        }
        out
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.root())
    }
}

impl Serialize for Filter {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.root().serialize(serializer)
    }
}

/// What [`NodeRef::has_parent_matching`] looks for among the ancestors.
#[derive(Debug, Clone, Copy)]
pub enum ParentQuery<'a> {
    /// Any parent at all.
    Any,
    /// A parent of the given variant.
    Kind(NodeKind),
    /// This exact node (identity, not structural equality).
    Node(NodeRef<'a>),
}

impl From<NodeKind> for ParentQuery<'_> {
    fn from(kind: NodeKind) -> Self {
        ParentQuery::Kind(kind)
    }
}

impl<'a> From<NodeRef<'a>> for ParentQuery<'a> {
    fn from(node: NodeRef<'a>) -> Self {
        ParentQuery::Node(node)
    }
}

/// Borrowed handle to a node inside a [`Filter`].
///
/// Two handles are equal only if they point at the same slot of the same
/// filter.
#[derive(Clone, Copy)]
pub struct NodeRef<'a> {
    filter: &'a Filter,
    id: NodeId,
}

impl<'a> NodeRef<'a> {
    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn node(&self) -> &'a Node {
        &self.filter.slots[self.id.0].node
    }

    pub fn kind(&self) -> NodeKind {
        self.node().kind()
    }

    pub fn parent(&self) -> Option<NodeRef<'a>> {
        self.filter.slots[self.id.0]
            .parent
            .map(|id| NodeRef { filter: self.filter, id })
    }

    /// Parent, grandparent and so on up to the root.
    pub fn ancestors(&self) -> Ancestors<'a> {
        Ancestors {
            next: self.parent(),
        }
    }

    pub fn children(&self) -> Vec<NodeRef<'a>> {
        self.node()
            .child_ids()
            .into_iter()
            .map(|id| NodeRef { filter: self.filter, id })
            .collect()
    }

    pub fn child(&self, index: usize) -> Option<NodeRef<'a>> {
        self.children().get(index).copied()
    }

    pub fn is_root(&self) -> bool {
        self.filter.slots[self.id.0].parent.is_none()
    }

    /// Whether this node has a parent. Always false for the root.
    pub fn has_parent(&self) -> bool {
        self.has_parent_matching(ParentQuery::Any, false)
    }

    /// Whether the direct parent matches `query`, or any ancestor when
    /// `recursive` is set.
    pub fn has_parent_matching<'q>(
        &self,
        query: impl Into<ParentQuery<'q>>,
        recursive: bool,
    ) -> bool {
        let depth = if recursive { usize::MAX } else { 1 };
        let mut ancestors = self.ancestors().take(depth);

        match query.into() {
            ParentQuery::Any => ancestors.next().is_some(),
            ParentQuery::Kind(kind) => ancestors.any(|a| a.kind() == kind),
            ParentQuery::Node(node) => ancestors.any(|a| a.is_same(&node)),
        }
    }

    /// Identity comparison: same filter, same node.
    pub fn is_same(&self, other: &NodeRef<'_>) -> bool {
        ptr::eq(self.filter, other.filter) && self.id == other.id
    }

    pub fn as_attribute_path(&self) -> Option<&'a AttributePath> {
        match self.node() {
            Node::AttributePath(path) => Some(path),
            _ => None,
        }
    }

    pub fn as_comparison(&self) -> Option<&'a Comparison> {
        match self.node() {
            Node::Comparison(comparison) => Some(comparison),
            _ => None,
        }
    }

    pub fn as_negation(&self) -> Option<&'a Negation> {
        match self.node() {
            Node::Negation(negation) => Some(negation),
            _ => None,
        }
    }

    pub fn as_conjunction(&self) -> Option<&'a Conjunction> {
        match self.node() {
            Node::Conjunction(conjunction) => Some(conjunction),
            _ => None,
        }
    }

    pub fn as_disjunction(&self) -> Option<&'a Disjunction> {
        match self.node() {
            Node::Disjunction(disjunction) => Some(disjunction),
            _ => None,
        }
    }

    /// Left operand of a comparison node.
    pub fn path(&self) -> Option<NodeRef<'a>> {
        self.as_comparison()
            .map(|c| NodeRef { filter: self.filter, id: c.path })
    }

    /// Value filter of an attribute path node.
    pub fn value_filter(&self) -> Option<NodeRef<'a>> {
        self.as_attribute_path()
            .and_then(|p| p.filter)
            .map(|id| NodeRef { filter: self.filter, id })
    }

    fn precedence(&self) -> u8 {
        match self.kind() {
            NodeKind::Disjunction => 1,
            NodeKind::Conjunction => 2,
            _ => 3,
        }
    }

    fn fmt_operand(&self, f: &mut fmt::Formatter<'_>, parent_precedence: u8) -> fmt::Result {
        // Same-level operands are parenthesized so the grouping survives a reparse.
        if self.precedence() <= parent_precedence {
            write!(f, "({})", self)
        } else {
            write!(f, "{}", self)
        }
    }
}

impl PartialEq for NodeRef<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.is_same(other)
    }
}

impl Eq for NodeRef<'_> {}

impl fmt::Debug for NodeRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeRef")
            .field("id", &self.id)
            .field("kind", &self.kind())
            .field("parent", &self.filter.slots[self.id.0].parent)
            .finish()
    }
}

impl fmt::Display for NodeRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.node() {
            Node::AttributePath(path) => {
                if let Some(schema) = &path.schema {
                    write!(f, "{}:", schema)?;
                }
                write!(f, "{}", path.segments.join("."))?;
                if let Some(filter) = self.value_filter() {
                    write!(f, "[{}]", filter)?;
                }
                if let Some(sub) = &path.sub_attribute {
                    write!(f, ".{}", sub)?;
                }
                Ok(())
            }
            Node::Comparison(comparison) => {
                if let Some(path) = self.path() {
                    write!(f, "{}", path)?;
                }
                write!(f, " {}", comparison.operator)?;
                if let Some(value) = &comparison.value {
                    write!(f, " {}", value)?;
                }
                Ok(())
            }
            Node::Negation(_) => {
                let child = self.children();
                match child.first() {
                    Some(child) => write!(f, "not ({})", child),
                    None => Ok(()),
                }
            }
            Node::Conjunction(_) | Node::Disjunction(_) => {
                let separator = if self.kind() == NodeKind::Conjunction {
                    " and "
                } else {
                    " or "
                };
                for (i, child) in self.children().iter().enumerate() {
                    if i > 0 {
                        write!(f, "{}", separator)?;
                    }
                    child.fmt_operand(f, self.precedence())?;
                }
                Ok(())
            }
        }
    }
}

impl Serialize for NodeRef<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("type", &self.kind())?;

        match self.node() {
            Node::AttributePath(path) => {
                map.serialize_entry("schema", &path.schema)?;
                map.serialize_entry("segments", &path.segments)?;
                if let Some(sub) = &path.sub_attribute {
                    map.serialize_entry("subAttribute", sub)?;
                }
                if let Some(filter) = self.value_filter() {
                    map.serialize_entry("filter", &filter)?;
                }
            }
            Node::Comparison(comparison) => {
                if let Some(path) = self.path() {
                    map.serialize_entry("path", &path)?;
                }
                map.serialize_entry("operator", &comparison.operator)?;
                if let Some(value) = &comparison.value {
                    map.serialize_entry("value", value)?;
                }
            }
            Node::Negation(_) => {
                if let Some(child) = self.child(0) {
                    map.serialize_entry("child", &child)?;
                }
            }
            Node::Conjunction(_) | Node::Disjunction(_) => {
                map.serialize_entry("children", &self.children())?;
            }
        }

        map.end()
    }
}

/// Iterator over the ancestors of a node, nearest first.
pub struct Ancestors<'a> {
    next: Option<NodeRef<'a>>,
}

impl<'a> Iterator for Ancestors<'a> {
    type Item = NodeRef<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next.take()?;
        self.next = current.parent();
        Some(current)
    }
}

/// Source of [`FilterBuilder`] ids, so handles can be traced to their builder.
static NEXT_BUILDER_ID: AtomicU64 = AtomicU64::new(0);

/// A node that has been built but not yet attached to a parent.
///
/// Handles are not `Clone` and remember the builder that created them.
/// Attaching a node consumes its handle, so a node gets at most one parent,
/// and only within its own tree.
#[derive(Debug)]
pub struct Detached {
    builder: u64,
    id: NodeId,
}

/// A detached [`AttributePath`] node, the only thing a comparison accepts as
/// its left operand.
#[derive(Debug)]
pub struct DetachedPath {
    builder: u64,
    id: NodeId,
}

impl From<DetachedPath> for Detached {
    fn from(path: DetachedPath) -> Self {
        Detached {
            builder: path.builder,
            id: path.id,
        }
    }
}

/// Bottom-up constructor for [`Filter`] trees.
///
/// Each composite constructor takes ownership of its already built children
/// and records itself as their parent. Handles from another builder are
/// rejected with [`FilterError::ForeignNode`].
#[derive(Debug)]
pub struct FilterBuilder {
    id: u64,
    slots: Vec<Slot>,
}

impl Default for FilterBuilder {
    fn default() -> Self {
        Self {
            id: NEXT_BUILDER_ID.fetch_add(1, Ordering::Relaxed),
            slots: Vec::new(),
        }
    }
}

impl FilterBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of nodes created so far.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// # Errors
    ///
    /// Returns [`FilterError::ForeignNode`] if `filter` came from another
    /// builder.
    pub fn attribute_path(
        &mut self,
        mut path: AttributePath,
        filter: Option<Detached>,
    ) -> Result<DetachedPath, FilterError> {
        let child = filter.map(|f| self.claim(f.builder, f.id)).transpose()?;
        path.filter = child;

        let id = self.push(Node::AttributePath(path));
        if let Some(child) = child {
            self.adopt(id, child);
        }
        Ok(DetachedPath {
            builder: self.id,
            id,
        })
    }

    /// # Errors
    ///
    /// Returns [`FilterError::OperatorArity`] if `value` is given for `pr` or
    /// missing for any other operator, and [`FilterError::ForeignNode`] if
    /// `path` came from another builder.
    pub fn comparison(
        &mut self,
        path: DetachedPath,
        operator: Operator,
        value: Option<Value>,
    ) -> Result<Detached, FilterError> {
        let path = self.claim(path.builder, path.id)?;
        if operator.takes_value() != value.is_some() {
            return Err(FilterError::OperatorArity { operator });
        }

        let id = self.push(Node::Comparison(Comparison {
            path,
            operator,
            value,
        }));
        self.adopt(id, path);
        Ok(self.detached(id))
    }

    /// # Errors
    ///
    /// Returns [`FilterError::ForeignNode`] if `child` came from another
    /// builder.
    pub fn negation(&mut self, child: Detached) -> Result<Detached, FilterError> {
        let child = self.claim(child.builder, child.id)?;
        let id = self.push(Node::Negation(Negation { child }));
        self.adopt(id, child);
        Ok(self.detached(id))
    }

    /// `None` when `children` is empty.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError::ForeignNode`] if any child came from another
    /// builder.
    pub fn conjunction(&mut self, children: Vec<Detached>) -> Result<Option<Detached>, FilterError> {
        let Some(children) = self.claim_all(children)? else {
            return Ok(None);
        };
        let id = self.push(Node::Conjunction(Conjunction {
            children: children.clone(),
        }));
        self.adopt_all(id, &children);
        Ok(Some(self.detached(id)))
    }

    /// `None` when `children` is empty.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError::ForeignNode`] if any child came from another
    /// builder.
    pub fn disjunction(&mut self, children: Vec<Detached>) -> Result<Option<Detached>, FilterError> {
        let Some(children) = self.claim_all(children)? else {
            return Ok(None);
        };
        let id = self.push(Node::Disjunction(Disjunction {
            children: children.clone(),
        }));
        self.adopt_all(id, &children);
        Ok(Some(self.detached(id)))
    }

    /// Freeze the tree with `root` as its root node.
    ///
    /// Nodes whose handles were dropped without being attached stay in the
    /// arena but are unreachable from the root.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError::ForeignNode`] if `root` came from another
    /// builder.
    pub fn finish(self, root: impl Into<Detached>) -> Result<Filter, FilterError> {
        let root = root.into();
        let root = self.claim(root.builder, root.id)?;
        Ok(Filter {
            slots: self.slots,
            root,
        })
    }

    /// Check that a handle was issued by this builder.
    fn claim(&self, builder: u64, id: NodeId) -> Result<NodeId, FilterError> {
        if builder != self.id || id.0 >= self.slots.len() {
            return Err(FilterError::ForeignNode);
        }
        Ok(id)
    }

    fn claim_all(&self, children: Vec<Detached>) -> Result<Option<Vec<NodeId>>, FilterError> {
        if children.is_empty() {
            return Ok(None);
        }
        children
            .into_iter()
            .map(|c| self.claim(c.builder, c.id))
            .collect::<Result<Vec<_>, _>>()
            .map(Some)
    }

    fn detached(&self, id: NodeId) -> Detached {
        Detached {
            builder: self.id,
            id,
        }
    }

    fn push(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.slots.len());
        self.slots.push(Slot { node, parent: None });
        id
    }

    fn adopt(&mut self, parent: NodeId, child: NodeId) {
        let slot = &mut self.slots[child.0];
        debug_assert!(slot.parent.is_none(), "node {:?} already has a parent", child);
        slot.parent = Some(parent);
    }

    fn adopt_all(&mut self, parent: NodeId, children: &[NodeId]) {
        for &child in children {
            self.adopt(parent, child);
        }
    }
}
