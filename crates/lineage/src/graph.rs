//! The lineage graph model.
//!
//! [`GraphModel`] owns every node and reference edge of a diagram together
//! with the containment tree (domain groups and the leaves placed in them).
//! Nodes are never removed, so a [`NodeIndex`] stays valid for the lifetime of
//! the model and index order is creation order.

use std::collections::HashMap;

use log::trace;
use petgraph::{
    Direction,
    graph::{DiGraph, EdgeIndex, NodeIndex},
    visit::EdgeRef,
};

use lineage_core::{
    geometry::{Bounds, Point, Size},
    identifier::Id,
    kind::EntityKind,
    style::StyleDescriptor,
};

use crate::error::LineageError;

/// A domain group, source system or table.
#[derive(Debug, Clone)]
pub struct Node {
    kind: EntityKind,
    key: Id,
    label: String,
    parent: Option<NodeIndex>,
    style: StyleDescriptor,
    base_size: Size,
    geometry: Bounds,
}

impl Node {
    /// Creates a root node placed at the origin with its placeholder size.
    pub fn new(
        kind: EntityKind,
        key: Id,
        label: impl Into<String>,
        style: StyleDescriptor,
        base_size: Size,
    ) -> Self {
        Self {
            kind,
            key,
            label: label.into(),
            parent: None,
            style,
            base_size,
            geometry: Bounds::new_from_top_left(Point::default(), base_size),
        }
    }

    /// Places the node inside `parent`.
    pub fn with_parent(mut self, parent: NodeIndex) -> Self {
        self.parent = Some(parent);
        self
    }

    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    /// Entity key the node was registered under.
    pub fn key(&self) -> Id {
        self.key
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn parent(&self) -> Option<NodeIndex> {
        self.parent
    }

    pub fn style(&self) -> StyleDescriptor {
        self.style
    }

    /// Placeholder size used for leaves and collapsed groups.
    pub fn base_size(&self) -> Size {
        self.base_size
    }

    /// Geometry of the last committed layout.
    pub fn geometry(&self) -> Bounds {
        self.geometry
    }

    pub fn is_group(&self) -> bool {
        self.kind.is_group()
    }
}

/// Directed reference from a source system to a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reference {
    multiplicity: u32,
}

impl Reference {
    pub fn new() -> Self {
        Self { multiplicity: 1 }
    }

    /// Number of rows folded into this edge.
    pub fn multiplicity(&self) -> u32 {
        self.multiplicity
    }

    pub(crate) fn increment(&mut self) {
        self.multiplicity = self.multiplicity.saturating_add(1);
    }
}

impl Default for Reference {
    fn default() -> Self {
        Self::new()
    }
}

/// An edge of the model together with its endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GraphEdge {
    pub id: EdgeIndex,
    pub source: NodeIndex,
    pub target: NodeIndex,
    pub multiplicity: u32,
}

/// Nodes, reference edges and containment of one diagram.
#[derive(Debug, Default)]
pub struct GraphModel {
    graph: DiGraph<Node, Reference>,
    children: HashMap<NodeIndex, Vec<NodeIndex>>,
    revision: u64,
}

impl GraphModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `node`, registering it as a child of its parent.
    ///
    /// # Errors
    ///
    /// Returns [`LineageError::Graph`] when the parent does not exist or is
    /// not a group.
    pub fn add_node(&mut self, node: Node) -> Result<NodeIndex, LineageError> {
        if let Some(parent) = node.parent {
            let parent_node = self.graph.node_weight(parent).ok_or_else(|| {
                LineageError::Graph(format!("parent node {} does not exist", parent.index()))
            })?;
            if !parent_node.is_group() {
                return Err(LineageError::Graph(format!(
                    "cannot place `{}` inside {} `{}`",
                    node.label, parent_node.kind, parent_node.label
                )));
            }
        }

        let parent = node.parent;
        trace!(kind = node.kind.name(), label = node.label.as_str(); "Adding node");
        let idx = self.graph.add_node(node);
        if let Some(parent) = parent {
            self.children.entry(parent).or_default().push(idx);
        }
        self.revision += 1;
        Ok(idx)
    }

    /// Adds a reference edge from `source` to `target`.
    ///
    /// # Errors
    ///
    /// Returns [`LineageError::Graph`] when either endpoint does not exist.
    pub fn add_edge(
        &mut self,
        source: NodeIndex,
        target: NodeIndex,
        reference: Reference,
    ) -> Result<EdgeIndex, LineageError> {
        for endpoint in [source, target] {
            if self.graph.node_weight(endpoint).is_none() {
                return Err(LineageError::Graph(format!(
                    "edge endpoint {} does not exist",
                    endpoint.index()
                )));
            }
        }

        let idx = self.graph.add_edge(source, target, reference);
        self.revision += 1;
        Ok(idx)
    }

    /// Returns the first edge from `source` to `target`, if any.
    pub fn find_edge(&self, source: NodeIndex, target: NodeIndex) -> Option<EdgeIndex> {
        self.graph.find_edge(source, target)
    }

    pub(crate) fn reference_mut(&mut self, edge: EdgeIndex) -> Option<&mut Reference> {
        self.graph.edge_weight_mut(edge)
    }

    pub fn node(&self, idx: NodeIndex) -> Option<&Node> {
        self.graph.node_weight(idx)
    }

    /// All nodes in creation order.
    pub fn nodes(&self) -> impl Iterator<Item = (NodeIndex, &Node)> {
        self.graph
            .node_indices()
            .filter_map(|idx| self.graph.node_weight(idx).map(|node| (idx, node)))
    }

    /// All edges in creation order.
    pub fn edges(&self) -> impl Iterator<Item = GraphEdge> + '_ {
        self.graph.edge_references().map(|edge| GraphEdge {
            id: edge.id(),
            source: edge.source(),
            target: edge.target(),
            multiplicity: edge.weight().multiplicity(),
        })
    }

    pub fn edge(&self, idx: EdgeIndex) -> Option<GraphEdge> {
        let (source, target) = self.graph.edge_endpoints(idx)?;
        let reference = self.graph.edge_weight(idx)?;
        Some(GraphEdge {
            id: idx,
            source,
            target,
            multiplicity: reference.multiplicity(),
        })
    }

    /// Edges leaving `idx`.
    pub fn outgoing(&self, idx: NodeIndex) -> impl Iterator<Item = NodeIndex> + '_ {
        self.graph.neighbors_directed(idx, Direction::Outgoing)
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Number of nodes of `kind`.
    pub fn count(&self, kind: EntityKind) -> usize {
        self.graph
            .node_weights()
            .filter(|node| node.kind == kind)
            .count()
    }

    /// Direct children of `idx` in creation order.
    pub fn children(&self, idx: NodeIndex) -> &[NodeIndex] {
        self.children.get(&idx).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn parent(&self, idx: NodeIndex) -> Option<NodeIndex> {
        self.graph.node_weight(idx).and_then(Node::parent)
    }

    /// Strict ancestors of `idx`, innermost first.
    pub fn ancestors(&self, idx: NodeIndex) -> impl Iterator<Item = NodeIndex> + '_ {
        std::iter::successors(self.parent(idx), move |&current| self.parent(current))
    }

    /// Strict descendants of `idx` in depth-first pre-order.
    pub fn descendants(&self, idx: NodeIndex) -> Vec<NodeIndex> {
        let mut result = Vec::new();
        let mut stack: Vec<NodeIndex> = self.children(idx).iter().rev().copied().collect();
        while let Some(current) = stack.pop() {
            result.push(current);
            stack.extend(self.children(current).iter().rev().copied());
        }
        result
    }

    /// Nodes without a parent, in creation order.
    pub fn roots(&self) -> impl Iterator<Item = NodeIndex> + '_ {
        self.nodes()
            .filter(|(_, node)| node.parent.is_none())
            .map(|(idx, _)| idx)
    }

    /// Looks up a node by kind and exact label.
    pub fn find(&self, kind: EntityKind, label: &str) -> Option<NodeIndex> {
        self.nodes()
            .find(|(_, node)| node.kind == kind && node.label == label)
            .map(|(idx, _)| idx)
    }

    /// Nodes whose label contains `query`, ignoring case, in creation order.
    ///
    /// A blank query matches nothing.
    ///
    /// # Examples
    ///
    /// ```
    /// use lineage::{GraphBuilder, Row};
    ///
    /// let graph = GraphBuilder::default()
    ///     .build(&[Row::new("Finance", "Ledger", "gl_entries")])
    ///     .unwrap();
    ///
    /// assert_eq!(graph.search("LEDG").len(), 1);
    /// assert!(graph.search("  ").is_empty());
    /// ```
    pub fn search(&self, query: &str) -> Vec<NodeIndex> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Vec::new();
        }
        self.nodes()
            .filter(|(_, node)| node.label.to_lowercase().contains(&needle))
            .map(|(idx, _)| idx)
            .collect()
    }

    /// Counter bumped on every structural change.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub(crate) fn set_geometry(&mut self, idx: NodeIndex, bounds: Bounds) {
        if let Some(node) = self.graph.node_weight_mut(idx) {
            node.geometry = bounds;
        }
    }
}
