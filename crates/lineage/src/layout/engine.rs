//! The layout engine seam.
//!
//! Engines never see the live graph. The orchestrator hands them an owned
//! [`LayoutInput`] snapshot of the visible projection, which lets a run move
//! to another thread while the caller keeps using the graph.

use std::fmt;

use indexmap::IndexMap;
use petgraph::graph::{EdgeIndex, NodeIndex};

use lineage_core::{
    geometry::{Bounds, Point, Size},
    kind::EntityKind,
};

use crate::{error::LayoutFailure, folding::FoldingView};

/// One visible node as seen by a layout engine.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutNode {
    pub id: NodeIndex,
    pub kind: EntityKind,
    /// Containing group; always visible when the node is.
    pub parent: Option<NodeIndex>,
    /// Collapsed groups are laid out as leaves.
    pub collapsed: bool,
    pub base_size: Size,
    /// Geometry before this run.
    pub geometry: Bounds,
}

impl LayoutNode {
    /// Returns true when the node's children take part in the layout.
    pub fn is_expanded_group(&self) -> bool {
        self.kind.is_group() && !self.collapsed
    }
}

/// One visible edge, endpoints already redirected by folding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutEdge {
    pub edge: EdgeIndex,
    pub source: NodeIndex,
    pub target: NodeIndex,
}

/// Owned snapshot of a folded view.
#[derive(Debug, Clone, Default)]
pub struct LayoutInput {
    revision: u64,
    fold_generation: u64,
    nodes: IndexMap<NodeIndex, LayoutNode>,
    edges: Vec<LayoutEdge>,
}

impl LayoutInput {
    pub fn new(revision: u64, nodes: Vec<LayoutNode>, edges: Vec<LayoutEdge>) -> Self {
        Self {
            revision,
            fold_generation: 0,
            nodes: nodes.into_iter().map(|node| (node.id, node)).collect(),
            edges,
        }
    }

    pub fn with_fold_generation(mut self, fold_generation: u64) -> Self {
        self.fold_generation = fold_generation;
        self
    }

    /// Captures the visible nodes and edges of `view`.
    pub fn from_view(view: &FoldingView<'_>) -> Self {
        let graph = view.graph();

        let nodes = view
            .visible_nodes()
            .into_iter()
            .filter_map(|idx| {
                let node = graph.node(idx)?;
                Some(LayoutNode {
                    id: idx,
                    kind: node.kind(),
                    parent: node.parent(),
                    collapsed: view.is_collapsed(idx),
                    base_size: node.base_size(),
                    geometry: node.geometry(),
                })
            })
            .collect();

        let edges = view
            .visible_edges()
            .into_iter()
            .map(|edge| LayoutEdge {
                edge: edge.edge,
                source: edge.source,
                target: edge.target,
            })
            .collect();

        Self::new(graph.revision(), nodes, edges).with_fold_generation(view.generation())
    }

    /// Graph revision the snapshot was taken at.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Folding generation the snapshot was taken at.
    pub fn fold_generation(&self) -> u64 {
        self.fold_generation
    }

    /// Nodes in creation order.
    pub fn nodes(&self) -> impl Iterator<Item = &LayoutNode> {
        self.nodes.values()
    }

    pub fn node(&self, id: NodeIndex) -> Option<&LayoutNode> {
        self.nodes.get(&id)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edges(&self) -> &[LayoutEdge] {
        &self.edges
    }

    /// Nodes whose parent is `scope` (`None` for the top level), in creation order.
    pub fn scope_members(&self, scope: Option<NodeIndex>) -> Vec<NodeIndex> {
        self.nodes
            .values()
            .filter(|node| node.parent == scope)
            .map(|node| node.id)
            .collect()
    }

    /// Returns true when `ancestor` contains `node`, directly or transitively.
    pub fn is_ancestor(&self, ancestor: NodeIndex, node: NodeIndex) -> bool {
        let mut current = self.nodes.get(&node).and_then(|n| n.parent);
        while let Some(parent) = current {
            if parent == ancestor {
                return true;
            }
            current = self.nodes.get(&parent).and_then(|n| n.parent);
        }
        false
    }
}

/// A routed edge: an orthogonal polyline from source to target.
#[derive(Debug, Clone, PartialEq)]
pub struct RoutedEdge {
    pub edge: EdgeIndex,
    pub source: NodeIndex,
    pub target: NodeIndex,
    pub points: Vec<Point>,
}

/// Geometry produced by one engine run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayoutResult {
    /// Absolute bounds of every visible node.
    pub nodes: IndexMap<NodeIndex, Bounds>,
    pub edges: Vec<RoutedEdge>,
}

/// A layout algorithm.
///
/// `calculate` runs on a blocking worker thread and must be deterministic:
/// the same input yields the same result.
pub trait LayoutEngine: Send + Sync + fmt::Debug {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Computes geometry for every node of `input`.
    fn calculate(&self, input: &LayoutInput) -> Result<LayoutResult, LayoutFailure>;
}
