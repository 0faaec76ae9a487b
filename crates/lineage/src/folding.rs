//! Collapse and expand of group nodes.
//!
//! Folding never mutates the [`GraphModel`]. A [`FoldingManager`] holds the
//! set of collapsed groups for one graph, and [`FoldingView`] projects the
//! graph through that set: descendants of a collapsed group are hidden and
//! edges touching them are redirected to the group.

use std::collections::BTreeSet;

use log::debug;
use petgraph::graph::{EdgeIndex, NodeIndex};

use crate::{error::LineageError, graph::GraphModel};

/// Collapse state of the groups of one graph.
#[derive(Debug, Clone, Default)]
pub struct FoldingManager {
    collapsed: BTreeSet<NodeIndex>,
    generation: u64,
}

impl FoldingManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collapses `node`. Returns false if it was already collapsed.
    ///
    /// # Errors
    ///
    /// Returns [`LineageError::Folding`] when `node` is not a group of `graph`.
    pub fn collapse(&mut self, graph: &GraphModel, node: NodeIndex) -> Result<bool, LineageError> {
        ensure_group(graph, node)?;
        let changed = self.collapsed.insert(node);
        self.bump(changed);
        debug!(node = node.index(), changed = changed; "Collapse group");
        Ok(changed)
    }

    /// Expands `node`. Returns false if it was not collapsed.
    ///
    /// Groups nested inside `node` keep their own state.
    pub fn expand(&mut self, graph: &GraphModel, node: NodeIndex) -> Result<bool, LineageError> {
        ensure_group(graph, node)?;
        let changed = self.collapsed.remove(&node);
        self.bump(changed);
        debug!(node = node.index(), changed = changed; "Expand group");
        Ok(changed)
    }

    /// Flips the state of `node` and returns whether it is now collapsed.
    pub fn toggle(&mut self, graph: &GraphModel, node: NodeIndex) -> Result<bool, LineageError> {
        if self.is_collapsed(node) {
            self.expand(graph, node)?;
            Ok(false)
        } else {
            self.collapse(graph, node)?;
            Ok(true)
        }
    }

    pub fn is_collapsed(&self, node: NodeIndex) -> bool {
        self.collapsed.contains(&node)
    }

    /// Collapses every group of `graph`.
    pub fn collapse_all(&mut self, graph: &GraphModel) {
        let before = self.collapsed.len();
        self.collapsed.extend(
            graph
                .nodes()
                .filter(|(_, node)| node.is_group())
                .map(|(idx, _)| idx),
        );
        self.bump(self.collapsed.len() != before);
    }

    pub fn expand_all(&mut self) {
        self.bump(!self.collapsed.is_empty());
        self.collapsed.clear();
    }

    /// Counter advanced by every collapse or expand that changed the state.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    fn bump(&mut self, changed: bool) {
        if changed {
            self.generation += 1;
        }
    }

    /// Collapsed groups in index order.
    pub fn collapsed(&self) -> impl Iterator<Item = NodeIndex> + '_ {
        self.collapsed.iter().copied()
    }

    /// Projects `graph` through the current collapse state.
    pub fn view<'a>(&'a self, graph: &'a GraphModel) -> FoldingView<'a> {
        FoldingView {
            graph,
            folding: self,
        }
    }
}

fn ensure_group(graph: &GraphModel, node: NodeIndex) -> Result<(), LineageError> {
    match graph.node(node) {
        Some(n) if n.is_group() => Ok(()),
        Some(n) => Err(LineageError::Folding(format!(
            "{} `{}` is not a group",
            n.kind(),
            n.label()
        ))),
        None => Err(LineageError::Folding(format!(
            "node {} does not exist",
            node.index()
        ))),
    }
}

/// An edge of the folded projection.
///
/// `source` and `target` are the visible representatives of the underlying
/// edge's endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisibleEdge {
    pub edge: EdgeIndex,
    pub source: NodeIndex,
    pub target: NodeIndex,
    pub multiplicity: u32,
}

/// Read-only projection of a graph with collapsed groups folded away.
#[derive(Debug, Clone, Copy)]
pub struct FoldingView<'a> {
    graph: &'a GraphModel,
    folding: &'a FoldingManager,
}

impl<'a> FoldingView<'a> {
    pub fn graph(&self) -> &'a GraphModel {
        self.graph
    }

    pub fn is_collapsed(&self, node: NodeIndex) -> bool {
        self.folding.is_collapsed(node)
    }

    /// Folding generation the view projects.
    pub fn generation(&self) -> u64 {
        self.folding.generation()
    }

    /// Returns true when no strict ancestor of `node` is collapsed.
    pub fn is_visible(&self, node: NodeIndex) -> bool {
        self.graph.node(node).is_some()
            && !self
                .graph
                .ancestors(node)
                .any(|ancestor| self.folding.is_collapsed(ancestor))
    }

    /// The visible node standing in for `node`: its outermost collapsed
    /// ancestor, or `node` itself when visible.
    pub fn representative(&self, node: NodeIndex) -> Option<NodeIndex> {
        self.graph.node(node)?;
        let outermost = self
            .graph
            .ancestors(node)
            .filter(|&ancestor| self.folding.is_collapsed(ancestor))
            .last();
        Some(outermost.unwrap_or(node))
    }

    /// Visible nodes in creation order.
    pub fn visible_nodes(&self) -> Vec<NodeIndex> {
        self.graph
            .nodes()
            .map(|(idx, _)| idx)
            .filter(|&idx| self.is_visible(idx))
            .collect()
    }

    /// Children shown inside `node`; empty when `node` is hidden or collapsed.
    pub fn visible_children(&self, node: NodeIndex) -> &'a [NodeIndex] {
        if self.is_collapsed(node) || !self.is_visible(node) {
            return &[];
        }
        self.graph.children(node)
    }

    /// Edges between visible nodes, with hidden endpoints redirected.
    ///
    /// Edges whose endpoints fold into the same node are left out.
    pub fn visible_edges(&self) -> Vec<VisibleEdge> {
        self.graph
            .edges()
            .filter_map(|edge| {
                let source = self.representative(edge.source)?;
                let target = self.representative(edge.target)?;
                (source != target).then_some(VisibleEdge {
                    edge: edge.id,
                    source,
                    target,
                    multiplicity: edge.multiplicity,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use lineage_core::kind::EntityKind;

    use super::*;
    use crate::{builder::GraphBuilder, row::Row};

    fn calibration() -> GraphModel {
        GraphBuilder::default()
            .build(&[
                Row::new("Domain1", "SystemA", "Table1"),
                Row::new("Domain1", "SystemA", "Table2"),
                Row::new("Domain2", "SystemB", "Table3"),
                Row::new("Domain2", "SystemB", "Table1"),
            ])
            .unwrap()
    }

    fn snapshot(view: &FoldingView<'_>) -> (Vec<NodeIndex>, Vec<VisibleEdge>) {
        (view.visible_nodes(), view.visible_edges())
    }

    #[test]
    fn test_nothing_collapsed_shows_everything() {
        let graph = calibration();
        let folding = FoldingManager::new();
        let view = folding.view(&graph);

        assert_eq!(view.visible_nodes().len(), graph.node_count());
        assert_eq!(view.visible_edges().len(), graph.edge_count());
    }

    #[test]
    fn test_collapse_hides_descendants_and_redirects_edges() {
        let graph = calibration();
        let domain1 = graph.find(EntityKind::Domain, "Domain1").unwrap();
        let system_b = graph.find(EntityKind::System, "SystemB").unwrap();
        let table1 = graph.find(EntityKind::Table, "Table1").unwrap();

        let mut folding = FoldingManager::new();
        assert!(folding.collapse(&graph, domain1).unwrap());
        let view = folding.view(&graph);

        assert!(view.is_visible(domain1));
        assert!(!view.is_visible(table1));
        assert_eq!(view.representative(table1), Some(domain1));
        assert_eq!(view.visible_nodes().len(), 4);

        // SystemA→Table1/Table2 fold into Domain1; SystemB→Table1 now points at it.
        let edges = view.visible_edges();
        assert_eq!(edges.len(), 2);
        assert!(
            edges
                .iter()
                .any(|e| e.source == system_b && e.target == domain1)
        );
    }

    #[test]
    fn test_expand_restores_projection() {
        let graph = calibration();
        let domain2 = graph.find(EntityKind::Domain, "Domain2").unwrap();

        let mut folding = FoldingManager::new();
        let before = snapshot(&folding.view(&graph));

        folding.collapse(&graph, domain2).unwrap();
        assert_ne!(snapshot(&folding.view(&graph)), before);

        folding.expand(&graph, domain2).unwrap();
        assert_eq!(snapshot(&folding.view(&graph)), before);
    }

    #[test]
    fn test_toggle_and_idempotence() {
        let graph = calibration();
        let domain1 = graph.find(EntityKind::Domain, "Domain1").unwrap();
        let mut folding = FoldingManager::new();

        assert!(folding.toggle(&graph, domain1).unwrap());
        assert!(!folding.collapse(&graph, domain1).unwrap());
        assert!(!folding.toggle(&graph, domain1).unwrap());
        assert!(!folding.expand(&graph, domain1).unwrap());
        assert!(!folding.is_collapsed(domain1));
    }

    #[test]
    fn test_generation_tracks_state_changes() {
        let graph = calibration();
        let domain1 = graph.find(EntityKind::Domain, "Domain1").unwrap();
        let mut folding = FoldingManager::new();
        assert_eq!(folding.generation(), 0);

        folding.collapse(&graph, domain1).unwrap();
        folding.collapse(&graph, domain1).unwrap();
        assert_eq!(folding.generation(), 1);

        folding.expand(&graph, domain1).unwrap();
        assert_eq!(folding.view(&graph).generation(), 2);

        folding.expand_all();
        assert_eq!(folding.generation(), 2);
        folding.collapse_all(&graph);
        assert_eq!(folding.generation(), 3);
        folding.expand_all();
        assert_eq!(folding.generation(), 4);
    }

    #[test]
    fn test_leaf_and_unknown_nodes_are_rejected() {
        let graph = calibration();
        let table1 = graph.find(EntityKind::Table, "Table1").unwrap();
        let mut folding = FoldingManager::new();

        assert!(matches!(
            folding.collapse(&graph, table1),
            Err(LineageError::Folding(_))
        ));
        assert!(matches!(
            folding.toggle(&graph, NodeIndex::new(500)),
            Err(LineageError::Folding(_))
        ));
        assert_eq!(folding.collapsed().count(), 0);
    }

    #[test]
    fn test_collapse_all() {
        let graph = calibration();
        let mut folding = FoldingManager::new();
        folding.collapse_all(&graph);

        let view = folding.view(&graph);
        assert_eq!(view.visible_nodes().len(), 2);
        // Only SystemB→Table1 crosses domains.
        assert_eq!(view.visible_edges().len(), 1);

        folding.expand_all();
        assert_eq!(folding.view(&graph).visible_nodes().len(), graph.node_count());
    }

    #[test]
    fn test_nested_state_survives_outer_collapse() {
        use lineage_core::{geometry::Size, identifier::Id, style::StyleResolver};

        use crate::graph::{Node, Reference};

        let group = |label: &str| {
            Node::new(
                EntityKind::Domain,
                Id::new(label),
                label,
                StyleResolver::new().resolve(EntityKind::Domain),
                Size::new(120.0, 60.0),
            )
        };
        let leaf = |label: &str| {
            Node::new(
                EntityKind::Table,
                Id::new(label),
                label,
                StyleResolver::new().resolve(EntityKind::Table),
                Size::new(60.0, 30.0),
            )
        };

        let mut graph = GraphModel::new();
        let outer = graph.add_node(group("outer")).unwrap();
        let inner = graph.add_node(group("inner").with_parent(outer)).unwrap();
        let deep = graph.add_node(leaf("deep").with_parent(inner)).unwrap();
        let other = graph.add_node(leaf("other")).unwrap();
        graph.add_edge(other, deep, Reference::new()).unwrap();

        let mut folding = FoldingManager::new();
        folding.collapse(&graph, inner).unwrap();
        folding.collapse(&graph, outer).unwrap();

        let view = folding.view(&graph);
        assert_eq!(view.representative(deep), Some(outer));
        assert!(view.visible_children(outer).is_empty());
        assert_eq!(view.visible_edges()[0].target, outer);

        folding.expand(&graph, outer).unwrap();
        let view = folding.view(&graph);
        assert!(view.is_collapsed(inner));
        assert!(view.is_visible(inner));
        assert_eq!(view.representative(deep), Some(inner));
    }
}
