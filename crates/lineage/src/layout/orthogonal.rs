//! Compound layered layout with orthogonal edges.
//!
//! Each containment scope (the top level and every expanded group) is laid
//! out on its own, innermost first, so a group's size is known before its
//! parent scope places it:
//!
//! 1. edges are lifted to the scope-level ancestors of their endpoints;
//! 2. cycles are broken by reversing DFS back edges;
//! 3. nodes are layered along X by longest path;
//! 4. nodes within a layer are ordered by barycenter sweeps, keeping the
//!    ordering with the fewest crossings;
//! 5. layers are placed left to right and nodes stacked top to bottom on a
//!    grid.
//!
//! Scope positions are then resolved to absolute coordinates top-down and
//! edges are routed with [`route_orthogonal`].

use std::{cmp::Ordering, collections::HashMap};

use indexmap::IndexMap;
use log::{debug, trace};
use petgraph::{
    Direction,
    algo::toposort,
    graph::{DiGraph, NodeIndex},
    visit::{DfsEvent, depth_first_search},
};

use lineage_core::geometry::{Bounds, Insets, Point, Size, snap_to_grid};

use super::{
    engine::{LayoutEngine, LayoutInput, LayoutResult, RoutedEdge},
    routing::route_orthogonal,
};
use crate::{config::LayoutConfig, error::LayoutFailure};

const MAX_SWEEPS: usize = 24;

/// Default layout engine.
#[derive(Debug, Clone)]
pub struct OrthogonalEngine {
    grid_size: f32,
    h_spacing: f32,
    v_spacing: f32,
    group_padding: f32,
    header_height: f32,
    clearance: f32,
}

impl Default for OrthogonalEngine {
    fn default() -> Self {
        Self::from_config(&LayoutConfig::default())
    }
}

impl OrthogonalEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &LayoutConfig) -> Self {
        Self {
            grid_size: config.grid_size,
            h_spacing: config.h_spacing,
            v_spacing: config.v_spacing,
            group_padding: config.group_padding,
            header_height: config.header_height,
            clearance: config.clearance,
        }
    }

    /// Set the grid every coordinate snaps to
    pub fn set_grid_size(&mut self, grid_size: f32) -> &mut Self {
        self.grid_size = grid_size;
        self
    }

    /// Set the gap between layers
    pub fn set_h_spacing(&mut self, spacing: f32) -> &mut Self {
        self.h_spacing = spacing;
        self
    }

    /// Set the gap between nodes of one layer
    pub fn set_v_spacing(&mut self, spacing: f32) -> &mut Self {
        self.v_spacing = spacing;
        self
    }

    pub fn set_group_padding(&mut self, padding: f32) -> &mut Self {
        self.group_padding = padding;
        self
    }

    /// Space between a group's border and its content, kept on the grid.
    fn group_insets(&self) -> Insets {
        let padding = self.ceil_to_grid(self.group_padding);
        let top = self.ceil_to_grid(self.group_padding + self.header_height);
        Insets::uniform(padding).with_top(top)
    }

    fn ceil_to_grid(&self, value: f32) -> f32 {
        if self.grid_size <= 0.0 {
            return value;
        }
        (value / self.grid_size).ceil() * self.grid_size
    }

    /// Lays out one scope, returning member offsets and the content size.
    fn layout_scope(
        &self,
        input: &LayoutInput,
        scope: Option<NodeIndex>,
        sizes: &HashMap<NodeIndex, Size>,
    ) -> Result<(Vec<(NodeIndex, Point)>, Size), LayoutFailure> {
        let members = input.scope_members(scope);
        if members.is_empty() {
            return Ok((Vec::new(), Size::default()));
        }

        let scope_graph = scope_graph(input, scope, &members);
        let dag = break_cycles(&scope_graph);
        let layers = assign_layers(&dag)?;
        let layers = minimise_crossings(&dag, layers);

        let size_of = |idx: NodeIndex| sizes.get(&idx).copied().unwrap_or_default();

        let layer_heights: Vec<f32> = layers
            .iter()
            .map(|layer| {
                let total: f32 = layer.iter().map(|&n| size_of(dag[n]).height()).sum();
                total + self.v_spacing * layer.len().saturating_sub(1) as f32
            })
            .collect();
        let tallest = layer_heights.iter().copied().fold(0.0, f32::max);

        let mut offsets = Vec::with_capacity(members.len());
        let mut content = Size::default();
        let mut x = 0.0;

        for (layer, height) in layers.iter().zip(&layer_heights) {
            let width = layer
                .iter()
                .map(|&n| size_of(dag[n]).width())
                .max_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Less))
                .unwrap_or_default();

            let mut y = snap_to_grid((tallest - height) / 2.0, self.grid_size).max(0.0);
            for &n in layer {
                let idx = dag[n];
                let size = size_of(idx);
                offsets.push((idx, Point::new(x, y)));
                content = content.max(Size::new(x + size.width(), y + size.height()));
                y = self.ceil_to_grid(y + size.height() + self.v_spacing);
            }

            x = self.ceil_to_grid(x + width + self.h_spacing);
        }

        trace!(layers = layers.len(), members = members.len(); "Laid out scope");
        Ok((offsets, content))
    }
}

impl LayoutEngine for OrthogonalEngine {
    fn name(&self) -> &'static str {
        "orthogonal"
    }

    fn calculate(&self, input: &LayoutInput) -> Result<LayoutResult, LayoutFailure> {
        let mut sizes: HashMap<NodeIndex, Size> = input
            .nodes()
            .map(|node| (node.id, node.base_size))
            .collect();
        let mut offsets: HashMap<NodeIndex, Point> = HashMap::new();

        // Innermost groups first; ties keep creation order.
        let mut groups: Vec<(usize, NodeIndex)> = input
            .nodes()
            .filter(|node| node.is_expanded_group())
            .map(|node| (depth(input, node.id), node.id))
            .collect();
        groups.sort_by(|a, b| b.0.cmp(&a.0));

        let insets = self.group_insets();
        for &(_, group) in &groups {
            let (members, content) = self.layout_scope(input, Some(group), &sizes)?;
            if members.is_empty() {
                continue;
            }
            offsets.extend(members);

            let base = sizes.get(&group).copied().unwrap_or_default();
            let padded = content.add_padding(insets);
            let size = Size::new(
                self.ceil_to_grid(padded.width()),
                self.ceil_to_grid(padded.height()),
            )
            .max(base);
            sizes.insert(group, size);
        }

        let (top_level, _) = self.layout_scope(input, None, &sizes)?;
        offsets.extend(top_level);

        // Parents precede children in creation order, so one pass resolves
        // every absolute position.
        let mut nodes: IndexMap<NodeIndex, Bounds> = IndexMap::with_capacity(input.node_count());
        for node in input.nodes() {
            let offset = offsets
                .get(&node.id)
                .copied()
                .ok_or(LayoutFailure::Incomplete(node.id.index()))?;
            let origin = match node.parent {
                Some(parent) => nodes
                    .get(&parent)
                    .map(|bounds| {
                        bounds
                            .min_point()
                            .add_point(Point::new(insets.left(), insets.top()))
                    })
                    .ok_or(LayoutFailure::Incomplete(parent.index()))?,
                None => Point::default(),
            };
            let size = sizes.get(&node.id).copied().unwrap_or(node.base_size);
            nodes.insert(
                node.id,
                Bounds::new_from_top_left(origin.add_point(offset), size),
            );
        }

        let edges = input
            .edges()
            .iter()
            .filter_map(|edge| {
                let source = nodes.get(&edge.source)?;
                let target = nodes.get(&edge.target)?;
                Some(RoutedEdge {
                    edge: edge.edge,
                    source: edge.source,
                    target: edge.target,
                    points: route_orthogonal(*source, *target, self.clearance),
                })
            })
            .collect();

        debug!(nodes = nodes.len(), groups = groups.len(); "Orthogonal layout calculated");
        Ok(LayoutResult { nodes, edges })
    }
}

fn depth(input: &LayoutInput, id: NodeIndex) -> usize {
    let mut depth = 0;
    let mut current = input.node(id).and_then(|node| node.parent);
    while let Some(parent) = current {
        depth += 1;
        current = input.node(parent).and_then(|node| node.parent);
    }
    depth
}

/// Builds the edge graph of one scope. Node weights are the original
/// indices; edges are lifted to the members containing their endpoints.
fn scope_graph(
    input: &LayoutInput,
    scope: Option<NodeIndex>,
    members: &[NodeIndex],
) -> DiGraph<NodeIndex, ()> {
    let mut graph = DiGraph::new();
    let local: HashMap<NodeIndex, NodeIndex> = members
        .iter()
        .map(|&member| (member, graph.add_node(member)))
        .collect();

    let lift = |idx: NodeIndex| -> Option<NodeIndex> {
        let mut current = idx;
        loop {
            let node = input.node(current)?;
            if node.parent == scope {
                return local.get(&current).copied();
            }
            current = node.parent?;
        }
    };

    for edge in input.edges() {
        if let (Some(source), Some(target)) = (lift(edge.source), lift(edge.target)) {
            if source != target {
                graph.update_edge(source, target, ());
            }
        }
    }

    graph
}

/// Returns an acyclic copy of `graph` with DFS back edges reversed.
fn break_cycles(graph: &DiGraph<NodeIndex, ()>) -> DiGraph<NodeIndex, ()> {
    let mut back_edges = Vec::new();
    depth_first_search(graph, graph.node_indices(), |event| {
        if let DfsEvent::BackEdge(source, target) = event {
            back_edges.push((source, target));
        }
    });

    let mut dag = graph.map(|_, weight| *weight, |_, _| ());
    for (source, target) in back_edges {
        if let Some(edge) = dag.find_edge(source, target) {
            dag.remove_edge(edge);
        }
        if source != target {
            dag.update_edge(target, source, ());
        }
    }
    dag
}

/// Longest-path layering; every node lands one layer after its furthest
/// predecessor.
fn assign_layers(dag: &DiGraph<NodeIndex, ()>) -> Result<Vec<Vec<NodeIndex>>, LayoutFailure> {
    let order = toposort(dag, None).map_err(|cycle| {
        LayoutFailure::Engine(format!("cycle through node {}", cycle.node_id().index()))
    })?;

    let mut layer_of = vec![0usize; dag.node_count()];
    for &node in &order {
        let layer = dag
            .neighbors_directed(node, Direction::Incoming)
            .map(|pred| layer_of[pred.index()] + 1)
            .max()
            .unwrap_or(0);
        layer_of[node.index()] = layer;
    }

    let layer_count = layer_of.iter().copied().max().map_or(0, |max| max + 1);
    let mut layers = vec![Vec::new(); layer_count];
    // Creation order within each layer seeds the sweeps.
    for node in dag.node_indices() {
        layers[layer_of[node.index()]].push(node);
    }
    Ok(layers)
}

fn minimise_crossings(
    dag: &DiGraph<NodeIndex, ()>,
    mut layers: Vec<Vec<NodeIndex>>,
) -> Vec<Vec<NodeIndex>> {
    let mut best = layers.clone();
    let mut best_crossings = count_crossings(dag, &layers);

    for _ in 0..MAX_SWEEPS {
        if best_crossings == 0 {
            break;
        }

        for layer in 1..layers.len() {
            let (fixed, rest) = layers.split_at_mut(layer);
            sort_by_barycenter(dag, &mut rest[0], &fixed[layer - 1], Direction::Incoming);
        }
        for layer in (0..layers.len().saturating_sub(1)).rev() {
            let (head, tail) = layers.split_at_mut(layer + 1);
            sort_by_barycenter(dag, &mut head[layer], &tail[0], Direction::Outgoing);
        }

        let crossings = count_crossings(dag, &layers);
        if crossings >= best_crossings {
            break;
        }
        best_crossings = crossings;
        best = layers.clone();
    }

    best
}

fn sort_by_barycenter(
    dag: &DiGraph<NodeIndex, ()>,
    layer: &mut [NodeIndex],
    neighbor_layer: &[NodeIndex],
    direction: Direction,
) {
    let neighbor_pos: HashMap<NodeIndex, f32> = neighbor_layer
        .iter()
        .enumerate()
        .map(|(pos, &node)| (node, pos as f32))
        .collect();

    let keys: HashMap<NodeIndex, f32> = layer
        .iter()
        .enumerate()
        .map(|(pos, &node)| {
            let positions: Vec<f32> = dag
                .neighbors_directed(node, direction)
                .filter_map(|neighbor| neighbor_pos.get(&neighbor).copied())
                .collect();
            // Nodes without neighbors in the fixed layer keep their place.
            let key = if positions.is_empty() {
                pos as f32
            } else {
                positions.iter().sum::<f32>() / positions.len() as f32
            };
            (node, key)
        })
        .collect();

    layer.sort_by(|a, b| keys[a].partial_cmp(&keys[b]).unwrap_or(Ordering::Equal));
}

/// Crossings between adjacent layers.
fn count_crossings(dag: &DiGraph<NodeIndex, ()>, layers: &[Vec<NodeIndex>]) -> usize {
    let mut total = 0;
    for pair in layers.windows(2) {
        let target_pos: HashMap<NodeIndex, usize> = pair[1]
            .iter()
            .enumerate()
            .map(|(pos, &node)| (node, pos))
            .collect();

        let mut edges = Vec::new();
        for (source_pos, &source) in pair[0].iter().enumerate() {
            for target in dag.neighbors_directed(source, Direction::Outgoing) {
                if let Some(&pos) = target_pos.get(&target) {
                    edges.push((source_pos, pos));
                }
            }
        }

        for (i, &(a0, a1)) in edges.iter().enumerate() {
            for &(b0, b1) in &edges[i + 1..] {
                if (a0 < b0 && a1 > b1) || (a0 > b0 && a1 < b1) {
                    total += 1;
                }
            }
        }
    }
    total
}

#[cfg(test)]
mod tests {
    use float_cmp::assert_approx_eq;
    use lineage_core::kind::EntityKind;

    use super::*;
    use crate::{
        builder::GraphBuilder,
        folding::FoldingManager,
        graph::GraphModel,
        layout::quality::LayoutQuality,
        row::Row,
    };

    fn graph(rows: &[(&str, &str, &str)]) -> GraphModel {
        let rows: Vec<Row> = rows.iter().map(|&r| Row::from(r)).collect();
        GraphBuilder::default().build(&rows).unwrap()
    }

    fn calibration() -> GraphModel {
        graph(&[
            ("Domain1", "SystemA", "Table1"),
            ("Domain1", "SystemA", "Table2"),
            ("Domain2", "SystemB", "Table3"),
            ("Domain2", "SystemB", "Table1"),
        ])
    }

    fn run(graph: &GraphModel, folding: &FoldingManager) -> (LayoutInput, LayoutResult) {
        let input = LayoutInput::from_view(&folding.view(graph));
        let result = OrthogonalEngine::default().calculate(&input).unwrap();
        (input, result)
    }

    #[test]
    fn test_every_visible_node_is_placed() {
        let graph = calibration();
        let (input, result) = run(&graph, &FoldingManager::new());

        assert_eq!(result.nodes.len(), input.node_count());
        assert_eq!(result.edges.len(), graph.edge_count());
    }

    #[test]
    fn test_groups_contain_their_children() {
        let graph = calibration();
        let (_, result) = run(&graph, &FoldingManager::new());

        for (idx, node) in graph.nodes() {
            if let Some(parent) = node.parent() {
                assert!(
                    result.nodes[&parent].contains(&result.nodes[&idx]),
                    "{} escapes its group",
                    node.label()
                );
            }
        }
    }

    #[test]
    fn test_no_overlaps_between_siblings() {
        let graph = calibration();
        let (input, result) = run(&graph, &FoldingManager::new());
        assert_eq!(LayoutQuality::measure(&input, &result).overlaps, 0);
    }

    #[test]
    fn test_references_flow_left_to_right() {
        let graph = calibration();
        let (_, result) = run(&graph, &FoldingManager::new());

        let system = graph.find(EntityKind::System, "SystemA").unwrap();
        let table = graph.find(EntityKind::Table, "Table2").unwrap();
        assert!(result.nodes[&system].max_x() < result.nodes[&table].min_x());
    }

    #[test]
    fn test_coordinates_are_on_grid() {
        let graph = calibration();
        let (_, result) = run(&graph, &FoldingManager::new());

        for bounds in result.nodes.values() {
            assert_approx_eq!(f32, bounds.min_x() % 10.0, 0.0);
            assert_approx_eq!(f32, bounds.min_y() % 10.0, 0.0);
        }
    }

    #[test]
    fn test_collapsed_group_uses_base_size() {
        let graph = calibration();
        let domain1 = graph.find(EntityKind::Domain, "Domain1").unwrap();
        let mut folding = FoldingManager::new();
        folding.collapse(&graph, domain1).unwrap();

        let (input, result) = run(&graph, &folding);
        assert_eq!(result.nodes[&domain1].to_size(), Size::new(120.0, 60.0));
        assert_eq!(result.nodes.len(), input.node_count());
        assert!(!result.nodes.contains_key(&graph.find(EntityKind::Table, "Table2").unwrap()));
    }

    #[test]
    fn test_cycles_are_laid_out() {
        // Domain-level cycle: SystemA → Table2 (Domain2) and SystemB → Table1 (Domain1).
        let graph = graph(&[
            ("Domain1", "SystemA", "Table1"),
            ("Domain2", "SystemB", "Table2"),
            ("Domain1", "SystemA", "Table2"),
            ("Domain2", "SystemB", "Table1"),
        ]);
        let mut folding = FoldingManager::new();
        folding.collapse_all(&graph);

        let (input, result) = run(&graph, &folding);
        assert_eq!(result.nodes.len(), input.node_count());
        assert_eq!(LayoutQuality::measure(&input, &result).overlaps, 0);
    }

    #[test]
    fn test_deterministic() {
        let graph = calibration();
        let folding = FoldingManager::new();
        let (_, first) = run(&graph, &folding);
        let (_, second) = run(&graph, &folding);
        assert_eq!(first, second);
    }

    #[test]
    fn test_barycenter_removes_avoidable_crossing() {
        let mut dag: DiGraph<NodeIndex, ()> = DiGraph::new();
        let a = dag.add_node(NodeIndex::new(0));
        let b = dag.add_node(NodeIndex::new(1));
        let c = dag.add_node(NodeIndex::new(2));
        let d = dag.add_node(NodeIndex::new(3));
        dag.add_edge(a, d, ());
        dag.add_edge(b, c, ());

        let layers = vec![vec![a, b], vec![c, d]];
        assert_eq!(count_crossings(&dag, &layers), 1);

        let ordered = minimise_crossings(&dag, layers);
        assert_eq!(count_crossings(&dag, &ordered), 0);
    }

    #[test]
    fn test_break_cycles_yields_dag() {
        let mut graph: DiGraph<NodeIndex, ()> = DiGraph::new();
        let a = graph.add_node(NodeIndex::new(0));
        let b = graph.add_node(NodeIndex::new(1));
        let c = graph.add_node(NodeIndex::new(2));
        graph.add_edge(a, b, ());
        graph.add_edge(b, c, ());
        graph.add_edge(c, a, ());

        let dag = break_cycles(&graph);
        assert!(toposort(&dag, None).is_ok());
        assert_eq!(dag.edge_count(), 3);
    }
}
