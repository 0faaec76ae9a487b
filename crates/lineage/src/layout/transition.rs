//! Animated transition from the committed geometry to a new layout.

use std::time::Duration;

use indexmap::IndexMap;
use log::debug;
use petgraph::graph::NodeIndex;

use lineage_core::geometry::Bounds;

use super::{
    engine::{LayoutInput, LayoutResult, RoutedEdge},
    quality::LayoutQuality,
};
use crate::{
    error::{LayoutFailure, LineageError, StaleState},
    folding::FoldingManager,
    graph::GraphModel,
};

/// Smoothstep easing of `t`, clamped to `[0, 1]`.
pub fn ease(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Start and end geometry of one node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeTransition {
    pub node: NodeIndex,
    pub from: Bounds,
    pub to: Bounds,
}

/// A finished layout run, ready to be animated and committed.
///
/// Nothing in the graph changes until [`LayoutTransition::commit`] is called.
#[derive(Debug, Clone)]
pub struct LayoutTransition {
    revision: u64,
    fold_generation: u64,
    nodes: Vec<NodeTransition>,
    edges: Vec<RoutedEdge>,
    quality: LayoutQuality,
    duration: Duration,
}

impl LayoutTransition {
    /// Pairs the snapshot geometry of `input` with `result`.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutFailure::Incomplete`] when `result` misses a node of
    /// `input`.
    pub fn from_result(
        input: &LayoutInput,
        result: LayoutResult,
        duration: Duration,
    ) -> Result<Self, LayoutFailure> {
        let nodes = input
            .nodes()
            .map(|node| {
                result
                    .nodes
                    .get(&node.id)
                    .map(|&to| NodeTransition {
                        node: node.id,
                        from: node.geometry,
                        to,
                    })
                    .ok_or(LayoutFailure::Incomplete(node.id.index()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let quality = LayoutQuality::measure(input, &result);
        Ok(Self {
            revision: input.revision(),
            fold_generation: input.fold_generation(),
            nodes,
            edges: result.edges,
            quality,
            duration,
        })
    }

    /// Graph revision the layout was computed for.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Folding generation the layout was computed for.
    pub fn fold_generation(&self) -> u64 {
        self.fold_generation
    }

    pub fn nodes(&self) -> &[NodeTransition] {
        &self.nodes
    }

    /// Routed edges of the final geometry.
    pub fn edges(&self) -> &[RoutedEdge] {
        &self.edges
    }

    pub fn quality(&self) -> LayoutQuality {
        self.quality
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Final bounds of `node`, if it is part of the transition.
    pub fn target(&self, node: NodeIndex) -> Option<Bounds> {
        self.nodes.iter().find(|n| n.node == node).map(|n| n.to)
    }

    /// Final bounds of every node.
    pub fn targets(&self) -> IndexMap<NodeIndex, Bounds> {
        self.interpolate(1.0)
    }

    /// Returns true when no node moves.
    pub fn is_noop(&self) -> bool {
        self.nodes.iter().all(|n| n.from == n.to)
    }

    /// Node bounds at progress `t`, eased. `0` is the old geometry, `1` the new.
    pub fn interpolate(&self, t: f32) -> IndexMap<NodeIndex, Bounds> {
        let t = ease(t);
        self.nodes
            .iter()
            .map(|n| {
                let bounds = if t >= 1.0 {
                    n.to
                } else if t <= 0.0 {
                    n.from
                } else {
                    n.from.lerp(&n.to, t)
                };
                (n.node, bounds)
            })
            .collect()
    }

    /// Node bounds `elapsed` into the animation.
    pub fn frame_at(&self, elapsed: Duration) -> IndexMap<NodeIndex, Bounds> {
        let t = if self.duration.is_zero() {
            1.0
        } else {
            elapsed.as_secs_f32() / self.duration.as_secs_f32()
        };
        self.interpolate(t)
    }

    /// Writes the final geometry into `graph`.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutFailure::Stale`] when the graph changed structurally,
    /// or a group of `folding` was collapsed or expanded, since the layout
    /// started; the graph is left untouched.
    pub fn commit(
        self,
        graph: &mut GraphModel,
        folding: &FoldingManager,
    ) -> Result<(), LineageError> {
        if graph.revision() != self.revision {
            return Err(LayoutFailure::Stale {
                state: StaleState::Graph,
                expected: self.revision,
                actual: graph.revision(),
            }
            .into());
        }
        if folding.generation() != self.fold_generation {
            return Err(LayoutFailure::Stale {
                state: StaleState::Folding,
                expected: self.fold_generation,
                actual: folding.generation(),
            }
            .into());
        }

        for n in &self.nodes {
            graph.set_geometry(n.node, n.to);
        }
        debug!(nodes = self.nodes.len(); "Layout committed");
        Ok(())
    }
}
