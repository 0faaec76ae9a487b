//! Automatic layout of folded views.
//!
//! [`LayoutOrchestrator`] drives a pluggable [`LayoutEngine`] (by default the
//! [`OrthogonalEngine`]) and hands back a [`LayoutTransition`] that can be
//! animated and then committed to the graph.

mod engine;
mod orchestrator;
mod orthogonal;
mod quality;
mod routing;
mod transition;

pub use engine::{LayoutEdge, LayoutEngine, LayoutInput, LayoutNode, LayoutResult, RoutedEdge};
pub use orchestrator::LayoutOrchestrator;
pub use orthogonal::OrthogonalEngine;
pub use quality::LayoutQuality;
pub use routing::{is_orthogonal, route_orthogonal};
pub use transition::{LayoutTransition, NodeTransition, ease};
