//! Asynchronous layout runs.

use std::{sync::Arc, time::Duration};

use log::{debug, info, warn};

use super::{
    engine::{LayoutEngine, LayoutInput},
    orthogonal::OrthogonalEngine,
    transition::LayoutTransition,
};
use crate::{
    config::LayoutConfig,
    error::{LayoutFailure, LineageError},
    folding::FoldingView,
};

/// Runs a [`LayoutEngine`] over folded views.
///
/// Each run snapshots the view, computes on tokio's blocking pool under a
/// timeout and yields a [`LayoutTransition`]. Dropping the returned future
/// abandons the run; its result is discarded and the graph is never touched.
#[derive(Debug, Clone)]
pub struct LayoutOrchestrator {
    engine: Arc<dyn LayoutEngine>,
    timeout: Duration,
    animation: Duration,
}

impl Default for LayoutOrchestrator {
    fn default() -> Self {
        Self::from_config(&LayoutConfig::default())
    }
}

impl LayoutOrchestrator {
    /// Creates an orchestrator for `engine` with the default timeout and
    /// animation duration.
    pub fn new(engine: Arc<dyn LayoutEngine>) -> Self {
        let defaults = LayoutConfig::default();
        Self {
            engine,
            timeout: defaults.timeout(),
            animation: defaults.animation(),
        }
    }

    /// Creates an orchestrator running the orthogonal engine configured by `config`.
    pub fn from_config(config: &LayoutConfig) -> Self {
        Self {
            engine: Arc::new(OrthogonalEngine::from_config(config)),
            timeout: config.timeout(),
            animation: config.animation(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_animation_duration(mut self, animation: Duration) -> Self {
        self.animation = animation;
        self
    }

    pub fn engine(&self) -> &dyn LayoutEngine {
        self.engine.as_ref()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Lays out the visible projection of `view`.
    ///
    /// The view is captured before this returns, so the graph and its folding
    /// state may be used or mutated while the future is pending. A transition
    /// computed for an older revision or folding generation is rejected by
    /// [`LayoutTransition::commit`].
    ///
    /// Must be polled inside a tokio runtime.
    ///
    /// # Errors
    ///
    /// The future resolves to [`LineageError::Layout`] when the engine fails,
    /// panics, exceeds the timeout or leaves a visible node unplaced.
    pub fn layout(
        &self,
        view: &FoldingView<'_>,
    ) -> impl Future<Output = Result<LayoutTransition, LineageError>> + Send + 'static + use<> {
        let input = Arc::new(LayoutInput::from_view(view));
        let engine = Arc::clone(&self.engine);
        let timeout = self.timeout;
        let animation = self.animation;

        async move {
            info!(
                engine = engine.name(),
                nodes = input.node_count(),
                edges = input.edges().len();
                "Starting layout"
            );

            let task_input = Arc::clone(&input);
            let task = tokio::task::spawn_blocking(move || engine.calculate(&task_input));

            let result = match tokio::time::timeout(timeout, task).await {
                Err(_) => {
                    warn!(timeout_ms = timeout.as_millis() as u64; "Layout timed out");
                    return Err(LayoutFailure::Timeout(timeout).into());
                }
                Ok(Err(err)) if err.is_cancelled() => {
                    return Err(LayoutFailure::Cancelled.into());
                }
                Ok(Err(err)) => {
                    let message = format!("layout task panicked: {err}");
                    return Err(LayoutFailure::Engine(message).into());
                }
                Ok(Ok(result)) => result?,
            };

            let transition = LayoutTransition::from_result(&input, result, animation)?;
            debug!(
                crossings = transition.quality().crossings,
                overlaps = transition.quality().overlaps;
                "Layout finished"
            );
            Ok(transition)
        }
    }
}

#[cfg(test)]
mod tests {
    use lineage_core::{geometry::Size, identifier::Id, kind::EntityKind, style::StyleResolver};

    use super::*;
    use crate::{
        builder::GraphBuilder,
        folding::FoldingManager,
        graph::{GraphModel, Node},
        layout::engine::LayoutResult,
        row::Row,
    };

    #[derive(Debug)]
    struct SleepingEngine(Duration);

    impl LayoutEngine for SleepingEngine {
        fn name(&self) -> &'static str {
            "sleeping"
        }

        fn calculate(&self, _input: &LayoutInput) -> Result<LayoutResult, LayoutFailure> {
            std::thread::sleep(self.0);
            Ok(LayoutResult::default())
        }
    }

    #[derive(Debug)]
    struct FailingEngine;

    impl LayoutEngine for FailingEngine {
        fn name(&self) -> &'static str {
            "failing"
        }

        fn calculate(&self, _input: &LayoutInput) -> Result<LayoutResult, LayoutFailure> {
            Err(LayoutFailure::Engine("no layout for you".to_string()))
        }
    }

    fn graph() -> GraphModel {
        GraphBuilder::default()
            .build(&[
                Row::new("Domain1", "SystemA", "Table1"),
                Row::new("Domain2", "SystemB", "Table1"),
            ])
            .unwrap()
    }

    #[tokio::test]
    async fn test_layout_and_commit() {
        let mut graph = graph();
        let folding = FoldingManager::new();

        let transition = LayoutOrchestrator::default()
            .layout(&folding.view(&graph))
            .await
            .unwrap();
        let targets = transition.targets();
        transition.commit(&mut graph, &folding).unwrap();

        for (idx, node) in graph.nodes() {
            assert_eq!(node.geometry(), targets[&idx]);
        }
    }

    #[tokio::test]
    async fn test_timeout_leaves_geometry_untouched() {
        let graph = graph();
        let before: Vec<_> = graph.nodes().map(|(_, n)| n.geometry()).collect();
        let folding = FoldingManager::new();

        let orchestrator = LayoutOrchestrator::new(Arc::new(SleepingEngine(
            Duration::from_millis(200),
        )))
        .with_timeout(Duration::from_millis(10));

        let err = orchestrator.layout(&folding.view(&graph)).await.unwrap_err();
        assert!(matches!(err, LineageError::Layout(LayoutFailure::Timeout(_))));

        let after: Vec<_> = graph.nodes().map(|(_, n)| n.geometry()).collect();
        assert_eq!(before, after);
    }

    #[tokio::test]
    async fn test_engine_failure_is_reported() {
        let graph = graph();
        let folding = FoldingManager::new();

        let err = LayoutOrchestrator::new(Arc::new(FailingEngine))
            .layout(&folding.view(&graph))
            .await
            .unwrap_err();
        assert!(matches!(err, LineageError::Layout(LayoutFailure::Engine(_))));
    }

    #[tokio::test]
    async fn test_incomplete_result_is_rejected() {
        let graph = graph();
        let folding = FoldingManager::new();

        let err = LayoutOrchestrator::new(Arc::new(SleepingEngine(Duration::ZERO)))
            .layout(&folding.view(&graph))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            LineageError::Layout(LayoutFailure::Incomplete(_))
        ));
    }

    #[tokio::test]
    async fn test_graph_changes_after_snapshot_make_commit_stale() {
        let mut graph = graph();
        let folding = FoldingManager::new();
        let pending = LayoutOrchestrator::default().layout(&folding.view(&graph));

        let late = Node::new(
            EntityKind::Domain,
            Id::new("Late"),
            "Late",
            StyleResolver::new().resolve(EntityKind::Domain),
            Size::new(120.0, 60.0),
        );
        graph.add_node(late).unwrap();

        let transition = pending.await.unwrap();
        let err = transition.commit(&mut graph, &folding).unwrap_err();
        assert!(matches!(
            err,
            LineageError::Layout(LayoutFailure::Stale { .. })
        ));
    }

    #[tokio::test]
    async fn test_rerun_on_unchanged_view_is_stable() {
        let mut graph = graph();
        let folding = FoldingManager::new();
        let orchestrator = LayoutOrchestrator::default();

        let first = orchestrator.layout(&folding.view(&graph)).await.unwrap();
        let quality = first.quality();
        first.commit(&mut graph, &folding).unwrap();

        let second = orchestrator.layout(&folding.view(&graph)).await.unwrap();
        assert!(second.is_noop());
        assert!(!second.quality().regresses_from(&quality));
    }
}
