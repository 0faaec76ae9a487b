//! Domain / system / table lineage diagrams.
//!
//! Rows go through an [`EntityRegistry`](registry::EntityRegistry) into a
//! [`GraphBuilder`], which produces a [`GraphModel`] with domain groups,
//! system and table leaves and system → table references. A
//! [`FoldingManager`] collapses domains without touching the model, the
//! [`LayoutOrchestrator`] arranges the visible projection asynchronously and
//! [`export::svg`] renders it.
//!
//! [`Diagram`] bundles those pieces into one session.

pub mod builder;
pub mod config;
pub mod error;
pub mod export;
pub mod folding;
pub mod graph;
pub mod layout;
pub mod registry;
pub mod row;

use indexmap::IndexMap;
use log::{debug, info};
use petgraph::graph::NodeIndex;

use lineage_core::{geometry::Bounds, kind::EntityKind};

pub use builder::{EdgePolicy, GraphBuilder, IngestSummary};
pub use config::AppConfig;
pub use error::{LayoutFailure, LineageError};
pub use folding::{FoldingManager, FoldingView};
pub use graph::GraphModel;
pub use layout::{LayoutOrchestrator, LayoutQuality, LayoutTransition};
pub use row::Row;

use export::{
    Exporter,
    svg::{Svg, VisualCache},
};

/// A diagram session: ingestion, folding, layout and rendering over one graph.
#[derive(Debug)]
pub struct Diagram {
    builder: GraphBuilder,
    folding: FoldingManager,
    orchestrator: LayoutOrchestrator,
    renderer: Svg,
}

impl Default for Diagram {
    fn default() -> Self {
        Self {
            builder: GraphBuilder::default(),
            folding: FoldingManager::new(),
            orchestrator: LayoutOrchestrator::default(),
            renderer: Svg::default(),
        }
    }
}

impl Diagram {
    /// Creates an empty session configured by `config`.
    ///
    /// # Errors
    ///
    /// Returns [`LineageError::Config`] when the palette holds an invalid color.
    pub fn new(config: &AppConfig) -> Result<Self, LineageError> {
        let styles = config.style.resolver()?;
        Ok(Self {
            builder: GraphBuilder::new(config.builder.clone(), styles),
            folding: FoldingManager::new(),
            orchestrator: LayoutOrchestrator::from_config(&config.layout),
            renderer: Svg::from_config(&config.layout),
        })
    }

    pub fn with_orchestrator(mut self, orchestrator: LayoutOrchestrator) -> Self {
        self.orchestrator = orchestrator;
        self
    }

    /// Adds a batch of rows. See [`GraphBuilder::ingest`].
    pub fn ingest(&mut self, rows: &[Row]) -> Result<IngestSummary, LineageError> {
        self.builder.ingest(rows)
    }

    pub fn graph(&self) -> &GraphModel {
        self.builder.graph()
    }

    pub fn builder(&self) -> &GraphBuilder {
        &self.builder
    }

    pub fn folding(&self) -> &FoldingManager {
        &self.folding
    }

    /// Current visible projection.
    pub fn view(&self) -> FoldingView<'_> {
        self.folding.view(self.builder.graph())
    }

    /// Looks up a domain group by name.
    ///
    /// # Errors
    ///
    /// Returns [`LineageError::Folding`] when no such domain exists.
    pub fn domain(&self, name: &str) -> Result<NodeIndex, LineageError> {
        self.graph()
            .find(EntityKind::Domain, name)
            .ok_or_else(|| LineageError::Folding(format!("unknown domain `{name}`")))
    }

    /// Collapses the named domain. Returns false when it already was.
    pub fn collapse_domain(&mut self, name: &str) -> Result<bool, LineageError> {
        let node = self.domain(name)?;
        self.folding.collapse(self.builder.graph(), node)
    }

    /// Expands the named domain. Returns false when it already was.
    pub fn expand_domain(&mut self, name: &str) -> Result<bool, LineageError> {
        let node = self.domain(name)?;
        self.folding.expand(self.builder.graph(), node)
    }

    /// Flips the named domain, returning true when it is now collapsed.
    pub fn toggle_domain(&mut self, name: &str) -> Result<bool, LineageError> {
        let node = self.domain(name)?;
        self.folding.toggle(self.builder.graph(), node)
    }

    pub fn collapse_all(&mut self) {
        self.folding.collapse_all(self.builder.graph());
    }

    pub fn expand_all(&mut self) {
        self.folding.expand_all();
    }

    /// Nodes whose label contains `query`, ignoring case.
    pub fn search(&self, query: &str) -> Vec<NodeIndex> {
        self.graph().search(query)
    }

    /// Starts a layout of the current view. See [`LayoutOrchestrator::layout`].
    pub fn layout(
        &self,
    ) -> impl Future<Output = Result<LayoutTransition, LineageError>> + Send + 'static + use<> {
        self.orchestrator.layout(&self.view())
    }

    /// Applies a finished layout to the graph.
    pub fn commit(&mut self, transition: LayoutTransition) -> Result<(), LineageError> {
        transition.commit(self.builder.graph_mut(), &self.folding)
    }

    /// Lays out the current view and commits the result.
    pub async fn relayout(&mut self) -> Result<LayoutQuality, LineageError> {
        let transition = self.layout().await?;
        let quality = transition.quality();
        self.commit(transition)?;
        info!(
            crossings = quality.crossings,
            overlaps = quality.overlaps;
            "Diagram laid out"
        );
        Ok(quality)
    }

    /// Renders the current view with the committed geometry.
    pub fn render_svg(&self) -> svg::Document {
        self.renderer.render(&self.view())
    }

    /// Renders one animation frame of the current view.
    pub fn render_frame(
        &self,
        frame: &IndexMap<NodeIndex, Bounds>,
        cache: &mut VisualCache,
    ) -> svg::Document {
        debug!(nodes = frame.len(); "Rendering frame");
        self.renderer.render_frame(&self.view(), frame, cache)
    }

    pub fn export(&self, exporter: &impl Exporter) -> Result<(), LineageError> {
        exporter.export_view(&self.view())
    }
}
