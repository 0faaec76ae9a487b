//! Graph construction from rows.
//!
//! A [`GraphBuilder`] is an ingestion session: it owns the entity registry and
//! the graph under construction, so several batches can be fed through
//! [`GraphBuilder::ingest`] and still share deduplicated nodes.

use std::collections::{HashMap, hash_map::Entry};

use log::{debug, info, trace};
use petgraph::graph::NodeIndex;
use serde::Deserialize;

use lineage_core::style::StyleResolver;

use crate::{
    config::BuilderConfig,
    error::LineageError,
    graph::{GraphModel, Node, Reference},
    registry::{EntityKey, EntityRegistry, Identity},
    row::{self, Row},
};

/// How repeated (system, table) pairs become edges.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgePolicy {
    /// One edge per row.
    #[default]
    Multi,
    /// One edge per pair; repeats raise its multiplicity.
    Collapse,
}

/// What a batch added to the graph.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestSummary {
    pub rows: usize,
    pub nodes_created: usize,
    pub edges_created: usize,
    pub conflicts: usize,
}

/// Builds a [`GraphModel`] from rows, deduplicating entities on the way.
#[derive(Debug)]
pub struct GraphBuilder {
    config: BuilderConfig,
    styles: StyleResolver,
    registry: EntityRegistry,
    graph: GraphModel,
}

impl Default for GraphBuilder {
    fn default() -> Self {
        Self::new(BuilderConfig::default(), StyleResolver::default())
    }
}

impl GraphBuilder {
    pub fn new(config: BuilderConfig, styles: StyleResolver) -> Self {
        Self {
            config,
            styles,
            registry: EntityRegistry::new(),
            graph: GraphModel::new(),
        }
    }

    /// Builds a graph from a single batch of rows.
    ///
    /// # Examples
    ///
    /// ```
    /// use lineage::{GraphBuilder, Row};
    /// use lineage_core::kind::EntityKind;
    ///
    /// let rows = [
    ///     Row::new("Domain1", "SystemA", "Table1"),
    ///     Row::new("Domain1", "SystemA", "Table2"),
    ///     Row::new("Domain2", "SystemB", "Table3"),
    ///     Row::new("Domain2", "SystemB", "Table1"),
    /// ];
    /// let graph = GraphBuilder::default().build(&rows).unwrap();
    ///
    /// assert_eq!(graph.count(EntityKind::Domain), 2);
    /// assert_eq!(graph.count(EntityKind::System), 2);
    /// assert_eq!(graph.count(EntityKind::Table), 3);
    /// assert_eq!(graph.edge_count(), 4);
    /// ```
    pub fn build(mut self, rows: &[Row]) -> Result<GraphModel, LineageError> {
        self.ingest(rows)?;
        Ok(self.graph)
    }

    /// Adds a batch of rows to the session's graph.
    ///
    /// Every row is validated before anything is created. In strict-key mode
    /// the whole batch is also checked for key conflicts up front. On error
    /// the graph and registry are left exactly as they were.
    ///
    /// # Errors
    ///
    /// Returns [`LineageError::Validation`] for the first row with a blank
    /// field, or [`LineageError::DuplicateKeyConflict`] in strict-key mode.
    pub fn ingest(&mut self, rows: &[Row]) -> Result<IngestSummary, LineageError> {
        info!(rows = rows.len(); "Ingesting rows");

        row::validate_all(rows)?;
        if self.config.strict_keys {
            self.check_conflicts(rows)?;
        }

        let nodes_before = self.graph.node_count();
        let edges_before = self.graph.edge_count();
        let conflicts_before = self.registry.conflicts().len();

        for (row_index, row) in rows.iter().enumerate() {
            trace!(row_index = row_index; "Applying row");
            self.apply_row(row)?;
        }

        let summary = IngestSummary {
            rows: rows.len(),
            nodes_created: self.graph.node_count() - nodes_before,
            edges_created: self.graph.edge_count() - edges_before,
            conflicts: self.registry.conflicts().len() - conflicts_before,
        };
        info!(
            nodes_created = summary.nodes_created,
            edges_created = summary.edges_created,
            conflicts = summary.conflicts;
            "Rows ingested"
        );
        Ok(summary)
    }

    pub fn graph(&self) -> &GraphModel {
        &self.graph
    }

    pub(crate) fn graph_mut(&mut self) -> &mut GraphModel {
        &mut self.graph
    }

    pub fn registry(&self) -> &EntityRegistry {
        &self.registry
    }

    pub fn config(&self) -> &BuilderConfig {
        &self.config
    }

    pub fn into_graph(self) -> GraphModel {
        self.graph
    }

    fn check_conflicts(&self, rows: &[Row]) -> Result<(), LineageError> {
        let mut pending: HashMap<EntityKey, Identity> = HashMap::new();

        for row in rows {
            for (key, identity) in row_entities(row) {
                self.registry.check(&key, &identity).map_err(|conflict| {
                    LineageError::DuplicateKeyConflict {
                        key: conflict.key,
                        existing: conflict.existing,
                        requested: conflict.requested,
                    }
                })?;

                match pending.entry(key) {
                    Entry::Occupied(entry) if *entry.get() != identity => {
                        return Err(LineageError::DuplicateKeyConflict {
                            key,
                            existing: entry.get().clone(),
                            requested: identity,
                        });
                    }
                    Entry::Occupied(_) => {}
                    Entry::Vacant(entry) => {
                        entry.insert(identity);
                    }
                }
            }
        }

        debug!(keys = pending.len(); "Strict key check passed");
        Ok(())
    }

    fn apply_row(&mut self, row: &Row) -> Result<(), LineageError> {
        let [
            (domain_key, domain_identity),
            (system_key, system_identity),
            (table_key, table_identity),
        ] = row_entities(row);

        let domain = self.entity(domain_key, domain_identity, &row.domain, None)?;
        let system = self.entity(system_key, system_identity, &row.source_system, Some(domain))?;
        // A table keeps the domain of the row that created it.
        let table = self.entity(table_key, table_identity, &row.table, Some(domain))?;

        self.connect(system, table)
    }

    fn entity(
        &mut self,
        key: EntityKey,
        identity: Identity,
        label: &str,
        parent: Option<NodeIndex>,
    ) -> Result<NodeIndex, LineageError> {
        let Self {
            config,
            styles,
            registry,
            graph,
        } = self;

        registry.get_or_create(key, identity, || {
            let kind = key.kind();
            let node = Node::new(
                kind,
                key.id(),
                label,
                styles.resolve(kind),
                config.sizes.for_kind(kind),
            );
            let node = match parent {
                Some(parent) => node.with_parent(parent),
                None => node,
            };
            graph.add_node(node)
        })
    }

    fn connect(&mut self, system: NodeIndex, table: NodeIndex) -> Result<(), LineageError> {
        if self.config.edge_policy == EdgePolicy::Collapse {
            if let Some(edge) = self.graph.find_edge(system, table) {
                if let Some(reference) = self.graph.reference_mut(edge) {
                    reference.increment();
                }
                return Ok(());
            }
        }

        self.graph.add_edge(system, table, Reference::new())?;
        Ok(())
    }
}

/// Keys and identities a row refers to: domain, system, table.
fn row_entities(row: &Row) -> [(EntityKey, Identity); 3] {
    [
        (EntityKey::domain(&row.domain), Identity::global(&row.domain)),
        (
            EntityKey::system(&row.domain, &row.source_system),
            Identity::scoped(&row.source_system, &row.domain),
        ),
        (EntityKey::table(&row.table), Identity::global(&row.table)),
    ]
}
