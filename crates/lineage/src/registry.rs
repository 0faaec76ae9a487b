//! Entity registry: deduplicates domains, systems and tables during ingestion.
//!
//! The registry maps an [`EntityKey`] to the graph node created for it. It is
//! write-once per key: the first lookup runs the creation callback, every later
//! lookup returns the cached handle without side effects.
//!
//! Each key also remembers the [`Identity`] it was created for. Keys are built
//! by string concatenation, so two different entities can derive the same key
//! (domain `a-b` with system `c`, and domain `a` with system `b-c`). Such
//! collisions are recorded as [`KeyConflict`]s.

use std::fmt;

use indexmap::IndexMap;
use log::{trace, warn};
use petgraph::graph::NodeIndex;

use lineage_core::{identifier::Id, kind::EntityKind};

const SYSTEM_KEY_SEPARATOR: &str = "-";

/// Deterministic key of a logical entity, tagged with its kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntityKey {
    kind: EntityKind,
    id: Id,
}

impl EntityKey {
    /// Key of a domain: the domain name.
    pub fn domain(domain: &str) -> Self {
        Self {
            kind: EntityKind::Domain,
            id: Id::new(domain),
        }
    }

    /// Key of a system: `domain-system`.
    ///
    /// # Examples
    ///
    /// ```
    /// use lineage::registry::EntityKey;
    ///
    /// let key = EntityKey::system("Domain1", "SystemA");
    /// assert_eq!(key.id(), "Domain1-SystemA");
    /// ```
    pub fn system(domain: &str, system: &str) -> Self {
        Self {
            kind: EntityKind::System,
            id: Id::new(domain).join(Id::new(system), SYSTEM_KEY_SEPARATOR),
        }
    }

    /// Key of a table: the table name, shared across domains.
    pub fn table(table: &str) -> Self {
        Self {
            kind: EntityKind::Table,
            id: Id::new(table),
        }
    }

    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    pub fn id(&self) -> Id {
        self.id
    }
}

impl fmt::Display for EntityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.id)
    }
}

/// What a key was meant to denote: a label within an optional scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    label: String,
    scope: Option<String>,
}

impl Identity {
    /// An entity identified by its label alone.
    pub fn global(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            scope: None,
        }
    }

    /// An entity identified by its label inside `scope`.
    pub fn scoped(label: impl Into<String>, scope: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            scope: Some(scope.into()),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn scope(&self) -> Option<&str> {
        self.scope.as_deref()
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.scope {
            Some(scope) => write!(f, "`{}` in `{}`", self.label, scope),
            None => write!(f, "`{}`", self.label),
        }
    }
}

/// Same key requested for a different identity than the one that created it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyConflict {
    pub key: EntityKey,
    pub existing: Identity,
    pub requested: Identity,
}

#[derive(Debug, Clone)]
struct Entry {
    node: NodeIndex,
    identity: Identity,
}

/// Key → node mapping owned by one ingestion session.
#[derive(Debug, Default)]
pub struct EntityRegistry {
    entries: IndexMap<EntityKey, Entry>,
    conflicts: Vec<KeyConflict>,
}

impl EntityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the node for `key`, creating it with `create` on first use.
    ///
    /// `create` runs at most once per key. If it fails, nothing is stored and
    /// the error is returned. A hit whose `identity` differs from the stored
    /// one is recorded as a [`KeyConflict`] and still returns the cached node.
    ///
    /// # Examples
    ///
    /// ```
    /// use lineage::registry::{EntityKey, EntityRegistry, Identity};
    /// use petgraph::graph::NodeIndex;
    ///
    /// let mut registry = EntityRegistry::new();
    /// let key = EntityKey::table("Table1");
    ///
    /// let first = registry
    ///     .get_or_create(key, Identity::global("Table1"), || Ok::<_, ()>(NodeIndex::new(0)))
    ///     .unwrap();
    /// let second = registry
    ///     .get_or_create(key, Identity::global("Table1"), || -> Result<NodeIndex, ()> {
    ///         unreachable!()
    ///     })
    ///     .unwrap();
    /// assert_eq!(first, second);
    /// ```
    pub fn get_or_create<E>(
        &mut self,
        key: EntityKey,
        identity: Identity,
        create: impl FnOnce() -> Result<NodeIndex, E>,
    ) -> Result<NodeIndex, E> {
        if let Some(entry) = self.entries.get(&key) {
            if entry.identity != identity {
                let conflict = KeyConflict {
                    key,
                    existing: entry.identity.clone(),
                    requested: identity,
                };
                warn!(
                    key = key.to_string(),
                    existing = conflict.existing.to_string(),
                    requested = conflict.requested.to_string();
                    "Entity key reused for a different identity"
                );
                let node = entry.node;
                self.conflicts.push(conflict);
                return Ok(node);
            }
            return Ok(entry.node);
        }

        let node = create()?;
        trace!(key = key.to_string(), node = node.index(); "Registered entity");
        self.entries.insert(key, Entry { node, identity });
        Ok(node)
    }

    /// Looks up the node registered for `key`.
    pub fn get(&self, key: &EntityKey) -> Option<NodeIndex> {
        self.entries.get(key).map(|entry| entry.node)
    }

    /// Reports whether `identity` may use `key` without a conflict.
    ///
    /// Unknown keys never conflict.
    pub fn check(&self, key: &EntityKey, identity: &Identity) -> Result<(), KeyConflict> {
        match self.entries.get(key) {
            Some(entry) if &entry.identity != identity => Err(KeyConflict {
                key: *key,
                existing: entry.identity.clone(),
                requested: identity.clone(),
            }),
            _ => Ok(()),
        }
    }

    /// Conflicts observed so far, in the order they happened.
    pub fn conflicts(&self) -> &[KeyConflict] {
        &self.conflicts
    }

    /// Number of registered keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of registered keys of `kind`.
    pub fn count(&self, kind: EntityKind) -> usize {
        self.entries.keys().filter(|key| key.kind == kind).count()
    }

    /// Registered keys and nodes in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (EntityKey, NodeIndex)> + '_ {
        self.entries.iter().map(|(key, entry)| (*key, entry.node))
    }
}
