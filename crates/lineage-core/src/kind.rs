//! Entity kinds of a lineage diagram.

use std::{fmt, str::FromStr};

use log::trace;

/// The three levels of the lineage hierarchy.
///
/// Domains are group nodes; systems and tables are leaves placed inside a
/// domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntityKind {
    Domain,
    System,
    Table,
}

impl EntityKind {
    /// Returns true for kinds that may contain other nodes.
    pub fn is_group(self) -> bool {
        matches!(self, Self::Domain)
    }

    /// Lowercase name used in keys, logs and SVG class attributes.
    pub fn name(self) -> &'static str {
        match self {
            Self::Domain => "domain",
            Self::System => "system",
            Self::Table => "table",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for EntityKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "domain" => Ok(Self::Domain),
            "system" => Ok(Self::System),
            "table" => Ok(Self::Table),
            other => Err(format!("unknown entity kind `{other}`")),
        }
    }
}

/// Style lookup key.
///
/// Unlike [`EntityKind`], every string maps to a style kind: anything that is
/// not a known entity kind resolves to [`StyleKind::Default`].
///
/// # Examples
///
/// ```
/// use lineage_core::kind::StyleKind;
///
/// assert_eq!(StyleKind::from("table"), StyleKind::Table);
/// assert_eq!(StyleKind::from("view"), StyleKind::Default);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StyleKind {
    Domain,
    System,
    Table,
    Default,
}

impl From<EntityKind> for StyleKind {
    fn from(kind: EntityKind) -> Self {
        match kind {
            EntityKind::Domain => Self::Domain,
            EntityKind::System => Self::System,
            EntityKind::Table => Self::Table,
        }
    }
}

impl From<&str> for StyleKind {
    fn from(name: &str) -> Self {
        name.parse::<EntityKind>()
            .map(Self::from)
            .unwrap_or_else(|_| {
                trace!(name; "Unknown style kind, using default");
                Self::Default
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_domain_is_group() {
        assert!(EntityKind::Domain.is_group());
        assert!(!EntityKind::System.is_group());
        assert!(!EntityKind::Table.is_group());
    }

    #[test]
    fn test_parse_roundtrip_names() {
        for kind in [EntityKind::Domain, EntityKind::System, EntityKind::Table] {
            assert_eq!(kind.name().parse::<EntityKind>(), Ok(kind));
        }
        assert!("Domain".parse::<EntityKind>().is_err());
    }

    #[test]
    fn test_style_kind_is_total() {
        assert_eq!(StyleKind::from("domain"), StyleKind::Domain);
        assert_eq!(StyleKind::from("system"), StyleKind::System);
        assert_eq!(StyleKind::from(""), StyleKind::Default);
        assert_eq!(StyleKind::from("warehouse"), StyleKind::Default);
    }
}
