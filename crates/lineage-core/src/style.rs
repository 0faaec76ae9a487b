//! Per-kind visual styles.
//!
//! The [`StyleResolver`] maps a [`StyleKind`] to a [`StyleDescriptor`]. The
//! mapping is total and deterministic: every kind, including
//! [`StyleKind::Default`], has exactly one descriptor, and resolving the same
//! kind twice yields equal descriptors.

use log::debug;

use crate::{color::Color, kind::StyleKind};

/// Fill and stroke colors attached to a node when it is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StyleDescriptor {
    fill: Color,
    stroke: Color,
}

impl StyleDescriptor {
    pub fn new(fill: Color, stroke: Color) -> Self {
        Self { fill, stroke }
    }

    pub fn fill(&self) -> Color {
        self.fill
    }

    pub fn stroke(&self) -> Color {
        self.stroke
    }
}

fn named(fill: &str, stroke: &str) -> StyleDescriptor {
    StyleDescriptor::new(
        Color::new(fill).expect("built-in palette colors are valid"),
        Color::new(stroke).expect("built-in palette colors are valid"),
    )
}

/// Resolves the style descriptor for each kind of node.
///
/// # Examples
///
/// ```
/// use lineage_core::{color::Color, kind::StyleKind, style::StyleResolver};
///
/// let resolver = StyleResolver::default();
/// let table = resolver.resolve(StyleKind::Table);
/// assert_eq!(table.fill(), Color::new("lightyellow").unwrap());
///
/// // Unknown kinds fall back to the default descriptor.
/// assert_eq!(resolver.resolve("view"), resolver.resolve(StyleKind::Default));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct StyleResolver {
    domain: StyleDescriptor,
    system: StyleDescriptor,
    table: StyleDescriptor,
    fallback: StyleDescriptor,
}

impl Default for StyleResolver {
    fn default() -> Self {
        Self {
            domain: named("lightblue", "blue"),
            system: named("lightgreen", "green"),
            table: named("lightyellow", "orange"),
            fallback: named("gray", "black"),
        }
    }
}

impl StyleResolver {
    /// Creates a resolver with the built-in palette.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the descriptor used for `kind`.
    pub fn with_style(mut self, kind: StyleKind, descriptor: StyleDescriptor) -> Self {
        debug!(kind:?, fill = descriptor.fill().to_string(); "Overriding style");
        *self.slot_mut(kind) = descriptor;
        self
    }

    /// Returns the descriptor for `kind`.
    pub fn resolve(&self, kind: impl Into<StyleKind>) -> StyleDescriptor {
        match kind.into() {
            StyleKind::Domain => self.domain,
            StyleKind::System => self.system,
            StyleKind::Table => self.table,
            StyleKind::Default => self.fallback,
        }
    }

    fn slot_mut(&mut self, kind: StyleKind) -> &mut StyleDescriptor {
        match kind {
            StyleKind::Domain => &mut self.domain,
            StyleKind::System => &mut self.system,
            StyleKind::Table => &mut self.table,
            StyleKind::Default => &mut self.fallback,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kind::EntityKind;

    #[test]
    fn test_builtin_palette() {
        let resolver = StyleResolver::new();

        let domain = resolver.resolve(EntityKind::Domain);
        assert_eq!(domain.fill(), Color::new("lightblue").unwrap());
        assert_eq!(domain.stroke(), Color::new("blue").unwrap());

        let system = resolver.resolve(EntityKind::System);
        assert_eq!(system.fill(), Color::new("lightgreen").unwrap());
        assert_eq!(system.stroke(), Color::new("green").unwrap());

        let fallback = resolver.resolve(StyleKind::Default);
        assert_eq!(fallback.fill(), Color::new("gray").unwrap());
        assert_eq!(fallback.stroke(), Color::new("black").unwrap());
    }

    #[test]
    fn test_resolve_is_deterministic() {
        let resolver = StyleResolver::new();
        assert_eq!(resolver.resolve("table"), resolver.resolve("table"));
        assert_eq!(
            resolver.resolve("table"),
            resolver.resolve(EntityKind::Table)
        );
    }

    #[test]
    fn test_unknown_kind_uses_default() {
        let resolver = StyleResolver::new();
        let fallback = resolver.resolve(StyleKind::Default);

        assert_eq!(resolver.resolve("unknown"), fallback);
        assert_eq!(resolver.resolve(""), fallback);
    }

    #[test]
    fn test_with_style_overrides_single_kind() {
        let red = named("mistyrose", "red");
        let resolver = StyleResolver::new().with_style(StyleKind::System, red);

        assert_eq!(resolver.resolve(EntityKind::System), red);
        assert_eq!(
            resolver.resolve(EntityKind::Table),
            StyleResolver::new().resolve(EntityKind::Table)
        );
    }
}
