//! Configuration types.
//!
//! These are plain serde structures; reading them from disk is left to the
//! caller (the CLI loads them from TOML). Every section and field has a
//! default, so an empty document is a valid configuration.

use std::time::Duration;

use serde::Deserialize;

use lineage_core::{
    color::Color,
    geometry::Size,
    kind::{EntityKind, StyleKind},
    style::{StyleDescriptor, StyleResolver},
};

use crate::{builder::EdgePolicy, error::LineageError};

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Layout configuration section
    #[serde(default)]
    pub layout: LayoutConfig,

    /// Palette overrides
    #[serde(default)]
    pub style: StyleConfig,

    /// Graph construction options
    #[serde(default)]
    pub builder: BuilderConfig,
}

/// Graph construction options
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct BuilderConfig {
    /// How repeated (system, table) pairs are turned into edges
    pub edge_policy: EdgePolicy,

    /// Fail a batch on entity key conflicts instead of only reporting them
    pub strict_keys: bool,

    /// Placeholder node sizes
    pub sizes: SizeConfig,
}

/// Placeholder size of each node kind before layout.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct SizeConfig {
    pub domain: Size,
    pub system: Size,
    pub table: Size,
}

impl SizeConfig {
    pub fn for_kind(&self, kind: EntityKind) -> Size {
        match kind {
            EntityKind::Domain => self.domain,
            EntityKind::System => self.system,
            EntityKind::Table => self.table,
        }
    }
}

impl Default for SizeConfig {
    fn default() -> Self {
        Self {
            domain: Size::new(120.0, 60.0),
            system: Size::new(100.0, 50.0),
            table: Size::new(60.0, 30.0),
        }
    }
}

/// Layout configuration section
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Grid all coordinates snap to
    pub grid_size: f32,

    /// Gap between adjacent layers
    pub h_spacing: f32,

    /// Gap between nodes of the same layer
    pub v_spacing: f32,

    /// Padding between a group's border and its content
    pub group_padding: f32,

    /// Height of the label band at the top of a group
    pub header_height: f32,

    /// Minimum horizontal run of a routed edge next to a node
    pub clearance: f32,

    /// Upper bound for one layout run, in milliseconds
    pub timeout_ms: u64,

    /// Duration of the animated transition, in milliseconds
    pub animation_ms: u64,
}

impl LayoutConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn animation(&self) -> Duration {
        Duration::from_millis(self.animation_ms)
    }
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            grid_size: 10.0,
            h_spacing: 80.0,
            v_spacing: 20.0,
            group_padding: 20.0,
            header_height: 24.0,
            clearance: 20.0,
            timeout_ms: 5_000,
            animation_ms: 300,
        }
    }
}

/// Fill and stroke written as CSS color strings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PaletteEntry {
    pub fill: String,
    pub stroke: String,
}

impl PaletteEntry {
    fn to_descriptor(&self) -> Result<StyleDescriptor, LineageError> {
        let parse = |value: &str| {
            Color::new(value).map_err(|err| LineageError::Config(err.to_string()))
        };
        Ok(StyleDescriptor::new(
            parse(&self.fill)?,
            parse(&self.stroke)?,
        ))
    }
}

/// Palette overrides; kinds left out keep the built-in colors.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StyleConfig {
    pub domain: Option<PaletteEntry>,
    pub system: Option<PaletteEntry>,
    pub table: Option<PaletteEntry>,
    pub default: Option<PaletteEntry>,
}

impl StyleConfig {
    /// Builds a resolver from the built-in palette and these overrides.
    ///
    /// # Errors
    ///
    /// Returns [`LineageError::Config`] when a color string does not parse.
    pub fn resolver(&self) -> Result<StyleResolver, LineageError> {
        let overrides = [
            (StyleKind::Domain, &self.domain),
            (StyleKind::System, &self.system),
            (StyleKind::Table, &self.table),
            (StyleKind::Default, &self.default),
        ];

        overrides
            .into_iter()
            .try_fold(StyleResolver::new(), |resolver, (kind, entry)| match entry {
                Some(entry) => Ok(resolver.with_style(kind, entry.to_descriptor()?)),
                None => Ok(resolver),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_uses_defaults() {
        let config: AppConfig = toml::from_str("").unwrap();

        assert_eq!(config.layout, LayoutConfig::default());
        assert_eq!(config.builder.edge_policy, EdgePolicy::Multi);
        assert!(!config.builder.strict_keys);
        assert_eq!(config.builder.sizes.table, Size::new(60.0, 30.0));
    }

    #[test]
    fn test_partial_sections() {
        let config: AppConfig = toml::from_str(
            r#"
            [layout]
            grid_size = 5.0
            timeout_ms = 250

            [builder]
            edge_policy = "collapse"
            strict_keys = true

            [builder.sizes.system]
            width = 140.0
            height = 40.0
            "#,
        )
        .unwrap();

        assert_eq!(config.layout.grid_size, 5.0);
        assert_eq!(config.layout.timeout(), Duration::from_millis(250));
        assert_eq!(config.layout.h_spacing, LayoutConfig::default().h_spacing);
        assert_eq!(config.builder.edge_policy, EdgePolicy::Collapse);
        assert!(config.builder.strict_keys);
        assert_eq!(config.builder.sizes.system, Size::new(140.0, 40.0));
        assert_eq!(config.builder.sizes.domain, Size::new(120.0, 60.0));
    }

    #[test]
    fn test_style_overrides() {
        let config: AppConfig = toml::from_str(
            r##"
            [style.table]
            fill = "white"
            stroke = "#333333"
            "##,
        )
        .unwrap();

        let resolver = config.style.resolver().unwrap();
        let table = resolver.resolve(StyleKind::Table);
        assert_eq!(table.fill(), Color::new("white").unwrap());
        assert_eq!(
            resolver.resolve(StyleKind::Domain),
            StyleResolver::new().resolve(StyleKind::Domain)
        );
    }

    #[test]
    fn test_invalid_color_is_config_error() {
        let style = StyleConfig {
            system: Some(PaletteEntry {
                fill: "no-such-color".to_string(),
                stroke: "black".to_string(),
            }),
            ..StyleConfig::default()
        };

        assert!(matches!(style.resolver(), Err(LineageError::Config(_))));
    }
}
