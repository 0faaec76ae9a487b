//! Lineage Core Types and Definitions
//!
//! This crate provides the foundational types shared by the lineage diagram
//! crates. It includes:
//!
//! - **Identifiers**: String-interned entity keys ([`identifier::Id`])
//! - **Colors**: CSS color handling ([`color::Color`])
//! - **Geometry**: Points, sizes, bounds and insets ([`geometry`] module)
//! - **Kinds**: The three entity kinds of a lineage diagram ([`kind::EntityKind`])
//! - **Style**: The per-kind style resolver ([`style::StyleResolver`])
//! - **Draw**: Node glyphs and layered SVG output ([`draw`] module)

pub mod color;
pub mod draw;
pub mod geometry;
pub mod identifier;
pub mod kind;
pub mod style;
