//! Scene-graph design token and contrast analysis
//!
//! Two pipelines over a host document's scene graph:
//!
//! - **Selection analysis** resolves the effective background behind each
//!   selected node under layer ordering, visibility, opacity, and blend
//!   mode rules, producing foreground/background contrast pairs or a
//!   notice when resolution is impossible.
//! - **Document extraction** walks the whole document and aggregates
//!   design tokens (colors, typography, effects, spacing, corner radii,
//!   layout grids, components) into frequency-ranked unique lists, and
//!   flags low-contrast text along the way using the APCA perceptual
//!   contrast model.
//!
//! The engine is host-agnostic: documents come in through the
//! [`SceneGraphProvider`] trait, and [`InMemoryProvider`] backs tests and
//! embedders that already hold a snapshot.

pub mod analyzer;
pub mod background;
pub mod color;
pub mod error;
pub mod extract;
pub mod geometry;
pub mod scene;

pub use analyzer::{Analyzer, DocumentPayload};
pub use background::{MaterializedNode, MaterializedPaint, SelectionMessage, SelectionPayload};
pub use color::apca::{apca_contrast, conclusion_for_score};
pub use color::{ColorSpace, Oklch, Rgb, Rgba};
pub use error::{Error, Result};
pub use extract::{extract_document, DocumentTokens};
pub use geometry::{Point, Rect, Size};
pub use scene::provider::{ComponentRef, InMemoryProvider, SceneGraphProvider, StyleRef};
pub use scene::{BlendMode, NodeId, NodeType, Paint, SceneGraph, SceneNode, SolidPaint};
