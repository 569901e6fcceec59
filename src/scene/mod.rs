//! Scene graph model
//!
//! The host-facing document model: typed nodes, the arena graph that
//! holds them, and the provider trait the engine is injected with.

pub mod graph;
pub mod node;
pub mod provider;

pub use graph::{NodeId, SceneGraph};
pub use node::{
  AutoLayoutSpacing, BlendMode, BlurEffect, CornerRadius, Effect, FontName, GridPattern,
  LayoutGrid, NodeType, Paint, PaintAttrs, SceneNode, ShadowEffect, SolidPaint, TextCase,
  TextDecoration, TypeMetric, TypeStyle,
};
pub use provider::{ComponentRef, InMemoryProvider, SceneGraphProvider, StyleRef};
