//! Scene graph provider interface
//!
//! The host environment supplies the document snapshot, the current
//! selection, the document color profile, and lookup capabilities for
//! shared styles and main components. Injecting this as a trait keeps the
//! engine testable against synthetic trees with no host attached.
//!
//! Style and main-component lookups are the analysis run's only
//! suspension points; they are fallible because the host can fail them
//! mid-run, and the extractors must degrade per node rather than abort.

use crate::color::ColorSpace;
use crate::error::SceneError;
use crate::scene::graph::{NodeId, SceneGraph};
use crate::scene::node::SceneNode;
use rustc_hash::FxHashMap;
use serde::Serialize;

/// A shared style resolved by id
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleRef {
  /// Stable style identifier
  pub id: String,
  /// Style display name
  pub name: String,
}

impl StyleRef {
  /// Creates a style reference
  pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
    Self {
      id: id.into(),
      name: name.into(),
    }
  }
}

/// A main component resolved for an instance node
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentRef {
  /// Stable component identifier
  pub id: String,
  /// Component display name
  pub name: String,
}

impl ComponentRef {
  /// Creates a component reference
  pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
    Self {
      id: id.into(),
      name: name.into(),
    }
  }
}

/// Capabilities the host must supply for an analysis run
///
/// The graph gives children-of and all structural access; the remaining
/// methods cover selection, color profile, and the two id lookups.
pub trait SceneGraphProvider {
  /// The document snapshot rooted at the current page
  fn graph(&self) -> &SceneGraph;

  /// The currently selected nodes, in host selection order
  fn current_selection(&self) -> Vec<NodeId>;

  /// The document-level color profile tag
  fn color_profile(&self) -> ColorSpace;

  /// Resolves a shared style by id
  ///
  /// `Ok(None)` means the id does not name a style in this document;
  /// `Err` means the lookup itself failed.
  fn style_by_id(&self, style_id: &str) -> Result<Option<StyleRef>, SceneError>;

  /// Resolves the main component backing an instance node
  fn main_component_of(&self, instance: NodeId) -> Result<Option<ComponentRef>, SceneError>;
}

/// A provider backed entirely by in-memory tables
///
/// Used by tests and by embeddings that assemble a snapshot up front.
///
/// # Examples
///
/// ```
/// use tokenlens::{ColorSpace, InMemoryProvider, NodeType, SceneGraph, SceneGraphProvider, SceneNode};
///
/// let graph = SceneGraph::new(SceneNode::new("0:0", NodeType::Page));
/// let provider = InMemoryProvider::new(graph);
/// assert_eq!(provider.color_profile(), ColorSpace::Srgb);
/// assert!(provider.current_selection().is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct InMemoryProvider {
  graph: SceneGraph,
  selection: Vec<NodeId>,
  color_profile: ColorSpace,
  styles: FxHashMap<String, StyleRef>,
  components: FxHashMap<String, ComponentRef>,
}

impl InMemoryProvider {
  /// Creates a provider over `graph` with an empty selection, sRGB
  /// profile, and no registered styles or components
  pub fn new(graph: SceneGraph) -> Self {
    Self {
      graph,
      selection: Vec::new(),
      color_profile: ColorSpace::Srgb,
      styles: FxHashMap::default(),
      components: FxHashMap::default(),
    }
  }

  /// Sets the current selection
  pub fn with_selection(mut self, selection: Vec<NodeId>) -> Self {
    self.selection = selection;
    self
  }

  /// Sets the document color profile
  pub fn with_color_profile(mut self, color_profile: ColorSpace) -> Self {
    self.color_profile = color_profile;
    self
  }

  /// Registers a shared style for lookup
  pub fn with_style(mut self, style: StyleRef) -> Self {
    self.styles.insert(style.id.clone(), style);
    self
  }

  /// Registers a main component for lookup
  pub fn with_component(mut self, component: ComponentRef) -> Self {
    self.components.insert(component.id.clone(), component);
    self
  }

  fn node(&self, id: NodeId) -> &SceneNode {
    self.graph.node(id)
  }
}

impl SceneGraphProvider for InMemoryProvider {
  fn graph(&self) -> &SceneGraph {
    &self.graph
  }

  fn current_selection(&self) -> Vec<NodeId> {
    self.selection.clone()
  }

  fn color_profile(&self) -> ColorSpace {
    self.color_profile
  }

  fn style_by_id(&self, style_id: &str) -> Result<Option<StyleRef>, SceneError> {
    Ok(self.styles.get(style_id).cloned())
  }

  fn main_component_of(&self, instance: NodeId) -> Result<Option<ComponentRef>, SceneError> {
    let Some(component_id) = self.node(instance).main_component_id.as_deref() else {
      return Ok(None);
    };
    Ok(self.components.get(component_id).cloned())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::scene::node::NodeType;

  #[test]
  fn style_lookup_misses_are_not_errors() {
    let graph = SceneGraph::new(SceneNode::new("page", NodeType::Page));
    let provider = InMemoryProvider::new(graph).with_style(StyleRef::new("S:1", "Brand/Red"));

    assert_eq!(
      provider.style_by_id("S:1").unwrap(),
      Some(StyleRef::new("S:1", "Brand/Red"))
    );
    assert_eq!(provider.style_by_id("S:404").unwrap(), None);
  }

  #[test]
  fn main_component_resolution_uses_the_instance_link() {
    let mut graph = SceneGraph::new(SceneNode::new("page", NodeType::Page));
    let instance = graph.add_child(
      graph.root(),
      SceneNode::new("inst", NodeType::Instance).with_main_component_id("C:9"),
    );
    let plain = graph.add_child(graph.root(), SceneNode::new("rect", NodeType::Rectangle));

    let provider = InMemoryProvider::new(graph).with_component(ComponentRef::new("C:9", "Button"));

    assert_eq!(
      provider.main_component_of(instance).unwrap(),
      Some(ComponentRef::new("C:9", "Button"))
    );
    assert_eq!(provider.main_component_of(plain).unwrap(), None);
  }
}
