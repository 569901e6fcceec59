//! Arena-backed scene graph
//!
//! Parent and ancestor links are index lookups into a flat arena, never
//! owning pointers: the analysis engine walks up and down the tree without
//! any shared ownership of nodes. Sibling order is the child index order
//! the host reported, which doubles as paint order (lower index paints
//! first).

use crate::scene::node::{NodeType, SceneNode};

/// Index of a node within a [`SceneGraph`] arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
  /// The arena slot this id points at
  pub fn index(self) -> usize {
    self.0 as usize
  }
}

#[derive(Debug, Clone)]
struct NodeEntry {
  node: SceneNode,
  parent: Option<NodeId>,
  children: Vec<NodeId>,
}

/// An immutable-after-build snapshot of the host document tree
///
/// Built once per analysis run; the engine only reads from it.
///
/// # Examples
///
/// ```
/// use tokenlens::{NodeType, SceneGraph, SceneNode};
///
/// let mut graph = SceneGraph::new(SceneNode::new("0:0", NodeType::Page));
/// let page = graph.root();
/// let rect = graph.add_child(page, SceneNode::new("1:1", NodeType::Rectangle));
///
/// assert_eq!(graph.children(page), &[rect]);
/// assert_eq!(graph.parent(rect), Some(page));
/// assert_eq!(graph.sibling_index(rect), Some(0));
/// ```
#[derive(Debug, Clone)]
pub struct SceneGraph {
  nodes: Vec<NodeEntry>,
}

impl SceneGraph {
  /// Creates a graph holding only the given root node
  ///
  /// The root is conventionally the current page; analysis runs are
  /// scoped to one page snapshot.
  pub fn new(root: SceneNode) -> Self {
    Self {
      nodes: vec![NodeEntry {
        node: root,
        parent: None,
        children: Vec::new(),
      }],
    }
  }

  /// The analysis root (the page node)
  pub fn root(&self) -> NodeId {
    NodeId(0)
  }

  /// Appends a node as the last child of `parent`, returning its id
  ///
  /// Children must be appended in the host's paint order.
  pub fn add_child(&mut self, parent: NodeId, node: SceneNode) -> NodeId {
    let id = NodeId(self.nodes.len() as u32);
    self.nodes.push(NodeEntry {
      node,
      parent: Some(parent),
      children: Vec::new(),
    });
    self.nodes[parent.index()].children.push(id);
    id
  }

  /// The node stored at `id`
  pub fn node(&self, id: NodeId) -> &SceneNode {
    &self.nodes[id.index()].node
  }

  /// The parent of `id`, if any
  pub fn parent(&self, id: NodeId) -> Option<NodeId> {
    self.nodes[id.index()].parent
  }

  /// The ordered children of `id`
  pub fn children(&self, id: NodeId) -> &[NodeId] {
    &self.nodes[id.index()].children
  }

  /// The position of `id` among its parent's children
  ///
  /// `None` for the root. This is the node's z-index by the paint-order
  /// convention.
  pub fn sibling_index(&self, id: NodeId) -> Option<usize> {
    let parent = self.parent(id)?;
    self.children(parent).iter().position(|&child| child == id)
  }

  /// Ancestors of `id` from nearest to farthest
  ///
  /// The walk stops at (and excludes) page and document containers: they
  /// frame the analysis, they are not part of any node's compositing
  /// chain.
  pub fn ancestors(&self, id: NodeId) -> Vec<NodeId> {
    let mut out = Vec::new();
    let mut current = id;
    while let Some(parent) = self.parent(current) {
      if self.node(parent).node_type.is_container_root() {
        break;
      }
      out.push(parent);
      current = parent;
    }
    out
  }

  /// Number of nodes in the graph
  pub fn len(&self) -> usize {
    self.nodes.len()
  }

  /// True when the graph holds only the root
  pub fn is_empty(&self) -> bool {
    self.nodes.len() <= 1
  }

  /// Looks up a node by its stable host id
  pub fn find_by_host_id(&self, host_id: &str) -> Option<NodeId> {
    self
      .nodes
      .iter()
      .position(|entry| entry.node.id == host_id)
      .map(|idx| NodeId(idx as u32))
  }
}
