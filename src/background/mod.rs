//! Background resolution for selected nodes
//!
//! Given a selection, this module determines the set of nodes visually
//! beneath each selected node (by geometric containment and sibling /
//! ancestor z-order) and decides whether a valid, blend-mode-safe, opaque
//! solid background exists behind it.
//!
//! # Paint Order Model
//!
//! Sibling order is paint order: lower child index paints first, so a
//! node's background candidates among its siblings are the prefix up to
//! and including its own index. Within the assembled intersection tree,
//! occlusion ranking is depth-first: a deeply nested, fully opaque
//! descendant occludes its ancestors' own fills, so deeper nodes are
//! checked first, with higher sibling index breaking ties at equal depth.

use crate::color::{ColorSpace, Oklch, Rgb};
use crate::scene::{
  BlendMode, NodeId, Paint, PaintAttrs, SceneGraph, SceneGraphProvider, SceneNode,
};
use serde::Serialize;

/// A solid paint enriched with hex and perceptual coordinates
///
/// The host UI consumes both encodings directly, so they are computed
/// once at materialization time.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichedSolidPaint {
  /// Normalized fill color
  pub color: Rgb,
  /// Paint-level opacity
  #[serde(skip_serializing_if = "Option::is_none")]
  pub opacity: Option<f32>,
  /// Paint visibility toggle
  pub visible: bool,
  /// Paint-level blend mode
  #[serde(skip_serializing_if = "Option::is_none")]
  pub blend_mode: Option<BlendMode>,
  /// Lowercase `#rrggbb` encoding of the color
  pub hex: String,
  /// OKLCH perceptual coordinate of the color
  pub oklch: Oklch,
}

/// A paint on a materialized node
///
/// Solid paints are enriched; everything else passes through untouched
/// and is treated as "not solid" by background validity checks.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MaterializedPaint {
  Solid(EnrichedSolidPaint),
  Gradient(PaintAttrs),
  Image(PaintAttrs),
  Video(PaintAttrs),
}

impl MaterializedPaint {
  fn from_paint(paint: &Paint) -> Self {
    match paint {
      Paint::Solid(solid) => MaterializedPaint::Solid(EnrichedSolidPaint {
        color: solid.color,
        opacity: solid.opacity,
        visible: solid.visible,
        blend_mode: solid.blend_mode,
        hex: solid.color.to_hex(),
        oklch: solid.color.to_oklch(),
      }),
      Paint::Gradient(attrs) => MaterializedPaint::Gradient(*attrs),
      Paint::Image(attrs) => MaterializedPaint::Image(*attrs),
      Paint::Video(attrs) => MaterializedPaint::Video(*attrs),
    }
  }

  /// Paint visibility toggle
  pub fn visible(&self) -> bool {
    match self {
      MaterializedPaint::Solid(p) => p.visible,
      MaterializedPaint::Gradient(a) | MaterializedPaint::Image(a) | MaterializedPaint::Video(a) => {
        a.visible
      }
    }
  }

  /// Paint-level opacity
  pub fn opacity(&self) -> Option<f32> {
    match self {
      MaterializedPaint::Solid(p) => p.opacity,
      MaterializedPaint::Gradient(a) | MaterializedPaint::Image(a) | MaterializedPaint::Video(a) => {
        a.opacity
      }
    }
  }

  /// The enriched solid payload, if this paint is solid
  pub fn as_solid(&self) -> Option<&EnrichedSolidPaint> {
    match self {
      MaterializedPaint::Solid(p) => Some(p),
      _ => None,
    }
  }

  /// True for solid paints
  pub fn is_solid(&self) -> bool {
    matches!(self, MaterializedPaint::Solid(_))
  }

  /// True for a paint that composites onto what lies beneath it:
  /// visible, with positive (or unspecified) opacity, and solid
  pub fn is_visible_solid(&self) -> bool {
    self.visible() && self.opacity().map_or(true, |o| o > 0.0) && self.is_solid()
  }
}

/// A derived, immutable snapshot of a scene node used only by background
/// resolution
///
/// `children` is always restricted to the subtree visually relevant to
/// the selection, never the full host children list. `parents` holds
/// non-owning arena ids for lookup only and is not serialized.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MaterializedNode {
  /// Stable host identifier
  pub id: String,
  /// Display name
  pub name: String,
  /// Element-level blend mode, defaulted to pass-through
  pub blend_mode: BlendMode,
  /// Enriched fill paints, last paint on top
  pub fills: Vec<MaterializedPaint>,
  /// Intersecting descendants, restricted to the selection's background
  pub children: Vec<MaterializedNode>,
  /// Ancestor chain, nearest first; arena ids, lookup only
  #[serde(skip)]
  pub parents: Vec<NodeId>,
  /// Distance from the analysis root
  pub nesting_level: usize,
  /// Original sibling index, absent for the root
  #[serde(skip_serializing_if = "Option::is_none")]
  pub z_index: Option<usize>,
  /// Identity match against the selected node
  pub is_selected: bool,
  /// Layer visibility
  pub visible: bool,
  /// Element-level opacity, defaulted to 1.0
  pub opacity: f32,
}

/// Classified failure notices for a selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SelectionMessage {
  InvalidBackground,
  UnprocessedBlendModes,
}

/// Per-node classification outcome
#[derive(Debug, Clone)]
pub enum PairVerdict {
  /// A valid background pair: the materialized intersection tree
  Valid(Box<MaterializedNode>),
  /// No opaque solid background exists beneath the node
  InvalidBackground,
  /// The intersection tree carries a blend mode contrast cannot model
  InvalidBlendMode,
}

/// The selection-change boundary message
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum SelectionPayload {
  /// Classified failure for the whole selection
  #[serde(rename_all = "camelCase")]
  Notice {
    color_space: ColorSpace,
    text: SelectionMessage,
  },
  /// Valid background pairs, possibly empty
  #[serde(rename_all = "camelCase")]
  Pairs {
    color_space: ColorSpace,
    selected_node_pairs: Vec<MaterializedNode>,
  },
}

/// The topmost fill that actually paints: last in paint order that is
/// visible with explicit positive opacity
pub fn actual_fill(fills: &[Paint]) -> Option<&Paint> {
  fills
    .iter()
    .rev()
    .find(|fill| fill.visible() && fill.opacity().map_or(false, |o| o > 0.0))
}

fn actual_materialized_fill(fills: &[MaterializedPaint]) -> Option<&MaterializedPaint> {
  fills
    .iter()
    .rev()
    .find(|fill| fill.visible() && fill.opacity().map_or(false, |o| o > 0.0))
}

/// Whether a node is eligible for background analysis
///
/// Requires visibility, non-zero element opacity, and a topmost actual
/// fill of solid type. Gradient- or image-topped nodes, nodes with no
/// fills, and hidden nodes are ineligible.
pub fn is_selectable(node: &SceneNode) -> bool {
  if !node.visible {
    return false;
  }
  if node.opacity == Some(0.0) {
    return false;
  }
  match actual_fill(&node.fills) {
    Some(fill) => fill.is_solid(),
    None => false,
  }
}

/// Derives the materialized snapshot of one node
///
/// Blend mode defaults to pass-through, opacity to 1.0; the nesting
/// level is the ancestor-chain length and the z-index the node's sibling
/// position. Children are left empty for the caller to fill.
pub fn materialize(graph: &SceneGraph, id: NodeId, selected: NodeId) -> MaterializedNode {
  let node = graph.node(id);
  let parents = graph.ancestors(id);
  MaterializedNode {
    id: node.id.clone(),
    name: node.name.clone(),
    blend_mode: node.blend_mode.unwrap_or(BlendMode::PassThrough),
    fills: node.fills.iter().map(MaterializedPaint::from_paint).collect(),
    children: Vec::new(),
    nesting_level: parents.len(),
    parents,
    z_index: graph.sibling_index(id),
    is_selected: id == selected,
    visible: node.visible,
    opacity: node.opacity.unwrap_or(1.0),
  }
}

/// The prefix of `siblings` painted at or before `target`
///
/// Everything in the returned slice paints no later than the target and
/// therefore cannot occlude it from above. Returns an empty slice when
/// the target is not among the siblings.
pub fn siblings_at_or_below(target: NodeId, siblings: &[NodeId]) -> &[NodeId] {
  match siblings.iter().position(|&id| id == target) {
    Some(index) => &siblings[..=index],
    None => &[],
  }
}

/// Whether `candidate` can sit behind `selected`
///
/// True iff both nodes have bounding boxes, the candidate's box fully
/// contains the selected box (edge-inclusive), and the candidate is
/// visible. A node with no bounding box never intersects.
pub fn intersects(graph: &SceneGraph, candidate: NodeId, selected: NodeId) -> bool {
  let Some(selected_box) = graph.node(selected).bounding_box else {
    return false;
  };
  let candidate_node = graph.node(candidate);
  match candidate_node.bounding_box {
    Some(candidate_box) => candidate_box.contains_rect(&selected_box) && candidate_node.visible,
    None => false,
  }
}

/// Builds the intersection forest for `selected` out of `nodes`
///
/// Each candidate that intersects the selection is materialized; its
/// children recurse into either the at-or-below slice (when the selected
/// node is one of its children) or all children otherwise. Only content
/// geometrically beneath the selection and not occluded by intervening
/// siblings can act as its background.
pub fn build_intersection_tree(
  graph: &SceneGraph,
  nodes: &[NodeId],
  selected: NodeId,
) -> Vec<MaterializedNode> {
  let mut out = Vec::new();
  for &candidate in nodes {
    if !intersects(graph, candidate, selected) {
      continue;
    }
    let mut materialized = materialize(graph, candidate, selected);
    let children = graph.children(candidate);
    if !children.is_empty() {
      let lookup: &[NodeId] = if children.contains(&selected) {
        siblings_at_or_below(selected, children)
      } else {
        children
      };
      materialized.children = build_intersection_tree(graph, lookup, selected);
    }
    out.push(materialized);
  }
  out
}

/// Resolves the full intersection tree for one selected node
///
/// Page-level candidates are the selection's at-or-below siblings when
/// it sits directly on the page, or all page children otherwise. The
/// result is wrapped under a materialized root representing the page
/// itself, and nesting levels are reassigned relative to that root.
pub fn resolve_for_selection(graph: &SceneGraph, selected: NodeId) -> MaterializedNode {
  let page = graph.root();
  let page_children = graph.children(page);

  let lookup: &[NodeId] = if page_children.contains(&selected) {
    siblings_at_or_below(selected, page_children)
  } else {
    page_children
  };

  let mut root = materialize(graph, page, selected);
  root.children = build_intersection_tree(graph, lookup, selected);
  assign_nesting_levels(&mut root, 0);
  root
}

fn assign_nesting_levels(node: &mut MaterializedNode, level: usize) {
  node.nesting_level = level;
  for child in &mut node.children {
    assign_nesting_levels(child, level + 1);
  }
}

/// Pre-order flattening of an intersection tree
///
/// Recomputes each descendant's nesting level relative to the flattening
/// root as it descends: the root is level 0, each recursion level adds 1.
pub fn flatten(tree: &MaterializedNode) -> Vec<MaterializedNode> {
  fn walk(node: &MaterializedNode, level: usize, out: &mut Vec<MaterializedNode>) {
    let mut flat = node.clone();
    flat.nesting_level = level;
    out.push(flat);
    for child in &node.children {
      walk(child, level + 1, out);
    }
  }

  let mut out = Vec::new();
  walk(tree, 0, &mut out);
  out
}

/// Sorts a flat node list into occlusion order, most-in-front first
///
/// Descending by nesting level, then by sibling index within equal
/// depth. Depth dominates sibling order because a deeply nested, fully
/// opaque descendant occludes its ancestors' own fills. The sort is
/// stable, so equal keys keep pre-order.
pub fn rank_for_occlusion(nodes: &mut [MaterializedNode]) {
  nodes.sort_by(|a, b| {
    b.nesting_level
      .cmp(&a.nesting_level)
      .then_with(|| b.z_index.unwrap_or(0).cmp(&a.z_index.unwrap_or(0)))
  });
}

/// The first node in ranked order that actually paints something
///
/// Visible, positive opacity, and at least one fill that is itself
/// visible with explicit positive opacity.
pub fn first_actual_node(nodes: &[MaterializedNode]) -> Option<&MaterializedNode> {
  nodes.iter().find(|node| {
    node.visible
      && node.opacity > 0.0
      && !node.fills.is_empty()
      && node
        .fills
        .iter()
        .any(|fill| fill.visible() && fill.opacity().map_or(false, |o| o > 0.0))
  })
}

/// Whether a valid opaque solid background exists in the tree
///
/// Flattens, ranks for occlusion, drops the selected node itself, and
/// requires the first actually-painting node's topmost fill to be solid.
pub fn is_valid_background(tree: &MaterializedNode) -> bool {
  let mut flat = flatten(tree);
  rank_for_occlusion(&mut flat);
  flat.retain(|node| !node.is_selected);

  let Some(actual) = first_actual_node(&flat) else {
    return false;
  };
  match actual_materialized_fill(&actual.fills) {
    Some(fill) => fill.is_solid(),
    None => false,
  }
}

/// Whether every blend mode in the tree can be modeled by the contrast
/// pipeline
///
/// Checks each node's visible solid fills and the node's own element
/// blend mode. A single unsupported mode anywhere poisons the tree.
pub fn blend_modes_allowed(tree: &MaterializedNode) -> bool {
  flatten(tree).iter().all(|node| {
    node.blend_mode.is_supported()
      && node
        .fills
        .iter()
        .filter(|fill| fill.is_visible_solid())
        .all(|fill| match fill {
          MaterializedPaint::Solid(solid) => solid.blend_mode.map_or(true, BlendMode::is_supported),
          _ => true,
        })
  })
}

/// Classifies every selectable node in the selection
pub fn classify_selection(graph: &SceneGraph, selection: &[NodeId]) -> Vec<PairVerdict> {
  selection
    .iter()
    .filter(|&&id| is_selectable(graph.node(id)))
    .map(|&id| {
      let tree = resolve_for_selection(graph, id);
      if !blend_modes_allowed(&tree) {
        PairVerdict::InvalidBlendMode
      } else if is_valid_background(&tree) {
        PairVerdict::Valid(Box::new(tree))
      } else {
        PairVerdict::InvalidBackground
      }
    })
    .collect()
}

/// Builds the selection-change boundary message
///
/// A lone invalid-background verdict, or two or more verdicts that are
/// all invalid backgrounds, collapse into a single notice. Otherwise any
/// unprocessed blend mode anywhere yields the blend-mode notice, and the
/// remaining case emits the valid pairs (possibly an empty list).
pub fn build_selection_payload<P: SceneGraphProvider>(provider: &P) -> SelectionPayload {
  let graph = provider.graph();
  let selection = provider.current_selection();
  let color_space = provider.color_profile();

  let verdicts = classify_selection(graph, &selection);

  let invalid_backgrounds = verdicts
    .iter()
    .filter(|v| matches!(v, PairVerdict::InvalidBackground))
    .count();
  let single_invalid = verdicts.len() == 1 && invalid_backgrounds == 1;
  let all_invalid = verdicts.len() > 1 && invalid_backgrounds == verdicts.len();

  if single_invalid || all_invalid {
    log::debug!(
      "no valid background behind {invalid_backgrounds} of {} selected nodes",
      verdicts.len()
    );
    return SelectionPayload::Notice {
      color_space,
      text: SelectionMessage::InvalidBackground,
    };
  }

  if verdicts
    .iter()
    .any(|v| matches!(v, PairVerdict::InvalidBlendMode))
  {
    log::debug!("selection carries a blend mode contrast cannot model");
    return SelectionPayload::Notice {
      color_space,
      text: SelectionMessage::UnprocessedBlendModes,
    };
  }

  let pairs = verdicts
    .into_iter()
    .filter_map(|v| match v {
      PairVerdict::Valid(tree) => Some(*tree),
      _ => None,
    })
    .collect();

  SelectionPayload::Pairs {
    color_space,
    selected_node_pairs: pairs,
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::geometry::Rect;
  use crate::scene::{NodeType, SceneNode};

  fn solid_rect(id: &str, color: Rgb, bounds: Rect) -> SceneNode {
    SceneNode::new(id, NodeType::Rectangle)
      .with_fills(vec![Paint::solid(color)])
      .with_bounds(bounds)
  }

  #[test]
  fn actual_fill_is_topmost_visible_with_positive_opacity() {
    let fills = vec![
      Paint::solid(Rgb::new(1.0, 0.0, 0.0)),
      Paint::Solid(crate::scene::SolidPaint::new(Rgb::new(0.0, 1.0, 0.0)).hidden()),
      Paint::Solid(crate::scene::SolidPaint::new(Rgb::new(0.0, 0.0, 1.0)).with_opacity(0.0)),
    ];
    let top = actual_fill(&fills).expect("red paints");
    assert_eq!(top.as_solid().unwrap().color, Rgb::new(1.0, 0.0, 0.0));
  }

  #[test]
  fn fill_without_explicit_opacity_is_not_actual() {
    let mut solid = crate::scene::SolidPaint::new(Rgb::new(1.0, 0.0, 0.0));
    solid.opacity = None;
    assert!(actual_fill(&[Paint::Solid(solid)]).is_none());
  }

  #[test]
  fn selectable_requires_solid_topmost_fill() {
    let bounds = Rect::new(0.0, 0.0, 10.0, 10.0);
    assert!(is_selectable(&solid_rect("a", Rgb::BLACK, bounds)));

    let gradient_top = SceneNode::new("b", NodeType::Rectangle)
      .with_fills(vec![Paint::solid(Rgb::BLACK), Paint::gradient()])
      .with_bounds(bounds);
    assert!(!is_selectable(&gradient_top));

    let hidden = solid_rect("c", Rgb::BLACK, bounds).hidden();
    assert!(!is_selectable(&hidden));

    let transparent = solid_rect("d", Rgb::BLACK, bounds).with_opacity(0.0);
    assert!(!is_selectable(&transparent));

    let empty = SceneNode::new("e", NodeType::Rectangle).with_bounds(bounds);
    assert!(!is_selectable(&empty));
  }

  #[test]
  fn siblings_slice_is_inclusive_prefix() {
    let mut graph = SceneGraph::new(SceneNode::new("page", NodeType::Page));
    let a = graph.add_child(graph.root(), SceneNode::new("a", NodeType::Rectangle));
    let b = graph.add_child(graph.root(), SceneNode::new("b", NodeType::Rectangle));
    let c = graph.add_child(graph.root(), SceneNode::new("c", NodeType::Rectangle));

    let siblings = graph.children(graph.root());
    assert_eq!(siblings_at_or_below(b, siblings), &[a, b]);
    assert_eq!(siblings_at_or_below(a, siblings), &[a]);
    assert_eq!(siblings_at_or_below(c, siblings), &[a, b, c]);
  }

  #[test]
  fn missing_bounding_box_never_intersects() {
    let mut graph = SceneGraph::new(SceneNode::new("page", NodeType::Page));
    let placed = graph.add_child(
      graph.root(),
      solid_rect("placed", Rgb::BLACK, Rect::new(0.0, 0.0, 100.0, 100.0)),
    );
    let unplaced = graph.add_child(graph.root(), SceneNode::new("unplaced", NodeType::Rectangle));

    assert!(!intersects(&graph, unplaced, placed));
    assert!(!intersects(&graph, placed, unplaced));
    assert!(intersects(&graph, placed, placed));
  }

  #[test]
  fn flatten_recomputes_levels_from_the_root() {
    let mut graph = SceneGraph::new(SceneNode::new("page", NodeType::Page));
    let outer = graph.add_child(
      graph.root(),
      solid_rect("outer", Rgb::BLACK, Rect::new(0.0, 0.0, 100.0, 100.0)),
    );
    let inner = graph.add_child(
      outer,
      solid_rect("inner", Rgb::WHITE, Rect::new(10.0, 10.0, 50.0, 50.0)),
    );
    let selected = graph.add_child(
      inner,
      solid_rect("sel", Rgb::BLACK, Rect::new(20.0, 20.0, 10.0, 10.0)),
    );

    let tree = resolve_for_selection(&graph, selected);
    let flat = flatten(&tree);

    let ids: Vec<&str> = flat.iter().map(|n| n.id.as_str()).collect();
    assert_eq!(ids, vec!["page", "outer", "inner", "sel"]);
    let levels: Vec<usize> = flat.iter().map(|n| n.nesting_level).collect();
    assert_eq!(levels, vec![0, 1, 2, 3]);
  }

  #[test]
  fn ranking_prefers_depth_then_sibling_index() {
    let mut graph = SceneGraph::new(SceneNode::new("page", NodeType::Page));
    let back = graph.add_child(
      graph.root(),
      solid_rect("back", Rgb::BLACK, Rect::new(0.0, 0.0, 100.0, 100.0)),
    );
    let _nested = graph.add_child(
      back,
      solid_rect("nested", Rgb::WHITE, Rect::new(0.0, 0.0, 100.0, 100.0)),
    );
    let selected = graph.add_child(
      graph.root(),
      solid_rect("sel", Rgb::BLACK, Rect::new(10.0, 10.0, 10.0, 10.0)),
    );

    let tree = resolve_for_selection(&graph, selected);
    let mut flat = flatten(&tree);
    rank_for_occlusion(&mut flat);

    assert_eq!(flat[0].id, "nested");
  }

  #[test]
  fn element_blend_mode_poisons_the_tree() {
    let mut graph = SceneGraph::new(SceneNode::new("page", NodeType::Page));
    let bg = graph.add_child(
      graph.root(),
      solid_rect("bg", Rgb::WHITE, Rect::new(0.0, 0.0, 100.0, 100.0)),
    );
    let mid = graph.add_child(
      bg,
      solid_rect("mid", Rgb::WHITE, Rect::new(0.0, 0.0, 100.0, 100.0)),
    );
    let _deep = graph.add_child(
      mid,
      solid_rect("deep", Rgb::WHITE, Rect::new(0.0, 0.0, 100.0, 100.0))
        .with_blend_mode(BlendMode::LinearBurn),
    );
    let selected = graph.add_child(
      graph.root(),
      solid_rect("sel", Rgb::BLACK, Rect::new(10.0, 10.0, 10.0, 10.0)),
    );

    let tree = resolve_for_selection(&graph, selected);
    assert!(!blend_modes_allowed(&tree));
  }

  #[test]
  fn fill_blend_mode_poisons_only_when_fill_is_visible_solid() {
    let mut graph = SceneGraph::new(SceneNode::new("page", NodeType::Page));
    let burn_fill = Paint::Solid(
      crate::scene::SolidPaint::new(Rgb::WHITE).with_blend_mode(BlendMode::LinearBurn),
    );
    let _bg = graph.add_child(
      graph.root(),
      SceneNode::new("bg", NodeType::Rectangle)
        .with_fills(vec![burn_fill])
        .with_bounds(Rect::new(0.0, 0.0, 100.0, 100.0)),
    );
    let selected = graph.add_child(
      graph.root(),
      solid_rect("sel", Rgb::BLACK, Rect::new(10.0, 10.0, 10.0, 10.0)),
    );

    let tree = resolve_for_selection(&graph, selected);
    assert!(!blend_modes_allowed(&tree));

    // The same fill hidden no longer poisons anything.
    let mut graph = SceneGraph::new(SceneNode::new("page", NodeType::Page));
    let hidden_burn = Paint::Solid(
      crate::scene::SolidPaint::new(Rgb::WHITE)
        .with_blend_mode(BlendMode::LinearBurn)
        .hidden(),
    );
    let _bg = graph.add_child(
      graph.root(),
      SceneNode::new("bg", NodeType::Rectangle)
        .with_fills(vec![hidden_burn, Paint::solid(Rgb::WHITE)])
        .with_bounds(Rect::new(0.0, 0.0, 100.0, 100.0)),
    );
    let selected = graph.add_child(
      graph.root(),
      solid_rect("sel", Rgb::BLACK, Rect::new(10.0, 10.0, 10.0, 10.0)),
    );
    let tree = resolve_for_selection(&graph, selected);
    assert!(blend_modes_allowed(&tree));
  }
}
