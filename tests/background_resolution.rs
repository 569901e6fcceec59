//! End-to-end selection analysis: background resolution, blend-mode
//! screening, and the selection payload boundary.

use tokenlens::{
  Analyzer, BlendMode, ColorSpace, InMemoryProvider, NodeId, NodeType, Paint, Rgb, SceneGraph,
  SceneNode, SelectionMessage, SelectionPayload,
};
use tokenlens::geometry::Rect;

fn solid_rect(id: &str, color: Rgb, bounds: Rect) -> SceneNode {
  SceneNode::new(id, NodeType::Rectangle)
    .with_fills(vec![Paint::solid(color)])
    .with_bounds(bounds)
}

fn page() -> SceneGraph {
  SceneGraph::new(SceneNode::new("page", NodeType::Page))
}

fn analyze(graph: SceneGraph, selection: Vec<NodeId>) -> SelectionPayload {
  Analyzer::new(InMemoryProvider::new(graph).with_selection(selection)).selection_payload()
}

fn expect_notice(payload: &SelectionPayload) -> SelectionMessage {
  match payload {
    SelectionPayload::Notice { text, .. } => *text,
    SelectionPayload::Pairs { .. } => panic!("expected a notice, got pairs"),
  }
}

#[test]
fn lone_node_has_no_background() {
  let mut graph = page();
  let sel = graph.add_child(
    graph.root(),
    solid_rect("sel", Rgb::new(1.0, 0.0, 0.0), Rect::new(10.0, 10.0, 20.0, 20.0)),
  );

  let payload = analyze(graph, vec![sel]);
  assert_eq!(expect_notice(&payload), SelectionMessage::InvalidBackground);
}

#[test]
fn gradient_backdrop_is_not_a_valid_background() {
  let mut graph = page();
  graph.add_child(
    graph.root(),
    SceneNode::new("backdrop", NodeType::Rectangle)
      .with_fills(vec![Paint::gradient()])
      .with_bounds(Rect::new(0.0, 0.0, 100.0, 100.0)),
  );
  let sel = graph.add_child(
    graph.root(),
    solid_rect("sel", Rgb::BLACK, Rect::new(10.0, 10.0, 20.0, 20.0)),
  );

  let payload = analyze(graph, vec![sel]);
  assert_eq!(expect_notice(&payload), SelectionMessage::InvalidBackground);
}

#[test]
fn siblings_above_the_selection_are_ignored() {
  // The covering sibling paints after the selection, so it cannot serve
  // as its background even though it fully contains it.
  let mut graph = page();
  let sel = graph.add_child(
    graph.root(),
    solid_rect("sel", Rgb::BLACK, Rect::new(10.0, 10.0, 20.0, 20.0)),
  );
  graph.add_child(
    graph.root(),
    solid_rect("cover", Rgb::WHITE, Rect::new(0.0, 0.0, 100.0, 100.0)),
  );

  let payload = analyze(graph, vec![sel]);
  assert_eq!(expect_notice(&payload), SelectionMessage::InvalidBackground);
}

#[test]
fn deep_linear_burn_descendant_triggers_blend_notice() {
  let mut graph = page();
  let bg = graph.add_child(
    graph.root(),
    solid_rect("bg", Rgb::WHITE, Rect::new(0.0, 0.0, 100.0, 100.0)),
  );
  let mid = graph.add_child(
    bg,
    solid_rect("mid", Rgb::WHITE, Rect::new(0.0, 0.0, 100.0, 100.0)),
  );
  graph.add_child(
    mid,
    solid_rect("deep", Rgb::WHITE, Rect::new(0.0, 0.0, 100.0, 100.0))
      .with_blend_mode(BlendMode::LinearBurn),
  );
  let sel = graph.add_child(
    graph.root(),
    solid_rect("sel", Rgb::BLACK, Rect::new(10.0, 10.0, 20.0, 20.0)),
  );

  let payload = analyze(graph, vec![sel]);
  assert_eq!(
    expect_notice(&payload),
    SelectionMessage::UnprocessedBlendModes
  );
}

#[test]
fn solid_backdrop_produces_a_contrast_pair() {
  let mut graph = page();
  graph.add_child(
    graph.root(),
    solid_rect("bg", Rgb::WHITE, Rect::new(0.0, 0.0, 100.0, 100.0)),
  );
  let sel = graph.add_child(
    graph.root(),
    solid_rect("sel", Rgb::new(1.0, 0.0, 0.0), Rect::new(10.0, 10.0, 20.0, 20.0)),
  );

  let payload = analyze(graph, vec![sel]);
  let SelectionPayload::Pairs {
    color_space,
    selected_node_pairs,
  } = payload
  else {
    panic!("expected pairs");
  };

  assert_eq!(color_space, ColorSpace::Srgb);
  assert_eq!(selected_node_pairs.len(), 1);

  let tree = &selected_node_pairs[0];
  assert_eq!(tree.id, "page");
  assert_eq!(tree.nesting_level, 0);
  assert_eq!(tree.children.len(), 2);

  let selected = tree
    .children
    .iter()
    .find(|n| n.is_selected)
    .expect("selected node present");
  assert_eq!(selected.id, "sel");
  assert_eq!(selected.nesting_level, 1);
  let fill = selected.fills[0].as_solid().expect("solid fill");
  assert_eq!(fill.hex, "#ff0000");

  let backdrop = tree
    .children
    .iter()
    .find(|n| !n.is_selected)
    .expect("backdrop present");
  assert_eq!(backdrop.id, "bg");
  assert_eq!(backdrop.fills[0].as_solid().expect("solid").hex, "#ffffff");
}

#[test]
fn mixed_verdicts_keep_only_valid_pairs() {
  let mut graph = page();
  graph.add_child(
    graph.root(),
    solid_rect("bg", Rgb::WHITE, Rect::new(0.0, 0.0, 100.0, 100.0)),
  );
  let valid = graph.add_child(
    graph.root(),
    solid_rect("valid", Rgb::BLACK, Rect::new(10.0, 10.0, 20.0, 20.0)),
  );
  let stranded = graph.add_child(
    graph.root(),
    solid_rect("stranded", Rgb::BLACK, Rect::new(200.0, 200.0, 20.0, 20.0)),
  );

  let payload = analyze(graph, vec![valid, stranded]);
  let SelectionPayload::Pairs {
    selected_node_pairs, ..
  } = payload
  else {
    panic!("expected pairs");
  };
  assert_eq!(selected_node_pairs.len(), 1);
  assert!(selected_node_pairs[0]
    .children
    .iter()
    .any(|n| n.is_selected && n.id == "valid"));
}

#[test]
fn uniformly_invalid_selection_collapses_into_one_notice() {
  let mut graph = page();
  let a = graph.add_child(
    graph.root(),
    solid_rect("a", Rgb::BLACK, Rect::new(0.0, 0.0, 10.0, 10.0)),
  );
  let b = graph.add_child(
    graph.root(),
    solid_rect("b", Rgb::BLACK, Rect::new(50.0, 50.0, 10.0, 10.0)),
  );

  let payload = analyze(graph, vec![a, b]);
  assert_eq!(expect_notice(&payload), SelectionMessage::InvalidBackground);
}

#[test]
fn unselectable_nodes_yield_empty_pairs() {
  // A gradient-topped selection never enters classification, so the
  // payload is an empty pair list rather than a notice.
  let mut graph = page();
  let sel = graph.add_child(
    graph.root(),
    SceneNode::new("gradient", NodeType::Rectangle)
      .with_fills(vec![Paint::gradient()])
      .with_bounds(Rect::new(10.0, 10.0, 20.0, 20.0)),
  );

  let payload = analyze(graph, vec![sel]);
  let SelectionPayload::Pairs {
    selected_node_pairs, ..
  } = payload
  else {
    panic!("expected pairs");
  };
  assert!(selected_node_pairs.is_empty());
}

#[test]
fn hidden_backdrop_does_not_resolve() {
  let mut graph = page();
  graph.add_child(
    graph.root(),
    solid_rect("bg", Rgb::WHITE, Rect::new(0.0, 0.0, 100.0, 100.0)).hidden(),
  );
  let sel = graph.add_child(
    graph.root(),
    solid_rect("sel", Rgb::BLACK, Rect::new(10.0, 10.0, 20.0, 20.0)),
  );

  let payload = analyze(graph, vec![sel]);
  assert_eq!(expect_notice(&payload), SelectionMessage::InvalidBackground);
}

#[test]
fn notice_serializes_with_camel_case_message() {
  let mut graph = page();
  let sel = graph.add_child(
    graph.root(),
    solid_rect("sel", Rgb::BLACK, Rect::new(10.0, 10.0, 20.0, 20.0)),
  );

  let payload = analyze(graph, vec![sel]);
  let json = serde_json::to_value(&payload).unwrap();
  assert_eq!(json["colorSpace"], "SRGB");
  assert_eq!(json["text"], "invalidBackground");
}

#[test]
fn pair_serializes_enriched_fills() {
  let mut graph = page();
  graph.add_child(
    graph.root(),
    solid_rect("bg", Rgb::WHITE, Rect::new(0.0, 0.0, 100.0, 100.0)),
  );
  let sel = graph.add_child(
    graph.root(),
    solid_rect("sel", Rgb::new(1.0, 0.0, 0.0), Rect::new(10.0, 10.0, 20.0, 20.0)),
  );

  let payload = analyze(graph, vec![sel]);
  let json = serde_json::to_value(&payload).unwrap();
  let pairs = json["selectedNodePairs"].as_array().unwrap();
  assert_eq!(pairs.len(), 1);

  let children = pairs[0]["children"].as_array().unwrap();
  let selected = children
    .iter()
    .find(|c| c["isSelected"] == true)
    .expect("selected child");
  assert_eq!(selected["nestingLevel"], 1);
  let fill = &selected["fills"][0];
  assert_eq!(fill["type"], "SOLID");
  assert_eq!(fill["hex"], "#ff0000");
  assert!(fill["oklch"]["l"].is_number());
}
