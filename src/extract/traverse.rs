//! Full-document extraction traversal
//!
//! A single pre-order walk over the scene graph feeds every domain
//! extractor and runs the inline text contrast check. Extractor failures
//! (broken style references, unresolvable components) are logged and
//! skipped so one bad node never aborts the whole document.

use crate::color::apca::{apca_contrast, conclusion_for_score};
use crate::extract::domains::{Domain, Extractor};
use crate::extract::{ContrastFinding, DocumentTokens};
use crate::scene::{NodeId, Paint, SceneGraphProvider, SceneNode, SolidPaint};

/// Readability threshold below which a text pair is flagged
const LOW_CONTRAST_THRESHOLD: i32 = 30;

/// Walks the whole document and aggregates design tokens from every node
///
/// Traversal is pre-order from the graph root. Each node runs through
/// every extraction domain whose allow-list admits its type; each child
/// is contrast-checked against its direct parent immediately before its
/// own subtree is visited, so findings land in document order.
pub fn extract_document<P: SceneGraphProvider>(provider: &P) -> DocumentTokens {
  let mut extractor = Extractor::new(provider);
  let graph = provider.graph();
  visit(&mut extractor, graph.root());

  let mut tokens = extractor.tokens;
  for record in &tokens.text.nodes {
    if record.style_id.is_some() {
      tokens.styled_text_nodes.push(record.node_id.clone());
    } else {
      tokens.raw_text_nodes.push(record.node_id.clone());
    }
  }
  tokens
}

fn visit<P: SceneGraphProvider>(extractor: &mut Extractor<'_, P>, id: NodeId) {
  let node = extractor.provider.graph().node(id);

  let steps = [
    ("fills", extractor.process_fills(id)),
    ("strokes", extractor.process_strokes(id)),
    ("effects", extractor.process_effects(id)),
    ("text", extractor.process_text(id)),
    ("grids", extractor.process_grids(id)),
    ("spacing", extractor.process_spacing(id)),
    ("cornerRadius", extractor.process_corner_radius(id)),
    ("components", extractor.process_component(id)),
  ];
  for (domain, result) in steps {
    if let Err(err) = result {
      log::warn!("skipping {domain} extraction on node {}: {err}", node.id);
    }
  }

  // The contrast check runs per child, interleaved with descent, so
  // findings land in document order across mixed sibling lists.
  let background = topmost_actual_solid(&node.fills).copied();
  let children: Vec<NodeId> = extractor.provider.graph().children(id).to_vec();
  for child in children {
    if let Some(background) = background {
      check_text_child(extractor, background, child);
    }
    visit(extractor, child);
  }
}

/// Topmost visible solid paint with positive opacity, if any
fn topmost_actual_solid(paints: &[Paint]) -> Option<&SolidPaint> {
  paints
    .iter()
    .rev()
    .find(|paint| paint.visible() && paint.opacity().map_or(false, |o| o > 0.0))
    .and_then(Paint::as_solid)
}

/// Flags one text child if it scores low against its parent's fill
///
/// The check pairs the child's topmost actual solid fill against the
/// parent's own. Pairs without a solid on both sides are skipped, as are
/// pairs scoring exactly zero (APCA returns zero for both identical
/// colors and invalid input).
fn check_text_child<P: SceneGraphProvider>(
  extractor: &mut Extractor<'_, P>,
  background: SolidPaint,
  child_id: NodeId,
) {
  let child: &SceneNode = extractor.provider.graph().node(child_id);
  if !Domain::Text.supports(child.node_type) {
    return;
  }
  let Some(foreground) = topmost_actual_solid(&child.fills) else {
    return;
  };

  let score = apca_contrast(
    foreground.color,
    background.color,
    extractor.provider.color_profile(),
  );
  if score == 0 {
    return;
  }
  let absolute = score.abs();
  if absolute <= LOW_CONTRAST_THRESHOLD {
    extractor
      .tokens
      .accessibility_issue
      .text_nodes
      .push(ContrastFinding {
        node_id: child.id.clone(),
        apca_score_absolute: absolute,
        band: conclusion_for_score(absolute).to_owned(),
      });
  }
}
