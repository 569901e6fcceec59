//! Per-domain token extractors
//!
//! Each node type has a fixed capability table naming the extraction
//! domains that apply to it; a domain extractor runs only when its table
//! admits the node type and the relevant raw property is present.
//!
//! Extraction is a fold: an extractor inspects one node and returns a
//! list of [`TokenDelta`]s, and a separate merge step folds each delta
//! into the aggregation state. Extractors never touch the aggregations
//! directly, so a failing extractor contributes nothing by construction.
//!
//! Canonicalization turns raw values into string keys so semantic
//! duplicates merge despite float noise and field-order differences.

use crate::color::Rgb;
use crate::error::ExtractionError;
use crate::extract::{
  ColorKey, ComponentKey, CornerRadiusRecord, DocumentTokens, EffectRecord, EffectsKey, GridKey,
  GridRecord, PaintRecord, RecordPolicy, ScalarKey, SpacingRecord, StyleKey, TextKey, TextRecord,
  TextStyleKey,
};
use crate::scene::{
  BlendMode, ComponentRef, CornerRadius, Effect, LayoutGrid, NodeId, NodeType, Paint,
  SceneGraphProvider, SceneNode, StyleRef, TextCase, TextDecoration, TypeStyle,
};
use rustc_hash::FxHashSet;
use serde::Serialize;

/// Extraction domains and their static node-type allow-lists
///
/// Membership is never inferred from the shape of a node's data; a node
/// is processed by a domain only if its type is in the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Domain {
  Fill,
  Stroke,
  Spacing,
  Effect,
  CornerRadius,
  Grid,
  Icon,
  Text,
}

impl Domain {
  /// Whether this domain applies to the given node type
  pub fn supports(self, node_type: NodeType) -> bool {
    use NodeType::*;
    match self {
      Domain::Fill => matches!(
        node_type,
        BooleanOperation
          | Component
          | ComponentSet
          | Ellipse
          | Frame
          | Highlight
          | Instance
          | Line
          | Polygon
          | Rectangle
          | Section
          | ShapeWithText
          | Stamp
          | Star
          | Sticky
          | TableCell
          | Table
          | Text
          | TextSublayer
          | Vector
          | WashiTape
      ),
      Domain::Stroke => matches!(
        node_type,
        BooleanOperation
          | Component
          | ComponentSet
          | Connector
          | Ellipse
          | Frame
          | Highlight
          | Instance
          | Line
          | Polygon
          | Rectangle
          | ShapeWithText
          | Stamp
          | Star
          | Text
          | Vector
          | WashiTape
      ),
      Domain::Spacing => matches!(node_type, Component | ComponentSet | Frame | Instance),
      Domain::Effect => matches!(
        node_type,
        BooleanOperation
          | Component
          | ComponentSet
          | Ellipse
          | Frame
          | Group
          | Highlight
          | Instance
          | Line
          | Polygon
          | Rectangle
          | Stamp
          | Star
          | Text
          | Vector
          | WashiTape
      ),
      Domain::CornerRadius => matches!(
        node_type,
        BooleanOperation
          | Component
          | ComponentSet
          | Ellipse
          | Frame
          | Highlight
          | Instance
          | Polygon
          | Rectangle
          | Star
          | Vector
      ),
      Domain::Grid => matches!(node_type, Component | ComponentSet | Frame | Instance),
      Domain::Icon => matches!(node_type, Vector),
      Domain::Text => matches!(node_type, ShapeWithText | Text | TextSublayer),
    }
  }
}

/// Which raw paint list a fill record lands in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PaintBucket {
  Fill,
  Text,
  Icon,
}

/// One node's contribution to the aggregation state
///
/// Produced by the domain extractors, consumed by [`Extractor::apply`].
#[derive(Debug, Clone)]
pub(crate) enum TokenDelta {
  FillRecord { bucket: PaintBucket, record: PaintRecord },
  StrokeRecord(PaintRecord),
  ColorOccurrence { name: String, color: Rgb, opacity: Option<f32> },
  ColorStyle(StyleRef),
  EffectRecord(EffectRecord),
  EffectsOccurrence { key: String, effects: Vec<Effect> },
  EffectStyle(StyleRef),
  TextRecord(TextRecord),
  TextOccurrence { key: String, type_style: TypeStyle },
  TextStyle { id: String, type_style: TypeStyle },
  GridRecord(GridRecord),
  GridOccurrence { style: StyleRef, grid: LayoutGrid },
  SpacingRecord(SpacingRecord),
  SpacingValue(f32),
  CornerRadiusRecord(CornerRadiusRecord),
  CornerRadiusValue(f32),
  ComponentNode,
  ComponentOccurrence(ComponentRef),
}

/// Canonical color key: channels rounded to 4 decimals, concatenated
/// with the paint opacity
///
/// Colors differing beyond the rounding precision stay distinct.
pub(crate) fn normalize_color(color: Rgb, opacity: Option<f32>) -> String {
  format!(
    "{:.4}-{:.4}-{:.4}-{}",
    color.r,
    color.g,
    color.b,
    opacity.unwrap_or(1.0)
  )
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct NormalizedEffect {
  #[serde(rename = "type")]
  kind: &'static str,
  visible: bool,
  #[serde(skip_serializing_if = "Option::is_none")]
  color: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  offset: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  radius: Option<f32>,
  #[serde(skip_serializing_if = "Option::is_none")]
  spread: Option<f32>,
  #[serde(skip_serializing_if = "Option::is_none")]
  blend_mode: Option<BlendMode>,
  #[serde(skip_serializing_if = "Option::is_none")]
  show_shadow_behind_node: Option<bool>,
}

fn normalize_effect(effect: &Effect) -> NormalizedEffect {
  match effect {
    Effect::DropShadow(shadow) | Effect::InnerShadow(shadow) => NormalizedEffect {
      kind: effect.kind(),
      visible: shadow.visible,
      color: Some(format!(
        "{}-{}-{}-{}",
        shadow.color.r, shadow.color.g, shadow.color.b, shadow.color.a
      )),
      offset: Some(format!("{}-{}", shadow.offset.x, shadow.offset.y)),
      radius: Some(shadow.radius),
      spread: Some(shadow.spread.unwrap_or(0.0)),
      blend_mode: shadow.blend_mode,
      show_shadow_behind_node: Some(shadow.show_shadow_behind_node.unwrap_or(false)),
    },
    Effect::LayerBlur(blur) | Effect::BackgroundBlur(blur) => NormalizedEffect {
      kind: effect.kind(),
      visible: blur.visible,
      color: None,
      offset: None,
      radius: Some(blur.radius),
      spread: None,
      blend_mode: None,
      show_shadow_behind_node: None,
    },
  }
}

/// Canonical key for a node's entire effects array
///
/// Visible effects only, normalized per kind, sorted by kind then by
/// full serialized comparison so ordering differences between nodes do
/// not defeat deduplication.
pub(crate) fn effects_key(effects: &[Effect]) -> Result<String, ExtractionError> {
  let mut normalized = Vec::new();
  for effect in effects.iter().filter(|e| e.visible()) {
    let norm = normalize_effect(effect);
    let json = serde_json::to_string(&norm)?;
    normalized.push((norm.kind, json));
  }
  normalized.sort_by(|a, b| a.0.cmp(b.0).then_with(|| a.1.cmp(&b.1)));

  let body = normalized
    .into_iter()
    .map(|(_, json)| json)
    .collect::<Vec<_>>()
    .join(",");
  Ok(format!("[{body}]"))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct NormalizedText {
  #[serde(skip_serializing_if = "Option::is_none")]
  font_size: Option<f32>,
  #[serde(skip_serializing_if = "Option::is_none")]
  font_name: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  line_height: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  letter_spacing: Option<String>,
  text_decoration: TextDecoration,
  text_case: TextCase,
}

/// Canonical key for a node's typography properties
///
/// Absent decoration and case fall back to their documented defaults
/// (NONE / ORIGINAL) so nodes that merely omit them still merge.
pub(crate) fn text_key(type_style: &TypeStyle) -> Result<String, ExtractionError> {
  let normalized = NormalizedText {
    font_size: type_style.font_size,
    font_name: type_style
      .font_name
      .as_ref()
      .map(|f| format!("{}-{}", f.family, f.style)),
    line_height: type_style.line_height.map(|m| m.canonical()),
    letter_spacing: type_style.letter_spacing.map(|m| m.canonical()),
    text_decoration: type_style.text_decoration.unwrap_or(TextDecoration::None),
    text_case: type_style.text_case.unwrap_or(TextCase::Original),
  };
  Ok(serde_json::to_string(&normalized)?)
}

fn solid_color_occurrences(paints: &[Paint]) -> Vec<TokenDelta> {
  paints
    .iter()
    .filter_map(Paint::as_solid)
    .map(|solid| TokenDelta::ColorOccurrence {
      name: normalize_color(solid.color, solid.opacity),
      color: solid.color,
      opacity: solid.opacity,
    })
    .collect()
}

/// Extraction state for one traversal: the provider, the aggregations
/// being folded into, and the component dedup set
pub(crate) struct Extractor<'a, P: SceneGraphProvider> {
  pub(crate) provider: &'a P,
  pub(crate) tokens: DocumentTokens,
  seen_component_nodes: FxHashSet<String>,
}

impl<'a, P: SceneGraphProvider> Extractor<'a, P> {
  pub(crate) fn new(provider: &'a P) -> Self {
    Self {
      provider,
      tokens: DocumentTokens::default(),
      seen_component_nodes: FxHashSet::default(),
    }
  }

  fn node(&self, id: NodeId) -> &'a SceneNode {
    self.provider.graph().node(id)
  }

  fn style(&self, style_id: Option<&str>) -> Result<Option<StyleRef>, ExtractionError> {
    match style_id {
      Some(style_id) => Ok(self.provider.style_by_id(style_id)?),
      None => Ok(None),
    }
  }

  pub(crate) fn process_fills(&mut self, id: NodeId) -> Result<(), ExtractionError> {
    let node = self.node(id);
    if !Domain::Fill.supports(node.node_type) || node.fills.is_empty() {
      return Ok(());
    }

    let style = self.style(node.fill_style_id.as_deref())?;
    let bucket = if Domain::Text.supports(node.node_type) {
      PaintBucket::Text
    } else if Domain::Icon.supports(node.node_type) {
      PaintBucket::Icon
    } else {
      PaintBucket::Fill
    };

    let mut deltas = vec![TokenDelta::FillRecord {
      bucket,
      record: PaintRecord {
        node_id: node.id.clone(),
        style_id: style.as_ref().map(|s| s.id.clone()),
        paints: node.fills.clone(),
      },
    }];
    if let Some(style) = style {
      deltas.push(TokenDelta::ColorStyle(style));
    }
    deltas.extend(solid_color_occurrences(&node.fills));

    self.apply(&node.id, deltas);
    Ok(())
  }

  pub(crate) fn process_strokes(&mut self, id: NodeId) -> Result<(), ExtractionError> {
    let node = self.node(id);
    if !Domain::Stroke.supports(node.node_type) || node.strokes.is_empty() {
      return Ok(());
    }

    let style = self.style(node.stroke_style_id.as_deref())?;
    let mut deltas = vec![TokenDelta::StrokeRecord(PaintRecord {
      node_id: node.id.clone(),
      style_id: style.as_ref().map(|s| s.id.clone()),
      paints: node.strokes.clone(),
    })];
    if let Some(style) = style {
      deltas.push(TokenDelta::ColorStyle(style));
    }
    deltas.extend(solid_color_occurrences(&node.strokes));

    self.apply(&node.id, deltas);
    Ok(())
  }

  pub(crate) fn process_effects(&mut self, id: NodeId) -> Result<(), ExtractionError> {
    let node = self.node(id);
    if !Domain::Effect.supports(node.node_type) || node.effects.is_empty() {
      return Ok(());
    }

    let style = self.style(node.effect_style_id.as_deref())?;
    let mut deltas = vec![
      TokenDelta::EffectRecord(EffectRecord {
        node_id: node.id.clone(),
        style_id: style.as_ref().map(|s| s.id.clone()),
        effects: node.effects.clone(),
      }),
      TokenDelta::EffectsOccurrence {
        key: effects_key(&node.effects)?,
        effects: node.effects.clone(),
      },
    ];
    if let Some(style) = style {
      deltas.push(TokenDelta::EffectStyle(style));
    }

    self.apply(&node.id, deltas);
    Ok(())
  }

  pub(crate) fn process_text(&mut self, id: NodeId) -> Result<(), ExtractionError> {
    let node = self.node(id);
    if !Domain::Text.supports(node.node_type) {
      return Ok(());
    }

    let type_style = node.type_style.clone().unwrap_or_default();
    let mut deltas = Vec::new();
    if let Some(style_id) = node.text_style_id.as_deref() {
      deltas.push(TokenDelta::TextStyle {
        id: style_id.to_owned(),
        type_style: type_style.clone(),
      });
    }
    deltas.push(TokenDelta::TextOccurrence {
      key: text_key(&type_style)?,
      type_style: type_style.clone(),
    });
    deltas.push(TokenDelta::TextRecord(TextRecord {
      node_id: node.id.clone(),
      style_id: node.text_style_id.clone(),
      type_style,
    }));

    self.apply(&node.id, deltas);
    Ok(())
  }

  pub(crate) fn process_grids(&mut self, id: NodeId) -> Result<(), ExtractionError> {
    let node = self.node(id);
    if !Domain::Grid.supports(node.node_type) || node.layout_grids.is_empty() {
      return Ok(());
    }

    let style = self.style(node.grid_style_id.as_deref())?;
    let mut deltas = vec![TokenDelta::GridRecord(GridRecord {
      node_id: node.id.clone(),
      style_id: style.as_ref().map(|s| s.id.clone()),
      grids: node.layout_grids.clone(),
    })];
    if let Some(style) = style {
      deltas.push(TokenDelta::GridOccurrence {
        style,
        grid: node.layout_grids[0],
      });
    }

    self.apply(&node.id, deltas);
    Ok(())
  }

  pub(crate) fn process_spacing(&mut self, id: NodeId) -> Result<(), ExtractionError> {
    let node = self.node(id);
    if !Domain::Spacing.supports(node.node_type) {
      return Ok(());
    }
    let Some(spacing) = node.spacing else {
      return Ok(());
    };

    // Every present value aggregates by its literal number, zeros included.
    let values = spacing.present_values();
    if values.is_empty() {
      return Ok(());
    }

    let mut deltas = vec![TokenDelta::SpacingRecord(SpacingRecord {
      node_id: node.id.clone(),
      spacing,
    })];
    deltas.extend(values.into_iter().map(TokenDelta::SpacingValue));

    self.apply(&node.id, deltas);
    Ok(())
  }

  pub(crate) fn process_corner_radius(&mut self, id: NodeId) -> Result<(), ExtractionError> {
    let node = self.node(id);
    if !Domain::CornerRadius.supports(node.node_type) {
      return Ok(());
    }
    let Some(corner_radius) = node.corner_radius else {
      return Ok(());
    };

    let values: Vec<f32> = match corner_radius {
      // A uniform zero radius carries no token.
      CornerRadius::Uniform(value) if value == 0.0 => return Ok(()),
      CornerRadius::Uniform(value) => vec![value],
      CornerRadius::Mixed {
        top_left,
        top_right,
        bottom_left,
        bottom_right,
      } => [top_left, top_right, bottom_left, bottom_right]
        .into_iter()
        .flatten()
        .collect(),
    };

    let mut deltas = vec![TokenDelta::CornerRadiusRecord(CornerRadiusRecord {
      node_id: node.id.clone(),
      value: corner_radius,
    })];
    deltas.extend(values.into_iter().map(TokenDelta::CornerRadiusValue));

    self.apply(&node.id, deltas);
    Ok(())
  }

  pub(crate) fn process_component(&mut self, id: NodeId) -> Result<(), ExtractionError> {
    let node = self.node(id);
    if !matches!(node.node_type, NodeType::Component | NodeType::Instance) {
      return Ok(());
    }

    let mut deltas = vec![TokenDelta::ComponentNode];
    if node.node_type == NodeType::Instance {
      if let Some(main) = self.provider.main_component_of(id)? {
        deltas.push(TokenDelta::ComponentOccurrence(main));
      }
    }

    self.apply(&node.id, deltas);
    Ok(())
  }

  /// Folds a node's deltas into the aggregation state
  fn apply(&mut self, node_id: &str, deltas: Vec<TokenDelta>) {
    for delta in deltas {
      self.apply_one(node_id, delta);
    }
  }

  fn apply_one(&mut self, node_id: &str, delta: TokenDelta) {
    let tokens = &mut self.tokens;
    match delta {
      TokenDelta::FillRecord { bucket, record } => match bucket {
        PaintBucket::Fill => tokens.colors.fills.push(record),
        PaintBucket::Text => tokens.colors.text.push(record),
        PaintBucket::Icon => tokens.colors.icons.push(record),
      },
      TokenDelta::StrokeRecord(record) => tokens.colors.strokes.push(record),
      TokenDelta::ColorOccurrence {
        name,
        color,
        opacity,
      } => tokens.colors.unique_colors.upsert(
        node_id,
        RecordPolicy::CountAndAppend,
        |key| key.name == name,
        || ColorKey {
          name: name.clone(),
          color,
          opacity,
        },
      ),
      TokenDelta::ColorStyle(style) => tokens.colors.unique_styles.upsert(
        node_id,
        RecordPolicy::CountAndAppend,
        |key| key.id == style.id,
        || StyleKey {
          id: style.id.clone(),
          name: style.name.clone(),
        },
      ),
      TokenDelta::EffectRecord(record) => tokens.effects.effects.push(record),
      TokenDelta::EffectsOccurrence { key, effects } => tokens.effects.unique_effects.upsert(
        node_id,
        RecordPolicy::DistinctNodes,
        |existing| existing.key == key,
        || EffectsKey {
          key: key.clone(),
          effects,
        },
      ),
      TokenDelta::EffectStyle(style) => tokens.effects.unique_styles.upsert(
        node_id,
        RecordPolicy::CountAndAppend,
        |key| key.id == style.id,
        || StyleKey {
          id: style.id.clone(),
          name: style.name.clone(),
        },
      ),
      TokenDelta::TextRecord(record) => tokens.text.nodes.push(record),
      TokenDelta::TextOccurrence { key, type_style } => tokens.text.unique_text.upsert(
        node_id,
        RecordPolicy::CountAppendOnce,
        |existing| existing.key == key,
        || TextKey {
          key: key.clone(),
          type_style,
        },
      ),
      TokenDelta::TextStyle { id, type_style } => tokens.text.unique_styles.upsert(
        node_id,
        RecordPolicy::CountAndAppend,
        |key| key.id == id,
        || TextStyleKey {
          id: id.clone(),
          type_style,
        },
      ),
      TokenDelta::GridRecord(record) => tokens.grids.grids.push(record),
      TokenDelta::GridOccurrence { style, grid } => tokens.grids.unique_grids.upsert(
        node_id,
        RecordPolicy::CountAndAppend,
        |key| key.id == style.id,
        || GridKey {
          id: style.id.clone(),
          name: style.name.clone(),
          grid,
        },
      ),
      TokenDelta::SpacingRecord(record) => tokens.spacing.nodes.push(record),
      TokenDelta::SpacingValue(value) => tokens.spacing.unique_spacing.upsert(
        node_id,
        RecordPolicy::CountAndAppend,
        |key| key.value == value,
        || ScalarKey { value },
      ),
      TokenDelta::CornerRadiusRecord(record) => tokens.corner_radius.nodes.push(record),
      TokenDelta::CornerRadiusValue(value) => tokens.corner_radius.unique_corner_radius.upsert(
        node_id,
        RecordPolicy::CountAndAppend,
        |key| key.value == value,
        || ScalarKey { value },
      ),
      TokenDelta::ComponentNode => {
        if self.seen_component_nodes.insert(node_id.to_owned()) {
          tokens.components.nodes.push(node_id.to_owned());
        }
      }
      TokenDelta::ComponentOccurrence(main) => tokens.components.unique_components.upsert(
        node_id,
        RecordPolicy::CountAndAppend,
        |key| key.id == main.id,
        || ComponentKey {
          id: main.id.clone(),
          name: main.name.clone(),
        },
      ),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::geometry::Point;
  use crate::scene::{BlurEffect, ShadowEffect};

  #[test]
  fn color_key_rounds_to_four_decimals() {
    let base = normalize_color(Rgb::new(0.1, 0.2, 0.3), Some(1.0));
    let near = normalize_color(Rgb::new(0.10004, 0.2, 0.3), Some(1.0));
    let far = normalize_color(Rgb::new(0.10006, 0.2, 0.3), Some(1.0));

    assert_eq!(base, "0.1000-0.2000-0.3000-1");
    assert_eq!(base, near);
    assert_ne!(base, far);
  }

  #[test]
  fn color_key_distinguishes_opacity() {
    let opaque = normalize_color(Rgb::new(0.5, 0.5, 0.5), Some(1.0));
    let faded = normalize_color(Rgb::new(0.5, 0.5, 0.5), Some(0.5));
    assert_ne!(opaque, faded);
    // Absent opacity defaults to 1 and merges with explicit 1.
    assert_eq!(opaque, normalize_color(Rgb::new(0.5, 0.5, 0.5), None));
  }

  #[test]
  fn effects_key_ignores_declaration_order_and_hidden_effects() {
    let shadow = Effect::DropShadow(ShadowEffect {
      color: crate::color::Rgba::new(0.0, 0.0, 0.0, 0.25),
      offset: Point::new(0.0, 2.0),
      radius: 4.0,
      spread: None,
      blend_mode: Some(BlendMode::Normal),
      show_shadow_behind_node: None,
      visible: true,
    });
    let blur = Effect::LayerBlur(BlurEffect {
      radius: 10.0,
      visible: true,
    });
    let hidden_blur = Effect::LayerBlur(BlurEffect {
      radius: 99.0,
      visible: false,
    });

    let forward = effects_key(&[shadow, blur]).unwrap();
    let backward = effects_key(&[blur, shadow]).unwrap();
    let with_hidden = effects_key(&[blur, hidden_blur, shadow]).unwrap();

    assert_eq!(forward, backward);
    assert_eq!(forward, with_hidden);
    assert_ne!(forward, effects_key(&[blur]).unwrap());
  }

  #[test]
  fn text_key_applies_decoration_and_case_defaults() {
    let explicit = TypeStyle {
      font_size: Some(16.0),
      text_decoration: Some(TextDecoration::None),
      text_case: Some(TextCase::Original),
      ..TypeStyle::default()
    };
    let implicit = TypeStyle {
      font_size: Some(16.0),
      ..TypeStyle::default()
    };
    assert_eq!(text_key(&explicit).unwrap(), text_key(&implicit).unwrap());
  }

  #[test]
  fn solid_occurrences_skip_non_solid_paints() {
    let paints = vec![
      Paint::solid(Rgb::new(1.0, 0.0, 0.0)),
      Paint::gradient(),
      Paint::solid(Rgb::new(0.0, 0.0, 1.0)),
    ];
    let deltas = solid_color_occurrences(&paints);
    assert_eq!(deltas.len(), 2);
    assert!(deltas
      .iter()
      .all(|d| matches!(d, TokenDelta::ColorOccurrence { .. })));
  }
}
