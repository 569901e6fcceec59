//! Scene node types
//!
//! The host document is a tree of typed visual nodes. This module defines
//! the node snapshot the analysis engine consumes: paints, effects, blend
//! modes, typography, auto-layout spacing, corner radii, and layout grids,
//! plus the node type tags that gate which extraction domains apply.
//!
//! Nodes are supplied fresh per analysis run and treated read-only.

use crate::color::{Rgb, Rgba};
use crate::geometry::{Point, Rect};
use serde::{Deserialize, Serialize};

/// Enumerated node type tag
///
/// Mirrors the host's node taxonomy. Extraction domains are gated by a
/// static allow-list over these tags (see `extract::Domain`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NodeType {
  BooleanOperation,
  Component,
  ComponentSet,
  Connector,
  Document,
  Ellipse,
  Frame,
  Group,
  Highlight,
  Instance,
  Line,
  Page,
  Polygon,
  Rectangle,
  Section,
  ShapeWithText,
  Slice,
  Stamp,
  Star,
  Sticky,
  Table,
  TableCell,
  Text,
  TextSublayer,
  Vector,
  WashiTape,
}

impl NodeType {
  /// True for the page/document containers that bound ancestor walks
  pub fn is_container_root(self) -> bool {
    matches!(self, NodeType::Page | NodeType::Document)
  }
}

/// Compositing blend mode
///
/// The supported set is explicit: any mode the contrast pipeline cannot
/// evaluate is unsupported and poisons background resolution for the
/// whole intersection tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BlendMode {
  PassThrough,
  Normal,
  Darken,
  Multiply,
  LinearBurn,
  ColorBurn,
  Lighten,
  Screen,
  LinearDodge,
  ColorDodge,
  Overlay,
  SoftLight,
  HardLight,
  Difference,
  Exclusion,
  Hue,
  Saturation,
  Color,
  Luminosity,
}

impl BlendMode {
  /// Whether perceptual contrast can be evaluated under this mode
  ///
  /// Linear burn has no meaningful foreground/background decomposition
  /// for contrast purposes and is the one unsupported mode today. New
  /// unsupported modes are added here, not in a runtime list.
  pub fn is_supported(self) -> bool {
    !matches!(self, BlendMode::LinearBurn)
  }
}

/// Attributes shared by all paint kinds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaintAttrs {
  /// Paint-level opacity, absent when the host omitted it
  #[serde(skip_serializing_if = "Option::is_none")]
  pub opacity: Option<f32>,
  /// Paint visibility toggle
  pub visible: bool,
}

/// A solid color paint
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SolidPaint {
  /// Normalized fill color
  pub color: Rgb,
  /// Paint-level opacity, absent when the host omitted it
  #[serde(skip_serializing_if = "Option::is_none")]
  pub opacity: Option<f32>,
  /// Paint visibility toggle
  pub visible: bool,
  /// Paint-level blend mode, absent when the host omitted it
  #[serde(skip_serializing_if = "Option::is_none")]
  pub blend_mode: Option<BlendMode>,
}

impl SolidPaint {
  /// A visible, fully opaque solid paint with normal blending
  pub fn new(color: Rgb) -> Self {
    Self {
      color,
      opacity: Some(1.0),
      visible: true,
      blend_mode: Some(BlendMode::Normal),
    }
  }

  /// Sets the paint opacity
  pub fn with_opacity(mut self, opacity: f32) -> Self {
    self.opacity = Some(opacity);
    self
  }

  /// Sets the paint blend mode
  pub fn with_blend_mode(mut self, blend_mode: BlendMode) -> Self {
    self.blend_mode = Some(blend_mode);
    self
  }

  /// Hides the paint
  pub fn hidden(mut self) -> Self {
    self.visible = false;
    self
  }
}

/// A paint in a fill or stroke list
///
/// Only solid paints participate in background resolution and color
/// aggregation; gradients, images, and video are recognized but opaque
/// to both ("not solid").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Paint {
  Solid(SolidPaint),
  Gradient(PaintAttrs),
  Image(PaintAttrs),
  Video(PaintAttrs),
}

impl Paint {
  /// A visible, fully opaque solid paint
  pub fn solid(color: Rgb) -> Self {
    Paint::Solid(SolidPaint::new(color))
  }

  /// A visible, fully opaque gradient placeholder paint
  pub fn gradient() -> Self {
    Paint::Gradient(PaintAttrs {
      opacity: Some(1.0),
      visible: true,
    })
  }

  /// Paint visibility toggle
  pub fn visible(&self) -> bool {
    match self {
      Paint::Solid(p) => p.visible,
      Paint::Gradient(a) | Paint::Image(a) | Paint::Video(a) => a.visible,
    }
  }

  /// Paint-level opacity as reported by the host
  pub fn opacity(&self) -> Option<f32> {
    match self {
      Paint::Solid(p) => p.opacity,
      Paint::Gradient(a) | Paint::Image(a) | Paint::Video(a) => a.opacity,
    }
  }

  /// The solid payload, if this paint is solid
  pub fn as_solid(&self) -> Option<&SolidPaint> {
    match self {
      Paint::Solid(p) => Some(p),
      _ => None,
    }
  }

  /// True for solid paints
  pub fn is_solid(&self) -> bool {
    matches!(self, Paint::Solid(_))
  }
}

/// A drop or inner shadow effect
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShadowEffect {
  /// Shadow color including alpha
  pub color: Rgba,
  /// Shadow offset from the node
  pub offset: Point,
  /// Blur radius
  pub radius: f32,
  /// Shadow spread, absent when the host omitted it
  #[serde(skip_serializing_if = "Option::is_none")]
  pub spread: Option<f32>,
  /// Shadow blend mode
  #[serde(skip_serializing_if = "Option::is_none")]
  pub blend_mode: Option<BlendMode>,
  /// Whether the shadow paints behind a translucent node
  #[serde(skip_serializing_if = "Option::is_none")]
  pub show_shadow_behind_node: Option<bool>,
  /// Effect visibility toggle
  pub visible: bool,
}

/// A layer or background blur effect
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlurEffect {
  /// Blur radius
  pub radius: f32,
  /// Effect visibility toggle
  pub visible: bool,
}

/// A visual effect attached to a node
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Effect {
  DropShadow(ShadowEffect),
  InnerShadow(ShadowEffect),
  LayerBlur(BlurEffect),
  BackgroundBlur(BlurEffect),
}

impl Effect {
  /// Effect visibility toggle
  pub fn visible(&self) -> bool {
    match self {
      Effect::DropShadow(e) | Effect::InnerShadow(e) => e.visible,
      Effect::LayerBlur(e) | Effect::BackgroundBlur(e) => e.visible,
    }
  }

  /// The host-facing tag for this effect kind
  pub fn kind(&self) -> &'static str {
    match self {
      Effect::DropShadow(_) => "DROP_SHADOW",
      Effect::InnerShadow(_) => "INNER_SHADOW",
      Effect::LayerBlur(_) => "LAYER_BLUR",
      Effect::BackgroundBlur(_) => "BACKGROUND_BLUR",
    }
  }
}

/// A font family/style pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FontName {
  pub family: String,
  pub style: String,
}

/// A typography metric that is either automatic or a valued unit
///
/// Line height and letter spacing share this shape in the host model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "unit", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TypeMetric {
  Auto,
  Pixels { value: f32 },
  Percent { value: f32 },
}

impl TypeMetric {
  /// Canonical `value-unit` form used in typography keys
  pub fn canonical(&self) -> String {
    match self {
      TypeMetric::Auto => "AUTO".to_owned(),
      TypeMetric::Pixels { value } => format!("{value}-PIXELS"),
      TypeMetric::Percent { value } => format!("{value}-PERCENT"),
    }
  }
}

/// Text decoration applied to a text node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TextDecoration {
  None,
  Underline,
  Strikethrough,
}

/// Letter casing transformation applied to a text node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TextCase {
  Original,
  Upper,
  Lower,
  Title,
}

/// Typography properties carried by text nodes
///
/// Every field is optional; hosts omit properties freely and the
/// canonicalizer fills documented defaults (decoration NONE, case
/// ORIGINAL) only at key-building time.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeStyle {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub font_size: Option<f32>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub font_name: Option<FontName>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub line_height: Option<TypeMetric>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub letter_spacing: Option<TypeMetric>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub text_decoration: Option<TextDecoration>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub text_case: Option<TextCase>,
}

/// Auto-layout spacing properties
///
/// Absent fields mean the node does not carry that property; present
/// values aggregate by their literal number, zero included.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutoLayoutSpacing {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub item_spacing: Option<f32>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub counter_axis_spacing: Option<f32>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub padding_top: Option<f32>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub padding_right: Option<f32>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub padding_bottom: Option<f32>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub padding_left: Option<f32>,
}

impl AutoLayoutSpacing {
  /// The spacing values present on this node, in declaration order
  pub fn present_values(&self) -> Vec<f32> {
    [
      self.item_spacing,
      self.counter_axis_spacing,
      self.padding_top,
      self.padding_right,
      self.padding_bottom,
      self.padding_left,
    ]
    .into_iter()
    .flatten()
    .collect()
  }
}

/// Corner radius: uniform, or the host's "mixed" sentinel with per-corner
/// values
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CornerRadius {
  Uniform(f32),
  #[serde(rename_all = "camelCase")]
  Mixed {
    top_left: Option<f32>,
    top_right: Option<f32>,
    bottom_left: Option<f32>,
    bottom_right: Option<f32>,
  },
}

/// Layout grid pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GridPattern {
  Columns,
  Rows,
  Grid,
}

/// A layout grid attached to a container node
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutGrid {
  pub pattern: GridPattern,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub section_size: Option<f32>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub count: Option<u32>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub gutter_size: Option<f32>,
  pub visible: bool,
}

/// A read-only snapshot of one host document node
///
/// Tree structure (parent/children/sibling order) lives in
/// [`SceneGraph`](crate::scene::SceneGraph); this struct carries only the
/// node's own properties. Optional fields model properties the host
/// simply does not expose on every node type.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneNode {
  /// Stable host identifier
  pub id: String,
  /// Display name
  pub name: String,
  /// Node type tag
  pub node_type: NodeType,
  /// Layer visibility toggle
  pub visible: bool,
  /// Element-level opacity, absent when the node type has none
  pub opacity: Option<f32>,
  /// Element-level blend mode, absent when the node type has none
  pub blend_mode: Option<BlendMode>,
  /// Ordered fill paints, last paint on top
  pub fills: Vec<Paint>,
  /// Ordered stroke paints, last paint on top
  pub strokes: Vec<Paint>,
  /// Ordered effects
  pub effects: Vec<Effect>,
  /// Absolute bounding box, absent for unplaced nodes
  pub bounding_box: Option<Rect>,
  /// Shared fill style reference
  pub fill_style_id: Option<String>,
  /// Shared stroke style reference
  pub stroke_style_id: Option<String>,
  /// Shared effect style reference
  pub effect_style_id: Option<String>,
  /// Shared text style reference
  pub text_style_id: Option<String>,
  /// Shared grid style reference
  pub grid_style_id: Option<String>,
  /// Layout grids on container nodes
  pub layout_grids: Vec<LayoutGrid>,
  /// Typography, present on text nodes
  pub type_style: Option<TypeStyle>,
  /// Auto-layout spacing, present on auto-layout containers
  pub spacing: Option<AutoLayoutSpacing>,
  /// Corner radius, present on shapes that support it
  pub corner_radius: Option<CornerRadius>,
  /// Backing main component id, present on instances
  pub main_component_id: Option<String>,
}

impl SceneNode {
  /// Creates a visible node with no paints or properties
  ///
  /// The display name defaults to the id; override with
  /// [`with_name`](Self::with_name).
  pub fn new(id: impl Into<String>, node_type: NodeType) -> Self {
    let id = id.into();
    Self {
      name: id.clone(),
      id,
      node_type,
      visible: true,
      opacity: None,
      blend_mode: None,
      fills: Vec::new(),
      strokes: Vec::new(),
      effects: Vec::new(),
      bounding_box: None,
      fill_style_id: None,
      stroke_style_id: None,
      effect_style_id: None,
      text_style_id: None,
      grid_style_id: None,
      layout_grids: Vec::new(),
      type_style: None,
      spacing: None,
      corner_radius: None,
      main_component_id: None,
    }
  }

  /// Sets the display name
  pub fn with_name(mut self, name: impl Into<String>) -> Self {
    self.name = name.into();
    self
  }

  /// Sets the fill list
  pub fn with_fills(mut self, fills: Vec<Paint>) -> Self {
    self.fills = fills;
    self
  }

  /// Sets the stroke list
  pub fn with_strokes(mut self, strokes: Vec<Paint>) -> Self {
    self.strokes = strokes;
    self
  }

  /// Sets the effect list
  pub fn with_effects(mut self, effects: Vec<Effect>) -> Self {
    self.effects = effects;
    self
  }

  /// Sets the absolute bounding box
  pub fn with_bounds(mut self, bounds: Rect) -> Self {
    self.bounding_box = Some(bounds);
    self
  }

  /// Sets the element-level opacity
  pub fn with_opacity(mut self, opacity: f32) -> Self {
    self.opacity = Some(opacity);
    self
  }

  /// Sets the element-level blend mode
  pub fn with_blend_mode(mut self, blend_mode: BlendMode) -> Self {
    self.blend_mode = Some(blend_mode);
    self
  }

  /// Hides the node
  pub fn hidden(mut self) -> Self {
    self.visible = false;
    self
  }

  /// Sets the typography properties
  pub fn with_type_style(mut self, type_style: TypeStyle) -> Self {
    self.type_style = Some(type_style);
    self
  }

  /// Sets the auto-layout spacing
  pub fn with_spacing(mut self, spacing: AutoLayoutSpacing) -> Self {
    self.spacing = Some(spacing);
    self
  }

  /// Sets the corner radius
  pub fn with_corner_radius(mut self, corner_radius: CornerRadius) -> Self {
    self.corner_radius = Some(corner_radius);
    self
  }

  /// Sets the layout grids
  pub fn with_layout_grids(mut self, grids: Vec<LayoutGrid>) -> Self {
    self.layout_grids = grids;
    self
  }

  /// Sets the shared fill style reference
  pub fn with_fill_style_id(mut self, id: impl Into<String>) -> Self {
    self.fill_style_id = Some(id.into());
    self
  }

  /// Sets the shared stroke style reference
  pub fn with_stroke_style_id(mut self, id: impl Into<String>) -> Self {
    self.stroke_style_id = Some(id.into());
    self
  }

  /// Sets the shared effect style reference
  pub fn with_effect_style_id(mut self, id: impl Into<String>) -> Self {
    self.effect_style_id = Some(id.into());
    self
  }

  /// Sets the shared text style reference
  pub fn with_text_style_id(mut self, id: impl Into<String>) -> Self {
    self.text_style_id = Some(id.into());
    self
  }

  /// Sets the shared grid style reference
  pub fn with_grid_style_id(mut self, id: impl Into<String>) -> Self {
    self.grid_style_id = Some(id.into());
    self
  }

  /// Sets the backing main component id
  pub fn with_main_component_id(mut self, id: impl Into<String>) -> Self {
    self.main_component_id = Some(id.into());
    self
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn linear_burn_is_the_unsupported_mode() {
    assert!(!BlendMode::LinearBurn.is_supported());
    assert!(BlendMode::Normal.is_supported());
    assert!(BlendMode::PassThrough.is_supported());
    assert!(BlendMode::Multiply.is_supported());
  }

  #[test]
  fn paint_accessors_cover_all_kinds() {
    let solid = Paint::solid(Rgb::new(1.0, 0.0, 0.0));
    assert!(solid.is_solid());
    assert!(solid.visible());
    assert_eq!(solid.opacity(), Some(1.0));

    let gradient = Paint::gradient();
    assert!(!gradient.is_solid());
    assert!(gradient.as_solid().is_none());
  }

  #[test]
  fn paint_serializes_with_host_type_tag() {
    let json = serde_json::to_value(Paint::solid(Rgb::new(0.0, 0.0, 0.0))).unwrap();
    assert_eq!(json["type"], "SOLID");
    let json = serde_json::to_value(Paint::gradient()).unwrap();
    assert_eq!(json["type"], "GRADIENT");
  }

  #[test]
  fn type_metric_canonical_forms() {
    assert_eq!(TypeMetric::Auto.canonical(), "AUTO");
    assert_eq!(TypeMetric::Pixels { value: 24.0 }.canonical(), "24-PIXELS");
    assert_eq!(
      TypeMetric::Percent { value: 150.0 }.canonical(),
      "150-PERCENT"
    );
  }

  #[test]
  fn spacing_present_values_keep_declaration_order() {
    let spacing = AutoLayoutSpacing {
      item_spacing: Some(8.0),
      counter_axis_spacing: None,
      padding_top: Some(16.0),
      padding_right: None,
      padding_bottom: Some(16.0),
      padding_left: None,
    };
    assert_eq!(spacing.present_values(), vec![8.0, 16.0, 16.0]);
  }
}
