//! Token extraction and aggregation
//!
//! Full-document traversal that pulls every design-token-relevant
//! property into per-domain collections: raw occurrence lists plus
//! frequency-ranked unique summaries keyed by canonical representations.
//!
//! # Frequency Bookkeeping
//!
//! Each unique entry tracks a frequency and the ids of the nodes it was
//! seen on. The pairing behavior differs per domain (see
//! [`RecordPolicy`]): most domains append the node id on every canonical
//! match, so a node contributing the same color through two paints
//! appears twice; typography counts every match but appends each node
//! once; effects advance frequency and node ids only for new nodes.

mod domains;
mod traverse;

pub use domains::Domain;
pub use traverse::extract_document;

use crate::scene::{
  AutoLayoutSpacing, CornerRadius, Effect, LayoutGrid, Paint, TypeStyle,
};
use crate::color::Rgb;
use serde::Serialize;

/// How a canonical match updates an existing aggregation entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordPolicy {
  /// Increment frequency and append the node id unconditionally
  CountAndAppend,
  /// Increment frequency on every match; append each node id once
  CountAppendOnce,
  /// Advance frequency and node ids only for nodes not yet recorded
  DistinctNodes,
}

/// One deduplicated aggregation entry
///
/// `node_ids` is insertion-ordered. Whether it may repeat a node id
/// depends on the domain's [`RecordPolicy`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregationEntry<K> {
  /// Canonical key and its display payload
  #[serde(flatten)]
  pub key: K,
  /// Number of canonical occurrences folded into this entry
  pub frequency: u32,
  /// Ids of the nodes the occurrences were found on
  pub node_ids: Vec<String>,
}

/// An insertion-ordered list of unique entries for one domain
///
/// Uniqueness is by canonical key: no two entries ever share one. Lookup
/// is a linear scan, matching the modest entry counts real documents
/// produce.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct FrequencyList<K> {
  entries: Vec<AggregationEntry<K>>,
}

impl<K> Default for FrequencyList<K> {
  fn default() -> Self {
    Self {
      entries: Vec::new(),
    }
  }
}

impl<K> FrequencyList<K> {
  /// Folds one canonical occurrence into the list
  ///
  /// `matches` decides whether an existing entry's key is canonically
  /// equal; `make` builds the key only when a new entry is inserted.
  pub fn upsert(
    &mut self,
    node_id: &str,
    policy: RecordPolicy,
    matches: impl Fn(&K) -> bool,
    make: impl FnOnce() -> K,
  ) {
    match self.entries.iter_mut().find(|entry| matches(&entry.key)) {
      Some(entry) => {
        let already_recorded = entry.node_ids.iter().any(|id| id == node_id);
        match policy {
          RecordPolicy::CountAndAppend => {
            entry.frequency += 1;
            entry.node_ids.push(node_id.to_owned());
          }
          RecordPolicy::CountAppendOnce => {
            entry.frequency += 1;
            if !already_recorded {
              entry.node_ids.push(node_id.to_owned());
            }
          }
          RecordPolicy::DistinctNodes => {
            if !already_recorded {
              entry.frequency += 1;
              entry.node_ids.push(node_id.to_owned());
            }
          }
        }
      }
      None => self.entries.push(AggregationEntry {
        key: make(),
        frequency: 1,
        node_ids: vec![node_id.to_owned()],
      }),
    }
  }

  /// The entries in insertion order
  pub fn entries(&self) -> &[AggregationEntry<K>] {
    &self.entries
  }

  /// Number of unique entries
  pub fn len(&self) -> usize {
    self.entries.len()
  }

  /// True when no occurrence has been recorded
  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  /// Finds the first entry whose key satisfies the predicate
  pub fn find(&self, matches: impl Fn(&K) -> bool) -> Option<&AggregationEntry<K>> {
    self.entries.iter().find(|entry| matches(&entry.key))
  }
}

/// Canonical color occurrence: rounded channel key plus display payload
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ColorKey {
  /// Canonical `r-g-b-opacity` string, channels rounded to 4 decimals
  pub name: String,
  /// The first raw color folded into this entry
  pub color: Rgb,
  /// The first raw paint opacity folded into this entry
  #[serde(skip_serializing_if = "Option::is_none")]
  pub opacity: Option<f32>,
}

/// Scalar token occurrence (spacing values, corner radii)
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScalarKey {
  /// The literal numeric value
  pub value: f32,
}

/// A shared style occurrence keyed by style id
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleKey {
  pub id: String,
  pub name: String,
}

/// A shared text style occurrence: id plus the typography snapshot of
/// the first node seen using it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextStyleKey {
  pub id: String,
  #[serde(flatten)]
  pub type_style: TypeStyle,
}

/// A node's entire effects array as one canonical unit
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EffectsKey {
  /// Canonical JSON of the visible, normalized, sorted effects
  #[serde(skip)]
  pub key: String,
  /// The raw effects array of the first node seen with this key
  #[serde(rename = "value")]
  pub effects: Vec<Effect>,
}

/// Canonical typography occurrence
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextKey {
  /// Canonical JSON of the normalized typography properties
  #[serde(skip)]
  pub key: String,
  /// The raw typography of the first node seen with this key
  #[serde(rename = "value")]
  pub type_style: TypeStyle,
}

/// A layout-grid style occurrence keyed by grid style id
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GridKey {
  pub id: String,
  pub name: String,
  /// The first grid recorded under this style
  #[serde(rename = "layoutGrids")]
  pub grid: LayoutGrid,
}

/// A main-component occurrence keyed by component id
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentKey {
  pub id: String,
  pub name: String,
}

/// Raw paint occurrence on one node
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaintRecord {
  pub node_id: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub style_id: Option<String>,
  pub paints: Vec<Paint>,
}

/// Raw effects occurrence on one node
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EffectRecord {
  pub node_id: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub style_id: Option<String>,
  pub effects: Vec<Effect>,
}

/// Raw typography occurrence on one node
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TextRecord {
  pub node_id: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub style_id: Option<String>,
  pub type_style: TypeStyle,
}

/// Raw layout-grid occurrence on one node
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GridRecord {
  pub node_id: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub style_id: Option<String>,
  pub grids: Vec<LayoutGrid>,
}

/// Raw auto-layout spacing occurrence on one node
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpacingRecord {
  pub node_id: String,
  #[serde(flatten)]
  pub spacing: AutoLayoutSpacing,
}

/// Raw corner-radius occurrence on one node
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CornerRadiusRecord {
  pub node_id: String,
  pub value: CornerRadius,
}

/// A flagged low-contrast text/background pair
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContrastFinding {
  /// Id of the text node
  pub node_id: String,
  /// Absolute APCA score of the pair
  pub apca_score_absolute: i32,
  /// Readability band of the absolute score
  pub band: String,
}

/// Color domain aggregations: fills and strokes, bucketed raw lists plus
/// unique colors and shared styles
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ColorTokens {
  pub fills: Vec<PaintRecord>,
  pub strokes: Vec<PaintRecord>,
  pub text: Vec<PaintRecord>,
  pub icons: Vec<PaintRecord>,
  pub unique_styles: FrequencyList<StyleKey>,
  pub unique_colors: FrequencyList<ColorKey>,
}

/// Spacing domain aggregations
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpacingTokens {
  pub nodes: Vec<SpacingRecord>,
  pub unique_spacing: FrequencyList<ScalarKey>,
}

/// Effect domain aggregations
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EffectTokens {
  pub effects: Vec<EffectRecord>,
  pub unique_effects: FrequencyList<EffectsKey>,
  pub unique_styles: FrequencyList<StyleKey>,
}

/// Typography domain aggregations
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TextTokens {
  pub nodes: Vec<TextRecord>,
  pub unique_text: FrequencyList<TextKey>,
  pub unique_styles: FrequencyList<TextStyleKey>,
}

/// Layout-grid domain aggregations
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GridTokens {
  pub grids: Vec<GridRecord>,
  pub unique_grids: FrequencyList<GridKey>,
}

/// Corner-radius domain aggregations
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CornerRadiusTokens {
  pub nodes: Vec<CornerRadiusRecord>,
  pub unique_corner_radius: FrequencyList<ScalarKey>,
}

/// Component domain aggregations
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentTokens {
  /// Component and instance nodes seen, deduplicated by id
  pub nodes: Vec<String>,
  pub unique_components: FrequencyList<ComponentKey>,
}

/// Low-contrast findings from the inline text checks
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessibilityIssues {
  pub text_nodes: Vec<ContrastFinding>,
}

/// The terminal result of a full-document extraction run
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentTokens {
  pub colors: ColorTokens,
  pub spacing: SpacingTokens,
  pub effects: EffectTokens,
  pub text: TextTokens,
  pub grids: GridTokens,
  pub corner_radius: CornerRadiusTokens,
  pub components: ComponentTokens,
  #[serde(rename = "accessibility_issue")]
  pub accessibility_issue: AccessibilityIssues,
  /// Text nodes carrying a shared text style reference
  pub styled_text_nodes: Vec<String>,
  /// Text nodes styled inline
  pub raw_text_nodes: Vec<String>,
}
