//! Top-level analysis entry points
//!
//! [`Analyzer`] wraps a [`SceneGraphProvider`] and exposes the two
//! operations hosts call: selection contrast-pair resolution and
//! full-document token extraction.

use crate::background::{self, SelectionPayload};
use crate::extract::{extract_document, DocumentTokens};
use crate::scene::SceneGraphProvider;
use serde::Serialize;

/// Envelope around a full-document extraction result
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentPayload {
  pub success: bool,
  pub message: String,
  pub data: DocumentTokens,
}

/// The analysis engine over one host document
///
/// # Examples
///
/// ```
/// use tokenlens::{Analyzer, InMemoryProvider, NodeType, SceneGraph, SceneNode};
///
/// let graph = SceneGraph::new(SceneNode::new("page", NodeType::Page));
/// let analyzer = Analyzer::new(InMemoryProvider::new(graph));
/// let payload = analyzer.document_payload();
/// assert!(payload.success);
/// ```
pub struct Analyzer<P: SceneGraphProvider> {
  provider: P,
}

impl<P: SceneGraphProvider> Analyzer<P> {
  pub fn new(provider: P) -> Self {
    Self { provider }
  }

  /// The wrapped provider
  pub fn provider(&self) -> &P {
    &self.provider
  }

  /// Resolves the current selection into contrast pairs or a notice
  ///
  /// Selections whose backgrounds cannot be resolved, or that sit under
  /// unsupported blend modes, produce a notice payload instead of pairs.
  pub fn selection_payload(&self) -> SelectionPayload {
    background::build_selection_payload(&self.provider)
  }

  /// Extracts design tokens from the entire document
  pub fn document_payload(&self) -> DocumentPayload {
    DocumentPayload {
      success: true,
      message: "Read from file".to_owned(),
      data: extract_document(&self.provider),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::color::Rgb;
  use crate::scene::{InMemoryProvider, NodeType, Paint, SceneGraph, SceneNode};

  #[test]
  fn document_payload_wraps_extraction_in_success_envelope() {
    let mut graph = SceneGraph::new(SceneNode::new("page", NodeType::Page));
    graph.add_child(
      graph.root(),
      SceneNode::new("rect", NodeType::Rectangle)
        .with_fills(vec![Paint::solid(Rgb::new(1.0, 0.0, 0.0))]),
    );
    let analyzer = Analyzer::new(InMemoryProvider::new(graph));

    let payload = analyzer.document_payload();
    assert!(payload.success);
    assert_eq!(payload.message, "Read from file");
    assert_eq!(payload.data.colors.fills.len(), 1);
    assert_eq!(payload.data.colors.unique_colors.len(), 1);
  }

  #[test]
  fn payload_serializes_with_camel_case_envelope() {
    let graph = SceneGraph::new(SceneNode::new("page", NodeType::Page));
    let analyzer = Analyzer::new(InMemoryProvider::new(graph));

    let json = serde_json::to_value(analyzer.document_payload()).unwrap();
    assert_eq!(json["success"], true);
    assert_eq!(json["message"], "Read from file");
    assert!(json["data"].is_object());
  }
}
