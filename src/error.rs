//! Error types for tokenlens
//!
//! This module provides error types for both analysis subsystems:
//! - Scene errors (provider lookups, malformed graph references)
//! - Extraction errors (canonical key construction, provider failures
//!   surfaced during token aggregation)
//!
//! All errors use the `thiserror` crate for minimal boilerplate and
//! proper error trait implementations. Most failure modes in this crate
//! are recovered locally (logged and skipped per node); only provider
//! boundary failures travel through these types.

use thiserror::Error;

/// Result type alias for tokenlens operations
///
/// # Examples
///
/// ```
/// use tokenlens::Result;
///
/// fn lookup_style(id: &str) -> Result<()> {
///     Ok(())
/// }
/// ```
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type for tokenlens
///
/// Each variant wraps a more specific error type for that subsystem.
#[derive(Error, Debug)]
pub enum Error {
  /// Scene graph or provider lookup error
  #[error("Scene error: {0}")]
  Scene(#[from] SceneError),

  /// Token extraction error
  #[error("Extraction error: {0}")]
  Extraction(#[from] ExtractionError),

  /// Generic error for miscellaneous issues
  #[error("{0}")]
  Other(String),
}

/// Errors raised at the scene graph provider boundary
///
/// The provider supplies styles and main components by id. These lookups
/// are the only suspension points of an analysis run and the only place
/// the host can fail us mid-traversal.
#[derive(Error, Debug, Clone)]
pub enum SceneError {
  /// A shared style could not be resolved
  #[error("style lookup failed for '{style_id}': {message}")]
  StyleLookup { style_id: String, message: String },

  /// The main component backing an instance could not be resolved
  #[error("main component lookup failed for node '{node_id}': {message}")]
  MainComponentLookup { node_id: String, message: String },

  /// A node id did not resolve to a node in the current snapshot
  #[error("unknown node '{0}' in scene graph")]
  UnknownNode(String),
}

/// Errors that occur while extracting and canonicalizing design tokens
///
/// These are contained per node and per domain: a failing extractor
/// contributes nothing for that node and traversal continues.
#[derive(Error, Debug)]
pub enum ExtractionError {
  /// A canonical key could not be serialized
  #[error("canonical key serialization failed: {0}")]
  KeySerialization(#[from] serde_json::Error),

  /// The provider failed during a style or component lookup
  #[error("provider lookup failed: {0}")]
  Provider(#[from] SceneError),
}
