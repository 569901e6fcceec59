//! Core geometry types for background resolution
//!
//! This module provides the geometric primitives used by the background
//! resolver. All coordinates are in document space as reported by the
//! host's bounding boxes.
//!
//! # Coordinate System
//!
//! The coordinate system has its origin at the top-left corner:
//! - Positive X extends to the right
//! - Positive Y extends downward

use serde::{Deserialize, Serialize};
use std::fmt;

/// A 2D point in document space
///
/// # Examples
///
/// ```
/// use tokenlens::Point;
///
/// let p = Point::new(10.0, 20.0);
/// assert_eq!(p.x, 10.0);
/// assert_eq!(Point::ZERO, Point::new(0.0, 0.0));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
  /// X coordinate (horizontal position, increases to the right)
  pub x: f32,
  /// Y coordinate (vertical position, increases downward)
  pub y: f32,
}

impl Point {
  /// The zero point at the origin (0, 0)
  pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

  /// Creates a new point at the given coordinates
  pub const fn new(x: f32, y: f32) -> Self {
    Self { x, y }
  }
}

impl fmt::Display for Point {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "({}, {})", self.x, self.y)
  }
}

/// A 2D size in document space
///
/// Both width and height are non-negative (though not enforced by the type).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size {
  /// Width in document units
  pub width: f32,
  /// Height in document units
  pub height: f32,
}

impl Size {
  /// A size with zero width and height
  pub const ZERO: Self = Self {
    width: 0.0,
    height: 0.0,
  };

  /// Creates a new size with the given dimensions
  pub const fn new(width: f32, height: f32) -> Self {
    Self { width, height }
  }

  /// Returns true if either dimension is zero or negative
  pub fn is_empty(self) -> bool {
    self.width <= 0.0 || self.height <= 0.0
  }
}

impl fmt::Display for Size {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}x{}", self.width, self.height)
  }
}

/// An axis-aligned rectangle in document space
///
/// This is the shape of the host's absolute bounding boxes. The background
/// resolver only ever asks one question of it: does one box fully contain
/// another.
///
/// # Examples
///
/// ```
/// use tokenlens::Rect;
///
/// let outer = Rect::new(0.0, 0.0, 100.0, 100.0);
/// let inner = Rect::new(25.0, 25.0, 50.0, 50.0);
///
/// assert!(outer.contains_rect(&inner));
/// assert!(!inner.contains_rect(&outer));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
  /// X coordinate of the left edge
  pub x: f32,
  /// Y coordinate of the top edge
  pub y: f32,
  /// Width of the rectangle
  pub width: f32,
  /// Height of the rectangle
  pub height: f32,
}

impl Rect {
  /// A rectangle at the origin with zero size
  pub const ZERO: Self = Self {
    x: 0.0,
    y: 0.0,
    width: 0.0,
    height: 0.0,
  };

  /// Creates a new rectangle from position and dimensions
  pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
    Self {
      x,
      y,
      width,
      height,
    }
  }

  /// X coordinate of the right edge
  pub fn max_x(&self) -> f32 {
    self.x + self.width
  }

  /// Y coordinate of the bottom edge
  pub fn max_y(&self) -> f32 {
    self.y + self.height
  }

  /// Returns true if `inner` lies entirely within this rectangle
  ///
  /// Containment is edge-inclusive: a rectangle contains itself, and an
  /// inner box that shares an edge with the outer box still counts.
  ///
  /// # Examples
  ///
  /// ```
  /// use tokenlens::Rect;
  ///
  /// let r = Rect::new(0.0, 0.0, 10.0, 10.0);
  /// assert!(r.contains_rect(&r));
  /// assert!(r.contains_rect(&Rect::new(0.0, 0.0, 10.0, 5.0)));
  /// assert!(!r.contains_rect(&Rect::new(0.0, 0.0, 10.0, 10.1)));
  /// ```
  pub fn contains_rect(&self, inner: &Rect) -> bool {
    inner.x >= self.x
      && inner.y >= self.y
      && inner.max_x() <= self.max_x()
      && inner.max_y() <= self.max_y()
  }

  /// Top-left corner of the rectangle
  pub fn origin(&self) -> Point {
    Point::new(self.x, self.y)
  }

  /// Dimensions of the rectangle
  pub fn size(&self) -> Size {
    Size::new(self.width, self.height)
  }
}

impl fmt::Display for Rect {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(
      f,
      "({}, {}) {}x{}",
      self.x, self.y, self.width, self.height
    )
  }
}
