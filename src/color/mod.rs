//! Color types and color space conversions
//!
//! This module provides the color value types used by paints and effects,
//! hex encoding, and the perceptual OKLCH conversion used to enrich solid
//! fills for the host UI.
//!
//! # Channel Ranges
//!
//! Host documents supply colors with normalized channels in `[0, 1]`.
//! Hex encoding rescales to `0-255`; luminance formulas pick their own
//! scale per color space (see [`apca`]).

pub mod apca;

use serde::{Deserialize, Serialize};
use std::fmt;

/// Document color profile tag supplied by the host
///
/// Selects the luminance transfer function used for contrast scoring.
/// `Legacy` documents are scored with the sRGB formula.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ColorSpace {
  /// Wide-gamut Display P3 profile
  DisplayP3,
  /// Standard sRGB profile
  #[default]
  Srgb,
  /// Legacy documents without an explicit profile; treated as sRGB
  Legacy,
}

/// An RGB color with normalized channels
///
/// Channels are in `[0, 1]` as supplied by the host document. Alpha is
/// carried separately (paint opacity), matching the host's paint model.
///
/// # Examples
///
/// ```
/// use tokenlens::Rgb;
///
/// let red = Rgb::new(1.0, 0.0, 0.0);
/// assert_eq!(red.to_hex(), "#ff0000");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgb {
  /// Red channel (0.0-1.0)
  pub r: f32,
  /// Green channel (0.0-1.0)
  pub g: f32,
  /// Blue channel (0.0-1.0)
  pub b: f32,
}

impl Rgb {
  /// Opaque black
  pub const BLACK: Self = Self {
    r: 0.0,
    g: 0.0,
    b: 0.0,
  };

  /// Opaque white
  pub const WHITE: Self = Self {
    r: 1.0,
    g: 1.0,
    b: 1.0,
  };

  /// Creates a new color from normalized channels
  pub const fn new(r: f32, g: f32, b: f32) -> Self {
    Self { r, g, b }
  }

  /// Rescales normalized channels to the 0-255 range by rounding
  ///
  /// This is the representation the sRGB luminance formula expects.
  pub fn to_255_scale(self) -> [f64; 3] {
    [
      (f64::from(self.r) * 255.0).round(),
      (f64::from(self.g) * 255.0).round(),
      (f64::from(self.b) * 255.0).round(),
    ]
  }

  /// Encodes the color as a lowercase `#rrggbb` hex string
  ///
  /// Channels are clamped to `[0, 1]` before rescaling, so out-of-gamut
  /// values from a malformed document still produce a well-formed string.
  ///
  /// # Examples
  ///
  /// ```
  /// use tokenlens::Rgb;
  ///
  /// assert_eq!(Rgb::new(0.0, 0.5, 1.0).to_hex(), "#0080ff");
  /// ```
  pub fn to_hex(self) -> String {
    let channel = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
    format!(
      "#{:02x}{:02x}{:02x}",
      channel(self.r),
      channel(self.g),
      channel(self.b)
    )
  }

  /// Converts the color to the OKLCH perceptual coordinate
  ///
  /// The conversion goes through linear sRGB and OKLab using the standard
  /// matrices. Hue is undefined for achromatic colors and reported as
  /// `None`, which serializes to an absent field.
  pub fn to_oklch(self) -> Oklch {
    fn to_linear(c: f64) -> f64 {
      if c.abs() <= 0.04045 {
        c / 12.92
      } else {
        ((c.abs() + 0.055) / 1.055).powf(2.4).copysign(c)
      }
    }

    let r = to_linear(f64::from(self.r));
    let g = to_linear(f64::from(self.g));
    let b = to_linear(f64::from(self.b));

    let l = 0.412_221_470_8 * r + 0.536_332_536_3 * g + 0.051_445_992_9 * b;
    let m = 0.211_903_498_2 * r + 0.680_699_545_1 * g + 0.107_396_956_6 * b;
    let s = 0.088_302_461_9 * r + 0.281_718_837_6 * g + 0.629_978_700_5 * b;

    let l_ = l.cbrt();
    let m_ = m.cbrt();
    let s_ = s.cbrt();

    let lightness = 0.210_454_255_3 * l_ + 0.793_617_785_0 * m_ - 0.004_072_046_8 * s_;
    let a = 1.977_998_495_1 * l_ - 2.428_592_205_0 * m_ + 0.450_593_709_9 * s_;
    let b_axis = 0.025_904_037_1 * l_ + 0.782_771_766_2 * m_ - 0.808_675_766_0 * s_;

    let chroma = (a * a + b_axis * b_axis).sqrt();
    let hue = if chroma < 1e-7 {
      None
    } else {
      let deg = b_axis.atan2(a).to_degrees();
      Some(if deg < 0.0 { deg + 360.0 } else { deg })
    };

    Oklch {
      l: lightness,
      c: chroma,
      h: hue,
    }
  }
}

impl fmt::Display for Rgb {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "rgb({}, {}, {})", self.r, self.g, self.b)
  }
}

/// An RGBA color with normalized channels
///
/// Used by shadow effects, which carry their own alpha rather than a
/// separate paint opacity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgba {
  /// Red channel (0.0-1.0)
  pub r: f32,
  /// Green channel (0.0-1.0)
  pub g: f32,
  /// Blue channel (0.0-1.0)
  pub b: f32,
  /// Alpha channel (0.0-1.0)
  pub a: f32,
}

impl Rgba {
  /// Creates a new color from normalized channels
  pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
    Self { r, g, b, a }
  }
}

/// A color in the OKLCH perceptual color space
///
/// Lightness in `[0, 1]`, chroma unbounded from 0, hue in degrees.
/// Hue is `None` for achromatic colors (chroma effectively zero).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Oklch {
  /// Perceptual lightness
  pub l: f64,
  /// Chroma (colorfulness)
  pub c: f64,
  /// Hue angle in degrees, absent for achromatic colors
  #[serde(skip_serializing_if = "Option::is_none")]
  pub h: Option<f64>,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn hex_encoding_rounds_channels() {
    assert_eq!(Rgb::new(1.0, 0.0, 0.0).to_hex(), "#ff0000");
    assert_eq!(Rgb::new(0.0, 0.0, 0.0).to_hex(), "#000000");
    // 0.5 * 255 = 127.5 rounds to 128
    assert_eq!(Rgb::new(0.5, 0.5, 0.5).to_hex(), "#808080");
  }

  #[test]
  fn hex_encoding_clamps_out_of_gamut_channels() {
    assert_eq!(Rgb::new(1.2, -0.3, 0.0).to_hex(), "#ff0000");
  }

  #[test]
  fn oklch_of_white_is_achromatic_full_lightness() {
    let oklch = Rgb::WHITE.to_oklch();
    assert!((oklch.l - 1.0).abs() < 1e-4);
    assert!(oklch.c < 1e-4);
    assert!(oklch.h.is_none());
  }

  #[test]
  fn oklch_of_black_is_zero() {
    let oklch = Rgb::BLACK.to_oklch();
    assert!(oklch.l.abs() < 1e-6);
    assert!(oklch.c < 1e-6);
    assert!(oklch.h.is_none());
  }

  #[test]
  fn oklch_of_red_matches_reference() {
    // sRGB red is L ~0.628, C ~0.258, H ~29.23 in OKLCH.
    let oklch = Rgb::new(1.0, 0.0, 0.0).to_oklch();
    assert!((oklch.l - 0.628).abs() < 1e-3);
    assert!((oklch.c - 0.2577).abs() < 1e-3);
    let hue = oklch.h.expect("red has a hue");
    assert!((hue - 29.23).abs() < 0.1);
  }

  #[test]
  fn rescaling_to_255_rounds() {
    assert_eq!(Rgb::new(0.5, 0.0, 1.0).to_255_scale(), [128.0, 0.0, 255.0]);
  }
}
