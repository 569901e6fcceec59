//! APCA perceptual contrast scoring
//!
//! Implements the APCA-W3 contrast algorithm: a luminance-asymmetric
//! metric that models how text polarity (dark-on-light vs light-on-dark)
//! affects perceived contrast. This is not a luminance ratio; the result
//! is a signed score roughly in `[-108, 106]` where larger magnitudes
//! mean more readable text.
//!
//! The scorer never fails outward: malformed inputs yield the neutral
//! score 0, which downstream callers treat as "nothing to report".

use crate::color::{ColorSpace, Rgb};
use log::warn;

// sRGB luminance coefficients and transfer exponent (APCA-W3 constants).
const MAIN_TRC: f64 = 2.4;
const SRGB_R: f64 = 0.212_672_9;
const SRGB_G: f64 = 0.715_152_2;
const SRGB_B: f64 = 0.072_175_0;

// Display P3 luminance coefficients.
const P3_R: f64 = 0.228_982_959_480_578_0;
const P3_G: f64 = 0.691_749_262_585_238_0;
const P3_B: f64 = 0.079_267_777_934_182_9;

// Contrast constants for the APCA-W3 0.1.9 power curve.
const BLK_THRS: f64 = 0.022;
const BLK_CLMP: f64 = 1.414;
const DELTA_Y_MIN: f64 = 0.0005;
const SCALE: f64 = 1.14;
const LO_OFFSET: f64 = 0.027;
const LO_CLIP: f64 = 0.1;
const NORM_BG: f64 = 0.56;
const NORM_TXT: f64 = 0.57;
const REV_BG: f64 = 0.65;
const REV_TXT: f64 = 0.62;

// Luminance must land in this window or the input is rejected as invalid.
const INPUT_CLAMP_MIN: f64 = 0.0;
const INPUT_CLAMP_MAX: f64 = 1.1;

/// Readability bands keyed by minimum score, highest first
///
/// Scanning from the top, the first threshold a score meets or exceeds
/// names its band. Since the table bottoms out at 0, every non-negative
/// score maps to a band.
pub const CONCLUSIONS: &[(&str, i32)] = &[
  ("Fluent Text", 90),
  ("Body Text", 75),
  ("Content Text", 60),
  ("Large Text", 45),
  ("Non-Text", 30),
  ("Not Readable", 15),
  ("Invisible", 0),
];

/// Sentinel returned when a score meets no band threshold
pub const INVALID_CONCLUSION: &str = "Invalid Value";

/// Computes sRGB relative luminance from 0-255 channels
///
/// Applies the simple 2.4-exponent transfer function to each channel and
/// weights with the sRGB coefficients, as APCA-W3's `sRGBtoY` does.
pub fn srgb_to_y(rgb: [f64; 3]) -> f64 {
  let lin = |c: f64| (c / 255.0).powf(MAIN_TRC);
  SRGB_R * lin(rgb[0]) + SRGB_G * lin(rgb[1]) + SRGB_B * lin(rgb[2])
}

/// Computes Display P3 relative luminance from normalized 0-1 channels
pub fn display_p3_to_y(rgb: [f64; 3]) -> f64 {
  let lin = |c: f64| c.powf(MAIN_TRC);
  P3_R * lin(rgb[0]) + P3_G * lin(rgb[1]) + P3_B * lin(rgb[2])
}

/// Computes the luminance of a color under the given document profile
///
/// `DisplayP3` documents use the P3 formula on normalized channels.
/// `Srgb` and `Legacy` documents rescale channels to 0-255 by rounding
/// first, then apply the sRGB formula.
pub fn to_linear_luminance(color: Rgb, color_space: ColorSpace) -> f64 {
  match color_space {
    ColorSpace::DisplayP3 => display_p3_to_y([
      f64::from(color.r),
      f64::from(color.g),
      f64::from(color.b),
    ]),
    ColorSpace::Srgb | ColorSpace::Legacy => srgb_to_y(color.to_255_scale()),
  }
}

/// Scores the contrast of text over a background, rounded to an integer
///
/// Positive scores mean dark text on a light background, negative the
/// reverse. Returns 0 for any input the algorithm cannot evaluate
/// (out-of-range or non-finite luminance), so callers never need an
/// error path.
///
/// # Examples
///
/// ```
/// use tokenlens::{apca_contrast, ColorSpace, Rgb};
///
/// let score = apca_contrast(Rgb::BLACK, Rgb::WHITE, ColorSpace::Srgb);
/// assert_eq!(score, 106);
/// ```
pub fn apca_contrast(fg: Rgb, bg: Rgb, color_space: ColorSpace) -> i32 {
  let txt_y = to_linear_luminance(fg, color_space);
  let bg_y = to_linear_luminance(bg, color_space);
  let contrast = apca_y_contrast(txt_y, bg_y);
  if !contrast.is_finite() {
    warn!("apca contrast produced a non-finite value; reporting neutral 0");
    return 0;
  }
  contrast.round() as i32
}

/// The APCA-W3 contrast curve over a pair of luminances
///
/// Returns the score scaled by 100, unrounded. Inputs outside the valid
/// luminance window yield 0.
fn apca_y_contrast(txt_y: f64, bg_y: f64) -> f64 {
  if !txt_y.is_finite() || !bg_y.is_finite() {
    return 0.0;
  }
  if txt_y < INPUT_CLAMP_MIN
    || txt_y > INPUT_CLAMP_MAX
    || bg_y < INPUT_CLAMP_MIN
    || bg_y > INPUT_CLAMP_MAX
  {
    return 0.0;
  }

  // Soft clamp crushes near-black values upward to model flare.
  let soft_clamp = |y: f64| {
    if y > BLK_THRS {
      y
    } else {
      y + (BLK_THRS - y).powf(BLK_CLMP)
    }
  };
  let txt_y = soft_clamp(txt_y);
  let bg_y = soft_clamp(bg_y);

  if (bg_y - txt_y).abs() < DELTA_Y_MIN {
    return 0.0;
  }

  if bg_y > txt_y {
    // Normal polarity: dark text on light background.
    let sapc = (bg_y.powf(NORM_BG) - txt_y.powf(NORM_TXT)) * SCALE;
    if sapc < LO_CLIP {
      0.0
    } else {
      (sapc - LO_OFFSET) * 100.0
    }
  } else {
    // Reverse polarity: light text on dark background.
    let sapc = (bg_y.powf(REV_BG) - txt_y.powf(REV_TXT)) * SCALE;
    if sapc > -LO_CLIP {
      0.0
    } else {
      (sapc + LO_OFFSET) * 100.0
    }
  }
}

/// Maps a score to its readability band
///
/// Scans the band table from the highest threshold down and returns the
/// first band the score meets or exceeds. Callers pass the absolute
/// value of a signed score; a negative input falls through every
/// threshold and yields the `Invalid Value` sentinel.
///
/// # Examples
///
/// ```
/// use tokenlens::conclusion_for_score;
///
/// assert_eq!(conclusion_for_score(90), "Fluent Text");
/// assert_eq!(conclusion_for_score(89), "Body Text");
/// assert_eq!(conclusion_for_score(0), "Invisible");
/// ```
pub fn conclusion_for_score(score: i32) -> &'static str {
  for (conclusion, threshold) in CONCLUSIONS {
    if score >= *threshold {
      return conclusion;
    }
  }
  INVALID_CONCLUSION
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn black_on_white_scores_106() {
    assert_eq!(apca_contrast(Rgb::BLACK, Rgb::WHITE, ColorSpace::Srgb), 106);
  }

  #[test]
  fn white_on_black_scores_negative_108() {
    assert_eq!(apca_contrast(Rgb::WHITE, Rgb::BLACK, ColorSpace::Srgb), -108);
  }

  #[test]
  fn identical_colors_score_zero() {
    let gray = Rgb::new(0.5, 0.5, 0.5);
    assert_eq!(apca_contrast(gray, gray, ColorSpace::Srgb), 0);
  }

  #[test]
  fn legacy_profile_scores_like_srgb() {
    let fg = Rgb::new(0.2, 0.3, 0.4);
    let bg = Rgb::new(0.9, 0.9, 0.9);
    assert_eq!(
      apca_contrast(fg, bg, ColorSpace::Legacy),
      apca_contrast(fg, bg, ColorSpace::Srgb)
    );
  }

  #[test]
  fn display_p3_black_on_white_scores_106() {
    assert_eq!(
      apca_contrast(Rgb::BLACK, Rgb::WHITE, ColorSpace::DisplayP3),
      106
    );
  }

  #[test]
  fn non_finite_channels_score_zero() {
    let bad = Rgb::new(f32::NAN, 0.0, 0.0);
    assert_eq!(apca_contrast(bad, Rgb::WHITE, ColorSpace::Srgb), 0);
    assert_eq!(apca_contrast(bad, Rgb::WHITE, ColorSpace::DisplayP3), 0);
  }

  #[test]
  fn out_of_range_luminance_scores_zero() {
    // Channels above 1.0 push P3 luminance past the 1.1 input clamp.
    let hot = Rgb::new(1.5, 1.5, 1.5);
    assert_eq!(apca_contrast(Rgb::BLACK, hot, ColorSpace::DisplayP3), 0);
  }

  #[test]
  fn conclusion_thresholds_scan_highest_first() {
    assert_eq!(conclusion_for_score(106), "Fluent Text");
    assert_eq!(conclusion_for_score(90), "Fluent Text");
    assert_eq!(conclusion_for_score(89), "Body Text");
    assert_eq!(conclusion_for_score(75), "Body Text");
    assert_eq!(conclusion_for_score(60), "Content Text");
    assert_eq!(conclusion_for_score(45), "Large Text");
    assert_eq!(conclusion_for_score(30), "Non-Text");
    assert_eq!(conclusion_for_score(15), "Not Readable");
    assert_eq!(conclusion_for_score(1), "Invisible");
    assert_eq!(conclusion_for_score(0), "Invisible");
  }

  #[test]
  fn negative_score_is_invalid() {
    // Callers band the absolute value; the raw table has no negative rung.
    assert_eq!(conclusion_for_score(-50), INVALID_CONCLUSION);
  }
}
