//! Gamma correction of decoded samples.
//!
//! A `gAMA` chunk states the exponent the image was encoded with. Combining
//! that with the display's exponent gives a single decoding exponent, which
//! we bake into a lookup table and run over the color samples (alpha is
//! linear and is left alone). When `sRGB` or `iCCP` is present those take
//! priority and no table is applied at all.

use alloc::vec::Vec;

use crate::buffer::PixelData;

/// The display exponent assumed when the caller doesn't supply one.
///
/// 2.2 is the CRT-descended value that both sRGB and basically every
/// consumer display standardized on.
pub const DEFAULT_DISPLAY_EXPONENT: f32 = 2.2;

/// The color-management chunks seen in a PNG, reduced to one question:
/// should a gamma table be applied?
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GammaPolicy {
  /// The `gAMA` chunk's encoding gamma, if the chunk was present and sane.
  pub gamma: Option<f32>,
  /// An `sRGB` chunk was present.
  pub srgb_present: bool,
  /// An `iCCP` chunk was present.
  pub iccp_present: bool,
}
impl GammaPolicy {
  /// The gamma to correct with, if correction should happen at all.
  ///
  /// A full color profile (or the sRGB shorthand for one) supersedes the
  /// plain gamma value, so their presence turns correction off.
  #[inline]
  #[must_use]
  pub fn applies(&self) -> Option<f32> {
    if self.srgb_present || self.iccp_present {
      None
    } else {
      self.gamma
    }
  }
}

/// The exponent to raise normalized samples to during decode.
#[inline]
#[must_use]
fn decoding_exponent(gamma: f32, display_exponent: f32) -> f64 {
  1.0 / (f64::from(gamma) * f64::from(display_exponent))
}

/// Builds the 8-bit gamma lookup table.
///
/// Entry `i` is `(i / 255) ^ (1 / (gamma * display_exponent))` scaled back
/// onto 0..=255. The scaled value is truncated, not rounded.
#[must_use]
pub fn make_gamma_table_8(gamma: f32, display_exponent: f32) -> [u8; 256] {
  let exp = decoding_exponent(gamma, display_exponent);
  let mut out = [0; 256];
  for (i, entry) in out.iter_mut().enumerate() {
    *entry = (255.0 * libm::pow(i as f64 / 255.0, exp)) as u8;
  }
  out
}

/// Builds the 16-bit gamma lookup table, one entry per sample value.
#[must_use]
pub fn make_gamma_table_16(gamma: f32, display_exponent: f32) -> Vec<u16> {
  let exp = decoding_exponent(gamma, display_exponent);
  (0..=u16::MAX)
    .map(|i| (65535.0 * libm::pow(f64::from(i) / 65535.0, exp)) as u16)
    .collect()
}

/// Runs a gamma table over interleaved samples, skipping alpha.
///
/// `rgb_stride` color samples are corrected, then `alpha_stride` samples are
/// skipped, repeating to the end. So RGB is `(3, 0)`, RGBA is `(3, 1)`, YA
/// is `(1, 1)`, and so on.
pub fn correct_u8_samples(samples: &mut [u8], rgb_stride: usize, alpha_stride: usize, table: &[u8; 256]) {
  for px in samples.chunks_exact_mut(rgb_stride + alpha_stride) {
    for s in &mut px[..rgb_stride] {
      *s = table[usize::from(*s)];
    }
  }
}

/// As [`correct_u8_samples`], for 16-bit samples.
pub fn correct_u16_samples(samples: &mut [u16], rgb_stride: usize, alpha_stride: usize, table: &[u16]) {
  for px in samples.chunks_exact_mut(rgb_stride + alpha_stride) {
    for s in &mut px[..rgb_stride] {
      *s = table[usize::from(*s)];
    }
  }
}

/// Gamma corrects pixel data in place.
///
/// Indexed data is handled by correcting the palette, which is both faster
/// and keeps the index values meaningful.
pub fn correct_pixel_data(data: &mut PixelData, gamma: f32, display_exponent: f32) {
  match data {
    PixelData::Indexed { palette, .. } => {
      let table = make_gamma_table_8(gamma, display_exponent);
      let samples: &mut [u8] = bytemuck::cast_slice_mut(palette.as_mut_slice());
      correct_u8_samples(samples, 3, 1, &table);
    }
    PixelData::YA8(pixels) => {
      let table = make_gamma_table_8(gamma, display_exponent);
      correct_u8_samples(bytemuck::cast_slice_mut(pixels.as_mut_slice()), 1, 1, &table);
    }
    PixelData::RGB8(pixels) => {
      let table = make_gamma_table_8(gamma, display_exponent);
      correct_u8_samples(bytemuck::cast_slice_mut(pixels.as_mut_slice()), 3, 0, &table);
    }
    PixelData::RGBA8(pixels) => {
      let table = make_gamma_table_8(gamma, display_exponent);
      correct_u8_samples(bytemuck::cast_slice_mut(pixels.as_mut_slice()), 3, 1, &table);
    }
    PixelData::Y16(samples) => {
      let table = make_gamma_table_16(gamma, display_exponent);
      correct_u16_samples(samples, 1, 0, &table);
    }
    PixelData::YA16(samples) => {
      let table = make_gamma_table_16(gamma, display_exponent);
      correct_u16_samples(samples, 1, 1, &table);
    }
    PixelData::RGB16(samples) => {
      let table = make_gamma_table_16(gamma, display_exponent);
      correct_u16_samples(samples, 3, 0, &table);
    }
    PixelData::RGBA16(samples) => {
      let table = make_gamma_table_16(gamma, display_exponent);
      correct_u16_samples(samples, 3, 1, &table);
    }
  }
}

#[test]
fn test_policy_precedence() {
  let p = GammaPolicy { gamma: Some(0.45455), srgb_present: false, iccp_present: false };
  assert_eq!(p.applies(), Some(0.45455));
  assert_eq!(GammaPolicy { srgb_present: true, ..p }.applies(), None);
  assert_eq!(GammaPolicy { iccp_present: true, ..p }.applies(), None);
  assert_eq!(GammaPolicy::default().applies(), None);
}

#[test]
fn test_gamma_table_endpoints_and_direction() {
  // any exponent fixes the endpoints.
  let table = make_gamma_table_8(1.0, 2.2);
  assert_eq!(table[0], 0);
  assert_eq!(table[255], 255);
  // a decoding exponent below 1 brightens every midtone.
  for (i, &t) in table.iter().enumerate() {
    assert!(usize::from(t) >= i, "darkened at {i}");
  }
  let table = make_gamma_table_16(1.0, 2.2);
  assert_eq!(table[0], 0);
  assert_eq!(table[65535], 65535);
}

#[test]
fn test_gamma_table_monotone() {
  let table = make_gamma_table_8(0.45455, 2.2);
  for pair in table.windows(2) {
    assert!(pair[0] <= pair[1]);
  }
}

#[test]
fn test_alpha_untouched() {
  let table = make_gamma_table_8(1.0, 2.2);
  let mut samples = [10, 20, 30, 99, 40, 50, 60, 77];
  correct_u8_samples(&mut samples, 3, 1, &table);
  assert_eq!(samples[3], 99);
  assert_eq!(samples[7], 77);
}
