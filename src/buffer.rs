//! The decoder's output: pixels in whatever layout the PNG called for.

use alloc::vec::Vec;

use crate::{RGB8, RGBA8, YA8};

/// Decoded pixel data, in one of the layouts a PNG can decode to.
///
/// * Indexed images and low-depth grayscale images come out as palette
///   indices plus an RGBA palette. Grayscale gets a synthetic gray ramp as
///   its palette, so both look the same from out here.
/// * 8-bit formats come out as pixel structs.
/// * 16-bit formats come out as interleaved native-endian `u16` sample
///   planes (`RGBA16` is `r,g,b,a,r,g,b,a,...`).
///
/// Transparency chunks are already folded in by the time you see this:
/// indexed palettes carry the alpha, and masked grayscale/RGB images come
/// out in the matching alpha-bearing layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PixelData {
  /// One palette index per pixel.
  Indexed {
    /// one index per pixel, row-major.
    indices: Vec<u8>,
    /// the palette the indices point into, always big enough for every
    /// representable index value.
    palette: Vec<RGBA8>,
  },
  /// 16-bit grayscale samples.
  Y16(Vec<u16>),
  /// 8-bit grayscale+alpha pixels.
  YA8(Vec<YA8>),
  /// 16-bit grayscale+alpha sample pairs.
  YA16(Vec<u16>),
  /// 8-bit RGB pixels.
  RGB8(Vec<RGB8>),
  /// 16-bit RGB sample triples.
  RGB16(Vec<u16>),
  /// 8-bit RGBA pixels.
  RGBA8(Vec<RGBA8>),
  /// 16-bit RGBA sample quads.
  RGBA16(Vec<u16>),
}
impl PixelData {
  /// Describes the layout without the data.
  #[inline]
  #[must_use]
  pub fn color_model(&self) -> ColorModel {
    match self {
      Self::Indexed { .. } => {
        ColorModel { channel_count: 4, bits_per_channel: 8, has_alpha: true }
      }
      Self::Y16(_) => ColorModel { channel_count: 1, bits_per_channel: 16, has_alpha: false },
      Self::YA8(_) => ColorModel { channel_count: 2, bits_per_channel: 8, has_alpha: true },
      Self::YA16(_) => ColorModel { channel_count: 2, bits_per_channel: 16, has_alpha: true },
      Self::RGB8(_) => ColorModel { channel_count: 3, bits_per_channel: 8, has_alpha: false },
      Self::RGB16(_) => ColorModel { channel_count: 3, bits_per_channel: 16, has_alpha: false },
      Self::RGBA8(_) => ColorModel { channel_count: 4, bits_per_channel: 8, has_alpha: true },
      Self::RGBA16(_) => ColorModel { channel_count: 4, bits_per_channel: 16, has_alpha: true },
    }
  }
}

/// A description of a pixel layout.
///
/// Alpha, when present, is always straight (non-premultiplied).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ColorModel {
  /// channels per pixel, counting alpha.
  pub channel_count: usize,
  /// bits per channel.
  pub bits_per_channel: usize,
  /// if one of the channels is alpha.
  pub has_alpha: bool,
}

/// A decoded image: dimensions plus the pixels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
  /// width in pixels.
  pub width: u32,
  /// height in pixels.
  pub height: u32,
  /// the pixels, row-major from the top-left.
  pub data: PixelData,
}
impl PixelBuffer {
  /// Converts any layout to a flat RGBA8 image.
  ///
  /// 16-bit samples keep their high byte. Grayscale spreads Y across R, G,
  /// and B. This allocates a fresh buffer, even when the data is already
  /// RGBA8.
  #[must_use]
  pub fn to_rgba8(&self) -> Vec<RGBA8> {
    match &self.data {
      PixelData::Indexed { indices, palette } => {
        indices.iter().map(|&i| palette[usize::from(i)]).collect()
      }
      PixelData::Y16(samples) => samples
        .iter()
        .map(|&y| {
          let y = (y >> 8) as u8;
          RGBA8::opaque(y, y, y)
        })
        .collect(),
      PixelData::YA8(pixels) => pixels
        .iter()
        .map(|px| RGBA8 { r: px.y, g: px.y, b: px.y, a: px.a })
        .collect(),
      PixelData::YA16(samples) => samples
        .chunks_exact(2)
        .map(|px| {
          let y = (px[0] >> 8) as u8;
          RGBA8 { r: y, g: y, b: y, a: (px[1] >> 8) as u8 }
        })
        .collect(),
      PixelData::RGB8(pixels) => pixels.iter().copied().map(RGBA8::from).collect(),
      PixelData::RGB16(samples) => samples
        .chunks_exact(3)
        .map(|px| RGBA8::opaque((px[0] >> 8) as u8, (px[1] >> 8) as u8, (px[2] >> 8) as u8))
        .collect(),
      PixelData::RGBA8(pixels) => pixels.clone(),
      PixelData::RGBA16(samples) => samples
        .chunks_exact(4)
        .map(|px| RGBA8 {
          r: (px[0] >> 8) as u8,
          g: (px[1] >> 8) as u8,
          b: (px[2] >> 8) as u8,
          a: (px[3] >> 8) as u8,
        })
        .collect(),
    }
  }
}

#[test]
fn test_to_rgba8_spreads_gray_and_palette() {
  use alloc::vec;
  let buffer = PixelBuffer {
    width: 2,
    height: 1,
    data: PixelData::Indexed {
      indices: vec![1, 0],
      palette: vec![RGBA8::opaque(9, 9, 9), RGBA8 { r: 1, g: 2, b: 3, a: 4 }],
    },
  };
  assert_eq!(
    buffer.to_rgba8(),
    vec![RGBA8 { r: 1, g: 2, b: 3, a: 4 }, RGBA8::opaque(9, 9, 9)]
  );
  let buffer = PixelBuffer { width: 1, height: 1, data: PixelData::Y16(vec![0xABCD]) };
  assert_eq!(buffer.to_rgba8(), vec![RGBA8::opaque(0xAB, 0xAB, 0xAB)]);
}
