//! Palettes: the `PLTE` chunk, synthetic grayscale ramps, and folding
//! transparency (`tRNS`) into palette entries.
//!
//! Low-depth grayscale images don't carry a `PLTE`, but giving them a
//! synthetic gray ramp lets them share the indexed output path with actual
//! palette images, which keeps the tail of the decoder much smaller.

use alloc::vec::Vec;

use bytemuck::try_cast_slice;

use crate::{PngColorType, PngError, RGB8, RGBA8};

/// Parses a `PLTE` chunk's data into opaque palette entries.
///
/// ## Failure
/// * `InconsistentChunkData` if the data isn't a whole number of RGB
///   triples.
pub fn parse_plte(data: &[u8]) -> Result<Vec<RGBA8>, PngError> {
  let triples: &[RGB8] =
    try_cast_slice(data).map_err(|_| PngError::InconsistentChunkData)?;
  if triples.len() > 256 {
    return Err(PngError::InconsistentChunkData);
  }
  Ok(triples.iter().copied().map(RGBA8::from).collect())
}

/// Extends a short palette with opaque black up to `1 << bit_depth` entries.
///
/// Encoders may legally store fewer entries than the bit depth can index,
/// while still writing index values that land past the stored entries. A
/// full-size palette means lookups never have to bounds check.
pub fn pad_palette(palette: &mut Vec<RGBA8>, bit_depth: u8) {
  let full = 1_usize << bit_depth;
  while palette.len() < full {
    palette.push(RGBA8::opaque(0, 0, 0));
  }
}

/// A synthetic palette for grayscale at 8 bits or less: every representable
/// gray level, darkest first, scaled onto 0..=255.
pub fn grayscale_ramp(bit_depth: u8) -> Vec<RGBA8> {
  match bit_depth {
    1 => [0x00, 0xFF].iter().map(|&y| RGBA8::opaque(y, y, y)).collect(),
    2 => [0x00, 0x40, 0x80, 0xFF].iter().map(|&y| RGBA8::opaque(y, y, y)).collect(),
    4 => (0..16_u8).map(|i| i * 0x11).map(|y| RGBA8::opaque(y, y, y)).collect(),
    _ => {
      debug_assert_eq!(bit_depth, 8);
      (0..=255_u8).map(|y| RGBA8::opaque(y, y, y)).collect()
    }
  }
}

/// Applies an indexed-color `tRNS` chunk's alpha values to palette entries.
///
/// The chunk may carry fewer alphas than the palette has entries, leaving
/// the rest opaque. Extra alphas past the palette's end get a warning and
/// are otherwise ignored.
pub fn merge_indexed_alpha(palette: &mut [RGBA8], alphas: &[u8]) {
  if alphas.len() > palette.len() {
    log::warn!(
      "tRNS carries {} alpha values for a {} entry palette",
      alphas.len(),
      palette.len()
    );
  }
  for (entry, &a) in palette.iter_mut().zip(alphas.iter()) {
    entry.a = a;
  }
}

/// Applies a grayscale `tRNS` mask value to a gray ramp palette: the one
/// entry whose sample value matches the mask becomes fully transparent.
///
/// A mask value outside the depth's sample range can't match any pixel, so
/// it gets a warning and is otherwise ignored.
pub fn merge_gray_mask(palette: &mut [RGBA8], y_mask: u16) {
  if let Some(entry) = palette.get_mut(usize::from(y_mask)) {
    entry.a = 0;
  } else {
    log::warn!("tRNS gray mask {y_mask} is outside the sample range");
  }
}

/// A parsed transparency (`tRNS`) chunk.
///
/// The legal shape depends on the color type: color types that already have
/// an alpha channel must not have this chunk at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trns<'b> {
  /// Grayscale: pixels with exactly this sample value are transparent.
  Y {
    /// The transparent sample value, in the low bits.
    y: u16,
  },
  /// RGB: pixels matching all three sample values are transparent.
  Rgb {
    /// red sample
    r: u16,
    /// green sample
    g: u16,
    /// blue sample
    b: u16,
  },
  /// Indexed: per-palette-entry alpha values, possibly fewer than the
  /// palette has entries.
  Index {
    /// one alpha per palette entry, front first.
    data: &'b [u8],
  },
}
impl<'b> Trns<'b> {
  /// Parses a `tRNS` chunk's data according to the image's color type.
  ///
  /// ## Failure
  /// * `InconsistentChunkData` when the data is the wrong size for the color
  ///   type, or when the color type already has an alpha channel.
  pub fn parse(color_type: PngColorType, data: &'b [u8]) -> Result<Self, PngError> {
    match color_type {
      PngColorType::Y => match data {
        [y0, y1] => Ok(Self::Y { y: u16::from_be_bytes([*y0, *y1]) }),
        _ => Err(PngError::InconsistentChunkData),
      },
      PngColorType::RGB => match data {
        [r0, r1, g0, g1, b0, b1] => Ok(Self::Rgb {
          r: u16::from_be_bytes([*r0, *r1]),
          g: u16::from_be_bytes([*g0, *g1]),
          b: u16::from_be_bytes([*b0, *b1]),
        }),
        _ => Err(PngError::InconsistentChunkData),
      },
      PngColorType::Index => {
        if data.len() > 256 {
          Err(PngError::InconsistentChunkData)
        } else {
          Ok(Self::Index { data })
        }
      }
      PngColorType::YA | PngColorType::RGBA => Err(PngError::InconsistentChunkData),
    }
  }
}

#[test]
fn test_grayscale_ramp_values() {
  assert_eq!(grayscale_ramp(1).len(), 2);
  assert_eq!(grayscale_ramp(1)[1], RGBA8::opaque(0xFF, 0xFF, 0xFF));
  assert_eq!(grayscale_ramp(2)[1], RGBA8::opaque(0x40, 0x40, 0x40));
  assert_eq!(grayscale_ramp(2)[2], RGBA8::opaque(0x80, 0x80, 0x80));
  assert_eq!(grayscale_ramp(4)[15], RGBA8::opaque(0xFF, 0xFF, 0xFF));
  assert_eq!(grayscale_ramp(4)[3], RGBA8::opaque(0x33, 0x33, 0x33));
  assert_eq!(grayscale_ramp(8).len(), 256);
  assert_eq!(grayscale_ramp(8)[77], RGBA8::opaque(77, 77, 77));
}

#[test]
fn test_trns_shapes() {
  assert_eq!(
    Trns::parse(PngColorType::Y, &[0x01, 0x02]),
    Ok(Trns::Y { y: 0x0102 })
  );
  assert_eq!(
    Trns::parse(PngColorType::Y, &[1]),
    Err(PngError::InconsistentChunkData)
  );
  assert_eq!(
    Trns::parse(PngColorType::RGB, &[0, 1, 0, 2, 0, 3]),
    Ok(Trns::Rgb { r: 1, g: 2, b: 3 })
  );
  assert_eq!(
    Trns::parse(PngColorType::Index, &[9, 8]),
    Ok(Trns::Index { data: &[9, 8] })
  );
  assert_eq!(
    Trns::parse(PngColorType::RGBA, &[0]),
    Err(PngError::InconsistentChunkData)
  );
  assert_eq!(
    Trns::parse(PngColorType::YA, &[0, 0]),
    Err(PngError::InconsistentChunkData)
  );
}

#[test]
fn test_merge_helpers() {
  let mut pal = grayscale_ramp(2);
  merge_gray_mask(&mut pal, 1);
  assert_eq!(pal[1].a, 0);
  assert_eq!(pal[0].a, 255);
  merge_gray_mask(&mut pal, 300);

  let mut pal = parse_plte(&[1, 2, 3, 4, 5, 6]).unwrap();
  pad_palette(&mut pal, 2);
  assert_eq!(pal.len(), 4);
  assert_eq!(pal[1], RGBA8::opaque(4, 5, 6));
  assert_eq!(pal[3], RGBA8::opaque(0, 0, 0));
  merge_indexed_alpha(&mut pal, &[7]);
  assert_eq!(pal[0].a, 7);
  assert_eq!(pal[1].a, 255);
}
