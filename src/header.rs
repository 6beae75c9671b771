//! The image header (`IHDR`) and the scanline arithmetic that hangs off it.

use crate::{adam7::pass_geometry, PngError};

/// The types of color that PNG supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum PngColorType {
  /// Greyscale
  Y = 0,
  /// Red, Green, Blue
  RGB = 2,
  /// Index into a palette.
  ///
  /// The palette will have RGB8 data. There may optionally be a transparency
  /// chunk.
  Index = 3,
  /// Greyscale + Alpha
  YA = 4,
  /// Red, Green, Blue, Alpha
  RGBA = 6,
}
impl PngColorType {
  /// The number of channels in this type of color.
  #[inline]
  #[must_use]
  pub const fn channel_count(self) -> usize {
    match self {
      Self::Y => 1,
      Self::RGB => 3,
      Self::Index => 1,
      Self::YA => 2,
      Self::RGBA => 4,
    }
  }
}
impl TryFrom<u8> for PngColorType {
  type Error = ();
  #[inline]
  fn try_from(value: u8) -> Result<Self, Self::Error> {
    Ok(match value {
      0 => PngColorType::Y,
      2 => PngColorType::RGB,
      3 => PngColorType::Index,
      4 => PngColorType::YA,
      6 => PngColorType::RGBA,
      _ => return Err(()),
    })
  }
}

/// Image Header
///
/// Parsed once from the IHDR chunk, then never changed. Every later decision
/// in the decode (scanline sizes, filter strides, interlace layout, legal
/// transparency shapes) derives from this.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ihdr {
  /// width in pixels, `1..=2^31-1`
  pub width: u32,
  /// height in pixels, `1..=2^31-1`
  pub height: u32,
  /// bits per channel (or per palette index)
  pub bit_depth: u8,
  /// pixel color type
  pub color_type: PngColorType,
  /// if the image data is stored Adam7 interlaced.
  ///
  /// please don't make new interlaced images, they're terrible.
  pub is_interlaced: bool,
}
impl Ihdr {
  /// Parses the 13 data bytes of an IHDR chunk.
  ///
  /// ## Failure
  /// * `MalformedHeader`: wrong data length, zero or out-of-range
  ///   dimensions, unknown compression/filter/interlace method.
  /// * `InvalidColorTypeBitDepth`: a color type and bit depth pairing that
  ///   the PNG spec's table doesn't permit.
  pub fn parse(data: &[u8]) -> Result<Self, PngError> {
    let [w0, w1, w2, w3, h0, h1, h2, h3, bit_depth, color_type, compression, filter, interlace] =
      data
    else {
      return Err(PngError::MalformedHeader);
    };
    let width = u32::from_be_bytes([*w0, *w1, *w2, *w3]);
    let height = u32::from_be_bytes([*h0, *h1, *h2, *h3]);
    if width == 0 || width > 0x7FFF_FFFF || height == 0 || height > 0x7FFF_FFFF {
      return Err(PngError::MalformedHeader);
    }
    if *compression != 0 || *filter != 0 {
      return Err(PngError::MalformedHeader);
    }
    let is_interlaced = match interlace {
      0 => false,
      1 => true,
      _ => return Err(PngError::MalformedHeader),
    };
    let color_type =
      PngColorType::try_from(*color_type).map_err(|_| PngError::InvalidColorTypeBitDepth)?;
    let bit_depth = match color_type {
      PngColorType::Y if [1, 2, 4, 8, 16].contains(bit_depth) => *bit_depth,
      PngColorType::Index if [1, 2, 4, 8].contains(bit_depth) => *bit_depth,
      PngColorType::RGB | PngColorType::YA | PngColorType::RGBA
        if [8, 16].contains(bit_depth) =>
      {
        *bit_depth
      }
      _ => return Err(PngError::InvalidColorTypeBitDepth),
    };
    Ok(Self { width, height, bit_depth, color_type, is_interlaced })
  }

  /// Bits for one pixel's samples.
  #[inline]
  #[must_use]
  pub const fn bits_per_pixel(&self) -> usize {
    (self.bit_depth as usize) * self.color_type.channel_count()
  }

  /// The byte stride the scanline filters work at.
  ///
  /// Filtering is per byte within a pixel when pixels are more than 1 byte
  /// each, and per byte when pixels are 1 byte or less.
  #[inline]
  #[must_use]
  pub const fn bytes_per_pixel(&self) -> usize {
    let bits = self.bits_per_pixel();
    if bits < 8 {
      1
    } else {
      bits / 8
    }
  }

  /// Packed bytes for one scanline of `width` pixels, without the filter
  /// byte.
  ///
  /// When pixels are less than 8 bits each it's possible to end up with a
  /// partial byte on the end, so we must round up.
  #[inline]
  #[must_use]
  pub const fn bytes_per_scanline(&self, width: u32) -> usize {
    ((self.bits_per_pixel() * (width as usize)) + 7) / 8
  }

  /// How many bytes the full zlib decompression of the image data takes.
  ///
  /// Each line of each (reduced) image is one filter byte plus the packed
  /// scanline bytes. Interlaced images sum that over all seven reduced
  /// images, sequential images are just the one full-size image.
  #[must_use]
  pub fn decompressed_size(&self) -> usize {
    if self.is_interlaced {
      let mut total = 0_usize;
      let mut pass = 1;
      while pass <= 7 {
        if let Some(geo) = pass_geometry(pass, self.width, self.height) {
          let per_line = 1 + self.bytes_per_scanline(geo.width);
          total = total.saturating_add(per_line.saturating_mul(geo.height as usize));
        }
        pass += 1;
      }
      total
    } else {
      let per_line = 1 + self.bytes_per_scanline(self.width);
      per_line.saturating_mul(self.height as usize)
    }
  }
}

#[test]
fn test_ihdr_parse_rejects_bad_combos() {
  // 1x1, bit depth 3, grayscale: depth not in the legal set.
  let data = [0, 0, 0, 1, 0, 0, 0, 1, 3, 0, 0, 0, 0];
  assert_eq!(Ihdr::parse(&data), Err(PngError::InvalidColorTypeBitDepth));
  // 1x1, bit depth 4, RGB: RGB only allows 8 and 16.
  let data = [0, 0, 0, 1, 0, 0, 0, 1, 4, 2, 0, 0, 0];
  assert_eq!(Ihdr::parse(&data), Err(PngError::InvalidColorTypeBitDepth));
  // zero width.
  let data = [0, 0, 0, 0, 0, 0, 0, 1, 8, 0, 0, 0, 0];
  assert_eq!(Ihdr::parse(&data), Err(PngError::MalformedHeader));
  // bad interlace method.
  let data = [0, 0, 0, 1, 0, 0, 0, 1, 8, 0, 0, 0, 2];
  assert_eq!(Ihdr::parse(&data), Err(PngError::MalformedHeader));
  // a plain 1x1 gray8 is fine.
  let data = [0, 0, 0, 1, 0, 0, 0, 1, 8, 0, 0, 0, 0];
  let ihdr = Ihdr::parse(&data).unwrap();
  assert_eq!(ihdr.bytes_per_pixel(), 1);
  assert_eq!(ihdr.bytes_per_scanline(1), 1);
  assert_eq!(ihdr.decompressed_size(), 2);
}

#[test]
fn test_scanline_math_rounds_up_partial_bytes() {
  let ihdr = Ihdr {
    width: 9,
    height: 1,
    bit_depth: 1,
    color_type: PngColorType::Y,
    is_interlaced: false,
  };
  assert_eq!(ihdr.bytes_per_scanline(9), 2);
  assert_eq!(ihdr.bytes_per_scanline(8), 1);
  let ihdr = Ihdr { bit_depth: 16, color_type: PngColorType::RGBA, ..ihdr };
  assert_eq!(ihdr.bytes_per_pixel(), 8);
  assert_eq!(ihdr.bytes_per_scanline(2), 16);
}
