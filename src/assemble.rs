//! Turning a decompressed datastream into final pixels.
//!
//! This is where the per-stage pieces meet: the (possibly interlaced)
//! stream is split into reduced images, each is defiltered, sub-byte
//! samples are unpacked, and every pixel is delivered to its spot in the
//! full image in the output layout its color type calls for.

use alloc::{vec, vec::Vec};

use crate::{
  adam7::{pass_geometry, PassGeometry},
  buffer::PixelData,
  header::Ihdr,
  palette::{grayscale_ramp, merge_gray_mask, merge_indexed_alpha, pad_palette, Trns},
  unfilter::unfilter_into,
  unpack::unpack_scanline,
  PngColorType, PngError, RGB8, RGBA8, YA8,
};

/// Defilters the decompressed datastream and calls `op` once per pixel.
///
/// * `op` gets the pixel's full-image `x` and `y` and its packed big-endian
///   sample bytes. At sub-byte depths it gets a single byte holding the raw
///   (unscaled) sample value.
/// * Pixels of an interlaced image arrive in pass order, so `op` should
///   write by coordinate rather than assume raster order.
///
/// ## Failure
/// * `CorruptCompressedData` if `decompressed` isn't exactly
///   [`decompressed_size`](Ihdr::decompressed_size) bytes.
pub(crate) fn for_each_pixel<F: FnMut(u32, u32, &[u8])>(
  ihdr: &Ihdr, decompressed: &[u8], mut op: F,
) -> Result<(), PngError> {
  let mut spare = decompressed;
  let mut emit_pass = |geo: PassGeometry, filtered: &[u8]| -> Result<(), PngError> {
    let stride = ihdr.bytes_per_scanline(geo.width);
    let mut recon = vec![0_u8; stride * (geo.height as usize)];
    unfilter_into(filtered, &mut recon, ihdr.bytes_per_pixel(), stride)?;
    let mut row_samples = vec![0_u8; geo.width as usize];
    for (j, row) in recon.chunks_exact(stride.max(1)).enumerate() {
      let y = geo.y_start + (j as u32) * geo.y_inc;
      if ihdr.bit_depth < 8 {
        unpack_scanline(row, ihdr.bit_depth, &mut row_samples);
        for (i, sample) in row_samples.iter().enumerate() {
          let x = geo.x_start + (i as u32) * geo.x_inc;
          op(x, y, core::slice::from_ref(sample));
        }
      } else {
        let bpp = ihdr.bytes_per_pixel();
        for (i, px) in row.chunks_exact(bpp).enumerate() {
          let x = geo.x_start + (i as u32) * geo.x_inc;
          op(x, y, px);
        }
      }
    }
    Ok(())
  };
  if ihdr.is_interlaced {
    for pass in 1..=7 {
      let Some(geo) = pass_geometry(pass, ihdr.width, ihdr.height) else { continue };
      let pass_bytes = (1 + ihdr.bytes_per_scanline(geo.width)) * (geo.height as usize);
      if spare.len() < pass_bytes {
        return Err(PngError::CorruptCompressedData);
      }
      let (filtered, rest) = spare.split_at(pass_bytes);
      spare = rest;
      emit_pass(geo, filtered)?;
    }
  } else {
    let geo = PassGeometry::sequential(ihdr.width, ihdr.height);
    let image_bytes = (1 + ihdr.bytes_per_scanline(geo.width)) * (geo.height as usize);
    if spare.len() < image_bytes {
      return Err(PngError::CorruptCompressedData);
    }
    let (filtered, rest) = spare.split_at(image_bytes);
    spare = rest;
    emit_pass(geo, filtered)?;
  }
  if !spare.is_empty() {
    return Err(PngError::CorruptCompressedData);
  }
  Ok(())
}

#[inline]
fn be16(px: &[u8], channel: usize) -> u16 {
  u16::from_be_bytes([px[2 * channel], px[2 * channel + 1]])
}

/// Assembles the decompressed datastream into final pixel data.
///
/// * `palette` is the parsed `PLTE` content, if one was seen.
/// * `trns` is the parsed `tRNS` content, if one was seen. Its shape must
///   already match the color type.
///
/// Transparency gets folded in here: palette alphas are merged into the
/// palette, grayscale at 8 bits or less becomes an indexed image over a
/// masked gray ramp, and the 16-bit grayscale and RGB mask cases come out
/// in the matching alpha-bearing layout.
///
/// ## Failure
/// * `InconsistentChunkData` for an indexed image with no palette.
/// * `CorruptCompressedData` if the datastream is the wrong size.
pub(crate) fn assemble(
  ihdr: &Ihdr, decompressed: &[u8], palette: Option<Vec<RGBA8>>, trns: Option<Trns<'_>>,
) -> Result<PixelData, PngError> {
  let pixel_count = (ihdr.width as usize) * (ihdr.height as usize);
  let w = ihdr.width as usize;
  Ok(match (ihdr.color_type, ihdr.bit_depth) {
    (PngColorType::Index, _) => {
      let mut palette = palette.ok_or(PngError::InconsistentChunkData)?;
      pad_palette(&mut palette, ihdr.bit_depth);
      if let Some(Trns::Index { data }) = trns {
        merge_indexed_alpha(&mut palette, data);
      }
      let mut indices = vec![0_u8; pixel_count];
      for_each_pixel(ihdr, decompressed, |x, y, px| {
        indices[(y as usize) * w + (x as usize)] = px[0];
      })?;
      PixelData::Indexed { indices, palette }
    }
    (PngColorType::Y, 1..=8) => {
      let mut palette = grayscale_ramp(ihdr.bit_depth);
      if let Some(Trns::Y { y }) = trns {
        merge_gray_mask(&mut palette, y);
      }
      let mut indices = vec![0_u8; pixel_count];
      for_each_pixel(ihdr, decompressed, |x, y, px| {
        indices[(y as usize) * w + (x as usize)] = px[0];
      })?;
      PixelData::Indexed { indices, palette }
    }
    (PngColorType::Y, _) => {
      if let Some(Trns::Y { y: mask }) = trns {
        let mut out = vec![0_u16; pixel_count * 2];
        for_each_pixel(ihdr, decompressed, |x, y, px| {
          let i = 2 * ((y as usize) * w + (x as usize));
          let sample = be16(px, 0);
          out[i] = sample;
          out[i + 1] = if sample == mask { 0 } else { u16::MAX };
        })?;
        PixelData::YA16(out)
      } else {
        let mut out = vec![0_u16; pixel_count];
        for_each_pixel(ihdr, decompressed, |x, y, px| {
          out[(y as usize) * w + (x as usize)] = be16(px, 0);
        })?;
        PixelData::Y16(out)
      }
    }
    (PngColorType::YA, 8) => {
      let mut out = vec![YA8::default(); pixel_count];
      for_each_pixel(ihdr, decompressed, |x, y, px| {
        out[(y as usize) * w + (x as usize)] = YA8 { y: px[0], a: px[1] };
      })?;
      PixelData::YA8(out)
    }
    (PngColorType::YA, _) => {
      let mut out = vec![0_u16; pixel_count * 2];
      for_each_pixel(ihdr, decompressed, |x, y, px| {
        let i = 2 * ((y as usize) * w + (x as usize));
        out[i] = be16(px, 0);
        out[i + 1] = be16(px, 1);
      })?;
      PixelData::YA16(out)
    }
    (PngColorType::RGB, 8) => {
      if let Some(Trns::Rgb { r, g, b }) = trns {
        // at 8 bits only the mask's low bytes are comparable.
        let mask = [r as u8, g as u8, b as u8];
        let mut out = vec![RGBA8::default(); pixel_count];
        for_each_pixel(ihdr, decompressed, |x, y, px| {
          let a = if px == mask { 0 } else { 0xFF };
          out[(y as usize) * w + (x as usize)] = RGBA8 { r: px[0], g: px[1], b: px[2], a };
        })?;
        PixelData::RGBA8(out)
      } else {
        let mut out = vec![RGB8::default(); pixel_count];
        for_each_pixel(ihdr, decompressed, |x, y, px| {
          out[(y as usize) * w + (x as usize)] = RGB8 { r: px[0], g: px[1], b: px[2] };
        })?;
        PixelData::RGB8(out)
      }
    }
    (PngColorType::RGB, _) => {
      if let Some(Trns::Rgb { r, g, b }) = trns {
        let mut out = vec![0_u16; pixel_count * 4];
        for_each_pixel(ihdr, decompressed, |x, y, px| {
          let i = 4 * ((y as usize) * w + (x as usize));
          let (pr, pg, pb) = (be16(px, 0), be16(px, 1), be16(px, 2));
          out[i] = pr;
          out[i + 1] = pg;
          out[i + 2] = pb;
          out[i + 3] = if (pr, pg, pb) == (r, g, b) { 0 } else { u16::MAX };
        })?;
        PixelData::RGBA16(out)
      } else {
        let mut out = vec![0_u16; pixel_count * 3];
        for_each_pixel(ihdr, decompressed, |x, y, px| {
          let i = 3 * ((y as usize) * w + (x as usize));
          out[i] = be16(px, 0);
          out[i + 1] = be16(px, 1);
          out[i + 2] = be16(px, 2);
        })?;
        PixelData::RGB16(out)
      }
    }
    (PngColorType::RGBA, 8) => {
      let mut out = vec![RGBA8::default(); pixel_count];
      for_each_pixel(ihdr, decompressed, |x, y, px| {
        out[(y as usize) * w + (x as usize)] =
          RGBA8 { r: px[0], g: px[1], b: px[2], a: px[3] };
      })?;
      PixelData::RGBA8(out)
    }
    (PngColorType::RGBA, _) => {
      let mut out = vec![0_u16; pixel_count * 4];
      for_each_pixel(ihdr, decompressed, |x, y, px| {
        let i = 4 * ((y as usize) * w + (x as usize));
        out[i] = be16(px, 0);
        out[i + 1] = be16(px, 1);
        out[i + 2] = be16(px, 2);
        out[i + 3] = be16(px, 3);
      })?;
      PixelData::RGBA16(out)
    }
  })
}

#[test]
fn test_for_each_pixel_sequential_gray8() {
  let ihdr = Ihdr {
    width: 3,
    height: 2,
    bit_depth: 8,
    color_type: PngColorType::Y,
    is_interlaced: false,
  };
  // filter None on both lines.
  let stream = [0, 10, 20, 30, 0, 40, 50, 60];
  let mut seen = vec![];
  for_each_pixel(&ihdr, &stream, |x, y, px| seen.push((x, y, px[0]))).unwrap();
  assert_eq!(
    seen,
    vec![(0, 0, 10), (1, 0, 20), (2, 0, 30), (0, 1, 40), (1, 1, 50), (2, 1, 60)]
  );
}

#[test]
fn test_for_each_pixel_rejects_wrong_sizes() {
  let ihdr = Ihdr {
    width: 2,
    height: 2,
    bit_depth: 8,
    color_type: PngColorType::Y,
    is_interlaced: false,
  };
  // one byte short.
  let stream = [0, 1, 2, 0, 3];
  assert_eq!(
    for_each_pixel(&ihdr, &stream, |_, _, _| ()),
    Err(PngError::CorruptCompressedData)
  );
  // one byte long.
  let stream = [0, 1, 2, 0, 3, 4, 5];
  assert_eq!(
    for_each_pixel(&ihdr, &stream, |_, _, _| ()),
    Err(PngError::CorruptCompressedData)
  );
}

#[test]
fn test_assemble_gray2_uses_ramp_palette() {
  let ihdr = Ihdr {
    width: 4,
    height: 1,
    bit_depth: 2,
    color_type: PngColorType::Y,
    is_interlaced: false,
  };
  // one line, filter None, samples 0,1,2,3 packed MSB first.
  let stream = [0, 0b00_01_10_11];
  let data = assemble(&ihdr, &stream, None, None).unwrap();
  let PixelData::Indexed { indices, palette } = data else { panic!() };
  assert_eq!(indices, vec![0, 1, 2, 3]);
  assert_eq!(palette, grayscale_ramp(2));
}

#[test]
fn test_assemble_indexed_requires_palette() {
  let ihdr = Ihdr {
    width: 1,
    height: 1,
    bit_depth: 8,
    color_type: PngColorType::Index,
    is_interlaced: false,
  };
  assert_eq!(
    assemble(&ihdr, &[0, 0], None, None),
    Err(PngError::InconsistentChunkData)
  );
}

#[test]
fn test_assemble_rgb8_mask_compares_low_bytes() {
  let ihdr = Ihdr {
    width: 2,
    height: 1,
    bit_depth: 8,
    color_type: PngColorType::RGB,
    is_interlaced: false,
  };
  let stream = [0, 1, 2, 3, 9, 9, 9];
  let trns = Trns::Rgb { r: 0xAA01, g: 0xBB02, b: 0xCC03 };
  let data = assemble(&ihdr, &stream, None, Some(trns)).unwrap();
  let PixelData::RGBA8(pixels) = data else { panic!() };
  assert_eq!(pixels[0], RGBA8 { r: 1, g: 2, b: 3, a: 0 });
  assert_eq!(pixels[1], RGBA8::opaque(9, 9, 9));
}

#[test]
fn test_assemble_gray16_mask_gives_ya16() {
  let ihdr = Ihdr {
    width: 2,
    height: 1,
    bit_depth: 16,
    color_type: PngColorType::Y,
    is_interlaced: false,
  };
  let stream = [0, 0x12, 0x34, 0x56, 0x78];
  let data = assemble(&ihdr, &stream, None, Some(Trns::Y { y: 0x1234 })).unwrap();
  assert_eq!(data, PixelData::YA16(vec![0x1234, 0, 0x5678, u16::MAX]));
}
