//! The all-in-one decoding entry point.

use alloc::{vec, vec::Vec};

use miniz_oxide::inflate::decompress_slice_iter_to_slice;

use crate::{
  assemble::assemble,
  buffer::PixelBuffer,
  chunk::{is_png_signature_correct, RawChunk, RawChunkIter},
  gamma::{correct_pixel_data, GammaPolicy, DEFAULT_DISPLAY_EXPONENT},
  header::Ihdr,
  palette::{parse_plte, Trns},
  PngError, RGBA8,
};

/// Knobs for [`decode_with`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecodeConfig {
  /// Check every chunk's CRC and fail on a mismatch.
  ///
  /// Off by default. A CRC only catches damage that the zlib stream's own
  /// checksum and the structural checks wouldn't, so most decoders don't
  /// bother.
  pub verify_crc: bool,
  /// The display exponent used when gamma correcting.
  ///
  /// Defaults to [`DEFAULT_DISPLAY_EXPONENT`].
  pub display_exponent: f32,
}
impl Default for DecodeConfig {
  #[inline]
  fn default() -> Self {
    Self { verify_crc: false, display_exponent: DEFAULT_DISPLAY_EXPONENT }
  }
}

/// Decodes a complete PNG datastream with the default configuration.
pub fn decode(png: &[u8]) -> Result<PixelBuffer, PngError> {
  decode_with(png, DecodeConfig::default())
}

#[inline]
fn checked<'b>(
  raw: RawChunk<'b>, config: &DecodeConfig,
) -> Result<RawChunk<'b>, PngError> {
  if config.verify_crc && raw.actual_crc() != raw.declared_crc {
    Err(PngError::BadChunkCrc)
  } else {
    Ok(raw)
  }
}

/// Decodes a complete PNG datastream.
///
/// The whole file goes in, one [`PixelBuffer`] comes out. Ancillary chunks
/// the decoder doesn't understand are skipped, and understood ancillary
/// chunks with nonsense data are skipped with a warning rather than failing
/// the decode.
///
/// ## Failure
/// * `NotAPngImage`: the signature bytes are wrong.
/// * `MalformedHeader`: the first chunk isn't a well-formed `IHDR`.
/// * `TruncatedStream`: the chunk stream ends mid-chunk, or there's no
///   `IEND`.
/// * `CorruptCompressedData`: the `IDAT` zlib stream is broken or the wrong
///   size for the image.
/// * `InconsistentChunkData`: a critical chunk contradicts the header, eg an
///   indexed image with no `PLTE`, or a `tRNS` on an alpha-bearing color
///   type.
/// * `BadChunkCrc`: only with [`verify_crc`](DecodeConfig::verify_crc) set.
pub fn decode_with(png: &[u8], config: DecodeConfig) -> Result<PixelBuffer, PngError> {
  if !is_png_signature_correct(png) {
    return Err(PngError::NotAPngImage);
  }
  let mut it = RawChunkIter::new(png);
  let ihdr: Ihdr = match it.next() {
    Some(Ok(raw)) if &raw.chunk_ty == b"IHDR" => Ihdr::parse(checked(raw, &config)?.data)?,
    Some(Ok(_)) => return Err(PngError::MalformedHeader),
    Some(Err(e)) => return Err(e),
    None => return Err(PngError::TruncatedStream),
  };
  //
  let mut idat_slices: Vec<&[u8]> = Vec::new();
  let mut palette: Option<Vec<RGBA8>> = None;
  let mut trns: Option<Trns<'_>> = None;
  let mut policy = GammaPolicy::default();
  let mut saw_iend = false;
  for raw in it {
    let raw = checked(raw?, &config)?;
    match &raw.chunk_ty {
      b"IEND" => {
        saw_iend = true;
        break;
      }
      b"IDAT" => idat_slices.push(raw.data),
      b"PLTE" => palette = Some(parse_plte(raw.data)?),
      b"tRNS" => trns = Some(Trns::parse(ihdr.color_type, raw.data)?),
      b"gAMA" => match raw.data {
        [a, b, c, d] => {
          let hundred_thousandths = u32::from_be_bytes([*a, *b, *c, *d]);
          if hundred_thousandths == 0 {
            log::warn!("gAMA declares a gamma of zero, ignoring it");
          } else {
            policy.gamma = Some(hundred_thousandths as f32 / 100_000.0);
          }
        }
        _ => log::warn!("gAMA data is {} bytes, expected 4", raw.data.len()),
      },
      b"sRGB" => match raw.data {
        [_rendering_intent] => policy.srgb_present = true,
        _ => log::warn!("sRGB data is {} bytes, expected 1", raw.data.len()),
      },
      b"iCCP" => policy.iccp_present = true,
      _ => log::debug!("skipping chunk {:?}", raw.chunk_ty.map(|b| b as char)),
    }
  }
  if !saw_iend {
    return Err(PngError::TruncatedStream);
  }
  //
  let mut decompressed = vec![0_u8; ihdr.decompressed_size()];
  let decompressed_len = decompress_slice_iter_to_slice(
    &mut decompressed,
    idat_slices.iter().copied(),
    true,
    true,
  )
  .map_err(|_| PngError::CorruptCompressedData)?;
  if decompressed_len != decompressed.len() {
    return Err(PngError::CorruptCompressedData);
  }
  //
  let mut data = assemble(&ihdr, &decompressed, palette, trns)?;
  if let Some(gamma) = policy.applies() {
    correct_pixel_data(&mut data, gamma, config.display_exponent);
  }
  Ok(PixelBuffer { width: ihdr.width, height: ihdr.height, data })
}
