//! Raw chunk framing for PNG datastreams.
//!
//! A PNG is an 8-byte signature followed by chunks, each framed as
//! `length(4) | type(4) | data(length) | crc(4)`, with all integers
//! big-endian. This module only splits the stream along those frames;
//! interpreting any particular chunk is the decoder's business.

use core::fmt::{Debug, Write};

use crate::{crc32::chunk_crc, PngError};

/// The first eight bytes of a PNG datastream should match these bytes.
pub const PNG_SIGNATURE: [u8; 8] = [137, 80, 78, 71, 13, 10, 26, 10];

/// Checks if the initial 8 bytes of the slice are the PNG signature.
///
/// * If this is the case, the rest of the bytes are very likely PNG data.
/// * If this is *not* the case, the rest of the bytes are very likely *not*
///   PNG data.
#[inline]
#[must_use]
pub const fn is_png_signature_correct(bytes: &[u8]) -> bool {
  matches!(bytes, [137, 80, 78, 71, 13, 10, 26, 10, ..])
}

/// An unparsed chunk from a PNG.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct RawChunk<'b> {
  /// 4-byte chunk type tag, eg `b"IHDR"`.
  pub chunk_ty: [u8; 4],
  /// The chunk's data bytes.
  pub data: &'b [u8],
  /// The CRC the chunk trailer claims for the type and data.
  pub declared_crc: u32,
}
impl RawChunk<'_> {
  /// Computes the actual CRC of the chunk's type and data.
  ///
  /// When this doesn't match [`declared_crc`](Self::declared_crc) the chunk
  /// was damaged somewhere along the way.
  #[inline]
  #[must_use]
  pub fn actual_crc(&self) -> u32 {
    chunk_crc(self.chunk_ty, self.data)
  }
}
impl Debug for RawChunk<'_> {
  fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
    f.write_char(self.chunk_ty[0] as char)?;
    f.write_char(self.chunk_ty[1] as char)?;
    f.write_char(self.chunk_ty[2] as char)?;
    f.write_char(self.chunk_ty[3] as char)?;
    f.debug_struct("")
      .field("data", &(&self.data[..self.data.len().min(12)], self.data.len()))
      .field("declared_crc", &self.declared_crc)
      .finish()
  }
}

/// An iterator over the raw chunks of a PNG datastream.
///
/// Yields `Ok` chunks until the input runs out. If a chunk's declared length
/// (or its fixed-size framing) runs past the end of the input you get one
/// `Err(`[`TruncatedStream`](PngError::TruncatedStream)`)` and then the
/// iterator is done.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawChunkIter<'b> {
  spare: &'b [u8],
}
impl<'b> RawChunkIter<'b> {
  /// Makes an iterator over a PNG's chunks.
  ///
  /// Pass the full PNG bytes, the signature is skipped automatically. This
  /// does *not* check that the signature is correct, use
  /// [`is_png_signature_correct`] for that; with less than 8 bytes of input
  /// the iterator just starts out empty.
  #[inline]
  pub const fn new(png: &'b [u8]) -> Self {
    Self {
      spare: match png {
        [_, _, _, _, _, _, _, _, spare @ ..] => spare,
        _ => &[],
      },
    }
  }
}
impl<'b> Iterator for RawChunkIter<'b> {
  type Item = Result<RawChunk<'b>, PngError>;
  fn next(&mut self) -> Option<Self::Item> {
    if self.spare.is_empty() {
      return None;
    }
    let chunk_len: usize = if self.spare.len() >= 4 {
      let (len_bytes, rest) = self.spare.split_at(4);
      self.spare = rest;
      u32::from_be_bytes(len_bytes.try_into().unwrap()) as usize
    } else {
      self.spare = &[];
      return Some(Err(PngError::TruncatedStream));
    };
    let chunk_ty: [u8; 4] = if self.spare.len() >= 4 {
      let (ty_bytes, rest) = self.spare.split_at(4);
      self.spare = rest;
      ty_bytes.try_into().unwrap()
    } else {
      self.spare = &[];
      return Some(Err(PngError::TruncatedStream));
    };
    let data: &'b [u8] = if self.spare.len() >= chunk_len {
      let (data, rest) = self.spare.split_at(chunk_len);
      self.spare = rest;
      data
    } else {
      self.spare = &[];
      return Some(Err(PngError::TruncatedStream));
    };
    let declared_crc: u32 = if self.spare.len() >= 4 {
      let (crc_bytes, rest) = self.spare.split_at(4);
      self.spare = rest;
      u32::from_be_bytes(crc_bytes.try_into().unwrap())
    } else {
      self.spare = &[];
      return Some(Err(PngError::TruncatedStream));
    };
    Some(Ok(RawChunk { chunk_ty, data, declared_crc }))
  }
}
