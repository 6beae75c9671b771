//! Widening sub-byte samples out to one byte each.
//!
//! At bit depths 1, 2, and 4 a reconstructed scanline packs several samples
//! per byte, most significant bits first, with any spare low bits of the
//! final byte left as padding. The rest of the decoder wants one sample per
//! byte, so this module unpacks a line at a time.

/// Unpacks one scanline's samples into `out`, one sample per byte.
///
/// * `bit_depth` must be 1, 2, 4, or 8 (at 8 this is just a copy).
/// * `out.len()` is the sample count, which decides how much of `packed` is
///   read. Padding bits at the end of `packed` are never touched.
/// * The unpacked values are the raw sample values, **not** scaled up to the
///   0..=255 range.
///
/// At depth 16 samples are already whole bytes, don't call this.
pub fn unpack_scanline(packed: &[u8], bit_depth: u8, out: &mut [u8]) {
  match bit_depth {
    1 => {
      for (i, o) in out.iter_mut().enumerate() {
        *o = (packed[i / 8] >> (7 - (i % 8))) & 0b1;
      }
    }
    2 => {
      for (i, o) in out.iter_mut().enumerate() {
        *o = (packed[i / 4] >> (6 - 2 * (i % 4))) & 0b11;
      }
    }
    4 => {
      for (i, o) in out.iter_mut().enumerate() {
        *o = (packed[i / 2] >> (4 - 4 * (i % 2))) & 0b1111;
      }
    }
    _ => {
      debug_assert_eq!(bit_depth, 8);
      out.copy_from_slice(&packed[..out.len()]);
    }
  }
}

#[test]
fn test_unpack_scanline() {
  let mut out = [0; 8];
  unpack_scanline(&[0b1011_0001], 1, &mut out);
  assert_eq!(out, [1, 0, 1, 1, 0, 0, 0, 1]);

  let mut out = [0; 4];
  unpack_scanline(&[0b11_01_00_10], 2, &mut out);
  assert_eq!(out, [0b11, 0b01, 0b00, 0b10]);

  let mut out = [0; 3];
  unpack_scanline(&[0xAB, 0xC0], 4, &mut out);
  assert_eq!(out, [0xA, 0xB, 0xC]);

  let mut out = [0; 2];
  unpack_scanline(&[7, 9], 8, &mut out);
  assert_eq!(out, [7, 9]);
}

#[test]
fn test_unpack_scanline_ignores_padding_bits() {
  // 5 one-bit samples in a byte that has garbage in the padding bits.
  let mut out = [0; 5];
  unpack_scanline(&[0b10110_111], 1, &mut out);
  assert_eq!(out, [1, 0, 1, 1, 0]);
}
