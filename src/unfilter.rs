//! Reversing the per-scanline filters.
//!
//! From the PNG spec:
//!
//! > Filters are applied to **bytes**, not to pixels, regardless of the bit
//! > depth or color type of the image.
//!
//! Each stored line is one filter-type byte followed by the filtered
//! scanline bytes. Reconstruction uses the already-reconstructed previous
//! line and, within the current line, the byte one pixel-stride to the left.

use crate::PngError;

#[inline]
#[must_use]
const fn paeth_predict(a: u8, b: u8, c: u8) -> u8 {
  let a_ = a as i32;
  let b_ = b as i32;
  let c_ = c as i32;
  let p: i32 = a_ + b_ - c_;
  let pa = (p - a_).abs();
  let pb = (p - b_).abs();
  let pc = (p - c_).abs();
  // The PNG spec is extremely specific that you shall not, under any
  // circumstances, alter the order of evaluation of this expression's tests.
  if pa <= pb && pa <= pc {
    a
  } else if pb <= pc {
    b
  } else {
    c
  }
}

fn recon_sub(line: &mut [u8], bpp: usize) {
  for x in bpp..line.len() {
    line[x] = line[x].wrapping_add(line[x - bpp]);
  }
}

fn recon_up(line: &mut [u8], prior: &[u8]) {
  for (cur, b) in line.iter_mut().zip(prior.iter().copied()) {
    *cur = cur.wrapping_add(b);
  }
}

fn recon_average(line: &mut [u8], prior: &[u8], bpp: usize) {
  for x in 0..line.len() {
    let a = if x >= bpp { line[x - bpp] as u32 } else { 0 };
    let b = prior[x] as u32;
    line[x] = line[x].wrapping_add(((a + b) / 2) as u8);
  }
}

fn recon_paeth(line: &mut [u8], prior: &[u8], bpp: usize) {
  for x in 0..line.len() {
    let a = if x >= bpp { line[x - bpp] } else { 0 };
    let b = prior[x];
    let c = if x >= bpp { prior[x - bpp] } else { 0 };
    line[x] = line[x].wrapping_add(paeth_predict(a, b, c));
  }
}

// The first line of an image has no prior line, so the filters degenerate:
// Up becomes None, Average halves only the left byte, and Paeth's predictor
// can only ever pick the left byte (making it Sub).
fn recon_average_first_line(line: &mut [u8], bpp: usize) {
  for x in bpp..line.len() {
    let a = line[x - bpp] as u32;
    line[x] = line[x].wrapping_add((a / 2) as u8);
  }
}

/// Reconstructs filtered scanlines into `recon`.
///
/// * `filtered` holds some number of lines, each one filter-type byte
///   followed by `bytes_per_scanline` filtered bytes.
/// * `recon` receives the same number of lines of `bytes_per_scanline`
///   reconstructed bytes, with the filter bytes gone.
/// * `bytes_per_pixel` is the filter's byte stride: the whole bytes of one
///   pixel, or 1 when pixels are packed smaller than a byte.
///
/// For an interlaced image, call this once per reduced image with that
/// pass's own strides and line count.
///
/// Filter-type bytes outside 0..=4 are treated as "no filter" rather than
/// rejected.
///
/// ## Failure
/// * `CorruptCompressedData` if the two buffers don't agree on the line
///   count, which means somebody's scanline math went wrong.
pub fn unfilter_into(
  filtered: &[u8], recon: &mut [u8], bytes_per_pixel: usize, bytes_per_scanline: usize,
) -> Result<(), PngError> {
  let in_stride = 1 + bytes_per_scanline;
  let lines = filtered.len() / in_stride;
  if filtered.len() % in_stride != 0 || recon.len() != lines * bytes_per_scanline {
    return Err(PngError::CorruptCompressedData);
  }
  for (row, in_line) in filtered.chunks_exact(in_stride).enumerate() {
    let filter_type = in_line[0];
    let out_start = row * bytes_per_scanline;
    let (prior_rows, out_rest) = recon.split_at_mut(out_start);
    let line = &mut out_rest[..bytes_per_scanline];
    line.copy_from_slice(&in_line[1..]);
    if row == 0 {
      match filter_type {
        1 | 4 => recon_sub(line, bytes_per_pixel),
        3 => recon_average_first_line(line, bytes_per_pixel),
        _ => (),
      }
    } else {
      let prior = &prior_rows[out_start - bytes_per_scanline..];
      match filter_type {
        1 => recon_sub(line, bytes_per_pixel),
        2 => recon_up(line, prior),
        3 => recon_average(line, prior, bytes_per_pixel),
        4 => recon_paeth(line, prior, bytes_per_pixel),
        _ => (),
      }
    }
  }
  Ok(())
}

#[test]
fn test_paeth_predict_tie_breaking() {
  // ties prefer left, then up.
  assert_eq!(paeth_predict(1, 1, 1), 1);
  assert_eq!(paeth_predict(0, 0, 255), 0);
  // each of the three inputs can win.
  assert_eq!(paeth_predict(9, 10, 10), 9);
  assert_eq!(paeth_predict(5, 10, 0), 10);
  assert_eq!(paeth_predict(10, 20, 16), 16);
}

#[test]
#[cfg(feature = "alloc")]
fn test_unfilter_known_answers() {
  use alloc::vec;
  // 2 lines of 4 bytes, bpp 1, Sub then Up.
  let filtered = [1, 1, 1, 1, 1, 2, 1, 1, 1, 1];
  let mut recon = vec![0; 8];
  unfilter_into(&filtered, &mut recon, 1, 4).unwrap();
  assert_eq!(recon, [1, 2, 3, 4, 2, 3, 4, 5]);
  // Average against the line above.
  let filtered = [0, 2, 4, 6, 8, 3, 1, 1, 1, 1];
  let mut recon = vec![0; 8];
  unfilter_into(&filtered, &mut recon, 1, 4).unwrap();
  assert_eq!(recon, [2, 4, 6, 8, 2, 4, 6, 8]);
  // An unknown filter type is left alone.
  let filtered = [9, 7, 7, 7, 7];
  let mut recon = vec![0; 4];
  unfilter_into(&filtered, &mut recon, 1, 4).unwrap();
  assert_eq!(recon, [7, 7, 7, 7]);
}
