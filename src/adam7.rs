//! Adam7 interlace geometry.
//!
//! An interlaced PNG stores seven "reduced" images, each a progressively
//! finer sub-grid of the full image:
//!
//! ```text
//! 1 6 4 6 2 6 4 6
//! 7 7 7 7 7 7 7 7
//! 5 6 5 6 5 6 5 6
//! 7 7 7 7 7 7 7 7
//! 3 6 4 6 3 6 4 6
//! 7 7 7 7 7 7 7 7
//! 5 6 5 6 5 6 5 6
//! 7 7 7 7 7 7 7 7
//! ```
//!
//! Each pass is filtered as its own little image, so decoding needs each
//! pass's dimensions and the stepping that scatters its pixels back into the
//! full grid. All of that is a pure function of the full image size.

/// The layout of one reduced image of an interlaced PNG.
///
/// Pass `n`'s pixels land at `(x_start + i*x_inc, y_start + j*y_inc)` for
/// `i < width`, `j < height`. Over all seven passes every pixel of the full
/// image is covered exactly once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PassGeometry {
  /// Width of the reduced image.
  pub width: u32,
  /// Height of the reduced image.
  pub height: u32,
  /// Column of the pass's first pixel in the full image.
  pub x_start: u32,
  /// Row of the pass's first pixel in the full image.
  pub y_start: u32,
  /// Horizontal step between the pass's pixels.
  pub x_inc: u32,
  /// Vertical step between the pass's pixels.
  pub y_inc: u32,
}
impl PassGeometry {
  /// The trivial geometry of a non-interlaced image: every pixel, in raster
  /// order.
  ///
  /// Treating the sequential case as "pass zero" lets the rest of the
  /// decoder stop caring whether the image was interlaced at all.
  #[inline]
  #[must_use]
  pub const fn sequential(width: u32, height: u32) -> Self {
    Self { width, height, x_start: 0, y_start: 0, x_inc: 1, y_inc: 1 }
  }
}

/// Geometry of Adam7 pass `pass` (1 through 7) for a `width` by `height`
/// image.
///
/// Returns `None` when the image is too small in the relevant dimension for
/// the pass to contribute any pixels (eg pass 2 starts at column 4, so it
/// needs a width of at least 5), and also for pass numbers outside 1..=7.
#[must_use]
pub const fn pass_geometry(pass: u32, width: u32, height: u32) -> Option<PassGeometry> {
  let (w, h) = (width, height);
  Some(match pass {
    1 => PassGeometry {
      width: w / 8 + if w % 8 != 0 { 1 } else { 0 },
      height: h / 8 + if h % 8 != 0 { 1 } else { 0 },
      x_start: 0,
      y_start: 0,
      x_inc: 8,
      y_inc: 8,
    },
    2 => {
      if w < 5 {
        return None;
      }
      PassGeometry {
        width: w / 8 + if w % 8 >= 5 { 1 } else { 0 },
        height: h / 8 + if h % 8 != 0 { 1 } else { 0 },
        x_start: 4,
        y_start: 0,
        x_inc: 8,
        y_inc: 8,
      }
    }
    3 => {
      if h < 5 {
        return None;
      }
      PassGeometry {
        width: w / 4 + if w % 4 != 0 { 1 } else { 0 },
        height: h / 8 + if h % 8 >= 5 { 1 } else { 0 },
        x_start: 0,
        y_start: 4,
        x_inc: 4,
        y_inc: 8,
      }
    }
    4 => {
      if w < 3 {
        return None;
      }
      PassGeometry {
        width: w / 4 + if w % 4 >= 3 { 1 } else { 0 },
        height: h / 4 + if h % 4 != 0 { 1 } else { 0 },
        x_start: 2,
        y_start: 0,
        x_inc: 4,
        y_inc: 4,
      }
    }
    5 => {
      if h < 3 {
        return None;
      }
      PassGeometry {
        width: w / 2 + if w % 2 != 0 { 1 } else { 0 },
        height: h / 4 + if h % 4 >= 3 { 1 } else { 0 },
        x_start: 0,
        y_start: 2,
        x_inc: 2,
        y_inc: 4,
      }
    }
    6 => {
      if w < 2 {
        return None;
      }
      PassGeometry {
        width: w / 2,
        height: h / 2 + if h % 2 != 0 { 1 } else { 0 },
        x_start: 1,
        y_start: 0,
        x_inc: 2,
        y_inc: 2,
      }
    }
    7 => {
      if h < 2 {
        return None;
      }
      PassGeometry {
        width: w,
        height: h / 2,
        x_start: 0,
        y_start: 1,
        x_inc: 1,
        y_inc: 2,
      }
    }
    _ => return None,
  })
}

#[test]
fn test_pass_geometry_8x8() {
  let expected = [
    (1, 1, 0, 0, 8, 8),
    (1, 1, 4, 0, 8, 8),
    (2, 1, 0, 4, 4, 8),
    (2, 2, 2, 0, 4, 4),
    (4, 2, 0, 2, 2, 4),
    (4, 4, 1, 0, 2, 2),
    (8, 4, 0, 1, 1, 2),
  ];
  for (pass, ex) in (1..=7).zip(expected) {
    let g = pass_geometry(pass, 8, 8).unwrap();
    assert_eq!(
      (g.width, g.height, g.x_start, g.y_start, g.x_inc, g.y_inc),
      ex,
      "failed pass:{pass}"
    );
  }
}

#[test]
fn test_small_images_skip_passes() {
  assert!(pass_geometry(2, 4, 100).is_none());
  assert!(pass_geometry(2, 5, 100).is_some());
  assert!(pass_geometry(3, 100, 4).is_none());
  assert!(pass_geometry(3, 100, 5).is_some());
  assert!(pass_geometry(4, 2, 100).is_none());
  assert!(pass_geometry(4, 3, 100).is_some());
  assert!(pass_geometry(5, 100, 2).is_none());
  assert!(pass_geometry(5, 100, 3).is_some());
  assert!(pass_geometry(6, 1, 100).is_none());
  assert!(pass_geometry(6, 2, 100).is_some());
  assert!(pass_geometry(7, 100, 1).is_none());
  assert!(pass_geometry(7, 100, 2).is_some());
  assert!(pass_geometry(0, 8, 8).is_none());
  assert!(pass_geometry(8, 8, 8).is_none());
}

#[test]
#[cfg(feature = "alloc")]
fn test_passes_partition_every_pixel_exactly_once() {
  use alloc::vec;
  // exhaustive over all the small sizes, which covers every combination of
  // the per-pass remainder behavior (everything mod 8).
  for w in 1..=24_u32 {
    for h in 1..=24_u32 {
      let mut counts = vec![0_u8; (w * h) as usize];
      for pass in 1..=7 {
        let Some(g) = pass_geometry(pass, w, h) else { continue };
        assert!(g.width > 0 && g.height > 0, "empty pass:{pass} w:{w} h:{h}");
        for j in 0..g.height {
          for i in 0..g.width {
            let x = g.x_start + i * g.x_inc;
            let y = g.y_start + j * g.y_inc;
            assert!(x < w && y < h, "out of bounds pass:{pass} w:{w} h:{h}");
            counts[(y * w + x) as usize] += 1;
          }
        }
      }
      assert!(counts.iter().all(|&c| c == 1), "bad cover w:{w} h:{h}");
    }
  }
}
