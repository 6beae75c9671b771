//! Module for pixel formats.
//!
//! There's two main factors with a pixel format:
//! * **Channels:** one or more of red, green, blue, and alpha. Grayscale
//!   formats have a single "Y" channel.
//! * **Bit Depth:** how many bits per channel.
//!
//! The formats here are what the PNG decoder hands out. 16-bit-per-channel
//! images are produced as interleaved `u16` sample planes rather than pixel
//! structs, so only the 8-bit layouts get a type.

use bytemuck::{Pod, Zeroable};

/// An 8-bit RGB pixel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Pod, Zeroable)]
#[repr(C)]
pub struct RGB8 {
  pub r: u8,
  pub g: u8,
  pub b: u8,
}

/// An 8-bit RGBA pixel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Pod, Zeroable)]
#[repr(C)]
pub struct RGBA8 {
  pub r: u8,
  pub g: u8,
  pub b: u8,
  pub a: u8,
}
impl RGBA8 {
  /// The given RGB values at full opacity.
  #[inline]
  #[must_use]
  pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
    Self { r, g, b, a: 0xFF }
  }
}
impl From<RGB8> for RGBA8 {
  #[inline]
  #[must_use]
  fn from(RGB8 { r, g, b }: RGB8) -> Self {
    Self { r, g, b, a: 0xFF }
  }
}

/// An 8-bit greyscale pixel with alpha.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Pod, Zeroable)]
#[repr(C)]
pub struct YA8 {
  pub y: u8,
  pub a: u8,
}
