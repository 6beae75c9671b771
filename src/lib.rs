#![no_std]
#![forbid(unsafe_code)]
#![cfg_attr(docs_rs, feature(doc_cfg))]

//! A crate for decoding PNG data.
//!
//! * [Portable Network Graphics Specification (Second Edition)][png-spec]
//!
//! [png-spec]: https://www.w3.org/TR/2003/REC-PNG-20031110/
//!
//! ## Automatic Decoding
//!
//! With the `alloc` and `miniz_oxide` features enabled (both on by default),
//! call [`decode`](crate::decode::decode) with the full PNG bytes and you get
//! back a [`PixelBuffer`](crate::buffer::PixelBuffer) holding the image in
//! whatever layout the PNG's color type calls for, or a
//! [`PngError`](crate::error::PngError) saying what went wrong.
//!
//! ```no_run
//! let png: &[u8] = unimplemented!("data from somewhere");
//! let image = pngine::decode(png).unwrap();
//! println!("{}x{} pixels", image.width, image.height);
//! ```
//!
//! ## Decoding a PNG Yourself
//!
//! The individual stages are public, so you can also drive the process
//! directly and control every allocation:
//!
//! 1) Iterate the chunks with [`RawChunkIter`](crate::chunk::RawChunkIter)
//!    and parse the first one as an [`Ihdr`](crate::header::Ihdr).
//! 2) Gather the `IDAT` chunk payloads and decompress them as a single zlib
//!    stream into a buffer of
//!    [`decompressed_size`](crate::header::Ihdr::decompressed_size) bytes.
//! 3) Defilter each (reduced) image with
//!    [`unfilter_into`](crate::unfilter::unfilter_into), using
//!    [`pass_geometry`](crate::adam7::pass_geometry) for the Adam7 layout
//!    when the image is interlaced.
//! 4) Unpack sub-byte samples with
//!    [`unpack_scanline`](crate::unpack::unpack_scanline) and assemble the
//!    final pixels however you like.

#[cfg(feature = "alloc")]
extern crate alloc;

pub mod pixel_formats;
pub use pixel_formats::*;

mod error;
pub use error::*;

pub mod chunk;
pub use chunk::*;

pub mod header;
pub use header::*;

pub mod adam7;
pub use adam7::*;

pub mod unfilter;
pub use unfilter::*;

pub mod unpack;
pub use unpack::*;

mod crc32;
pub(crate) use crc32::*;

#[cfg(feature = "alloc")]
pub mod palette;
#[cfg(feature = "alloc")]
pub use palette::*;

#[cfg(feature = "alloc")]
pub mod gamma;
#[cfg(feature = "alloc")]
pub use gamma::*;

#[cfg(feature = "alloc")]
pub mod buffer;
#[cfg(feature = "alloc")]
pub use buffer::*;

#[cfg(feature = "alloc")]
mod assemble;

#[cfg(all(feature = "alloc", feature = "miniz_oxide"))]
pub mod decode;
#[cfg(all(feature = "alloc", feature = "miniz_oxide"))]
pub use decode::*;
