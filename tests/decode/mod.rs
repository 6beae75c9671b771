use pngine::*;

use super::rand_bytes;

/// Same polynomial as the chunk trailers use, done the slow bitwise way so
/// the test fixtures don't share code with the decoder they're checking.
fn crc32(bytes: &[u8]) -> u32 {
  let mut crc = u32::MAX;
  for &b in bytes {
    crc ^= u32::from(b);
    for _ in 0..8 {
      crc = if crc & 1 != 0 { 0xEDB8_8320 ^ (crc >> 1) } else { crc >> 1 };
    }
  }
  !crc
}

fn adler32(data: &[u8]) -> u32 {
  let mut a = 1_u32;
  let mut b = 0_u32;
  for &byte in data {
    a = (a + u32::from(byte)) % 65521;
    b = (b + a) % 65521;
  }
  (b << 16) | a
}

/// Wraps raw bytes as a zlib stream of "stored" deflate blocks, so fixtures
/// don't need a real compressor.
fn zlib_store(raw: &[u8]) -> Vec<u8> {
  let mut out = vec![0x78, 0x01];
  if raw.is_empty() {
    out.extend_from_slice(&[1, 0, 0, 0xFF, 0xFF]);
  } else {
    let mut blocks = raw.chunks(0xFFFF).peekable();
    while let Some(block) = blocks.next() {
      out.push(u8::from(blocks.peek().is_none()));
      let len = block.len() as u16;
      out.extend_from_slice(&len.to_le_bytes());
      out.extend_from_slice(&(!len).to_le_bytes());
      out.extend_from_slice(block);
    }
  }
  out.extend_from_slice(&adler32(raw).to_be_bytes());
  out
}

fn chunk(ty: &[u8; 4], data: &[u8]) -> Vec<u8> {
  let mut out = (data.len() as u32).to_be_bytes().to_vec();
  out.extend_from_slice(ty);
  out.extend_from_slice(data);
  let mut crc_input = ty.to_vec();
  crc_input.extend_from_slice(data);
  out.extend_from_slice(&crc32(&crc_input).to_be_bytes());
  out
}

fn ihdr_chunk(w: u32, h: u32, bit_depth: u8, color_type: u8, interlaced: bool) -> Vec<u8> {
  let mut data = w.to_be_bytes().to_vec();
  data.extend_from_slice(&h.to_be_bytes());
  data.extend_from_slice(&[bit_depth, color_type, 0, 0, u8::from(interlaced)]);
  chunk(b"IHDR", &data)
}

/// Signature, the given chunks, then an `IEND`.
fn png_bytes(chunks: &[Vec<u8>]) -> Vec<u8> {
  let mut out = PNG_SIGNATURE.to_vec();
  for c in chunks {
    out.extend_from_slice(c);
  }
  out.extend_from_slice(&chunk(b"IEND", &[]));
  out
}

#[test]
fn decodes_a_simple_gray8_image() {
  let raw = [0, 0, 64, 0, 128, 255];
  let png = png_bytes(&[
    ihdr_chunk(2, 2, 8, 0, false),
    chunk(b"IDAT", &zlib_store(&raw)),
  ]);
  let image = decode(&png).unwrap();
  assert_eq!((image.width, image.height), (2, 2));
  let PixelData::Indexed { indices, palette } = image.data else {
    panic!("gray8 should be indexed")
  };
  assert_eq!(indices, vec![0, 64, 128, 255]);
  assert_eq!(palette.len(), 256);
  assert_eq!(palette[64], RGBA8::opaque(64, 64, 64));
}

#[test]
fn decodes_indexed_with_transparency() {
  // 2x2 at 2 bits per index: one packed byte per line.
  let raw = [0, 0b01_10_0000, 0, 0b11_00_0000];
  let png = png_bytes(&[
    ihdr_chunk(2, 2, 2, 3, false),
    chunk(b"PLTE", &[10, 11, 12, 20, 21, 22, 30, 31, 32]),
    chunk(b"tRNS", &[255, 0]),
    chunk(b"IDAT", &zlib_store(&raw)),
  ]);
  let image = decode(&png).unwrap();
  let PixelData::Indexed { indices, palette } = image.data else { panic!() };
  assert_eq!(indices, vec![1, 2, 3, 0]);
  // padded out to every index a 2-bit sample can hold.
  assert_eq!(palette.len(), 4);
  assert_eq!(palette[0], RGBA8 { r: 10, g: 11, b: 12, a: 255 });
  assert_eq!(palette[1], RGBA8 { r: 20, g: 21, b: 22, a: 0 });
  assert_eq!(palette[2], RGBA8::opaque(30, 31, 32));
  assert_eq!(palette[3], RGBA8::opaque(0, 0, 0));
}

fn test_pattern_rgb(x: u32, y: u32) -> RGB8 {
  RGB8 { r: (x * 31) as u8, g: (y * 31) as u8, b: (x ^ y) as u8 }
}

#[test]
fn interlaced_decodes_the_same_as_sequential() {
  const W: u32 = 8;
  const H: u32 = 8;
  let mut sequential = Vec::new();
  for y in 0..H {
    sequential.push(0);
    for x in 0..W {
      let px = test_pattern_rgb(x, y);
      sequential.extend_from_slice(&[px.r, px.g, px.b]);
    }
  }
  let mut interlaced = Vec::new();
  for pass in 1..=7 {
    let Some(geo) = pass_geometry(pass, W, H) else { continue };
    for j in 0..geo.height {
      interlaced.push(0);
      for i in 0..geo.width {
        let px = test_pattern_rgb(geo.x_start + i * geo.x_inc, geo.y_start + j * geo.y_inc);
        interlaced.extend_from_slice(&[px.r, px.g, px.b]);
      }
    }
  }
  // both copies carry a gAMA so the interlace comparison also covers the
  // correction path.
  let gama = chunk(b"gAMA", &45455_u32.to_be_bytes());
  let seq_png = png_bytes(&[
    ihdr_chunk(W, H, 8, 2, false),
    gama.clone(),
    chunk(b"IDAT", &zlib_store(&sequential)),
  ]);
  let int_png = png_bytes(&[
    ihdr_chunk(W, H, 8, 2, true),
    gama,
    chunk(b"IDAT", &zlib_store(&interlaced)),
  ]);
  let seq_image = decode(&seq_png).unwrap();
  let int_image = decode(&int_png).unwrap();
  assert_eq!(seq_image, int_image);
  let table = make_gamma_table_8(0.45455, DEFAULT_DISPLAY_EXPONENT);
  let expected: Vec<RGB8> = (0..H)
    .flat_map(|y| (0..W).map(move |x| test_pattern_rgb(x, y)))
    .map(|px| RGB8 { r: table[usize::from(px.r)], g: table[usize::from(px.g)], b: table[usize::from(px.b)] })
    .collect();
  assert_eq!(seq_image.data, PixelData::RGB8(expected));
}

#[test]
fn gamma_applies_to_color_samples() {
  let raw = [0, 100, 150, 200];
  let gama = chunk(b"gAMA", &45455_u32.to_be_bytes());
  let png = png_bytes(&[
    ihdr_chunk(1, 1, 8, 2, false),
    gama,
    chunk(b"IDAT", &zlib_store(&raw)),
  ]);
  let image = decode(&png).unwrap();
  let table = make_gamma_table_8(0.45455, DEFAULT_DISPLAY_EXPONENT);
  assert_eq!(
    image.data,
    PixelData::RGB8(vec![RGB8 {
      r: table[100],
      g: table[150],
      b: table[200]
    }])
  );
}

#[test]
fn srgb_and_iccp_suppress_gamma() {
  let raw = [0, 100, 150, 200];
  for extra in [chunk(b"sRGB", &[0]), chunk(b"iCCP", b"test\0\0fake profile")] {
    let png = png_bytes(&[
      ihdr_chunk(1, 1, 8, 2, false),
      chunk(b"gAMA", &45455_u32.to_be_bytes()),
      extra,
      chunk(b"IDAT", &zlib_store(&raw)),
    ]);
    let image = decode(&png).unwrap();
    assert_eq!(image.data, PixelData::RGB8(vec![RGB8 { r: 100, g: 150, b: 200 }]));
  }
}

#[test]
fn bad_gama_length_is_not_fatal() {
  let raw = [0, 100, 150, 200];
  let png = png_bytes(&[
    ihdr_chunk(1, 1, 8, 2, false),
    chunk(b"gAMA", &[1, 2]),
    chunk(b"IDAT", &zlib_store(&raw)),
  ]);
  let image = decode(&png).unwrap();
  assert_eq!(image.data, PixelData::RGB8(vec![RGB8 { r: 100, g: 150, b: 200 }]));
}

#[test]
fn gray16_with_mask_comes_out_ya16() {
  let raw = [0, 0xAB, 0xCD, 0x00, 0x11];
  let png = png_bytes(&[
    ihdr_chunk(2, 1, 16, 0, false),
    chunk(b"tRNS", &[0xAB, 0xCD]),
    chunk(b"IDAT", &zlib_store(&raw)),
  ]);
  let image = decode(&png).unwrap();
  assert_eq!(image.data, PixelData::YA16(vec![0xABCD, 0, 0x0011, u16::MAX]));
}

#[test]
fn idat_may_be_split_into_many_chunks() {
  let raw = [0, 1, 2, 3, 0, 4, 5, 6];
  let zlib = zlib_store(&raw);
  let (front, back) = zlib.split_at(3);
  let split_png = png_bytes(&[
    ihdr_chunk(3, 2, 8, 0, false),
    chunk(b"IDAT", front),
    chunk(b"IDAT", &[]),
    chunk(b"IDAT", back),
  ]);
  let whole_png =
    png_bytes(&[ihdr_chunk(3, 2, 8, 0, false), chunk(b"IDAT", &zlib)]);
  assert_eq!(decode(&split_png).unwrap(), decode(&whole_png).unwrap());
}

#[test]
fn rejects_wrong_signature_and_missing_header() {
  assert_eq!(decode(b"JFIF not a png at all"), Err(PngError::NotAPngImage));
  assert_eq!(decode(&PNG_SIGNATURE), Err(PngError::TruncatedStream));
  // first chunk must be the header.
  let png = png_bytes(&[chunk(b"gAMA", &45455_u32.to_be_bytes())]);
  assert_eq!(decode(&png), Err(PngError::MalformedHeader));
}

#[test]
fn detects_truncation() {
  let raw = [0, 1, 2, 3];
  let full = png_bytes(&[
    ihdr_chunk(3, 1, 8, 0, false),
    chunk(b"IDAT", &zlib_store(&raw)),
  ]);
  // cutting anywhere after the signature must give TruncatedStream: either
  // the cut lands mid-chunk or it removes the IEND.
  for cut in 8..full.len() {
    assert_eq!(
      decode(&full[..cut]),
      Err(PngError::TruncatedStream),
      "cut at {cut}"
    );
  }
}

#[test]
fn corrupt_zlib_stream_is_rejected() {
  let mut zlib = zlib_store(&[0, 1, 2, 3]);
  zlib[0] ^= 0xFF;
  let png = png_bytes(&[ihdr_chunk(3, 1, 8, 0, false), chunk(b"IDAT", &zlib)]);
  assert_eq!(decode(&png), Err(PngError::CorruptCompressedData));
  // a well-formed stream that inflates short is also corrupt.
  let png = png_bytes(&[
    ihdr_chunk(3, 1, 8, 0, false),
    chunk(b"IDAT", &zlib_store(&[0, 1])),
  ]);
  assert_eq!(decode(&png), Err(PngError::CorruptCompressedData));
}

#[test]
fn crc_checking_is_opt_in() {
  let raw = [0, 7];
  let mut bad_gama = chunk(b"gAMA", &45455_u32.to_be_bytes());
  let crc_spot = bad_gama.len() - 1;
  bad_gama[crc_spot] ^= 0xFF;
  let png = png_bytes(&[
    ihdr_chunk(1, 1, 8, 0, false),
    bad_gama,
    chunk(b"IDAT", &zlib_store(&raw)),
  ]);
  // default config doesn't look at CRCs at all.
  assert!(decode(&png).is_ok());
  let strict = DecodeConfig { verify_crc: true, ..DecodeConfig::default() };
  assert_eq!(decode_with(&png, strict), Err(PngError::BadChunkCrc));
  // with an undamaged file, strict mode passes.
  let png = png_bytes(&[
    ihdr_chunk(1, 1, 8, 0, false),
    chunk(b"gAMA", &45455_u32.to_be_bytes()),
    chunk(b"IDAT", &zlib_store(&raw)),
  ]);
  assert!(decode_with(&png, strict).is_ok());
}

#[test]
fn trns_on_alpha_color_type_is_inconsistent() {
  let raw = [0, 1, 2, 3, 4];
  let png = png_bytes(&[
    ihdr_chunk(1, 1, 8, 6, false),
    chunk(b"tRNS", &[0, 0]),
    chunk(b"IDAT", &zlib_store(&raw)),
  ]);
  assert_eq!(decode(&png), Err(PngError::InconsistentChunkData));
}

#[test]
fn indexed_image_without_plte_is_inconsistent() {
  let raw = [0, 0];
  let png =
    png_bytes(&[ihdr_chunk(1, 1, 8, 3, false), chunk(b"IDAT", &zlib_store(&raw))]);
  assert_eq!(decode(&png), Err(PngError::InconsistentChunkData));
}

/// Reference forward filtering, written fresh so the round-trip test isn't
/// just checking the decoder against itself.
fn forward_filter(lines: &[Vec<u8>], filter_types: &[u8], bpp: usize) -> Vec<u8> {
  fn paeth(a: u8, b: u8, c: u8) -> u8 {
    let p = i32::from(a) + i32::from(b) - i32::from(c);
    let (pa, pb, pc) =
      ((p - i32::from(a)).abs(), (p - i32::from(b)).abs(), (p - i32::from(c)).abs());
    if pa <= pb && pa <= pc {
      a
    } else if pb <= pc {
      b
    } else {
      c
    }
  }
  let mut out = Vec::new();
  let zero_line = vec![0; lines[0].len()];
  for (row, line) in lines.iter().enumerate() {
    let prior = if row == 0 { &zero_line } else { &lines[row - 1] };
    let ft = filter_types[row];
    out.push(ft);
    for (x, &raw) in line.iter().enumerate() {
      let a = if x >= bpp { line[x - bpp] } else { 0 };
      let b = prior[x];
      let c = if x >= bpp { prior[x - bpp] } else { 0 };
      let predictor = match ft {
        1 => a,
        2 => b,
        3 => (((u32::from(a)) + u32::from(b)) / 2) as u8,
        4 => paeth(a, b, c),
        _ => 0,
      };
      out.push(raw.wrapping_sub(predictor));
    }
  }
  out
}

#[test]
fn unfilter_round_trips_every_filter_type_over_random_data() {
  for bpp in [1_usize, 2, 3, 4, 6, 8] {
    let width_bytes = bpp * 5;
    let lines: Vec<Vec<u8>> = (0..6).map(|_| rand_bytes(width_bytes)).collect();
    let filter_types = [0, 1, 2, 3, 4, 4];
    let filtered = forward_filter(&lines, &filter_types, bpp);
    let mut recon = vec![0; width_bytes * lines.len()];
    unfilter_into(&filtered, &mut recon, bpp, width_bytes).unwrap();
    let flat: Vec<u8> = lines.concat();
    assert_eq!(recon, flat, "failed bpp:{bpp}");
  }
}

#[test]
fn chunk_iteration_of_garbage_never_panics() {
  for _ in 0..50 {
    let mut garbage = PNG_SIGNATURE.to_vec();
    garbage.extend_from_slice(&rand_bytes(200));
    for chunk in RawChunkIter::new(&garbage) {
      drop(chunk);
    }
    let _ = decode(&garbage);
  }
}

#[test]
fn decodes_every_image_fixture() {
  let mut seen = 0;
  for entry in walkdir::WalkDir::new("tests/images") {
    let entry = entry.unwrap();
    if entry.path().extension().map(|e| e == "png") != Some(true) {
      continue;
    }
    // fixture names end in `_WxH.png`.
    let stem = entry.path().file_stem().unwrap().to_str().unwrap();
    let dims = stem.rsplit('_').next().unwrap();
    let (w, h) = dims.split_once('x').unwrap();
    let bytes = std::fs::read(entry.path()).unwrap();
    let image = decode(&bytes)
      .unwrap_or_else(|e| panic!("failed to decode {stem}: {e:?}"));
    assert_eq!(image.width, w.parse::<u32>().unwrap(), "bad width for {stem}");
    assert_eq!(image.height, h.parse::<u32>().unwrap(), "bad height for {stem}");
    // every layout converts to RGBA8 without panicking.
    assert_eq!(image.to_rgba8().len(), (image.width * image.height) as usize);
    seen += 1;
  }
  assert!(seen >= 5, "fixture images went missing");
}

#[test]
fn fixture_contents_survive_real_compression() {
  let bytes = std::fs::read("tests/images/gray16_2x2.png").unwrap();
  let image = decode(&bytes).unwrap();
  assert_eq!(
    image.data,
    PixelData::Y16(vec![0xABCD, 0x0011, 0xFFFF, 0x1234])
  );
  let bytes = std::fs::read("tests/images/rgba8_2x2.png").unwrap();
  let image = decode(&bytes).unwrap();
  assert_eq!(
    image.data,
    PixelData::RGBA8(vec![
      RGBA8 { r: 255, g: 0, b: 0, a: 255 },
      RGBA8 { r: 0, g: 255, b: 0, a: 128 },
      RGBA8 { r: 0, g: 0, b: 255, a: 0 },
      RGBA8 { r: 9, g: 9, b: 9, a: 9 },
    ])
  );
}
