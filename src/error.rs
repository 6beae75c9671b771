/// An error from decoding PNG data.
///
/// Anything in this enum aborts the decode. Problems that the decoder can
/// shrug off (a gamma chunk with a bad length, say) are logged with the
/// [`log`] facade and the offending chunk is treated as absent instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PngError {
  /// The first 8 bytes of the stream are not the PNG signature.
  NotAPngImage,

  /// The IHDR chunk is missing, misplaced, or malformed.
  MalformedHeader,

  /// The color type does not permit the bit depth given.
  ///
  /// The legal combinations are in the PNG spec's color type table:
  /// grayscale allows 1/2/4/8/16, indexed allows 1/2/4/8, and the other
  /// color types allow 8/16.
  InvalidColorTypeBitDepth,

  /// A chunk's declared length runs past the end of the input.
  TruncatedStream,

  /// The zlib datastream inside the IDAT chunks could not be decompressed,
  /// or it decompressed to fewer bytes than the header requires.
  CorruptCompressedData,

  /// A chunk's content disagrees with the rest of the image, such as a PLTE
  /// length that's not a multiple of 3, a missing palette on an indexed
  /// image, or a tRNS chunk shaped wrong for the color type.
  InconsistentChunkData,

  /// A chunk's CRC-32 trailer did not match its content.
  ///
  /// Only produced when [`DecodeConfig::verify_crc`](crate::DecodeConfig)
  /// is on. The default is to not check CRCs at all.
  BadChunkCrc,
}
