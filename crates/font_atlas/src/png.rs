//! Minimal PNG container encoder for the packed atlas
//!
//! The chunk layout is hand-rolled so the output is bit-exact and carries
//! nothing nondeterministic: the 8-byte signature, an IHDR describing a
//! 1-bit grayscale image, a single zlib-compressed IDAT holding the packed
//! scanlines (filter-tag bytes included), and an empty IEND. Any standard
//! PNG decoder must accept the result.

use std::io::{self, Write};

use flate2::write::ZlibEncoder;
use flate2::Compression;
use thiserror::Error;

use crate::atlas::AtlasPlan;

/// The 8-byte PNG file signature.
pub const SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1A, b'\n'];

/// Errors raised while serializing the container.
#[derive(Error, Debug)]
pub enum PngError {
    /// Underlying write failure
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// The bitmap buffer does not match the planned dimensions. This is a
    /// layout or rasterizer bug, never a property of the input font, and the
    /// buffer is never truncated or padded to compensate.
    #[error("atlas buffer holds {actual} bytes but a {width}x{height} px image needs {expected}")]
    SizeMismatch {
        /// Bytes the planned dimensions require
        expected: usize,
        /// Bytes actually supplied
        actual: usize,
        /// Planned image width in pixels
        width: u32,
        /// Planned image height in pixels
        height: u32,
    },
}

/// Write the packed atlas as a grayscale PNG with bit depth 1.
///
/// `pixels` must be exactly the planned scanline bytes: per row, one zero
/// filter-tag byte followed by `ceil(width / 8)` packed pixel bytes.
pub fn write_atlas<W: Write>(writer: &mut W, plan: &AtlasPlan, pixels: &[u8]) -> Result<(), PngError> {
    let width = plan.image_width();
    let height = plan.image_height();
    let expected = plan.stride() * height as usize;
    if pixels.len() != expected {
        return Err(PngError::SizeMismatch {
            expected,
            actual: pixels.len(),
            width,
            height,
        });
    }

    writer.write_all(&SIGNATURE)?;

    // IHDR: dimensions, bit depth 1, grayscale, deflate, no filtering, no interlace
    let mut header = Vec::with_capacity(13);
    header.extend_from_slice(&width.to_be_bytes());
    header.extend_from_slice(&height.to_be_bytes());
    header.extend_from_slice(&[1, 0, 0, 0, 0]);
    write_chunk(writer, b"IHDR", &header)?;

    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::best());
    encoder.write_all(pixels)?;
    let compressed = encoder.finish()?;
    log::debug!(
        "Compressed {} scanline bytes into a {} byte IDAT payload",
        pixels.len(),
        compressed.len()
    );
    write_chunk(writer, b"IDAT", &compressed)?;

    write_chunk(writer, b"IEND", &[])?;
    Ok(())
}

/// One chunk: big-endian payload length, 4-byte tag, payload, then a CRC-32
/// over tag and payload.
fn write_chunk<W: Write>(writer: &mut W, tag: &[u8; 4], payload: &[u8]) -> io::Result<()> {
    #[allow(clippy::cast_possible_truncation)]
    let length = payload.len() as u32;
    writer.write_all(&length.to_be_bytes())?;
    writer.write_all(tag)?;
    writer.write_all(payload)?;

    let mut hasher = crc32fast::Hasher::new();
    hasher.update(tag);
    hasher.update(payload);
    writer.write_all(&hasher.finalize().to_be_bytes())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atlas::AtlasBitmap;

    #[test]
    fn test_empty_chunk_layout_and_crc() {
        let mut out = Vec::new();
        write_chunk(&mut out, b"IEND", &[]).unwrap();
        // Zero length, tag, and the well-known CRC of the bare IEND tag.
        assert_eq!(
            out,
            [0x00, 0x00, 0x00, 0x00, b'I', b'E', b'N', b'D', 0xAE, 0x42, 0x60, 0x82]
        );
    }

    #[test]
    fn test_signature_and_header_fields() {
        let plan = AtlasPlan::new(2, 8, 8);
        let bitmap = AtlasBitmap::new(&plan);

        let mut out = Vec::new();
        write_atlas(&mut out, &plan, bitmap.as_bytes()).unwrap();

        assert_eq!(&out[..8], &SIGNATURE);
        assert_eq!(&out[8..12], &[0, 0, 0, 13], "IHDR payload length");
        assert_eq!(&out[12..16], b"IHDR");
        assert_eq!(&out[16..20], &16u32.to_be_bytes(), "width");
        assert_eq!(&out[20..24], &8u32.to_be_bytes(), "height");
        assert_eq!(
            &out[24..29],
            &[1, 0, 0, 0, 0],
            "bit depth, color type, compression, filter, interlace"
        );
        assert_eq!(&out[37..41], b"IDAT");
        assert_eq!(&out[out.len() - 8..out.len() - 4], b"IEND");
    }

    #[test]
    fn test_rejects_mismatched_buffer_size() {
        let plan = AtlasPlan::new(2, 8, 8);
        let short = vec![0u8; plan.stride() * 8 - 1];

        let err = write_atlas(&mut Vec::new(), &plan, &short).unwrap_err();
        let PngError::SizeMismatch { expected, actual, .. } = err else {
            panic!("expected size mismatch");
        };
        assert_eq!(expected, plan.stride() * 8);
        assert_eq!(actual, expected - 1);
    }

    #[test]
    fn test_standard_decoder_accepts_output() {
        let plan = AtlasPlan::new(2, 8, 8);
        let mut bitmap = AtlasBitmap::new(&plan);
        bitmap.plot_row(0, 0, 0, 0xFF); // top row of the first cell
        bitmap.plot_row(8, 3, 0, 0x01); // rightmost pixel, row 3 of the second cell

        let mut out = Vec::new();
        write_atlas(&mut out, &plan, bitmap.as_bytes()).unwrap();

        let decoded = image::load_from_memory(&out).unwrap().to_luma8();
        assert_eq!(decoded.dimensions(), (16, 8));
        for x in 0..8 {
            assert_eq!(decoded.get_pixel(x, 0).0[0], 255, "pixel ({x}, 0)");
        }
        assert_eq!(decoded.get_pixel(15, 3).0[0], 255);
        assert_eq!(decoded.get_pixel(8, 3).0[0], 0);
        assert_eq!(decoded.get_pixel(0, 1).0[0], 0);
    }
}
