//! Signature image decoding
//!
//! The declared encoding is tried first and the other supported encoding
//! second. Each attempt yields a tagged outcome so the caller can see
//! exactly which decoders ran and why they failed.

use crate::error::PlacementError;
use png::{ColorType, Transformations};
use shared_types::{ImageEncoding, SignatureImage};
use std::io::Cursor;

/// 8-bit RGB samples with an optional 8-bit alpha plane
#[derive(Clone, PartialEq, Eq)]
pub struct DecodedImage {
    pub encoding_used: ImageEncoding,
    pub width: u32,
    pub height: u32,
    pub rgb: Vec<u8>,
    /// Present only when at least one pixel is not fully opaque
    pub alpha: Option<Vec<u8>>,
}

impl std::fmt::Debug for DecodedImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DecodedImage")
            .field("encoding_used", &self.encoding_used)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("has_alpha", &self.alpha.is_some())
            .finish()
    }
}

/// Result of running one decoder over the payload
#[derive(Debug)]
pub enum DecodeAttempt {
    Decoded(DecodedImage),
    Failed {
        encoding: ImageEncoding,
        reason: String,
    },
}

/// Decoders to try, in order
pub fn decode_attempts(declared: ImageEncoding) -> [ImageEncoding; 2] {
    [declared, declared.alternate()]
}

/// Run a single decoder
pub fn decode_as(encoding: ImageEncoding, bytes: &[u8]) -> DecodeAttempt {
    let result = match encoding {
        ImageEncoding::Png => decode_png(bytes),
        ImageEncoding::Jpeg => decode_jpeg(bytes),
    };

    match result {
        Ok(image) => DecodeAttempt::Decoded(image),
        Err(reason) => DecodeAttempt::Failed { encoding, reason },
    }
}

/// Decode a signature image, falling back to the alternate encoding
pub fn decode_signature_image(image: &SignatureImage) -> Result<DecodedImage, PlacementError> {
    let mut tried = Vec::with_capacity(2);

    for encoding in decode_attempts(image.encoding) {
        match decode_as(encoding, &image.bytes) {
            DecodeAttempt::Decoded(decoded) => {
                if encoding != image.encoding {
                    tracing::warn!(
                        declared = %image.encoding,
                        used = %encoding,
                        "signature image decoded with fallback encoding"
                    );
                }
                return Ok(decoded);
            }
            DecodeAttempt::Failed { encoding, reason } => {
                tracing::debug!(%encoding, %reason, "decode attempt failed");
                tried.push(encoding);
            }
        }
    }

    Err(PlacementError::UnsupportedImageFormat {
        declared: image.encoding,
        attempts: tried,
    })
}

fn decode_png(bytes: &[u8]) -> Result<DecodedImage, String> {
    let mut decoder = png::Decoder::new(Cursor::new(bytes));
    // Palette and low bit depths expand to 8-bit gray or RGB, with tRNS as alpha
    decoder.set_transformations(Transformations::normalize_to_color8());

    let mut reader = decoder.read_info().map_err(|e| e.to_string())?;
    let mut buf = vec![0; reader.output_buffer_size()];
    let info = reader.next_frame(&mut buf).map_err(|e| e.to_string())?;
    let data = &buf[..info.buffer_size()];

    let pixels = (info.width as usize) * (info.height as usize);
    let mut rgb = Vec::with_capacity(pixels * 3);
    let mut alpha = Vec::new();

    match info.color_type {
        ColorType::Grayscale => {
            for &g in data {
                rgb.extend_from_slice(&[g, g, g]);
            }
        }
        ColorType::GrayscaleAlpha => {
            alpha.reserve(pixels);
            for px in data.chunks_exact(2) {
                rgb.extend_from_slice(&[px[0], px[0], px[0]]);
                alpha.push(px[1]);
            }
        }
        ColorType::Rgb => rgb.extend_from_slice(data),
        ColorType::Rgba => {
            alpha.reserve(pixels);
            for px in data.chunks_exact(4) {
                rgb.extend_from_slice(&px[..3]);
                alpha.push(px[3]);
            }
        }
        ColorType::Indexed => return Err("palette was not expanded".to_string()),
    }

    finish(ImageEncoding::Png, info.width, info.height, rgb, alpha)
}

fn decode_jpeg(bytes: &[u8]) -> Result<DecodedImage, String> {
    let img = image::load_from_memory_with_format(bytes, image::ImageFormat::Jpeg)
        .map_err(|e| e.to_string())?;
    let rgb = img.to_rgb8();
    let (width, height) = rgb.dimensions();
    finish(ImageEncoding::Jpeg, width, height, rgb.into_raw(), Vec::new())
}

fn finish(
    encoding_used: ImageEncoding,
    width: u32,
    height: u32,
    rgb: Vec<u8>,
    alpha: Vec<u8>,
) -> Result<DecodedImage, String> {
    if width == 0 || height == 0 {
        return Err(format!("image has no pixels ({}x{})", width, height));
    }
    let expected = (width as usize) * (height as usize) * 3;
    if rgb.len() != expected {
        return Err(format!(
            "decoded {} bytes of RGB, expected {}",
            rgb.len(),
            expected
        ));
    }

    let alpha = if alpha.iter().any(|&a| a != u8::MAX) {
        Some(alpha)
    } else {
        None
    };

    Ok(DecodedImage {
        encoding_used,
        width,
        height,
        rgb,
        alpha,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{gray_png, jpeg, rgba_png};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_attempt_order_starts_with_declared() {
        assert_eq!(
            decode_attempts(ImageEncoding::Jpeg),
            [ImageEncoding::Jpeg, ImageEncoding::Png]
        );
        assert_eq!(
            decode_attempts(ImageEncoding::Png),
            [ImageEncoding::Png, ImageEncoding::Jpeg]
        );
    }

    #[test]
    fn test_decode_rgba_png_keeps_alpha() {
        let bytes = rgba_png(2, 1, &[255, 0, 0, 255, 0, 0, 255, 0]);
        let decoded = decode_signature_image(&SignatureImage::new(bytes, ImageEncoding::Png)).unwrap();
        assert_eq!(decoded.encoding_used, ImageEncoding::Png);
        assert_eq!((decoded.width, decoded.height), (2, 1));
        assert_eq!(decoded.rgb, vec![255, 0, 0, 0, 0, 255]);
        assert_eq!(decoded.alpha, Some(vec![255, 0]));
    }

    #[test]
    fn test_opaque_png_drops_alpha() {
        let bytes = rgba_png(1, 1, &[10, 20, 30, 255]);
        let decoded = decode_signature_image(&SignatureImage::new(bytes, ImageEncoding::Png)).unwrap();
        assert_eq!(decoded.alpha, None);
    }

    #[test]
    fn test_grayscale_png_expands_to_rgb() {
        let bytes = gray_png(2, 1, &[0, 200]);
        let decoded = decode_signature_image(&SignatureImage::new(bytes, ImageEncoding::Png)).unwrap();
        assert_eq!(decoded.rgb, vec![0, 0, 0, 200, 200, 200]);
    }

    #[test]
    fn test_decode_jpeg() {
        let decoded =
            decode_signature_image(&SignatureImage::new(jpeg(8, 4), ImageEncoding::Jpeg)).unwrap();
        assert_eq!(decoded.encoding_used, ImageEncoding::Jpeg);
        assert_eq!((decoded.width, decoded.height), (8, 4));
        assert_eq!(decoded.rgb.len(), 8 * 4 * 3);
        assert_eq!(decoded.alpha, None);
    }

    #[test]
    fn test_png_declared_as_jpeg_falls_back() {
        let bytes = rgba_png(3, 2, &[0; 24]);
        let decoded = decode_signature_image(&SignatureImage::new(bytes, ImageEncoding::Jpeg)).unwrap();
        assert_eq!(decoded.encoding_used, ImageEncoding::Png);
    }

    #[test]
    fn test_jpeg_declared_as_png_falls_back() {
        let decoded =
            decode_signature_image(&SignatureImage::new(jpeg(4, 4), ImageEncoding::Png)).unwrap();
        assert_eq!(decoded.encoding_used, ImageEncoding::Jpeg);
    }

    #[test]
    fn test_undecodable_reports_attempts() {
        let err = decode_signature_image(&SignatureImage::new(
            b"GIF89a not supported".to_vec(),
            ImageEncoding::Png,
        ))
        .unwrap_err();
        assert_eq!(
            err,
            PlacementError::UnsupportedImageFormat {
                declared: ImageEncoding::Png,
                attempts: vec![ImageEncoding::Png, ImageEncoding::Jpeg],
            }
        );
        assert!(err.to_string().contains("tried png, jpeg"));
    }

    #[test]
    fn test_single_attempt_is_tagged() {
        match decode_as(ImageEncoding::Jpeg, b"nope") {
            DecodeAttempt::Failed { encoding, reason } => {
                assert_eq!(encoding, ImageEncoding::Jpeg);
                assert!(!reason.is_empty());
            }
            DecodeAttempt::Decoded(_) => panic!("garbage decoded as JPEG"),
        }
    }

    #[test]
    fn test_empty_payload_is_unsupported() {
        let err =
            decode_signature_image(&SignatureImage::new(Vec::new(), ImageEncoding::Jpeg)).unwrap_err();
        assert!(matches!(err, PlacementError::UnsupportedImageFormat { .. }));
    }
}
