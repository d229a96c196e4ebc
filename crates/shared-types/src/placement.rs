//! Signature placement requests

use crate::geometry::{Rectangle, ViewportFrame};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const PNG_MAGIC: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
const JPEG_MAGIC: [u8; 3] = [0xFF, 0xD8, 0xFF];

/// Raster encodings accepted for drawn signatures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageEncoding {
    Png,
    Jpeg,
}

impl ImageEncoding {
    /// The other supported encoding, used as the decode fallback
    pub fn alternate(self) -> Self {
        match self {
            ImageEncoding::Png => ImageEncoding::Jpeg,
            ImageEncoding::Jpeg => ImageEncoding::Png,
        }
    }

    /// Guess the encoding from magic bytes
    pub fn sniff(bytes: &[u8]) -> Option<Self> {
        if bytes.starts_with(&PNG_MAGIC) {
            Some(ImageEncoding::Png)
        } else if bytes.starts_with(&JPEG_MAGIC) {
            Some(ImageEncoding::Jpeg)
        } else {
            None
        }
    }
}

impl fmt::Display for ImageEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImageEncoding::Png => f.write_str("png"),
            ImageEncoding::Jpeg => f.write_str("jpeg"),
        }
    }
}

impl FromStr for ImageEncoding {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "png" | "image/png" => Ok(ImageEncoding::Png),
            "jpeg" | "jpg" | "image/jpeg" => Ok(ImageEncoding::Jpeg),
            other => Err(format!("Unknown image encoding: {}", other)),
        }
    }
}

/// Raster signature payload with its declared encoding
#[derive(Clone, PartialEq, Eq)]
pub struct SignatureImage {
    pub bytes: Vec<u8>,
    pub encoding: ImageEncoding,
}

impl SignatureImage {
    pub fn new(bytes: Vec<u8>, encoding: ImageEncoding) -> Self {
        Self { bytes, encoding }
    }
}

impl fmt::Debug for SignatureImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignatureImage")
            .field("encoding", &self.encoding)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// One signature to stamp: where the user put it, on which surface, on which page
#[derive(Debug, Clone, PartialEq)]
pub struct SignaturePlacement {
    /// Placement box in viewport pixels
    pub rect: Rectangle,
    /// Surface size at the moment the box was drawn
    pub viewport: ViewportFrame,
    /// Zero-based page index
    pub page_index: u32,
    pub image: SignatureImage,
}

impl SignaturePlacement {
    pub fn new(
        rect: Rectangle,
        viewport: ViewportFrame,
        page_index: u32,
        image: SignatureImage,
    ) -> Self {
        Self {
            rect,
            viewport,
            page_index,
            image,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alternate_is_involution() {
        assert_eq!(ImageEncoding::Png.alternate(), ImageEncoding::Jpeg);
        assert_eq!(ImageEncoding::Png.alternate().alternate(), ImageEncoding::Png);
    }

    #[test]
    fn test_sniff_png_and_jpeg() {
        let png = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00];
        assert_eq!(ImageEncoding::sniff(&png), Some(ImageEncoding::Png));
        assert_eq!(
            ImageEncoding::sniff(&[0xFF, 0xD8, 0xFF, 0xE0]),
            Some(ImageEncoding::Jpeg)
        );
        assert_eq!(ImageEncoding::sniff(b"<svg></svg>"), None);
    }

    #[test]
    fn test_parse_encoding_names() {
        assert_eq!("PNG".parse::<ImageEncoding>(), Ok(ImageEncoding::Png));
        assert_eq!("jpg".parse::<ImageEncoding>(), Ok(ImageEncoding::Jpeg));
        assert_eq!("image/jpeg".parse::<ImageEncoding>(), Ok(ImageEncoding::Jpeg));
        assert!("gif".parse::<ImageEncoding>().is_err());
    }

    #[test]
    fn test_image_debug_omits_payload() {
        let image = SignatureImage::new(vec![7; 4096], ImageEncoding::Png);
        let debug = format!("{:?}", image);
        assert!(debug.contains("len: 4096"));
        assert!(!debug.contains("7, 7"));
    }
}
