use shared_types::{CoordinateSpace, ImageEncoding};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PlacementError {
    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),

    #[error("Expected a {expected} rectangle, got {found}")]
    CoordinateSpaceMismatch {
        expected: CoordinateSpace,
        found: CoordinateSpace,
    },

    #[error("Failed to parse PDF: {0}")]
    MalformedDocument(String),

    #[error("Page index {index} out of range (document has {page_count} pages)")]
    PageIndexOutOfRange { index: u32, page_count: u32 },

    #[error("Unsupported image format: declared {declared}, tried {}", attempts_label(.attempts))]
    UnsupportedImageFormat {
        declared: ImageEncoding,
        attempts: Vec<ImageEncoding>,
    },

    #[error("Failed to serialize PDF: {0}")]
    Serialization(String),
}

fn attempts_label(attempts: &[ImageEncoding]) -> String {
    attempts
        .iter()
        .map(|a| a.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
