//! Shared PDF handling utilities
//!
//! This crate provides the placement geometry, coordinate transformation
//! between viewport and page space, and the overlay of signature images
//! onto PDF pages.

pub mod coords;
pub mod error;
pub mod geometry;
pub mod overlay;
pub mod parser;
pub mod raster;

#[cfg(test)]
mod test_support;

pub use coords::{
    is_valid_normalized_coordinate, transform_document_to_viewport,
    transform_viewport_to_document, PlacementTransform,
};
pub use error::PlacementError;
pub use geometry::{calculate_fit_dimensions, compute_contain_fit};
pub use overlay::{
    apply_placement, overlay_image, overlay_images, page_count, page_geometry, BatchOutcome,
    BatchState, OverlayOptions, OverlayOutcome,
};
pub use parser::{PageBox, PdfDocument};
pub use raster::{decode_signature_image, DecodedImage};
