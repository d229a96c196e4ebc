//! Document signing core logic
//!
//! This crate ties the placement engine to a signing request: it enforces
//! configured limits, stamps each placement in order, and produces the
//! audit records a store would persist. Verification re-hashes a stored
//! document against its record.

pub mod config;
pub mod error;
pub mod pipeline;

pub use config::SigningConfig;
pub use error::{ConfigError, SigningError};
pub use pipeline::{sign_document, verify_document, SignedDocument, SigningRequest};

// Re-export types from shared crates
pub use shared_crypto::{hash, verify, IntegrityDigest};
pub use shared_pdf::{
    calculate_fit_dimensions, compute_contain_fit, is_valid_normalized_coordinate, overlay_image,
    overlay_images, page_count, page_geometry, transform_document_to_viewport,
    transform_viewport_to_document, OverlayOptions, PlacementError,
};
pub use shared_types::{
    AuditFragment, CoordinateSpace, ImageEncoding, IntegrityStatus, PageGeometry, Rectangle,
    SignatureAuditRecord, SignatureImage, SignaturePlacement, ViewportFrame,
};
