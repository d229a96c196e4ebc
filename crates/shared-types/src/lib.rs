pub mod audit;
pub mod geometry;
pub mod placement;

pub use audit::{AuditFragment, IntegrityStatus, SignatureAuditRecord, VerificationEvent};
pub use geometry::{ContainFit, CoordinateSpace, FitResult, PageGeometry, Rectangle, ViewportFrame};
pub use placement::{ImageEncoding, SignatureImage, SignaturePlacement};
pub use shared_crypto::IntegrityDigest;
