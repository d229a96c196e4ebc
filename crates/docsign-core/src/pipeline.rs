//! Sign and verify entry points

use crate::config::SigningConfig;
use crate::error::SigningError;
use chrono::{DateTime, Utc};
use shared_crypto::{hash, verify, IntegrityDigest};
use shared_pdf::overlay_images;
use shared_types::{IntegrityStatus, SignatureAuditRecord, SignaturePlacement, VerificationEvent};
use tracing::{info, instrument, warn};

/// Everything needed to stamp one signer's placements onto one document
#[derive(Debug, Clone)]
pub struct SigningRequest {
    pub document_id: String,
    pub signer: String,
    pub signed_at: DateTime<Utc>,
    /// Applied in order; later placements draw over earlier ones
    pub placements: Vec<SignaturePlacement>,
}

/// Signed output plus one audit record per placement
#[derive(Debug, Clone)]
pub struct SignedDocument {
    pub document: Vec<u8>,
    pub original_digest: IntegrityDigest,
    pub final_digest: IntegrityDigest,
    pub records: Vec<SignatureAuditRecord>,
}

fn check_limits(
    config: &SigningConfig,
    document: &[u8],
    request: &SigningRequest,
) -> Result<(), SigningError> {
    if request.placements.is_empty() {
        return Err(SigningError::NoPlacements);
    }
    if document.len() > config.max_document_bytes {
        return Err(SigningError::DocumentTooLarge {
            size: document.len(),
            limit: config.max_document_bytes,
        });
    }
    if let Some((index, placement)) = request
        .placements
        .iter()
        .enumerate()
        .find(|(_, p)| p.image.bytes.len() > config.max_image_bytes)
    {
        return Err(SigningError::ImageTooLarge {
            index,
            size: placement.image.bytes.len(),
            limit: config.max_image_bytes,
        });
    }
    Ok(())
}

/// Stamp every placement in the request and build the audit records.
///
/// Records carry the digests of the document as received and as returned;
/// the per-step digests live in each record's placement fragment.
#[instrument(
    skip(config, document, request),
    fields(document_id = %request.document_id, placements = request.placements.len())
)]
pub fn sign_document(
    config: &SigningConfig,
    document: &[u8],
    request: &SigningRequest,
) -> Result<SignedDocument, SigningError> {
    check_limits(config, document, request)?;

    let batch = overlay_images(document, &request.placements, &config.overlay_options())?;

    let records = batch
        .fragments
        .into_iter()
        .map(|fragment| {
            SignatureAuditRecord::from_fragment(
                &request.document_id,
                &request.signer,
                request.signed_at,
                batch.original_digest,
                batch.final_digest,
                fragment,
            )
        })
        .collect::<Vec<_>>();

    info!(
        original = %batch.original_digest,
        signed = %batch.final_digest,
        bytes = batch.document.len(),
        "document signed"
    );

    Ok(SignedDocument {
        document: batch.document,
        original_digest: batch.original_digest,
        final_digest: batch.final_digest,
        records,
    })
}

/// Re-hash a stored document and record the outcome on its audit record
pub fn verify_document(
    record: &mut SignatureAuditRecord,
    document: &[u8],
    verified_at: DateTime<Utc>,
) -> IntegrityStatus {
    let digest = hash(document);
    let status = IntegrityStatus::from_match(verify(&digest, &record.after_digest));

    if status == IntegrityStatus::Tampered {
        warn!(
            document_id = %record.document_id,
            expected = %record.after_digest,
            actual = %digest,
            "document digest mismatch"
        );
    }

    record.record_verification(VerificationEvent {
        verified_at,
        status,
        digest_compared: digest,
    });
    status
}
