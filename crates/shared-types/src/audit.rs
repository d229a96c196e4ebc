//! Audit record shapes for signed documents
//!
//! These are built by the signing pipeline and handed to whatever store
//! keeps them. Nothing here writes to storage.

use crate::geometry::{FitResult, Rectangle, ViewportFrame};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared_crypto::IntegrityDigest;

/// Integrity state of a signed document as last observed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntegrityStatus {
    Valid,
    Tampered,
    Pending,
}

impl IntegrityStatus {
    pub fn from_match(matches: bool) -> Self {
        if matches {
            IntegrityStatus::Valid
        } else {
            IntegrityStatus::Tampered
        }
    }
}

/// One re-hash of a stored document against its recorded digest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerificationEvent {
    pub verified_at: DateTime<Utc>,
    pub status: IntegrityStatus,
    /// Digest of the buffer that was checked
    pub digest_compared: IntegrityDigest,
}

/// Per-placement outcome of one overlay step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditFragment {
    /// Zero-based page the image was drawn on
    pub page_index: u32,
    pub normalized: Rectangle,
    pub document_rect: Rectangle,
    pub viewport: ViewportFrame,
    pub applied_fit: FitResult,
    /// Digest of the buffer this step started from
    pub before_digest: IntegrityDigest,
    /// Digest of the buffer this step produced
    pub after_digest: IntegrityDigest,
}

/// Record of one signature placement, as persisted by the audit store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignatureAuditRecord {
    pub document_id: String,
    pub signer: String,
    pub signed_at: DateTime<Utc>,
    /// Digest of the document as received
    pub before_digest: IntegrityDigest,
    /// Digest of the document as returned to the caller
    pub after_digest: IntegrityDigest,
    pub placement: AuditFragment,
    pub status: IntegrityStatus,
    #[serde(default)]
    verifications: Vec<VerificationEvent>,
}

impl SignatureAuditRecord {
    /// New records start out `Pending` with no verification history
    pub fn from_fragment(
        document_id: &str,
        signer: &str,
        signed_at: DateTime<Utc>,
        before_digest: IntegrityDigest,
        after_digest: IntegrityDigest,
        placement: AuditFragment,
    ) -> Self {
        Self {
            document_id: document_id.to_string(),
            signer: signer.to_string(),
            signed_at,
            before_digest,
            after_digest,
            placement,
            status: IntegrityStatus::Pending,
            verifications: Vec::new(),
        }
    }

    pub fn page_index(&self) -> u32 {
        self.placement.page_index
    }

    /// Verification history, oldest first
    pub fn verifications(&self) -> &[VerificationEvent] {
        &self.verifications
    }

    /// Append a verification event; the record's status follows the latest event
    pub fn record_verification(&mut self, event: VerificationEvent) {
        self.status = event.status;
        self.verifications.push(event);
    }

    /// Serialize to JSON
    pub fn to_json(&self) -> Result<String, String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| format!("Failed to serialize audit record: {}", e))
    }

    /// Deserialize from JSON
    pub fn from_json(json: &str) -> Result<Self, String> {
        serde_json::from_str(json).map_err(|e| format!("Failed to deserialize audit record: {}", e))
    }

    /// One-line summary for display
    pub fn summary(&self) -> String {
        format!(
            "[{}] {} - page {} - {:?}",
            self.signed_at.format("%Y-%m-%d"),
            self.signer,
            self.placement.page_index.saturating_add(1),
            self.status
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use shared_crypto::hash;

    fn fragment() -> AuditFragment {
        AuditFragment {
            page_index: 0,
            normalized: Rectangle::normalized(0.1, 0.2, 0.3, 0.1),
            document_rect: Rectangle::document(61.2, 554.4, 183.6, 79.2),
            viewport: ViewportFrame::new(612.0, 792.0),
            applied_fit: FitResult {
                width: 158.4,
                height: 79.2,
                offset_x: 12.6,
                offset_y: 0.0,
            },
            before_digest: hash(b"before"),
            after_digest: hash(b"after"),
        }
    }

    fn record() -> SignatureAuditRecord {
        SignatureAuditRecord::from_fragment(
            "doc-123",
            "alice@example.com",
            Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap(),
            hash(b"before"),
            hash(b"after"),
            fragment(),
        )
    }

    #[test]
    fn test_new_record_is_pending() {
        let record = record();
        assert_eq!(record.status, IntegrityStatus::Pending);
        assert!(record.verifications().is_empty());
    }

    #[test]
    fn test_verifications_append_in_order() {
        let mut record = record();
        let t1 = Utc.with_ymd_and_hms(2024, 3, 2, 0, 0, 0).unwrap();
        let t2 = Utc.with_ymd_and_hms(2024, 3, 3, 0, 0, 0).unwrap();

        record.record_verification(VerificationEvent {
            verified_at: t1,
            status: IntegrityStatus::Valid,
            digest_compared: hash(b"after"),
        });
        record.record_verification(VerificationEvent {
            verified_at: t2,
            status: IntegrityStatus::Tampered,
            digest_compared: hash(b"edited"),
        });

        assert_eq!(record.status, IntegrityStatus::Tampered);
        let times: Vec<_> = record.verifications().iter().map(|e| e.verified_at).collect();
        assert_eq!(times, vec![t1, t2]);
    }

    #[test]
    fn test_status_wire_names() {
        let json = serde_json::to_string(&IntegrityStatus::Tampered).unwrap();
        assert_eq!(json, "\"tampered\"");
    }

    #[test]
    fn test_json_roundtrip_keeps_history() {
        let mut record = record();
        record.record_verification(VerificationEvent {
            verified_at: Utc.with_ymd_and_hms(2024, 3, 2, 0, 0, 0).unwrap(),
            status: IntegrityStatus::Valid,
            digest_compared: hash(b"after"),
        });

        let json = record.to_json().unwrap();
        let restored = SignatureAuditRecord::from_json(&json).unwrap();
        assert_eq!(restored, record);
    }

    #[test]
    fn test_json_roundtrip_keeps_float_bits() {
        let mut record = record();
        record.placement.normalized = Rectangle::normalized(0.1022349903127918, 0.7, 0.2, 0.05);
        record.placement.document_rect =
            Rectangle::document(62.567813727428, 553.9191, 122.4, 39.6);

        let restored = SignatureAuditRecord::from_json(&record.to_json().unwrap()).unwrap();
        assert_eq!(
            restored.placement.normalized.x.to_bits(),
            record.placement.normalized.x.to_bits()
        );
        assert_eq!(restored, record);

        // Re-encoding the restored record is stable
        assert_eq!(restored.to_json().unwrap(), record.to_json().unwrap());
    }

    #[test]
    fn test_summary_saturates_page_number() {
        let mut record = record();
        record.placement.page_index = u32::MAX;
        assert!(record.summary().contains(&format!("page {}", u32::MAX)));
    }

    #[test]
    fn test_summary_uses_one_based_page() {
        assert_eq!(
            record().summary(),
            "[2024-03-01] alice@example.com - page 1 - Pending"
        );
    }
}
