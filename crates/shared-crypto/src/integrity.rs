//! Content digests for tamper detection

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Length of an [`IntegrityDigest`] in bytes (SHA-256)
pub const DIGEST_LEN: usize = 32;

/// Fixed-length SHA-256 digest of a document buffer.
///
/// Only ever compared for equality. Serializes as lowercase hex so audit
/// records stay readable.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct IntegrityDigest([u8; DIGEST_LEN]);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DigestParseError {
    #[error("Invalid hex in digest: {0}")]
    InvalidHex(String),

    #[error("Digest must be {expected} bytes, got {actual}")]
    InvalidLength { expected: usize, actual: usize },
}

impl IntegrityDigest {
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for IntegrityDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for IntegrityDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "IntegrityDigest({})", self.to_hex())
    }
}

impl FromStr for IntegrityDigest {
    type Err = DigestParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = hex::decode(s.trim()).map_err(|e| DigestParseError::InvalidHex(e.to_string()))?;
        let bytes: [u8; DIGEST_LEN] = raw
            .as_slice()
            .try_into()
            .map_err(|_| DigestParseError::InvalidLength {
                expected: DIGEST_LEN,
                actual: raw.len(),
            })?;
        Ok(Self(bytes))
    }
}

impl Serialize for IntegrityDigest {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for IntegrityDigest {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Compute the SHA-256 digest of raw document bytes
pub fn hash(buffer: &[u8]) -> IntegrityDigest {
    let mut hasher = Sha256::new();
    hasher.update(buffer);
    IntegrityDigest(hasher.finalize().into())
}

/// Exact equality of two digests. `false` means the buffers differ in at least one byte.
pub fn verify(expected: &IntegrityDigest, actual: &IntegrityDigest) -> bool {
    expected == actual
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Property: hashing is deterministic
        #[test]
        fn hash_deterministic(data in prop::collection::vec(any::<u8>(), 0..2048)) {
            prop_assert!(verify(&hash(&data), &hash(&data)));
        }

        /// Property: flipping any single byte changes the digest
        #[test]
        fn single_byte_mutation_detected(
            data in prop::collection::vec(any::<u8>(), 1..2048),
            index in any::<prop::sample::Index>(),
            flip in 1u8..=255,
        ) {
            let i = index.index(data.len());
            let mut tampered = data.clone();
            tampered[i] ^= flip;
            prop_assert!(!verify(&hash(&data), &hash(&tampered)));
        }

        /// Property: hex form parses back to the same digest
        #[test]
        fn hex_parse_inverse(data in prop::collection::vec(any::<u8>(), 0..256)) {
            let digest = hash(&data);
            let parsed: IntegrityDigest = digest.to_hex().parse().unwrap();
            prop_assert_eq!(parsed, digest);
        }
    }
}
