//! Shared cryptography utilities
//!
//! This crate provides the content digest used for tamper detection on
//! signed documents. It is integrity-only: no keys are involved, so a
//! matching digest says nothing about who produced the bytes.

pub mod integrity;

pub use integrity::{hash, verify, DigestParseError, IntegrityDigest};
