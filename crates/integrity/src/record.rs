// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Fingerprints and the [`IntegrityRecord`].

use crate::canonical::canonical_bytes;
use crate::IntegrityError;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;

/// Hash algorithm used for a fingerprint. Carried in every record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithm {
    #[default]
    Sha256,
}

impl HashAlgorithm {
    pub fn as_str(&self) -> &'static str {
        match self {
            HashAlgorithm::Sha256 => "sha256",
        }
    }

    /// Hex digest of `bytes`.
    pub fn digest_hex(&self, bytes: &[u8]) -> String {
        match self {
            HashAlgorithm::Sha256 => hex::encode(Sha256::digest(bytes)),
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HashAlgorithm {
    type Err = IntegrityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sha256" | "sha-256" => Ok(HashAlgorithm::Sha256),
            _ => Err(IntegrityError::UnsupportedAlgorithm(s.to_string())),
        }
    }
}

/// The seal over one canonical payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntegrityRecord {
    pub hash_algorithm: HashAlgorithm,
    /// Lowercase hex digest of the canonical payload.
    pub fingerprint: String,
    /// Length in bytes of the canonical payload.
    pub canonical_payload_size: usize,
}

/// Canonicalizes `payload` and computes its record.
///
/// The record depends only on the payload's content; sealing the same
/// content twice yields identical records.
pub fn seal<T: Serialize + ?Sized>(payload: &T) -> Result<IntegrityRecord, IntegrityError> {
    let bytes = canonical_bytes(payload)?;
    let record = fingerprint_bytes(&bytes);
    tracing::debug!(
        fingerprint = %record.fingerprint,
        size = record.canonical_payload_size,
        "Sealed payload"
    );
    Ok(record)
}

/// Hashes bytes exactly as given, without canonicalization.
pub fn fingerprint_bytes(bytes: &[u8]) -> IntegrityRecord {
    let algorithm = HashAlgorithm::default();
    IntegrityRecord {
        hash_algorithm: algorithm,
        fingerprint: algorithm.digest_hex(bytes),
        canonical_payload_size: bytes.len(),
    }
}

/// Recomputes the fingerprint of `payload` and compares it to `record`.
///
/// Returns `Err` only when the payload cannot be serialized.
pub fn verify<T: Serialize + ?Sized>(
    payload: &T,
    record: &IntegrityRecord,
) -> Result<bool, IntegrityError> {
    let bytes = canonical_bytes(payload)?;
    Ok(verify_canonical_bytes(&bytes, record))
}

/// Like [`verify`], but a mismatch is an [`IntegrityError::Mismatch`].
pub fn verify_strict<T: Serialize + ?Sized>(
    payload: &T,
    record: &IntegrityRecord,
) -> Result<(), IntegrityError> {
    let bytes = canonical_bytes(payload)?;
    let actual = record.hash_algorithm.digest_hex(&bytes);
    if actual == record.fingerprint && bytes.len() == record.canonical_payload_size {
        Ok(())
    } else {
        tracing::warn!(expected = %record.fingerprint, %actual, "Integrity mismatch");
        Err(IntegrityError::Mismatch {
            expected: record.fingerprint.clone(),
            actual,
        })
    }
}

/// Checks bytes that are already in canonical form against `record`.
///
/// Any byte-level difference, including reordered keys, fails.
pub fn verify_canonical_bytes(bytes: &[u8], record: &IntegrityRecord) -> bool {
    bytes.len() == record.canonical_payload_size
        && record.hash_algorithm.digest_hex(bytes) == record.fingerprint
}
