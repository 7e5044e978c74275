// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Sealing a whole JSON document in place.
//!
//! The record is stored under [`ENVELOPE_KEY`] and covers every other
//! top-level field of the document.

use crate::canonical::canonical_bytes;
use crate::record::{seal, HashAlgorithm, IntegrityRecord};
use crate::IntegrityError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Top-level key holding the integrity record.
pub const ENVELOPE_KEY: &str = "integrity";

/// Verdict of a document check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum IntegrityStatus {
    Valid,
    Tampered,
}

impl fmt::Display for IntegrityStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IntegrityStatus::Valid => f.write_str("VALID"),
            IntegrityStatus::Tampered => f.write_str("TAMPERED"),
        }
    }
}

/// Result of [`verify_document`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntegrityReport {
    pub verified: bool,
    pub algorithm: HashAlgorithm,
    /// Fingerprint recorded in the document.
    pub fingerprint: String,
    /// Fingerprint recomputed from the document's current content.
    pub computed_fingerprint: String,
    pub status: IntegrityStatus,
}

/// Seals `document` and stores the record under [`ENVELOPE_KEY`].
///
/// An existing envelope is replaced. The document must be a JSON object.
pub fn attach(document: Value) -> Result<(Value, IntegrityRecord), IntegrityError> {
    let mut body = into_object(document)?;
    body.remove(ENVELOPE_KEY);

    let record = seal(&body)?;
    body.insert(ENVELOPE_KEY.to_string(), serde_json::to_value(&record)?);
    Ok((Value::Object(body), record))
}

/// Returns a copy of `document` without its envelope.
pub fn strip(document: &Value) -> Result<Value, IntegrityError> {
    let mut body = into_object(document.clone())?;
    body.remove(ENVELOPE_KEY);
    Ok(Value::Object(body))
}

/// Recomputes the fingerprint of a sealed document and compares it to its
/// envelope.
///
/// A content mismatch is reported as [`IntegrityStatus::Tampered`]; `Err`
/// means the document could not be checked at all.
pub fn verify_document(document: &Value) -> Result<IntegrityReport, IntegrityError> {
    let mut body = into_object(document.clone())?;
    let envelope = body
        .remove(ENVELOPE_KEY)
        .ok_or(IntegrityError::MissingEnvelope { key: ENVELOPE_KEY })?;
    let record = parse_envelope(&envelope)?;

    let bytes = canonical_bytes(&body)?;
    let computed = record.hash_algorithm.digest_hex(&bytes);
    let verified =
        computed == record.fingerprint && bytes.len() == record.canonical_payload_size;

    let status = if verified {
        IntegrityStatus::Valid
    } else {
        tracing::warn!(
            expected = %record.fingerprint,
            actual = %computed,
            "Document fingerprint does not match its envelope"
        );
        IntegrityStatus::Tampered
    };

    Ok(IntegrityReport {
        verified,
        algorithm: record.hash_algorithm,
        fingerprint: record.fingerprint,
        computed_fingerprint: computed,
        status,
    })
}

fn into_object(document: Value) -> Result<Map<String, Value>, IntegrityError> {
    match document {
        Value::Object(map) => Ok(map),
        other => Err(IntegrityError::MalformedEnvelope(format!(
            "expected a JSON object document, got {}",
            kind(&other)
        ))),
    }
}

fn parse_envelope(envelope: &Value) -> Result<IntegrityRecord, IntegrityError> {
    let obj = envelope.as_object().ok_or_else(|| {
        IntegrityError::MalformedEnvelope(format!("envelope is {}, not an object", kind(envelope)))
    })?;

    let field = |name: &str| {
        obj.get(name)
            .ok_or_else(|| IntegrityError::MalformedEnvelope(format!("missing field '{name}'")))
    };

    let algorithm = field("hash_algorithm")?
        .as_str()
        .ok_or_else(|| IntegrityError::MalformedEnvelope("hash_algorithm is not a string".into()))?
        .parse::<HashAlgorithm>()?;
    let fingerprint = field("fingerprint")?
        .as_str()
        .ok_or_else(|| IntegrityError::MalformedEnvelope("fingerprint is not a string".into()))?
        .to_string();
    let size = field("canonical_payload_size")?.as_u64().ok_or_else(|| {
        IntegrityError::MalformedEnvelope("canonical_payload_size is not an integer".into())
    })?;

    Ok(IntegrityRecord {
        hash_algorithm: algorithm,
        fingerprint,
        canonical_payload_size: size as usize,
    })
}

fn kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
