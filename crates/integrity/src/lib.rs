// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # integrity
//!
//! Tamper detection for profiling reports.
//!
//! A payload is first reduced to a canonical byte form:
//!
//! - object keys sorted lexicographically at every depth
//! - compact JSON (no insignificant whitespace)
//! - `-0.0` written as `0.0`
//!
//! The canonical bytes are hashed with SHA-256 and the hex digest is
//! stored in an [`IntegrityRecord`] next to the algorithm name and payload
//! size. Semantically identical payloads always produce the same record;
//! any change to a value produces a different one.
//!
//! Verification never re-seals. A mismatch is reported to the caller as
//! [`IntegrityError::Mismatch`] (strict) or `false` / [`IntegrityStatus::Tampered`].

mod canonical;
mod envelope;
mod error;
mod record;

pub use canonical::{canonical_bytes, canonicalize};
pub use envelope::{attach, strip, verify_document, IntegrityReport, IntegrityStatus, ENVELOPE_KEY};
pub use error::IntegrityError;
pub use record::{
    fingerprint_bytes, seal, verify, verify_canonical_bytes, verify_strict, HashAlgorithm,
    IntegrityRecord,
};
