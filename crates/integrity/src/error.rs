// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for sealing and verification.

/// Errors that can occur while sealing or verifying a payload.
#[derive(Debug, thiserror::Error)]
pub enum IntegrityError {
    /// The recomputed fingerprint differs from the recorded one.
    #[error("integrity mismatch: expected fingerprint {expected}, computed {actual}")]
    Mismatch { expected: String, actual: String },

    /// The payload could not be serialized into its canonical form.
    #[error("failed to serialize payload: {0}")]
    Serialize(#[from] serde_json::Error),

    /// A document carries no integrity envelope.
    #[error("document has no '{key}' envelope")]
    MissingEnvelope { key: &'static str },

    /// The envelope or document is not in the expected shape.
    #[error("malformed integrity envelope: {0}")]
    MalformedEnvelope(String),

    /// The recorded hash algorithm is not one this build can verify.
    #[error("unsupported hash algorithm '{0}'")]
    UnsupportedAlgorithm(String),
}
