// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Canonical JSON encoding.

use crate::IntegrityError;
use serde::Serialize;
use serde_json::{Map, Value};

/// Converts `payload` into its canonical JSON value.
pub fn canonicalize<T: Serialize + ?Sized>(payload: &T) -> Result<Value, IntegrityError> {
    Ok(normalize(serde_json::to_value(payload)?))
}

/// Serializes `payload` into canonical bytes.
pub fn canonical_bytes<T: Serialize + ?Sized>(payload: &T) -> Result<Vec<u8>, IntegrityError> {
    Ok(serde_json::to_vec(&canonicalize(payload)?)?)
}

fn normalize(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> = map.into_iter().collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            let mut sorted = Map::new();
            for (k, v) in entries {
                sorted.insert(k, normalize(v));
            }
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.into_iter().map(normalize).collect()),
        Value::Number(n) => match n.as_f64() {
            Some(f) if f == 0.0 && f.is_sign_negative() => Value::from(0.0),
            _ => Value::Number(n),
        },
        other => other,
    }
}
