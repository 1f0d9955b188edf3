//! Content fingerprinting: canonical-JSON SHA-256 digests.
//!
//! Every hash field on a stored record (`content_hash`, `review_hash`,
//! `inspection_hash`) is produced here. The hashed payload embeds the
//! creation-time timestamp, so the digest is a fixed fingerprint of that
//! creation event — NOT a live integrity check against current row
//! contents. Editing an OPEN logbook entry recomputes its hash rather than
//! tripping a verifier; a downstream auditor verifies a record by
//! recomputing the digest from the same field values and timestamp.

use serde::Serialize;
use sha2::{Digest, Sha256};

use siwes_contracts::error::{TrackError, TrackResult};

/// Compute the SHA-256 fingerprint of a structured record.
///
/// The record is serialized through `serde_json::to_value`, whose object
/// representation is a `BTreeMap` — keys come out sorted, giving a stable
/// canonical byte layout regardless of struct field order. The digest is
/// returned as a lowercase 64-character hex string.
pub fn fingerprint<T: Serialize>(record: &T) -> TrackResult<String> {
    let value = serde_json::to_value(record).map_err(|e| TrackError::Storage {
        reason: format!("failed to serialize record for hashing: {e}"),
    })?;
    let bytes = serde_json::to_vec(&value).map_err(|e| TrackError::Storage {
        reason: format!("failed to encode canonical JSON: {e}"),
    })?;

    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    Ok(hex::encode(hasher.finalize()))
}

// ── Tests ─────────────────────────────────────────────────────────────────────
