//! Content digests for declaration models.
//!
//! A model digest covers every resolved declaration in source order, so two
//! runs over the same declaration file stamp identical digests into their
//! metadata. Index maps are not part of the serialized form.

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::error::Result;
use crate::model::DeclarationModel;

/// A 32-byte SHA-256 content hash.
pub type ContentHash = [u8; 32];

/// Compute the SHA-256 content hash of any serializable value.
pub fn content_hash<T: Serialize>(value: &T) -> Result<ContentHash> {
    let json = serde_json::to_vec(value)?;
    let mut hasher = Sha256::new();
    hasher.update(&json);
    Ok(hasher.finalize().into())
}

/// Format a content hash as a hex string.
pub fn hash_hex(hash: &ContentHash) -> String {
    hash.iter().map(|b| format!("{b:02x}")).collect()
}

impl DeclarationModel {
    /// Hex SHA-256 digest of the resolved model.
    pub fn digest(&self) -> Result<String> {
        Ok(hash_hex(&content_hash(self)?))
    }
}
