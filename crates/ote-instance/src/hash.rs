//! Content hashing for instances, collections and serialized payloads
//!
//! Provides [`ContentHash`], a 32-byte Blake3 digest. The pipeline uses it to
//! fingerprint persisted bytes and to compare instance content independently
//! of instance identity.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Blake3 digest, serialized as lowercase hex
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct ContentHash([u8; 32]);

impl ContentHash {
    /// Wrap raw digest bytes
    #[inline]
    #[must_use]
    pub const fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Raw digest bytes
    #[inline]
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Hash a byte payload
    #[inline]
    #[must_use]
    pub fn compute(data: &[u8]) -> Self {
        Self(*blake3::hash(data).as_bytes())
    }

    /// Hash the canonical JSON encoding of a value
    ///
    /// `IndexMap`-backed values keep insertion order, so two instances built
    /// the same way hash the same.
    ///
    /// # Errors
    /// Returns error if the value cannot be encoded as JSON
    pub fn compute_serializable<T>(value: &T) -> Result<Self, HashError>
    where
        T: serde::Serialize + ?Sized,
    {
        let json = serde_json::to_vec(value)?;
        Ok(Self::compute(&json))
    }

    /// First 16 hex characters, for log lines
    #[inline]
    #[must_use]
    pub fn short(&self) -> String {
        hex::encode(&self.0[..8])
    }
}

impl Display for ContentHash {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl FromStr for ContentHash {
    type Err = HashError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let decoded = hex::decode(s)?;
        <[u8; 32]>::try_from(decoded.as_slice())
            .map(Self)
            .map_err(|_| HashError::WrongSize(decoded.len()))
    }
}

impl From<ContentHash> for String {
    fn from(hash: ContentHash) -> Self {
        hash.to_string()
    }
}

impl TryFrom<String> for ContentHash {
    type Error = HashError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Errors from hashing values or parsing hex digests
#[derive(Debug, thiserror::Error)]
pub enum HashError {
    /// Digest does not decode to 32 bytes
    #[error("digest must be 32 bytes, got {0}")]
    WrongSize(usize),

    /// Digest is not valid hex
    #[error("digest is not hex: {0}")]
    Hex(#[from] hex::FromHexError),

    /// Value could not be encoded for hashing
    #[error("cannot encode value for hashing: {0}")]
    Encode(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compute_is_deterministic() {
        assert_eq!(ContentHash::compute(b"image"), ContentHash::compute(b"image"));
        assert_ne!(ContentHash::compute(b"image"), ContentHash::compute(b"imagE"));
    }

    #[test]
    fn display_and_parse_agree() {
        let hash = ContentHash::compute(b"payload");
        let parsed: ContentHash = hash.to_string().parse().unwrap();
        assert_eq!(hash, parsed);
        assert!(hash.to_string().starts_with(&hash.short()));
    }

    #[test]
    fn parse_rejects_short_digest() {
        let result = "abcd".parse::<ContentHash>();
        assert!(matches!(result, Err(HashError::WrongSize(2))));
    }

    #[test]
    fn serializable_hash_tracks_content() {
        let a = ContentHash::compute_serializable(&serde_json::json!({"x": [1, 2]})).unwrap();
        let b = ContentHash::compute_serializable(&serde_json::json!({"x": [1, 2]})).unwrap();
        let c = ContentHash::compute_serializable(&serde_json::json!({"x": [2, 1]})).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn serde_uses_hex_string() {
        let hash = ContentHash::compute(b"{}");
        let value = serde_json::to_value(hash).unwrap();
        assert_eq!(value.as_str().map(str::len), Some(64));
        assert_eq!(serde_json::from_value::<ContentHash>(value).unwrap(), hash);
        assert!(serde_json::from_value::<ContentHash>(serde_json::json!("zz")).is_err());
    }
}
