//! Content fingerprints
//!
//! Provides [`Fingerprint`], the lowercase hex SHA-256 digest of a fetched
//! page body. Stored fingerprints are kept as the exact text found in the
//! store so that comparison is a plain string equality.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt::{self, Display, Formatter};

/// Hex length of a SHA-256 digest
pub const FINGERPRINT_HEX_LEN: usize = 64;

/// Hex-encoded digest of a resource's full content
///
/// Either computed from content with [`Fingerprint::compute`] or carried over
/// verbatim from the store with [`Fingerprint::from_stored`]. No
/// normalization is applied in either direction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Compute the SHA-256 fingerprint of raw content
    #[inline]
    #[must_use]
    pub fn compute(content: &[u8]) -> Self {
        Self(hex::encode(Sha256::digest(content)))
    }

    /// Wrap a fingerprint read back from the store, unchanged
    #[inline]
    #[must_use]
    pub fn from_stored(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Encoded digest text
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Short form for log lines (first 12 hex chars)
    #[inline]
    #[must_use]
    pub fn short(&self) -> &str {
        self.0.get(..12).unwrap_or(&self.0)
    }

    /// Whether the text has the shape of a digest this crate produces
    ///
    /// Informational only; comparison never depends on it.
    #[must_use]
    pub fn is_well_formed(&self) -> bool {
        self.0.len() == FINGERPRINT_HEX_LEN
            && self
                .0
                .bytes()
                .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
    }
}

impl Display for Fingerprint {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Fingerprint {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn compute_matches_known_sha256() {
        let fp = Fingerprint::compute(b"hello");
        assert_eq!(
            fp.as_str(),
            "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"
        );
    }

    #[test]
    fn compute_is_lowercase_hex() {
        let fp = Fingerprint::compute(b"hello world");
        assert_eq!(
            fp.as_str(),
            "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9"
        );
        assert!(fp.is_well_formed());
    }

    #[test]
    fn stored_value_is_not_normalized() {
        let computed = Fingerprint::compute(b"hello");
        let upper = Fingerprint::from_stored(computed.as_str().to_uppercase());
        assert_ne!(computed, upper);
        assert!(!upper.is_well_formed());

        let padded = Fingerprint::from_stored(format!(" {computed}"));
        assert_ne!(computed, padded);
    }

    #[test]
    fn stored_round_trip_equals_computed() {
        let computed = Fingerprint::compute(b"page body");
        let stored = Fingerprint::from_stored(computed.to_string());
        assert_eq!(computed, stored);
    }

    #[test]
    fn short_is_prefix() {
        let fp = Fingerprint::compute(b"test");
        assert_eq!(fp.short().len(), 12);
        assert!(fp.as_str().starts_with(fp.short()));

        let tiny = Fingerprint::from_stored("abc");
        assert_eq!(tiny.short(), "abc");
    }

    #[test]
    fn serde_is_plain_string() {
        let fp = Fingerprint::compute(b"test");
        let json = serde_json::to_string(&fp).unwrap();
        assert_eq!(json, format!("\"{fp}\""));
        let decoded: Fingerprint = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, fp);
    }

    proptest! {
        #[test]
        fn equal_content_equal_fingerprint(content in proptest::collection::vec(any::<u8>(), 0..512)) {
            prop_assert_eq!(Fingerprint::compute(&content), Fingerprint::compute(&content));
            prop_assert!(Fingerprint::compute(&content).is_well_formed());
        }

        #[test]
        fn appended_byte_changes_fingerprint(content in proptest::collection::vec(any::<u8>(), 0..256), extra in any::<u8>()) {
            let mut longer = content.clone();
            longer.push(extra);
            prop_assert_ne!(Fingerprint::compute(&content), Fingerprint::compute(&longer));
        }
    }
}
