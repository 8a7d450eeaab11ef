//! One-way credential hashing applied before a user is persisted

use std::fmt;

use sha2::{Digest, Sha256};

/// SHA-256 digest of a credential, rendered as lowercase hex
#[derive(Clone, PartialEq, Eq)]
pub struct CredentialDigest(String);

impl CredentialDigest {
    /// Wrap a digest read back from storage
    pub fn from_stored(digest: String) -> Self {
        Self(digest)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for CredentialDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CredentialDigest(..)")
    }
}

/// Hash a plaintext credential
///
/// Deterministic and infallible; the empty string hashes like any other
/// input. Rejecting empty credentials is the caller's job.
pub fn hash(plaintext: &str) -> CredentialDigest {
    let mut hasher = Sha256::new();
    hasher.update(plaintext.as_bytes());
    CredentialDigest(hex::encode(hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_is_deterministic() {
        assert_eq!(hash("thisapass"), hash("thisapass"));
        assert_ne!(hash("thisapass"), hash("thisapass2"));
    }

    #[test]
    fn test_hash_matches_sha256() {
        assert_eq!(
            hash("abc").as_str(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_hash_never_returns_plaintext() {
        for input in ["p", "password", "hunter2", "ünïcødé"] {
            let digest = hash(input);
            assert_ne!(digest.as_str(), input);
            assert_eq!(digest.as_str().len(), 64);
        }
    }

    #[test]
    fn test_hash_accepts_empty_input() {
        assert_eq!(
            hash("").as_str(),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_debug_does_not_print_digest() {
        let digest = hash("p");
        assert_eq!(format!("{digest:?}"), "CredentialDigest(..)");
    }
}
