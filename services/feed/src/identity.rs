//! Resource identifiers and the assigner that hands them out
//!
//! Identifiers are UUIDv7 values rendered as 32 lowercase hex characters.
//! The leading 48 bits are a millisecond timestamp, so byte order follows
//! creation order; [`IdAssigner`] bumps the value when two calls land in the
//! same millisecond so the order stays strict within one process.

use std::{
    fmt,
    str::FromStr,
    sync::{Mutex, PoisonError},
};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Width of the textual form of a [`ResourceId`]
pub const ID_HEX_LEN: usize = 32;

/// Error returned when an identifier token cannot be parsed
#[derive(Error, Debug, Clone, PartialEq)]
pub enum IdError {
    #[error("identifier must be 32 hex characters, got {0}")]
    Length(usize),

    #[error("identifier is not valid hex: {0}")]
    Encoding(#[from] hex::FromHexError),
}

/// Opaque, server-assigned identifier of a user or a post
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, sqlx::Type,
)]
#[serde(try_from = "String", into = "String")]
#[sqlx(transparent)]
pub struct ResourceId(Uuid);

impl FromStr for ResourceId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != ID_HEX_LEN {
            return Err(IdError::Length(s.len()));
        }

        let mut bytes = [0u8; 16];
        hex::decode_to_slice(s, &mut bytes)?;
        Ok(Self(Uuid::from_bytes(bytes)))
    }
}

impl TryFrom<String> for ResourceId {
    type Error = IdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ResourceId> for String {
    fn from(id: ResourceId) -> Self {
        id.to_string()
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.simple())
    }
}

/// Hands out strictly increasing identifiers
///
/// One assigner is owned by each store and shared by its collections.
#[derive(Debug)]
pub struct IdAssigner {
    last: Mutex<Uuid>,
}

impl IdAssigner {
    pub fn new() -> Self {
        Self {
            last: Mutex::new(Uuid::nil()),
        }
    }

    /// Produce the next identifier
    pub fn assign(&self) -> ResourceId {
        let mut last = self.last.lock().unwrap_or_else(PoisonError::into_inner);

        let candidate = Uuid::now_v7();
        let next = if candidate > *last {
            candidate
        } else {
            // Clock stood still or went backwards: stay ahead of the last id.
            Uuid::from_u128(last.as_u128().wrapping_add(1))
        };

        *last = next;
        ResourceId(next)
    }
}

impl Default for IdAssigner {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{collections::HashSet, sync::Arc, thread};

    #[test]
    fn test_parse_accepts_fixed_width_hex() {
        let id: ResourceId = "0190f5e4c3a87b2c9d1e2f3a4b5c6d7e".parse().unwrap();
        assert_eq!(id.to_string(), "0190f5e4c3a87b2c9d1e2f3a4b5c6d7e");

        let upper: ResourceId = "0190F5E4C3A87B2C9D1E2F3A4B5C6D7E".parse().unwrap();
        assert_eq!(upper, id);
    }

    #[test]
    fn test_parse_rejects_malformed_tokens() {
        assert_eq!("".parse::<ResourceId>(), Err(IdError::Length(0)));
        assert_eq!("abc".parse::<ResourceId>(), Err(IdError::Length(3)));
        // Mongo-style 24 char ids are not accepted.
        assert!("616156d49ab2934adcee255e".parse::<ResourceId>().is_err());
        // Hyphenated UUIDs are not the wire format.
        assert!(
            "0190f5e4-c3a8-7b2c-9d1e-2f3a4b5c6d7e"
                .parse::<ResourceId>()
                .is_err()
        );
        assert!(matches!(
            "zz90f5e4c3a87b2c9d1e2f3a4b5c6d7e".parse::<ResourceId>(),
            Err(IdError::Encoding(_))
        ));
    }

    #[test]
    fn test_serde_uses_hex_string() {
        let id: ResourceId = "0190f5e4c3a87b2c9d1e2f3a4b5c6d7e".parse().unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"0190f5e4c3a87b2c9d1e2f3a4b5c6d7e\"");

        let back: ResourceId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);

        assert!(serde_json::from_str::<ResourceId>("\"not-an-id\"").is_err());
    }

    #[test]
    fn test_assigner_is_strictly_increasing() {
        let assigner = IdAssigner::new();
        let mut previous = assigner.assign();

        for _ in 0..10_000 {
            let next = assigner.assign();
            assert!(next > previous, "{next} should sort after {previous}");
            previous = next;
        }
    }

    #[test]
    fn test_assigner_is_unique_across_threads() {
        let assigner = Arc::new(IdAssigner::new());

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let assigner = Arc::clone(&assigner);
                thread::spawn(move || (0..1_000).map(|_| assigner.assign()).collect::<Vec<_>>())
            })
            .collect();

        let mut seen = HashSet::new();
        for handle in handles {
            for id in handle.join().unwrap() {
                assert!(seen.insert(id), "duplicate id {id}");
            }
        }
        assert_eq!(seen.len(), 8_000);
    }
}
