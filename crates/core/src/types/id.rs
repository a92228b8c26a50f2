//! Product identity.
//!
//! A product either comes from the built-in seed catalog (a small integer,
//! never written to the store) or has been persisted and carries the UUID the
//! store assigned on creation. The two never collide: promotion from a seed
//! product to a stored one always yields a fresh identity.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque product identifier.
///
/// Serialized untagged: seed ids as JSON numbers, stored ids as UUID strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProductId {
    /// Local-only product from the seed catalog.
    Seed(u32),
    /// Product persisted in the catalog store.
    Stored(Uuid),
}

impl ProductId {
    /// Whether the catalog store knows about this product.
    #[must_use]
    pub const fn is_persisted(&self) -> bool {
        matches!(self, Self::Stored(_))
    }

    /// The store-assigned UUID, if persisted.
    #[must_use]
    pub const fn as_uuid(&self) -> Option<Uuid> {
        match self {
            Self::Stored(id) => Some(*id),
            Self::Seed(_) => None,
        }
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Seed(id) => write!(f, "{id}"),
            Self::Stored(id) => write!(f, "{id}"),
        }
    }
}

impl From<Uuid> for ProductId {
    fn from(id: Uuid) -> Self {
        Self::Stored(id)
    }
}

/// Error parsing a [`ProductId`] from a path segment.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid product id: {0}")]
pub struct ProductIdParseError(String);

impl FromStr for ProductId {
    type Err = ProductIdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Ok(seed) = s.parse::<u32>() {
            return Ok(Self::Seed(seed));
        }
        Uuid::parse_str(s)
            .map(Self::Stored)
            .map_err(|_| ProductIdParseError(s.to_owned()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_seed_and_stored() {
        assert_eq!("3".parse::<ProductId>().unwrap(), ProductId::Seed(3));

        let uuid = Uuid::new_v4();
        let parsed: ProductId = uuid.to_string().parse().unwrap();
        assert_eq!(parsed, ProductId::Stored(uuid));
        assert!(parsed.is_persisted());
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!("not-an-id".parse::<ProductId>().is_err());
        assert!("-1".parse::<ProductId>().is_err());
    }

    #[test]
    fn test_serde_untagged() {
        let seed = serde_json::to_string(&ProductId::Seed(7)).unwrap();
        assert_eq!(seed, "7");

        let uuid = Uuid::new_v4();
        let json = format!("\"{uuid}\"");
        let stored: ProductId = serde_json::from_str(&json).unwrap();
        assert_eq!(stored.as_uuid(), Some(uuid));
    }
}
