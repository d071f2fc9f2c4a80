//! Type-safe business identifier.
//!
//! [`BusinessId`] is a newtype wrapper around [`uuid::Uuid`] (v4) so that
//! business identifiers cannot be confused with other UUIDs flowing through
//! the gateway.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Unique identifier for a registered business.
///
/// Wraps a UUID v4. Generated once at registration time and immutable
/// thereafter. Used as the record key in [`super::BoostRegistry`] and as
/// the event discriminator on the bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BusinessId(uuid::Uuid);

impl BusinessId {
    /// Creates a new random `BusinessId` (UUID v4).
    #[must_use]
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }

    /// Creates a `BusinessId` from an existing [`uuid::Uuid`].
    #[must_use]
    pub const fn from_uuid(uuid: uuid::Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the inner [`uuid::Uuid`].
    #[must_use]
    pub const fn as_uuid(&self) -> &uuid::Uuid {
        &self.0
    }
}

impl Default for BusinessId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for BusinessId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<uuid::Uuid> for BusinessId {
    fn from(uuid: uuid::Uuid) -> Self {
        Self(uuid)
    }
}

impl From<BusinessId> for uuid::Uuid {
    fn from(id: BusinessId) -> Self {
        id.0
    }
}
