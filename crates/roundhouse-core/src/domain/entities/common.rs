//! Identifiers shared by every entity.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::DomainError;

/// Declares a `Uuid`-backed identifier newtype.
///
/// Identifiers are `Copy`, ordered (so stores can keep deterministic
/// iteration order), and serialize as their hyphenated string.
macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident, $kind:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Generate a fresh random identifier.
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            pub const fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            pub const fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.0, f)
            }
        }

        impl FromStr for $name {
            type Err = DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s.trim())
                    .map(Self)
                    .map_err(|_| DomainError::UnknownValue {
                        kind: $kind,
                        value: s.trim().to_string(),
                    })
            }
        }
    };
}

entity_id!(
    /// Identifies a [`super::Purchase`].
    PurchaseId,
    "purchase id"
);
entity_id!(
    /// Identifies a [`super::Model`] within its purchase.
    ModelId,
    "model id"
);
entity_id!(
    /// Identifies a [`super::Train`].
    TrainId,
    "train id"
);
entity_id!(
    /// Identifies a [`super::TrainMember`] within its train.
    TrainMemberId,
    "train member id"
);
entity_id!(
    /// Identifies a [`super::Decoder`].
    DecoderId,
    "decoder id"
);
entity_id!(
    /// Identifies a [`super::DecoderType`].
    DecoderTypeId,
    "decoder type id"
);
