//! Change notifications emitted by stores.

use std::fmt;

use serde::Serialize;

use crate::domain::{DecoderId, DecoderTypeId, PurchaseId, TrainId};

/// What happened to a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Inserted,
    Updated,
    Removed,
}

/// Which record changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "entity", content = "id", rename_all = "kebab-case")]
pub enum EntityRef {
    Purchase(PurchaseId),
    Train(TrainId),
    Decoder(DecoderId),
    DecoderType(DecoderTypeId),
}

/// A single committed change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ChangeEvent {
    pub kind: ChangeKind,
    pub entity: EntityRef,
}

impl ChangeEvent {
    pub const fn new(kind: ChangeKind, entity: EntityRef) -> Self {
        Self { kind, entity }
    }

    /// `Inserted` or `Updated`, depending on whether the record existed.
    pub const fn saved(existed: bool, entity: EntityRef) -> Self {
        let kind = if existed {
            ChangeKind::Updated
        } else {
            ChangeKind::Inserted
        };
        Self { kind, entity }
    }

    pub const fn removed(entity: EntityRef) -> Self {
        Self {
            kind: ChangeKind::Removed,
            entity,
        }
    }
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Inserted => "inserted",
            Self::Updated => "updated",
            Self::Removed => "removed",
        })
    }
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Purchase(id) => write!(f, "purchase {id}"),
            Self::Train(id) => write!(f, "train {id}"),
            Self::Decoder(id) => write!(f, "decoder {id}"),
            Self::DecoderType(id) => write!(f, "decoder type {id}"),
        }
    }
}

impl fmt::Display for ChangeEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.entity, self.kind)
    }
}
