//! Trains: named, ordered consists of members.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::domain::{
    error::DomainError,
    ordering::{IndexSortable, is_strictly_ordered},
};

use super::common::{TrainId, TrainMemberId};

/// A train the collector runs or plans to run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Train {
    pub id: TrainId,
    pub name: String,
    #[serde(default)]
    pub number: String,
    #[serde(default)]
    pub details: String,
    #[serde(default)]
    pub notes: String,
    /// Members in formation order, by sparse sort key.
    #[serde(default)]
    pub members: Vec<TrainMember>,
}

impl Train {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: TrainId::new(),
            name: name.into(),
            number: String::new(),
            details: String::new(),
            notes: String::new(),
            members: Vec::new(),
        }
    }

    pub fn member(&self, id: TrainMemberId) -> Option<&TrainMember> {
        self.members.iter().find(|m| m.id == id)
    }

    pub fn position_of_member(&self, id: TrainMemberId) -> Option<usize> {
        self.members.iter().position(|m| m.id == id)
    }

    /// Headcode and name, as shown in lists.
    pub fn title(&self) -> String {
        if self.number.is_empty() {
            self.name.clone()
        } else {
            format!("{} {}", self.number, self.name)
        }
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if self.name.trim().is_empty() {
            return Err(DomainError::MissingRequiredField { field: "name" });
        }

        let mut seen = BTreeSet::new();
        if let Some(duplicate) = self.members.iter().find(|m| !seen.insert(m.id)) {
            return Err(DomainError::DuplicateId {
                context: format!("train {}", self.id),
                id: duplicate.id.to_string(),
            });
        }

        if !is_strictly_ordered(&self.members) {
            return Err(DomainError::UnorderedIndices {
                context: format!("members of train {}", self.title()),
            });
        }

        Ok(())
    }
}

/// One vehicle position in a train.
///
/// Members describe the vehicle by class and number rather than linking to a
/// model, so a train can be planned before every vehicle is owned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainMember {
    pub id: TrainMemberId,
    #[serde(default)]
    pub index: i64,
    #[serde(default)]
    pub model_class: String,
    #[serde(default)]
    pub number_or_name: String,
    #[serde(default)]
    pub title: String,
    /// Runs reversed relative to the train's direction.
    #[serde(default)]
    pub is_flipped: bool,
}

impl TrainMember {
    pub fn new(model_class: impl Into<String>, number_or_name: impl Into<String>) -> Self {
        Self {
            id: TrainMemberId::new(),
            index: 0,
            model_class: model_class.into(),
            number_or_name: number_or_name.into(),
            title: String::new(),
            is_flipped: false,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn flipped(mut self) -> Self {
        self.is_flipped = true;
        self
    }
}

impl IndexSortable for TrainMember {
    fn sort_index(&self) -> i64 {
        self.index
    }

    fn set_sort_index(&mut self, index: i64) {
        self.index = index;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_prefers_headcode() {
        let mut train = Train::new("The Flying Scotsman");
        assert_eq!(train.title(), "The Flying Scotsman");

        train.number = "1S10".into();
        assert_eq!(train.title(), "1S10 The Flying Scotsman");
    }

    #[test]
    fn validate_requires_a_name() {
        assert_eq!(
            Train::new("  ").validate(),
            Err(DomainError::MissingRequiredField { field: "name" })
        );
    }

    #[test]
    fn validate_rejects_equal_indices() {
        let mut train = Train::new("Pick-up goods");
        let mut first = TrainMember::new("Class 25", "25 057");
        first.index = 64;
        let mut second = TrainMember::new("VEA", "230001");
        second.index = 64;
        train.members = vec![first, second];

        assert!(matches!(
            train.validate(),
            Err(DomainError::UnorderedIndices { .. })
        ));
    }

    #[test]
    fn member_lookup_by_id() {
        let mut train = Train::new("Night Riviera");
        let mut member = TrainMember::new("Class 57", "57 602").flipped();
        member.index = 64;
        let id = member.id;
        train.members.push(member);

        assert_eq!(train.position_of_member(id), Some(0));
        assert!(train.member(id).is_some_and(|m| m.is_flipped));
        assert!(train.member(TrainMemberId::new()).is_none());
    }
}
