//! Purchases and the models they contain.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::{
    error::DomainError,
    ordering::{IndexSortable, is_strictly_ordered},
    value_objects::{Condition, Era, ModelClassification, ModelDispatch},
};

use super::common::{DecoderId, ModelId, PurchaseId};

/// A single purchase: one catalog item bought on one occasion.
///
/// A purchase may contain several models (train packs, twin sets); these are
/// kept in the collector's chosen order using sparse sort keys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Purchase {
    pub id: PurchaseId,
    pub manufacturer: String,
    pub catalog_number: String,
    /// Saved grouping override. Not consulted when matching similar purchases.
    #[serde(default)]
    pub catalog_number_prefix: Option<String>,
    #[serde(default)]
    pub catalog_description: String,
    #[serde(default)]
    pub catalog_year: Option<i32>,
    #[serde(default)]
    pub limited_edition: String,
    #[serde(default)]
    pub limited_edition_number: Option<u32>,
    #[serde(default)]
    pub limited_edition_count: Option<u32>,
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub store: String,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub condition: Option<Condition>,
    #[serde(default)]
    pub valuation: Option<f64>,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub models: Vec<Model>,
}

impl Purchase {
    /// Create a purchase with only the catalog identity filled in.
    pub fn new(manufacturer: impl Into<String>, catalog_number: impl Into<String>) -> Self {
        Self {
            id: PurchaseId::new(),
            manufacturer: manufacturer.into(),
            catalog_number: catalog_number.into(),
            catalog_number_prefix: None,
            catalog_description: String::new(),
            catalog_year: None,
            limited_edition: String::new(),
            limited_edition_number: None,
            limited_edition_count: None,
            date: None,
            store: String::new(),
            price: None,
            condition: None,
            valuation: None,
            notes: String::new(),
            models: Vec::new(),
        }
    }

    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.catalog_description = description.into();
        self
    }

    /// Look up a model by id.
    pub fn model(&self, id: ModelId) -> Option<&Model> {
        self.models.iter().find(|m| m.id == id)
    }

    /// Position of a model in display order.
    pub fn position_of_model(&self, id: ModelId) -> Option<usize> {
        self.models.iter().position(|m| m.id == id)
    }

    /// Manufacturer and catalog number, as shown in lists.
    pub fn title(&self) -> String {
        match (self.manufacturer.is_empty(), self.catalog_number.is_empty()) {
            (false, false) => format!("{} {}", self.manufacturer, self.catalog_number),
            (false, true) => self.manufacturer.clone(),
            (true, false) => self.catalog_number.clone(),
            (true, true) => "(untitled purchase)".into(),
        }
    }

    /// Check model ids are unique and models are in key order.
    pub fn validate(&self) -> Result<(), DomainError> {
        let mut seen = BTreeSet::new();
        for model in &self.models {
            if !seen.insert(model.id) {
                return Err(DomainError::DuplicateId {
                    context: format!("purchase {}", self.id),
                    id: model.id.to_string(),
                });
            }
            model.validate()?;
        }

        if !is_strictly_ordered(&self.models) {
            return Err(DomainError::UnorderedIndices {
                context: format!("models of purchase {}", self.id),
            });
        }

        Ok(())
    }
}

/// A single scale model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Model {
    pub id: ModelId,
    /// Sparse sort key within the owning purchase.
    #[serde(default)]
    pub index: i64,
    #[serde(default)]
    pub model_class: String,
    #[serde(default)]
    pub number: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub livery: String,
    #[serde(default)]
    pub details: String,
    #[serde(default)]
    pub era: Option<Era>,
    #[serde(default)]
    pub classification: Option<ModelClassification>,
    #[serde(default)]
    pub dispatch: Option<ModelDispatch>,
    #[serde(default)]
    pub lighting: String,
    #[serde(default)]
    pub motor: String,
    #[serde(default)]
    pub socket: String,
    #[serde(default)]
    pub speaker: String,
    #[serde(default)]
    pub decoder: Option<DecoderId>,
    #[serde(default)]
    pub couplings: BTreeSet<String>,
    #[serde(default)]
    pub features: BTreeSet<String>,
    #[serde(default)]
    pub detail_parts: BTreeSet<String>,
    #[serde(default)]
    pub fitted_detail_parts: BTreeSet<String>,
    #[serde(default)]
    pub modifications: BTreeSet<String>,
    #[serde(default)]
    pub tasks: BTreeSet<String>,
    #[serde(default)]
    pub last_run: Option<NaiveDate>,
    #[serde(default)]
    pub last_oil: Option<NaiveDate>,
    #[serde(default)]
    pub notes: String,
}

impl Model {
    pub fn new(model_class: impl Into<String>, number: impl Into<String>) -> Self {
        Self {
            id: ModelId::new(),
            index: 0,
            model_class: model_class.into(),
            number: number.into(),
            name: String::new(),
            livery: String::new(),
            details: String::new(),
            era: None,
            classification: None,
            dispatch: None,
            lighting: String::new(),
            motor: String::new(),
            socket: String::new(),
            speaker: String::new(),
            decoder: None,
            couplings: BTreeSet::new(),
            features: BTreeSet::new(),
            detail_parts: BTreeSet::new(),
            fitted_detail_parts: BTreeSet::new(),
            modifications: BTreeSet::new(),
            tasks: BTreeSet::new(),
            last_run: None,
            last_oil: None,
            notes: String::new(),
        }
    }

    pub fn with_classification(mut self, classification: ModelClassification) -> Self {
        self.classification = Some(classification);
        self
    }

    pub fn with_dispatch(mut self, dispatch: ModelDispatch) -> Self {
        self.dispatch = Some(dispatch);
        self
    }

    /// Class, number and name, skipping empty parts.
    pub fn title(&self) -> String {
        [&self.model_class, &self.number, &self.name]
            .into_iter()
            .filter(|part| !part.is_empty())
            .cloned()
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Detail parts supplied but not yet fitted.
    pub fn unfitted_detail_parts(&self) -> impl Iterator<Item = &String> {
        self.detail_parts.difference(&self.fitted_detail_parts)
    }

    /// Whether the model is due a service: never oiled, or not oiled for
    /// `interval_days` as of `today`.
    pub fn needs_oiling(&self, today: NaiveDate, interval_days: i64) -> bool {
        let Some(classification) = self.classification else {
            return false;
        };
        if !classification.is_traction() {
            return false;
        }
        match self.last_oil {
            Some(date) => (today - date).num_days() >= interval_days,
            None => true,
        }
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if self.decoder.is_some() && self.dispatch.is_some_and(|d| !d.has_decoder()) {
            return Err(DomainError::Inconsistent {
                context: format!("model {}", self.title()),
                reason: "a decoder is fitted but dispatch is not DCC".into(),
            });
        }
        Ok(())
    }
}

impl IndexSortable for Model {
    fn sort_index(&self) -> i64 {
        self.index
    }

    fn set_sort_index(&mut self, index: i64) {
        self.index = index;
    }
}
