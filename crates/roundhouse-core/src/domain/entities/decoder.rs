//! DCC decoders and the product types they belong to.

use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::error::DomainError;

use super::common::{DecoderId, DecoderTypeId};

/// Highest address a DCC long address can take.
pub const MAX_DCC_ADDRESS: u16 = 10239;

/// A decoder product, e.g. "ESU LokSound 5 Micro, Next18".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecoderType {
    pub id: DecoderTypeId,
    pub manufacturer: String,
    pub product_code: String,
    #[serde(default)]
    pub product_family: String,
    #[serde(default)]
    pub product_description: String,
    #[serde(default)]
    pub socket: String,
    #[serde(default)]
    pub is_programmable: bool,
    #[serde(default)]
    pub has_sound: bool,
    #[serde(default)]
    pub has_railcom: bool,
    /// Spare decoders of this type the collector wants on hand.
    #[serde(default)]
    pub minimum_stock: u32,
}

impl DecoderType {
    pub fn new(manufacturer: impl Into<String>, product_code: impl Into<String>) -> Self {
        Self {
            id: DecoderTypeId::new(),
            manufacturer: manufacturer.into(),
            product_code: product_code.into(),
            product_family: String::new(),
            product_description: String::new(),
            socket: String::new(),
            is_programmable: true,
            has_sound: false,
            has_railcom: false,
            minimum_stock: 0,
        }
    }

    pub fn title(&self) -> String {
        let mut title = format!("{} {}", self.manufacturer, self.product_code);
        if !self.product_family.is_empty() {
            title.push_str(&format!(" ({})", self.product_family));
        }
        title
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if self.manufacturer.trim().is_empty() {
            return Err(DomainError::MissingRequiredField {
                field: "manufacturer",
            });
        }
        if self.product_code.trim().is_empty() {
            return Err(DomainError::MissingRequiredField {
                field: "product_code",
            });
        }
        Ok(())
    }
}

/// One physical decoder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decoder {
    pub id: DecoderId,
    pub decoder_type: DecoderTypeId,
    #[serde(default)]
    pub serial_number: String,
    #[serde(default)]
    pub firmware_version: String,
    #[serde(default)]
    pub firmware_date: Option<NaiveDate>,
    #[serde(default)]
    pub address: Option<u16>,
    #[serde(default)]
    pub sound_author: String,
    #[serde(default)]
    pub sound_project: String,
    #[serde(default)]
    pub notes: String,
}

impl Decoder {
    pub fn new(decoder_type: DecoderTypeId) -> Self {
        Self {
            id: DecoderId::new(),
            decoder_type,
            serial_number: String::new(),
            firmware_version: String::new(),
            firmware_date: None,
            address: None,
            sound_author: String::new(),
            sound_project: String::new(),
            notes: String::new(),
        }
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        match self.address {
            Some(address) if address == 0 || address > MAX_DCC_ADDRESS => {
                Err(DomainError::InvalidAddress { address })
            }
            _ => Ok(()),
        }
    }
}

/// Spare stock of one decoder type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StockLevel {
    pub decoder_type: DecoderType,
    /// Decoders of this type not fitted to any model.
    pub spare: u32,
}

impl StockLevel {
    /// Spare stock has fallen below the wanted minimum.
    pub fn is_low(&self) -> bool {
        self.spare < self.decoder_type.minimum_stock
    }
}

/// Count spare decoders per type.
///
/// A decoder is spare when its id is not in `fitted`. Every type appears in
/// the result, including types with no decoders at all. Results keep the
/// order of `types`.
pub fn stock_levels(
    types: &[DecoderType],
    decoders: &[Decoder],
    fitted: &HashSet<DecoderId>,
) -> Vec<StockLevel> {
    let mut spare: HashMap<DecoderTypeId, u32> = HashMap::new();
    for decoder in decoders.iter().filter(|d| !fitted.contains(&d.id)) {
        *spare.entry(decoder.decoder_type).or_default() += 1;
    }

    types
        .iter()
        .map(|decoder_type| StockLevel {
            spare: spare.get(&decoder_type.id).copied().unwrap_or(0),
            decoder_type: decoder_type.clone(),
        })
        .collect()
}
