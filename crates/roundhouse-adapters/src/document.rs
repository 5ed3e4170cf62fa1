//! The persisted shape of a whole collection.

use serde::{Deserialize, Serialize};

use roundhouse_core::domain::{Decoder, DecoderType, Purchase, Train};

/// Current on-disk format version.
pub const DOCUMENT_VERSION: u32 = 1;

/// Everything in one collection, as written to disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionDocument {
    pub version: u32,
    #[serde(default)]
    pub purchases: Vec<Purchase>,
    #[serde(default)]
    pub trains: Vec<Train>,
    #[serde(default)]
    pub decoder_types: Vec<DecoderType>,
    #[serde(default)]
    pub decoders: Vec<Decoder>,
}

impl CollectionDocument {
    pub fn is_empty(&self) -> bool {
        self.purchases.is_empty()
            && self.trains.is_empty()
            && self.decoder_types.is_empty()
            && self.decoders.is_empty()
    }
}

impl Default for CollectionDocument {
    fn default() -> Self {
        Self {
            version: DOCUMENT_VERSION,
            purchases: Vec::new(),
            trains: Vec::new(),
            decoder_types: Vec::new(),
            decoders: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_sections_default_to_empty() {
        let doc: CollectionDocument = serde_json::from_str(r#"{ "version": 1 }"#).unwrap();
        assert!(doc.is_empty());
    }

    #[test]
    fn sparse_purchase_fills_defaults() {
        let json = r#"{
            "version": 1,
            "purchases": [{
                "id": "7d1c2e4a-51f3-4c59-9a43-4d6c1e0f8a11",
                "manufacturer": "Bachmann",
                "catalog_number": "32-381A",
                "models": [{
                    "id": "0b7f5f0e-3d2b-4a55-8f0c-52a2c9d7e901",
                    "index": 64,
                    "model_class": "Class 66",
                    "dispatch": "dcc-sound"
                }]
            }]
        }"#;

        let doc: CollectionDocument = serde_json::from_str(json).unwrap();
        let purchase = &doc.purchases[0];
        assert_eq!(purchase.date, None);
        assert_eq!(purchase.models[0].index, 64);
        assert!(purchase.models[0].couplings.is_empty());
    }
}
