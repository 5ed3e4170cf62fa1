//! Integration tests for roundhouse-core.
//!
//! Services run against a small shared in-test store so that several
//! services see the same collection, as they do behind the CLI.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use roundhouse_core::{
    application::ApplicationError,
    domain::{
        IndexSortable, MatchKind, SparseIndex, is_strictly_ordered, sort_by_index,
    },
    error::RoundhouseResult,
    prelude::*,
};

#[derive(Default)]
struct Collection {
    purchases: BTreeMap<PurchaseId, Purchase>,
    trains: BTreeMap<TrainId, Train>,
    decoders: BTreeMap<DecoderId, Decoder>,
    decoder_types: BTreeMap<DecoderTypeId, DecoderType>,
}

#[derive(Clone, Default)]
struct SharedStore(Arc<Mutex<Collection>>);

impl SharedStore {
    fn with<R>(&self, f: impl FnOnce(&mut Collection) -> R) -> R {
        f(&mut self.0.lock().unwrap())
    }
}

impl PurchaseRepository for SharedStore {
    fn get(&self, id: PurchaseId) -> RoundhouseResult<Purchase> {
        self.with(|c| c.purchases.get(&id).cloned())
            .ok_or_else(|| ApplicationError::not_found("purchase", id).into())
    }

    fn list(&self) -> RoundhouseResult<Vec<Purchase>> {
        Ok(self.with(|c| c.purchases.values().cloned().collect()))
    }

    fn save(&self, purchase: Purchase) -> RoundhouseResult<()> {
        self.with(|c| c.purchases.insert(purchase.id, purchase));
        Ok(())
    }

    fn remove(&self, id: PurchaseId) -> RoundhouseResult<()> {
        self.with(|c| c.purchases.remove(&id))
            .map(|_| ())
            .ok_or_else(|| ApplicationError::not_found("purchase", id).into())
    }

    fn find_by_catalog_prefix(
        &self,
        manufacturer: &str,
        prefix: &str,
    ) -> RoundhouseResult<Vec<Purchase>> {
        Ok(self.with(|c| {
            c.purchases
                .values()
                .filter(|p| p.manufacturer == manufacturer && p.catalog_number.starts_with(prefix))
                .cloned()
                .collect()
        }))
    }
}

impl TrainRepository for SharedStore {
    fn get(&self, id: TrainId) -> RoundhouseResult<Train> {
        self.with(|c| c.trains.get(&id).cloned())
            .ok_or_else(|| ApplicationError::not_found("train", id).into())
    }

    fn list(&self) -> RoundhouseResult<Vec<Train>> {
        Ok(self.with(|c| c.trains.values().cloned().collect()))
    }

    fn save(&self, train: Train) -> RoundhouseResult<()> {
        self.with(|c| c.trains.insert(train.id, train));
        Ok(())
    }

    fn remove(&self, id: TrainId) -> RoundhouseResult<()> {
        self.with(|c| c.trains.remove(&id))
            .map(|_| ())
            .ok_or_else(|| ApplicationError::not_found("train", id).into())
    }
}

impl DecoderRepository for SharedStore {
    fn get(&self, id: DecoderId) -> RoundhouseResult<Decoder> {
        self.with(|c| c.decoders.get(&id).cloned())
            .ok_or_else(|| ApplicationError::not_found("decoder", id).into())
    }

    fn list(&self) -> RoundhouseResult<Vec<Decoder>> {
        Ok(self.with(|c| c.decoders.values().cloned().collect()))
    }

    fn save(&self, decoder: Decoder) -> RoundhouseResult<()> {
        self.with(|c| c.decoders.insert(decoder.id, decoder));
        Ok(())
    }

    fn remove(&self, id: DecoderId) -> RoundhouseResult<()> {
        self.with(|c| c.decoders.remove(&id))
            .map(|_| ())
            .ok_or_else(|| ApplicationError::not_found("decoder", id).into())
    }

    fn get_type(&self, id: DecoderTypeId) -> RoundhouseResult<DecoderType> {
        self.with(|c| c.decoder_types.get(&id).cloned())
            .ok_or_else(|| ApplicationError::not_found("decoder type", id).into())
    }

    fn list_types(&self) -> RoundhouseResult<Vec<DecoderType>> {
        Ok(self.with(|c| c.decoder_types.values().cloned().collect()))
    }

    fn save_type(&self, decoder_type: DecoderType) -> RoundhouseResult<()> {
        self.with(|c| c.decoder_types.insert(decoder_type.id, decoder_type));
        Ok(())
    }

    fn remove_type(&self, id: DecoderTypeId) -> RoundhouseResult<()> {
        self.with(|c| c.decoder_types.remove(&id))
            .map(|_| ())
            .ok_or_else(|| ApplicationError::not_found("decoder type", id).into())
    }
}

fn keys<T: IndexSortable>(items: &[T]) -> Vec<i64> {
    items.iter().map(IndexSortable::sort_index).collect()
}

// ============================================================================
// Similar purchases
// ============================================================================

#[test]
fn exact_matches_replace_prefix_matches() {
    let store = SharedStore::default();
    let service = PurchaseService::new(Box::new(store.clone()));

    let first = service.add(Purchase::new("Bachmann", "32-381")).unwrap();
    let second = service.add(Purchase::new("Bachmann", "32-381")).unwrap();
    service.add(Purchase::new("Bachmann", "32-381A")).unwrap();
    service.add(Purchase::new("Graham Farish", "32-381")).unwrap();

    let candidate = Purchase::new("Bachmann", "32-381");
    let similar = service.similar_purchases(&candidate).unwrap();

    assert_eq!(similar.kind(), Some(MatchKind::Exact));
    let mut ids: Vec<_> = similar.purchases().iter().map(|p| p.id).collect();
    ids.sort();
    let mut expected = vec![first.id, second.id];
    expected.sort();
    assert_eq!(ids, expected);
}

#[test]
fn prefix_matches_when_no_exact_match() {
    let store = SharedStore::default();
    let service = PurchaseService::new(Box::new(store.clone()));

    service.add(Purchase::new("Bachmann", "32-381A")).unwrap();
    service.add(Purchase::new("Bachmann", "32-381SF")).unwrap();
    service.add(Purchase::new("Bachmann", "31-650")).unwrap();

    let similar = service
        .similar_purchases(&Purchase::new("Bachmann", "32-381"))
        .unwrap();

    assert_eq!(similar.kind(), Some(MatchKind::Prefix));
    let numbers: Vec<_> = similar
        .purchases()
        .iter()
        .map(|p| p.catalog_number.as_str())
        .collect();
    assert_eq!(numbers, vec!["32-381A", "32-381SF"]);
}

#[test]
fn different_manufacturer_never_matches() {
    let store = SharedStore::default();
    let service = PurchaseService::new(Box::new(store));

    service.add(Purchase::new("Dapol", "32-381")).unwrap();

    let similar = service
        .similar_purchases(&Purchase::new("Bachmann", "32-381"))
        .unwrap();
    assert!(similar.is_empty());
    assert_eq!(similar.kind(), None);
}

#[test]
fn stored_purchase_is_not_similar_to_itself() {
    let store = SharedStore::default();
    let service = PurchaseService::new(Box::new(store));

    let only = service.add(Purchase::new("Hornby", "35-100")).unwrap();
    assert!(service.similar_to(only.id).unwrap().is_empty());
}

// ============================================================================
// Sparse ordering
// ============================================================================

#[test]
fn allocator_examples() {
    let ordering = SparseIndex::default();

    let mut empty: Vec<Model> = Vec::new();
    assert_eq!(ordering.index_for_appending(&mut empty), 64);

    let mut models = vec![Model::new("A", "1"), Model::new("B", "2")];
    models[0].index = 33;
    models[1].index = 92;
    assert_eq!(ordering.index_for_appending(&mut models), 156);

    models[0].index = 64;
    models[1].index = 128;
    assert_eq!(ordering.index_for_inserting(&mut models, 1), 96);

    models[1].index = 65;
    assert_eq!(ordering.index_for_inserting(&mut models, 1), 128);
    assert_eq!(keys(&models), vec![64, 192]);
}

#[test]
fn repeated_inserts_keep_intended_order() {
    let store = SharedStore::default();
    let service = PurchaseService::new(Box::new(store.clone()));
    let purchase = service.add(Purchase::new("Hornby", "R1234")).unwrap();

    // Always insert at the front: the gap halves until it runs out.
    let mut intended = Vec::new();
    for n in 0..12 {
        let model = service
            .insert_model(purchase.id, Model::new("Wagon", format!("W{n}")), 0)
            .unwrap();
        intended.insert(0, model.id);
    }

    let mut stored = service.get(purchase.id).unwrap();
    assert!(is_strictly_ordered(&stored.models));

    sort_by_index(&mut stored.models);
    let actual: Vec<_> = stored.models.iter().map(|m| m.id).collect();
    assert_eq!(actual, intended);
}

#[test]
fn moves_and_inserts_across_trains() {
    let store = SharedStore::default();
    let service = TrainService::new(Box::new(store)).with_ordering(SparseIndex::new(4));
    let train = service.create("Pines Express", Some("1O95")).unwrap();

    let engine = service
        .append_member(train.id, TrainMember::new("Class 9F", "92220"))
        .unwrap();
    let coach = service
        .append_member(train.id, TrainMember::new("Mk1 BSK", "M35040"))
        .unwrap();
    let brake = service
        .append_member(train.id, TrainMember::new("Mk1 BG", "M80617"))
        .unwrap();
    assert_eq!((engine.index, coach.index, brake.index), (4, 8, 12));

    service.move_member(train.id, brake.id, 1).unwrap();
    service
        .insert_member(train.id, TrainMember::new("Mk1 SK", "M25084"), 1)
        .unwrap();
    service
        .insert_member(train.id, TrainMember::new("Mk1 CK", "M16012"), 1)
        .unwrap();

    let stored = service.get(train.id).unwrap();
    assert!(is_strictly_ordered(&stored.members));
    let order: Vec<_> = stored
        .members
        .iter()
        .map(|m| m.number_or_name.as_str())
        .collect();
    assert_eq!(order, vec!["92220", "M16012", "M25084", "M80617", "M35040"]);
}

// ============================================================================
// Decoders
// ============================================================================

#[test]
fn fitting_and_removing_models_moves_stock() {
    let store = SharedStore::default();
    let purchases = PurchaseService::new(Box::new(store.clone()));
    let decoders = DecoderService::new(Box::new(store.clone()), Box::new(store.clone()));

    let mut loksound = DecoderType::new("ESU", "58412");
    loksound.minimum_stock = 1;
    let loksound = decoders.add_type(loksound).unwrap();
    let decoder = decoders.add_decoder(Decoder::new(loksound.id)).unwrap();

    let purchase = purchases.add(Purchase::new("Accurascale", "ACC2328")).unwrap();
    let model = purchases
        .append_model(purchase.id, Model::new("Class 55", "55 009"))
        .unwrap();

    assert_eq!(decoders.stock_report().unwrap()[0].spare, 1);

    decoders
        .fit_decoder(purchase.id, model.id, decoder.id)
        .unwrap();
    let report = decoders.stock_report().unwrap();
    assert_eq!(report[0].spare, 0);
    assert!(report[0].is_low());

    purchases.remove_model(purchase.id, model.id).unwrap();
    assert_eq!(decoders.stock_report().unwrap()[0].spare, 1);
}
