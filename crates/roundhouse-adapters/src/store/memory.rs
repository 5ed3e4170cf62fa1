//! In-memory collection store.

use std::{
    collections::BTreeMap,
    sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard},
};

use tracing::trace;

use roundhouse_core::{
    application::{
        ApplicationError,
        ports::{
            ChangeEvent, ChangeObserver, DecoderRepository, EntityRef, PurchaseRepository,
            TrainRepository,
        },
    },
    domain::{
        Decoder, DecoderId, DecoderType, DecoderTypeId, DomainError, Purchase, PurchaseId, Train,
        TrainId,
    },
    error::RoundhouseResult,
};

use crate::document::{CollectionDocument, DOCUMENT_VERSION};

#[derive(Debug, Default)]
struct Collection {
    purchases: BTreeMap<PurchaseId, Purchase>,
    trains: BTreeMap<TrainId, Train>,
    decoder_types: BTreeMap<DecoderTypeId, DecoderType>,
    decoders: BTreeMap<DecoderId, Decoder>,
}

impl Collection {
    fn from_document(document: CollectionDocument) -> RoundhouseResult<Self> {
        let mut collection = Self::default();

        for purchase in document.purchases {
            insert_unique(&mut collection.purchases, purchase.id, purchase, "purchases")?;
        }
        for train in document.trains {
            insert_unique(&mut collection.trains, train.id, train, "trains")?;
        }
        for decoder_type in document.decoder_types {
            insert_unique(
                &mut collection.decoder_types,
                decoder_type.id,
                decoder_type,
                "decoder types",
            )?;
        }
        for decoder in document.decoders {
            insert_unique(&mut collection.decoders, decoder.id, decoder, "decoders")?;
        }
        Ok(collection)
    }
}

/// Thread-safe in-memory store implementing every repository port.
///
/// Clones share the same collection and observers.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    inner: Arc<RwLock<Collection>>,
    observers: Arc<RwLock<Vec<Arc<dyn ChangeObserver>>>>,
}

impl InMemoryStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding the records of `document`.
    ///
    /// Duplicate ids are rejected rather than silently collapsed.
    pub fn from_document(document: CollectionDocument) -> RoundhouseResult<Self> {
        Ok(Self {
            inner: Arc::new(RwLock::new(Collection::from_document(document)?)),
            observers: Arc::default(),
        })
    }

    /// Replace every record with those of `document`. Observers are not told.
    pub fn restore(&self, document: CollectionDocument) -> RoundhouseResult<()> {
        let collection = Collection::from_document(document)?;
        *self.write()? = collection;
        trace!("Store restored from snapshot");
        Ok(())
    }

    /// Copy the whole collection out, in id order.
    pub fn snapshot(&self) -> RoundhouseResult<CollectionDocument> {
        let inner = self.read()?;
        Ok(CollectionDocument {
            version: DOCUMENT_VERSION,
            purchases: inner.purchases.values().cloned().collect(),
            trains: inner.trains.values().cloned().collect(),
            decoder_types: inner.decoder_types.values().cloned().collect(),
            decoders: inner.decoders.values().cloned().collect(),
        })
    }

    /// Register an observer for every later write.
    pub fn subscribe(&self, observer: Arc<dyn ChangeObserver>) -> RoundhouseResult<()> {
        self.observers
            .write()
            .map_err(|_| ApplicationError::StoreLockError)?
            .push(observer);
        Ok(())
    }

    /// Total number of top-level records.
    pub fn len(&self) -> usize {
        self.read().map_or(0, |inner| {
            inner.purchases.len()
                + inner.trains.len()
                + inner.decoder_types.len()
                + inner.decoders.len()
        })
    }

    /// Check if store is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn read(&self) -> RoundhouseResult<RwLockReadGuard<'_, Collection>> {
        Ok(self
            .inner
            .read()
            .map_err(|_| ApplicationError::StoreLockError)?)
    }

    fn write(&self) -> RoundhouseResult<RwLockWriteGuard<'_, Collection>> {
        Ok(self
            .inner
            .write()
            .map_err(|_| ApplicationError::StoreLockError)?)
    }

    /// Call observers. Must not be called with the collection locked.
    fn notify(&self, event: ChangeEvent) {
        trace!(%event, "Store changed");
        // A poisoned observer list still holds valid observers.
        let observers = match self.observers.read() {
            Ok(observers) => observers.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        };
        for observer in observers {
            observer.on_change(&event);
        }
    }
}

fn insert_unique<K: Ord + Copy + ToString, V>(
    map: &mut BTreeMap<K, V>,
    id: K,
    value: V,
    context: &str,
) -> RoundhouseResult<()> {
    if map.insert(id, value).is_some() {
        return Err(DomainError::DuplicateId {
            context: context.to_string(),
            id: id.to_string(),
        }
        .into());
    }
    Ok(())
}

impl PurchaseRepository for InMemoryStore {
    fn get(&self, id: PurchaseId) -> RoundhouseResult<Purchase> {
        self.read()?
            .purchases
            .get(&id)
            .cloned()
            .ok_or_else(|| ApplicationError::not_found("purchase", id).into())
    }

    fn list(&self) -> RoundhouseResult<Vec<Purchase>> {
        Ok(self.read()?.purchases.values().cloned().collect())
    }

    fn save(&self, purchase: Purchase) -> RoundhouseResult<()> {
        let entity = EntityRef::Purchase(purchase.id);
        let existed = self.write()?.purchases.insert(purchase.id, purchase).is_some();
        self.notify(ChangeEvent::saved(existed, entity));
        Ok(())
    }

    fn remove(&self, id: PurchaseId) -> RoundhouseResult<()> {
        if self.write()?.purchases.remove(&id).is_none() {
            return Err(ApplicationError::not_found("purchase", id).into());
        }
        self.notify(ChangeEvent::removed(EntityRef::Purchase(id)));
        Ok(())
    }

    fn find_by_catalog_prefix(
        &self,
        manufacturer: &str,
        prefix: &str,
    ) -> RoundhouseResult<Vec<Purchase>> {
        Ok(self
            .read()?
            .purchases
            .values()
            .filter(|p| p.manufacturer == manufacturer && p.catalog_number.starts_with(prefix))
            .cloned()
            .collect())
    }
}

impl TrainRepository for InMemoryStore {
    fn get(&self, id: TrainId) -> RoundhouseResult<Train> {
        self.read()?
            .trains
            .get(&id)
            .cloned()
            .ok_or_else(|| ApplicationError::not_found("train", id).into())
    }

    fn list(&self) -> RoundhouseResult<Vec<Train>> {
        Ok(self.read()?.trains.values().cloned().collect())
    }

    fn save(&self, train: Train) -> RoundhouseResult<()> {
        let entity = EntityRef::Train(train.id);
        let existed = self.write()?.trains.insert(train.id, train).is_some();
        self.notify(ChangeEvent::saved(existed, entity));
        Ok(())
    }

    fn remove(&self, id: TrainId) -> RoundhouseResult<()> {
        if self.write()?.trains.remove(&id).is_none() {
            return Err(ApplicationError::not_found("train", id).into());
        }
        self.notify(ChangeEvent::removed(EntityRef::Train(id)));
        Ok(())
    }
}

impl DecoderRepository for InMemoryStore {
    fn get(&self, id: DecoderId) -> RoundhouseResult<Decoder> {
        self.read()?
            .decoders
            .get(&id)
            .cloned()
            .ok_or_else(|| ApplicationError::not_found("decoder", id).into())
    }

    fn list(&self) -> RoundhouseResult<Vec<Decoder>> {
        Ok(self.read()?.decoders.values().cloned().collect())
    }

    fn save(&self, decoder: Decoder) -> RoundhouseResult<()> {
        let entity = EntityRef::Decoder(decoder.id);
        let existed = self.write()?.decoders.insert(decoder.id, decoder).is_some();
        self.notify(ChangeEvent::saved(existed, entity));
        Ok(())
    }

    fn remove(&self, id: DecoderId) -> RoundhouseResult<()> {
        if self.write()?.decoders.remove(&id).is_none() {
            return Err(ApplicationError::not_found("decoder", id).into());
        }
        self.notify(ChangeEvent::removed(EntityRef::Decoder(id)));
        Ok(())
    }

    fn get_type(&self, id: DecoderTypeId) -> RoundhouseResult<DecoderType> {
        self.read()?
            .decoder_types
            .get(&id)
            .cloned()
            .ok_or_else(|| ApplicationError::not_found("decoder type", id).into())
    }

    fn list_types(&self) -> RoundhouseResult<Vec<DecoderType>> {
        Ok(self.read()?.decoder_types.values().cloned().collect())
    }

    fn save_type(&self, decoder_type: DecoderType) -> RoundhouseResult<()> {
        let entity = EntityRef::DecoderType(decoder_type.id);
        let existed = self
            .write()?
            .decoder_types
            .insert(decoder_type.id, decoder_type)
            .is_some();
        self.notify(ChangeEvent::saved(existed, entity));
        Ok(())
    }

    fn remove_type(&self, id: DecoderTypeId) -> RoundhouseResult<()> {
        {
            let mut inner = self.write()?;
            let in_use = inner.decoders.values().filter(|d| d.decoder_type == id).count();
            if in_use > 0 {
                return Err(DomainError::Inconsistent {
                    context: format!("decoder type {id}"),
                    reason: format!("{in_use} decoder(s) of this type remain"),
                }
                .into());
            }
            if inner.decoder_types.remove(&id).is_none() {
                return Err(ApplicationError::not_found("decoder type", id).into());
            }
        }
        self.notify(ChangeEvent::removed(EntityRef::DecoderType(id)));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use roundhouse_core::application::ports::ChangeKind;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder(Mutex<Vec<ChangeEvent>>);

    impl ChangeObserver for Recorder {
        fn on_change(&self, event: &ChangeEvent) {
            self.0.lock().unwrap().push(*event);
        }
    }

    #[test]
    fn save_then_get() {
        let store = InMemoryStore::new();
        let purchase = Purchase::new("Heljan", "2670");

        PurchaseRepository::save(&store, purchase.clone()).unwrap();
        assert_eq!(PurchaseRepository::get(&store, purchase.id).unwrap(), purchase);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn missing_records_are_not_found() {
        let store = InMemoryStore::new();
        let err = TrainRepository::get(&store, TrainId::new()).unwrap_err();
        assert!(err.is_not_found());

        let err = DecoderRepository::remove(&store, DecoderId::new()).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn prefix_query_is_exact_on_manufacturer() {
        let store = InMemoryStore::new();
        for (maker, number) in [
            ("Bachmann", "32-381"),
            ("Bachmann", "32-950"),
            ("Bachmann", "31-650"),
            ("bachmann", "32-381"),
        ] {
            PurchaseRepository::save(&store, Purchase::new(maker, number)).unwrap();
        }

        let found = store.find_by_catalog_prefix("Bachmann", "32").unwrap();
        assert_eq!(found.len(), 2);
        assert!(found.iter().all(|p| p.manufacturer == "Bachmann"));
    }

    #[test]
    fn observers_see_every_write() {
        let store = InMemoryStore::new();
        let recorder = Arc::new(Recorder::default());
        store.subscribe(recorder.clone()).unwrap();

        let mut train = Train::new("The Master Cutler");
        TrainRepository::save(&store, train.clone()).unwrap();
        train.number = "1A14".into();
        TrainRepository::save(&store, train.clone()).unwrap();
        TrainRepository::remove(&store, train.id).unwrap();

        let kinds: Vec<_> = recorder.0.lock().unwrap().iter().map(|e| e.kind).collect();
        assert_eq!(
            kinds,
            vec![ChangeKind::Inserted, ChangeKind::Updated, ChangeKind::Removed]
        );
    }

    #[test]
    fn observers_may_read_the_store() {
        struct Reader(InMemoryStore, Mutex<usize>);
        impl ChangeObserver for Reader {
            fn on_change(&self, _: &ChangeEvent) {
                *self.1.lock().unwrap() = PurchaseRepository::list(&self.0).unwrap().len();
            }
        }

        let store = InMemoryStore::new();
        let reader = Arc::new(Reader(store.clone(), Mutex::new(0)));
        store.subscribe(reader.clone()).unwrap();

        PurchaseRepository::save(&store, Purchase::new("Dapol", "4D-022-001")).unwrap();
        assert_eq!(*reader.1.lock().unwrap(), 1);
    }

    #[test]
    fn decoder_type_in_use_cannot_be_removed() {
        let store = InMemoryStore::new();
        let decoder_type = DecoderType::new("Zimo", "MX600");
        store.save_type(decoder_type.clone()).unwrap();
        DecoderRepository::save(&store, Decoder::new(decoder_type.id)).unwrap();

        assert!(store.remove_type(decoder_type.id).is_err());
        assert!(store.get_type(decoder_type.id).is_ok());
    }

    #[test]
    fn snapshot_round_trips_through_document() {
        let store = InMemoryStore::new();
        PurchaseRepository::save(&store, Purchase::new("Hornby", "R3174")).unwrap();
        TrainRepository::save(&store, Train::new("Flying Scotsman")).unwrap();

        let snapshot = store.snapshot().unwrap();
        let reopened = InMemoryStore::from_document(snapshot.clone()).unwrap();
        assert_eq!(reopened.snapshot().unwrap(), snapshot);
    }

    #[test]
    fn restore_discards_later_writes_silently() {
        let store = InMemoryStore::new();
        PurchaseRepository::save(&store, Purchase::new("Hornby", "R3174")).unwrap();
        let before = store.snapshot().unwrap();

        let recorder = Arc::new(Recorder::default());
        store.subscribe(recorder.clone()).unwrap();
        let later = Purchase::new("Hornby", "R3175");
        PurchaseRepository::save(&store, later.clone()).unwrap();

        store.restore(before.clone()).unwrap();
        assert_eq!(store.snapshot().unwrap(), before);
        assert!(PurchaseRepository::get(&store, later.id).unwrap_err().is_not_found());
        assert_eq!(recorder.0.lock().unwrap().len(), 1);
    }

    #[test]
    fn duplicate_ids_in_document_are_rejected() {
        let purchase = Purchase::new("Hornby", "R3174");
        let document = CollectionDocument {
            purchases: vec![purchase.clone(), purchase],
            ..CollectionDocument::default()
        };
        assert!(InMemoryStore::from_document(document).is_err());
    }
}
