//! Collection persisted as a single JSON document.
//!
//! The whole collection is held in an [`InMemoryStore`]; every successful
//! write rewrites the file by writing a sibling temp file and renaming it
//! over the original, so readers never see a half-written document.
//!
//! A write that cannot be flushed is rolled back in memory, and observers
//! only hear about changes that reached the disk.

use std::{
    fs, io,
    path::{Path, PathBuf},
    sync::{Arc, Mutex, RwLock},
};

use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use roundhouse_core::{
    application::{
        ApplicationError,
        ports::{ChangeEvent, ChangeObserver, DecoderRepository, PurchaseRepository, TrainRepository},
    },
    domain::{
        Decoder, DecoderId, DecoderType, DecoderTypeId, Purchase, PurchaseId, Train, TrainId,
    },
    error::{RoundhouseError, RoundhouseResult},
};

use super::memory::InMemoryStore;
use crate::document::{CollectionDocument, DOCUMENT_VERSION};

/// Holds the changes of a write until the file has been replaced.
#[derive(Default)]
struct PendingChanges(Mutex<Vec<ChangeEvent>>);

impl PendingChanges {
    fn take(&self) -> Vec<ChangeEvent> {
        match self.0.lock() {
            Ok(mut events) => std::mem::take(&mut *events),
            Err(poisoned) => std::mem::take(&mut *poisoned.into_inner()),
        }
    }
}

impl ChangeObserver for PendingChanges {
    fn on_change(&self, event: &ChangeEvent) {
        match self.0.lock() {
            Ok(mut events) => events.push(*event),
            Err(poisoned) => poisoned.into_inner().push(*event),
        }
    }
}

/// File-backed store implementing every repository port.
#[derive(Clone)]
pub struct JsonFileStore {
    path: Arc<PathBuf>,
    store: InMemoryStore,
    pending: Arc<PendingChanges>,
    observers: Arc<RwLock<Vec<Arc<dyn ChangeObserver>>>>,
    // Serialises write-then-flush so the file always reflects the latest write.
    write_lock: Arc<Mutex<()>>,
}

impl JsonFileStore {
    /// Open the collection at `path`. A missing file is an empty collection;
    /// nothing is written until the first change.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>) -> RoundhouseResult<Self> {
        let path = path.as_ref().to_path_buf();

        let document = match fs::read_to_string(&path) {
            Ok(text) => parse_document(&path, &text)?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("No collection file yet, starting empty");
                CollectionDocument::default()
            }
            Err(e) => return Err(map_io_error(&path, e, "read collection")),
        };

        info!(
            purchases = document.purchases.len(),
            trains = document.trains.len(),
            decoders = document.decoders.len(),
            "Collection opened"
        );

        let store = InMemoryStore::from_document(document)?;
        let pending = Arc::new(PendingChanges::default());
        store.subscribe(pending.clone())?;

        Ok(Self {
            store,
            pending,
            path: Arc::new(path),
            observers: Arc::default(),
            write_lock: Arc::default(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Register an observer for every later write that reaches the disk.
    pub fn subscribe(&self, observer: Arc<dyn ChangeObserver>) -> RoundhouseResult<()> {
        self.observers
            .write()
            .map_err(|_| ApplicationError::StoreLockError)?
            .push(observer);
        Ok(())
    }

    pub fn snapshot(&self) -> RoundhouseResult<CollectionDocument> {
        self.store.snapshot()
    }

    /// Write the current collection to disk.
    pub fn flush(&self) -> RoundhouseResult<()> {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| ApplicationError::StoreLockError)?;
        self.flush_locked()
    }

    fn write<R>(&self, op: impl FnOnce(&InMemoryStore) -> RoundhouseResult<R>) -> RoundhouseResult<R> {
        let guard = self
            .write_lock
            .lock()
            .map_err(|_| ApplicationError::StoreLockError)?;
        let before = self.store.snapshot()?;

        let result = op(&self.store).and_then(|result| {
            self.flush_locked()?;
            Ok(result)
        });
        let events = self.pending.take();

        if result.is_err() && !events.is_empty() {
            warn!(path = %self.path.display(), "Collection not saved, rolling back");
            self.store.restore(before)?;
        }
        drop(guard);

        let result = result?;
        self.notify(&events);
        Ok(result)
    }

    /// Call observers. Must not be called with the write lock held.
    fn notify(&self, events: &[ChangeEvent]) {
        if events.is_empty() {
            return;
        }
        let observers = match self.observers.read() {
            Ok(observers) => observers.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        };
        for event in events {
            for observer in &observers {
                observer.on_change(event);
            }
        }
    }

    fn flush_locked(&self) -> RoundhouseResult<()> {
        let document = self.store.snapshot()?;
        let json = serde_json::to_string_pretty(&document).map_err(|e| {
            ApplicationError::PersistenceFailed {
                path: self.path.to_path_buf(),
                reason: format!("Failed to serialise collection: {e}"),
            }
        })?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| map_io_error(parent, e, "create directory"))?;
        }

        let temp = self.temp_path();
        fs::write(&temp, json).map_err(|e| map_io_error(&temp, e, "write temp file"))?;
        if let Err(e) = fs::rename(&temp, self.path.as_path()) {
            let _ = fs::remove_file(&temp);
            return Err(map_io_error(&self.path, e, "replace collection"));
        }

        debug!(path = %self.path.display(), "Collection written");
        Ok(())
    }

    fn temp_path(&self) -> PathBuf {
        let name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "collection".into());
        self.path
            .with_file_name(format!(".{name}.{}.tmp", Uuid::new_v4().simple()))
    }
}

fn parse_document(path: &Path, text: &str) -> RoundhouseResult<CollectionDocument> {
    let document: CollectionDocument =
        serde_json::from_str(text).map_err(|e| ApplicationError::PersistenceFailed {
            path: path.to_path_buf(),
            reason: format!("Invalid collection file: {e}"),
        })?;

    if document.version > DOCUMENT_VERSION {
        return Err(ApplicationError::PersistenceFailed {
            path: path.to_path_buf(),
            reason: format!(
                "Collection format version {} is newer than supported version {}",
                document.version, DOCUMENT_VERSION
            ),
        }
        .into());
    }
    Ok(document)
}

fn map_io_error(path: &Path, e: io::Error, operation: &str) -> RoundhouseError {
    ApplicationError::PersistenceFailed {
        path: path.to_path_buf(),
        reason: format!("Failed to {}: {}", operation, e),
    }
    .into()
}

impl PurchaseRepository for JsonFileStore {
    fn get(&self, id: PurchaseId) -> RoundhouseResult<Purchase> {
        PurchaseRepository::get(&self.store, id)
    }

    fn list(&self) -> RoundhouseResult<Vec<Purchase>> {
        PurchaseRepository::list(&self.store)
    }

    fn save(&self, purchase: Purchase) -> RoundhouseResult<()> {
        self.write(|store| PurchaseRepository::save(store, purchase))
    }

    fn remove(&self, id: PurchaseId) -> RoundhouseResult<()> {
        self.write(|store| PurchaseRepository::remove(store, id))
    }

    fn find_by_catalog_prefix(
        &self,
        manufacturer: &str,
        prefix: &str,
    ) -> RoundhouseResult<Vec<Purchase>> {
        self.store.find_by_catalog_prefix(manufacturer, prefix)
    }
}

impl TrainRepository for JsonFileStore {
    fn get(&self, id: TrainId) -> RoundhouseResult<Train> {
        TrainRepository::get(&self.store, id)
    }

    fn list(&self) -> RoundhouseResult<Vec<Train>> {
        TrainRepository::list(&self.store)
    }

    fn save(&self, train: Train) -> RoundhouseResult<()> {
        self.write(|store| TrainRepository::save(store, train))
    }

    fn remove(&self, id: TrainId) -> RoundhouseResult<()> {
        self.write(|store| TrainRepository::remove(store, id))
    }
}

impl DecoderRepository for JsonFileStore {
    fn get(&self, id: DecoderId) -> RoundhouseResult<Decoder> {
        DecoderRepository::get(&self.store, id)
    }

    fn list(&self) -> RoundhouseResult<Vec<Decoder>> {
        DecoderRepository::list(&self.store)
    }

    fn save(&self, decoder: Decoder) -> RoundhouseResult<()> {
        self.write(|store| DecoderRepository::save(store, decoder))
    }

    fn remove(&self, id: DecoderId) -> RoundhouseResult<()> {
        self.write(|store| DecoderRepository::remove(store, id))
    }

    fn get_type(&self, id: DecoderTypeId) -> RoundhouseResult<DecoderType> {
        self.store.get_type(id)
    }

    fn list_types(&self) -> RoundhouseResult<Vec<DecoderType>> {
        self.store.list_types()
    }

    fn save_type(&self, decoder_type: DecoderType) -> RoundhouseResult<()> {
        self.write(|store| store.save_type(decoder_type))
    }

    fn remove_type(&self, id: DecoderTypeId) -> RoundhouseResult<()> {
        self.write(|store| store.remove_type(id))
    }
}
