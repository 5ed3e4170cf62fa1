//! Driven (output) ports - implemented by infrastructure.
//!
//! These traits define what the application needs from storage.
//! The `roundhouse-adapters` crate provides implementations.

pub mod change;

pub use change::{ChangeEvent, ChangeKind, EntityRef};

use crate::domain::{
    Decoder, DecoderId, DecoderType, DecoderTypeId, Purchase, PurchaseId, Train, TrainId,
};
use crate::error::RoundhouseResult;

/// Port for purchase storage and queries.
///
/// Implemented by:
/// - `roundhouse_adapters::InMemoryStore` (testing, and the cache behind the file store)
/// - `roundhouse_adapters::JsonFileStore` (local collection file)
///
/// ## Design Notes
///
/// - `save` inserts or replaces by id; models travel with their purchase
/// - Lookups of missing ids return `ApplicationError::NotFound`
#[cfg_attr(test, mockall::automock)]
pub trait PurchaseRepository: Send + Sync {
    /// Get a purchase by id.
    fn get(&self, id: PurchaseId) -> RoundhouseResult<Purchase>;

    /// List all purchases.
    fn list(&self) -> RoundhouseResult<Vec<Purchase>>;

    /// Insert or replace a purchase.
    fn save(&self, purchase: Purchase) -> RoundhouseResult<()>;

    /// Remove a purchase and its models.
    fn remove(&self, id: PurchaseId) -> RoundhouseResult<()>;

    /// Purchases from exactly `manufacturer` whose catalog number starts
    /// with `prefix`.
    fn find_by_catalog_prefix(
        &self,
        manufacturer: &str,
        prefix: &str,
    ) -> RoundhouseResult<Vec<Purchase>>;
}

/// Port for train storage.
#[cfg_attr(test, mockall::automock)]
pub trait TrainRepository: Send + Sync {
    fn get(&self, id: TrainId) -> RoundhouseResult<Train>;

    fn list(&self) -> RoundhouseResult<Vec<Train>>;

    /// Insert or replace a train, members included.
    fn save(&self, train: Train) -> RoundhouseResult<()>;

    fn remove(&self, id: TrainId) -> RoundhouseResult<()>;
}

/// Port for decoder and decoder type storage.
#[cfg_attr(test, mockall::automock)]
pub trait DecoderRepository: Send + Sync {
    fn get(&self, id: DecoderId) -> RoundhouseResult<Decoder>;

    fn list(&self) -> RoundhouseResult<Vec<Decoder>>;

    fn save(&self, decoder: Decoder) -> RoundhouseResult<()>;

    fn remove(&self, id: DecoderId) -> RoundhouseResult<()>;

    fn get_type(&self, id: DecoderTypeId) -> RoundhouseResult<DecoderType>;

    fn list_types(&self) -> RoundhouseResult<Vec<DecoderType>>;

    fn save_type(&self, decoder_type: DecoderType) -> RoundhouseResult<()>;

    /// Remove a decoder type. Fails while decoders of the type remain.
    fn remove_type(&self, id: DecoderTypeId) -> RoundhouseResult<()>;
}

/// Port for change notification.
///
/// Stores call every registered observer after a write commits, outside
/// their internal locks.
pub trait ChangeObserver: Send + Sync {
    fn on_change(&self, event: &ChangeEvent);
}
