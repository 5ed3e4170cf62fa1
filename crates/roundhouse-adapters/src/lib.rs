//! Infrastructure adapters for RoundHouse.
//!
//! This crate implements the ports defined in `roundhouse-core::application::ports`.
//! It contains all external dependencies and I/O operations.

pub mod document;
pub mod observers;
pub mod store;

// Re-export commonly used adapters
pub use document::{CollectionDocument, DOCUMENT_VERSION};
pub use observers::{ChannelObserver, TracingObserver};
pub use store::{InMemoryStore, JsonFileStore};
