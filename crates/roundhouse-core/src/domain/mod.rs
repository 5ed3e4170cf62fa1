//! Core domain layer for RoundHouse.
//!
//! This module contains pure collection logic with no I/O. Storage and change
//! notification are reached through ports (traits) defined in the application
//! layer.
//!
//! ## Hexagonal Architecture Compliance
//!
//! - **No async**: Domain logic is synchronous
//! - **No I/O**: No filesystem, network, or external calls
//! - **No logging**: Observability belongs to the application and CLI layers
//! - **Plain entities**: All domain objects are Clone + PartialEq + serde
//!
// Public API - what the world sees
pub mod entities;
pub mod error;
pub mod matching;
pub mod ordering;
pub mod value_objects;

// Private implementation details - not visible outside domain
mod validation;

// Re-exports for convenience
pub use entities::{
    Decoder, DecoderId, DecoderType, DecoderTypeId, Model, ModelId, Purchase, PurchaseId,
    StockLevel, Train, TrainId, TrainMember, TrainMemberId,
    decoder::{MAX_DCC_ADDRESS, stock_levels},
};

pub use error::{DomainError, ErrorCategory};

pub use matching::{MatchKind, SimilarPurchases, catalog_number_digits, similar_purchases};

pub use ordering::{
    Allocation, DEFAULT_BASELINE, IndexSortable, MAX_BASELINE, SparseIndex, is_strictly_ordered,
    sort_by_index,
};

pub use value_objects::{Condition, DisplayName, Era, ModelClassification, ModelDispatch};

pub use validation::DomainValidator;
