//! RoundHouse Core - Hexagonal Architecture Implementation
//!
//! This crate provides the domain and application layers for the RoundHouse
//! model railway collection manager, following hexagonal (ports and adapters)
//! architecture.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │          roundhouse-cli (CLI)           │
//! │       (Implements Driving Ports)        │
//! └──────────────────┬──────────────────────┘
//!                    │ calls
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │          Application Services           │
//! │ (PurchaseService, TrainService, ...)    │
//! │          Orchestrates Use Cases         │
//! └──────────────────┬──────────────────────┘
//!                    │ uses
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │       Application Ports (Traits)        │
//! │  (Driven: Repositories, ChangeObserver) │
//! └──────────────────┬──────────────────────┘
//!                    │ implemented by
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │   roundhouse-adapters (Infrastructure)  │
//! │      (InMemoryStore, JsonFileStore)     │
//! └─────────────────────────────────────────┘
//!                    │
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │        Domain Layer (Pure Logic)        │
//! │  (Purchase, Train, SparseIndex, ...)    │
//! │        No External Dependencies         │
//! └─────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use roundhouse_core::prelude::*;
//!
//! // Services take their storage as boxed ports.
//! let service = PurchaseService::new(Box::new(store.clone()))
//!     .with_ordering(SparseIndex::new(64));
//!
//! let purchase = service.add(Purchase::new("Bachmann", "32-381A"))?;
//! let similar = service.similar_purchases(&purchase)?;
//! ```

pub mod domain;

pub mod application;

pub mod error;

// Public API - what external crates should use
pub mod prelude {
    pub use crate::application::{
        ApplicationError, DecoderService, PurchaseService, TrainService,
        ports::{
            ChangeEvent, ChangeKind, ChangeObserver, DecoderRepository, EntityRef,
            PurchaseRepository, TrainRepository,
        },
    };
    pub use crate::domain::{
        Condition, Decoder, DecoderId, DecoderType, DecoderTypeId, DisplayName, DomainError, Era,
        IndexSortable, MatchKind, Model, ModelClassification, ModelDispatch, ModelId, Purchase,
        PurchaseId, SimilarPurchases, SparseIndex, StockLevel, Train, TrainId, TrainMember,
        TrainMemberId,
    };
    pub use crate::error::{RoundhouseError, RoundhouseResult};
}

// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
