//! Application layer for RoundHouse.
//!
//! This layer contains:
//! - **Services**: Use case orchestration (PurchaseService, TrainService, DecoderService)
//! - **Ports**: Interface definitions (traits) for storage and change notification
//! - **Errors**: Application-specific error types
//!
//! The application layer coordinates the domain layer but contains no
//! collection rules itself. All rules live in `crate::domain`.

pub mod error;
pub mod ports;
pub mod services;

pub use services::{DecoderService, PurchaseService, TrainService};

pub use ports::{
    ChangeEvent, ChangeKind, ChangeObserver, DecoderRepository, EntityRef, PurchaseRepository,
    TrainRepository,
};

pub use error::ApplicationError;
