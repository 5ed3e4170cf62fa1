//! Application ports (traits) for external dependencies.
//!
//! In hexagonal architecture, ports define interfaces that the application
//! needs from the outside world. Adapters in `roundhouse-adapters` implement these.
//!
//! ## Port Types
//!
//! - **Driven (Output) Ports**: Called by application, implemented by infrastructure
//!   - `PurchaseRepository`, `TrainRepository`, `DecoderRepository`: storage and queries
//!   - `ChangeObserver`: receives committed changes
//!
//! - **Driving (Input) Ports**: Called by external world, implemented by application
//!   - (Defined in CLI layer, implemented by services)

pub mod output;

pub use output::{
    ChangeEvent, ChangeKind, ChangeObserver, DecoderRepository, EntityRef, PurchaseRepository,
    TrainRepository,
};

#[cfg(test)]
pub use output::{MockDecoderRepository, MockPurchaseRepository, MockTrainRepository};
