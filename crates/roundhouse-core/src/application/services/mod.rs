//! Application services - orchestrate use cases.
//!
//! Services coordinate the domain layer and ports to accomplish
//! high-level use cases like "record a purchase" or "fit a decoder".

pub mod decoder_service;
pub mod purchase_service;
pub mod train_service;

pub use decoder_service::DecoderService;
pub use purchase_service::PurchaseService;
pub use train_service::TrainService;
