pub mod common;
pub mod decoder;
pub mod purchase;
pub mod train;

pub use crate::domain::DomainError;
pub use common::{DecoderId, DecoderTypeId, ModelId, PurchaseId, TrainId, TrainMemberId};
pub use decoder::{Decoder, DecoderType, StockLevel};
pub use purchase::{Model, Purchase};
pub use train::{Train, TrainMember};
