use crate::domain::{
    entities::{Decoder, DecoderType, Purchase, Train},
    error::DomainError,
};

/// Centralized domain validation.
///
/// Entities own their rules; this is the single entry point services use
/// before anything reaches a repository.
pub struct DomainValidator;

impl DomainValidator {
    pub fn validate_purchase(purchase: &Purchase) -> Result<(), DomainError> {
        purchase.validate()
    }

    pub fn validate_train(train: &Train) -> Result<(), DomainError> {
        train.validate()
    }

    pub fn validate_decoder_type(decoder_type: &DecoderType) -> Result<(), DomainError> {
        decoder_type.validate()
    }

    pub fn validate_decoder(decoder: &Decoder) -> Result<(), DomainError> {
        decoder.validate()
    }
}
