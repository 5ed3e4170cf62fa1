//! Decoder Service - decoder stock and fitting decoders to models.
//!
//! Which decoders are fitted is not stored on the decoder: it is derived
//! from the models that reference them, so the service reads purchases too.

use std::collections::HashSet;

use tracing::{info, instrument, warn};

use crate::{
    application::ports::{DecoderRepository, PurchaseRepository},
    domain::{
        Decoder, DecoderId, DecoderType, DomainError, DomainValidator as validator, Model,
        ModelDispatch, ModelId, PurchaseId, StockLevel, stock_levels,
    },
    error::RoundhouseResult,
};

/// Decoder use cases.
pub struct DecoderService {
    decoders: Box<dyn DecoderRepository>,
    purchases: Box<dyn PurchaseRepository>,
}

impl DecoderService {
    pub fn new(decoders: Box<dyn DecoderRepository>, purchases: Box<dyn PurchaseRepository>) -> Self {
        Self {
            decoders,
            purchases,
        }
    }

    #[instrument(skip_all, fields(decoder_type = %decoder_type.title()))]
    pub fn add_type(&self, decoder_type: DecoderType) -> RoundhouseResult<DecoderType> {
        validator::validate_decoder_type(&decoder_type)?;
        self.decoders.save_type(decoder_type.clone())?;
        info!(id = %decoder_type.id, "Decoder type added");
        Ok(decoder_type)
    }

    /// All decoder types, by manufacturer then product code.
    pub fn list_types(&self) -> RoundhouseResult<Vec<DecoderType>> {
        let mut types = self.decoders.list_types()?;
        types.sort_by(|a, b| {
            (&a.manufacturer, &a.product_code).cmp(&(&b.manufacturer, &b.product_code))
        });
        Ok(types)
    }

    /// Record a decoder. Its type must already exist.
    #[instrument(skip_all, fields(decoder_type = %decoder.decoder_type))]
    pub fn add_decoder(&self, decoder: Decoder) -> RoundhouseResult<Decoder> {
        self.decoders.get_type(decoder.decoder_type)?;
        validator::validate_decoder(&decoder)?;

        self.decoders.save(decoder.clone())?;
        info!(id = %decoder.id, "Decoder added");
        Ok(decoder)
    }

    pub fn list_decoders(&self) -> RoundhouseResult<Vec<Decoder>> {
        let mut decoders = self.decoders.list()?;
        decoders.sort_by(|a, b| {
            (a.decoder_type, &a.serial_number, a.id).cmp(&(b.decoder_type, &b.serial_number, b.id))
        });
        Ok(decoders)
    }

    /// Remove a spare decoder. Fitted decoders must be unfitted first.
    #[instrument(skip(self))]
    pub fn remove_decoder(&self, id: DecoderId) -> RoundhouseResult<()> {
        if self.fitted_decoders()?.contains(&id) {
            return Err(DomainError::Inconsistent {
                context: format!("decoder {id}"),
                reason: "it is fitted to a model".into(),
            }
            .into());
        }
        self.decoders.remove(id)?;
        info!("Decoder removed");
        Ok(())
    }

    /// Ids of every decoder currently referenced by a model.
    pub fn fitted_decoders(&self) -> RoundhouseResult<HashSet<DecoderId>> {
        Ok(self
            .purchases
            .list()?
            .iter()
            .flat_map(|p| p.models.iter())
            .filter_map(|m| m.decoder)
            .collect())
    }

    /// Fit a spare decoder to a model.
    ///
    /// A model with no DCC dispatch, or only DCC-ready, becomes DCC-fitted.
    /// Sound dispatch is kept.
    #[instrument(skip(self))]
    pub fn fit_decoder(
        &self,
        purchase_id: PurchaseId,
        model_id: ModelId,
        decoder_id: DecoderId,
    ) -> RoundhouseResult<Model> {
        self.decoders.get(decoder_id)?;

        let mut purchase = self.purchases.get(purchase_id)?;
        let position = purchase
            .position_of_model(model_id)
            .ok_or_else(|| DomainError::ChildNotFound {
                entity: "model",
                id: model_id.to_string(),
            })?;

        if purchase.models[position].decoder == Some(decoder_id) {
            return Ok(purchase.models[position].clone());
        }
        if self.fitted_decoders()?.contains(&decoder_id) {
            warn!("Decoder is already fitted elsewhere");
            return Err(DomainError::Inconsistent {
                context: format!("decoder {decoder_id}"),
                reason: "it is already fitted to another model".into(),
            }
            .into());
        }

        let model = &mut purchase.models[position];
        model.decoder = Some(decoder_id);
        if !model.dispatch.is_some_and(ModelDispatch::has_decoder) {
            model.dispatch = Some(ModelDispatch::DccFitted);
        }
        let fitted = model.clone();

        validator::validate_purchase(&purchase)?;
        self.purchases.save(purchase)?;
        info!(model = %fitted.title(), "Decoder fitted");
        Ok(fitted)
    }

    /// Take the decoder out of a model, returning it to spare stock.
    #[instrument(skip(self))]
    pub fn unfit_decoder(&self, purchase_id: PurchaseId, model_id: ModelId) -> RoundhouseResult<Model> {
        let mut purchase = self.purchases.get(purchase_id)?;
        let model = purchase
            .models
            .iter_mut()
            .find(|m| m.id == model_id)
            .ok_or_else(|| DomainError::ChildNotFound {
                entity: "model",
                id: model_id.to_string(),
            })?;

        if model.decoder.take().is_some() {
            model.dispatch = Some(ModelDispatch::DccReady);
        }
        let unfitted = model.clone();

        self.purchases.save(purchase)?;
        info!(model = %unfitted.title(), "Decoder removed from model");
        Ok(unfitted)
    }

    /// Spare stock per decoder type, in `list_types` order.
    #[instrument(skip(self))]
    pub fn stock_report(&self) -> RoundhouseResult<Vec<StockLevel>> {
        let types = self.list_types()?;
        let decoders = self.decoders.list()?;
        let fitted = self.fitted_decoders()?;

        let report = stock_levels(&types, &decoders, &fitted);
        let low = report.iter().filter(|level| level.is_low()).count();
        if low > 0 {
            info!(low, "Decoder types below minimum stock");
        }
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::{
        ApplicationError,
        ports::{MockDecoderRepository, MockPurchaseRepository},
    };
    use crate::domain::{DecoderTypeId, Purchase};
    use crate::error::RoundhouseError;

    fn purchase_with(models: Vec<Model>) -> Purchase {
        let mut purchase = Purchase::new("Heljan", "2670");
        purchase.models = models;
        purchase
    }

    fn purchases_of(purchase: &Purchase) -> MockPurchaseRepository {
        let mut repo = MockPurchaseRepository::new();
        let get = purchase.clone();
        let list = purchase.clone();
        repo.expect_get().returning(move |_| Ok(get.clone()));
        repo.expect_list().returning(move || Ok(vec![list.clone()]));
        repo
    }

    fn decoders_of(decoder: &Decoder) -> MockDecoderRepository {
        let mut repo = MockDecoderRepository::new();
        let copy = decoder.clone();
        repo.expect_get().returning(move |_| Ok(copy.clone()));
        repo
    }

    #[test]
    fn add_decoder_requires_known_type() {
        let mut decoders = MockDecoderRepository::new();
        decoders
            .expect_get_type()
            .returning(|id| Err(ApplicationError::not_found("decoder type", id).into()));
        decoders.expect_save().never();

        let service = DecoderService::new(Box::new(decoders), Box::new(MockPurchaseRepository::new()));
        let err = service
            .add_decoder(Decoder::new(DecoderTypeId::new()))
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn add_decoder_rejects_bad_address() {
        let decoder_type = DecoderType::new("ESU", "58429");
        let mut decoder = Decoder::new(decoder_type.id);
        decoder.address = Some(20000);

        let mut decoders = MockDecoderRepository::new();
        decoders
            .expect_get_type()
            .returning(move |_| Ok(decoder_type.clone()));
        decoders.expect_save().never();

        let service = DecoderService::new(Box::new(decoders), Box::new(MockPurchaseRepository::new()));
        assert!(matches!(
            service.add_decoder(decoder).unwrap_err(),
            RoundhouseError::Domain(DomainError::InvalidAddress { address: 20000 })
        ));
    }

    #[test]
    fn fitting_upgrades_dispatch_to_dcc() {
        let decoder = Decoder::new(DecoderTypeId::new());
        let model = Model::new("Class 52", "D1015").with_dispatch(ModelDispatch::DccReady);
        let model_id = model.id;
        let purchase = purchase_with(vec![model]);

        let mut purchases = purchases_of(&purchase);
        let decoder_id = decoder.id;
        purchases
            .expect_save()
            .withf(move |p| p.models[0].decoder == Some(decoder_id))
            .times(1)
            .returning(|_| Ok(()));

        let service = DecoderService::new(Box::new(decoders_of(&decoder)), Box::new(purchases));
        let fitted = service.fit_decoder(purchase.id, model_id, decoder.id).unwrap();
        assert_eq!(fitted.dispatch, Some(ModelDispatch::DccFitted));
    }

    #[test]
    fn fitting_keeps_sound_dispatch() {
        let decoder = Decoder::new(DecoderTypeId::new());
        let model = Model::new("Class 37", "37 025").with_dispatch(ModelDispatch::DccSound);
        let model_id = model.id;
        let purchase = purchase_with(vec![model]);

        let mut purchases = purchases_of(&purchase);
        purchases.expect_save().returning(|_| Ok(()));

        let service = DecoderService::new(Box::new(decoders_of(&decoder)), Box::new(purchases));
        let fitted = service.fit_decoder(purchase.id, model_id, decoder.id).unwrap();
        assert_eq!(fitted.dispatch, Some(ModelDispatch::DccSound));
    }

    #[test]
    fn decoder_cannot_be_fitted_twice() {
        let decoder = Decoder::new(DecoderTypeId::new());
        let mut first = Model::new("Class 52", "D1015").with_dispatch(ModelDispatch::DccFitted);
        first.decoder = Some(decoder.id);
        let second = Model::new("Class 52", "D1023");
        let second_id = second.id;
        let purchase = purchase_with(vec![first, second]);

        let mut purchases = purchases_of(&purchase);
        purchases.expect_save().never();

        let service = DecoderService::new(Box::new(decoders_of(&decoder)), Box::new(purchases));
        let err = service
            .fit_decoder(purchase.id, second_id, decoder.id)
            .unwrap_err();
        assert!(matches!(
            err,
            RoundhouseError::Domain(DomainError::Inconsistent { .. })
        ));
    }

    #[test]
    fn stock_counts_only_spare_decoders() {
        let mut decoder_type = DecoderType::new("Zimo", "MX600");
        decoder_type.minimum_stock = 2;
        let fitted = Decoder::new(decoder_type.id);
        let spare = Decoder::new(decoder_type.id);

        let mut model = Model::new("Class 08", "08 600").with_dispatch(ModelDispatch::DccFitted);
        model.decoder = Some(fitted.id);
        let purchase = purchase_with(vec![model]);

        let mut decoders = MockDecoderRepository::new();
        let all = vec![fitted, spare];
        decoders
            .expect_list_types()
            .returning(move || Ok(vec![decoder_type.clone()]));
        decoders.expect_list().returning(move || Ok(all.clone()));

        let service = DecoderService::new(Box::new(decoders), Box::new(purchases_of(&purchase)));
        let report = service.stock_report().unwrap();
        assert_eq!(report.len(), 1);
        assert_eq!(report[0].spare, 1);
        assert!(report[0].is_low());
    }

    #[test]
    fn fitted_decoder_cannot_be_removed() {
        let decoder = Decoder::new(DecoderTypeId::new());
        let mut model = Model::new("Class 08", "08 600");
        model.decoder = Some(decoder.id);
        let purchase = purchase_with(vec![model]);

        let mut decoders = MockDecoderRepository::new();
        decoders.expect_remove().never();

        let service = DecoderService::new(Box::new(decoders), Box::new(purchases_of(&purchase)));
        assert!(service.remove_decoder(decoder.id).is_err());
    }
}
