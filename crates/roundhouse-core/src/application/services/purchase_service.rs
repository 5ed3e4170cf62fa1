//! Purchase Service - recording purchases and ordering their models.
//!
//! Every write follows the same shape: load the purchase, apply the change
//! through the domain, validate, save. Model order is kept with the
//! service's `SparseIndex`.

use tracing::{debug, info, instrument};

use crate::{
    application::ports::PurchaseRepository,
    domain::{
        Allocation, DomainError, DomainValidator as validator, Model, ModelId, Purchase,
        PurchaseId, SimilarPurchases, SparseIndex, catalog_number_digits, similar_purchases,
        sort_by_index,
    },
    error::RoundhouseResult,
};

/// Purchase and model use cases.
pub struct PurchaseService {
    purchases: Box<dyn PurchaseRepository>,
    ordering: SparseIndex,
}

impl PurchaseService {
    /// Create a service using the default baseline of 64.
    pub fn new(purchases: Box<dyn PurchaseRepository>) -> Self {
        Self {
            purchases,
            ordering: SparseIndex::default(),
        }
    }

    /// Use `ordering` for model keys.
    pub fn with_ordering(mut self, ordering: SparseIndex) -> Self {
        self.ordering = ordering;
        self
    }

    pub fn ordering(&self) -> SparseIndex {
        self.ordering
    }

    pub fn get(&self, id: PurchaseId) -> RoundhouseResult<Purchase> {
        self.purchases.get(id)
    }

    /// All purchases, by manufacturer, catalog number, then date.
    pub fn list(&self) -> RoundhouseResult<Vec<Purchase>> {
        let mut purchases = self.purchases.list()?;
        purchases.sort_by(|a, b| {
            (&a.manufacturer, &a.catalog_number, a.date, a.id).cmp(&(
                &b.manufacturer,
                &b.catalog_number,
                b.date,
                b.id,
            ))
        });
        Ok(purchases)
    }

    /// Record a new purchase.
    ///
    /// Models are kept in the order given and assigned fresh keys.
    #[instrument(skip_all, fields(purchase = %purchase.title()))]
    pub fn add(&self, mut purchase: Purchase) -> RoundhouseResult<Purchase> {
        self.ordering.respace(&mut purchase.models);
        validator::validate_purchase(&purchase)?;

        self.purchases.save(purchase.clone())?;
        info!(id = %purchase.id, models = purchase.models.len(), "Purchase recorded");
        Ok(purchase)
    }

    /// Replace an existing purchase's details.
    ///
    /// Model keys are taken as given and must already be strictly increasing.
    #[instrument(skip_all, fields(id = %purchase.id))]
    pub fn update(&self, mut purchase: Purchase) -> RoundhouseResult<Purchase> {
        self.purchases.get(purchase.id)?;

        sort_by_index(&mut purchase.models);
        validator::validate_purchase(&purchase)?;

        self.purchases.save(purchase.clone())?;
        info!("Purchase updated");
        Ok(purchase)
    }

    #[instrument(skip(self))]
    pub fn remove(&self, id: PurchaseId) -> RoundhouseResult<()> {
        self.purchases.remove(id)?;
        info!("Purchase removed");
        Ok(())
    }

    /// Earlier purchases similar to `candidate`.
    ///
    /// The candidate need not be stored yet; when it is, it is never
    /// reported as similar to itself.
    #[instrument(skip_all, fields(purchase = %candidate.title()))]
    pub fn similar_purchases(&self, candidate: &Purchase) -> RoundhouseResult<SimilarPurchases> {
        let digits = catalog_number_digits(&candidate.catalog_number);
        if digits.is_empty() {
            debug!("Catalog number has no leading digits, nothing to match");
            return Ok(SimilarPurchases::none());
        }

        let found = self
            .purchases
            .find_by_catalog_prefix(&candidate.manufacturer, digits)?;
        let similar = similar_purchases(candidate, found);
        debug!(kind = ?similar.kind(), matches = similar.len(), "Similar purchases ranked");
        Ok(similar)
    }

    /// Similar purchases for a stored purchase.
    pub fn similar_to(&self, id: PurchaseId) -> RoundhouseResult<SimilarPurchases> {
        let purchase = self.purchases.get(id)?;
        self.similar_purchases(&purchase)
    }

    /// Add `model` after the purchase's last model.
    #[instrument(skip(self, model), fields(model = %model.title()))]
    pub fn append_model(&self, purchase_id: PurchaseId, model: Model) -> RoundhouseResult<Model> {
        let mut purchase = self.purchases.get(purchase_id)?;
        let model_id = model.id;

        let allocation = self.ordering.push(&mut purchase.models, model);
        self.commit(purchase, model_id, allocation)
    }

    /// Add `model` at zero-based position `at`.
    #[instrument(skip(self, model), fields(model = %model.title()))]
    pub fn insert_model(
        &self,
        purchase_id: PurchaseId,
        model: Model,
        at: usize,
    ) -> RoundhouseResult<Model> {
        let mut purchase = self.purchases.get(purchase_id)?;
        let model_id = model.id;

        let allocation = self.ordering.insert(&mut purchase.models, model, at)?;
        self.commit(purchase, model_id, allocation)
    }

    /// Move a model to zero-based position `to`.
    #[instrument(skip(self))]
    pub fn move_model(
        &self,
        purchase_id: PurchaseId,
        model_id: ModelId,
        to: usize,
    ) -> RoundhouseResult<Model> {
        let mut purchase = self.purchases.get(purchase_id)?;
        let from = purchase
            .position_of_model(model_id)
            .ok_or_else(|| DomainError::ChildNotFound {
                entity: "model",
                id: model_id.to_string(),
            })?;

        let allocation = self.ordering.move_item(&mut purchase.models, from, to)?;
        self.commit(purchase, model_id, allocation)
    }

    /// Remove a model. Any decoder fitted to it becomes spare.
    #[instrument(skip(self))]
    pub fn remove_model(&self, purchase_id: PurchaseId, model_id: ModelId) -> RoundhouseResult<Model> {
        let mut purchase = self.purchases.get(purchase_id)?;
        let position = purchase
            .position_of_model(model_id)
            .ok_or_else(|| DomainError::ChildNotFound {
                entity: "model",
                id: model_id.to_string(),
            })?;

        let removed = purchase.models.remove(position);
        self.purchases.save(purchase)?;
        info!("Model removed");
        Ok(removed)
    }

    fn commit(
        &self,
        purchase: Purchase,
        model_id: ModelId,
        allocation: Allocation,
    ) -> RoundhouseResult<Model> {
        if allocation.renumbered {
            info!(
                purchase = %purchase.id,
                models = purchase.models.len(),
                "No gap left between models, renumbered"
            );
        }
        validator::validate_purchase(&purchase)?;

        let model = purchase
            .model(model_id)
            .cloned()
            .ok_or_else(|| DomainError::ChildNotFound {
                entity: "model",
                id: model_id.to_string(),
            })?;
        self.purchases.save(purchase)?;
        debug!(index = model.index, "Model placed");
        Ok(model)
    }
}
