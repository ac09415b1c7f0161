//! Mapping between [`OrderFormState`] and the persisted order document

use crate::config::AppConfig;
use crate::core::collaborators::ConfirmDialog;
use crate::core::date::DateLike;
use crate::core::error::{NotFoundError, OrderResult, ValidationError};
use crate::core::store::DocumentStore;
use crate::entities::{OrderDocument, generate_order_number};
use crate::form::state::OrderFormState;
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// Saves, loads and deletes orders on behalf of the form
#[derive(Clone)]
pub struct OrderPersistenceAdapter {
    store: Arc<dyn DocumentStore>,
    confirm: Arc<dyn ConfirmDialog>,
    config: Arc<AppConfig>,
}

impl OrderPersistenceAdapter {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        confirm: Arc<dyn ConfirmDialog>,
        config: Arc<AppConfig>,
    ) -> Self {
        Self {
            store,
            confirm,
            config,
        }
    }

    fn collection(&self) -> &str {
        &self.config.collections.orders
    }

    /// Build the persisted shape of `state`
    ///
    /// Totals are recomputed from items and payments rather than taken from
    /// the state. On edit the original `createdAt` and order number are kept;
    /// a new order gets a fresh order number and `createdAt = now`.
    pub fn to_document(
        &self,
        state: &OrderFormState,
        is_edit: bool,
        now: DateTime<Utc>,
    ) -> OrderDocument {
        let totals = state.pricing().compute_order_totals(
            state.items(),
            state.discount(),
            state.extra_services(),
            state.delivery_cost(),
            state.payments(),
        );

        let order_number = if is_edit && !state.order_number().is_empty() {
            state.order_number().to_string()
        } else {
            generate_order_number(now)
        };

        let created_at = match (is_edit, state.created_at()) {
            (true, Some(created_at)) => created_at.clone(),
            _ => DateLike::timestamp(&now),
        };

        let client = state.client().cloned().map(|mut client| {
            client.category = state.category();
            client
        });

        OrderDocument {
            order_number,
            client,
            items: state.items().to_vec(),
            payments: state.payments().to_vec(),
            status: state.status().to_string(),
            notes: state.notes().map(String::from),
            delivery_date: Some(DateLike::timestamp(&state.delivery_date())),
            delivery_type: state.delivery_type(),
            delivery_address: state.delivery_address().map(String::from),
            delivery_cost: state.delivery_cost(),
            discount: state.discount(),
            extra_services: state.extra_services(),
            total_value: totals.grand_total,
            total_paid: totals.paid_total,
            seller_id: state.seller_id().map(String::from),
            seller_name: state.seller_name().map(String::from),
            image_url: state.image_url().map(String::from),
            image_title: state.image_title().map(String::from),
            created_at: Some(created_at),
            updated_at: Some(DateLike::timestamp(&now)),
            last_update: Some(DateLike::timestamp(&now)),
        }
    }

    /// Validate and write the order, returning its store id
    ///
    /// A created order gets its id, order number and creation date assigned
    /// back into `state`. On any failure the state keeps every edit so the
    /// user can retry.
    pub async fn save(&self, state: &mut OrderFormState, is_edit: bool) -> OrderResult<String> {
        if state.client().is_none_or(|c| c.id.trim().is_empty()) {
            return Err(ValidationError::MissingClient.into());
        }
        if state.items().is_empty() {
            return Err(ValidationError::MissingItems.into());
        }
        let edit_id = match (is_edit, state.id()) {
            (true, Some(id)) => Some(id.to_string()),
            (true, None) => return Err(ValidationError::MissingId.into()),
            (false, _) => None,
        };

        let now = Utc::now();
        let document = self.to_document(state, is_edit, now);
        state.begin_save();

        match self.write(edit_id.as_deref(), &document).await {
            Ok(id) => {
                state.mark_saved(
                    &id,
                    &document.order_number,
                    document.created_at.clone(),
                    document.updated_at.clone(),
                );
                tracing::info!(
                    order_id = %id,
                    order_number = %document.order_number,
                    total_value = %document.total_value,
                    is_edit,
                    "order saved"
                );
                Ok(id)
            }
            Err(err) => {
                state.mark_save_failed();
                tracing::warn!(error = %err, is_edit, "order save failed");
                Err(err)
            }
        }
    }

    async fn write(&self, edit_id: Option<&str>, document: &OrderDocument) -> OrderResult<String> {
        let data = document.to_value()?;
        match edit_id {
            Some(id) => {
                if self.store.get(self.collection(), id).await?.is_none() {
                    return Err(NotFoundError::new(self.collection(), id).into());
                }
                self.store.set(self.collection(), id, data).await?;
                Ok(id.to_string())
            }
            None => self.store.add(self.collection(), data).await,
        }
    }

    /// Read an order by id
    pub async fn load(&self, id: &str) -> OrderResult<OrderDocument> {
        let document = self
            .store
            .get(self.collection(), id)
            .await?
            .ok_or_else(|| NotFoundError::new(self.collection(), id))?;
        document.parse()
    }

    /// Delete an order after interactive confirmation
    ///
    /// Returns `Ok(false)` when the user declined. Irreversible.
    pub async fn delete(&self, id: &str) -> OrderResult<bool> {
        if self.store.get(self.collection(), id).await?.is_none() {
            return Err(NotFoundError::new(self.collection(), id).into());
        }

        let message = "Excluir este pedido? Esta ação não pode ser desfeita.";
        if !self.confirm.confirm(message).await {
            tracing::debug!(order_id = %id, "delete declined");
            return Ok(false);
        }

        self.store.delete(self.collection(), id).await?;
        tracing::info!(order_id = %id, "order deleted");
        Ok(true)
    }
}
