//! In-memory order being created or edited
//!
//! [`OrderFormState`] is the single source of truth of an open order form.
//! Every mutation goes through one of its methods and leaves items, payments
//! and totals mutually consistent: item area/total and the order totals are
//! recomputed before the method returns.

use crate::config::AppConfig;
use crate::core::collaborators::{ConfirmDialog, Seller};
use crate::core::date::DateLike;
use crate::core::locale::{parse_decimal_or_zero, round2};
use crate::core::error::ValidationError;
use crate::entities::{
    ClientCategory, ClientSnapshot, DeliveryType, OrderDocument, OrderItem, Payment,
    PaymentMethod, ProductCatalog, generate_order_number,
};
use crate::pricing::{OrderTotals, PricingCalculator};
use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Lifecycle of a form
///
/// `Empty → Editing → Saving → Saved`; a failed save returns to `Editing`.
/// `Deleted` is terminal and only reachable for persisted orders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormPhase {
    Empty,
    Editing,
    Saving,
    Saved,
    Deleted,
}

/// Editable input of an item row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemField {
    Quantity,
    UnitPrice,
    Width,
    Height,
    Description,
}

/// Editable input of a payment row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PaymentField {
    Method,
    Amount,
    Date,
    Reference,
}

/// How many items of the order are already produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProductionProgress {
    pub completed: usize,
    pub total: usize,
}

impl ProductionProgress {
    /// True when the order has items and all of them are completed
    pub fn is_complete(&self) -> bool {
        self.total > 0 && self.completed == self.total
    }
}

/// Shared, read-only inputs of every form
#[derive(Debug, Clone)]
pub struct FormContext {
    pub config: Arc<AppConfig>,
    pub catalog: Arc<ProductCatalog>,
}

impl FormContext {
    pub fn new(config: AppConfig, catalog: ProductCatalog) -> Self {
        Self {
            config: Arc::new(config),
            catalog: Arc::new(catalog),
        }
    }

    pub fn pricing(&self) -> PricingCalculator {
        PricingCalculator::new(&self.config.pricing)
    }
}

fn non_negative(value: Decimal) -> Decimal {
    value.max(Decimal::ZERO)
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

/// Mutable order aggregate owned by one form
#[derive(Debug, Clone)]
pub struct OrderFormState {
    ctx: FormContext,
    pricing: PricingCalculator,
    phase: FormPhase,

    id: Option<String>,
    order_number: String,
    client: Option<ClientSnapshot>,
    category: ClientCategory,
    items: Vec<OrderItem>,
    payments: Vec<Payment>,
    status: String,
    notes: Option<String>,
    delivery_date: DateTime<Utc>,
    delivery_type: DeliveryType,
    delivery_address: Option<String>,
    delivery_cost: Option<Decimal>,
    discount: Decimal,
    extra_services: Decimal,
    seller_id: Option<String>,
    seller_name: Option<String>,
    image_url: Option<String>,
    image_title: Option<String>,
    created_at: Option<DateLike>,
    /// `updatedAt` of the last version read or written by this form
    updated_at: Option<DateLike>,

    totals: OrderTotals,
}

impl OrderFormState {
    /// A blank form; call [`init_new`](Self::init_new) or
    /// [`init_from_existing`](Self::init_from_existing) before editing
    pub fn new(ctx: FormContext) -> Self {
        let pricing = ctx.pricing();
        let status = ctx.config.orders.default_status.clone();
        Self {
            ctx,
            pricing,
            phase: FormPhase::Empty,
            id: None,
            order_number: String::new(),
            client: None,
            category: ClientCategory::default(),
            items: Vec::new(),
            payments: Vec::new(),
            status,
            notes: None,
            delivery_date: DateTime::<Utc>::UNIX_EPOCH,
            delivery_type: DeliveryType::default(),
            delivery_address: None,
            delivery_cost: None,
            discount: Decimal::ZERO,
            extra_services: Decimal::ZERO,
            seller_id: None,
            seller_name: None,
            image_url: None,
            image_title: None,
            created_at: None,
            updated_at: None,
            totals: OrderTotals::default(),
        }
    }

    /// Reset to a new order: default status, delivery after the configured
    /// lead time, the current user as seller and a tentative order number
    pub fn init_new(&mut self, seller: Option<Seller>, now: DateTime<Utc>) {
        let ctx = self.ctx.clone();
        *self = Self::new(ctx);

        self.order_number = generate_order_number(now);
        self.delivery_date = now + Duration::hours(self.ctx.config.orders.delivery_lead_hours);
        if let Some(seller) = seller {
            self.seller_id = Some(seller.id);
            self.seller_name = Some(seller.name);
        }
        self.phase = FormPhase::Editing;
        self.recompute();
    }

    /// Hydrate from a persisted order
    ///
    /// Items and payments are copied, derived values recomputed and the
    /// delivery date falls back to tomorrow when it cannot be read.
    pub fn init_from_existing(&mut self, id: &str, order: &OrderDocument, now: DateTime<Utc>) {
        let ctx = self.ctx.clone();
        *self = Self::new(ctx);

        self.id = Some(id.to_string());
        self.order_number = order.order_number.clone();
        self.client = order.client.clone();
        self.category = order
            .client
            .as_ref()
            .map(|c| c.category)
            .unwrap_or_default();
        self.items = order.items.clone();
        self.payments = order.payments.clone();
        if order.status.trim().is_empty() {
            tracing::warn!(order_id = %id, "order without status, using default");
        } else {
            self.status = order.status.clone();
        }
        self.notes = non_empty(order.notes.clone());
        self.delivery_date =
            DateLike::normalize_or_tomorrow(order.delivery_date.as_ref(), now, "deliveryDate");
        self.delivery_type = order.delivery_type;
        self.delivery_address = non_empty(order.delivery_address.clone());
        self.delivery_cost = order.delivery_cost.map(|c| round2(non_negative(c)));
        self.discount = round2(non_negative(order.discount));
        self.extra_services = round2(non_negative(order.extra_services));
        self.seller_id = non_empty(order.seller_id.clone());
        self.seller_name = non_empty(order.seller_name.clone());
        self.image_url = non_empty(order.image_url.clone());
        self.image_title = non_empty(order.image_title.clone());
        self.created_at = order.created_at.clone();
        self.updated_at = order.updated_at.clone();

        for item in &mut self.items {
            if item.quantity < Decimal::ONE {
                tracing::warn!(order_id = %id, item_id = %item.id, quantity = %item.quantity, "invalid quantity, using 1");
                item.quantity = Decimal::ONE;
            }
            item.unit_price = round2(non_negative(item.unit_price));
        }

        self.phase = FormPhase::Editing;
        for index in 0..self.items.len() {
            self.recompute_item(index);
        }
        self.recompute();
    }

    // ---------------------------------------------------------------------
    // Items
    // ---------------------------------------------------------------------

    /// Append an item, pre-filled from the catalog when `product_id` is known
    ///
    /// Returns the index of the new item.
    pub fn add_item(&mut self, product_id: Option<&str>) -> usize {
        let mut item = OrderItem::empty();

        match product_id.map(|id| (id, self.ctx.catalog.get(id))) {
            Some((_, Some(product))) => {
                item.product_id = Some(product.id.clone());
                item.product_name = product.name.clone();
                item.product_type = product.product_type;
                item.category = product.category.clone();
                item.unit_price = self.pricing.category_price(product, self.category);
                item.description = product.item_description().to_string();
            }
            Some((id, None)) => {
                tracing::warn!(product_id = id, "unknown product, adding empty item");
            }
            None => {}
        }

        self.items.push(item);
        let index = self.items.len() - 1;
        self.touch();
        self.recompute_item(index);
        self.recompute();
        index
    }

    /// Remove an item after interactive confirmation
    ///
    /// Out-of-range indexes are a no-op and do not prompt. Returns whether
    /// the item was removed.
    pub async fn remove_item(&mut self, index: usize, confirm: &dyn ConfirmDialog) -> bool {
        let Some(item) = self.items.get(index) else {
            tracing::debug!(index, len = self.items.len(), "remove_item out of range");
            return false;
        };

        let label = if item.product_name.is_empty() {
            format!("item {}", index + 1)
        } else {
            item.product_name.clone()
        };
        if !confirm.confirm(&format!("Remover {} do pedido?", label)).await {
            return false;
        }

        self.items.remove(index);
        self.touch();
        self.recompute();
        true
    }

    /// Apply raw input to one item field
    ///
    /// Numbers are parsed locale-aware; anything unparseable becomes `0`
    /// (quantity: `1`). Returns whether the stored value changed.
    pub fn update_item_field(&mut self, index: usize, field: ItemField, raw: &str) -> bool {
        let Some(item) = self.items.get(index) else {
            return false;
        };

        let changed = match field {
            ItemField::Quantity => {
                let parsed = parse_decimal_or_zero(raw, "quantity");
                let quantity = if parsed >= Decimal::ONE {
                    parsed
                } else {
                    if !raw.trim().is_empty() {
                        tracing::warn!(index, raw, "quantity below 1, using 1");
                    }
                    Decimal::ONE
                };
                let changed = item.quantity != quantity;
                self.items[index].quantity = quantity;
                changed
            }
            ItemField::UnitPrice => {
                let typed = non_negative(parse_decimal_or_zero(raw, "unitPrice"));
                let price = match item
                    .product_id
                    .as_deref()
                    .and_then(|id| self.ctx.catalog.get(id))
                {
                    Some(product) => {
                        self.pricing
                            .compute_item_unit_price(product, self.category, Some(typed))
                    }
                    None => round2(typed),
                };
                let changed = item.unit_price != price;
                self.items[index].unit_price = price;
                changed
            }
            ItemField::Width => {
                let width = non_negative(parse_decimal_or_zero(raw, "width"));
                let changed = item.width != width;
                self.items[index].width = width;
                changed
            }
            ItemField::Height => {
                let height = non_negative(parse_decimal_or_zero(raw, "height"));
                let changed = item.height != height;
                self.items[index].height = height;
                changed
            }
            ItemField::Description => {
                let changed = item.description != raw;
                self.items[index].description = raw.to_string();
                changed
            }
        };

        if changed {
            self.touch();
            self.recompute_item(index);
            self.recompute();
        }
        changed
    }

    /// Flip the production status of an item
    pub fn toggle_item_completed(&mut self, index: usize) -> bool {
        let Some(item) = self.items.get_mut(index) else {
            return false;
        };
        item.completed = !item.completed;
        self.touch();
        true
    }

    pub fn production_progress(&self) -> ProductionProgress {
        ProductionProgress {
            completed: self.items.iter().filter(|i| i.completed).count(),
            total: self.items.len(),
        }
    }

    /// Insert or remove the application marker in an item description
    ///
    /// Idempotent in both directions. Returns whether the description changed.
    pub fn set_item_application(&mut self, index: usize, on: bool) -> bool {
        let marker = self.ctx.config.orders.application_marker.clone();
        let Some(item) = self.items.get_mut(index) else {
            return false;
        };

        let has_marker = item.description.contains(&marker);
        let description = match (on, has_marker) {
            (true, false) if item.description.trim().is_empty() => marker,
            (true, false) => format!("{} - {}", item.description.trim_end(), marker),
            (false, true) => item
                .description
                .replace(&format!(" - {}", marker), "")
                .replace(&marker, "")
                .trim()
                .to_string(),
            _ => return false,
        };

        item.description = description;
        self.touch();
        true
    }

    // ---------------------------------------------------------------------
    // Payments
    // ---------------------------------------------------------------------

    /// Append a pending payment for the current remaining balance
    pub fn add_payment(&mut self, now: DateTime<Utc>) -> usize {
        self.payments
            .push(Payment::new(PaymentMethod::Pendente, self.totals.remaining, now));
        self.touch();
        self.recompute();
        self.payments.len() - 1
    }

    /// Remove a payment; out-of-range is a no-op
    pub fn remove_payment(&mut self, index: usize) -> bool {
        if index >= self.payments.len() {
            return false;
        }
        self.payments.remove(index);
        self.touch();
        self.recompute();
        true
    }

    /// Apply raw input to one payment field
    ///
    /// An unreadable date keeps the previous one. Returns whether the stored
    /// value changed.
    pub fn update_payment_field(&mut self, index: usize, field: PaymentField, raw: &str) -> bool {
        let Some(payment) = self.payments.get_mut(index) else {
            return false;
        };

        let changed = match field {
            PaymentField::Method => {
                let method = PaymentMethod::from(raw.to_string());
                let changed = payment.method != method;
                payment.method = method;
                changed
            }
            PaymentField::Amount => {
                let amount = round2(non_negative(parse_decimal_or_zero(raw, "amount")));
                let changed = payment.amount != amount;
                payment.amount = amount;
                changed
            }
            PaymentField::Date => match DateLike::IsoString(raw.to_string()).normalize() {
                Ok(date) => {
                    let changed = payment.date != Some(date);
                    payment.set_date(date);
                    changed
                }
                Err(err) => {
                    tracing::warn!(index, error = %err, "unparseable payment date, keeping previous");
                    false
                }
            },
            PaymentField::Reference => {
                let changed = payment.reference != raw;
                payment.reference = raw.to_string();
                changed
            }
        };

        if changed {
            self.touch();
            self.recompute();
        }
        changed
    }

    // ---------------------------------------------------------------------
    // Client and pricing tier
    // ---------------------------------------------------------------------

    /// Select the client of the order and apply its pricing tier
    pub async fn select_client(&mut self, client: ClientSnapshot, confirm: &dyn ConfirmDialog) {
        let category = client.category;
        self.client = Some(client);
        self.touch();
        self.set_client_category(category, confirm).await;
    }

    /// Switch the pricing tier and reprice items from the catalog
    ///
    /// When some item carries a manual price (one that diverges from its
    /// current tier default), the user is asked before overwriting it. On
    /// decline only the stored category changes. Returns whether prices were
    /// updated.
    pub async fn set_client_category(
        &mut self,
        category: ClientCategory,
        confirm: &dyn ConfirmDialog,
    ) -> bool {
        let previous = self.category;
        self.category = category;
        if let Some(client) = self.client.as_mut() {
            client.category = category;
        }
        self.touch();
        if previous == category {
            return false;
        }

        let catalog = Arc::clone(&self.ctx.catalog);
        let has_overrides = self.items.iter().any(|item| {
            item.product_id
                .as_deref()
                .and_then(|id| catalog.get(id))
                .is_some_and(|product| {
                    let default_price = self.pricing.category_price(product, previous);
                    self.pricing.is_manual_override(item.unit_price, default_price)
                })
        });

        if has_overrides {
            let message = format!(
                "Alguns itens têm preço manual. Aplicar os preços de cliente {} a todos os itens?",
                category.as_str()
            );
            if !confirm.confirm(&message).await {
                tracing::info!(category = category.as_str(), "category changed, manual prices kept");
                return false;
            }
        }

        let mut repriced = 0;
        for index in 0..self.items.len() {
            let product = self.items[index]
                .product_id
                .as_deref()
                .and_then(|id| catalog.get(id));
            if let Some(product) = product {
                self.items[index].unit_price = self.pricing.category_price(product, category);
                self.recompute_item(index);
                repriced += 1;
            }
        }
        self.recompute();
        tracing::debug!(category = category.as_str(), repriced, "items repriced");
        true
    }

    // ---------------------------------------------------------------------
    // Order level
    // ---------------------------------------------------------------------

    pub fn set_discount(&mut self, value: Decimal) -> bool {
        let value = round2(non_negative(value));
        if self.discount == value {
            return false;
        }
        self.discount = value;
        self.touch();
        self.recompute();
        true
    }

    pub fn set_extra_services(&mut self, value: Decimal) -> bool {
        let value = round2(non_negative(value));
        if self.extra_services == value {
            return false;
        }
        self.extra_services = value;
        self.touch();
        self.recompute();
        true
    }

    /// `None` means "no delivery cost"
    pub fn set_delivery_cost(&mut self, value: Option<Decimal>) -> bool {
        let value = value.map(|v| round2(non_negative(v)));
        if self.delivery_cost == value {
            return false;
        }
        self.delivery_cost = value;
        self.touch();
        self.recompute();
        true
    }

    /// Switching to pickup clears the delivery address and cost
    pub fn set_delivery_type(&mut self, delivery_type: DeliveryType) -> bool {
        if self.delivery_type == delivery_type {
            return false;
        }
        self.delivery_type = delivery_type;
        if delivery_type == DeliveryType::Retirada {
            self.delivery_address = None;
            self.delivery_cost = None;
        }
        self.touch();
        self.recompute();
        true
    }

    pub fn set_delivery_address(&mut self, address: &str) {
        self.delivery_address = non_empty(Some(address.to_string()));
        self.touch();
    }

    pub fn set_delivery_date(&mut self, date: DateTime<Utc>) {
        self.delivery_date = date;
        self.touch();
    }

    /// Change the status; must be one of the configured statuses
    pub fn set_status(&mut self, status: &str) -> Result<(), ValidationError> {
        if !self.ctx.config.is_known_status(status) {
            return Err(ValidationError::UnknownStatus {
                status: status.to_string(),
            });
        }
        self.status = status.to_string();
        self.touch();
        Ok(())
    }

    pub fn set_notes(&mut self, notes: &str) {
        self.notes = non_empty(Some(notes.to_string()));
        self.touch();
    }

    pub fn set_image(&mut self, url: Option<&str>, title: Option<&str>) {
        self.image_url = non_empty(url.map(String::from));
        self.image_title = non_empty(title.map(String::from));
        self.touch();
    }

    // ---------------------------------------------------------------------
    // Lifecycle
    // ---------------------------------------------------------------------

    pub fn begin_save(&mut self) {
        self.phase = FormPhase::Saving;
    }

    /// Record a successful save; a created order receives its store id here
    pub fn mark_saved(
        &mut self,
        id: &str,
        order_number: &str,
        created_at: Option<DateLike>,
        updated_at: Option<DateLike>,
    ) {
        self.id = Some(id.to_string());
        self.order_number = order_number.to_string();
        if created_at.is_some() {
            self.created_at = created_at;
        }
        self.updated_at = updated_at;
        self.phase = FormPhase::Saved;
    }

    /// A failed save leaves every edit in place
    pub fn mark_save_failed(&mut self) {
        self.phase = FormPhase::Editing;
    }

    pub fn mark_deleted(&mut self) {
        if self.id.is_some() {
            self.phase = FormPhase::Deleted;
        }
    }

    fn touch(&mut self) {
        if matches!(self.phase, FormPhase::Empty | FormPhase::Saved) {
            self.phase = FormPhase::Editing;
        }
    }

    fn recompute_item(&mut self, index: usize) {
        let pricing = self.pricing;
        if let Some(item) = self.items.get_mut(index) {
            item.area = if item.is_custom_size() {
                pricing.area(item.width, item.height)
            } else {
                Decimal::ZERO
            };
            item.total = pricing.compute_item_total(item);
        }
    }

    fn recompute(&mut self) {
        self.totals = self.pricing.compute_order_totals(
            &self.items,
            self.discount,
            self.extra_services,
            self.delivery_cost,
            &self.payments,
        );
    }

    // ---------------------------------------------------------------------
    // Accessors
    // ---------------------------------------------------------------------

    pub fn context(&self) -> &FormContext {
        &self.ctx
    }

    pub fn pricing(&self) -> &PricingCalculator {
        &self.pricing
    }

    pub fn phase(&self) -> FormPhase {
        self.phase
    }

    /// Store id; `None` until the order has been created
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }

    pub fn order_number(&self) -> &str {
        &self.order_number
    }

    pub fn client(&self) -> Option<&ClientSnapshot> {
        self.client.as_ref()
    }

    pub fn category(&self) -> ClientCategory {
        self.category
    }

    pub fn items(&self) -> &[OrderItem] {
        &self.items
    }

    pub fn payments(&self) -> &[Payment] {
        &self.payments
    }

    pub fn totals(&self) -> OrderTotals {
        self.totals
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }

    pub fn delivery_date(&self) -> DateTime<Utc> {
        self.delivery_date
    }

    pub fn delivery_type(&self) -> DeliveryType {
        self.delivery_type
    }

    pub fn delivery_address(&self) -> Option<&str> {
        self.delivery_address.as_deref()
    }

    pub fn delivery_cost(&self) -> Option<Decimal> {
        self.delivery_cost
    }

    pub fn discount(&self) -> Decimal {
        self.discount
    }

    pub fn extra_services(&self) -> Decimal {
        self.extra_services
    }

    pub fn seller_id(&self) -> Option<&str> {
        self.seller_id.as_deref()
    }

    pub fn seller_name(&self) -> Option<&str> {
        self.seller_name.as_deref()
    }

    pub fn image_url(&self) -> Option<&str> {
        self.image_url.as_deref()
    }

    pub fn image_title(&self) -> Option<&str> {
        self.image_title.as_deref()
    }

    /// Creation date as read from the store, kept verbatim for edits
    pub fn created_at(&self) -> Option<&DateLike> {
        self.created_at.as_ref()
    }

    /// Whether `updated_at` is the version this form last loaded or saved
    pub fn is_own_version(&self, updated_at: Option<&DateLike>) -> bool {
        match (self.updated_at.as_ref(), updated_at) {
            (Some(ours), Some(theirs)) => ours == theirs,
            _ => false,
        }
    }
}
