//! Synchronisation between raw form inputs and [`OrderFormState`]
//!
//! Each `reconcile_*` entry point reads the raw text of one row (or of the
//! order-level inputs) once, pushes every input that disagrees with the state
//! into it and writes the result back: derived displays always, inputs only
//! where their text no longer reads as the stored value (a clamp, a price
//! snap-back, a reprice or a reload). Parse problems are absorbed here: they
//! become `0` with a warning and never reach the caller. Running a reconcile
//! twice without new input leaves both the state and the rendered output
//! unchanged.

use crate::config::AppConfig;
use crate::core::date::DateLike;
use crate::core::locale::{
    format_currency, format_date, format_decimal, format_number, parse_decimal,
    parse_decimal_or_zero,
};
use crate::entities::{DeliveryType, OrderItem, Payment};
use crate::form::state::{ItemField, OrderFormState, PaymentField};
use crate::form::view::{FieldKey, FormView};
use rust_decimal::Decimal;
use std::time::Duration;

const ITEM_INPUTS: [ItemField; 5] = [
    ItemField::Width,
    ItemField::Height,
    ItemField::Quantity,
    ItemField::UnitPrice,
    ItemField::Description,
];

const PAYMENT_INPUTS: [PaymentField; 4] = [
    PaymentField::Method,
    PaymentField::Amount,
    PaymentField::Date,
    PaymentField::Reference,
];

fn item_key(field: ItemField, index: usize) -> FieldKey {
    match field {
        ItemField::Width => FieldKey::ItemWidth(index),
        ItemField::Height => FieldKey::ItemHeight(index),
        ItemField::Quantity => FieldKey::ItemQuantity(index),
        ItemField::UnitPrice => FieldKey::ItemUnitPrice(index),
        ItemField::Description => FieldKey::ItemDescription(index),
    }
}

fn payment_key(field: PaymentField, index: usize) -> FieldKey {
    match field {
        PaymentField::Method => FieldKey::PaymentMethod(index),
        PaymentField::Amount => FieldKey::PaymentAmount(index),
        PaymentField::Date => FieldKey::PaymentDate(index),
        PaymentField::Reference => FieldKey::PaymentReference(index),
    }
}

/// Whether `raw` reads as `value`; unreadable text reads as `fallback`
fn numeric_matches(raw: &str, value: Decimal, fallback: Decimal) -> bool {
    match parse_decimal(raw) {
        Ok(parsed) => parsed == value,
        Err(_) => value == fallback,
    }
}

fn item_input_matches(item: &OrderItem, field: ItemField, raw: &str) -> bool {
    match field {
        ItemField::Quantity => numeric_matches(raw, item.quantity, Decimal::ONE),
        ItemField::UnitPrice => numeric_matches(raw, item.unit_price, Decimal::ZERO),
        ItemField::Width => numeric_matches(raw, item.width, Decimal::ZERO),
        ItemField::Height => numeric_matches(raw, item.height, Decimal::ZERO),
        ItemField::Description => item.description == raw,
    }
}

fn item_input_text(item: &OrderItem, field: ItemField) -> String {
    match field {
        ItemField::Quantity => format_number(item.quantity),
        ItemField::UnitPrice => format_number(item.unit_price),
        ItemField::Width => format_number(item.width),
        ItemField::Height => format_number(item.height),
        ItemField::Description => item.description.clone(),
    }
}

fn payment_input_matches(payment: &Payment, field: PaymentField, raw: &str) -> bool {
    match field {
        PaymentField::Method => raw.trim().eq_ignore_ascii_case(payment.method.as_str()),
        PaymentField::Amount => numeric_matches(raw, payment.amount, Decimal::ZERO),
        // Same calendar day: the input carries no time of day
        PaymentField::Date => match payment.date {
            Some(date) => DateLike::IsoString(raw.to_string())
                .normalize()
                .is_ok_and(|typed| typed.date_naive() == date.date_naive()),
            None => raw.trim().is_empty(),
        },
        PaymentField::Reference => payment.reference == raw,
    }
}

fn payment_input_text(payment: &Payment, field: PaymentField) -> String {
    match field {
        PaymentField::Method => payment.method.as_str().to_string(),
        PaymentField::Amount => format_number(payment.amount),
        PaymentField::Date => payment.date.as_ref().map(format_date).unwrap_or_default(),
        PaymentField::Reference => payment.reference.clone(),
    }
}

/// Blank means "no delivery cost"
fn delivery_cost_matches(raw: &str, cost: Option<Decimal>) -> bool {
    if raw.trim().is_empty() {
        cost.is_none()
    } else {
        cost.is_some_and(|cost| numeric_matches(raw, cost, Decimal::ZERO))
    }
}

/// Rewrite a rendered input whose text disagrees with the state
///
/// Inputs are never highlighted; fields that are not rendered are left alone.
fn sync_input(
    view: &mut dyn FormView,
    key: FieldKey,
    matches: impl FnOnce(&str) -> bool,
    text: impl FnOnce() -> String,
) {
    if let Some(raw) = view.read(key) {
        if !matches(&raw) {
            view.write(key, &text());
        }
    }
}

/// Bridges a [`FormView`] and an [`OrderFormState`]
#[derive(Debug, Clone)]
pub struct FormReconciler {
    highlight: Duration,
    currency_symbol: String,
}

impl FormReconciler {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            highlight: config.highlight_duration(),
            currency_symbol: config.display.currency_symbol.clone(),
        }
    }

    /// Read one item row into the state and refresh the row and the totals
    ///
    /// Returns whether the state changed. Out-of-range rows are ignored.
    pub fn reconcile_item_row(
        &self,
        state: &mut OrderFormState,
        view: &mut dyn FormView,
        index: usize,
    ) -> bool {
        if index >= state.items().len() {
            tracing::debug!(index, "reconcile of missing item row ignored");
            return false;
        }

        let mut changed = false;
        for field in ITEM_INPUTS {
            let Some(raw) = view.read(item_key(field, index)) else {
                continue;
            };
            if !item_input_matches(&state.items()[index], field, &raw) {
                changed |= state.update_item_field(index, field, &raw);
            }
        }

        self.render_item_row(state, view, index);
        self.render_totals(state, view);
        changed
    }

    /// Read one payment row into the state and refresh the row and the totals
    pub fn reconcile_payment_row(
        &self,
        state: &mut OrderFormState,
        view: &mut dyn FormView,
        index: usize,
    ) -> bool {
        if index >= state.payments().len() {
            tracing::debug!(index, "reconcile of missing payment row ignored");
            return false;
        }

        let mut changed = false;
        for field in PAYMENT_INPUTS {
            let Some(raw) = view.read(payment_key(field, index)) else {
                continue;
            };
            if !payment_input_matches(&state.payments()[index], field, &raw) {
                changed |= state.update_payment_field(index, field, &raw);
            }
        }

        self.render_payment_row(state, view, index);
        self.render_totals(state, view);
        changed
    }

    /// Read discount, extras, delivery cost and delivery type, then re-render
    /// the order-level inputs and the summary
    pub fn reconcile_order_level(&self, state: &mut OrderFormState, view: &mut dyn FormView) -> bool {
        let mut changed = false;

        if let Some(raw) = view.read(FieldKey::Discount) {
            if !numeric_matches(&raw, state.discount(), Decimal::ZERO) {
                changed |= state.set_discount(parse_decimal_or_zero(&raw, "discount"));
            }
        }
        if let Some(raw) = view.read(FieldKey::ExtraServices) {
            if !numeric_matches(&raw, state.extra_services(), Decimal::ZERO) {
                changed |= state.set_extra_services(parse_decimal_or_zero(&raw, "extraServices"));
            }
        }
        if let Some(raw) = view.read(FieldKey::DeliveryType) {
            match DeliveryType::parse(&raw) {
                Some(delivery_type) => changed |= state.set_delivery_type(delivery_type),
                None => tracing::warn!(raw = %raw, "unknown delivery type ignored"),
            }
        }
        // Read after the delivery type: switching to pickup clears the cost
        if state.delivery_type() == DeliveryType::Entrega {
            if let Some(raw) = view.read(FieldKey::DeliveryCost) {
                if !delivery_cost_matches(&raw, state.delivery_cost()) {
                    let cost = if raw.trim().is_empty() {
                        None
                    } else {
                        Some(parse_decimal_or_zero(&raw, "deliveryCost"))
                    };
                    changed |= state.set_delivery_cost(cost);
                }
            }
        }

        self.render_order_inputs(state, view);
        self.render_totals(state, view);
        changed
    }

    /// Bring every rendered input and display in line with the state
    ///
    /// Called after any change that did not come from the inputs themselves.
    pub fn render(&self, state: &OrderFormState, view: &mut dyn FormView) {
        for index in 0..state.items().len() {
            self.render_item_row(state, view, index);
        }
        for index in 0..state.payments().len() {
            self.render_payment_row(state, view, index);
        }
        self.render_order_inputs(state, view);
        self.render_totals(state, view);
    }

    fn render_item_row(&self, state: &OrderFormState, view: &mut dyn FormView, index: usize) {
        let Some(item) = state.items().get(index) else {
            return;
        };
        for field in ITEM_INPUTS {
            sync_input(
                view,
                item_key(field, index),
                |raw| item_input_matches(item, field, raw),
                || item_input_text(item, field),
            );
        }
        self.write_display(view, FieldKey::ItemArea(index), format_decimal(item.area));
        self.write_display(view, FieldKey::ItemTotal(index), format_decimal(item.total));
    }

    fn render_payment_row(&self, state: &OrderFormState, view: &mut dyn FormView, index: usize) {
        let Some(payment) = state.payments().get(index) else {
            return;
        };
        for field in PAYMENT_INPUTS {
            sync_input(
                view,
                payment_key(field, index),
                |raw| payment_input_matches(payment, field, raw),
                || payment_input_text(payment, field),
            );
        }
    }

    fn render_order_inputs(&self, state: &OrderFormState, view: &mut dyn FormView) {
        sync_input(
            view,
            FieldKey::Discount,
            |raw| numeric_matches(raw, state.discount(), Decimal::ZERO),
            || format_number(state.discount()),
        );
        sync_input(
            view,
            FieldKey::ExtraServices,
            |raw| numeric_matches(raw, state.extra_services(), Decimal::ZERO),
            || format_number(state.extra_services()),
        );
        sync_input(
            view,
            FieldKey::DeliveryType,
            |raw| DeliveryType::parse(raw) == Some(state.delivery_type()),
            || state.delivery_type().as_str().to_string(),
        );
        sync_input(
            view,
            FieldKey::DeliveryCost,
            |raw| delivery_cost_matches(raw, state.delivery_cost()),
            || state.delivery_cost().map(format_number).unwrap_or_default(),
        );
    }

    fn render_totals(&self, state: &OrderFormState, view: &mut dyn FormView) {
        let totals = state.totals();
        let symbol = &self.currency_symbol;

        self.write_display(view, FieldKey::Subtotal, format_currency(totals.subtotal, symbol));
        self.write_display(
            view,
            FieldKey::DiscountDisplay,
            format_currency(state.discount(), symbol),
        );
        self.write_display(
            view,
            FieldKey::ExtrasDisplay,
            format_currency(state.extra_services(), symbol),
        );
        self.write_display(view, FieldKey::GrandTotal, format_currency(totals.grand_total, symbol));
        self.write_display(view, FieldKey::PaidTotal, format_currency(totals.paid_total, symbol));
        self.write_display(view, FieldKey::Remaining, format_currency(totals.remaining, symbol));
    }

    /// Write a display field, highlighting it when its text changed
    fn write_display(&self, view: &mut dyn FormView, key: FieldKey, text: String) {
        let previous = view.read(key);
        view.write(key, &text);
        if previous.as_deref() != Some(text.as_str()) {
            view.highlight(key, self.highlight);
        }
    }
}
